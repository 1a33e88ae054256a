//! Attachment filename derivation for cleaned images.

use crate::FormatKind;

/// Prefix added to every suggested output name.
pub const CLEANED_PREFIX: &str = "cleaned-";

/// Stem used when the caller sent no usable filename.
const DEFAULT_STEM: &str = "image";

/// Reduce an untrusted filename to a bare name.
///
/// Only the component after the last `/` or `\` survives. Control
/// characters and double quotes are dropped so the name can be placed in a
/// `Content-Disposition` header. Returns `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();
    let cleaned = cleaned.trim();

    match cleaned {
        "" | "." | ".." => None,
        _ => Some(cleaned.to_string()),
    }
}

/// Build the suggested attachment name, `cleaned-<name>`.
///
/// Falls back to `image.<ext>` for the detected format when the original
/// name is missing or sanitizes to nothing.
///
/// # Example
/// ```
/// use foodshare_strip::{suggested_filename, FormatKind};
///
/// let name = suggested_filename(Some("../../etc/photo.png"), FormatKind::Png);
/// assert_eq!(name, "cleaned-photo.png");
/// assert_eq!(suggested_filename(None, FormatKind::Jpeg), "cleaned-image.jpg");
/// ```
pub fn suggested_filename(original: Option<&str>, format: FormatKind) -> String {
    let name = original.and_then(sanitize_filename).unwrap_or_else(|| {
        match format.extension() {
            Some(ext) => format!("{DEFAULT_STEM}.{ext}"),
            None => DEFAULT_STEM.to_string(),
        }
    });

    format!("{CLEANED_PREFIX}{name}")
}
