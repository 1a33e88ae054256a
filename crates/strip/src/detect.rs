//! Image format detection from magic bytes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// PNG signature prefix
const PNG_MAGIC: [u8; 2] = [0x89, 0x50];

/// JPEG SOI marker
const JPEG_MAGIC: [u8; 2] = [0xFF, 0xD8];

/// Format classification produced by [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// PNG image
    Png,
    /// JPEG image
    Jpeg,
    /// Anything else, including empty input
    Unsupported,
}

impl FormatKind {
    /// Formats the pipeline can strip.
    pub const SUPPORTED: [FormatKind; 2] = [FormatKind::Png, FormatKind::Jpeg];

    /// Canonical MIME type, `None` for unsupported input.
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            FormatKind::Png => Some("image/png"),
            FormatKind::Jpeg => Some("image/jpeg"),
            FormatKind::Unsupported => None,
        }
    }

    /// Preferred file extension.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            FormatKind::Png => Some("png"),
            FormatKind::Jpeg => Some("jpg"),
            FormatKind::Unsupported => None,
        }
    }

    /// Common file extensions, used when walking directories.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FormatKind::Png => &["png"],
            FormatKind::Jpeg => &["jpg", "jpeg"],
            FormatKind::Unsupported => &[],
        }
    }

    /// Parse a declared content type.
    ///
    /// Surrounding whitespace, ASCII case, and `;` parameters are ignored.
    pub fn from_mime(mime: &str) -> FormatKind {
        let essence = mime.split(';').next().unwrap_or_default().trim();

        if essence.eq_ignore_ascii_case("image/png") {
            FormatKind::Png
        } else if essence.eq_ignore_ascii_case("image/jpeg") {
            FormatKind::Jpeg
        } else {
            FormatKind::Unsupported
        }
    }

    /// Whether this is a format the pipeline handles.
    pub fn is_supported(&self) -> bool {
        !matches!(self, FormatKind::Unsupported)
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FormatKind::Png => "PNG",
            FormatKind::Jpeg => "JPEG",
            FormatKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// Classify image bytes.
///
/// The two-byte magic prefix is authoritative. The declared MIME type is
/// consulted only when there are too few bytes to inspect, so a wrong or
/// hostile hint can never relabel content that was actually examined.
///
/// # Example
/// ```
/// use foodshare_strip::{classify, FormatKind};
///
/// assert_eq!(classify(&[0xFF, 0xD8, 0xFF, 0xE0], None), FormatKind::Jpeg);
/// assert_eq!(classify(&[0x89, 0x50, 0x4E, 0x47], Some("image/jpeg")), FormatKind::Png);
/// assert_eq!(classify(&[], Some("image/png")), FormatKind::Png);
/// assert_eq!(classify(&[0x00, 0x01, 0x02], Some("image/png")), FormatKind::Unsupported);
/// ```
pub fn classify(data: &[u8], declared_mime: Option<&str>) -> FormatKind {
    match data.get(..2) {
        Some(prefix) if prefix == &PNG_MAGIC[..] => FormatKind::Png,
        Some(prefix) if prefix == &JPEG_MAGIC[..] => FormatKind::Jpeg,
        Some(_) => FormatKind::Unsupported,
        None => declared_mime.map_or(FormatKind::Unsupported, FormatKind::from_mime),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_detect_jpeg() {
        let data = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46];
        assert_eq!(classify(&data, None), FormatKind::Jpeg);
    }

    #[test]
    fn test_detect_png() {
        let data = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00];
        assert_eq!(classify(&data, None), FormatKind::Png);
    }

    #[test]
    fn test_prefix_beats_hint() {
        let data = [0x89, 0x50, 0x4E, 0x47];
        assert_eq!(classify(&data, Some("image/jpeg")), FormatKind::Png);
    }

    #[test]
    fn test_other_formats_unsupported() {
        assert_eq!(classify(b"GIF89a\x00\x00", None), FormatKind::Unsupported);
        assert_eq!(classify(b"RIFF\x00\x00\x00\x00WEBP", None), FormatKind::Unsupported);
        assert_eq!(classify(&[0x00, 0x01, 0x02], None), FormatKind::Unsupported);
    }

    #[test]
    fn test_hint_cannot_relabel_inspected_bytes() {
        assert_eq!(classify(b"GIF89a", Some("image/png")), FormatKind::Unsupported);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(classify(&[], None), FormatKind::Unsupported);
        assert_eq!(classify(&[], Some("image/png")), FormatKind::Png);
        assert_eq!(classify(&[], Some("image/jpeg")), FormatKind::Jpeg);
        assert_eq!(classify(&[], Some("image/webp")), FormatKind::Unsupported);
    }

    #[test]
    fn test_single_byte_falls_back_to_hint() {
        assert_eq!(classify(&[0x89], Some("image/png")), FormatKind::Png);
        assert_eq!(classify(&[0xFF], None), FormatKind::Unsupported);
    }

    #[test]
    fn test_from_mime_normalizes() {
        assert_eq!(FormatKind::from_mime(" IMAGE/PNG "), FormatKind::Png);
        assert_eq!(FormatKind::from_mime("image/jpeg; q=0.9"), FormatKind::Jpeg);
        assert_eq!(FormatKind::from_mime("image/jpg"), FormatKind::Unsupported);
        assert_eq!(FormatKind::from_mime(""), FormatKind::Unsupported);
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(FormatKind::Jpeg.mime_type(), Some("image/jpeg"));
        assert_eq!(FormatKind::Png.mime_type(), Some("image/png"));
        assert_eq!(FormatKind::Unsupported.mime_type(), None);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(FormatKind::Jpeg.extension(), Some("jpg"));
        assert_eq!(FormatKind::Jpeg.extensions(), &["jpg", "jpeg"]);
        assert!(FormatKind::Unsupported.extensions().is_empty());
    }

    proptest! {
        #[test]
        fn classify_is_total(
            data in proptest::collection::vec(any::<u8>(), 0..64),
            hint in proptest::option::of(".*"),
        ) {
            let kind = classify(&data, hint.as_deref());
            if data.len() >= 2 {
                let expected = match (data[0], data[1]) {
                    (0x89, 0x50) => FormatKind::Png,
                    (0xFF, 0xD8) => FormatKind::Jpeg,
                    _ => FormatKind::Unsupported,
                };
                prop_assert_eq!(kind, expected);
            }
        }
    }
}
