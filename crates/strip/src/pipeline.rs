//! The strip pipeline: classify, decode, re-encode, package.

use crate::codec::{codec_for, DecodeLimits, DEFAULT_JPEG_QUALITY};
use crate::{classify, suggested_filename, FormatKind, Result, StripError};
use serde::Serialize;

/// An encoded image as received from the caller.
///
/// The MIME hint and filename are untrusted; the hint only helps
/// classification when the bytes are inconclusive, and the filename is only
/// used for naming the output.
#[derive(Debug, Clone, Default)]
pub struct ImageBytes {
    data: Vec<u8>,
    mime_hint: Option<String>,
    filename: Option<String>,
}

impl ImageBytes {
    /// Wrap raw image bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            mime_hint: None,
            filename: None,
        }
    }

    /// Attach the caller-declared content type.
    pub fn with_mime_hint(mut self, mime: impl Into<String>) -> Self {
        self.mime_hint = Some(mime.into());
        self
    }

    /// Attach the caller's original filename.
    pub fn with_filename(mut self, name: impl Into<String>) -> Self {
        self.filename = Some(name.into());
        self
    }

    /// Raw bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Declared content type, if any.
    pub fn mime_hint(&self) -> Option<&str> {
        self.mime_hint.as_deref()
    }

    /// Original filename, if any.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Whether no bytes were supplied.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A cleaned image ready to hand back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedOutput {
    /// Re-encoded image bytes
    pub bytes: Vec<u8>,
    /// `image/png` or `image/jpeg`
    pub content_type: &'static str,
    /// Suggested attachment name, `cleaned-<name>`
    pub filename: String,
    /// Format of `bytes`
    pub format: FormatKind,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl EncodedOutput {
    /// Summary without the image bytes, for logs and JSON reports.
    pub fn summary(&self) -> OutputSummary {
        OutputSummary {
            content_type: self.content_type,
            filename: self.filename.clone(),
            format: self.format,
            width: self.width,
            height: self.height,
            size_bytes: self.bytes.len(),
        }
    }

    /// Value for an HTTP `Content-Disposition` header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Serializable description of an [`EncodedOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputSummary {
    /// Output content type
    pub content_type: &'static str,
    /// Suggested filename
    pub filename: String,
    /// Output format
    pub format: FormatKind,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Output size
    pub size_bytes: usize,
}

/// Options for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripOptions {
    /// JPEG re-encode quality (1-100). PNG ignores it.
    pub jpeg_quality: u8,
    /// Decoder resource limits
    pub limits: DecodeLimits,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            limits: DecodeLimits::default(),
        }
    }
}

impl StripOptions {
    fn quality_for(&self, format: FormatKind) -> u8 {
        match format {
            FormatKind::Jpeg => self.jpeg_quality,
            _ => 0,
        }
    }
}

/// Strip all metadata from an image using default options.
///
/// # Example
/// ```no_run
/// use foodshare_strip::{strip_metadata, ImageBytes};
///
/// let data = std::fs::read("photo.jpg").unwrap();
/// let output = strip_metadata(ImageBytes::new(data).with_filename("photo.jpg")).unwrap();
///
/// assert_eq!(output.content_type, "image/jpeg");
/// assert_eq!(output.filename, "cleaned-photo.jpg");
/// ```
pub fn strip_metadata(input: ImageBytes) -> Result<EncodedOutput> {
    strip_metadata_with(input, &StripOptions::default())
}

/// Strip all metadata from an image.
///
/// The image is fully decoded to pixels and re-encoded from scratch. Nothing
/// but pixel data survives the round trip, so no EXIF, XMP, IPTC, ICC or C2PA
/// record can reach the output.
pub fn strip_metadata_with(input: ImageBytes, options: &StripOptions) -> Result<EncodedOutput> {
    if input.is_empty() {
        return Err(StripError::MissingInput);
    }

    let format = classify(input.data(), input.mime_hint());
    tracing::debug!(%format, size = input.data().len(), "classified input");

    let Some(codec) = codec_for(format, options.limits) else {
        return Err(StripError::UnsupportedFormat {
            declared: input.mime_hint,
        });
    };

    let raster = codec.decode(input.data())?;
    tracing::debug!(
        width = raster.width(),
        height = raster.height(),
        layout = ?raster.layout(),
        "decoded raster"
    );

    let bytes = codec.encode(&raster, options.quality_for(format))?;
    tracing::debug!(size = bytes.len(), "re-encoded image");

    let content_type = format
        .mime_type()
        .ok_or(StripError::UnsupportedFormat { declared: None })?;

    Ok(EncodedOutput {
        bytes,
        content_type,
        filename: suggested_filename(input.filename(), format),
        format,
        width: raster.width(),
        height: raster.height(),
    })
}
