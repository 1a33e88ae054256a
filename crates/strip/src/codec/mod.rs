//! Per-format decode and re-encode.
//!
//! Each [`Codec`] turns bytes into a [`DecodedRaster`] and a raster back into
//! bytes. The raster has nowhere to keep ancillary chunks or segments, so a
//! decode followed by an encode always yields a metadata-free stream.

mod jpeg;
mod png;

pub use jpeg::JpegCodec;
pub use png::PngCodec;

use crate::{DecodedRaster, FormatKind, Result};
use std::io::Cursor;

/// Default JPEG re-encode quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Upper bounds applied while decoding, so a tiny file cannot claim a
/// huge canvas and exhaust memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum image width in pixels
    pub max_width: u32,
    /// Maximum image height in pixels
    pub max_height: u32,
    /// Maximum bytes the decoder may allocate
    pub max_alloc: u64,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_width: 16_384,
            max_height: 16_384,
            max_alloc: 512 * 1024 * 1024,
        }
    }
}

impl DecodeLimits {
    fn to_image_limits(self) -> image::io::Limits {
        let mut limits = image::io::Limits::default();
        limits.max_image_width = Some(self.max_width);
        limits.max_image_height = Some(self.max_height);
        limits.max_alloc = Some(self.max_alloc);
        limits
    }
}

/// Decode/encode capability for one image format.
pub trait Codec: Send + Sync {
    /// Format handled by this codec.
    fn format(&self) -> FormatKind;

    /// Parse `bytes` into pixels, discarding everything else.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster>;

    /// Serialize a raster. Deterministic for identical input and quality.
    fn encode(&self, raster: &DecodedRaster, quality: u8) -> Result<Vec<u8>>;
}

/// Select the codec for a classified format.
///
/// Returns `None` for [`FormatKind::Unsupported`].
pub fn codec_for(kind: FormatKind, limits: DecodeLimits) -> Option<Box<dyn Codec>> {
    match kind {
        FormatKind::Png => Some(Box::new(PngCodec::new(limits))),
        FormatKind::Jpeg => Some(Box::new(JpegCodec::new(limits))),
        FormatKind::Unsupported => None,
    }
}

/// Run the `image` decoder for `format` under `limits`.
fn decode_dynamic(
    bytes: &[u8],
    format: image::ImageFormat,
    limits: DecodeLimits,
) -> image::ImageResult<image::DynamicImage> {
    let mut reader = image::io::Reader::with_format(Cursor::new(bytes), format);
    reader.limits(limits.to_image_limits());
    reader.decode()
}
