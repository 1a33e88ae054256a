use super::{decode_dynamic, Codec, DecodeLimits};
use crate::{DecodedRaster, FormatKind, Result, StripError};
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageEncoder;

/// Lossless PNG codec.
///
/// The encoder emits only IHDR, IDAT and IEND; text, XMP, eXIf, iCCP and
/// C2PA (`caBX`) chunks from the source are never re-created.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngCodec {
    limits: DecodeLimits,
}

impl PngCodec {
    /// Create a codec that decodes under `limits`.
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }
}

impl Codec for PngCodec {
    fn format(&self) -> FormatKind {
        FormatKind::Png
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster> {
        decode_dynamic(bytes, image::ImageFormat::Png, self.limits)
            .and_then(DecodedRaster::from_dynamic)
            .map_err(|source| StripError::Decode {
                format: FormatKind::Png,
                source,
            })
    }

    /// `_quality` is ignored; PNG output is always lossless.
    fn encode(&self, raster: &DecodedRaster, _quality: u8) -> Result<Vec<u8>> {
        let mut out = Vec::new();

        PngEncoder::new_with_quality(&mut out, CompressionType::Default, FilterType::Adaptive)
            .write_image(
                raster.pixels(),
                raster.width(),
                raster.height(),
                raster.layout().color_type(),
            )
            .map_err(|source| StripError::Encode {
                format: FormatKind::Png,
                source,
            })?;

        Ok(out)
    }
}
