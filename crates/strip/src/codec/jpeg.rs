use super::{decode_dynamic, Codec, DecodeLimits};
use crate::{DecodedRaster, FormatKind, PixelLayout, Result, StripError};
use image::codecs::jpeg::JpegEncoder;
use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
use image::{DynamicImage, ImageError};

/// Lossy JPEG codec.
///
/// Decoded rasters are normalized to 8-bit grayscale or 8-bit RGB. The
/// encoder writes SOI, the JFIF APP0 header, tables, frame and scan data;
/// no APP1 (EXIF/XMP), APP2 (ICC), APP11 (C2PA/JUMBF), APP13 (IPTC) or COM
/// segment is ever produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct JpegCodec {
    limits: DecodeLimits,
}

impl JpegCodec {
    /// Create a codec that decodes under `limits`.
    pub fn new(limits: DecodeLimits) -> Self {
        Self { limits }
    }
}

impl Codec for JpegCodec {
    fn format(&self) -> FormatKind {
        FormatKind::Jpeg
    }

    fn decode(&self, bytes: &[u8]) -> Result<DecodedRaster> {
        decode_dynamic(bytes, image::ImageFormat::Jpeg, self.limits)
            .and_then(|img| DecodedRaster::from_dynamic(normalize(img)))
            .map_err(|source| StripError::Decode {
                format: FormatKind::Jpeg,
                source,
            })
    }

    /// `quality` is clamped to `1..=100`.
    fn encode(&self, raster: &DecodedRaster, quality: u8) -> Result<Vec<u8>> {
        let layout = raster.layout();
        if !matches!(layout, PixelLayout::L8 | PixelLayout::Rgb8) {
            return Err(StripError::Encode {
                format: FormatKind::Jpeg,
                source: ImageError::Unsupported(UnsupportedError::from_format_and_kind(
                    ImageFormatHint::Exact(image::ImageFormat::Jpeg),
                    UnsupportedErrorKind::Color(layout.color_type().into()),
                )),
            });
        }

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
            .encode(
                raster.pixels(),
                raster.width(),
                raster.height(),
                layout.color_type(),
            )
            .map_err(|source| StripError::Encode {
                format: FormatKind::Jpeg,
                source,
            })?;

        Ok(out)
    }
}

/// Collapse whatever the JPEG decoder produced to L8 or Rgb8.
fn normalize(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLuma8(img.to_luma8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
