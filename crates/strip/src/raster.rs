//! Decoded pixel data.
//!
//! A [`DecodedRaster`] is dimensions, a pixel layout, and row-major bytes.
//! It has no slot for metadata, so nothing beyond pixels can cross from
//! decoder to encoder.

use image::error::{ParameterError, ParameterErrorKind};
use image::{ColorType, DynamicImage, ImageError};

/// Channel count, order and bit depth of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 8-bit grayscale
    L8,
    /// 8-bit grayscale with alpha
    La8,
    /// 8-bit RGB
    Rgb8,
    /// 8-bit RGBA
    Rgba8,
    /// 16-bit grayscale, native endian
    L16,
    /// 16-bit grayscale with alpha, native endian
    La16,
    /// 16-bit RGB, native endian
    Rgb16,
    /// 16-bit RGBA, native endian
    Rgba16,
}

impl PixelLayout {
    /// Number of channels per pixel.
    pub fn channels(&self) -> usize {
        match self {
            PixelLayout::L8 | PixelLayout::L16 => 1,
            PixelLayout::La8 | PixelLayout::La16 => 2,
            PixelLayout::Rgb8 | PixelLayout::Rgb16 => 3,
            PixelLayout::Rgba8 | PixelLayout::Rgba16 => 4,
        }
    }

    /// Bytes per channel sample.
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            PixelLayout::L8 | PixelLayout::La8 | PixelLayout::Rgb8 | PixelLayout::Rgba8 => 1,
            _ => 2,
        }
    }

    /// Bytes per pixel.
    pub fn bytes_per_pixel(&self) -> usize {
        self.channels() * self.bytes_per_sample()
    }

    /// Whether the layout carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        matches!(
            self,
            PixelLayout::La8 | PixelLayout::Rgba8 | PixelLayout::La16 | PixelLayout::Rgba16
        )
    }

    pub(crate) fn color_type(&self) -> ColorType {
        match self {
            PixelLayout::L8 => ColorType::L8,
            PixelLayout::La8 => ColorType::La8,
            PixelLayout::Rgb8 => ColorType::Rgb8,
            PixelLayout::Rgba8 => ColorType::Rgba8,
            PixelLayout::L16 => ColorType::L16,
            PixelLayout::La16 => ColorType::La16,
            PixelLayout::Rgb16 => ColorType::Rgb16,
            PixelLayout::Rgba16 => ColorType::Rgba16,
        }
    }
}

/// Pixels produced by a codec's decode step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRaster {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Vec<u8>,
}

impl DecodedRaster {
    /// Build a raster, checking the buffer matches the dimensions.
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        pixels: Vec<u8>,
    ) -> Result<Self, ImageError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(layout.bytes_per_pixel()));

        if width == 0 || height == 0 || expected != Some(pixels.len()) {
            return Err(ImageError::Parameter(ParameterError::from_kind(
                ParameterErrorKind::DimensionMismatch,
            )));
        }

        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Take the pixels out of a decoded image, keeping its sample layout.
    ///
    /// Layouts the encoders cannot write (32-bit float) are widened to
    /// 16-bit RGB(A).
    pub(crate) fn from_dynamic(img: DynamicImage) -> Result<Self, ImageError> {
        let (width, height) = (img.width(), img.height());

        let (layout, img) = match img {
            DynamicImage::ImageLuma8(_) => (PixelLayout::L8, img),
            DynamicImage::ImageLumaA8(_) => (PixelLayout::La8, img),
            DynamicImage::ImageRgb8(_) => (PixelLayout::Rgb8, img),
            DynamicImage::ImageRgba8(_) => (PixelLayout::Rgba8, img),
            DynamicImage::ImageLuma16(_) => (PixelLayout::L16, img),
            DynamicImage::ImageLumaA16(_) => (PixelLayout::La16, img),
            DynamicImage::ImageRgb16(_) => (PixelLayout::Rgb16, img),
            DynamicImage::ImageRgba16(_) => (PixelLayout::Rgba16, img),
            other if other.color().has_alpha() => {
                (PixelLayout::Rgba16, DynamicImage::ImageRgba16(other.to_rgba16()))
            }
            other => (PixelLayout::Rgb16, DynamicImage::ImageRgb16(other.to_rgb16())),
        };

        Self::new(width, height, layout, img.into_bytes())
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout.
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// Row-major pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}
