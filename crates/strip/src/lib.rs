//! Metadata stripping for FoodShare image uploads.
//!
//! This crate provides:
//! - Format sniffing from magic bytes, with a declared MIME type as fallback
//! - PNG and JPEG codecs that decode to bare pixels and re-encode from scratch
//! - The strip pipeline that removes EXIF, IPTC, XMP and C2PA records
//! - Attachment filename sanitization
//! - A read-only scan that lists metadata chunks and segments
//! - Batch stripping, parallel with the `parallel` feature
//!
//! # Example
//!
//! ```rust,no_run
//! use foodshare_strip::{strip_metadata, ImageBytes, StripError};
//!
//! let upload = std::fs::read("upload.png").unwrap();
//! let input = ImageBytes::new(upload)
//!     .with_mime_hint("image/png")
//!     .with_filename("upload.png");
//!
//! match strip_metadata(input) {
//!     Ok(output) => std::fs::write(&output.filename, &output.bytes).unwrap(),
//!     Err(err @ StripError::UnsupportedFormat { .. }) => eprintln!("rejected: {err}"),
//!     Err(err) => eprintln!("failed: {err}"),
//! }
//! ```

#![warn(missing_docs)]

mod batch;
pub mod codec;
mod detect;
mod error;
mod filename;
pub mod inspect;
mod pipeline;
mod raster;

pub use batch::strip_batch;
pub use codec::{codec_for, Codec, DecodeLimits, JpegCodec, PngCodec, DEFAULT_JPEG_QUALITY};
pub use detect::{classify, FormatKind};
pub use error::{ErrorKind, ErrorReport, Result, StripError};
pub use filename::{sanitize_filename, suggested_filename, CLEANED_PREFIX};
pub use inspect::{inspect, MetadataReport, Segment, SegmentKind};
pub use pipeline::{
    strip_metadata, strip_metadata_with, EncodedOutput, ImageBytes, OutputSummary, StripOptions,
};
pub use raster::{DecodedRaster, PixelLayout};
