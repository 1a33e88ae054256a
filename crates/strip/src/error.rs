//! Error types for the strip crate.

use crate::FormatKind;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for strip operations.
pub type Result<T> = std::result::Result<T, StripError>;

/// Errors that can terminate a strip pipeline run.
///
/// Every variant is a deterministic function of the input, so none of them
/// are retried inside the crate.
#[derive(Debug, Error)]
pub enum StripError {
    /// No image bytes were supplied
    #[error("No image data provided")]
    MissingInput,

    /// Content sniffing could not classify the input
    #[error("Unsupported image format{}", declared_suffix(.declared))]
    UnsupportedFormat {
        /// The caller-declared content type, kept for diagnostics only
        declared: Option<String>,
    },

    /// The input claimed a supported format but failed to parse
    #[error("Failed to decode {format} image: {source}")]
    Decode {
        /// Format the sniffer selected
        format: FormatKind,
        /// Underlying decoder failure
        #[source]
        source: image::ImageError,
    },

    /// Re-encoding a decoded raster failed
    #[error("Failed to encode {format} image: {source}")]
    Encode {
        /// Target format
        format: FormatKind,
        /// Underlying encoder failure
        #[source]
        source: image::ImageError,
    },
}

fn declared_suffix(declared: &Option<String>) -> String {
    match declared {
        Some(mime) => format!(" (declared as {mime})"),
        None => String::new(),
    }
}

/// Who caused a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad or unsupported input; resubmitting the same bytes will fail again
    ClientInput,
    /// Unexpected failure inside the encoder
    Internal,
}

impl StripError {
    /// Classify the error as client-caused or internal.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StripError::MissingInput
            | StripError::UnsupportedFormat { .. }
            | StripError::Decode { .. } => ErrorKind::ClientInput,
            StripError::Encode { .. } => ErrorKind::Internal,
        }
    }

    /// Whether reporting upstream or retrying elsewhere could help.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            StripError::MissingInput => "missing_input",
            StripError::UnsupportedFormat { .. } => "unsupported_format",
            StripError::Decode { .. } => "decode_failed",
            StripError::Encode { .. } => "encode_failed",
        }
    }

    /// Convert to a serializable report.
    pub fn to_report(&self) -> ErrorReport {
        let source = match self {
            StripError::Decode { source, .. } | StripError::Encode { source, .. } => {
                Some(source.to_string())
            }
            _ => None,
        };

        ErrorReport {
            code: self.code(),
            kind: self.kind(),
            message: self.to_string(),
            source,
        }
    }
}

/// Serializable error report for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    /// Stable error code
    pub code: &'static str,
    /// Client or internal
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
    /// Underlying codec failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
