//! Watermark error types.
//!
//! Defines errors that can occur while producing a watermarked image.

use std::fmt;

/// Errors that can occur while producing a watermarked image.
///
/// `Fetch` and `Transform` never escape the resolution service; they are
/// absorbed into the fallback policy. `Config` can surface at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkError {
    /// Failed to fetch the origin image (non-2xx status or network failure)
    Fetch {
        /// HTTP status, when the origin answered at all
        status: Option<u16>,
        message: String,
    },

    /// The transform endpoint failed (non-2xx status or network failure)
    Transform {
        /// HTTP status, when the endpoint answered at all
        status: Option<u16>,
        message: String,
    },

    /// Invalid configuration
    Config(String),
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch {
                status: Some(code),
                message,
            } => write!(f, "Failed to fetch origin image ({code}): {message}"),
            Self::Fetch {
                status: None,
                message,
            } => write!(f, "Failed to fetch origin image: {message}"),
            Self::Transform {
                status: Some(code),
                message,
            } => write!(f, "Watermark transform failed ({code}): {message}"),
            Self::Transform {
                status: None,
                message,
            } => write!(f, "Watermark transform failed: {message}"),
            Self::Config(msg) => write!(f, "Watermark configuration error: {msg}"),
        }
    }
}

impl std::error::Error for WatermarkError {}
