//! Error types for GhostFrame

use crate::color::Adjustment;
use crate::types::PixelFormat;
use thiserror::Error;

/// Result type alias for GhostFrame operations
pub type Result<T> = std::result::Result<T, Error>;

/// GhostFrame error type
#[derive(Error, Debug)]
pub enum Error {
    // Geometry errors
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Degenerate mapping: {0}")]
    DegenerateMapping(String),

    // Capability negotiation
    #[error("Pixel format not supported: {0:?}")]
    UnsupportedFormat(PixelFormat),

    #[error("{kind} adjustment not supported: {value}")]
    UnsupportedAdjustment { kind: Adjustment, value: f64 },

    // Collaborator errors
    #[error("Frame buffer resize to {width}x{height} failed: {reason}")]
    FrameResize {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("Filter '{name}' failed: {reason}")]
    Filter { name: String, reason: String },

    // General errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check if this is an expected capability negotiation failure
    pub fn is_capability_failure(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedFormat(_) | Error::UnsupportedAdjustment { .. }
        )
    }

    /// Check if this error comes from size/ratio preconditions
    pub fn is_geometry_issue(&self) -> bool {
        matches!(
            self,
            Error::InvalidGeometry(_) | Error::DegenerateMapping(_)
        )
    }

    /// Shorthand for filter stage failures
    pub fn filter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Filter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
