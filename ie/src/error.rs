//! Error types for the scanning engine.

use thiserror::Error;

/// Input rejected before any scanning takes place.
///
/// A scan that simply finds nothing is not an error; it is reported through
/// [`crate::ScanReport::matched`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("target sequence is empty")]
    NoTargets,

    #[error("cue {0:?} not found")]
    UnknownCue(String),
}

/// Result type alias for scanning operations
pub type Result<T> = std::result::Result<T, ScanError>;
