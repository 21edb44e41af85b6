//! Error types for discovery and selection

use dev_detect::DetectError;
use thiserror::Error;

/// A discovery cycle failed as a whole
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// One of the transport listings (or serial-number lookup) failed
    #[error("Unable to load devices: {0}")]
    Detect(#[from] DetectError),
}

/// Errors talking to the selector actor
#[derive(Debug, Error)]
pub enum SelectorError {
    /// The actor task has stopped
    #[error("device selector is not running")]
    Closed,
}
