//! Error types for control core operations.

use thiserror::Error;

/// Result type for control core operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur in control core operations.
///
/// Hardware unavailability is not represented here: transports fail soft
/// and their zero readings flow through as data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// A puff run is armed; the requested operation would violate the
    /// exclusivity contract.
    #[error("puff run in progress, command refused")]
    SequencerActive,

    /// A blocking puff run exceeded its deadline without completing.
    #[error("puff run exceeded its deadline after {elapsed_s:.1} s")]
    RunTimeout { elapsed_s: f64 },
}
