//! Shared error type for the numeric foundation.

use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Low-level numeric failures surfaced by the foundation helpers.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A computed scalar came out NaN or infinite.
    #[error("Non-finite value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },
}
