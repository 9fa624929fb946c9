//! Property-model errors.

use thiserror::Error;
use vam_core::CoreError;

/// Result type for property calculations.
pub type PropsResult<T> = Result<T, PropsError>;

/// Errors that can occur during property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropsError {
    /// Lookup of a species id outside the fixed seven-component set.
    #[error("Unknown species id: {id}")]
    UnknownSpecies { id: String },

    /// A composition or molar volume breaks the Wilson sums
    /// (log of zero or division by zero).
    #[error("Degenerate composition: {what}")]
    DegenerateComposition { what: &'static str },

    /// Non-physical input (negative absolute temperature, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument (length mismatch between species list and fractions).
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<PropsError> for CoreError {
    fn from(err: PropsError) -> Self {
        match err {
            PropsError::UnknownSpecies { .. } => CoreError::InvalidArg { what: "species id" },
            PropsError::DegenerateComposition { what } => CoreError::Invariant { what },
            PropsError::NonPhysical { what } => CoreError::Invariant { what },
            PropsError::InvalidArg { what } => CoreError::InvalidArg { what },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PropsError::UnknownSpecies { id: "CH4".into() };
        assert!(err.to_string().contains("CH4"));

        let err = PropsError::DegenerateComposition {
            what: "zero row sum",
        };
        assert!(err.to_string().contains("zero row sum"));
    }

    #[test]
    fn error_to_core_error() {
        let props_err = PropsError::NonPhysical {
            what: "absolute temperature",
        };
        let core_err: CoreError = props_err.into();
        assert!(matches!(core_err, CoreError::Invariant { .. }));
    }
}
