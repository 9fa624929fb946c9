//! Error types for flowsheet setup and residual evaluation.

use crate::streams::StreamId;
use thiserror::Error;
use vam_core::CoreError;
use vam_props::PropsError;

/// Errors that can occur building or evaluating the flowsheet model.
#[derive(Error, Debug)]
pub enum FlowsheetError {
    /// The fixed flow network produced a negative molar flow for the given
    /// feed/purge specification. Surfaced at setup time, before any solver
    /// iteration.
    #[error("Infeasible topology: stream {stream} has negative flow {flow}")]
    InfeasibleTopology { stream: StreamId, flow: f64 },

    /// A candidate state produced a NaN or infinite residual entry,
    /// typically from the Antoine pole or a non-positive absolute
    /// temperature.
    #[error("Non-finite residual at equation {index} ({what})")]
    NonFiniteResidual { index: usize, what: &'static str },

    /// Vector handed to unflatten/residual has the wrong length.
    #[error("State vector dimension mismatch: expected {expected}, got {got}")]
    Dimension { expected: usize, got: usize },

    /// Problem specification error (bad operating spec value).
    #[error("Problem setup error: {what}")]
    Setup { what: &'static str },

    /// Property-model failure (unknown species, degenerate composition).
    #[error("Property error: {0}")]
    Props(#[from] PropsError),

    /// Core numeric failure.
    #[error("Numeric error: {0}")]
    Core(#[from] CoreError),
}

pub type FlowsheetResult<T> = Result<T, FlowsheetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infeasible_topology_names_the_stream() {
        let err = FlowsheetError::InfeasibleTopology {
            stream: StreamId::S34,
            flow: -0.25,
        };
        let msg = err.to_string();
        assert!(msg.contains("S34"));
        assert!(msg.contains("-0.25"));
    }

    #[test]
    fn props_error_converts() {
        let err: FlowsheetError = PropsError::DegenerateComposition { what: "x" }.into();
        assert!(matches!(err, FlowsheetError::Props(_)));
    }
}
