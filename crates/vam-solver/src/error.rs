//! Error types for solver operations.

use thiserror::Error;
use vam_flowsheet::FlowsheetError;

/// Errors that can occur while solving for the steady state.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The iteration limit was reached or the line search stagnated.
    /// Carries the last residual norm and iteration count so a failed solve
    /// is reported as non-convergence, not an unstructured error.
    #[error(
        "Convergence failed after {iterations} iterations (residual norm {residual_norm}): {what}"
    )]
    ConvergenceFailed {
        what: String,
        residual_norm: f64,
        iterations: usize,
    },

    /// The Jacobian solve failed (singular or badly scaled matrix).
    #[error("Singular Jacobian at iteration {iteration}")]
    SingularJacobian { iteration: usize },

    /// The model rejected a trial state.
    #[error("Model error: {0}")]
    Model(#[from] FlowsheetError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_convergence_reports_norm_and_count() {
        let err = SolverError::ConvergenceFailed {
            what: "iteration limit".into(),
            residual_norm: 3.2e-4,
            iterations: 50,
        };
        let msg = err.to_string();
        assert!(msg.contains("50"));
        assert!(msg.contains("3.2e-4") || msg.contains("0.00032"));
    }
}
