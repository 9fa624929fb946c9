//! Newton-based root-finder for the steady-state flowsheet model.
//!
//! The model side exposes an initial guess and a residual function; this
//! crate owns the iteration. The Jacobian is built column by column from
//! finite differences of the residual, in parallel.

pub mod error;
pub mod jacobian;
pub mod newton;

pub use error::{SolverError, SolverResult};
pub use jacobian::{central_difference_jacobian, finite_difference_jacobian};
pub use newton::{NewtonConfig, NewtonResult, newton_solve};

use nalgebra::DVector;
use tracing::info;
use vam_flowsheet::Flowsheet;

/// Solve a flowsheet for its steady state, starting from its own initial
/// guess.
pub fn solve(sheet: &Flowsheet, config: &NewtonConfig) -> SolverResult<NewtonResult> {
    solve_from(sheet, sheet.initial_guess(), config)
}

/// Solve a flowsheet starting from a caller-supplied state vector.
pub fn solve_from(
    sheet: &Flowsheet,
    x0: DVector<f64>,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult> {
    let residual = |x: &DVector<f64>| sheet.residual(x).map_err(SolverError::from);
    let jacobian =
        |x: &DVector<f64>| finite_difference_jacobian(x, residual, config.jacobian_epsilon);

    let result = newton_solve(x0, residual, jacobian, config)?;
    info!(
        iterations = result.iterations,
        residual_norm = result.residual_norm,
        "steady state solve finished"
    );
    Ok(result)
}
