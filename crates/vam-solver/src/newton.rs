//! Damped Newton iteration with backtracking line search.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::ensure_finite_vector;
use nalgebra::{DMatrix, DVector};
use tracing::debug;

/// Newton solver configuration.
pub struct NewtonConfig {
    /// Maximum iterations
    pub max_iterations: usize,
    /// Absolute tolerance for residual norm
    pub abs_tol: f64,
    /// Relative tolerance for residual norm
    pub rel_tol: f64,
    /// Line search backtracking factor
    pub line_search_beta: f64,
    /// Maximum line search iterations
    pub max_line_search_iters: usize,
    /// Relative perturbation for the finite-difference Jacobian
    pub jacobian_epsilon: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            abs_tol: 1e-9,
            rel_tol: 1e-12,
            line_search_beta: 0.5,
            max_line_search_iters: 25,
            jacobian_epsilon: 1e-7,
        }
    }
}

/// Newton iteration result.
#[derive(Debug)]
pub struct NewtonResult {
    /// Solution vector
    pub x: DVector<f64>,
    /// Final residual norm
    pub residual_norm: f64,
    /// Number of iterations
    pub iterations: usize,
    /// Converged flag
    pub converged: bool,
}

/// Newton solver with backtracking line search.
///
/// Each step solves `J dx = -r` by LU factorization and backtracks the step
/// until the residual norm decreases and the trial iterate is finite. The
/// residual function is free to reject an unphysical iterate with an error;
/// during the line search such a rejection is treated as "step too long" and
/// backtracked over instead of aborting the solve.
pub fn newton_solve<F, J>(
    x0: DVector<f64>,
    residual_fn: F,
    jacobian_fn: J,
    config: &NewtonConfig,
) -> SolverResult<NewtonResult>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
    J: Fn(&DVector<f64>) -> SolverResult<DMatrix<f64>>,
{
    let mut x = x0;
    let mut r = residual_fn(&x)?;
    ensure_finite_vector(&r, "initial residual")?;
    let mut r_norm = r.norm();
    let r0_norm = r_norm;

    for iter in 0..config.max_iterations {
        if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
            debug!(iterations = iter, residual_norm = r_norm, "converged");
            return Ok(NewtonResult {
                x,
                residual_norm: r_norm,
                iterations: iter,
                converged: true,
            });
        }

        let jac = jacobian_fn(&x)?;

        // Solve J * dx = -r
        let dx = jac
            .lu()
            .solve(&(-r.clone()))
            .ok_or(SolverError::SingularJacobian { iteration: iter })?;

        // Backtracking line search. A residual evaluation that errors out
        // (e.g. a trial temperature below absolute zero) counts as a failed
        // trial, same as a norm increase.
        let mut alpha = 1.0;
        let mut accepted = None;
        for _ in 0..=config.max_line_search_iters {
            let x_new = &x + alpha * &dx;
            match residual_fn(&x_new) {
                Ok(r_new) if r_new.iter().all(|e| e.is_finite()) => {
                    let r_new_norm = r_new.norm();
                    if r_new_norm < r_norm {
                        accepted = Some((x_new, r_new, r_new_norm));
                        break;
                    }
                }
                Ok(_) | Err(SolverError::Model(_)) => {}
                Err(other) => return Err(other),
            }
            alpha *= config.line_search_beta;
        }

        let Some((x_new, r_new, r_new_norm)) = accepted else {
            return Err(SolverError::ConvergenceFailed {
                what: format!("line search stagnated at iteration {iter}"),
                residual_norm: r_norm,
                iterations: iter,
            });
        };

        debug!(
            iteration = iter,
            residual_norm = r_new_norm,
            step = alpha,
            "newton step"
        );

        x = x_new;
        r = r_new;
        r_norm = r_new_norm;
    }

    if r_norm < config.abs_tol || r_norm < config.rel_tol * r0_norm {
        return Ok(NewtonResult {
            x,
            residual_norm: r_norm,
            iterations: config.max_iterations,
            converged: true,
        });
    }

    Err(SolverError::ConvergenceFailed {
        what: "iteration limit reached".to_string(),
        residual_norm: r_norm,
        iterations: config.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn simple_quadratic() {
        // Solve x^2 - 4 = 0 from x0 = 3
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] - 4.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 3.0);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.x[0], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn coupled_two_by_two() {
        // x0 + x1 = 3, x0 * x1 = 2 -> (1, 2) from a nearby start
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![
                x[0] + x[1] - 3.0,
                x[0] * x[1] - 2.0,
            ]))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_row_slice(2, 2, &[1.0, 1.0, x[1], x[0]]))
        };

        let x0 = DVector::from_vec(vec![0.5, 2.5]);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.x[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(result.x[1], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn singular_jacobian_is_reported() {
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] + 1.0))
        };
        let jacobian =
            |_: &DVector<f64>| -> SolverResult<DMatrix<f64>> { Ok(DMatrix::zeros(1, 1)) };

        let x0 = DVector::from_element(1, 5.0);
        let err = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap_err();
        assert!(matches!(err, SolverError::SingularJacobian { iteration: 0 }));
    }

    #[test]
    fn iteration_limit_reports_last_norm() {
        // x^2 + 1 = 0 has no real root; the solve must fail with the norm
        // and count attached.
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] + 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let config = NewtonConfig {
            max_iterations: 5,
            ..NewtonConfig::default()
        };
        let x0 = DVector::from_element(1, 3.0);
        let err = newton_solve(x0, residual, jacobian, &config).unwrap_err();
        match err {
            SolverError::ConvergenceFailed {
                residual_norm,
                iterations,
                ..
            } => {
                assert!(residual_norm >= 1.0);
                assert!(iterations <= 5);
            }
            other => panic!("expected ConvergenceFailed, got {other}"),
        }
    }

    #[test]
    fn line_search_backtracks_over_model_rejections() {
        // The residual refuses x > 3; the full step from 0.1 on x^2 - 1 = 0
        // lands at ~ 5.05, so the line search has to shorten it.
        let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            if x[0] > 3.0 {
                return Err(SolverError::Model(
                    vam_flowsheet::FlowsheetError::Setup {
                        what: "trial state out of range",
                    },
                ));
            }
            Ok(DVector::from_element(1, x[0] * x[0] - 1.0))
        };
        let jacobian = |x: &DVector<f64>| -> SolverResult<DMatrix<f64>> {
            Ok(DMatrix::from_element(1, 1, 2.0 * x[0]))
        };

        let x0 = DVector::from_element(1, 0.1);
        let result = newton_solve(x0, residual, jacobian, &NewtonConfig::default()).unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.x[0], 1.0, epsilon = 1e-8);
    }
}
