//! Finite difference Jacobian computation.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Compute the Jacobian by forward finite differences.
///
/// For each column j, perturbs x[j] by a relative step and computes
/// `(f(x + e_j dx) - f(x)) / dx`. Columns are independent and evaluated in
/// parallel; the residual function must be pure for this to be sound.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>> + Sync,
{
    let n = x.len();
    let f_x = f(x)?;
    let m = f_x.len();

    let columns: Vec<DVector<f64>> = (0..n)
        .into_par_iter()
        .map(|j| {
            let mut x_perturbed = x.clone();
            let dx = epsilon * x[j].abs().max(1.0);
            x_perturbed[j] += dx;

            let f_perturbed = f(&x_perturbed)?;
            Ok((f_perturbed - &f_x) / dx)
        })
        .collect::<SolverResult<_>>()?;

    let mut jac = DMatrix::zeros(m, n);
    for (j, col) in columns.iter().enumerate() {
        jac.set_column(j, col);
    }
    Ok(jac)
}

/// Compute the Jacobian by central finite differences (more accurate, 2x cost).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>> + Sync,
{
    let n = x.len();
    let f_x = f(x)?;
    let m = f_x.len();

    let columns: Vec<DVector<f64>> = (0..n)
        .into_par_iter()
        .map(|j| {
            let dx = epsilon * x[j].abs().max(1.0);

            let mut x_plus = x.clone();
            x_plus[j] += dx;
            let f_plus = f(&x_plus)?;

            let mut x_minus = x.clone();
            x_minus[j] -= dx;
            let f_minus = f(&x_minus)?;

            Ok((f_plus - f_minus) / (2.0 * dx))
        })
        .collect::<SolverResult<_>>()?;

    let mut jac = DMatrix::zeros(m, n);
    for (j, col) in columns.iter().enumerate() {
        jac.set_column(j, col);
    }
    Ok(jac)
}

/// Guard against a residual evaluation that slipped a non-finite value past
/// the model layer.
pub(crate) fn ensure_finite_vector(v: &DVector<f64>, what: &str) -> SolverResult<()> {
    if v.iter().any(|e| !e.is_finite()) {
        return Err(SolverError::Numeric {
            what: format!("non-finite entry in {what}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, 2.0 * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_quadratic() {
        // f(x) = x^2, J = 2*x
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0]))
        };

        let x = DVector::from_element(1, 3.0);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 6.0).abs() < 1e-5);
    }

    #[test]
    fn central_difference_is_more_accurate() {
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0].powi(3)))
        };
        let x = DVector::from_element(1, 2.0);

        let fwd = finite_difference_jacobian(&x, f, 1e-5).unwrap();
        let ctr = central_difference_jacobian(&x, f, 1e-5).unwrap();
        let exact = 12.0;

        assert!((ctr[(0, 0)] - exact).abs() <= (fwd[(0, 0)] - exact).abs());
    }

    #[test]
    fn two_by_two_coupled_system() {
        // f = [x0 + 2 x1, x0 * x1]
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![x[0] + 2.0 * x[1], x[0] * x[1]]))
        };
        let x = DVector::from_vec(vec![3.0, 5.0]);
        let jac = finite_difference_jacobian(&x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 1.0).abs() < 1e-5);
        assert!((jac[(0, 1)] - 2.0).abs() < 1e-5);
        assert!((jac[(1, 0)] - 5.0).abs() < 1e-4);
        assert!((jac[(1, 1)] - 3.0).abs() < 1e-4);
    }
}
