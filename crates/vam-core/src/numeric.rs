//! Scalar helpers shared by the property and flowsheet crates.

use crate::error::{CoreError, CoreResult};

/// Floating point type used throughout the model.
pub type Real = f64;

/// Absolute/relative tolerance pair for float comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

/// Mixed comparison: the absolute branch handles values near zero, where a
/// purely relative test degenerates.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// Guard a computed scalar against NaN/infinity leaking further into the
/// model. The flow-network closure runs every derived stream flow through
/// this before accepting a feed specification.
pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Sum of a mole-fraction group; closure equations compare it against 1.
pub fn fraction_sum(x: &[Real]) -> Real {
    x.iter().copied().sum()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn nearly_equal_is_reflexive_and_symmetric(
            a in -1e6_f64..1e6_f64,
            b in -1e6_f64..1e6_f64,
        ) {
            let tol = Tolerances::default();
            prop_assert!(nearly_equal(a, a, tol));
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }

        #[test]
        fn normalized_fractions_sum_to_one(
            raw in prop::collection::vec(0.01_f64..1.0_f64, 1..8)
        ) {
            let total: Real = raw.iter().sum();
            let x: Vec<Real> = raw.iter().map(|v| v / total).collect();
            let tol = Tolerances::default();
            prop_assert!(nearly_equal(fraction_sum(&x), 1.0, tol));
        }

        #[test]
        fn finite_values_pass_the_guard(v in -1e300_f64..1e300_f64) {
            prop_assert_eq!(ensure_finite(v, "value").unwrap(), v);
        }
    }
}
