//! Closed-form thermodynamic correlations over the species constant table.
//!
//! All functions are pure and deterministic: same inputs give bit-identical
//! outputs, so the residual function may call them repeatedly without any
//! caching concerns. Temperatures are in degC throughout.

use crate::species::SpeciesData;
use vam_core::Real;

/// Vapor heat capacity [Btu/(lb-mol degC)]: `(a + b T) MW`.
#[inline]
pub fn vapor_heat_capacity(t: Real, sp: &SpeciesData) -> Real {
    (sp.cpv_a + sp.cpv_b * t) * sp.mw
}

/// Liquid heat capacity [Btu/(lb-mol degC)]: `(a_liq + b_liq T) MW`.
#[inline]
pub fn liquid_heat_capacity(t: Real, sp: &SpeciesData) -> Real {
    (sp.cpl_a + sp.cpl_b * t) * sp.mw
}

/// Vapor molar enthalpy [Btu/lb-mol]: `(a T + b T^2 / 2) MW + h_ref`.
///
/// The liquid at 0 degC is the enthalpy datum, so `vapor_enthalpy(0, sp)`
/// equals the tabulated vapor-liquid offset `h_ref`.
#[inline]
pub fn vapor_enthalpy(t: Real, sp: &SpeciesData) -> Real {
    (sp.cpv_a * t + 0.5 * sp.cpv_b * t * t) * sp.mw + sp.h_ref
}

/// Liquid molar enthalpy [Btu/lb-mol]: `(a_liq T + b_liq T^2 / 2) MW`.
#[inline]
pub fn liquid_enthalpy(t: Real, sp: &SpeciesData) -> Real {
    (sp.cpl_a * t + 0.5 * sp.cpl_b * t * t) * sp.mw
}

/// Antoine vapor pressure [psia]: `exp(B / (T + C) + A)`.
///
/// The pole at `T + C = 0` is physically far outside the correlation's fit
/// range; callers keep trial temperatures away from it. The raw value is
/// returned (non-finite at the pole), and the residual layer rejects any
/// non-finite result it produces.
#[inline]
pub fn saturation_pressure(t: Real, sp: &SpeciesData) -> Real {
    (sp.antoine_b / (t + sp.antoine_c) + sp.antoine_a).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use approx::assert_relative_eq;

    #[test]
    fn liquid_heat_capacity_intercept() {
        for species in Species::ALL {
            let sp = species.data();
            assert_eq!(liquid_heat_capacity(0.0, sp), sp.cpl_a * sp.mw);
        }
    }

    #[test]
    fn vapor_enthalpy_intercept_is_reference_offset() {
        for species in Species::ALL {
            let sp = species.data();
            assert_eq!(vapor_enthalpy(0.0, sp), sp.h_ref);
        }
    }

    #[test]
    fn liquid_enthalpy_vanishes_at_datum() {
        for species in Species::ALL {
            assert_eq!(liquid_enthalpy(0.0, species.data()), 0.0);
        }
    }

    #[test]
    fn water_saturation_pressure_at_100c() {
        // exp(-3984.92 / 333.426 + 14.6394), about one atmosphere in psia
        let expected = (-3984.92_f64 / 333.426 + 14.6394).exp();
        let p = saturation_pressure(100.0, Species::H2O.data());
        assert_relative_eq!(p, expected, max_relative = 1e-12);
        assert_relative_eq!(p, 14.7017, max_relative = 1e-4);
    }

    #[test]
    fn condensables_boil_near_one_atmosphere() {
        let cases = [(Species::VAc, 72.7), (Species::HAc, 117.9), (Species::H2O, 100.0)];
        for (species, bp) in cases {
            let p = saturation_pressure(bp, species.data());
            assert_relative_eq!(p, 14.696, max_relative = 1e-2);
        }
    }

    #[test]
    fn correlations_are_referentially_transparent() {
        let sp = Species::VAc.data();
        let a = saturation_pressure(130.0, sp);
        let b = saturation_pressure(130.0, sp);
        assert_eq!(a.to_bits(), b.to_bits());
        assert_eq!(
            vapor_enthalpy(130.0, sp).to_bits(),
            vapor_enthalpy(130.0, sp).to_bits()
        );
    }
}
