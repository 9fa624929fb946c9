// vam-core/src/units.rs
//
// The benchmark correlations are fit in mixed engineering units: temperatures
// in degrees Celsius, pressures in psia, molar enthalpies in Btu/lb-mol.
// These helpers keep conversions in one place.

use crate::numeric::Real;

/// Offset between the Celsius and Kelvin scales.
pub const CELSIUS_TO_KELVIN: Real = 273.15;

/// Absolute temperature [K] from the model's working temperature [degC].
#[inline]
pub fn kelvin(t_celsius: Real) -> Real {
    t_celsius + CELSIUS_TO_KELVIN
}

/// Working temperature [degC] from absolute temperature [K].
#[inline]
pub fn celsius(t_kelvin: Real) -> Real {
    t_kelvin - CELSIUS_TO_KELVIN
}

pub mod constants {
    use super::Real;

    /// Gas constant in the Wilson-energy basis [cal/(mol K)].
    pub const R_CAL: Real = 1.987;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_conversions_invert() {
        assert_eq!(kelvin(0.0), 273.15);
        assert_eq!(celsius(kelvin(127.3)), 127.3);
    }
}
