//! The closed species set of the vinyl-acetate process and its constant table.
//!
//! Seven components circulate in the flowsheet: the permanent gases (O2, CO2,
//! C2H4, C2H6) and the condensables (VAc, H2O, HAc). The constant table is
//! fixed at compile time; unknown ids are rejected at the string boundary.

use crate::error::{PropsError, PropsResult};
use vam_core::Real;

/// Number of species in the fixed set.
pub const N_SPECIES: usize = 7;

/// Chemical species of the vinyl-acetate flowsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Oxygen (O₂)
    O2,
    /// Carbon dioxide (CO₂)
    Co2,
    /// Ethylene (C₂H₄)
    C2H4,
    /// Ethane (C₂H₆)
    C2H6,
    /// Vinyl acetate monomer
    VAc,
    /// Water (H₂O)
    H2O,
    /// Acetic acid
    HAc,
}

/// Physical constants for one species.
///
/// Units follow the benchmark correlations: temperatures in degC, pressures
/// in psia, heat capacities in Btu/(lb degC), enthalpies in Btu/lb-mol and
/// molar volumes in ft^3/lb-mol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeciesData {
    /// Molecular weight [lb/lb-mol]
    pub mw: Real,
    /// Specific gravity (liquid, water = 1)
    pub sp_gr: Real,
    /// Reference vapor-liquid enthalpy offset at 0 degC [Btu/lb-mol]
    pub h_ref: Real,
    /// Vapor heat capacity, linear coefficient a [Btu/(lb degC)]
    pub cpv_a: Real,
    /// Vapor heat capacity, linear coefficient b [Btu/(lb degC^2)]
    pub cpv_b: Real,
    /// Liquid heat capacity, linear coefficient a [Btu/(lb degC)]
    pub cpl_a: Real,
    /// Liquid heat capacity, linear coefficient b [Btu/(lb degC^2)]
    pub cpl_b: Real,
    /// Molar liquid volume [ft^3/lb-mol]
    pub molar_volume: Real,
    /// Antoine A (psat in psia, T in degC)
    pub antoine_a: Real,
    /// Antoine B
    pub antoine_b: Real,
    /// Antoine C
    pub antoine_c: Real,
}

impl Species {
    pub const ALL: [Species; N_SPECIES] = [
        Species::O2,
        Species::Co2,
        Species::C2H4,
        Species::C2H6,
        Species::VAc,
        Species::H2O,
        Species::HAc,
    ];

    /// Dense index into per-species arrays; matches the order of [`Species::ALL`].
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Species::O2 => 0,
            Species::Co2 => 1,
            Species::C2H4 => 2,
            Species::C2H6 => 3,
            Species::VAc => 4,
            Species::H2O => 5,
            Species::HAc => 6,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Species::O2 => "O2",
            Species::Co2 => "CO2",
            Species::C2H4 => "C2H4",
            Species::C2H6 => "C2H6",
            Species::VAc => "VAc",
            Species::H2O => "H2O",
            Species::HAc => "HAc",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::O2 => "Oxygen",
            Species::Co2 => "Carbon Dioxide",
            Species::C2H4 => "Ethylene",
            Species::C2H6 => "Ethane",
            Species::VAc => "Vinyl Acetate",
            Species::H2O => "Water",
            Species::HAc => "Acetic Acid",
        }
    }

    /// Whether the species is a permanent gas in the operating window
    /// (no liquid-phase interaction energies are tabulated for these).
    pub fn is_permanent_gas(&self) -> bool {
        matches!(
            self,
            Species::O2 | Species::Co2 | Species::C2H4 | Species::C2H6
        )
    }

    /// Physical constants for this species. Total over the enum.
    pub fn data(&self) -> &'static SpeciesData {
        &TABLE[self.index()]
    }

    /// Lookup by string id; fails for ids outside the fixed set.
    pub fn lookup(id: &str) -> PropsResult<Species> {
        Species::ALL
            .iter()
            .copied()
            .find(|s| s.key().eq_ignore_ascii_case(id.trim()))
            .ok_or_else(|| PropsError::UnknownSpecies { id: id.to_string() })
    }
}

impl std::str::FromStr for Species {
    type Err = PropsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::lookup(s)
    }
}

impl std::fmt::Display for Species {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

// Antoine rows for the light gases are fit to the normal boiling points in
// the same psia/degC form as the condensables; the operating window never
// approaches their poles (T + C = 0).
const TABLE: [SpeciesData; N_SPECIES] = [
    // O2
    SpeciesData {
        mw: 32.00,
        sp_gr: 0.50,
        h_ref: 2300.0,
        cpv_a: 0.218,
        cpv_b: 0.0001,
        cpl_a: 0.30,
        cpl_b: 0.0,
        molar_volume: 1.0251,
        antoine_a: 11.4322,
        antoine_b: -734.55,
        antoine_c: 267.0,
    },
    // CO2
    SpeciesData {
        mw: 44.01,
        sp_gr: 1.18,
        h_ref: 2429.0,
        cpv_a: 0.230,
        cpv_b: 0.0001,
        cpl_a: 0.60,
        cpl_b: 0.0,
        molar_volume: 0.5974,
        antoine_a: 12.8638,
        antoine_b: -1979.28,
        antoine_c: 273.0,
    },
    // C2H4
    SpeciesData {
        mw: 28.05,
        sp_gr: 0.57,
        h_ref: 1260.0,
        cpv_a: 0.370,
        cpv_b: 0.0007,
        cpl_a: 0.60,
        cpl_b: 0.0,
        molar_volume: 0.7883,
        antoine_a: 10.6238,
        antoine_b: -1347.01,
        antoine_c: 273.43,
    },
    // C2H6
    SpeciesData {
        mw: 30.07,
        sp_gr: 0.57,
        h_ref: 1260.0,
        cpv_a: 0.370,
        cpv_b: 0.0007,
        cpl_a: 0.60,
        cpl_b: 0.0,
        molar_volume: 0.8450,
        antoine_a: 11.1597,
        antoine_b: -1511.42,
        antoine_c: 267.0,
    },
    // VAc
    SpeciesData {
        mw: 86.09,
        sp_gr: 0.85,
        h_ref: 8600.0,
        cpv_a: 0.290,
        cpv_b: 0.0006,
        cpl_a: 0.44,
        cpl_b: 0.0011,
        molar_volume: 1.6223,
        antoine_a: 12.6570,
        antoine_b: -2984.45,
        antoine_c: 226.66,
    },
    // H2O
    SpeciesData {
        mw: 18.02,
        sp_gr: 1.00,
        h_ref: 10684.0,
        cpv_a: 0.440,
        cpv_b: 0.0002,
        cpl_a: 0.99,
        cpl_b: 0.0002,
        molar_volume: 0.2886,
        antoine_a: 14.6394,
        antoine_b: -3984.92,
        antoine_c: 233.426,
    },
    // HAc
    SpeciesData {
        mw: 60.05,
        sp_gr: 0.98,
        h_ref: 5486.0,
        cpv_a: 0.310,
        cpv_b: 0.0008,
        cpl_a: 0.46,
        cpl_b: 0.0012,
        molar_volume: 0.9815,
        antoine_a: 13.7992,
        antoine_b: -3654.62,
        antoine_c: 211.0,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_all_order() {
        for (i, species) in Species::ALL.iter().enumerate() {
            assert_eq!(species.index(), i);
        }
    }

    #[test]
    fn lookup_known_ids() {
        assert_eq!(Species::lookup("VAc").unwrap(), Species::VAc);
        assert_eq!(Species::lookup("co2").unwrap(), Species::Co2);
        assert_eq!(" H2O ".parse::<Species>().unwrap(), Species::H2O);
    }

    #[test]
    fn lookup_unknown_id_fails() {
        let err = Species::lookup("CH4").unwrap_err();
        assert!(matches!(err, PropsError::UnknownSpecies { id } if id == "CH4"));
    }

    #[test]
    fn water_antoine_row_is_pinned() {
        let data = Species::H2O.data();
        assert_eq!(data.antoine_a, 14.6394);
        assert_eq!(data.antoine_b, -3984.92);
        assert_eq!(data.antoine_c, 233.426);
    }

    #[test]
    fn permanent_gas_classification() {
        assert!(Species::O2.is_permanent_gas());
        assert!(Species::C2H6.is_permanent_gas());
        assert!(!Species::VAc.is_permanent_gas());
        assert!(!Species::HAc.is_permanent_gas());
    }

    #[test]
    fn molar_volumes_consistent_with_density() {
        // v = MW / (62.43 * sp.gr) within the table's rounding
        for species in Species::ALL {
            let d = species.data();
            let v = d.mw / (62.43 * d.sp_gr);
            assert!((v - d.molar_volume).abs() < 1e-3, "{species}");
        }
    }
}
