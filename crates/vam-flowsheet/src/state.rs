//! The structured unknown-state vector and its flat numeric image.
//!
//! Typed per-unit records compose into [`StateVec`]; `flatten`/`unflatten`
//! are an order-preserving bijection between the records and the
//! `DVector<f64>` the solver iterates on. The residual function emits its
//! equations in exactly this order, so residual indices line up with state
//! indices in convergence diagnostics.

use crate::error::{FlowsheetError, FlowsheetResult};
use nalgebra::DVector;
use vam_core::Real;
use vam_props::N_SPECIES;

/// Number of discretized reactor stages.
pub const NR_STAGES: usize = 10;

/// Number of absorber stages; the last one is the bottom (sump) stage.
pub const NA_STAGES: usize = 8;

/// Total state dimension.
pub const STATE_DIM: usize = VaporizerState::DIM
    + NR_STAGES * ReactorStage::DIM
    + ExchangerTemps::DIM
    + CondenserOutlet::DIM
    + SeparatorState::DIM
    + CompressorState::DIM
    + NA_STAGES * AbsorberStage::DIM
    + 1 // absorber bottom holdup
    + SurgeTankState::DIM;

/// Vaporizer drum: boiling HAc-rich liquid fed from the surge tank.
#[derive(Debug, Clone, PartialEq)]
pub struct VaporizerState {
    /// Liquid holdup [lb-mol]
    pub holdup: Real,
    /// Liquid temperature [degC]
    pub t: Real,
    /// Liquid mole fractions
    pub x: [Real; N_SPECIES],
}

impl VaporizerState {
    pub const DIM: usize = 2 + N_SPECIES;
}

/// One discretized stage of the tubular reactor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReactorStage {
    /// Stage temperature [degC]
    pub t: Real,
    /// Gas mole fractions
    pub z: [Real; N_SPECIES],
}

impl ReactorStage {
    pub const DIM: usize = 1 + N_SPECIES;
}

/// Auxiliary heat-exchanger temperatures [degC].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangerTemps {
    /// FEHE cold-side outlet (reactor inlet)
    pub fehe_cold_out: Real,
    /// FEHE hot-side outlet (condenser inlet)
    pub fehe_hot_out: Real,
    /// Wash-cooler outlet (absorber wash inlet)
    pub wash_cooler_out: Real,
}

impl ExchangerTemps {
    pub const DIM: usize = 3;
}

/// The partially condensing stream feeding the separator: its thermodynamic
/// state is part of the unknown vector.
#[derive(Debug, Clone, PartialEq)]
pub struct CondenserOutlet {
    /// Two-phase temperature [degC]
    pub t: Real,
    /// Molar vapor fraction
    pub vapor_fraction: Real,
    /// Liquid mole fractions
    pub x: [Real; N_SPECIES],
    /// Vapor mole fractions
    pub y: [Real; N_SPECIES],
}

impl CondenserOutlet {
    pub const DIM: usize = 2 + 2 * N_SPECIES;
}

/// Vapor-liquid separator drum.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparatorState {
    /// Liquid holdup [lb-mol]
    pub holdup: Real,
    /// Drum temperature [degC]
    pub t: Real,
    /// Drum pressure [psia]
    pub p: Real,
    /// Liquid mole fractions
    pub x: [Real; N_SPECIES],
    /// Vapor mole fractions
    pub y: [Real; N_SPECIES],
}

impl SeparatorState {
    pub const DIM: usize = 3 + 2 * N_SPECIES;
}

/// Recycle-gas compressor discharge state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorState {
    /// Discharge temperature [degC]
    pub t_discharge: Real,
    /// Discharge pressure [psia]
    pub p_discharge: Real,
}

impl CompressorState {
    pub const DIM: usize = 2;
}

/// One absorber stage (liquid phase; vapor follows from stage equilibrium).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AbsorberStage {
    /// Stage temperature [degC]
    pub t: Real,
    /// Liquid mole fractions
    pub x: [Real; N_SPECIES],
}

impl AbsorberStage {
    pub const DIM: usize = 1 + N_SPECIES;
}

/// Acetic-acid surge tank.
#[derive(Debug, Clone, PartialEq)]
pub struct SurgeTankState {
    /// Liquid holdup [lb-mol]
    pub holdup: Real,
    /// Liquid temperature [degC]
    pub t: Real,
    /// Liquid mole fractions
    pub x: [Real; N_SPECIES],
}

impl SurgeTankState {
    pub const DIM: usize = 2 + N_SPECIES;
}

/// The full unknown state of the flowsheet.
#[derive(Debug, Clone, PartialEq)]
pub struct StateVec {
    pub vaporizer: VaporizerState,
    pub reactor: [ReactorStage; NR_STAGES],
    pub exchangers: ExchangerTemps,
    pub condenser: CondenserOutlet,
    pub separator: SeparatorState,
    pub compressor: CompressorState,
    pub absorber: [AbsorberStage; NA_STAGES],
    /// Absorber bottom (sump) holdup [lb-mol]
    pub absorber_bottom_holdup: Real,
    pub surge: SurgeTankState,
}

impl StateVec {
    /// Flatten to the solver's numeric vector. The inverse is
    /// [`StateVec::unflatten`]; the pair is a bijection.
    pub fn flatten(&self) -> DVector<f64> {
        let mut v = Vec::with_capacity(STATE_DIM);

        v.push(self.vaporizer.holdup);
        v.push(self.vaporizer.t);
        v.extend_from_slice(&self.vaporizer.x);

        for stage in &self.reactor {
            v.push(stage.t);
            v.extend_from_slice(&stage.z);
        }

        v.push(self.exchangers.fehe_cold_out);
        v.push(self.exchangers.fehe_hot_out);
        v.push(self.exchangers.wash_cooler_out);

        v.push(self.condenser.t);
        v.push(self.condenser.vapor_fraction);
        v.extend_from_slice(&self.condenser.x);
        v.extend_from_slice(&self.condenser.y);

        v.push(self.separator.holdup);
        v.push(self.separator.t);
        v.push(self.separator.p);
        v.extend_from_slice(&self.separator.x);
        v.extend_from_slice(&self.separator.y);

        v.push(self.compressor.t_discharge);
        v.push(self.compressor.p_discharge);

        for stage in &self.absorber {
            v.push(stage.t);
            v.extend_from_slice(&stage.x);
        }
        v.push(self.absorber_bottom_holdup);

        v.push(self.surge.holdup);
        v.push(self.surge.t);
        v.extend_from_slice(&self.surge.x);

        debug_assert_eq!(v.len(), STATE_DIM);
        DVector::from_vec(v)
    }

    /// Rebuild the structured state from a flat vector.
    pub fn unflatten(v: &DVector<f64>) -> FlowsheetResult<StateVec> {
        if v.len() != STATE_DIM {
            return Err(FlowsheetError::Dimension {
                expected: STATE_DIM,
                got: v.len(),
            });
        }

        let mut cursor = Cursor { v, pos: 0 };

        let vaporizer = VaporizerState {
            holdup: cursor.scalar(),
            t: cursor.scalar(),
            x: cursor.fractions(),
        };

        let reactor = std::array::from_fn(|_| ReactorStage {
            t: cursor.scalar(),
            z: cursor.fractions(),
        });

        let exchangers = ExchangerTemps {
            fehe_cold_out: cursor.scalar(),
            fehe_hot_out: cursor.scalar(),
            wash_cooler_out: cursor.scalar(),
        };

        let condenser = CondenserOutlet {
            t: cursor.scalar(),
            vapor_fraction: cursor.scalar(),
            x: cursor.fractions(),
            y: cursor.fractions(),
        };

        let separator = SeparatorState {
            holdup: cursor.scalar(),
            t: cursor.scalar(),
            p: cursor.scalar(),
            x: cursor.fractions(),
            y: cursor.fractions(),
        };

        let compressor = CompressorState {
            t_discharge: cursor.scalar(),
            p_discharge: cursor.scalar(),
        };

        let absorber = std::array::from_fn(|_| AbsorberStage {
            t: cursor.scalar(),
            x: cursor.fractions(),
        });
        let absorber_bottom_holdup = cursor.scalar();

        let surge = SurgeTankState {
            holdup: cursor.scalar(),
            t: cursor.scalar(),
            x: cursor.fractions(),
        };

        debug_assert_eq!(cursor.pos, STATE_DIM);

        Ok(StateVec {
            vaporizer,
            reactor,
            exchangers,
            condenser,
            separator,
            compressor,
            absorber,
            absorber_bottom_holdup,
            surge,
        })
    }
}

struct Cursor<'a> {
    v: &'a DVector<f64>,
    pos: usize,
}

impl Cursor<'_> {
    fn scalar(&mut self) -> Real {
        let value = self.v[self.pos];
        self.pos += 1;
        value
    }

    fn fractions(&mut self) -> [Real; N_SPECIES] {
        std::array::from_fn(|_| self.scalar())
    }
}

/// Initial guess with every field populated.
///
/// Composition groups are physically consistent and sum to 1 exactly; the
/// holdups start on their setpoints and the temperature profile follows the
/// base-case operating point.
pub fn initial_state(op: &crate::params::OperatingSpec, vapor_fraction_guess: Real) -> StateVec {
    // order: O2, CO2, C2H4, C2H6, VAc, H2O, HAc
    let gas_loop = [0.075, 0.007, 0.583, 0.216, 0.009, 0.014, 0.096];
    let condensate = [0.001, 0.002, 0.015, 0.006, 0.35, 0.15, 0.476];
    let sep_vapor = [0.07, 0.01, 0.60, 0.22, 0.03, 0.02, 0.05];
    let vaporizer_liquid = [0.001, 0.001, 0.002, 0.001, 0.02, 0.09, 0.885];
    let wash_liquid = [0.0005, 0.0005, 0.002, 0.001, 0.05, 0.06, 0.886];
    let surge_liquid = [0.0002, 0.0003, 0.001, 0.0005, 0.03, 0.05, 0.918];

    StateVec {
        vaporizer: VaporizerState {
            holdup: op.vaporizer_holdup,
            t: 119.0,
            x: vaporizer_liquid,
        },
        reactor: std::array::from_fn(|j| ReactorStage {
            t: 150.0 + j as Real,
            z: gas_loop,
        }),
        exchangers: ExchangerTemps {
            fehe_cold_out: 148.0,
            fehe_hot_out: 134.0,
            wash_cooler_out: 40.0,
        },
        condenser: CondenserOutlet {
            t: 80.0,
            vapor_fraction: vapor_fraction_guess,
            x: condensate,
            y: sep_vapor,
        },
        separator: SeparatorState {
            holdup: op.separator_holdup,
            t: 40.0,
            p: op.separator_pressure,
            x: condensate,
            y: sep_vapor,
        },
        compressor: CompressorState {
            t_discharge: 80.0,
            p_discharge: op.compressor_discharge_pressure,
        },
        absorber: std::array::from_fn(|j| AbsorberStage {
            t: 45.0 - 0.5 * j as Real,
            x: wash_liquid,
        }),
        absorber_bottom_holdup: op.absorber_bottom_holdup,
        surge: SurgeTankState {
            holdup: op.surge_holdup,
            t: 60.0,
            x: surge_liquid,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::OperatingSpec;

    #[test]
    fn state_dimension() {
        assert_eq!(STATE_DIM, 201);
    }

    #[test]
    fn flatten_unflatten_round_trip() {
        let state = initial_state(&OperatingSpec::default(), 0.82);
        let flat = state.flatten();
        assert_eq!(flat.len(), STATE_DIM);
        let back = StateVec::unflatten(&flat).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn unflatten_rejects_wrong_dimension() {
        let short = DVector::zeros(STATE_DIM - 1);
        assert!(matches!(
            StateVec::unflatten(&short).unwrap_err(),
            FlowsheetError::Dimension { .. }
        ));
    }

    #[test]
    fn initial_guess_compositions_close() {
        let state = initial_state(&OperatingSpec::default(), 0.82);
        let mut groups: Vec<&[Real]> = vec![
            &state.vaporizer.x,
            &state.condenser.x,
            &state.condenser.y,
            &state.separator.x,
            &state.separator.y,
            &state.surge.x,
        ];
        for stage in &state.reactor {
            groups.push(&stage.z);
        }
        for stage in &state.absorber {
            groups.push(&stage.x);
        }
        for group in groups {
            let sum: Real = group.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum = {sum}");
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_trip_is_identity_for_any_vector(
            values in prop::collection::vec(-1e3_f64..1e3_f64, STATE_DIM)
        ) {
            let flat = DVector::from_vec(values);
            let state = StateVec::unflatten(&flat).unwrap();
            let again = state.flatten();
            prop_assert_eq!(flat, again);
        }
    }
}
