//! The read-only parameter side of the solve: stream flows, feed
//! conditions, and the operating specification.

use crate::error::{FlowsheetError, FlowsheetResult};
use crate::streams::{FeedSpec, StreamFlows, solve_network};
use serde::{Deserialize, Serialize};
use vam_core::{Real, fraction_sum};
use vam_props::{N_SPECIES, Species, WilsonModel};

/// Externally fixed operating specification for every unit.
///
/// Pressures in psia, temperatures in degC, duties in Btu/min, holdups in
/// lb-mol, UA in Btu/(min degC), catalyst volume in ft^3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatingSpec {
    pub vaporizer_pressure: Real,
    pub vaporizer_duty: Real,
    pub vaporizer_holdup: Real,

    pub reactor_pressure: Real,
    pub reactor_coolant_t: Real,
    pub reactor_ua_per_stage: Real,
    pub catalyst_volume_per_stage: Real,

    /// FEHE effectiveness on the cold side (0..1).
    pub fehe_effectiveness: Real,

    pub condenser_duty: Real,

    pub separator_pressure: Real,
    pub separator_holdup: Real,

    pub compressor_discharge_pressure: Real,
    /// Polytropic exponent for the discharge-temperature relation.
    pub compressor_kappa: Real,

    pub absorber_pressure: Real,
    pub absorber_bottom_holdup: Real,
    pub wash_cooler_duty: Real,

    pub surge_holdup: Real,

    /// Fresh O2 feed temperature.
    pub o2_feed_t: Real,
    /// Fresh HAc feed temperature.
    pub hac_feed_t: Real,
    /// Distillation column bottoms temperature.
    pub column_bottoms_t: Real,
    /// Distillation column bottoms composition (HAc-rich recycle).
    pub column_bottoms_x: [Real; N_SPECIES],
}

impl Default for OperatingSpec {
    fn default() -> Self {
        Self {
            vaporizer_pressure: 128.0,
            vaporizer_duty: 15_000.0,
            vaporizer_holdup: 4.0,

            reactor_pressure: 128.0,
            reactor_coolant_t: 133.0,
            reactor_ua_per_stage: 1_000.0,
            catalyst_volume_per_stage: 35.0,

            fehe_effectiveness: 0.6,

            condenser_duty: 20_000.0,

            separator_pressure: 128.0,
            separator_holdup: 8.0,

            compressor_discharge_pressure: 140.0,
            compressor_kappa: 1.3,

            absorber_pressure: 132.0,
            absorber_bottom_holdup: 2.0,
            wash_cooler_duty: 2_000.0,

            surge_holdup: 10.0,

            o2_feed_t: 30.0,
            hac_feed_t: 30.0,
            column_bottoms_t: 137.0,
            // order: O2, CO2, C2H4, C2H6, VAc, H2O, HAc
            column_bottoms_x: [0.0, 0.0, 0.0, 0.0, 0.02, 0.02, 0.96],
        }
    }
}

impl OperatingSpec {
    pub fn validate(&self) -> FlowsheetResult<()> {
        if !(0.0 < self.fehe_effectiveness && self.fehe_effectiveness < 1.0) {
            return Err(FlowsheetError::Setup {
                what: "FEHE effectiveness must lie in (0, 1)",
            });
        }
        if self.compressor_kappa <= 1.0 {
            return Err(FlowsheetError::Setup {
                what: "polytropic exponent must exceed 1",
            });
        }
        for p in [
            self.vaporizer_pressure,
            self.reactor_pressure,
            self.separator_pressure,
            self.compressor_discharge_pressure,
            self.absorber_pressure,
        ] {
            if !(p > 0.0) {
                return Err(FlowsheetError::Setup {
                    what: "unit pressures must be positive",
                });
            }
        }
        let x_sum = fraction_sum(&self.column_bottoms_x);
        if (x_sum - 1.0).abs() > 1e-9 {
            return Err(FlowsheetError::Setup {
                what: "column bottoms composition must sum to 1",
            });
        }
        Ok(())
    }
}

/// Reaction and rate-law constants for the two vinyl-acetate reactions.
///
/// Rate basis: lb-mol/(min ft^3 catalyst), partial pressures in psia,
/// Arrhenius temperatures in K, heats of reaction in Btu/lb-mol (exothermic
/// positive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinetics {
    pub k1_pre: Real,
    pub e1_over_r: Real,
    pub k2_pre: Real,
    pub e2_over_r: Real,
    pub dh1: Real,
    pub dh2: Real,
}

impl Default for Kinetics {
    fn default() -> Self {
        Self {
            k1_pre: 0.1036,
            e1_over_r: 3674.0,
            k2_pre: 1.9365e5,
            e2_over_r: 10_116.0,
            dh1: 42_100.0,
            dh2: 316_000.0,
        }
    }
}

/// Stoichiometric coefficients, species order O2, CO2, C2H4, C2H6, VAc, H2O,
/// HAc. Reaction 1: C2H4 + HAc + 1/2 O2 -> VAc + H2O. Reaction 2:
/// C2H4 + 3 O2 -> 2 CO2 + 2 H2O.
pub const NU1: [Real; N_SPECIES] = [-0.5, 0.0, -1.0, 0.0, 1.0, 1.0, -1.0];
pub const NU2: [Real; N_SPECIES] = [-3.0, 2.0, -1.0, 0.0, 0.0, 2.0, 0.0];

/// Everything the residual function reads but never solves for.
///
/// Built once per solve attempt; the solver only ever mutates the state
/// vector, never this.
#[derive(Debug, Clone)]
pub struct Params {
    pub feed: FeedSpec,
    pub flows: StreamFlows,
    pub op: OperatingSpec,
    pub kinetics: Kinetics,
    pub wilson: WilsonModel,
    /// Fresh O2 feed composition (pure oxygen).
    pub o2_feed_y: [Real; N_SPECIES],
    /// Fresh HAc feed composition (pure acetic acid).
    pub hac_feed_x: [Real; N_SPECIES],
}

impl Params {
    /// Build the parameter set: solves the flow network (setup-time
    /// feasibility check included) and constructs the Wilson model over the
    /// full species set.
    pub fn build(feed: FeedSpec, op: OperatingSpec) -> FlowsheetResult<Self> {
        op.validate()?;
        let flows = solve_network(&feed)?;
        let wilson = WilsonModel::for_species(&Species::ALL)?;

        let mut o2_feed_y = [0.0; N_SPECIES];
        o2_feed_y[Species::O2.index()] = 1.0;
        let mut hac_feed_x = [0.0; N_SPECIES];
        hac_feed_x[Species::HAc.index()] = 1.0;

        Ok(Self {
            feed,
            flows,
            op,
            kinetics: Kinetics::default(),
            wilson,
            o2_feed_y,
            hac_feed_x,
        })
    }
}
