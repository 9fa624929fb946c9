//! The steady-state residual function.
//!
//! One equation per unknown, emitted in exactly the flatten order of
//! [`StateVec`], so residual indices line up with state indices. Each
//! balance has the form `inflow - outflow +/- generation = 0`; holdups and
//! set pressures carry specification equations (steady-state holdup is
//! otherwise indeterminate). Per composition group: n-1 component balances
//! plus one mole-fraction closure per phase. Two-phase units additionally
//! carry the per-species equilibrium closure `y_i P - x_i gamma_i psat_i(T)`.
//!
//! The function is pure: it never mutates its inputs, and evaluating it
//! twice on the same input is bit-identical.

use crate::error::{FlowsheetError, FlowsheetResult};
use crate::params::{NU1, NU2, Params};
use crate::state::{NA_STAGES, NR_STAGES, STATE_DIM, StateVec};
use crate::streams::StreamId::*;
use nalgebra::DVector;
use vam_core::units::kelvin;
use vam_core::{Real, fraction_sum};
use vam_props::{
    N_SPECIES, Species, liquid_enthalpy, saturation_pressure, vapor_enthalpy,
};

/// Energy balances are divided by this so their residuals sit on the same
/// order of magnitude as the mole-fraction and flow balances.
const ENERGY_SCALE: Real = 1.0e3;

/// Molar enthalpy of a vapor mixture [Btu/lb-mol].
fn vapor_mix_enthalpy(y: &[Real; N_SPECIES], t: Real) -> Real {
    Species::ALL
        .iter()
        .map(|s| y[s.index()] * vapor_enthalpy(t, s.data()))
        .sum()
}

/// Molar enthalpy of a liquid mixture [Btu/lb-mol].
fn liquid_mix_enthalpy(x: &[Real; N_SPECIES], t: Real) -> Real {
    Species::ALL
        .iter()
        .map(|s| x[s.index()] * liquid_enthalpy(t, s.data()))
        .sum()
}

/// Normalized equilibrium vapor over a liquid at (x, T, P):
/// `y_i proportional to x_i gamma_i psat_i(T) / P`.
fn equilibrium_vapor(
    x: &[Real; N_SPECIES],
    t: Real,
    p: Real,
    params: &Params,
) -> FlowsheetResult<[Real; N_SPECIES]> {
    let gamma = params.wilson.activity_coefficients(x, t)?;
    let mut y = [0.0; N_SPECIES];
    let mut sum = 0.0;
    for s in Species::ALL {
        let i = s.index();
        y[i] = x[i] * gamma[i] * saturation_pressure(t, s.data()) / p;
        sum += y[i];
    }
    if !(sum > 0.0) || !sum.is_finite() {
        return Err(FlowsheetError::Props(
            vam_props::PropsError::DegenerateComposition {
                what: "equilibrium vapor sum",
            },
        ));
    }
    for yi in &mut y {
        *yi /= sum;
    }
    Ok(y)
}

/// Rates of the two vinyl-acetate reactions at one reactor stage
/// [lb-mol/(min ft^3 catalyst)]. Partial pressures in psia, Arrhenius
/// temperatures in K.
fn reaction_rates(t: Real, z: &[Real; N_SPECIES], params: &Params) -> (Real, Real) {
    let kin = &params.kinetics;
    let p = params.op.reactor_pressure;
    let t_abs = kelvin(t);

    let p_o2 = z[Species::O2.index()] * p;
    let p_c2h4 = z[Species::C2H4.index()] * p;
    let p_h2o = z[Species::H2O.index()] * p;
    let p_hac = z[Species::HAc.index()] * p;

    let water_term = 1.0 + 1.7 * p_h2o;
    let r1 = kin.k1_pre * (-kin.e1_over_r / t_abs).exp() * p_o2 * p_c2h4 * p_hac * water_term
        / ((1.0 + 0.583 * p_o2 * water_term) * (1.0 + 6.8 * p_hac));

    let water_term2 = 1.0 + 0.68 * p_h2o;
    let r2 = kin.k2_pre * (-kin.e2_over_r / t_abs).exp() * p_o2 * water_term2
        / (1.0 + 0.76 * p_o2 * water_term2);

    (r1, r2)
}

/// Evaluate the residual for a structured state.
///
/// Returns a vector of dimension [`STATE_DIM`]; any non-finite entry fails
/// with [`FlowsheetError::NonFiniteResidual`] naming the equation block, so
/// a bad trial state never corrupts the solver's Jacobian silently.
pub fn residual(state: &StateVec, params: &Params) -> FlowsheetResult<DVector<f64>> {
    let mut r = Vec::with_capacity(STATE_DIM);
    let flows = &params.flows;
    let op = &params.op;

    let f_s4 = flows.get(S4);
    let f_s34 = flows.get(S34);
    let f_s5 = flows.get(S5);
    let f_s7 = flows.get(S7);
    let f_s9 = flows.get(S9);

    // Front-end mixing: recycle gas + fresh O2 + vaporizer vapor make the
    // reactor feed. The mix temperature is flow-weighted.
    let y_vap = equilibrium_vapor(
        &state.vaporizer.x,
        state.vaporizer.t,
        op.vaporizer_pressure,
        params,
    )?;
    let y_sep = &state.separator.y;
    let mut z_feed = [0.0; N_SPECIES];
    for i in 0..N_SPECIES {
        z_feed[i] = (f_s34 * y_sep[i] + f_s5 * params.o2_feed_y[i] + f_s7 * y_vap[i]) / f_s4;
    }
    let t_mix = (f_s34 * state.compressor.t_discharge + f_s5 * op.o2_feed_t
        + f_s7 * state.vaporizer.t)
        / f_s4;

    // --- Vaporizer -------------------------------------------------------
    {
        let vap = &state.vaporizer;
        let f_s31 = flows.get(S31);

        r.push(vap.holdup - op.vaporizer_holdup);

        let h_in = f_s31 * liquid_mix_enthalpy(&state.surge.x, state.surge.t)
            + f_s9 * liquid_mix_enthalpy(&params.hac_feed_x, op.hac_feed_t);
        let h_out = f_s7 * vapor_mix_enthalpy(&y_vap, vap.t);
        r.push((h_in + op.vaporizer_duty - h_out) / ENERGY_SCALE);

        for i in 0..N_SPECIES - 1 {
            r.push(f_s31 * state.surge.x[i] + f_s9 * params.hac_feed_x[i] - f_s7 * y_vap[i]);
        }
        r.push(fraction_sum(&vap.x) - 1.0);
    }

    // --- Reactor stages --------------------------------------------------
    {
        let vc = op.catalyst_volume_per_stage;
        for j in 0..NR_STAGES {
            let stage = &state.reactor[j];
            let (z_in, t_in) = if j == 0 {
                (&z_feed, state.exchangers.fehe_cold_out)
            } else {
                (&state.reactor[j - 1].z, state.reactor[j - 1].t)
            };

            let (r1, r2) = reaction_rates(stage.t, &stage.z, params);

            let heat_gen = (params.kinetics.dh1 * r1 + params.kinetics.dh2 * r2) * vc;
            let q_removed = op.reactor_ua_per_stage * (stage.t - op.reactor_coolant_t);
            r.push(
                (f_s4 * (vapor_mix_enthalpy(z_in, t_in) - vapor_mix_enthalpy(&stage.z, stage.t))
                    + heat_gen
                    - q_removed)
                    / ENERGY_SCALE,
            );

            for i in 0..N_SPECIES - 1 {
                r.push(f_s4 * (z_in[i] - stage.z[i]) + (NU1[i] * r1 + NU2[i] * r2) * vc);
            }
            r.push(fraction_sum(&stage.z) - 1.0);
        }
    }

    // --- Heat exchangers -------------------------------------------------
    {
        let ex = &state.exchangers;
        let hot_in_t = state.reactor[NR_STAGES - 1].t;
        let z_out = &state.reactor[NR_STAGES - 1].z;

        // FEHE cold side: effectiveness relation against the reactor exit.
        r.push(ex.fehe_cold_out - (t_mix + op.fehe_effectiveness * (hot_in_t - t_mix)));

        // FEHE hot side: duty picked up by the cold side is duty given up by
        // the hot side. Both sides carry the full loop flow.
        let q_cold = f_s4
            * (vapor_mix_enthalpy(&z_feed, ex.fehe_cold_out) - vapor_mix_enthalpy(&z_feed, t_mix));
        let q_hot =
            f_s4 * (vapor_mix_enthalpy(z_out, hot_in_t) - vapor_mix_enthalpy(z_out, ex.fehe_hot_out));
        r.push((q_hot - q_cold) / ENERGY_SCALE);

        // Wash cooler on the surge-tank draw to the absorber.
        let f_s23 = flows.get(S23);
        let q_wash = f_s23
            * (liquid_mix_enthalpy(&state.surge.x, state.surge.t)
                - liquid_mix_enthalpy(&state.surge.x, ex.wash_cooler_out));
        r.push((q_wash - op.wash_cooler_duty) / ENERGY_SCALE);
    }

    // --- Condenser outlet (partially condensing separator feed) ----------
    {
        let c = &state.condenser;
        let f_s12 = flows.get(S12);
        let z_f = &state.reactor[NR_STAGES - 1].z;
        let phi = c.vapor_fraction;

        let h_in = f_s12 * vapor_mix_enthalpy(z_f, state.exchangers.fehe_hot_out);
        let h_out = phi * f_s12 * vapor_mix_enthalpy(&c.y, c.t)
            + (1.0 - phi) * f_s12 * liquid_mix_enthalpy(&c.x, c.t);
        r.push((h_in - h_out - op.condenser_duty) / ENERGY_SCALE);

        // Phase-split consistency: with sum x = 1 below, this forces
        // sum y = 1 as well.
        r.push(fraction_sum(&c.y) - fraction_sum(&c.x));

        for i in 0..N_SPECIES - 1 {
            r.push(z_f[i] - phi * c.y[i] - (1.0 - phi) * c.x[i]);
        }
        r.push(fraction_sum(&c.x) - 1.0);

        let gamma = params.wilson.activity_coefficients(&c.x, c.t)?;
        for s in Species::ALL {
            let i = s.index();
            r.push(
                c.y[i] * op.separator_pressure
                    - c.x[i] * gamma[i] * saturation_pressure(c.t, s.data()),
            );
        }
    }

    // --- Separator drum --------------------------------------------------
    {
        let sep = &state.separator;
        let c = &state.condenser;
        let f_s12 = flows.get(S12);
        let f_s2 = flows.get(S2);
        let f_s3 = flows.get(S3);
        let phi = c.vapor_fraction;

        r.push(sep.holdup - op.separator_holdup);
        // Temperature slot carries the vapor-phase closure; with the
        // per-species equilibrium below it pins the drum temperature.
        r.push(fraction_sum(&sep.y) - 1.0);
        r.push(sep.p - op.separator_pressure);

        for i in 0..N_SPECIES - 1 {
            r.push(
                f_s12 * (phi * c.y[i] + (1.0 - phi) * c.x[i]) - f_s2 * sep.y[i] - f_s3 * sep.x[i],
            );
        }
        r.push(fraction_sum(&sep.x) - 1.0);

        let gamma = params.wilson.activity_coefficients(&sep.x, sep.t)?;
        for s in Species::ALL {
            let i = s.index();
            r.push(sep.y[i] * sep.p - sep.x[i] * gamma[i] * saturation_pressure(sep.t, s.data()));
        }
    }

    // --- Compressor ------------------------------------------------------
    {
        let comp = &state.compressor;
        let kappa = op.compressor_kappa;
        let ratio = comp.p_discharge / state.separator.p;
        r.push(
            kelvin(comp.t_discharge)
                - kelvin(state.separator.t) * ratio.powf((kappa - 1.0) / kappa),
        );
        r.push(comp.p_discharge - op.compressor_discharge_pressure);
    }

    // --- Absorber --------------------------------------------------------
    {
        // Constant-molar-flow stage balances: gas runs at the S21 rate and
        // liquid at the S23 wash rate on every stage. The net uptake the
        // flow network books into S24 (and the surge tank draws at that
        // rate) is carried by the per-species transfer terms here, the same
        // convention as the reactor's total-flow treatment.
        let f_gas = flows.get(S21);
        let f_liq = flows.get(S23);
        let p_abs = op.absorber_pressure;

        // Stage vapor follows from equilibrium with the stage liquid.
        let mut y_stage = [[0.0; N_SPECIES]; NA_STAGES];
        for j in 0..NA_STAGES {
            y_stage[j] =
                equilibrium_vapor(&state.absorber[j].x, state.absorber[j].t, p_abs, params)?;
        }

        for j in 0..NA_STAGES {
            let stage = &state.absorber[j];

            // Liquid flows down (wash enters the top stage), gas flows up
            // (feed gas enters the bottom stage at separator conditions).
            let (x_in, t_liq_in) = if j == 0 {
                (&state.surge.x, state.exchangers.wash_cooler_out)
            } else {
                (&state.absorber[j - 1].x, state.absorber[j - 1].t)
            };
            let (y_in, t_gas_in) = if j == NA_STAGES - 1 {
                (&state.separator.y, state.separator.t)
            } else {
                (&y_stage[j + 1], state.absorber[j + 1].t)
            };

            let h_in = f_liq * liquid_mix_enthalpy(x_in, t_liq_in)
                + f_gas * vapor_mix_enthalpy(y_in, t_gas_in);
            let h_out = f_liq * liquid_mix_enthalpy(&stage.x, stage.t)
                + f_gas * vapor_mix_enthalpy(&y_stage[j], stage.t);
            r.push((h_in - h_out) / ENERGY_SCALE);

            for i in 0..N_SPECIES - 1 {
                r.push(f_liq * (x_in[i] - stage.x[i]) + f_gas * (y_in[i] - y_stage[j][i]));
            }
            r.push(fraction_sum(&stage.x) - 1.0);
        }

        r.push(state.absorber_bottom_holdup - op.absorber_bottom_holdup);
    }

    // --- Surge tank ------------------------------------------------------
    {
        let surge = &state.surge;
        let f_s20 = flows.get(S20);
        let f_s25 = flows.get(S25);
        let f_out = flows.get(S31) + flows.get(S23);
        let bottom = &state.absorber[NA_STAGES - 1];

        r.push(surge.holdup - op.surge_holdup);

        let h_in = f_s20 * liquid_mix_enthalpy(&op.column_bottoms_x, op.column_bottoms_t)
            + f_s25 * liquid_mix_enthalpy(&bottom.x, bottom.t);
        let h_out = f_out * liquid_mix_enthalpy(&surge.x, surge.t);
        r.push((h_in - h_out) / ENERGY_SCALE);

        for i in 0..N_SPECIES - 1 {
            r.push(f_s20 * op.column_bottoms_x[i] + f_s25 * bottom.x[i] - f_out * surge.x[i]);
        }
        r.push(fraction_sum(&surge.x) - 1.0);
    }

    debug_assert_eq!(r.len(), STATE_DIM);

    for (index, &value) in r.iter().enumerate() {
        if !value.is_finite() {
            return Err(FlowsheetError::NonFiniteResidual {
                index,
                what: block_name(index),
            });
        }
    }

    Ok(DVector::from_vec(r))
}

/// Evaluate the residual for a flat state vector.
pub fn residual_flat(x: &DVector<f64>, params: &Params) -> FlowsheetResult<DVector<f64>> {
    let state = StateVec::unflatten(x)?;
    residual(&state, params)
}

/// Equation block owning a residual index, for diagnostics.
fn block_name(index: usize) -> &'static str {
    use crate::state::{
        AbsorberStage, CompressorState, CondenserOutlet, ExchangerTemps, ReactorStage,
        SeparatorState, VaporizerState,
    };
    let mut end = VaporizerState::DIM;
    if index < end {
        return "vaporizer";
    }
    end += NR_STAGES * ReactorStage::DIM;
    if index < end {
        return "reactor";
    }
    end += ExchangerTemps::DIM;
    if index < end {
        return "heat exchangers";
    }
    end += CondenserOutlet::DIM;
    if index < end {
        return "condenser outlet";
    }
    end += SeparatorState::DIM;
    if index < end {
        return "separator";
    }
    end += CompressorState::DIM;
    if index < end {
        return "compressor";
    }
    end += NA_STAGES * AbsorberStage::DIM + 1;
    if index < end {
        return "absorber";
    }
    "surge tank"
}
