//! Numbered process streams and the steady-state flow network.
//!
//! Every stream's molar flow is an affine function of five independent
//! feed/purge flows, fixed at setup time by junction-by-junction closure.
//! The map (flows in lb-mol/min):
//!
//! | stream | role                                   | closure              |
//! |--------|----------------------------------------|----------------------|
//! | S1     | purge gas draw                         | independent          |
//! | S2     | separator vapor                        | S4 - S3              |
//! | S3     | separator liquid draw                  | independent          |
//! | S4     | reactor feed gas (loop circulation)    | independent          |
//! | S5     | fresh O2 feed                          | independent          |
//! | S6     | recycle + O2 mix                       | S34 + S5             |
//! | S7     | vaporizer vapor makeup (HAc)           | S4 - S6              |
//! | S8     | column reflux                          | REFLUX_RATIO * S16   |
//! | S9     | fresh HAc feed                         | independent          |
//! | S10    | reactor effluent                       | S4                   |
//! | S11    | FEHE hot-side outlet                   | S10                  |
//! | S12    | condenser outlet / separator feed      | S11                  |
//! | S13    | compressor suction                     | S34                  |
//! | S14    | compressor discharge                   | S13                  |
//! | S15    | column feed                            | S3                   |
//! | S16    | column overhead net product            | S3 - S20             |
//! | S17    | condensed overhead to decanter         | S16                  |
//! | S18    | organic (VAc) product                  | ORGANIC_SPLIT * S17  |
//! | S19    | aqueous product                        | S17 - S18            |
//! | S20    | column bottoms to surge tank           | S7 - S9 - ABSORB*S21 |
//! | S21    | absorber gas feed                      | S1                   |
//! | S22    | absorber off-gas vent                  | (1 - ABSORB) * S21   |
//! | S23    | absorber wash liquid                   | WASH_RATIO * S9      |
//! | S24    | absorber bottoms                       | S23 + ABSORB * S21   |
//! | S25    | absorber bottoms pump discharge        | S24                  |
//! | S26    | vaporizer gas outlet                   | S4                   |
//! | S27    | FEHE cold-side outlet / reactor inlet  | S4                   |
//! | S28    | VAc product after cooler               | S18                  |
//! | S29    | aqueous product after cooler           | S19                  |
//! | S30    | surge tank inlet total                 | S20 + S25            |
//! | S31    | surge tank outlet to vaporizer         | S7 - S9              |
//! | S32    | vent after flame arrestor              | S22                  |
//! | S33    | discharge after intercooler            | S14                  |
//! | S34    | recycle gas                            | S2 - S1              |
//!
//! The reactor is flow-conserving in total moles here; the synthesis
//! reaction's mole change is carried by the per-species balances in the
//! residual, not by the total-flow network.

use crate::error::{FlowsheetError, FlowsheetResult};
use serde::{Deserialize, Serialize};
use vam_core::{Real, Tolerances, ensure_finite, nearly_equal};

/// Number of process streams.
pub const N_STREAMS: usize = 34;

/// Fraction of the absorber gas feed taken up into the wash liquid.
pub const ABSORB_FRACTION: Real = 0.5;

/// Absorber wash circulation as a multiple of the fresh HAc feed.
pub const WASH_RATIO: Real = 0.25;

/// Decanter organic-phase fraction of the condensed column overhead.
pub const ORGANIC_SPLIT: Real = 0.6;

/// Column reflux as a multiple of the net overhead product.
pub const REFLUX_RATIO: Real = 8.0;

macro_rules! stream_ids {
    ($($name:ident => $idx:expr),+ $(,)?) => {
        /// Numbered process stream identifiers.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum StreamId {
            $($name),+
        }

        impl StreamId {
            pub const ALL: [StreamId; N_STREAMS] = [$(StreamId::$name),+];

            /// Dense index into per-stream arrays.
            #[inline]
            pub fn index(self) -> usize {
                match self {
                    $(StreamId::$name => $idx),+
                }
            }
        }
    };
}

stream_ids! {
    S1 => 0, S2 => 1, S3 => 2, S4 => 3, S5 => 4, S6 => 5, S7 => 6,
    S8 => 7, S9 => 8, S10 => 9, S11 => 10, S12 => 11, S13 => 12,
    S14 => 13, S15 => 14, S16 => 15, S17 => 16, S18 => 17, S19 => 18,
    S20 => 19, S21 => 20, S22 => 21, S23 => 22, S24 => 23, S25 => 24,
    S26 => 25, S27 => 26, S28 => 27, S29 => 28, S30 => 29, S31 => 30,
    S32 => 31, S33 => 32, S34 => 33,
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", self.index() + 1)
    }
}

/// The five independent flows of the fixed topology [lb-mol/min].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedSpec {
    /// Gas-loop circulation rate, stream S4.
    pub reactor_feed: Real,
    /// Purge gas draw, stream S1.
    pub purge: Real,
    /// Separator liquid draw, stream S3.
    pub separator_liquid: Real,
    /// Fresh oxygen feed, stream S5.
    pub fresh_o2: Real,
    /// Fresh acetic acid feed, stream S9.
    pub fresh_hac: Real,
}

impl Default for FeedSpec {
    fn default() -> Self {
        // Base-case operating point of the benchmark flowsheet.
        Self {
            reactor_feed: 12.113916,
            purge: 0.905,
            separator_liquid: 2.1924,
            fresh_o2: 0.55,
            fresh_hac: 0.82,
        }
    }
}

/// All 34 molar flows, derived from a [`FeedSpec`] by [`solve_network`].
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFlows {
    flows: [Real; N_STREAMS],
}

impl StreamFlows {
    /// Molar flow of a stream [lb-mol/min].
    #[inline]
    pub fn get(&self, id: StreamId) -> Real {
        self.flows[id.index()]
    }

    /// Total fresh feed into the network.
    pub fn total_in(&self) -> Real {
        self.get(StreamId::S5) + self.get(StreamId::S9)
    }

    /// Total flow leaving the network (vent plus decanter products).
    pub fn total_out(&self) -> Real {
        self.get(StreamId::S22) + self.get(StreamId::S18) + self.get(StreamId::S19)
    }
}

/// Derive every stream flow from the five independent flows.
///
/// Fails with [`FlowsheetError::InfeasibleTopology`] naming the first stream
/// whose closure yields a negative flow, and rejects non-finite derived
/// flows (a NaN feed entry would otherwise pass the sign check); an
/// infeasible specification is a setup-time error and never reaches the
/// solver.
pub fn solve_network(spec: &FeedSpec) -> FlowsheetResult<StreamFlows> {
    use StreamId::*;

    let mut f = [0.0; N_STREAMS];
    let mut set = |id: StreamId, v: Real| {
        f[id.index()] = v;
    };

    set(S1, spec.purge);
    set(S3, spec.separator_liquid);
    set(S4, spec.reactor_feed);
    set(S5, spec.fresh_o2);
    set(S9, spec.fresh_hac);

    // Gas loop
    let s2 = spec.reactor_feed - spec.separator_liquid;
    let s34 = s2 - spec.purge;
    let s6 = s34 + spec.fresh_o2;
    let s7 = spec.reactor_feed - s6;
    set(S2, s2);
    set(S34, s34);
    set(S6, s6);
    set(S7, s7);
    set(S13, s34);
    set(S14, s34);
    set(S33, s34);

    // Reactor train and condenser path (flow-conserving in totals)
    set(S10, spec.reactor_feed);
    set(S11, spec.reactor_feed);
    set(S12, spec.reactor_feed);
    set(S26, spec.reactor_feed);
    set(S27, spec.reactor_feed);

    // Absorber
    let s21 = spec.purge;
    let s22 = (1.0 - ABSORB_FRACTION) * s21;
    let s23 = WASH_RATIO * spec.fresh_hac;
    let s24 = s23 + ABSORB_FRACTION * s21;
    set(S21, s21);
    set(S22, s22);
    set(S23, s23);
    set(S24, s24);
    set(S25, s24);
    set(S32, s22);

    // Column, decanter and HAc recycle
    let s20 = s7 - spec.fresh_hac - ABSORB_FRACTION * s21;
    let s16 = spec.separator_liquid - s20;
    let s18 = ORGANIC_SPLIT * s16;
    set(S15, spec.separator_liquid);
    set(S20, s20);
    set(S16, s16);
    set(S17, s16);
    set(S18, s18);
    set(S19, s16 - s18);
    set(S8, REFLUX_RATIO * s16);
    set(S28, s18);
    set(S29, s16 - s18);

    // Surge tank
    set(S30, s20 + s24);
    set(S31, s7 - spec.fresh_hac);

    let flows = StreamFlows { flows: f };

    for id in StreamId::ALL {
        let flow = ensure_finite(flows.get(id), "stream flow")?;
        if flow < 0.0 {
            return Err(FlowsheetError::InfeasibleTopology { stream: id, flow });
        }
    }

    // Overall closure holds structurally; a violation here means the stream
    // map above was edited inconsistently.
    let tol = Tolerances {
        abs: 1e-9,
        rel: 1e-9,
    };
    if !nearly_equal(flows.total_in(), flows.total_out(), tol) {
        return Err(FlowsheetError::Setup {
            what: "flow network does not close (total in != total out)",
        });
    }

    Ok(flows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn base_case_gas_loop_flows() {
        // f_S2 = f_S4 - f_S3 and f_S34 = f_S2 - f_S1
        let flows = solve_network(&FeedSpec::default()).unwrap();
        assert_relative_eq!(flows.get(StreamId::S2), 9.921516, max_relative = 1e-12);
        assert_relative_eq!(flows.get(StreamId::S34), 9.016516, max_relative = 1e-12);
    }

    #[test]
    fn network_closes_overall() {
        let flows = solve_network(&FeedSpec::default()).unwrap();
        assert_relative_eq!(flows.total_in(), flows.total_out(), max_relative = 1e-12);
    }

    #[test]
    fn all_base_case_flows_nonnegative() {
        let flows = solve_network(&FeedSpec::default()).unwrap();
        for id in StreamId::ALL {
            assert!(flows.get(id) >= 0.0, "{id} = {}", flows.get(id));
        }
    }

    #[test]
    fn purge_above_loop_flow_is_infeasible() {
        // Purge larger than the separator vapor drives the recycle negative.
        let spec = FeedSpec {
            purge: 10.0,
            ..FeedSpec::default()
        };
        let err = solve_network(&spec).unwrap_err();
        match err {
            FlowsheetError::InfeasibleTopology { stream, flow } => {
                assert_eq!(stream, StreamId::S34);
                assert!(flow < 0.0);
            }
            other => panic!("expected InfeasibleTopology, got {other}"),
        }
    }

    #[test]
    fn liquid_draw_above_circulation_is_infeasible() {
        let spec = FeedSpec {
            separator_liquid: 13.0,
            ..FeedSpec::default()
        };
        assert!(matches!(
            solve_network(&spec).unwrap_err(),
            FlowsheetError::InfeasibleTopology { .. }
        ));
    }

    #[test]
    fn non_finite_feed_is_rejected_at_setup() {
        // NaN propagates through the affine map without tripping the sign
        // check, so the closure guards finiteness explicitly.
        let spec = FeedSpec {
            purge: f64::NAN,
            ..FeedSpec::default()
        };
        assert!(matches!(
            solve_network(&spec).unwrap_err(),
            FlowsheetError::Core(_)
        ));
    }

    #[test]
    fn stream_display_is_one_based() {
        assert_eq!(StreamId::S1.to_string(), "S1");
        assert_eq!(StreamId::S34.to_string(), "S34");
    }
}
