//! Steady-state model of the vinyl-acetate flowsheet as a coupled nonlinear
//! algebraic system.
//!
//! The crate exposes exactly two things to an external root-finder: an
//! initial guess (state vector plus read-only parameters) and the residual
//! function, which is zero at the physical steady state. The solver owns the
//! iteration; the model is pure and stateless between calls.

pub mod error;
pub mod params;
pub mod residual;
pub mod state;
pub mod streams;

pub use error::{FlowsheetError, FlowsheetResult};
pub use params::{Kinetics, OperatingSpec, Params};
pub use residual::{residual, residual_flat};
pub use state::{STATE_DIM, StateVec, initial_state};
pub use streams::{FeedSpec, StreamFlows, StreamId, solve_network};

use nalgebra::DVector;
use tracing::info;

/// The assembled steady-state problem: fixed parameters plus the residual
/// evaluation the external nonlinear solver iterates on.
#[derive(Debug)]
pub struct Flowsheet {
    params: Params,
}

impl Flowsheet {
    /// Build the problem for a feed and operating specification.
    ///
    /// Runs the setup-time flow-network closure; an infeasible specification
    /// fails here, before any solver iteration.
    pub fn new(feed: FeedSpec, op: OperatingSpec) -> FlowsheetResult<Self> {
        let params = Params::build(feed, op)?;
        info!(
            recycle = params.flows.get(StreamId::S34),
            product = params.flows.get(StreamId::S3),
            "flow network closed"
        );
        Ok(Self { params })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Dimension of the unknown vector (and of the residual).
    pub fn dim(&self) -> usize {
        STATE_DIM
    }

    /// Initial guess with every field populated and every composition group
    /// summing to one.
    pub fn initial_state(&self) -> StateVec {
        let flows = &self.params.flows;
        let phi = flows.get(StreamId::S2) / flows.get(StreamId::S12);
        initial_state(&self.params.op, phi)
    }

    /// Initial guess in the solver's flat form.
    pub fn initial_guess(&self) -> DVector<f64> {
        self.initial_state().flatten()
    }

    /// Residual at a flat trial state; same dimension and ordering as the
    /// state vector.
    pub fn residual(&self, x: &DVector<f64>) -> FlowsheetResult<DVector<f64>> {
        residual_flat(x, &self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facade_wires_guess_and_residual_together() {
        let sheet = Flowsheet::new(FeedSpec::default(), OperatingSpec::default()).unwrap();
        let x0 = sheet.initial_guess();
        assert_eq!(x0.len(), sheet.dim());
        let r = sheet.residual(&x0).unwrap();
        assert_eq!(r.len(), sheet.dim());
    }

    #[test]
    fn infeasible_feed_is_a_setup_error() {
        let feed = FeedSpec {
            purge: 11.0,
            ..FeedSpec::default()
        };
        assert!(matches!(
            Flowsheet::new(feed, OperatingSpec::default()).unwrap_err(),
            FlowsheetError::InfeasibleTopology { .. }
        ));
    }
}
