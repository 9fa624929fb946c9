//! Integration tests for the assembled flowsheet model.

use approx::assert_relative_eq;
use vam_flowsheet::{
    FeedSpec, Flowsheet, FlowsheetError, OperatingSpec, StateVec, StreamId, solve_network,
};

#[test]
fn base_case_mass_balance_scenario() {
    // f_S4 = 12.113916, f_S1 = 0.905, f_S3 = 2.1924
    let flows = solve_network(&FeedSpec::default()).unwrap();
    assert_relative_eq!(
        flows.get(StreamId::S2),
        12.113916 - 2.1924,
        max_relative = 1e-12
    );
    assert_relative_eq!(
        flows.get(StreamId::S34),
        9.921516 - 0.905,
        max_relative = 1e-12
    );
}

#[test]
fn residual_round_trips_through_the_flat_vector() {
    let sheet = Flowsheet::new(FeedSpec::default(), OperatingSpec::default()).unwrap();
    let state = sheet.initial_state();
    let flat = state.flatten();
    let back = StateVec::unflatten(&flat).unwrap();
    assert_eq!(back, state);

    let r1 = sheet.residual(&flat).unwrap();
    let r2 = sheet.residual(&flat).unwrap();
    assert_eq!(r1, r2);
}

#[test]
fn residual_rejects_wrong_dimension() {
    let sheet = Flowsheet::new(FeedSpec::default(), OperatingSpec::default()).unwrap();
    let short = nalgebra::DVector::zeros(sheet.dim() - 1);
    assert!(matches!(
        sheet.residual(&short).unwrap_err(),
        FlowsheetError::Dimension { .. }
    ));
}

#[test]
fn purge_perturbation_fails_before_any_iteration() {
    // Purge above the loop flow must surface as a setup-time error.
    let feed = FeedSpec {
        purge: 9.95,
        ..FeedSpec::default()
    };
    let err = Flowsheet::new(feed, OperatingSpec::default()).unwrap_err();
    match err {
        FlowsheetError::InfeasibleTopology { stream, flow } => {
            assert_eq!(stream, StreamId::S34);
            assert!(flow < 0.0);
        }
        other => panic!("expected InfeasibleTopology, got {other}"),
    }
}

#[test]
fn initial_residual_is_finite_everywhere() {
    let sheet = Flowsheet::new(FeedSpec::default(), OperatingSpec::default()).unwrap();
    let r = sheet.residual(&sheet.initial_guess()).unwrap();
    for i in 0..r.len() {
        assert!(r[i].is_finite(), "residual {i} = {}", r[i]);
    }
}

#[test]
fn feed_changes_move_the_residual() {
    // The parameter vector really flows into the equations: a different
    // liquid draw changes the separator balances at the same state.
    let base = Flowsheet::new(FeedSpec::default(), OperatingSpec::default()).unwrap();
    let feed = FeedSpec {
        separator_liquid: 2.5,
        ..FeedSpec::default()
    };
    let perturbed = Flowsheet::new(feed, OperatingSpec::default()).unwrap();

    let x0 = base.initial_guess();
    let r_base = base.residual(&x0).unwrap();
    let r_pert = perturbed.residual(&x0).unwrap();
    assert_ne!(r_base, r_pert);
}
