//! Physical property data and correlations for the vinyl-acetate mixture.
//!
//! Three layers, all pure and allocation-light so the residual function can
//! call them freely:
//! - species: the closed seven-component set and its constant table
//! - correlations: heat capacity / enthalpy / vapor pressure closed forms
//! - wilson: local-composition activity coefficients for the liquid phase

pub mod correlations;
pub mod error;
pub mod species;
pub mod wilson;

pub use correlations::{
    liquid_enthalpy, liquid_heat_capacity, saturation_pressure, vapor_enthalpy,
    vapor_heat_capacity,
};
pub use error::{PropsError, PropsResult};
pub use species::{N_SPECIES, Species, SpeciesData};
pub use wilson::WilsonModel;
