//! vam-core: stable foundation for vamflow.
//!
//! Contains:
//! - numeric (Real + tolerances + float helpers)
//! - units (temperature conversions + model constants)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
