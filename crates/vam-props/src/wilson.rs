//! Wilson-type local-composition activity model for the liquid phase.
//!
//! The interaction energies are stored as a full n x n matrix indexed by the
//! model's species order, with the diagonal fixed at zero. The source model
//! excludes the self term from every sum (a zero placeholder, not the
//! textbook Lambda_ii = 1), and that convention is kept here.

use crate::error::{PropsError, PropsResult};
use crate::species::Species;
use vam_core::units::{constants::R_CAL, kelvin};
use vam_core::Real;

/// Binary interaction energy a_ij [cal/mol] for an ordered species pair.
///
/// Self pairs are zero by definition. Pairs involving a permanent gas are
/// zero by convention: a deliberate modeling simplification of the source,
/// not a missing value.
pub fn interaction_energy(i: Species, j: Species) -> Real {
    use Species::*;
    match (i, j) {
        (VAc, H2O) => 1384.6,
        (H2O, VAc) => 2266.4,
        (VAc, HAc) => -381.3,
        (HAc, VAc) => 768.6,
        (H2O, HAc) => 670.7,
        (HAc, H2O) => -696.5,
        _ => 0.0,
    }
}

/// Wilson activity-coefficient model over an ordered species list.
#[derive(Debug, Clone)]
pub struct WilsonModel {
    species: Vec<Species>,
    /// Molar liquid volumes, one per species, same order [ft^3/lb-mol].
    volumes: Vec<Real>,
    /// Interaction energies a_ij [cal/mol], row-major n x n, zero diagonal.
    energies: Vec<Real>,
}

impl WilsonModel {
    /// Build the model for a species list, pulling volumes from the constant
    /// table and energies from the process-wide pair table.
    pub fn for_species(species: &[Species]) -> PropsResult<Self> {
        let volumes = species.iter().map(|s| s.data().molar_volume).collect();
        let n = species.len();
        let mut energies = vec![0.0; n * n];
        for (i, &si) in species.iter().enumerate() {
            for (j, &sj) in species.iter().enumerate() {
                if i != j {
                    energies[i * n + j] = interaction_energy(si, sj);
                }
            }
        }
        Self::new(species.to_vec(), volumes, energies)
    }

    /// Build the model from explicit volumes and a row-major energy matrix.
    pub fn new(species: Vec<Species>, volumes: Vec<Real>, energies: Vec<Real>) -> PropsResult<Self> {
        let n = species.len();
        if n == 0 {
            return Err(PropsError::InvalidArg {
                what: "empty species list",
            });
        }
        if volumes.len() != n {
            return Err(PropsError::InvalidArg {
                what: "molar volume count does not match species list",
            });
        }
        if energies.len() != n * n {
            return Err(PropsError::InvalidArg {
                what: "interaction matrix is not n x n",
            });
        }
        if volumes.iter().any(|&v| !(v > 0.0)) {
            return Err(PropsError::DegenerateComposition {
                what: "non-positive molar volume",
            });
        }
        for i in 0..n {
            if energies[i * n + i] != 0.0 {
                return Err(PropsError::InvalidArg {
                    what: "interaction matrix diagonal must be zero",
                });
            }
        }
        Ok(Self {
            species,
            volumes,
            energies,
        })
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Interaction ratio matrix Lambda at absolute temperature `t_abs` [K]:
    /// `Lambda_ij = (v_i / v_j) exp(-a_ij / (R T_abs))`, zero diagonal.
    fn interaction_ratios(&self, t_abs: Real) -> Vec<Real> {
        let n = self.len();
        let mut lambda = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    lambda[i * n + j] = (self.volumes[i] / self.volumes[j])
                        * (-self.energies[i * n + j] / (R_CAL * t_abs)).exp();
                }
            }
        }
        lambda
    }

    /// Liquid activity coefficients for mole fractions `x` at `t` [degC].
    ///
    /// Returns one gamma per species in the model's order. Fails with
    /// [`PropsError::DegenerateComposition`] when any row sum
    /// `sum_k x_k Lambda_jk` is non-positive, which would put a zero under a
    /// log or a division; that is invalid input, not a solver failure.
    pub fn activity_coefficients(&self, x: &[Real], t: Real) -> PropsResult<Vec<Real>> {
        let n = self.len();
        if x.len() != n {
            return Err(PropsError::InvalidArg {
                what: "mole fraction count does not match species list",
            });
        }
        let t_abs = kelvin(t);
        if !(t_abs > 0.0) {
            return Err(PropsError::NonPhysical {
                what: "absolute temperature",
            });
        }
        if x.iter().any(|&xi| !xi.is_finite() || xi < 0.0) {
            return Err(PropsError::DegenerateComposition {
                what: "negative or non-finite mole fraction",
            });
        }

        let lambda = self.interaction_ratios(t_abs);

        // Row sums S_j = sum_k x_k Lambda_jk, reused by every gamma below.
        let mut row_sum = vec![0.0; n];
        for j in 0..n {
            let mut s = 0.0;
            for k in 0..n {
                s += x[k] * lambda[j * n + k];
            }
            if !(s > 0.0) {
                return Err(PropsError::DegenerateComposition {
                    what: "zero interaction row sum",
                });
            }
            row_sum[j] = s;
        }

        let mut gamma = Vec::with_capacity(n);
        for m in 0..n {
            // The inner denominator is row j's sum (the outer index), not
            // row m's. Pinned by a hand-computed binary case in the tests.
            let mut cross = 0.0;
            for j in 0..n {
                cross += x[j] * lambda[j * n + m] / row_sum[j];
            }
            gamma.push((1.0 - row_sum[m].ln() - cross).exp());
        }
        Ok(gamma)
    }
}
