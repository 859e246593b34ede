use serde::{Deserialize, Serialize};

use crate::{
    config::TaggerConfig,
    forest::{LineageForest, Particle},
    pdg,
    utils::{distance, enums::Origin, vectors::Vec3},
};

/// Added to the momentum when converting a decay length into a proper decay length.
const MOMENTUM_EPSILON: f64 = 1e-10;
/// The proper decay length recorded for a particle with zero momentum.
pub const ZERO_MOMENTUM_DECAY_LENGTH: f64 = 1e5;
/// The proper decay length recorded when it cannot be computed.
pub const DECAY_LENGTH_SENTINEL: f64 = -1.0;

/// A generated cascade from the primary partition.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCascade {
    /// Handle in the forest
    pub handle: usize,
    /// PDG code
    pub pdg: i32,
    /// Transverse momentum
    pub pt: f64,
    /// Rapidity
    pub rapidity: f64,
}

/// A generated V0 from anywhere in the forest.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedV0 {
    /// Handle in the forest
    pub handle: usize,
    /// PDG code
    pub pdg: i32,
    /// Transverse momentum
    pub pt: f64,
    /// Rapidity
    pub rapidity: f64,
    /// Whether the creation vertex lies within
    /// [`ScanConfig::close_to_pv_distance`](crate::config::ScanConfig::close_to_pv_distance) of
    /// the primary vertex
    pub close_to_pv: bool,
    /// Whether the provider marks this particle as a physical primary
    pub physical_primary: bool,
    /// $`m L / p`$, where $`L`$ is the distance to the first daughter's creation vertex, or
    /// [`DECAY_LENGTH_SENTINEL`] without a daughter or a known mass for the species
    pub proper_decay_length: f64,
}

/// Everything [`scan_generated`] finds in one event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedScan {
    /// Recognized cascades in the primary partition, in handle order
    pub cascades: Vec<GeneratedCascade>,
    /// Recognized V0s anywhere in the forest, in handle order
    pub v0s: Vec<GeneratedV0>,
    /// Whether the event has a physical-primary $`\Lambda`$ passing the high-$`p_T`$ thresholds
    pub has_high_pt_lambda: bool,
}

impl GeneratedScan {
    /// The V0s which are physical primaries.
    pub fn physical_primary_v0s(&self) -> impl Iterator<Item = &GeneratedV0> {
        self.v0s.iter().filter(|v0| v0.physical_primary)
    }
    /// The V0s created close to the primary vertex.
    pub fn close_to_pv_v0s(&self) -> impl Iterator<Item = &GeneratedV0> {
        self.v0s.iter().filter(|v0| v0.close_to_pv)
    }
}

fn proper_decay_length(forest: &LineageForest, v0: &Particle) -> f64 {
    let Some(daughter) = v0
        .first_daughter
        .and_then(|handle| forest.particles().get(handle))
    else {
        return DECAY_LENGTH_SENTINEL;
    };
    let Some(mass) = pdg::v0_mass(v0.pdg) else {
        return DECAY_LENGTH_SENTINEL;
    };
    let length = distance(&v0.vertex, &daughter.vertex);
    let p = v0.p4.p() + MOMENTUM_EPSILON;
    if p != 0.0 {
        mass * length / p
    } else {
        ZERO_MOMENTUM_DECAY_LENGTH
    }
}

/// Scan a forest for the generated cascades and V0s of the species in `config`.
///
/// Cascades are only collected from the primary partition and match a configured species or its
/// antiparticle.
/// V0s are collected from the whole forest and matched exactly. Rapidities use the guarded
/// formula of [`Vec4::rapidity`](crate::Vec4::rapidity).
pub fn scan_generated(
    forest: &LineageForest,
    primary_vertex: &Vec3,
    config: &TaggerConfig,
) -> GeneratedScan {
    let mut scan = GeneratedScan::default();
    for (handle, particle) in forest.iter() {
        if forest.is_primary_index(handle)
            && (config.is_cascade_species(particle.pdg) || config.is_cascade_species(-particle.pdg))
        {
            scan.cascades.push(GeneratedCascade {
                handle,
                pdg: particle.pdg,
                pt: particle.pt(),
                rapidity: particle.p4.rapidity(),
            });
        }
        if !config.is_v0_species(particle.pdg) {
            continue;
        }
        let v0 = GeneratedV0 {
            handle,
            pdg: particle.pdg,
            pt: particle.pt(),
            rapidity: particle.p4.rapidity(),
            close_to_pv: distance(&particle.vertex, primary_vertex)
                <= config.scan.close_to_pv_distance,
            physical_primary: particle.origin == Origin::PhysicalPrimary,
            proper_decay_length: proper_decay_length(forest, particle),
        };
        if v0.physical_primary
            && particle.pdg == pdg::LAMBDA
            && particle.p4.eta().abs() < config.scan.high_pt_lambda_max_abs_eta
            && v0.pt > config.scan.high_pt_lambda_min_pt
        {
            scan.has_high_pt_lambda = true;
        }
        scan.v0s.push(v0);
    }
    log::trace!(
        "generated scan found {} cascades and {} V0s",
        scan.cascades.len(),
        scan.v0s.len()
    );
    scan
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{forest::test_forest, utils::vectors::Vec4};

    #[test]
    fn test_scan_test_forest() {
        let forest = test_forest();
        let scan = scan_generated(&forest, &Vec3::zero(), &TaggerConfig::default());
        assert_eq!(scan.cascades.len(), 1);
        assert_eq!(scan.cascades[0].handle, 0);
        assert_eq!(scan.cascades[0].pdg, pdg::XI_MINUS);
        assert_relative_eq!(
            scan.cascades[0].rapidity,
            forest.particles()[0].p4.rapidity()
        );
        let handles: Vec<usize> = scan.v0s.iter().map(|v0| v0.handle).collect();
        assert_eq!(handles, vec![1, 3]);
        assert!(!scan.has_high_pt_lambda);
    }

    #[test]
    fn test_v0_flags() {
        let forest = test_forest();
        let scan = scan_generated(&forest, &Vec3::zero(), &TaggerConfig::default());
        let k0s = scan.v0s[0];
        let lambda = scan.v0s[1];
        assert!(k0s.close_to_pv);
        assert!(k0s.physical_primary);
        assert!(!lambda.close_to_pv);
        assert!(!lambda.physical_primary);
        assert_eq!(scan.physical_primary_v0s().count(), 1);
        assert_eq!(scan.close_to_pv_v0s().count(), 1);
        // moving the primary vertex onto the Lambda flips both
        let scan = scan_generated(&forest, &Vec3::new(1.0, 2.0, 2.0), &TaggerConfig::default());
        assert!(!scan.v0s[0].close_to_pv);
        assert!(scan.v0s[1].close_to_pv);
    }

    #[test]
    fn test_proper_decay_length() {
        let forest = test_forest();
        let scan = scan_generated(&forest, &Vec3::zero(), &TaggerConfig::default());
        let k0s = forest.particles()[1].p4;
        let lambda = forest.particles()[3].p4;
        assert_relative_eq!(
            scan.v0s[0].proper_decay_length,
            pdg::K0_SHORT_MASS * 0.5 / (k0s.p() + 1e-10)
        );
        assert_relative_eq!(
            scan.v0s[1].proper_decay_length,
            pdg::LAMBDA_MASS * 3.0 / (lambda.p() + 1e-10)
        );
    }

    #[test]
    fn test_decay_length_edge_cases() {
        let forest = LineageForest::new(
            vec![
                Particle::new(pdg::LAMBDA, -1, Vec4::default(), Vec3::zero())
                    .with_first_daughter(1),
                Particle::new(pdg::PROTON, 0, Vec4::default(), Vec3::new(0.0, 0.0, 1.0)),
                Particle::new(
                    -pdg::LAMBDA,
                    -1,
                    Vec3::new(1.0, 0.0, 0.0).with_mass(1.0),
                    Vec3::zero(),
                ),
            ],
            3,
        )
        .unwrap();
        let scan = scan_generated(&forest, &Vec3::zero(), &TaggerConfig::default());
        // a V0 at rest still gets a finite value
        assert_relative_eq!(
            scan.v0s[0].proper_decay_length,
            pdg::LAMBDA_MASS * 1.0 / 1e-10
        );
        assert_eq!(scan.v0s[1].proper_decay_length, DECAY_LENGTH_SENTINEL);
        assert_eq!(scan.v0s[0].rapidity, crate::utils::vectors::RAPIDITY_SENTINEL);
    }

    #[test]
    fn test_high_pt_lambda() {
        let forest = LineageForest::new(
            vec![
                Particle::new(
                    pdg::LAMBDA,
                    -1,
                    Vec3::new(2.5, 0.0, 0.5).with_mass(pdg::LAMBDA_MASS),
                    Vec3::zero(),
                )
                .with_origin(Origin::PhysicalPrimary),
                Particle::new(
                    -pdg::LAMBDA,
                    -1,
                    Vec3::new(4.0, 0.0, 0.0).with_mass(pdg::LAMBDA_MASS),
                    Vec3::zero(),
                )
                .with_origin(Origin::PhysicalPrimary),
            ],
            2,
        )
        .unwrap();
        let config = TaggerConfig::default();
        assert!(scan_generated(&forest, &Vec3::zero(), &config).has_high_pt_lambda);
        let mut strict = config.clone();
        strict.scan.high_pt_lambda_min_pt = 3.0;
        // only the anti-Lambda is above 3 GeV, and it does not count
        assert!(!scan_generated(&forest, &Vec3::zero(), &strict).has_high_pt_lambda);
    }

    #[test]
    fn test_cascades_only_from_primaries() {
        let forest = LineageForest::new(
            vec![
                Particle::new(
                    -pdg::OMEGA_MINUS,
                    -1,
                    Vec3::new(1.0, 1.0, 0.0).with_mass(1.67245),
                    Vec3::zero(),
                ),
                Particle::new(
                    pdg::XI_MINUS,
                    0,
                    Vec3::new(1.0, 0.0, 0.0).with_mass(1.32171),
                    Vec3::zero(),
                ),
            ],
            1,
        )
        .unwrap();
        let scan = scan_generated(&forest, &Vec3::zero(), &TaggerConfig::default());
        assert_eq!(scan.cascades.len(), 1);
        assert_eq!(scan.cascades[0].pdg, -pdg::OMEGA_MINUS);
        assert!(scan.v0s.is_empty());
    }
}
