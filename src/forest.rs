use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    pdg,
    utils::{
        enums::{IndexStatus, Origin},
        vectors::{Vec3, Vec4},
    },
    LineageError, LineageResult,
};

/// Convert a framework label, where any negative value means "none", into a handle.
fn label_to_handle(label: i32) -> Option<usize> {
    usize::try_from(label).ok()
}

/// A single truth particle of a simulated event.
///
/// Particles only point backwards to their mother. The first-daughter handle is stored as the
/// provider reports it and is not needed for tagging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// The PDG species code.
    pub pdg: i32,
    /// Handle of the mother particle, if any.
    pub mother: Option<usize>,
    /// Handle of the first daughter particle, if any.
    pub first_daughter: Option<usize>,
    /// The provider's provenance classification.
    pub origin: Origin,
    /// The four-momentum.
    pub p4: Vec4,
    /// The creation vertex.
    pub vertex: Vec3,
}

impl Particle {
    /// Create a particle from a PDG code, a mother label (negative for none), a four-momentum and
    /// a creation vertex.
    pub fn new(pdg: i32, mother: i32, p4: Vec4, vertex: Vec3) -> Self {
        Self {
            pdg,
            mother: label_to_handle(mother),
            first_daughter: None,
            origin: Origin::Unknown,
            p4,
            vertex,
        }
    }
    /// Set the provenance classification.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }
    /// Set the first daughter from a label (negative for none).
    pub fn with_first_daughter(mut self, first_daughter: i32) -> Self {
        self.first_daughter = label_to_handle(first_daughter);
        self
    }
    /// The transverse momentum.
    pub fn pt(&self) -> f64 {
        self.p4.pt()
    }
}

impl Display for Particle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match pdg::species_name(self.pdg) {
            Some(name) => write!(f, "{name} ({})", self.pdg)?,
            None => write!(f, "{}", self.pdg)?,
        }
        write!(f, " {} at {}", self.p4, self.vertex)
    }
}

/// The truth track a reconstructed daughter is associated with.
///
/// Reconstructed tracks carry a signed label where the sign flags a poor-quality association.
/// The sign is not part of the handle, so [`DaughterRef::from_label`] takes the absolute value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DaughterRef(usize);

impl DaughterRef {
    /// Wrap a handle which is already known to be non-negative.
    pub fn new(handle: usize) -> Self {
        Self(handle)
    }
    /// Build from a reconstructed track's signed truth label.
    pub fn from_label(label: i32) -> Self {
        Self(label.unsigned_abs() as usize)
    }
    /// The handle into the forest.
    pub fn handle(&self) -> usize {
        self.0
    }
}

impl From<usize> for DaughterRef {
    fn from(handle: usize) -> Self {
        Self(handle)
    }
}

/// The truth information the tagger needs from an event's generator record.
pub trait TruthLineage: Sync {
    /// Look up a particle by handle, failing with [`LineageError::UnresolvedDaughter`] if there
    /// is no such particle.
    fn particle(&self, handle: usize) -> LineageResult<&Particle>;
    /// The number of particles in the primary partition. Handles below this count look primary.
    fn primary_count(&self) -> usize;
    /// The provenance classification of a particle.
    fn origin(&self, handle: usize) -> LineageResult<Origin> {
        Ok(self.particle(handle)?.origin)
    }
    /// Classify a handle against the primary partition.
    fn index_status(&self, handle: usize) -> IndexStatus {
        IndexStatus::classify(handle, self.primary_count())
    }
}

/// An event's particle genealogy, stored as an arena addressed by handle.
///
/// Construction checks every mother and daughter handle, so lookups which follow a particle's
/// back-references never fail on a [`LineageForest`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct LineageForest {
    particles: Vec<Particle>,
    primary_count: usize,
}

impl LineageForest {
    /// Build a forest from an ordered list of particles, the first `primary_count` of which make
    /// up the primary partition.
    pub fn new(particles: Vec<Particle>, primary_count: usize) -> LineageResult<Self> {
        let len = particles.len();
        if primary_count > len {
            return Err(LineageError::MalformedForest {
                reason: format!("primary count {primary_count} exceeds {len} particles"),
            });
        }
        for (handle, particle) in particles.iter().enumerate() {
            if let Some(mother) = particle.mother.filter(|&m| m >= len) {
                return Err(LineageError::MalformedForest {
                    reason: format!("particle {handle} has mother {mother} outside 0..{len}"),
                });
            }
            if let Some(daughter) = particle.first_daughter.filter(|&d| d >= len) {
                return Err(LineageError::MalformedForest {
                    reason: format!(
                        "particle {handle} has first daughter {daughter} outside 0..{len}"
                    ),
                });
            }
        }
        Ok(Self {
            particles,
            primary_count,
        })
    }
    /// The number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }
    /// Whether the forest holds no particles.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
    /// Whether `handle` falls in the primary partition.
    pub fn is_primary_index(&self, handle: usize) -> bool {
        handle < self.primary_count
    }
    /// All particles in handle order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
    /// Iterate over `(handle, particle)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.particles.iter().enumerate()
    }
}

impl TruthLineage for LineageForest {
    fn particle(&self, handle: usize) -> LineageResult<&Particle> {
        self.particles
            .get(handle)
            .ok_or(LineageError::UnresolvedDaughter {
                handle,
                len: self.particles.len(),
            })
    }
    fn primary_count(&self) -> usize {
        self.primary_count
    }
}

/// A small forest that can be used to test tagging. The primary vertex is at the origin.
///
/// | handle | species | mother | origin |
/// |---|---|---|---|
/// | 0 | $`\Xi^-`$ | - | physical primary |
/// | 1 | $`K^0_S`$ | - | physical primary |
/// | 2 | junction | - | unknown |
/// | 3 | $`\Lambda`$ | 0 | weak decay |
/// | 4 | $`p`$ | 3 | weak decay |
/// | 5 | $`\pi^-`$ | 3 | weak decay |
/// | 6 | $`\pi^-`$ (bachelor) | 0 | weak decay |
/// | 7 | $`\pi^+`$ | 1 | weak decay |
/// | 8 | $`\pi^-`$ | 1 | weak decay |
/// | 9 | $`p`$ | 2 | physical primary |
/// | 10 | $`\pi^-`$ | 2 | physical primary |
///
/// The first three particles form the primary partition.
pub fn test_forest() -> LineageForest {
    let pion_mass = 0.13957;
    let proton_mass = 0.938272;
    let lambda_vertex = Vec3::new(1.0, 2.0, 2.0);
    let lambda_decay = Vec3::new(3.0, 4.0, 3.0);
    let k0s_decay = Vec3::new(0.3, 0.4, 0.0);
    let particles = vec![
        Particle::new(
            pdg::XI_MINUS,
            -1,
            Vec3::new(1.0, 0.5, 2.0).with_mass(1.32171),
            Vec3::zero(),
        )
        .with_origin(Origin::PhysicalPrimary)
        .with_first_daughter(3),
        Particle::new(
            pdg::K0_SHORT,
            -1,
            Vec3::new(0.9, 1.2, -0.4).with_mass(pdg::K0_SHORT_MASS),
            Vec3::zero(),
        )
        .with_origin(Origin::PhysicalPrimary)
        .with_first_daughter(7),
        Particle::new(pdg::JUNCTION, -1, Vec4::default(), Vec3::zero()),
        Particle::new(
            pdg::LAMBDA,
            0,
            Vec3::new(0.8, 0.4, 1.6).with_mass(pdg::LAMBDA_MASS),
            lambda_vertex,
        )
        .with_origin(Origin::SecondaryFromWeakDecay)
        .with_first_daughter(4),
        Particle::new(
            pdg::PROTON,
            3,
            Vec3::new(0.7, 0.3, 1.3).with_mass(proton_mass),
            lambda_decay,
        )
        .with_origin(Origin::SecondaryFromWeakDecay),
        Particle::new(
            -pdg::PION_PLUS,
            3,
            Vec3::new(0.1, 0.1, 0.3).with_mass(pion_mass),
            lambda_decay,
        )
        .with_origin(Origin::SecondaryFromWeakDecay),
        Particle::new(
            -pdg::PION_PLUS,
            0,
            Vec3::new(0.2, 0.1, 0.4).with_mass(pion_mass),
            lambda_vertex,
        )
        .with_origin(Origin::SecondaryFromWeakDecay),
        Particle::new(
            pdg::PION_PLUS,
            1,
            Vec3::new(0.6, 0.5, -0.1).with_mass(pion_mass),
            k0s_decay,
        )
        .with_origin(Origin::SecondaryFromWeakDecay),
        Particle::new(
            -pdg::PION_PLUS,
            1,
            Vec3::new(0.3, 0.7, -0.3).with_mass(pion_mass),
            k0s_decay,
        )
        .with_origin(Origin::SecondaryFromWeakDecay),
        Particle::new(
            pdg::PROTON,
            2,
            Vec3::new(0.4, -0.2, 0.9).with_mass(proton_mass),
            Vec3::zero(),
        )
        .with_origin(Origin::PhysicalPrimary),
        Particle::new(
            -pdg::PION_PLUS,
            2,
            Vec3::new(-0.3, 0.2, 0.1).with_mass(pion_mass),
            Vec3::zero(),
        )
        .with_origin(Origin::PhysicalPrimary),
    ];
    LineageForest::new(particles, 3).expect("Test forest should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(DaughterRef::from_label(-7).handle(), 7);
        assert_eq!(DaughterRef::from_label(7).handle(), 7);
        assert_eq!(DaughterRef::from(3).handle(), 3);
        assert_eq!(Particle::new(211, -1, Vec4::default(), Vec3::zero()).mother, None);
        assert_eq!(Particle::new(211, 0, Vec4::default(), Vec3::zero()).mother, Some(0));
        assert_eq!(
            Particle::default().with_first_daughter(-1).first_daughter,
            None
        );
    }

    #[test]
    fn test_forest_lookup() {
        let forest = test_forest();
        assert_eq!(forest.len(), 11);
        assert!(!forest.is_empty());
        assert_eq!(forest.primary_count(), 3);
        assert_eq!(forest.particle(3).unwrap().pdg, pdg::LAMBDA);
        assert_eq!(forest.particle(3).unwrap().mother, Some(0));
        assert_eq!(forest.origin(0).unwrap(), Origin::PhysicalPrimary);
        assert_eq!(forest.origin(2).unwrap(), Origin::Unknown);
        assert!(forest.is_primary_index(2));
        assert!(!forest.is_primary_index(3));
        assert_eq!(forest.index_status(9), IndexStatus::SecondaryLike);
        assert_eq!(forest.iter().filter(|(_, p)| p.mother == Some(3)).count(), 2);
    }

    #[test]
    fn test_forest_out_of_range() {
        let forest = test_forest();
        assert!(matches!(
            forest.particle(11),
            Err(LineageError::UnresolvedDaughter { handle: 11, len: 11 })
        ));
        assert!(forest.origin(100).is_err());
    }

    #[test]
    fn test_malformed_forest() {
        let dangling = vec![
            Particle::new(pdg::LAMBDA, -1, Vec4::default(), Vec3::zero()),
            Particle::new(pdg::PROTON, 5, Vec4::default(), Vec3::zero()),
        ];
        assert!(matches!(
            LineageForest::new(dangling, 1),
            Err(LineageError::MalformedForest { .. })
        ));
        let bad_daughter =
            vec![Particle::new(pdg::LAMBDA, -1, Vec4::default(), Vec3::zero()).with_first_daughter(1)];
        assert!(matches!(
            LineageForest::new(bad_daughter, 1),
            Err(LineageError::MalformedForest { .. })
        ));
        assert!(matches!(
            LineageForest::new(vec![Particle::default()], 2),
            Err(LineageError::MalformedForest { .. })
        ));
        assert!(LineageForest::new(vec![], 0).unwrap().is_empty());
    }

    #[test]
    fn test_particle_display() {
        let forest = test_forest();
        let display = format!("{}", forest.particle(3).unwrap());
        assert!(display.starts_with("Lambda (3122) [e = "));
        assert!(display.ends_with("at [ 1.000,  2.000,  2.000]"));
        assert!(format!("{}", Particle::new(99999, -1, Vec4::default(), Vec3::zero()))
            .starts_with("99999 "));
    }
}
