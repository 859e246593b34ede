use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::LineageError;

/// Provenance of a truth particle as reported by the lineage provider.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    /// The provider could not classify the particle.
    #[default]
    Unknown,
    /// Produced directly in the primary interaction.
    PhysicalPrimary,
    /// Produced in the weak decay of another particle.
    SecondaryFromWeakDecay,
    /// Produced in an interaction with detector material.
    SecondaryFromMaterial,
}
impl Origin {
    /// The integer encoding used in flat output records (`0` unknown, `1` primary, `2` weak decay,
    /// `3` material).
    pub fn code(&self) -> i32 {
        match self {
            Origin::Unknown => 0,
            Origin::PhysicalPrimary => 1,
            Origin::SecondaryFromWeakDecay => 2,
            Origin::SecondaryFromMaterial => 3,
        }
    }
}
impl Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Unknown => write!(f, "Unknown"),
            Origin::PhysicalPrimary => write!(f, "Physical Primary"),
            Origin::SecondaryFromWeakDecay => write!(f, "Secondary (Weak Decay)"),
            Origin::SecondaryFromMaterial => write!(f, "Secondary (Material)"),
        }
    }
}
impl FromStr for Origin {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unknown" | "0" => Ok(Self::Unknown),
            "physicalprimary" | "physical primary" | "physical-primary" | "primary" | "1" => {
                Ok(Self::PhysicalPrimary)
            }
            "weakdecay" | "weak decay" | "weak-decay" | "weak" | "2" => {
                Ok(Self::SecondaryFromWeakDecay)
            }
            "material" | "secondary from material" | "3" => Ok(Self::SecondaryFromMaterial),
            _ => Err(LineageError::ParseError {
                name: s.to_string(),
                object: "Origin".to_string(),
            }),
        }
    }
}

/// Where a handle falls relative to the forest's primary partition.
///
/// This is recorded next to [`Origin`] because the two can disagree: a particle can sit below the
/// primary count without being a physical primary.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexStatus {
    /// No handle was classified.
    #[default]
    Unknown,
    /// The handle is below the primary count.
    PrimaryLike,
    /// The handle is at or above the primary count.
    SecondaryLike,
}
impl IndexStatus {
    /// Classify `handle` against a primary partition of size `primary_count`.
    pub fn classify(handle: usize, primary_count: usize) -> Self {
        if handle < primary_count {
            IndexStatus::PrimaryLike
        } else {
            IndexStatus::SecondaryLike
        }
    }
    /// The integer encoding used in flat output records (`0` unknown, `1` primary-like, `2`
    /// secondary-like).
    pub fn code(&self) -> i32 {
        match self {
            IndexStatus::Unknown => 0,
            IndexStatus::PrimaryLike => 1,
            IndexStatus::SecondaryLike => 2,
        }
    }
}
impl Display for IndexStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexStatus::Unknown => write!(f, "Unknown"),
            IndexStatus::PrimaryLike => write!(f, "Primary-like"),
            IndexStatus::SecondaryLike => write!(f, "Secondary-like"),
        }
    }
}
