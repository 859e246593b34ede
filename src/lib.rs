//! # lineage-tag
//!
//! Monte-Carlo truth association for reconstructed V0 and cascade decay candidates.
//!
//! A simulated event's particle genealogy is held in a [`LineageForest`], an arena of
//! [`Particle`]s addressed by integer handle where each particle only knows its mother. Given the
//! truth labels of a candidate's daughter tracks, a [`Tagger`] walks those back-references and
//! reports whether the daughters come from a common ancestor, what that ancestor was, and where it
//! came from:
//!
//! ```
//! use lineage_tag::{forest::test_forest, DaughterRef, Tagger, Vec3};
//!
//! let forest = test_forest();
//! let tagger = Tagger::default();
//! let tag = tagger
//!     .tag_two_body(
//!         DaughterRef::from_label(4),
//!         DaughterRef::from_label(-5),
//!         &forest,
//!         &Vec3::zero(),
//!     )
//!     .unwrap();
//! assert_eq!(tag.pdg, 3122);
//! ```
//!
//! "No match" is not an error: uncorrelated daughter pairs give a [`TagResult`] whose fields all
//! keep their sentinel values. Only handles which do not exist in the forest produce a
//! [`LineageError`].
#![warn(clippy::perf, clippy::style, missing_docs)]
#![allow(clippy::excessive_precision)]

use thiserror::Error;

/// Tunable species sets and thresholds for the [`Tagger`] and the generator-level scan.
pub mod config;
/// The particle arena and the [`TruthLineage`] provider trait.
pub mod forest;
/// Generator-level scans over all V0 and cascade species in a [`LineageForest`].
pub mod generated;
/// PDG species codes and masses used by default.
pub mod pdg;
/// Ancestor matching for two-body and cascade decay candidates.
pub mod tagger;
/// Utility enums and vector types.
pub mod utils;

pub use crate::config::{ScanConfig, TaggerConfig};
pub use crate::forest::{DaughterRef, LineageForest, Particle, TruthLineage};
pub use crate::generated::{scan_generated, GeneratedCascade, GeneratedScan, GeneratedV0};
pub use crate::tagger::{CascadeTagResult, TagResult, Tagger};
pub use crate::utils::enums::{IndexStatus, Origin};
pub use crate::utils::vectors::{Vec3, Vec4};

/// Shorthand for a [`Result`] with a [`LineageError`].
pub type LineageResult<T> = Result<T, LineageError>;

/// The error type used by all `lineage-tag` methods
#[derive(Error, Debug)]
pub enum LineageError {
    /// A handle does not point into the forest. This usually means the track's truth label belongs
    /// to a different event or was corrupted, and only the affected candidate should be skipped.
    #[error("Unresolved daughter: handle {handle} is out of range for a forest of {len} particles")]
    UnresolvedDaughter {
        /// The handle which failed lookup
        handle: usize,
        /// Number of particles in the forest
        len: usize,
    },
    /// A [`LineageForest`] could not be built from the given particles.
    #[error("Malformed lineage forest: {reason}")]
    MalformedForest {
        /// What was wrong with the input
        reason: String,
    },
    /// An alias for [`std::io::Error`].
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),
    /// An alias for [`serde_json::Error`].
    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),
    /// An alias for [`shellexpand::LookupError`].
    #[error("Failed to expand path: {0}")]
    LookupError(#[from] shellexpand::LookupError<std::env::VarError>),
    /// An error which occurs when the user tries to parse an invalid string of text, typically
    /// into an enum variant.
    #[error("Failed to parse string: \"{name}\" does not correspond to a valid \"{object}\"!")]
    ParseError {
        /// The string which was parsed
        name: String,
        /// The name of the object it failed to parse into
        object: String,
    },
    /// A custom fallback error for errors too complex or too infrequent to warrant their own error
    /// category.
    #[error("{0}")]
    Custom(String),
}

impl Clone for LineageError {
    // io and serde errors are not cloneable, so those are flattened into their message
    fn clone(&self) -> Self {
        match self {
            LineageError::UnresolvedDaughter { handle, len } => LineageError::UnresolvedDaughter {
                handle: *handle,
                len: *len,
            },
            LineageError::MalformedForest { reason } => LineageError::MalformedForest {
                reason: reason.clone(),
            },
            LineageError::ParseError { name, object } => LineageError::ParseError {
                name: name.clone(),
                object: object.clone(),
            },
            _ => LineageError::Custom(self.to_string()),
        }
    }
}
