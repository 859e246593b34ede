#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::TaggerConfig,
    forest::{DaughterRef, Particle, TruthLineage},
    utils::{
        distance,
        enums::{IndexStatus, Origin},
        vectors::{Vec3, RAPIDITY_SENTINEL},
    },
    LineageResult,
};

/// The PDG code recorded for an unmatched ancestor or mother.
pub const PDG_SENTINEL: i32 = -1;
/// The transverse momentum recorded for an unmatched ancestor or mother.
pub const PT_SENTINEL: f64 = -1.0;
/// The creation radius recorded for an unmatched ancestor.
pub const RADIUS_SENTINEL: f64 = -1.0;
/// The PDG code recorded for a daughter or cascade which was not resolved or not matched.
pub const UNTAGGED_PDG: i32 = 0;

/// Truth information for a two-body (V0) candidate.
///
/// Every ancestor and mother field starts at its sentinel and is only filled when both daughters
/// point to the same, defined mother. The daughter fields are filled whenever the daughters
/// resolve.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagResult {
    /// PDG code of the positive daughter's truth particle
    pub pos_pdg: i32,
    /// PDG code of the negative daughter's truth particle
    pub neg_pdg: i32,
    /// True transverse momentum of the positive daughter
    pub pos_pt: f64,
    /// True transverse momentum of the negative daughter
    pub neg_pt: f64,
    /// Handle of the common ancestor
    pub handle: Option<usize>,
    /// PDG code of the common ancestor
    pub pdg: i32,
    /// Transverse momentum of the common ancestor
    pub pt: f64,
    /// Rapidity of the common ancestor, only computed for recognized V0 species
    pub rapidity: f64,
    /// Distance from the common ancestor's creation vertex to the primary vertex
    pub creation_radius: f64,
    /// Provenance of the common ancestor
    pub origin: Origin,
    /// Position of the common ancestor relative to the primary partition
    pub index_status: IndexStatus,
    /// Handle of the common ancestor's mother
    pub mother_handle: Option<usize>,
    /// PDG code of the common ancestor's mother
    pub mother_pdg: i32,
    /// Transverse momentum of the common ancestor's mother
    pub mother_pt: f64,
    /// Provenance of the common ancestor's mother
    pub mother_origin: Origin,
    /// Position of the common ancestor's mother relative to the primary partition
    pub mother_index_status: IndexStatus,
}

impl Default for TagResult {
    fn default() -> Self {
        Self {
            pos_pdg: UNTAGGED_PDG,
            neg_pdg: UNTAGGED_PDG,
            pos_pt: PT_SENTINEL,
            neg_pt: PT_SENTINEL,
            handle: None,
            pdg: PDG_SENTINEL,
            pt: PT_SENTINEL,
            rapidity: RAPIDITY_SENTINEL,
            creation_radius: RADIUS_SENTINEL,
            origin: Origin::Unknown,
            index_status: IndexStatus::Unknown,
            mother_handle: None,
            mother_pdg: PDG_SENTINEL,
            mother_pt: PT_SENTINEL,
            mother_origin: Origin::Unknown,
            mother_index_status: IndexStatus::Unknown,
        }
    }
}

impl TagResult {
    /// Whether the daughters were matched to a common ancestor.
    pub fn is_matched(&self) -> bool {
        self.handle.is_some()
    }
}

/// Truth information for a cascade candidate: a V0 plus a bachelor track.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CascadeTagResult {
    /// The tag of the V0 daughters
    pub v0: TagResult,
    /// PDG code of the bachelor's truth particle
    pub bachelor_pdg: i32,
    /// True transverse momentum of the bachelor
    pub bachelor_pt: f64,
    /// Handle of the particle all three daughters descend from
    pub handle: Option<usize>,
    /// PDG code of the mother of the V0 reached through the positive daughter
    pub pos_grandmother_pdg: i32,
    /// PDG code of the mother of the V0 reached through the negative daughter
    pub neg_grandmother_pdg: i32,
    /// PDG code of the bachelor's mother
    pub bachelor_mother_pdg: i32,
    /// PDG code of the cascade, set only when the three codes above agree
    pub pdg: i32,
}

impl Default for CascadeTagResult {
    fn default() -> Self {
        Self {
            v0: TagResult::default(),
            bachelor_pdg: UNTAGGED_PDG,
            bachelor_pt: PT_SENTINEL,
            handle: None,
            pos_grandmother_pdg: UNTAGGED_PDG,
            neg_grandmother_pdg: UNTAGGED_PDG,
            bachelor_mother_pdg: UNTAGGED_PDG,
            pdg: UNTAGGED_PDG,
        }
    }
}

impl CascadeTagResult {
    /// Whether the cascade was tagged with a consistent PDG code.
    pub fn is_matched(&self) -> bool {
        self.pdg != UNTAGGED_PDG
    }
}

fn common_mother(a: &Particle, b: &Particle) -> Option<usize> {
    match (a.mother, b.mother) {
        (Some(ma), Some(mb)) if ma == mb => Some(ma),
        _ => None,
    }
}

fn grandmother<L: TruthLineage + ?Sized>(
    lineage: &L,
    particle: &Particle,
) -> LineageResult<Option<usize>> {
    match particle.mother {
        Some(mother) => Ok(lineage.particle(mother)?.mother),
        None => Ok(None),
    }
}

fn log_skipped<T>(index: usize, result: LineageResult<T>) -> LineageResult<T> {
    if let Err(err) = &result {
        log::debug!("skipping candidate {index}: {err}");
    }
    result
}

/// Matches reconstructed decay candidates to their Monte-Carlo truth ancestors.
///
/// A [`Tagger`] holds no per-event state, so one instance can tag every candidate of every event,
/// from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Tagger {
    config: TaggerConfig,
}

impl Tagger {
    /// Create a tagger with the given species configuration.
    pub fn new(config: TaggerConfig) -> Self {
        Self { config }
    }
    /// The species configuration.
    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Tag a two-body candidate from its positive and negative daughters.
    ///
    /// The daughters are matched when they share a defined mother. That mother's PDG code, $`p_T`$,
    /// creation radius relative to `primary_vertex` and both provenance classifications are
    /// recorded, and its rapidity if it is one of the configured V0 species. If the ancestor has a
    /// mother of its own, that particle is recorded as well.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::UnresolvedDaughter`](crate::LineageError::UnresolvedDaughter) if
    /// either daughter is not in the forest. Unmatched daughters are not an error.
    pub fn tag_two_body<L: TruthLineage + ?Sized>(
        &self,
        pos: DaughterRef,
        neg: DaughterRef,
        lineage: &L,
        primary_vertex: &Vec3,
    ) -> LineageResult<TagResult> {
        let mc_pos = lineage.particle(pos.handle())?;
        let mc_neg = lineage.particle(neg.handle())?;
        let mut tag = TagResult {
            pos_pdg: mc_pos.pdg,
            neg_pdg: mc_neg.pdg,
            pos_pt: mc_pos.pt(),
            neg_pt: mc_neg.pt(),
            ..Default::default()
        };
        let Some(ancestor) = common_mother(mc_pos, mc_neg) else {
            log::trace!(
                "daughters {} and {} have no common mother",
                pos.handle(),
                neg.handle()
            );
            return Ok(tag);
        };
        let v0 = lineage.particle(ancestor)?;
        tag.handle = Some(ancestor);
        tag.pdg = v0.pdg;
        tag.pt = v0.pt();
        // Junction placeholders have an all-zero four-momentum, so only recognized species get a
        // rapidity
        if self.config.is_v0_species(v0.pdg) {
            tag.rapidity = v0.p4.rapidity();
        }
        tag.creation_radius = distance(&v0.vertex, primary_vertex);
        tag.origin = lineage.origin(ancestor)?;
        tag.index_status = lineage.index_status(ancestor);
        if let Some(mother) = v0.mother {
            let parent = lineage.particle(mother)?;
            tag.mother_handle = Some(mother);
            tag.mother_pdg = parent.pdg;
            tag.mother_pt = parent.pt();
            tag.mother_origin = lineage.origin(mother)?;
            tag.mother_index_status = lineage.index_status(mother);
        }
        Ok(tag)
    }

    /// Tag a cascade candidate from the positive and negative daughters of its V0 and its
    /// bachelor track.
    ///
    /// The V0 part is tagged exactly as in [`Tagger::tag_two_body`]. The cascade is matched when
    /// the V0's mother is also the bachelor's mother. The PDG code of that particle is then looked
    /// up three times, through the positive daughter, the negative daughter and the bachelor, and
    /// is only recorded as the cascade's code if all three agree.
    ///
    /// # Errors
    ///
    /// Returns [`LineageError::UnresolvedDaughter`](crate::LineageError::UnresolvedDaughter) if
    /// any of the three daughters is not in the forest.
    pub fn tag_cascade<L: TruthLineage + ?Sized>(
        &self,
        pos: DaughterRef,
        neg: DaughterRef,
        bachelor: DaughterRef,
        lineage: &L,
        primary_vertex: &Vec3,
    ) -> LineageResult<CascadeTagResult> {
        let v0 = self.tag_two_body(pos, neg, lineage, primary_vertex)?;
        let mc_bachelor = lineage.particle(bachelor.handle())?;
        let mut tag = CascadeTagResult {
            v0,
            bachelor_pdg: mc_bachelor.pdg,
            bachelor_pt: mc_bachelor.pt(),
            ..Default::default()
        };
        if !v0.is_matched() {
            return Ok(tag);
        }
        let pos_grandmother = grandmother(lineage, lineage.particle(pos.handle())?)?;
        let neg_grandmother = grandmother(lineage, lineage.particle(neg.handle())?)?;
        let (via_pos, via_neg, via_bachelor) =
            match (pos_grandmother, neg_grandmother, mc_bachelor.mother) {
                (Some(p), Some(n), Some(b)) if p == n && p == b => (p, n, b),
                _ => {
                    log::trace!(
                        "bachelor {} does not share the mother of V0 {:?}",
                        bachelor.handle(),
                        v0.handle
                    );
                    return Ok(tag);
                }
            };
        let cascade = via_bachelor;
        tag.handle = Some(cascade);
        // These are all the same handle in a consistent forest. Each is looked up separately so a
        // provider which disagrees with itself leaves the cascade untagged.
        tag.pos_grandmother_pdg = lineage.particle(via_pos)?.pdg;
        tag.neg_grandmother_pdg = lineage.particle(via_neg)?.pdg;
        tag.bachelor_mother_pdg = lineage.particle(via_bachelor)?.pdg;
        if tag.bachelor_mother_pdg == tag.pos_grandmother_pdg
            && tag.bachelor_mother_pdg == tag.neg_grandmother_pdg
        {
            tag.pdg = tag.bachelor_mother_pdg;
        } else {
            log::warn!(
                "inconsistent PDG codes for cascade {cascade}: bachelor mother {}, V0 mother {} / {}",
                tag.bachelor_mother_pdg,
                tag.pos_grandmother_pdg,
                tag.neg_grandmother_pdg
            );
        }
        Ok(tag)
    }

    /// Tag many two-body candidates `(pos, neg)` from the same event.
    ///
    /// Results are returned in input order. A candidate whose daughters cannot be resolved gets an
    /// `Err` without affecting the others.
    pub fn tag_two_body_all<L: TruthLineage + ?Sized>(
        &self,
        candidates: &[(DaughterRef, DaughterRef)],
        lineage: &L,
        primary_vertex: &Vec3,
    ) -> Vec<LineageResult<TagResult>> {
        #[cfg(feature = "rayon")]
        let iter = candidates.par_iter().enumerate();
        #[cfg(not(feature = "rayon"))]
        let iter = candidates.iter().enumerate();
        iter.map(|(index, &(pos, neg))| {
            log_skipped(
                index,
                self.tag_two_body(pos, neg, lineage, primary_vertex),
            )
        })
        .collect()
    }

    /// Tag many cascade candidates `(pos, neg, bachelor)` from the same event.
    ///
    /// Results are returned in input order. A candidate whose daughters cannot be resolved gets an
    /// `Err` without affecting the others.
    pub fn tag_cascade_all<L: TruthLineage + ?Sized>(
        &self,
        candidates: &[(DaughterRef, DaughterRef, DaughterRef)],
        lineage: &L,
        primary_vertex: &Vec3,
    ) -> Vec<LineageResult<CascadeTagResult>> {
        #[cfg(feature = "rayon")]
        let iter = candidates.par_iter().enumerate();
        #[cfg(not(feature = "rayon"))]
        let iter = candidates.iter().enumerate();
        iter.map(|(index, &(pos, neg, bachelor))| {
            log_skipped(
                index,
                self.tag_cascade(pos, neg, bachelor, lineage, primary_vertex),
            )
        })
        .collect()
    }
}
