/// Useful enumerations for classifying the provenance of truth particles.
pub mod enums;
/// Three-vectors and four-momenta with the kinematic quantities used for truth matching.
pub mod vectors;

/// Euclidean distance between two points.
pub fn distance(a: &vectors::Vec3, b: &vectors::Vec3) -> f64 {
    (a - b).mag()
}
