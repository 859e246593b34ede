//! Particle Data Group species codes. Antiparticles carry the negated code.

/// $`\pi^+`$
pub const PION_PLUS: i32 = 211;
/// $`K^+`$
pub const KAON_PLUS: i32 = 321;
/// $`K^0_S`$
pub const K0_SHORT: i32 = 310;
/// Proton
pub const PROTON: i32 = 2212;
/// $`\Lambda`$
pub const LAMBDA: i32 = 3122;
/// $`\Xi^-`$
pub const XI_MINUS: i32 = 3312;
/// $`\Omega^-`$
pub const OMEGA_MINUS: i32 = 3334;
/// PYTHIA string junction. Shows up in truth records with an all-zero four-momentum.
pub const JUNCTION: i32 = 88;

/// $`\Lambda`$ mass in GeV
pub const LAMBDA_MASS: f64 = 1.115683;
/// $`K^0_S`$ mass in GeV
pub const K0_SHORT_MASS: f64 = 0.497614;

/// The V0 species whose rapidity is computed by default: $`\Lambda`$, $`\bar\Lambda`$, $`K^0_S`$.
pub const DEFAULT_V0_SPECIES: [i32; 3] = [LAMBDA, -LAMBDA, K0_SHORT];
/// The cascade species recognized by default: $`\Xi^\mp`$, $`\Omega^\mp`$.
pub const DEFAULT_CASCADE_SPECIES: [i32; 4] = [XI_MINUS, -XI_MINUS, OMEGA_MINUS, -OMEGA_MINUS];

/// The mass used to turn a V0 decay length into a proper decay length, if one is known for the
/// species.
pub fn v0_mass(pdg: i32) -> Option<f64> {
    match pdg.abs() {
        LAMBDA => Some(LAMBDA_MASS),
        K0_SHORT => Some(K0_SHORT_MASS),
        _ => None,
    }
}

/// A short name for the species, if it is one of the codes above.
pub fn species_name(pdg: i32) -> Option<&'static str> {
    Some(match (pdg.abs(), pdg > 0) {
        (PION_PLUS, true) => "pi+",
        (PION_PLUS, false) => "pi-",
        (KAON_PLUS, true) => "K+",
        (KAON_PLUS, false) => "K-",
        (K0_SHORT, true) => "K0S",
        (PROTON, true) => "p",
        (PROTON, false) => "pbar",
        (LAMBDA, true) => "Lambda",
        (LAMBDA, false) => "AntiLambda",
        (XI_MINUS, true) => "Xi-",
        (XI_MINUS, false) => "Xi+",
        (OMEGA_MINUS, true) => "Omega-",
        (OMEGA_MINUS, false) => "Omega+",
        (JUNCTION, true) => "junction",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(species_name(LAMBDA), Some("Lambda"));
        assert_eq!(species_name(-XI_MINUS), Some("Xi+"));
        assert_eq!(species_name(12345), None);
    }

    #[test]
    fn masses() {
        assert_eq!(v0_mass(-LAMBDA), Some(LAMBDA_MASS));
        assert_eq!(v0_mass(K0_SHORT), Some(K0_SHORT_MASS));
        assert_eq!(v0_mass(XI_MINUS), None);
    }
}
