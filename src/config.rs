use std::{
    fs,
    path::{Path, PathBuf},
};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::{pdg, LineageResult};

fn canonicalize_config_path(file_path: &str) -> LineageResult<PathBuf> {
    Ok(Path::new(&*shellexpand::full(file_path)?).canonicalize()?)
}

/// Thresholds for [`scan_generated`](crate::generated::scan_generated).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// A V0 whose creation vertex lies within this distance of the primary vertex is flagged as
    /// close to the primary vertex.
    pub close_to_pv_distance: f64,
    /// Minimum transverse momentum for a physical-primary $`\Lambda`$ to mark the event as having
    /// a high-$`p_T`$ $`\Lambda`$ (exclusive).
    pub high_pt_lambda_min_pt: f64,
    /// Maximum $`|\eta|`$ for the same check (exclusive).
    pub high_pt_lambda_max_abs_eta: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            close_to_pv_distance: 0.001,
            high_pt_lambda_min_pt: 2.0,
            high_pt_lambda_max_abs_eta: 1.2,
        }
    }
}

/// The recognized species sets used during tagging.
///
/// The defaults are the constants in [`pdg`]. A configuration file only needs to list the fields
/// it changes:
///
/// ```
/// use lineage_tag::TaggerConfig;
///
/// let config = TaggerConfig::from_json_str(r#"{ "v0_species": [3122, -3122] }"#).unwrap();
/// assert!(!config.is_v0_species(310));
/// assert!(config.is_cascade_species(3312));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// PDG codes of two-body ancestors whose rapidity is computed.
    pub v0_species: IndexSet<i32>,
    /// PDG codes of cascades. The generator-level scan matches these or their antiparticles.
    pub cascade_species: IndexSet<i32>,
    /// Generator-level scan thresholds.
    pub scan: ScanConfig,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            v0_species: pdg::DEFAULT_V0_SPECIES.into_iter().collect(),
            cascade_species: pdg::DEFAULT_CASCADE_SPECIES.into_iter().collect(),
            scan: ScanConfig::default(),
        }
    }
}

impl TaggerConfig {
    /// Parse a configuration from a JSON string. Missing fields take their default values.
    pub fn from_json_str(json: &str) -> LineageResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
    /// Load a configuration from a JSON file. The path may contain `~` and environment variables.
    pub fn open(file_path: &str) -> LineageResult<Self> {
        let path = canonicalize_config_path(file_path)?;
        let config = Self::from_json_str(&fs::read_to_string(&path)?)?;
        log::info!(
            "loaded tagger configuration from {} ({} V0 species, {} cascade species)",
            path.display(),
            config.v0_species.len(),
            config.cascade_species.len()
        );
        Ok(config)
    }
    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> LineageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    /// Whether `pdg` is a recognized V0 species.
    pub fn is_v0_species(&self, pdg: i32) -> bool {
        self.v0_species.contains(&pdg)
    }
    /// Whether `pdg` is a recognized cascade species.
    pub fn is_cascade_species(&self, pdg: i32) -> bool {
        self.cascade_species.contains(&pdg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LineageError;

    #[test]
    fn test_defaults() {
        let config = TaggerConfig::default();
        assert!(config.is_v0_species(pdg::LAMBDA));
        assert!(config.is_v0_species(-pdg::LAMBDA));
        assert!(config.is_v0_species(pdg::K0_SHORT));
        assert!(!config.is_v0_species(-pdg::K0_SHORT));
        assert!(!config.is_v0_species(pdg::PION_PLUS));
        assert!(!config.is_v0_species(pdg::JUNCTION));
        assert!(config.is_cascade_species(-pdg::OMEGA_MINUS));
        assert_eq!(config.scan.close_to_pv_distance, 0.001);
    }

    #[test]
    fn test_partial_json() {
        let config =
            TaggerConfig::from_json_str(r#"{ "scan": { "high_pt_lambda_min_pt": 3.5 } }"#).unwrap();
        assert_eq!(config.scan.high_pt_lambda_min_pt, 3.5);
        assert_eq!(config.scan.high_pt_lambda_max_abs_eta, 1.2);
        assert_eq!(config.v0_species, TaggerConfig::default().v0_species);
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let mut config = TaggerConfig::default();
        config.v0_species = [310, 3122].into_iter().collect();
        let parsed = TaggerConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.v0_species.first(), Some(&310));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            TaggerConfig::from_json_str(r#"{ "v0_species": "lambda" }"#),
            Err(LineageError::JsonError(_))
        ));
    }

    #[test]
    fn test_open() {
        let path = std::env::temp_dir().join("lineage_tag_test_open.json");
        fs::write(&path, r#"{ "cascade_species": [3334] }"#).unwrap();
        let config = TaggerConfig::open(path.to_str().unwrap()).unwrap();
        assert!(config.is_cascade_species(3334));
        assert!(!config.is_cascade_species(3312));
        fs::remove_file(&path).unwrap();
        assert!(matches!(
            TaggerConfig::open(path.to_str().unwrap()),
            Err(LineageError::IOError(_))
        ));
    }
}
