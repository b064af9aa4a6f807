//! Scenario file format
//!
//! ```yaml
//! meta:
//!   name: Propagation spread
//!   hypothesis: Offsets let some simultaneous transmissions through
//! seed: "0x2a2a..."          # optional, 64 hex digits
//! inject: [0, 1]             # optional forced arrivals before slot 1
//! csv_output: events.csv     # optional per-slot event export
//! config:
//!   num_nodes: 10
//!   slots: 2000
//!   arrival_prob: 0.05
//!   propagation_max: 1.5
//! ```

use std::fs;
use std::path::Path;

use aloha_sim::{NodeId, SimConfig};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },

    #[error("invalid hex seed: {0}")]
    Seed(String),
}

#[derive(Debug, Deserialize)]
pub struct ScenarioFile {
    #[serde(default)]
    pub meta: ScenarioMeta,

    #[serde(default)]
    pub seed: Option<String>,

    /// Nodes that receive a packet before the first slot
    #[serde(default)]
    pub inject: Vec<NodeId>,

    #[serde(default)]
    pub csv_output: Option<String>,

    #[serde(default)]
    pub config: SimConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScenarioMeta {
    pub name: Option<String>,
    pub description: Option<String>,
    pub hypothesis: Option<String>,
}

impl ScenarioFile {
    /// Build the run configuration; `seed_override` wins over the file's seed
    pub fn sim_config(&self, seed_override: Option<[u8; 32]>) -> Result<SimConfig, ScenarioError> {
        let mut config = self.config.clone();
        config.seed = match (seed_override, &self.seed) {
            (Some(seed), _) => Some(seed),
            (None, Some(hex)) => Some(parse_seed_hex(hex)?),
            (None, None) => None,
        };
        Ok(config)
    }
}

pub fn load_scenario(path: &Path) -> Result<ScenarioFile, ScenarioError> {
    let yaml_content = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
        path: path.display().to_string(),
        source,
    })?;

    serde_yaml::from_str(&yaml_content).map_err(|source| ScenarioError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Parse up to 32 bytes of hex (optional `0x` prefix); missing bytes stay zero
pub fn parse_seed_hex(hex: &str) -> Result<[u8; 32], ScenarioError> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    let mut seed = [0u8; 32];

    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        if i >= 32 {
            break;
        }
        let byte_str =
            std::str::from_utf8(chunk).map_err(|_| ScenarioError::Seed(hex.to_string()))?;
        seed[i] =
            u8::from_str_radix(byte_str, 16).map_err(|_| ScenarioError::Seed(hex.to_string()))?;
    }

    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aloha_sim::CollisionPolicy;

    #[test]
    fn test_parse_seed_hex() {
        let seed = parse_seed_hex("0x2a01").unwrap();
        assert_eq!(seed[0], 0x2a);
        assert_eq!(seed[1], 0x01);
        assert!(seed[2..].iter().all(|&b| b == 0));

        assert!(parse_seed_hex("zz").is_err());
    }

    #[test]
    fn test_seed_override_wins() {
        let scenario: ScenarioFile =
            serde_yaml::from_str("seed: \"0x05\"\nconfig:\n  num_nodes: 3\n").unwrap();

        assert_eq!(scenario.sim_config(None).unwrap().seed.unwrap()[0], 5);
        assert_eq!(
            scenario.sim_config(Some([7u8; 32])).unwrap().seed,
            Some([7u8; 32])
        );
        assert_eq!(scenario.config.num_nodes, 3);
        assert!(scenario.inject.is_empty());
    }

    #[test]
    fn test_bundled_scenarios_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios");

        let spread = load_scenario(&dir.join("propagation_spread.yaml")).unwrap();
        let config = spread.sim_config(None).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.collision_policy(), CollisionPolicy::PropagationAware);

        let lockstep = load_scenario(&dir.join("exponent_one_lockstep.yaml")).unwrap();
        assert_eq!(lockstep.inject, vec![0, 1]);
        assert!(lockstep.sim_config(None).unwrap().validate().is_ok());

        let baseline = load_scenario(&dir.join("baseline.yaml")).unwrap();
        assert_eq!(
            baseline.sim_config(None).unwrap().collision_policy(),
            CollisionPolicy::Simple
        );
    }
}
