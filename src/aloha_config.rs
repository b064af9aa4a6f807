//! Configuration for the slotted ALOHA simulator

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest accepted backoff exponent, keeps `2^exp` inside a `u64`
pub const MAX_BACKOFF_EXP_LIMIT: u32 = 32;

/// Largest accepted propagation offset in slots. Interval ends stay exactly
/// representable as `f64` for any realistic slot count.
pub const MAX_PROPAGATION_DELAY: f64 = 4_294_967_296.0;

/// How simultaneous transmissions are classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// More than one transmitter in a slot means every transmitter collides
    Simple,

    /// One-slot-wide intervals shifted by a random propagation offset;
    /// only overlapping intervals collide
    PropagationAware,
}

/// What the `collisions` counter of the summary counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionCounting {
    /// One collision event per slot with at least one collided transmission
    #[default]
    PerSlot,

    /// One collision event per collided transmission. Only applies to the
    /// propagation-aware policy; a simple-policy slot always counts as a
    /// single collision event.
    PerTransmission,
}

/// Rejected configuration, reported before any slot is processed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("node count must be positive")]
    NoNodes,

    #[error("slot count must be positive")]
    NoSlots,

    #[error("arrival probability {0} is outside [0, 1]")]
    ArrivalProbability(f64),

    #[error("maximum propagation delay {0} must be a non-negative number no larger than 2^32")]
    PropagationDelay(f64),

    #[error("maximum backoff exponent {0} exceeds 32")]
    BackoffExponent(u32),
}

/// Main simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of contending nodes
    pub num_nodes: usize,

    /// Number of slots to simulate
    pub slots: u64,

    /// Per-node, per-slot probability that an idle node generates a packet
    pub arrival_prob: f64,

    /// Cap on the backoff exponent; the window never exceeds `2^max_backoff_exp`
    pub max_backoff_exp: u32,

    /// Upper bound of the uniform propagation offset, in slot units
    pub propagation_max: f64,

    /// Explicit policy; `None` picks one from `propagation_max`
    pub collision_policy: Option<CollisionPolicy>,

    pub collision_counting: CollisionCounting,

    /// Random seed (None = generate random)
    #[serde(skip)]
    pub seed: Option<[u8; 32]>,

    /// Emit one log line per slot event
    pub verbose: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_nodes: 10,
            slots: 2000,
            arrival_prob: 0.02,
            max_backoff_exp: 6,
            propagation_max: 0.0,
            collision_policy: None,
            collision_counting: CollisionCounting::PerSlot,
            seed: None,
            verbose: false,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_nodes == 0 {
            return Err(ConfigError::NoNodes);
        }
        if self.slots == 0 {
            return Err(ConfigError::NoSlots);
        }
        if !(0.0..=1.0).contains(&self.arrival_prob) {
            return Err(ConfigError::ArrivalProbability(self.arrival_prob));
        }
        if !(0.0..=MAX_PROPAGATION_DELAY).contains(&self.propagation_max) {
            return Err(ConfigError::PropagationDelay(self.propagation_max));
        }
        if self.max_backoff_exp > MAX_BACKOFF_EXP_LIMIT {
            return Err(ConfigError::BackoffExponent(self.max_backoff_exp));
        }
        Ok(())
    }

    /// Effective collision policy
    pub fn collision_policy(&self) -> CollisionPolicy {
        match self.collision_policy {
            Some(policy) => policy,
            None if self.propagation_max > 0.0 => CollisionPolicy::PropagationAware,
            None => CollisionPolicy::Simple,
        }
    }

    /// Effective collision counting; the simple policy always counts per slot
    pub fn collision_counting(&self) -> CollisionCounting {
        match self.collision_policy() {
            CollisionPolicy::Simple => CollisionCounting::PerSlot,
            CollisionPolicy::PropagationAware => self.collision_counting,
        }
    }

    /// Get or generate seed
    pub fn resolve_seed(&self) -> [u8; 32] {
        self.seed.unwrap_or_else(|| {
            let mut temp_rng = StdRng::from_entropy();
            let mut seed = [0u8; 32];
            temp_rng.fill_bytes(&mut seed);
            seed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.collision_policy(), CollisionPolicy::Simple);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let config = SimConfig {
            num_nodes: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoNodes));

        let config = SimConfig {
            slots: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoSlots));

        for p in [-0.1, 1.5] {
            let config = SimConfig {
                arrival_prob: p,
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ConfigError::ArrivalProbability(p)));
        }

        let config = SimConfig {
            arrival_prob: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ArrivalProbability(_))
        ));

        let config = SimConfig {
            propagation_max: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::PropagationDelay(-1.0)));

        for max in [f64::NAN, f64::INFINITY, f64::MAX, 1e17] {
            let config = SimConfig {
                propagation_max: max,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::PropagationDelay(_))
            ));
        }

        let config = SimConfig {
            propagation_max: MAX_PROPAGATION_DELAY,
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let config = SimConfig {
            max_backoff_exp: 40,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::BackoffExponent(40)));
    }

    #[test]
    fn test_arrival_probability_accepts_one() {
        let config = SimConfig {
            arrival_prob: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_follows_propagation() {
        let mut config = SimConfig {
            propagation_max: 0.5,
            ..Default::default()
        };
        assert_eq!(config.collision_policy(), CollisionPolicy::PropagationAware);

        config.collision_policy = Some(CollisionPolicy::Simple);
        assert_eq!(config.collision_policy(), CollisionPolicy::Simple);
    }

    #[test]
    fn test_per_transmission_counting_needs_propagation_policy() {
        let mut config = SimConfig {
            collision_counting: CollisionCounting::PerTransmission,
            ..Default::default()
        };
        assert_eq!(config.collision_counting(), CollisionCounting::PerSlot);

        config.collision_policy = Some(CollisionPolicy::PropagationAware);
        assert_eq!(config.collision_counting(), CollisionCounting::PerTransmission);
    }

    #[test]
    fn test_resolve_seed_keeps_fixed_seed() {
        let config = SimConfig {
            seed: Some([9u8; 32]),
            ..Default::default()
        };
        assert_eq!(config.resolve_seed(), [9u8; 32]);
    }

    #[test]
    fn test_yaml_partial_override() {
        let yaml = "num_nodes: 4\npropagation_max: 1.5\ncollision_counting: per_transmission\n";
        let config: SimConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.num_nodes, 4);
        assert_eq!(config.slots, 2000);
        assert_eq!(config.collision_counting, CollisionCounting::PerTransmission);
        assert_eq!(config.collision_policy(), CollisionPolicy::PropagationAware);
    }
}
