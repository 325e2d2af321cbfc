//! Engine tuning parameters
//!
//! All thresholds are fractions of the unit's own maximum (energy or life),
//! so a single configuration works across materials of very different size.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Configuration for the fire engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FireEngineConfig {
    /// Energy fraction separating `SmallFire` from `LargeFire` (0-1)
    pub small_fire_threshold: f32,

    /// Energy fraction above which a burning unit takes damage (0-1)
    pub combustion_threshold: f32,

    /// Energy fraction seeded by an explicit `start_fire` (0-1)
    pub ignition_energy_pct: f32,

    /// Self-sustaining growth of a burning unit, fraction of max energy per second
    pub combustion_growth_rate: f32,

    /// Damage per second at full energy, fraction of max life
    pub damage_rate: f32,

    /// Energy fraction at which a group child counts as capped for balancing (0-1)
    pub balancing_cap_pct: f32,

    /// Share of a capped child's overflow moved to siblings per tick (0-1)
    pub maximum_balancing_percent: f32,

    /// How long particles keep smoking after a fire goes out on its own (seconds)
    pub smoke_linger_seconds: f32,

    /// Energy fraction at which a large fire switches to the loudest audio bucket (0-1)
    pub audio_large_threshold: f32,

    /// Seed for random child selection when a group is ignited
    pub seed: u64,
}

impl Default for FireEngineConfig {
    /// Defaults tuned for structure fires burning for a few minutes
    fn default() -> Self {
        Self {
            small_fire_threshold: 0.5,
            combustion_threshold: 0.1,
            ignition_energy_pct: 0.1,
            combustion_growth_rate: 0.02,
            damage_rate: 0.02,
            balancing_cap_pct: 0.8,
            maximum_balancing_percent: 0.5,
            smoke_linger_seconds: 10.0,
            audio_large_threshold: 0.85,
            seed: 0,
        }
    }
}

impl FireEngineConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if the text is not valid JSON for this type.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config.validated())
    }

    /// Load a JSON configuration file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read and
    /// [`ConfigError::Parse`] if its contents are invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] if serialization fails.
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Copy with every field forced into its valid range
    ///
    /// Out-of-range values are clamped, non-finite values fall back to the
    /// default. Editor-time mistakes must never take down the simulation.
    #[must_use]
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        let fraction = |value: f32, fallback: f32, field: &str| -> f32 {
            if !value.is_finite() {
                warn!(field, value, "non-finite fire config value, using default");
                return fallback;
            }
            let clamped = value.clamp(0.0, 1.0);
            if clamped != value {
                warn!(field, value, clamped, "fire config value out of range, clamped");
            }
            clamped
        };
        let rate = |value: f32, fallback: f32, field: &str| -> f32 {
            if !value.is_finite() || value < 0.0 {
                warn!(field, value, "invalid fire config rate, using default");
                return fallback;
            }
            value
        };

        self.small_fire_threshold = fraction(
            self.small_fire_threshold,
            defaults.small_fire_threshold,
            "small_fire_threshold",
        );
        self.combustion_threshold = fraction(
            self.combustion_threshold,
            defaults.combustion_threshold,
            "combustion_threshold",
        );
        self.ignition_energy_pct = fraction(
            self.ignition_energy_pct,
            defaults.ignition_energy_pct,
            "ignition_energy_pct",
        );
        self.balancing_cap_pct = fraction(
            self.balancing_cap_pct,
            defaults.balancing_cap_pct,
            "balancing_cap_pct",
        );
        self.maximum_balancing_percent = fraction(
            self.maximum_balancing_percent,
            defaults.maximum_balancing_percent,
            "maximum_balancing_percent",
        );
        self.audio_large_threshold = fraction(
            self.audio_large_threshold,
            defaults.audio_large_threshold,
            "audio_large_threshold",
        );
        self.combustion_growth_rate = rate(
            self.combustion_growth_rate,
            defaults.combustion_growth_rate,
            "combustion_growth_rate",
        );
        self.damage_rate = rate(self.damage_rate, defaults.damage_rate, "damage_rate");
        self.smoke_linger_seconds = rate(
            self.smoke_linger_seconds,
            defaults.smoke_linger_seconds,
            "smoke_linger_seconds",
        );

        // A started fire must actually burn
        if self.ignition_energy_pct <= 0.0 {
            warn!("ignition_energy_pct must be positive, using default");
            self.ignition_energy_pct = defaults.ignition_energy_pct;
        }

        self
    }
}

/// Errors loading engine configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read fire config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse fire config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = FireEngineConfig::default();
        assert_eq!(config.clone().validated(), config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = FireEngineConfig::from_json_str(r#"{ "damage_rate": 0.5, "seed": 9 }"#)
            .expect("valid json");
        assert_eq!(config.damage_rate, 0.5);
        assert_eq!(config.seed, 9);
        assert_eq!(
            config.small_fire_threshold,
            FireEngineConfig::default().small_fire_threshold
        );
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let config = FireEngineConfig {
            small_fire_threshold: 3.0,
            maximum_balancing_percent: -1.0,
            damage_rate: -2.0,
            combustion_growth_rate: f32::NAN,
            ignition_energy_pct: 0.0,
            ..FireEngineConfig::default()
        }
        .validated();

        let defaults = FireEngineConfig::default();
        assert_eq!(config.small_fire_threshold, 1.0);
        assert_eq!(config.maximum_balancing_percent, 0.0);
        assert_eq!(config.damage_rate, defaults.damage_rate);
        assert_eq!(config.combustion_growth_rate, defaults.combustion_growth_rate);
        assert_eq!(config.ignition_energy_pct, defaults.ignition_energy_pct);
    }

    #[test]
    fn test_invalid_json() {
        let result = FireEngineConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config = FireEngineConfig {
            seed: 42,
            smoke_linger_seconds: 3.0,
            ..FireEngineConfig::default()
        };
        let text = config.to_json_string().expect("serializable");
        let parsed = FireEngineConfig::from_json_str(&text).expect("parsable");
        assert_eq!(parsed, config);
    }
}
