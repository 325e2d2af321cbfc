//! Fire material archetypes
//!
//! A material holds the per-archetype constants the engine consumes. Host
//! objects reference materials by name; resolution may fail, in which case the
//! object simply never burns.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-archetype fire constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireMaterial {
    // Identification
    pub name: String,

    // Energy model
    pub combustion_energy: f32, // Maximum fire energy a unit can hold
    pub max_life: f32,          // Damage needed to destroy the object
    pub fire_resistance: f32,   // 0-1, fraction of incoming energy rejected

    // Explosive behaviour on destruction
    pub blast_force: f32,
    pub blast_radius: f32, // meters

    // Default fire radii
    pub hard_radius: f32, // meters, direct flame contact
    pub soft_radius: f32, // meters, radiant heat
}

impl FireMaterial {
    /// Timber-framed house section: long burn, no blast
    pub fn wooden_structure() -> Self {
        FireMaterial {
            name: "wooden_structure".to_string(),
            combustion_energy: 1000.0,
            max_life: 2000.0,
            fire_resistance: 0.1,
            blast_force: 0.0,
            blast_radius: 0.0,
            hard_radius: 3.0,
            soft_radius: 8.0,
        }
    }

    /// Brick or concrete section: burns slowly, resists incoming heat
    pub fn masonry() -> Self {
        FireMaterial {
            name: "masonry".to_string(),
            combustion_energy: 600.0,
            max_life: 4000.0,
            fire_resistance: 0.6,
            blast_force: 0.0,
            blast_radius: 0.0,
            hard_radius: 2.0,
            soft_radius: 5.0,
        }
    }

    /// Passenger vehicle: fuel tank explodes when burned out
    pub fn vehicle() -> Self {
        FireMaterial {
            name: "vehicle".to_string(),
            combustion_energy: 400.0,
            max_life: 500.0,
            fire_resistance: 0.2,
            blast_force: 800.0,
            blast_radius: 10.0,
            hard_radius: 2.5,
            soft_radius: 6.0,
        }
    }

    /// Dry vegetation (hedges, bushes): ignites and burns out quickly
    pub fn vegetation() -> Self {
        FireMaterial {
            name: "vegetation".to_string(),
            combustion_energy: 150.0,
            max_life: 100.0,
            fire_resistance: 0.0,
            blast_force: 0.0,
            blast_radius: 0.0,
            hard_radius: 1.0,
            soft_radius: 3.0,
        }
    }

    /// Pressurised gas tank: small fire load, violent blast
    pub fn gas_tank() -> Self {
        FireMaterial {
            name: "gas_tank".to_string(),
            combustion_energy: 200.0,
            max_life: 150.0,
            fire_resistance: 0.3,
            blast_force: 2500.0,
            blast_radius: 20.0,
            hard_radius: 1.5,
            soft_radius: 4.0,
        }
    }

    /// Check the numeric fields the engine relies on
    ///
    /// # Errors
    /// Returns [`MaterialError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), MaterialError> {
        let invalid = |field: &'static str, value: f32| MaterialError::Invalid {
            name: self.name.clone(),
            field,
            value,
        };

        if !self.combustion_energy.is_finite() || self.combustion_energy <= 0.0 {
            return Err(invalid("combustion_energy", self.combustion_energy));
        }
        if !self.max_life.is_finite() || self.max_life <= 0.0 {
            return Err(invalid("max_life", self.max_life));
        }
        if !self.fire_resistance.is_finite() {
            return Err(invalid("fire_resistance", self.fire_resistance));
        }
        if !self.blast_force.is_finite() || self.blast_force < 0.0 {
            return Err(invalid("blast_force", self.blast_force));
        }
        if !self.blast_radius.is_finite() || self.blast_radius < 0.0 {
            return Err(invalid("blast_radius", self.blast_radius));
        }
        if !self.hard_radius.is_finite() {
            return Err(invalid("hard_radius", self.hard_radius));
        }
        if !self.soft_radius.is_finite() {
            return Err(invalid("soft_radius", self.soft_radius));
        }
        Ok(())
    }

    /// Multiplier applied to received energy (`1 - fire_resistance`, clamped)
    #[must_use]
    pub fn received_energy_factor(&self) -> f32 {
        (1.0 - self.fire_resistance).clamp(0.0, 1.0)
    }

    /// Whether destruction produces a blast
    #[must_use]
    pub fn is_explosive(&self) -> bool {
        self.blast_force > 0.0 && self.blast_radius > 0.0
    }
}

/// Errors resolving a material by name
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterialError {
    #[error("fire material '{0}' is not registered")]
    NotFound(String),
    #[error("fire material '{name}' has invalid {field}: {value}")]
    Invalid {
        name: String,
        field: &'static str,
        value: f32,
    },
}

/// Name-indexed material table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterialLibrary {
    materials: FxHashMap<String, FireMaterial>,
}

impl MaterialLibrary {
    /// Empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Library containing the built-in presets
    pub fn with_presets() -> Self {
        let mut library = Self::new();
        for material in [
            FireMaterial::wooden_structure(),
            FireMaterial::masonry(),
            FireMaterial::vehicle(),
            FireMaterial::vegetation(),
            FireMaterial::gas_tank(),
        ] {
            library.insert(material);
        }
        library
    }

    /// Register or replace a material under its own name
    pub fn insert(&mut self, material: FireMaterial) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Look up a material and check it is usable
    ///
    /// # Errors
    /// [`MaterialError::NotFound`] for unknown names, [`MaterialError::Invalid`]
    /// for registered materials with unusable values.
    pub fn resolve(&self, name: &str) -> Result<&FireMaterial, MaterialError> {
        let material = self
            .materials
            .get(name)
            .ok_or_else(|| MaterialError::NotFound(name.to_string()))?;
        material.validate()?;
        Ok(material)
    }

    /// Number of registered materials
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether no material is registered
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
