//! Lingering smoke after a fire goes out
//!
//! When a unit stops burning through the simulation its particles keep
//! smoking for a while. Each registration is keyed by the unit and is removed
//! either by expiring or by an explicit cancel; `stop_fire`, `cleanup`,
//! re-ignition and despawn cancel in the same call.

use crate::core_types::UnitId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Remaining smoke time of one unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmokeLinger {
    pub remaining: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmokeEffects {
    lingering: FxHashMap<UnitId, SmokeLinger>,
}

impl SmokeEffects {
    /// Start (or restart) smoke for a unit
    pub fn register(&mut self, unit: UnitId, seconds: f32) {
        self.lingering.insert(
            unit,
            SmokeLinger {
                remaining: seconds.max(0.0),
            },
        );
    }

    /// Drop a registration; true if one existed
    pub fn cancel(&mut self, unit: UnitId) -> bool {
        self.lingering.remove(&unit).is_some()
    }

    pub fn is_lingering(&self, unit: UnitId) -> bool {
        self.lingering.contains_key(&unit)
    }

    pub fn remaining(&self, unit: UnitId) -> Option<f32> {
        self.lingering.get(&unit).map(|linger| linger.remaining)
    }

    /// Advance all registrations; returns the units whose smoke ended
    pub fn tick(&mut self, dt: f32) -> Vec<UnitId> {
        let mut expired = Vec::new();
        self.lingering.retain(|unit, linger| {
            linger.remaining -= dt;
            if linger.remaining <= 0.0 {
                expired.push(*unit);
                false
            } else {
                true
            }
        });
        expired
    }

    pub fn len(&self) -> usize {
        self.lingering.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lingering.is_empty()
    }
}
