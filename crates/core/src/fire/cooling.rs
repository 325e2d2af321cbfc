//! Registered cooling contributors (hose streams, foam, wells)
//!
//! Each source is keyed by its [`SourceId`]; registering again overwrites and
//! removing an unknown id does nothing, so out-of-order add/remove from
//! independent senders cannot corrupt the set.

use crate::core_types::SourceId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Energy withdrawn by one cooling source, per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoolingEnergy {
    /// Removed from a burning unit's fire energy
    pub extinguish: f32,
    /// Removed from a non-burning unit's received energy, preventing re-ignition
    pub cooling: f32,
}

impl CoolingEnergy {
    /// Build from raw values; negative or non-finite inputs become zero
    pub fn new(extinguish: f32, cooling: f32) -> Self {
        Self {
            extinguish: sanitize(extinguish),
            cooling: sanitize(cooling),
        }
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Active cooling sources of one receiver
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoolingSources {
    sources: FxHashMap<SourceId, CoolingEnergy>,
}

impl CoolingSources {
    /// Register or overwrite a source
    pub fn insert(&mut self, source: SourceId, energy: CoolingEnergy) {
        self.sources.insert(source, energy);
    }

    /// Deregister a source; returns what was registered, if anything
    pub fn remove(&mut self, source: SourceId) -> Option<CoolingEnergy> {
        self.sources.remove(&source)
    }

    /// Registered energy of one source
    pub fn get(&self, source: SourceId) -> Option<CoolingEnergy> {
        self.sources.get(&source).copied()
    }

    /// Whether a source is registered
    pub fn contains(&self, source: SourceId) -> bool {
        self.sources.contains_key(&source)
    }

    /// Sum of all registered sources
    pub fn totals(&self) -> CoolingEnergy {
        self.sources
            .values()
            .fold(CoolingEnergy::default(), |acc, energy| CoolingEnergy {
                extinguish: acc.extinguish + energy.extinguish,
                cooling: acc.cooling + energy.cooling,
            })
    }

    /// Registered source ids in ascending order
    pub fn ids(&self) -> Vec<SourceId> {
        let mut ids: Vec<SourceId> = self.sources.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over registrations (arbitrary order)
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, CoolingEnergy)> + '_ {
        self.sources.iter().map(|(id, energy)| (*id, *energy))
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }
}
