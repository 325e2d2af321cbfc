//! Generational storage of fire entities
//!
//! Units, groups and particles live in separate [`SlotMap`] arenas. Handles
//! into them are plain copyable keys; a handle whose entity was removed
//! resolves to `None` instead of aliasing a newer entity.

use crate::core_types::{GroupId, ParticleId, UnitId};
use crate::fire::{FireGroup, FireUnit};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

/// Flags of one flame/smoke particle entity
///
/// `active` means flames are emitted, `visible` that the entity is shown at
/// all. A smoking particle is visible but inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FireParticle {
    pub active: bool,
    pub visible: bool,
}

impl FireParticle {
    pub const HIDDEN: FireParticle = FireParticle {
        active: false,
        visible: false,
    };
    pub const BURNING: FireParticle = FireParticle {
        active: true,
        visible: true,
    };
    pub const SMOKING: FireParticle = FireParticle {
        active: false,
        visible: true,
    };
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityRegistry {
    pub(crate) units: SlotMap<UnitId, FireUnit>,
    pub(crate) groups: SlotMap<GroupId, FireGroup>,
    pub(crate) particles: SlotMap<ParticleId, FireParticle>,
}

// Slot-by-slot comparison, handles included
impl PartialEq for EntityRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.units.iter().eq(other.units.iter())
            && self.groups.iter().eq(other.groups.iter())
            && self.particles.iter().eq(other.particles.iter())
    }
}

impl EntityRegistry {
    pub fn unit(&self, id: UnitId) -> Option<&FireUnit> {
        self.units.get(id)
    }

    pub fn group(&self, id: GroupId) -> Option<&FireGroup> {
        self.groups.get(id)
    }

    pub fn particle(&self, id: ParticleId) -> Option<FireParticle> {
        self.particles.get(id).copied()
    }

    pub fn units(&self) -> impl Iterator<Item = (UnitId, &FireUnit)> {
        self.units.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = (GroupId, &FireGroup)> {
        self.groups.iter()
    }

    pub fn particles(&self) -> impl Iterator<Item = (ParticleId, FireParticle)> + '_ {
        self.particles.iter().map(|(id, particle)| (id, *particle))
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}
