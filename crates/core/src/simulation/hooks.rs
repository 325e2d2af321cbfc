//! Presentation callbacks
//!
//! The engine never renders or plays audio itself. Hosts implement
//! [`FireObserver`] to drive damage decals, flame particles and the audio
//! loop selector; every method defaults to a no-op.

use super::registry::FireParticle;
use crate::core_types::{FireIntensity, ParticleId, StateChange, UnitId};

pub trait FireObserver {
    /// A unit changed [`FireState`](crate::core_types::FireState)
    fn on_state_changed(&mut self, _unit: UnitId, _change: &StateChange) {}

    /// Damage fraction (0-1) changed, for damage-state visuals
    fn on_damage_percent(&mut self, _unit: UnitId, _percent: f32) {}

    /// Audio bucket changed
    fn on_intensity_changed(&mut self, _unit: UnitId, _intensity: FireIntensity) {}

    /// Particle flags changed
    fn on_particle_changed(&mut self, _particle: ParticleId, _state: FireParticle) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl FireObserver for NullObserver {}
