//! The atomic fire-bearing object
//!
//! A [`FireUnit`] integrates received and cooling energy once per tick, turns
//! excess energy into damage and derives its [`FireState`] from the result.
//! Operations that can change state return a [`StateChange`] instead of
//! notifying anyone directly; the world binds it to the unit's handle and
//! dispatches it.
//!
//! # Tick order
//!
//! 1. Sum registered cooling sources (nothing when extinguishing is blocked)
//! 2. Add received energy and, when burning, self-sustaining growth
//! 3. Subtract extinguish energy; subtract cooling only if not burning
//! 4. Convert energy above the combustion threshold into damage
//! 5. Recompute the state from energy and damage
//! 6. Clear the received-energy accumulator

use super::cooling::{CoolingEnergy, CoolingSources};
use crate::config::FireEngineConfig;
use crate::core_types::{
    FireIntensity, FireMaterial, FireState, GroupId, IgnitionCause, ParticleId, SourceId,
    StateChange, TransitionOrigin,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Presentation values that changed since they were last reported
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PresentationDelta {
    pub intensity: Option<FireIntensity>,
    pub damage_percent: Option<f32>,
}

impl PresentationDelta {
    pub fn is_empty(&self) -> bool {
        self.intensity.is_none() && self.damage_percent.is_none()
    }
}

/// Fire state of one host object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireUnit {
    name: String,
    material_name: String,
    /// `None` when the material failed to resolve: the unit never burns
    material: Option<FireMaterial>,

    // Energy model
    fire_state: FireState,
    energy: f32,
    total_damage: f32,
    received_energy_factor: f32,
    pending_energy: f32,
    last_sender: Option<SourceId>,

    // Geometry
    hard_radius: f32,
    soft_radius: f32,

    // Scripting controls
    is_intact: bool,
    extinguish_blocked: bool,
    lower_energy_limit_pct: Option<f32>,
    upper_damage_limit_pct: Option<f32>,

    cooling_sources: CoolingSources,

    // Links (non-owning)
    group: Option<GroupId>,
    particles: Vec<ParticleId>,

    // Last values handed to presentation hooks
    reported_intensity: FireIntensity,
    reported_damage_percent: f32,
}

impl FireUnit {
    /// Create a burnable unit from a material
    ///
    /// A material failing validation yields a non-burnable unit. Reporting
    /// the problem is left to the caller.
    pub fn with_material(name: impl Into<String>, material: FireMaterial) -> Self {
        let name = name.into();
        if material.validate().is_err() {
            return Self::non_burnable(name, material.name);
        }

        let soft_radius = material.soft_radius.max(0.0);
        let hard_radius = material.hard_radius.clamp(0.0, soft_radius);
        let mut unit = Self::non_burnable(name, material.name.clone());
        unit.received_energy_factor = material.received_energy_factor();
        unit.hard_radius = hard_radius;
        unit.soft_radius = soft_radius;
        unit.material = Some(material);
        unit
    }

    /// Create a unit whose material could not be resolved
    pub fn non_burnable(name: impl Into<String>, material_name: impl Into<String>) -> Self {
        FireUnit {
            name: name.into(),
            material_name: material_name.into(),
            material: None,
            fire_state: FireState::NoFire,
            energy: 0.0,
            total_damage: 0.0,
            received_energy_factor: 1.0,
            pending_energy: 0.0,
            last_sender: None,
            hard_radius: 0.0,
            soft_radius: 0.0,
            is_intact: true,
            extinguish_blocked: false,
            lower_energy_limit_pct: None,
            upper_damage_limit_pct: None,
            cooling_sources: CoolingSources::default(),
            group: None,
            particles: Vec::new(),
            reported_intensity: FireIntensity::None,
            reported_damage_percent: 0.0,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    pub fn material(&self) -> Option<&FireMaterial> {
        self.material.as_ref()
    }

    pub fn fire_state(&self) -> FireState {
        self.fire_state
    }

    /// Current fire energy
    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Upper bound of [`energy`](Self::energy); zero when not burnable
    pub fn max_energy(&self) -> f32 {
        self.material.as_ref().map_or(0.0, |m| m.combustion_energy)
    }

    pub fn total_damage(&self) -> f32 {
        self.total_damage
    }

    /// Upper bound of [`total_damage`](Self::total_damage); zero when not burnable
    pub fn max_life(&self) -> f32 {
        self.material.as_ref().map_or(0.0, |m| m.max_life)
    }

    /// Damage as a fraction of max life (0-1), for damage-state visuals
    pub fn damage_percent(&self) -> f32 {
        let max_life = self.max_life();
        if max_life > 0.0 {
            (self.total_damage / max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Energy received this tick, not yet integrated
    pub fn pending_energy(&self) -> f32 {
        self.pending_energy
    }

    pub fn hard_radius(&self) -> f32 {
        self.hard_radius
    }

    pub fn soft_radius(&self) -> f32 {
        self.soft_radius
    }

    pub fn received_energy_factor(&self) -> f32 {
        self.received_energy_factor
    }

    pub fn is_extinguish_blocked(&self) -> bool {
        self.extinguish_blocked
    }

    pub fn lower_energy_limit_pct(&self) -> Option<f32> {
        self.lower_energy_limit_pct
    }

    pub fn upper_damage_limit_pct(&self) -> Option<f32> {
        self.upper_damage_limit_pct
    }

    pub fn cooling_sources(&self) -> &CoolingSources {
        &self.cooling_sources
    }

    /// Owning group, if any. May name a group that no longer exists.
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Particle entities showing this unit's flames
    pub fn particles(&self) -> &[ParticleId] {
        &self.particles
    }

    /// Whether the unit can still catch fire or keep burning
    pub fn is_burnable(&self) -> bool {
        self.material.is_some() && self.fire_state != FireState::Destroyed
    }

    pub fn is_burning(&self) -> bool {
        self.fire_state.is_burning()
    }

    pub fn is_burned(&self) -> bool {
        self.fire_state == FireState::Destroyed
    }

    /// False once the unit has ever burned. Survives cleanup.
    pub fn is_intact(&self) -> bool {
        self.is_intact
    }

    /// Counts towards "saved it" achievements: burnable and never burned
    pub fn is_achievement_eligible(&self) -> bool {
        self.material.is_some() && self.is_intact
    }

    /// Audio bucket for the current state and energy
    pub fn intensity(&self, config: &FireEngineConfig) -> FireIntensity {
        match self.fire_state {
            FireState::SmallFire => FireIntensity::Small,
            FireState::LargeFire => {
                if self.energy >= config.audio_large_threshold * self.max_energy() {
                    FireIntensity::Large
                } else {
                    FireIntensity::Medium
                }
            }
            FireState::NoFire | FireState::Destroyed => FireIntensity::None,
        }
    }

    // ------------------------------------------------------------------
    // Setters that never change the fire state
    // ------------------------------------------------------------------

    /// Set the direct-contact radius, clamped into `[0, soft_radius]`
    pub fn set_hard_radius(&mut self, radius: f32) {
        if !radius.is_finite() {
            debug!(unit = %self.name, radius, "ignoring non-finite hard radius");
            return;
        }
        let radius = radius.max(0.0);
        if radius > self.soft_radius {
            debug!(
                unit = %self.name,
                radius,
                soft_radius = self.soft_radius,
                "hard radius clamped to soft radius"
            );
        }
        self.hard_radius = radius.min(self.soft_radius);
    }

    /// Set the radiant-heat radius; the hard radius shrinks with it if needed
    pub fn set_soft_radius(&mut self, radius: f32) {
        if !radius.is_finite() {
            debug!(unit = %self.name, radius, "ignoring non-finite soft radius");
            return;
        }
        self.soft_radius = radius.max(0.0);
        if self.hard_radius > self.soft_radius {
            debug!(unit = %self.name, "hard radius clamped to new soft radius");
            self.hard_radius = self.soft_radius;
        }
    }

    /// Override the fire resistance multiplier (non-negative)
    pub fn set_received_energy_factor(&mut self, factor: f32) {
        if factor.is_finite() {
            self.received_energy_factor = factor.max(0.0);
        } else {
            debug!(unit = %self.name, factor, "ignoring non-finite energy factor");
        }
    }

    /// Ignore all cooling sources while set (scripted sequences)
    pub fn set_extinguish_blocked(&mut self, blocked: bool) {
        self.extinguish_blocked = blocked;
    }

    /// Keep cooling from pushing energy below this fraction of max energy
    pub fn set_lower_energy_limit_pct(&mut self, pct: Option<f32>) {
        self.lower_energy_limit_pct = pct.filter(|p| p.is_finite()).map(|p| p.clamp(0.0, 1.0));
    }

    /// Keep damage from exceeding this fraction of max life
    pub fn set_upper_damage_limit_pct(&mut self, pct: Option<f32>) {
        self.upper_damage_limit_pct = pct.filter(|p| p.is_finite()).map(|p| p.clamp(0.0, 1.0));
        self.total_damage = self.total_damage.min(self.damage_cap());
    }

    // ------------------------------------------------------------------
    // External energy
    // ------------------------------------------------------------------

    /// Queue energy from an external fire source for this tick
    ///
    /// `amount` is a rate; `amount * dt * received_energy_factor` is added to
    /// the accumulator and integrated by the unit's own tick.
    pub fn receive_fire_energy(&mut self, amount: f32, dt: f32, sender: SourceId) {
        if !self.is_burnable() {
            return;
        }
        if !amount.is_finite() || amount <= 0.0 || !dt.is_finite() || dt <= 0.0 {
            debug!(unit = %self.name, amount, dt, %sender, "ignoring invalid fire energy");
            return;
        }
        self.pending_energy += amount * dt * self.received_energy_factor;
        self.last_sender = Some(sender);
    }

    /// Register or overwrite a cooling source
    pub fn add_cooling_energy_source(&mut self, source: SourceId, extinguish: f32, cooling: f32) {
        self.cooling_sources
            .insert(source, CoolingEnergy::new(extinguish, cooling));
    }

    /// Deregister a cooling source; unknown ids are ignored
    pub fn remove_cooling_energy_source(&mut self, source: SourceId) {
        self.cooling_sources.remove(source);
    }

    // ------------------------------------------------------------------
    // State-changing operations (dispatched by the world)
    // ------------------------------------------------------------------

    /// Advance one tick
    pub(crate) fn update(&mut self, dt: f32, config: &FireEngineConfig) -> Option<StateChange> {
        let pending = std::mem::take(&mut self.pending_energy);
        let sender = self.last_sender.take();

        let (max_energy, max_life) = match &self.material {
            Some(material) => (material.combustion_energy, material.max_life),
            None => return None,
        };
        if self.fire_state == FireState::Destroyed || !dt.is_finite() || dt <= 0.0 {
            return None;
        }

        let cooling = if self.extinguish_blocked {
            CoolingEnergy::default()
        } else {
            self.cooling_sources.totals()
        };
        let was_burning = self.fire_state.is_burning();

        let mut energy = self.energy + pending;
        if was_burning {
            energy += config.combustion_growth_rate * max_energy * dt;
        }
        energy = energy.clamp(0.0, max_energy);

        let before_cooling = energy;
        energy = (energy - cooling.extinguish * dt).max(0.0);
        if !was_burning {
            // Cooling guards extinguished units against re-ignition only
            energy = (energy - cooling.cooling * dt).max(0.0);
        }
        if let Some(pct) = self.lower_energy_limit_pct {
            // Cooling never pushes below the floor; the floor never raises energy
            let floor = pct * max_energy;
            energy = energy.max(before_cooling.min(floor));
        }
        self.energy = energy;

        let threshold = config.combustion_threshold * max_energy;
        if energy > threshold {
            let span = (max_energy - threshold).max(f32::EPSILON);
            let excess = ((energy - threshold) / span).min(1.0);
            self.total_damage += excess * config.damage_rate * max_life * dt;
        }
        self.total_damage = self.total_damage.clamp(0.0, self.damage_cap());

        let cause = sender.map_or(IgnitionCause::Unknown, IgnitionCause::Source);
        self.refresh_state(config, cause, TransitionOrigin::Simulation)
    }

    /// Ignite with the configured seed energy; only from `NoFire`
    pub(crate) fn start_fire(
        &mut self,
        cause: IgnitionCause,
        config: &FireEngineConfig,
    ) -> Option<StateChange> {
        if !self.is_burnable() || self.fire_state != FireState::NoFire {
            return None;
        }
        let seed = config.ignition_energy_pct * self.max_energy();
        self.energy = self.energy.max(seed);
        self.transition_to(FireState::SmallFire, cause, TransitionOrigin::Simulation)
    }

    /// Put the fire out immediately, bypassing decay
    pub(crate) fn stop_fire(&mut self) -> Option<StateChange> {
        if self.material.is_none() || self.fire_state == FireState::Destroyed {
            return None;
        }
        self.energy = 0.0;
        self.pending_energy = 0.0;
        self.last_sender = None;
        self.transition_to(
            FireState::NoFire,
            IgnitionCause::Unknown,
            TransitionOrigin::Forced,
        )
    }

    /// Burn the unit out immediately
    pub(crate) fn destroy_by_fire(&mut self) -> Option<StateChange> {
        let max_life = self.material.as_ref()?.max_life;
        self.total_damage = max_life;
        self.energy = 0.0;
        self.pending_energy = 0.0;
        self.transition_to(
            FireState::Destroyed,
            IgnitionCause::Scripted,
            TransitionOrigin::Simulation,
        )
    }

    /// Inject damage directly, bypassing energy accumulation
    pub(crate) fn force_fire_damage(
        &mut self,
        amount: f32,
        config: &FireEngineConfig,
    ) -> Option<StateChange> {
        if !self.is_burnable() || !amount.is_finite() {
            return None;
        }
        self.total_damage = (self.total_damage + amount).clamp(0.0, self.damage_cap());
        self.refresh_state(config, IgnitionCause::Scripted, TransitionOrigin::Simulation)
    }

    /// Reset to an unburned state for reuse; `is_intact` is kept
    pub(crate) fn cleanup(&mut self) -> Option<StateChange> {
        self.energy = 0.0;
        self.total_damage = 0.0;
        self.pending_energy = 0.0;
        self.last_sender = None;
        self.cooling_sources.clear();
        self.transition_to(
            FireState::NoFire,
            IgnitionCause::Unknown,
            TransitionOrigin::Cleanup,
        )
    }

    /// Apply an energy transfer computed by group balancing
    pub(crate) fn apply_balancing_delta(
        &mut self,
        delta: f32,
        config: &FireEngineConfig,
    ) -> Option<StateChange> {
        if !self.is_burnable() || !delta.is_finite() || delta == 0.0 {
            return None;
        }
        self.energy = (self.energy + delta).clamp(0.0, self.max_energy());
        self.refresh_state(config, IgnitionCause::Spread, TransitionOrigin::Simulation)
    }

    pub(crate) fn set_group(&mut self, group: Option<GroupId>) {
        self.group = group;
    }

    pub(crate) fn set_particles(&mut self, particles: Vec<ParticleId>) {
        self.particles = particles;
    }

    pub(crate) fn attach_particle(&mut self, particle: ParticleId) {
        if !self.particles.contains(&particle) {
            self.particles.push(particle);
        }
    }

    /// Intensity and damage values that changed since the last call
    pub(crate) fn take_presentation_delta(&mut self, config: &FireEngineConfig) -> PresentationDelta {
        let mut delta = PresentationDelta::default();

        let intensity = self.intensity(config);
        if intensity != self.reported_intensity {
            self.reported_intensity = intensity;
            delta.intensity = Some(intensity);
        }

        let damage_percent = self.damage_percent();
        if damage_percent != self.reported_damage_percent {
            self.reported_damage_percent = damage_percent;
            delta.damage_percent = Some(damage_percent);
        }

        delta
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn damage_cap(&self) -> f32 {
        let max_life = self.max_life();
        self.upper_damage_limit_pct
            .map_or(max_life, |pct| pct * max_life)
    }

    fn refresh_state(
        &mut self,
        config: &FireEngineConfig,
        cause: IgnitionCause,
        origin: TransitionOrigin,
    ) -> Option<StateChange> {
        let (max_energy, max_life) = match &self.material {
            Some(material) => (material.combustion_energy, material.max_life),
            None => return None,
        };

        let next = if self.fire_state == FireState::Destroyed || self.total_damage >= max_life {
            FireState::Destroyed
        } else if self.energy <= 0.0 {
            FireState::NoFire
        } else if self.energy < config.small_fire_threshold * max_energy {
            FireState::SmallFire
        } else {
            FireState::LargeFire
        };

        if next == FireState::Destroyed {
            self.total_damage = max_life;
            self.energy = 0.0;
        }
        self.transition_to(next, cause, origin)
    }

    fn transition_to(
        &mut self,
        next: FireState,
        cause: IgnitionCause,
        origin: TransitionOrigin,
    ) -> Option<StateChange> {
        let from = self.fire_state;
        if from == next {
            return None;
        }
        self.fire_state = next;
        if next.is_burning() {
            self.is_intact = false;
        }
        debug!(unit = %self.name, ?from, to = ?next, ?cause, "fire state changed");
        Some(StateChange {
            from,
            to: next,
            cause,
            origin,
        })
    }
}
