//! Host-side driver of the fire engine
//!
//! [`FireWorld`] owns every fire entity, runs the per-tick ordering and turns
//! unit state changes into observer callbacks, particle flags, smoke
//! registrations, gameplay events and burning-counter updates.
//!
//! # Tick order
//!
//! 1. Recompute particle mappings of groups whose slots changed
//! 2. Fan group cooling sources out over the current burning children
//! 3. Tick every unit and dispatch its state change
//! 4. Balance energy inside every group and dispatch the resulting changes
//! 5. Check group states, publishing "stopped burning" where an episode ended
//! 6. Advance lingering smoke
//!
//! Every unit finishes its own tick before any group balances.

use super::counter::BurningCounter;
use super::effects::SmokeEffects;
use super::events::{EventBus, EventQueue, FireEvent};
use super::hooks::{FireObserver, NullObserver};
use super::persistence::{self, PersistenceError, WorldSnapshot};
use super::registry::{EntityRegistry, FireParticle};
use crate::config::FireEngineConfig;
use crate::core_types::{
    FireMaterial, FireState, FireTransition, GroupId, IgnitionCause, MaterialError, MaterialLibrary,
    ParticleId, SourceId, TransitionOrigin, UnitId,
};
use crate::fire::{EnergyBalancer, FireGroup, FireReceiver, FireUnit, PresentationDelta};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rustc_hash::FxHashSet;
use tracing::{debug, info, trace, warn};

/// The fire engine as seen by the host
pub struct FireWorld {
    config: FireEngineConfig,
    balancer: EnergyBalancer,
    materials: MaterialLibrary,
    registry: EntityRegistry,
    smoke: SmokeEffects,
    events: EventQueue,
    counter: BurningCounter,
    observer: Box<dyn FireObserver>,
    rng: StdRng,
    warned_materials: FxHashSet<String>,
    time: f64,
    // Reused between ticks
    transitions: Vec<FireTransition>,
}

impl FireWorld {
    /// Create an empty world
    ///
    /// The configuration is validated; `counter` is shared with the host.
    pub fn new(config: FireEngineConfig, materials: MaterialLibrary, counter: BurningCounter) -> Self {
        let config = config.validated();
        info!(
            materials = materials.len(),
            seed = config.seed,
            "fire world created"
        );
        FireWorld {
            balancer: EnergyBalancer::new(config.balancing_cap_pct, config.maximum_balancing_percent),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            materials,
            registry: EntityRegistry::default(),
            smoke: SmokeEffects::default(),
            events: EventQueue::default(),
            counter,
            observer: Box::new(NullObserver),
            warned_materials: FxHashSet::default(),
            time: 0.0,
            transitions: Vec::new(),
        }
    }

    /// Resume from a snapshot
    pub fn from_snapshot(
        config: FireEngineConfig,
        materials: MaterialLibrary,
        counter: BurningCounter,
        snapshot: WorldSnapshot,
    ) -> Self {
        let mut world = Self::new(config, materials, counter);
        world.restore(snapshot);
        world
    }

    /// Replace the presentation observer
    pub fn with_observer(mut self, observer: Box<dyn FireObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn set_observer(&mut self, observer: Box<dyn FireObserver>) {
        self.observer = observer;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &FireEngineConfig {
        &self.config
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut MaterialLibrary {
        &mut self.materials
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn counter(&self) -> &BurningCounter {
        &self.counter
    }

    pub fn smoke(&self) -> &SmokeEffects {
        &self.smoke
    }

    /// Simulated seconds since creation
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn unit(&self, id: UnitId) -> Option<&FireUnit> {
        self.registry.units.get(id)
    }

    /// Mutable unit access for setters that never change the fire state
    /// (radii, limits, resistance, direct energy and cooling input)
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut FireUnit> {
        self.registry.units.get_mut(id)
    }

    pub fn group(&self, id: GroupId) -> Option<&FireGroup> {
        self.registry.groups.get(id)
    }

    pub fn particle(&self, id: ParticleId) -> Option<FireParticle> {
        self.registry.particles.get(id).copied()
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Take every event published since the last drain
    pub fn drain_events(&mut self) -> Vec<FireEvent> {
        self.events.drain()
    }

    /// Forward queued events to an external bus
    pub fn flush_events(&mut self, bus: &mut dyn EventBus) {
        self.events.flush_into(bus);
    }

    pub fn pending_events(&self) -> &EventQueue {
        &self.events
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    /// Spawn a unit whose material is resolved by name
    ///
    /// An unknown or invalid material yields a unit that never burns; the
    /// problem is logged once per material name.
    pub fn spawn_unit(&mut self, name: impl Into<String>, material: &str) -> UnitId {
        let name = name.into();
        let unit = match self.materials.resolve(material) {
            Ok(resolved) => FireUnit::with_material(name, resolved.clone()),
            Err(err) => {
                self.warn_material_once(&name, material, &err);
                FireUnit::non_burnable(name, material)
            }
        };
        self.registry.units.insert(unit)
    }

    /// Spawn a unit from an explicit material
    ///
    /// An invalid material is logged once per material name, like
    /// [`spawn_unit`](Self::spawn_unit).
    pub fn spawn_unit_with_material(&mut self, name: impl Into<String>, material: FireMaterial) -> UnitId {
        let name = name.into();
        if let Err(err) = material.validate() {
            self.warn_material_once(&name, &material.name, &err);
        }
        self.registry
            .units
            .insert(FireUnit::with_material(name, material))
    }

    /// Whether a material problem has been logged for `material`
    pub fn has_warned_material(&self, material: &str) -> bool {
        self.warned_materials.contains(material)
    }

    fn warn_material_once(&mut self, unit: &str, material: &str, err: &MaterialError) {
        if self.warned_materials.insert(material.to_string()) {
            warn!(unit = %unit, error = %err, "fire material unavailable, unit will not burn");
        }
    }

    /// Spawn a hidden particle entity
    pub fn spawn_particle(&mut self) -> ParticleId {
        self.registry.particles.insert(FireParticle::HIDDEN)
    }

    /// Spawn a group over existing units and particles
    ///
    /// Stale handles are dropped; the particle mapping is computed right away.
    pub fn spawn_group(
        &mut self,
        name: impl Into<String>,
        children: Vec<UnitId>,
        particles: Vec<ParticleId>,
    ) -> GroupId {
        let id = self
            .registry
            .groups
            .insert(FireGroup::new(name, children, particles));
        self.rebuild_group(id);
        id
    }

    /// Replace a group's slot arrays and rebuild it; false if the group is gone
    pub fn set_group_slots(
        &mut self,
        id: GroupId,
        children: Vec<UnitId>,
        particles: Vec<ParticleId>,
    ) -> bool {
        let Some(group) = self.registry.groups.get_mut(id) else {
            trace!(?id, "slot update for missing fire group");
            return false;
        };
        group.set_slots(children, particles);
        self.rebuild_group(id);
        self.settle_groups(false);
        true
    }

    /// Link a particle to a standalone unit; false if either is gone
    pub fn attach_particle(&mut self, unit: UnitId, particle: ParticleId) -> bool {
        if !self.registry.particles.contains_key(particle) {
            return false;
        }
        let Some(fire_unit) = self.registry.units.get_mut(unit) else {
            return false;
        };
        if fire_unit.group().is_some() {
            debug!(?unit, "particles of grouped units are assigned by their group");
        }
        fire_unit.attach_particle(particle);
        let flags = particle_flags_for(fire_unit.fire_state(), self.smoke.is_lingering(unit));
        self.set_particle(particle, flags);
        true
    }

    /// Remove a unit together with its smoke and particle state
    pub fn despawn_unit(&mut self, id: UnitId) -> Option<FireUnit> {
        let unit = self.registry.units.remove(id)?;
        self.smoke.cancel(id);
        for &particle in unit.particles() {
            self.set_particle(particle, FireParticle::HIDDEN);
        }
        let group = unit
            .group()
            .filter(|group| self.registry.groups.contains_key(*group));
        if unit.is_burning() && group.is_none() {
            self.counter.decrement();
        }
        if let Some(group) = group {
            // Remaining children take over the particles
            self.rebuild_group(group);
        }
        self.settle_groups(false);
        Some(unit)
    }

    /// Remove a group; its children become standalone units
    ///
    /// Children still burning are counted individually from now on.
    pub fn despawn_group(&mut self, id: GroupId) -> Option<FireGroup> {
        let mut group = self.registry.groups.remove(id)?;
        let burning = group
            .resolved(&self.registry.units)
            .filter(|(_, unit)| unit.is_burning())
            .count();
        group.release_children(id, &mut self.registry.units);
        if group.started_burning_notified() {
            self.counter.decrement();
        }
        for _ in 0..burning {
            self.counter.increment();
        }
        Some(group)
    }

    /// Remove a particle entity; units referencing it skip it from now on
    pub fn despawn_particle(&mut self, id: ParticleId) -> bool {
        self.registry.particles.remove(id).is_some()
    }

    // ------------------------------------------------------------------
    // Fire control
    // ------------------------------------------------------------------

    /// Ignite a unit, or one random child of a group
    pub fn start_fire(&mut self, receiver: impl Into<FireReceiver>, cause: IgnitionCause) -> bool {
        let mut out = std::mem::take(&mut self.transitions);
        let started = match receiver.into() {
            FireReceiver::Unit(id) => match self
                .registry
                .units
                .get_mut(id)
                .and_then(|unit| unit.start_fire(cause, &self.config))
            {
                Some(change) => {
                    out.push(change.for_unit(id));
                    true
                }
                None => false,
            },
            FireReceiver::Group(id) => match self.registry.groups.get_mut(id) {
                Some(group) => group.start_fire(
                    cause,
                    &mut self.registry.units,
                    &self.config,
                    &mut self.rng,
                    &mut out,
                ),
                None => false,
            },
        };
        self.finish_operation(out, false);
        started
    }

    /// Ignite a unit, or every child of a group
    pub fn start_fire_on_all(&mut self, receiver: impl Into<FireReceiver>, cause: IgnitionCause) {
        let mut out = std::mem::take(&mut self.transitions);
        match receiver.into() {
            FireReceiver::Unit(id) => {
                if let Some(change) = self
                    .registry
                    .units
                    .get_mut(id)
                    .and_then(|unit| unit.start_fire(cause, &self.config))
                {
                    out.push(change.for_unit(id));
                }
            }
            FireReceiver::Group(id) => {
                if let Some(group) = self.registry.groups.get_mut(id) {
                    group.start_fire_on_all_fire_components(
                        cause,
                        &mut self.registry.units,
                        &self.config,
                        &mut out,
                    );
                }
            }
        }
        self.finish_operation(out, false);
    }

    /// Put the fire out now; particles and smoke vanish in this call
    pub fn stop_fire(&mut self, receiver: impl Into<FireReceiver>) {
        let mut out = std::mem::take(&mut self.transitions);
        match receiver.into() {
            FireReceiver::Unit(id) => {
                if let Some(change) = self.registry.units.get_mut(id).and_then(FireUnit::stop_fire) {
                    out.push(change.for_unit(id));
                }
                self.cancel_smoke(id);
            }
            FireReceiver::Group(id) => {
                if let Some(group) = self.registry.groups.get_mut(id) {
                    group.stop_fire(&mut self.registry.units, &mut out);
                    let children = group.children().to_vec();
                    for child in children {
                        self.cancel_smoke(child);
                    }
                }
            }
        }
        self.finish_operation(out, false);
    }

    /// Burn a unit, or every child of a group, out immediately
    pub fn destroy_by_fire(&mut self, receiver: impl Into<FireReceiver>) {
        let mut out = std::mem::take(&mut self.transitions);
        match receiver.into() {
            FireReceiver::Unit(id) => {
                if let Some(change) = self
                    .registry
                    .units
                    .get_mut(id)
                    .and_then(FireUnit::destroy_by_fire)
                {
                    out.push(change.for_unit(id));
                }
            }
            FireReceiver::Group(id) => {
                if let Some(group) = self.registry.groups.get_mut(id) {
                    group.destroy_by_fire(&mut self.registry.units, &mut out);
                }
            }
        }
        self.finish_operation(out, false);
    }

    /// Queue external fire energy (rate) for the next tick
    ///
    /// A group splits the amount equally over its children that can burn.
    pub fn receive_fire_energy(
        &mut self,
        receiver: impl Into<FireReceiver>,
        amount: f32,
        dt: f32,
        sender: SourceId,
    ) {
        match receiver.into() {
            FireReceiver::Unit(id) => match self.registry.units.get_mut(id) {
                Some(unit) => unit.receive_fire_energy(amount, dt, sender),
                None => trace!(?id, "fire energy for missing unit"),
            },
            FireReceiver::Group(id) => match self.registry.groups.get_mut(id) {
                Some(group) => {
                    group.receive_fire_energy(amount, dt, sender, &mut self.registry.units);
                }
                None => trace!(?id, "fire energy for missing group"),
            },
        }
    }

    /// Register or overwrite a cooling source (rates per second)
    pub fn add_cooling_energy_source(
        &mut self,
        receiver: impl Into<FireReceiver>,
        source: SourceId,
        extinguish: f32,
        cooling: f32,
    ) {
        match receiver.into() {
            FireReceiver::Unit(id) => {
                if let Some(unit) = self.registry.units.get_mut(id) {
                    unit.add_cooling_energy_source(source, extinguish, cooling);
                }
            }
            FireReceiver::Group(id) => {
                if let Some(group) = self.registry.groups.get_mut(id) {
                    group.add_cooling_energy_source(
                        source,
                        extinguish,
                        cooling,
                        &mut self.registry.units,
                    );
                }
            }
        }
    }

    /// Deregister a cooling source; unknown ids are ignored
    pub fn remove_cooling_energy_source(&mut self, receiver: impl Into<FireReceiver>, source: SourceId) {
        match receiver.into() {
            FireReceiver::Unit(id) => {
                if let Some(unit) = self.registry.units.get_mut(id) {
                    unit.remove_cooling_energy_source(source);
                }
            }
            FireReceiver::Group(id) => {
                if let Some(group) = self.registry.groups.get_mut(id) {
                    group.remove_cooling_energy_source(source, &mut self.registry.units);
                }
            }
        }
    }

    /// Inject damage directly; a group splits it equally over its children
    pub fn force_fire_damage(&mut self, receiver: impl Into<FireReceiver>, amount: f32) {
        let mut out = std::mem::take(&mut self.transitions);
        let targets: Vec<UnitId> = match receiver.into() {
            FireReceiver::Unit(id) => vec![id],
            FireReceiver::Group(id) => self
                .registry
                .groups
                .get(id)
                .map(|group| {
                    group
                        .resolved(&self.registry.units)
                        .filter(|(_, unit)| unit.is_burnable())
                        .map(|(child, _)| child)
                        .collect()
                })
                .unwrap_or_default(),
        };
        if !targets.is_empty() {
            let share = amount / targets.len() as f32;
            for id in targets {
                if let Some(unit) = self.registry.units.get_mut(id) {
                    if let Some(change) = unit.force_fire_damage(share, &self.config) {
                        out.push(change.for_unit(id));
                    }
                    report_presentation(&mut *self.observer, id, unit.take_presentation_delta(&self.config));
                }
            }
        }
        self.finish_operation(out, false);
    }

    /// Reset for reuse; publishes a scripted "stopped burning" if needed
    pub fn cleanup(&mut self, receiver: impl Into<FireReceiver>) {
        let mut out = std::mem::take(&mut self.transitions);
        match receiver.into() {
            FireReceiver::Unit(id) => {
                if let Some(change) = self.registry.units.get_mut(id).and_then(FireUnit::cleanup) {
                    out.push(change.for_unit(id));
                }
                self.cancel_smoke(id);
                self.finish_operation(out, true);
            }
            FireReceiver::Group(id) => {
                let Some(group) = self.registry.groups.get_mut(id) else {
                    self.transitions = out;
                    return;
                };
                let was_notified = group.cleanup(&mut self.registry.units, &mut out);
                let children = group.children().to_vec();
                for child in children {
                    self.cancel_smoke(child);
                }
                if was_notified {
                    self.counter.decrement();
                    self.events.publish(FireEvent::StoppedBurning {
                        receiver: FireReceiver::Group(id),
                        destroyed: false,
                        scripted_cleanup: true,
                    });
                }
                self.finish_operation(out, true);
            }
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_burning(&self, receiver: impl Into<FireReceiver>) -> bool {
        match receiver.into() {
            FireReceiver::Unit(id) => self.unit(id).is_some_and(FireUnit::is_burning),
            FireReceiver::Group(id) => self
                .group(id)
                .is_some_and(|group| group.is_burning(&self.registry.units)),
        }
    }

    pub fn is_burned(&self, receiver: impl Into<FireReceiver>) -> bool {
        match receiver.into() {
            FireReceiver::Unit(id) => self.unit(id).is_some_and(FireUnit::is_burned),
            FireReceiver::Group(id) => self
                .group(id)
                .is_some_and(|group| group.is_burned(&self.registry.units)),
        }
    }

    /// Nothing burning and no smoke left
    pub fn is_ready_for_cleanup(&self, receiver: impl Into<FireReceiver>) -> bool {
        match receiver.into() {
            FireReceiver::Unit(id) => self
                .unit(id)
                .is_some_and(|unit| !unit.is_burning() && !self.smoke.is_lingering(id)),
            FireReceiver::Group(id) => self.group(id).is_some_and(|group| {
                group.is_ready_for_cleanup(&self.registry.units, |child| {
                    self.smoke.is_lingering(child)
                })
            }),
        }
    }

    pub fn is_achievement_eligible(&self, receiver: impl Into<FireReceiver>) -> bool {
        match receiver.into() {
            FireReceiver::Unit(id) => self.unit(id).is_some_and(FireUnit::is_achievement_eligible),
            FireReceiver::Group(id) => self
                .group(id)
                .is_some_and(|group| group.is_achievement_eligible(&self.registry.units)),
        }
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            debug!(dt, "ignoring invalid fire tick");
            return;
        }
        self.time += f64::from(dt);
        let mut out = std::mem::take(&mut self.transitions);

        let dirty: Vec<GroupId> = self
            .registry
            .groups
            .iter()
            .filter(|(_, group)| group.needs_particle_assignment())
            .map(|(id, _)| id)
            .collect();
        for id in dirty {
            self.assign_particles(id);
        }

        for group in self.registry.groups.values() {
            group.distribute_cooling(&mut self.registry.units);
        }

        for (id, unit) in &mut self.registry.units {
            if let Some(change) = unit.update(dt, &self.config) {
                out.push(change.for_unit(id));
            }
        }
        self.dispatch(&mut out);

        for group in self.registry.groups.values_mut() {
            group.balancing_fire_energy(
                &self.balancer,
                &mut self.registry.units,
                &self.config,
                &mut out,
            );
        }
        self.dispatch(&mut out);

        self.settle_groups(false);

        for id in self.smoke.tick(dt) {
            trace!(?id, "smoke expired");
            self.hide_particles(id);
        }

        for (id, unit) in &mut self.registry.units {
            report_presentation(&mut *self.observer, id, unit.take_presentation_delta(&self.config));
        }

        self.transitions = out;
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Copy of the persistent state
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            registry: self.registry.clone(),
            smoke: self.smoke.clone(),
            time: self.time,
            burning_count: self.counter.get(),
        }
    }

    /// Replace the world state with a snapshot
    ///
    /// Queued events are dropped and the group RNG is reseeded.
    pub fn restore(&mut self, snapshot: WorldSnapshot) {
        self.registry = snapshot.registry;
        self.smoke = snapshot.smoke;
        self.time = snapshot.time;
        self.counter.set(snapshot.burning_count);
        self.events.drain();
        self.rng = StdRng::seed_from_u64(self.config.seed);
        info!(
            units = self.registry.unit_count(),
            groups = self.registry.group_count(),
            "fire world restored"
        );
    }

    /// Encode the persistent state
    ///
    /// # Errors
    /// Returns [`PersistenceError::Encode`] if serialization fails
    pub fn save_bytes(&self) -> Result<Vec<u8>, PersistenceError> {
        persistence::encode(&self.snapshot())
    }

    /// Restore from bytes produced by [`save_bytes`](Self::save_bytes)
    ///
    /// # Errors
    /// Returns [`PersistenceError::Decode`] if the bytes are not a snapshot;
    /// the world is left untouched in that case
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), PersistenceError> {
        let snapshot: WorldSnapshot = persistence::decode(bytes)?;
        self.restore(snapshot);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    fn finish_operation(&mut self, mut out: Vec<FireTransition>, scripted: bool) {
        let touched: Vec<UnitId> = out.iter().map(|transition| transition.unit).collect();
        self.dispatch(&mut out);
        self.settle_groups(scripted);
        for id in touched {
            if let Some(unit) = self.registry.units.get_mut(id) {
                report_presentation(&mut *self.observer, id, unit.take_presentation_delta(&self.config));
            }
        }
        self.transitions = out;
    }

    fn dispatch(&mut self, transitions: &mut Vec<FireTransition>) {
        for transition in transitions.drain(..) {
            self.handle_transition(transition);
        }
    }

    fn handle_transition(&mut self, transition: FireTransition) {
        let FireTransition { unit: id, change } = transition;
        let Some(unit) = self.registry.units.get(id) else {
            trace!(?id, "state change for despawned unit");
            return;
        };
        let group = unit
            .group()
            .filter(|group| self.registry.groups.contains_key(*group));
        let blast = unit
            .material()
            .filter(|material| material.is_explosive())
            .map(|material| (material.blast_force, material.blast_radius));

        self.observer.on_state_changed(id, &change);

        if change.to.is_burning() {
            self.smoke.cancel(id);
            self.set_unit_particles(id, FireParticle::BURNING);
        } else if change.origin == TransitionOrigin::Simulation
            && change.from.is_burning()
            && self.config.smoke_linger_seconds > 0.0
        {
            self.smoke.register(id, self.config.smoke_linger_seconds);
            self.set_unit_particles(id, FireParticle::SMOKING);
        } else {
            self.cancel_smoke(id);
        }

        if change.is_ignition() {
            match group {
                Some(group) => {
                    let first = self
                        .registry
                        .groups
                        .get_mut(group)
                        .is_some_and(FireGroup::notify_child_ignited);
                    if first {
                        self.counter.increment();
                        self.events.publish(FireEvent::StartedBurning {
                            receiver: FireReceiver::Group(group),
                            cause: change.cause,
                        });
                    }
                }
                None => {
                    self.counter.increment();
                    self.events.publish(FireEvent::StartedBurning {
                        receiver: FireReceiver::Unit(id),
                        cause: change.cause,
                    });
                }
            }
        }

        if change.is_extinction() && group.is_none() {
            self.counter.decrement();
            self.events.publish(FireEvent::StoppedBurning {
                receiver: FireReceiver::Unit(id),
                destroyed: change.to == FireState::Destroyed,
                scripted_cleanup: change.origin == TransitionOrigin::Cleanup,
            });
        }

        if change.to == FireState::Destroyed {
            if let Some((force, radius)) = blast {
                debug!(?id, force, radius, "fire unit exploded");
                self.events.publish(FireEvent::Blast {
                    unit: id,
                    force,
                    radius,
                });
            }
        }
    }

    /// Check every group and close finished burning episodes
    fn settle_groups(&mut self, scripted: bool) {
        let EntityRegistry { units, groups, .. } = &mut self.registry;
        for (id, group) in groups.iter_mut() {
            let check = group.check_fire_state(units);
            if check.stopped {
                self.counter.decrement();
                self.events.publish(FireEvent::StoppedBurning {
                    receiver: FireReceiver::Group(id),
                    destroyed: check.destroyed,
                    scripted_cleanup: scripted,
                });
            }
        }
    }

    fn rebuild_group(&mut self, id: GroupId) {
        let EntityRegistry {
            units,
            groups,
            particles,
        } = &mut self.registry;
        if let Some(group) = groups.get_mut(id) {
            group.rebuild_fire_component_array(id, units, |p| particles.contains_key(p));
        }
        self.assign_particles(id);
    }

    fn assign_particles(&mut self, id: GroupId) {
        let Some(group) = self.registry.groups.get_mut(id) else {
            return;
        };
        group.assign_fire_particles_to_fire_components(&mut self.registry.units);
        let children = group.children().to_vec();
        for child in children {
            if let Some(unit) = self.registry.units.get(child) {
                let flags = particle_flags_for(unit.fire_state(), self.smoke.is_lingering(child));
                self.set_unit_particles(child, flags);
            }
        }
    }

    fn cancel_smoke(&mut self, id: UnitId) {
        self.smoke.cancel(id);
        if self.registry.units.get(id).is_some_and(|unit| !unit.is_burning()) {
            self.hide_particles(id);
        }
    }

    fn hide_particles(&mut self, id: UnitId) {
        self.set_unit_particles(id, FireParticle::HIDDEN);
    }

    fn set_unit_particles(&mut self, id: UnitId, flags: FireParticle) {
        let particles = match self.registry.units.get(id) {
            Some(unit) => unit.particles().to_vec(),
            None => return,
        };
        for particle in particles {
            self.set_particle(particle, flags);
        }
    }

    fn set_particle(&mut self, id: ParticleId, flags: FireParticle) {
        match self.registry.particles.get_mut(id) {
            Some(particle) if *particle != flags => {
                *particle = flags;
                self.observer.on_particle_changed(id, flags);
            }
            Some(_) => {}
            None => trace!(?id, "skipping despawned particle"),
        }
    }
}

fn particle_flags_for(state: FireState, smoking: bool) -> FireParticle {
    if state.is_burning() {
        FireParticle::BURNING
    } else if smoking {
        FireParticle::SMOKING
    } else {
        FireParticle::HIDDEN
    }
}

fn report_presentation(observer: &mut dyn FireObserver, id: UnitId, delta: PresentationDelta) {
    if let Some(intensity) = delta.intensity {
        observer.on_intensity_changed(id, intensity);
    }
    if let Some(percent) = delta.damage_percent {
        observer.on_damage_percent(id, percent);
    }
}
