//! Coordination of sibling fire units forming one logical object
//!
//! A building with several ignition points is one [`FireGroup`] over several
//! [`FireUnit`]s. The group holds only handles: children and particle
//! entities can disappear between ticks, so every access resolves the handle
//! and skips it when it is gone.
//!
//! What the group adds on top of its children:
//! - cooling fan-out: extinguish energy is split over burning children,
//!   cooling energy applies in full to every non-burning child
//! - energy balancing between siblings (see [`EnergyBalancer`])
//! - one "started burning" notification per burning episode

use super::balancer::{BalanceSlot, EnergyBalancer};
use super::cooling::{CoolingEnergy, CoolingSources};
use super::unit::FireUnit;
use crate::config::FireEngineConfig;
use crate::core_types::{
    FireState, FireTransition, GroupId, IgnitionCause, ParticleId, SourceId, StateChange, UnitId,
};
use rand::seq::IndexedRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, trace};

/// Arena of fire units as seen by a group
pub type UnitArena = SlotMap<UnitId, FireUnit>;

/// Outcome of a group state check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupStateCheck {
    /// The group had announced burning and no child burns any more
    pub stopped: bool,
    /// Whether the group counts as burned out
    pub destroyed: bool,
}

/// Fire coordinator of a composite object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireGroup {
    name: String,

    // Slot arrays as configured; may hold stale handles
    configured_children: Vec<UnitId>,
    configured_particles: Vec<ParticleId>,

    // Resolved on rebuild
    children: Vec<UnitId>,
    particles: Vec<ParticleId>,
    particles_dirty: bool,

    cooling_sources: CoolingSources,

    // UI aggregates, refreshed by every state check
    group_fire_state: FireState,
    total_damage: f32,
    total_max_life: f32,
    num_fire_objects: u32,

    started_burning_notified: bool,
}

impl FireGroup {
    /// Create a group from slot arrays; call
    /// [`rebuild_fire_component_array`](Self::rebuild_fire_component_array)
    /// before use
    pub fn new(
        name: impl Into<String>,
        children: Vec<UnitId>,
        particles: Vec<ParticleId>,
    ) -> Self {
        FireGroup {
            name: name.into(),
            configured_children: children,
            configured_particles: particles,
            children: Vec::new(),
            particles: Vec::new(),
            particles_dirty: true,
            cooling_sources: CoolingSources::default(),
            group_fire_state: FireState::NoFire,
            total_damage: 0.0,
            total_max_life: 0.0,
            num_fire_objects: 0,
            started_burning_notified: false,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn configured_children(&self) -> &[UnitId] {
        &self.configured_children
    }

    pub fn configured_particles(&self) -> &[ParticleId] {
        &self.configured_particles
    }

    /// Children resolved at the last rebuild
    pub fn children(&self) -> &[UnitId] {
        &self.children
    }

    /// Derived state as of the last state check
    pub fn group_fire_state(&self) -> FireState {
        self.group_fire_state
    }

    /// Summed child damage as of the last state check
    pub fn total_damage(&self) -> f32 {
        self.total_damage
    }

    /// Burning children as of the last state check
    pub fn num_fire_objects(&self) -> u32 {
        self.num_fire_objects
    }

    /// Summed damage over summed max life (0-1)
    pub fn damage_percent(&self) -> f32 {
        if self.total_max_life > 0.0 {
            (self.total_damage / self.total_max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn started_burning_notified(&self) -> bool {
        self.started_burning_notified
    }

    pub fn cooling_sources(&self) -> &CoolingSources {
        &self.cooling_sources
    }

    /// Particle mapping must be recomputed before the next tick
    pub fn needs_particle_assignment(&self) -> bool {
        self.particles_dirty
    }

    /// Children that still exist
    pub fn resolved<'a>(
        &'a self,
        units: &'a UnitArena,
    ) -> impl Iterator<Item = (UnitId, &'a FireUnit)> + 'a {
        self.children
            .iter()
            .filter_map(move |&id| units.get(id).map(|unit| (id, unit)))
    }

    /// Append every live child handle to `out`
    pub fn get_all_fire_components(&self, units: &UnitArena, out: &mut Vec<UnitId>) {
        out.extend(self.resolved(units).map(|(id, _)| id));
    }

    /// Particle handles resolved at the last rebuild
    pub fn get_all_fire_particle_ids(&self) -> Vec<ParticleId> {
        self.particles.clone()
    }

    /// Any live child burning
    pub fn is_burning(&self, units: &UnitArena) -> bool {
        self.resolved(units).any(|(_, unit)| unit.is_burning())
    }

    /// Burned out, or nothing left to burn
    pub fn is_burned(&self, units: &UnitArena) -> bool {
        self.compute_fire_state(units) == FireState::Destroyed
    }

    /// No live child burning and none reported as still smoking
    pub fn is_ready_for_cleanup(
        &self,
        units: &UnitArena,
        is_smoking: impl Fn(UnitId) -> bool,
    ) -> bool {
        self.resolved(units)
            .all(|(id, unit)| !unit.is_burning() && !is_smoking(id))
    }

    /// Every burnable child still intact, and there is at least one
    pub fn is_achievement_eligible(&self, units: &UnitArena) -> bool {
        let mut any = false;
        for (_, unit) in self.resolved(units) {
            if unit.material().is_none() {
                continue;
            }
            if !unit.is_intact() {
                return false;
            }
            any = true;
        }
        any
    }

    /// Derive the group state from its live children
    pub fn compute_fire_state(&self, units: &UnitArena) -> FireState {
        let mut resolved = 0usize;
        let mut burnable = 0usize;
        let mut destroyed = 0usize;
        let mut state = FireState::NoFire;

        for (_, unit) in self.resolved(units) {
            resolved += 1;
            if unit.material().is_none() {
                continue;
            }
            burnable += 1;
            match unit.fire_state() {
                FireState::Destroyed => destroyed += 1,
                FireState::LargeFire => state = FireState::LargeFire,
                FireState::SmallFire if state != FireState::LargeFire => {
                    state = FireState::SmallFire;
                }
                _ => {}
            }
        }

        if resolved == 0 || (burnable > 0 && destroyed == burnable) {
            FireState::Destroyed
        } else {
            state
        }
    }

    // ------------------------------------------------------------------
    // Slots
    // ------------------------------------------------------------------

    /// Replace the configured slot arrays
    pub(crate) fn set_slots(&mut self, children: Vec<UnitId>, particles: Vec<ParticleId>) {
        self.configured_children = children;
        self.configured_particles = particles;
    }

    /// Resolve the configured handles, dropping dead ones
    ///
    /// Updates the children's back-references and marks the particle mapping
    /// dirty. Must be followed by
    /// [`assign_fire_particles_to_fire_components`](Self::assign_fire_particles_to_fire_components)
    /// before the next tick.
    pub(crate) fn rebuild_fire_component_array(
        &mut self,
        id: GroupId,
        units: &mut UnitArena,
        particle_alive: impl Fn(ParticleId) -> bool,
    ) {
        let mut seen = FxHashSet::default();
        let children: Vec<UnitId> = self
            .configured_children
            .iter()
            .copied()
            .filter(|child| units.contains_key(*child) && seen.insert(*child))
            .collect();

        // Release children that left the group
        for &old in &self.children {
            if seen.contains(&old) {
                continue;
            }
            if let Some(unit) = units.get_mut(old) {
                if unit.group() == Some(id) {
                    unit.set_group(None);
                    unit.set_particles(Vec::new());
                    for source in self.cooling_sources.ids() {
                        unit.remove_cooling_energy_source(source);
                    }
                }
            }
        }

        for &child in &children {
            if let Some(unit) = units.get_mut(child) {
                if let Some(previous) = unit.group().filter(|previous| *previous != id) {
                    debug!(group = %self.name, ?child, ?previous, "unit moved between fire groups");
                }
                unit.set_group(Some(id));
            }
        }

        let dropped = self.configured_children.len() - children.len();
        if dropped > 0 {
            trace!(group = %self.name, dropped, "dropped unresolvable fire children");
        }

        self.children = children;
        self.particles = self
            .configured_particles
            .iter()
            .copied()
            .filter(|particle| particle_alive(*particle))
            .collect();
        self.particles_dirty = true;
    }

    /// Distribute particles over children
    ///
    /// Index-matched when the counts agree, round-robin otherwise.
    pub(crate) fn assign_fire_particles_to_fire_components(&mut self, units: &mut UnitArena) {
        let live: Vec<UnitId> = self
            .children
            .iter()
            .copied()
            .filter(|id| units.contains_key(*id))
            .collect();

        let mut assignment: Vec<Vec<ParticleId>> = vec![Vec::new(); live.len()];
        if !live.is_empty() {
            for (index, &particle) in self.particles.iter().enumerate() {
                assignment[index % live.len()].push(particle);
            }
        }

        for (id, particles) in live.into_iter().zip(assignment) {
            if let Some(unit) = units.get_mut(id) {
                unit.set_particles(particles);
            }
        }
        self.particles_dirty = false;
    }

    /// Drop every child back-reference (group is being removed)
    pub(crate) fn release_children(&mut self, id: GroupId, units: &mut UnitArena) {
        for &child in &self.children {
            if let Some(unit) = units.get_mut(child) {
                if unit.group() == Some(id) {
                    unit.set_group(None);
                    unit.set_particles(Vec::new());
                    for source in self.cooling_sources.ids() {
                        unit.remove_cooling_energy_source(source);
                    }
                }
            }
        }
        self.children.clear();
    }

    // ------------------------------------------------------------------
    // Fire control
    // ------------------------------------------------------------------

    /// Ignite one random child that can still catch fire
    pub(crate) fn start_fire<R: Rng + ?Sized>(
        &mut self,
        cause: IgnitionCause,
        units: &mut UnitArena,
        config: &FireEngineConfig,
        rng: &mut R,
        out: &mut Vec<FireTransition>,
    ) -> bool {
        let candidates: Vec<UnitId> = self
            .resolved(units)
            .filter(|(_, unit)| unit.is_burnable() && unit.fire_state() == FireState::NoFire)
            .map(|(id, _)| id)
            .collect();

        let Some(&chosen) = candidates.choose(rng) else {
            debug!(group = %self.name, "no child left to ignite");
            return false;
        };
        match units.get_mut(chosen).and_then(|unit| unit.start_fire(cause, config)) {
            Some(change) => {
                out.push(change.for_unit(chosen));
                true
            }
            None => false,
        }
    }

    /// Ignite every child that can still catch fire
    pub(crate) fn start_fire_on_all_fire_components(
        &mut self,
        cause: IgnitionCause,
        units: &mut UnitArena,
        config: &FireEngineConfig,
        out: &mut Vec<FireTransition>,
    ) {
        self.for_each_child(units, out, |unit| unit.start_fire(cause, config));
    }

    pub(crate) fn stop_fire(&mut self, units: &mut UnitArena, out: &mut Vec<FireTransition>) {
        self.for_each_child(units, out, FireUnit::stop_fire);
    }

    pub(crate) fn destroy_by_fire(&mut self, units: &mut UnitArena, out: &mut Vec<FireTransition>) {
        self.for_each_child(units, out, FireUnit::destroy_by_fire);
    }

    /// Reset every child and the group itself
    ///
    /// Returns whether the group had announced burning, so the caller can
    /// publish the matching stop.
    pub(crate) fn cleanup(&mut self, units: &mut UnitArena, out: &mut Vec<FireTransition>) -> bool {
        self.for_each_child(units, out, FireUnit::cleanup);
        self.cooling_sources.clear();
        let was_notified = self.started_burning_notified;
        self.started_burning_notified = false;
        self.refresh_aggregates(units);
        was_notified
    }

    /// Split external fire energy equally over children that can burn
    pub(crate) fn receive_fire_energy(
        &mut self,
        amount: f32,
        dt: f32,
        sender: SourceId,
        units: &mut UnitArena,
    ) {
        let targets: Vec<UnitId> = self
            .resolved(units)
            .filter(|(_, unit)| unit.is_burnable())
            .map(|(id, _)| id)
            .collect();
        if targets.is_empty() {
            return;
        }
        let share = amount / targets.len() as f32;
        for id in targets {
            if let Some(unit) = units.get_mut(id) {
                unit.receive_fire_energy(share, dt, sender);
            }
        }
    }

    /// Register a cooling source on the group and fan it out
    pub(crate) fn add_cooling_energy_source(
        &mut self,
        source: SourceId,
        extinguish: f32,
        cooling: f32,
        units: &mut UnitArena,
    ) {
        self.cooling_sources
            .insert(source, CoolingEnergy::new(extinguish, cooling));
        self.distribute_cooling(units);
    }

    /// Deregister a cooling source from the group and every child
    pub(crate) fn remove_cooling_energy_source(&mut self, source: SourceId, units: &mut UnitArena) {
        self.cooling_sources.remove(source);
        for &child in &self.children {
            if let Some(unit) = units.get_mut(child) {
                unit.remove_cooling_energy_source(source);
            }
        }
    }

    /// Recompute the per-child share of every group cooling source
    ///
    /// Burning children split the extinguish energy equally and get no
    /// cooling; non-burning children get the full cooling energy and no
    /// extinguish energy.
    pub(crate) fn distribute_cooling(&self, units: &mut UnitArena) {
        if self.cooling_sources.is_empty() {
            return;
        }
        let burning = self
            .resolved(units)
            .filter(|(_, unit)| unit.is_burning())
            .count();

        for &child in &self.children {
            let Some(unit) = units.get_mut(child) else {
                continue;
            };
            let child_burning = unit.is_burning();
            for (source, energy) in self.cooling_sources.iter() {
                if child_burning {
                    unit.add_cooling_energy_source(source, energy.extinguish / burning as f32, 0.0);
                } else {
                    unit.add_cooling_energy_source(source, 0.0, energy.cooling);
                }
            }
        }
    }

    /// Move capped energy between siblings; runs after every child ticked
    pub(crate) fn balancing_fire_energy(
        &mut self,
        balancer: &EnergyBalancer,
        units: &mut UnitArena,
        config: &FireEngineConfig,
        out: &mut Vec<FireTransition>,
    ) -> f32 {
        if !self.is_burning(units) {
            return 0.0;
        }

        let (ids, slots): (Vec<UnitId>, Vec<BalanceSlot>) = self
            .resolved(units)
            .map(|(id, unit)| {
                (
                    id,
                    BalanceSlot {
                        energy: unit.energy(),
                        max_energy: unit.max_energy(),
                        eligible: unit.is_burnable(),
                    },
                )
            })
            .unzip();

        let plan = balancer.balance(&slots);
        if plan.is_noop() {
            return 0.0;
        }
        trace!(group = %self.name, transferred = plan.transferred, "balanced fire energy");

        for (id, delta) in ids.into_iter().zip(plan.deltas) {
            if delta == 0.0 {
                continue;
            }
            if let Some(change) = units
                .get_mut(id)
                .and_then(|unit| unit.apply_balancing_delta(delta, config))
            {
                out.push(change.for_unit(id));
            }
        }
        plan.transferred
    }

    // ------------------------------------------------------------------
    // Notification bookkeeping
    // ------------------------------------------------------------------

    /// A child ignited; true if this is the first ignition of the episode
    pub(crate) fn notify_child_ignited(&mut self) -> bool {
        if self.started_burning_notified {
            return false;
        }
        self.started_burning_notified = true;
        true
    }

    /// Refresh aggregates and detect the end of a burning episode
    pub(crate) fn check_fire_state(&mut self, units: &UnitArena) -> GroupStateCheck {
        self.refresh_aggregates(units);
        let mut check = GroupStateCheck {
            stopped: false,
            destroyed: self.group_fire_state == FireState::Destroyed,
        };
        if self.started_burning_notified && !self.is_burning(units) {
            self.started_burning_notified = false;
            check.stopped = true;
        }
        check
    }

    fn refresh_aggregates(&mut self, units: &UnitArena) {
        let mut total_damage = 0.0;
        let mut total_max_life = 0.0;
        let mut burning = 0;
        for (_, unit) in self.resolved(units) {
            total_damage += unit.total_damage();
            total_max_life += unit.max_life();
            if unit.is_burning() {
                burning += 1;
            }
        }
        self.group_fire_state = self.compute_fire_state(units);
        self.total_damage = total_damage;
        self.total_max_life = total_max_life;
        self.num_fire_objects = burning;
    }

    fn for_each_child(
        &self,
        units: &mut UnitArena,
        out: &mut Vec<FireTransition>,
        mut op: impl FnMut(&mut FireUnit) -> Option<StateChange>,
    ) {
        for &child in &self.children {
            if let Some(change) = units.get_mut(child).and_then(&mut op) {
                out.push(change.for_unit(child));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::FireMaterial;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn material() -> FireMaterial {
        FireMaterial {
            name: "room".to_string(),
            combustion_energy: 100.0,
            max_life: 100.0,
            fire_resistance: 0.0,
            blast_force: 0.0,
            blast_radius: 0.0,
            hard_radius: 1.0,
            soft_radius: 2.0,
        }
    }

    fn config() -> FireEngineConfig {
        FireEngineConfig {
            combustion_growth_rate: 0.0,
            ..FireEngineConfig::default()
        }
    }

    fn setup(children: usize) -> (UnitArena, SlotMap<GroupId, ()>, GroupId, FireGroup) {
        let mut units = UnitArena::with_key();
        let ids: Vec<UnitId> = (0..children)
            .map(|i| units.insert(FireUnit::with_material(format!("room{i}"), material())))
            .collect();
        let mut groups = SlotMap::with_key();
        let gid = groups.insert(());
        let mut group = FireGroup::new("house", ids, Vec::new());
        group.rebuild_fire_component_array(gid, &mut units, |_| true);
        group.assign_fire_particles_to_fire_components(&mut units);
        (units, groups, gid, group)
    }

    fn ignite(units: &mut UnitArena, id: UnitId, energy: f32) {
        let config = config();
        let unit = units.get_mut(id).expect("unit");
        unit.receive_fire_energy(energy, 1.0, SourceId(100));
        unit.update(1.0, &config);
    }

    #[test]
    fn test_rebuild_drops_dead_children() {
        let mut units = UnitArena::with_key();
        let alive = units.insert(FireUnit::with_material("a", material()));
        let dead = units.insert(FireUnit::with_material("b", material()));
        units.remove(dead);

        let mut groups: SlotMap<GroupId, ()> = SlotMap::with_key();
        let gid = groups.insert(());
        let mut group = FireGroup::new("house", vec![alive, dead, alive], Vec::new());
        group.rebuild_fire_component_array(gid, &mut units, |_| true);

        assert_eq!(group.children(), &[alive]);
        assert_eq!(units[alive].group(), Some(gid));
        assert!(group.needs_particle_assignment());
    }

    #[test]
    fn test_particle_assignment_round_robin() {
        let mut units = UnitArena::with_key();
        let a = units.insert(FireUnit::with_material("a", material()));
        let b = units.insert(FireUnit::with_material("b", material()));
        let mut particles: SlotMap<ParticleId, ()> = SlotMap::with_key();
        let p: Vec<ParticleId> = (0..3).map(|_| particles.insert(())).collect();

        let mut groups: SlotMap<GroupId, ()> = SlotMap::with_key();
        let gid = groups.insert(());
        let mut group = FireGroup::new("house", vec![a, b], p.clone());
        group.rebuild_fire_component_array(gid, &mut units, |id| particles.contains_key(id));
        group.assign_fire_particles_to_fire_components(&mut units);

        assert_eq!(units[a].particles(), &[p[0], p[2]]);
        assert_eq!(units[b].particles(), &[p[1]]);
        assert!(!group.needs_particle_assignment());
        assert_eq!(group.get_all_fire_particle_ids(), p);
    }

    #[test]
    fn test_particle_assignment_index_matched() {
        let mut units = UnitArena::with_key();
        let a = units.insert(FireUnit::with_material("a", material()));
        let b = units.insert(FireUnit::with_material("b", material()));
        let mut particles: SlotMap<ParticleId, ()> = SlotMap::with_key();
        let p0 = particles.insert(());
        let p1 = particles.insert(());

        let mut groups: SlotMap<GroupId, ()> = SlotMap::with_key();
        let gid = groups.insert(());
        let mut group = FireGroup::new("house", vec![a, b], vec![p0, p1]);
        group.rebuild_fire_component_array(gid, &mut units, |id| particles.contains_key(id));
        group.assign_fire_particles_to_fire_components(&mut units);

        assert_eq!(units[a].particles(), &[p0]);
        assert_eq!(units[b].particles(), &[p1]);
    }

    #[test]
    fn test_extinguish_split_over_burning_children() {
        let (mut units, _groups, _gid, mut group) = setup(3);
        let ids = group.children().to_vec();
        ignite(&mut units, ids[0], 60.0);
        ignite(&mut units, ids[1], 60.0);

        group.add_cooling_energy_source(SourceId(1), 30.0, 10.0, &mut units);

        let first = units[ids[0]].cooling_sources().get(SourceId(1)).expect("registered");
        let second = units[ids[1]].cooling_sources().get(SourceId(1)).expect("registered");
        let idle = units[ids[2]].cooling_sources().get(SourceId(1)).expect("registered");
        assert_relative_eq!(first.extinguish, 15.0);
        assert_relative_eq!(second.extinguish, 15.0);
        assert_eq!(first.cooling, 0.0);
        assert_eq!(idle.extinguish, 0.0);
        assert_relative_eq!(idle.cooling, 10.0);
    }

    #[test]
    fn test_remove_cooling_from_children() {
        let (mut units, _groups, _gid, mut group) = setup(2);
        group.add_cooling_energy_source(SourceId(1), 30.0, 10.0, &mut units);
        group.remove_cooling_energy_source(SourceId(1), &mut units);
        group.remove_cooling_energy_source(SourceId(1), &mut units);

        assert!(group.cooling_sources().is_empty());
        for &id in group.children() {
            assert!(units[id].cooling_sources().is_empty());
        }
    }

    #[test]
    fn test_start_fire_picks_one_child() {
        let (mut units, _groups, _gid, mut group) = setup(4);
        let mut rng = StdRng::seed_from_u64(7);
        let mut out = Vec::new();

        assert!(group.start_fire(IgnitionCause::Scripted, &mut units, &config(), &mut rng, &mut out));
        assert_eq!(out.len(), 1);
        assert!(group.is_burning(&units));
        assert_eq!(
            group.resolved(&units).filter(|(_, u)| u.is_burning()).count(),
            1
        );
    }

    #[test]
    fn test_start_fire_on_all() {
        let (mut units, _groups, _gid, mut group) = setup(3);
        let mut out = Vec::new();
        group.start_fire_on_all_fire_components(IgnitionCause::Scripted, &mut units, &config(), &mut out);
        assert_eq!(out.len(), 3);
        assert!(group.resolved(&units).all(|(_, u)| u.is_burning()));
    }

    #[test]
    fn test_dedup_flag() {
        let (_units, _groups, _gid, mut group) = setup(2);
        assert!(group.notify_child_ignited());
        assert!(!group.notify_child_ignited());
        assert!(group.started_burning_notified());
    }

    #[test]
    fn test_check_state_resets_flag_when_out() {
        let (mut units, _groups, _gid, mut group) = setup(2);
        let ids = group.children().to_vec();
        ignite(&mut units, ids[0], 60.0);
        group.notify_child_ignited();

        let check = group.check_fire_state(&units);
        assert!(!check.stopped);
        assert_eq!(group.num_fire_objects(), 1);

        let mut out = Vec::new();
        group.stop_fire(&mut units, &mut out);
        let check = group.check_fire_state(&units);
        assert!(check.stopped);
        assert!(!check.destroyed);
        assert!(!group.started_burning_notified());
    }

    #[test]
    fn test_empty_group_is_burned() {
        let (mut units, _groups, _gid, group) = setup(2);
        let ids = group.children().to_vec();
        for id in ids {
            units.remove(id);
        }
        assert!(group.is_burned(&units));
        assert!(!group.is_burning(&units));
    }

    #[test]
    fn test_destroyed_group() {
        let (mut units, _groups, _gid, mut group) = setup(2);
        let mut out = Vec::new();
        group.destroy_by_fire(&mut units, &mut out);
        assert_eq!(out.len(), 2);
        assert!(group.is_burned(&units));
        assert_eq!(group.compute_fire_state(&units), FireState::Destroyed);
    }

    #[test]
    fn test_balancing_spreads_to_siblings() {
        let (mut units, _groups, _gid, mut group) = setup(3);
        let ids = group.children().to_vec();
        ignite(&mut units, ids[0], 100.0);

        let before: f32 = group.resolved(&units).map(|(_, u)| u.energy()).sum();
        let mut out = Vec::new();
        let balancer = EnergyBalancer::new(0.8, 0.5);
        let moved = group.balancing_fire_energy(&balancer, &mut units, &config(), &mut out);
        let after: f32 = group.resolved(&units).map(|(_, u)| u.energy()).sum();

        assert!(moved > 0.0);
        assert_relative_eq!(before, after, epsilon = 1e-3);
        // Both idle siblings caught fire from the transfer
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|t| t.change.cause == IgnitionCause::Spread));
    }

    #[test]
    fn test_group_receive_energy_split() {
        let (mut units, _groups, _gid, mut group) = setup(4);
        group.receive_fire_energy(40.0, 1.0, SourceId(3), &mut units);
        for &id in group.children() {
            assert_relative_eq!(units[id].pending_energy(), 10.0);
        }
    }

    #[test]
    fn test_achievement_eligibility() {
        let (mut units, _groups, _gid, group) = setup(2);
        assert!(group.is_achievement_eligible(&units));
        let ids = group.children().to_vec();
        ignite(&mut units, ids[1], 30.0);
        assert!(!group.is_achievement_eligible(&units));
    }

    #[test]
    fn test_cleanup_reports_previous_flag() {
        let (mut units, _groups, _gid, mut group) = setup(2);
        let ids = group.children().to_vec();
        ignite(&mut units, ids[0], 60.0);
        group.notify_child_ignited();

        let mut out = Vec::new();
        assert!(group.cleanup(&mut units, &mut out));
        assert!(!group.started_burning_notified());
        assert!(!group.is_burning(&units));
        assert_eq!(group.total_damage(), 0.0);
    }
}
