//! Shared helpers for fire engine integration tests
#![allow(dead_code)]

use fire_engine_core::core_types::FireIntensity;
use fire_engine_core::{
    BurningCounter, FireEngineConfig, FireMaterial, FireObserver, FireParticle, FireWorld,
    MaterialLibrary, ParticleId, StateChange, UnitId,
};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_tracing() {
    // Set RUST_LOG=fire_engine_core=trace to see engine logs
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// 100 energy, 100 life, no resistance, no blast
pub fn room() -> FireMaterial {
    FireMaterial {
        name: "room".to_string(),
        combustion_energy: 100.0,
        max_life: 100.0,
        fire_resistance: 0.0,
        blast_force: 0.0,
        blast_radius: 0.0,
        hard_radius: 1.0,
        soft_radius: 3.0,
    }
}

/// Config without self-sustaining growth, so energies are easy to predict
pub fn still_config() -> FireEngineConfig {
    FireEngineConfig {
        combustion_growth_rate: 0.0,
        ..FireEngineConfig::default()
    }
}

pub fn library() -> MaterialLibrary {
    let mut library = MaterialLibrary::with_presets();
    library.insert(room());
    library
}

pub fn world_with(config: FireEngineConfig) -> (FireWorld, BurningCounter) {
    let counter = BurningCounter::new();
    let world = FireWorld::new(config, library(), counter.clone());
    (world, counter)
}

pub fn world() -> (FireWorld, BurningCounter) {
    world_with(still_config())
}

/// Everything an observer was told
#[derive(Debug, Default)]
pub struct Recorded {
    pub states: Vec<(UnitId, StateChange)>,
    pub damage: Vec<(UnitId, f32)>,
    pub intensity: Vec<(UnitId, FireIntensity)>,
    pub particles: Vec<(ParticleId, FireParticle)>,
}

pub struct Recorder(pub Rc<RefCell<Recorded>>);

impl FireObserver for Recorder {
    fn on_state_changed(&mut self, unit: UnitId, change: &StateChange) {
        self.0.borrow_mut().states.push((unit, *change));
    }

    fn on_damage_percent(&mut self, unit: UnitId, percent: f32) {
        self.0.borrow_mut().damage.push((unit, percent));
    }

    fn on_intensity_changed(&mut self, unit: UnitId, intensity: FireIntensity) {
        self.0.borrow_mut().intensity.push((unit, intensity));
    }

    fn on_particle_changed(&mut self, particle: ParticleId, state: FireParticle) {
        self.0.borrow_mut().particles.push((particle, state));
    }
}

pub fn recording(world: FireWorld) -> (FireWorld, Rc<RefCell<Recorded>>) {
    let recorded = Rc::new(RefCell::new(Recorded::default()));
    let world = world.with_observer(Box::new(Recorder(Rc::clone(&recorded))));
    (world, recorded)
}
