//! Fire Engine Core Library
//!
//! Per-object fire simulation for game worlds. Every flammable object carries
//! a [`FireUnit`] that integrates received fire energy, cooling from hoses and
//! wells, and damage, and moves through
//! `NoFire → SmallFire ⇄ LargeFire → Destroyed`. Objects made of several
//! ignition points are coordinated by a [`FireGroup`], which splits cooling
//! over its children, redistributes energy between siblings and reports one
//! "started burning" per episode.
//!
//! ## Driving the engine
//!
//! The host owns a [`FireWorld`], spawns units, groups and particle entities
//! in it and calls [`FireWorld::tick`] once per frame. Presentation is
//! decoupled through [`FireObserver`] callbacks, gameplay notifications are
//! queued as [`FireEvent`]s and the number of burning objects is kept in an
//! injected [`BurningCounter`].
//!
//! ```
//! use fire_engine_core::{
//!     BurningCounter, FireEngineConfig, FireWorld, IgnitionCause, MaterialLibrary,
//! };
//!
//! let counter = BurningCounter::new();
//! let mut world = FireWorld::new(
//!     FireEngineConfig::default(),
//!     MaterialLibrary::with_presets(),
//!     counter.clone(),
//! );
//! let shed = world.spawn_unit("shed", "wooden_structure");
//! world.start_fire(shed, IgnitionCause::Scripted);
//! world.tick(0.1);
//!
//! assert!(world.is_burning(shed));
//! assert_eq!(counter.get(), 1);
//! ```

// Core types and utilities
pub mod config;
pub mod core_types;

// Fire objects and coordination
pub mod fire;

// World driver and host-facing surfaces
pub mod simulation;

pub use config::{ConfigError, FireEngineConfig};
pub use core_types::{
    FireIntensity, FireMaterial, FireState, FireTransition, GroupId, IgnitionCause,
    MaterialError, MaterialLibrary, ParticleId, SourceId, StateChange, TransitionOrigin, UnitId,
};
pub use fire::{CoolingEnergy, EnergyBalancer, FireGroup, FireReceiver, FireUnit};
pub use simulation::{
    BurningCounter, EventBus, FireEvent, FireObserver, FireParticle, FireWorld, NullObserver,
    PersistenceError, WorldSnapshot,
};
