//! Fire world: entity storage, tick scheduling and host-facing surfaces
//!
//! - [`FireWorld`]: owns all fire entities and drives them
//! - [`EntityRegistry`]: generational arenas of units, groups and particles
//! - [`FireEvent`] / [`EventBus`]: gameplay notifications
//! - [`FireObserver`]: presentation callbacks
//! - [`BurningCounter`]: injected UI tally
//! - [`SmokeEffects`]: smoke lingering after a fire dies down
//! - [`WorldSnapshot`]: save-game state

pub mod counter;
pub mod effects;
pub mod events;
pub mod hooks;
pub mod persistence;
pub mod registry;
pub mod world;

pub use counter::BurningCounter;
pub use effects::{SmokeEffects, SmokeLinger};
pub use events::{EventBus, EventQueue, FireEvent};
pub use hooks::{FireObserver, NullObserver};
pub use persistence::{PersistenceError, WorldSnapshot};
pub use registry::{EntityRegistry, FireParticle};
pub use world::FireWorld;
