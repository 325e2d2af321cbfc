//! Core types shared across the fire engine

pub mod ids;
pub mod material;
pub mod state;

pub use ids::{GroupId, ParticleId, SourceId, UnitId};
pub use material::{FireMaterial, MaterialError, MaterialLibrary};
pub use state::{
    FireIntensity, FireState, FireTransition, IgnitionCause, StateChange, TransitionOrigin,
};
