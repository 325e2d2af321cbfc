//! Fire state machine vocabulary shared by units, groups and the world

use super::ids::{SourceId, UnitId};
use serde::{Deserialize, Serialize};

/// Burn state of a single fire unit (or the derived state of a group)
///
/// `NoFire → SmallFire ⇄ LargeFire → Destroyed`. `Destroyed` is terminal
/// until an explicit cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FireState {
    /// Not burning
    #[default]
    NoFire,
    /// Burning below the small-fire energy threshold
    SmallFire,
    /// Burning at or above the small-fire energy threshold
    LargeFire,
    /// Burned out, damage reached maximum life
    Destroyed,
}

impl FireState {
    /// Whether flames are present
    #[must_use]
    pub fn is_burning(self) -> bool {
        matches!(self, FireState::SmallFire | FireState::LargeFire)
    }

    /// Convert from u8 for save-game and tooling interop
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(FireState::NoFire),
            1 => Some(FireState::SmallFire),
            2 => Some(FireState::LargeFire),
            3 => Some(FireState::Destroyed),
            _ => None,
        }
    }

    /// Convert to u8 for save-game and tooling interop
    #[must_use]
    pub fn as_u8(self) -> u8 {
        match self {
            FireState::NoFire => 0,
            FireState::SmallFire => 1,
            FireState::LargeFire => 2,
            FireState::Destroyed => 3,
        }
    }
}

/// Coarse intensity bucket consumed by the audio loop selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum FireIntensity {
    #[default]
    None,
    Small,
    Medium,
    Large,
}

/// What set a unit on fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IgnitionCause {
    /// External energy from a known source (explosion, neighbouring fire, ...)
    Source(SourceId),
    /// Energy moved in from a sibling by group balancing
    Spread,
    /// Mission script or debug command
    Scripted,
    /// Nothing recorded
    #[default]
    Unknown,
}

/// Which path produced a state change
///
/// Drives how particles and smoke are handled and how the stop event is
/// flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionOrigin {
    /// Regular simulation (tick, ignition, balancing, damage)
    Simulation,
    /// `stop_fire`: flames and smoke removed in the same call
    Forced,
    /// `cleanup`: like `Forced`, and the stop event is flagged as scripted
    Cleanup,
}

/// State change of one unit, before it is bound to a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub from: FireState,
    pub to: FireState,
    pub cause: IgnitionCause,
    pub origin: TransitionOrigin,
}

impl StateChange {
    /// Change from not burning to burning
    #[must_use]
    pub fn is_ignition(&self) -> bool {
        !self.from.is_burning() && self.to.is_burning()
    }

    /// Change from burning to not burning
    #[must_use]
    pub fn is_extinction(&self) -> bool {
        self.from.is_burning() && !self.to.is_burning()
    }

    /// Bind the change to the unit it happened on
    #[must_use]
    pub fn for_unit(self, unit: UnitId) -> FireTransition {
        FireTransition { unit, change: self }
    }
}

/// State change of a specific unit, queued for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireTransition {
    pub unit: UnitId,
    pub change: StateChange,
}
