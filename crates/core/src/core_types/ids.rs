//! Entity handles and external source identifiers
//!
//! Units, groups and particle entities live in generational arenas. A handle
//! outlives the entity it names, so every lookup goes through the registry and
//! may come back empty.

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Handle of a host object carrying a [`FireUnit`](crate::fire::FireUnit)
    pub struct UnitId;

    /// Handle of a composite object coordinated by a [`FireGroup`](crate::fire::FireGroup)
    pub struct GroupId;

    /// Handle of a particle entity whose active/visible flags the engine toggles
    pub struct ParticleId;
}

/// Identifier of an external energy source (hose stream, well, explosion, ...)
///
/// Chosen by the caller. Cooling registrations are keyed by it, so adding the
/// same source twice overwrites and removing an unknown source is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

impl From<u64> for SourceId {
    fn from(value: u64) -> Self {
        SourceId(value)
    }
}
