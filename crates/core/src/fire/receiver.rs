//! Addressing of anything that can receive fire or cooling energy

use crate::core_types::{GroupId, UnitId};
use serde::{Deserialize, Serialize};

/// A standalone fire unit or a whole fire group
///
/// External systems (explosions, hoses, scripts) talk to either kind through
/// the same operations on the world; the variant decides whether energy goes
/// to one unit or is fanned out over a group's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireReceiver {
    Unit(UnitId),
    Group(GroupId),
}

impl FireReceiver {
    #[must_use]
    pub fn as_unit(self) -> Option<UnitId> {
        match self {
            FireReceiver::Unit(id) => Some(id),
            FireReceiver::Group(_) => None,
        }
    }

    #[must_use]
    pub fn as_group(self) -> Option<GroupId> {
        match self {
            FireReceiver::Group(id) => Some(id),
            FireReceiver::Unit(_) => None,
        }
    }
}

impl From<UnitId> for FireReceiver {
    fn from(id: UnitId) -> Self {
        FireReceiver::Unit(id)
    }
}

impl From<GroupId> for FireReceiver {
    fn from(id: GroupId) -> Self {
        FireReceiver::Group(id)
    }
}
