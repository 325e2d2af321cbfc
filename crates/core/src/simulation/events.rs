//! Gameplay notifications published by the fire engine

use crate::core_types::{IgnitionCause, UnitId};
use crate::fire::FireReceiver;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Event published towards mission logic, UI and AI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FireEvent {
    /// A standalone unit or a group began burning; once per burning episode
    StartedBurning {
        receiver: FireReceiver,
        cause: IgnitionCause,
    },
    /// The episode announced by `StartedBurning` ended
    StoppedBurning {
        receiver: FireReceiver,
        /// The receiver burned out rather than being extinguished
        destroyed: bool,
        /// Ended by an explicit cleanup
        scripted_cleanup: bool,
    },
    /// A unit with an explosive material was destroyed
    Blast { unit: UnitId, force: f32, radius: f32 },
}

/// Sink for [`FireEvent`]s
pub trait EventBus {
    fn publish(&mut self, event: FireEvent);
}

impl EventBus for Vec<FireEvent> {
    fn publish(&mut self, event: FireEvent) {
        self.push(event);
    }
}

/// Events published since the host last drained them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventQueue {
    events: Vec<FireEvent>,
}

impl EventQueue {
    /// Take every queued event in publication order
    pub fn drain(&mut self) -> Vec<FireEvent> {
        std::mem::take(&mut self.events)
    }

    /// Forward every queued event to `bus`
    pub fn flush_into(&mut self, bus: &mut dyn EventBus) {
        for event in self.events.drain(..) {
            bus.publish(event);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FireEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventBus for EventQueue {
    fn publish(&mut self, event: FireEvent) {
        trace!(?event, "fire event queued");
        self.events.push(event);
    }
}
