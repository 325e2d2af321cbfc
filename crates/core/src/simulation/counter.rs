//! Shared tally of burning objects for UI
//!
//! A standalone unit or a group counts once while burning. The counter is
//! created by the host and handed to the world, so the HUD can hold a clone
//! and read it without touching the engine.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct BurningCounter {
    count: Arc<AtomicU32>,
}

impl BurningCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects currently burning
    pub fn get(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    pub(crate) fn increment(&self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Saturates at zero
    pub(crate) fn decrement(&self) {
        // Err only means the count was already zero
        let _ = self
            .count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    pub(crate) fn set(&self, value: u32) {
        self.count.store(value, Ordering::Relaxed);
    }
}
