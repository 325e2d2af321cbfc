//! Save-game support for fire state
//!
//! Units, groups and whole worlds serialize with serde and are stored as
//! compact binary blobs. Configuration and the material library are not part
//! of a snapshot; the host reloads them the same way it did at startup. The
//! group ignition RNG is reseeded from the configuration on restore.

use super::effects::SmokeEffects;
use super::registry::EntityRegistry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Everything needed to resume a fire world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub registry: EntityRegistry,
    pub smoke: SmokeEffects,
    /// Simulated seconds since the world was created
    pub time: f64,
    /// Value of the burning counter when the snapshot was taken
    pub burning_count: u32,
}

impl WorldSnapshot {
    /// Write the snapshot to a file
    ///
    /// # Errors
    /// Returns error if the snapshot cannot be encoded or the file cannot be
    /// written
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        let bytes = encode(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a snapshot from a file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or does not hold a snapshot
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let bytes = fs::read(path)?;
        decode(&bytes)
    }
}

/// Encode any fire state (unit, group, snapshot) to bytes
///
/// # Errors
/// Returns [`PersistenceError::Encode`] if serialization fails
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, PersistenceError> {
    bincode::serialize(value).map_err(PersistenceError::Encode)
}

/// Decode fire state previously produced by [`encode`]
///
/// # Errors
/// Returns [`PersistenceError::Decode`] if the bytes are truncated or of the
/// wrong shape
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistenceError> {
    bincode::deserialize(bytes).map_err(PersistenceError::Decode)
}

/// Errors saving or loading fire state
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to encode fire state: {0}")]
    Encode(#[source] bincode::Error),
    #[error("failed to decode fire state: {0}")]
    Decode(#[source] bincode::Error),
    #[error("failed to access fire save file: {0}")]
    Io(#[from] std::io::Error),
}
