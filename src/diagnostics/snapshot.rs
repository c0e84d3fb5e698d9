//! Point-in-time snapshots of a machine for debugging and test fixtures.
//!
//! A snapshot carries the current state, context and history. It does not
//! carry guards, actions or effects, which are closures and not serializable.

use crate::core::{Context, EventKind, State, StateHistory};
use crate::diagnostics::error::{SnapshotEncoding, SnapshotError};
use crate::effects::StateMachine;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable view of a machine instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize",
    deserialize = "C: DeserializeOwned"
))]
pub struct MachineSnapshot<S: State, E: EventKind, C> {
    pub version: u32,
    pub id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub initial_state: S,
    pub current_state: S,
    pub context: C,
    pub history: StateHistory<S, E>,
}

impl<S, E, C> MachineSnapshot<S, E, C>
where
    S: State,
    E: EventKind,
    C: Serialize + DeserializeOwned,
{
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| self.encode_error(SnapshotEncoding::Json, e))
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| decode_error(SnapshotEncoding::Json, e))?;
        snapshot.check_version()
    }

    /// Compact binary encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        bincode::serialize(self).map_err(|e| self.encode_error(SnapshotEncoding::Bincode, e))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| decode_error(SnapshotEncoding::Bincode, e))?;
        snapshot.check_version()
    }

    fn check_version(self) -> Result<Self, SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                id: self.id,
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(self)
    }

    fn encode_error(&self, encoding: SnapshotEncoding, error: impl ToString) -> SnapshotError {
        SnapshotError::Encode {
            encoding,
            id: self.id,
            reason: error.to_string(),
        }
    }
}

fn decode_error(encoding: SnapshotEncoding, error: impl ToString) -> SnapshotError {
    SnapshotError::Decode {
        encoding,
        reason: error.to_string(),
    }
}

impl<S: State, E: EventKind, C: Context> StateMachine<S, E, C> {
    /// Capture the current state, context and history.
    pub fn snapshot(&self) -> MachineSnapshot<S, E, C> {
        MachineSnapshot {
            version: SNAPSHOT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            initial_state: self.initial_state().clone(),
            current_state: self.current_state().clone(),
            context: self.context().clone(),
            history: self.history().clone(),
        }
    }
}
