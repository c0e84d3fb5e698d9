//! Snapshot error types.

use std::fmt;
use thiserror::Error;

/// Wire encoding of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotEncoding {
    Json,
    Bincode,
}

impl fmt::Display for SnapshotEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SnapshotEncoding::Json => "json",
            SnapshotEncoding::Bincode => "bincode",
        })
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SnapshotError {
    #[error("cannot encode snapshot {id} as {encoding}: {reason}")]
    Encode {
        encoding: SnapshotEncoding,
        id: uuid::Uuid,
        reason: String,
    },

    #[error("cannot decode {encoding} snapshot: {reason}")]
    Decode {
        encoding: SnapshotEncoding,
        reason: String,
    },

    /// Written by a different format version. Carries the snapshot id so the
    /// offending file can be found.
    #[error("snapshot {id} has format version {found}, this build reads {supported}")]
    UnsupportedVersion {
        id: uuid::Uuid,
        found: u32,
        supported: u32,
    },
}

impl SnapshotError {
    pub fn encoding(&self) -> Option<SnapshotEncoding> {
        match self {
            SnapshotError::Encode { encoding, .. } | SnapshotError::Decode { encoding, .. } => {
                Some(*encoding)
            }
            SnapshotError::UnsupportedVersion { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_the_encoding() {
        let err = SnapshotError::Decode {
            encoding: SnapshotEncoding::Bincode,
            reason: "unexpected end of file".into(),
        };

        assert_eq!(err.encoding(), Some(SnapshotEncoding::Bincode));
        assert_eq!(
            err.to_string(),
            "cannot decode bincode snapshot: unexpected end of file"
        );
    }
}
