//! Volume roots and connection state.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::EntryId;

/// A mount point delimiting which entries share a filesystem.
///
/// Two entries are "same volume" when their roots compare equal; crossing
/// volumes switches the default transfer from move to copy and forces the
/// contents-available precondition when the source is constrained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeRoot {
    /// Identifier of the volume's root directory.
    pub root: EntryId,
    /// Display label for the volume.
    pub label: CompactString,
}

impl VolumeRoot {
    /// Create a new volume root.
    pub fn new(root: impl Into<EntryId>, label: impl Into<CompactString>) -> Self {
        Self {
            root: root.into(),
            label: label.into(),
        }
    }
}

impl PartialEq for VolumeRoot {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl Eq for VolumeRoot {}

/// Connection state of a volume's backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Contents reachable without restriction.
    #[default]
    Online,
    /// Backing store unreachable; only cached contents are usable.
    Offline,
    /// Reachable over a metered link; bulk fetches should be avoided.
    Metered,
}

impl ConnectionState {
    /// Whether transfers from this volume must verify content availability
    /// up front instead of fetching on demand.
    pub fn is_constrained(&self) -> bool {
        !matches!(self, ConnectionState::Online)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_equality_is_by_root() {
        let a = VolumeRoot::new("fs:/removable/sd", "SD Card");
        let b = VolumeRoot::new("fs:/removable/sd", "SD-CARD");
        let c = VolumeRoot::new("fs:/drive", "Drive");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_constrained_states() {
        assert!(!ConnectionState::Online.is_constrained());
        assert!(ConnectionState::Offline.is_constrained());
        assert!(ConnectionState::Metered.is_constrained());
    }
}
