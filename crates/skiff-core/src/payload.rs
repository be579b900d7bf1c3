//! Transfer payload and effect types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EntryId, EntryRef, VolumeRoot};

/// The set of operations a gesture allows.
///
/// Cut and an unmodified drag of read-only sources allow only one of the
/// two; a plain drag from a writable directory allows either, with the
/// concrete choice deferred to drop time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferEffect {
    /// Only copying is allowed.
    Copy,
    /// Only moving is allowed.
    Move,
    /// Either; resolved by destination volume and modifier keys at drop.
    CopyOrMove,
}

impl TransferEffect {
    /// Whether a move is permitted under this effect.
    pub fn allows_move(&self) -> bool {
        matches!(self, TransferEffect::Move | TransferEffect::CopyOrMove)
    }

    /// Whether a copy is permitted under this effect.
    pub fn allows_copy(&self) -> bool {
        matches!(self, TransferEffect::Copy | TransferEffect::CopyOrMove)
    }
}

impl std::fmt::Display for TransferEffect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Move => write!(f, "move"),
            Self::CopyOrMove => write!(f, "copyMove"),
        }
    }
}

impl std::str::FromStr for TransferEffect {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(Self::Copy),
            "move" => Ok(Self::Move),
            "copyMove" => Ok(Self::CopyOrMove),
            _ => Err(()),
        }
    }
}

/// The drop decision for the target currently under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DropEffect {
    /// The target cannot accept the payload.
    #[default]
    None,
    /// Dropping here copies.
    Copy,
    /// Dropping here moves.
    Move,
}

/// The concrete operation handed to the backend once a transfer commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferKind {
    Copy,
    Move,
}

impl std::fmt::Display for TransferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy => write!(f, "copy"),
            Self::Move => write!(f, "move"),
        }
    }
}

/// Immutable snapshot of what one gesture is transferring.
///
/// Created at drag-start/cut/copy time, consumed at most once at drop/paste
/// time, then discarded (or retained read-only until the next gesture
/// overwrites it). Never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferPayload {
    /// Volume the selection was captured from.
    pub source_root: VolumeRoot,
    /// Selected entries, in selection order.
    pub entries: Vec<EntryRef>,
    /// Operations the gesture allows.
    pub effect: TransferEffect,
    /// True only if every entry's byte content is retrievable without a
    /// network fetch.
    pub contents_fully_available: bool,
    /// When the selection was captured.
    pub captured_at: DateTime<Utc>,
}

impl TransferPayload {
    /// Snapshot a selection into a payload.
    pub fn new(
        source_root: VolumeRoot,
        entries: Vec<EntryRef>,
        effect: TransferEffect,
        contents_fully_available: bool,
    ) -> Self {
        Self {
            source_root,
            entries,
            effect,
            contents_fully_available,
            captured_at: Utc::now(),
        }
    }

    /// Ids of the captured entries, in selection order.
    pub fn entry_ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }
}

/// Outcome of resolving a batch of references: a partition, never an
/// all-or-nothing failure.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// References that resolved, in input order.
    pub resolved: Vec<EntryRef>,
    /// References that could not be resolved, in input order.
    pub failed: Vec<EntryId>,
}

impl Resolution {
    /// Whether every reference resolved.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_wire_strings() {
        assert_eq!(TransferEffect::CopyOrMove.to_string(), "copyMove");
        assert_eq!("move".parse::<TransferEffect>(), Ok(TransferEffect::Move));
        assert!("paste".parse::<TransferEffect>().is_err());
    }

    #[test]
    fn test_effect_permissions() {
        assert!(TransferEffect::CopyOrMove.allows_move());
        assert!(TransferEffect::CopyOrMove.allows_copy());
        assert!(!TransferEffect::Copy.allows_move());
        assert!(!TransferEffect::Move.allows_copy());
    }

    #[test]
    fn test_payload_preserves_selection_order() {
        let root = VolumeRoot::new("fs:/vol0", "Local");
        let entries = vec![
            EntryRef::file("fs:/vol0/b.txt", "b.txt"),
            EntryRef::file("fs:/vol0/a.txt", "a.txt"),
        ];
        let payload = TransferPayload::new(root, entries, TransferEffect::Copy, true);

        let ids = payload.entry_ids();
        assert_eq!(ids[0].as_str(), "fs:/vol0/b.txt");
        assert_eq!(ids[1].as_str(), "fs:/vol0/a.txt");
    }
}
