//! Cross-window drag announcement slot.

use std::sync::{Arc, Mutex};

use skiff_core::EntryId;

/// Facts about an in-flight drag that the native carrier cannot transport
/// while its payload is in the protected read phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragChannelData {
    /// Root of the volume the drag started from.
    pub source_root: EntryId,
    /// Whether every dragged entry's content is retrievable without a
    /// network fetch.
    pub contents_available: bool,
}

/// A capacity-one mailbox shared by all windows of the application.
///
/// Written when a drag prepares its payload, read by whichever window the
/// drop lands in, cleared when the drag ends regardless of outcome.
/// Last-writer-wins: writes happen only at user-gesture boundaries, and a
/// read racing a write from a stale drag is an accepted, narrow
/// inconsistency window.
///
/// Clones share the same slot; hand one clone to each window.
#[derive(Debug, Clone, Default)]
pub struct DragChannel {
    slot: Arc<Mutex<Option<DragChannelData>>>,
}

impl DragChannel {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the facts of a new drag, replacing any previous value.
    pub fn publish(&self, data: DragChannelData) {
        *self.slot.lock().unwrap() = Some(data);
    }

    /// Read the current value, if a drag is in flight.
    pub fn read(&self) -> Option<DragChannelData> {
        self.slot.lock().unwrap().clone()
    }

    /// Clear the slot. Called when the initiating drag ends.
    pub fn clear(&self) {
        *self.slot.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(root: &str, available: bool) -> DragChannelData {
        DragChannelData {
            source_root: EntryId::from(root),
            contents_available: available,
        }
    }

    #[test]
    fn test_clones_share_the_slot() {
        let channel = DragChannel::new();
        let sibling = channel.clone();

        channel.publish(data("mem:/vol0", true));
        assert_eq!(sibling.read(), Some(data("mem:/vol0", true)));

        sibling.clear();
        assert_eq!(channel.read(), None);
    }

    #[test]
    fn test_last_writer_wins() {
        let channel = DragChannel::new();
        channel.publish(data("mem:/vol0", true));
        channel.publish(data("mem:/vol1", false));

        assert_eq!(channel.read(), Some(data("mem:/vol1", false)));
    }
}
