//! Payload encoding over the native transfer carrier.
//!
//! The clipboard/drag object is an untyped string store; this module owns
//! the key set written at capture time and the decode path that recovers
//! enough facts at the receiving end to run acceptance checks, falling back
//! to the cross-window drag channel for keys the carrier hides during its
//! protected read phase.

use std::collections::HashMap;

use skiff_core::{EntryId, TransferCarrier, TransferEffect, TransferPayload, VolumeRoot};

use crate::channel::DragChannel;

/// Carrier keys.
pub mod keys {
    /// Marks the carrier content as written by this engine.
    pub const TAG: &str = "fs/tag";
    /// Root URL of the source volume.
    pub const SOURCE_ROOT: &str = "fs/sourceRootURL";
    /// Newline-joined source references, in selection order.
    pub const SOURCES: &str = "fs/sources";
    /// Which operations the gesture allows.
    pub const EFFECT_ALLOWED: &str = "fs/effectallowed";
    /// Whether some dragged content is not fully retrievable.
    pub const MISSING_CONTENTS: &str = "fs/missingFileContents";
}

/// Value stored under [`keys::TAG`].
pub const TAG_VALUE: &str = "skiff-transfer-data";

/// Write a payload's carrier representation.
pub fn write_payload(carrier: &mut dyn TransferCarrier, payload: &TransferPayload) {
    carrier.set_item(keys::TAG, TAG_VALUE);
    carrier.set_item(keys::SOURCE_ROOT, payload.source_root.root.as_str());
    let sources: Vec<&str> = payload.entries.iter().map(|e| e.id.as_str()).collect();
    carrier.set_item(keys::SOURCES, &sources.join("\n"));
    carrier.set_item(keys::EFFECT_ALLOWED, &payload.effect.to_string());
    carrier.set_item(
        keys::MISSING_CONTENTS,
        if payload.contents_fully_available {
            "false"
        } else {
            "true"
        },
    );
}

/// Facts recovered from a carrier for acceptance checks and paste.
#[derive(Debug, Clone)]
pub struct DragContext {
    /// Whether the carrier holds one of our payloads.
    pub tagged: bool,
    /// Source references, in selection order.
    pub sources: Vec<EntryId>,
    /// Operations the originating gesture allows.
    pub effect_allowed: Option<TransferEffect>,
    /// Root of the source volume, when it could be recovered.
    pub source_root: Option<EntryId>,
    /// Whether some source content is not fully retrievable. Defaults to
    /// true when neither the carrier nor the channel can say, which
    /// disables cross-volume fast paths.
    pub missing_contents: bool,
}

impl DragContext {
    /// Decode a carrier, consulting the drag channel for keys hidden by a
    /// protected read phase.
    pub fn read(carrier: &dyn TransferCarrier, channel: &DragChannel) -> Self {
        let tagged = carrier.item(keys::TAG).as_deref() == Some(TAG_VALUE);
        let sources = carrier
            .item(keys::SOURCES)
            .map(|joined| {
                joined
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(EntryId::from)
                    .collect()
            })
            .unwrap_or_default();
        let effect_allowed = carrier
            .item(keys::EFFECT_ALLOWED)
            .and_then(|value| value.parse().ok());

        let fallback = channel.read();
        let source_root = carrier
            .item(keys::SOURCE_ROOT)
            .map(EntryId::from)
            .or_else(|| fallback.as_ref().map(|data| data.source_root.clone()));
        let missing_contents = match carrier.item(keys::MISSING_CONTENTS) {
            Some(value) => value == "true",
            None => fallback
                .as_ref()
                .map(|data| !data.contents_available)
                .unwrap_or(true),
        };

        Self {
            tagged,
            sources,
            effect_allowed,
            source_root,
            missing_contents,
        }
    }

    /// Whether the payload provably originates from `volume`.
    ///
    /// An unknown source root answers false: without it the engine cannot
    /// claim a same-volume transfer, only refrain from cross-volume
    /// verdicts.
    pub fn same_volume(&self, volume: &VolumeRoot) -> bool {
        self.source_root.as_ref() == Some(&volume.root)
    }

    /// Whether the payload provably crosses out of `volume`.
    pub fn crosses_volume(&self, destination: &VolumeRoot) -> bool {
        self.source_root
            .as_ref()
            .is_some_and(|root| *root != destination.root)
    }
}

/// A [`TransferCarrier`] backed by a plain map, with a protected-mode
/// switch mimicking the native drag object's read restrictions during the
/// initiating phase.
#[derive(Debug, Clone, Default)]
pub struct StringCarrier {
    items: HashMap<String, String>,
    protected: bool,
}

impl StringCarrier {
    /// Create an empty carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle protected mode. While protected, reads return nothing.
    pub fn set_protected(&mut self, protected: bool) {
        self.protected = protected;
    }

    /// Drop all stored items.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl TransferCarrier for StringCarrier {
    fn set_item(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn item(&self, key: &str) -> Option<String> {
        if self.protected {
            return None;
        }
        self.items.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::DragChannelData;
    use skiff_core::EntryRef;

    fn sample_payload() -> TransferPayload {
        TransferPayload::new(
            VolumeRoot::new("mem:/vol0", "vol0"),
            vec![
                EntryRef::file("mem:/vol0/a.txt", "a.txt"),
                EntryRef::file("mem:/vol0/b.txt", "b.txt"),
            ],
            TransferEffect::CopyOrMove,
            true,
        )
    }

    #[test]
    fn test_write_then_read() {
        let mut carrier = StringCarrier::new();
        write_payload(&mut carrier, &sample_payload());

        let context = DragContext::read(&carrier, &DragChannel::new());
        assert!(context.tagged);
        assert_eq!(context.sources.len(), 2);
        assert_eq!(context.sources[0].as_str(), "mem:/vol0/a.txt");
        assert_eq!(context.effect_allowed, Some(TransferEffect::CopyOrMove));
        assert_eq!(context.source_root, Some(EntryId::from("mem:/vol0")));
        assert!(!context.missing_contents);
    }

    #[test]
    fn test_protected_reads_fall_back_to_channel() {
        let mut carrier = StringCarrier::new();
        write_payload(&mut carrier, &sample_payload());
        carrier.set_protected(true);

        let channel = DragChannel::new();
        channel.publish(DragChannelData {
            source_root: EntryId::from("mem:/vol0"),
            contents_available: true,
        });

        let context = DragContext::read(&carrier, &channel);
        assert_eq!(context.source_root, Some(EntryId::from("mem:/vol0")));
        assert!(!context.missing_contents);
        // The entry list only travels on the carrier itself.
        assert!(context.sources.is_empty());
    }

    #[test]
    fn test_unknown_origin_defaults_conservatively() {
        let carrier = StringCarrier::new();
        let context = DragContext::read(&carrier, &DragChannel::new());

        assert!(!context.tagged);
        assert_eq!(context.source_root, None);
        assert!(context.missing_contents);

        let volume = VolumeRoot::new("mem:/vol0", "vol0");
        assert!(!context.same_volume(&volume));
        assert!(!context.crosses_volume(&volume));
    }

    #[test]
    fn test_foreign_payload_is_not_tagged() {
        let mut carrier = StringCarrier::new();
        carrier.set_item("text/plain", "hello");

        let context = DragContext::read(&carrier, &DragChannel::new());
        assert!(!context.tagged);
    }
}
