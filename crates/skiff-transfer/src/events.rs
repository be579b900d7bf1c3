//! Events emitted by the session and the drop coordinator.

use serde::{Deserialize, Serialize};
use skiff_core::{EntryRef, TransferKind};

use crate::coordinator::WidgetId;

/// Events emitted by [`crate::TransferSession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferEvent {
    /// A selection was captured for copying.
    SelectionCopied,
    /// A selection was captured for moving.
    SelectionCut,
    /// A source reference failed to resolve at paste time. The paste went
    /// ahead without it; the name lets the user tell "moved" from
    /// "skipped".
    SourceNotFound { name: String, kind: TransferKind },
}

/// Events emitted by [`crate::DropCoordinator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropEvent {
    /// A widget became the active drop target and should be marked as
    /// accepting.
    TargetAccepted { widget: WidgetId },
    /// The active drop target was torn down; remove the accepting mark.
    TargetCleared { widget: WidgetId },
    /// The drag dwelled on a navigation target long enough; open it.
    NavigateInto { destination: EntryRef },
}
