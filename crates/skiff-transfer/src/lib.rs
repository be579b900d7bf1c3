//! Transfer engine for skiff.
//!
//! This crate decides what a drag or clipboard gesture transfers and where
//! it may land: capturing selections into payloads, tracking drop targets,
//! resolving source references back into entries, and picking non-colliding
//! destination names. The byte-level copy itself is delegated to an
//! external operation backend.

mod carrier;
mod channel;
mod coordinator;
mod dedup;
mod events;
mod local;
mod memory;
mod resolver;
mod session;
mod walker;

pub use carrier::{DragContext, StringCarrier, keys};
pub use channel::{DragChannel, DragChannelData};
pub use coordinator::{DropCandidate, DropCoordinator, DropState, TargetKind, WidgetId};
pub use dedup::deduplicate_path;
pub use events::{DropEvent, TransferEvent};
pub use local::LocalVolume;
pub use memory::MemoryVolume;
pub use resolver::resolve_all;
pub use session::{DragModifiers, PasteOutcome, SessionState, TransferSession};
pub use walker::walk;
