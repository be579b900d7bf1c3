//! Interface traits for the engine's external collaborators.
//!
//! The engine decides what moves where and under which name; everything
//! that touches actual storage sits behind these traits: a volume provider
//! for resolution, probing and listing, an operation backend that performs
//! the byte-level work, and the native carrier (clipboard or drag object)
//! the payload rides on between windows.

use async_trait::async_trait;

use crate::{
    ConnectionState, DirectoryRef, EntryId, EntryRef, TransferError, TransferKind, VolumeRoot,
};

/// Result of probing a directory for a child name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// A child with that name exists.
    Exists,
    /// No child with that name.
    Missing,
}

/// Handle to an operation started by the backend.
///
/// The engine never inspects progress through it; it exists so callers can
/// correlate backend completion notifications with the paste that started
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationHandle(pub u64);

/// Resolution, probing and listing over one or more mounted volumes.
#[async_trait]
pub trait VolumeProvider: Send + Sync {
    /// Resolve an opaque reference to a concrete entry.
    ///
    /// Returns [`TransferError::NotFound`] when the underlying object no
    /// longer exists.
    async fn resolve(&self, id: &EntryId) -> Result<EntryRef, TransferError>;

    /// Check whether `dir` has a child named `name`.
    async fn probe(&self, dir: &DirectoryRef, name: &str) -> Result<Probe, TransferError>;

    /// Start listing a directory's children.
    ///
    /// The listing is paginated; see [`DirectoryPager`].
    async fn read_dir(&self, dir: &DirectoryRef)
    -> Result<Box<dyn DirectoryPager>, TransferError>;

    /// Whether the directory rejects writes.
    async fn is_read_only(&self, dir: &DirectoryRef) -> Result<bool, TransferError>;

    /// Whether a file's byte content is retrievable without a network
    /// fetch. Only meaningful for files; directories cannot be verified
    /// cheaply and callers must treat them as unavailable.
    async fn is_content_available(&self, entry: &EntryRef) -> Result<bool, TransferError>;

    /// The volume an entry belongs to, if it is known to this provider.
    fn volume_of(&self, id: &EntryId) -> Option<VolumeRoot>;

    /// Connection state of a volume's backing store.
    fn connection(&self, volume: &VolumeRoot) -> ConnectionState;
}

/// One in-progress directory listing.
///
/// `next_page` yields batches until it reports an empty page, which
/// terminates the listing. Errors are fatal to the listing.
#[async_trait]
pub trait DirectoryPager: Send {
    /// Fetch the next batch of children.
    async fn next_page(&mut self) -> Result<Vec<EntryRef>, TransferError>;
}

/// The byte-level file operation service.
///
/// Fire-and-forget from the engine's perspective: `paste` starts the work
/// and returns a handle immediately. Cancellation and progress of the byte
/// transfer are the backend's business.
pub trait OperationBackend: Send + Sync {
    /// Start copying or moving `sources` into `destination`.
    fn paste(
        &self,
        sources: Vec<EntryRef>,
        destination: DirectoryRef,
        kind: TransferKind,
    ) -> OperationHandle;
}

/// The native transfer carrier: the clipboard or drag object's untyped
/// key-value store.
///
/// Some keys may be unreadable while the initiating gesture is still in
/// flight ("protected mode"); `item` returns `None` for those, and callers
/// fall back to the cross-window drag channel.
pub trait TransferCarrier {
    /// Store a string value under a key.
    fn set_item(&mut self, key: &str, value: &str);

    /// Read a value back, or `None` if absent or unreadable.
    fn item(&self, key: &str) -> Option<String>;
}
