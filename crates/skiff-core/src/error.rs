//! Error types for transfer operations.

use thiserror::Error;

use crate::EntryId;

/// Errors that can occur while preparing or committing a transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    /// A referenced object no longer exists.
    #[error("Not found: {id}")]
    NotFound { id: EntryId },

    /// Name deduplication exhausted its probe budget.
    #[error("A non-colliding name could not be found for: {name}")]
    AlreadyExists { name: String },

    /// The destination directory does not accept writes.
    #[error("Destination is read-only: {id}")]
    ReadOnlyDestination { id: EntryId },

    /// A cross-volume transfer was attempted while some content is not
    /// fully retrievable.
    #[error("Content is not fully available for a cross-volume transfer")]
    UnavailableContent,

    /// A gesture was started with nothing selected.
    #[error("Selection is empty")]
    EmptySelection,

    /// The destination is not a directory.
    #[error("Not a directory: {id}")]
    NotADirectory { id: EntryId },

    /// The carrier does not hold one of our transfer payloads.
    #[error("Carrier does not hold a transfer payload")]
    UnsupportedPayload,

    /// Listing a directory's children failed, aborting the walk in
    /// progress.
    #[error("Listing failed at {id}: {message}")]
    ListingFailure { id: EntryId, message: String },

    /// The session was asked for a transition its current state forbids.
    #[error("Operation not valid in state {state}")]
    InvalidState { state: &'static str },

    /// Generic I/O error with path context.
    #[error("I/O error at {id}: {source}")]
    Io {
        id: EntryId,
        #[source]
        source: std::io::Error,
    },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl TransferError {
    /// Create an I/O error with entry context, mapping well-known kinds
    /// onto their dedicated variants.
    pub fn io(id: impl Into<EntryId>, source: std::io::Error) -> Self {
        let id = id.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { id },
            std::io::ErrorKind::PermissionDenied => Self::ReadOnlyDestination { id },
            _ => Self::Io { id, source },
        }
    }

    /// Create a listing failure with entry context.
    pub fn listing(id: impl Into<EntryId>, message: impl Into<String>) -> Self {
        Self::ListingFailure {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Whether this error denotes a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kind_mapping() {
        let err = TransferError::io(
            "fs:/vol0/gone.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.is_not_found());

        let err = TransferError::io(
            "fs:/vol0/locked",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, TransferError::ReadOnlyDestination { .. }));

        let err = TransferError::io(
            "fs:/vol0/odd",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "slow"),
        );
        assert!(matches!(err, TransferError::Io { .. }));
    }
}
