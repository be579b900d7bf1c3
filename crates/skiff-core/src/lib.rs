//! Core types and traits for skiff.
//!
//! This crate provides the fundamental data structures used throughout
//! the skiff transfer engine: entry and volume references, the transfer
//! payload, the error taxonomy, and the traits its external collaborators
//! implement.

mod config;
mod entry;
mod error;
mod payload;
mod provider;
mod volume;

pub use config::{TransferConfig, TransferConfigBuilder};
pub use entry::{DirectoryRef, EntryId, EntryKind, EntryRef};
pub use error::TransferError;
pub use payload::{DropEffect, Resolution, TransferEffect, TransferKind, TransferPayload};
pub use provider::{
    DirectoryPager, OperationBackend, OperationHandle, Probe, TransferCarrier, VolumeProvider,
};
pub use volume::{ConnectionState, VolumeRoot};
