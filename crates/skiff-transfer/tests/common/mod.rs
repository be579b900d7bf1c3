//! Shared harness for the transfer integration tests.

use std::sync::{Arc, Mutex};

use skiff_core::{
    DirectoryRef, EntryId, EntryRef, OperationBackend, OperationHandle, TransferConfig,
    TransferKind,
};
use skiff_transfer::{DragChannel, MemoryVolume, TransferSession};

/// One paste handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteCall {
    pub sources: Vec<EntryId>,
    pub destination: EntryId,
    pub kind: TransferKind,
}

/// Backend that records every paste instead of moving bytes.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Mutex<Vec<PasteCall>>,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<PasteCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl OperationBackend for RecordingBackend {
    fn paste(
        &self,
        sources: Vec<EntryRef>,
        destination: DirectoryRef,
        kind: TransferKind,
    ) -> OperationHandle {
        let mut calls = self.calls.lock().unwrap();
        calls.push(PasteCall {
            sources: sources.into_iter().map(|e| e.id).collect(),
            destination: destination.id().clone(),
            kind,
        });
        OperationHandle(calls.len() as u64)
    }
}

/// Build a session over a shared store, backend and drag channel, the way
/// one application window would.
pub fn window(
    fs: &MemoryVolume,
    backend: &Arc<RecordingBackend>,
    channel: &DragChannel,
) -> TransferSession<MemoryVolume, RecordingBackend> {
    let (session, _events) = TransferSession::new(
        Arc::new(fs.clone()),
        backend.clone(),
        channel.clone(),
        TransferConfig::default(),
    );
    session
}
