//! Transfer session: what is selected, cut or copied, and when it ships.

use std::sync::Arc;

use tokio::sync::mpsc;

use skiff_core::{
    DirectoryRef, DropEffect, EntryRef, OperationBackend, OperationHandle, TransferCarrier,
    TransferConfig, TransferEffect, TransferError, TransferKind, TransferPayload, VolumeProvider,
    VolumeRoot,
};

use crate::carrier::{self, DragContext};
use crate::channel::{DragChannel, DragChannelData};
use crate::events::TransferEvent;
use crate::resolver;

/// Lifecycle of one transfer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing pending.
    #[default]
    Idle,
    /// A payload has been captured and awaits a destination.
    Prepared,
    /// The backend is working on a committed paste.
    InFlight,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Prepared => "prepared",
            Self::InFlight => "in-flight",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Modifier keys held during a drag gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragModifiers {
    /// Forces a copy on targets that would default to move.
    pub ctrl: bool,
    /// Forces a move where both operations are allowed.
    pub shift: bool,
}

/// What a committed paste handed to the backend.
#[derive(Debug, Clone)]
pub struct PasteOutcome {
    /// The operation the backend was asked to perform.
    pub kind: TransferKind,
    /// Backend handle for correlating completion.
    pub handle: OperationHandle,
    /// How many sources resolved and were handed over.
    pub pasted: usize,
    /// Display names of sources that no longer resolved and were skipped.
    pub missing: Vec<String>,
}

/// Owns the pending transfer payload of one window.
///
/// State machine `Idle -> Prepared -> InFlight -> Idle`: a cut/copy/drag
/// gesture captures the selection into a payload, a paste/drop commits it
/// to the operation backend, and the backend's acknowledgment (either
/// outcome) returns the session to idle. The native carrier, not this
/// session, is the authoritative store of the entry list, so a paste can
/// also adopt a payload prepared by a sibling window's session.
pub struct TransferSession<P, B> {
    provider: Arc<P>,
    backend: Arc<B>,
    channel: DragChannel,
    config: TransferConfig,
    state: SessionState,
    payload: Option<TransferPayload>,
    events: mpsc::Sender<TransferEvent>,
}

impl<P, B> TransferSession<P, B>
where
    P: VolumeProvider,
    B: OperationBackend,
{
    /// Create a session and the receiving end of its event stream.
    pub fn new(
        provider: Arc<P>,
        backend: Arc<B>,
        channel: DragChannel,
        config: TransferConfig,
    ) -> (Self, mpsc::Receiver<TransferEvent>) {
        let (events, rx) = mpsc::channel(config.event_capacity);
        (
            Self {
                provider,
                backend,
                channel,
                config,
                state: SessionState::Idle,
                payload: None,
                events,
            },
            rx,
        )
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The pending payload, if one is prepared.
    pub fn payload(&self) -> Option<&TransferPayload> {
        self.payload.as_ref()
    }

    /// The cross-window drag channel this session announces on.
    pub fn channel(&self) -> &DragChannel {
        &self.channel
    }

    /// Decode a carrier, consulting the drag channel for hidden keys.
    pub fn drag_context(&self, carrier: &dyn TransferCarrier) -> DragContext {
        DragContext::read(carrier, &self.channel)
    }

    /// Capture the current selection for a cut or copy gesture.
    ///
    /// `Idle -> Prepared`. Fails without leaving `Idle` when the selection
    /// is empty, when a move is requested out of a read-only directory, or
    /// when a copy is requested while content availability cannot be
    /// established (see [`Self::selection_available`]).
    pub async fn capture(
        &mut self,
        selection: &[EntryRef],
        current_dir: &DirectoryRef,
        effect: TransferEffect,
        carrier: &mut dyn TransferCarrier,
    ) -> Result<(), TransferError> {
        let (source, available) = self.check_capture(selection, current_dir, effect).await?;
        self.prepare(selection, source, effect, available, carrier);

        let event = if effect == TransferEffect::Move {
            TransferEvent::SelectionCut
        } else {
            TransferEvent::SelectionCopied
        };
        let _ = self.events.send(event).await;
        Ok(())
    }

    /// Start a drag gesture.
    ///
    /// Like [`Self::capture`], but the effect is chosen from what the
    /// sources allow: both operations where possible, degrading to
    /// copy-only out of read-only directories and to move-only when
    /// content is not fully available. The drag is announced on the
    /// cross-window channel so sibling windows can evaluate drops while
    /// the carrier is still protected.
    pub async fn begin_drag(
        &mut self,
        selection: &[EntryRef],
        current_dir: &DirectoryRef,
        carrier: &mut dyn TransferCarrier,
    ) -> Result<(), TransferError> {
        if self.state == SessionState::InFlight {
            return Err(TransferError::InvalidState {
                state: self.state.name(),
            });
        }
        if selection.is_empty() {
            return Err(TransferError::EmptySelection);
        }
        let source = self.volume_containing(current_dir)?;
        let available = self.selection_available(selection, &source).await?;
        let writable = !self.provider.is_read_only(current_dir).await?;

        let effect = match (available, writable) {
            (true, true) => TransferEffect::CopyOrMove,
            (true, false) => TransferEffect::Copy,
            (false, true) => TransferEffect::Move,
            (false, false) => return Err(TransferError::UnavailableContent),
        };

        let source_root = source.root.clone();
        self.prepare(selection, source, effect, available, carrier);
        self.channel.publish(DragChannelData {
            source_root,
            contents_available: available,
        });
        Ok(())
    }

    /// The initiating drag ended, with or without a drop.
    ///
    /// Clears the cross-window announcement and discards a payload that
    /// was never committed.
    pub fn end_drag(&mut self) {
        self.channel.clear();
        if self.state == SessionState::Prepared {
            self.state = SessionState::Idle;
            self.payload = None;
        }
    }

    /// Discard a pending payload. `Prepared -> Idle`.
    ///
    /// An in-flight paste is not cancelable from here; stopping the byte
    /// transfer is the backend's business.
    pub fn cancel(&mut self) -> Result<(), TransferError> {
        match self.state {
            SessionState::InFlight => Err(TransferError::InvalidState {
                state: self.state.name(),
            }),
            _ => {
                self.state = SessionState::Idle;
                self.payload = None;
                Ok(())
            }
        }
    }

    /// The backend finished the committed operation, successfully or not.
    /// `InFlight -> Idle`.
    pub fn acknowledge(&mut self) -> Result<(), TransferError> {
        if self.state != SessionState::InFlight {
            return Err(TransferError::InvalidState {
                state: self.state.name(),
            });
        }
        self.state = SessionState::Idle;
        self.payload = None;
        Ok(())
    }

    /// Commit the carrier's payload into `destination`.
    ///
    /// `Prepared -> InFlight` (or `Idle -> InFlight` for a payload adopted
    /// from a sibling window). Destination validation failures block the
    /// transition and surface synchronously. Source references that no
    /// longer resolve are reported as [`TransferEvent::SourceNotFound`]
    /// and skipped; the paste proceeds with whatever resolved. The
    /// resolved set goes to the backend fire-and-forget.
    pub async fn paste(
        &mut self,
        carrier: &dyn TransferCarrier,
        destination: &DirectoryRef,
        requested: DropEffect,
    ) -> Result<PasteOutcome, TransferError> {
        if self.state == SessionState::InFlight {
            return Err(TransferError::InvalidState {
                state: self.state.name(),
            });
        }
        let context = self.drag_context(carrier);
        self.validate_paste(&context, destination).await?;

        let to_move = match context.effect_allowed {
            Some(TransferEffect::Move) => true,
            Some(TransferEffect::CopyOrMove) => requested == DropEffect::Move,
            _ => false,
        };
        let kind = if to_move {
            TransferKind::Move
        } else {
            TransferKind::Copy
        };

        let resolution = resolver::resolve_all(
            self.provider.as_ref(),
            &context.sources,
            self.config.resolve_concurrency,
        )
        .await;

        let missing: Vec<String> = resolution.failed.iter().map(|id| id.display_name()).collect();
        for name in &missing {
            let _ = self
                .events
                .send(TransferEvent::SourceNotFound {
                    name: name.clone(),
                    kind,
                })
                .await;
        }

        let pasted = resolution.resolved.len();
        let handle = self
            .backend
            .paste(resolution.resolved, destination.clone(), kind);
        tracing::debug!(
            target: "transfer",
            "{} of {} entries into {} handed to backend",
            kind,
            pasted,
            destination.id()
        );

        self.state = SessionState::InFlight;
        if kind == TransferKind::Move {
            // A consumed cut must not be repeatable.
            self.payload = None;
        }

        Ok(PasteOutcome {
            kind,
            handle,
            pasted,
            missing,
        })
    }

    /// Check whether the carrier's payload may land in `destination`.
    ///
    /// The destination must still exist, be a directory, and accept
    /// writes; the carrier must hold one of our payloads; and a transfer
    /// that provably crosses volumes requires fully-available content.
    pub async fn validate_paste(
        &self,
        context: &DragContext,
        destination: &DirectoryRef,
    ) -> Result<(), TransferError> {
        let resolved = self.provider.resolve(destination.id()).await?;
        if !resolved.is_directory() {
            return Err(TransferError::NotADirectory {
                id: resolved.id,
            });
        }
        if self.provider.is_read_only(destination).await? {
            return Err(TransferError::ReadOnlyDestination {
                id: destination.id().clone(),
            });
        }
        if !context.tagged {
            return Err(TransferError::UnsupportedPayload);
        }
        let dest_volume = self.volume_containing(destination)?;
        if context.crosses_volume(&dest_volume) && context.missing_contents {
            return Err(TransferError::UnavailableContent);
        }
        Ok(())
    }

    /// Pick the drop effect for the target currently under the pointer.
    ///
    /// No destination, no volume, or a read-only destination yields
    /// [`DropEffect::None`]. A move-only payload moves. When both
    /// operations are allowed, a same-volume drop without ctrl defaults to
    /// move, shift forces a move, and everything else copies.
    pub async fn select_drop_effect(
        &self,
        context: &DragContext,
        destination: Option<&DirectoryRef>,
        modifiers: DragModifiers,
    ) -> DropEffect {
        let Some(destination) = destination else {
            return DropEffect::None;
        };
        let Some(dest_volume) = self.provider.volume_of(destination.id()) else {
            return DropEffect::None;
        };
        if !matches!(self.provider.is_read_only(destination).await, Ok(false)) {
            return DropEffect::None;
        }
        match context.effect_allowed {
            Some(TransferEffect::Move) => DropEffect::Move,
            Some(TransferEffect::CopyOrMove) => {
                if context.same_volume(&dest_volume) && !modifiers.ctrl {
                    DropEffect::Move
                } else if modifiers.shift {
                    DropEffect::Move
                } else {
                    DropEffect::Copy
                }
            }
            _ => DropEffect::Copy,
        }
    }

    /// Whether every selected entry's content is retrievable right now.
    ///
    /// Always true on an unconstrained volume. On an offline or metered
    /// volume, a directory in the selection makes availability unknowable
    /// without a recursive walk, which the engine cannot afford here, so
    /// any directory answers false; otherwise every file is probed.
    pub async fn selection_available(
        &self,
        selection: &[EntryRef],
        source: &VolumeRoot,
    ) -> Result<bool, TransferError> {
        if !self.provider.connection(source).is_constrained() {
            return Ok(true);
        }
        if selection.iter().any(|entry| entry.is_directory()) {
            return Ok(false);
        }
        for entry in selection {
            if !self.provider.is_content_available(entry).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn check_capture(
        &self,
        selection: &[EntryRef],
        current_dir: &DirectoryRef,
        effect: TransferEffect,
    ) -> Result<(VolumeRoot, bool), TransferError> {
        if self.state == SessionState::InFlight {
            return Err(TransferError::InvalidState {
                state: self.state.name(),
            });
        }
        if selection.is_empty() {
            return Err(TransferError::EmptySelection);
        }
        let source = self.volume_containing(current_dir)?;
        let available = self.selection_available(selection, &source).await?;

        if effect.allows_move() && self.provider.is_read_only(current_dir).await? {
            return Err(TransferError::ReadOnlyDestination {
                id: current_dir.id().clone(),
            });
        }
        if effect.allows_copy() && !available {
            return Err(TransferError::UnavailableContent);
        }
        Ok((source, available))
    }

    fn prepare(
        &mut self,
        selection: &[EntryRef],
        source: VolumeRoot,
        effect: TransferEffect,
        available: bool,
        carrier: &mut dyn TransferCarrier,
    ) {
        let payload = TransferPayload::new(source, selection.to_vec(), effect, available);
        carrier::write_payload(carrier, &payload);
        self.payload = Some(payload);
        self.state = SessionState::Prepared;
    }

    fn volume_containing(&self, dir: &DirectoryRef) -> Result<VolumeRoot, TransferError> {
        self.provider
            .volume_of(dir.id())
            .ok_or_else(|| TransferError::Other {
                message: format!("no mounted volume contains {}", dir.id()),
            })
    }
}
