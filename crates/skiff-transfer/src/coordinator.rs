//! Drop target coordination.
//!
//! Tracks which widget is currently eligible to receive the drag payload,
//! across file-list rows, directory-tree nodes and volume entries whose
//! enter/leave events interleave unpredictably, and debounces the
//! hover-to-navigate action.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use skiff_core::{
    DirectoryRef, DropEffect, EntryRef, OperationBackend, TransferCarrier, TransferConfig,
    TransferError, VolumeProvider,
};

use crate::events::DropEvent;
use crate::session::{DragModifiers, PasteOutcome, TransferSession};

/// Identifier of a widget that can host a drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(pub u64);

/// What kind of widget a drop candidate is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// A row of the file list.
    ListRow,
    /// A node of the directory tree sidebar.
    TreeNode,
    /// A volume or shortcut in the navigation list.
    VolumeEntry,
}

impl TargetKind {
    /// Whether dwelling on this target should navigate into it. True for
    /// the widgets whose purpose is navigation.
    pub fn navigates(&self) -> bool {
        matches!(self, TargetKind::TreeNode | TargetKind::VolumeEntry)
    }
}

/// A candidate destination under the pointer.
#[derive(Debug, Clone)]
pub struct DropCandidate {
    /// The widget the pointer entered.
    pub widget: WidgetId,
    /// What the widget is.
    pub kind: TargetKind,
    /// The entry the widget stands for; `None` when the pointer is over
    /// dead space (list padding, group headers).
    pub destination: Option<EntryRef>,
}

impl DropCandidate {
    /// Create a candidate with a destination entry.
    pub fn new(widget: WidgetId, kind: TargetKind, destination: EntryRef) -> Self {
        Self {
            widget,
            kind,
            destination: Some(destination),
        }
    }

    /// Create a candidate for a widget with no entry behind it.
    pub fn empty(widget: WidgetId, kind: TargetKind) -> Self {
        Self {
            widget,
            kind,
            destination: None,
        }
    }
}

/// The coordinator's current target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DropState {
    /// No candidate under the pointer.
    #[default]
    NoTarget,
    /// A widget is hovered but did not pass acceptance; visually inert.
    Hovering { widget: WidgetId },
    /// A widget is marked as the drop destination.
    Active {
        widget: WidgetId,
        destination: DirectoryRef,
    },
}

/// Tracks the active drop target for one window.
///
/// At most one target is active at any instant. Switching targets tears
/// the old one down (clear event, timer cancellation) before the new one
/// is evaluated, and leaving the application forces `NoTarget`.
pub struct DropCoordinator {
    state: DropState,
    last_entered: Option<WidgetId>,
    navigate_delay: Duration,
    timer: Option<CancellationToken>,
    events: mpsc::Sender<DropEvent>,
}

impl DropCoordinator {
    /// Create a coordinator and the receiving end of its event stream.
    pub fn new(config: &TransferConfig) -> (Self, mpsc::Receiver<DropEvent>) {
        let (events, rx) = mpsc::channel(config.event_capacity);
        (
            Self {
                state: DropState::NoTarget,
                last_entered: None,
                navigate_delay: config.navigate_delay,
                timer: None,
                events,
            },
            rx,
        )
    }

    /// Current target state.
    pub fn state(&self) -> &DropState {
        &self.state
    }

    /// The active destination, if a target passed acceptance.
    pub fn destination(&self) -> Option<&DirectoryRef> {
        match &self.state {
            DropState::Active { destination, .. } => Some(destination),
            _ => None,
        }
    }

    /// Handle the pointer entering a candidate widget.
    pub async fn drag_enter<P, B>(
        &mut self,
        candidate: DropCandidate,
        session: &TransferSession<P, B>,
        carrier: &dyn TransferCarrier,
    ) where
        P: VolumeProvider,
        B: OperationBackend,
    {
        self.last_entered = Some(candidate.widget);
        if self.current_widget() == Some(candidate.widget) {
            return;
        }
        match candidate.destination {
            Some(destination) => {
                self.set_target(candidate.widget, candidate.kind, destination, session, carrier)
                    .await;
            }
            None => self.clear_target().await,
        }
    }

    /// Pick the cursor feedback for the current hover position.
    ///
    /// Uses the active destination, falling back to the current directory
    /// when drops outside directory items are allowed.
    pub async fn drag_over<P, B>(
        &self,
        session: &TransferSession<P, B>,
        carrier: &dyn TransferCarrier,
        modifiers: DragModifiers,
        current_dir: Option<&DirectoryRef>,
        only_into_directories: bool,
    ) -> DropEffect
    where
        P: VolumeProvider,
        B: OperationBackend,
    {
        let destination = match &self.state {
            DropState::Active { destination, .. } => Some(destination.clone()),
            _ => {
                if only_into_directories {
                    None
                } else {
                    current_dir.cloned()
                }
            }
        };
        let context = session.drag_context(carrier);
        session
            .select_drop_effect(&context, destination.as_ref(), modifiers)
            .await
    }

    /// Handle the pointer leaving a widget.
    ///
    /// Enter events for the next widget arrive before leave events for the
    /// previous one, so a leave whose widget is still the last-entered one
    /// can only mean the pointer left the application entirely.
    pub async fn drag_leave(&mut self, widget: WidgetId) {
        if self.last_entered == Some(widget) {
            self.clear_target().await;
            self.last_entered = None;
        }
    }

    /// Complete a drop on the current target.
    ///
    /// With `only_into_directories` and no accepted target this is a
    /// no-op; otherwise the destination falls back to `current_dir`.
    /// Acceptance is re-validated inside the paste (the hover verdict may
    /// have gone stale), and the target is cleared afterward regardless of
    /// outcome.
    pub async fn drop_payload<P, B>(
        &mut self,
        session: &mut TransferSession<P, B>,
        carrier: &dyn TransferCarrier,
        modifiers: DragModifiers,
        current_dir: Option<&DirectoryRef>,
        only_into_directories: bool,
    ) -> Result<Option<PasteOutcome>, TransferError>
    where
        P: VolumeProvider,
        B: OperationBackend,
    {
        let destination = match &self.state {
            DropState::Active { destination, .. } => Some(destination.clone()),
            DropState::Hovering { .. } | DropState::NoTarget => {
                if only_into_directories {
                    None
                } else {
                    current_dir.cloned()
                }
            }
        };
        let Some(destination) = destination else {
            self.clear_target().await;
            return Ok(None);
        };

        let context = session.drag_context(carrier);
        let effect = session
            .select_drop_effect(&context, Some(&destination), modifiers)
            .await;
        let outcome = session.paste(carrier, &destination, effect).await;

        self.clear_target().await;
        self.last_entered = None;
        outcome.map(Some)
    }

    /// The drag ended, with or without a drop.
    pub async fn drag_end<P, B>(&mut self, session: &mut TransferSession<P, B>)
    where
        P: VolumeProvider,
        B: OperationBackend,
    {
        self.clear_target().await;
        self.last_entered = None;
        session.end_drag();
    }

    async fn set_target<P, B>(
        &mut self,
        widget: WidgetId,
        kind: TargetKind,
        destination: EntryRef,
        session: &TransferSession<P, B>,
        carrier: &dyn TransferCarrier,
    ) where
        P: VolumeProvider,
        B: OperationBackend,
    {
        // The old target is fully torn down before the new one is judged.
        self.clear_target().await;
        self.state = DropState::Hovering { widget };

        let Ok(dir) = DirectoryRef::try_from(destination) else {
            return;
        };
        let context = session.drag_context(carrier);
        if session.validate_paste(&context, &dir).await.is_err() {
            return;
        }

        let _ = self.events.send(DropEvent::TargetAccepted { widget }).await;
        if kind.navigates() {
            self.arm_navigate_timer(dir.clone());
        }
        self.state = DropState::Active {
            widget,
            destination: dir,
        };
    }

    async fn clear_target(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
        if let DropState::Active { widget, .. } = std::mem::take(&mut self.state) {
            let _ = self.events.send(DropEvent::TargetCleared { widget }).await;
        }
    }

    fn arm_navigate_timer(&mut self, destination: DirectoryRef) {
        let token = CancellationToken::new();
        let guard = token.clone();
        let events = self.events.clone();
        let delay = self.navigate_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = events
                        .send(DropEvent::NavigateInto {
                            destination: destination.into(),
                        })
                        .await;
                }
            }
        });
        self.timer = Some(token);
    }

    fn current_widget(&self) -> Option<WidgetId> {
        match &self.state {
            DropState::NoTarget => None,
            DropState::Hovering { widget } | DropState::Active { widget, .. } => Some(*widget),
        }
    }
}
