//! Notification entry points for hosts.
//!
//! Hosts wire their editor and preview callbacks to a [`SyncHandle`]. The
//! handle filters each notification against the shared [`SyncGuard`] at the
//! moment it fires: a change caused by the coordinator's own write is dropped
//! here, before it can be queued behind the write that caused it.

use std::path::PathBuf;

use smol_str::SmolStr;
use tokio::sync::{mpsc, oneshot};
use twinmark_core::DocumentStats;

use crate::error::{HostError, Result};
use crate::state::{SyncGuard, SyncState};

/// Messages processed by the coordinator task.
#[derive(Debug)]
pub enum SyncEvent {
    /// The source editor's content changed.
    SourceChanged,
    /// The user edited the preview surface.
    PreviewInput,
    PreviewFocused,
    PreviewBlurred,
    /// Replace the document wholesale (open, new, drop, pending file).
    Load {
        text: String,
        filename: SmolStr,
        path: Option<PathBuf>,
    },
    /// `text` was written out under `filename`.
    MarkSaved {
        text: String,
        filename: SmolStr,
        path: Option<PathBuf>,
    },
    Snapshot(oneshot::Sender<DocumentSnapshot>),
    Shutdown,
}

/// Point-in-time view of the document for hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub text: String,
    pub filename: SmolStr,
    pub path: Option<PathBuf>,
    pub modified: bool,
    pub stats: DocumentStats,
}

#[derive(Debug, Clone)]
pub struct SyncHandle {
    tx: mpsc::UnboundedSender<SyncEvent>,
    guard: SyncGuard,
}

impl SyncHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<SyncEvent>, guard: SyncGuard) -> Self {
        Self { tx, guard }
    }

    /// Source editor change notification. Returns false if it was dropped.
    pub fn source_changed(&self) -> bool {
        if !self.guard.accepts_source_change() {
            suppressed("source");
            return false;
        }
        self.send(SyncEvent::SourceChanged)
    }

    /// Preview input notification. Returns false if it was dropped.
    pub fn preview_input(&self) -> bool {
        if !self.guard.accepts_preview_input() {
            if self.guard.state() == SyncState::ApplyingForward {
                suppressed("preview");
            } else {
                tracing::trace!("preview input while not editing");
            }
            return false;
        }
        self.send(SyncEvent::PreviewInput)
    }

    /// The preview gained focus: its edits are now user-authored.
    pub fn preview_focused(&self) -> bool {
        self.guard.set_editing(true);
        self.send(SyncEvent::PreviewFocused)
    }

    pub fn preview_blurred(&self) -> bool {
        self.send(SyncEvent::PreviewBlurred)
    }

    pub fn load(&self, text: String, filename: &str, path: Option<PathBuf>) -> Result<()> {
        self.request(SyncEvent::Load {
            text,
            filename: SmolStr::new(filename),
            path,
        })
    }

    pub fn mark_saved(&self, text: String, filename: &str, path: Option<PathBuf>) -> Result<()> {
        self.request(SyncEvent::MarkSaved {
            text,
            filename: SmolStr::new(filename),
            path,
        })
    }

    pub async fn snapshot(&self) -> Result<DocumentSnapshot> {
        let (tx, rx) = oneshot::channel();
        self.request(SyncEvent::Snapshot(tx))?;
        rx.await.map_err(|_| HostError::ChannelClosed)
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(SyncEvent::Shutdown);
    }

    pub fn state(&self) -> SyncState {
        self.guard.state()
    }

    pub fn is_editing(&self) -> bool {
        self.guard.is_editing()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn request(&self, event: SyncEvent) -> Result<()> {
        self.tx.send(event).map_err(|_| HostError::ChannelClosed)
    }

    fn send(&self, event: SyncEvent) -> bool {
        if self.tx.send(event).is_err() {
            tracing::debug!("notification after coordinator shutdown");
            return false;
        }
        true
    }
}

fn suppressed(side: &'static str) {
    tracing::trace!(side, "echo suppressed");
    metrics::counter!("twinmark_suppressed_echoes_total", "side" => side).increment(1);
}
