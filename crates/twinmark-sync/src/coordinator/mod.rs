//! The sync coordinator.
//!
//! A single task owns the source editor, the preview surface, the render
//! pipeline and the session. Hosts talk to it through [`SyncHandle`]s; timers
//! are deadline slots the task's loop sleeps on. Nothing else writes to
//! either surface, so the shared [`SyncGuard`] only has to tell notification
//! callbacks which direction is mid-write.
//!
//! Forward: a source change schedules a render (80ms debounce by default).
//! When it fires the guard moves to `ApplyingForward`, the pipeline runs,
//! and the preview is replaced if the result differs from what it shows.
//!
//! Reverse: preview input while editing schedules a sync (500ms). When it
//! fires the preview is converted back to text; if that differs from the
//! source after trimming, the guard moves to `ApplyingReverse`, the source is
//! overwritten and a short grace timer (100ms) returns it to `Idle`. Blurring
//! the preview runs the same step immediately.


use std::ops::ControlFlow;
use std::path::PathBuf;

use smol_str::SmolStr;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use twinmark_common::SyncTiming;
use twinmark_core::render::{CmarkRenderer, DiagramRenderer, MarkdownRenderer, RenderPipeline};
use twinmark_core::{DocumentStats, PreviewSurface, SourceEditor, to_text};

use crate::debounce::{Debouncer, earliest};
use crate::handle::{DocumentSnapshot, SyncEvent, SyncHandle};
use crate::session::SessionContext;
use crate::state::{SyncGuard, SyncState};

pub struct Coordinator<E, P, M = CmarkRenderer, D = ()> {
    editor: E,
    preview: P,
    pipeline: RenderPipeline<M, D>,
    session: SessionContext,
    guard: SyncGuard,
    forward: Debouncer,
    reverse: Debouncer,
    grace: Debouncer,
    preview_focused: bool,
    rx: mpsc::UnboundedReceiver<SyncEvent>,
}

impl<E, P, M, D> Coordinator<E, P, M, D>
where
    E: SourceEditor,
    P: PreviewSurface,
    M: MarkdownRenderer,
    D: DiagramRenderer,
{
    pub fn new(
        editor: E,
        preview: P,
        pipeline: RenderPipeline<M, D>,
        session: SessionContext,
        timing: &SyncTiming,
    ) -> (Self, SyncHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let guard = SyncGuard::new();
        let handle = SyncHandle::new(tx, guard.clone());
        let coordinator = Self {
            editor,
            preview,
            pipeline,
            session,
            guard,
            forward: Debouncer::from_millis(timing.forward_debounce_ms),
            reverse: Debouncer::from_millis(timing.reverse_debounce_ms),
            grace: Debouncer::from_millis(timing.reverse_grace_ms),
            preview_focused: false,
            rx,
        };
        (coordinator, handle)
    }

    pub fn guard(&self) -> &SyncGuard {
        &self.guard
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// When the loop next has a timer to fire.
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.forward.deadline(),
            self.reverse.deadline(),
            self.grace.deadline(),
        ])
    }

    /// Apply one event. `Break` means the coordinator should stop.
    pub async fn on_event(&mut self, event: SyncEvent, now: Instant) -> ControlFlow<()> {
        match event {
            SyncEvent::SourceChanged => {
                // Handles filter already; events fed in directly are checked too.
                if self.guard.accepts_source_change() {
                    self.forward.schedule(now);
                } else {
                    tracing::trace!("source change during reverse write ignored");
                }
            }
            SyncEvent::PreviewInput => {
                if self.guard.accepts_preview_input() {
                    self.reverse.schedule(now);
                } else {
                    tracing::trace!("preview input ignored");
                }
            }
            SyncEvent::PreviewFocused => {
                self.preview_focused = true;
                self.guard.set_editing(true);
            }
            SyncEvent::PreviewBlurred => {
                self.preview_focused = false;
                if self.guard.is_editing() {
                    self.reverse.cancel();
                    self.reverse_sync(now);
                    self.guard.set_editing(false);
                }
            }
            SyncEvent::Load {
                text,
                filename,
                path,
            } => self.load(&text, &filename, path).await,
            SyncEvent::MarkSaved {
                text,
                filename,
                path,
            } => {
                self.session.mark_saved(&text, &filename, path);
                tracing::debug!(%filename, "document saved");
            }
            SyncEvent::Snapshot(reply) => {
                let _ = reply.send(self.snapshot());
            }
            SyncEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Run whichever timers are due at `now`.
    pub async fn fire_due(&mut self, now: Instant) {
        if self.grace.take_due(now) {
            self.end_grace();
        }
        if self.forward.take_due(now) {
            self.forward_render().await;
        }
        if self.reverse.take_due(now) {
            self.reverse_sync(now);
        }
    }

    /// Render the source into the preview. Returns true if the preview was written.
    pub async fn forward_render(&mut self) -> bool {
        if !self.guard.try_enter(SyncState::ApplyingForward) {
            tracing::debug!(state = self.guard.state().as_str(), "forward render skipped");
            return false;
        }

        let text = self.editor.text();
        let tree = self.pipeline.render(&text).await;
        metrics::counter!("twinmark_forward_renders_total").increment(1);

        let written = if tree == self.preview.snapshot() {
            tracing::trace!("preview already up to date");
            false
        } else {
            match self.preview.replace(tree) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(error = %err, "preview write failed");
                    false
                }
            }
        };

        self.guard.leave(SyncState::ApplyingForward);
        written
    }

    /// Convert the preview back into the source. Returns true if the source was written.
    pub fn reverse_sync(&mut self, now: Instant) -> bool {
        let converted = to_text(&self.preview.snapshot());
        if converted.trim() == self.editor.text().trim() {
            tracing::trace!("reverse sync skipped, source unchanged");
            return false;
        }

        // A write inside our own grace window just extends it.
        let entered = self.guard.state() == SyncState::ApplyingReverse
            || self.guard.try_enter(SyncState::ApplyingReverse);
        if !entered {
            tracing::debug!(state = self.guard.state().as_str(), "reverse sync skipped");
            return false;
        }

        let written = match self.editor.set_text(&converted) {
            Ok(()) => {
                metrics::counter!("twinmark_reverse_syncs_total").increment(1);
                tracing::debug!(len = converted.len(), "source updated from preview");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "source write failed");
                false
            }
        };
        self.grace.schedule(now);
        written
    }

    fn end_grace(&mut self) {
        self.guard.leave(SyncState::ApplyingReverse);
        // Still focused means the user is still typing in the preview.
        if !self.preview_focused {
            self.guard.set_editing(false);
        }
    }

    async fn load(&mut self, text: &str, filename: &SmolStr, path: Option<PathBuf>) {
        self.reverse.cancel();
        if self.grace.is_pending() {
            self.grace.cancel();
            self.guard.leave(SyncState::ApplyingReverse);
        }
        self.guard.set_editing(self.preview_focused);

        if let Err(err) = self.editor.set_text(text) {
            tracing::warn!(error = %err, "could not load document into editor");
            return;
        }
        self.session.load(text, filename, path);
        self.forward.cancel();
        self.forward_render().await;
        tracing::info!(%filename, "document loaded");
    }

    fn snapshot(&self) -> DocumentSnapshot {
        let text = self.editor.text();
        DocumentSnapshot {
            modified: self.session.is_modified(&text),
            stats: DocumentStats::compute(&text),
            filename: SmolStr::new(self.session.filename()),
            path: self.session.path().map(PathBuf::from),
            text,
        }
    }

    /// Process events and timers until shutdown or every handle is gone.
    pub async fn run(mut self) {
        tracing::debug!("sync coordinator started");
        self.forward_render().await;

        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                biased;
                event = self.rx.recv() => {
                    let Some(event) = event else { break };
                    if self.on_event(event, Instant::now()).await.is_break() {
                        break;
                    }
                }
                _ = sleep_until(deadline) => self.fire_due(Instant::now()).await,
            }
        }
        tracing::debug!("sync coordinator stopped");
    }
}

impl<E, P, M, D> Coordinator<E, P, M, D>
where
    E: SourceEditor + Send + 'static,
    P: PreviewSurface + Send + 'static,
    M: MarkdownRenderer + Send + 'static,
    D: DiagramRenderer + Send + Sync + 'static,
{
    /// Run on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
