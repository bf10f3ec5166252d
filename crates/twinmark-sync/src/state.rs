//! The cooperative exclusion flag between forward renders and reverse syncs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// Which direction, if any, is currently writing into a surface.
///
/// Exactly one of these holds at any instant. Transitions only go through
/// `Idle`: a direction is entered from `Idle` and left back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SyncState {
    #[default]
    Idle = 0,
    /// A rendered tree is being written into the preview surface.
    ApplyingForward = 1,
    /// Converted text is being written into the source editor.
    ApplyingReverse = 2,
}

impl SyncState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SyncState::ApplyingForward,
            2 => SyncState::ApplyingReverse,
            _ => SyncState::Idle,
        }
    }

    pub fn is_idle(self) -> bool {
        matches!(self, SyncState::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncState::Idle => "idle",
            SyncState::ApplyingForward => "applying-forward",
            SyncState::ApplyingReverse => "applying-reverse",
        }
    }
}

/// Shared view of the sync state plus the preview's editing-eligible flag.
///
/// Cloned into every [`SyncHandle`](crate::SyncHandle) so notifications can
/// be filtered at the moment they fire, before they are queued.
#[derive(Debug, Clone, Default)]
pub struct SyncGuard {
    state: Arc<AtomicU8>,
    editing: Arc<AtomicBool>,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SyncState {
        SyncState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move from `Idle` to `next`. Fails if another direction holds the flag.
    pub fn try_enter(&self, next: SyncState) -> bool {
        debug_assert!(!next.is_idle(), "enter a direction, not Idle");
        self.state
            .compare_exchange(
                SyncState::Idle as u8,
                next as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Return to `Idle`, but only from `current`.
    pub fn leave(&self, current: SyncState) -> bool {
        self.state
            .compare_exchange(
                current as u8,
                SyncState::Idle as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Whether edits in the preview are user-authored and eligible for reverse sync.
    pub fn is_editing(&self) -> bool {
        self.editing.load(Ordering::Acquire)
    }

    pub fn set_editing(&self, editing: bool) {
        self.editing.store(editing, Ordering::Release);
    }

    /// Source changes are echoes while converted text is being written.
    pub fn accepts_source_change(&self) -> bool {
        self.state() != SyncState::ApplyingReverse
    }

    /// Preview input counts only while editing and not during a forward write.
    pub fn accepts_preview_input(&self) -> bool {
        self.state() != SyncState::ApplyingForward && self.is_editing()
    }
}
