//! twinmark-sync: keeps a markdown source editor and its editable preview in step.
//!
//! A [`Coordinator`] task owns both surfaces. Hosts forward their change,
//! input and focus callbacks through a cloneable [`SyncHandle`], and drive
//! file operations through the functions in [`host`].

pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod handle;
pub mod host;
pub mod session;
pub mod state;

pub use coordinator::Coordinator;
pub use error::{HostError, Result};
pub use handle::{DocumentSnapshot, SyncEvent, SyncHandle};
pub use host::{
    FileHost, FsFileHost, HostOutcome, Notice, NoticeLevel, Notifier, OpenedFile, PendingFile,
    PendingSlot, SaveOutcome, TreeEntry,
};
pub use session::{SessionContext, UNTITLED, WELCOME_DOCUMENT};
pub use state::{SyncGuard, SyncState};
