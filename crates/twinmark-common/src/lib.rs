//! Shared plumbing for the twinmark crates: errors, preferences and telemetry.

pub mod config;
pub mod error;
#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use crate::config::{
    FileStore, Loader, Preferences, RenderOptions, Saver, SyncTiming, Theme, ViewMode,
};
pub use crate::error::Error;
