//! User preferences and their on-disk persistence.

use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Colour theme for both panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Which panes are visible.
///
/// Scroll mirroring only runs in [`ViewMode::Split`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Split,
    Source,
    Preview,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Split => "split",
            ViewMode::Source => "source",
            ViewMode::Preview => "preview",
        }
    }
}

/// Options for the markdown builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Render every newline inside a paragraph as a line break.
    pub breaks: bool,
    /// Curly quotes, dashes and ellipses. Off by default: a reverse sync would
    /// write the substituted characters back into the source.
    pub smart_punctuation: bool,
    /// Fenced code blocks with this language are handed to the diagram renderer.
    pub diagram_language: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            breaks: true,
            smart_punctuation: false,
            diagram_language: "mermaid".to_owned(),
        }
    }
}

/// Debounce and grace delays used by the sync coordinator, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncTiming {
    /// Delay between the last source edit and the preview re-render.
    pub forward_debounce_ms: u64,
    /// Delay between the last preview edit and the conversion back to text.
    pub reverse_debounce_ms: u64,
    /// How long the echo of a reverse write stays suppressed.
    pub reverse_grace_ms: u64,
}

impl Default for SyncTiming {
    fn default() -> Self {
        Self {
            forward_debounce_ms: 80,
            reverse_debounce_ms: 500,
            reverse_grace_ms: 100,
        }
    }
}

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: Theme,
    pub view_mode: ViewMode,
    /// Mirror scroll position between the panes.
    pub scroll_sync: bool,
    pub sidebar_collapsed: bool,
    /// Externally delivered files older than this are ignored.
    pub pending_file_max_age_ms: u64,
    pub render: RenderOptions,
    pub timing: SyncTiming,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            view_mode: ViewMode::default(),
            scroll_sync: true,
            sidebar_collapsed: false,
            pending_file_max_age_ms: 30_000,
            render: RenderOptions::default(),
            timing: SyncTiming::default(),
        }
    }
}

impl Preferences {
    /// Loads preferences from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self> {
        loader.load().await
    }

    /// Loads preferences, falling back to defaults when nothing has been saved yet
    /// or the stored file cannot be read.
    pub async fn load_or_default(loader: &impl Loader) -> Self {
        match loader.load().await {
            Ok(prefs) => prefs,
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load preferences, using defaults");
                Self::default()
            }
        }
    }

    /// Saves preferences using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<()> {
        saver.save(self).await
    }
}

/// The trait for loading preferences.
pub trait Loader {
    fn load(&self) -> impl Future<Output = Result<Preferences>> + Send;
}

/// The trait for saving preferences.
pub trait Saver {
    fn save(&self, prefs: &Preferences) -> impl Future<Output = Result<()>> + Send;
}

/// An implementation of [`Loader`] and [`Saver`] backed by a single file.
///
/// The format is picked from the file extension: `.toml` or `.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// `<config dir>/twinmark/preferences.toml`, if the platform has a config dir.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("twinmark").join("preferences.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for FileStore {
    async fn load(&self) -> Result<Preferences> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&std::fs::read_to_string(&self.path)?)?),
            Some("toml") => Ok(toml::from_str(&std::fs::read_to_string(&self.path)?)?),
            _ => Err(Error::UnsupportedFormat(self.path.clone())),
        }
    }
}

impl Saver for FileStore {
    async fn save(&self, prefs: &Preferences) -> Result<()> {
        let contents = match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::to_string_pretty(prefs)?,
            Some("toml") => toml::to_string_pretty(prefs)?,
            _ => return Err(Error::UnsupportedFormat(self.path.clone())),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}
