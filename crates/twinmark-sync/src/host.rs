//! Host collaborators: files in and out of the session, and notices back to the user.
//!
//! Every operation here goes through a [`SyncHandle`], so the coordinator
//! stays the only writer of both surfaces. Cancellation is silent, I/O
//! failures become an error notice and leave the document alone.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{HostError, Result};
use crate::handle::SyncHandle;
use crate::session::UNTITLED;

/// Extensions accepted for drag-and-drop.
pub const DROP_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Extensions shown as documents in the directory tree.
pub const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mkdn", "txt"];

/// Directory names never listed.
const SKIPPED_DIRS: &[&str] = &["node_modules", "dist"];

/// How deep `read_directory_tree` descends below the root.
pub const MAX_TREE_DEPTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short, transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Where notices go: a toast, a status line, stderr.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Unit type implementation - notices are only logged.
impl Notifier for () {
    fn notify(&self, notice: Notice) {
        tracing::debug!(level = ?notice.level, text = %notice.message, "notice");
    }
}

impl<T: Notifier> Notifier for &T {
    fn notify(&self, notice: Notice) {
        (*self).notify(notice)
    }
}

/// A document chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedFile {
    pub filename: SmolStr,
    pub path: Option<PathBuf>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved {
        filename: SmolStr,
        path: Option<PathBuf>,
    },
    Cancelled,
}

/// File picker and storage of the host platform.
pub trait FileHost {
    /// Ask the user for a document. `None` means they cancelled.
    fn open(&self) -> impl Future<Output = Result<Option<OpenedFile>>> + Send;

    /// Write `text`, to `path` if the document has one, otherwise wherever the
    /// user picks (suggesting `filename`).
    fn save(
        &self,
        filename: &str,
        path: Option<&Path>,
        text: &str,
    ) -> impl Future<Output = Result<SaveOutcome>> + Send;
}

/// Native file host without a picker.
///
/// `open` reads the configured path (cancelled when there is none); `save`
/// writes to the document's own path or into the save directory.
#[derive(Debug, Clone, Default)]
pub struct FsFileHost {
    open_path: Option<PathBuf>,
    save_dir: Option<PathBuf>,
}

impl FsFileHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_open_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.open_path = Some(path.into());
        self
    }

    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = Some(dir.into());
        self
    }
}

impl FileHost for FsFileHost {
    async fn open(&self) -> Result<Option<OpenedFile>> {
        let Some(path) = self.open_path.as_deref() else {
            return Ok(None);
        };
        let text = tokio::fs::read_to_string(path).await?;
        Ok(Some(OpenedFile {
            filename: display_name(path),
            path: Some(path.to_path_buf()),
            text,
        }))
    }

    async fn save(&self, filename: &str, path: Option<&Path>, text: &str) -> Result<SaveOutcome> {
        let target = match (path, self.save_dir.as_deref()) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(dir)) => dir.join(filename),
            (None, None) => return Ok(SaveOutcome::Cancelled),
        };
        tokio::fs::write(&target, text).await?;
        Ok(SaveOutcome::Saved {
            filename: display_name(&target),
            path: Some(target),
        })
    }
}

fn display_name(path: &Path) -> SmolStr {
    path.file_name()
        .map(|name| SmolStr::new(name.to_string_lossy()))
        .unwrap_or_else(|| SmolStr::new_static(UNTITLED))
}

/// How a host operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOutcome {
    Done,
    Cancelled,
    /// The user was told why.
    Failed,
}

/// Open a document through the host's picker.
pub async fn open_document(
    handle: &SyncHandle,
    files: &impl FileHost,
    notifier: &impl Notifier,
) -> HostOutcome {
    let opened = match files.open().await {
        Ok(Some(opened)) => opened,
        Ok(None) => return HostOutcome::Cancelled,
        Err(err) => return failed(notifier, "Failed to open file", &err),
    };
    if let Err(err) = handle.load(opened.text, &opened.filename, opened.path) {
        return failed(notifier, "Failed to open file", &err);
    }
    notifier.notify(Notice::success(format!("Opened {}", opened.filename)));
    HostOutcome::Done
}

/// Save the current document.
pub async fn save_document(
    handle: &SyncHandle,
    files: &impl FileHost,
    notifier: &impl Notifier,
) -> HostOutcome {
    let snapshot = match handle.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => return failed(notifier, "Failed to save", &err),
    };
    let outcome = files
        .save(&snapshot.filename, snapshot.path.as_deref(), &snapshot.text)
        .await;
    match outcome {
        Ok(SaveOutcome::Saved { filename, path }) => {
            if let Err(err) = handle.mark_saved(snapshot.text, &filename, path) {
                return failed(notifier, "Failed to save", &err);
            }
            notifier.notify(Notice::success(format!("Saved {filename}")));
            HostOutcome::Done
        }
        Ok(SaveOutcome::Cancelled) => HostOutcome::Cancelled,
        Err(err) => failed(notifier, "Failed to save", &err),
    }
}

/// Start an empty, untitled document.
///
/// Refuses with [`HostError::UnsavedChanges`] when the current document is
/// modified, unless `force` is set (the host asked the user to confirm).
pub async fn new_document(handle: &SyncHandle, force: bool) -> Result<HostOutcome> {
    if !force && handle.snapshot().await?.modified {
        return Err(HostError::UnsavedChanges);
    }
    handle.load(String::new(), UNTITLED, None)?;
    Ok(HostOutcome::Done)
}

/// Whether a dropped file may be loaded.
pub fn is_droppable(name: &str) -> bool {
    has_extension(name, DROP_EXTENSIONS)
}

/// Whether the directory tree treats `name` as a document.
pub fn is_markdown_name(name: &str) -> bool {
    has_extension(name, MARKDOWN_EXTENSIONS)
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Load a file dropped onto the window.
pub fn drop_file(
    handle: &SyncHandle,
    notifier: &impl Notifier,
    name: &str,
    bytes: Vec<u8>,
) -> HostOutcome {
    if !is_droppable(name) {
        return failed(notifier, "Cannot open", &HostError::UnsupportedFile(name.to_owned()));
    }
    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => return failed(notifier, "Cannot open", &HostError::NotText(name.to_owned())),
    };
    if let Err(err) = handle.load(text, name, None) {
        return failed(notifier, "Cannot open", &err);
    }
    notifier.notify(Notice::success(format!("Opened {name}")));
    HostOutcome::Done
}

fn failed(notifier: &impl Notifier, what: &str, err: &HostError) -> HostOutcome {
    tracing::warn!(error = %err, "{what}");
    notifier.notify(Notice::error(format!("{what}: {err}")));
    HostOutcome::Failed
}

/// A document handed over by the host's external-file interception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFile {
    pub content: String,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Milliseconds since the Unix epoch when the record was stored.
    pub timestamp: u64,
}

impl PendingFile {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.timestamp)
    }
}

/// Holds at most one pending file and gives it out at most once.
#[derive(Debug, Default)]
pub struct PendingSlot {
    inner: Mutex<Option<PendingFile>>,
}

impl PendingSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a record, replacing any earlier one.
    pub fn put(&self, file: PendingFile) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
    }

    pub fn take(&self) -> Option<PendingFile> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

/// Take the pending record if it is fresh and non-empty.
///
/// The slot is emptied either way; a stale record is never offered again.
pub fn accept_pending(slot: &PendingSlot, now_ms: u64, max_age_ms: u64) -> Option<PendingFile> {
    let file = slot.take()?;
    let age = file.age_ms(now_ms);
    if age > max_age_ms {
        tracing::warn!(filename = %file.filename, age_ms = age, "discarding stale pending file");
        return None;
    }
    if file.content.is_empty() {
        tracing::debug!(filename = %file.filename, "discarding empty pending file");
        return None;
    }
    Some(file)
}

/// Load the pending record into the session, if there is an acceptable one.
pub fn load_pending(
    handle: &SyncHandle,
    slot: &PendingSlot,
    notifier: &impl Notifier,
    now_ms: u64,
    max_age_ms: u64,
) -> HostOutcome {
    let Some(file) = accept_pending(slot, now_ms, max_age_ms) else {
        return HostOutcome::Cancelled;
    };
    if let Err(err) = handle.load(file.content, &file.filename, None) {
        return failed(notifier, "Failed to open file", &err);
    }
    notifier.notify(Notice::success(format!("Opened {}", file.filename)));
    HostOutcome::Done
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    // Declared first so directories sort before files.
    Directory,
    File,
}

/// One node of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeEntry>,
}

impl TreeEntry {
    /// Whether the file looks like a document the editor can open.
    pub fn is_document(&self) -> bool {
        self.kind == EntryKind::File && is_markdown_name(&self.name)
    }
}

/// Recursive listing of `root`: hidden entries, `node_modules` and `dist`
/// are skipped; directories come first, then entries by name.
pub fn read_directory_tree(root: &Path) -> Result<Vec<TreeEntry>> {
    read_level(root, 0)
}

fn read_level(dir: &Path, depth: usize) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            let children = if depth < MAX_TREE_DEPTH {
                read_level(&path, depth + 1)?
            } else {
                Vec::new()
            };
            entries.push(TreeEntry {
                name,
                kind: EntryKind::Directory,
                path,
                children,
            });
        } else {
            entries.push(TreeEntry {
                name,
                kind: EntryKind::File,
                path,
                children: Vec::new(),
            });
        }
    }
    entries.sort_by(|a, b| a.kind.cmp(&b.kind).then_with(|| a.name.cmp(&b.name)));
    Ok(entries)
}
