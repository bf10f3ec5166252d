//! Platform abstraction traits for the two surfaces.
//!
//! These define the interface between the sync engine and whatever actually
//! displays the document: a code editor widget and a rendered preview in a
//! browser, a native toolkit, or plain in-memory buffers in tests and the CLI.

use crate::tree::RenderedTree;

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// The source editor: holds the markdown text.
///
/// A programmatic `set_text` fires the editor's change notification just like
/// a keystroke does. Callers that must not react to their own write rely on
/// the sync guard, not on the editor staying quiet.
pub trait SourceEditor {
    /// Full current content.
    fn text(&self) -> String;

    /// Replace the whole content.
    fn set_text(&mut self, text: &str) -> Result<(), PlatformError>;
}

/// The preview surface: holds the rendered tree and may be edited in place.
pub trait PreviewSurface {
    /// What the surface currently shows, including any edits the user made.
    fn snapshot(&self) -> RenderedTree;

    /// Replace the whole content.
    fn replace(&mut self, tree: RenderedTree) -> Result<(), PlatformError>;
}

/// Scroll geometry of one pane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    /// Maximum scroll offset, never less than 1 so it can be divided by.
    pub fn scroll_range(&self) -> f64 {
        (self.scroll_height - self.client_height).max(1.0)
    }
}

/// A scrollable pane.
pub trait ScrollSurface {
    fn metrics(&self) -> ScrollMetrics;

    /// Setting the offset may fire the pane's own scroll notification.
    fn set_scroll_top(&mut self, top: f64);
}

impl<T: SourceEditor + ?Sized> SourceEditor for Box<T> {
    fn text(&self) -> String {
        (**self).text()
    }

    fn set_text(&mut self, text: &str) -> Result<(), PlatformError> {
        (**self).set_text(text)
    }
}

impl<T: PreviewSurface + ?Sized> PreviewSurface for Box<T> {
    fn snapshot(&self) -> RenderedTree {
        (**self).snapshot()
    }

    fn replace(&mut self, tree: RenderedTree) -> Result<(), PlatformError> {
        (**self).replace(tree)
    }
}

impl<T: ScrollSurface + ?Sized> ScrollSurface for &mut T {
    fn metrics(&self) -> ScrollMetrics {
        (**self).metrics()
    }

    fn set_scroll_top(&mut self, top: f64) {
        (**self).set_scroll_top(top)
    }
}

/// In-memory preview surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreview {
    tree: RenderedTree,
    writes: u64,
}

impl MemoryPreview {
    pub fn new(tree: RenderedTree) -> Self {
        Self { tree, writes: 0 }
    }

    pub fn tree(&self) -> &RenderedTree {
        &self.tree
    }

    /// Mutable access, standing in for the user editing the surface.
    pub fn tree_mut(&mut self) -> &mut RenderedTree {
        &mut self.tree
    }

    /// Number of `replace` calls so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl PreviewSurface for MemoryPreview {
    fn snapshot(&self) -> RenderedTree {
        self.tree.clone()
    }

    fn replace(&mut self, tree: RenderedTree) -> Result<(), PlatformError> {
        self.tree = tree;
        self.writes += 1;
        Ok(())
    }
}
