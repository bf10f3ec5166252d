//! Per-session document context.

use std::path::{Path, PathBuf};

use smol_str::SmolStr;
use twinmark_common::{Preferences, Theme, ViewMode};

/// Display name of a document that has never been saved.
pub const UNTITLED: &str = "untitled.md";

/// Document shown when a session starts without a file.
pub const WELCOME_DOCUMENT: &str = r#"# Welcome to twinmark

> A markdown editor where the source and the preview are both editable

## Getting started

- Press `Ctrl+O` to open a local .md file
- Press `Ctrl+S` to save the current file
- Use the toolbar buttons for formatting
- Drag the divider to resize the source and preview panes
- **Edit the preview directly**, changes flow back into the source

## Supported syntax

### Text

**Bold text** *italic text* ~~strikethrough~~ `inline code`

### Lists

- Unordered item 1
- Unordered item 2
  - Nested item

1. Ordered item 1
2. Ordered item 2

### Task lists

- [x] Finished task
- [ ] Open task

### Code blocks

```rust
fn main() {
    println!("Hello, markdown!");
}
```

### Tables

| Action | Shortcut | Description |
|------|--------|------|
| Open | Ctrl+O | Open a file |
| Save | Ctrl+S | Save the file |
| Bold | Ctrl+B | Bold text |
| Italic | Ctrl+I | Italic text |

### Quotes

> This is a quote.
> It can span several lines.

### Mermaid diagrams

```mermaid
graph LR
    A[Edit markdown] --> B[Live preview]
    B --> C{Happy?}
    C -->|Yes| D[Save file]
    C -->|No| A
```

### Links

[Visit GitHub](https://github.com)

---

*Start writing!*
"#;

/// Filename, save state and view preferences of the open document.
///
/// Owned by the coordinator; hosts read it through snapshots.
#[derive(Debug, Clone)]
pub struct SessionContext {
    filename: SmolStr,
    path: Option<PathBuf>,
    saved_text: String,
    pub theme: Theme,
    pub view_mode: ViewMode,
    pub scroll_sync: bool,
}

impl SessionContext {
    /// A fresh session showing the welcome document.
    pub fn new(prefs: &Preferences) -> Self {
        Self {
            filename: SmolStr::new_static(UNTITLED),
            path: None,
            saved_text: WELCOME_DOCUMENT.to_owned(),
            theme: prefs.theme,
            view_mode: prefs.view_mode,
            scroll_sync: prefs.scroll_sync,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether `current` differs from the last loaded or saved text.
    pub fn is_modified(&self, current: &str) -> bool {
        current != self.saved_text
    }

    /// A document replaced the session's content wholesale.
    pub fn load(&mut self, text: &str, filename: &str, path: Option<PathBuf>) {
        self.saved_text = text.to_owned();
        self.filename = SmolStr::new(filename);
        self.path = path;
    }

    /// `text` was written out under `filename`.
    pub fn mark_saved(&mut self, text: &str, filename: &str, path: Option<PathBuf>) {
        self.saved_text = text.to_owned();
        self.filename = SmolStr::new(filename);
        if path.is_some() {
            self.path = path;
        }
    }

    /// Window/tab title, with a marker when there are unsaved changes.
    pub fn title(&self, current: &str) -> String {
        if self.is_modified(current) {
            format!("{} •", self.filename)
        } else {
            self.filename.to_string()
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(&Preferences::default())
    }
}
