//! twinmark-core: the synchronization engine between a markdown source and
//! its rendered view, without any host framework.
//!
//! This crate provides:
//! - `RenderedTree` - the preview surface's structure
//! - `RenderPipeline` - markdown to tree, with task lists and diagrams
//! - `to_text` - the structural converter from tree back to markdown
//! - `SourceEditor` / `PreviewSurface` / `ScrollSurface` platform traits
//! - `RopeBuffer`, `ScrollMirror`, `DocumentStats`

pub mod convert;
pub mod markup;
pub mod platform;
pub mod render;
pub mod scroll;
pub mod stats;
pub mod text;
pub mod tree;

pub use convert::{nodes_to_text, to_text};
pub use platform::{
    MemoryPreview, PlatformError, PreviewSurface, ScrollMetrics, ScrollSurface, SourceEditor,
};
pub use render::{
    CmarkRenderer, DiagramError, DiagramRenderer, MarkdownRenderer, RenderPipeline,
};
pub use scroll::ScrollMirror;
pub use smol_str::SmolStr;
pub use stats::DocumentStats;
pub use text::RopeBuffer;
pub use tree::{CheckState, DiagramOutcome, Element, ElementKind, RenderedNode, RenderedTree};
