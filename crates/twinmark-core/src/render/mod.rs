//! Render pipeline: markdown text to rendered tree.
//!
//! Three steps, in order:
//! 1. the markdown renderer builds the tree (task-list rule included),
//! 2. diagram code blocks are materialized one at a time,
//! 3. the caller installs the result on the preview surface.
//!
//! The pipeline never installs anything itself; step 3 belongs to the
//! coordinator, which decides whether a write is needed at all.

mod builder;
pub mod diagram;
mod tasks;

#[cfg(test)]
mod tests;

pub use builder::CmarkRenderer;
pub use diagram::{DiagramError, DiagramIds, DiagramRenderer, DiagramSummary};
pub use tasks::apply_task_list_rule;

use twinmark_common::RenderOptions;

use crate::tree::RenderedTree;

/// Builds a rendered tree from markdown text.
///
/// Implementations are expected to apply the task-list rule; diagrams are
/// left as code blocks for the pipeline to materialize.
pub trait MarkdownRenderer {
    fn render(&self, text: &str) -> RenderedTree;
}

/// Any function from text to tree can stand in for the builder.
impl<F> MarkdownRenderer for F
where
    F: Fn(&str) -> RenderedTree,
{
    fn render(&self, text: &str) -> RenderedTree {
        self(text)
    }
}

/// Markdown renderer plus diagram renderer plus the session's diagram ids.
#[derive(Debug)]
pub struct RenderPipeline<M = CmarkRenderer, D = ()> {
    markdown: M,
    diagrams: D,
    diagram_language: String,
    ids: DiagramIds,
}

impl RenderPipeline {
    /// Default builder, no diagram renderer.
    pub fn new(options: &RenderOptions) -> Self {
        Self::from_parts(CmarkRenderer::new(options), (), &options.diagram_language)
    }
}

impl<M, D> RenderPipeline<M, D> {
    pub fn from_parts(markdown: M, diagrams: D, diagram_language: &str) -> Self {
        Self {
            markdown,
            diagrams,
            diagram_language: diagram_language.to_owned(),
            ids: DiagramIds::default(),
        }
    }

    pub fn with_diagram_renderer<D2>(self, diagrams: D2) -> RenderPipeline<M, D2> {
        RenderPipeline {
            markdown: self.markdown,
            diagrams,
            diagram_language: self.diagram_language,
            ids: self.ids,
        }
    }

    pub fn diagram_language(&self) -> &str {
        &self.diagram_language
    }

    /// Diagram ids handed out so far this session.
    pub fn diagrams_issued(&self) -> u64 {
        self.ids.issued()
    }
}

impl<M: MarkdownRenderer, D: DiagramRenderer> RenderPipeline<M, D> {
    /// Run the builder and materialize diagrams.
    ///
    /// Diagram failures end up inline in the tree; this never fails.
    #[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub async fn render(&mut self, text: &str) -> RenderedTree {
        let mut tree = self.markdown.render(text);
        let summary = diagram::materialize_diagrams(
            &mut tree,
            &self.diagram_language,
            &self.diagrams,
            &mut self.ids,
        )
        .await;
        if summary != DiagramSummary::default() {
            tracing::debug!(
                rendered = summary.rendered,
                failed = summary.failed,
                "diagrams materialized"
            );
        }
        tree
    }
}
