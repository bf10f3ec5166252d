//! Diagram materialization.
//!
//! Fenced code blocks tagged with the diagram language are handed to an
//! external [`DiagramRenderer`] and replaced in the tree by its output (or by
//! an inline error marker). Blocks are processed one at a time in document
//! order: each render is awaited before the next one starts.

use std::future::Future;

use smol_str::{SmolStr, format_smolstr};

use crate::tree::{DiagramOutcome, ElementKind, RenderedNode, RenderedTree};

/// Failure reported by a diagram renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DiagramError {
    message: String,
}

impl DiagramError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn unavailable() -> Self {
        Self::new("no diagram renderer configured")
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Turns diagram source into vector markup.
///
/// `id` is unique per render call; renderers that register the output under
/// a name (as browser diagram libraries do) should use it.
pub trait DiagramRenderer {
    fn render(
        &self,
        source: &str,
        id: &str,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send;
}

/// Unit type implementation - no renderer, every diagram becomes an error marker.
impl DiagramRenderer for () {
    async fn render(&self, _source: &str, _id: &str) -> Result<String, DiagramError> {
        Err(DiagramError::unavailable())
    }
}

impl<T: DiagramRenderer> DiagramRenderer for &T {
    fn render(
        &self,
        source: &str,
        id: &str,
    ) -> impl Future<Output = Result<String, DiagramError>> + Send {
        (**self).render(source, id)
    }
}

impl<T: DiagramRenderer + Sync> DiagramRenderer for Option<T> {
    async fn render(&self, source: &str, id: &str) -> Result<String, DiagramError> {
        match self {
            Some(renderer) => renderer.render(source, id).await,
            None => Err(DiagramError::unavailable()),
        }
    }
}

/// Monotonic id source: `mermaid-1`, `mermaid-2`, ... for the whole session.
#[derive(Debug, Clone)]
pub struct DiagramIds {
    prefix: SmolStr,
    issued: u64,
}

impl DiagramIds {
    pub fn new(prefix: impl Into<SmolStr>) -> Self {
        Self {
            prefix: prefix.into(),
            issued: 0,
        }
    }

    pub fn next_id(&mut self) -> SmolStr {
        self.issued += 1;
        format_smolstr!("{}-{}", self.prefix, self.issued)
    }

    /// How many ids have been handed out.
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

impl Default for DiagramIds {
    fn default() -> Self {
        Self::new("mermaid")
    }
}

/// Counts from one materialization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagramSummary {
    pub rendered: usize,
    pub failed: usize,
}

/// Index paths of diagram code blocks, in document order.
pub fn diagram_paths(tree: &RenderedTree, language: &str) -> Vec<Vec<usize>> {
    fn walk(nodes: &[RenderedNode], language: &str, path: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        for (idx, node) in nodes.iter().enumerate() {
            let Some(el) = node.as_element() else {
                continue;
            };
            path.push(idx);
            match &el.kind {
                ElementKind::CodeBlock {
                    language: Some(lang),
                } if lang.as_str() == language => out.push(path.clone()),
                _ => walk(&el.children, language, path, out),
            }
            path.pop();
        }
    }

    let mut out = Vec::new();
    walk(&tree.children, language, &mut Vec::new(), &mut out);
    out
}

/// Replace every diagram code block with its rendered form.
///
/// A failing block does not affect the others.
pub async fn materialize_diagrams<D: DiagramRenderer>(
    tree: &mut RenderedTree,
    language: &str,
    renderer: &D,
    ids: &mut DiagramIds,
) -> DiagramSummary {
    let mut summary = DiagramSummary::default();

    for path in diagram_paths(tree, language) {
        let Some(source) = tree.node_at_mut(&path).map(|node| node.text_content()) else {
            continue;
        };
        let id = ids.next_id();

        let outcome = match renderer.render(&source, &id).await {
            Ok(svg) => {
                summary.rendered += 1;
                DiagramOutcome::Rendered { svg }
            }
            Err(err) => {
                summary.failed += 1;
                tracing::warn!(%id, error = %err, "diagram render failed");
                metrics::counter!("twinmark_diagram_failures_total").increment(1);
                DiagramOutcome::Failed {
                    message: format!("Diagram render error: {err}"),
                }
            }
        };

        if let Some(node) = tree.node_at_mut(&path) {
            *node = RenderedNode::leaf(ElementKind::Diagram { id, outcome });
        }
    }

    summary
}
