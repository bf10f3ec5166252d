//! The rendered view tree.
//!
//! This mirrors the live structure of the preview surface. A forward render
//! rebuilds it from scratch; the structural converter reads it back into text.
//! There is no shadow copy: hosts hand us a snapshot of what the user is
//! actually looking at (and possibly editing).

use smol_str::SmolStr;

/// Root of a rendered view: the children of the preview container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedTree {
    pub children: Vec<RenderedNode>,
}

/// A node in the rendered view: text leaf or element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedNode {
    Text(String),
    Element(Element),
}

/// An element with its kind-specific attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub kind: ElementKind,
    pub children: Vec<RenderedNode>,
}

/// Checkbox state as exposed by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    #[default]
    Unchecked,
    Checked,
    /// Neither; the host could not tell or the user put it in a mixed state.
    Indeterminate,
}

impl CheckState {
    pub fn from_checked(checked: bool) -> Self {
        if checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }

    pub fn is_checked(self) -> bool {
        matches!(self, CheckState::Checked)
    }
}

/// What a diagram code block turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramOutcome {
    /// Vector markup produced by the diagram renderer.
    Rendered { svg: String },
    /// Inline error marker carrying the failure message.
    Failed { message: String },
}

/// Every element kind the preview surface can contain.
///
/// Kinds the engine does not understand are kept as [`ElementKind::Unknown`]
/// and contribute only their children's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Heading, level 1 through 6.
    Heading { level: u8 },
    Paragraph,
    LineBreak,
    Bold,
    Italic,
    Strikethrough,
    InlineCode,
    /// Fenced or indented code. Holds an [`ElementKind::InlineCode`] child
    /// the way `<pre><code>` does.
    CodeBlock { language: Option<SmolStr> },
    Blockquote,
    UnorderedList,
    OrderedList { start: u64 },
    /// `task` is set when the item carries a checkbox.
    ListItem { task: bool },
    Link { href: Option<String> },
    Image { src: Option<String>, alt: String },
    HorizontalRule,
    Table,
    TableRow,
    TableCell { header: bool },
    Checkbox(CheckState),
    /// A materialized diagram (or its error marker).
    Diagram { id: SmolStr, outcome: DiagramOutcome },
    Unknown { tag: SmolStr },
}

impl ElementKind {
    /// Short lowercase name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Heading { .. } => "heading",
            ElementKind::Paragraph => "paragraph",
            ElementKind::LineBreak => "line-break",
            ElementKind::Bold => "bold",
            ElementKind::Italic => "italic",
            ElementKind::Strikethrough => "strikethrough",
            ElementKind::InlineCode => "inline-code",
            ElementKind::CodeBlock { .. } => "code-block",
            ElementKind::Blockquote => "blockquote",
            ElementKind::UnorderedList => "unordered-list",
            ElementKind::OrderedList { .. } => "ordered-list",
            ElementKind::ListItem { .. } => "list-item",
            ElementKind::Link { .. } => "link",
            ElementKind::Image { .. } => "image",
            ElementKind::HorizontalRule => "horizontal-rule",
            ElementKind::Table => "table",
            ElementKind::TableRow => "table-row",
            ElementKind::TableCell { .. } => "table-cell",
            ElementKind::Checkbox(_) => "checkbox",
            ElementKind::Diagram { .. } => "diagram",
            ElementKind::Unknown { .. } => "unknown",
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(
            self,
            ElementKind::UnorderedList | ElementKind::OrderedList { .. }
        )
    }
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: ElementKind, children: Vec<RenderedNode>) -> Self {
        Self { kind, children }
    }

    /// Concatenated text of every descendant text leaf.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

impl RenderedNode {
    pub fn text(text: impl Into<String>) -> Self {
        RenderedNode::Text(text.into())
    }

    pub fn element(kind: ElementKind, children: Vec<RenderedNode>) -> Self {
        RenderedNode::Element(Element::with_children(kind, children))
    }

    /// An element without children (line break, rule, checkbox, image).
    pub fn leaf(kind: ElementKind) -> Self {
        RenderedNode::Element(Element::new(kind))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            RenderedNode::Element(el) => Some(el),
            RenderedNode::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            RenderedNode::Element(el) => Some(el),
            RenderedNode::Text(_) => None,
        }
    }

    pub fn kind(&self) -> Option<&ElementKind> {
        self.as_element().map(|el| &el.kind)
    }

    pub fn text_content(&self) -> String {
        match self {
            RenderedNode::Text(text) => text.clone(),
            RenderedNode::Element(el) => el.text_content(),
        }
    }
}

impl RenderedTree {
    pub fn new(children: Vec<RenderedNode>) -> Self {
        Self { children }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Depth-first, document-order visit of every element.
    pub fn for_each_element<'a>(&'a self, mut f: impl FnMut(&'a Element)) {
        fn walk<'a>(nodes: &'a [RenderedNode], f: &mut impl FnMut(&'a Element)) {
            for node in nodes {
                if let RenderedNode::Element(el) = node {
                    f(el);
                    walk(&el.children, f);
                }
            }
        }
        walk(&self.children, &mut f);
    }

    /// Node at an index path (child index at each depth), if it exists.
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut RenderedNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for idx in rest {
            node = node.as_element_mut()?.children.get_mut(*idx)?;
        }
        Some(node)
    }
}

fn collect_text(nodes: &[RenderedNode], out: &mut String) {
    for node in nodes {
        match node {
            RenderedNode::Text(text) => out.push_str(text),
            RenderedNode::Element(el) => collect_text(&el.children, out),
        }
    }
}
