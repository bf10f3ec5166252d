//! Structural converter: rendered tree back to markdown text.
//!
//! The mapping is total and never fails. Children are converted before their
//! parent wraps them. It is deliberately lossy: diagrams have no recoverable
//! source and are dropped, list markers and numbering are normalized, and
//! anything unrecognised degrades to the text of its children.

#[cfg(test)]
mod tests;

use crate::tree::{CheckState, Element, ElementKind, RenderedNode, RenderedTree};

/// Width of one cell in the generated table header separator.
const TABLE_SEPARATOR_CELL: &str = "------";

/// Convert a rendered tree to markdown.
///
/// The result is trimmed and always ends with exactly one newline.
pub fn to_text(tree: &RenderedTree) -> String {
    let body = convert_nodes(&tree.children, None);
    let mut out = String::with_capacity(body.len() + 1);
    out.push_str(body.trim());
    out.push('\n');
    out
}

/// Convert a forest of sibling nodes, concatenating their output.
pub fn nodes_to_text(nodes: &[RenderedNode]) -> String {
    convert_nodes(nodes, None)
}

fn convert_nodes(nodes: &[RenderedNode], parent: Option<&ElementKind>) -> String {
    nodes.iter().map(|node| convert_node(node, parent)).collect()
}

fn convert_node(node: &RenderedNode, parent: Option<&ElementKind>) -> String {
    match node {
        RenderedNode::Text(text) => text.clone(),
        RenderedNode::Element(el) => convert_element(el, parent),
    }
}

// No wildcard arm: a new ElementKind must get an explicit rule here.
fn convert_element(el: &Element, parent: Option<&ElementKind>) -> String {
    let children = || convert_nodes(&el.children, Some(&el.kind));

    match &el.kind {
        ElementKind::Heading { level } => {
            let hashes = "#".repeat(usize::from((*level).clamp(1, 6)));
            format!("{hashes} {}\n\n", children().trim())
        }
        ElementKind::Paragraph => format!("{}\n\n", children().trim()),
        ElementKind::LineBreak => "\n".to_owned(),
        ElementKind::Bold => format!("**{}**", children()),
        ElementKind::Italic => format!("*{}*", children()),
        ElementKind::Strikethrough => format!("~~{}~~", children()),
        ElementKind::InlineCode => {
            if matches!(parent, Some(ElementKind::CodeBlock { .. })) {
                children()
            } else {
                format!("`{}`", children())
            }
        }
        ElementKind::CodeBlock { language } => {
            let lang = language.as_deref().unwrap_or("");
            let code = children();
            format!("```{lang}\n{}\n```\n\n", code.trim_end())
        }
        ElementKind::Blockquote => {
            let inner = children();
            let quoted = inner
                .trim()
                .split('\n')
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n");
            format!("{quoted}\n\n")
        }
        ElementKind::UnorderedList => convert_list(el, |_| "- ".to_owned()),
        ElementKind::OrderedList { .. } => convert_list(el, |n| format!("{n}. ")),
        // Items outside a list have no marker to carry.
        ElementKind::ListItem { .. } => children(),
        ElementKind::Link { href } => {
            format!("[{}]({})", children(), href.as_deref().unwrap_or(""))
        }
        ElementKind::Image { src, alt } => {
            format!("![{alt}]({})", src.as_deref().unwrap_or(""))
        }
        ElementKind::HorizontalRule => "---\n\n".to_owned(),
        ElementKind::Table => convert_table(el),
        ElementKind::TableRow | ElementKind::TableCell { .. } => children(),
        // Consumed by the enclosing list item.
        ElementKind::Checkbox(_) => String::new(),
        // Rendered diagrams have no recoverable source.
        ElementKind::Diagram { .. } => String::new(),
        ElementKind::Unknown { .. } => children(),
    }
}

/// One line per list item; `marker` gets the 1-based item number.
///
/// A nested list starts on its own line, indented by the width of the
/// parent's marker, as do continuation lines of the item body.
fn convert_list(list: &Element, marker: impl Fn(usize) -> String) -> String {
    let mut out = String::new();
    let items = list
        .children
        .iter()
        .filter_map(RenderedNode::as_element)
        .filter(|child| matches!(child.kind, ElementKind::ListItem { .. }));

    for (idx, item) in items.enumerate() {
        let marker = marker(idx + 1);
        let indent = " ".repeat(marker.chars().count());
        out.push_str(&marker);
        match find_checkbox(&item.children) {
            Some(state) if state.is_checked() => out.push_str("[x] "),
            Some(_) => out.push_str("[ ] "),
            None => {}
        }

        let mut body = ItemBody::new(&indent);
        let mut start = 0;
        for (i, child) in item.children.iter().enumerate() {
            if let Some(nested) = child.as_element() {
                if nested.kind.is_list() {
                    body.push(&convert_nodes(&item.children[start..i], Some(&item.kind)));
                    body.push_block(&convert_element(nested, Some(&item.kind)));
                    start = i + 1;
                }
            }
        }
        body.push(&convert_nodes(&item.children[start..], Some(&item.kind)));
        out.push_str(&body.text);
        out.push('\n');
    }

    out.push('\n');
    out
}

/// Accumulates the text of one list item below its marker line.
struct ItemBody<'a> {
    indent: &'a str,
    text: String,
}

impl<'a> ItemBody<'a> {
    fn new(indent: &'a str) -> Self {
        Self {
            indent,
            text: String::new(),
        }
    }

    /// Inline content; the first piece continues the marker line.
    fn push(&mut self, segment: &str) {
        let segment = segment.trim();
        if segment.is_empty() {
            return;
        }
        if self.text.is_empty() {
            let mut lines = segment.split('\n');
            if let Some(first) = lines.next() {
                self.text.push_str(first);
            }
            for line in lines {
                self.push_line(line);
            }
        } else {
            self.push_block(segment);
        }
    }

    /// Block content (a nested list): always on fresh, indented lines.
    fn push_block(&mut self, block: &str) {
        for line in block.trim_end().split('\n') {
            self.push_line(line);
        }
    }

    fn push_line(&mut self, line: &str) {
        self.text.push('\n');
        if !line.is_empty() {
            self.text.push_str(self.indent);
            self.text.push_str(line);
        }
    }
}

/// First checkbox belonging to this item, not looking into nested lists.
fn find_checkbox(nodes: &[RenderedNode]) -> Option<CheckState> {
    nodes.iter().filter_map(RenderedNode::as_element).find_map(|el| match &el.kind {
        ElementKind::Checkbox(state) => Some(*state),
        kind if kind.is_list() => None,
        _ => find_checkbox(&el.children),
    })
}

fn convert_table(table: &Element) -> String {
    let mut rows = Vec::new();
    collect_rows(&table.children, &mut rows);
    if rows.is_empty() {
        return convert_nodes(&table.children, Some(&table.kind));
    }

    let mut out = String::new();
    for (idx, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .children
            .iter()
            .filter_map(RenderedNode::as_element)
            .filter(|cell| matches!(cell.kind, ElementKind::TableCell { .. }))
            .map(|cell| {
                convert_nodes(&cell.children, Some(&cell.kind))
                    .trim()
                    .replace('|', "\\|")
            })
            .collect();

        out.push_str("| ");
        out.push_str(&cells.join(" | "));
        out.push_str(" |\n");

        if idx == 0 {
            out.push_str("| ");
            out.push_str(&vec![TABLE_SEPARATOR_CELL; cells.len()].join(" | "));
            out.push_str(" |\n");
        }
    }

    out.push('\n');
    out
}

/// Rows anywhere below the table (head/body wrappers included), skipping nested tables.
fn collect_rows<'a>(nodes: &'a [RenderedNode], rows: &mut Vec<&'a Element>) {
    for el in nodes.iter().filter_map(RenderedNode::as_element) {
        match el.kind {
            ElementKind::TableRow => rows.push(el),
            ElementKind::Table => {}
            _ => collect_rows(&el.children, rows),
        }
    }
}
