//! HTML serialization of the rendered tree.
//!
//! Web hosts set the preview container's content to this markup. Text and
//! attribute values are escaped; diagram vector markup is emitted verbatim.

use std::fmt::{self, Write as _};

use pulldown_cmark_escape::{FmtWriter, escape_href, escape_html};

use crate::tree::{CheckState, DiagramOutcome, Element, ElementKind, RenderedNode, RenderedTree};

/// CSS class on the list item that holds a checkbox.
pub const TASK_ITEM_CLASS: &str = "task-list-item";
/// CSS class on a rendered diagram container.
pub const DIAGRAM_CLASS: &str = "mermaid-diagram";
/// CSS class on the inline error shown in place of a diagram that failed.
pub const DIAGRAM_ERROR_CLASS: &str = "mermaid-error";

impl RenderedTree {
    /// Serialize to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = write_nodes(&mut out, &self.children);
        out
    }
}

/// Serialize a node sequence into `out`.
pub fn write_nodes(out: &mut String, nodes: &[RenderedNode]) -> fmt::Result {
    for node in nodes {
        match node {
            RenderedNode::Text(text) => escape_html(FmtWriter(&mut *out), text)?,
            RenderedNode::Element(el) => write_element(out, el)?,
        }
    }
    Ok(())
}

fn write_element(out: &mut String, el: &Element) -> fmt::Result {
    match &el.kind {
        ElementKind::Heading { level } => {
            let level = (*level).clamp(1, 6);
            write!(out, "<h{level}>")?;
            write_nodes(out, &el.children)?;
            writeln!(out, "</h{level}>")
        }
        ElementKind::Paragraph => wrap(out, "<p>", &el.children, "</p>\n"),
        ElementKind::LineBreak => out.write_str("<br>\n"),
        ElementKind::Bold => wrap(out, "<strong>", &el.children, "</strong>"),
        ElementKind::Italic => wrap(out, "<em>", &el.children, "</em>"),
        ElementKind::Strikethrough => wrap(out, "<del>", &el.children, "</del>"),
        ElementKind::InlineCode => wrap(out, "<code>", &el.children, "</code>"),
        ElementKind::CodeBlock { language } => {
            out.write_str("<pre><code")?;
            if let Some(lang) = language.as_deref().filter(|l| !l.is_empty()) {
                out.write_str(" class=\"language-")?;
                escape_html(FmtWriter(&mut *out), lang)?;
                out.write_char('"')?;
            }
            out.write_char('>')?;
            escape_html(FmtWriter(&mut *out), &el.text_content())?;
            out.write_str("</code></pre>\n")
        }
        ElementKind::Blockquote => wrap(out, "<blockquote>\n", &el.children, "</blockquote>\n"),
        ElementKind::UnorderedList => wrap(out, "<ul>\n", &el.children, "</ul>\n"),
        ElementKind::OrderedList { start } => {
            if *start == 1 {
                out.write_str("<ol>\n")?;
            } else {
                writeln!(out, "<ol start=\"{start}\">")?;
            }
            write_nodes(out, &el.children)?;
            out.write_str("</ol>\n")
        }
        ElementKind::ListItem { task } => {
            if *task {
                write!(out, "<li class=\"{TASK_ITEM_CLASS}\">")?;
            } else {
                out.write_str("<li>")?;
            }
            write_nodes(out, &el.children)?;
            out.write_str("</li>\n")
        }
        ElementKind::Link { href } => {
            out.write_str("<a")?;
            if let Some(href) = href {
                out.write_str(" href=\"")?;
                escape_href(FmtWriter(&mut *out), href)?;
                out.write_char('"')?;
            }
            out.write_char('>')?;
            write_nodes(out, &el.children)?;
            out.write_str("</a>")
        }
        ElementKind::Image { src, alt } => {
            out.write_str("<img src=\"")?;
            if let Some(src) = src {
                escape_href(FmtWriter(&mut *out), src)?;
            }
            out.write_str("\" alt=\"")?;
            escape_html(FmtWriter(&mut *out), alt)?;
            out.write_str("\">")
        }
        ElementKind::HorizontalRule => out.write_str("<hr>\n"),
        ElementKind::Table => wrap(out, "<table>\n", &el.children, "</table>\n"),
        ElementKind::TableRow => wrap(out, "<tr>", &el.children, "</tr>\n"),
        ElementKind::TableCell { header: true } => wrap(out, "<th>", &el.children, "</th>"),
        ElementKind::TableCell { header: false } => wrap(out, "<td>", &el.children, "</td>"),
        ElementKind::Checkbox(state) => {
            out.write_str("<input type=\"checkbox\" disabled")?;
            if *state == CheckState::Checked {
                out.write_str(" checked")?;
            }
            out.write_char('>')
        }
        ElementKind::Diagram { id, outcome } => {
            let class = match outcome {
                DiagramOutcome::Rendered { .. } => DIAGRAM_CLASS,
                DiagramOutcome::Failed { .. } => DIAGRAM_ERROR_CLASS,
            };
            write!(out, "<div class=\"{class}\" data-diagram-id=\"")?;
            escape_html(FmtWriter(&mut *out), id)?;
            out.write_str("\">")?;
            match outcome {
                DiagramOutcome::Rendered { svg } => out.write_str(svg)?,
                DiagramOutcome::Failed { message } => {
                    escape_html(FmtWriter(&mut *out), message)?
                }
            }
            out.write_str("</div>\n")
        }
        ElementKind::Unknown { .. } => wrap(out, "<div>", &el.children, "</div>"),
    }
}

fn wrap(out: &mut String, open: &str, children: &[RenderedNode], close: &str) -> fmt::Result {
    out.write_str(open)?;
    write_nodes(out, children)?;
    out.write_str(close)
}
