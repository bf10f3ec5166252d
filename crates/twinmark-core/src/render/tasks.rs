//! Task-list post-processing.
//!
//! A list item whose first text (directly, or inside its first paragraph)
//! starts with `[ ] `, `[x] ` or `[X] ` becomes a task item: the marker is
//! stripped and a checkbox is inserted in its place.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{CheckState, ElementKind, RenderedNode, RenderedTree};

static TASK_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([ xX])\]\s").unwrap());

/// Rewrite every matching list item in the tree.
pub fn apply_task_list_rule(tree: &mut RenderedTree) {
    visit(&mut tree.children);
}

fn visit(nodes: &mut [RenderedNode]) {
    for node in nodes {
        let RenderedNode::Element(el) = node else {
            continue;
        };
        if let ElementKind::ListItem { task } = &mut el.kind {
            if let Some(state) = strip_marker(&mut el.children) {
                *task = true;
                tracing::trace!(checked = state.is_checked(), "task item");
            }
        }
        visit(&mut el.children);
    }
}

/// Strip the marker from an item's leading text, inserting the checkbox.
fn strip_marker(item: &mut Vec<RenderedNode>) -> Option<CheckState> {
    let in_paragraph = matches!(
        item.first(),
        Some(RenderedNode::Element(p)) if p.kind == ElementKind::Paragraph
    );
    let inline = if in_paragraph {
        match item.first_mut() {
            Some(RenderedNode::Element(p)) => &mut p.children,
            _ => return None,
        }
    } else {
        item
    };

    let (state, marker_len) = {
        let Some(RenderedNode::Text(first)) = inline.first() else {
            return None;
        };
        let caps = TASK_MARKER.captures(first)?;
        (CheckState::from_checked(&caps[1] != " "), caps[0].len())
    };

    let emptied = match inline.first_mut() {
        Some(RenderedNode::Text(first)) => {
            first.drain(..marker_len);
            first.is_empty()
        }
        _ => false,
    };
    if emptied {
        inline.remove(0);
    }
    inline.insert(0, RenderedNode::leaf(ElementKind::Checkbox(state)));
    Some(state)
}
