use super::*;
use crate::tree::{DiagramOutcome, RenderedNode as N};

fn el(kind: ElementKind, children: Vec<N>) -> N {
    N::element(kind, children)
}

fn text(s: &str) -> N {
    N::text(s)
}

fn doc(children: Vec<N>) -> String {
    to_text(&RenderedTree::new(children))
}

fn item(children: Vec<N>) -> N {
    el(ElementKind::ListItem { task: false }, children)
}

fn task(checked: bool, body: &str) -> N {
    el(
        ElementKind::ListItem { task: true },
        vec![
            N::leaf(ElementKind::Checkbox(CheckState::from_checked(checked))),
            text(body),
        ],
    )
}

#[test]
fn heading_and_inline_emphasis_keep_their_markers() {
    let out = doc(vec![
        el(ElementKind::Heading { level: 1 }, vec![text("Hi")]),
        el(
            ElementKind::Paragraph,
            vec![
                el(ElementKind::Bold, vec![text("bold")]),
                text(" and "),
                el(ElementKind::Italic, vec![text("em")]),
            ],
        ),
    ]);
    assert_eq!(out, "# Hi\n\n**bold** and *em*\n");
}

#[test]
fn heading_levels_and_trimming() {
    assert_eq!(
        doc(vec![el(ElementKind::Heading { level: 3 }, vec![text("  spaced  ")])]),
        "### spaced\n"
    );
    // Out-of-range levels are clamped rather than producing invalid markdown.
    assert_eq!(
        doc(vec![el(ElementKind::Heading { level: 9 }, vec![text("deep")])]),
        "###### deep\n"
    );
}

#[test]
fn wrapping_markers_do_not_trim() {
    let out = doc(vec![el(
        ElementKind::Paragraph,
        vec![
            el(ElementKind::Strikethrough, vec![text(" gone ")]),
            text("x"),
        ],
    )]);
    assert_eq!(out, "~~ gone ~~x\n");
}

#[test]
fn line_break_inside_paragraph() {
    let out = doc(vec![el(
        ElementKind::Paragraph,
        vec![text("one"), N::leaf(ElementKind::LineBreak), text("two")],
    )]);
    assert_eq!(out, "one\ntwo\n");
}

#[test]
fn inline_code_gets_backticks_outside_code_blocks_only() {
    let inline = doc(vec![el(
        ElementKind::Paragraph,
        vec![text("call "), el(ElementKind::InlineCode, vec![text("f()")])],
    )]);
    assert_eq!(inline, "call `f()`\n");

    let block = doc(vec![el(
        ElementKind::CodeBlock {
            language: Some("rust".into()),
        },
        vec![el(ElementKind::InlineCode, vec![text("fn main() {}\n\n  ")])],
    )]);
    assert_eq!(block, "```rust\nfn main() {}\n```\n");
}

#[test]
fn code_block_without_language_has_bare_fence() {
    let out = doc(vec![el(
        ElementKind::CodeBlock { language: None },
        vec![el(ElementKind::InlineCode, vec![text("plain\n")])],
    )]);
    assert_eq!(out, "```\nplain\n```\n");
}

#[test]
fn blockquote_prefixes_every_line() {
    let out = doc(vec![el(
        ElementKind::Blockquote,
        vec![el(
            ElementKind::Paragraph,
            vec![text("first"), N::leaf(ElementKind::LineBreak), text("second")],
        )],
    )]);
    assert_eq!(out, "> first\n> second\n");
}

#[test]
fn task_list_round_trips_markers() {
    let out = doc(vec![el(
        ElementKind::UnorderedList,
        vec![task(true, "done"), task(false, "todo")],
    )]);
    assert_eq!(out, "- [x] done\n- [ ] todo\n");
}

#[test]
fn indeterminate_checkbox_is_unchecked() {
    let out = doc(vec![el(
        ElementKind::UnorderedList,
        vec![el(
            ElementKind::ListItem { task: true },
            vec![
                N::leaf(ElementKind::Checkbox(CheckState::Indeterminate)),
                text("maybe"),
            ],
        )],
    )]);
    assert_eq!(out, "- [ ] maybe\n");
}

#[test]
fn ordered_list_renumbers_from_one() {
    let out = doc(vec![el(
        ElementKind::OrderedList { start: 7 },
        vec![item(vec![text("a")]), item(vec![text("b")]), item(vec![text("c")])],
    )]);
    assert_eq!(out, "1. a\n2. b\n3. c\n");
}

#[test]
fn list_skips_non_item_children_and_trims_loose_items() {
    let out = doc(vec![el(
        ElementKind::UnorderedList,
        vec![
            text("\n"),
            item(vec![el(ElementKind::Paragraph, vec![text("loose")])]),
            item(vec![text("  tight  ")]),
        ],
    )]);
    assert_eq!(out, "- loose\n- tight\n");
}

#[test]
fn nested_list_checkbox_does_not_leak_to_parent_item() {
    let out = doc(vec![el(
        ElementKind::UnorderedList,
        vec![item(vec![
            text("parent"),
            el(ElementKind::UnorderedList, vec![task(true, "child")]),
        ])],
    )]);
    assert_eq!(out, "- parent\n  - [x] child\n");
}

#[test]
fn nested_list_is_indented_by_parent_marker_width() {
    let out = doc(vec![el(
        ElementKind::OrderedList { start: 1 },
        vec![
            item(vec![
                el(ElementKind::Paragraph, vec![text("one")]),
                el(ElementKind::UnorderedList, vec![item(vec![text("sub")])]),
            ]),
            item(vec![text("two")]),
        ],
    )]);
    assert_eq!(out, "1. one\n   - sub\n2. two\n");
}

#[test]
fn pipes_in_table_cells_are_escaped() {
    let cell = |header: bool, s: &str| el(ElementKind::TableCell { header }, vec![text(s)]);
    let out = doc(vec![el(
        ElementKind::Table,
        vec![
            el(ElementKind::TableRow, vec![cell(true, "Op"), cell(true, "Meaning")]),
            el(ElementKind::TableRow, vec![cell(false, "a | b"), cell(false, "or")]),
        ],
    )]);
    assert_eq!(out, "| Op | Meaning |\n| ------ | ------ |\n| a \\| b | or |\n");
}

#[test]
fn list_followed_by_paragraph_is_separated_by_blank_line() {
    let out = doc(vec![
        el(ElementKind::UnorderedList, vec![item(vec![text("a")])]),
        el(ElementKind::Paragraph, vec![text("after")]),
    ]);
    assert_eq!(out, "- a\n\nafter\n");
}

#[test]
fn links_and_images() {
    let out = doc(vec![el(
        ElementKind::Paragraph,
        vec![
            el(
                ElementKind::Link {
                    href: Some("https://example.com".into()),
                },
                vec![text("site")],
            ),
            text(" "),
            el(ElementKind::Link { href: None }, vec![text("dangling")]),
            text(" "),
            N::leaf(ElementKind::Image {
                src: Some("a.png".into()),
                alt: "pic".into(),
            }),
        ],
    )]);
    assert_eq!(out, "[site](https://example.com) [dangling]() ![pic](a.png)\n");
}

#[test]
fn horizontal_rule() {
    let out = doc(vec![
        el(ElementKind::Paragraph, vec![text("above")]),
        N::leaf(ElementKind::HorizontalRule),
        el(ElementKind::Paragraph, vec![text("below")]),
    ]);
    assert_eq!(out, "above\n\n---\n\nbelow\n");
}

#[test]
fn table_gets_separator_after_first_row_only() {
    let cell = |header: bool, s: &str| el(ElementKind::TableCell { header }, vec![text(s)]);
    let out = doc(vec![el(
        ElementKind::Table,
        vec![
            el(ElementKind::TableRow, vec![cell(true, "Key"), cell(true, " Action ")]),
            el(
                ElementKind::Unknown { tag: "tbody".into() },
                vec![
                    el(ElementKind::TableRow, vec![cell(false, "O"), cell(false, "Open")]),
                    el(ElementKind::TableRow, vec![cell(false, "S"), cell(false, "Save")]),
                ],
            ),
        ],
    )]);
    assert_eq!(
        out,
        "| Key | Action |\n| ------ | ------ |\n| O | Open |\n| S | Save |\n"
    );
}

#[test]
fn table_without_rows_falls_back_to_children() {
    let out = doc(vec![el(ElementKind::Table, vec![text("orphan")])]);
    assert_eq!(out, "orphan\n");
}

#[test]
fn diagrams_are_dropped() {
    let out = doc(vec![
        el(ElementKind::Paragraph, vec![text("before")]),
        N::leaf(ElementKind::Diagram {
            id: "mermaid-1".into(),
            outcome: DiagramOutcome::Rendered {
                svg: "<svg>graph</svg>".into(),
            },
        }),
        el(
            ElementKind::Diagram {
                id: "mermaid-2".into(),
                outcome: DiagramOutcome::Failed {
                    message: "Parse error".into(),
                },
            },
            vec![text("Parse error")],
        ),
        el(ElementKind::Paragraph, vec![text("after")]),
    ]);
    assert_eq!(out, "before\n\nafter\n");
}

#[test]
fn unknown_elements_pass_children_through() {
    let out = doc(vec![el(
        ElementKind::Unknown { tag: "span".into() },
        vec![text("kept"), el(ElementKind::Bold, vec![text("!")])],
    )]);
    assert_eq!(out, "kept**!**\n");
}

#[test]
fn standalone_checkbox_and_item_emit_no_markers() {
    let out = doc(vec![
        N::leaf(ElementKind::Checkbox(CheckState::Checked)),
        item(vec![text("stray")]),
    ]);
    assert_eq!(out, "stray\n");
}

#[test]
fn empty_tree_is_a_single_newline() {
    assert_eq!(to_text(&RenderedTree::default()), "\n");
}

#[test]
fn surrounding_whitespace_is_trimmed() {
    assert_eq!(doc(vec![text("\n\n  body  \n\n")]), "body\n");
}

/// One sample per element kind. The match below has no wildcard, so adding a
/// kind without extending the samples fails to compile.
fn kind_samples() -> Vec<ElementKind> {
    let samples = vec![
        ElementKind::Heading { level: 2 },
        ElementKind::Paragraph,
        ElementKind::LineBreak,
        ElementKind::Bold,
        ElementKind::Italic,
        ElementKind::Strikethrough,
        ElementKind::InlineCode,
        ElementKind::CodeBlock { language: None },
        ElementKind::Blockquote,
        ElementKind::UnorderedList,
        ElementKind::OrderedList { start: 1 },
        ElementKind::ListItem { task: false },
        ElementKind::Link { href: None },
        ElementKind::Image {
            src: None,
            alt: String::new(),
        },
        ElementKind::HorizontalRule,
        ElementKind::Table,
        ElementKind::TableRow,
        ElementKind::TableCell { header: false },
        ElementKind::Checkbox(CheckState::Unchecked),
        ElementKind::Diagram {
            id: "d".into(),
            outcome: DiagramOutcome::Failed {
                message: "x".into(),
            },
        },
        ElementKind::Unknown { tag: "x".into() },
    ];
    for kind in &samples {
        match kind {
            ElementKind::Heading { .. }
            | ElementKind::Paragraph
            | ElementKind::LineBreak
            | ElementKind::Bold
            | ElementKind::Italic
            | ElementKind::Strikethrough
            | ElementKind::InlineCode
            | ElementKind::CodeBlock { .. }
            | ElementKind::Blockquote
            | ElementKind::UnorderedList
            | ElementKind::OrderedList { .. }
            | ElementKind::ListItem { .. }
            | ElementKind::Link { .. }
            | ElementKind::Image { .. }
            | ElementKind::HorizontalRule
            | ElementKind::Table
            | ElementKind::TableRow
            | ElementKind::TableCell { .. }
            | ElementKind::Checkbox(_)
            | ElementKind::Diagram { .. }
            | ElementKind::Unknown { .. } => {}
        }
    }
    samples
}

#[test]
fn only_transparent_kinds_behave_like_passthrough() {
    // Kinds whose rule is "children only" by definition, plus a row-less table.
    let transparent = ["list-item", "table", "table-row", "table-cell", "unknown"];
    for kind in kind_samples() {
        let name = kind.name();
        let converted = convert_element(&Element::with_children(kind, vec![text("x")]), None);
        if transparent.contains(&name) {
            assert_eq!(converted, "x", "{name} should pass children through");
        } else {
            assert_ne!(converted, "x", "{name} is silently falling back to passthrough");
        }
    }
}
