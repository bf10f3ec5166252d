use std::sync::Mutex;

use twinmark_common::RenderOptions;

use super::*;
use crate::convert::to_text;
use crate::tree::{CheckState, DiagramOutcome, ElementKind, RenderedNode as N};

fn render_sync(text: &str) -> RenderedTree {
    CmarkRenderer::new(&RenderOptions::default()).render(text)
}

fn el(kind: ElementKind, children: Vec<N>) -> N {
    N::element(kind, children)
}

/// Records every call; sources ending in a dangling arrow fail to parse.
#[derive(Default)]
struct RecordingRenderer {
    calls: Mutex<Vec<(String, String)>>,
}

impl DiagramRenderer for RecordingRenderer {
    async fn render(&self, source: &str, id: &str) -> Result<String, DiagramError> {
        self.calls.lock().unwrap().push((id.to_owned(), source.to_owned()));
        if source.trim_end().ends_with("-->") {
            Err(DiagramError::new("Parse error on line 2"))
        } else {
            Ok(format!("<svg id=\"{id}\"></svg>"))
        }
    }
}

#[test]
fn heading_and_inline_emphasis() {
    let tree = render_sync("# Hi\n\n**bold** and *em*");
    assert_eq!(
        tree,
        RenderedTree::new(vec![
            el(ElementKind::Heading { level: 1 }, vec![N::text("Hi")]),
            el(
                ElementKind::Paragraph,
                vec![
                    el(ElementKind::Bold, vec![N::text("bold")]),
                    N::text(" and "),
                    el(ElementKind::Italic, vec![N::text("em")]),
                ],
            ),
        ])
    );
    assert_eq!(to_text(&tree), "# Hi\n\n**bold** and *em*\n");
}

#[test]
fn task_list_items_get_checkboxes() {
    let tree = render_sync("- [x] done\n- [ ] todo");
    let expected = RenderedTree::new(vec![el(
        ElementKind::UnorderedList,
        vec![
            el(
                ElementKind::ListItem { task: true },
                vec![
                    N::leaf(ElementKind::Checkbox(CheckState::Checked)),
                    N::text("done"),
                ],
            ),
            el(
                ElementKind::ListItem { task: true },
                vec![
                    N::leaf(ElementKind::Checkbox(CheckState::Unchecked)),
                    N::text("todo"),
                ],
            ),
        ],
    )]);
    assert_eq!(tree, expected);
    assert_eq!(to_text(&tree), "- [x] done\n- [ ] todo\n");
}

#[test]
fn toggling_a_checkbox_changes_the_text() {
    let mut tree = render_sync("- [x] done\n- [ ] todo");
    let list = tree.children[0].as_element_mut().unwrap();
    let second = list.children[1].as_element_mut().unwrap();
    second.children[0] = N::leaf(ElementKind::Checkbox(CheckState::Checked));
    assert_eq!(to_text(&tree), "- [x] done\n- [x] todo\n");
}

#[test]
fn soft_breaks_follow_the_breaks_option() {
    let tree = render_sync("one\ntwo");
    assert_eq!(
        tree.children[0],
        el(
            ElementKind::Paragraph,
            vec![N::text("one"), N::leaf(ElementKind::LineBreak), N::text("two")],
        )
    );

    let options = RenderOptions {
        breaks: false,
        ..RenderOptions::default()
    };
    let tree = CmarkRenderer::new(&options).render("one\ntwo");
    assert_eq!(
        tree.children[0],
        el(ElementKind::Paragraph, vec![N::text("one\ntwo")])
    );
}

#[test]
fn code_block_holds_inline_code() {
    let tree = render_sync("```rust title\nfn main() {}\n```");
    assert_eq!(
        tree.children[0],
        el(
            ElementKind::CodeBlock {
                language: Some("rust".into()),
            },
            vec![el(ElementKind::InlineCode, vec![N::text("fn main() {}\n")])],
        )
    );
}

#[test]
fn table_head_cells_are_headers() {
    let tree = render_sync("| Key | Action |\n|---|---|\n| O | Open |");
    let table = tree.children[0].as_element().unwrap();
    assert_eq!(table.kind, ElementKind::Table);
    let mut headers = Vec::new();
    tree.for_each_element(|el| {
        if let ElementKind::TableCell { header } = el.kind {
            headers.push((header, el.text_content()));
        }
    });
    assert_eq!(
        headers,
        [
            (true, "Key".to_owned()),
            (true, "Action".to_owned()),
            (false, "O".to_owned()),
            (false, "Open".to_owned()),
        ]
    );
    assert_eq!(
        to_text(&tree),
        "| Key | Action |\n| ------ | ------ |\n| O | Open |\n"
    );
}

#[test]
fn images_carry_alt_text_without_children() {
    let tree = render_sync("![a *pic*](p.png)");
    let para = tree.children[0].as_element().unwrap();
    assert_eq!(
        para.children,
        vec![N::leaf(ElementKind::Image {
            src: Some("p.png".into()),
            alt: "a pic".into(),
        })]
    );
}

#[test]
fn raw_html_stays_text() {
    let tree = render_sync("a <b>b</b>");
    assert!(tree.to_html().contains("&lt;b&gt;b&lt;/b&gt;"));
    let mut elements = 0;
    tree.for_each_element(|el| {
        if el.kind != ElementKind::Paragraph {
            elements += 1;
        }
    });
    assert_eq!(elements, 0);
}

#[test]
fn function_can_stand_in_for_the_builder() {
    let stub = |text: &str| RenderedTree::new(vec![N::text(text.to_uppercase())]);
    assert_eq!(stub.render("abc").text_content(), "ABC");
}

#[tokio::test]
async fn failed_diagram_becomes_error_marker_and_is_dropped_on_convert() {
    let mut pipeline =
        RenderPipeline::new(&RenderOptions::default()).with_diagram_renderer(RecordingRenderer::default());
    let tree = pipeline.render("```mermaid\ngraph TD\n  A-->\n```").await;

    assert_eq!(tree.children.len(), 1);
    match tree.children[0].kind() {
        Some(ElementKind::Diagram {
            id,
            outcome: DiagramOutcome::Failed { message },
        }) => {
            assert_eq!(id, "mermaid-1");
            assert!(message.contains("Parse error"), "{message}");
        }
        other => panic!("expected failed diagram, got {other:?}"),
    }
    assert_eq!(to_text(&tree), "\n");
}

#[tokio::test]
async fn diagrams_render_sequentially_with_session_unique_ids() {
    let mut pipeline = RenderPipeline::from_parts(
        CmarkRenderer::new(&RenderOptions::default()),
        RecordingRenderer::default(),
        "mermaid",
    );
    let text = "```mermaid\ngraph A\n```\n\n- item\n\n  ```mermaid\n  graph B\n  ```\n\n```rust\nnot a diagram\n```";
    let tree = pipeline.render(text).await;
    pipeline.render("```mermaid\ngraph C\n```").await;

    let calls = pipeline.diagrams.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        [
            ("mermaid-1".to_owned(), "graph A\n".to_owned()),
            ("mermaid-2".to_owned(), "graph B\n".to_owned()),
            ("mermaid-3".to_owned(), "graph C\n".to_owned()),
        ]
    );
    assert_eq!(pipeline.diagrams_issued(), 3);

    let mut rendered = Vec::new();
    tree.for_each_element(|el| {
        if let ElementKind::Diagram {
            id,
            outcome: DiagramOutcome::Rendered { svg },
        } = &el.kind
        {
            rendered.push((id.to_string(), svg.clone()));
        }
    });
    assert_eq!(
        rendered,
        [
            ("mermaid-1".to_owned(), "<svg id=\"mermaid-1\"></svg>".to_owned()),
            ("mermaid-2".to_owned(), "<svg id=\"mermaid-2\"></svg>".to_owned()),
        ]
    );
    assert!(to_text(&tree).contains("```rust\nnot a diagram\n```"));
}

#[tokio::test]
async fn one_failure_does_not_affect_other_diagrams() {
    let mut pipeline =
        RenderPipeline::new(&RenderOptions::default()).with_diagram_renderer(RecordingRenderer::default());
    let tree = pipeline
        .render("```mermaid\nA-->\n```\n\n```mermaid\ngraph ok\n```")
        .await;
    let outcomes: Vec<_> = tree
        .children
        .iter()
        .filter_map(|node| match node.kind() {
            Some(ElementKind::Diagram { outcome, .. }) => Some(matches!(outcome, DiagramOutcome::Rendered { .. })),
            _ => None,
        })
        .collect();
    assert_eq!(outcomes, [false, true]);
}

#[tokio::test]
async fn without_a_renderer_every_diagram_fails() {
    let mut pipeline = RenderPipeline::new(&RenderOptions::default());
    let tree = pipeline.render("```mermaid\ngraph TD\n```").await;
    assert!(matches!(
        tree.children[0].kind(),
        Some(ElementKind::Diagram {
            outcome: DiagramOutcome::Failed { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn diagram_source_is_lost_on_round_trip() {
    let mut pipeline =
        RenderPipeline::new(&RenderOptions::default()).with_diagram_renderer(RecordingRenderer::default());
    let tree = pipeline.render("before\n\n```mermaid\ngraph TD\n```\n\nafter").await;
    assert_eq!(to_text(&tree), "before\n\nafter\n");
}

const CANONICAL: &str = "# Title

Some **bold**, *italic* and ~~struck~~ text with `code`.

> quoted
> twice

- one
- two

1. first
2. second

- [x] shipped
- [ ] pending

```rust
fn main() {}
```

[link](https://example.com) ![alt](img.png)

---

| a | b |
| ------ | ------ |
| 1 | 2 |

end";

#[test]
fn canonical_text_round_trips() {
    let tree = render_sync(CANONICAL);
    assert_eq!(to_text(&tree).trim(), CANONICAL.trim());
}

#[test]
fn nested_lists_round_trip() {
    for source in [
        "- a\n  - b\n- c\n",
        "1. one\n   - sub\n2. two\n",
        "- [ ] parent\n  - [x] child\n",
    ] {
        assert_eq!(to_text(&render_sync(source)), source);
    }
}

#[test]
fn escaped_pipe_in_table_cell_round_trips() {
    let source = "| x | y |\n| ------ | ------ |\n| a \\| b | c |\n";
    let tree = render_sync(source);
    assert_eq!(to_text(&tree), source);
}

#[test]
fn convert_after_render_is_idempotent() {
    let messy = "Heading\n=======\n\n    indented code\n\n* one\n* two\n\n3. three\n4. four\n\n***\n\n|x|y|\n|:-|-:|\n|1|2|\n";
    let once = to_text(&render_sync(messy));
    let twice = to_text(&render_sync(&once));
    assert_eq!(once, twice);
    assert_eq!(render_sync(&once), render_sync(&twice));
    assert!(
        once.starts_with("# Heading\n\n```\nindented code\n```\n\n- one\n- two\n\n1. three\n2. four\n\n---\n"),
        "{once}"
    );
}
