//! Markdown to rendered tree, on top of pulldown-cmark.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use smol_str::SmolStr;
use twinmark_common::RenderOptions;

use super::MarkdownRenderer;
use super::tasks::apply_task_list_rule;
use crate::tree::{CheckState, Element, ElementKind, RenderedNode, RenderedTree};

/// Default markdown renderer.
///
/// Builds the tree straight from parser events, then runs the task-list rule.
#[derive(Debug, Clone, Default)]
pub struct CmarkRenderer {
    breaks: bool,
    smart_punctuation: bool,
}

impl CmarkRenderer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            breaks: options.breaks,
            smart_punctuation: options.smart_punctuation,
        }
    }

    fn parser_options(&self) -> Options {
        let mut options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        if self.smart_punctuation {
            options |= Options::ENABLE_SMART_PUNCTUATION;
        }
        options
    }
}

impl MarkdownRenderer for CmarkRenderer {
    fn render(&self, text: &str) -> RenderedTree {
        let mut builder = TreeBuilder::new(self.breaks);
        for event in Parser::new_ext(text, self.parser_options()) {
            builder.push(event);
        }
        let mut tree = builder.finish();
        apply_task_list_rule(&mut tree);
        tree
    }
}

struct Frame {
    kind: ElementKind,
    children: Vec<RenderedNode>,
}

/// Stack machine turning start/end events into nested elements.
struct TreeBuilder {
    root: Vec<RenderedNode>,
    stack: Vec<Frame>,
    breaks: bool,
    in_table_head: bool,
}

impl TreeBuilder {
    fn new(breaks: bool) -> Self {
        Self {
            root: Vec::new(),
            stack: Vec::new(),
            breaks,
            in_table_head: false,
        }
    }

    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(TagEnd::TableHead) => {
                self.in_table_head = false;
                self.close();
            }
            Event::End(_) => self.close(),
            Event::Text(text) => self.push_text(&text),
            Event::Code(code) => self.push_node(RenderedNode::element(
                ElementKind::InlineCode,
                vec![RenderedNode::text(code.as_ref())],
            )),
            // Raw HTML is shown, never interpreted.
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html),
            Event::SoftBreak if self.breaks => self.push_node(RenderedNode::leaf(ElementKind::LineBreak)),
            Event::SoftBreak => self.push_text("\n"),
            Event::HardBreak => self.push_node(RenderedNode::leaf(ElementKind::LineBreak)),
            Event::Rule => self.push_node(RenderedNode::leaf(ElementKind::HorizontalRule)),
            Event::TaskListMarker(checked) => self.push_node(RenderedNode::leaf(
                ElementKind::Checkbox(CheckState::from_checked(checked)),
            )),
            // Footnotes and math are not enabled.
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let kind = match tag {
            Tag::Paragraph => ElementKind::Paragraph,
            Tag::Heading { level, .. } => ElementKind::Heading { level: level as u8 },
            Tag::BlockQuote(_) => ElementKind::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => ElementKind::CodeBlock {
                language: info.split_whitespace().next().map(SmolStr::new),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => ElementKind::CodeBlock { language: None },
            Tag::List(Some(start)) => ElementKind::OrderedList { start },
            Tag::List(None) => ElementKind::UnorderedList,
            Tag::Item => ElementKind::ListItem { task: false },
            Tag::Emphasis => ElementKind::Italic,
            Tag::Strong => ElementKind::Bold,
            Tag::Strikethrough => ElementKind::Strikethrough,
            Tag::Link { dest_url, .. } => ElementKind::Link {
                href: Some(dest_url.to_string()),
            },
            Tag::Image { dest_url, .. } => ElementKind::Image {
                src: Some(dest_url.to_string()),
                alt: String::new(),
            },
            Tag::Table(_) => ElementKind::Table,
            // The head row's cells arrive directly under TableHead.
            Tag::TableHead => {
                self.in_table_head = true;
                ElementKind::TableRow
            }
            Tag::TableRow => ElementKind::TableRow,
            Tag::TableCell => ElementKind::TableCell {
                header: self.in_table_head,
            },
            Tag::HtmlBlock => ElementKind::Unknown {
                tag: SmolStr::new_static("html"),
            },
            _ => ElementKind::Unknown {
                tag: SmolStr::new_static("div"),
            },
        };
        self.stack.push(Frame {
            kind,
            children: Vec::new(),
        });
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            tracing::trace!("unbalanced end event ignored");
            return;
        };
        let node = match frame.kind {
            ElementKind::Image { src, .. } => {
                let alt = Element::with_children(ElementKind::Paragraph, frame.children).text_content();
                RenderedNode::leaf(ElementKind::Image { src, alt })
            }
            kind @ ElementKind::CodeBlock { .. } => {
                let code = RenderedNode::element(ElementKind::InlineCode, frame.children);
                RenderedNode::element(kind, vec![code])
            }
            kind => RenderedNode::element(kind, frame.children),
        };
        self.push_node(node);
    }

    fn children(&mut self) -> &mut Vec<RenderedNode> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    fn push_node(&mut self, node: RenderedNode) {
        self.children().push(node);
    }

    /// Appends to the previous text leaf when there is one, so a run of text
    /// is always a single leaf.
    fn push_text(&mut self, text: &str) {
        let children = self.children();
        if let Some(RenderedNode::Text(last)) = children.last_mut() {
            last.push_str(text);
        } else {
            children.push(RenderedNode::text(text));
        }
    }

    fn finish(mut self) -> RenderedTree {
        while !self.stack.is_empty() {
            self.close();
        }
        RenderedTree::new(self.root)
    }
}
