//! Outline-markup encoding as nested Markdown bullet lists.
//!
//! Export writes one `- title` line per node, indented per depth. Import
//! accepts any CommonMark list (`-`, `*`, `+` or ordered markers) and ignores
//! content outside lists. The `collapsed` flag has no representation here and
//! is dropped; inline formatting is reduced to its text.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use tracing::{instrument, trace};

use crate::application::format::{FormatKind, OutlineFormat};
use crate::application::ApplicationResult;
use crate::domain::{Node, NodeRef, Tree};

const MIN_INDENT: usize = 2;
const MAX_INDENT: usize = 4;

#[derive(Debug, Clone)]
pub struct MarkdownFormat {
    indent: usize,
}

impl Default for MarkdownFormat {
    fn default() -> Self {
        Self::new(MIN_INDENT)
    }
}

impl MarkdownFormat {
    /// `indent` outside 2..=4 would break list nesting and is clamped.
    pub fn new(indent: usize) -> Self {
        Self {
            indent: indent.clamp(MIN_INDENT, MAX_INDENT),
        }
    }

    fn write_nodes(&self, out: &mut String, nodes: &[NodeRef], depth: usize) {
        for node in nodes {
            out.push_str(&" ".repeat(depth * self.indent));
            out.push_str("- ");
            out.push_str(&escape_title(node.title()));
            out.push('\n');
            if let Some(children) = node.children() {
                self.write_nodes(out, children, depth + 1);
            }
        }
    }
}

#[derive(Default)]
struct PendingItem {
    title: String,
    children: Vec<Node>,
}

impl OutlineFormat for MarkdownFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Markdown
    }

    #[instrument(level = "debug", skip_all, fields(len = content.len()))]
    fn import_content(&self, content: &str) -> ApplicationResult<Tree> {
        let mut roots: Vec<Node> = Vec::new();
        let mut lists: Vec<Vec<Node>> = Vec::new();
        let mut items: Vec<PendingItem> = Vec::new();

        for event in Parser::new(content) {
            match event {
                Event::Start(Tag::List(_)) => lists.push(Vec::new()),
                Event::End(TagEnd::List(_)) => {
                    let finished = lists.pop().unwrap_or_default();
                    // A nested list belongs to the item that contains it.
                    match items.last_mut() {
                        Some(item) => item.children.extend(finished),
                        None => roots.extend(finished),
                    }
                }
                Event::Start(Tag::Item) => items.push(PendingItem::default()),
                Event::End(TagEnd::Item) => {
                    if let (Some(item), Some(list)) = (items.pop(), lists.last_mut()) {
                        trace!("markdown item: {:?}", item.title);
                        list.push(Node::new(item.title.trim()).with_children(item.children));
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some(item) = items.last_mut() {
                        item.title.push_str(&text);
                    }
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some(item) = items.last_mut() {
                        item.title.push(' ');
                    }
                }
                _ => {}
            }
        }

        Ok(Tree::new(roots))
    }

    #[instrument(level = "debug", skip_all)]
    fn export_outline(&self, tree: &Tree) -> ApplicationResult<String> {
        let mut out = String::new();
        self.write_nodes(&mut out, tree.roots(), 0);
        Ok(out)
    }
}

/// Keep a title on one line and stop it from being read as markup.
fn escape_title(title: &str) -> String {
    let single_line = title.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut escaped = String::with_capacity(single_line.len());
    for (i, c) in single_line.chars().enumerate() {
        let leading = i == 0 && matches!(c, '#' | '>' | '+' | '-' | '=');
        let markup = matches!(c, '\\' | '`' | '~' | '*' | '_' | '[' | ']' | '<' | '&' | '!');
        if leading || markup {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escape_ordered_marker(escaped)
}

/// `1. x` or `1) x` at the start of a title would open an ordered list.
fn escape_ordered_marker(title: String) -> String {
    let digits = title.chars().take_while(|c| c.is_ascii_digit()).count();
    match title[digits..].chars().next() {
        Some(marker @ ('.' | ')')) if digits > 0 => {
            format!("{}\\{}{}", &title[..digits], marker, &title[digits + 1..])
        }
        _ => title,
    }
}
