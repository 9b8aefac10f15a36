//! Outline Processor Markup Language (OPML 2.0).
//!
//! Each node is an `<outline text=".."/>` element nested inside `<body>`;
//! collapsed nodes carry `_collapsed="true"`. Import reads the `text`
//! attribute and falls back to `title`; elements outside `<body>` are ignored.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{instrument, trace};

use crate::application::error_ext::FormatResultExt;
use crate::application::format::{FormatKind, OutlineFormat};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Node, NodeRef, Tree};

const OPML_VERSION: &str = "2.0";
const OUTLINE: &[u8] = b"outline";
const BODY: &[u8] = b"body";
const COLLAPSED_ATTR: &str = "_collapsed";

#[derive(Debug, Clone, Default)]
pub struct OpmlFormat;

impl OpmlFormat {
    pub fn new() -> Self {
        Self
    }
}

/// An `<outline>` whose end tag has not been read yet.
struct PendingOutline {
    node: Node,
    children: Vec<Node>,
}

impl PendingOutline {
    fn into_node(self) -> Node {
        self.node.with_children(self.children)
    }
}

fn outline_node(element: &BytesStart<'_>) -> ApplicationResult<Node> {
    let mut text = None;
    let mut title = None;
    let mut collapsed = false;

    for attribute in element.attributes() {
        let attribute = attribute.for_format(FormatKind::Opml)?;
        let value = attribute.unescape_value().for_format(FormatKind::Opml)?;
        match attribute.key.as_ref() {
            b"text" => text = Some(value.into_owned()),
            b"title" => title = Some(value.into_owned()),
            key if key == COLLAPSED_ATTR.as_bytes() => collapsed = value == "true",
            _ => {}
        }
    }

    let title = text.or(title).unwrap_or_default();
    trace!("opml outline: {:?}", title);
    Ok(Node::new(title).with_collapsed(collapsed))
}

fn write_event<'a>(
    writer: &mut Writer<Vec<u8>>,
    event: impl Into<Event<'a>>,
) -> ApplicationResult<()> {
    writer.write_event(event).for_format(FormatKind::Opml)
}

fn write_outlines(writer: &mut Writer<Vec<u8>>, nodes: &[NodeRef]) -> ApplicationResult<()> {
    for node in nodes {
        let mut element = BytesStart::new("outline");
        element.push_attribute(("text", node.title()));
        if node.is_collapsed() {
            element.push_attribute((COLLAPSED_ATTR, "true"));
        }
        match node.children() {
            Some(children) => {
                write_event(writer, Event::Start(element))?;
                write_outlines(writer, children)?;
                write_event(writer, Event::End(BytesEnd::new("outline")))?;
            }
            None => write_event(writer, Event::Empty(element))?,
        }
    }
    Ok(())
}

impl OutlineFormat for OpmlFormat {
    fn kind(&self) -> FormatKind {
        FormatKind::Opml
    }

    #[instrument(level = "debug", skip_all, fields(len = content.len()))]
    fn import_content(&self, content: &str) -> ApplicationResult<Tree> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut roots: Vec<Node> = Vec::new();
        let mut open: Vec<PendingOutline> = Vec::new();
        let mut in_body = false;
        let mut saw_body = false;

        loop {
            match reader.read_event().for_format(FormatKind::Opml)? {
                Event::Start(e) if e.name().as_ref() == BODY => {
                    in_body = true;
                    saw_body = true;
                }
                Event::Empty(e) if e.name().as_ref() == BODY => saw_body = true,
                Event::End(e) if e.name().as_ref() == BODY => in_body = false,
                Event::Start(e) if in_body && e.name().as_ref() == OUTLINE => {
                    open.push(PendingOutline {
                        node: outline_node(&e)?,
                        children: Vec::new(),
                    });
                }
                Event::Empty(e) if in_body && e.name().as_ref() == OUTLINE => {
                    let node = outline_node(&e)?;
                    match open.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => roots.push(node),
                    }
                }
                Event::End(e) if in_body && e.name().as_ref() == OUTLINE => {
                    if let Some(finished) = open.pop() {
                        let node = finished.into_node();
                        match open.last_mut() {
                            Some(parent) => parent.children.push(node),
                            None => roots.push(node),
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !open.is_empty() {
            return Err(ApplicationError::format(
                FormatKind::Opml,
                "unclosed <outline> element",
            ));
        }
        if !saw_body {
            return Err(ApplicationError::format(FormatKind::Opml, "no <body> element"));
        }
        Ok(Tree::new(roots))
    }

    #[instrument(level = "debug", skip_all)]
    fn export_outline(&self, tree: &Tree) -> ApplicationResult<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        write_event(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_event(
            &mut writer,
            Event::Start(BytesStart::new("opml").with_attributes([("version", OPML_VERSION)])),
        )?;
        write_event(&mut writer, Event::Empty(BytesStart::new("head")))?;
        write_event(&mut writer, Event::Start(BytesStart::new("body")))?;
        write_outlines(&mut writer, tree.roots())?;
        write_event(&mut writer, Event::End(BytesEnd::new("body")))?;
        write_event(&mut writer, Event::End(BytesEnd::new("opml")))?;

        String::from_utf8(writer.into_inner()).for_format(FormatKind::Opml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<opml version="2.0">
  <head>
    <title>states.opml</title>
    <expansionState>1,6,13</expansionState>
  </head>
  <body>
    <outline text="United States">
      <outline text="Far West">
        <outline text="Alaska"/>
        <outline text="California"/>
      </outline>
      <outline text="Great Plains" _collapsed="true">
        <outline text="Kansas"/>
      </outline>
      <outline title="New England"/>
    </outline>
  </body>
</opml>
"#;

    #[test]
    fn given_nested_outlines_when_importing_then_builds_forest() {
        let tree = OpmlFormat::new().import_content(STATES).unwrap();

        let titles: Vec<&str> = tree.iter().map(|(_, n)| n.title()).collect();
        assert_eq!(
            titles,
            vec![
                "United States",
                "Far West",
                "Alaska",
                "California",
                "Great Plains",
                "Kansas",
                "New England",
            ]
        );
        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.roots()[0].child_count(), 3);
    }

    #[test]
    fn given_collapsed_attribute_when_importing_then_flag_is_kept() {
        let tree = OpmlFormat::new().import_content(STATES).unwrap();
        let collapsed: Vec<&str> = tree
            .iter()
            .filter(|(_, n)| n.is_collapsed())
            .map(|(_, n)| n.title())
            .collect();
        assert_eq!(collapsed, vec!["Great Plains"]);
    }

    #[test]
    fn given_tree_when_exporting_then_writes_nested_outline_elements() {
        let tree = Tree::new([
            Node::new("A")
                .with_collapsed(true)
                .with_children([Node::new("B")]),
            Node::new("a & \"b\" <c>"),
        ]);

        let text = OpmlFormat::new().export_outline(&tree).unwrap();

        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("<opml version=\"2.0\">"));
        assert!(text.contains("<outline text=\"A\" _collapsed=\"true\">"));
        assert!(text.contains("<outline text=\"B\"/>"));
        assert!(text.contains("text=\"a &amp; &quot;b&quot; &lt;c&gt;\""));
    }

    #[test]
    fn given_export_when_importing_then_tree_is_identical() {
        let tree = Tree::new([
            Node::new("A")
                .with_collapsed(true)
                .with_children([Node::new("B").with_children([Node::new("C")])]),
            Node::new("  spaced  & 'quoted'  "),
        ]);
        let format = OpmlFormat::new();

        let text = format.export_outline(&tree).unwrap();

        assert_eq!(format.import_content(&text).unwrap(), tree);
    }

    #[test]
    fn given_empty_body_when_importing_then_empty_tree() {
        let text = "<opml version=\"2.0\"><head/><body/></opml>";
        assert!(OpmlFormat::new().import_content(text).unwrap().is_empty());
    }

    #[test]
    fn given_mismatched_tags_when_importing_then_format_error() {
        let text = "<opml><body><outline text=\"A\"></body></opml>";
        let result = OpmlFormat::new().import_content(text);
        assert!(matches!(
            result,
            Err(ApplicationError::Format {
                format: FormatKind::Opml,
                ..
            })
        ));
    }

    #[test]
    fn given_document_without_body_when_importing_then_format_error() {
        let result = OpmlFormat::new().import_content("<opml><head/></opml>");
        assert!(matches!(
            result,
            Err(ApplicationError::Format {
                format: FormatKind::Opml,
                ..
            })
        ));
    }
}
