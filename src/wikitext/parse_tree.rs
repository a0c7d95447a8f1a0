//! The externally-supplied tagged tree consumed by the parser.
//!
//! The remote renderer (`action=parse&prop=parsetree`) returns the already
//! structurally parsed form of a page as an XML document: a `root` element
//! containing `template` elements (with `title` and `part` children) mixed
//! with plain text and other markup tags. `ParseTreeNode` is that tree,
//! with ElementTree-style placement of character data: `text` is the content
//! before a node's first child, and each child's `tail` is the content
//! between it and the next sibling.
//!
//! `from_xml` builds the tree from the raw payload with a streaming
//! quick-xml event loop. Whitespace is significant in wikitext, so no text
//! trimming is performed.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::wikitext::errors::{Result, WikiError};

/// One element of the renderer's tagged tree.
#[derive(Debug, Clone, Default)]
pub struct ParseTreeNode {
    /// Element tag, e.g. `root`, `template`, `title`, `part`, `comment`.
    pub tag: String,
    /// Attributes in document order, e.g. `index` on an unnamed `part`'s
    /// `name` child.
    pub attrs: Vec<(String, String)>,
    /// Character data before the first child.
    pub text: Option<String>,
    /// Character data between this node and its next sibling.
    pub tail: Option<String>,
    /// Child elements in document order.
    pub children: Vec<ParseTreeNode>,
}

impl ParseTreeNode {
    /// Create an empty node with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Look up an attribute by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Build a tagged tree from a parsetree XML payload. Expects exactly one
    /// root element; fails with a `Parse` error on malformed input.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<ParseTreeNode> = Vec::new();
        let mut root: Option<ParseTreeNode> = None;

        loop {
            match reader.read_event() {
                Err(e) => {
                    return Err(WikiError::parse(format!("malformed parse tree xml: {}", e)));
                }
                Ok(Event::Start(start)) => stack.push(node_from_start(&start)?),
                Ok(Event::Empty(start)) => {
                    let node = node_from_start(&start)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::End(_)) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| WikiError::parse("unbalanced closing tag in parse tree xml"))?;
                    attach(&mut stack, &mut root, node)?;
                }
                Ok(Event::Text(text)) => {
                    let content = text
                        .unescape()
                        .map_err(|e| WikiError::parse(format!("bad character data: {}", e)))?;
                    add_text(&mut stack, &content);
                }
                Ok(Event::CData(data)) => {
                    let content = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    add_text(&mut stack, &content);
                }
                Ok(Event::Eof) => {
                    if !stack.is_empty() {
                        return Err(WikiError::parse("unexpected end of parse tree xml"));
                    }
                    break;
                }
                Ok(_) => {} // declarations, comments, processing instructions
            }
        }

        root.ok_or_else(|| WikiError::parse("parse tree xml contained no root element"))
    }
}

fn node_from_start(start: &BytesStart<'_>) -> Result<ParseTreeNode> {
    let mut node = ParseTreeNode::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| WikiError::parse(format!("bad attribute: {}", e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| WikiError::parse(format!("bad attribute value: {}", e)))?
            .into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

/// Hand a completed node to its parent, or make it the root.
fn attach(
    stack: &mut Vec<ParseTreeNode>,
    root: &mut Option<ParseTreeNode>,
    node: ParseTreeNode,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err(WikiError::parse("parse tree xml has multiple root elements"))
    }
}

/// Character data goes to the open element's `text` until it has children,
/// then to the last child's `tail`. Data outside the root is dropped.
fn add_text(stack: &mut [ParseTreeNode], content: &str) {
    let Some(current) = stack.last_mut() else {
        return;
    };
    let slot = match current.children.last_mut() {
        Some(last_child) => &mut last_child.tail,
        None => &mut current.text,
    };
    slot.get_or_insert_with(String::new).push_str(content);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_tail_placement() {
        let root = ParseTreeNode::from_xml("<root>a<b>c</b>d</root>").unwrap();
        assert_eq!(root.tag, "root");
        assert_eq!(root.text.as_deref(), Some("a"));
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].tag, "b");
        assert_eq!(root.children[0].text.as_deref(), Some("c"));
        assert_eq!(root.children[0].tail.as_deref(), Some("d"));
    }

    #[test]
    fn empty_element_with_attributes() {
        let root = ParseTreeNode::from_xml("<part><name index=\"2\"/>after</part>").unwrap();
        let name = &root.children[0];
        assert_eq!(name.tag, "name");
        assert_eq!(name.attr("index"), Some("2"));
        assert!(name.text.is_none());
        assert_eq!(name.tail.as_deref(), Some("after"));
    }

    #[test]
    fn entities_are_unescaped() {
        let root = ParseTreeNode::from_xml("<root>&lt;!-- hi --&gt;&amp;</root>").unwrap();
        assert_eq!(root.text.as_deref(), Some("<!-- hi -->&"));
    }

    #[test]
    fn whitespace_is_preserved() {
        let root = ParseTreeNode::from_xml("<root>  a\n<b/> b </root>").unwrap();
        assert_eq!(root.text.as_deref(), Some("  a\n"));
        assert_eq!(root.children[0].tail.as_deref(), Some(" b "));
    }

    #[test]
    fn unclosed_root_fails() {
        assert!(ParseTreeNode::from_xml("<root><b>x</b>").is_err());
    }

    #[test]
    fn no_root_fails() {
        assert!(ParseTreeNode::from_xml("   ").is_err());
    }
}
