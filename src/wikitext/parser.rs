//! Recursive descent over the renderer's tagged tree.
//!
//! The parser mirrors the tree's structure: at a generic node it appends the
//! leading text, parses each `template` child into a [`WikiTemplate`], and
//! either flattens or skips every other tag kind depending on the flatten
//! flag; each child's trailing text is appended afterwards either way. At a
//! `template` node the `title` child is parsed in non-flattening mode (so
//! stray comments inside a title are discarded as text rather than descended
//! into) and each `part` child yields one parameter.
//!
//! Nesting depth in the input is author-controlled, so every recursive step
//! is checked against a maximum and fails with `DepthExceeded` instead of
//! growing the call stack without bound.

use crate::wikitext::document::WikiText;
use crate::wikitext::errors::{Result, WikiError};
use crate::wikitext::parse_tree::ParseTreeNode;
use crate::wikitext::template::WikiTemplate;

/// Maximum tagged-tree nesting depth accepted by [`parse`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Parse a tagged tree into a document, flattening non-template tags and
/// bounding recursion at [`DEFAULT_MAX_DEPTH`].
pub fn parse(root: &ParseTreeNode) -> Result<WikiText> {
    parse_with(root, true, DEFAULT_MAX_DEPTH)
}

/// Parse a tagged tree into a document.
///
/// `flatten` controls what happens to tags other than `template`: with it
/// set, their text content is absorbed (descending into children); without
/// it, they are skipped entirely. Template titles are always parsed
/// non-flattening, regardless of this flag.
pub fn parse_with(root: &ParseTreeNode, flatten: bool, max_depth: usize) -> Result<WikiText> {
    parse_wiki_text(root, flatten, 0, max_depth)
}

fn check_depth(depth: usize, max_depth: usize) -> Result<()> {
    if depth > max_depth {
        Err(WikiError::depth_exceeded(depth, max_depth))
    } else {
        Ok(())
    }
}

fn parse_wiki_text(
    root: &ParseTreeNode,
    flatten: bool,
    depth: usize,
    max_depth: usize,
) -> Result<WikiText> {
    check_depth(depth, max_depth)?;

    let out = WikiText::new();
    if let Some(text) = &root.text {
        out.append(text.as_str());
    }

    for child in &root.children {
        if child.tag == "template" {
            out.append(parse_wiki_template(child, depth + 1, max_depth)?);
        } else if flatten {
            // handles templates nested inside e.g. heading tags
            out.append(parse_wiki_text(child, flatten, depth + 1, max_depth)?);
        }

        if let Some(tail) = &child.tail {
            out.append(tail.as_str());
        }
    }

    Ok(out)
}

fn parse_wiki_template(
    root: &ParseTreeNode,
    depth: usize,
    max_depth: usize,
) -> Result<WikiTemplate> {
    check_depth(depth, max_depth)?;

    let out = WikiTemplate::new("");
    for child in &root.children {
        match child.tag.as_str() {
            "title" => {
                // non-flattening, so comment markers inside a title are
                // dropped rather than parsed
                out.set_title(parse_wiki_text(child, false, depth + 1, max_depth)?.as_text(true));
            }
            "part" => {
                let (key, value) = parse_template_parameter(child, depth + 1, max_depth)?;
                out.set(key, value);
            }
            _ => {}
        }
    }

    Ok(out)
}

/// Parse a `part` node into a (key, value) pair. An unnamed part carries its
/// positional index as an attribute on the `name` child; a named part
/// carries the name as the child's text.
fn parse_template_parameter(
    root: &ParseTreeNode,
    depth: usize,
    max_depth: usize,
) -> Result<(String, WikiText)> {
    check_depth(depth, max_depth)?;

    let mut key = None;
    let mut value = None;

    for child in &root.children {
        match child.tag.as_str() {
            "name" => {
                key = match child.attr("index").filter(|index| !index.is_empty()) {
                    Some(index) => Some(index.to_owned()),
                    None => child.text.as_ref().map(|text| text.trim().to_owned()),
                };
            }
            "value" => value = Some(parse_wiki_text(child, true, depth + 1, max_depth)?),
            _ => {}
        }
    }

    match (key, value) {
        (Some(key), Some(value)) => Ok((key, value)),
        (None, _) => Err(WikiError::parse("template part has no usable name")),
        (_, None) => Err(WikiError::parse("template part has no value")),
    }
}
