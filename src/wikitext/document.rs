//! The mutable wikitext document container.
//!
//! A `WikiText` is an ordered sequence of nodes, each either an opaque text
//! run or a `WikiTemplate`. It is the type the tree parser produces and the
//! type callers mutate before serializing back to markup.
//!
//! `WikiText` is a shared handle (`Rc<RefCell<..>>`): cloning it is cheap and
//! every clone refers to the same sequence. This is what lets a template hold
//! a non-owning back-reference to the document that contains it, and lets
//! `templates()` hand out nodes that remain live views into the tree. The
//! whole graph is single-owner, single-threaded and deliberately `!Send`.
//!
//! Sequence invariants, maintained on every insertion:
//! - no two adjacent nodes are both text runs (text appended after text is
//!   concatenated onto the existing run);
//! - an empty text run is never stored (appending `""` is a no-op).

use std::cell::RefCell;
use std::fmt;
use std::ops::AddAssign;
use std::rc::{Rc, Weak};

use crate::wikitext::template::WikiTemplate;

/// Shared storage for a document's node sequence.
pub(crate) type DocHandle = Rc<RefCell<Vec<WikiNode>>>;

/// Non-owning link from a template back to its containing document.
pub(crate) type DocLink = Weak<RefCell<Vec<WikiNode>>>;

/// A single node in a document's sequence.
#[derive(Debug, Clone)]
pub enum WikiNode {
    /// An opaque run of wikitext. Anything the renderer did not expose as a
    /// template tag is retained verbatim in one of these.
    Text(String),
    /// An embedded template.
    Template(WikiTemplate),
}

/// An input value accepted by [`WikiText::append`], [`WikiTemplate::set`] and
/// friends: a raw text run, a template, or a whole document.
///
/// [`WikiTemplate::set`]: crate::wikitext::template::WikiTemplate::set
#[derive(Debug, Clone)]
pub enum WikiValue {
    Str(String),
    Template(WikiTemplate),
    Text(WikiText),
}

impl WikiValue {
    /// Convert this value into a standalone document. A document passes
    /// through unchanged; text and templates are wrapped in a fresh
    /// single-node document.
    pub fn into_wikitext(self) -> WikiText {
        match self {
            WikiValue::Text(doc) => doc,
            other => {
                let doc = WikiText::new();
                doc.append(other);
                doc
            }
        }
    }
}

impl From<&str> for WikiValue {
    fn from(s: &str) -> Self {
        WikiValue::Str(s.to_owned())
    }
}

impl From<String> for WikiValue {
    fn from(s: String) -> Self {
        WikiValue::Str(s)
    }
}

impl From<WikiTemplate> for WikiValue {
    fn from(t: WikiTemplate) -> Self {
        WikiValue::Template(t)
    }
}

impl From<WikiText> for WikiValue {
    fn from(d: WikiText) -> Self {
        WikiValue::Text(d)
    }
}

impl From<&WikiText> for WikiValue {
    fn from(d: &WikiText) -> Self {
        WikiValue::Text(d.clone())
    }
}

/// Mutable representation of parsed wikitext: an ordered sequence of text
/// runs and templates.
#[derive(Debug, Clone, Default)]
pub struct WikiText {
    nodes: DocHandle,
}

impl WikiText {
    /// Create a new, empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_handle(nodes: DocHandle) -> Self {
        Self { nodes }
    }

    pub(crate) fn downgrade(&self) -> DocLink {
        Rc::downgrade(&self.nodes)
    }

    /// `true` if `other` is a handle to this same document.
    pub fn ptr_eq(&self, other: &WikiText) -> bool {
        Rc::ptr_eq(&self.nodes, &other.nodes)
    }

    /// Number of nodes currently in the sequence.
    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    /// `true` if the document contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Append `value` to the end of this document.
    ///
    /// - Text is concatenated onto the last node when that node is itself a
    ///   text run, otherwise pushed as a new node. Empty text is a no-op.
    /// - A template is pushed as a new node and its back-reference is set to
    ///   this document. A template that currently lives in another document
    ///   is detached from it first, so no document is ever left with a stale
    ///   listing.
    /// - Another document is merged by re-appending each of its nodes in
    ///   order (flattening, not nesting). Its templates move into this
    ///   document under the detach rule above; its text runs are copied.
    pub fn append(&self, value: impl Into<WikiValue>) {
        match value.into() {
            WikiValue::Str(s) => self.append_str(&s),
            WikiValue::Template(t) => self.append_template(t),
            WikiValue::Text(other) => self.merge(&other),
        }
    }

    fn append_str(&self, s: &str) {
        if s.is_empty() {
            return;
        }
        let mut nodes = self.nodes.borrow_mut();
        if let Some(WikiNode::Text(last)) = nodes.last_mut() {
            last.push_str(s);
        } else {
            nodes.push(WikiNode::Text(s.to_owned()));
        }
    }

    fn append_template(&self, template: WikiTemplate) {
        template.detach();
        self.nodes.borrow_mut().push(WikiNode::Template(template.clone()));
        template.set_parent(Some(self.downgrade()));
    }

    fn merge(&self, other: &WikiText) {
        // Snapshot first: appending a template detaches it from `other`,
        // which would otherwise mutate the sequence mid-iteration.
        let snapshot: Vec<WikiNode> = other.nodes.borrow().clone();
        for node in snapshot {
            match node {
                WikiNode::Text(s) => self.append_str(&s),
                WikiNode::Template(t) => self.append_template(t),
            }
        }
    }

    /// Remove `template` from this document's sequence, re-merging any text
    /// runs its removal leaves adjacent. Returns `false` if it was not here.
    pub(crate) fn remove_template(&self, template: &WikiTemplate) -> bool {
        let mut nodes = self.nodes.borrow_mut();
        let Some(pos) = nodes
            .iter()
            .position(|n| matches!(n, WikiNode::Template(t) if t.ptr_eq(template)))
        else {
            return false;
        };
        nodes.remove(pos);
        if pos > 0
            && pos < nodes.len()
            && matches!(&nodes[pos - 1], WikiNode::Text(_))
            && matches!(&nodes[pos], WikiNode::Text(_))
        {
            if let WikiNode::Text(tail) = nodes.remove(pos) {
                if let Some(WikiNode::Text(prev)) = nodes.get_mut(pos - 1) {
                    prev.push_str(&tail);
                }
            }
        }
        true
    }

    /// The templates directly in this document's sequence, in sequence
    /// order. Does not descend into template parameters; see
    /// [`all_templates`](Self::all_templates) for that.
    pub fn templates(&self) -> Vec<WikiTemplate> {
        self.nodes
            .borrow()
            .iter()
            .filter_map(|n| match n {
                WikiNode::Template(t) => Some(t.clone()),
                WikiNode::Text(_) => None,
            })
            .collect()
    }

    /// Every template reachable from this document, including templates
    /// nested inside other templates' parameters.
    ///
    /// The traversal is a LIFO stack seeded with the top-level templates:
    /// pop the most recently pushed template, emit it, push its direct
    /// children. The resulting order is depth-first right-to-left relative
    /// to document order (the last top-level subtree is emitted, preorder,
    /// before earlier siblings). This order is a compatibility contract;
    /// callers that need document order must sort separately.
    pub fn all_templates(&self) -> Vec<WikiTemplate> {
        let mut out = Vec::new();
        let mut stack = self.templates();
        while let Some(curr) = stack.pop() {
            stack.extend(curr.templates());
            out.push(curr);
        }
        out
    }

    /// Render this document as wikitext. `trim` strips leading and trailing
    /// whitespace from the final result only, never from interior runs.
    pub fn as_text(&self, trim: bool) -> String {
        let out: String = self
            .nodes
            .borrow()
            .iter()
            .map(|n| match n {
                WikiNode::Text(s) => s.clone(),
                WikiNode::Template(t) => t.as_text(false),
            })
            .collect();
        if trim { out.trim().to_owned() } else { out }
    }
}

/// Handle identity, not structural equality: two handles are equal iff they
/// refer to the same document.
impl PartialEq for WikiText {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for WikiText {}

/// Renders with outer whitespace trimmed; use [`WikiText::as_text`] with
/// `trim: false` to keep it.
impl fmt::Display for WikiText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text(true))
    }
}

impl From<&str> for WikiText {
    fn from(s: &str) -> Self {
        let doc = WikiText::new();
        doc.append(s);
        doc
    }
}

impl From<String> for WikiText {
    fn from(s: String) -> Self {
        let doc = WikiText::new();
        doc.append(s);
        doc
    }
}

impl From<WikiTemplate> for WikiText {
    fn from(t: WikiTemplate) -> Self {
        let doc = WikiText::new();
        doc.append(t);
        doc
    }
}

impl AddAssign<&str> for WikiText {
    fn add_assign(&mut self, rhs: &str) {
        self.append(rhs);
    }
}

impl AddAssign<String> for WikiText {
    fn add_assign(&mut self, rhs: String) {
        self.append(rhs);
    }
}

impl AddAssign<WikiTemplate> for WikiText {
    fn add_assign(&mut self, rhs: WikiTemplate) {
        self.append(rhs);
    }
}

impl AddAssign<WikiText> for WikiText {
    fn add_assign(&mut self, rhs: WikiText) {
        self.append(rhs);
    }
}

impl AddAssign<&WikiText> for WikiText {
    fn add_assign(&mut self, rhs: &WikiText) {
        self.append(rhs);
    }
}

impl AddAssign<WikiValue> for WikiText {
    fn add_assign(&mut self, rhs: WikiValue) {
        self.append(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_runs_merge_on_append() {
        let mut doc = WikiText::from("a");
        doc += "b";
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.as_text(false), "ab");
    }

    #[test]
    fn empty_text_is_a_no_op() {
        let mut doc = WikiText::new();
        doc += "";
        assert!(doc.is_empty());
        doc += "x";
        doc += "";
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn template_append_sets_parent() {
        let mut doc = WikiText::new();
        let t = WikiTemplate::new("T");
        assert!(t.parent().is_none());
        doc += t.clone();
        assert_eq!(t.parent(), Some(doc.clone()));
        assert_eq!(doc.templates(), vec![t]);
    }

    #[test]
    fn appending_to_a_second_document_moves_the_template() {
        let mut a = WikiText::new();
        let mut b = WikiText::new();
        let t = WikiTemplate::new("T");
        a += t.clone();
        b += t.clone();
        assert!(a.templates().is_empty());
        assert_eq!(b.templates(), vec![t.clone()]);
        assert_eq!(t.parent(), Some(b));
    }

    #[test]
    fn document_merge_flattens() {
        let mut a = WikiText::from("a");
        let mut b = WikiText::from("b");
        b += WikiTemplate::new("T");
        a += b.clone();
        // "a" and "b" merged into one run, template re-parented to `a`.
        assert_eq!(a.len(), 2);
        assert_eq!(a.as_text(false), "ab{{T}}");
        assert!(b.templates().is_empty());
    }

    #[test]
    fn detached_template_remerges_surrounding_text() {
        let mut doc = WikiText::from("a");
        let t = WikiTemplate::new("T");
        doc += t.clone();
        doc += "b";
        assert_eq!(doc.len(), 3);
        t.detach();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.as_text(false), "ab");
    }

    #[test]
    fn all_templates_is_depth_first_right_to_left() {
        let a = WikiTemplate::new("A");
        a.set("x", WikiTemplate::new("A1"));
        let b = WikiTemplate::new("B");
        b.set("y", WikiTemplate::new("B1"));

        let mut doc = WikiText::new();
        doc += a;
        doc += b;

        let titles: Vec<String> = doc.all_templates().iter().map(|t| t.title()).collect();
        assert_eq!(titles, vec!["B", "B1", "A", "A1"]);
    }

    #[test]
    fn as_text_trim_strips_outer_whitespace_only() {
        let mut doc = WikiText::from("  a ");
        doc += WikiTemplate::new("T");
        doc += " b  ";
        assert_eq!(doc.as_text(false), "  a {{T}} b  ");
        assert_eq!(doc.as_text(true), "a {{T}} b");
        assert_eq!(format!("{}", doc), "a {{T}} b");
    }
}
