//! The template node of the document model.
//!
//! A `WikiTemplate` has a mutable title, an ordered list of named parameters
//! (each parameter's value is itself a [`WikiText`]), and a non-owning
//! back-reference to the document that directly contains it. The
//! back-reference exists solely so [`detach`](WikiTemplate::detach) can find
//! and leave the parent; the parent owns the template, never the other way
//! around. It is held as a `Weak` link, so a parent that has been dropped
//! simply reads as detached - the link can never dangle.
//!
//! Parameters are stored as a `Vec` of key/value pairs: keys are unique,
//! insertion order is preserved and observable, and lookups are linear scans
//! (templates carry a handful of parameters in practice).
//!
//! Like `WikiText`, `WikiTemplate` is a cheap-cloneable shared handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::wikitext::document::{DocLink, WikiText, WikiValue};
use crate::wikitext::errors::{Result, WikiError};

#[derive(Debug)]
struct TemplateInner {
    title: String,
    params: Vec<(String, WikiText)>,
    parent: Option<DocLink>,
}

/// A named, parameterized transclusion node, rendered as
/// `{{Title|key=value|...}}`.
#[derive(Debug, Clone)]
pub struct WikiTemplate {
    inner: Rc<RefCell<TemplateInner>>,
}

impl WikiTemplate {
    /// Create a new, detached template with no parameters.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(TemplateInner {
                title: title.into(),
                params: Vec::new(),
                parent: None,
            })),
        }
    }

    /// `true` if `other` is a handle to this same template.
    pub fn ptr_eq(&self, other: &WikiTemplate) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// This template's title.
    pub fn title(&self) -> String {
        self.inner.borrow().title.clone()
    }

    /// Replace this template's title.
    pub fn set_title(&self, title: impl Into<String>) {
        self.inner.borrow_mut().title = title.into();
    }

    /// The document this template currently lives in, if any.
    pub fn parent(&self) -> Option<WikiText> {
        self.inner
            .borrow()
            .parent
            .as_ref()
            .and_then(|w| w.upgrade())
            .map(WikiText::from_handle)
    }

    pub(crate) fn set_parent(&self, link: Option<DocLink>) {
        self.inner.borrow_mut().parent = link;
    }

    /// `true` if `key` names a parameter of this template.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().params.iter().any(|(k, _)| k == key)
    }

    /// `true` if `key` names a parameter of this template. With `empty_ok`
    /// set to `false`, the parameter's value must also be non-empty.
    pub fn has_key(&self, key: &str, empty_ok: bool) -> bool {
        self.inner
            .borrow()
            .params
            .iter()
            .any(|(k, v)| k == key && (empty_ok || !v.is_empty()))
    }

    /// The value associated with `key`.
    ///
    /// The returned `WikiText` is a live handle into this template: mutating
    /// it mutates the parameter in place. Fails with `ParameterNotFound` if
    /// `key` is absent; use [`pop`](Self::pop) or [`contains`](Self::contains)
    /// for optional-style access.
    pub fn get(&self, key: &str) -> Result<WikiText> {
        let inner = self.inner.borrow();
        inner
            .params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| WikiError::param_not_found(&inner.title, key))
    }

    /// Associate `key` with `value`. Text and template values are wrapped in
    /// a fresh single-node document. An existing key keeps its position in
    /// iteration order; a new key goes to the end.
    pub fn set(&self, key: impl Into<String>, value: impl Into<WikiValue>) {
        let key = key.into();
        let value = value.into().into_wikitext();
        let mut inner = self.inner.borrow_mut();
        if let Some(slot) = inner.params.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            inner.params.push((key, value));
        }
    }

    /// Remove `key` and return its value, or `None` if `key` is absent.
    /// Never fails, by contract.
    pub fn pop(&self, key: &str) -> Option<WikiText> {
        let mut inner = self.inner.borrow_mut();
        let pos = inner.params.iter().position(|(k, _)| k == key)?;
        Some(inner.params.remove(pos).1)
    }

    /// If this template currently has a parent document, remove this
    /// template from its sequence and clear the back-reference. No-op if
    /// already detached.
    pub fn detach(&self) {
        let parent = self.inner.borrow_mut().parent.take();
        if let Some(link) = parent
            && let Some(handle) = link.upgrade()
        {
            WikiText::from_handle(handle).remove_template(self);
        }
    }

    /// Remap the value under `old_key` to `new_key`. No-op if `old_key` is
    /// absent. Implemented as pop + set, so the parameter moves to the end
    /// of iteration order; this is a documented side effect.
    pub fn remap(&self, old_key: &str, new_key: &str) {
        if let Some(value) = self.pop(old_key) {
            self.set(new_key, value);
        }
    }

    /// Ensure `key` exists: if absent, map it to an empty document. Never
    /// overwrites an existing value.
    pub fn touch(&self, key: &str) {
        if !self.contains(key) {
            self.set(key, WikiText::new());
        }
    }

    /// Append `value` to the document under `key`, creating the entry if
    /// `key` is absent.
    pub fn append_to_params(&self, key: &str, value: impl Into<WikiValue>) {
        if let Ok(existing) = self.get(key) {
            existing.append(value);
        } else {
            self.set(key, value);
        }
    }

    /// Parameter keys, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().params.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Parameter values, in insertion order.
    pub fn values(&self) -> Vec<WikiText> {
        self.inner.borrow().params.iter().map(|(_, v)| v.clone()).collect()
    }

    /// Parameter key/value pairs, in insertion order.
    pub fn params(&self) -> Vec<(String, WikiText)> {
        self.inner.borrow().params.clone()
    }

    /// The templates directly inside this template's parameter values, in
    /// parameter order. Used by the recursive document traversal.
    pub fn templates(&self) -> Vec<WikiTemplate> {
        self.inner
            .borrow()
            .params
            .iter()
            .flat_map(|(_, v)| v.templates())
            .collect()
    }

    /// Render this template as wikitext. With `indent`, a newline is
    /// inserted before each `|` and before the closing braces, producing a
    /// human-readable multi-line form that the renderer accepts
    /// interchangeably. Parameter values render with their outer whitespace
    /// trimmed.
    pub fn as_text(&self, indent: bool) -> String {
        let inner = self.inner.borrow();
        let prefix = if indent { "\n|" } else { "|" };
        let mut params = String::new();
        for (k, v) in &inner.params {
            params.push_str(prefix);
            params.push_str(k);
            params.push('=');
            params.push_str(&v.as_text(true));
        }
        if indent {
            params.push('\n');
        }
        format!("{{{{{}{}}}}}", inner.title, params)
    }
}

/// Handle identity, not structural equality: two handles are equal iff they
/// refer to the same template.
impl PartialEq for WikiTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for WikiTemplate {}

impl fmt::Display for WikiTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text(false))
    }
}
