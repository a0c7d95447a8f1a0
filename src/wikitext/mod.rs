//! Wikitext module root: the document model, the tagged-tree parser and the
//! title normalizer.
//!
//! Implementation lives in submodules; the commonly-used types and the parse
//! entry points are re-exported here so callers can `use wikitext::...`
//! directly.

pub mod document;
pub mod errors;
pub mod normalize;
pub mod parse_tree;
pub mod parser;
pub mod template;

pub use document::{WikiNode, WikiText, WikiValue};
pub use errors::{Result, WikiError};
pub use parse_tree::ParseTreeNode;
pub use parser::{DEFAULT_MAX_DEPTH, parse, parse_with};
pub use template::WikiTemplate;
