//! Work with remotely-rendered MediaWiki parse trees as mutable documents.
//!
//! The renderer's `prop=parsetree` output is read into a [`ParseTreeNode`]
//! tagged tree and parsed into a [`WikiText`] document: an ordered sequence
//! of text runs and [`WikiTemplate`] nodes whose parameters can be read,
//! rewritten and restructured before serializing back to wikitext markup.
//!
//! The document model and parser never perform I/O; the [`api`] module holds
//! the action-API round trips ([`api::parse_page`], [`api::parse_text`],
//! [`api::normalize_templates`]) built on [`WikiClient`].

pub mod api;
pub mod client;
pub mod definitions;
pub mod ns;
pub mod wikitext;

// Re-export commonly used types for ergonomic access.
pub use client::WikiClient;
pub use ns::{NS, NsManager};
pub use wikitext::{
    DEFAULT_MAX_DEPTH, ParseTreeNode, Result, WikiError, WikiNode, WikiTemplate, WikiText,
    WikiValue, parse, parse_with,
};
