//! Namespaces: the built-in id table and the per-wiki `NsManager`.
//!
//! A wiki reports its namespace names (and their aliases) through
//! `meta=siteinfo`; `NsManager` keeps the id ↔ name pairings from that
//! response and a compiled prefix regex for the lexical operations: which
//! namespace a title is in, stripping the prefix, converting between
//! namespaces. Names containing spaces also match with underscores, as
//! titles are written either way.

use std::collections::HashMap;

use itertools::Itertools;
use lazy_regex::{Lazy, lazy_regex};
use regex::Regex;

use crate::definitions::QueryBody;
use crate::wikitext::errors::{Result, WikiError};

/// Display name of the main (unprefixed) namespace, which the server
/// reports with an empty name.
pub const MAIN_NAME: &str = "Main";

/// The built-in namespace ids every MediaWiki installation ships with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NS {
    Main = 0,
    Talk = 1,
    User = 2,
    UserTalk = 3,
    Project = 4,
    ProjectTalk = 5,
    File = 6,
    FileTalk = 7,
    MediaWiki = 8,
    MediaWikiTalk = 9,
    Template = 10,
    TemplateTalk = 11,
    Help = 12,
    HelpTalk = 13,
    Category = 14,
    CategoryTalk = 15,
}

/// (id, canonical name) for the built-in namespaces. Local wikis may rename
/// some of these (e.g. `Project` -> `Wikipedia`); `NsManager::from_response`
/// reflects the wiki's actual names.
const BUILTIN: [(i32, &str); 16] = [
    (0, MAIN_NAME),
    (1, "Talk"),
    (2, "User"),
    (3, "User talk"),
    (4, "Project"),
    (5, "Project talk"),
    (6, "File"),
    (7, "File talk"),
    (8, "MediaWiki"),
    (9, "MediaWiki talk"),
    (10, "Template"),
    (11, "Template talk"),
    (12, "Help"),
    (13, "Help talk"),
    (14, "Category"),
    (15, "Category talk"),
];

static DEFAULT_NS_REGEX: Lazy<Regex> = lazy_regex!(
    r"(?i)^(Main|Talk|User[ _]talk|User|Project[ _]talk|Project|File[ _]talk|File|MediaWiki[ _]talk|MediaWiki|Template[ _]talk|Template|Help[ _]talk|Help|Category[ _]talk|Category):"
);

impl NS {
    /// The numeric namespace id.
    pub fn id(self) -> i32 {
        self as i32
    }

    /// Look up a built-in namespace by id.
    pub fn from_id(id: i32) -> Option<NS> {
        match id {
            0 => Some(NS::Main),
            1 => Some(NS::Talk),
            2 => Some(NS::User),
            3 => Some(NS::UserTalk),
            4 => Some(NS::Project),
            5 => Some(NS::ProjectTalk),
            6 => Some(NS::File),
            7 => Some(NS::FileTalk),
            8 => Some(NS::MediaWiki),
            9 => Some(NS::MediaWikiTalk),
            10 => Some(NS::Template),
            11 => Some(NS::TemplateTalk),
            12 => Some(NS::Help),
            13 => Some(NS::HelpTalk),
            14 => Some(NS::Category),
            15 => Some(NS::CategoryTalk),
            _ => None,
        }
    }
}

impl From<NS> for i32 {
    fn from(ns: NS) -> Self {
        ns.id()
    }
}

/// Manages the id ↔ name pairings of the namespaces on a wiki and performs
/// lexical operations with them.
#[derive(Debug, Clone)]
pub struct NsManager {
    ids: HashMap<i32, String>,
    names: HashMap<String, i32>,
    ns_regex: Regex,
}

impl NsManager {
    /// Build a manager from the wiki's `siteinfo` response body. Aliases map
    /// to their namespace's id and are recognized by the prefix regex, but
    /// never returned by `stringify`.
    pub fn from_response(query: &QueryBody) -> Result<NsManager> {
        let namespaces = query
            .namespaces
            .as_ref()
            .ok_or_else(|| WikiError::response("siteinfo response has no namespace listing"))?;

        let mut ids = HashMap::new();
        let mut names = HashMap::new();
        let mut all_names = Vec::new();

        for info in namespaces.values() {
            let name = if info.name.is_empty() {
                MAIN_NAME
            } else {
                info.name.as_str()
            };
            ids.insert(info.id, name.to_owned());
            names.insert(name.to_owned(), info.id);
            all_names.push(name.to_owned());
        }

        if let Some(aliases) = &query.namespacealiases {
            for alias in aliases {
                names.insert(alias.alias.clone(), alias.id);
                all_names.push(alias.alias.clone());
            }
        }

        // Longer names first, so "User talk" can't be shadowed by "User".
        all_names.sort_by_key(|n| std::cmp::Reverse(n.len()));
        let body = all_names
            .iter()
            .map(|n| regex::escape(n).replace(' ', "[ _]"))
            .join("|");
        let ns_regex = Regex::new(&format!("(?i)^({}):", body))?;

        Ok(NsManager {
            ids,
            names,
            ns_regex,
        })
    }

    /// The name of a namespace on this wiki, e.g. `Template`.
    pub fn stringify(&self, ns: NS) -> Option<&str> {
        self.ids.get(&ns.id()).map(String::as_str)
    }

    /// The id registered for a namespace name or alias.
    pub fn intify(&self, name: &str) -> Option<i32> {
        self.names.get(name).copied()
    }

    /// The namespace prefix of `title`, as written in the title, or
    /// [`MAIN_NAME`] when it has none.
    pub fn which_ns(&self, title: &str) -> String {
        match self.ns_regex.find(title) {
            Some(m) => title[..m.end() - 1].to_owned(),
            None => MAIN_NAME.to_owned(),
        }
    }

    /// Strip the namespace prefix from `title`.
    pub fn nss(&self, title: &str) -> String {
        self.ns_regex.replacen(title, 1, "").into_owned()
    }

    /// The canonical prefix for `ns`: the name followed by `:`, or the empty
    /// string for the main namespace.
    pub fn canonical_prefix(&self, ns: NS) -> String {
        match self.stringify(ns) {
            Some(name) if name != MAIN_NAME => format!("{}:", name),
            _ => String::new(),
        }
    }

    /// Convert `title` to namespace `ns`. PRECONDITION: `title` is
    /// well-formed.
    pub fn convert_ns(&self, title: &str, ns: NS, replace_underscores: bool) -> String {
        let out = format!("{}{}", self.canonical_prefix(ns), self.nss(title));
        if replace_underscores {
            out.replace('_', " ")
        } else {
            out
        }
    }

    /// Convert every title in `titles` to namespace `ns`.
    pub fn batch_convert_ns<S: AsRef<str>>(
        &self,
        titles: &[S],
        ns: NS,
        replace_underscores: bool,
    ) -> Vec<String> {
        titles
            .iter()
            .map(|t| self.convert_ns(t.as_ref(), ns, replace_underscores))
            .collect()
    }

    /// Build a pipe-fenced namespace-id filter for sending with queries.
    /// Unrecognized names are ignored.
    pub fn create_filter<S: AsRef<str>>(&self, names: &[S]) -> String {
        let mut filter_ids = Vec::new();
        for name in names {
            match self.intify(name.as_ref()) {
                Some(id) => filter_ids.push(id),
                None => {
                    log::debug!("'{}' is not a recognized namespace, ignoring...", name.as_ref())
                }
            }
        }
        filter_ids.iter().map(|id| id.to_string()).join("|")
    }
}

impl Default for NsManager {
    /// A manager over the built-in namespace table, for working with
    /// documents without fetching `siteinfo` first.
    fn default() -> Self {
        let mut ids = HashMap::new();
        let mut names = HashMap::new();
        for (id, name) in BUILTIN {
            ids.insert(id, name.to_owned());
            names.insert(name.to_owned(), id);
        }
        NsManager {
            ids,
            names,
            ns_regex: (*DEFAULT_NS_REGEX).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{NamespaceAlias, NamespaceInfo};

    fn custom_manager() -> NsManager {
        let namespaces = HashMap::from([
            (
                "0".to_owned(),
                NamespaceInfo {
                    id: 0,
                    name: String::new(),
                    canonical: None,
                },
            ),
            (
                "4".to_owned(),
                NamespaceInfo {
                    id: 4,
                    name: "Wikipedia".to_owned(),
                    canonical: Some("Project".to_owned()),
                },
            ),
            (
                "10".to_owned(),
                NamespaceInfo {
                    id: 10,
                    name: "Template".to_owned(),
                    canonical: Some("Template".to_owned()),
                },
            ),
        ]);
        let query = QueryBody {
            normalized: None,
            namespaces: Some(namespaces),
            namespacealiases: Some(vec![NamespaceAlias {
                id: 4,
                alias: "WP".to_owned(),
            }]),
        };
        NsManager::from_response(&query).expect("manager")
    }

    #[test]
    fn which_ns_reports_the_prefix_as_written() {
        let ns = NsManager::default();
        assert_eq!(ns.which_ns("Template:Foo"), "Template");
        assert_eq!(ns.which_ns("template:Foo"), "template");
        assert_eq!(ns.which_ns("User talk:Foo"), "User talk");
        assert_eq!(ns.which_ns("User_talk:Foo"), "User_talk");
        assert_eq!(ns.which_ns("Foo"), MAIN_NAME);
    }

    #[test]
    fn nss_strips_one_prefix() {
        let ns = NsManager::default();
        assert_eq!(ns.nss("Template:Foo"), "Foo");
        assert_eq!(ns.nss("category:User:Foo"), "User:Foo");
        assert_eq!(ns.nss("Foo"), "Foo");
    }

    #[test]
    fn convert_ns_moves_between_namespaces() {
        let ns = NsManager::default();
        assert_eq!(ns.convert_ns("Template:Foo", NS::Category, false), "Category:Foo");
        assert_eq!(ns.convert_ns("Help:Foo", NS::Main, false), "Foo");
        assert_eq!(
            ns.convert_ns("User_talk:Foo_bar", NS::User, true),
            "User:Foo bar"
        );
        assert_eq!(
            ns.batch_convert_ns(&["Talk:A", "B"], NS::File, false),
            vec!["File:A", "File:B"]
        );
    }

    #[test]
    fn from_response_uses_the_wiki_names() {
        let ns = custom_manager();
        assert_eq!(ns.stringify(NS::Project), Some("Wikipedia"));
        assert_eq!(ns.stringify(NS::Main), Some(MAIN_NAME));
        assert_eq!(ns.which_ns("Wikipedia:Sandbox"), "Wikipedia");
        assert_eq!(ns.nss("WP:Sandbox"), "Sandbox");
        assert_eq!(ns.intify("WP"), Some(4));
        assert_eq!(ns.stringify(NS::Talk), None);
    }

    #[test]
    fn create_filter_joins_known_ids() {
        let ns = custom_manager();
        assert_eq!(ns.create_filter(&["Wikipedia", "Nonsense", "Template"]), "4|10");
    }
}
