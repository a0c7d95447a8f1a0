//! Applies canonicalized titles back onto templates.
//!
//! The server's title normalization fixes capitalization and underscores and
//! expands namespace aliases. Conventional transclusions are written without
//! the `Template:` prefix, so a canonical title inside the Template
//! namespace is stripped back to its bare form; a title in any other
//! namespace keeps the full canonical string so the transclusion still
//! resolves across namespaces.
//!
//! The network round trip that produces the mapping lives in
//! [`crate::api::normalize_templates`]; this module is pure.

use std::collections::HashMap;

use crate::ns::{NS, NsManager};
use crate::wikitext::template::WikiTemplate;

/// Rewrite the titles of `templates` according to an old-title → new-title
/// mapping. Every template whose title equals an `old` key is updated;
/// titles not in the mapping are left untouched.
pub fn apply_normalized_titles(
    ns: &NsManager,
    templates: &[WikiTemplate],
    mapping: &HashMap<String, String>,
) {
    let template_ns = ns.stringify(NS::Template).unwrap_or("Template").to_owned();

    for (old, new) in mapping {
        for template in templates {
            if template.title() == *old {
                let resolved = if ns.which_ns(new) == template_ns {
                    ns.nss(new)
                } else {
                    new.clone()
                };
                log::debug!("normalizing template title '{}' -> '{}'", old, resolved);
                template.set_title(resolved);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_namespace_titles_are_stripped() {
        let ns = NsManager::default();
        let t = WikiTemplate::new("cite web");
        let mapping = HashMap::from([("cite web".to_owned(), "Template:Cite web".to_owned())]);
        apply_normalized_titles(&ns, &[t.clone()], &mapping);
        assert_eq!(t.title(), "Cite web");
    }

    #[test]
    fn cross_namespace_titles_keep_their_prefix() {
        let ns = NsManager::default();
        let t = WikiTemplate::new("user:Example/sandbox");
        let mapping = HashMap::from([(
            "user:Example/sandbox".to_owned(),
            "User:Example/sandbox".to_owned(),
        )]);
        apply_normalized_titles(&ns, &[t.clone()], &mapping);
        assert_eq!(t.title(), "User:Example/sandbox");
    }

    #[test]
    fn unmapped_titles_are_untouched() {
        let ns = NsManager::default();
        let t = WikiTemplate::new("Already fine");
        apply_normalized_titles(&ns, &[t.clone()], &HashMap::new());
        assert_eq!(t.title(), "Already fine");
    }
}
