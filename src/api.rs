//! Endpoint functions for the MediaWiki action API, and the entry points
//! that tie fetching to the core parser.
//!
//! Each function performs exactly one round trip; chunking oversized batches
//! is the caller's concern. The parse entry points (`parse_page`,
//! `parse_text`) follow the crate's failure policy: any fetch or parse
//! failure is logged and surfaces as an absent result, never as a partially
//! built document.

use std::collections::HashMap;

use itertools::Itertools;
use url::Url;

use crate::client::WikiClient;
use crate::definitions::{ParseResponse, QueryResponse};
use crate::ns::NsManager;
use crate::wikitext::errors::{Result, WikiError};
use crate::wikitext::normalize::apply_normalized_titles;
use crate::wikitext::parse_tree::ParseTreeNode;
use crate::wikitext::{WikiTemplate, WikiText, parse};

/// Build the base api.php URL shared by every request.
fn build_wiki_url(client: &WikiClient, action: &str) -> Url {
    let mut url = client.endpoint().clone();
    url.query_pairs_mut()
        .append_pair("action", action)
        .append_pair("format", "json")
        .append_pair("formatversion", "2")
        .finish();
    url
}

/// POST a parse request and extract the rendered parse tree XML.
async fn request_parse_tree(client: &WikiClient, form: &[(&str, &str)]) -> Result<String> {
    let url = build_wiki_url(client, "parse");
    let body = client.post_form(url, form).await?.json::<ParseResponse>().await?;

    if let Some(error) = body.error {
        return Err(WikiError::response(format!(
            "server rejected parse request ({}): {}",
            error.code, error.info
        )));
    }
    body.parse
        .and_then(|p| p.parsetree)
        .ok_or_else(|| WikiError::response("parse response did not contain a parsetree"))
}

/// Fetch the rendered parse tree of the current revision of `page`.
pub async fn fetch_parse_tree(client: &WikiClient, page: &str) -> Result<String> {
    log::debug!("{}: fetching parse tree of '{}'...", client.endpoint(), page);
    request_parse_tree(client, &[("prop", "parsetree"), ("page", page)]).await
}

/// Render `text` into a parse tree. With `title`, the text is parsed as if
/// it were published on that page.
pub async fn fetch_parse_tree_for_text(
    client: &WikiClient,
    text: &str,
    title: Option<&str>,
) -> Result<String> {
    log::debug!("{}: fetching parse tree for raw text...", client.endpoint());
    let mut form = vec![
        ("prop", "parsetree"),
        ("contentmodel", "wikitext"),
        ("text", text),
    ];
    if let Some(title) = title {
        form.push(("title", title));
    }
    request_parse_tree(client, &form).await
}

/// Ask the server to canonicalize `titles` in one batch. Returns an
/// old-title → new-title mapping; titles that were already canonical are
/// absent from it.
pub async fn normalize_titles<S: AsRef<str>>(
    client: &WikiClient,
    titles: &[S],
) -> Result<HashMap<String, String>> {
    let mut url = build_wiki_url(client, "query");
    url.query_pairs_mut()
        .append_pair("titles", &titles.iter().map(|s| s.as_ref()).join("|"))
        .finish();

    let body = client.get(url).await?.json::<QueryResponse>().await?;
    if let Some(error) = body.error {
        return Err(WikiError::response(format!(
            "server rejected normalization query ({}): {}",
            error.code, error.info
        )));
    }

    let mut out = HashMap::new();
    if let Some(query) = body.query
        && let Some(normalized) = query.normalized
    {
        for pair in normalized {
            out.insert(pair.from, pair.to);
        }
    }
    Ok(out)
}

/// Fetch namespace data from the wiki and return it as an [`NsManager`].
pub async fn fetch_namespaces(client: &WikiClient) -> Result<NsManager> {
    log::debug!("{}: fetching namespace data...", client.endpoint());
    let mut url = build_wiki_url(client, "query");
    url.query_pairs_mut()
        .append_pair("meta", "siteinfo")
        .append_pair("siprop", "namespaces|namespacealiases")
        .finish();

    let body = client.get(url).await?.json::<QueryResponse>().await?;
    if let Some(error) = body.error {
        return Err(WikiError::response(format!(
            "server rejected siteinfo query ({}): {}",
            error.code, error.info
        )));
    }
    let query = body
        .query
        .ok_or_else(|| WikiError::response("siteinfo response has no query body"))?;
    NsManager::from_response(&query)
}

/// Fetch and parse the current revision of `title` into a document.
///
/// Failures (network, server rejection, malformed parse tree) are logged and
/// yield `None`; a partially built document is never returned.
pub async fn parse_page(client: &WikiClient, title: &str) -> Option<WikiText> {
    match fetch_parse_tree(client, title).await {
        Ok(xml) => finish_parse(client, &xml),
        Err(e) => {
            log::error!(
                "{}: could not fetch parse tree of '{}': {}",
                client.endpoint(),
                title,
                e
            );
            None
        }
    }
}

/// Render and parse the supplied markup into a document, as if published on
/// `title` when given. Same failure policy as [`parse_page`].
pub async fn parse_text(client: &WikiClient, text: &str, title: Option<&str>) -> Option<WikiText> {
    match fetch_parse_tree_for_text(client, text, title).await {
        Ok(xml) => finish_parse(client, &xml),
        Err(e) => {
            log::error!(
                "{}: could not fetch parse tree for text: {}",
                client.endpoint(),
                e
            );
            None
        }
    }
}

fn finish_parse(client: &WikiClient, xml: &str) -> Option<WikiText> {
    match ParseTreeNode::from_xml(xml).and_then(|root| parse(&root)) {
        Ok(document) => Some(document),
        Err(e) => {
            log::error!(
                "{}: error while reading the rendered parse tree: {}",
                client.endpoint(),
                e
            );
            None
        }
    }
}

/// Normalize the titles of `templates` against the wiki in one batch and
/// rewrite them in place: bare titles inside the Template namespace, full
/// canonical titles elsewhere.
pub async fn normalize_templates(
    client: &WikiClient,
    ns: &NsManager,
    templates: &[WikiTemplate],
) -> Result<()> {
    let titles: Vec<String> = templates.iter().map(|t| t.title()).unique().collect();
    if titles.is_empty() {
        return Ok(());
    }
    let mapping = normalize_titles(client, &titles).await?;
    apply_normalized_titles(ns, templates, &mapping);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_client() -> WikiClient {
        let _ = env_logger::builder().is_test(true).try_init();
        // file:// is rejected by reqwest at request time, so these tests
        // exercise the failure policy without touching the network.
        WikiClient::new(Url::parse("file:///api.php").unwrap(), None, None).unwrap()
    }

    #[test]
    fn build_wiki_url_carries_the_base_pairs() {
        let client =
            WikiClient::new(Url::parse("https://en.wikipedia.org/w/api.php").unwrap(), None, None)
                .unwrap();
        let url = build_wiki_url(&client, "parse");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("action".to_owned(), "parse".to_owned())));
        assert!(pairs.contains(&("format".to_owned(), "json".to_owned())));
        assert!(pairs.contains(&("formatversion".to_owned(), "2".to_owned())));
    }

    #[tokio::test]
    async fn parse_page_is_absent_on_transport_failure() {
        assert!(parse_page(&offline_client(), "Main Page").await.is_none());
    }

    #[tokio::test]
    async fn parse_text_is_absent_on_transport_failure() {
        assert!(
            parse_text(&offline_client(), "{{T}}", Some("Sandbox"))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn normalize_templates_without_templates_is_a_no_op() {
        let ns = NsManager::default();
        assert!(
            normalize_templates(&offline_client(), &ns, &[])
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn normalize_templates_propagates_transport_failure() {
        let ns = NsManager::default();
        let t = WikiTemplate::new("cite_web");
        let err = normalize_templates(&offline_client(), &ns, &[t])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "Http");
    }
}
