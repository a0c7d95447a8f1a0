//! Wire types for the MediaWiki action API responses consumed by this
//! crate (`formatversion=2`).

use serde::Deserialize;
use std::collections::HashMap;

/// The `error` envelope returned instead of a payload when a request is
/// rejected.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub info: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseResponse {
    pub parse: Option<ParseBody>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ParseBody {
    pub title: Option<String>,
    pub pageid: Option<u64>,
    /// The rendered parse tree as an XML string.
    pub parsetree: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub query: Option<QueryBody>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryBody {
    #[serde(default)]
    pub normalized: Option<Vec<NormalizedTitle>>,
    #[serde(default)]
    pub namespaces: Option<HashMap<String, NamespaceInfo>>,
    #[serde(default)]
    pub namespacealiases: Option<Vec<NamespaceAlias>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NormalizedTitle {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceInfo {
    pub id: i32,
    /// The wiki's local name; empty for the main namespace.
    pub name: String,
    #[serde(default)]
    pub canonical: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceAlias {
    pub id: i32,
    pub alias: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_parse_response() {
        let body: ParseResponse = serde_json::from_str(
            r#"{"parse":{"title":"Sandbox","pageid":42,"parsetree":"<root>x</root>"}}"#,
        )
        .unwrap();
        let parse = body.parse.unwrap();
        assert_eq!(parse.pageid, Some(42));
        assert_eq!(parse.parsetree.as_deref(), Some("<root>x</root>"));
        assert!(body.error.is_none());
    }

    #[test]
    fn decodes_an_error_envelope() {
        let body: ParseResponse =
            serde_json::from_str(r#"{"error":{"code":"missingtitle","info":"The page does not exist."}}"#)
                .unwrap();
        assert!(body.parse.is_none());
        assert_eq!(body.error.unwrap().code, "missingtitle");
    }

    #[test]
    fn decodes_normalized_titles() {
        let body: QueryResponse = serde_json::from_str(
            r#"{"query":{"normalized":[{"fromencoded":false,"from":"cite_web","to":"Cite web"}]}}"#,
        )
        .unwrap();
        let normalized = body.query.unwrap().normalized.unwrap();
        assert_eq!(normalized[0].from, "cite_web");
        assert_eq!(normalized[0].to, "Cite web");
    }

    #[test]
    fn decodes_siteinfo_namespaces() {
        let body: QueryResponse = serde_json::from_str(
            r#"{"query":{"namespaces":{"0":{"id":0,"name":"","content":true},"10":{"id":10,"name":"Template","canonical":"Template"}},"namespacealiases":[{"id":10,"alias":"T"}]}}"#,
        )
        .unwrap();
        let query = body.query.unwrap();
        let namespaces = query.namespaces.unwrap();
        assert_eq!(namespaces["10"].name, "Template");
        assert!(namespaces["0"].name.is_empty());
        assert_eq!(query.namespacealiases.unwrap()[0].alias, "T");
    }
}
