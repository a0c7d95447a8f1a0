//! HTTP client wrapper for a wiki's `api.php` endpoint.

use http_cache_reqwest::{CACacheManager, Cache, CacheMode, HttpCache, HttpCacheOptions};
use reqwest::Response;
use reqwest_middleware::ClientWithMiddleware;
use url::Url;

use crate::wikitext::errors::Result;

/// A reqwest client with HTTP-header-driven caching, bound to one wiki's
/// `api.php` endpoint.
pub struct WikiClient {
    endpoint: Url,
    http: ClientWithMiddleware,
}

impl WikiClient {
    /// Create a new client with middleware which auto caches based on HTTP
    /// headers.
    ///
    /// # Arguments
    /// - endpoint -> The wiki's `api.php` URL.
    /// - cache_path -> Where to store the cache. Defaults to `./.cache`
    /// - user_agent -> Custom user agent to tell the server.
    ///
    /// # Returns
    /// - a new client object to use.
    pub fn new(endpoint: Url, cache_path: Option<&str>, user_agent: Option<&str>) -> Result<Self> {
        let http = reqwest_middleware::ClientBuilder::new(
            reqwest::ClientBuilder::new()
                .user_agent(user_agent.unwrap_or(concat!("wikitree/", env!("CARGO_PKG_VERSION"))))
                .build()?,
        )
        .with(Cache(HttpCache {
            mode: CacheMode::Default,
            manager: CACacheManager::new(cache_path.unwrap_or("./.cache").into(), true),
            options: HttpCacheOptions::default(),
        }))
        .build();

        Ok(Self { endpoint, http })
    }

    /// The `api.php` URL this client talks to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn get(&self, url: Url) -> Result<Response> {
        Ok(self.http.get(url).send().await?)
    }

    pub async fn post_form(&self, url: Url, form: &[(&str, &str)]) -> Result<Response> {
        Ok(self.http.post(url).form(form).send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_and_keeps_its_endpoint() {
        let endpoint = Url::parse("https://en.wikipedia.org/w/api.php").unwrap();
        let client = WikiClient::new(endpoint.clone(), None, None).unwrap();
        assert_eq!(client.endpoint(), &endpoint);
    }
}
