//! Page retrieval for the crawler
//!
//! Fetching never fails the crawl: every error is logged here and handed back
//! as a `FetchError` so the caller can skip the URL.

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client as ReqwestClient;
use tracing::{debug, instrument, warn};
use url::Url;

use super::config::CrawlerConfig;
use super::error::{CrawlError, FetchError};

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Source of page bodies
///
/// Implemented by `HttpFetcher` for the real site; tests substitute an
/// in-memory link graph.
pub trait Fetch {
    /// Retrieve the body of `url`
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// GET-only HTTP fetcher with locale headers and a fixed timeout
///
/// No cookie store is configured, so nothing persists between requests.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: ReqwestClient,
}

impl HttpFetcher {
    /// Build a fetcher from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, CrawlError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).map_err(|e| {
                CrawlError::Other(format!("Invalid Accept-Language header: {}", e))
            })?,
        );

        let client = ReqwestClient::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url)?;
        let response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

impl Fetch for HttpFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        match self.get(url).await {
            Ok(body) => {
                debug!("Fetched {} ({} bytes)", url, body.len());
                Ok(body)
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn test_config() -> CrawlerConfig {
        CrawlerConfig::builder()
            .user_agent("kbcrawl-test")
            .request_timeout_ms(2_000)
            .build()
    }

    #[tokio::test]
    async fn test_fetch_success_sends_locale_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/category/21/intro.html")
            .match_header("accept-language", "de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7")
            .match_header("user-agent", "kbcrawl-test")
            .match_header("accept", Matcher::Regex("text/html".to_string()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><body>hello</body></html>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let url = format!("{}/category/21/intro.html", server.url());
        let body = fetcher.fetch(&url).await.unwrap();
        assert!(body.contains("hello"));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_failure() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/content/1/missing.html")
            .with_status(404)
            .with_body("Not Found")
            .expect(1)
            .create_async()
            .await;

        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let url = format!("{}/content/1/missing.html", server.url());
        let result = fetcher.fetch(&url).await;
        assert!(matches!(result, Err(FetchError::Status(404))));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_failure() {
        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        let result = fetcher.fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_transport_error_is_failure() {
        let fetcher = HttpFetcher::new(&test_config()).unwrap();
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let result = fetcher.fetch("http://127.0.0.1:9/").await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[test]
    fn test_invalid_accept_language_is_rejected() {
        let config = CrawlerConfig::builder().accept_language("de\nDE").build();
        assert!(HttpFetcher::new(&config).is_err());
    }
}
