//! HTTP page fetching.
//!
//! [`Fetch`] is the seam between the batch runner and the network:
//! [`HttpFetcher`] does one GET per call with `reqwest`, and tests plug in
//! canned responses instead.
//!
//! There is no retry and no redirect policy beyond the client defaults. A
//! non-200 status is an error carrying the status code.

use crate::config::ScrapeSettings;
use crate::error::FetchError;
use crate::utils::truncate_for_log;
use reqwest::{Client, StatusCode};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// Fetch the raw body of a page.
pub trait Fetch {
    /// Perform a single GET and return the response body as text.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`Fetch`] implementation backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a client from the scrape settings (user agent, optional timeout).
    pub fn new(settings: &ScrapeSettings) -> Result<Self, reqwest::Error> {
        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent);
        let mut builder = Client::builder().user_agent(user_agent);
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let t0 = Instant::now();
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let resp = self.client.get(parsed).send().await.map_err(transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            let preview = resp.text().await.unwrap_or_default();
            warn!(
                status_code = status.as_u16(),
                body_preview = %truncate_for_log(&preview, 200),
                "Unable to fetch page"
            );
            return Err(FetchError::Status {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(transport)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

fn default_user_agent() -> String {
    format!(
        "{}/{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with_page(route: &str, status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_default_user_agent_names_crate() {
        assert!(default_user_agent().starts_with("medium_success/"));
    }

    #[test]
    fn test_build_with_timeout() {
        let settings = ScrapeSettings {
            timeout_secs: Some(5),
            user_agent: Some("tester/1.0".to_string()),
            ..ScrapeSettings::default()
        };
        assert!(HttpFetcher::new(&settings).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected_before_sending() {
        let fetcher = HttpFetcher::new(&ScrapeSettings::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_fetch_returns_body_on_200() {
        let server = server_with_page("/article", 200, "<h1>Test Title</h1>").await;
        let fetcher = HttpFetcher::new(&ScrapeSettings::default()).unwrap();

        let body = fetcher
            .fetch(&format!("{}/article", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<h1>Test Title</h1>");
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_status_error() {
        let server = server_with_page("/gone", 404, "not here").await;
        let fetcher = HttpFetcher::new(&ScrapeSettings::default()).unwrap();
        let url = format!("{}/gone", server.uri());

        let err = fetcher.fetch(&url).await.unwrap_err();
        match err {
            FetchError::Status {
                url: failed,
                status_code,
            } => {
                assert_eq!(status_code, 404);
                assert_eq!(failed, url);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_status_error() {
        let server = server_with_page("/boom", 503, "").await;
        let fetcher = HttpFetcher::new(&ScrapeSettings::default()).unwrap();

        let err = fetcher
            .fetch(&format!("{}/boom", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status_code: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_sends_configured_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", "tester/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;
        let settings = ScrapeSettings {
            user_agent: Some("tester/1.0".to_string()),
            ..ScrapeSettings::default()
        };
        let fetcher = HttpFetcher::new(&settings).unwrap();

        assert_eq!(fetcher.fetch(&server.uri()).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        let fetcher = HttpFetcher::new(&ScrapeSettings::default()).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:1/").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
