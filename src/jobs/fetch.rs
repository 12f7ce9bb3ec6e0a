//! Job posting retrieval
//!
//! HTTP GET with redirect following, then readability extraction for HTML.

use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::Url;

use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::jobs::extract::extract_content_from_html;

/// Maximum redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Fetched page content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Markdown for simplified HTML, otherwise the raw body
    pub content: String,

    /// Non-empty only when the content could not be simplified
    pub notice: String,
}

/// Fetches job postings over HTTP
#[derive(Clone)]
pub struct Fetcher {
    http_client: reqwest::Client,
}

impl Fetcher {
    /// Create a fetcher from configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::limited(MAX_REDIRECTS))
            .timeout(config.fetch_timeout)
            .build()?;

        Ok(Self { http_client })
    }

    /// Underlying HTTP client, shared with the search client
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    /// Fetch `url`, simplifying HTML to markdown unless `force_raw` is set
    pub async fn fetch_url(&self, url: &Url, force_raw: bool) -> Result<FetchOutcome> {
        let response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::BadStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.text().await.map_err(|e| FetchError::RequestFailed {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            url = %url,
            status = status.as_u16(),
            content_type = %content_type,
            bytes = body.len(),
            "Fetched page"
        );

        if content_type.contains("text/html") && !force_raw {
            return Ok(FetchOutcome {
                content: extract_content_from_html(&body),
                notice: String::new(),
            });
        }

        Ok(FetchOutcome {
            content: body,
            notice: format!(
                "Content type {} cannot be simplified to markdown, but here is the raw content:\n",
                content_type
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobMcpError;
    use crate::jobs::extract::EXTRACTION_FAILED;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = "<html><body><nav>Jobs</nav><main><h2>Backend Engineer</h2>\
        <p>Build and operate the payments API used by millions of customers every day across Europe.</p>\
        <p>Work with Rust, Postgres and Kafka in a small, senior team.</p></main></body></html>";

    fn fetcher() -> Fetcher {
        let config = Config::from_lookup(|var| match var {
            "AUTH_TOKEN" => Some("t".to_string()),
            "MY_NUMBER" => Some("1".to_string()),
            _ => None,
        })
        .unwrap();
        Fetcher::new(&config).unwrap()
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_html_is_simplified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/1"))
            .and(header("user-agent", "Puch/1.0 (Autonomous)"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(PAGE, "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let outcome = fetcher().fetch_url(&url(&server, "/jobs/1"), false).await.unwrap();

        assert!(outcome.notice.is_empty());
        assert!(outcome.content.contains("Backend Engineer"));
        assert!(outcome.content.contains("payments API"));
        assert!(!outcome.content.contains('<'));
    }

    #[tokio::test]
    async fn test_raw_returns_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(PAGE, "text/html"),
            )
            .mount(&server)
            .await;

        let outcome = fetcher().fetch_url(&url(&server, "/jobs/1"), true).await.unwrap();

        assert_eq!(outcome.content, PAGE);
        assert!(outcome.notice.starts_with("Content type text/html cannot be simplified"));
    }

    #[tokio::test]
    async fn test_non_html_is_returned_raw() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"title":"Engineer"}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let outcome = fetcher().fetch_url(&url(&server, "/jobs.json"), false).await.unwrap();

        assert_eq!(outcome.content, r#"{"title":"Engineer"}"#);
        assert!(outcome.notice.contains("application/json"));
    }

    #[tokio::test]
    async fn test_unreadable_html_yields_marker() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body><script>app()</script></body></html>", "text/html"),
            )
            .mount(&server)
            .await;

        let outcome = fetcher().fetch_url(&url(&server, "/spa"), false).await.unwrap();
        assert_eq!(outcome.content, EXTRACTION_FAILED);
    }

    #[tokio::test]
    async fn test_redirects_are_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("moved here", "text/plain"),
            )
            .mount(&server)
            .await;

        let outcome = fetcher().fetch_url(&url(&server, "/old"), false).await.unwrap();
        assert_eq!(outcome.content, "moved here");
    }

    #[tokio::test]
    async fn test_error_status_is_fetch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher().fetch_url(&url(&server, "/gone"), false).await.unwrap_err();
        assert!(matches!(
            err,
            JobMcpError::Fetch(FetchError::BadStatus { status: 404, .. })
        ));
        assert!(err.to_string().ends_with("status code 404"));
    }

    #[tokio::test]
    async fn test_connection_error_is_fetch_failure() {
        let url = Url::parse("http://127.0.0.1:9/unreachable").unwrap();
        let err = fetcher().fetch_url(&url, false).await.unwrap_err();
        assert!(matches!(err, JobMcpError::Fetch(FetchError::RequestFailed { .. })));
    }
}
