//! `job_finder` dispatcher
//!
//! Runs one [`JobRequest`] to completion and renders the reply text.

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::jobs::apply::Applicant;
use crate::jobs::browser::{BrowserDriver, ChromiumDriver};
use crate::jobs::fetch::Fetcher;
use crate::jobs::request::JobRequest;
use crate::jobs::search::SearchClient;

/// Stateless handler for `job_finder` calls
#[derive(Clone)]
pub struct JobFinder {
    fetcher: Fetcher,
    search: SearchClient,
    applicant: Applicant,
}

impl JobFinder {
    /// Build a finder driving a real Chromium for auto-apply
    pub fn new(config: &Config) -> Result<Self> {
        let driver = ChromiumDriver::new(config.chrome_executable.clone(), config.headless);
        Self::with_driver(config, Arc::new(driver))
    }

    /// Build a finder with a custom browser driver
    pub fn with_driver(config: &Config, driver: Arc<dyn BrowserDriver>) -> Result<Self> {
        let fetcher = Fetcher::new(config)?;
        let search = SearchClient::new(fetcher.http_client().clone(), config);

        Ok(Self {
            fetcher,
            search,
            applicant: Applicant::new(driver),
        })
    }

    /// Run a request
    pub async fn run(&self, request: JobRequest) -> Result<String> {
        tracing::info!(branch = request.branch(), "Handling job_finder request");

        match request {
            JobRequest::AutoApply(application) => {
                self.applicant.apply(&application).await?;
                Ok(format!(
                    "✅ Application submitted successfully at {}",
                    application.job_url
                ))
            }
            JobRequest::Analyze {
                description,
                user_goal,
            } => Ok(render_analysis(&description, &user_goal)),
            JobRequest::Fetch {
                url,
                raw,
                user_goal,
            } => {
                let outcome = self.fetcher.fetch_url(&url, raw).await?;
                Ok(format!(
                    "🔗 **Fetched Job Posting from URL**: {}\n\n---\n{}{}\n---\n\nUser Goal: **{}**",
                    url,
                    outcome.notice,
                    outcome.content.trim(),
                    user_goal
                ))
            }
            JobRequest::Search { query } => {
                let links = self.search.search_links(&query).await?;
                Ok(render_search(&query, &links))
            }
        }
    }
}

fn render_analysis(description: &str, user_goal: &str) -> String {
    format!(
        "📝 **Job Description Analysis**\n\n---\n{}\n---\n\nUser Goal: **{}**\n\n\
         💡 Suggestions:\n- Tailor your resume.\n- Highlight relevant skills.\n- Consider applying if relevant.",
        description.trim(),
        user_goal
    )
}

fn render_search(query: &str, links: &[String]) -> String {
    let list = links
        .iter()
        .map(|link| format!("- {}", link))
        .collect::<Vec<_>>()
        .join("\n");
    format!("🔍 **Search Results for**: _{}_\n\n{}", query, list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ApplyError, JobMcpError};
    use crate::jobs::apply::tests::{application, FakeDriver};
    use reqwest::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(search_url: &str) -> Config {
        let search_url = search_url.to_string();
        Config::from_lookup(move |var| match var {
            "AUTH_TOKEN" => Some("t".to_string()),
            "MY_NUMBER" => Some("1".to_string()),
            "JOB_MCP_SEARCH_URL" => Some(search_url.clone()),
            "JOB_MCP_SEARCH_RESULTS" => Some("3".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn finder(search_url: &str, driver: FakeDriver) -> JobFinder {
        JobFinder::with_driver(&config(search_url), Arc::new(driver)).unwrap()
    }

    #[tokio::test]
    async fn test_analysis_echoes_inputs_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let finder = finder(&format!("{}/html/", server.uri()), FakeDriver::full_form());
        let text = finder
            .run(JobRequest::Analyze {
                description: "  Rust developer, remote  ".to_string(),
                user_goal: "land a backend role".to_string(),
            })
            .await
            .unwrap();

        assert!(text.starts_with("📝 **Job Description Analysis**"));
        assert!(text.contains("---\nRust developer, remote\n---"));
        assert!(text.contains("User Goal: **land a backend role**"));
        assert!(text.contains("Tailor your resume."));
    }

    #[tokio::test]
    async fn test_fetch_renders_posting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/plain")
                    .set_body_string("  Platform engineer wanted  "),
            )
            .mount(&server)
            .await;

        let finder = finder(&format!("{}/html/", server.uri()), FakeDriver::full_form());
        let url = Url::parse(&format!("{}/jobs/7", server.uri())).unwrap();
        let text = finder
            .run(JobRequest::Fetch {
                url: url.clone(),
                raw: false,
                user_goal: "evaluate".to_string(),
            })
            .await
            .unwrap();

        assert!(text.starts_with(&format!("🔗 **Fetched Job Posting from URL**: {}", url)));
        assert!(text.contains("cannot be simplified to markdown"));
        assert!(text.contains("raw content:\nPlatform engineer wanted\n---"));
        assert!(text.ends_with("User Goal: **evaluate**"));
    }

    #[tokio::test]
    async fn test_search_lists_links() {
        let server = MockServer::start().await;
        let page = (0..6)
            .map(|i| format!("<a class=\"result__a\" href=\"https://jobs.example.com/{i}\">Job</a>"))
            .collect::<String>();
        Mock::given(method("GET"))
            .and(path("/html/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .expect(1)
            .mount(&server)
            .await;

        let finder = finder(&format!("{}/html/", server.uri()), FakeDriver::full_form());
        let text = finder
            .run(JobRequest::Search {
                query: "find a job".to_string(),
            })
            .await
            .unwrap();

        assert!(text.starts_with("🔍 **Search Results for**: _find a job_\n\n"));
        assert_eq!(text.matches("\n- https://jobs.example.com/").count(), 3);
    }

    #[tokio::test]
    async fn test_auto_apply_reports_url() {
        let finder = finder("http://127.0.0.1:9/html/", FakeDriver::full_form());
        let text = finder.run(JobRequest::AutoApply(application())).await.unwrap();
        assert_eq!(
            text,
            "✅ Application submitted successfully at https://jobs.example.com/apply/42"
        );
    }

    #[tokio::test]
    async fn test_auto_apply_failure_is_classified() {
        let mut driver = FakeDriver::full_form();
        driver.fail_click = true;
        let finder = finder("http://127.0.0.1:9/html/", driver);

        let err = finder.run(JobRequest::AutoApply(application())).await.unwrap_err();
        assert!(matches!(err, JobMcpError::Apply(ApplyError::Submission { .. })));
        assert!(err.to_string().starts_with("Auto-apply failed:"));
    }
}
