//! MCP client
//!
//! Calls the server's tools over HTTP and probes where it is listening.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{McpError, Result};
use crate::mcp::tools::JOB_FINDER;
use crate::mcp::types::{methods, JSONRPC_VERSION};
use crate::utils::encode_base64;

const CALL_TIMEOUT: Duration = Duration::from_secs(30);
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);
const PREVIEW_CHARS: usize = 400;
const NO_RESPONSE: &str = "No response";

/// Paths tried on every probed base URL
pub const PROBE_PATHS: [&str; 4] = ["", "/mcp/", "/mcp", "/"];

/// Default bases for `probe`
pub const PROBE_BASES: [&str; 2] = ["http://127.0.0.1:8086", "http://localhost:8086"];

/// HTTP client for a job finder MCP endpoint
pub struct McpClient {
    http_client: reqwest::Client,
    endpoint: String,
    auth_token: String,
}

impl McpClient {
    pub fn new(endpoint: impl Into<String>, auth_token: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(CALL_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            auth_token: auth_token.into(),
        })
    }

    /// Call a tool and return the reply text
    ///
    /// Server-side failures come back as `Error: ...` text; only transport
    /// problems are returned as `Err`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        let payload = json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": Uuid::new_v4().to_string(),
            "method": methods::CALL_TOOL,
            "params": {
                "name": name,
                "arguments": arguments,
            }
        });

        tracing::debug!(endpoint = %self.endpoint, tool = name, "Calling tool");

        let response = self
            .http_client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.auth_token))
            .header(ACCEPT, "application/json, text/event-stream")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Ok(format!("Error: {} - {}", status.as_u16(), body));
        }

        let reply: Value = serde_json::from_str(&body).map_err(|e| McpError::TransportError {
            message: format!("unexpected response body: {}", e),
        })?;

        Ok(reply_text(&reply))
    }

    /// Submit an application through the server's browser automation
    pub async fn apply_to_job(
        &self,
        job_url: &str,
        resume_path: &Path,
        name: &str,
        email: &str,
        user_goal: &str,
    ) -> Result<String> {
        let resume = tokio::fs::read(resume_path).await?;
        tracing::info!(resume = %resume_path.display(), "Sending application for {}", job_url);

        self.call_tool(
            JOB_FINDER,
            json!({
                "user_goal": user_goal,
                "job_url": job_url,
                "raw": false,
                "resume_base64": encode_base64(&resume),
                "name": name,
                "email": email,
            }),
        )
        .await
    }
}

fn reply_text(reply: &Value) -> String {
    if let Some(error) = reply.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return format!("Error: {}", message);
    }

    reply
        .pointer("/result/content/0/text")
        .and_then(Value::as_str)
        .unwrap_or(NO_RESPONSE)
        .to_string()
}

/// Outcome of one probed URL
#[derive(Debug)]
pub struct ProbeReport {
    pub url: String,
    pub outcome: std::result::Result<(u16, String), String>,
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok((status, preview)) => write!(f, "{:<40}  -> {}\n{}\n", self.url, status, preview),
            Err(e) => write!(f, "{:<40}  -> ERROR: {}", self.url, e),
        }
    }
}

/// GET every base URL under each of [`PROBE_PATHS`]
pub async fn probe(bases: &[String]) -> Result<Vec<ProbeReport>> {
    let http_client = reqwest::Client::builder().timeout(PROBE_TIMEOUT).build()?;
    let mut reports = Vec::with_capacity(bases.len() * PROBE_PATHS.len());

    for base in bases {
        for path in PROBE_PATHS {
            let url = format!("{}{}", base.trim_end_matches('/'), path);
            let outcome = match http_client.get(&url).send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    Ok((status, preview(&body)))
                }
                Err(e) => Err(e.to_string()),
            };
            reports.push(ProbeReport { url, outcome });
        }
    }

    Ok(reports)
}

fn preview(body: &str) -> String {
    body.chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn client(server: &MockServer) -> McpClient {
        McpClient::new(format!("{}/mcp", server.uri()), "tok").unwrap()
    }

    #[tokio::test]
    async fn test_call_tool_returns_first_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "jsonrpc": "2.0",
                "id": "x",
                "result": {"content": [{"type": "text", "text": "15550100"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server).call_tool("validate", json!({})).await.unwrap();
        assert_eq!(text, "15550100");
    }

    #[tokio::test]
    async fn test_call_tool_error_shapes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let text = client(&server).call_tool("validate", json!({})).await.unwrap();
        assert_eq!(text, "Error: 401 - Unauthorized");
    }

    #[test]
    fn test_reply_text() {
        let reply = json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "bad"}});
        assert_eq!(reply_text(&reply), "Error: bad");

        let reply = json!({"jsonrpc": "2.0", "id": 1, "result": {"content": []}});
        assert_eq!(reply_text(&reply), "No response");
    }

    #[tokio::test]
    async fn test_apply_to_job_sends_encoded_resume() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mcp"))
            .respond_with(|request: &Request| {
                let payload: Value = serde_json::from_slice(&request.body).unwrap();
                let args = &payload["params"]["arguments"];
                let ok = payload["method"] == "tools/call"
                    && payload["params"]["name"] == "job_finder"
                    && args["resume_base64"] == "JVBERi0xLjQ="
                    && args["email"] == "ada@example.com"
                    && payload["id"].as_str().map(|id| id.len() == 36).unwrap_or(false);
                let text = if ok { "submitted" } else { "mismatch" };
                ResponseTemplate::new(200).set_body_json(json!({
                    "jsonrpc": "2.0",
                    "id": payload["id"],
                    "result": {"content": [{"type": "text", "text": text}]}
                }))
            })
            .mount(&server)
            .await;

        let mut resume = tempfile::NamedTempFile::new().unwrap();
        resume.write_all(b"%PDF-1.4").unwrap();

        let text = client(&server)
            .apply_to_job(
                "https://jobs.example.com/apply/42",
                resume.path(),
                "Ada Lovelace",
                "ada@example.com",
                "",
            )
            .await
            .unwrap();
        assert_eq!(text, "submitted");
    }

    #[tokio::test]
    async fn test_probe_reports_status_and_preview() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(405).set_body_string("Method\nNot Allowed"))
            .mount(&server)
            .await;

        let reports = probe(&[format!("{}/", server.uri())]).await.unwrap();
        let urls: Vec<_> = reports.iter().map(|r| r.url.clone()).collect();
        assert_eq!(
            urls,
            vec![
                server.uri(),
                format!("{}/mcp/", server.uri()),
                format!("{}/mcp", server.uri()),
                format!("{}/", server.uri()),
            ]
        );
        assert_eq!(reports[0].outcome, Ok((405, "Method Not Allowed".to_string())));
    }

    #[test]
    fn test_preview_truncates() {
        let body = "a\n".repeat(300);
        let text = preview(&body);
        assert_eq!(text.chars().count(), 400);
        assert!(!text.contains('\n'));
    }
}
