//! HTTP transport
//!
//! `POST /mcp` with a bearer token; one JSON-RPC message per request.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::Result;
use crate::mcp::server::McpServer;
use crate::mcp::types::JsonRpcRequest;

#[derive(Clone)]
struct HttpState {
    server: McpServer,
    auth_token: Arc<str>,
}

/// Build the MCP router
pub fn router(server: McpServer, auth_token: impl Into<String>) -> Router {
    let state = HttpState {
        server,
        auth_token: Arc::from(auth_token.into()),
    };

    Router::new()
        .route("/mcp", post(handle_mcp))
        .route("/mcp/", post(handle_mcp))
        .with_state(state)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

/// Serve the MCP endpoint until the process exits
pub async fn serve(server: McpServer, config: &Config) -> Result<()> {
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Serving MCP on http://{}/mcp", addr);

    axum::serve(listener, router(server, config.auth_token.clone())).await?;
    Ok(())
}

async fn handle_mcp(State(state): State<HttpState>, headers: HeaderMap, body: String) -> Response {
    if !is_authorized(&headers, &state.auth_token) {
        tracing::warn!("Rejected request with missing or invalid bearer token");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, format!("Invalid JSON-RPC message: {}", e)).into_response();
        }
    };

    match state.server.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

fn is_authorized(headers: &HeaderMap, token: &str) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|presented| presented.trim() == token)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::apply::tests::FakeDriver;
    use crate::jobs::finder::JobFinder;
    use crate::mcp::tools::ToolHandler;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    const TOKEN: &str = "secret-token";

    fn app() -> Router {
        let config = Config::from_lookup(|var| match var {
            "AUTH_TOKEN" => Some(TOKEN.to_string()),
            "MY_NUMBER" => Some("+1 555 0100".to_string()),
            _ => None,
        })
        .unwrap();
        let finder = JobFinder::with_driver(&config, Arc::new(FakeDriver::full_form())).unwrap();
        let server = McpServer::new(ToolHandler::new(finder, config.phone_number.clone()));
        router(server, config.auth_token)
    }

    fn post(uri: &str, token: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    const VALIDATE_CALL: &str =
        r#"{"jsonrpc":"2.0","id":7,"method":"tools/call","params":{"name":"validate","arguments":{}}}"#;

    #[tokio::test]
    async fn test_rejects_missing_and_wrong_token() {
        let response = app().oneshot(post("/mcp", None, VALIDATE_CALL)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app()
            .oneshot(post("/mcp", Some("nope"), VALIDATE_CALL))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, "Unauthorized");
    }

    #[tokio::test]
    async fn test_validate_over_http() {
        for uri in ["/mcp", "/mcp/"] {
            let response = app().oneshot(post(uri, Some(TOKEN), VALIDATE_CALL)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
            assert_eq!(json["id"], 7);
            assert_eq!(json["result"]["content"][0]["text"], "15550100");
        }
    }

    #[tokio::test]
    async fn test_bad_body_and_notification() {
        let response = app().oneshot(post("/mcp", Some(TOKEN), "not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app()
            .oneshot(post(
                "/mcp",
                Some(TOKEN),
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert!(body_text(response).await.is_empty());
    }

    #[test]
    fn test_is_authorized() {
        let mut headers = HeaderMap::new();
        assert!(!is_authorized(&headers, TOKEN));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(!is_authorized(&headers, TOKEN));

        headers.insert(header::AUTHORIZATION, format!("Bearer {}", TOKEN).parse().unwrap());
        assert!(is_authorized(&headers, TOKEN));
    }
}
