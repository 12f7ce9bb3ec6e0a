//! MCP Server implementation
//!
//! Handles JSON-RPC messages for both the HTTP and stdio transports.

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::Result;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;

/// MCP Server info
const SERVER_NAME: &str = "Job Finder MCP Server";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP Server for the job tools
///
/// Stateless: every message is handled on its own, so one server can be
/// shared across concurrent HTTP requests.
#[derive(Clone)]
pub struct McpServer {
    /// Tool handler
    tool_handler: Arc<ToolHandler>,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(tool_handler: ToolHandler) -> Self {
        Self {
            tool_handler: Arc::new(tool_handler),
        }
    }

    /// Run the server on stdio
    pub async fn run_stdio(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line).await {
                let mut response_str = serde_json::to_string(&response)?;
                response_str.push('\n');
                stdout.write_all(response_str.as_bytes()).await?;
                stdout.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a raw JSON-RPC message
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    RequestId::Number(0),
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a parsed JSON-RPC request; `None` for notifications
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "Notification received");
            return None;
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!("Unsupported jsonrpc version: {}", request.jsonrpc)),
            ));
        }

        let outcome = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(),
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => self.handle_list_tools(),
            methods::CALL_TOOL => self.handle_call_tool(&request).await,
            // A notification sent with an id still gets an empty ack
            methods::INITIALIZED => Ok(serde_json::json!({})),
            _ => Err(JsonRpcError::method_not_found(&request.method)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> std::result::Result<Value, JsonRpcError> {
        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {}),
            },
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> std::result::Result<Value, JsonRpcError> {
        let result = ListToolsResult {
            tools: self.tool_handler.list_tools(),
        };

        serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
    }

    /// Handle call tool request
    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        let params: CallToolParams = match request.params.as_ref() {
            Some(p) => serde_json::from_value(p.clone())
                .map_err(|e| JsonRpcError::invalid_params(format!("Invalid tool parameters: {}", e)))?,
            None => return Err(JsonRpcError::invalid_params("Missing tool parameters")),
        };

        tracing::info!(tool = %params.name, "Tool call");

        match self.tool_handler.call_tool(&params.name, params.arguments).await {
            Ok(result) => {
                serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
            }
            Err(e) => {
                tracing::warn!(tool = %params.name, error = %e, "Tool call failed");
                Err(JsonRpcError::from(&e))
            }
        }
    }
}
