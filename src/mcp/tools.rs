//! MCP Tool definitions and handlers
//!
//! Defines all available tools and their implementations.

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{McpError, Result, ValidationError};
use crate::imaging::{to_grayscale_png, PNG_MIME};
use crate::jobs::finder::JobFinder;
use crate::jobs::request::{JobFinderArgs, JobRequest};
use crate::mcp::types::{CallToolResult, RichToolDescription, Tool};
use crate::utils::digits_only;

pub const VALIDATE: &str = "validate";
pub const JOB_FINDER: &str = "job_finder";
pub const MAKE_IMG_BLACK_AND_WHITE: &str = "make_img_black_and_white";

/// Arguments of `make_img_black_and_white`
#[derive(Debug, Default, Deserialize, JsonSchema)]
struct ImageArgs {
    /// Base64-encoded image data to convert to black and white
    #[serde(default, alias = "image_data")]
    puch_image_data: Option<String>,
}

/// `validate` takes no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
struct NoArgs {}

/// Tool handler
pub struct ToolHandler {
    job_finder: JobFinder,
    phone_number: String,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(job_finder: JobFinder, phone_number: impl Into<String>) -> Self {
        Self {
            job_finder,
            phone_number: phone_number.into(),
        }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            Tool {
                name: VALIDATE.to_string(),
                description: Some(
                    "Return the phone number in {country_code}{number} format with only digits."
                        .to_string(),
                ),
                input_schema: schema_value::<NoArgs>(),
            },
            tool_def(
                JOB_FINDER,
                RichToolDescription {
                    description: "Smart job tool: analyze descriptions, fetch URLs, or search jobs based on free text.".to_string(),
                    use_when: "Use this to evaluate job descriptions or search for jobs using freeform goals.".to_string(),
                    side_effects: Some("Returns insights, fetched job descriptions, or relevant job links.".to_string()),
                },
                schema_value::<JobFinderArgs>(),
            ),
            tool_def(
                MAKE_IMG_BLACK_AND_WHITE,
                RichToolDescription {
                    description: "Convert an image to black and white and save it.".to_string(),
                    use_when: "Use this tool when the user provides an image URL and requests it to be converted to black and white.".to_string(),
                    side_effects: Some("The image will be processed and saved in a black and white format.".to_string()),
                },
                schema_value::<ImageArgs>(),
            ),
        ]
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<CallToolResult> {
        match name {
            VALIDATE => Ok(CallToolResult::text(digits_only(&self.phone_number))),
            JOB_FINDER => self.handle_job_finder(args).await,
            MAKE_IMG_BLACK_AND_WHITE => self.handle_black_and_white(args),
            _ => Err(McpError::UnknownTool {
                name: name.to_string(),
            }
            .into()),
        }
    }

    // ==================== Tool Handlers ====================

    async fn handle_job_finder(&self, args: Value) -> Result<CallToolResult> {
        let args: JobFinderArgs = parse_args(args)?;
        let request = JobRequest::try_from(args)?;
        let text = self.job_finder.run(request).await?;
        Ok(CallToolResult::text(text))
    }

    fn handle_black_and_white(&self, args: Value) -> Result<CallToolResult> {
        let args: ImageArgs = parse_args(args)?;
        let data = args.puch_image_data.ok_or_else(|| ValidationError::MissingField {
            field: "puch_image_data".to_string(),
        })?;

        let png = to_grayscale_png(&data)?;
        Ok(CallToolResult::image(png, PNG_MIME))
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    // Clients may send `null` instead of `{}` for argument-less calls
    let args = if args.is_null() { Value::Object(Default::default()) } else { args };

    serde_json::from_value(args).map_err(|e| {
        McpError::InvalidArguments {
            message: e.to_string(),
        }
        .into()
    })
}

fn tool_def(name: &str, description: RichToolDescription, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: serde_json::to_string(&description).ok(),
        input_schema,
    }
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| serde_json::json!({"type": "object"}))
}
