//! Error types for the Job Finder MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Job Finder MCP Server
#[derive(Error, Debug)]
pub enum JobMcpError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Job posting / search retrieval errors
    #[error("{0}")]
    Fetch(#[from] FetchError),

    /// Browser auto-apply errors
    #[error("Auto-apply failed: {0}")]
    Apply(#[from] ApplyError),

    /// Image conversion errors
    #[error("{0}")]
    Image(#[from] ImageError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Please provide either a job description, a job URL, a resume+URL+name+email for auto-apply, or a search query in user_goal.")]
    NoBranchMatched,

    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },
}

/// Errors retrieving a job posting or search results
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to fetch {url}: {message}")]
    RequestFailed { url: String, message: String },

    #[error("Failed to fetch {url} - status code {status}")]
    BadStatus { url: String, status: u16 },
}

/// Auto-apply errors, one per step that can go wrong
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("could not start browser: {message}")]
    Browser { message: String },

    #[error("could not open {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("no {field} field found on the page")]
    SelectorNotFound { field: String },

    #[error("could not fill {field} field: {message}")]
    FieldInput { field: String, message: String },

    #[error("could not submit the application: {message}")]
    Submission { message: String },

    #[error("could not stage resume file: {0}")]
    ResumeFile(#[source] std::io::Error),
}

/// Image processing errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Invalid image data: {message}")]
    Decode { message: String },

    #[error("Failed to encode image: {message}")]
    Encode { message: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Transport error: {message}")]
    TransportError { message: String },
}

/// Coarse classification reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    FetchFailure,
    ProcessingFailure,
    Internal,
}

impl JobMcpError {
    /// Classify this error for the caller
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobMcpError::Validation(_) => ErrorKind::InvalidInput,
            JobMcpError::Mcp(McpError::UnknownTool { .. })
            | JobMcpError::Mcp(McpError::InvalidArguments { .. }) => ErrorKind::InvalidInput,
            JobMcpError::Fetch(_) | JobMcpError::Http(_) => ErrorKind::FetchFailure,
            JobMcpError::Apply(_) | JobMcpError::Image(_) => ErrorKind::ProcessingFailure,
            JobMcpError::Config(_)
            | JobMcpError::Mcp(_)
            | JobMcpError::Io(_)
            | JobMcpError::Json(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for Job Finder MCP operations
pub type Result<T> = std::result::Result<T, JobMcpError>;
