//! Job Finder MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing job-hunting tools:
//! posting analysis, posting fetch, link search, browser auto-apply and
//! a grayscale image converter. Also ships a small client for the server.

pub mod client;
pub mod config;
pub mod error;
pub mod imaging;
pub mod jobs;
pub mod mcp;
pub mod utils;

pub use config::Config;
pub use error::{JobMcpError, Result};
