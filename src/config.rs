//! Configuration management for the Job Finder MCP Server
//!
//! Handles environment variables and configuration loading.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Configuration for the Job Finder MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token required on every HTTP call
    pub auth_token: String,

    /// Phone number returned by the `validate` tool
    pub phone_number: String,

    /// Address the HTTP transport binds to
    pub host: String,

    /// Port the HTTP transport binds to
    pub port: u16,

    /// User agent sent when fetching postings and search results
    pub user_agent: String,

    /// Per-request timeout for outbound HTTP
    pub fetch_timeout: Duration,

    /// Search engine HTML endpoint
    pub search_url: String,

    /// Maximum number of search links returned
    pub search_results: usize,

    /// Browser binary used for auto-apply (auto-detected when unset)
    pub chrome_executable: Option<PathBuf>,

    /// Run the auto-apply browser without a window
    pub headless: bool,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar {
                    var: var.to_string(),
                })
        };

        Ok(Self {
            auth_token: required(env::AUTH_TOKEN)?,
            phone_number: required(env::MY_NUMBER)?,
            host: lookup(env::HOST).unwrap_or_else(|| defaults::HOST.to_string()),
            port: parse_or(&lookup, env::PORT, defaults::PORT)?,
            user_agent: lookup(env::USER_AGENT).unwrap_or_else(|| defaults::USER_AGENT.to_string()),
            fetch_timeout: Duration::from_secs(parse_or(
                &lookup,
                env::FETCH_TIMEOUT_SECS,
                defaults::FETCH_TIMEOUT_SECS,
            )?),
            search_url: lookup(env::SEARCH_URL).unwrap_or_else(|| defaults::SEARCH_URL.to_string()),
            search_results: parse_or(&lookup, env::SEARCH_RESULTS, defaults::SEARCH_RESULTS)?,
            chrome_executable: lookup(env::CHROME_PATH).map(PathBuf::from),
            headless: parse_or(&lookup, env::HEADLESS, true)?,
        })
    }

    /// Socket address string for the HTTP transport
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| {
            ConfigError::InvalidValue {
                var: var.to_string(),
                message: e.to_string(),
            }
            .into()
        }),
        None => Ok(default),
    }
}

/// Environment variable names
pub mod env {
    pub const AUTH_TOKEN: &str = "AUTH_TOKEN";
    pub const MY_NUMBER: &str = "MY_NUMBER";
    pub const HOST: &str = "JOB_MCP_HOST";
    pub const PORT: &str = "JOB_MCP_PORT";
    pub const USER_AGENT: &str = "JOB_MCP_USER_AGENT";
    pub const FETCH_TIMEOUT_SECS: &str = "JOB_MCP_FETCH_TIMEOUT_SECS";
    pub const SEARCH_URL: &str = "JOB_MCP_SEARCH_URL";
    pub const SEARCH_RESULTS: &str = "JOB_MCP_SEARCH_RESULTS";
    pub const CHROME_PATH: &str = "JOB_MCP_CHROME_PATH";
    pub const HEADLESS: &str = "JOB_MCP_HEADLESS";
}

/// Default values
pub mod defaults {
    pub const HOST: &str = "0.0.0.0";
    pub const PORT: u16 = 8086;
    pub const USER_AGENT: &str = "Puch/1.0 (Autonomous)";
    pub const FETCH_TIMEOUT_SECS: u64 = 30;
    pub const SEARCH_URL: &str = "https://html.duckduckgo.com/html/";
    pub const SEARCH_RESULTS: usize = 5;

    /// Endpoint the client commands talk to
    pub const ENDPOINT: &str = "http://127.0.0.1:8086/mcp";
}
