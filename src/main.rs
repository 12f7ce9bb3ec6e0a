//! Job Finder MCP Server
//!
//! A Model Context Protocol (MCP) server for job hunting: analyze postings,
//! fetch them, search for openings and auto-apply with a resume.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use job_finder_mcp::client::{self, McpClient, PROBE_BASES};
use job_finder_mcp::config::{defaults, env, Config};
use job_finder_mcp::jobs::finder::JobFinder;
use job_finder_mcp::mcp::http;
use job_finder_mcp::mcp::server::McpServer;
use job_finder_mcp::mcp::tools::ToolHandler;

/// Job Finder MCP Server
#[derive(Parser)]
#[command(name = "job-finder-mcp")]
#[command(author, version, about = "Job Finder MCP Server - job hunting tools over the Model Context Protocol")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server (default)
    Serve {
        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Speak MCP on stdin/stdout instead of HTTP
        #[arg(long)]
        stdio: bool,
    },

    /// Auto-apply to a job through a running server
    Apply {
        /// Job application URL
        #[arg(long)]
        url: String,

        /// Path to the resume PDF
        #[arg(long)]
        resume: PathBuf,

        /// Applicant full name
        #[arg(long)]
        name: String,

        /// Applicant email
        #[arg(long)]
        email: String,

        /// What you are looking for, passed along as the user goal
        #[arg(long, default_value = "")]
        goal: String,

        /// MCP endpoint
        #[arg(long, default_value = defaults::ENDPOINT)]
        endpoint: String,
    },

    /// Call any tool on a running server
    Call {
        /// Tool name
        #[arg(long)]
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "{}")]
        arguments: String,

        /// MCP endpoint
        #[arg(long, default_value = defaults::ENDPOINT)]
        endpoint: String,
    },

    /// Check which URLs a server answers on
    Probe {
        /// Base URLs to try (repeatable)
        #[arg(long = "base")]
        bases: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
        stdio: false,
    }) {
        Commands::Serve { host, port, stdio } => run_server(host, port, stdio).await?,
        Commands::Apply {
            url,
            resume,
            name,
            email,
            goal,
            endpoint,
        } => {
            let client = McpClient::new(endpoint, auth_token()?)?;
            let result = client.apply_to_job(&url, &resume, &name, &email, &goal).await?;
            println!("\nApplication result:\n {}", result);
        }
        Commands::Call {
            tool,
            arguments,
            endpoint,
        } => {
            let arguments: serde_json::Value = serde_json::from_str(&arguments).context("--arguments must be a JSON object")?;
            let client = McpClient::new(endpoint, auth_token()?)?;
            println!("{}", client.call_tool(&tool, arguments).await?);
        }
        Commands::Probe { mut bases } => {
            if bases.is_empty() {
                bases = PROBE_BASES.iter().map(|b| b.to_string()).collect();
            }
            for report in client::probe(&bases).await? {
                println!("{}", report);
            }
        }
    }

    Ok(())
}

async fn run_server(host: Option<String>, port: Option<u16>, stdio: bool) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let finder = JobFinder::new(&config)?;
    let server = McpServer::new(ToolHandler::new(finder, config.phone_number.clone()));

    if stdio {
        tracing::info!("Serving MCP on stdio");
        server.run_stdio().await?;
    } else {
        http::serve(server, &config).await?;
    }

    Ok(())
}

fn auth_token() -> anyhow::Result<String> {
    std::env::var(env::AUTH_TOKEN)
        .ok()
        .filter(|token| !token.is_empty())
        .with_context(|| format!("{} not set. Set it in your environment before running.", env::AUTH_TOKEN))
}
