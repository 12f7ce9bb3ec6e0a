//! MCP (Model Context Protocol) module
//!
//! JSON-RPC tool server over HTTP or stdio.

pub mod http;
pub mod server;
pub mod tools;
pub mod types;
