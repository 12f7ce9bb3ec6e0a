//! Job tools
//!
//! Request model, posting fetch, link search and browser auto-apply behind
//! the `job_finder` tool.

pub mod apply;
pub mod browser;
pub mod extract;
pub mod fetch;
pub mod finder;
pub mod request;
pub mod search;
