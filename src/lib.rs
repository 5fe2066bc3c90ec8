//! Bridge between a C/C++ language server and an AI assistant.
//!
//! Two independent pieces live here:
//!
//! - [`hover`]: the hover lifecycle coordinator that offers an on-demand,
//!   assistant-generated description and tracks loading/ready/cancelled state
//!   against the language server.
//! - [`context`]: normalization of compiler/project metadata into
//!   telemetry-safe labels, compiler-flag allow-listing, and the two chat
//!   tools built on top of it.
//!
//! The [`lsp`] module provides the JSON-RPC client used to talk to the
//! language server and [`mcp_server`] exposes the context tools over MCP.

pub mod config;
pub mod context;
pub mod host;
pub mod hover;
pub mod logging;
pub mod lsp;
pub mod mcp_server;
pub mod telemetry;

#[cfg(test)]
mod test_utils;
