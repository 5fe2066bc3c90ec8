//! MCP surface exposing the context tools to a chat client

pub mod context_tools;
pub mod hover_tools;
pub mod server;
pub mod utils;

pub use server::BridgeServerHandler;
