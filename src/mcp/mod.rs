//! Client side of the academic search tool-provider (MCP over stdio).

pub mod client;
pub mod resolve;
pub mod types;

pub use client::McpClient;
pub use resolve::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum McpError {
    #[error("Command `{command}` not found. Install it or put it on PATH, then retry")]
    ExecutableNotFound { command: String },

    #[error("Failed to start tool-provider `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("Tool-provider handshake failed: {0}")]
    Handshake(String),

    #[error("Not connected to the tool-provider")]
    NotConnected,

    #[error("Failed to list tools: {0}")]
    ListTools(String),

    #[error("Tool `{tool}` call failed: {message}")]
    CallTool { tool: String, message: String },

    #[error("Tool `{tool}` reported an error: {message}")]
    ToolReported { tool: String, message: String },

    #[error("Tool-provider advertises no tools")]
    NoTools,

    #[error("Failed to shut down tool-provider: {0}")]
    Shutdown(String),
}
