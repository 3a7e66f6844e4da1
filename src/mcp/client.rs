//! MCP client over a child-process stdio transport.

use std::io::ErrorKind;
use std::sync::Arc;

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParams, CallToolResult, RawContent, Tool as McpTool};
use rmcp::service::{RoleClient, RunningService, ServiceExt};
use rmcp::transport::{ConfigureCommandExt, TokioChildProcess};
use rmcp::ClientHandler;
use serde_json::{Map, Value};
use tokio::process::Command;
use tokio::sync::RwLock;

use super::types::{ContentBlock, ToolDescriptor, ToolProvider, ToolResponse};
use super::McpError;
use crate::config::McpServerConfig;

/// Client handler that ignores server requests and notifications; we only
/// list and call tools.
#[derive(Debug, Clone, Copy, Default)]
struct MinimalClientHandler;

impl ClientHandler for MinimalClientHandler {}

type SharedService = Arc<RunningService<RoleClient, MinimalClientHandler>>;

/// Client for the academic search tool-provider.
pub struct McpClient {
    service: RwLock<Option<SharedService>>,
    /// Cached tool list, cleared on disconnect.
    tools: RwLock<Option<Vec<ToolDescriptor>>>,
    config: McpServerConfig,
}

impl McpClient {
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            service: RwLock::new(None),
            tools: RwLock::new(None),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Spawn the provider process and run the initialize handshake.
    pub async fn connect(&self) -> Result<(), McpError> {
        let command = self.config.command.clone();
        let args = self.config.args.clone();
        let env = self.config.env.clone();

        let transport = TokioChildProcess::new(Command::new(&command).configure(move |cmd| {
            cmd.args(&args);
            for (key, value) in &env {
                cmd.env(key, value);
            }
        }))
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => McpError::ExecutableNotFound {
                command: command.clone(),
            },
            _ => McpError::Spawn {
                command: command.clone(),
                message: e.to_string(),
            },
        })?;

        let service = MinimalClientHandler
            .serve(transport)
            .await
            .map_err(|e| McpError::Handshake(e.to_string()))?;

        tracing::info!(server = %self.config.name, "Connected to tool-provider");
        tracing::debug!(peer = ?service.peer_info(), "Tool-provider info");

        *self.service.write().await = Some(Arc::new(service));
        Ok(())
    }

    pub async fn disconnect(&self) -> Result<(), McpError> {
        if let Some(service) = self.service.write().await.take() {
            if let Ok(service) = Arc::try_unwrap(service) {
                service
                    .cancel()
                    .await
                    .map_err(|e| McpError::Shutdown(e.to_string()))?;
            }
        }
        *self.tools.write().await = None;
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.service.read().await.is_some()
    }

    async fn service(&self) -> Result<SharedService, McpError> {
        self.service
            .read()
            .await
            .as_ref()
            .cloned()
            .ok_or(McpError::NotConnected)
    }
}

#[async_trait]
impl ToolProvider for McpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
        if let Some(tools) = self.tools.read().await.as_ref() {
            return Ok(tools.clone());
        }

        let service = self.service().await?;
        let tools: Vec<ToolDescriptor> = service
            .list_all_tools()
            .await
            .map_err(|e| McpError::ListTools(e.to_string()))?
            .iter()
            .map(descriptor_from)
            .collect();

        tracing::debug!(server = %self.config.name, count = tools.len(), "Listed tools");
        *self.tools.write().await = Some(tools.clone());
        Ok(tools)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolResponse, McpError> {
        let service = self.service().await?;

        let result = service
            .call_tool(CallToolRequestParams {
                name: name.to_string().into(),
                arguments: Some(arguments),
                task: None,
                meta: None,
            })
            .await
            .map_err(|e| McpError::CallTool {
                tool: name.to_string(),
                message: e.to_string(),
            })?;

        Ok(response_from(&result))
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient")
            .field("config", &self.config)
            .finish()
    }
}

fn descriptor_from(tool: &McpTool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.as_deref().map(String::from),
        input_schema: (*tool.input_schema).clone(),
    }
}

fn response_from(result: &CallToolResult) -> ToolResponse {
    let content = result
        .content
        .iter()
        .map(|block| match &block.raw {
            RawContent::Text(text) => ContentBlock::Text(text.text.clone()),
            RawContent::Image(_) => ContentBlock::Other("image".into()),
            RawContent::Audio(_) => ContentBlock::Other("audio".into()),
            RawContent::Resource(_) => ContentBlock::Other("resource".into()),
            _ => ContentBlock::Other("other".into()),
        })
        .collect();

    ToolResponse {
        content,
        is_error: result.is_error.unwrap_or(false),
    }
}
