use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use super::McpError;

/// A tool advertised by the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    /// JSON schema of the tool's arguments.
    pub input_schema: Map<String, Value>,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: Map::new(),
        }
    }

    /// Declare string parameters in the input schema, in order.
    pub fn with_params(mut self, params: &[&str]) -> Self {
        let properties: Map<String, Value> = params
            .iter()
            .map(|p| (p.to_string(), serde_json::json!({ "type": "string" })))
            .collect();
        self.input_schema
            .insert("type".into(), Value::String("object".into()));
        self.input_schema
            .insert("properties".into(), Value::Object(properties));
        self
    }

    /// Names under `input_schema.properties`, in schema order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.input_schema
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameter_names().contains(&name)
    }
}

/// One content block of a tool response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    Text(String),
    /// Non-text block, kept as its kind only (`image`, `audio`, `resource`, ...).
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub content: Vec<ContentBlock>,
    pub is_error: bool,
}

impl ToolResponse {
    /// A successful single-text response.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::Text(text.into())],
            is_error: true,
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|block| match block {
            ContentBlock::Text(t) => Some(t.as_str()),
            ContentBlock::Other(_) => None,
        })
    }

    /// Text blocks joined by newlines.
    pub fn joined_text(&self) -> String {
        self.texts().collect::<Vec<_>>().join("\n")
    }

    /// Text blocks that parse as JSON, in block order. Other text is skipped.
    pub fn json_payloads(&self) -> Vec<Value> {
        self.texts()
            .filter_map(|t| serde_json::from_str(t.trim()).ok())
            .collect()
    }

    /// Turn a provider-reported error into `McpError::ToolReported`.
    pub fn into_result(self, tool: &str) -> Result<Self, McpError> {
        if self.is_error {
            Err(McpError::ToolReported {
                tool: tool.to_string(),
                message: self.joined_text(),
            })
        } else {
            Ok(self)
        }
    }
}

/// Academic search tool-provider abstraction (allows in-memory fakes).
#[async_trait]
pub trait ToolProvider: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError>;

    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<ToolResponse, McpError>;
}
