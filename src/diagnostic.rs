//! Tool-provider health check and response rendering for operators.
//!
//! `check-server` runs handshake → list tools → one sample call and reports
//! what it saw. `test-search` runs a single search and pretty-prints the
//! returned blocks. A failing sample call is reported, not raised.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::mcp::{
    resolve_argument_name, resolve_tool, ContentBlock, McpError, ToolDescriptor, ToolProvider,
    ToolResponse, DEFAULT_QUERY_ARGUMENT, QUERY_ARGUMENT_PREFERENCE,
};

// ──────────────────────────────────────────────
// Probe definition
// ──────────────────────────────────────────────

/// Sample call: a tool-name substring plus the arguments to send.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthProbe {
    pub tool_hint: String,
    /// `None` resolves the argument name from the tool schema at call time.
    pub arguments: Option<Map<String, Value>>,
    /// Free-text value used when `arguments` is `None`.
    pub query: String,
}

impl HealthProbe {
    /// Look up one author by name (default for `check-server`).
    pub fn author_search(name: &str) -> Self {
        let mut arguments = Map::new();
        arguments.insert("name".into(), Value::String(name.into()));
        Self {
            tool_hint: "search_author".into(),
            arguments: Some(arguments),
            query: name.into(),
        }
    }

    /// Free-text search on the first `search` tool (used by `test-search`).
    pub fn topic_search(topic: &str) -> Self {
        Self {
            tool_hint: "search".into(),
            arguments: None,
            query: topic.into(),
        }
    }

    fn arguments_for(&self, tool: &ToolDescriptor) -> Map<String, Value> {
        if let Some(arguments) = &self.arguments {
            return arguments.clone();
        }
        let name = resolve_argument_name(tool, &QUERY_ARGUMENT_PREFERENCE, DEFAULT_QUERY_ARGUMENT);
        let mut arguments = Map::new();
        arguments.insert(name.to_string(), Value::String(self.query.clone()));
        arguments
    }
}

// ──────────────────────────────────────────────
// Report
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeResult {
    Success { response: ToolResponse },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub tools: Vec<ToolDescriptor>,
    pub probe_tool: String,
    pub probe_arguments: Map<String, Value>,
    pub probe: ProbeResult,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        matches!(self.probe, ProbeResult::Success { .. })
    }
}

impl fmt::Display for HealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tools.is_empty() {
            writeln!(f, "Server connected but returned 0 tools")?;
        } else {
            writeln!(f, "Available tools ({}):", self.tools.len())?;
        }
        for tool in &self.tools {
            match &tool.description {
                Some(desc) => writeln!(f, "  - {}: {}", tool.name, first_line(desc))?,
                None => writeln!(f, "  - {}", tool.name)?,
            }
        }

        let args = Value::Object(self.probe_arguments.clone());
        writeln!(f, "Sample call: {} {}", self.probe_tool, args)?;
        match &self.probe {
            ProbeResult::Success { response } => {
                writeln!(f, "Result:")?;
                write!(f, "{}", render_response(response))
            }
            ProbeResult::Failed { error } => write!(f, "Sample call failed: {error}"),
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim()
}

// ──────────────────────────────────────────────
// Operations
// ──────────────────────────────────────────────

/// List tools, then make one sample call. Only a failed listing is an error;
/// an empty listing is reported as a failed sample call.
pub async fn run_health_check(
    provider: &dyn ToolProvider,
    probe: &HealthProbe,
) -> Result<HealthReport, McpError> {
    let tools = provider.list_tools().await?;
    let tool = match resolve_tool(&tools, &probe.tool_hint) {
        Ok(tool) => tool.clone(),
        Err(e) => {
            tracing::warn!(error = %e, "No tool to run the sample call against");
            return Ok(HealthReport {
                tools,
                probe_tool: probe.tool_hint.clone(),
                probe_arguments: probe.arguments.clone().unwrap_or_default(),
                probe: ProbeResult::Failed {
                    error: e.to_string(),
                },
            });
        }
    };
    let arguments = probe.arguments_for(&tool);

    tracing::info!(tool = %tool.name, "Running sample call");
    let probe_result = match provider.call_tool(&tool.name, arguments.clone()).await {
        Ok(response) if response.is_error => ProbeResult::Failed {
            error: response.joined_text(),
        },
        Ok(response) => ProbeResult::Success { response },
        Err(e) => {
            tracing::warn!(tool = %tool.name, error = %e, "Sample call failed");
            ProbeResult::Failed {
                error: e.to_string(),
            }
        }
    };

    Ok(HealthReport {
        tools,
        probe_tool: tool.name,
        probe_arguments: arguments,
        probe: probe_result,
    })
}

/// Pretty-print each block: JSON text indented, other text as-is, non-text
/// blocks as a kind marker.
pub fn render_response(response: &ToolResponse) -> String {
    response
        .content
        .iter()
        .map(|block| match block {
            ContentBlock::Text(text) => match serde_json::from_str::<Value>(text.trim()) {
                Ok(json) => serde_json::to_string_pretty(&json).unwrap_or_else(|_| text.clone()),
                Err(_) => text.clone(),
            },
            ContentBlock::Other(kind) => format!("[{kind} content]"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Fake {
        fail_calls: bool,
    }

    #[async_trait]
    impl ToolProvider for Fake {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
            Ok(vec![
                ToolDescriptor::new("search_keywords").with_params(&["keywords"]),
                ToolDescriptor::new("search_author").with_params(&["name"]),
            ])
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: Map<String, Value>,
        ) -> Result<ToolResponse, McpError> {
            if self.fail_calls {
                return Err(McpError::CallTool {
                    tool: name.into(),
                    message: "blocked by captcha".into(),
                });
            }
            Ok(ToolResponse::text(Value::Object(arguments).to_string()))
        }
    }

    #[tokio::test]
    async fn author_probe_uses_search_author() {
        let report = run_health_check(&Fake { fail_calls: false }, &HealthProbe::author_search("Geoffrey Hinton"))
            .await
            .unwrap();

        assert_eq!(report.tools.len(), 2);
        assert_eq!(report.probe_tool, "search_author");
        assert!(report.is_healthy());
        assert_eq!(report.probe_arguments["name"], "Geoffrey Hinton");
    }

    #[tokio::test]
    async fn topic_probe_resolves_argument_from_schema() {
        let report = run_health_check(&Fake { fail_calls: false }, &HealthProbe::topic_search("robotics"))
            .await
            .unwrap();

        assert_eq!(report.probe_tool, "search_keywords");
        assert_eq!(report.probe_arguments["keywords"], "robotics");
    }

    #[tokio::test]
    async fn failed_probe_is_reported_not_raised() {
        let report = run_health_check(&Fake { fail_calls: true }, &HealthProbe::author_search("X"))
            .await
            .unwrap();

        assert!(!report.is_healthy());
        let text = report.to_string();
        assert!(text.contains("Sample call failed"));
        assert!(text.contains("captcha"));
        assert!(text.contains("  - search_author"));
    }

    #[test]
    fn render_pretty_prints_json_blocks() {
        let response = ToolResponse {
            content: vec![
                ContentBlock::Text(r#"{"name":"Alice","interests":["ML"]}"#.into()),
                ContentBlock::Text("plain note".into()),
                ContentBlock::Other("image".into()),
            ],
            is_error: false,
        };
        let rendered = render_response(&response);
        assert!(rendered.contains("  \"name\": \"Alice\""));
        assert!(rendered.contains("plain note"));
        assert!(rendered.ends_with("[image content]"));
    }

    struct NoTools;

    #[async_trait]
    impl ToolProvider for NoTools {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
            Ok(Vec::new())
        }

        async fn call_tool(
            &self,
            name: &str,
            _arguments: Map<String, Value>,
        ) -> Result<ToolResponse, McpError> {
            panic!("unexpected call to {name}");
        }
    }

    #[tokio::test]
    async fn empty_tool_list_is_reported() {
        let report = run_health_check(&NoTools, &HealthProbe::author_search("Geoffrey Hinton"))
            .await
            .unwrap();

        assert!(report.tools.is_empty());
        assert!(!report.is_healthy());
        assert_eq!(report.probe_tool, "search_author");
        assert_eq!(report.probe_arguments["name"], "Geoffrey Hinton");
        let text = report.to_string();
        assert!(text.contains("Server connected but returned 0 tools"));
        assert!(text.contains("Sample call failed"));
    }
}
