use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::stage::{Stage, DISCOVERY};
use super::state::PipelineState;
use super::GraphError;
use crate::mcp::{
    resolve_argument_name, resolve_tool, ToolProvider, ToolResponse, DEFAULT_QUERY_ARGUMENT,
    QUERY_ARGUMENT_PREFERENCE,
};
use crate::models::Candidate;
use crate::pipeline::structuring::ResponseShape;

/// Tool-name substring used to find the search tool.
pub const SEARCH_TOOL_HINT: &str = "search";

/// Finds candidate researchers for the topic and appends them to the state.
pub struct DiscoveryStage {
    provider: Arc<dyn ToolProvider>,
    tool_hint: String,
    max_candidates: Option<usize>,
}

impl DiscoveryStage {
    pub fn new(provider: Arc<dyn ToolProvider>) -> Self {
        Self {
            provider,
            tool_hint: SEARCH_TOOL_HINT.to_string(),
            max_candidates: None,
        }
    }

    pub fn with_max_candidates(mut self, max: Option<usize>) -> Self {
        self.max_candidates = max;
        self
    }
}

#[async_trait]
impl Stage for DiscoveryStage {
    fn name(&self) -> &'static str {
        DISCOVERY
    }

    async fn run(&self, state: &mut PipelineState) -> Result<(), GraphError> {
        let tools = self.provider.list_tools().await?;
        let tool = resolve_tool(&tools, &self.tool_hint)?;
        let argument = resolve_argument_name(tool, &QUERY_ARGUMENT_PREFERENCE, DEFAULT_QUERY_ARGUMENT);

        tracing::info!(tool = %tool.name, argument, topic = %state.topic, "Searching for candidates");

        let mut arguments = Map::new();
        arguments.insert(argument.to_string(), Value::String(state.topic.clone()));

        let response = self
            .provider
            .call_tool(&tool.name, arguments)
            .await?
            .into_result(&tool.name)?;

        let mut found = decode_candidates(&response);
        if let Some(max) = self.max_candidates {
            found.truncate(max);
        }

        tracing::info!(count = found.len(), "Discovered candidates");
        state.candidates.extend(found);
        Ok(())
    }
}

/// Decode every JSON text block into candidates, in block order.
///
/// A block may hold a list, a wrapper mapping (`{"authors": [...]}` and the
/// like) or a single author object. A mapping holding a list of objects is a
/// wrapper even when it also carries a `name`. Entries without a name are
/// dropped.
pub fn decode_candidates(response: &ToolResponse) -> Vec<Candidate> {
    response
        .json_payloads()
        .into_iter()
        .flat_map(|payload| {
            if !is_wrapper(&payload) {
                if let Some(single) = Candidate::from_json(&payload) {
                    return vec![single];
                }
            }
            wrapped_entries(payload)
                .iter()
                .filter_map(Candidate::from_json)
                .collect()
        })
        .collect()
}

fn is_wrapper(payload: &Value) -> bool {
    payload
        .as_object()
        .is_some_and(|map| map.values().any(is_object_list))
}

fn is_object_list(value: &Value) -> bool {
    value
        .as_array()
        .is_some_and(|items| items.iter().any(Value::is_object))
}

/// Items of a list or wrapper payload. A wrapper whose first value is not the
/// list falls back to its first list of objects.
fn wrapped_entries(payload: Value) -> Vec<Value> {
    let first_object_list = payload
        .as_object()
        .and_then(|map| map.values().find(|v| is_object_list(v)).cloned());

    match ResponseShape::classify(payload).and_then(ResponseShape::into_items) {
        Ok(items) => items,
        Err(e) => match first_object_list {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::debug!(error = %e, "Skipping undecodable search payload");
                Vec::new()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::mcp::{McpError, ToolDescriptor};

    /// Provider with fixed tools that records calls and answers with `reply`.
    struct FixedProvider {
        tools: Vec<ToolDescriptor>,
        reply: ToolResponse,
        calls: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    impl FixedProvider {
        fn new(tools: Vec<ToolDescriptor>, reply: ToolResponse) -> Self {
            Self {
                tools,
                reply,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ToolProvider for FixedProvider {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, McpError> {
            Ok(self.tools.clone())
        }

        async fn call_tool(
            &self,
            name: &str,
            arguments: Map<String, Value>,
        ) -> Result<ToolResponse, McpError> {
            self.calls.lock().unwrap().push((name.to_string(), arguments));
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn calls_search_tool_with_topic() {
        let provider = Arc::new(FixedProvider::new(
            vec![
                ToolDescriptor::new("get_author").with_params(&["name"]),
                ToolDescriptor::new("search_keywords").with_params(&["keywords", "num_results"]),
            ],
            ToolResponse::text(r#"[{"name": "Alice", "affiliation": "MIT"}, {"name": "Bob"}]"#),
        ));
        let stage = DiscoveryStage::new(provider.clone());
        let mut state = PipelineState::new("federated learning");

        stage.run(&mut state).await.unwrap();

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "search_keywords");
        assert_eq!(calls[0].1["keywords"], "federated learning");

        let names: Vec<&str> = state.candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
        assert_eq!(state.candidates[0].affiliation.as_deref(), Some("MIT"));
    }

    #[tokio::test]
    async fn max_candidates_caps_the_list() {
        let provider = Arc::new(FixedProvider::new(
            vec![ToolDescriptor::new("search")],
            ToolResponse::text(r#"{"authors": [{"name": "A"}, {"name": "B"}, {"name": "C"}]}"#),
        ));
        let stage = DiscoveryStage::new(provider.clone()).with_max_candidates(Some(2));
        let mut state = PipelineState::new("x");

        stage.run(&mut state).await.unwrap();
        assert_eq!(state.candidates.len(), 2);
        assert_eq!(provider.calls.lock().unwrap()[0].1["query"], "x");
    }

    #[tokio::test]
    async fn provider_error_fails_the_stage() {
        let provider = Arc::new(FixedProvider::new(
            vec![ToolDescriptor::new("search")],
            ToolResponse::error("quota exceeded"),
        ));
        let stage = DiscoveryStage::new(provider);
        let mut state = PipelineState::new("x");

        let err = stage.run(&mut state).await.unwrap_err();
        assert!(matches!(err, GraphError::Mcp(McpError::ToolReported { .. })));
        assert!(state.candidates.is_empty());
    }

    #[test]
    fn decodes_each_supported_shape() {
        let list = ToolResponse::text(r#"[{"name": "A"}, {"name": "B"}]"#);
        let wrapped = ToolResponse::text(r#"{"data": [{"author": "A"}, {"author": "B"}]}"#);
        let single = ToolResponse::text(r#"{"name": "A", "interests": ["ML"]}"#);

        assert_eq!(decode_candidates(&list).len(), 2);
        assert_eq!(decode_candidates(&wrapped).len(), 2);
        let one = decode_candidates(&single);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].interests, vec!["ML".to_string()]);
    }

    #[test]
    fn one_object_per_block_is_accepted() {
        let response = ToolResponse {
            content: vec![
                crate::mcp::ContentBlock::Text(r#"{"name": "A"}"#.into()),
                crate::mcp::ContentBlock::Text(r#"{"name": "B"}"#.into()),
            ],
            is_error: false,
        };
        let names: Vec<String> = decode_candidates(&response).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn plain_text_and_nameless_entries_yield_nothing() {
        assert!(decode_candidates(&ToolResponse::text("No results found")).is_empty());
        assert!(decode_candidates(&ToolResponse::text(r#"[{"affiliation": "MIT"}]"#)).is_empty());
    }

    #[test]
    fn named_wrapper_decodes_its_list() {
        let response = ToolResponse::text(
            r#"{"name": "results", "authors": [{"name": "Alice"}, {"name": "Bob"}]}"#,
        );
        let names: Vec<String> = decode_candidates(&response).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Alice", "Bob"]);
    }

    #[test]
    fn wrapper_with_leading_scalar_uses_its_list() {
        let response = ToolResponse::text(r#"{"query": "robotics", "items": [{"name": "Alice"}]}"#);
        let names: Vec<String> = decode_candidates(&response).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Alice"]);
    }
}
