//! Picking a tool and an argument name from what the provider advertises.

use super::types::ToolDescriptor;
use super::McpError;

/// Argument names tried, in order, when calling a search tool with free text.
pub const QUERY_ARGUMENT_PREFERENCE: [&str; 4] = ["query", "topic", "keywords", "name"];
pub const DEFAULT_QUERY_ARGUMENT: &str = "query";

/// First tool whose name contains `needle` (case-sensitive), in listing
/// order; otherwise the first tool. With several matches the first listed wins.
pub fn resolve_tool<'a>(tools: &'a [ToolDescriptor], needle: &str) -> Result<&'a ToolDescriptor, McpError> {
    resolve_tool_by_hints(tools, &[needle])
}

/// Like `resolve_tool`, trying each hint in turn before falling back.
pub fn resolve_tool_by_hints<'a>(
    tools: &'a [ToolDescriptor],
    hints: &[&str],
) -> Result<&'a ToolDescriptor, McpError> {
    let first = tools.first().ok_or(McpError::NoTools)?;

    Ok(match_by_hints(tools, hints).unwrap_or(first))
}

/// First tool matching a hint, trying hints in order. No fallback.
pub fn match_by_hints<'a>(tools: &'a [ToolDescriptor], hints: &[&str]) -> Option<&'a ToolDescriptor> {
    hints
        .iter()
        .find_map(|hint| tools.iter().find(|t| t.name.contains(hint)))
}

/// First name in `preferred` that the tool's schema declares, else `fallback`.
pub fn resolve_argument_name<'a>(tool: &ToolDescriptor, preferred: &[&'a str], fallback: &'a str) -> &'a str {
    preferred
        .iter()
        .copied()
        .find(|p| tool.has_parameter(p))
        .unwrap_or(fallback)
}
