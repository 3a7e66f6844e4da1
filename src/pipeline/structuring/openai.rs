use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::{ChatMessage, CompletionRequest, LlmClient};
use super::StructuringError;
use crate::config::ServiceSettings;

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Works against the hosted API and local servers that expose the same
/// route (Ollama's `/v1`, vLLM, llama.cpp server).
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, StructuringError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StructuringError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_settings(settings: &ServiceSettings) -> Result<Self, StructuringError> {
        Self::new(&settings.base_url, &settings.api_key, settings.timeout_secs)
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response body from `/chat/completions`
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }
}

impl LlmClient for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, StructuringError> {
        let body = ChatCompletionRequest::from_request(request);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    StructuringError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    StructuringError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    StructuringError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(StructuringError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .map_err(|e| StructuringError::ResponseParsing(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(StructuringError::EmptyPayload)
    }
}

/// Mock LLM client for testing. Returns configured responses in order.
///
/// The last response repeats once the queue is down to one entry. Every
/// request is recorded for inspection.
pub struct MockLlmClient {
    responses: Mutex<Vec<Result<String, String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self::with_responses(vec![Ok(response.to_string())])
    }

    /// A client whose every call fails with `HttpClient(message)`.
    pub fn failing(message: &str) -> Self {
        Self::with_responses(vec![Err(message.to_string())])
    }

    pub fn with_responses(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl LlmClient for MockLlmClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, StructuringError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| StructuringError::HttpClient("mock poisoned".into()))?;

        let next = if responses.len() > 1 {
            responses.remove(0)
        } else {
            responses
                .first()
                .cloned()
                .unwrap_or_else(|| Err("no mock response configured".into()))
        };

        next.map_err(StructuringError::HttpClient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json_mode: bool) -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4o-mini".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            temperature: 0.0,
            json_mode,
        }
    }

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockLlmClient::new("test response");
        assert_eq!(client.complete(&request(true)).unwrap(), "test response");
        assert_eq!(client.call_count(), 1);
    }

    #[test]
    fn mock_client_replays_in_order_then_repeats_last() {
        let client = MockLlmClient::with_responses(vec![
            Ok("first".into()),
            Err("boom".into()),
            Ok("last".into()),
        ]);
        assert_eq!(client.complete(&request(true)).unwrap(), "first");
        assert!(client.complete(&request(true)).is_err());
        assert_eq!(client.complete(&request(true)).unwrap(), "last");
        assert_eq!(client.complete(&request(true)).unwrap(), "last");
    }

    #[test]
    fn mock_client_failing() {
        let client = MockLlmClient::failing("offline");
        let err = client.complete(&request(false)).unwrap_err();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = OpenAiClient::new("http://localhost:11434/v1/", "key", 60).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434/v1");
        assert_eq!(client.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn request_body_carries_sampling_and_json_mode() {
        let req = request(true);
        let body = serde_json::to_value(ChatCompletionRequest::from_request(&req)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }

    #[test]
    fn request_body_omits_response_format_without_json_mode() {
        let req = request(false);
        let body = serde_json::to_value(ChatCompletionRequest::from_request(&req)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn response_body_parses_content() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"[]"}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("[]"));
    }

    #[test]
    fn unreachable_service_maps_to_connection_error() {
        // Port 9 (discard) is closed on test machines; connection is refused.
        let client = OpenAiClient::new("http://127.0.0.1:9", "key", 2).unwrap();
        let err = client.complete(&request(true)).unwrap_err();
        assert!(matches!(
            err,
            StructuringError::Connection(_) | StructuringError::HttpClient(_)
        ));
    }
}
