// ABOUTME: Ollama native chat API client (/api/chat) for local LLM inference.
// ABOUTME: Handles buffered JSON replies and newline-delimited streaming chunks.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};

use super::client::StreamEvent;
use super::{Message, Request, Response, ToolCall, ToolDefinition, Usage};
use crate::config::Settings;
use crate::error::LlmError;

/// Base URL of a local Ollama server.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// Default model when none is specified.
pub const OLLAMA_DEFAULT_MODEL: &str = "qwen3";

/// Ollama chat request format.
#[derive(Debug, Serialize)]
pub struct OllamaRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
    pub think: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<OllamaTool>,
}

/// Ollama message format, used both ways.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OllamaMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OllamaToolCall>>,
}

/// Tool call in an Ollama reply. Arguments arrive as a JSON object.
#[derive(Debug, Serialize, Deserialize)]
pub struct OllamaToolCall {
    pub function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OllamaFunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Ollama tool definition.
#[derive(Debug, Serialize)]
pub struct OllamaTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: OllamaFunction,
}

#[derive(Debug, Serialize)]
pub struct OllamaFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// One reply object. A buffered reply is a single chunk with `done: true`;
/// a streamed reply is a sequence of them, one per line.
#[derive(Debug, Deserialize)]
pub struct OllamaChunk {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub message: Option<OllamaMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

impl OllamaChunk {
    fn usage(&self) -> Usage {
        Usage {
            input_tokens: self.prompt_eval_count.unwrap_or(0),
            output_tokens: self.eval_count.unwrap_or(0),
        }
    }
}

impl From<&Message> for OllamaMessage {
    fn from(msg: &Message) -> Self {
        OllamaMessage {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
            thinking: None,
            tool_calls: None,
        }
    }
}

impl From<&ToolDefinition> for OllamaTool {
    fn from(tool: &ToolDefinition) -> Self {
        OllamaTool {
            tool_type: "function".to_string(),
            function: OllamaFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

impl From<OllamaToolCall> for ToolCall {
    fn from(call: OllamaToolCall) -> Self {
        ToolCall {
            name: call.function.name,
            arguments: call.function.arguments,
        }
    }
}

impl From<&Request> for OllamaRequest {
    fn from(req: &Request) -> Self {
        OllamaRequest {
            model: req.model.clone(),
            messages: req.messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
            think: req.think,
            tools: req.tools.iter().map(OllamaTool::from).collect(),
        }
    }
}

impl TryFrom<OllamaChunk> for Response {
    type Error = LlmError;

    fn try_from(chunk: OllamaChunk) -> Result<Self, Self::Error> {
        let usage = chunk.usage();
        let message = chunk
            .message
            .ok_or_else(|| LlmError::Malformed("reply has no message".to_string()))?;

        Ok(Response {
            model: chunk.model,
            content: message.content,
            thinking: message.thinking.filter(|t| !t.is_empty()),
            tool_calls: message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(ToolCall::from)
                .collect(),
            done_reason: chunk.done_reason,
            usage,
        })
    }
}

/// Client for the Ollama chat API.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: String,
    http: reqwest::Client,
    default_model: String,
}

impl OllamaClient {
    /// Create a new Ollama client connecting to localhost:11434.
    pub fn new(model: &str) -> Self {
        Self::with_base_url(OLLAMA_BASE_URL, model)
    }

    /// Create a new Ollama client with a custom base URL.
    ///
    /// # Arguments
    /// * `base_url` - The server root (e.g., "http://gpu-box:11434"), without `/api/chat`
    /// * `model` - The default model to use (e.g., "qwen3", "llama3.2")
    pub fn with_base_url(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            default_model: if model.is_empty() {
                OLLAMA_DEFAULT_MODEL.to_string()
            } else {
                model.to_string()
            },
        }
    }

    /// Create a client from loaded settings. The client sets no deadline of
    /// its own; `ModelInvoker` bounds every call.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_base_url(&settings.base_url, &settings.model)
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn wire_request(&self, req: &Request, stream: bool) -> OllamaRequest {
        let mut wire = OllamaRequest::from(req);
        if wire.model.is_empty() {
            wire.model = self.default_model.clone();
        }
        wire.stream = stream;
        wire
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new(OLLAMA_DEFAULT_MODEL)
    }
}

fn transport_error(err: reqwest::Error) -> LlmError {
    if err.is_decode() {
        LlmError::Malformed(err.to_string())
    } else {
        LlmError::Connection(err.to_string())
    }
}

/// Ollama reports failures as `{"error": "..."}`; fall back to the raw body.
fn api_error(status: u16, body: &str) -> LlmError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status),
        Err(_) => body.trim().to_string(),
    };
    LlmError::Api { status, message }
}

/// Decode one NDJSON line into stream events.
/// `MessageStop` is always the last event when the line carries `done: true`.
fn decode_line(line: &[u8], started: &mut bool, status: u16) -> Result<Vec<StreamEvent>, LlmError> {
    let text = std::str::from_utf8(line)
        .map_err(|e| LlmError::Malformed(e.to_string()))?
        .trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let chunk: OllamaChunk = serde_json::from_str(text)?;
    let usage = chunk.usage();
    if let Some(message) = chunk.error {
        return Err(LlmError::Api { status, message });
    }

    let mut events = Vec::new();
    if !*started {
        events.push(StreamEvent::MessageStart {
            model: chunk.model.clone(),
        });
        *started = true;
    }

    if let Some(message) = chunk.message {
        if let Some(thinking) = message.thinking.filter(|t| !t.is_empty()) {
            events.push(StreamEvent::ThinkingDelta { text: thinking });
        }
        if !message.content.is_empty() {
            events.push(StreamEvent::ContentDelta {
                text: message.content,
            });
        }
        if let Some(calls) = message.tool_calls.filter(|c| !c.is_empty()) {
            events.push(StreamEvent::ToolCalls {
                calls: calls.into_iter().map(ToolCall::from).collect(),
            });
        }
    }

    if chunk.done {
        events.push(StreamEvent::MessageStop {
            done_reason: chunk.done_reason,
            usage,
        });
    }

    Ok(events)
}

#[async_trait]
impl super::client::LlmClient for OllamaClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let wire = self.wire_request(req, false);

        let response = self
            .http
            .post(self.chat_url())
            .json(&wire)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        let chunk: OllamaChunk = serde_json::from_str(&body)?;
        if let Some(message) = chunk.error {
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Response::try_from(chunk)
    }

    fn create_message_stream(
        &self,
        req: &Request,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let wire = self.wire_request(req, true);
        let url = self.chat_url();
        let http = self.http.clone();

        Box::pin(async_stream::try_stream! {
            let response = http
                .post(&url)
                .json(&wire)
                .send()
                .await
                .map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.map_err(transport_error)?;
                Err(api_error(status.as_u16(), &body))?;
                return;
            }

            let mut stream = response.bytes_stream();
            // Bytes, not text: a multi-byte character may straddle two chunks.
            let mut buffer: Vec<u8> = Vec::new();
            let mut started = false;

            while let Some(chunk) = futures::StreamExt::next(&mut stream).await {
                let chunk = chunk.map_err(transport_error)?;
                buffer.extend_from_slice(&chunk);

                while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=pos).collect();
                    let events = decode_line(&line, &mut started, status.as_u16())?;
                    let done = matches!(events.last(), Some(StreamEvent::MessageStop { .. }));
                    for event in events {
                        yield event;
                    }
                    if done {
                        return;
                    }
                }
            }

            // Final line without a trailing newline.
            let events = decode_line(&buffer, &mut started, status.as_u16())?;
            let done = matches!(events.last(), Some(StreamEvent::MessageStop { .. }));
            for event in events {
                yield event;
            }
            if !done {
                Err(LlmError::StreamClosed)?;
            }
        })
    }
}

#[cfg(test)]
mod ollama_test {
    use super::*;

    #[test]
    fn test_client_new() {
        let client = OllamaClient::new("llama3.2");
        assert_eq!(client.base_url, OLLAMA_BASE_URL);
        assert_eq!(client.default_model, "llama3.2");
    }

    #[test]
    fn test_client_new_empty_model() {
        let client = OllamaClient::new("");
        assert_eq!(client.default_model, OLLAMA_DEFAULT_MODEL);
    }

    #[test]
    fn test_client_with_base_url_strips_slash() {
        let client = OllamaClient::with_base_url("http://remote:11434/", "mistral");
        assert_eq!(client.base_url, "http://remote:11434");
        assert_eq!(client.chat_url(), "http://remote:11434/api/chat");
    }

    #[test]
    fn test_client_from_settings() {
        let settings = Settings {
            base_url: "http://gpu:11434".into(),
            model: "qwen3-vl:32b".into(),
            timeout_secs: 7,
            ..Settings::default()
        };
        let client = OllamaClient::from_settings(&settings);
        assert_eq!(client.base_url, "http://gpu:11434");
        assert_eq!(client.default_model, "qwen3-vl:32b");
    }

    #[test]
    fn test_wire_request_without_tools_has_no_tools_key() {
        let client = OllamaClient::default();
        let req = Request::new("qwen3")
            .message(Message::system("plan carefully"))
            .message(Message::user("design a counter"));

        let json = serde_json::to_value(client.wire_request(&req, false)).unwrap();
        assert_eq!(json["model"], "qwen3");
        assert_eq!(json["stream"], false);
        assert_eq!(json["think"], false);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "design a counter");
        assert!(json.get("tools").is_none());
    }

    #[test]
    fn test_wire_request_with_tools_and_default_model() {
        let client = OllamaClient::new("llama3.2");
        let req = Request::new("")
            .message(Message::user("list files"))
            .tools(vec![ToolDefinition {
                name: "list_files".into(),
                description: "List files".into(),
                input_schema: serde_json::json!({"type": "object"}),
            }])
            .think(true);

        let json = serde_json::to_value(client.wire_request(&req, true)).unwrap();
        assert_eq!(json["model"], "llama3.2");
        assert_eq!(json["stream"], true);
        assert_eq!(json["think"], true);
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "list_files");
    }

    #[test]
    fn test_buffered_reply_to_response() {
        let body = r#"{
            "model": "qwen3",
            "message": {"role": "assistant", "content": "42", "thinking": "adding"},
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 12,
            "eval_count": 3
        }"#;
        let chunk: OllamaChunk = serde_json::from_str(body).unwrap();
        let resp = Response::try_from(chunk).unwrap();

        assert_eq!(resp.text(), "42");
        assert_eq!(resp.thinking.as_deref(), Some("adding"));
        assert_eq!(resp.done_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.input_tokens, 12);
        assert_eq!(resp.usage.output_tokens, 3);
    }

    #[test]
    fn test_reply_tool_calls_decoded() {
        let body = r#"{
            "model": "qwen3",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{"function": {"name": "grep", "arguments": {"pattern": "fn main"}}}]
            },
            "done": true
        }"#;
        let chunk: OllamaChunk = serde_json::from_str(body).unwrap();
        let resp = Response::try_from(chunk).unwrap();

        assert!(resp.has_tool_use());
        assert_eq!(resp.tool_calls[0].name, "grep");
        assert_eq!(resp.tool_calls[0].arguments["pattern"], "fn main");
    }

    #[test]
    fn test_reply_without_message_is_malformed() {
        let chunk: OllamaChunk =
            serde_json::from_str(r#"{"model": "qwen3", "done": true}"#).unwrap();
        assert!(matches!(Response::try_from(chunk), Err(LlmError::Malformed(_))));
    }

    #[test]
    fn test_api_error_extracts_message() {
        match api_error(404, r#"{"error": "model 'nope' not found"}"#) {
            LlmError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "model 'nope' not found");
            }
            other => panic!("unexpected {other:?}"),
        }

        match api_error(502, "") {
            LlmError::Api { message, .. } => assert_eq!(message, "HTTP 502"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_line_sequence() {
        let mut started = false;

        let first = decode_line(
            br#"{"model":"qwen3","message":{"role":"assistant","content":"Hel"},"done":false}"#,
            &mut started,
            200,
        )
        .unwrap();
        assert_eq!(
            first,
            vec![
                StreamEvent::MessageStart { model: "qwen3".into() },
                StreamEvent::ContentDelta { text: "Hel".into() },
            ]
        );
        assert!(started);

        let last = decode_line(
            br#"{"model":"qwen3","message":{"role":"assistant","content":""},"done":true,"done_reason":"stop","eval_count":2}"#,
            &mut started,
            200,
        )
        .unwrap();
        assert_eq!(
            last,
            vec![StreamEvent::MessageStop {
                done_reason: Some("stop".into()),
                usage: Usage {
                    input_tokens: 0,
                    output_tokens: 2
                },
            }]
        );
    }

    #[test]
    fn test_decode_line_error_object() {
        let mut started = false;
        let err = decode_line(br#"{"error":"out of memory"}"#, &mut started, 200).unwrap_err();
        assert!(
            matches!(err, LlmError::Api { status: 200, message } if message == "out of memory")
        );
    }

    #[test]
    fn test_decode_blank_line() {
        let mut started = false;
        assert!(decode_line(b"  \n", &mut started, 200).unwrap().is_empty());
        assert!(!started);
    }
}
