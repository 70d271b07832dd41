//! Gemini `generateContent` client. Deliberately single-shot: an interactive
//! chat caller re-asks instead of retrying.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    AiError, AnswerContent, AnswerFragment, ChatRequest, ChatResponse, ChatUsage, LlmClient,
    Message, MessageRole,
};

#[derive(Debug, Clone)]
/// Connection settings for `GeminiClient`.
pub struct GeminiConfig {
    pub api_base: String,
    pub api_key: String,
    pub request_timeout_ms: u64,
}

#[derive(Debug, Clone)]
/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AiError> {
        if config.api_key.trim().is_empty() {
            return Err(AiError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(
                config.request_timeout_ms.max(1),
            ))
            .build()?;

        Ok(Self { client, config })
    }

    fn generate_content_url(&self, model: &str) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        if base.contains(":generateContent") {
            return base.replace("{model}", model);
        }

        format!("{base}/models/{model}:generateContent")
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, AiError> {
        let body = build_generate_content_body(&request);
        let url = self.generate_content_url(&request.model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if !status.is_success() {
            return Err(AiError::HttpStatus {
                status: status.as_u16(),
                body: raw,
            });
        }

        parse_generate_content_response(&raw)
    }
}

fn build_generate_content_body(request: &ChatRequest) -> Value {
    let system = extract_system_text(&request.messages);
    let contents = to_gemini_contents(&request.messages);

    let mut body = json!({
        "contents": contents,
    });

    if !system.is_empty() {
        body["systemInstruction"] = json!({
            "parts": [{ "text": system }],
        });
    }

    if request.temperature.is_some() || request.max_tokens.is_some() {
        let mut generation_config = json!({});
        if let Some(temperature) = request.temperature {
            generation_config["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        body["generationConfig"] = generation_config;
    }

    body
}

fn extract_system_text(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|message| message.role == MessageRole::System)
        .map(|message| message.text.as_str())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn to_gemini_contents(messages: &[Message]) -> Value {
    Value::Array(
        messages
            .iter()
            .filter_map(|message| match message.role {
                MessageRole::System => None,
                MessageRole::User => Some(json!({
                    "role": "user",
                    "parts": [{ "text": message.text }],
                })),
                MessageRole::Model => Some(json!({
                    "role": "model",
                    "parts": [{ "text": message.text }],
                })),
            })
            .collect(),
    )
}

fn parse_generate_content_response(raw: &str) -> Result<ChatResponse, AiError> {
    let parsed: GenerateContentResponse = serde_json::from_str(raw)?;
    let candidate = parsed
        .candidates
        .and_then(|mut candidates| candidates.drain(..).next())
        .ok_or_else(|| AiError::InvalidResponse("response contained no candidates".to_string()))?;

    let parts = candidate
        .content
        .and_then(|content| content.parts)
        .unwrap_or_default();

    let usage = parsed
        .usage_metadata
        .map(|usage| ChatUsage {
            input_tokens: usage.prompt_token_count.unwrap_or(0),
            output_tokens: usage.candidates_token_count.unwrap_or(0),
            total_tokens: usage.total_token_count.unwrap_or(0),
        })
        .unwrap_or_default();

    Ok(ChatResponse {
        content: decode_answer_content(parts),
        finish_reason: candidate.finish_reason,
        usage,
    })
}

/// Maps candidate parts onto the accepted answer shapes: a lone text part
/// becomes `Text`, anything else is surfaced as the raw fragment list for
/// the normalization layer to flatten.
fn decode_answer_content(parts: Vec<Value>) -> AnswerContent {
    if let [part] = parts.as_slice() {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            return AnswerContent::Text(text.to_string());
        }
    }
    if parts.is_empty() {
        return AnswerContent::Text(String::new());
    }

    let fragments = parts.into_iter().map(fragment_from_part).collect();
    AnswerContent::Fragments(fragments)
}

fn fragment_from_part(part: Value) -> AnswerFragment {
    match part {
        Value::String(text) => AnswerFragment::Text(text),
        Value::Object(map) => AnswerFragment::Keyed(map.into_iter().collect()),
        other => AnswerFragment::Other(other),
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<GenerateContentCandidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<GenerateContentUsage>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentCandidate {
    content: Option<GenerateContentContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentContent {
    parts: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentUsage {
    #[serde(rename = "promptTokenCount")]
    prompt_token_count: Option<u64>,
    #[serde(rename = "candidatesTokenCount")]
    candidates_token_count: Option<u64>,
    #[serde(rename = "totalTokenCount")]
    total_token_count: Option<u64>,
}
