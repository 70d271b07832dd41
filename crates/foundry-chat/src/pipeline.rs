//! The question-answering pipeline around a single provider call.

use std::collections::BTreeMap;
use std::sync::Arc;

use foundry_ai::{
    AiError, AnswerContent, AnswerFragment, ChatRequest, LlmClient, Message,
};
use foundry_ventures::Venture;
use serde_json::Value;
use tracing::error;

use crate::context::render_context;

/// Sentinel returned when no provider credential was configured.
pub const NOT_CONFIGURED_MESSAGE: &str = "Google API key not configured.";

/// Fallback when the provider answered with nothing usable.
pub const EMPTY_ANSWER_FALLBACK: &str = "I couldn't generate a response based on the available data. Please try rephrasing your question.";

/// Fallback when the provider call failed. Raw provider errors never reach
/// the caller; they are logged server-side instead.
pub const PROVIDER_ERROR_FALLBACK: &str =
    "I encountered an error while processing your question. Please try again.";

const SYSTEM_PROMPT: &str = "You are an expert venture analyst. Use the provided venture data to answer user questions accurately and concisely. Always respond with plain text that is clear and readable. Format your response in a conversational, easy-to-understand manner. Do not use markdown, code blocks, or special formatting - just plain text.";

/// Outcome of one pipeline run, before the boundary decides what the caller
/// sees. Failure variants carry their cause for logging; the rendered reply
/// is always one of the fixed messages.
#[derive(Debug)]
pub enum ChatOutcome {
    Answer(String),
    NotConfigured,
    ProviderFailure(AiError),
}

/// Stateless Q&A pipeline over a venture snapshot.
///
/// The provider client is injected explicitly; `None` models "no API key
/// configured" and short-circuits before any serialization work.
#[derive(Clone)]
pub struct ChatPipeline {
    client: Option<Arc<dyn LlmClient>>,
    model: String,
}

impl ChatPipeline {
    pub fn new(client: Option<Arc<dyn LlmClient>>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Answers `question` over the snapshot. Never fails: configuration gaps
    /// and provider errors both collapse to fixed messages, and the result is
    /// always trimmed and non-empty.
    ///
    /// Empty questions are the caller's responsibility to reject before
    /// invoking the pipeline.
    pub async fn answer(&self, question: &str, ventures: &[Venture]) -> String {
        match self.run(question, ventures).await {
            ChatOutcome::Answer(text) => text,
            ChatOutcome::NotConfigured => NOT_CONFIGURED_MESSAGE.to_string(),
            ChatOutcome::ProviderFailure(cause) => {
                error!(%cause, "venture chat completion failed");
                PROVIDER_ERROR_FALLBACK.to_string()
            }
        }
    }

    pub async fn run(&self, question: &str, ventures: &[Venture]) -> ChatOutcome {
        let Some(client) = self.client.as_ref() else {
            return ChatOutcome::NotConfigured;
        };

        let context = render_context(ventures);
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message::system(SYSTEM_PROMPT),
                Message::user(render_question_turn(&context, question)),
            ],
            max_tokens: None,
            temperature: None,
        };

        match client.complete(request).await {
            Ok(response) => ChatOutcome::Answer(normalize_answer(&response.content)),
            Err(cause) => ChatOutcome::ProviderFailure(cause),
        }
    }
}

fn render_question_turn(context: &str, question: &str) -> String {
    format!(
        "Here is the venture data:\n{context}\n\nQuestion: {question}\n\nPlease provide a clear, readable answer in plain text format."
    )
}

/// Flattens any accepted payload shape into trimmed plain text, substituting
/// the fixed fallback when nothing usable remains.
pub fn normalize_answer(content: &AnswerContent) -> String {
    let answer = match content {
        AnswerContent::Text(text) => text.clone(),
        AnswerContent::Keyed(map) => keyed_text(map),
        AnswerContent::Fragments(fragments) => fragments
            .iter()
            .map(fragment_text)
            .collect::<Vec<_>>()
            .join(" "),
        AnswerContent::Other(Value::Null) => String::new(),
        AnswerContent::Other(value) => value.to_string(),
    };

    let answer = answer.trim();
    if answer.is_empty() {
        EMPTY_ANSWER_FALLBACK.to_string()
    } else {
        answer.to_string()
    }
}

fn keyed_text(map: &BTreeMap<String, Value>) -> String {
    match map.get("text") {
        Some(Value::String(text)) => text.clone(),
        _ => stringify_map(map),
    }
}

fn fragment_text(fragment: &AnswerFragment) -> String {
    match fragment {
        AnswerFragment::Text(text) => text.clone(),
        AnswerFragment::Keyed(map) => keyed_text(map),
        AnswerFragment::Other(value) => value.to_string(),
    }
}

fn stringify_map(map: &BTreeMap<String, Value>) -> String {
    serde_json::to_string(map).unwrap_or_default()
}
