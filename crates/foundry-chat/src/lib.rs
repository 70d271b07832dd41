//! Venture Q&A pipeline: context encoding, prompt assembly, and response
//! normalization around a single LLM call.
mod context;
mod pipeline;

pub use context::render_context;
pub use pipeline::{
    normalize_answer, ChatOutcome, ChatPipeline, EMPTY_ANSWER_FALLBACK, NOT_CONFIGURED_MESSAGE,
    PROVIDER_ERROR_FALLBACK,
};
