//! The narrow model-adapter interface an `Agent` implementation can use to
//! reach a language model: text-in, text-out, with an optional embedded tool
//! call. No concrete provider lives here, and neither `agent-kernel` nor
//! `agent-kernel-rt`'s `kernel` feature depends on this crate — an agent
//! implementation that wants an LLM in its processing hook depends on this
//! trait directly.

#![warn(missing_docs, clippy::pedantic)]

mod traits;

pub use traits::{
    AdapterError, AdapterMetadata, AdapterResult, InferenceReply, InferenceRequest, MessageRole,
    ModelAdapter, PromptMessage, RequestedToolCall,
};
