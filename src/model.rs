//! # LLM Client Module
//!
//! This module provides the completion client used by the extraction and
//! schema derivation stages, with built-in rate limiting to stay inside the
//! provider quota while a run walks hundreds of categories.
//!
//! ## Key Components
//!
//! - `Client`: Wraps the completion model shared by every stage
//! - `RateLimitedCompletionModel`: A wrapper that adds rate limiting to any completion model
//! - `assistant_text`: Flattens a model choice into its text parts
//!
//! ## Features
//!
//! - Configurable requests-per-minute quota
//! - Environment variable configuration for API keys
//! - Instrumentation with tracing spans for monitoring
//! - Type-safe model integration with the `rig` framework

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use rig::{
    completion::{AssistantContent, CompletionModel},
    one_or_many::OneOrMany,
    providers::gemini,
};

use crate::error::Error;

#[cfg(test)]
pub mod mock_model;
pub mod ratelimited_completion;

pub use ratelimited_completion::RateLimitedCompletionModel;

/// Default model for extraction and schema inference
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Requests per minute allowed on the paid Gemini tier
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 2000;

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    completion_model: C,
}

pub struct RateLimitResponse<T> {
    #[allow(dead_code)]
    response: T,
}

pub type GeminiClient = Client<RateLimitedCompletionModel<gemini::completion::CompletionModel>>;

impl Client<RateLimitedCompletionModel<gemini::completion::CompletionModel>> {
    /// Build a Gemini client from `GEMINI_API_KEY`
    pub fn new_gemini_from_env(model: &str) -> Result<Self, Error> {
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| Error::Auth("GEMINI_API_KEY environment variable must be set".into()))?;
        let gemini_client = gemini::Client::new(&gemini_api_key);
        Ok(Self::new_gemini(
            gemini_client,
            model,
            DEFAULT_REQUESTS_PER_MINUTE,
        ))
    }

    pub fn new_gemini(gemini_client: gemini::Client, model: &str, requests_per_minute: u32) -> Self {
        let completion_limiter = RateLimiter::direct(Quota::per_minute(
            NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN),
        ));
        let completion_model = RateLimitedCompletionModel::new(
            gemini_client.completion_model(model),
            completion_limiter,
        );
        Self { completion_model }
    }
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    pub fn completion(&self) -> &C {
        &self.completion_model
    }
}

/// Concatenate the text parts of a model choice, ignoring tool calls
pub fn assistant_text(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|c| match c {
            AssistantContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .collect::<Vec<String>>()
        .join("\n")
}
