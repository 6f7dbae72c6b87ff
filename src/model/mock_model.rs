//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! for use in tests. Responses are queued and handed out one per request, so a
//! test can script a whole tool-calling conversation without API calls.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    message::{ToolCall, ToolFunction},
    one_or_many::OneOrMany,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

type Scripted = Result<OneOrMany<AssistantContent>, String>;

/// A mock completion model for testing purposes.
/// Once the queue is drained it answers with empty text.
#[derive(Debug, Clone)]
pub struct MockCompletionModel {
    responses: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<usize>>,
}

impl MockCompletionModel {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(0)),
        }
    }

    /// Queue a response for the next request.
    pub async fn push_response(&self, response: OneOrMany<AssistantContent>) {
        self.responses.lock().await.push_back(Ok(response));
    }

    /// Queue a simple text response.
    pub async fn push_text_response(&self, text: &str) {
        self.push_response(OneOrMany::one(AssistantContent::text(text)))
            .await;
    }

    /// Queue a single tool call.
    pub async fn push_tool_call(&self, id: &str, name: &str, arguments: serde_json::Value) {
        let call = AssistantContent::ToolCall(ToolCall {
            id: id.to_string(),
            function: ToolFunction {
                name: name.to_string(),
                arguments,
            },
        });
        self.push_response(OneOrMany::one(call)).await;
    }

    /// Queue a provider failure.
    pub async fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    /// Number of completion requests received so far.
    pub async fn request_count(&self) -> usize {
        *self.requests.lock().await
    }
}

impl Default for MockCompletionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        *self.requests.lock().await += 1;
        let next = self.responses.lock().await.pop_front();
        match next {
            Some(Ok(choice)) => Ok(CompletionResponse {
                choice,
                raw_response: "".to_string(),
            }),
            Some(Err(message)) => Err(CompletionError::ProviderError(message)),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: "".to_string(),
            }),
        }
    }
}
