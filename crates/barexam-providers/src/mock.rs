//! Mock provider for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use barexam_core::error::ProviderError;
use barexam_core::traits::{
    CompletionChoice, CompletionProvider, CompletionRequest, CompletionResponse,
};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with these candidate texts.
    Candidates(Vec<String>),
    /// Fail with a network error carrying this message.
    Fail(String),
}

impl MockReply {
    pub fn text(text: &str) -> Self {
        MockReply::Candidates(vec![text.to_string()])
    }
}

/// A mock completion service for exercising the runner without API calls.
///
/// Scripted replies are consumed in order; once exhausted, the default reply
/// is used for every further call.
pub struct MockProvider {
    script: Mutex<VecDeque<MockReply>>,
    default_reply: MockReply,
    call_count: AtomicU32,
    last_request: Mutex<Option<CompletionRequest>>,
}

impl MockProvider {
    pub fn new(script: Vec<MockReply>, default_reply: MockReply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            default_reply,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// A mock that always returns the same single-candidate response.
    pub fn with_fixed_response(text: &str) -> Self {
        Self::new(Vec::new(), MockReply::text(text))
    }

    /// A mock whose every call fails.
    pub fn failing(message: &str) -> Self {
        Self::new(Vec::new(), MockReply::Fail(message.to_string()))
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(request.clone());

        let reply = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone());

        match reply {
            MockReply::Fail(message) => Err(ProviderError::NetworkError(message).into()),
            MockReply::Candidates(texts) => {
                let raw = serde_json::json!({
                    "id": "cmpl-mock",
                    "object": "text_completion",
                    "model": request.model,
                    "choices": texts
                        .iter()
                        .enumerate()
                        .map(|(i, t)| serde_json::json!({"text": t, "index": i, "finish_reason": "stop"}))
                        .collect::<Vec<_>>(),
                });
                Ok(CompletionResponse {
                    choices: texts
                        .into_iter()
                        .map(|text| CompletionChoice { text })
                        .collect(),
                    raw,
                })
            }
        }
    }
}
