//! Replays canned responses in order and records every request.
//!
//! Used for offline runs and for exercising the pipeline without a live service.

use anyhow::{anyhow, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::gateway::{CompletionRequest, GenerationClient};

#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue another response
    pub fn push(&self, response: Result<String>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait::async_trait]
impl GenerationClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("scripted client has no response left")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::Message;

    #[test]
    fn test_replays_in_order_then_fails() {
        let client = ScriptedClient::new(vec![Ok("a".into())]);
        client.push(Ok("b".into()));
        let request = CompletionRequest {
            model: "m".into(),
            messages: vec![Message::user("q")],
            max_tokens: 1,
            json_mode: false,
        };

        tokio_test::block_on(async {
            assert_eq!(client.complete(&request).await.unwrap(), "a");
            assert_eq!(client.complete(&request).await.unwrap(), "b");
            assert!(client.complete(&request).await.is_err());
        });
        assert_eq!(client.calls(), 3);
    }
}
