//! Generation Gateway - one call-and-respond exchange with the generation service
//!
//! The gateway never raises on a transport failure. It logs the failure and
//! hands back a [`Reply`] without content; callers that decode the text as
//! JSON then fail loudly on the empty string.
//!
//! Multi-turn dialogue is carried by value: every successful call returns a
//! new [`Conversation`] extended with the user message and the reply.

use async_trait::async_trait;
use rand::Rng;
use scriptforge_core::{ForgeError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Model used when the configuration does not name one
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Response size bound used when the configuration does not name one
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered message history of a dialogue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy extended with `message`
    pub fn with(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Content of the latest assistant message, if any
    pub fn last_reply(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.as_str())
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// One request to the gateway
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub conversation: Conversation,
    pub prompt: String,
    pub system: String,
    /// Overrides the gateway's model
    pub model: Option<String>,
    pub require_json: bool,
    /// Overrides the gateway's response size bound
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Single-prompt request
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    /// Continue an existing dialogue, optionally with a new prompt
    pub fn continuing(conversation: Conversation, prompt: impl Into<String>) -> Self {
        Self {
            conversation,
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = system.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask for a structured-JSON-only response
    pub fn json(mut self) -> Self {
        self.require_json = true;
        self
    }
}

/// What a generation client receives
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub json_mode: bool,
}

/// Transport to an external generation service
#[async_trait]
pub trait GenerationClient: Send + Sync + std::fmt::Debug {
    /// Provider name
    fn name(&self) -> &str;

    /// Text content of one response turn
    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<String>;
}

/// Result of a gateway call
#[derive(Debug, Clone)]
pub struct Reply {
    /// `None` when the service call failed
    pub content: Option<String>,
    /// Dialogue to continue from. Unchanged from the request on failure.
    pub conversation: Conversation,
}

impl Reply {
    /// Response text, or `""` when nothing was produced
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    pub fn is_absent(&self) -> bool {
        self.content.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Gateway {
    client: Arc<dyn GenerationClient>,
    model: String,
    max_tokens: u32,
    pacing: Option<Duration>,
}

impl Gateway {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            pacing: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sleep a random duration in `[delay, 2×delay)` before each call.
    /// A zero delay disables pacing.
    pub fn with_pacing(mut self, delay: Duration) -> Self {
        self.pacing = (!delay.is_zero()).then_some(delay);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn pacing(&self) -> Option<Duration> {
        self.pacing
    }

    /// Issue one exchange.
    ///
    /// Returns `Err` only for a usage error (no conversation and no prompt).
    pub async fn respond(&self, request: GenerationRequest) -> Result<Reply> {
        if request.conversation.is_empty() && request.prompt.is_empty() {
            return Err(ForgeError::EmptyRequest);
        }

        let original = request.conversation.clone();
        let mut messages = request.conversation.messages;
        let has_system = messages
            .first()
            .is_some_and(|m| m.role == MessageRole::System);
        if !has_system {
            messages.insert(0, Message::system(request.system));
        }
        if !request.prompt.is_empty() {
            messages.push(Message::user(request.prompt));
        }

        if let Some(delay) = self.pacing {
            let pause = jittered(delay);
            tracing::debug!(provider = self.client.name(), "pacing for {:?}", pause);
            tokio::time::sleep(pause).await;
        }

        let completion = CompletionRequest {
            model: request.model.unwrap_or_else(|| self.model.clone()),
            messages,
            max_tokens: request.max_tokens.unwrap_or(self.max_tokens),
            json_mode: request.require_json,
        };

        match self.client.complete(&completion).await {
            Ok(content) => {
                let mut messages = completion.messages;
                messages.push(Message::assistant(content.clone()));
                Ok(Reply {
                    content: Some(content),
                    conversation: Conversation::from(messages),
                })
            }
            Err(e) => {
                tracing::error!(
                    provider = self.client.name(),
                    model = %completion.model,
                    "generation request failed: {:#}",
                    e
                );
                Ok(Reply {
                    content: None,
                    conversation: original,
                })
            }
        }
    }
}

/// Random duration in `[delay, 2×delay)` at millisecond resolution
fn jittered(delay: Duration) -> Duration {
    let base = delay.as_millis().max(1) as u64;
    Duration::from_millis(rand::thread_rng().gen_range(base..base * 2))
}
