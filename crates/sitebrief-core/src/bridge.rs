//! Text-generation bridge: turns a conversation history or a finalized brief
//! into one completion against an OpenRouter-compatible provider.
//!
//! Two modes, selected by the request's `type` tag. Chat mode replays the full
//! transcript under a design-assistant persona. Final mode sends only the
//! structured brief under a strategist persona; conversation history never
//! reaches the provider in final mode, so the proposal stays independent of
//! conversational noise.
//!
//! API key: `OPENROUTER_API_KEY` in `.env`. The gateway holds the key; clients
//! never see it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::brief::Brief;
use crate::error::{CoreError, CoreResult};

const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";

/// Default model slug. Override via `CoreConfig::llm_model`.
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.3-70b-instruct";

/// System persona for chat mode.
pub const CHAT_PERSONA: &str =
    "You are SiteBrief's AI design assistant. Help users refine website briefs in a helpful, natural way.";

/// System persona for final mode.
pub const FINAL_PERSONA: &str =
    "You are a professional website strategist at SiteBrief. Generate a clear, persuasive final project proposal based on this brief.";

/// Reply when chat mode gets an empty completion back.
pub const CHAT_FALLBACK: &str = "No reply from AI.";

/// Reply when final mode gets an empty completion back.
pub const FINAL_FALLBACK: &str = "No final proposal generated.";

/// One transcript entry as received from a client. Any role other than
/// `"user"` is replayed to the provider as the assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub text: String,
}

/// A completion request, tagged by mode on the wire (`"chat"` / `"final"`).
/// Requests with any other tag fail to decode and are rejected before a
/// provider call is made.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CompletionRequest {
    Chat { conversation: Vec<TranscriptEntry> },
    Final { brief: Brief },
}

/// One message on the provider wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderMessage {
    pub role: String,
    pub content: String,
}

/// Seam to the external text-generation provider: one operation, opaque beyond
/// the persona and message shaping done here.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Requests a single completion. An empty string is a valid result (the
    /// bridge substitutes the mode's fallback); errors indicate the provider
    /// call itself failed.
    async fn complete(&self, system: &str, messages: &[ProviderMessage]) -> CoreResult<String>;
}

/// Maps a client transcript to the two-role provider transcript.
fn shape_chat(conversation: &[TranscriptEntry]) -> Vec<ProviderMessage> {
    conversation
        .iter()
        .map(|entry| ProviderMessage {
            role: if entry.role == "user" { "user" } else { "assistant" }.to_string(),
            content: entry.text.clone(),
        })
        .collect()
}

/// Renders the brief as the single user message for final mode. Only brief
/// fields appear here.
fn shape_final(brief: &Brief) -> Vec<ProviderMessage> {
    let content = format!(
        "Company: {}\nIndustry: {}\nBudget: {}\nStyle: {}\nGoals: {}",
        brief.company_name.as_deref().unwrap_or(""),
        brief.industry.as_deref().unwrap_or(""),
        brief.budget.as_deref().unwrap_or(""),
        brief.style,
        brief.description.as_deref().unwrap_or(""),
    );
    vec![ProviderMessage {
        role: "user".to_string(),
        content,
    }]
}

/// Stateless adapter from a tagged request to one provider round trip.
#[derive(Clone)]
pub struct TextBridge {
    provider: Arc<dyn CompletionProvider>,
}

impl TextBridge {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Runs one completion. Empty completions degrade to the mode's fixed
    /// fallback string; provider failures surface as [`CoreError::Upstream`]
    /// with no automatic retry (retry policy is a caller concern).
    pub async fn run(&self, request: CompletionRequest) -> CoreResult<String> {
        let (persona, messages, fallback) = match &request {
            CompletionRequest::Chat { conversation } => {
                (CHAT_PERSONA, shape_chat(conversation), CHAT_FALLBACK)
            }
            CompletionRequest::Final { brief } => (FINAL_PERSONA, shape_final(brief), FINAL_FALLBACK),
        };
        let text = self.provider.complete(persona, &messages).await?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Ok(fallback.to_string())
        } else {
            Ok(trimmed.to_string())
        }
    }
}

// OpenAI-compatible request/response for OpenRouter
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Reqwest-backed [`CompletionProvider`] against the OpenRouter API.
pub struct OpenRouterBridge {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenRouterBridge {
    /// Create a bridge using `OPENROUTER_API_KEY` from the environment.
    /// Returns `None` if no key is set.
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("OPENROUTER_API_KEY").ok()?.trim().to_string();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key))
    }

    /// Create a bridge with an explicit API key. The HTTP client carries a
    /// bounded 60-second timeout; a turn that never completes fails rather
    /// than hanging the caller.
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        }
    }

    /// Set the model (e.g. `meta-llama/llama-3.3-70b-instruct`).
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterBridge {
    async fn complete(&self, system: &str, messages: &[ProviderMessage]) -> CoreResult<String> {
        let mut wire = Vec::with_capacity(messages.len() + 1);
        wire.push(WireMessage {
            role: "system".to_string(),
            content: system.to_string(),
        });
        wire.extend(messages.iter().map(|m| WireMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        }));

        let url = format!("{}/chat/completions", OPENROUTER_API_BASE);
        let body = ChatRequest {
            model: self.model.clone(),
            messages: wire,
            temperature: Some(0.7),
            max_tokens: Some(1024),
        };

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Upstream(format!("request failed: {}", e)))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(CoreError::Upstream(format!("API error {}: {}", status, body)));
        }

        let parsed: ChatResponse = res
            .json()
            .await
            .map_err(|e| CoreError::Upstream(format!("response parse failed: {}", e)))?;

        // Empty choices decode to an empty string; the TextBridge substitutes
        // the mode fallback.
        Ok(parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}
