//! Conversation session and turn orchestration.
//!
//! A session is ephemeral: it owns the ordered message sequence and the
//! current brief snapshot, and nothing here is ever durably stored. Only a
//! successful handoff produces durable state. Callers construct one session
//! per user interaction and thread it explicitly through every orchestrator
//! call; there is no ambient session storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brief::{Brief, QuickPreset};
use crate::bridge::{CompletionRequest, TextBridge, TranscriptEntry};
use crate::error::CoreResult;
use crate::trigger;

/// Synthetic assistant reply appended when a chat turn fails upstream. Errors
/// become part of the visible transcript so the user can retry by sending
/// again.
pub const TURN_ERROR_NOTICE: &str = "Error contacting AI. Try again.";

/// Synthetic assistant reply appended when finalization fails upstream.
pub const FINALIZE_ERROR_NOTICE: &str = "Error creating final proposal.";

/// Message author. Exactly one of the two roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Role string used when the transcript is replayed to the bridge.
    pub fn as_role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

/// One transcript message. Immutable once appended; insertion order is the
/// conversation order and is replayed verbatim to the bridge on every turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// An in-progress project conversation: ordered messages plus the brief the
/// client is building up.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    messages: Vec<Message>,
    brief: Brief,
}

impl ConversationSession {
    /// Creates an empty session with a default brief.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty session around an existing brief snapshot.
    pub fn with_brief(brief: Brief) -> Self {
        Self {
            messages: Vec::new(),
            brief,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn brief(&self) -> &Brief {
        &self.brief
    }

    /// Brief edits come from the client side only; the bridge and the handoff
    /// service never mutate it.
    pub fn brief_mut(&mut self) -> &mut Brief {
        &mut self.brief
    }

    /// Most recent assistant-authored message, if any.
    pub fn latest_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Assistant)
    }

    /// Clears the message sequence. The brief survives a reset.
    pub fn reset(&mut self) {
        self.messages.clear();
    }

    fn transcript(&self) -> Vec<TranscriptEntry> {
        self.messages
            .iter()
            .map(|m| TranscriptEntry {
                role: m.sender.as_role().to_string(),
                text: m.text.clone(),
            })
            .collect()
    }

    fn append(&mut self, sender: Sender, text: impl Into<String>) {
        self.messages.push(Message::new(sender, text));
    }
}

/// Drives turns through the text bridge. One turn is in flight at a time by
/// construction: a new turn cannot start while the previous call on the same
/// session is still awaited.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    bridge: TextBridge,
}

impl ConversationOrchestrator {
    pub fn new(bridge: TextBridge) -> Self {
        Self { bridge }
    }

    /// Runs one user turn. Blank input is a no-op returning `false`.
    ///
    /// For non-blank input the message count always grows by exactly two: the
    /// user message, then either the assistant reply or a synthetic
    /// [`TURN_ERROR_NOTICE`]. Upstream failures are never silently dropped.
    pub async fn send_user_turn(&self, session: &mut ConversationSession, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        session.append(Sender::User, text);

        let request = CompletionRequest::Chat {
            conversation: session.transcript(),
        };
        match self.bridge.run(request).await {
            Ok(reply) => session.append(Sender::Assistant, reply),
            Err(e) => {
                tracing::warn!(target: "sitebrief::conversation", error = %e, "chat turn failed");
                session.append(Sender::Assistant, TURN_ERROR_NOTICE);
            }
        }
        true
    }

    /// True iff the latest assistant message offers to send the brief.
    ///
    /// Only the most recent assistant message is scanned: once the assistant
    /// has moved on from asking, the offer should not resurface.
    pub fn detect_readiness(&self, session: &ConversationSession) -> bool {
        session
            .latest_assistant()
            .map(|m| trigger::asked_to_send(&m.text))
            .unwrap_or(false)
    }

    /// Produces the final proposal from the current brief snapshot alone and
    /// appends it to the transcript. Does not require [`Self::detect_readiness`]
    /// to have fired; a user may force finalization deliberately.
    ///
    /// On upstream failure a synthetic [`FINALIZE_ERROR_NOTICE`] is appended
    /// and the error is returned.
    pub async fn finalize(&self, session: &mut ConversationSession) -> CoreResult<String> {
        let request = CompletionRequest::Final {
            brief: session.brief().clone(),
        };
        match self.bridge.run(request).await {
            Ok(proposal) => {
                session.append(Sender::Assistant, proposal.clone());
                Ok(proposal)
            }
            Err(e) => {
                tracing::warn!(target: "sitebrief::conversation", error = %e, "finalize failed");
                session.append(Sender::Assistant, FINALIZE_ERROR_NOTICE);
                Err(e)
            }
        }
    }

    /// Opens the conversation by sending the brief's single-line form as the
    /// first user turn.
    pub async fn open_with_brief(&self, session: &mut ConversationSession) -> bool {
        let line = session.brief().to_line();
        self.send_user_turn(session, &line).await
    }

    /// Applies a quick preset to the brief, then opens the conversation with
    /// the merged brief.
    pub async fn apply_preset(
        &self,
        session: &mut ConversationSession,
        preset: QuickPreset,
    ) -> bool {
        session.brief_mut().apply_preset(preset);
        self.open_with_brief(session).await
    }
}
