//! Integration test: conversation turn orchestration — verifies the turn
//! protocol against a scripted completion provider.
//!
//! ## Scenarios
//! 1. Every non-blank user turn appends exactly one user and one assistant
//!    message, in call order.
//! 2. Blank input is a no-op.
//! 3. Upstream failures become a synthetic assistant message, never a silent
//!    drop.
//! 4. Empty completions degrade to the fixed fallback strings.
//! 5. Readiness is a pure function of the latest assistant message only.
//! 6. Finalize sends only brief fields, never conversation history.
//! 7. Reset clears messages but keeps the brief.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sitebrief_core::{
    Brief, CompletionProvider, ConversationOrchestrator, ConversationSession, CoreError,
    CoreResult, ProviderMessage, QuickPreset, Sender, TextBridge, CHAT_FALLBACK, CHAT_PERSONA,
    FINAL_FALLBACK, FINAL_PERSONA, FINALIZE_ERROR_NOTICE, TURN_ERROR_NOTICE,
};

// ---------------------------------------------------------------------------
// Scripted provider: replays queued replies and records every call it sees
// ---------------------------------------------------------------------------

#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<CoreResult<String>>>,
    calls: Mutex<Vec<(String, Vec<ProviderMessage>)>>,
}

impl ScriptedProvider {
    fn with_replies(replies: Vec<CoreResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, Vec<ProviderMessage>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn complete(&self, system: &str, messages: &[ProviderMessage]) -> CoreResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), messages.to_vec()));
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("scripted reply".to_string()))
    }
}

fn orchestrator(provider: Arc<ScriptedProvider>) -> ConversationOrchestrator {
    ConversationOrchestrator::new(TextBridge::new(provider))
}

fn sample_brief() -> Brief {
    Brief {
        company_name: Some("Bubey's Bite".into()),
        industry: Some("Food & Beverage".into()),
        budget: Some("₦60k–₦150k".into()),
        style: "Warm".into(),
        description: Some("increase orders".into()),
    }
}

// ===========================================================================
// Scenario 1: each turn appends exactly user + assistant, in order
// ===========================================================================

#[tokio::test]
async fn each_turn_appends_user_then_assistant() {
    let provider = ScriptedProvider::with_replies(vec![
        Ok("What's your budget?".to_string()),
        Ok("Sounds good.".to_string()),
    ]);
    let orch = orchestrator(provider);
    let mut session = ConversationSession::new();

    assert!(orch.send_user_turn(&mut session, "I run a bakery").await);
    assert_eq!(session.messages().len(), 2);

    assert!(orch.send_user_turn(&mut session, "Around ₦100k").await);
    assert_eq!(session.messages().len(), 4);

    let senders: Vec<Sender> = session.messages().iter().map(|m| m.sender).collect();
    assert_eq!(
        senders,
        [Sender::User, Sender::Assistant, Sender::User, Sender::Assistant]
    );
    assert_eq!(session.messages()[0].text, "I run a bakery");
    assert_eq!(session.messages()[1].text, "What's your budget?");
}

#[tokio::test]
async fn chat_turn_replays_full_history_under_chat_persona() {
    let provider = ScriptedProvider::with_replies(vec![Ok("reply one".into()), Ok("reply two".into())]);
    let orch = orchestrator(Arc::clone(&provider));
    let mut session = ConversationSession::new();

    orch.send_user_turn(&mut session, "first").await;
    orch.send_user_turn(&mut session, "second").await;

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, CHAT_PERSONA);
    // the second call replays the whole transcript including the new message
    let contents: Vec<&str> = calls[1].1.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, ["first", "reply one", "second"]);
    let roles: Vec<&str> = calls[1].1.iter().map(|m| m.role.as_str()).collect();
    assert_eq!(roles, ["user", "assistant", "user"]);
}

// ===========================================================================
// Scenario 2: blank input is a no-op
// ===========================================================================

#[tokio::test]
async fn blank_input_is_a_noop() {
    let provider = ScriptedProvider::with_replies(vec![]);
    let orch = orchestrator(Arc::clone(&provider));
    let mut session = ConversationSession::new();

    assert!(!orch.send_user_turn(&mut session, "").await);
    assert!(!orch.send_user_turn(&mut session, "   \n").await);
    assert!(session.messages().is_empty());
    assert!(provider.calls().is_empty());
}

// ===========================================================================
// Scenario 3: upstream failure becomes a visible synthetic message
// ===========================================================================

#[tokio::test]
async fn provider_failure_appends_error_notice() {
    let provider = ScriptedProvider::with_replies(vec![Err(CoreError::Upstream(
        "rate limited".to_string(),
    ))]);
    let orch = orchestrator(provider);
    let mut session = ConversationSession::new();

    assert!(orch.send_user_turn(&mut session, "hello?").await);
    assert_eq!(session.messages().len(), 2);
    let last = session.messages().last().unwrap();
    assert_eq!(last.sender, Sender::Assistant);
    assert_eq!(last.text, TURN_ERROR_NOTICE);
}

// ===========================================================================
// Scenario 4: empty completions degrade to fixed fallbacks
// ===========================================================================

#[tokio::test]
async fn empty_chat_completion_uses_fallback() {
    let provider = ScriptedProvider::with_replies(vec![Ok("   ".to_string())]);
    let orch = orchestrator(provider);
    let mut session = ConversationSession::new();

    orch.send_user_turn(&mut session, "hello").await;
    assert_eq!(session.messages()[1].text, CHAT_FALLBACK);
}

#[tokio::test]
async fn empty_final_completion_uses_fallback() {
    let provider = ScriptedProvider::with_replies(vec![Ok(String::new())]);
    let orch = orchestrator(provider);
    let mut session = ConversationSession::with_brief(sample_brief());

    let proposal = orch.finalize(&mut session).await.unwrap();
    assert_eq!(proposal, FINAL_FALLBACK);
}

// ===========================================================================
// Scenario 5: readiness depends on the latest assistant message only
// ===========================================================================

#[tokio::test]
async fn readiness_is_pure_in_latest_assistant_text() {
    let ask = "Great. Would you like me to send the final proposal?";

    // short history
    let provider_a = ScriptedProvider::with_replies(vec![Ok(ask.to_string())]);
    let orch_a = orchestrator(provider_a);
    let mut short = ConversationSession::new();
    orch_a.send_user_turn(&mut short, "ready when you are").await;

    // longer history, identical latest assistant text
    let provider_b = ScriptedProvider::with_replies(vec![
        Ok("Tell me more.".to_string()),
        Ok("What budget?".to_string()),
        Ok(ask.to_string()),
    ]);
    let orch_b = orchestrator(provider_b);
    let mut long = ConversationSession::new();
    orch_b.send_user_turn(&mut long, "I sell cakes").await;
    orch_b.send_user_turn(&mut long, "₦100k or so").await;
    orch_b.send_user_turn(&mut long, "that's everything").await;

    assert!(orch_a.detect_readiness(&short));
    assert!(orch_b.detect_readiness(&long));
}

#[tokio::test]
async fn readiness_does_not_resurface_after_assistant_moves_on() {
    let provider = ScriptedProvider::with_replies(vec![
        Ok("Shall I send the final brief?".to_string()),
        Ok("Here are three more sections you could add.".to_string()),
    ]);
    let orch = orchestrator(provider);
    let mut session = ConversationSession::new();

    orch.send_user_turn(&mut session, "done I think").await;
    assert!(orch.detect_readiness(&session));

    orch.send_user_turn(&mut session, "actually, one more thing").await;
    assert!(!orch.detect_readiness(&session));
}

#[tokio::test]
async fn empty_session_is_never_ready() {
    let provider = ScriptedProvider::with_replies(vec![]);
    let orch = orchestrator(provider);
    let session = ConversationSession::new();
    assert!(!orch.detect_readiness(&session));
}

// ===========================================================================
// Scenario 6: finalize sends only brief fields
// ===========================================================================

#[tokio::test]
async fn finalize_never_sends_conversation_history() {
    let provider = ScriptedProvider::with_replies(vec![
        Ok("Let's talk budget.".to_string()),
        Ok("Your proposal: a warm, appetizing site.".to_string()),
    ]);
    let orch = orchestrator(Arc::clone(&provider));
    let mut session = ConversationSession::with_brief(sample_brief());

    orch.send_user_turn(&mut session, "we bake pastries").await;
    let proposal = orch.finalize(&mut session).await.unwrap();
    assert_eq!(proposal, "Your proposal: a warm, appetizing site.");

    let calls = provider.calls();
    let (system, messages) = &calls[1];
    assert_eq!(system, FINAL_PERSONA);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].role, "user");
    assert!(messages[0].content.contains("Company: Bubey's Bite"));
    assert!(messages[0].content.contains("Budget: ₦60k–₦150k"));
    // nothing from the chat transcript leaks into final mode
    assert!(!messages[0].content.contains("we bake pastries"));
    assert!(!messages[0].content.contains("Let's talk budget."));

    // the proposal is appended as an assistant message
    let last = session.messages().last().unwrap();
    assert_eq!(last.sender, Sender::Assistant);
    assert_eq!(last.text, proposal);
}

#[tokio::test]
async fn finalize_failure_appends_notice_and_returns_error() {
    let provider = ScriptedProvider::with_replies(vec![Err(CoreError::Upstream(
        "boom".to_string(),
    ))]);
    let orch = orchestrator(provider);
    let mut session = ConversationSession::with_brief(sample_brief());

    let result = orch.finalize(&mut session).await;
    assert!(matches!(result, Err(CoreError::Upstream(_))));
    assert_eq!(session.messages().last().unwrap().text, FINALIZE_ERROR_NOTICE);
}

// ===========================================================================
// Scenario 7: reset clears messages, keeps the brief; presets open the chat
// ===========================================================================

#[tokio::test]
async fn reset_clears_messages_but_keeps_brief() {
    let provider = ScriptedProvider::with_replies(vec![Ok("noted".to_string())]);
    let orch = orchestrator(provider);
    let mut session = ConversationSession::with_brief(sample_brief());

    orch.send_user_turn(&mut session, "hello").await;
    assert_eq!(session.messages().len(), 2);

    session.reset();
    assert!(session.messages().is_empty());
    assert_eq!(session.brief().company_name.as_deref(), Some("Bubey's Bite"));
}

#[tokio::test]
async fn preset_merges_brief_and_opens_conversation() {
    let provider = ScriptedProvider::with_replies(vec![Ok("a fine choice".to_string())]);
    let orch = orchestrator(Arc::clone(&provider));
    let mut session = ConversationSession::new();

    assert!(orch.apply_preset(&mut session, QuickPreset::RestaurantFood).await);
    assert_eq!(session.brief().industry.as_deref(), Some("Food & Beverage"));
    assert_eq!(session.brief().style, "Warm");

    let first = &session.messages()[0];
    assert_eq!(first.sender, Sender::User);
    assert!(first.text.starts_with("Brief • "));
    assert!(first.text.contains("Food & Beverage"));
}
