//! sitebrief-core: lead-intake core for the SiteBrief gateway.
//!
//! Covers the three-stage pipeline: conversational brief refinement through a
//! text-generation bridge, heuristic detection of finalize intent in assistant
//! replies, and the handoff that turns a finalized proposal into a persisted
//! review record with reviewer-facing read views.

mod brief;
mod bridge;
mod config;
mod conversation;
mod directory;
mod error;
mod handoff;
mod identity;
mod store;
mod trigger;

pub use brief::{Brief, QuickPreset, DEFAULT_STYLE};
pub use bridge::{
    CompletionProvider, CompletionRequest, OpenRouterBridge, ProviderMessage, TextBridge,
    TranscriptEntry, CHAT_FALLBACK, CHAT_PERSONA, DEFAULT_MODEL, FINAL_FALLBACK, FINAL_PERSONA,
};
pub use config::CoreConfig;
pub use conversation::{
    ConversationOrchestrator, ConversationSession, Message, Sender, FINALIZE_ERROR_NOTICE,
    TURN_ERROR_NOTICE,
};
pub use directory::{PopulatedRecord, ReviewDirectory, UserStatusRow};
pub use error::{CoreError, CoreResult};
pub use handoff::{HandoffRecord, HandoffService, ReviewerNotifier, SmtpNotifier, SubmitRequest};
pub use identity::{Identity, IdentityProvider, StoreBackedIdentities};
pub use store::LeadStore;
pub use trigger::asked_to_send;
