//! Finalize-intent heuristic: detects when an assistant reply offers to send
//! the finished brief.
//!
//! The pattern favors recall over precision: a false negative only means the
//! user finalizes manually, a false positive only surfaces an extra UI
//! affordance. Applied to assistant-authored messages only.

use once_cell::sync::Lazy;
use regex::Regex;

static ASK_TO_SEND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(would you like me to send|shall i send|ready to send|send (the )?(final )?(brief|proposal|plan))",
    )
    .expect("finalize-intent pattern compiles")
});

/// True iff the text matches an intent-to-finalize phrasing, case-insensitive.
/// Pure and deterministic.
pub fn asked_to_send(text: &str) -> bool {
    ASK_TO_SEND.is_match(text)
}
