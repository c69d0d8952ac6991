// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic text detectors over inbound message bodies.
//!
//! Zero-cost pure functions: no AI call, no network, no latency. The deep
//! AI-assisted paths (scoring, escalation) are only reached when these
//! cheap signals fire first.

/// Carrier-mandated stop words (exact match, case-insensitive).
const STOP_WORDS: &[&str] = &["stop", "unsubscribe", "cancel", "end", "quit"];

/// Hot-intent phrases: the lead wants a call right now (contains,
/// case-insensitive).
const HOT_PHRASES: &[&str] = &[
    "call me",
    "call now",
    "call today",
    "call back",
    "can you call",
    "phone me",
    "right away",
    "right now",
    "asap",
    "as soon as possible",
    "immediately",
    "emergency",
    "urgent",
];

/// Urgency signals for the quick lead-score heuristic.
const URGENCY_SIGNALS: &[&str] = &[
    "asap", "urgent", "emergency", "today", "right now", "immediately", "this week",
];

/// Purchase-intent signals.
const INTENT_SIGNALS: &[&str] = &[
    "quote",
    "estimate",
    "how much",
    "book",
    "schedule",
    "appointment",
    "available",
    "when can you",
    "ready to",
];

/// Budget signals.
const BUDGET_SIGNALS: &[&str] = &["$", "budget", "price", "cost", "afford", "financing"];

/// True when the body is exactly one of the carrier stop words.
pub fn is_stop_word(body: &str) -> bool {
    let normalized = body.trim().to_lowercase();
    STOP_WORDS.iter().any(|w| normalized == *w)
}

/// Fast textual hot-intent detector: does the lead want a live call?
pub fn is_hot_intent(body: &str) -> bool {
    let lower = body.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    HOT_PHRASES.iter().any(|p| lower.contains(p))
}

/// Quick urgency/intent/budget screen deciding whether the background
/// scoring pass should request the deep AI-assisted score.
pub fn needs_deep_score(body: &str) -> bool {
    let lower = body.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    let mut signals = 0;
    if URGENCY_SIGNALS.iter().any(|s| lower.contains(s)) {
        signals += 1;
    }
    if INTENT_SIGNALS.iter().any(|s| lower.contains(s)) {
        signals += 1;
    }
    if BUDGET_SIGNALS.iter().any(|s| lower.contains(s)) {
        signals += 1;
    }
    signals >= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_match_exactly_case_insensitive() {
        assert!(is_stop_word("STOP"));
        assert!(is_stop_word("stop"));
        assert!(is_stop_word("  Unsubscribe  "));
        assert!(is_stop_word("QUIT"));
        assert!(!is_stop_word("please stop texting me"));
        assert!(!is_stop_word("stopping by later"));
        assert!(!is_stop_word(""));
    }

    #[test]
    fn hot_intent_detects_call_requests() {
        assert!(is_hot_intent("Can you call me ASAP?"));
        assert!(is_hot_intent("this is an EMERGENCY"));
        assert!(is_hot_intent("please call now"));
        assert!(!is_hot_intent("what are your hours?"));
        assert!(!is_hot_intent(""));
    }

    #[test]
    fn deep_score_requires_a_signal() {
        assert!(needs_deep_score("I need a quote today"));
        assert!(needs_deep_score("my budget is $5000"));
        assert!(needs_deep_score("can we schedule something"));
        assert!(!needs_deep_score("hi"));
        assert!(!needs_deep_score("thanks, talk later"));
    }
}
