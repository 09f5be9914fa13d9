//! Intent classifier over three fixed vocabularies.
//!
//! Matching is case-insensitive and word-bounded. Categories are checked in
//! order greeting, thanks, exit; the first hit wins.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

fn compile_regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        Err(_compile_err) => match Regex::new(r"$^") {
            Ok(fallback) => fallback,
            Err(fallback_err) => panic!("hardcoded fallback regex must compile: {fallback_err}"),
        },
    }
}

/// Every word the intent vocabularies match on.
///
/// Loaded into the spelling dictionary as domain words so that near-misses
/// such as `helo` correct toward the intent rather than a more common word.
pub const INTENT_KEYWORDS: &[&str] = &[
    "hello", "hi", "hey", "greetings", "thank", "thanks", "thanx", "bye", "exit", "quit",
];

static GREETING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"(?i)\b(hello|hi|hey|greetings)\b"));
static THANKS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| compile_regex(r"(?i)\b(thank(s| you)?|thanx)\b"));
static EXIT_REGEX: LazyLock<Regex> = LazyLock::new(|| compile_regex(r"(?i)\b(bye|exit|quit)\b"));

/// Coarse conversational purpose of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// hello / hi / hey / greetings
    Greeting,
    /// thanks / thank you / thanx
    Thanks,
    /// bye / exit / quit
    Exit,
    /// Anything else; answered by similarity matching.
    Unknown,
}

impl Intent {
    /// Stable lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Thanks => "thanks",
            Self::Exit => "exit",
            Self::Unknown => "unknown",
        }
    }
}

/// Classify a single text.
#[must_use]
pub fn classify(text: &str) -> Intent {
    if GREETING_REGEX.is_match(text) {
        Intent::Greeting
    } else if THANKS_REGEX.is_match(text) {
        Intent::Thanks
    } else if EXIT_REGEX.is_match(text) {
        Intent::Exit
    } else {
        Intent::Unknown
    }
}

/// Two-pass detection: the raw text decides first; the normalized text is
/// only consulted when the raw text is `Unknown`.
#[must_use]
pub fn detect_intent(raw: &str, normalized: &str) -> Intent {
    match classify(raw) {
        Intent::Unknown => classify(normalized),
        intent => intent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_intent_wins_over_normalized() {
        assert_eq!(detect_intent("ok bye", "hello"), Intent::Exit);
    }

    #[test]
    fn normalized_text_is_consulted_when_raw_is_unknown() {
        assert_eq!(detect_intent("helo", "hello"), Intent::Greeting);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(Intent::Greeting.as_str(), "greeting");
        assert_eq!(Intent::Unknown.as_str(), "unknown");
    }
}
