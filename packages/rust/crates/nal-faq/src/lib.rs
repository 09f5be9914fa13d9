//! nal-faq - FAQ lookup pipeline for the NAL Real Estate assistant.
//!
//! Answers free-text questions by matching them against a fixed table of
//! question/answer pairs:
//!
//! ```text
//! raw text ─► TextNormalizer ─► detect_intent ─┬─► ReplySelector (greeting/thanks/exit)
//!                                              └─► Embedder ─► SimilarityMatcher ─► ReplySelector
//! ```
//!
//! Every piece of state (knowledge table, dictionary, embedder) is built once
//! and read-only afterward, so a [`ChatEngine`] can be shared behind an `Arc`.
//!
//! # Examples
//!
//! ```rust
//! use nal_faq::{Intent, classify};
//!
//! assert_eq!(classify("Hi there, how are you?"), Intent::Greeting);
//! assert_eq!(classify("what are your hours"), Intent::Unknown);
//! ```

// ============================================================================
// Core modules
// ============================================================================

mod embedding;
mod engine;
mod error;
mod intent;
mod knowledge;
mod normalize;
mod reply;
mod similarity;
mod spelling;
mod tfidf;

// ============================================================================
// Public exports
// ============================================================================

pub use embedding::Embedder;
pub use engine::{ChatEngine, ChatReply, PreparedMessage};
pub use error::{FaqError, Result};
pub use intent::{INTENT_KEYWORDS, Intent, classify, detect_intent};
pub use knowledge::{
    KnowledgeEntry, KnowledgeTable, QaPair, load_qa_pairs, question_vocabulary, read_qa_pairs,
};
pub use normalize::TextNormalizer;
pub use reply::{EXIT_RESPONSE, GREETING_RESPONSES, ReplySelector, THANKS_RESPONSE};
pub use similarity::{
    DEFAULT_MATCH_THRESHOLD, FALLBACK_ANSWER, MatchOutcome, SimilarityMatcher, argmax_similarity,
    cosine_similarity,
};
pub use spelling::{
    DEFAULT_MAX_EDIT_DISTANCE, DOMAIN_WEIGHT, DOMAIN_WORDS, SpellChecker, SpellDictionary,
};
pub use tfidf::TfIdfEmbedder;
