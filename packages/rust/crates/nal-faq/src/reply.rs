//! Reply selection: canned replies for conversational intents, matcher
//! output otherwise.

use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::intent::Intent;
use crate::similarity::{FALLBACK_ANSWER, MatchOutcome};

/// Greeting replies; one is chosen uniformly at random.
pub const GREETING_RESPONSES: &[&str] = &["Hi!", "Hey!", "*nods*", "Hi there!", "Hello!"];

/// Reply to thanks.
pub const THANKS_RESPONSE: &str = "You are welcome.";

/// Reply to exit.
pub const EXIT_RESPONSE: &str = "Bye! Take care...";

/// Picks the reply string for a classified utterance.
#[derive(Debug)]
pub struct ReplySelector {
    rng: Mutex<StdRng>,
}

impl Default for ReplySelector {
    fn default() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }
}

impl ReplySelector {
    /// Selector with a fixed seed; greeting choices are reproducible.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    /// Selector drawing from `rng`.
    #[must_use]
    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    /// Reply for `intent`. `outcome` is only read for `Intent::Unknown`; when it
    /// is absent the default fallback is returned.
    pub fn select(&self, intent: Intent, outcome: Option<&MatchOutcome>) -> String {
        match intent {
            Intent::Greeting => self.greeting(),
            Intent::Thanks => THANKS_RESPONSE.to_string(),
            Intent::Exit => EXIT_RESPONSE.to_string(),
            Intent::Unknown => outcome.map_or_else(
                || FALLBACK_ANSWER.to_string(),
                |outcome| outcome.answer.clone(),
            ),
        }
    }

    fn greeting(&self) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        GREETING_RESPONSES
            .choose(&mut *rng)
            .copied()
            .unwrap_or("Hello!")
            .to_string()
    }
}
