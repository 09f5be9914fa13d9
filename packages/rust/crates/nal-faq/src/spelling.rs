//! Word-frequency spelling corrector.
//!
//! Candidates are generated by edit distance (deletes, adjacent transposes,
//! replaces, inserts over `a-z`). The first distance tier that contains a known
//! word wins, and within a tier the most frequent word is chosen. Equal
//! frequencies resolve to the lexicographically smaller word.
//!
//! The bundled list is a general US English dictionary of about 100k words with
//! prose-corpus counts. Domain words are loaded with [`DOMAIN_WEIGHT`] on top of
//! their general count, so they outrank any general word in the same tier.

use std::collections::HashMap;
use std::path::Path;

use crate::error::Result;

/// Domain vocabulary added on top of the general dictionary.
pub const DOMAIN_WORDS: &[&str] = &["NAL", "RealEstate", "property", "agent", "listing"];

/// Weight added to every domain override.
pub const DOMAIN_WEIGHT: u64 = 1 << 32;

/// Default maximum edit distance for suggestions.
pub const DEFAULT_MAX_EDIT_DISTANCE: usize = 2;

const BUNDLED_WORDS: &str = include_str!("../data/english_words.txt");
const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's',
    't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Spelling collaborator used by the text normalizer.
pub trait SpellChecker: Send + Sync {
    /// Case-insensitive dictionary membership.
    fn is_known(&self, word: &str) -> bool;

    /// Best correction for `word`, or `None` when nothing plausible exists.
    fn suggest(&self, word: &str) -> Option<String>;
}

/// Case-insensitive word-frequency dictionary.
#[derive(Debug, Clone)]
pub struct SpellDictionary {
    words: HashMap<String, u64>,
    longest_word_len: usize,
    max_edit_distance: usize,
}

impl Default for SpellDictionary {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EDIT_DISTANCE)
    }
}

impl SpellDictionary {
    /// Empty dictionary; `max_edit_distance` is clamped to `1..=2`.
    #[must_use]
    pub fn new(max_edit_distance: usize) -> Self {
        Self {
            words: HashMap::new(),
            longest_word_len: 0,
            max_edit_distance: max_edit_distance.clamp(1, 2),
        }
    }

    /// Dictionary seeded with the bundled general English frequency list.
    #[must_use]
    pub fn english(max_edit_distance: usize) -> Self {
        let mut dictionary = Self::new(max_edit_distance);
        dictionary.load_frequency_list(BUNDLED_WORDS);
        dictionary
    }

    /// Merge a frequency list (`word [count]` per line, `#` comments).
    ///
    /// Lines without a count are weighted by position: the first word gets the
    /// highest weight. Repeated words accumulate. Returns the number of lines read.
    pub fn load_frequency_list(&mut self, text: &str) -> usize {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();
        let total = lines.len() as u64;
        for (position, line) in lines.iter().enumerate() {
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let count = parts
                .next()
                .and_then(|raw| raw.parse::<u64>().ok())
                .unwrap_or_else(|| total - position as u64);
            self.add_word(word, count);
        }
        lines.len()
    }

    /// Merge a frequency list from a file.
    pub fn load_frequency_file(&mut self, path: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(path)?;
        let loaded = self.load_frequency_list(&text);
        tracing::debug!(
            event = "nal.spelling.dictionary.file_loaded",
            path = %path.display(),
            words = loaded,
            "extra dictionary loaded"
        );
        Ok(loaded)
    }

    /// Add words with a count of one each (incrementing existing entries).
    pub fn load_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.add_word(word.as_ref(), 1);
        }
    }

    /// Add domain overrides: each word gains [`DOMAIN_WEIGHT`].
    pub fn load_domain_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            self.add_word(word.as_ref(), DOMAIN_WEIGHT);
        }
    }

    fn add_word(&mut self, word: &str, count: u64) {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return;
        }
        self.longest_word_len = self.longest_word_len.max(word.chars().count());
        let entry = self.words.entry(word).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Frequency of `word`, if known.
    #[must_use]
    pub fn frequency(&self, word: &str) -> Option<u64> {
        self.words.get(&word.to_lowercase()).copied()
    }

    /// Number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the dictionary holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Configured maximum edit distance.
    #[must_use]
    pub fn max_edit_distance(&self) -> usize {
        self.max_edit_distance
    }

    fn should_check(&self, word: &str) -> bool {
        let mut chars = word.chars();
        match (chars.next(), chars.next()) {
            (None, _) => return false,
            (Some(c), None) if c.is_ascii_punctuation() => return false,
            _ => {}
        }
        if word.chars().count() > self.longest_word_len + 3 {
            return false;
        }
        let looks_numeric = word.chars().any(|c| c.is_ascii_digit()) && word.parse::<f64>().is_ok();
        !looks_numeric
    }

    fn best_known<'a, I>(&'a self, candidates: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = String>,
    {
        let mut best: Option<(&'a str, u64)> = None;
        for candidate in candidates {
            if let Some((word, &freq)) = self.words.get_key_value(candidate.as_str()) {
                best = Some(match best {
                    Some((best_word, best_freq))
                        if best_freq > freq || (best_freq == freq && best_word <= word.as_str()) =>
                    {
                        (best_word, best_freq)
                    }
                    _ => (word.as_str(), freq),
                });
            }
        }
        best.map(|(word, _)| word)
    }
}

impl SpellChecker for SpellDictionary {
    fn is_known(&self, word: &str) -> bool {
        self.words.contains_key(&word.to_lowercase())
    }

    fn suggest(&self, word: &str) -> Option<String> {
        let word = word.to_lowercase();
        if !self.should_check(&word) {
            return None;
        }
        if self.words.contains_key(&word) {
            return Some(word);
        }
        let first_tier = edits1(&word);
        if let Some(found) = self.best_known(first_tier.iter().cloned()) {
            return Some(found.to_string());
        }
        if self.max_edit_distance < 2 {
            return None;
        }
        self.best_known(first_tier.iter().flat_map(|edit| edits1(edit)))
            .map(ToString::to_string)
    }
}

/// All strings one edit away from `word`.
fn edits1(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut out = Vec::with_capacity(54 * chars.len() + 25);
    for split in 0..=chars.len() {
        let (left, right) = chars.split_at(split);
        if let Some((_, rest)) = right.split_first() {
            out.push(left.iter().chain(rest).collect());
        }
        if right.len() > 1 {
            out.push(
                left.iter()
                    .chain([&right[1], &right[0]])
                    .chain(&right[2..])
                    .collect(),
            );
        }
        for c in ALPHABET {
            if let Some((_, rest)) = right.split_first() {
                out.push(left.iter().chain([c]).chain(rest).collect());
            }
            out.push(left.iter().chain([c]).chain(right).collect());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits1_covers_each_edit_kind() {
        let edits = edits1("ab");
        assert!(edits.contains(&"b".to_string()), "delete");
        assert!(edits.contains(&"ba".to_string()), "transpose");
        assert!(edits.contains(&"zb".to_string()), "replace");
        assert!(edits.contains(&"abc".to_string()), "insert");
    }

    #[test]
    fn edits1_of_empty_word_is_single_letters() {
        let edits = edits1("");
        assert_eq!(edits.len(), ALPHABET.len());
    }

    #[test]
    fn numbers_and_punctuation_are_not_checked() {
        let dictionary = SpellDictionary::english(2);
        assert!(!dictionary.should_check("42"));
        assert!(!dictionary.should_check("3.5"));
        assert!(!dictionary.should_check("?"));
        assert!(dictionary.should_check("infinity"));
    }

    #[test]
    fn domain_words_outrank_general_words_in_a_tier() {
        let mut dictionary = SpellDictionary::new(2);
        dictionary.load_frequency_list("int 30000\nrent 1\n");
        assert_eq!(dictionary.suggest("rnt").as_deref(), Some("int"));
        dictionary.load_domain_words(["rent"]);
        assert_eq!(dictionary.frequency("rent"), Some(DOMAIN_WEIGHT + 1));
        assert_eq!(dictionary.suggest("rnt").as_deref(), Some("rent"));
    }

    #[test]
    fn overlong_words_are_not_checked() {
        let mut dictionary = SpellDictionary::new(2);
        dictionary.load_words(["abc"]);
        assert!(dictionary.should_check("abcdef"));
        assert!(!dictionary.should_check("abcdefg"));
    }
}
