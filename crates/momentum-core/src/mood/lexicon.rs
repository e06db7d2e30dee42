//! Word-valence sentiment scoring.
//!
//! Scores follow the AFINN convention: each known word carries an integer
//! valence in -5..=5 and a text scores as the sum of its words. A negator
//! directly before a scored word flips that word's sign.

use std::collections::HashMap;

/// Maps free text to a signed sentiment score.
pub trait SentimentScorer: Send + Sync {
    fn score(&self, text: &str) -> i32;
}

impl<F> SentimentScorer for F
where
    F: Fn(&str) -> i32 + Send + Sync,
{
    fn score(&self, text: &str) -> i32 {
        self(text)
    }
}

const NEGATORS: &[&str] = &[
    "not", "no", "never", "dont", "don't", "cant", "can't", "isnt", "isn't", "wasnt", "wasn't",
    "aint", "ain't", "didnt", "didn't", "wont", "won't",
];

const WORDS: &[(&str, i32)] = &[
    // positive
    ("amazing", 4),
    ("awesome", 4),
    ("brilliant", 4),
    ("fantastic", 4),
    ("outstanding", 5),
    ("superb", 5),
    ("thrilled", 5),
    ("wonderful", 4),
    ("excellent", 3),
    ("excited", 3),
    ("great", 3),
    ("happy", 3),
    ("joy", 3),
    ("love", 3),
    ("loved", 3),
    ("delighted", 3),
    ("glad", 3),
    ("proud", 2),
    ("good", 3),
    ("nice", 3),
    ("fun", 4),
    ("energetic", 2),
    ("motivated", 2),
    ("productive", 2),
    ("confident", 2),
    ("calm", 2),
    ("relaxed", 2),
    ("hopeful", 2),
    ("cheerful", 2),
    ("grateful", 3),
    ("thankful", 2),
    ("win", 4),
    ("success", 2),
    ("fresh", 1),
    ("better", 2),
    ("best", 3),
    ("fine", 2),
    ("ok", 1),
    ("okay", 1),
    ("like", 2),
    ("enjoy", 2),
    ("rested", 2),
    ("focused", 2),
    ("strong", 2),
    ("peaceful", 2),
    // negative
    ("terrible", -3),
    ("awful", -3),
    ("horrible", -3),
    ("miserable", -3),
    ("hate", -3),
    ("hopeless", -2),
    ("depressed", -2),
    ("sad", -2),
    ("unhappy", -2),
    ("upset", -2),
    ("angry", -3),
    ("annoyed", -2),
    ("frustrated", -2),
    ("stressed", -2),
    ("anxious", -2),
    ("worried", -3),
    ("tired", -2),
    ("exhausted", -2),
    ("bored", -2),
    ("lonely", -2),
    ("lazy", -1),
    ("bad", -3),
    ("worse", -3),
    ("worst", -3),
    ("sick", -2),
    ("hurt", -2),
    ("pain", -2),
    ("fail", -2),
    ("failed", -2),
    ("failure", -2),
    ("overwhelmed", -2),
    ("stuck", -2),
    ("crap", -3),
    ("sucks", -3),
    ("cry", -1),
    ("crying", -2),
    ("afraid", -2),
    ("scared", -2),
    ("nervous", -2),
    ("down", -1),
    ("meh", -1),
    ("drained", -2),
    ("guilty", -3),
    ("disappointed", -2),
    ("broken", -1),
];

/// Built-in lexicon scorer.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    words: HashMap<String, i32>,
}

impl Default for LexiconScorer {
    fn default() -> Self {
        Self {
            words: WORDS.iter().map(|(w, v)| ((*w).to_string(), *v)).collect(),
        }
    }
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or override word valences.
    pub fn with_words<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        for (word, valence) in extra {
            self.words.insert(word.into().to_lowercase(), valence);
        }
        self
    }

    fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> i32 {
        let mut total = 0;
        let mut negate = false;
        for token in Self::tokens(text) {
            if NEGATORS.contains(&token.as_str()) {
                negate = true;
                continue;
            }
            if let Some(&valence) = self.words.get(&token) {
                total += if negate { -valence } else { valence };
            }
            negate = false;
        }
        total
    }
}
