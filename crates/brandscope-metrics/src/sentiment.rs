//! Bilingual (Indonesian + English) keyword sentiment for mention text.

use serde::{Deserialize, Serialize};

/// Words that mark a mention as positive. Lowercase single words.
pub(crate) const POSITIVE_WORDS: &[&str] = &[
    // English
    "good", "great", "love", "loved", "best", "amazing", "awesome", "excellent", "nice",
    "recommend", "recommended", "delicious", "happy", "favorite", "perfect", "worth",
    "fast", "friendly", "quality", "enjoy",
    // Indonesian
    "bagus", "enak", "mantap", "mantul", "suka", "keren", "terbaik", "puas", "rekomen",
    "recomended", "murah", "cepat", "ramah", "lezat", "senang", "favorit", "top", "juara",
];

/// Words that mark a mention as negative.
pub(crate) const NEGATIVE_WORDS: &[&str] = &[
    // English
    "bad", "worst", "terrible", "awful", "hate", "disappointed", "disappointing", "slow",
    "expensive", "rude", "broken", "poor", "refund", "scam", "problem", "complaint",
    "late", "dirty",
    // Indonesian
    "buruk", "jelek", "kecewa", "mengecewakan", "mahal", "lambat", "lama", "parah", "kapok",
    "zonk", "basi", "rusak", "komplain", "kotor", "telat", "nyesel", "penipuan", "males",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Count positive and negative lexicon hits in `text`.
///
/// Words are split on whitespace, trimmed of non-alphabetic characters and
/// lowercased before lookup.
#[must_use]
pub fn lexicon_hits(text: &str) -> (usize, usize) {
    let mut positive = 0;
    let mut negative = 0;
    for word in text.split_whitespace() {
        let w = word
            .trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase();
        if w.is_empty() {
            continue;
        }
        if POSITIVE_WORDS.contains(&w.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&w.as_str()) {
            negative += 1;
        }
    }
    (positive, negative)
}

/// Classify `text` by comparing lexicon hits. Ties, including no hits, are neutral.
#[must_use]
pub fn classify_sentiment(text: &str) -> Sentiment {
    let (positive, negative) = lexicon_hits(text);
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}
