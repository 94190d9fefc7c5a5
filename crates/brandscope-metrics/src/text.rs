//! Tokenization shared by keyword clustering and theme inference.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("valid regex"));
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@[\w.]+").expect("valid regex"));

/// Indonesian and English function words excluded from keyword analysis.
pub const STOP_WORDS: &[&str] = &[
    // Indonesian
    "yang", "dan", "di", "ke", "dari", "ini", "itu", "untuk", "dengan", "pada", "adalah",
    "akan", "juga", "atau", "ada", "tidak", "bisa", "sudah", "saya", "kamu", "kami", "kita",
    "mereka", "dia", "nya", "lagi", "aja", "saja", "sih", "dong", "kok", "deh", "karena",
    "jadi", "kalau", "kalo", "tapi", "sama", "masih", "udah", "gak", "nggak", "ga", "banget",
    "buat", "oleh", "dalam", "sebagai", "seperti", "hanya", "para", "semua", "setiap",
    "harus", "agar", "supaya", "lebih", "yuk", "ayo", "biar",
    // English
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "her",
    "was", "one", "our", "out", "has", "his", "how", "its", "who", "did", "get", "may",
    "him", "she", "too", "use", "with", "this", "that", "from", "they", "have", "were",
    "been", "will", "your", "what", "when", "where", "which", "their", "there", "about",
    "would", "could", "should", "just", "into", "than", "then", "them", "these", "those",
    "some", "more", "also", "only",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Whether `token` (with or without a leading `#`) is a stop-word.
#[must_use]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token.trim_start_matches('#'))
}

/// Split post text into lowercase analysis tokens.
///
/// URLs and `@mentions` are removed, punctuation other than `#` becomes
/// whitespace, and tokens shorter than three characters, purely numeric
/// tokens and stop-words are dropped.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let without_urls = URL_RE.replace_all(text, " ");
    let without_mentions = MENTION_RE.replace_all(&without_urls, " ");

    let cleaned: String = without_mentions
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '#' || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .to_lowercase();

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() >= 3)
        .filter(|token| {
            let bare = token.trim_matches('#');
            !bare.is_empty() && !bare.chars().all(|c| c.is_ascii_digit())
        })
        .filter(|token| !is_stop_word(token))
        .map(str::to_string)
        .collect()
}
