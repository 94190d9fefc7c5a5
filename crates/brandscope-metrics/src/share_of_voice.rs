//! Share of voice across a keyword universe.
//!
//! A conversation mentions a brand when every word of the brand name occurs
//! in it as a whole word, case-insensitively. Overlaps count conversations
//! that mention every brand in a set.

use std::collections::BTreeMap;

use brandscope_core::{Platform, RawPost};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{as_f64, ratio, round_to};

/// Label of the Venn region for conversations that mention no brand.
pub const UNIVERSE_LABEL: &str = "Universe";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandShare {
    pub brand: String,
    pub mentions: usize,
    /// Percent of universe conversations, 0-100.
    pub share_percentage: f64,
    pub platform_mentions: BTreeMap<Platform, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlap {
    pub brands: Vec<String>,
    pub count: usize,
}

/// One region of a Venn diagram. `sets` names the brands whose intersection
/// the region represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VennEntry {
    pub sets: Vec<String>,
    pub size: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareOfVoiceAnalysis {
    pub total_universe_conversations: usize,
    pub universe_keywords: Vec<String>,
    pub brand_shares: Vec<BrandShare>,
    pub overlaps: Vec<Overlap>,
    pub venn_data: Vec<VennEntry>,
}

/// Whole-word matcher for a brand name.
#[derive(Debug, Clone)]
pub struct BrandMatcher {
    words: Vec<Regex>,
}

impl BrandMatcher {
    #[must_use]
    pub fn new(brand_name: &str) -> Self {
        let words = brand_name
            .split_whitespace()
            .filter_map(|word| Regex::new(&whole_word_pattern(word)).ok())
            .collect();
        Self { words }
    }

    /// A name without any words matches nothing.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        !self.words.is_empty() && self.words.iter().all(|re| re.is_match(text))
    }
}

/// `\b` is only meaningful next to a word character, so a name word like
/// `Dr.` gets a boundary on its leading side alone.
fn whole_word_pattern(word: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let lead = if word.starts_with(is_word) { r"\b" } else { "" };
    let trail = if word.ends_with(is_word) { r"\b" } else { "" };
    format!("(?i){lead}{}{trail}", regex::escape(word))
}

/// Compute share of voice for `brand_names` over `conversations`, which
/// should already be deduplicated.
#[must_use]
pub fn analyze_share_of_voice(
    universe_keywords: Vec<String>,
    brand_names: &[&str],
    conversations: &[RawPost],
) -> ShareOfVoiceAnalysis {
    let total = conversations.len();
    let matchers: Vec<BrandMatcher> = brand_names.iter().map(|n| BrandMatcher::new(n)).collect();

    // mentioned[c][b]: conversation c mentions brand b.
    let mentioned: Vec<Vec<bool>> = conversations
        .iter()
        .map(|c| matchers.iter().map(|m| m.is_match(&c.text)).collect())
        .collect();

    let brand_shares: Vec<BrandShare> = brand_names
        .iter()
        .enumerate()
        .map(|(b, name)| {
            let mut platform_mentions = BTreeMap::new();
            let mut mentions = 0;
            for (conversation, flags) in conversations.iter().zip(&mentioned) {
                if flags[b] {
                    mentions += 1;
                    *platform_mentions.entry(conversation.platform).or_insert(0) += 1;
                }
            }
            BrandShare {
                brand: (*name).to_string(),
                mentions,
                share_percentage: round_to(
                    ratio(as_f64(mentions as u64), as_f64(total as u64)) * 100.0,
                    2,
                ),
                platform_mentions,
            }
        })
        .collect();

    let count_all = |set: &[usize]| mentioned.iter().filter(|f| set.iter().all(|&b| f[b])).count();

    let mut sets: Vec<Vec<usize>> = Vec::new();
    for a in 0..brand_names.len() {
        for b in a + 1..brand_names.len() {
            sets.push(vec![a, b]);
        }
    }
    if brand_names.len() >= 3 {
        sets.push((0..brand_names.len()).collect());
    }

    let overlaps: Vec<Overlap> = sets
        .iter()
        .map(|set| Overlap {
            brands: set.iter().map(|&b| brand_names[b].to_string()).collect(),
            count: count_all(set),
        })
        .filter(|o| o.count > 0)
        .collect();

    // The residual region is counted directly as conversations naming no
    // brand. This equals `total - sum(mentions) + sum(overlaps)` for two
    // brands; with three or more, the pairwise and all-brand overlaps both
    // include a triple mention, so that formula would overstate the region.
    let unmentioned = mentioned.iter().filter(|f| !f.iter().any(|m| *m)).count();

    let mut venn_data: Vec<VennEntry> = brand_shares
        .iter()
        .map(|share| VennEntry {
            sets: vec![share.brand.clone()],
            size: share.mentions,
            label: format!("{} ({:.1}%)", share.brand, share.share_percentage),
        })
        .collect();
    venn_data.extend(overlaps.iter().map(|o| VennEntry {
        sets: o.brands.clone(),
        size: o.count,
        label: o.brands.join(" & "),
    }));
    if unmentioned > 0 {
        venn_data.push(VennEntry {
            sets: vec![UNIVERSE_LABEL.to_string()],
            size: unmentioned,
            label: UNIVERSE_LABEL.to_string(),
        });
    }

    tracing::debug!(
        conversations = total,
        brands = brand_names.len(),
        overlaps = overlaps.len(),
        "share of voice computed"
    );

    ShareOfVoiceAnalysis {
        total_universe_conversations: total,
        universe_keywords,
        brand_shares,
        overlaps,
        venn_data,
    }
}

#[cfg(test)]
#[path = "share_of_voice_test.rs"]
mod tests;
