//! TF-IDF keyword extraction and post clustering for one brand on one
//! platform.
//!
//! The algorithm is deterministic for a given post order:
//!
//! 1. Keep the most recent posts (stable sort, so equal timestamps keep
//!    provider order).
//! 2. Tokenize each post with [`crate::text::tokenize`].
//! 3. Score every term by TF-IDF summed across posts and keep the top terms
//!    as the vocabulary.
//! 4. Assign each post to the vocabulary keyword its tokens match most often
//!    (substring match in either direction). Posts matching nothing are left
//!    unclustered.
//! 5. Drop clusters below the minimum size, label the rest with a theme, and
//!    number them by descending size.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use brandscope_core::{Platform, RawPost};
use serde::{Deserialize, Serialize};

use crate::text::tokenize;
use crate::{as_f64, ratio, round_to};

/// Tunables for [`analyze_keywords`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordClusteringOptions {
    pub max_posts: usize,
    pub vocabulary_size: usize,
    pub min_cluster_size: usize,
    pub max_related: usize,
    pub top_keywords: usize,
}

impl Default for KeywordClusteringOptions {
    fn default() -> Self {
        Self {
            max_posts: 40,
            vocabulary_size: 15,
            min_cluster_size: 3,
            max_related: 5,
            top_keywords: 10,
        }
    }
}

/// Conversation theme taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "Product Launch & Features")]
    ProductLaunch,
    #[serde(rename = "Promotions & Offers")]
    Promotions,
    #[serde(rename = "Customer Service")]
    CustomerService,
    #[serde(rename = "Events & Campaigns")]
    Events,
    #[serde(rename = "Brand Positioning")]
    BrandPositioning,
    #[serde(rename = "Community Engagement")]
    Community,
    #[serde(rename = "General Discussion")]
    General,
}

/// Rules are checked in this order; the first hit wins. A trailing `*` marks
/// a stem that also matches longer words (`promo*` covers `promosi`); every
/// other rule word must match the keyword exactly.
const THEME_RULES: &[(Theme, &[&str])] = &[
    (
        Theme::ProductLaunch,
        &[
            "launch*", "new", "baru", "produk*", "product*", "feature*", "fitur*", "rilis*",
            "release*", "varian*", "series",
        ],
    ),
    (
        Theme::Promotions,
        &[
            "promo*", "diskon*", "discount*", "sale", "sales", "offer", "offers", "gratis",
            "free", "cashback*", "voucher*", "deal", "deals", "hemat",
        ],
    ),
    (
        Theme::CustomerService,
        &[
            "service", "services", "layanan*", "help", "bantuan*", "support", "komplain*",
            "complaint*", "tanya*", "order", "orders", "pesanan*",
        ],
    ),
    (
        Theme::Events,
        &[
            "event", "events", "acara*", "campaign*", "kampanye*", "contest*", "lomba*",
            "giveaway*", "festival*", "konser*", "live",
        ],
    ),
    (
        Theme::BrandPositioning,
        &[
            "brand", "branding", "quality", "kualitas*", "premium", "terbaik", "best",
            "original", "asli", "trusted",
        ],
    ),
    (
        Theme::Community,
        &[
            "community", "komunitas*", "fans", "teman*", "bersama", "together", "share",
            "cerita*", "story", "stories",
        ],
    ),
];

fn rule_matches(keyword: &str, rule: &str) -> bool {
    match rule.strip_suffix('*') {
        Some(stem) => keyword.starts_with(stem),
        None => keyword == rule,
    }
}

impl Theme {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Theme::ProductLaunch => "Product Launch & Features",
            Theme::Promotions => "Promotions & Offers",
            Theme::CustomerService => "Customer Service",
            Theme::Events => "Events & Campaigns",
            Theme::BrandPositioning => "Brand Positioning",
            Theme::Community => "Community Engagement",
            Theme::General => "General Discussion",
        }
    }

    /// Infer a theme from a cluster's keywords.
    ///
    /// Leading `#` is ignored. See [`THEME_RULES`] for how rule words match.
    #[must_use]
    pub fn infer<'a>(keywords: impl IntoIterator<Item = &'a str> + Clone) -> Theme {
        for (theme, words) in THEME_RULES {
            let hit = keywords.clone().into_iter().any(|keyword| {
                let bare = keyword.trim_start_matches('#');
                words.iter().any(|rule| rule_matches(bare, rule))
            });
            if hit {
                return *theme;
            }
        }
        Theme::General
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordStat {
    pub keyword: String,
    /// Occurrences across all analyzed posts.
    pub frequency: usize,
    /// Mean engagement of posts containing the keyword.
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordCluster {
    pub id: usize,
    pub keyword: String,
    pub related_keywords: Vec<String>,
    pub post_count: usize,
    pub avg_engagement: f64,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandKeywordAnalysis {
    pub platform: Platform,
    pub posts_analyzed: usize,
    pub top_keywords: Vec<KeywordStat>,
    pub clusters: Vec<KeywordCluster>,
    pub conversation_themes: Vec<Theme>,
}

impl BrandKeywordAnalysis {
    #[must_use]
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            posts_analyzed: 0,
            top_keywords: Vec::new(),
            clusters: Vec::new(),
            conversation_themes: Vec::new(),
        }
    }
}

struct Document {
    tokens: Vec<String>,
    engagement: u64,
}

/// Run keyword extraction and clustering over `posts`.
#[must_use]
pub fn analyze_keywords(
    platform: Platform,
    posts: &[RawPost],
    options: &KeywordClusteringOptions,
) -> BrandKeywordAnalysis {
    let recent = most_recent(posts, options.max_posts);
    if recent.is_empty() {
        return BrandKeywordAnalysis::empty(platform);
    }

    let docs: Vec<Document> = recent
        .iter()
        .map(|post| Document {
            tokens: tokenize(&post.text),
            engagement: post.engagement(),
        })
        .collect();

    let vocabulary = build_vocabulary(&docs, options.vocabulary_size);
    let top_keywords = keyword_stats(&docs, &vocabulary, options.top_keywords);
    let clusters = cluster_documents(&docs, &vocabulary, options);

    let mut conversation_themes = Vec::new();
    for cluster in &clusters {
        if !conversation_themes.contains(&cluster.theme) {
            conversation_themes.push(cluster.theme);
        }
    }

    BrandKeywordAnalysis {
        platform,
        posts_analyzed: docs.len(),
        top_keywords,
        clusters,
        conversation_themes,
    }
}

/// Newest first; undated posts sort last and keep their relative order.
fn most_recent(posts: &[RawPost], limit: usize) -> Vec<&RawPost> {
    let mut sorted: Vec<&RawPost> = posts.iter().collect();
    sorted.sort_by(|a, b| match (a.published_at, b.published_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    sorted.truncate(limit);
    sorted
}

/// Top terms by summed TF-IDF, ties broken alphabetically.
fn build_vocabulary(docs: &[Document], size: usize) -> Vec<String> {
    let mut document_frequency: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in docs {
        let unique: HashSet<&str> = doc.tokens.iter().map(String::as_str).collect();
        for term in unique {
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let n = as_f64(docs.len() as u64);
    let mut scores: BTreeMap<&str, f64> = BTreeMap::new();
    for doc in docs {
        if doc.tokens.is_empty() {
            continue;
        }
        let len = as_f64(doc.tokens.len() as u64);
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for token in &doc.tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        for (term, count) in counts {
            let df = document_frequency.get(term).copied().unwrap_or(1).max(1);
            let idf = (n / as_f64(df as u64)).ln();
            *scores.entry(term).or_insert(0.0) += as_f64(count as u64) / len * idf;
        }
    }

    let mut ranked: Vec<(&str, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(size)
        .map(|(term, _)| term.to_string())
        .collect()
}

fn matches_keyword(token: &str, keyword: &str) -> bool {
    token.contains(keyword) || keyword.contains(token)
}

fn keyword_stats(docs: &[Document], vocabulary: &[String], limit: usize) -> Vec<KeywordStat> {
    vocabulary
        .iter()
        .take(limit)
        .map(|keyword| {
            let frequency = docs
                .iter()
                .map(|d| d.tokens.iter().filter(|t| *t == keyword).count())
                .sum();
            let containing: Vec<u64> = docs
                .iter()
                .filter(|d| d.tokens.contains(keyword))
                .map(|d| d.engagement)
                .collect();
            let total: u64 = containing.iter().sum();
            KeywordStat {
                keyword: keyword.clone(),
                frequency,
                avg_engagement: round_to(
                    ratio(as_f64(total), as_f64(containing.len() as u64)),
                    2,
                ),
            }
        })
        .collect()
}

fn cluster_documents(
    docs: &[Document],
    vocabulary: &[String],
    options: &KeywordClusteringOptions,
) -> Vec<KeywordCluster> {
    // Members per vocabulary index, in document order.
    let mut members: Vec<Vec<&Document>> = vec![Vec::new(); vocabulary.len()];

    for doc in docs {
        let mut best: Option<(usize, usize)> = None;
        for (idx, keyword) in vocabulary.iter().enumerate() {
            let hits = doc
                .tokens
                .iter()
                .filter(|t| matches_keyword(t, keyword))
                .count();
            if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
                best = Some((idx, hits));
            }
        }
        if let Some((idx, _)) = best {
            members[idx].push(doc);
        }
    }

    let mut clusters: Vec<KeywordCluster> = vocabulary
        .iter()
        .zip(members)
        .filter(|(_, docs)| docs.len() >= options.min_cluster_size)
        .map(|(keyword, docs)| {
            let related = related_keywords(&docs, keyword, options.max_related);
            let total: u64 = docs.iter().map(|d| d.engagement).sum();
            let theme = Theme::infer(
                std::iter::once(keyword.as_str()).chain(related.iter().map(String::as_str)),
            );
            KeywordCluster {
                id: 0,
                keyword: keyword.clone(),
                related_keywords: related,
                post_count: docs.len(),
                avg_engagement: round_to(ratio(as_f64(total), as_f64(docs.len() as u64)), 2),
                theme,
            }
        })
        .collect();

    clusters.sort_by(|a, b| b.post_count.cmp(&a.post_count));
    for (i, cluster) in clusters.iter_mut().enumerate() {
        cluster.id = i + 1;
    }
    clusters
}

fn related_keywords(docs: &[&Document], keyword: &str, limit: usize) -> Vec<String> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in docs {
        for token in &doc.tokens {
            if token != keyword {
                *counts.entry(token.as_str()).or_insert(0) += 1;
            }
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(token, _)| token.to_string())
        .collect()
}

#[cfg(test)]
#[path = "keywords_test.rs"]
mod tests;
