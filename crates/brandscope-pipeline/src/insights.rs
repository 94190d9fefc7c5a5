//! Insight text: the prompt sent to the text generator and the
//! post-processing applied to whatever comes back.
//!
//! When any brand was analyzed on fewer than
//! [`MIN_POSTS_FOR_FREQUENCY`] posts, sentences giving posting-frequency
//! advice are dropped and a data-coverage caveat is appended. A failed
//! generation becomes a placeholder naming the failure.

use std::fmt::Write as _;
use std::sync::LazyLock;

use brandscope_metrics::quality::MIN_POSTS_FOR_FREQUENCY;
use brandscope_metrics::BrandAnalysis;
use brandscope_sources::{GenerationFailure, GenerationOutcome};
use regex::Regex;

use crate::report::AnalysisReport;

pub const INSIGHT_TEMPERATURE: f32 = 0.7;

static FREQUENCY_ADVICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(posting\s+(frequency|cadence|schedule)|post(s|ing)?\s+(more|less)\s+(often|frequently)|\d+\s*(x|times)\s+(a|per|each)\s+(day|week|month)|posts?\s+per\s+(day|week)|(daily|weekly)\s+posts?|increase\s+(the\s+)?(number\s+of\s+)?posts)",
    )
    .expect("valid regex")
});

/// Summarize the numeric report for the text generator.
#[must_use]
pub fn build_prompt(report: &AnalysisReport) -> String {
    let mut prompt = String::from(
        "You are a social media analyst. Compare the focus brand with its competitors \
         using the figures below and give concise, actionable insights.\n\n",
    );

    prompt.push_str("Brand equity (0-100):\n");
    for row in &report.brand_equity_data {
        let _ = writeln!(
            prompt,
            "- {}{}: equity {:.1} (reach {:.0}, engagement {:.0}, content {:.0}); \
             {} followers, {:.2}% avg engagement, {:.2} posts/day",
            row.brand,
            if row.is_focus { " (focus)" } else { "" },
            row.scores.equity_score,
            row.scores.reach_score,
            row.scores.engagement_score,
            row.scores.content_score,
            row.total_followers,
            row.avg_engagement,
            row.content_velocity,
        );
    }

    prompt.push_str("\nVoice:\n");
    for voice in &report.voice_analysis {
        let _ = writeln!(
            prompt,
            "- {}: {} own posts, {} earned mentions, voice ratio {:.2}, amplification {:.2}",
            voice.brand,
            voice.own_voice.total_posts,
            voice.earn_voice.total_mentions,
            voice.voice_ratio,
            voice.amplification_factor,
        );
    }

    let sov = &report.share_of_voice;
    let _ = writeln!(
        prompt,
        "\nShare of voice over {} conversations ({}):",
        sov.total_universe_conversations,
        sov.universe_keywords.join(", ")
    );
    for share in &sov.brand_shares {
        let _ = writeln!(
            prompt,
            "- {}: {} mentions ({:.1}%)",
            share.brand, share.mentions, share.share_percentage
        );
    }

    let themes: Vec<String> = report
        .keyword_clustering
        .iter()
        .map(|k| {
            let labels: Vec<&str> = k
                .platforms
                .iter()
                .flat_map(|p| p.conversation_themes.iter().map(|t| t.label()))
                .collect();
            format!("- {}: {}", k.brand, labels.join(", "))
        })
        .collect();
    if !themes.is_empty() {
        prompt.push_str("\nConversation themes:\n");
        prompt.push_str(&themes.join("\n"));
        prompt.push('\n');
    }

    let low = low_data_brands(&report.brand_analyses);
    if !low.is_empty() {
        let _ = writeln!(
            prompt,
            "\nSome brands have fewer than {MIN_POSTS_FOR_FREQUENCY} analyzed posts. \
             Do not recommend a posting frequency."
        );
    }

    prompt
}

/// Brands analyzed on fewer posts than frequency advice needs, with their
/// post counts.
#[must_use]
pub fn low_data_brands(brands: &[BrandAnalysis]) -> Vec<(&str, usize)> {
    brands
        .iter()
        .map(|b| (b.brand.name.as_str(), b.posts_analyzed()))
        .filter(|(_, posts)| *posts < MIN_POSTS_FOR_FREQUENCY)
        .collect()
}

/// Final insight text for a generation outcome.
#[must_use]
pub fn finalize_insights(outcome: GenerationOutcome, brands: &[BrandAnalysis]) -> String {
    match outcome {
        GenerationOutcome::Generated(text) => qualify(&text, &low_data_brands(brands)),
        GenerationOutcome::Failed(failure) => placeholder(&failure),
    }
}

#[must_use]
pub fn placeholder(failure: &GenerationFailure) -> String {
    format!(
        "AI insights are unavailable ({failure}). The numeric analysis is complete and \
         unaffected."
    )
}

fn qualify(text: &str, low_data: &[(&str, usize)]) -> String {
    if low_data.is_empty() {
        return text.to_string();
    }

    let mut qualified = strip_frequency_advice(text);
    let coverage: Vec<String> = low_data
        .iter()
        .map(|(brand, posts)| format!("{brand}: {posts} posts"))
        .collect();
    let _ = write!(
        qualified,
        "\n\nNote: these insights rest on limited data ({}). Posting-frequency \
         recommendations were omitted because fewer than {MIN_POSTS_FOR_FREQUENCY} posts \
         were analyzed.",
        coverage.join("; ")
    );
    qualified
}

/// Drop every sentence that gives posting-frequency advice. Line structure
/// is kept; lines left empty are removed.
#[must_use]
pub fn strip_frequency_advice(text: &str) -> String {
    let mut kept_lines = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            kept_lines.push(String::new());
            continue;
        }
        let kept: Vec<&str> = split_sentences(line)
            .into_iter()
            .filter(|s| !FREQUENCY_ADVICE_RE.is_match(s))
            .collect();
        if !kept.is_empty() {
            let indent = &line[..line.len() - line.trim_start().len()];
            kept_lines.push(format!("{indent}{}", kept.join(" ")));
        }
    }

    // Collapse the blank runs left behind by removed lines.
    let mut out: Vec<String> = Vec::with_capacity(kept_lines.len());
    for line in kept_lines {
        if line.is_empty() && out.last().is_none_or(String::is_empty) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out.join("\n")
}

/// Split at `.`, `!` or `?` followed by whitespace or end of line.
fn split_sentences(line: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                let sentence = line[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }
    let rest = line[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

#[cfg(test)]
#[path = "insights_test.rs"]
mod tests;
