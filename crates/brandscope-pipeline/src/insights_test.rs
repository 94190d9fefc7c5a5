use brandscope_core::{BrandProfile, Platform};
use brandscope_metrics::PlatformSnapshot;
use brandscope_sources::GenerationFailureKind;

use super::*;

fn brand_with_posts(name: &str, posts_analyzed: usize) -> BrandAnalysis {
    let mut snapshot = PlatformSnapshot::unavailable(Platform::Instagram, Some("h".to_string()));
    snapshot.data_available = true;
    snapshot.posts_analyzed = posts_analyzed;
    BrandAnalysis {
        brand: BrandProfile::new(name),
        is_focus: false,
        platforms: vec![snapshot],
    }
}

#[test]
fn splits_on_terminal_punctuation_only() {
    assert_eq!(
        split_sentences("Reach is 2.5x higher. Post 3 times a week! Why? Because."),
        vec!["Reach is 2.5x higher.", "Post 3 times a week!", "Why?", "Because."]
    );
    assert_eq!(split_sentences("no terminator"), vec!["no terminator"]);
}

#[test]
fn strips_frequency_sentences_and_keeps_the_rest() {
    let text = "Kopi A leads on reach. Consider posting 3 times per week to close the gap.\n\
                \n\
                - Increase posting frequency on TikTok.\n\
                - Lean into promo content, which drives the most engagement.";
    let stripped = strip_frequency_advice(text);

    assert!(stripped.contains("Kopi A leads on reach."));
    assert!(stripped.contains("Lean into promo content"));
    assert!(!stripped.contains("3 times per week"));
    assert!(!stripped.contains("posting frequency"));
}

#[test]
fn text_without_advice_is_unchanged() {
    let text = "Brand B has the strongest earned voice.\n\nBrand A should reply to mentions.";
    assert_eq!(strip_frequency_advice(text), text);
}

#[test]
fn low_data_appends_caveat_and_strips_advice() {
    let brands = vec![brand_with_posts("Kopi A", 8), brand_with_posts("Kopi B", 45)];
    let outcome = GenerationOutcome::Generated(
        "Kopi A trails on engagement. Post daily posts on Instagram.".to_string(),
    );

    let text = finalize_insights(outcome, &brands);

    assert!(text.starts_with("Kopi A trails on engagement."));
    assert!(!text.contains("daily posts"));
    assert!(text.contains("Kopi A: 8 posts"), "caveat names the brand: {text}");
    assert!(!text.contains("Kopi B"));
}

#[test]
fn sufficient_data_passes_text_through() {
    let brands = vec![brand_with_posts("Kopi A", 20)];
    let outcome = GenerationOutcome::Generated("Post 2 times a day.".to_string());
    assert_eq!(finalize_insights(outcome, &brands), "Post 2 times a day.");
}

#[test]
fn failure_becomes_placeholder_naming_the_cause() {
    let outcome = GenerationOutcome::Failed(GenerationFailure {
        kind: GenerationFailureKind::Timeout,
        detail: "no response after 120s".to_string(),
    });
    let text = finalize_insights(outcome, &[]);
    assert!(text.contains("unavailable"));
    assert!(text.contains("timed out"));
}
