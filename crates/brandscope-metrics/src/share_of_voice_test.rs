use brandscope_core::MediaType;

use super::*;

fn convo(platform: Platform, text: &str) -> RawPost {
    RawPost {
        platform,
        id: None,
        url: None,
        text: text.to_string(),
        author: None,
        author_followers: None,
        published_at: None,
        likes: 0,
        comments: 0,
        shares: 0,
        media_type: MediaType::Text,
    }
}

/// 100 conversations: 10 mention both A and B, 30 only A, 20 only B, 40
/// neither. C is never mentioned.
fn scenario_universe() -> Vec<RawPost> {
    let mut out = Vec::new();
    out.extend((0..10).map(|_| convo(Platform::Twitter, "alpha coffee vs beta tea, pilih mana?")));
    out.extend((0..30).map(|_| convo(Platform::Instagram, "Ngopi di Alpha Coffee pagi ini")));
    out.extend((0..20).map(|_| convo(Platform::TikTok, "Beta Tea enak banget")));
    out.extend((0..40).map(|_| convo(Platform::Facebook, "kopi susu gula aren favorit")));
    out
}

#[test]
fn three_brand_scenario_matches_expected_shares_and_venn() {
    let analysis = analyze_share_of_voice(
        vec!["kopi".to_string(), "teh".to_string()],
        &["Alpha Coffee", "Beta Tea", "Gamma"],
        &scenario_universe(),
    );

    assert_eq!(analysis.total_universe_conversations, 100);
    assert_eq!(analysis.brand_shares[0].share_percentage, 40.0);
    assert_eq!(analysis.brand_shares[1].share_percentage, 30.0);
    assert_eq!(analysis.brand_shares[2].mentions, 0);

    assert_eq!(
        analysis.overlaps,
        vec![Overlap {
            brands: vec!["Alpha Coffee".to_string(), "Beta Tea".to_string()],
            count: 10,
        }]
    );

    let universe = analysis
        .venn_data
        .iter()
        .find(|v| v.label == UNIVERSE_LABEL)
        .expect("universe region present");
    assert_eq!(universe.size, 40);
    assert_eq!(analysis.venn_data[0].label, "Alpha Coffee (40.0%)");
}

#[test]
fn platform_breakdown_counts_mentions_per_source() {
    let analysis =
        analyze_share_of_voice(Vec::new(), &["Alpha Coffee"], &scenario_universe());
    let share = &analysis.brand_shares[0];
    assert_eq!(share.platform_mentions[&Platform::Twitter], 10);
    assert_eq!(share.platform_mentions[&Platform::Instagram], 30);
    assert!(!share.platform_mentions.contains_key(&Platform::TikTok));
}

#[test]
fn every_brand_word_must_match_as_whole_word() {
    let matcher = BrandMatcher::new("Kopi Kenangan");
    assert!(matcher.is_match("kenangan manis di KOPI pagi"));
    assert!(!matcher.is_match("kopi saja"));
    assert!(!matcher.is_match("kopikenangan"));

    let dotted = BrandMatcher::new("Dr. Jou");
    assert!(dotted.is_match("sunscreen dr. jou bagus"));

    assert!(!BrandMatcher::new("   ").is_match("anything"));
}

#[test]
fn all_brand_overlap_is_reported_for_three_or_more() {
    let conversations = vec![
        convo(Platform::Twitter, "alpha beta gamma"),
        convo(Platform::Twitter, "alpha beta"),
    ];
    let analysis =
        analyze_share_of_voice(Vec::new(), &["Alpha", "Beta", "Gamma"], &conversations);

    let counts: Vec<(usize, usize)> = analysis
        .overlaps
        .iter()
        .map(|o| (o.brands.len(), o.count))
        .collect();
    assert_eq!(counts, vec![(2, 2), (2, 1), (2, 1), (3, 1)]);
    assert!(analysis.venn_data.iter().all(|v| v.label != UNIVERSE_LABEL));
}

#[test]
fn universe_region_counts_conversations_naming_no_brand() {
    // One triple mention: mentions sum to 3, overlaps (three pairs plus the
    // all-brand set) sum to 4, yet no conversation falls outside the brands.
    let single = vec![convo(Platform::Twitter, "alpha beta gamma")];
    let analysis = analyze_share_of_voice(Vec::new(), &["Alpha", "Beta", "Gamma"], &single);
    assert!(analysis.venn_data.iter().all(|v| v.label != UNIVERSE_LABEL));

    let mut conversations = single;
    conversations.extend((0..5).map(|_| convo(Platform::Instagram, "kopi susu")));
    conversations.push(convo(Platform::TikTok, "beta only"));
    let analysis =
        analyze_share_of_voice(Vec::new(), &["Alpha", "Beta", "Gamma"], &conversations);
    let universe = analysis
        .venn_data
        .iter()
        .find(|v| v.label == UNIVERSE_LABEL)
        .expect("universe region present");
    assert_eq!(universe.size, 5);
}

#[test]
fn two_brands_have_no_all_brand_overlap() {
    let conversations = vec![convo(Platform::Twitter, "alpha beta")];
    let analysis = analyze_share_of_voice(Vec::new(), &["Alpha", "Beta"], &conversations);
    assert_eq!(analysis.overlaps.len(), 1);
}

#[test]
fn empty_universe_yields_zero_shares() {
    let analysis = analyze_share_of_voice(Vec::new(), &["Alpha", "Beta"], &[]);
    assert_eq!(analysis.total_universe_conversations, 0);
    assert!(analysis
        .brand_shares
        .iter()
        .all(|s| s.share_percentage == 0.0 && s.mentions == 0));
    assert!(analysis.overlaps.is_empty());
}

#[test]
fn overlaps_never_exceed_individual_mentions() {
    let analysis = analyze_share_of_voice(
        Vec::new(),
        &["Alpha Coffee", "Beta Tea", "Gamma"],
        &scenario_universe(),
    );
    let mentions = |name: &str| {
        analysis
            .brand_shares
            .iter()
            .find(|s| s.brand == name)
            .map_or(0, |s| s.mentions)
    };
    for overlap in &analysis.overlaps {
        let min = overlap.brands.iter().map(|b| mentions(b)).min().unwrap_or(0);
        assert!(overlap.count <= min, "{overlap:?} exceeds {min}");
    }
    for share in &analysis.brand_shares {
        assert!((0.0..=100.0).contains(&share.share_percentage));
    }
}
