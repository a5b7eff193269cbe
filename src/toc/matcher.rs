// src/toc/matcher.rs
use std::collections::HashSet;

use crate::diff::sequence;
use crate::toc::normalize::{heading_tokens, normalize_heading};
use crate::toc::{CanonicalSection, TableOfContents, Tier};

/// A heading resolved onto the table of contents.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingMatch<'a> {
    pub section: &'a CanonicalSection,
    pub tier: Tier,
    pub score: f64,
}

/// Whole-string similarity ratio between two already-normalized strings.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    sequence::ratio(&a, &b)
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Scores a raw heading against a raw canonical label.
///
/// The score is the best of three signals: the character-level similarity
/// ratio, the Jaccard overlap of singularized tokens, and a flat 1.0 when
/// either normalized string contains the other.
pub fn score_heading_match(heading: &str, label: &str) -> f64 {
    let norm_heading = normalize_heading(heading);
    let norm_label = normalize_heading(label);
    if norm_heading.is_empty() || norm_label.is_empty() {
        return 0.0;
    }

    let ratio = similarity_ratio(&norm_heading, &norm_label);

    let heading_set: HashSet<String> = heading_tokens(heading).into_iter().collect();
    let label_set: HashSet<String> = heading_tokens(label).into_iter().collect();
    let overlap = jaccard(&heading_set, &label_set);

    let containment = if norm_heading.contains(&norm_label) || norm_label.contains(&norm_heading) {
        1.0
    } else {
        0.0
    };

    ratio.max(overlap).max(containment)
}

/// Best entry of one tier, if it clears `threshold`. The first entry reaching
/// the maximum score wins, so ties resolve to ToC order.
fn best_in_tier<'a>(
    heading: &str,
    entries: &'a [CanonicalSection],
    tier: Tier,
    threshold: f64,
) -> Option<HeadingMatch<'a>> {
    let mut best: Option<HeadingMatch<'a>> = None;
    for section in entries {
        let score = score_heading_match(heading, &section.label);
        if best.as_ref().map_or(true, |b| score > b.score) {
            best = Some(HeadingMatch { section, tier, score });
        }
    }
    best.filter(|m| m.score >= threshold)
}

/// Maps a heading title onto the table of contents, trying second-level
/// entries before top-level ones. `None` means the heading is unmapped.
pub fn map_heading<'a>(heading: &str, toc: &'a TableOfContents) -> Option<HeadingMatch<'a>> {
    let result = best_in_tier(heading, &toc.second_level, Tier::SecondLevel, toc.thresholds.second_level)
        .or_else(|| best_in_tier(heading, &toc.top_level, Tier::TopLevel, toc.thresholds.top_level));

    match &result {
        Some(m) => tracing::trace!("Mapped heading '{}' -> '{}' (score {:.3})", heading, m.section.display_key(), m.score),
        None => tracing::trace!("Heading '{}' did not map onto the ToC", heading),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_exact_and_containment() {
        assert_eq!(score_heading_match("Overview", "Overview"), 1.0);
        assert_eq!(score_heading_match("MEDICATIONS:", "Medications"), 1.0);
        assert_eq!(score_heading_match("Review of Systems (ROS)", "Review of Systems"), 1.0);
        assert_eq!(score_heading_match("", "Overview"), 0.0);
    }

    #[test]
    fn test_score_token_overlap_handles_plurals() {
        // "physician service" token sets are identical after singularization
        let s = score_heading_match("Services of Physician", "Physician Services");
        assert!(s >= 0.65, "score was {}", s);
        assert!(score_heading_match("Banana Bread", "Physician Services") < 0.5);
    }

    #[test]
    fn test_second_level_is_preferred() {
        let toc = TableOfContents::default();
        let m = map_heading("Executive Summary", &toc).unwrap();
        assert_eq!(m.section.id, "1.1");
        assert_eq!(m.tier, Tier::SecondLevel);
    }

    #[test]
    fn test_falls_back_to_top_level() {
        let toc = TableOfContents::default();
        let m = map_heading("Overview", &toc).unwrap();
        assert_eq!(m.section.id, "1");
        assert_eq!(m.tier, Tier::TopLevel);

        let m = map_heading("Interview", &toc).unwrap();
        assert_eq!(m.section.id, "3");
    }

    #[test]
    fn test_chapter_titles_close_to_second_level_labels_map_there() {
        // chapter titles 2, 7, 8 and 10 clear the second-level threshold first
        let toc = TableOfContents::default();
        let cases = [
            ("Summary of Records", "2.1"),
            ("Definition & Discussion of Quantitative Methods", "7.1"),
            ("Probable Duration of Care", "8.1"),
            ("Overview of Medical Expert", "1.3"),
        ];
        for (heading, id) in cases {
            let m = map_heading(heading, &toc).unwrap();
            assert_eq!(m.section.id, id, "heading {:?}", heading);
            assert_eq!(m.tier, Tier::SecondLevel);
        }
        assert_eq!(map_heading("Overview", &toc).unwrap().section.display_key(), "1. Overview");
    }

    #[test]
    fn test_ties_resolve_to_first_entry() {
        // "Medications" exists as both 3.10 and 5.3; ToC order decides
        let toc = TableOfContents::default();
        assert_eq!(map_heading("Medications", &toc).unwrap().section.id, "3.10");
    }

    #[test]
    fn test_unmapped_heading() {
        let toc = TableOfContents::default();
        assert!(map_heading("Appendix Zebra Crossing", &toc).is_none());
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let toc = TableOfContents::default();
        let first = map_heading("Rehab Services", &toc).map(|m| m.section.id.clone());
        for _ in 0..10 {
            assert_eq!(map_heading("Rehab Services", &toc).map(|m| m.section.id.clone()), first);
        }
    }

    #[test]
    fn test_custom_thresholds_change_outcome() {
        let strict = TableOfContents::default().with_thresholds(crate::toc::MatchThresholds {
            second_level: 1.0,
            top_level: 1.0,
        });
        assert!(map_heading("Executive Summry", &strict).is_none());
        assert!(map_heading("Executive Summry", &TableOfContents::default()).is_some());
    }
}
