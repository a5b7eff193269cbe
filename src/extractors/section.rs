// src/extractors/section.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::toc::{map_heading, CanonicalSection, TableOfContents};

// --- Constants ---
/// Lines longer than this are body text, whatever they start with.
pub const DEFAULT_MAX_HEADING_LEN: usize = 120;

/// Key used when a document has no recognizable canonical heading at all.
pub const FULL_DOCUMENT_KEY: &str = "0 Full Document";

// --- Regex Patterns for Heading Lines (Lazy Static) ---
static HEADING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "Section 3: Interview", "SECTION 3.2 - Subjective History"
        r"(?i)^section\s+(\d+(?:\.\d+)*)[:.\-–\s]+(\S.*)$",
        // "1. Overview": a bare number needs its dot, "12 Medications $1,440.00" is a table row
        r"^(\d+)\.\s+(\p{Lu}.*)$",
        // "3.10 Medications", "3.2. Subjective History" (title must start upper-case)
        r"^(\d+(?:\.\d+)+)\.?\s+(\p{Lu}.*)$",
        // "Part IV: Central Opinions"
        r"(?i)^part\s+([IVXLC]+)\b[:.\-–\s]+(\S.*)$",
    ]
    .iter()
    .filter_map(|pat| Regex::new(pat).ok())
    .collect()
});

// Lines that look like headings but never are
static TABLE_CAPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^table\s+\d+\s*:").expect("Failed to compile TABLE_CAPTION_RE"));
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[•●▪◦‣*\-–]|o\s)\s*").expect("Failed to compile BULLET_RE"));
// Printed table-of-contents entries: "1. Overview ........ 3"
static TOC_ENTRY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\.{3,}|…+|\s{2,})\s*\d+\s*$").expect("Failed to compile TOC_ENTRY_RE"));

// --- Data Structures ---

/// A line that matched one of the heading patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateHeading {
    pub number: String, // "3.10", "IV"
    pub title: String,  // "Medications"
}

/// What a single line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    /// A heading that maps onto the ToC.
    Heading(&'a CanonicalSection),
    /// Matched a heading pattern but no ToC entry cleared its threshold.
    UnmappedHeading(CandidateHeading),
    Content,
}

/// Section bodies of one document version, keyed by canonical display key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedSectionMap {
    pub sections: BTreeMap<String, String>,
    /// Heading-like lines that failed to map and were kept as body text.
    pub absorbed_unmapped_headings: usize,
}

impl ExtractedSectionMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.sections.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    fn push_section(&mut self, key: String, body: Vec<String>) {
        let body = body.join("\n");
        match self.sections.get_mut(&key) {
            // A repeated heading continues the same canonical section
            Some(existing) if !body.is_empty() => {
                if !existing.is_empty() {
                    existing.push('\n');
                }
                existing.push_str(&body);
            }
            Some(_) => {}
            None => {
                self.sections.insert(key, body);
            }
        }
    }
}

/// Heading detection shared by the segmenter and the page locator.
#[derive(Debug, Clone)]
pub struct HeadingDetector {
    max_heading_len: usize,
}

impl Default for HeadingDetector {
    fn default() -> Self {
        Self { max_heading_len: DEFAULT_MAX_HEADING_LEN }
    }
}

impl HeadingDetector {
    pub fn new(max_heading_len: usize) -> Self {
        Self { max_heading_len }
    }

    /// Matches a trimmed line against the heading patterns.
    pub fn candidate(&self, line: &str) -> Option<CandidateHeading> {
        if line.is_empty() || line.chars().count() > self.max_heading_len {
            return None;
        }
        if TABLE_CAPTION_RE.is_match(line) || BULLET_RE.is_match(line) || TOC_ENTRY_RE.is_match(line) {
            return None;
        }
        HEADING_PATTERNS.iter().find_map(|re| {
            re.captures(line).map(|caps| CandidateHeading {
                number: caps[1].to_string(),
                title: caps[2].trim().to_string(),
            })
        })
    }

    /// Classifies a trimmed line, resolving candidate headings through the ToC.
    pub fn classify<'a>(&self, line: &str, toc: &'a TableOfContents) -> LineKind<'a> {
        match self.candidate(line) {
            Some(candidate) => match map_heading(&candidate.title, toc) {
                Some(m) => LineKind::Heading(m.section),
                None => LineKind::UnmappedHeading(candidate),
            },
            None => LineKind::Content,
        }
    }
}

// --- Main Segmenter Structure ---
pub struct SectionSegmenter<'a> {
    toc: &'a TableOfContents,
    detector: HeadingDetector,
}

impl<'a> SectionSegmenter<'a> {
    pub fn new(toc: &'a TableOfContents) -> Self {
        Self { toc, detector: HeadingDetector::default() }
    }

    pub fn with_detector(toc: &'a TableOfContents, detector: HeadingDetector) -> Self {
        Self { toc, detector }
    }

    /// Splits a document's text into canonical sections.
    ///
    /// Lines before the first recognized heading are dropped; unmapped
    /// candidate headings stay in the body of the section they appear in.
    pub fn segment(&self, text: &str) -> ExtractedSectionMap {
        let mut map = ExtractedSectionMap::default();
        let mut current: Option<String> = None;
        let mut body: Vec<String> = Vec::new();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            match self.detector.classify(line, self.toc) {
                LineKind::Heading(section) => {
                    if let Some(key) = current.take() {
                        map.push_section(key, std::mem::take(&mut body));
                    }
                    tracing::trace!("Opening section '{}' at line '{}'", section.display_key(), line);
                    current = Some(section.display_key());
                }
                LineKind::UnmappedHeading(candidate) => {
                    map.absorbed_unmapped_headings += 1;
                    tracing::debug!(
                        "Unmapped heading {} '{}' absorbed into {:?}",
                        candidate.number,
                        candidate.title,
                        current
                    );
                    if current.is_some() {
                        body.push(line.to_string());
                    }
                }
                LineKind::Content => {
                    if current.is_some() {
                        body.push(line.to_string());
                    }
                }
            }
        }

        if let Some(key) = current {
            map.push_section(key, body);
        }

        if map.is_empty() {
            tracing::debug!("No canonical headings found; treating document as a single section");
            map.sections.insert(FULL_DOCUMENT_KEY.to_string(), text.trim().to_string());
        }

        map
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
Life Care Plan for Jane Doe
1. Overview
Patient is stable.
1.1 Executive Summary
The plan covers twenty years.
Section 3: Interview
Interview held on site.
3.10 Medications
- Ibuprofen 200mg
Table 1: Routine Medical Evaluation
9. Summary Cost Projection Tables
Physician visit $1,200.00
";

    #[test]
    fn test_candidate_patterns() {
        let d = HeadingDetector::default();
        assert_eq!(
            d.candidate("Section 2: Summary of Records"),
            Some(CandidateHeading { number: "2".into(), title: "Summary of Records".into() })
        );
        assert_eq!(d.candidate("3.10 Medications").map(|c| c.number), Some("3.10".into()));
        assert_eq!(d.candidate("Part IV: Central Opinions").map(|c| c.number), Some("IV".into()));
        // lower-case title is prose, not a heading
        assert_eq!(d.candidate("2. patient reports pain"), None);
        assert_eq!(d.candidate("Table 2: Therapeutic Evaluation"), None);
        assert_eq!(d.candidate("• 1. Overview"), None);
        assert_eq!(d.candidate("1. Overview .......... 3"), None);
        assert_eq!(d.candidate("12 Medications $1,440.00"), None);
        assert_eq!(d.candidate("3.2. Subjective History").map(|c| c.number), Some("3.2".into()));
    }

    #[test]
    fn test_quantity_rows_stay_in_cost_tables() {
        let toc = TableOfContents::default();
        let text = "9. Summary Cost Projection Tables\nTable 6: Pharmacology\n12 Medications $1,440.00\nPhysician visit $300.00";
        let map = SectionSegmenter::new(&toc).segment(text);

        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("9. Summary Cost Projection Tables"),
            Some("Table 6: Pharmacology\n12 Medications $1,440.00\nPhysician visit $300.00")
        );
        assert_eq!(map.get("3.10 Medications"), None);
        assert_eq!(map.absorbed_unmapped_headings, 0);
    }

    #[test]
    fn test_segment_groups_lines_under_canonical_keys() {
        let toc = TableOfContents::default();
        let map = SectionSegmenter::new(&toc).segment(REPORT);

        assert_eq!(map.get("1. Overview"), Some("Patient is stable."));
        assert_eq!(map.get("1.1 Executive Summary"), Some("The plan covers twenty years."));
        assert_eq!(map.get("3. Interview"), Some("Interview held on site."));
        assert_eq!(
            map.get("3.10 Medications"),
            Some("- Ibuprofen 200mg\nTable 1: Routine Medical Evaluation")
        );
        assert_eq!(map.get("9. Summary Cost Projection Tables"), Some("Physician visit $1,200.00"));
        // preamble before the first heading is not kept
        assert!(map.sections.values().all(|b| !b.contains("Jane Doe")));
        assert_eq!(map.absorbed_unmapped_headings, 0);
    }

    #[test]
    fn test_unmapped_heading_is_absorbed_into_current_section() {
        let toc = TableOfContents::default();
        let text = "1. Overview\nFirst line.\n4. Zebra Crossing Appendix\nSecond line.";
        let map = SectionSegmenter::new(&toc).segment(text);

        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get("1. Overview"),
            Some("First line.\n4. Zebra Crossing Appendix\nSecond line.")
        );
        assert_eq!(map.absorbed_unmapped_headings, 1);
    }

    #[test]
    fn test_unmapped_heading_before_any_section_is_dropped() {
        let toc = TableOfContents::default();
        let text = "7. Zebra Crossing Appendix\nstray\n1. Overview\nBody.";
        let map = SectionSegmenter::new(&toc).segment(text);
        assert_eq!(map.get("1. Overview"), Some("Body."));
        assert_eq!(map.absorbed_unmapped_headings, 1);
    }

    #[test]
    fn test_repeated_heading_continues_section() {
        let toc = TableOfContents::default();
        let text = "1. Overview\nPart one.\n3. Interview\nQ and A.\n1. Overview\nPart two.";
        let map = SectionSegmenter::new(&toc).segment(text);
        assert_eq!(map.get("1. Overview"), Some("Part one.\nPart two."));
    }

    #[test]
    fn test_document_without_headings_is_one_section() {
        let toc = TableOfContents::default();
        let map = SectionSegmenter::new(&toc).segment("just some notes\nno headings here\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(FULL_DOCUMENT_KEY), Some("just some notes\nno headings here"));
    }

    #[test]
    fn test_long_lines_are_never_headings() {
        let toc = TableOfContents::default();
        let detector = HeadingDetector::new(20);
        let text = "1. Overview\n2. Summary of Records and a great deal of other material\nmore";
        let map = SectionSegmenter::with_detector(&toc, detector).segment(text);
        assert_eq!(map.len(), 1);
        assert!(map.get("1. Overview").unwrap().contains("Summary of Records"));
    }
}
