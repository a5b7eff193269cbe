// src/extractors/pages.rs
use std::collections::BTreeMap;

use crate::extractors::section::{HeadingDetector, LineKind};
use crate::toc::TableOfContents;

/// Canonical display key -> first page (1-indexed) the section heading appears on.
pub type SectionPageMap = BTreeMap<String, usize>;

/// Finds the first page each canonical section heading appears on.
///
/// Each page is scanned independently with the same heading rules the
/// segmenter uses; an already-recorded page is never overwritten.
pub fn locate_section_pages(page_texts: &[String], toc: &TableOfContents, detector: &HeadingDetector) -> SectionPageMap {
    let mut pages = SectionPageMap::new();
    for (index, page) in page_texts.iter().enumerate() {
        for line in page.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let LineKind::Heading(section) = detector.classify(line, toc) {
                pages.entry(section.display_key()).or_insert(index + 1);
            }
        }
    }
    tracing::debug!("Located {} section headings across {} pages", pages.len(), page_texts.len());
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_wins() {
        let toc = TableOfContents::default();
        let pages = vec![
            "Cover page\nPrepared for counsel".to_string(),
            "1. Overview\nPatient is stable.".to_string(),
            "continued\n3. Interview\nnotes".to_string(),
            "1. Overview\nrepeated running header".to_string(),
        ];
        let map = locate_section_pages(&pages, &toc, &HeadingDetector::default());
        assert_eq!(map.get("1. Overview"), Some(&2));
        assert_eq!(map.get("3. Interview"), Some(&3));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_no_pages_gives_empty_map() {
        let toc = TableOfContents::default();
        assert!(locate_section_pages(&[], &toc, &HeadingDetector::default()).is_empty());
    }
}
