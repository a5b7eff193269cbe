// src/toc/mod.rs
//! Canonical table of contents that every report version is mapped onto.
pub mod matcher;
pub mod normalize;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

use crate::utils::AppError;

#[allow(unused_imports)]
pub use matcher::{map_heading, score_heading_match, similarity_ratio, HeadingMatch};
#[allow(unused_imports)]
pub use normalize::{heading_tokens, normalize_heading};

/// Keys such as "1. Overview", "3.10 Medications" or "0 Full Document".
static CANONICAL_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)*)\.?\s").expect("Failed to compile CANONICAL_KEY_RE"));

/// Which tier of the table of contents an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    TopLevel,
    SecondLevel,
}

/// One entry of the fixed table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalSection {
    pub id: String,    // e.g. "1" or "1.1"
    pub label: String, // e.g. "Overview"
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl CanonicalSection {
    pub fn top(id: &str, label: &str) -> Self {
        Self { id: id.to_string(), label: label.to_string(), parent_id: None }
    }

    pub fn child(id: &str, label: &str) -> Self {
        let parent = id.split('.').next().map(str::to_string);
        Self { id: id.to_string(), label: label.to_string(), parent_id: parent }
    }

    pub fn tier(&self) -> Tier {
        if self.id.contains('.') { Tier::SecondLevel } else { Tier::TopLevel }
    }

    /// The key used in section maps and comparison results.
    /// Top-level entries read "1. Overview", second-level "1.1 Executive Summary".
    pub fn display_key(&self) -> String {
        match self.tier() {
            Tier::TopLevel => format!("{}. {}", self.id, self.label),
            Tier::SecondLevel => format!("{} {}", self.id, self.label),
        }
    }
}

/// Minimum scores a heading needs to map onto each tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    pub second_level: f64,
    pub top_level: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self { second_level: 0.65, top_level: 0.60 }
    }
}

/// Immutable, injected table of contents: two ordered tiers plus thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableOfContents {
    pub top_level: Vec<CanonicalSection>,
    pub second_level: Vec<CanonicalSection>,
    #[serde(default)]
    pub thresholds: MatchThresholds,
}

impl TableOfContents {
    pub fn new(top_level: Vec<CanonicalSection>, second_level: Vec<CanonicalSection>) -> Self {
        Self { top_level, second_level, thresholds: MatchThresholds::default() }
    }

    pub fn with_thresholds(mut self, thresholds: MatchThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Loads a table of contents from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let toc: TableOfContents = serde_json::from_str(&raw)
            .map_err(|e| AppError::Config(format!("Invalid ToC file {}: {}", path.as_ref().display(), e)))?;
        if toc.top_level.is_empty() {
            return Err(AppError::Config("ToC must contain at least one top-level section".to_string()));
        }
        Ok(toc)
    }

    pub fn find(&self, id: &str) -> Option<&CanonicalSection> {
        self.second_level
            .iter()
            .chain(self.top_level.iter())
            .find(|s| s.id == id)
    }

    /// The standard Life Care Plan table of contents.
    pub fn life_care_plan() -> Self {
        let top = [
            ("1", "Overview"),
            ("2", "Summary of Records"),
            ("3", "Interview"),
            ("4", "Central Opinions"),
            ("5", "Future Medical Requirements"),
            ("6", "Cost/Vendor Survey"),
            ("7", "Definition & Discussion of Quantitative Methods"),
            ("8", "Probable Duration of Care"),
            ("9", "Summary Cost Projection Tables"),
            ("10", "Overview of Medical Expert"),
        ];
        let second = [
            ("1.1", "Executive Summary"),
            ("1.2", "Life Care Planning and Life Care Plans"),
            ("1.3", "Biography of Medical Expert"),
            ("1.4", "Framework: A Life Care Plan"),
            ("2.1", "Summary of Medical Records"),
            ("3.1", "Recent History"),
            ("3.2", "Subjective History"),
            ("3.3", "Review of Systems"),
            ("3.4", "Past Medical History"),
            ("3.5", "Past Surgical History"),
            ("3.6", "Injections"),
            ("3.7", "Family History"),
            ("3.8", "Allergies"),
            ("3.9", "Drug and Other Allergies"),
            ("3.10", "Medications"),
            ("3.11", "Assistive Device"),
            ("3.12", "Social History"),
            ("3.13", "Education History"),
            ("3.14", "Professional/Work History"),
            ("3.15", "Habits"),
            ("3.16", "Tobacco Use"),
            ("3.17", "Alcohol Use"),
            ("3.18", "Illicit Drugs"),
            ("3.19", "Avocational Activities"),
            ("3.20", "Residential Situation"),
            ("3.21", "Transportation"),
            ("3.22", "Household Responsibilities"),
            ("4.1", "Diagnostic Conditions"),
            ("4.2", "Consequent Circumstances"),
            ("5.1", "Physician Services"),
            ("5.2", "Routine Diagnostics"),
            ("5.3", "Medications"),
            ("5.4", "Laboratory Studies"),
            ("5.5", "Rehabilitation Services"),
            ("5.6", "Equipment & Supplies"),
            ("5.7", "Environmental Modifications & Essential Services"),
            ("5.8", "Acute Care Services"),
            ("6.1", "Methods, Definitions, and Discussion"),
            ("7.1", "Definition & Discussion of Quantitative Methods"),
            ("8.1", "Probable Duration of Care Metrics"),
        ];
        Self::new(
            top.iter().map(|(id, label)| CanonicalSection::top(id, label)).collect(),
            second.iter().map(|(id, label)| CanonicalSection::child(id, label)).collect(),
        )
    }
}

impl Default for TableOfContents {
    fn default() -> Self {
        Self::life_care_plan()
    }
}

/// True when `key` starts with a canonical numeric id followed by whitespace.
pub fn is_canonical_key(key: &str) -> bool {
    CANONICAL_KEY_RE.is_match(key)
}

/// Numeric components of a key's leading id ("3.10 Medications" -> [3, 10]).
/// Keys without a numeric prefix sort after every canonical key.
pub fn section_sort_key(key: &str) -> Vec<u32> {
    CANONICAL_KEY_RE
        .captures(key)
        .and_then(|caps| caps.get(1))
        .map(|id| id.as_str().split('.').filter_map(|part| part.parse().ok()).collect())
        .unwrap_or_else(|| vec![u32::MAX])
}

/// Hierarchical ordering: "1. W" < "1.1 Z" < "2. Y" < "10. X".
pub fn compare_section_keys(a: &str, b: &str) -> Ordering {
    section_sort_key(a)
        .cmp(&section_sort_key(b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keys_per_tier() {
        let toc = TableOfContents::default();
        assert_eq!(toc.top_level[0].display_key(), "1. Overview");
        assert_eq!(toc.find("3.10").map(|s| s.display_key()), Some("3.10 Medications".to_string()));
        assert_eq!(toc.find("5.3").and_then(|s| s.parent_id.clone()), Some("5".to_string()));
        assert!(toc.top_level.iter().all(|s| s.parent_id.is_none()));
    }

    #[test]
    fn test_every_display_key_is_canonical() {
        let toc = TableOfContents::default();
        for section in toc.top_level.iter().chain(toc.second_level.iter()) {
            assert!(is_canonical_key(&section.display_key()), "{}", section.display_key());
        }
        assert!(is_canonical_key("0 Full Document"));
        assert!(!is_canonical_key("Full Document"));
        assert!(!is_canonical_key("Section 1: Overview"));
    }

    #[test]
    fn test_hierarchical_ordering() {
        let mut keys = vec!["10. X", "2. Y", "1.1 Z", "1. W"];
        keys.sort_by(|a, b| compare_section_keys(a, b));
        assert_eq!(keys, vec!["1. W", "1.1 Z", "2. Y", "10. X"]);

        let mut nested = vec!["3.10 Medications", "3.2 Subjective History", "3. Interview"];
        nested.sort_by(|a, b| compare_section_keys(a, b));
        assert_eq!(nested, vec!["3. Interview", "3.2 Subjective History", "3.10 Medications"]);
    }

    #[test]
    fn test_toc_round_trips_through_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toc.json");
        let toc = TableOfContents::new(
            vec![CanonicalSection::top("1", "Intro")],
            vec![CanonicalSection::child("1.1", "Scope")],
        );
        std::fs::write(&path, serde_json::to_string(&toc).unwrap()).unwrap();

        let loaded = TableOfContents::from_json_file(&path).unwrap();
        assert_eq!(loaded, toc);
        assert_eq!(loaded.thresholds, MatchThresholds::default());
    }
}
