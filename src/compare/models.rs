// src/compare/models.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::compare::version::parse_version_timestamp;
use crate::diff::{LineDiffResult, NumericDiffResult};
use crate::extractors::ExtractedText;
use crate::source::filename_of;
use crate::toc::compare_section_keys;
use crate::utils::error::{CompareError, ReportError};

/// One extracted rendition of a case report.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentVersion {
    pub key: String,
    pub filename: String,
    pub order_timestamp: Option<NaiveDateTime>,
    pub full_text: String,
    pub page_texts: Vec<String>,
}

impl DocumentVersion {
    pub fn new(key: &str, text: ExtractedText) -> Self {
        let filename = filename_of(key).to_string();
        Self {
            key: key.to_string(),
            order_timestamp: parse_version_timestamp(&filename),
            filename,
            full_text: text.full_text,
            page_texts: text.pages,
        }
    }
}

/// Which versions get compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Every consecutive pair, oldest first.
    All,
    /// Oldest against newest only.
    Selective,
}

impl fmt::Display for CompareMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareMode::All => write!(f, "all"),
            CompareMode::Selective => write!(f, "selective"),
        }
    }
}

impl FromStr for CompareMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(CompareMode::All),
            "selective" => Ok(CompareMode::Selective),
            other => Err(format!("unknown comparison mode '{}' (expected all or selective)", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl SectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionStatus::Added => "added",
            SectionStatus::Removed => "removed",
            SectionStatus::Modified => "modified",
            SectionStatus::Unchanged => "unchanged",
        }
    }
}

/// First page of the section in the older and newer version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRefs {
    pub old: Option<usize>,
    pub new: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionComparison {
    pub status: SectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_diff: Option<LineDiffResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_diff: Option<NumericDiffResult>,
    pub pages: PageRefs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_content: Option<String>,
}

impl SectionComparison {
    pub fn new(status: SectionStatus, pages: PageRefs) -> Self {
        Self { status, line_diff: None, numeric_diff: None, pages, old_content: None, new_content: None }
    }
}

/// Canonical display key ordered hierarchically ("1. A" < "1.1 B" < "10. C").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionKey(pub String);

impl SectionKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for SectionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_section_keys(&self.0, &other.0)
    }
}

impl PartialOrd for SectionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for SectionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Section comparisons of one version pair, in hierarchical order.
pub type SectionComparisons = BTreeMap<SectionKey, SectionComparison>;

/// Comparisons of one consecutive version pair in "all" mode.
#[derive(Debug, Clone, PartialEq)]
pub struct PairComparison {
    pub label: String, // "<older> → <newer>"
    pub older: String,
    pub newer: String,
    pub sections: SectionComparisons,
}

/// Pairwise comparisons in chronological order; serialized as a map keyed by pair label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairwiseSections(pub Vec<PairComparison>);

impl Serialize for PairwiseSections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for pair in &self.0 {
            map.serialize_entry(&pair.label, &pair.sections)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComparisonSections {
    Flat(SectionComparisons),
    ByPair(PairwiseSections),
}

impl ComparisonSections {
    /// Every section comparison with its key, regardless of shape.
    pub fn iter_all(&self) -> Box<dyn Iterator<Item = (&SectionKey, &SectionComparison)> + '_> {
        match self {
            ComparisonSections::Flat(sections) => Box::new(sections.iter()),
            ComparisonSections::ByPair(pairs) => Box::new(pairs.0.iter().flat_map(|p| p.sections.iter())),
        }
    }
}

/// Per-version facts gathered while segmenting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionDiagnostics {
    pub key: String,
    pub filename: String,
    pub order_timestamp: Option<NaiveDateTime>,
    pub section_count: usize,
    pub page_count: usize,
    pub absorbed_unmapped_headings: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub total: usize,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub case_id: String,
    pub mode: CompareMode,
    pub versions_compared: Vec<String>,
    pub comparison_timestamp: DateTime<Utc>,
    pub versions: Vec<VersionDiagnostics>,
    pub sections: ComparisonSections,
}

impl ComparisonResult {
    pub fn summary(&self) -> ComparisonSummary {
        let mut summary = ComparisonSummary::default();
        for (_, section) in self.sections.iter_all() {
            summary.total += 1;
            match section.status {
                SectionStatus::Added => summary.added += 1,
                SectionStatus::Removed => summary.removed += 1,
                SectionStatus::Modified => summary.modified += 1,
                SectionStatus::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }

    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What callers receive: a full result, or a result-level error message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ComparisonResponse {
    Completed(Box<ComparisonResult>),
    Failed { error: String },
}

impl ComparisonResponse {
    pub fn result(&self) -> Option<&ComparisonResult> {
        match self {
            ComparisonResponse::Completed(result) => Some(result.as_ref()),
            ComparisonResponse::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ComparisonResponse::Completed(_) => None,
            ComparisonResponse::Failed { error } => Some(error),
        }
    }
}

impl From<Result<ComparisonResult, CompareError>> for ComparisonResponse {
    fn from(outcome: Result<ComparisonResult, CompareError>) -> Self {
        match outcome {
            Ok(result) => ComparisonResponse::Completed(Box::new(result)),
            Err(e) => ComparisonResponse::Failed { error: e.to_string() },
        }
    }
}
