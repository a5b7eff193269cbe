// src/compare/orchestrator.rs
use futures::stream::{self, StreamExt};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::compare::models::{
    CompareMode, ComparisonResponse, ComparisonResult, ComparisonSections, DocumentVersion, PageRefs,
    PairComparison, PairwiseSections, SectionComparison, SectionComparisons, SectionKey, SectionStatus,
    VersionDiagnostics,
};
use crate::compare::version::sort_chronologically;
use crate::config::EngineConfig;
use crate::diff::{diff_amounts, diff_lines};
use crate::extractors::{locate_section_pages, ExtractedSectionMap, ExtractorChain, HeadingDetector, SectionPageMap, SectionSegmenter};
use crate::source::{filter_version_objects, VersionObject, VersionSource};
use crate::toc::{is_canonical_key, section_sort_key, TableOfContents};
use crate::utils::error::{CompareError, ExtractError, SourceError};

/// A version after segmentation and page location.
#[derive(Debug, Clone)]
pub struct AnalyzedVersion {
    pub version: DocumentVersion,
    pub sections: ExtractedSectionMap,
    pub pages: SectionPageMap,
}

impl AnalyzedVersion {
    pub fn analyze(version: DocumentVersion, toc: &TableOfContents, detector: &HeadingDetector) -> Self {
        let sections = SectionSegmenter::with_detector(toc, detector.clone()).segment(&version.full_text);
        let pages = locate_section_pages(&version.page_texts, toc, detector);
        if sections.absorbed_unmapped_headings > 0 {
            tracing::debug!(
                "{}: {} unmapped headings absorbed into neighbouring sections",
                version.filename,
                sections.absorbed_unmapped_headings
            );
        }
        Self { version, sections, pages }
    }

    fn diagnostics(&self) -> VersionDiagnostics {
        VersionDiagnostics {
            key: self.version.key.clone(),
            filename: self.version.filename.clone(),
            order_timestamp: self.version.order_timestamp,
            section_count: self.sections.len(),
            page_count: self.version.page_texts.len(),
            absorbed_unmapped_headings: self.sections.absorbed_unmapped_headings,
        }
    }
}

/// The cost projection tables get raw content snapshots when they change.
fn is_tables_section(key: &str) -> bool {
    section_sort_key(key).first() == Some(&9) || key.to_lowercase().contains("summary cost projection")
}

/// Compares the canonical sections of two analyzed versions.
pub fn compare_section_sets(older: &AnalyzedVersion, newer: &AnalyzedVersion) -> SectionComparisons {
    let keys: BTreeSet<&String> = older
        .sections
        .sections
        .keys()
        .chain(newer.sections.sections.keys())
        .filter(|key| is_canonical_key(key))
        .collect();

    let mut comparisons = SectionComparisons::new();
    for key in keys {
        let pages = PageRefs { old: older.pages.get(key).copied(), new: newer.pages.get(key).copied() };
        let comparison = match (older.sections.get(key), newer.sections.get(key)) {
            (None, Some(new_text)) => SectionComparison {
                new_content: Some(new_text.to_string()),
                ..SectionComparison::new(SectionStatus::Added, pages)
            },
            (Some(old_text), None) => SectionComparison {
                old_content: Some(old_text.to_string()),
                ..SectionComparison::new(SectionStatus::Removed, pages)
            },
            (Some(old_text), Some(new_text)) => compare_bodies(key, old_text, new_text, pages),
            (None, None) => continue,
        };
        comparisons.insert(SectionKey(key.clone()), comparison);
    }
    comparisons
}

fn compare_bodies(key: &str, old_text: &str, new_text: &str, pages: PageRefs) -> SectionComparison {
    let line_diff = diff_lines(old_text, new_text);
    let numeric_diff = diff_amounts(old_text, new_text);
    if line_diff.is_empty() && numeric_diff.is_empty() {
        return SectionComparison::new(SectionStatus::Unchanged, pages);
    }

    let mut comparison = SectionComparison::new(SectionStatus::Modified, pages);
    if is_tables_section(key) {
        comparison.old_content = Some(old_text.to_string());
        comparison.new_content = Some(new_text.to_string());
    }
    comparison.line_diff = Some(line_diff);
    comparison.numeric_diff = Some(numeric_diff);
    comparison
}

/// Runs a comparison over versions that are already extracted.
pub fn compare_documents(
    case_id: &str,
    versions: Vec<DocumentVersion>,
    mode: CompareMode,
    toc: &TableOfContents,
    detector: &HeadingDetector,
) -> Result<ComparisonResult, CompareError> {
    if versions.len() < 2 {
        return Err(CompareError::InsufficientVersions { usable: versions.len() });
    }

    let mut versions = versions;
    sort_chronologically(&mut versions, |v| v.filename.as_str());

    let analyzed: Vec<AnalyzedVersion> = versions
        .into_iter()
        .map(|v| AnalyzedVersion::analyze(v, toc, detector))
        .collect();

    let sections = match mode {
        CompareMode::Selective => {
            // len >= 2 checked above
            let (oldest, newest) = (&analyzed[0], &analyzed[analyzed.len() - 1]);
            tracing::info!("Comparing {} against {}", oldest.version.filename, newest.version.filename);
            ComparisonSections::Flat(compare_section_sets(oldest, newest))
        }
        CompareMode::All => {
            let pairs = analyzed
                .windows(2)
                .map(|pair| {
                    let (older, newer) = (&pair[0], &pair[1]);
                    tracing::info!("Comparing {} against {}", older.version.filename, newer.version.filename);
                    PairComparison {
                        label: format!("{} → {}", older.version.filename, newer.version.filename),
                        older: older.version.filename.clone(),
                        newer: newer.version.filename.clone(),
                        sections: compare_section_sets(older, newer),
                    }
                })
                .collect();
            ComparisonSections::ByPair(PairwiseSections(pairs))
        }
    };

    Ok(ComparisonResult {
        case_id: case_id.to_string(),
        mode,
        versions_compared: analyzed.iter().map(|a| a.version.filename.clone()).collect(),
        comparison_timestamp: chrono::Utc::now(),
        versions: analyzed.iter().map(AnalyzedVersion::diagnostics).collect(),
        sections,
    })
}

/// Fetches, extracts and compares report versions of a case.
pub struct VersionComparator<S: VersionSource> {
    source: Arc<S>,
    extractor: Arc<ExtractorChain>,
    toc: Arc<TableOfContents>,
    detector: HeadingDetector,
    config: EngineConfig,
}

impl<S: VersionSource + 'static> VersionComparator<S> {
    pub fn new(source: S, toc: TableOfContents, config: EngineConfig) -> Self {
        Self {
            source: Arc::new(source),
            extractor: Arc::new(ExtractorChain::default()),
            toc: Arc::new(toc),
            detector: HeadingDetector::new(config.max_heading_len),
            config,
        }
    }

    /// Replaces the default lopdf, pdf-extract, plain-text chain.
    pub fn with_extractor(mut self, extractor: ExtractorChain) -> Self {
        tracing::debug!("Using extraction strategies: {:?}", extractor.strategy_names());
        self.extractor = Arc::new(extractor);
        self
    }

    /// Report versions of a case, oldest first.
    pub async fn list_versions(&self, case_id: &str) -> Result<Vec<VersionObject>, SourceError> {
        let mut versions = filter_version_objects(self.source.list_objects(case_id).await?);
        sort_chronologically(&mut versions, |v| v.filename.as_str());
        tracing::info!("Found {} report versions for case {}", versions.len(), case_id);
        Ok(versions)
    }

    /// Fetches and extracts one version, bounded by the extraction timeout.
    async fn load_version(&self, key: String) -> Result<DocumentVersion, ExtractError> {
        let source = Arc::clone(&self.source);
        let extractor = Arc::clone(&self.extractor);
        let fetch_key = key.clone();

        let work = async move {
            let bytes = source
                .fetch_bytes(&fetch_key)
                .await
                .map_err(|e| ExtractError::Missing(format!("{}: {}", fetch_key, e)))?
                .ok_or_else(|| ExtractError::Missing(fetch_key.clone()))?;
            tracing::debug!("Fetched {} ({} bytes)", fetch_key, bytes.len());

            let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
                .await
                .map_err(|e| ExtractError::Aborted(e.to_string()))??;
            Ok::<_, ExtractError>(DocumentVersion::new(&fetch_key, text))
        };

        match tokio::time::timeout(self.config.extraction_timeout, work).await {
            Ok(result) => result,
            Err(_) => Err(ExtractError::Timeout(self.config.extraction_timeout.as_secs())),
        }
    }

    /// Fetches every key (bounded fan-out, discovery order kept) and drops
    /// versions that could not be extracted.
    async fn load_versions(&self, version_keys: &[String]) -> Vec<DocumentVersion> {
        let results: Vec<(String, Result<DocumentVersion, ExtractError>)> = stream::iter(version_keys.iter().cloned())
            .map(|key| async move {
                let result = self.load_version(key.clone()).await;
                (key, result)
            })
            .buffered(self.config.max_concurrency)
            .collect()
            .await;

        results
            .into_iter()
            .filter_map(|(key, result)| match result {
                Ok(version) => Some(version),
                Err(e) => {
                    tracing::warn!("Skipping version {}: {}", key, e);
                    None
                }
            })
            .collect()
    }

    /// Compares the given versions of a case. Failures that leave fewer than
    /// two usable versions come back as `{"error": ...}`.
    pub async fn compare_versions(&self, case_id: &str, version_keys: &[String], mode: CompareMode) -> ComparisonResponse {
        if version_keys.is_empty() {
            return ComparisonResponse::from(Err(CompareError::NoVersions));
        }
        tracing::info!("Comparing {} versions of case {} (mode: {})", version_keys.len(), case_id, mode);

        let versions = self.load_versions(version_keys).await;
        if versions.len() < version_keys.len() {
            tracing::warn!("{} of {} versions could not be extracted", version_keys.len() - versions.len(), version_keys.len());
        }

        let outcome = compare_documents(case_id, versions, mode, &self.toc, &self.detector);
        if let Err(e) = &outcome {
            tracing::error!("Comparison for case {} failed: {}", case_id, e);
        }
        ComparisonResponse::from(outcome)
    }
}
