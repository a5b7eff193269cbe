// src/compare/mod.rs
pub mod models;
pub mod orchestrator;
pub mod version;

#[allow(unused_imports)]
pub use models::{
    CompareMode,
    ComparisonResponse,
    ComparisonResult,
    ComparisonSections,
    ComparisonSummary,
    DocumentVersion,
    PageRefs,
    PairComparison,
    SectionComparison,
    SectionComparisons,
    SectionKey,
    SectionStatus,
    VersionDiagnostics,
};
#[allow(unused_imports)]
pub use orchestrator::{compare_documents, compare_section_sets, AnalyzedVersion, VersionComparator};
#[allow(unused_imports)]
pub use version::{format_version_timestamp, parse_version_timestamp, sort_chronologically};
