// src/source/mod.rs
//! Where report versions come from.
pub mod http;
pub mod local;
pub mod models;

use async_trait::async_trait;

use crate::utils::error::SourceError;

#[allow(unused_imports)]
pub use http::HttpVersionSource;
#[allow(unused_imports)]
pub use local::LocalVersionStore;
#[allow(unused_imports)]
pub use models::{filename_of, VersionObject};

/// Filename fragments that mark an object as a generated report version.
const REPORT_MARKERS: &[&str] = &["CompleteAIGenerated", "LCP", "LifeCarePlan"];

/// Storage holding the report versions of each case.
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// All candidate objects for a case, unfiltered.
    async fn list_objects(&self, case_id: &str) -> Result<Vec<VersionObject>, SourceError>;

    /// Raw bytes of one object; `Ok(None)` when the object is unavailable.
    async fn fetch_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SourceError>;
}

/// True for PDF report versions (`*.pdf` naming one of the report markers).
pub fn is_report_version(filename: &str) -> bool {
    filename.to_lowercase().ends_with(".pdf") && REPORT_MARKERS.iter().any(|m| filename.contains(m))
}

/// Keeps only objects that look like report versions.
pub fn filter_version_objects(objects: Vec<VersionObject>) -> Vec<VersionObject> {
    objects.into_iter().filter(|o| is_report_version(&o.filename)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_version_filter() {
        assert!(is_report_version("202405061530-C-9-CompleteAIGeneratedReport.pdf"));
        assert!(is_report_version("C-9-LCP-final.PDF"));
        assert!(is_report_version("LifeCarePlan.pdf"));
        assert!(!is_report_version("202405061530-C-9-LCP.docx"));
        assert!(!is_report_version("deposition.pdf"));
    }

    #[test]
    fn test_filter_keeps_order() {
        let objects = vec![
            VersionObject::from_key("C/Output/b-LCP.pdf", 1, None),
            VersionObject::from_key("C/Output/notes.txt", 1, None),
            VersionObject::from_key("C/Output/a-LCP.pdf", 1, None),
        ];
        let names: Vec<String> = filter_version_objects(objects).into_iter().map(|o| o.filename).collect();
        assert_eq!(names, vec!["b-LCP.pdf", "a-LCP.pdf"]);
    }
}
