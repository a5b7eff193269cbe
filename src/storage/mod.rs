// src/storage/mod.rs
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::compare::ComparisonResult;
use crate::report::OutputFormat;
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// `/base_dir/<case_id>/`, created on demand
    fn case_dir(&self, case_id: &str) -> Result<PathBuf, StorageError> {
        let safe_case: String = case_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let target_dir = self.base_dir.join(safe_case);

        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    fn file_stem(result: &ComparisonResult) -> String {
        format!("comparison_{}_{}", result.mode, result.comparison_timestamp.format("%Y%m%d%H%M%S"))
    }

    /// Writes a rendered report next to the case's other comparison outputs.
    pub fn save_report(&self, result: &ComparisonResult, format: OutputFormat, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        let target_dir = self.case_dir(&result.case_id)?;
        let file_path = target_dir.join(format!("{}.{}", Self::file_stem(result), format.extension()));

        let mut file = fs::File::create(&file_path).map_err(StorageError::IoError)?;
        file.write_all(bytes).map_err(StorageError::IoError)?;

        tracing::info!("Saved report to {}", file_path.display());
        Ok(file_path)
    }

    /// Saves the comparison result as JSON, plus a small summary metadata file.
    pub fn save_result(&self, result: &ComparisonResult) -> Result<PathBuf, StorageError> {
        let target_dir = self.case_dir(&result.case_id)?;
        let stem = Self::file_stem(result);

        let result_path = target_dir.join(format!("{}.json", stem));
        let result_str = serde_json::to_string_pretty(result).map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&result_path, result_str).map_err(StorageError::IoError)?;

        let metadata = serde_json::json!({
            "case_id": result.case_id,
            "mode": result.mode,
            "versions_compared": result.versions_compared,
            "summary": result.summary(),
            "comparison_timestamp": result.comparison_timestamp.to_rfc3339(),
        });
        let metadata_path = target_dir.join(format!("{}_meta.json", stem));
        let metadata_str =
            serde_json::to_string_pretty(&metadata).map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&metadata_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved comparison result to {}", result_path.display());
        Ok(result_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{compare_documents, CompareMode, DocumentVersion};
    use crate::extractors::{ExtractedText, HeadingDetector};
    use crate::toc::TableOfContents;

    fn sample_result() -> ComparisonResult {
        let text = |t: &str| ExtractedText { full_text: t.to_string(), pages: vec![t.to_string()] };
        let versions = vec![
            DocumentVersion::new("C/1/Output/202401011200-LCP.pdf", text("1. Overview\nA.")),
            DocumentVersion::new("C/1/Output/202402011200-LCP.pdf", text("1. Overview\nB.")),
        ];
        compare_documents("C/1", versions, CompareMode::Selective, &TableOfContents::default(), &HeadingDetector::default())
            .unwrap()
    }

    #[test]
    fn test_save_result_writes_json_and_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("out")).unwrap();
        let result = sample_result();

        let path = storage.save_result(&result).unwrap();
        // case ids never escape the output directory
        assert!(path.starts_with(dir.path().join("out").join("C_1")));

        let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["sections"]["1. Overview"]["status"], "modified");

        let meta_path = path.with_file_name(format!("{}_meta.json", StorageManager::file_stem(&result)));
        let meta: serde_json::Value = serde_json::from_str(&fs::read_to_string(meta_path).unwrap()).unwrap();
        assert_eq!(meta["summary"]["modified"], 1);
    }

    #[test]
    fn test_save_report_uses_format_extension() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let path = storage.save_report(&sample_result(), OutputFormat::Html, b"<html></html>").unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("html"));
        assert_eq!(fs::read(&path).unwrap(), b"<html></html>");
    }
}
