// src/extractors/text.rs
//! Turning raw document bytes into full text plus per-page text.
//!
//! Extraction is an ordered chain of strategies: each one either produces
//! text or reports that it is unavailable for the input, and the chain stops at
//! the first success.

use crate::utils::error::ExtractError;

/// Form feed separates pages in text produced by pdf-extract and in plain text exports.
const PAGE_BREAK: char = '\x0C';

/// Text of one document version.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedText {
    pub full_text: String,
    pub pages: Vec<String>,
}

impl ExtractedText {
    fn from_pages(pages: Vec<String>) -> Self {
        Self { full_text: pages.join("\n"), pages }
    }
}

/// One way of extracting text from document bytes.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError>;
}

fn is_pdf(bytes: &[u8]) -> bool {
    bytes.len() > 4 && &bytes[0..4] == b"%PDF"
}

fn split_pages(text: &str) -> Vec<String> {
    text.split(PAGE_BREAK).map(str::to_string).collect()
}

/// Per-page extraction with lopdf.
pub struct LopdfStrategy;

impl ExtractionStrategy for LopdfStrategy {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        if !is_pdf(bytes) {
            return Err(ExtractError::Unavailable(self.name()));
        }
        let failed = |message: String| ExtractError::Failed { extractor: "lopdf", message };

        let document = lopdf::Document::load_mem(bytes).map_err(|e| failed(e.to_string()))?;
        if document.is_encrypted() {
            return Err(failed("document is encrypted".to_string()));
        }

        let mut pages = Vec::new();
        for page_number in document.get_pages().keys() {
            let text = document
                .extract_text(&[*page_number])
                .map_err(|e| failed(format!("page {}: {}", page_number, e)))?;
            pages.push(text);
        }

        if pages.iter().all(|p| p.trim().is_empty()) {
            return Err(failed("no text layer found".to_string()));
        }
        tracing::debug!("lopdf extracted {} pages", pages.len());
        Ok(ExtractedText::from_pages(pages))
    }
}

/// Whole-document extraction with pdf-extract, which copes with CID fonts
/// lopdf cannot decode. Pages come from form-feed separators when present.
pub struct PdfExtractStrategy;

impl ExtractionStrategy for PdfExtractStrategy {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        if !is_pdf(bytes) {
            return Err(ExtractError::Unavailable(self.name()));
        }
        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Failed {
            extractor: "pdf-extract",
            message: e.to_string(),
        })?;
        if text.trim().is_empty() {
            return Err(ExtractError::Failed {
                extractor: "pdf-extract",
                message: "no text layer found".to_string(),
            });
        }
        let pages = if text.contains(PAGE_BREAK) { split_pages(&text) } else { Vec::new() };
        Ok(ExtractedText { full_text: text.replace(PAGE_BREAK, "\n"), pages })
    }
}

/// UTF-8 text documents (pre-extracted renditions and test fixtures).
pub struct PlainTextStrategy;

impl ExtractionStrategy for PlainTextStrategy {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        if is_pdf(bytes) {
            return Err(ExtractError::Unavailable(self.name()));
        }
        let text = std::str::from_utf8(bytes).map_err(|_| ExtractError::Unavailable(self.name()))?;
        Ok(ExtractedText::from_pages(split_pages(text)))
    }
}

/// Ordered list of strategies; the first success wins.
pub struct ExtractorChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for ExtractorChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(LopdfStrategy),
            Box::new(PdfExtractStrategy),
            Box::new(PlainTextStrategy),
        ])
    }
}

impl ExtractorChain {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        let mut last_error = ExtractError::NoStrategy;
        for strategy in &self.strategies {
            match strategy.extract(bytes) {
                Ok(text) => {
                    tracing::debug!("Extracted {} chars with '{}'", text.full_text.len(), strategy.name());
                    return Ok(text);
                }
                Err(ExtractError::Unavailable(name)) => {
                    tracing::trace!("Extractor '{}' unavailable, trying next", name);
                }
                Err(e) => {
                    tracing::warn!("Extractor '{}' failed: {}", strategy.name(), e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}
