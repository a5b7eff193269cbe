// src/extractors/mod.rs
pub mod pages;
pub mod section;
pub mod text;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use pages::{locate_section_pages, SectionPageMap};
#[allow(unused_imports)]
pub use section::{
    CandidateHeading,
    ExtractedSectionMap,
    HeadingDetector,
    LineKind,
    SectionSegmenter,
    FULL_DOCUMENT_KEY,
};
#[allow(unused_imports)]
pub use text::{
    ExtractedText,
    ExtractionStrategy,
    ExtractorChain,
    LopdfStrategy,
    PdfExtractStrategy,
    PlainTextStrategy,
};
