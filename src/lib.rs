// src/lib.rs
//! Version comparison for Life Care Plan reports: segments each version into
//! canonical sections and diffs them pairwise.
pub mod compare;
pub mod config;
pub mod diff;
pub mod extractors;
pub mod report;
pub mod source;
pub mod storage;
pub mod toc;
pub mod utils;
