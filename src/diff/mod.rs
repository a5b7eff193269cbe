// src/diff/mod.rs
pub mod lines;
pub mod numeric;
pub mod sequence;

use serde::{Deserialize, Serialize};

#[allow(unused_imports)]
pub use lines::diff_lines;
#[allow(unused_imports)]
pub use numeric::diff_amounts;

/// A unit replaced by another unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedLine {
    pub old: String,
    pub new: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDiffResult {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<ChangedLine>,
}

impl LineDiffResult {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedAmount {
    pub label: String,
    pub old: f64,
    pub new: f64,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddedAmount {
    pub label: String,
    pub new: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovedAmount {
    pub label: String,
    pub old: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumericDiffResult {
    pub changed: Vec<ChangedAmount>,
    pub added: Vec<AddedAmount>,
    pub removed: Vec<RemovedAmount>,
}

impl NumericDiffResult {
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }
}
