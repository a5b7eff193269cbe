// src/diff/numeric.rs
//! `label -> amount` diff for cost tables.
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::diff::{AddedAmount, ChangedAmount, NumericDiffResult, RemovedAmount};
use crate::toc::normalize_heading;

/// Differences at or below this many cents are rounding noise, not changes.
pub const AMOUNT_TOLERANCE_CENTS: i64 = 1;

// Trailing amount: "$1,234.56", "1234", "$ 12.5"
static TRAILING_AMOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*?)[\s:]*(\$\s?)?((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d+)?)\s*$")
        .expect("Failed to compile TRAILING_AMOUNT_RE")
});
// Leading "Table 3:" tokens, "1.2" / "4)" numbering and bullets
static LABEL_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?i:table)\s+\d+\s*[:.\-]?\s*)?(?:[•●▪◦‣*\-]\s*)?(?:\d+(?:\.\d+)*[.)]?\s+)?")
        .expect("Failed to compile LABEL_PREFIX_RE")
});

/// Extracts `normalized label -> amount` from lines ending in a number.
/// Later lines overwrite earlier ones with the same label.
pub fn extract_amounts(text: &str) -> BTreeMap<String, f64> {
    let mut amounts = BTreeMap::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let Some(caps) = TRAILING_AMOUNT_RE.captures(line) else {
            continue;
        };
        let Ok(amount) = caps[3].replace(',', "").parse::<f64>() else {
            continue;
        };
        let prefix = caps.get(1).map_or("", |m| m.as_str()).trim();
        let label = normalize_heading(&LABEL_PREFIX_RE.replace(prefix, ""));
        if label.is_empty() {
            continue;
        }
        amounts.insert(label, amount);
    }
    amounts
}

/// Difference in whole cents, so the tolerance check and the reported delta agree.
fn delta_cents(old: f64, new: f64) -> i64 {
    ((new - old) * 100.0).round() as i64
}

/// Three-way diff of the amounts found in two section bodies.
pub fn diff_amounts(old: &str, new: &str) -> NumericDiffResult {
    let old_amounts = extract_amounts(old);
    let new_amounts = extract_amounts(new);
    let labels: BTreeSet<&String> = old_amounts.keys().chain(new_amounts.keys()).collect();

    let mut result = NumericDiffResult::default();
    for label in labels {
        match (old_amounts.get(label), new_amounts.get(label)) {
            (None, Some(&new)) => result.added.push(AddedAmount { label: label.clone(), new }),
            (Some(&old), None) => result.removed.push(RemovedAmount { label: label.clone(), old }),
            (Some(&old), Some(&new)) => {
                let cents = delta_cents(old, new);
                if cents.abs() > AMOUNT_TOLERANCE_CENTS {
                    result.changed.push(ChangedAmount { label: label.clone(), old, new, delta: cents as f64 / 100.0 });
                }
            }
            (None, None) => {}
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_amounts_labels_and_values() {
        let text = "Table 1: Physician visit $1,200.50\n2. Physical therapy 85\n- Walker: $ 150\nNo amount here";
        let amounts = extract_amounts(text);
        assert_eq!(amounts.get("physician visit"), Some(&1200.50));
        assert_eq!(amounts.get("physical therapy"), Some(&85.0));
        assert_eq!(amounts.get("walker"), Some(&150.0));
        assert_eq!(amounts.len(), 3);
    }

    #[test]
    fn test_tolerance_absorbs_rounding() {
        let result = diff_amounts("Orthopedic visit $100.00", "Orthopedic visit $100.005");
        assert!(result.is_empty());
    }

    #[test]
    fn test_single_cent_is_within_tolerance() {
        assert!(diff_amounts("Visit $100.00", "Visit $100.01").is_empty());
        assert!(diff_amounts("Visit $100.01", "Visit $100.00").is_empty());
        let result = diff_amounts("Visit $100.00", "Visit $99.98");
        assert_eq!(result.changed[0].delta, -0.02);
    }

    #[test]
    fn test_cent_change_is_reported() {
        let result = diff_amounts("Orthopedic visit $100.00", "Orthopedic visit $100.02");
        assert_eq!(result.changed.len(), 1);
        let change = &result.changed[0];
        assert_eq!(change.label, "orthopedic visit");
        assert_eq!(change.old, 100.0);
        assert_eq!(change.new, 100.02);
        assert_eq!(change.delta, 0.02);
    }

    #[test]
    fn test_added_and_removed_labels() {
        let old = "MRI $900\nX-ray $120";
        let new = "MRI $900\nCT scan $700";
        let result = diff_amounts(old, new);
        assert_eq!(result.added, vec![AddedAmount { label: "ct scan".into(), new: 700.0 }]);
        assert_eq!(result.removed, vec![RemovedAmount { label: "x ray".into(), old: 120.0 }]);
        assert!(result.changed.is_empty());
    }

    #[test]
    fn test_lines_that_are_only_numbers_are_skipped() {
        assert!(extract_amounts("$1,000\n42\n3.").is_empty());
    }
}
