// src/diff/lines.rs
//! Line diff for narrative section bodies.
//!
//! Bodies are normalized, cut into diff units (atomic table rows and list
//! items, sentences for prose), and diffed with an LCS edit script. When the
//! unit pass finds nothing although the normalized texts differ, a second pass
//! compares plain non-empty lines.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::diff::sequence::{diff_ops, DiffOp};
use crate::diff::{ChangedLine, LineDiffResult};

/// Lines starting with one of these are table rows and never split.
const TABLE_ROW_KEYWORDS: &[&str] = &[
    "table",
    "start year",
    "end year",
    "frequency per year",
    "years of care",
    "unit cost",
    "annual cost",
    "lifetime cost",
    "total",
];

static SPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("Failed to compile SPACE_RUN_RE"));
// "follow -up" -> "follow-up"
static DETACHED_HYPHEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w) -(\w)").expect("Failed to compile DETACHED_HYPHEN_RE"));
static LIST_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[•●▪◦‣*\-]|\d+[.)]|[A-Za-z][.)]|\(\w+\))\s+").expect("Failed to compile LIST_ITEM_RE")
});
static CURRENCY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s?\d[\d,]*(?:\.\d+)?").expect("Failed to compile CURRENCY_RE"));

/// Whether a diff marker removes, adds or keeps a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Removed,
    Added,
    Same,
}

/// Normalizes extraction noise while keeping line breaks.
pub fn normalize_text(text: &str) -> String {
    let unified: String = text
        .replace("\r\n", "\n")
        .chars()
        .map(|ch| match ch {
            '\r' => '\n',
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => ' ',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => '\'',
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => '"',
            '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            other => other,
        })
        .collect();

    unified
        .split('\n')
        .map(|line| {
            let collapsed = SPACE_RUN_RE.replace_all(line.trim(), " ");
            DETACHED_HYPHEN_RE.replace_all(&collapsed, "$1-$2").into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_atomic_unit(line: &str) -> bool {
    if LIST_ITEM_RE.is_match(line) || CURRENCY_RE.is_match(line) {
        return true;
    }
    let lower = line.to_lowercase();
    TABLE_ROW_KEYWORDS.iter().any(|kw| lower.starts_with(kw))
}

/// Splits after any of `terminators` followed by whitespace.
fn split_after(line: &str, terminators: &[char]) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = line.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if terminators.contains(&ch) {
            if let Some(&(next_idx, next)) = chars.peek() {
                if next.is_whitespace() {
                    pieces.push(line[start..next_idx].trim().to_string());
                    start = next_idx;
                }
            }
        }
    }
    pieces.push(line[start..].trim().to_string());
    pieces.retain(|p| !p.is_empty());
    pieces
}

/// Sentence split on `. ` `! ` `? `, falling back to `; ` `: `.
fn split_sentences(line: &str) -> Vec<String> {
    let sentences = split_after(line, &['.', '!', '?']);
    if sentences.len() > 1 {
        return sentences;
    }
    split_after(line, &[';', ':'])
}

/// Cuts normalized text into diff units.
pub fn split_units(normalized: &str) -> Vec<String> {
    let mut units = Vec::new();
    for line in normalized.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_atomic_unit(line) {
            units.push(line.to_string());
        } else {
            units.extend(split_sentences(line));
        }
    }
    units
}

/// Marker stream for two unit sequences.
pub fn markers<'a>(old: &'a [String], new: &'a [String]) -> Vec<(Marker, &'a str)> {
    diff_ops(old, new)
        .into_iter()
        .map(|op| match op {
            DiffOp::Equal { old: i, .. } => (Marker::Same, old[i].as_str()),
            DiffOp::Delete { old: i } => (Marker::Removed, old[i].as_str()),
            DiffOp::Insert { new: j } => (Marker::Added, new[j].as_str()),
        })
        .collect()
}

/// Folds a marker stream into added/removed/changed lists: a removal directly
/// followed by an addition is one change.
pub fn pair_markers(markers: &[(Marker, &str)]) -> LineDiffResult {
    let mut result = LineDiffResult::default();
    let mut i = 0;
    while i < markers.len() {
        match markers[i] {
            (Marker::Added, text) => result.added.push(text.to_string()),
            (Marker::Removed, text) => match markers.get(i + 1) {
                Some((Marker::Added, replacement)) => {
                    result.changed.push(ChangedLine { old: text.to_string(), new: replacement.to_string() });
                    i += 1;
                }
                _ => result.removed.push(text.to_string()),
            },
            (Marker::Same, _) => {}
        }
        i += 1;
    }
    result
}

/// First pass: diff over already-split units.
pub fn diff_units(old_units: &[String], new_units: &[String]) -> LineDiffResult {
    pair_markers(&markers(old_units, new_units))
}

/// Second pass: diff over non-empty lines, skipping unit splitting.
pub fn diff_raw_lines(old_normalized: &str, new_normalized: &str) -> LineDiffResult {
    let lines = |text: &str| -> Vec<String> {
        text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect()
    };
    diff_units(&lines(old_normalized), &lines(new_normalized))
}

/// Diffs two section bodies.
pub fn diff_lines(old: &str, new: &str) -> LineDiffResult {
    let old_norm = normalize_text(old);
    let new_norm = normalize_text(new);

    let result = diff_units(&split_units(&old_norm), &split_units(&new_norm));
    if result.is_empty() && old_norm != new_norm {
        tracing::debug!("Unit diff found no changes in differing texts; falling back to raw lines");
        return diff_raw_lines(&old_norm, &new_norm);
    }
    result
}
