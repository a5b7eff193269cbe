// src/diff/sequence.rs
//! Sequence primitives shared by the heading matcher and the line diff:
//! a Ratcliff/Obershelp similarity ratio and an LCS edit script.
use std::collections::HashMap;
use std::hash::Hash;

/// One step of an edit script between sequences `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    Equal { old: usize, new: usize },
    Delete { old: usize },
    Insert { new: usize },
}

/// Similarity in `[0, 1]`: twice the number of matched elements divided by the
/// total length, where matches are found by recursively taking the longest
/// common block and recursing on both sides of it.
pub fn ratio<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_elements(a, b) as f64 / total as f64
}

fn matched_elements<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_block(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common contiguous block in `a[alo..ahi]` and `b[blo..bhi]`,
/// returned as (start in a, start in b, length). Earliest block wins ties.
fn longest_block<T: PartialEq>(
    a: &[T],
    b: &[T],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];
    let mut best = (alo, blo, 0);
    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            curr[col] = if a[i] == b[j] { prev[col - 1] + 1 } else { 0 };
            if curr[col] > best.2 {
                best = (i + 1 - curr[col], j + 1 - curr[col], curr[col]);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    best
}

/// Largest `n * m` table the exact LCS pass may allocate (about 16 MB of `u32`).
pub const MAX_LCS_CELLS: usize = 4_000_000;

/// Line-oriented edit script based on the longest common subsequence.
///
/// Inside each run of changes the deletions and insertions are interleaved
/// (`-a1 +b1 -a2 +b2 ...`), so a replaced element is always a delete directly
/// followed by its insert. Surplus deletions or insertions trail the run.
///
/// Gaps too large for the exact table are split on elements that occur once on
/// each side (kept in order via a longest increasing subsequence); whatever is
/// still too large after that is emitted as a plain delete/insert run.
pub fn diff_ops<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<DiffOp> {
    let mut raw = Vec::with_capacity(a.len().max(b.len()));
    align(a, b, 0, 0, false, &mut raw);
    interleave(raw)
}

fn align<T: Eq + Hash>(a: &[T], b: &[T], a_off: usize, b_off: usize, has_recursed: bool, ops: &mut Vec<DiffOp>) {
    let prefix = a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    ops.extend((0..prefix).map(|k| DiffOp::Equal { old: a_off + k, new: b_off + k }));

    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];
    let (mid_a_off, mid_b_off) = (a_off + prefix, b_off + prefix);

    if a_mid.is_empty() || b_mid.is_empty() || a_mid.len().saturating_mul(b_mid.len()) <= MAX_LCS_CELLS {
        align_small_gap(a_mid, b_mid, mid_a_off, mid_b_off, ops);
    } else if !has_recursed {
        align_on_unique_anchors(a_mid, b_mid, mid_a_off, mid_b_off, ops);
    } else {
        tracing::debug!("Diff gap of {}x{} units too large for LCS; emitting as replacement", a_mid.len(), b_mid.len());
        ops.extend((0..a_mid.len()).map(|k| DiffOp::Delete { old: mid_a_off + k }));
        ops.extend((0..b_mid.len()).map(|k| DiffOp::Insert { new: mid_b_off + k }));
    }

    let (a_tail, b_tail) = (a_off + a.len() - suffix, b_off + b.len() - suffix);
    ops.extend((0..suffix).map(|k| DiffOp::Equal { old: a_tail + k, new: b_tail + k }));
}

/// Exact LCS over a gap small enough for the full table.
fn align_small_gap<T: PartialEq>(a: &[T], b: &[T], a_off: usize, b_off: usize, ops: &mut Vec<DiffOp>) {
    let (n, m) = (a.len(), b.len());
    // lcs[i][j] = length of the LCS of a[i..] and b[j..]
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == b[j] { lcs[i + 1][j + 1] + 1 } else { lcs[i + 1][j].max(lcs[i][j + 1]) };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && a[i] == b[j] {
            ops.push(DiffOp::Equal { old: a_off + i, new: b_off + j });
            i += 1;
            j += 1;
        } else if j >= m || (i < n && lcs[i + 1][j] >= lcs[i][j + 1]) {
            ops.push(DiffOp::Delete { old: a_off + i });
            i += 1;
        } else {
            ops.push(DiffOp::Insert { new: b_off + j });
            j += 1;
        }
    }
}

/// Splits a large gap on elements unique to both sides and aligns the pieces.
fn align_on_unique_anchors<T: Eq + Hash>(a: &[T], b: &[T], a_off: usize, b_off: usize, ops: &mut Vec<DiffOp>) {
    let anchors = unique_anchors(a, b);
    tracing::debug!("Splitting {}x{} diff gap on {} unique anchors", a.len(), b.len(), anchors.len());

    let (mut i, mut j) = (0, 0);
    for (ai, bj) in anchors {
        align(&a[i..ai], &b[j..bj], a_off + i, b_off + j, true, ops);
        ops.push(DiffOp::Equal { old: a_off + ai, new: b_off + bj });
        i = ai + 1;
        j = bj + 1;
    }
    align(&a[i..], &b[j..], a_off + i, b_off + j, true, ops);
}

/// `(index in a, index in b)` of elements occurring exactly once on each side,
/// reduced to the longest run that is increasing on both sides.
fn unique_anchors<T: Eq + Hash>(a: &[T], b: &[T]) -> Vec<(usize, usize)> {
    // element -> (count in a, index in a, count in b, index in b)
    let mut seen: HashMap<&T, (usize, usize, usize, usize)> = HashMap::new();
    for (i, item) in a.iter().enumerate() {
        let entry = seen.entry(item).or_insert((0, i, 0, 0));
        entry.0 += 1;
    }
    for (j, item) in b.iter().enumerate() {
        if let Some(entry) = seen.get_mut(item) {
            entry.2 += 1;
            entry.3 = j;
        }
    }

    let mut pairs: Vec<(usize, usize)> = seen
        .into_values()
        .filter(|&(count_a, _, count_b, _)| count_a == 1 && count_b == 1)
        .map(|(_, i, _, j)| (i, j))
        .collect();
    pairs.sort_unstable();
    longest_increasing_by_new(&pairs)
}

/// Longest subsequence of `pairs` (sorted by old index) whose new index increases.
fn longest_increasing_by_new(pairs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    // tails[k] = index into pairs of the smallest tail of an increasing run of length k + 1
    let mut tails: Vec<usize> = Vec::new();
    let mut prev: Vec<Option<usize>> = vec![None; pairs.len()];
    for (idx, &(_, j)) in pairs.iter().enumerate() {
        let pos = tails.partition_point(|&t| pairs[t].1 < j);
        prev[idx] = pos.checked_sub(1).map(|p| tails[p]);
        if pos == tails.len() {
            tails.push(idx);
        } else {
            tails[pos] = idx;
        }
    }

    let mut run = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(idx) = cursor {
        run.push(pairs[idx]);
        cursor = prev[idx];
    }
    run.reverse();
    run
}

/// Reorders every run of deletes and inserts into `-a1 +b1 -a2 +b2 ...`.
fn interleave(raw: Vec<DiffOp>) -> Vec<DiffOp> {
    let mut ops = Vec::with_capacity(raw.len());
    let mut deletes: Vec<usize> = Vec::new();
    let mut inserts: Vec<usize> = Vec::new();

    let flush = |ops: &mut Vec<DiffOp>, deletes: &mut Vec<usize>, inserts: &mut Vec<usize>| {
        let pairs = deletes.len().max(inserts.len());
        for n in 0..pairs {
            if let Some(&old) = deletes.get(n) {
                ops.push(DiffOp::Delete { old });
            }
            if let Some(&new) = inserts.get(n) {
                ops.push(DiffOp::Insert { new });
            }
        }
        deletes.clear();
        inserts.clear();
    };

    for op in raw {
        match op {
            DiffOp::Delete { old } => deletes.push(old),
            DiffOp::Insert { new } => inserts.push(new),
            equal @ DiffOp::Equal { .. } => {
                flush(&mut ops, &mut deletes, &mut inserts);
                ops.push(equal);
            }
        }
    }
    flush(&mut ops, &mut deletes, &mut inserts);
    ops
}
