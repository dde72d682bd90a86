//! Fuzzy rematching of unmatched rows by key similarity

use super::{sort_changes, CellComparator, DiffResult, RowChange};

/// Ratcliff/Obershelp similarity of two strings in `[0.0, 1.0]`.
///
/// Identical strings score 1.0; otherwise an empty side scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    chars_similarity(&a, &b)
}

fn chars_similarity(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return if total == 0 { 1.0 } else { 0.0 };
    }
    2.0 * matching_chars(a, b) as f64 / total as f64
}

/// Total length of the matching blocks found by recursive longest-match
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_match(a, b);
    if k == 0 {
        return 0;
    }
    k + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + k..], &b[j + k..])
}

/// Longest common block as `(start_a, start_b, len)`, earliest in `a` then `b`
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            let k = cur[j + 1];
            if k > best.2 {
                best = (i + 1 - k, j + 1 - k, k);
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

/// Pair removed rows with added rows whose keys are at least `threshold`
/// similar, turning each pair into one changed row keyed `"<old> -> <new>"`.
///
/// Removed rows are visited in order; each takes the unconsumed added row with
/// the strictly highest score (first one wins on ties). The exact result is
/// consumed and a new result returned.
pub fn rematch(exact: DiffResult, comparator: &CellComparator, threshold: f64) -> DiffResult {
    if exact.added.is_empty() || exact.removed.is_empty() {
        return exact;
    }

    let DiffResult {
        left_name,
        right_name,
        keys,
        compared_columns,
        added,
        removed,
        mut changed,
        duplicate_keys_left,
        duplicate_keys_right,
        stats,
    } = exact;

    let right_labels: Vec<Vec<char>> = added.iter().map(|r| r.key.chars().collect()).collect();
    let mut candidates: Vec<Option<RowChange>> = added.into_iter().map(Some).collect();
    let mut unmatched_left = Vec::new();
    let mut matched = Vec::new();

    for left in removed {
        let left_label: Vec<char> = left.key.chars().collect();
        let mut best: Option<(usize, f64)> = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            if candidate.is_none() {
                continue;
            }
            let score = chars_similarity(&left_label, &right_labels[idx]);
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((idx, score));
            }
        }

        let pairing = best
            .filter(|(_, score)| *score >= threshold)
            .and_then(|(idx, _)| {
                let right = candidates[idx].as_ref()?;
                pair(&left, right, comparator, &compared_columns).map(|change| (idx, change))
            });

        match pairing {
            Some((idx, change)) => {
                log::debug!("fuzzy match: {}", change.key);
                candidates[idx] = None;
                matched.push(change);
            }
            None => unmatched_left.push(left),
        }
    }

    log::debug!("fuzzy pass: {} pair(s) rematched", matched.len());

    changed.extend(matched);
    sort_changes(&mut changed);

    let mut result = DiffResult {
        left_name,
        right_name,
        keys,
        compared_columns,
        added: candidates.into_iter().flatten().collect(),
        removed: unmatched_left,
        changed,
        duplicate_keys_left,
        duplicate_keys_right,
        stats,
    };
    result.restat();
    result
}

/// Changed row for a removed/added pair, or `None` if either side lacks its row
fn pair(
    left: &RowChange,
    right: &RowChange,
    comparator: &CellComparator,
    columns: &[String],
) -> Option<RowChange> {
    let old_key = left.old_key.as_ref()?;
    let old_row = left.old_row.as_ref()?;
    let new_key = right.new_key.as_ref()?;
    let new_row = right.new_row.as_ref()?;

    Some(RowChange::changed(
        format!("{} -> {}", left.key, right.key),
        old_key,
        new_key,
        old_row,
        new_row,
        comparator.compare_rows(old_row, new_row, columns),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffOptions;
    use crate::diff::{compute_diff, DiffEngine};
    use crate::model::{Row, Table};

    fn table(name: &str, rows: &[(&str, &str)]) -> Table {
        let rows = rows
            .iter()
            .map(|(id, total)| Row::from_pairs([("id", *id), ("total", *total)]))
            .collect();
        Table::new(name, &["id", "total"], rows).unwrap()
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("abcd", "bcde"), 0.75);
        assert!((similarity("kitten", "sitting") - 8.0 / 13.0).abs() < 1e-12);
        assert!((similarity("custmer-1", "customer-1") - 18.0 / 19.0).abs() < 1e-12);
    }

    #[test]
    fn test_similarity_is_symmetric_on_simple_inputs() {
        for (a, b) in [("abcd", "bcde"), ("custmer-1", "customer-1"), ("a-1", "a-2")] {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn test_rematch_renamed_key() {
        let left = table("a", &[("custmer-1", "10"), ("keep", "1")]);
        let right = table("b", &[("customer-1", "12"), ("keep", "1")]);

        let options = DiffOptions::new(["id"]).with_fuzzy(true);
        let diff = compute_diff(&left, &right, &options).unwrap();

        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.changed.len(), 1);
        let change = &diff.changed[0];
        assert_eq!(change.key, "custmer-1 -> customer-1");
        assert_eq!(change.changes.len(), 1);
        assert_eq!(change.changes[0].column, "total");
        assert_eq!(diff.stats.rows_changed, 1);
        assert_eq!(diff.stats.rows_added, 0);
        assert_eq!(diff.stats.rows_unchanged, 1);
    }

    #[test]
    fn test_rematch_without_cell_changes_still_changed() {
        let left = table("a", &[("custmer-1", "10")]);
        let right = table("b", &[("customer-1", "10")]);

        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"]).with_fuzzy(true)).unwrap();
        assert_eq!(diff.changed.len(), 1);
        assert!(diff.changed[0].changes.is_empty());
    }

    #[test]
    fn test_below_threshold_stays_unmatched() {
        let left = table("a", &[("alpha", "1")]);
        let right = table("b", &[("omega", "1")]);

        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"]).with_fuzzy(true)).unwrap();
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.added.len(), 1);
        assert!(diff.changed.is_empty());
    }

    #[test]
    fn test_each_candidate_consumed_once() {
        // Both removed keys are closest to "item-10"; the first claims it.
        let left = table("a", &[("item-1", "1"), ("item-100", "1")]);
        let right = table("b", &[("item-10", "1")]);

        let options = DiffOptions::new(["id"])
            .with_fuzzy(true)
            .with_fuzzy_threshold(0.8);
        let diff = compute_diff(&left, &right, &options).unwrap();
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].key, "item-1 -> item-10");
        assert_eq!(diff.removed.len(), 1);
        assert_eq!(diff.removed[0].key, "item-100");
        assert!(diff.added.is_empty());
    }

    #[test]
    fn test_ties_pick_first_candidate() {
        let left = table("a", &[("ab", "1")]);
        let right = table("b", &[("ac", "1"), ("ad", "1")]);

        let options = DiffOptions::new(["id"])
            .with_fuzzy(true)
            .with_fuzzy_threshold(0.5);
        let diff = compute_diff(&left, &right, &options).unwrap();
        assert_eq!(diff.changed[0].key, "ab -> ac");
        assert_eq!(diff.added[0].key, "ad");
    }

    #[test]
    fn test_fuzzy_rows_interleave_with_exact_changes() {
        let left = table("a", &[("b", "1"), ("custmer-1", "1"), ("z", "1")]);
        let right = table("b", &[("b", "2"), ("customer-1", "1"), ("z", "2")]);

        let diff = compute_diff(&left, &right, &DiffOptions::new(["id"]).with_fuzzy(true)).unwrap();
        let keys: Vec<_> = diff.changed.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "custmer-1 -> customer-1", "z"]);
    }

    #[test]
    fn test_exact_result_is_left_untouched() {
        let left = table("a", &[("custmer-1", "10")]);
        let right = table("b", &[("customer-1", "10")]);

        let engine = DiffEngine::new(DiffOptions::new(["id"]));
        let exact = engine.diff_exact(&left, &right).unwrap();
        let snapshot = exact.clone();
        let fuzzy = rematch(exact.clone(), &CellComparator::new(0.0), 0.92);

        assert_eq!(exact, snapshot);
        assert_eq!(exact.removed.len(), 1);
        assert_eq!(fuzzy.changed.len(), 1);
    }
}
