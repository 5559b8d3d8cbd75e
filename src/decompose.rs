//! Splits flat example strings into aligned tuples of fields so each field
//! can be synthesized against its own, smaller DSL.
//!
//! Implements the fixed-point column-splitting algorithm from spec.md §4.C:
//! repeatedly find a maximal common substring shared by every example in a
//! column and, if it recurs the same number of times in every example of
//! that column, split the column on its first occurrence into
//! `(prefix, match, suffix)`. Iterate until no column splits.

use std::collections::BTreeSet;

/// One `(column_index, substring)` split applied while decomposing the
/// valid examples. Replayed verbatim against each invalid example so both
/// sides end up aligned to the same field layout (spec.md §4.C step 5).
#[derive(Debug, Clone)]
struct SplitStep {
    column_index: usize,
    cs: String,
}

/// The result of decomposing a labeled example set.
#[derive(Debug, Clone)]
pub struct DecomposedExamples {
    /// Field count shared by every retained valid and invalid example.
    pub field_count: usize,
    pub valid: Vec<Vec<String>>,
    pub invalid: Vec<Vec<String>>,
    /// Characters observed in valid examples at each field.
    pub alphabets: Vec<BTreeSet<char>>,
    /// Longest valid-example field value at each field, used to bound
    /// `{n}` literals in the per-field DSL.
    pub max_len: Vec<usize>,
}

/// Count the maximal, non-overlapping runs of consecutive repeats of `cs`
/// in `s` — i.e. how many times the regex `(?:cs)+` would match `s` under
/// `find_iter`.
fn count_runs(cs: &str, s: &str) -> usize {
    if cs.is_empty() {
        return 0;
    }
    let mut count = 0;
    let mut i = 0;
    while let Some(off) = s[i..].find(cs) {
        let start = i + off;
        let mut j = start;
        while s[j..].starts_with(cs) {
            j += cs.len();
        }
        count += 1;
        i = j;
    }
    count
}

/// Split `s` on the first occurrence of `cs`, extending the match forward
/// across any immediately-repeated copies (so it is the first match of
/// `(?:cs)+`, not just of `cs` itself).
fn first_run(cs: &str, s: &str) -> Option<(String, String, String)> {
    let off = s.find(cs)?;
    let mut j = off;
    while s[j..].starts_with(cs) {
        j += cs.len();
    }
    Some((s[..off].to_string(), s[off..j].to_string(), s[j..].to_string()))
}

/// All substrings of `rows[0]` that occur in every row, keeping only the
/// maximal ones: a candidate is dropped if it is a literal substring of
/// another retained candidate with an identical per-row run count (spec.md
/// §4.C step 2).
fn common_substrings(rows: &[String]) -> Vec<String> {
    let shortest = match rows.iter().min_by_key(|r| r.len()) {
        Some(r) if !r.is_empty() => r.clone(),
        _ => return Vec::new(),
    };

    let mut candidates: BTreeSet<String> = BTreeSet::new();
    let chars: Vec<char> = shortest.chars().collect();
    for start in 0..chars.len() {
        for end in (start + 1)..=chars.len() {
            let cand: String = chars[start..end].iter().collect();
            if rows.iter().all(|r| r.contains(&cand)) {
                candidates.insert(cand);
            }
        }
    }

    let mut sorted: Vec<String> = candidates.into_iter().collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut accepted: Vec<String> = Vec::new();
    'outer: for cand in sorted {
        for acc in &accepted {
            if acc.contains(&cand) {
                let same_counts = rows
                    .iter()
                    .all(|r| count_runs(acc, r) == count_runs(&cand, r));
                if same_counts {
                    continue 'outer;
                }
            }
        }
        accepted.push(cand);
    }
    accepted
}

/// Try to split one column. Returns `true` and mutates `columns`/`steps` if
/// a qualifying common substring was found anywhere in `columns`.
fn split_once(columns: &mut Vec<Vec<String>>, steps: &mut Vec<SplitStep>) -> bool {
    for col_idx in 0..columns.len() {
        let rows = &columns[col_idx];
        if rows.iter().any(|r| r.is_empty()) {
            continue;
        }
        for cs in common_substrings(rows) {
            let counts: Vec<usize> = rows.iter().map(|r| count_runs(&cs, r)).collect();
            if counts[0] == 0 || !counts.iter().all(|&c| c == counts[0]) {
                continue;
            }
            let splits: Vec<(String, String, String)> = rows
                .iter()
                .map(|r| first_run(&cs, r).expect("cs occurs in every row"))
                .collect();
            // A split that consumes every row whole (empty prefix and
            // suffix everywhere) learns no new boundary and would recur
            // forever; skip it so the fixed point actually terminates.
            if splits.iter().all(|(p, _, s)| p.is_empty() && s.is_empty()) {
                continue;
            }
            let (prefixes, matched, suffixes) = splits.into_iter().fold(
                (Vec::new(), Vec::new(), Vec::new()),
                |(mut ps, mut ms, mut ss), (p, m, s)| {
                    ps.push(p);
                    ms.push(m);
                    ss.push(s);
                    (ps, ms, ss)
                },
            );
            columns.splice(col_idx..=col_idx, [prefixes, matched, suffixes]);
            steps.push(SplitStep {
                column_index: col_idx,
                cs,
            });
            return true;
        }
    }
    false
}

/// Decompose the valid examples to a fixed point, returning the final
/// field tuples and the ordered splits applied.
fn decompose_valid(valid: &[String]) -> (Vec<Vec<String>>, Vec<SplitStep>) {
    // `columns[f][e]` is the value of field `f` for example `e`; start as
    // a single column holding the whole strings.
    let mut columns: Vec<Vec<String>> = vec![valid.to_vec()];
    let mut steps = Vec::new();
    while split_once(&mut columns, &mut steps) {}
    (transpose(&columns), steps)
}

/// Replay the splits discovered on the valid examples against one invalid
/// example. Returns `None` if `original` cannot be aligned to the same
/// field layout (an invalid example that doesn't share the discovered
/// structure is redundant: the valid examples already forbid it).
fn replay(original: &str, steps: &[SplitStep]) -> Option<Vec<String>> {
    let mut fields = vec![original.to_string()];
    for step in steps {
        let field = fields.get(step.column_index)?;
        let (p, m, s) = first_run(&step.cs, field)?;
        fields.splice(step.column_index..=step.column_index, [p, m, s]);
    }
    Some(fields)
}

fn transpose(columns: &[Vec<String>]) -> Vec<Vec<String>> {
    if columns.is_empty() {
        return Vec::new();
    }
    let n = columns[0].len();
    (0..n)
        .map(|row| columns.iter().map(|c| c[row].clone()).collect())
        .collect()
}

/// Decompose a labeled example set, per spec.md §4.C.
pub fn decompose(valid: &[String], invalid: &[String]) -> DecomposedExamples {
    let (mut valid_tuples, steps) = decompose_valid(valid);
    let field_count_before_drop = valid_tuples.first().map(|t| t.len()).unwrap_or(0);

    let mut invalid_tuples: Vec<Vec<String>> = invalid
        .iter()
        .filter_map(|s| replay(s, &steps))
        .filter(|t| t.len() == field_count_before_drop)
        .collect();

    // Drop columns that are uniformly empty across every valid example.
    if !valid_tuples.is_empty() {
        let f = valid_tuples[0].len();
        let drop: Vec<bool> = (0..f)
            .map(|col| valid_tuples.iter().all(|t| t[col].is_empty()))
            .collect();
        if drop.iter().any(|&d| d) {
            for t in valid_tuples.iter_mut() {
                let mut i = 0;
                t.retain(|_| {
                    let keep = !drop[i];
                    i += 1;
                    keep
                });
            }
            for t in invalid_tuples.iter_mut() {
                let mut i = 0;
                t.retain(|_| {
                    let keep = !drop[i];
                    i += 1;
                    keep
                });
            }
        }
    }

    let field_count = valid_tuples.first().map(|t| t.len()).unwrap_or(0);

    let mut alphabets = vec![BTreeSet::new(); field_count];
    let mut max_len = vec![0usize; field_count];
    for tuple in &valid_tuples {
        for (f, value) in tuple.iter().enumerate() {
            alphabets[f].extend(value.chars());
            max_len[f] = max_len[f].max(value.chars().count());
        }
    }

    DecomposedExamples {
        field_count,
        valid: valid_tuples,
        invalid: invalid_tuples,
        alphabets,
        max_len,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn phone_like_examples_split_into_four_fields() {
        let valid = strs(&["(123) 456", "(999) 000"]);
        let invalid = strs(&["123 456", "(abc) def"]);
        let d = decompose(&valid, &invalid);
        assert_eq!(d.field_count, 4);
        assert_eq!(d.valid[0], vec!["(", "123", ") ", "456"]);
        assert_eq!(d.valid[1], vec!["(", "999", ") ", "000"]);
        // "123 456" has no leading '(' to align against -> discarded.
        // "(abc) def" aligns (letters still fill the numeric field slot).
        assert_eq!(d.invalid.len(), 1);
    }

    #[test]
    fn concatenation_is_preserved() {
        let valid = strs(&["(123) 456", "(999) 000"]);
        let d = decompose(&valid, &[]);
        for (i, tuple) in d.valid.iter().enumerate() {
            assert_eq!(tuple.concat(), valid[i]);
        }
    }

    #[test]
    fn decomposition_is_a_fixed_point() {
        let valid = strs(&["ab12", "ab99"]);
        let once = decompose(&valid, &[]);
        let twice = decompose(&once.valid.iter().map(|t| t.concat()).collect::<Vec<_>>(), &[]);
        assert_eq!(once.field_count, twice.field_count);
    }

    #[test]
    fn no_common_structure_keeps_a_single_field() {
        let valid = strs(&["cat", "dog", "eel"]);
        let d = decompose(&valid, &[]);
        assert_eq!(d.field_count, 1);
    }

    #[test]
    fn alphabet_is_the_union_of_valid_field_characters() {
        let valid = strs(&["ab12", "ab99"]);
        let d = decompose(&valid, &[]);
        let digit_field = d
            .alphabets
            .iter()
            .position(|a| a.contains(&'1') || a.contains(&'9'))
            .unwrap();
        assert!(d.alphabets[digit_field].is_superset(&BTreeSet::from(['1', '2', '9'])));
    }
}
