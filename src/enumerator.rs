//! Enumerates typed ASTs of a given depth/length, honoring blocking
//! predicates from the decider.
//!
//! Both enumerator variants are a stateful, re-enterable iterator rather
//! than a generator/coroutine: each holds its full candidate pool (built
//! once, up front, for its fixed depth/length budget) plus an index and an
//! accumulated set of blocking-predicate conjunctions, and `next()` just
//! walks the index forward past anything currently blocked. This is the
//! re-architecture REDESIGN FLAGS §9 calls for in place of the
//! `update`/`next` coroutine pattern.

use crate::ast::{Node, Production};
use crate::dsl::Dsl;
use crate::interpreter::pretty_print;
use std::collections::HashSet;

/// A structural constraint the decider has determined rules out every
/// future candidate sharing the same flaw (spec.md §4.F).
#[derive(Debug, Clone, PartialEq)]
pub enum BlockingPredicate {
    /// This exact subtree (by structural equality) may not recur anywhere
    /// in a future candidate.
    BlockSubtree(Node),
    /// No `Number` literal may fall within `[lo, hi]`.
    BlockRange(i64, i64),
    /// The candidate's pretty-printed length may not be shorter than this.
    BlockMinLen(usize),
    /// The candidate's pretty-printed length may not be longer than this.
    BlockMaxLen(usize),
}

fn contains_subtree(node: &Node, target: &Node) -> bool {
    node == target || node.children.iter().any(|c| contains_subtree(c, target))
}

fn contains_number_in_range(node: &Node, lo: i64, hi: i64) -> bool {
    let here = matches!(node.production, Production::Number(n) if (n as i64) >= lo && (n as i64) <= hi);
    here || node.children.iter().any(|c| contains_number_in_range(c, lo, hi))
}

fn predicate_holds(node: &Node, predicate: &BlockingPredicate) -> bool {
    match predicate {
        BlockingPredicate::BlockSubtree(t) => contains_subtree(node, t),
        BlockingPredicate::BlockRange(lo, hi) => contains_number_in_range(node, *lo, *hi),
        BlockingPredicate::BlockMinLen(n) => pretty_print(node).chars().count() < *n,
        BlockingPredicate::BlockMaxLen(n) => pretty_print(node).chars().count() > *n,
    }
}

/// `node` is blocked iff some accumulated conjunction of predicates holds
/// for it in full — each `update` call contributes one conjunction (the
/// set of reasons behind a single rejection); the candidate is ruled out
/// if it still matches any one of those full reason-sets.
fn is_blocked(node: &Node, blocked_sets: &[Vec<BlockingPredicate>]) -> bool {
    blocked_sets
        .iter()
        .any(|set| set.iter().all(|p| predicate_holds(node, p)))
}

/// Shared `next`/`update` contract for both enumerator variants.
pub trait Enumerator {
    /// Yield a new well-typed candidate, or `None` once exhausted.
    fn next(&mut self) -> Option<Node>;
    /// Register blocking predicates derived from the most recent
    /// rejection (`None` means "no new constraint, just advance").
    fn update(&mut self, predicates: Option<Vec<BlockingPredicate>>);
    fn name(&self) -> &'static str;
}

/// Upper bound on how many candidates a single pool build will generate,
/// so a wide alphabet and a deep bound cannot exhaust memory before the
/// driver moves to the next depth (spec.md §5 resource discipline).
const CANDIDATE_BUDGET: usize = 6000;

fn terminals(dsl: &Dsl) -> Vec<Node> {
    let mut out: Vec<Node> = dsl
        .alphabet
        .iter()
        .map(|c| Node::leaf(Production::Char(*c)).expect("Char is a valid leaf"))
        .collect();
    if dsl.classes.dot {
        out.push(Node::leaf(Production::Dot).unwrap());
    }
    if dsl.classes.digit {
        out.push(Node::leaf(Production::Digit).unwrap());
    }
    if dsl.classes.word {
        out.push(Node::leaf(Production::Word).unwrap());
    }
    if dsl.classes.space {
        out.push(Node::leaf(Production::Space).unwrap());
    }
    out
}

fn unary_wrap(pool: &[Node]) -> Vec<Node> {
    let mut out = Vec::new();
    for n in pool {
        out.push(Node::new(Production::Kleene, vec![n.clone()]).unwrap());
        out.push(Node::new(Production::Option, vec![n.clone()]).unwrap());
        out.push(Node::new(Production::Posit, vec![n.clone()]).unwrap());
    }
    out
}

fn copies_wrap(pool: &[Node], max_number: u32) -> Vec<Node> {
    let mut out = Vec::new();
    for n in pool {
        for k in 1..=max_number {
            let lit = Node::leaf(Production::Number(k)).unwrap();
            out.push(Node::new(Production::Copies, vec![n.clone(), lit]).unwrap());
        }
    }
    out
}

/// Cartesian products of size `2..=length` over `pool`, used for `Concat`
/// (order matters, repeats allowed). Bounded by `budget`.
fn concat_combinations(pool: &[Node], length: usize, budget: &mut usize) -> Vec<Node> {
    let mut out = Vec::new();
    for k in 2..=length.max(2) {
        let mut indices = vec![0usize; k];
        'gen: loop {
            if *budget == 0 {
                break;
            }
            let children: Vec<Node> = indices.iter().map(|&i| pool[i].clone()).collect();
            out.push(Node::new(Production::Concat, children).unwrap());
            *budget -= 1;

            let mut pos = k;
            loop {
                if pos == 0 {
                    break 'gen;
                }
                pos -= 1;
                indices[pos] += 1;
                if indices[pos] < pool.len() {
                    break;
                }
                indices[pos] = 0;
            }
        }
        if pool.is_empty() {
            break;
        }
    }
    out
}

/// Combinations (order-independent, no repeats) of size `2..=length` over
/// `pool`, used for `Union`. Bounded by `budget`.
fn union_combinations(pool: &[Node], length: usize, budget: &mut usize) -> Vec<Node> {
    let mut out = Vec::new();
    let n = pool.len();
    'sizes: for k in 2..=length.max(2).min(n.max(2)) {
        if k > n {
            break;
        }
        let mut combo: Vec<usize> = (0..k).collect();
        loop {
            if *budget == 0 {
                break 'sizes;
            }
            let children: Vec<Node> = combo.iter().map(|&i| pool[i].clone()).collect();
            out.push(Node::new(Production::Union, children).unwrap());
            *budget -= 1;

            // next combination in lexicographic order; exhausting this k
            // moves on to k + 1 rather than stopping altogether.
            let mut i = k;
            let mut exhausted = false;
            loop {
                if i == 0 {
                    exhausted = true;
                    break;
                }
                i -= 1;
                if combo[i] < n - (k - i) {
                    combo[i] += 1;
                    for j in (i + 1)..k {
                        combo[j] = combo[j - 1] + 1;
                    }
                    break;
                }
            }
            if exhausted {
                continue 'sizes;
            }
        }
    }
    out
}

/// Build the full candidate pool for one field up to `depth` levels of
/// nesting and `length` alternatives/concatenands, deduplicated and sorted
/// by node count (smallest first) with a deterministic tie-break on the
/// pretty-printed form, satisfying the "smaller trees first, no
/// duplicates" enumeration order (spec.md §4.E, §8 invariant 8).
pub fn build_field_pool(dsl: &Dsl, depth: usize, length: usize) -> Vec<Node> {
    let mut seen: HashSet<Node> = HashSet::new();
    let mut layer = terminals(dsl);
    let mut all: Vec<Node> = Vec::new();
    let mut budget = CANDIDATE_BUDGET;

    for d in 1..=depth.max(1) {
        for n in &layer {
            if seen.insert(n.clone()) {
                all.push(n.clone());
            }
        }
        if d == depth {
            break;
        }
        let mut next_layer = unary_wrap(&layer);
        next_layer.extend(copies_wrap(&layer, dsl.max_number));
        next_layer.extend(concat_combinations(&layer, length, &mut budget));
        next_layer.extend(union_combinations(&layer, length, &mut budget));
        next_layer.retain(|n| !seen.contains(n));
        if next_layer.is_empty() || budget == 0 {
            layer = next_layer;
            break;
        }
        layer = next_layer;
    }
    for n in &layer {
        if seen.insert(n.clone()) {
            all.push(n.clone());
        }
    }

    all.sort_by(|a, b| a.size().cmp(&b.size()).then_with(|| pretty_print(a).cmp(&pretty_print(b))));
    all
}

/// Enumerates single `Regex`-typed trees over one field's DSL, used when
/// the decomposer found exactly one field (spec.md §4.E).
pub struct FunnyEnumerator {
    pool: Vec<Node>,
    index: usize,
    blocked_sets: Vec<Vec<BlockingPredicate>>,
    pub depth: usize,
    pub length: usize,
}

impl FunnyEnumerator {
    pub fn new(dsl: &Dsl, depth: usize, length: usize) -> Self {
        Self {
            pool: build_field_pool(dsl, depth, length),
            index: 0,
            blocked_sets: Vec::new(),
            depth,
            length,
        }
    }
}

impl Enumerator for FunnyEnumerator {
    fn next(&mut self) -> Option<Node> {
        while self.index < self.pool.len() {
            let candidate = self.pool[self.index].clone();
            self.index += 1;
            if !is_blocked(&candidate, &self.blocked_sets) {
                return Some(candidate);
            }
        }
        None
    }

    fn update(&mut self, predicates: Option<Vec<BlockingPredicate>>) {
        if let Some(preds) = predicates {
            if !preds.is_empty() {
                self.blocked_sets.push(preds);
            }
        }
    }

    fn name(&self) -> &'static str {
        "FunnyEnumerator"
    }
}

/// Enumerates tuples of trees, one per field, composed under a fixed outer
/// `concat`, used when the decomposer found more than one field (spec.md
/// §4.E). A single global `depth` bounds every field's sub-pool.
pub struct MultiTreeEnumerator {
    combos: Vec<Node>,
    index: usize,
    blocked_sets: Vec<Vec<BlockingPredicate>>,
    pub depth: usize,
}

/// Per-field pool depth/length used inside a multi-field candidate; kept
/// modest since the outer product multiplies across all fields.
const FIELD_LENGTH: usize = 3;

impl MultiTreeEnumerator {
    pub fn new(field_dsls: &[Dsl], depth: usize) -> Self {
        let per_field_pools: Vec<Vec<Node>> = field_dsls
            .iter()
            .map(|dsl| build_field_pool(dsl, depth, FIELD_LENGTH))
            .collect();

        let mut combos = Vec::new();
        let mut budget = CANDIDATE_BUDGET;
        cartesian_concat(&per_field_pools, &mut Vec::new(), &mut combos, &mut budget);
        combos.sort_by(|a, b| a.size().cmp(&b.size()).then_with(|| pretty_print(a).cmp(&pretty_print(b))));

        Self {
            combos,
            index: 0,
            blocked_sets: Vec::new(),
            depth,
        }
    }
}

fn cartesian_concat(
    pools: &[Vec<Node>],
    chosen: &mut Vec<Node>,
    out: &mut Vec<Node>,
    budget: &mut usize,
) {
    if *budget == 0 {
        return;
    }
    if pools.is_empty() {
        if chosen.len() >= 2 {
            out.push(Node::new(Production::Concat, chosen.clone()).unwrap());
            *budget -= 1;
        } else if let Some(only) = chosen.first() {
            out.push(only.clone());
            *budget -= 1;
        }
        return;
    }
    for n in &pools[0] {
        chosen.push(n.clone());
        cartesian_concat(&pools[1..], chosen, out, budget);
        chosen.pop();
        if *budget == 0 {
            return;
        }
    }
}

impl Enumerator for MultiTreeEnumerator {
    fn next(&mut self) -> Option<Node> {
        while self.index < self.combos.len() {
            let candidate = self.combos[self.index].clone();
            self.index += 1;
            if !is_blocked(&candidate, &self.blocked_sets) {
                return Some(candidate);
            }
        }
        None
    }

    fn update(&mut self, predicates: Option<Vec<BlockingPredicate>>) {
        if let Some(preds) = predicates {
            if !preds.is_empty() {
                self.blocked_sets.push(preds);
            }
        }
    }

    fn name(&self) -> &'static str {
        "MultiTreeEnumerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn digit_dsl() -> Dsl {
        let alphabet: BTreeSet<char> = "0123456789".chars().collect();
        Dsl::for_field(&alphabet, 3)
    }

    #[test]
    fn pool_has_no_structural_duplicates() {
        let dsl = digit_dsl();
        let pool = build_field_pool(&dsl, 2, 3);
        let mut seen = HashSet::new();
        for n in &pool {
            assert!(seen.insert(n.clone()), "duplicate candidate emitted");
        }
    }

    #[test]
    fn pool_is_sorted_by_size() {
        let dsl = digit_dsl();
        let pool = build_field_pool(&dsl, 2, 3);
        for w in pool.windows(2) {
            assert!(w[0].size() <= w[1].size());
        }
    }

    #[test]
    fn block_subtree_removes_exact_matches() {
        let dsl = digit_dsl();
        let mut e = FunnyEnumerator::new(&dsl, 1, 2);
        let first = e.next().unwrap();
        e.update(Some(vec![BlockingPredicate::BlockSubtree(first.clone())]));
        let mut rest = Vec::new();
        let mut cur = e.next();
        while let Some(n) = cur {
            rest.push(n);
            cur = e.next();
        }
        assert!(!rest.contains(&first));
    }

    #[test]
    fn funny_enumerator_exhausts() {
        let dsl = digit_dsl();
        let mut e = FunnyEnumerator::new(&dsl, 1, 2);
        let mut count = 0;
        while e.next().is_some() {
            count += 1;
        }
        assert_eq!(count, 10); // 10 digit chars, depth 1 = terminals only
    }

    #[test]
    fn multi_tree_enumerator_combines_fields() {
        let dsl_a = Dsl::for_field(&BTreeSet::from(['a']), 1);
        let dsl_b = Dsl::for_field(&BTreeSet::from(['b']), 1);
        let mut e = MultiTreeEnumerator::new(&[dsl_a, dsl_b], 1);
        let candidate = e.next().unwrap();
        assert_eq!(candidate.production, Production::Concat);
        assert_eq!(candidate.children.len(), 2);
    }
}
