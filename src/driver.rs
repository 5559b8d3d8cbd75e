//! The counterexample-guided synthesis loop (spec.md §4.H): enumerate,
//! verify against known examples, and on a collision between two
//! otherwise-valid candidates, ask the oracle for a distinguishing input
//! and resume with a larger example set.

use crate::ast::Node;
use crate::decider::{Decider, Verdict};
use crate::decompose::decompose;
use crate::distinguish::Distinguisher;
use crate::dsl::Dsl;
use crate::enumerator::{BlockingPredicate, Enumerator, FunnyEnumerator, MultiTreeEnumerator};
use crate::interpreter::{pretty_print, Interpreter};
use crate::logger::Logger;
use crate::oracle::Oracle;
use std::collections::BTreeSet;
use std::io;
use std::time::{Duration, Instant};

/// Which enumerator `SynthesisDriver::build_enumerator` should pick, per
/// the `-m/--method` flag (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumeratorChoice {
    /// `FunnyEnumerator` for a single field, `MultiTreeEnumerator`
    /// otherwise — the default, field-count-driven choice.
    #[default]
    Auto,
    /// Always `FunnyEnumerator`, regardless of field count.
    Funny,
    /// Always `MultiTreeEnumerator`, regardless of field count.
    Ktree,
}

#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Stop trying to distinguish two candidates after this many
    /// consecutive rounds find no distinguishing input, and accept the
    /// older one as final.
    pub max_indistinguishable: usize,
    pub max_depth: usize,
    pub max_length: usize,
    pub enumerator_choice: EnumeratorChoice,
    /// Whether rejected candidates contribute blocking predicates that
    /// prune later search. `false` is the `nopruning` method (REDESIGN
    /// FLAGS §9): every candidate is still verified, just never skipped.
    pub pruning: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            max_indistinguishable: 3,
            max_depth: 6,
            max_length: 4,
            enumerator_choice: EnumeratorChoice::default(),
            pruning: true,
        }
    }
}

/// (depth, length) search budgets, smallest expected search space first.
/// `(2^depth - 1) * length` approximates the size of the pool a budget
/// produces, so ordering by it tries cheap searches before expensive ones.
fn depth_length_pairs(config: &SynthesisConfig) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for depth in 1..=config.max_depth {
        for length in 1..=config.max_length {
            pairs.push((depth, length));
        }
    }
    pairs.sort_by_key(|&(d, l)| ((1u64 << d) - 1) * l as u64);
    pairs
}

/// When two otherwise-valid candidates stay indistinguishable for
/// `max_indistinguishable` rounds, keep the shorter-printed one (spec.md
/// §4.H testable scenario 6), mirroring the original's
/// `min(self.programs, key=len(printer.eval(...)))`.
fn shorter_of(a: Node, b: Node) -> Node {
    if pretty_print(&a).chars().count() <= pretty_print(&b).chars().count() {
        a
    } else {
        b
    }
}

pub struct SynthesisReport {
    pub solution: Option<Node>,
    pub enumerator_name: &'static str,
    pub attempts: usize,
    pub nodes_explored: usize,
    pub interactions: usize,
    /// Wall-clock time spent synthesizing, excluding time blocked on
    /// `Oracle::ask` — a human answering a prompt shouldn't count against
    /// the synthesizer's own performance.
    pub elapsed: Duration,
}

impl SynthesisReport {
    /// Print the tagged summary lines the test harness parses back out of
    /// a synthesis process's stdout.
    pub fn log_summary(&self, logger: &Logger) {
        logger.info(format!("Enumerator: {}", self.enumerator_name));
        logger.info(format!("Enumerated: {}", self.attempts));
        logger.info(format!("Nodes: {}", self.nodes_explored));
        logger.info(format!("Interactions: {}", self.interactions));
        logger.info(format!("Elapsed time: {}", self.elapsed.as_secs_f64()));
        match &self.solution {
            Some(node) => logger.info(format!("  Solution: {}", pretty_print(node))),
            None => logger.info("  Solution: <none found>"),
        }
    }
}

pub struct SynthesisDriver {
    decider: Decider,
    interpreter: Interpreter,
    field_dsls: Vec<Dsl>,
    config: SynthesisConfig,
}

impl SynthesisDriver {
    /// Decompose `valid`/`invalid` examples into fields and build the
    /// per-field DSLs, ready to run.
    pub fn new(valid: &[String], invalid: &[String], config: SynthesisConfig) -> Self {
        let decomposed = decompose(valid, invalid);
        let field_dsls: Vec<Dsl> = decomposed
            .alphabets
            .iter()
            .zip(decomposed.max_len.iter())
            .map(|(alphabet, &max_len)| Dsl::for_field(alphabet, max_len))
            .collect();

        let valid_full: Vec<String> = decomposed.valid.iter().map(|t| t.concat()).collect();
        let invalid_full: Vec<String> = decomposed.invalid.iter().map(|t| t.concat()).collect();

        Self {
            decider: Decider::new(valid_full, invalid_full),
            interpreter: Interpreter::new(),
            field_dsls,
            config,
        }
    }

    fn combined_alphabet(&self) -> Vec<char> {
        let set: BTreeSet<char> = self
            .field_dsls
            .iter()
            .flat_map(|d| d.alphabet.iter().copied())
            .collect();
        set.into_iter().collect()
    }

    fn build_enumerator(&self, depth: usize, length: usize) -> (Box<dyn Enumerator>, &'static str) {
        let use_multitree = match self.config.enumerator_choice {
            EnumeratorChoice::Auto => self.field_dsls.len() > 1,
            EnumeratorChoice::Funny => false,
            EnumeratorChoice::Ktree => true,
        };
        if !use_multitree {
            let dsl = self.field_dsls.first().cloned().unwrap_or_else(|| {
                Dsl::for_field(&BTreeSet::new(), 1)
            });
            (
                Box::new(FunnyEnumerator::new(&dsl, depth, length)),
                "FunnyEnumerator",
            )
        } else {
            (
                Box::new(MultiTreeEnumerator::new(&self.field_dsls, depth)),
                "MultiTreeEnumerator",
            )
        }
    }

    /// Run the CEGIS loop to completion: either a solution consistent with
    /// every example (original and oracle-supplied) is found, or the
    /// search budget (`config.max_depth` / `config.max_length`) is
    /// exhausted.
    pub fn run(&mut self, oracle: &mut dyn Oracle) -> io::Result<SynthesisReport> {
        let started = Instant::now();
        let mut oracle_wait = Duration::ZERO;
        let mut attempts = 0usize;
        let mut nodes_explored = 0usize;
        let mut interactions = 0usize;
        let mut indistinguishable_count = 0usize;
        let mut blocked_sets: Vec<Vec<BlockingPredicate>> = Vec::new();
        let mut enumerator_name = "FunnyEnumerator";

        let max_length_bound = self
            .field_dsls
            .iter()
            .map(|d| d.max_number as usize)
            .max()
            .unwrap_or(1)
            + 2;

        for (depth, length) in depth_length_pairs(&self.config) {
            let (mut enumerator, name) = self.build_enumerator(depth, length);
            enumerator_name = name;
            if self.config.pruning {
                for set in &blocked_sets {
                    enumerator.update(Some(set.clone()));
                }
            }

            let mut kept: Option<Node> = None;

            while let Some(candidate) = enumerator.next() {
                attempts += 1;
                nodes_explored += candidate.size();

                match self.decider.analyze(&candidate, &self.interpreter) {
                    Verdict::Rejected(preds) => {
                        if self.config.pruning {
                            enumerator.update(Some(preds.clone()));
                            blocked_sets.push(preds);
                        }
                    }
                    Verdict::Accepted => {
                        let Some(prev) = kept.take() else {
                            kept = Some(candidate);
                            continue;
                        };
                        if prev == candidate {
                            kept = Some(prev);
                            continue;
                        }

                        let distinguisher = Distinguisher::new(
                            &self.interpreter,
                            self.combined_alphabet(),
                            max_length_bound,
                        );
                        match distinguisher.distinguish(&prev, &candidate) {
                            Some(s) => {
                                interactions += 1;
                                let before = Instant::now();
                                let is_valid = oracle.ask(&s)?;
                                oracle_wait += before.elapsed();

                                self.decider.add_example(s.clone(), is_valid);
                                let prev_consistent =
                                    self.interpreter.full_match(&pretty_print(&prev), &s)?
                                        == is_valid;
                                kept = Some(if prev_consistent { prev } else { candidate });
                                indistinguishable_count = 0;
                            }
                            None => {
                                indistinguishable_count += 1;
                                kept = Some(shorter_of(prev, candidate));
                                if indistinguishable_count >= self.config.max_indistinguishable {
                                    return Ok(SynthesisReport {
                                        solution: kept,
                                        enumerator_name,
                                        attempts,
                                        nodes_explored,
                                        interactions,
                                        elapsed: started.elapsed().saturating_sub(oracle_wait),
                                    });
                                }
                            }
                        }
                    }
                }
            }

            if let Some(solution) = kept {
                return Ok(SynthesisReport {
                    solution: Some(solution),
                    enumerator_name,
                    attempts,
                    nodes_explored,
                    interactions,
                    elapsed: started.elapsed().saturating_sub(oracle_wait),
                });
            }
        }

        Ok(SynthesisReport {
            solution: None,
            enumerator_name,
            attempts,
            nodes_explored,
            interactions,
            elapsed: started.elapsed().saturating_sub(oracle_wait),
        })
    }
}

// `full_match` returns `Result<bool, InterpreterError>`; the driver only
// ever calls it on already-accepted candidates (already proven to compile
// to a valid pattern), so surface a generic IO error on the
// near-impossible failure path rather than growing the report's error type.
impl From<crate::error::InterpreterError> for io::Error {
    fn from(e: crate::error::InterpreterError) -> Self {
        io::Error::new(io::ErrorKind::Other, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::GroundTruthOracle;

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn shorter_of_keeps_the_shorter_pretty_printed_candidate() {
        use crate::ast::Production;
        let short = Node::leaf(Production::Char('a')).unwrap();
        let long = Node::new(
            Production::Concat,
            vec![
                Node::leaf(Production::Char('a')).unwrap(),
                Node::leaf(Production::Char('b')).unwrap(),
            ],
        )
        .unwrap();
        assert_eq!(shorter_of(long.clone(), short.clone()), short);
        assert_eq!(shorter_of(short.clone(), long.clone()), short);
    }

    #[test]
    fn synthesizes_a_single_character_class() {
        let valid = strs(&["1", "2", "9"]);
        let invalid = strs(&["a", "b"]);
        let mut driver = SynthesisDriver::new(&valid, &invalid, SynthesisConfig::default());
        let mut oracle = GroundTruthOracle::new("\\d").unwrap();
        let report = driver.run(&mut oracle).unwrap();
        let solution = report.solution.expect("a solution should be found");
        let interp = Interpreter::new();
        let pattern = pretty_print(&solution);
        assert!(interp.full_match(&pattern, "5").unwrap());
        assert!(!interp.full_match(&pattern, "x").unwrap());
    }

    #[test]
    fn synthesizes_a_union_of_literals() {
        let valid = strs(&["cat", "car", "can"]);
        let invalid = strs(&["cap", "dog"]);
        let mut driver = SynthesisDriver::new(&valid, &invalid, SynthesisConfig::default());
        let mut oracle = GroundTruthOracle::new("ca(t|r|n)").unwrap();
        let report = driver.run(&mut oracle).unwrap();
        let solution = report.solution.expect("a solution should be found");
        let interp = Interpreter::new();
        let pattern = pretty_print(&solution);
        for v in &valid {
            assert!(interp.full_match(&pattern, v).unwrap());
        }
        for v in &invalid {
            assert!(!interp.full_match(&pattern, v).unwrap());
        }
    }
}
