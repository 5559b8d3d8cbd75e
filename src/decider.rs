//! Checks one enumerated candidate against the known examples and, on
//! failure, derives the predicates fed back into the enumerator.

use crate::ast::Node;
use crate::enumerator::BlockingPredicate;
use crate::error::InterpreterError;
use crate::interpreter::{pretty_print, Interpreter};

/// Outcome of checking a candidate against every known example.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// The candidate matched every valid example and none of the invalid
    /// ones.
    Accepted,
    /// The candidate was rejected; `predicates` are fed to
    /// [`crate::enumerator::Enumerator::update`] so the same flaw is not
    /// re-proposed.
    Rejected(Vec<BlockingPredicate>),
}

/// Checks candidates against a growing pair of labeled example sets. Holds
/// no reference to an [`Interpreter`]: callers pass one into `analyze`,
/// which keeps a `Decider` freely storable alongside the rest of a
/// synthesis session instead of borrowing from it.
pub struct Decider {
    valid: Vec<String>,
    invalid: Vec<String>,
}

impl Decider {
    pub fn new(valid: Vec<String>, invalid: Vec<String>) -> Self {
        Self { valid, invalid }
    }

    /// Add one freshly-labeled counterexample (from the distinguisher /
    /// oracle round) to the appropriate set.
    pub fn add_example(&mut self, s: String, is_valid: bool) {
        if is_valid {
            self.valid.push(s);
        } else {
            self.invalid.push(s);
        }
    }

    pub fn valid_examples(&self) -> &[String] {
        &self.valid
    }

    pub fn invalid_examples(&self) -> &[String] {
        &self.invalid
    }

    /// Check `candidate` against every known example, in order: all valid
    /// examples must match, then no invalid example may match.
    pub fn analyze(&self, candidate: &Node, interpreter: &Interpreter) -> Verdict {
        let pattern = pretty_print(candidate);
        for s in &self.valid {
            match interpreter.full_match(&pattern, s) {
                Ok(true) => continue,
                Ok(false) => {
                    return Verdict::Rejected(vec![BlockingPredicate::BlockSubtree(
                        candidate.clone(),
                    )])
                }
                Err(e) => return Verdict::Rejected(predicates_from_error(candidate, &e)),
            }
        }
        for s in &self.invalid {
            match interpreter.full_match(&pattern, s) {
                Ok(false) => continue,
                Ok(true) => {
                    return Verdict::Rejected(vec![BlockingPredicate::BlockSubtree(
                        candidate.clone(),
                    )])
                }
                Err(e) => return Verdict::Rejected(predicates_from_error(candidate, &e)),
            }
        }
        Verdict::Accepted
    }
}

/// Translate an evaluation failure into structural predicates that rule
/// out every future candidate sharing the same flaw, rather than just this
/// one tree (spec.md §4.F).
fn predicates_from_error(candidate: &Node, error: &InterpreterError) -> Vec<BlockingPredicate> {
    match error {
        InterpreterError::InvalidRepetitionBound { requested, .. } => {
            vec![BlockingPredicate::BlockRange(
                *requested as i64,
                *requested as i64,
            )]
        }
        InterpreterError::InvalidPattern(_) | InterpreterError::EmptyCharacterClass => {
            // No structural cause to generalize from; at minimum, never
            // propose this exact tree again.
            vec![BlockingPredicate::BlockSubtree(candidate.clone())]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Production;

    fn leaf(p: Production) -> Node {
        Node::leaf(p).unwrap()
    }

    #[test]
    fn accepts_a_candidate_matching_every_example() {
        let interp = Interpreter::new();
        let decider = Decider::new(vec!["a".into(), "aa".into()], vec!["b".into()]);
        let a = leaf(Production::Char('a'));
        let plus = Node::new(Production::Posit, vec![a]).unwrap();
        assert!(matches!(decider.analyze(&plus, &interp), Verdict::Accepted));
    }

    #[test]
    fn rejects_a_candidate_missing_a_valid_example() {
        let interp = Interpreter::new();
        let decider = Decider::new(vec!["ab".into()], vec![]);
        let a = leaf(Production::Char('a'));
        assert!(matches!(decider.analyze(&a, &interp), Verdict::Rejected(_)));
    }

    #[test]
    fn rejects_a_candidate_matching_an_invalid_example() {
        let interp = Interpreter::new();
        let decider = Decider::new(vec!["a".into()], vec!["a".into()]);
        let a = leaf(Production::Char('a'));
        assert!(matches!(decider.analyze(&a, &interp), Verdict::Rejected(_)));
    }
}
