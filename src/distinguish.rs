//! Finds a string that two matching-but-different candidates disagree on.
//!
//! Implements spec.md §4.G's distinguisher as bounded enumeration over the
//! shared alphabet rather than symbolic reasoning: short strings are cheap
//! to build and the interpreter is cheap to call, so brute-forcing the
//! search space up to a modest length bound is the direct approach — no
//! need for an SMT-style word-equation solver here.

use crate::ast::Node;
use crate::interpreter::{pretty_print, Interpreter};

/// Cap on how many candidate strings a single `distinguish` call will try,
/// so a wide alphabet and a generous length bound cannot run away.
const SAMPLE_BUDGET: usize = 20_000;

pub struct Distinguisher<'a> {
    interpreter: &'a Interpreter,
    alphabet: Vec<char>,
    max_length: usize,
}

impl<'a> Distinguisher<'a> {
    pub fn new(interpreter: &'a Interpreter, alphabet: Vec<char>, max_length: usize) -> Self {
        Self {
            interpreter,
            alphabet,
            max_length,
        }
    }

    /// Search strings of length `0..=max_length` over the alphabet, shortest
    /// first, for one on which `a` and `b` disagree. `None` means no such
    /// string was found within the bound — the driver treats the two
    /// candidates as indistinguishable for now.
    pub fn distinguish(&self, a: &Node, b: &Node) -> Option<String> {
        let pa = pretty_print(a);
        let pb = pretty_print(b);
        let mut budget = SAMPLE_BUDGET;

        for len in 0..=self.max_length {
            for s in strings_of_length(&self.alphabet, len, &mut budget) {
                let ra = self.interpreter.full_match(&pa, &s);
                let rb = self.interpreter.full_match(&pb, &s);
                if let (Ok(ra), Ok(rb)) = (ra, rb) {
                    if ra != rb {
                        return Some(s);
                    }
                }
            }
            if budget == 0 {
                break;
            }
        }
        None
    }
}

/// All strings of exactly `len` characters drawn from `alphabet`, in a
/// deterministic odometer order, capped by `budget`.
fn strings_of_length(alphabet: &[char], len: usize, budget: &mut usize) -> Vec<String> {
    if len == 0 {
        return if *budget > 0 {
            *budget -= 1;
            vec![String::new()]
        } else {
            vec![]
        };
    }
    if alphabet.is_empty() {
        return vec![];
    }

    let mut out = Vec::new();
    let mut indices = vec![0usize; len];
    loop {
        if *budget == 0 {
            break;
        }
        out.push(indices.iter().map(|&i| alphabet[i]).collect());
        *budget -= 1;

        let mut pos = len;
        loop {
            if pos == 0 {
                return out;
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < alphabet.len() {
                break;
            }
            indices[pos] = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Production;

    fn leaf(p: Production) -> Node {
        Node::leaf(p).unwrap()
    }

    #[test]
    fn distinguishes_two_different_character_classes() {
        let interp = Interpreter::new();
        let a = leaf(Production::Char('a'));
        let b = leaf(Production::Char('b'));
        let d = Distinguisher::new(&interp, vec!['a', 'b'], 2);
        let s = d.distinguish(&a, &b).expect("should find a distinguisher");
        assert_ne!(
            interp.full_match("a", &s).unwrap(),
            interp.full_match("b", &s).unwrap()
        );
    }

    #[test]
    fn identical_patterns_have_no_distinguisher() {
        let interp = Interpreter::new();
        let a = leaf(Production::Char('a'));
        let a2 = leaf(Production::Char('a'));
        let d = Distinguisher::new(&interp, vec!['a', 'b'], 3);
        assert!(d.distinguish(&a, &a2).is_none());
    }

    #[test]
    fn shortest_distinguisher_is_preferred() {
        let interp = Interpreter::new();
        let star = Node::new(Production::Kleene, vec![leaf(Production::Char('a'))]).unwrap();
        let plus = Node::new(Production::Posit, vec![leaf(Production::Char('a'))]).unwrap();
        let d = Distinguisher::new(&interp, vec!['a'], 3);
        let s = d.distinguish(&star, &plus).expect("a* and a+ disagree on \"\"");
        assert_eq!(s, "");
    }
}
