//! Evaluates a regex AST against a string, and pretty-prints it with
//! minimal parentheses.
//!
//! Both operations share one building block: [`pretty_print`] turns a
//! `Regex`-typed subtree into a regex-engine-ready pattern fragment. The
//! interpreter hands that fragment to the `regex` crate rather than walking
//! characters itself — `regex` is already the pattern-matching tool of
//! choice elsewhere in this crate's lineage, so compiling the synthesized
//! AST through it is the natural choice over a hand-rolled engine.

use crate::ast::{Node, NodeId, Production};
use crate::error::InterpreterError;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

/// A value produced by evaluating one AST node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Regex(String),
    Num(i64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_num(&self) -> Option<i64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_regex_pattern(&self) -> Option<&str> {
        match self {
            Value::Regex(p) => Some(p),
            _ => None,
        }
    }
}

/// Evaluates candidate ASTs against string inputs, memoizing compiled
/// patterns. One `Interpreter` is shared across an entire synthesis
/// session; the decider calls it once per (candidate, example) pair, and
/// the same pretty-printed pattern tends to recur across examples, so a
/// small compile cache keeps a depth-3 search from recompiling the same
/// handful of patterns thousands of times.
#[derive(Default)]
pub struct Interpreter {
    compiled: RefCell<HashMap<String, Regex>>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `node` with `input` bound to [`Production::Input`] leaves.
    /// Returns the node's [`Value`], or an [`InterpreterError`] if the
    /// subtree cannot be evaluated on this input (an invalid repetition
    /// bound, an empty character class, or a pattern the regex engine
    /// rejects).
    pub fn eval(&self, node: &Node, input: &str) -> Result<Value, InterpreterError> {
        match &node.production {
            Production::Char(_)
            | Production::Dot
            | Production::Digit
            | Production::Word
            | Production::Space
            | Production::Kleene
            | Production::Option
            | Production::Posit
            | Production::Concat
            | Production::Union
            | Production::Copies => Ok(Value::Regex(pretty_print(node))),

            Production::Number(n) => Ok(Value::Num(*n as i64)),
            Production::Input => Ok(Value::Str(input.to_string())),

            Production::Match => {
                let pattern = pretty_print(&node.children[0]);
                let target = self.eval(&node.children[1], input)?;
                let target = target.as_str().expect("type-checked Str argument");
                Ok(Value::Bool(self.full_match(&pattern, target)?))
            }
            Production::PartialMatch => {
                let pattern = pretty_print(&node.children[0]);
                let target = self.eval(&node.children[1], input)?;
                let target = target.as_str().expect("type-checked Str argument");
                Ok(Value::Bool(self.partial_match(&pattern, target)?))
            }
            Production::Len => {
                let target = self.eval(&node.children[0], input)?;
                let target = target.as_str().expect("type-checked Str argument");
                Ok(Value::Num(target.chars().count() as i64))
            }
            Production::Le => {
                let a = self.eval(&node.children[0], input)?;
                let b = self.eval(&node.children[1], input)?;
                Ok(Value::Bool(
                    a.as_num().expect("Num") <= b.as_num().expect("Num"),
                ))
            }
            Production::Ge => {
                let a = self.eval(&node.children[0], input)?;
                let b = self.eval(&node.children[1], input)?;
                Ok(Value::Bool(
                    a.as_num().expect("Num") >= b.as_num().expect("Num"),
                ))
            }
            Production::Conj => {
                let a = self.eval(&node.children[0], input)?;
                let b = self.eval(&node.children[1], input)?;
                Ok(Value::Bool(
                    a.as_bool().expect("Bool") && b.as_bool().expect("Bool"),
                ))
            }
        }
    }

    /// `match(p, s)`: `s` is fully matched by `p`.
    pub fn full_match(&self, pattern: &str, s: &str) -> Result<bool, InterpreterError> {
        let anchored = format!("^(?:{})$", pattern);
        Ok(self.compiled(&anchored)?.is_match(s))
    }

    /// `partial_match(p, s)`: some prefix of `s` matches `p`, anchored at
    /// the start of the string.
    pub fn partial_match(&self, pattern: &str, s: &str) -> Result<bool, InterpreterError> {
        let anchored = format!("^(?:{})", pattern);
        Ok(self.compiled(&anchored)?.is_match(s))
    }

    fn compiled(&self, pattern: &str) -> Result<Regex, InterpreterError> {
        if let Some(re) = self.compiled.borrow().get(pattern) {
            return Ok(re.clone());
        }
        let re = Regex::new(pattern)
            .map_err(|_| InterpreterError::InvalidPattern(pattern.to_string()))?;
        self.compiled
            .borrow_mut()
            .insert(pattern.to_string(), re.clone());
        Ok(re)
    }
}

/// Escape a literal so it is safe to splice into a regex pattern.
fn escape_char(c: char) -> String {
    regex::escape(&c.to_string())
}

/// Pretty-print a `Regex`-typed AST with minimal parentheses: a child is
/// wrapped iff its precedence is strictly lower than its parent's
/// (spec.md §4.B). The precedence of every visited node is recorded in a
/// local map keyed by [`NodeId`] as the traversal proceeds — rather than
/// mutating the node — so the map never outlives a single print call.
pub fn pretty_print(node: &Node) -> String {
    let mut precedence: HashMap<NodeId, u8> = HashMap::new();
    print_rec(node, &mut precedence)
}

fn print_rec(node: &Node, precedence: &mut HashMap<NodeId, u8>) -> String {
    precedence.insert(node.id, node.production.precedence());
    let own_prec = node.production.precedence();

    let wrap = |child: &Node, precedence: &mut HashMap<NodeId, u8>| -> String {
        let child_str = print_rec(child, precedence);
        if child.production.precedence() < own_prec {
            format!("(?:{})", child_str)
        } else {
            child_str
        }
    };

    match &node.production {
        Production::Char(c) => escape_char(*c),
        Production::Dot => ".".to_string(),
        Production::Digit => "\\d".to_string(),
        Production::Word => "\\w".to_string(),
        Production::Space => "\\s".to_string(),
        Production::Number(n) => n.to_string(),
        Production::Input => "IN".to_string(),

        Production::Kleene => format!("{}*", wrap(&node.children[0], precedence)),
        Production::Option => format!("{}?", wrap(&node.children[0], precedence)),
        Production::Posit => format!("{}+", wrap(&node.children[0], precedence)),

        Production::Concat => node
            .children
            .iter()
            .map(|c| wrap(c, precedence))
            .collect::<Vec<_>>()
            .join(""),
        Production::Union => node
            .children
            .iter()
            .map(|c| wrap(c, precedence))
            .collect::<Vec<_>>()
            .join("|"),

        Production::Copies => {
            let base = wrap(&node.children[0], precedence);
            let n = match &node.children[1].production {
                Production::Number(n) => *n,
                _ => unreachable!("Copies' second child is type-checked as Number"),
            };
            format!("{}{{{}}}", base, n)
        }

        Production::Match
        | Production::PartialMatch
        | Production::Len
        | Production::Le
        | Production::Ge
        | Production::Conj => {
            unreachable!("pretty_print is only called on Regex-typed subtrees")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Production::*;

    fn leaf(p: crate::ast::Production) -> Node {
        Node::leaf(p).unwrap()
    }

    #[test]
    fn digit_plus_prints_without_parens() {
        let digit = leaf(Digit);
        let plus = Node::new(Posit, vec![digit]).unwrap();
        assert_eq!(pretty_print(&plus), "\\d+");
    }

    #[test]
    fn union_under_concat_is_parenthesized() {
        let a = leaf(Char('a'));
        let t = leaf(Char('t'));
        let r = leaf(Char('r'));
        let n = leaf(Char('n'));
        let union = Node::new(Union, vec![t, r, n]).unwrap();
        let concat = Node::new(Concat, vec![a, union]).unwrap();
        assert_eq!(pretty_print(&concat), "a(?:t|r|n)");
    }

    #[test]
    fn kleene_under_kleene_is_not_parenthesized() {
        // (a*)* : child precedence (3) is not strictly less than parent's (3)
        let a = leaf(Char('a'));
        let star = Node::new(Kleene, vec![a]).unwrap();
        let star2 = Node::new(Kleene, vec![star]).unwrap();
        assert_eq!(pretty_print(&star2), "a**");
    }

    #[test]
    fn full_match_semantics() {
        let interp = Interpreter::new();
        let a = leaf(Char('a'));
        let b = leaf(Char('b'));
        let plus = Node::new(Posit, vec![a]).unwrap();
        let concat = Node::new(Concat, vec![plus, b]).unwrap();
        let input = leaf(Input);
        let m = Node::new(Match, vec![concat, input]).unwrap();

        assert_eq!(interp.eval(&m, "aab").unwrap(), Value::Bool(true));
        assert_eq!(interp.eval(&m, "b").unwrap(), Value::Bool(false));
        assert_eq!(interp.eval(&m, "aabx").unwrap(), Value::Bool(false));
    }

    #[test]
    fn partial_match_checks_a_start_anchored_prefix() {
        let interp = Interpreter::new();
        let a = leaf(Char('a'));
        let plus = Node::new(Posit, vec![a]).unwrap();
        let input = leaf(Input);
        let m = Node::new(PartialMatch, vec![plus, input]).unwrap();
        assert_eq!(interp.eval(&m, "aaab").unwrap(), Value::Bool(true));
        assert_eq!(interp.eval(&m, "baaa").unwrap(), Value::Bool(false));
    }

    #[test]
    fn copies_prints_bounded_repetition() {
        let a = leaf(Char('a'));
        let n = leaf(Number(3));
        let node = Node::new(Copies, vec![a, n]).unwrap();
        assert_eq!(pretty_print(&node), "a{3}");
    }
}
