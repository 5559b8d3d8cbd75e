//! Typed productions, the AST node arena, and precedence levels.
//!
//! The DSL is a single closed `enum Production` rather than a set of
//! virtual-dispatch production objects: every production kind is matched
//! exhaustively by the interpreter and the pretty-printer, so adding a
//! production that neither handles is a compile error.

use crate::error::ImplementationError;
use std::sync::atomic::{AtomicU64, Ordering};

/// The result type of a production, used to check child/argument agreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Regex,
    Num,
    Str,
    Bool,
}

/// A unique, process-lifetime identifier assigned to every [`Node`] at
/// construction. Used only as a key into the pretty-printer's local
/// precedence map; never mutated and never consulted for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(0);

impl NodeId {
    fn fresh() -> Self {
        NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A named DSL rule: a terminal literal or an operator over typed arguments.
///
/// Precedence levels follow spec.md §4.A: atoms bind tightest (4), the
/// unary regex operators and `copies` bind next (3), `concat` binds looser
/// (2), and `union` loosest (1). Non-regex-producing productions have no
/// meaningful precedence and return the atom level by convention so callers
/// never need to special-case them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Production {
    // --- terminals ---
    Char(char),
    Number(u32),
    Dot,
    Digit,
    Word,
    Space,
    /// The string under test. Printed as `IN` in a pretty-printed predicate
    /// tree, e.g. `match(a+b?, IN)`.
    Input,

    // --- unary regex operators ---
    Kleene,
    Option,
    Posit,

    // --- variadic regex operators ---
    Concat,
    Union,

    // --- binary regex operator ---
    Copies,

    // --- predicates over strings ---
    Match,
    PartialMatch,
    Len,
    Le,
    Ge,
    Conj,
}

/// Minimum number of children a variadic production accepts.
const VARIADIC_MIN_ARITY: usize = 2;

impl Production {
    pub fn result_type(&self) -> ValueType {
        use Production::*;
        match self {
            Char(_) | Dot | Digit | Word | Space | Kleene | Option | Posit | Concat | Union
            | Copies => ValueType::Regex,
            Number(_) => ValueType::Num,
            Input => ValueType::Str,
            Match | PartialMatch | Le | Ge | Conj => ValueType::Bool,
            Len => ValueType::Num,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Production::Char(_)
                | Production::Number(_)
                | Production::Dot
                | Production::Digit
                | Production::Word
                | Production::Space
                | Production::Input
        )
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self, Production::Concat | Production::Union)
    }

    /// Precedence used by the pretty-printer; see the type-level doc comment.
    pub fn precedence(&self) -> u8 {
        use Production::*;
        match self {
            Char(_) | Number(_) | Dot | Digit | Word | Space | Input => 4,
            Kleene | Option | Posit | Copies => 3,
            Concat => 2,
            Union => 1,
            Match | PartialMatch | Len | Le | Ge | Conj => 4,
        }
    }

    /// Expected argument types, for fixed-arity productions. Variadic
    /// productions (`Concat`, `Union`) are checked separately since any
    /// number of `Regex` children is valid.
    fn fixed_arg_types(&self) -> &'static [ValueType] {
        use Production::*;
        use ValueType::*;
        match self {
            Char(_) | Number(_) | Dot | Digit | Word | Space | Input => &[],
            Kleene | Option | Posit => &[Regex],
            Copies => &[Regex, Num],
            Match | PartialMatch => &[Regex, Str],
            Len => &[Str],
            Le | Ge => &[Num, Num],
            Conj => &[Bool, Bool],
            Concat | Union => unreachable!("variadic productions are checked separately"),
        }
    }

    /// Validate that `children` satisfy this production's arity and
    /// argument-type signature. A mismatch here indicates a bug in the
    /// enumerator or DSL builder, not a user-facing error: the caller is
    /// expected to treat the `Err` as fatal.
    fn check_children(&self, children: &[Node]) -> Result<(), ImplementationError> {
        if self.is_variadic() {
            if children.len() < VARIADIC_MIN_ARITY {
                return Err(ImplementationError::new(
                    "Production::check_children",
                    format!(
                        "{:?} requires at least {} children, got {}",
                        self,
                        VARIADIC_MIN_ARITY,
                        children.len()
                    ),
                ));
            }
            for (i, child) in children.iter().enumerate() {
                if child.production.result_type() != ValueType::Regex {
                    return Err(ImplementationError::new(
                        "Production::check_children",
                        format!(
                            "{:?} child {} has type {:?}, expected Regex",
                            self,
                            i,
                            child.production.result_type()
                        ),
                    ));
                }
            }
            return Ok(());
        }

        let expected = self.fixed_arg_types();
        if children.len() != expected.len() {
            return Err(ImplementationError::new(
                "Production::check_children",
                format!(
                    "{:?} expects {} children, got {}",
                    self,
                    expected.len(),
                    children.len()
                ),
            ));
        }
        for (i, (child, want)) in children.iter().zip(expected.iter()).enumerate() {
            let got = child.production.result_type();
            if got != *want {
                return Err(ImplementationError::new(
                    "Production::check_children",
                    format!("{:?} child {} has type {:?}, expected {:?}", self, i, got, want),
                ));
            }
        }
        Ok(())
    }
}

/// `(production, ordered children)`. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub production: Production,
    pub children: Vec<Node>,
}

impl Node {
    /// Construct a node, validating arity and argument-type agreement.
    /// Returns `Err` only on an internal invariant violation (a bug in the
    /// caller), never as a result of user input.
    pub fn new(production: Production, children: Vec<Node>) -> Result<Self, ImplementationError> {
        production.check_children(&children)?;
        Ok(Self {
            id: NodeId::fresh(),
            production,
            children,
        })
    }

    pub fn leaf(production: Production) -> Result<Self, ImplementationError> {
        Self::new(production, Vec::new())
    }

    pub fn result_type(&self) -> ValueType {
        self.production.result_type()
    }

    /// Number of AST nodes in this subtree, used for the `Nodes:` stdout
    /// line and as a deterministic enumeration-order size metric.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Node::size).sum::<usize>()
    }
}

/// Structural equality: ignores [`NodeId`], since two independently built
/// trees with the same shape are the same candidate for enumerator
/// non-repetition purposes (spec.md §8 invariant 8).
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.production == other.production && self.children == other.children
    }
}
impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.production.hash(state);
        self.children.hash(state);
    }
}

impl ptree::TreeItem for Node {
    type Child = Self;

    fn write_self<W: std::io::Write>(&self, f: &mut W, _: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{:?}", self.production)
    }

    fn children(&self) -> std::borrow::Cow<[Self::Child]> {
        std::borrow::Cow::from(&self.children)
    }
}

impl Node {
    /// Print this AST as a tree to stdout, for `synth --tree`.
    pub fn print_tree(&self) -> std::io::Result<()> {
        ptree::print_tree(self)
    }
}

/// A DSL production entry: the result type, ordered argument types, and (for
/// terminals) the literal it carries. `Dsl` below only needs the set of
/// characters and numeric bound a field's sub-DSL is restricted to; this
/// type documents the general production-set shape spec.md §3 describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionEntry {
    pub production: Production,
    pub arg_types: Vec<ValueType>,
    pub result_type: ValueType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_nodes_have_unique_ids() {
        let a = Node::leaf(Production::Char('a')).unwrap();
        let b = Node::leaf(Production::Char('a')).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a, b, "structural equality ignores NodeId");
    }

    #[test]
    fn rejects_wrong_arity() {
        let a = Node::leaf(Production::Char('a')).unwrap();
        let err = Node::new(Production::Kleene, vec![a.clone(), a]).unwrap_err();
        assert!(err.message.contains("expects 1 children"));
    }

    #[test]
    fn rejects_wrong_argument_type() {
        let n = Node::leaf(Production::Number(3)).unwrap();
        let err = Node::new(Production::Kleene, vec![n]).unwrap_err();
        assert!(err.message.contains("expected Regex"));
    }

    #[test]
    fn concat_accepts_variadic_regex_children() {
        let a = Node::leaf(Production::Char('a')).unwrap();
        let b = Node::leaf(Production::Char('b')).unwrap();
        let c = Node::leaf(Production::Char('c')).unwrap();
        let node = Node::new(Production::Concat, vec![a, b, c]).unwrap();
        assert_eq!(node.children.len(), 3);
    }

    #[test]
    fn size_counts_all_nodes() {
        let a = Node::leaf(Production::Char('a')).unwrap();
        let star = Node::new(Production::Kleene, vec![a]).unwrap();
        assert_eq!(star.size(), 2);
    }
}
