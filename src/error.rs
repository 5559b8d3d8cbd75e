//! Error taxonomy for the synthesizer.
//!
//! Kept as plain enums with hand-written [`Display`] impls rather than a
//! derive-macro crate, matching the style the rest of this crate's
//! production/AST types use for their own error types.

use std::fmt::{Display, Formatter};

/// Raised when a candidate AST cannot be evaluated on a given input.
///
/// Never escapes the decider: [`crate::decider::Decider::analyze`] catches
/// every variant and converts it into a [`crate::enumerator::BlockingPredicate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterpreterError {
    /// `copies` (`{n}`) was applied with a literal outside the DSL's bound.
    InvalidRepetitionBound { requested: u32, max: u32 },
    /// A character-class atom had an empty alphabet.
    EmptyCharacterClass,
    /// The underlying `regex` crate rejected the pretty-printed pattern.
    InvalidPattern(String),
}

impl Display for InterpreterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpreterError::InvalidRepetitionBound { requested, max } => write!(
                f,
                "repetition count {} exceeds bound {}",
                requested, max
            ),
            InterpreterError::EmptyCharacterClass => write!(f, "character class has no members"),
            InterpreterError::InvalidPattern(p) => {
                write!(f, "compiled pattern rejected by regex engine: {}", p)
            }
        }
    }
}

impl std::error::Error for InterpreterError {}

/// Raised while parsing an examples file. Surfaced as a process-exit error;
/// not recoverable within a synthesis session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExampleFormatError {
    /// A line did not begin with `+`, `-`, or (in `--resnax` mode) a tab.
    UnrecognizedLine { line_no: usize, text: String },
    /// The file contained no valid examples at all.
    NoValidExamples,
    /// `--resnax` mode expects exactly two tab-separated columns per line.
    MalformedResnaxRow { line_no: usize },
}

impl Display for ExampleFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ExampleFormatError::UnrecognizedLine { line_no, text } => {
                write!(f, "line {}: unrecognized example line {:?}", line_no, text)
            }
            ExampleFormatError::NoValidExamples => {
                write!(f, "examples file has no valid (`+`) examples")
            }
            ExampleFormatError::MalformedResnaxRow { line_no } => {
                write!(f, "line {}: expected `valid\\tinvalid` row", line_no)
            }
        }
    }
}

impl std::error::Error for ExampleFormatError {}

/// Raised by an [`crate::oracle::Oracle`] implementation; handled by
/// re-prompting and never terminates the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleError {
    pub response: String,
}

impl Display for OracleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unrecognized oracle response {:?}; answer yes/no",
            self.response
        )
    }
}

impl std::error::Error for OracleError {}

/// An internal invariant violation: a bug, not a recoverable runtime
/// condition. Abort rather than propagate as a normal `Result` where this
/// is raised deep in a hot path (AST construction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplementationError {
    pub what: String,
    pub message: String,
}

impl ImplementationError {
    pub fn new(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            what: what.into(),
            message: message.into(),
        }
    }
}

impl Display for ImplementationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImplementationError: {}: {}", self.what, self.message)
    }
}

impl std::error::Error for ImplementationError {}
