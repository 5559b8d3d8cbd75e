//! Labels a counterexample string as valid or invalid.
//!
//! Two implementations share one trait: [`InteractiveOracle`] prompts a
//! human on stdin/stdout (spec.md §4.I), and [`GroundTruthOracle`] answers
//! automatically from a ground-truth regex for the `--auto` batch-testing
//! path. Oracle wait time is the caller's concern, not this module's — the
//! driver excludes it from its own elapsed-time accounting by stopping the
//! clock before calling `ask` and resuming after.

use crate::error::{InterpreterError, OracleError};
use regex::Regex;
use std::collections::HashSet;
use std::io::{self, BufRead, BufReader, Write};

/// Responses accepted as an affirmative answer to an oracle question.
const YES_VALUES: &[&str] = &["yes", "valid", "true", "1", "+", "v", "y", "t"];
/// Responses accepted as a negative answer to an oracle question.
const NO_VALUES: &[&str] = &["no", "invalid", "false", "0", "-", "i", "n", "f"];

/// Answers whether a string belongs to the language being synthesized.
pub trait Oracle {
    fn ask(&mut self, input: &str) -> io::Result<bool>;
}

/// Prompts a human, one yes/no question per distinct string. Answers are
/// cached so the same string is never asked twice in one session.
pub struct InteractiveOracle<R, W> {
    reader: R,
    writer: W,
    yes_values: HashSet<String>,
    no_values: HashSet<String>,
}

impl<R: BufRead, W: Write> InteractiveOracle<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            yes_values: HashSet::new(),
            no_values: HashSet::new(),
        }
    }
}

impl InteractiveOracle<BufReader<io::Stdin>, io::Stdout> {
    /// The usual oracle: prompt on the process's own stdin/stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Oracle for InteractiveOracle<R, W> {
    fn ask(&mut self, input: &str) -> io::Result<bool> {
        if self.yes_values.contains(input) {
            return Ok(true);
        }
        if self.no_values.contains(input) {
            return Ok(false);
        }

        loop {
            write!(self.writer, "Is {:?} a valid example? [y/n] ", input)?;
            self.writer.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "oracle input closed before a response was given",
                ));
            }

            let response = line.trim().to_ascii_lowercase();
            match response.as_str() {
                r if YES_VALUES.contains(&r) => {
                    self.yes_values.insert(input.to_string());
                    return Ok(true);
                }
                r if NO_VALUES.contains(&r) => {
                    self.no_values.insert(input.to_string());
                    return Ok(false);
                }
                other => {
                    let err = OracleError {
                        response: other.to_string(),
                    };
                    writeln!(self.writer, "{}", err)?;
                }
            }
        }
    }
}

/// Answers automatically from a known ground-truth regex, for batch
/// testing against a corpus where the target language is already known
/// (the harness's `--auto` mode).
pub struct GroundTruthOracle {
    pattern: Regex,
}

impl GroundTruthOracle {
    pub fn new(ground_truth: &str) -> Result<Self, InterpreterError> {
        let anchored = format!("^(?:{})$", ground_truth);
        Regex::new(&anchored)
            .map(|pattern| Self { pattern })
            .map_err(|_| InterpreterError::InvalidPattern(ground_truth.to_string()))
    }
}

impl Oracle for GroundTruthOracle {
    fn ask(&mut self, input: &str) -> io::Result<bool> {
        Ok(self.pattern.is_match(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn ground_truth_oracle_uses_fullmatch_semantics() {
        let mut oracle = GroundTruthOracle::new("a+b").unwrap();
        assert!(oracle.ask("aab").unwrap());
        assert!(!oracle.ask("aabx").unwrap());
    }

    #[test]
    fn interactive_oracle_accepts_yes_and_no() {
        let input = Cursor::new(b"y\nn\n".to_vec());
        let mut output = Vec::new();
        let mut oracle = InteractiveOracle::new(input, &mut output);
        assert!(oracle.ask("abc").unwrap());
        assert!(!oracle.ask("xyz").unwrap());
    }

    #[test]
    fn interactive_oracle_reprompts_on_garbage_then_accepts() {
        let input = Cursor::new(b"maybe\nyes\n".to_vec());
        let mut output = Vec::new();
        let mut oracle = InteractiveOracle::new(input, &mut output);
        assert!(oracle.ask("abc").unwrap());
    }

    #[test]
    fn interactive_oracle_accepts_spec_literal_synonyms() {
        let input = Cursor::new(b"valid\ninvalid\n1\n0\n+\n-\nv\ni\nt\nf\n".to_vec());
        let mut output = Vec::new();
        let mut oracle = InteractiveOracle::new(input, &mut output);
        assert!(oracle.ask("a").unwrap());
        assert!(!oracle.ask("b").unwrap());
        assert!(oracle.ask("c").unwrap());
        assert!(!oracle.ask("d").unwrap());
        assert!(oracle.ask("e").unwrap());
        assert!(!oracle.ask("f").unwrap());
        assert!(oracle.ask("g").unwrap());
        assert!(!oracle.ask("h").unwrap());
        assert!(oracle.ask("i").unwrap());
        assert!(!oracle.ask("j").unwrap());
    }

    #[test]
    fn interactive_oracle_caches_repeated_questions() {
        let input = Cursor::new(b"y\n".to_vec());
        let mut output = Vec::new();
        let mut oracle = InteractiveOracle::new(input, &mut output);
        assert!(oracle.ask("abc").unwrap());
        // Second call for the same string must not consume more input.
        assert!(oracle.ask("abc").unwrap());
    }
}
