//! Command-line argument definitions for the `synth` and `harness`
//! binaries, built with `clap`'s derive API.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which enumerator(s) a `synth` run should use, and whether pruning is
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Method {
    /// Pick the enumerator by field count: `FunnyEnumerator` for a single
    /// field, `MultiTreeEnumerator` otherwise.
    Multitree,
    /// Force the single-field `FunnyEnumerator`.
    Funny,
    /// Force `MultiTreeEnumerator` regardless of field count.
    Ktree,
    /// Same as `multitree`, but blocking predicates are never applied.
    Nopruning,
    /// Run both enumerators in sequence and report both timings.
    CompareTimes,
}

/// Synthesize a regular expression consistent with a set of labeled
/// examples, asking an oracle to resolve ambiguity along the way.
#[derive(Debug, Parser)]
#[command(name = "synth", version, about)]
pub struct SynthArgs {
    /// Path to the examples file (`+`/`-` prefixed lines by default).
    pub examples_file: PathBuf,

    /// Which enumerator(s) to use and whether pruning is applied.
    #[arg(short = 'm', long, value_enum, default_value_t = Method::Multitree)]
    pub method: Method,

    /// Parse the examples file as tab-separated `valid\tinvalid` rows
    /// instead of the default `+`/`-` prefix format.
    #[arg(long)]
    pub resnax: bool,

    /// Answer oracle questions automatically from this ground-truth
    /// pattern instead of prompting a human on stdin.
    #[arg(long, value_name = "PATTERN")]
    pub auto: Option<String>,

    /// Consecutive indistinguishable-candidate rounds to tolerate before
    /// accepting the current best candidate as final.
    #[arg(long, default_value_t = 3)]
    pub max_indistinguishable: usize,

    /// Maximum nesting depth the enumerator will search.
    #[arg(long, default_value_t = 6)]
    pub max_depth: usize,

    /// Maximum concat/union width the enumerator will search.
    #[arg(long, default_value_t = 4)]
    pub max_length: usize,

    /// Print the solution's AST as a tree, in addition to the pretty-printed
    /// pattern.
    #[arg(long)]
    pub tree: bool,
}

/// Run many `synth` invocations as subprocesses and summarize the results.
#[derive(Debug, Parser)]
#[command(name = "harness", version, about)]
pub struct HarnessArgs {
    /// Directories to scan for example-file tasks. Each must contain an
    /// examples file and (for `--auto` runs) a ground-truth pattern file.
    pub directories: Vec<PathBuf>,

    /// Number of synthesis tasks to run concurrently.
    #[arg(short = 'p', long, default_value_t = 1)]
    pub parallelism: usize,

    /// Per-task timeout, in seconds.
    #[arg(short = 't', long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Number of times to run each task (results are reported per run).
    #[arg(short = 'r', long = "runs", default_value_t = 1)]
    pub runs: usize,

    /// Echo each child `synth` process's stdout as it finishes.
    #[arg(short = 'o', long = "echo-output")]
    pub echo_output: bool,

    /// Pass `--resnax` through to every `synth` invocation.
    #[arg(long)]
    pub resnax: bool,

    /// Write the summary table to this file instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
