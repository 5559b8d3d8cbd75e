//! Runs many `synth` invocations as subprocesses and summarizes the
//! results, grounded in the original implementation's `tester.py`
//! Instance/Task model.
//!
//! Each [`Instance`] holds a non-owning borrow of the [`Task`] it runs
//! (REDESIGN FLAGS: no `Instance <-> Task` ownership cycle), and Ctrl-C
//! sets a shared flag the poll loop checks cooperatively rather than
//! tearing down children from inside a signal handler.

use clap::Parser;
use rex_synth::cli::HarnessArgs;
use std::collections::VecDeque;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wait_timeout::ChildExt;

/// One synthesis job: an examples file, and optionally a ground-truth
/// pattern file to run `synth --auto` against instead of prompting.
struct Task {
    dir: PathBuf,
    examples_file: PathBuf,
    ground_truth_file: Option<PathBuf>,
}

/// One repetition of a `Task`, queued independently so `-r/--runs` can run
/// the same instance several times (`original_source/scripts/tester.py`'s
/// `run_each`).
struct Job<'t> {
    task: &'t Task,
    run: usize,
}

/// A queued job's live subprocess. Borrows its `Task` rather than owning or
/// reference-counting it.
struct Instance<'t> {
    task: &'t Task,
    run: usize,
    child: std::process::Child,
    started: Instant,
}

enum Outcome {
    Solved(String),
    NoSolution,
    TimedOut,
    Crashed(String),
}

/// The tagged fields a `synth` child reports on stdout (spec.md §6), parsed
/// back out the way `tester.py`'s `Task.read_output` does.
#[derive(Default)]
struct ChildReport {
    enumerator: Option<String>,
    enumerated: Option<usize>,
    nodes: Option<usize>,
    interactions: Option<usize>,
    elapsed_secs: Option<f64>,
}

struct TaskResult {
    dir: PathBuf,
    run: usize,
    outcome: Outcome,
    elapsed: Duration,
    report: ChildReport,
}

fn discover_tasks(dirs: &[PathBuf]) -> Vec<Task> {
    dirs.iter()
        .filter_map(|dir| {
            let examples_file = dir.join("examples.txt");
            if !examples_file.is_file() {
                return None;
            }
            let ground_truth_file = dir.join("ground_truth.txt");
            let ground_truth_file = ground_truth_file.is_file().then_some(ground_truth_file);
            Some(Task {
                dir: dir.clone(),
                examples_file,
                ground_truth_file,
            })
        })
        .collect()
}

fn locate_synth_binary() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "harness binary has no parent directory",
        )
    })?;
    let candidate = dir.join("synth");
    if candidate.exists() {
        Ok(candidate)
    } else {
        Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("expected a sibling `synth` binary at {}", candidate.display()),
        ))
    }
}

fn spawn_task<'t>(
    job: &Job<'t>,
    synth_bin: &Path,
    args: &HarnessArgs,
) -> std::io::Result<Instance<'t>> {
    let task = job.task;
    let mut cmd = Command::new(synth_bin);
    cmd.arg(&task.examples_file);
    if args.resnax {
        cmd.arg("--resnax");
    }
    if let Some(ground_truth_file) = &task.ground_truth_file {
        let pattern = fs::read_to_string(ground_truth_file)?;
        cmd.arg("--auto").arg(pattern.trim());
    }
    cmd.stdout(Stdio::piped()).stderr(Stdio::null());
    let child = cmd.spawn()?;
    Ok(Instance {
        task,
        run: job.run,
        child,
        started: Instant::now(),
    })
}

/// Pull the tagged `Enumerator`/`Enumerated`/`Nodes`/`Interactions`/
/// `Elapsed time`/`Solution` lines out of a finished `synth` process's
/// stdout, per `driver::SynthesisReport::log_summary`'s contract and
/// `tester.py`'s `Task.read_output`.
fn parse_outcome(stdout: &str) -> (Outcome, ChildReport) {
    let mut report = ChildReport::default();
    let mut outcome = Outcome::NoSolution;
    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("[info]   Solution: ") {
            let rest = rest.trim();
            outcome = if rest == "<none found>" {
                Outcome::NoSolution
            } else {
                Outcome::Solved(rest.to_string())
            };
        } else if let Some(rest) = line.strip_prefix("[info] Enumerator: ") {
            report.enumerator = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("[info] Enumerated: ") {
            report.enumerated = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix("[info] Nodes: ") {
            report.nodes = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix("[info] Interactions: ") {
            report.interactions = rest.trim().parse().ok();
        } else if let Some(rest) = line.strip_prefix("[info] Elapsed time: ") {
            report.elapsed_secs = rest.trim().parse().ok();
        }
    }
    (outcome, report)
}

fn print_results(results: &[TaskResult], output: Option<&Path>) {
    let mut buf = String::new();
    buf.push_str(&format!(
        "{:<40} {:<5} {:<12} {:>10} {:<16} {:>10} {:>6} {:>6}  {}\n",
        "task", "run", "outcome", "time(s)", "enumerator", "enumerated", "nodes", "interact", "detail"
    ));
    for r in results {
        let (label, detail) = match &r.outcome {
            Outcome::Solved(p) => ("solved", p.clone()),
            Outcome::NoSolution => ("no-solution", String::new()),
            Outcome::TimedOut => ("timeout", String::new()),
            Outcome::Crashed(e) => ("crashed", e.clone()),
        };
        let time = r
            .report
            .elapsed_secs
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| format!("{:.3}", r.elapsed.as_secs_f64()));
        buf.push_str(&format!(
            "{:<40} {:<5} {:<12} {:>10} {:<16} {:>10} {:>6} {:>6}  {}\n",
            r.dir.display().to_string(),
            r.run,
            label,
            time,
            r.report.enumerator.as_deref().unwrap_or("-"),
            r.report
                .enumerated
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            r.report
                .nodes
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            r.report
                .interactions
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            detail
        ));
    }
    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, buf.as_bytes()) {
                eprintln!("could not write {}: {}", path.display(), e);
            }
        }
        None => print!("{}", buf),
    }
}

fn main() -> ExitCode {
    let args = HarnessArgs::parse();

    let die = Arc::new(AtomicBool::new(false));
    {
        let die = die.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            die.store(true, Ordering::SeqCst);
        }) {
            eprintln!("could not install Ctrl-C handler: {}", e);
        }
    }

    let synth_bin = match locate_synth_binary() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let tasks = discover_tasks(&args.directories);
    if tasks.is_empty() {
        eprintln!("no tasks found (expected a directory containing examples.txt)");
        return ExitCode::FAILURE;
    }

    let timeout = Duration::from_secs(args.timeout_secs);
    let runs = args.runs.max(1);
    let jobs: Vec<Job<'_>> = tasks
        .iter()
        .flat_map(|task| (0..runs).map(move |run| Job { task, run }))
        .collect();
    let mut pending: VecDeque<&Job<'_>> = jobs.iter().collect();
    let mut running: Vec<Instance> = Vec::new();
    let mut results: Vec<TaskResult> = Vec::new();

    while !pending.is_empty() || !running.is_empty() {
        if die.load(Ordering::SeqCst) {
            for instance in running.iter_mut() {
                let _ = instance.child.kill();
            }
            break;
        }

        while running.len() < args.parallelism.max(1) {
            let Some(job) = pending.pop_front() else {
                break;
            };
            match spawn_task(job, &synth_bin, &args) {
                Ok(instance) => running.push(instance),
                Err(e) => results.push(TaskResult {
                    dir: job.task.dir.clone(),
                    run: job.run,
                    outcome: Outcome::Crashed(e.to_string()),
                    elapsed: Duration::ZERO,
                    report: ChildReport::default(),
                }),
            }
        }

        let mut still_running = Vec::new();
        for mut instance in running.drain(..) {
            match instance.child.wait_timeout(Duration::from_millis(100)) {
                Ok(Some(status)) => {
                    results.push(finish(instance, status, args.echo_output));
                }
                Ok(None) => {
                    if instance.started.elapsed() >= timeout {
                        let _ = instance.child.kill();
                        results.push(TaskResult {
                            dir: instance.task.dir.clone(),
                            run: instance.run,
                            outcome: Outcome::TimedOut,
                            elapsed: instance.started.elapsed(),
                            report: ChildReport::default(),
                        });
                    } else {
                        still_running.push(instance);
                    }
                }
                Err(e) => {
                    results.push(TaskResult {
                        dir: instance.task.dir.clone(),
                        run: instance.run,
                        outcome: Outcome::Crashed(e.to_string()),
                        elapsed: instance.started.elapsed(),
                        report: ChildReport::default(),
                    });
                }
            }
        }
        running = still_running;
    }

    print_results(&results, args.output.as_deref());
    ExitCode::SUCCESS
}

fn finish(mut instance: Instance, status: ExitStatus, echo_output: bool) -> TaskResult {
    let elapsed = instance.started.elapsed();
    let mut stdout = String::new();
    if let Some(mut out) = instance.child.stdout.take() {
        let _ = out.read_to_string(&mut stdout);
    }
    if echo_output {
        print!("{}", stdout);
    }
    let (outcome, report) = if status.success() {
        parse_outcome(&stdout)
    } else {
        (
            Outcome::Crashed(format!("exit status {:?}", status.code())),
            ChildReport::default(),
        )
    };
    TaskResult {
        dir: instance.task.dir.clone(),
        run: instance.run,
        outcome,
        elapsed,
        report,
    }
}
