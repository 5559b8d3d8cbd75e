//! Entry point: parse an examples file, run the synthesis loop, and print
//! the tagged summary lines the `harness` binary parses back out.

use clap::Parser;
use rex_synth::cli::{Method, SynthArgs};
use rex_synth::driver::{EnumeratorChoice, SynthesisConfig, SynthesisDriver, SynthesisReport};
use rex_synth::format::{parse_default, parse_resnax};
use rex_synth::logger::{Level, Logger};
use rex_synth::oracle::{GroundTruthOracle, InteractiveOracle, Oracle};
use std::fs;
use std::process::ExitCode;

/// Resolve `-m/--method` into the enumerator choice and pruning flag a
/// single synthesis run should use. `compare-times` is handled by the
/// caller instead, since it runs two full syntheses.
fn resolve_method(method: Method) -> (EnumeratorChoice, bool) {
    match method {
        Method::Multitree => (EnumeratorChoice::Auto, true),
        Method::Funny => (EnumeratorChoice::Funny, true),
        Method::Ktree => (EnumeratorChoice::Ktree, true),
        Method::Nopruning => (EnumeratorChoice::Auto, false),
        Method::CompareTimes => unreachable!("compare-times is handled separately"),
    }
}

fn print_tree_if_requested(args: &SynthArgs, report: &SynthesisReport) {
    if args.tree {
        if let Some(solution) = &report.solution {
            let _ = solution.print_tree();
        }
    }
}

fn main() -> ExitCode {
    let args = SynthArgs::parse();
    let logger = Logger::new(Level::Info);

    let text = match fs::read_to_string(&args.examples_file) {
        Ok(text) => text,
        Err(e) => {
            logger.error(format!(
                "could not read {}: {}",
                args.examples_file.display(),
                e
            ));
            return ExitCode::FAILURE;
        }
    };

    let parsed = if args.resnax {
        parse_resnax(&text)
    } else {
        parse_default(&text)
    };
    let examples = match parsed {
        Ok(examples) => examples,
        Err(e) => {
            logger.error(e.to_string());
            return ExitCode::FAILURE;
        }
    };

    let mut ground_truth_oracle;
    let mut interactive_oracle;
    let oracle: &mut dyn Oracle = match &args.auto {
        Some(pattern) => {
            ground_truth_oracle = match GroundTruthOracle::new(pattern) {
                Ok(oracle) => oracle,
                Err(e) => {
                    logger.error(format!("invalid --auto pattern: {}", e));
                    return ExitCode::FAILURE;
                }
            };
            &mut ground_truth_oracle
        }
        None => {
            interactive_oracle = InteractiveOracle::stdio();
            &mut interactive_oracle
        }
    };

    if args.method == Method::CompareTimes {
        let config_for = |choice| SynthesisConfig {
            max_indistinguishable: args.max_indistinguishable,
            max_depth: args.max_depth,
            max_length: args.max_length,
            enumerator_choice: choice,
            pruning: true,
        };
        let mut funny_driver = SynthesisDriver::new(
            &examples.valid,
            &examples.invalid,
            config_for(EnumeratorChoice::Funny),
        );
        let mut ktree_driver = SynthesisDriver::new(
            &examples.valid,
            &examples.invalid,
            config_for(EnumeratorChoice::Ktree),
        );

        let funny_result = funny_driver.run(oracle);
        let ktree_result = ktree_driver.run(oracle);

        return match (funny_result, ktree_result) {
            (Ok(funny_report), Ok(ktree_report)) => {
                print_tree_if_requested(&args, &funny_report);
                print_tree_if_requested(&args, &ktree_report);
                logger.info("-- funny --");
                funny_report.log_summary(&logger);
                logger.info("-- ktree --");
                ktree_report.log_summary(&logger);
                ExitCode::SUCCESS
            }
            (Err(e), _) | (_, Err(e)) => {
                logger.error(format!("synthesis failed: {}", e));
                ExitCode::FAILURE
            }
        };
    }

    let (enumerator_choice, pruning) = resolve_method(args.method);
    let config = SynthesisConfig {
        max_indistinguishable: args.max_indistinguishable,
        max_depth: args.max_depth,
        max_length: args.max_length,
        enumerator_choice,
        pruning,
    };
    let mut driver = SynthesisDriver::new(&examples.valid, &examples.invalid, config);

    match driver.run(oracle) {
        Ok(report) => {
            print_tree_if_requested(&args, &report);
            report.log_summary(&logger);
            // A legitimate no-solution run still terminated cleanly; only
            // an internal error (the `Err` arm below) is a failure exit.
            ExitCode::SUCCESS
        }
        Err(e) => {
            logger.error(format!("synthesis failed: {}", e));
            ExitCode::FAILURE
        }
    }
}
