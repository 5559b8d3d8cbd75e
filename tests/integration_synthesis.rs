//! End-to-end scenarios: parse an examples file, run the full synthesis
//! loop, and check the resulting pattern against both the original
//! examples and a few held-out strings.

use rex_synth::driver::{SynthesisConfig, SynthesisDriver};
use rex_synth::format::parse_default;
use rex_synth::interpreter::{pretty_print, Interpreter};
use rex_synth::oracle::GroundTruthOracle;

fn synthesize(text: &str, ground_truth: &str) -> String {
    let examples = parse_default(text).expect("examples file should parse");
    let mut driver = SynthesisDriver::new(
        &examples.valid,
        &examples.invalid,
        SynthesisConfig::default(),
    );
    let mut oracle = GroundTruthOracle::new(ground_truth).expect("ground truth should compile");
    let report = driver.run(&mut oracle).expect("synthesis should not error");
    let solution = report.solution.expect("a solution should be found");
    pretty_print(&solution)
}

#[test]
fn digit_class_from_single_digit_examples() {
    let pattern = synthesize("+1\n+2\n+9\n-a\n-b\n", "\\d");
    let interp = Interpreter::new();
    assert!(interp.full_match(&pattern, "7").unwrap());
    assert!(!interp.full_match(&pattern, "x").unwrap());
}

#[test]
fn union_of_literals_from_cat_car_can() {
    let pattern = synthesize("+cat\n+car\n+can\n-cap\n-dog\n", "ca(t|r|n)");
    let interp = Interpreter::new();
    assert!(interp.full_match(&pattern, "cat").unwrap());
    assert!(interp.full_match(&pattern, "car").unwrap());
    assert!(interp.full_match(&pattern, "can").unwrap());
    assert!(!interp.full_match(&pattern, "cap").unwrap());
}

#[test]
fn repeated_a_followed_by_b() {
    let pattern = synthesize("+ab\n+aab\n+aaab\n-b\n-ba\n", "a+b");
    let interp = Interpreter::new();
    assert!(interp.full_match(&pattern, "aaaab").unwrap());
    assert!(!interp.full_match(&pattern, "b").unwrap());
    assert!(!interp.full_match(&pattern, "ba").unwrap());
}

#[test]
fn phone_like_examples_decompose_into_aligned_fields() {
    let pattern = synthesize(
        "+(123) 456\n+(999) 000\n-123 456\n",
        "\\(\\d{3}\\) \\d{3}",
    );
    let interp = Interpreter::new();
    assert!(interp.full_match(&pattern, "(555) 123").unwrap());
    assert!(!interp.full_match(&pattern, "555 123").unwrap());
}
