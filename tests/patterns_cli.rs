//! Drives the binary through its solver-free path and checks the
//! pattern mining output.

use std::process::Command;

fn run_patterns_only() -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_rulesmith"))
        .arg("--patterns-only")
        .output()
        .expect("failed to execute rulesmith");

    assert!(
        output.status.success(),
        "rulesmith failed\nstderr: {}\nstdout: {}",
        String::from_utf8_lossy(&output.stderr),
        String::from_utf8_lossy(&output.stdout)
    );

    String::from_utf8(output.stdout).expect("stdout was not UTF-8")
}

#[test]
fn test_patterns_only_reports_handled_ratio_and_patterns() {
    let stdout = run_patterns_only();

    let ratio_line = stdout
        .lines()
        .find(|l| l.ends_with("rules already simplify to true"))
        .expect("missing handled/total summary line");
    let (handled, total) = {
        let mut nums = ratio_line
            .split_whitespace()
            .filter_map(|w| w.parse::<usize>().ok());
        (nums.next().unwrap(), nums.next().unwrap())
    };
    assert!(handled >= 1, "expected some corpus entries to be handled");
    assert!(handled < total, "expected some corpus entries to survive");

    // expressions that survive simplification are echoed
    assert!(stdout.contains("EXPR: "), "missing EXPR lines");

    // the distributed min/max pattern from the corpus must be mined,
    // with the shared operand unified into one wildcard
    assert!(
        stdout.contains("PATTERN: max(min(v0, v1), min(v0, v2))"),
        "missing expected pattern; output was:\n{}",
        stdout
    );
    assert!(
        stdout.contains("PATTERN: select((v0 < v1), v0, v1)"),
        "missing expected select pattern; output was:\n{}",
        stdout
    );
}

#[test]
fn test_pattern_listing_is_deduplicated() {
    let stdout = run_patterns_only();
    let mut patterns: Vec<&str> = stdout
        .lines()
        .filter(|l| l.starts_with("PATTERN: "))
        .collect();
    let before = patterns.len();
    assert!(before > 0);
    patterns.sort();
    patterns.dedup();
    assert_eq!(before, patterns.len(), "duplicate patterns in listing");
}
