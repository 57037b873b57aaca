//! End-to-end tests for the breeze CLI.
//!
//! These exercise the front-end phases and exit codes through the real
//! binary. Everything here stops before the external C compiler would be
//! spawned (`--check`, or inputs that fail an earlier phase), so the tests
//! carry no toolchain dependency.

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> String {
    format!("{}/fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
}

#[test]
fn missing_file_exits_with_osfile() {
    let mut cmd = Command::cargo_bin("breeze").unwrap();
    cmd.arg("does_not_exist.bz")
        .assert()
        .code(72)
        .stderr(predicate::str::contains("Could not validate path"));
}

#[test]
fn scan_error_exits_with_dataerr() {
    let mut cmd = Command::cargo_bin("breeze").unwrap();
    cmd.arg(fixture("scan_error.bz"))
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Unexpected token"))
        .stderr(predicate::str::contains("Scanning phase failed"));
}

#[test]
fn parse_error_exits_with_dataerr() {
    let mut cmd = Command::cargo_bin("breeze").unwrap();
    cmd.arg(fixture("parse_error.bz"))
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Parsing phase failed"))
        // The token trace was printed before parsing started
        .stdout(predicate::str::contains("Let 'let' [1:1]"));
}

#[test]
fn analyze_error_exits_with_dataerr() {
    let mut cmd = Command::cargo_bin("breeze").unwrap();
    cmd.arg(fixture("analyze_error.bz"))
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Undeclared identifier"))
        .stderr(predicate::str::contains("Static analyzing phase failed"))
        // The AST trace was printed before analysis started
        .stdout(predicate::str::contains("(Debug (Identifier missing))"));
}

#[test]
fn check_mode_succeeds_without_compiling() {
    let mut cmd = Command::cargo_bin("breeze").unwrap();
    cmd.arg("-c")
        .arg(fixture("valid.bz"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Let 'let' [1:1]"))
        // The AST trace is printed before analysis back-patches types
        .stdout(predicate::str::contains(
            "(Block (LetDecl x) (ExprStmt (Assign = x (IntegerLit 10))))",
        ));
}

#[test]
fn diagnostic_format_includes_location_and_caret() {
    let mut cmd = Command::cargo_bin("breeze").unwrap();
    cmd.arg("--no-color")
        .arg(fixture("analyze_error.bz"))
        .assert()
        .code(65)
        .stderr(predicate::str::contains("ERROR   Undeclared identifier"))
        .stderr(predicate::str::contains("analyze_error.bz:1:7"))
        .stderr(predicate::str::contains("    1 | debug missing;"))
        .stderr(predicate::str::contains("      |       ^^^^^^^"));
}

#[test]
fn json_mode_replays_diagnostics_on_stdout() {
    let mut cmd = Command::cargo_bin("breeze").unwrap();
    cmd.arg("--json")
        .arg(fixture("parse_error.bz"))
        .assert()
        .code(65)
        .stdout(predicate::str::contains(r#""type":"diagnostics""#))
        .stdout(predicate::str::contains(r#""severity":"error""#));
}

#[test]
fn no_color_strips_ansi_sequences() {
    let mut cmd = Command::cargo_bin("breeze").unwrap();
    cmd.arg("--no-color")
        .arg(fixture("scan_error.bz"))
        .assert()
        .code(65)
        .stderr(predicate::str::contains("\u{1b}[").not());
}
