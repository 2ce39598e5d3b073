//! Integration tests for the `tagwire` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the demo, encode
//! and decode subcommands through the actual binary, including stdin/stdout
//! piping, file I/O, field modes and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

fn tagwire() -> Command {
    Command::cargo_bin("tagwire").unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Demo subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn demo_roundtrips_sample_tree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example.txt");

    tagwire()
        .args(["demo", "--layers", "6", "--interval-ms", "50", "-o"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Writing\n"))
        .stdout(predicate::str::contains("Writing done, now reading"))
        .stdout(predicate::str::contains("Reading done"))
        .stdout(predicate::str::contains("check true"));

    let wire = std::fs::read_to_string(&path).unwrap();
    assert!(wire.starts_with("O2S10O2"), "unexpected wire: {wire}");
}

#[test]
fn demo_layer_zero_writes_leaf_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leaf.txt");

    tagwire()
        .args(["demo", "--layers", "0", "--interval-ms", "50", "-o"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("check true"));

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "O3S1aN1S1bN2S1cS4long"
    );
}

#[test]
fn demo_delimited_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("example.txt");

    tagwire()
        .args([
            "--field-mode",
            "delimited",
            "demo",
            "--layers",
            "4",
            "--interval-ms",
            "50",
            "-o",
        ])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("check true"));

    let wire = std::fs::read_to_string(&path).unwrap();
    assert!(wire.starts_with("O2;S1;0O2;"), "unexpected wire: {wire}");
}

#[test]
fn demo_unwritable_path_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("example.txt");

    tagwire()
        .args(["demo", "--layers", "1", "--interval-ms", "50", "-o"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to write"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Encode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn encode_stdin_to_stdout() {
    tagwire()
        .arg("encode")
        .write_stdin(r#"{"a":1,"b":"x"}"#)
        .assert()
        .success()
        .stdout("O2S1aN1S1bS1x");
}

#[test]
fn encode_array_as_indexed_mapping() {
    tagwire()
        .arg("encode")
        .write_stdin(r#"[7,"hi"]"#)
        .assert()
        .success()
        .stdout("O2S10N7S11S2hi");
}

#[test]
fn encode_stdin_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.tw");

    tagwire()
        .args(["--field-mode", "delimited", "encode", "-o"])
        .arg(&path)
        .write_stdin(r#"{"price":12.5,"name":"widget"}"#)
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "O2;S5;priceN12.5;S4;nameS6;widget"
    );
}

#[test]
fn encode_compact_overflow_fails() {
    tagwire()
        .arg("encode")
        .write_stdin(r#"{"n":42}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("field overflow"));
}

#[test]
fn encode_null_is_unsupported() {
    tagwire()
        .arg("encode")
        .write_stdin(r#"{"n":null}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported value type: null"));
}

#[test]
fn encode_invalid_json_fails() {
    tagwire()
        .arg("encode")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input is not valid JSON"));
}

#[test]
fn encode_missing_input_file_fails() {
    tagwire()
        .args(["encode", "-i", "/nonexistent/path/to/file.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Decode subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decode_stdin_to_pretty_json() {
    let output = tagwire()
        .arg("decode")
        .write_stdin("O2S1aN1S1bS1x")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json, serde_json::json!({"a": 1.0, "b": "x"}));
}

#[test]
fn decode_file_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.tw");
    let output = dir.path().join("out.json");
    std::fs::write(&input, "O1;S4;listO2;S1;0N10;S1;1N-3;").unwrap();

    tagwire()
        .args(["--field-mode", "delimited", "decode", "-i"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({"list": {"0": 10.0, "1": -3.0}}));
}

#[test]
fn decode_unknown_tag_fails() {
    tagwire()
        .arg("decode")
        .write_stdin("X1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown tag byte 0x58"));
}

#[test]
fn decode_truncated_input_fails() {
    tagwire()
        .arg("decode")
        .write_stdin("O2S1aN1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed field"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Roundtrip through the binary
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn encode_then_decode_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let wire = dir.path().join("data.tw");
    let input = r#"{"title":"Quarterly report","pages":128,"meta":{"draft":"no","rev":3.5}}"#;

    tagwire()
        .args(["--field-mode", "delimited", "encode", "-o"])
        .arg(&wire)
        .write_stdin(input)
        .assert()
        .success();

    let output = tagwire()
        .args(["--field-mode", "delimited", "decode", "-i"])
        .arg(&wire)
        .output()
        .unwrap();
    assert!(output.status.success());

    // every number comes back as a float
    let decoded: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        decoded,
        serde_json::json!({
            "title": "Quarterly report",
            "pages": 128.0,
            "meta": {"draft": "no", "rev": 3.5}
        })
    );
}

#[test]
fn no_subcommand_shows_usage() {
    tagwire()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
