//! End-to-end CLI behavior over the compiled `sudoku-pipeline` binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("sudoku-pipeline").expect("binary builds")
}

#[test]
fn run_produces_a_pdf_and_exits_success() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output_dir = dir.path().join("exports");

    cmd()
        .arg("--puzzle")
        .arg("sudoku-9x9")
        .arg("--root-seed")
        .arg("cli-smoke-seed")
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--shadow-disabled")
        .arg("run")
        .assert()
        .success();

    let has_pdf = fs::read_dir(&output_dir)
        .expect("output dir exists")
        .filter_map(|e| e.ok())
        .any(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("pdf"));
    assert!(has_pdf, "run should have exported a pdf under {output_dir:?}");
}

#[test]
fn run_without_root_seed_exits_with_config_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    cmd()
        .arg("--puzzle")
        .arg("sudoku-9x9")
        .arg("--output-dir")
        .arg(dir.path())
        .arg("run")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn run_with_unknown_puzzle_kind_exits_with_config_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    cmd()
        .arg("--puzzle")
        .arg("sudoku-16x16")
        .arg("--root-seed")
        .arg("seed")
        .arg("--output-dir")
        .arg(dir.path())
        .arg("--shadow-disabled")
        .arg("run")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn prod_profile_without_hash_salt_exits_with_config_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    cmd()
        .arg("--puzzle")
        .arg("sudoku-9x9")
        .arg("--root-seed")
        .arg("seed")
        .arg("--profile")
        .arg("prod")
        .arg("--output-dir")
        .arg(dir.path())
        .arg("--shadow-enabled")
        .arg("--shadow-sample-rate")
        .arg("1.0")
        .arg("run")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn router_show_prints_resolution_for_a_known_role() {
    cmd()
        .arg("--puzzle")
        .arg("sudoku-9x9")
        .arg("--root-seed")
        .arg("ignored-for-router-show")
        .arg("router")
        .arg("show")
        .arg("--role")
        .arg("solver")
        .assert()
        .success();
}

#[test]
fn router_show_with_unknown_role_exits_with_config_code() {
    cmd()
        .arg("--puzzle")
        .arg("sudoku-9x9")
        .arg("--root-seed")
        .arg("ignored")
        .arg("router")
        .arg("show")
        .arg("--role")
        .arg("referee")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn validate_round_trips_an_artifact_produced_by_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output_dir = dir.path().join("exports");

    cmd()
        .arg("--puzzle")
        .arg("sudoku-9x9")
        .arg("--root-seed")
        .arg("validate-roundtrip-seed")
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("--shadow-disabled")
        .arg("run")
        .assert()
        .success();

    let spec_dir = dir.path().join("artifacts").join("Spec");
    let spec_file = fs::read_dir(&spec_dir)
        .expect("spec artifacts directory exists")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .expect("at least one spec artifact file");

    cmd()
        .arg("--puzzle")
        .arg("sudoku-9x9")
        .arg("--root-seed")
        .arg("validate-roundtrip-seed")
        .arg("--output-dir")
        .arg(&output_dir)
        .arg("validate")
        .arg(&spec_file)
        .arg("--artifact-type")
        .arg("spec")
        .assert()
        .success();
}

#[test]
fn validate_rejects_an_unknown_artifact_type_flag() {
    let dir = tempfile::tempdir().expect("tempdir");
    let bogus_file = dir.path().join("not-real.json");
    fs::write(&bogus_file, b"{}").expect("write stub file");

    cmd()
        .arg("--puzzle")
        .arg("sudoku-9x9")
        .arg("--root-seed")
        .arg("seed")
        .arg("validate")
        .arg(&bogus_file)
        .arg("--artifact-type")
        .arg("unobtainium")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn help_text_documents_the_run_and_validate_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("validate")));
}
