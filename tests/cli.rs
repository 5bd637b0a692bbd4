//! Command-line behavior of the `vim-text` binary.

mod common;

use assert_cmd::prelude::*;
use predicates::str::contains;
use std::process::Command;
use tempfile::TempDir;

fn vim_text() -> Command {
    Command::cargo_bin("vim-text").expect("binary exists")
}

#[test]
fn cli_exports_and_warns_about_skipped_tables() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let path = common::write_vim(input.path());

    vim_text()
        .arg(&path)
        .arg(output.path())
        .assert()
        .success()
        .stderr(contains("Broken"));

    assert!(output.path().join("Header.txt").is_file());
    assert!(output.path().join("Entities").join("Rvt.Element.csv").is_file());
}

#[test]
fn cli_no_mmap_quiet() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let path = common::write_vim(input.path());

    vim_text()
        .args(["-q", "--no-mmap"])
        .arg(&path)
        .arg(output.path())
        .assert()
        .success();
    assert!(output.path().join("meshes").join("1.obj").is_file());
}

#[test]
fn cli_missing_input_is_usage_error() {
    let output = TempDir::new().unwrap();
    vim_text()
        .arg(output.path().join("missing.vim"))
        .arg(output.path())
        .assert()
        .code(2)
        .stderr(contains("does not exist"));
}

#[test]
fn cli_missing_output_dir_is_usage_error() {
    let input = TempDir::new().unwrap();
    let path = common::write_vim(input.path());
    vim_text()
        .arg(&path)
        .arg(input.path().join("no-such-dir"))
        .assert()
        .code(2);
}

#[test]
fn cli_wrong_arg_count() {
    vim_text().arg("only-one").assert().code(2).stderr(contains("Usage"));
}

#[test]
fn cli_corrupt_input_fails() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    let path = input.path().join("bad.vim");
    std::fs::write(&path, b"definitely not a vim file, just text padding it out").unwrap();

    vim_text().arg(&path).arg(output.path()).assert().code(1).stderr(contains("Error"));
}

#[test]
fn cli_help_and_version() {
    vim_text().arg("--help").assert().success().stdout(contains("USAGE"));
    vim_text().arg("-V").assert().success().stdout(contains("vim-text"));
}
