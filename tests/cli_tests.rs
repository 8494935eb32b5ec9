//! CLI integration tests: run the binary end to end.

#![allow(deprecated)] // Command::cargo_bin

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("climate-insights").unwrap();
    cmd.env_remove("CLIMATE_INSIGHTS_INPUT")
        .env_remove("CLIMATE_INSIGHTS_OUT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--time-axis"))
        .stdout(predicate::str::contains("--no-figures"))
        .stdout(predicate::str::contains("--header-row 3"));
}

#[test]
fn test_cli_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    cli()
        .arg(dir.path().join("API_CLIMATE_CHANGE_WB.xls"))
        .arg("--no-figures")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot access"));
}

#[test]
fn test_cli_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let path = common::indicator_workbook(dir.path());
    cli()
        .arg(&path)
        .args(["--format", "gif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported figure format"));
}

#[test]
fn test_cli_prints_reports_and_exports_tables() {
    let dir = TempDir::new().unwrap();
    let path = common::indicator_workbook(dir.path());
    let csv = dir.path().join("values.csv");
    let json = dir.path().join("report.json");

    cli()
        .current_dir(dir.path())
        .arg(&path)
        .arg("--no-figures")
        .arg("--export-csv")
        .arg(&csv)
        .arg("--json")
        .arg(&json)
        .args(["--time-axis", "year"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary statistics"))
        .stdout(predicate::str::contains("Correlation matrix"))
        .stdout(predicate::str::contains("2011"));

    let written = std::fs::read_to_string(&csv).unwrap();
    assert!(written.starts_with("Country Name,2010,2011"));
    assert!(json.exists());
    assert!(!dir.path().join("figures").exists());
}

#[test]
fn test_cli_exports_figures_to_default_dir() {
    let dir = TempDir::new().unwrap();
    let path = common::indicator_workbook(dir.path());

    cli()
        .current_dir(dir.path())
        .arg(&path)
        .args(["--width", "480", "--height", "360"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summary statistics"));

    let figures = dir.path().join("figures");
    for stem in ["summary_statistics", "correlation_heatmap", "time_series"] {
        let file = figures.join(format!("{stem}.png"));
        assert!(file.exists(), "missing {}", file.display());
        assert!(std::fs::metadata(&file).unwrap().len() > 0);
    }
}

#[test]
fn test_cli_exports_svg_to_out_dir() {
    let dir = TempDir::new().unwrap();
    let path = common::indicator_workbook(dir.path());
    let out = dir.path().join("charts").join("svg");

    cli()
        .arg(&path)
        .arg("--out-dir")
        .arg(&out)
        .args(["--format", "svg", "--time-axis", "year"])
        .assert()
        .success();

    let heatmap = std::fs::read_to_string(out.join("correlation_heatmap.svg")).unwrap();
    assert!(heatmap.contains("<svg"));
    assert!(out.join("summary_statistics.svg").exists());
    assert!(out.join("time_series.svg").exists());
}
