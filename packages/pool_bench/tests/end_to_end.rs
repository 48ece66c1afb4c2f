//! Runs complete benchmarks, through the library entry point and through the command line.

#![cfg(not(miri))]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use new_zealand::nz;
use pool_bench::{BenchmarkConfig, InputBatch, Strategy, WorkerCommand, detect_cpu_count, run};

const BINARY: &str = env!("CARGO_BIN_EXE_pool_bench");

fn run_cli(working_dir: &Path, args: &[&str]) -> Output {
    Command::new(BINARY)
        .args(args)
        .current_dir(working_dir)
        .output()
        .expect("failed to start pool_bench")
}

/// Extracts the cell texts of the first table row that starts with a cell containing `label`.
fn row_cells(html: &str, label: &str) -> Vec<String> {
    let prefix = format!("<tr><td>{label}</td><td>");

    let line = html
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(&prefix))
        .unwrap_or_else(|| panic!("no row labeled {label} in report:\n{html}"));

    line.strip_prefix(&prefix)
        .and_then(|rest| rest.strip_suffix("</td></tr>"))
        .unwrap()
        .split("</td><td>")
        .map(str::to_string)
        .collect()
}

fn assert_valid_timings(cells: &[String]) {
    assert_eq!(cells.len(), Strategy::COUNT, "{cells:?}");

    for cell in cells {
        let (_, decimals) = cell.split_once('.').expect("timings have a decimal point");
        assert_eq!(decimals.len(), 3, "{cell}");

        let seconds: f64 = cell.parse().unwrap();
        assert!(seconds >= 0.0, "{cell}");
    }
}

#[test]
fn library_run_with_single_trial() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("report.html");

    let config = BenchmarkConfig::new()
        .inputs(InputBatch::from_integers([1, 2, 3]).unwrap())
        .trials(nz!(1))
        .output(&output)
        .worker(WorkerCommand::new(BINARY).arg("worker"));

    let summary = run(&config).unwrap();

    assert_eq!(summary.output_path(), output);
    assert_eq!(summary.run().len().get(), 1);

    let trial = summary.run().trials().first().unwrap();
    assert!(trial.samples().iter().all(|s| *s >= 0.0));
    assert_eq!(summary.medians().values(), trial.samples());

    let html = fs::read_to_string(&output).unwrap();
    let trial_cells = row_cells(&html, "1");
    let median_cells = row_cells(&html, "Medians:");

    assert_valid_timings(&trial_cells);
    assert_eq!(median_cells, trial_cells);

    let cpu_count = summary.environment().cpu_count();
    assert_eq!(cpu_count, detect_cpu_count());
    assert!(html.contains(&format!("CPUs: {cpu_count}")), "{html}");
}

#[test]
fn cli_writes_report_to_requested_path() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_cli(
        dir.path(),
        &[
            "--number", "1", "--number", "2", "--number", "3", "--trials", "2", "--output",
            "custom.html",
        ],
    );

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Execution #1"), "{stdout}");
    assert!(stdout.contains("Execution #2"), "{stdout}");
    assert!(!stdout.contains("Execution #3"), "{stdout}");
    assert!(stdout.contains("Running CPU-based multiprocessed benchmark..."), "{stdout}");
    assert!(stdout.contains("The report has been saved to custom.html"), "{stdout}");

    let html = fs::read_to_string(dir.path().join("custom.html")).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert_eq!(html.matches("<table>").count(), 2);
    assert_eq!(html.matches("Medians:").count(), 1);

    assert_valid_timings(&row_cells(&html, "1"));
    assert_valid_timings(&row_cells(&html, "2"));
    assert_valid_timings(&row_cells(&html, "Medians:"));
}

#[test]
fn cli_defaults_to_report_html_and_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.html");

    fs::write(&report, "previous report").unwrap();

    for _ in 0..2 {
        let output = run_cli(dir.path(), &["--number", "5", "--trials", "1"]);

        assert!(
            output.status.success(),
            "{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let html = fs::read_to_string(&report).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(!html.contains("previous report"));
}

#[test]
fn cli_rejects_zero_input() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_cli(dir.path(), &["--number", "0", "--trials", "1"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
    assert!(!dir.path().join("report.html").exists());
}

#[test]
fn cli_fails_when_report_cannot_be_written() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_cli(
        dir.path(),
        &["--number", "1", "--trials", "1", "--output", "missing/report.html"],
    );

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to write report"), "{stderr}");
}

#[test]
fn worker_subcommand_speaks_protocol() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = Command::new(BINARY)
        .arg("worker")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"0 10\n1 3\n")
        .unwrap();

    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), "0 55\n1 6\n");
}

#[test]
fn cli_help_lists_worker_subcommand() {
    let dir = tempfile::tempdir().unwrap();

    let output = run_cli(dir.path(), &["--help"]);

    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    assert!(help.contains("--number"), "{help}");
    assert!(help.contains("worker"), "{help}");
}
