// Integration tests for the docalign binary: exit codes, output files, JSON reports.
// Run with: cargo test -p docalign-cli --test cli_tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn docalign() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_docalign"));
    cmd.env_remove("DOCALIGN_LOG");
    cmd
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    fixtures_dir().join(name).to_string_lossy().into_owned()
}

/// Copy every fixture into a scratch dir so job runs write outside the source tree.
fn scratch_fixtures() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for entry in std::fs::read_dir(fixtures_dir()).unwrap() {
        let entry = entry.unwrap();
        std::fs::copy(entry.path(), dir.path().join(entry.file_name())).unwrap();
    }
    dir
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", String::from_utf8_lossy(&output.stdout)))
}

// ---------------------------------------------------------------------------
// align
// ---------------------------------------------------------------------------

#[test]
fn align_writes_workbook_per_input() {
    let out = tempfile::tempdir().unwrap();
    let output = docalign()
        .args(["align", &fixture("template.csv"), &fixture("input_a.csv"), &fixture("input_b.csv")])
        .args(["--key", "id", "--out-dir"])
        .arg(out.path())
        .output()
        .unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(out.path().join("alignment_input_a.xlsx").is_file());
    assert!(out.path().join("alignment_input_b.xlsx").is_file());
    assert!(stderr(&output).contains("aligned 2 of 2 input(s)"));
}

#[test]
fn align_json_report() {
    let out = tempfile::tempdir().unwrap();
    let output = docalign()
        .args(["align", &fixture("template.csv"), &fixture("input_a.csv")])
        .args(["--key", "id", "--format", "csv", "--json", "--out-dir"])
        .arg(out.path())
        .output()
        .unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    let json = stdout_json(&output);
    assert_eq!(json["key"], "id");
    assert_eq!(json["format"], "csv");
    assert!(json["run_at"].is_string());
    assert_eq!(json["batch"]["succeeded"], 1);

    let summary = &json["inputs"][0]["summary"];
    assert_eq!(summary["matched"], 3);
    assert_eq!(summary["template_only"], 1);
    assert_eq!(summary["input_only"], 1);
    assert_eq!(json["inputs"][0]["outputs"].as_array().unwrap().len(), 3);

    let matching = std::fs::read_to_string(out.path().join("alignment_input_a_matching.csv")).unwrap();
    assert_eq!(
        matching,
        "id,name,status_template,amount,status_input\n\
         2,Beta,closed,20,closed\n\
         3,Gamma,open,30,open\n\
         3,Gamma,open,31,open\n"
    );
}

#[test]
fn align_custom_suffixes() {
    let out = tempfile::tempdir().unwrap();
    let output = docalign()
        .args(["align", &fixture("template.csv"), &fixture("input_a.csv"), "--key", "id"])
        .args(["--format", "csv", "--template-suffix", "_t", "--input-suffix", "_i", "--out-dir"])
        .arg(out.path())
        .output()
        .unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    let matching = std::fs::read_to_string(out.path().join("alignment_input_a_matching.csv")).unwrap();
    assert!(matching.starts_with("id,name,status_t,amount,status_i\n"));
}

#[test]
fn align_equal_suffixes_is_usage_error() {
    let output = docalign()
        .args(["align", &fixture("template.csv"), &fixture("input_a.csv"), "--key", "id"])
        .args(["--template-suffix", "_x", "--input-suffix", "_x"])
        .output()
        .unwrap();
    assert_eq!(code(&output), 2);
}

#[test]
fn align_key_missing_from_template() {
    let output = docalign()
        .args(["align", &fixture("wrong_key.csv"), &fixture("input_a.csv"), "--key", "id"])
        .output()
        .unwrap();

    assert_eq!(code(&output), 5);
    let err = stderr(&output);
    assert!(err.contains("missing key column 'id'"), "stderr: {err}");
    assert!(err.contains("available columns: code, amount"), "stderr: {err}");
}

#[test]
fn align_partial_failure_still_writes_good_inputs() {
    let out = tempfile::tempdir().unwrap();
    let output = docalign()
        .args(["align", &fixture("template.csv"), &fixture("input_a.csv"), &fixture("wrong_key.csv")])
        .args(["--key", "id", "--json", "--out-dir"])
        .arg(out.path())
        .output()
        .unwrap();

    assert_eq!(code(&output), 7, "stderr: {}", stderr(&output));
    assert!(out.path().join("alignment_input_a.xlsx").is_file());
    assert!(!out.path().join("alignment_wrong_key.xlsx").exists());

    let json = stdout_json(&output);
    assert_eq!(json["batch"]["failed"], 1);
    assert_eq!(json["inputs"][1]["ok"], false);
    assert!(json["inputs"][1]["error"].as_str().unwrap().contains("missing key column"));
}

#[test]
fn align_parallel_matches_sequential() {
    let seq = tempfile::tempdir().unwrap();
    let par = tempfile::tempdir().unwrap();
    for (dir, extra) in [(&seq, None), (&par, Some("--parallel"))] {
        let mut cmd = docalign();
        cmd.args(["align", &fixture("template.csv"), &fixture("input_a.csv"), &fixture("input_b.csv")])
            .args(["--key", "id", "--format", "json", "--out-dir"])
            .arg(dir.path());
        if let Some(flag) = extra {
            cmd.arg(flag);
        }
        let output = cmd.output().unwrap();
        assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    }

    for name in ["alignment_input_a.json", "alignment_input_b.json"] {
        let a = std::fs::read(seq.path().join(name)).unwrap();
        let b = std::fs::read(par.path().join(name)).unwrap();
        assert_eq!(a, b, "{name} differs");
    }
}

#[test]
fn align_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("report.pdf");
    std::fs::write(&pdf, b"%PDF").unwrap();

    let output = docalign()
        .arg("align")
        .arg(&pdf)
        .arg(fixture("input_a.csv"))
        .args(["--key", "id"])
        .output()
        .unwrap();
    assert_eq!(code(&output), 4);
    assert!(stderr(&output).contains("unsupported format"));
}

#[test]
fn align_missing_file_is_io_error() {
    let output = docalign()
        .args(["align", &fixture("template.csv"), "/nonexistent/input.csv", "--key", "id"])
        .output()
        .unwrap();
    assert_eq!(code(&output), 3);
}

// ---------------------------------------------------------------------------
// combine
// ---------------------------------------------------------------------------

#[test]
fn combine_dedupes_to_csv() {
    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("merged.csv");
    let output = docalign()
        .args(["combine", &fixture("part1.csv"), &fixture("part2.csv"), "--key", "id", "--output"])
        .arg(&target)
        .output()
        .unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "id,name,extra\n1,Alpha,\n2,Beta,\n6,Zeta,y\n"
    );
    assert!(stderr(&output).contains("1 duplicate(s) removed"));
}

#[test]
fn combine_single_file_is_insufficient_input() {
    let out = tempfile::tempdir().unwrap();
    let output = docalign()
        .args(["combine", &fixture("part1.csv"), "--key", "id", "--output"])
        .arg(out.path().join("x.csv"))
        .output()
        .unwrap();
    assert_eq!(code(&output), 6);
}

#[test]
fn combine_missing_key() {
    let output = docalign()
        .args(["combine", &fixture("part1.csv"), &fixture("wrong_key.csv"), "--key", "id"])
        .output()
        .unwrap();
    assert_eq!(code(&output), 5);
}

// ---------------------------------------------------------------------------
// run / validate
// ---------------------------------------------------------------------------

#[test]
fn run_align_job_resolves_relative_paths() {
    let dir = scratch_fixtures();
    let output = docalign()
        .arg("run")
        .arg(dir.path().join("align.job.toml"))
        .arg("--json")
        .output()
        .unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(dir.path().join("alignment_input_a_matching.csv").is_file());
    assert!(dir.path().join("alignment_input_b_input_only.csv").is_file());
    assert_eq!(stdout_json(&output)["batch"]["inputs"], 2);
}

#[test]
fn run_combine_job() {
    let dir = scratch_fixtures();
    let output = docalign()
        .arg("run")
        .arg(dir.path().join("combine.job.toml"))
        .arg("--json")
        .output()
        .unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    let report = stdout_json(&output);
    assert_eq!(report["summary"]["rows_out"], 3);
    assert_eq!(report["duplicate_keys"][0], "2");

    let merged: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("merged.json")).unwrap()).unwrap();
    assert_eq!(merged["columns"], serde_json::json!(["id", "name", "extra"]));
    assert_eq!(merged["rows"].as_array().unwrap().len(), 3);
}

#[test]
fn run_combine_job_format_from_file_extension() {
    let dir = scratch_fixtures();
    let output = docalign().arg("run").arg(dir.path().join("combine_csv.job.toml")).output().unwrap();

    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("merged.csv")).unwrap(),
        "id,name,extra\n1,Alpha,\n2,Beta,\n6,Zeta,y\n"
    );
}

#[test]
fn validate_reports_job() {
    let output = docalign().args(["validate", &fixture("align.job.toml")]).output().unwrap();
    assert_eq!(code(&output), 0, "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("valid: align job 'fixture alignment' on 'id' with 2 input(s)"));
}

#[test]
fn invalid_job_exit_code() {
    let output = docalign().args(["validate", &fixture("invalid.job.toml")]).output().unwrap();
    assert_eq!(code(&output), 8);
    assert!(stderr(&output).contains("at least 2 inputs"));

    let output = docalign().args(["run", &fixture("invalid.job.toml")]).output().unwrap();
    assert_eq!(code(&output), 8);
}

// ---------------------------------------------------------------------------
// columns
// ---------------------------------------------------------------------------

#[test]
fn columns_lists_key_candidates() {
    let output = docalign().args(["columns", &fixture("template.csv")]).output().unwrap();
    assert_eq!(code(&output), 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "template (3 rows)\n  id\n  name\n  status\n");
}

#[test]
fn columns_json() {
    let output = docalign().args(["columns", &fixture("input_b.csv"), "--json"]).output().unwrap();
    assert_eq!(code(&output), 0);
    let json = stdout_json(&output);
    assert_eq!(json[0]["sheet"], "input_b");
    assert_eq!(json[0]["columns"], serde_json::json!(["id", "amount"]));
}

#[test]
fn columns_unknown_sheet() {
    let output = docalign()
        .args(["columns", &fixture("template.csv"), "--sheet", "Nope"])
        .output()
        .unwrap();
    assert_eq!(code(&output), 2);
    assert!(stderr(&output).contains("hint:"));
}
