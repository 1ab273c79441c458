//! Binary-level checks that need no network access

use assert_cmd::Command;
use predicates::prelude::*;

/// `tvmcp` isolated from any config on the host
fn tvmcp(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tvmcp").unwrap();
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("TVMCP_EXCHANGE")
        .env_remove("TVMCP_TIMEFRAME")
        .env_remove("TVMCP_EXPORT_DIR")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    tvmcp(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("smoke"))
        .stdout(predicate::str::contains("--exchange"));
}

#[test]
fn test_tools_lists_all_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    tvmcp(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_indicators"))
        .stdout(predicate::str::contains("get_specific_indicators"))
        .stdout(predicate::str::contains("get_historical_data"))
        .stdout(predicate::str::contains("indicators/{symbol}"));
}

#[test]
fn test_flag_overrides_reach_defaults() {
    let dir = tempfile::tempdir().unwrap();
    tvmcp(&dir)
        .args(["--exchange", "NASDAQ", "--timeframe", "1d", "tools"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exchange NASDAQ, timeframe 1d"));
}

#[test]
fn test_invalid_timeframe_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("tvmcp.json"),
        r#"{"defaults": {"timeframe": "3h"}}"#,
    )
    .unwrap();

    tvmcp(&dir)
        .arg("tools")
        .assert()
        .failure()
        .stderr(predicate::str::contains("defaults.timeframe"));
}

#[test]
fn test_serve_answers_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
        "\n",
        r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
        "\n"
    );

    let output = tvmcp(&dir).arg("serve").write_stdin(input).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["result"], serde_json::json!({}));
    assert_eq!(lines[1]["result"]["tools"].as_array().unwrap().len(), 3);
}

#[test]
fn test_call_rejects_non_object_args() {
    let dir = tempfile::tempdir().unwrap();
    tvmcp(&dir)
        .args(["call", "get_indicators", "--args", "[1]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--args must be a JSON object"));
}
