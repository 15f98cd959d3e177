use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "wan-te-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn summary_field(stdout: &str, key: &str) -> Option<u64> {
    let line = stdout.lines().find(|l| l.starts_with("done "))?;
    line.split_whitespace()
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v.parse().ok())
}

#[test]
fn default_run_writes_one_snapshot_per_tick() {
    let dir = unique_temp_dir("default-run");
    let out_json = dir.join("snapshots.json");

    let output = Command::new(env!("CARGO_BIN_EXE_te_controller"))
        .args([
            "--duration-secs",
            "5",
            "--quiet",
            "--snapshots-json",
            out_json.to_str().unwrap(),
        ])
        .output()
        .expect("run te_controller");
    assert!(
        output.status.success(),
        "te_controller failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(summary_field(&stdout, "ticks"), Some(6), "stdout={stdout}");

    let raw = fs::read_to_string(&out_json).expect("read snapshots.json");
    let v: Value = serde_json::from_str(&raw).expect("parse snapshots.json");
    let arr = v.as_array().expect("snapshots.json must be a JSON array");
    assert_eq!(arr.len(), 6);
    for (i, snap) in arr.iter().enumerate() {
        assert_eq!(snap["tick"].as_u64(), Some(i as u64 + 1));
        assert_eq!(snap["at_ms"].as_u64(), Some(i as u64 * 1000));
        assert_eq!(snap["links"].as_array().map(|l| l.len()), Some(8));
    }
    let last = arr.last().unwrap();
    assert_eq!(
        last["total_active_flows"].as_u64(),
        summary_field(&stdout, "active_flows")
    );
    assert_eq!(
        last["cumulative_reroutes"].as_u64(),
        summary_field(&stdout, "reroutes")
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn same_seed_gives_same_summary() {
    let run = |seed: &str| {
        let output = Command::new(env!("CARGO_BIN_EXE_te_controller"))
            .args(["--duration-secs", "20", "--quiet", "--seed", seed])
            .output()
            .expect("run te_controller");
        assert!(output.status.success());
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    assert_eq!(run("5"), run("5"));
}

#[test]
fn config_file_drives_topology_and_cadence() {
    let dir = unique_temp_dir("config-file");
    let config = write_file(
        &dir,
        "config.json",
        r#"
{
    "topology": {
        "links": [
            { "a": "A", "b": "B", "capacity_mbps": 10, "latency_ms": 1 },
            { "a": "B", "b": "C", "capacity_mbps": 10, "latency_ms": 1 },
            { "a": "C", "b": "D", "capacity_mbps": 10, "latency_ms": 1 },
            { "a": "D", "b": "A", "capacity_mbps": 10, "latency_ms": 1 }
        ]
    },
    "tick_interval_ms": 500,
    "generation": { "arrival_rate_per_sec": 0 }
}
        "#,
    );
    let out_json = dir.join("snapshots.json");

    let output = Command::new(env!("CARGO_BIN_EXE_te_controller"))
        .args([
            "--config",
            config.to_str().unwrap(),
            "--duration-secs",
            "2",
            "--quiet",
            "--snapshots-json",
            out_json.to_str().unwrap(),
        ])
        .output()
        .expect("run te_controller");
    assert!(
        output.status.success(),
        "te_controller failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(summary_field(&stdout, "ticks"), Some(5));
    assert_eq!(summary_field(&stdout, "admitted"), Some(0));

    let raw = fs::read_to_string(&out_json).expect("read snapshots.json");
    let v: Value = serde_json::from_str(&raw).expect("parse snapshots.json");
    let arr = v.as_array().expect("array");
    assert_eq!(arr.len(), 5);
    assert_eq!(arr[0]["links"].as_array().map(|l| l.len()), Some(4));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn invalid_config_exits_with_failure() {
    let dir = unique_temp_dir("invalid-config");
    let config = write_file(
        &dir,
        "config.json",
        r#"{ "topology": { "links": [ { "a": "A", "b": "B", "capacity_mbps": 0 } ] } }"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_te_controller"))
        .args(["--config", config.to_str().unwrap(), "--quiet"])
        .output()
        .expect("run te_controller");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("capacity"), "stderr={stderr}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn non_positive_threshold_override_is_rejected() {
    let output = Command::new(env!("CARGO_BIN_EXE_te_controller"))
        .args(["--threshold", "0", "--duration-secs", "1", "--quiet"])
        .output()
        .expect("run te_controller");
    assert!(!output.status.success());
}
