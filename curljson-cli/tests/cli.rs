use predicates::prelude::*;
use serde_json::Value;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

const STATS: &str = r#"{
    "status": "green",
    "active": true,
    "message_stats": {"publish": 17, "ack_details": {"rate": 0.5}},
    "node.name": "rabbit@host",
    "hits": {
        "total": 2,
        "hits": [
            {"_id": "a1", "_source": {"title": "Nginx", "views": "12"}},
            {"_id": "b2", "_source": {"title": "Redis", "views": 30}}
        ]
    }
}"#;

struct Snapshot {
    _dir: TempDir,
    path: PathBuf,
}

fn snapshot(contents: &str) -> Result<Snapshot, Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("stats.json");
    fs::write(&path, contents)?;
    Ok(Snapshot { _dir: dir, path })
}

fn curljson() -> Result<assert_cmd::Command, Box<dyn Error>> {
    let mut cmd = assert_cmd::Command::cargo_bin("curljson")?;
    cmd.env_remove("RUST_LOG")
        .env_remove("CURLJSON_USERNAME")
        .env_remove("CURLJSON_PASSWORD");
    Ok(cmd)
}

#[test]
fn prints_number_at_key() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args(["--input", snap.path.to_str().unwrap(), "--key", "message_stats.publish"])
        .assert()
        .success()
        .stdout("17\n");
    Ok(())
}

#[test]
fn prints_string_and_bool() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "status"])
        .assert()
        .success()
        .stdout("green\n");
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "active"])
        .assert()
        .success()
        .stdout("1\n");
    Ok(())
}

#[test]
fn quoted_segment_keeps_dots() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "\"node.name\""])
        .assert()
        .success()
        .stdout("rabbit@host\n");
    Ok(())
}

#[test]
fn discovery_document() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    let output = curljson()?
        .args([
            "-i",
            snap.path.to_str().unwrap(),
            "-k",
            "hits.hits",
            "-f",
            "zabbix-lld",
            "-m",
            "",
            "-m",
            "_source.title",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output)?;
    let data = value["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["{#ID}"], 0);
    assert_eq!(data[0]["{#TITLE}"], "Nginx");
    assert_eq!(data[1]["{#TITLE}"], "Redis");
    Ok(())
}

#[test]
fn discovery_without_macros_lists_keys() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "message_stats", "-f", "zabbix-lld"])
        .assert()
        .success()
        .stdout("{\"data\":[{\"{#NAME}\":\"publish\"},{\"{#NAME}\":\"ack_details\"}]}\n");
    Ok(())
}

#[test]
fn sum_feature() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args([
            "-i",
            snap.path.to_str().unwrap(),
            "-k",
            "hits.hits",
            "-f",
            "sum",
            "-m",
            "_source.views",
        ])
        .assert()
        .success()
        .stdout("42\n");
    Ok(())
}

#[test]
fn sum_of_text_fails() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(r#"{"values": [1, "abc"]}"#)?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "values", "-f", "sum"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Not a number value: \"abc\""));
    Ok(())
}

#[test]
fn missing_key_fails() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "message_stats.deliver"])
        .assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Can not find key path in JSON"));
    Ok(())
}

#[test]
fn container_without_feature_fails() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "hits.hits"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Result value is array"));
    Ok(())
}

#[test]
fn unknown_feature_fails() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "hits.hits", "-f", "avg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown feature: avg"));
    Ok(())
}

#[test]
fn stale_snapshot_fails() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    fs::File::options()
        .write(true)
        .open(&snap.path)?
        .set_modified(SystemTime::now() - Duration::from_secs(3_600))?;

    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-a", "60", "-k", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File is too old"));
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-a", "0", "-k", "status"])
        .assert()
        .success()
        .stdout("green\n");
    Ok(())
}

#[test]
fn missing_snapshot_fails() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("absent.json");
    curljson()?
        .args(["-i", path.to_str().unwrap(), "-k", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("File is not available"));
    Ok(())
}

#[test]
fn empty_document_fails() -> Result<(), Box<dyn Error>> {
    let snap = snapshot("[]")?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Empty json"));
    Ok(())
}

#[test]
fn output_with_feature_is_usage_error() -> Result<(), Box<dyn Error>> {
    curljson()?
        .args(["-l", "localhost:1/", "-o", "snap.json", "-f", "sum"])
        .assert()
        .code(2);
    Ok(())
}

#[test]
fn source_is_required() -> Result<(), Box<dyn Error>> {
    curljson()?.args(["-k", "status"]).assert().code(2);
    Ok(())
}

#[test]
fn snapshot_runs_ignore_credentials() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .env("CURLJSON_PASSWORD", "guest")
        .args(["-i", snap.path.to_str().unwrap(), "-k", "status"])
        .write_stdin("admin\n")
        .assert()
        .success()
        .stdout("green\n")
        .stderr(predicate::str::contains("Username").not());
    Ok(())
}

#[test]
fn verbose_logs_to_stderr_only() -> Result<(), Box<dyn Error>> {
    let snap = snapshot(STATS)?;
    curljson()?
        .args(["-i", snap.path.to_str().unwrap(), "-k", "status", "--verbose"])
        .assert()
        .success()
        .stdout("green\n")
        .stderr(predicate::str::contains("input from file"));
    Ok(())
}

#[test]
fn help_lists_features() -> Result<(), Box<dyn Error>> {
    curljson()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("zabbix-lld"));
    Ok(())
}
