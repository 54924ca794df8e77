use std::path::Path;
use std::process::Command;

use serde_json::{json, Value};

fn run(root: &Path, args: &[&str]) -> (bool, Value) {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("asset-cli"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("run asset-cli");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().last().unwrap_or_default();
    let value: Value = serde_json::from_str(line).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({err}): {stdout}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stderr)
        )
    });
    (output.status.success(), value)
}

#[test]
fn create_then_list() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let record = json!({
        "recordKey": "S1",
        "category": "Weir",
        "region": "BC",
        "latitude": 50.0,
        "longitude": -120.0,
        "status": "active"
    })
    .to_string();

    let (ok, created) = run(tmp.path(), &["create", "--record", &record]);
    assert!(ok, "{created}");
    assert_eq!(created["data"]["status"], json!("Active"));

    let (ok, listed) = run(tmp.path(), &["list"]);
    assert!(ok);
    assert_eq!(listed["data"].as_array().map(Vec::len), Some(1));
    assert_eq!(listed["data"][0]["recordKey"], json!("S1"));

    let (ok, duplicate) = run(tmp.path(), &["create", "--record", &record]);
    assert!(!ok);
    assert_eq!(duplicate["success"], json!(false));
}

#[test]
fn lookup_commands() {
    let tmp = tempfile::tempdir().expect("temp dir");

    let (ok, added) = run(tmp.path(), &["regions", "add", "BC"]);
    assert!(ok);
    assert_eq!(added, json!({ "success": true, "data": true }));

    let (_, regions) = run(tmp.path(), &["regions", "list"]);
    assert_eq!(regions["data"], json!(["BC"]));

    run(tmp.path(), &["color", "set", "Weir", "BC", "#336699"]);
    let (_, color) = run(tmp.path(), &["color", "get", "weir", "bc"]);
    assert_eq!(color["data"], json!("#336699"));
}

#[test]
fn malformed_record_json_is_a_failure_envelope() {
    let tmp = tempfile::tempdir().expect("temp dir");

    let (ok, created) = run(tmp.path(), &["create", "--record", "{not json"]);
    assert!(!ok);
    assert_eq!(created["success"], json!(false));
    let message = created["message"].as_str().expect("message");
    assert!(message.contains("parse record JSON"), "{message}");

    let (ok, updated) = run(tmp.path(), &["update", "S1", "--record", "[]"]);
    assert!(!ok);
    assert_eq!(updated["success"], json!(false));
}
