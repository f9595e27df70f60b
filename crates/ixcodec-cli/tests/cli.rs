//! cli.rs
//!
//! Black-box tests: run the `ixcodec` binary against the shared sample IDL
//! and inspect its stdout.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::{json, Value};

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .unwrap()
        .to_path_buf()
}

fn sample_idl() -> PathBuf {
    repo_root().join("tests").join("fixtures").join("sample_idl.json")
}

fn ixcodec(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ixcodec"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to spawn ixcodec")
}

fn run_json(args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let out = ixcodec(&full);
    assert!(
        out.status.success(),
        "ixcodec {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    serde_json::from_slice(&out.stdout).unwrap_or_else(|e| panic!("stdout is not json ({e})"))
}

fn encode_set_state(state: Value) -> String {
    let idl = sample_idl();
    let args = json!({ "state": state }).to_string();
    let out = run_json(&["encode", "--idl", idl.to_str().unwrap(), "set_state", "--args", &args]);
    out["hex"].as_str().unwrap().to_string()
}

#[test]
fn discriminators_use_sighash() {
    let idl = sample_idl();
    let out = run_json(&["discriminators", "--idl", idl.to_str().unwrap()]);
    assert_eq!(out["len"], 8);
    assert_eq!(out["instructions"][0]["name"], "initialize");
    assert_eq!(out["instructions"][0]["hex"], "afaf6d1f0d989bed");
    assert_eq!(out["instructions"].as_array().unwrap().len(), 4);
}

#[test]
fn encode_then_decode() {
    let idl = sample_idl();
    let idl = idl.to_str().unwrap();
    let args = json!({
        "count": 7,
        "label": "hi",
        "tags": [1, 2],
        "memo": null,
        "seed": [9, 9, 9, 9]
    })
    .to_string();

    let encoded = run_json(&["encode", "--idl", idl, "initialize", "--args", &args]);
    assert_eq!(encoded["discriminator"], "afaf6d1f0d989bed");
    let hex = encoded["hex"].as_str().unwrap();
    let b58 = encoded["base58"].as_str().unwrap();

    let decoded = run_json(&["decode", "--idl", idl, hex]);
    assert_eq!(decoded["recognized"], true);
    assert_eq!(decoded["name"], "initialize");
    assert_eq!(decoded["data"]["count"], "7");
    assert_eq!(decoded["data"]["memo"], Value::Null);

    let again = run_json(&["decode", "--idl", idl, "--encoding", "base58", b58]);
    assert_eq!(again, decoded);
}

#[test]
fn foreign_data_is_not_recognized() {
    let idl = sample_idl();
    let out = run_json(&["decode", "--idl", idl.to_str().unwrap(), "00000000000000000000"]);
    assert_eq!(out, json!({ "recognized": false }));
}

#[test]
fn short_data_fails() {
    let idl = sample_idl();
    let out = ixcodec(&["decode", "--idl", idl.to_str().unwrap(), "0102"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("malformed"));
}

#[test]
fn format_renders_args_and_accounts() {
    let idl = sample_idl();
    let hex = encode_set_state(json!({ "Running": { "progress": 42 } }));

    let dir = tempfile::tempdir().unwrap();
    let accounts = dir.path().join("accounts.json");
    let keys = json!([
        { "pubkey": "11111111111111111111111111111111", "isSigner": false, "isWritable": true },
        { "pubkey": "SysvarRent111111111111111111111111111111111", "isSigner": true, "isWritable": false },
        { "pubkey": "SysvarC1ock11111111111111111111111111111111" }
    ]);
    fs::write(&accounts, keys.to_string()).unwrap();

    let out = run_json(&[
        "format",
        "--idl",
        idl.to_str().unwrap(),
        &hex,
        "--accounts",
        accounts.to_str().unwrap(),
    ]);
    assert_eq!(out["name"], "setState");
    assert_eq!(out["args"][0]["type"], "State");
    assert_eq!(out["args"][0]["data"], "Running { progress: 42 }");
    assert_eq!(out["accounts"][0]["name"], "Counter");
    assert_eq!(out["accounts"][1]["name"], "Owner");
    assert_eq!(out["accounts"][1]["isSigner"], true);
    assert_eq!(out["accounts"][2]["name"], Value::Null);
}

#[test]
fn format_human_output() {
    let idl = sample_idl();
    let hex = encode_set_state(json!("Idle"));
    let out = ixcodec(&["format", "--idl", idl.to_str().unwrap(), &hex]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("setState"));
    assert!(stdout.contains("state (State): Idle"));
}

#[test]
fn unknown_instruction_on_encode_fails() {
    let idl = sample_idl();
    let out = ixcodec(&["encode", "--idl", idl.to_str().unwrap(), "explode"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown instruction"));
}
