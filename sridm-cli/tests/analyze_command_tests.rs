//! Integration tests for `sridm file` and `sridm feed`.
//!
//! Runs the built binary against capture files and recorded feed sessions.

use std::fs;
use std::process::{Command, Output};

use tempfile::TempDir;

const CAPTURE: &str = r#"1001 2024/05/14 09:12:01.100 UTC MINOR: DEBUG #2001 Base IPsec
"IPsec(1): IKEv2 Packet Received
Source: 10.0.0.1[500]
Destination: 172.100.100.254[500]
IKEv2 Identification - initiator payload
   Next Payload: AUTH
   Payload Length: 15
   ID Type: ID_FQDN
   ID Data: client1
"

1002 2024/05/14 09:12:01.101 UTC MINOR: DEBUG #2001 Base IPsec
"IPsec(1): IKEv2 Packet Received
[...IKE message continuation]
   Certificate Data: 30 82 03 1b
"

1003 2024/05/14 09:12:01.200 UTC MINOR: DEBUG #2001 Base IPsec
"IPsec(1): IKEv2 Packet Received
Source: 2001:beef::100[4500]
IKEv2 Identification - initiator payload
   Next Payload: AUTH
   Payload Length: 12
   ID Type: ID_FQDN
   ID Data: segw-2
"

1004 2024/05/14 09:12:01.300 UTC MINOR: DEBUG #2001 Base IPsec
"IPsec(1): unrelated housekeeping
"

"#;

fn sridm(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sridm"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("should run sridm binary")
}

fn with_capture(content: &str) -> TempDir {
    let dir = TempDir::new().expect("should create temp dir");
    fs::write(dir.path().join("capture.log"), content).expect("should write capture");
    dir
}

#[test]
fn test_file_default_reports_all_endpoints() {
    let dir = with_capture(CAPTURE);

    let out = sridm(&dir, &["file", "-i", "capture.log"]);

    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "Found following matched tunnel EPs:\n\
         2 matched out of total 2\n\
         IDi 'client1' ==>  10.0.0.1:500\n\
         IDi 'segw-2' ==>  [2001:beef::100]:4500\n\n"
    );
}

#[test]
fn test_file_messages_for_matched_idi() {
    let dir = with_capture(CAPTURE);

    let out = sridm(&dir, &["-d", "client", "-e=false", "-m", "file", "-i", "capture.log"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(!stdout.contains("Found following"));
    assert!(stdout.starts_with("1001 2024-05-14 09:12:01.100\n1001 2024/05/14"));
    assert!(stdout.contains("1002 2024-05-14 09:12:01.101\n"));
    assert!(!stdout.contains("1003 "));
    assert!(!stdout.contains("housekeeping"));
    assert_eq!(stdout.matches("-------\n").count(), 2);
}

#[test]
fn test_file_zero_matches_exits_success() {
    let dir = with_capture(CAPTURE);

    let out = sridm(&dir, &["--idi", "nobody", "file", "-i", "capture.log"]);

    assert!(out.status.success(), "zero matches is not an error");
    assert!(String::from_utf8_lossy(&out.stdout).contains("0 matched out of total 2"));
}

#[test]
fn test_file_invalid_pattern_exit_code() {
    let dir = with_capture(CAPTURE);

    let out = sridm(&dir, &["-d", "client(1", "file", "-i", "capture.log"]);

    assert_eq!(out.status.code(), Some(3));
    assert!(out.stdout.is_empty());
}

#[test]
fn test_file_malformed_header_exit_code() {
    let broken = format!("{CAPTURE}1005 14/05/2024 09:12 UTC MINOR: DEBUG #2001 Base IPsec\n");
    let dir = with_capture(&broken);

    let out = sridm(&dir, &["file", "-i", "capture.log"]);

    assert_eq!(out.status.code(), Some(4), "fatal extraction error");
    assert!(out.stdout.is_empty(), "no report after a fatal error");
    assert!(String::from_utf8_lossy(&out.stderr).contains("extraction failed"));
}

#[test]
fn test_file_missing_input_exit_code() {
    let dir = TempDir::new().expect("should create temp dir");

    let out = sridm(&dir, &["file", "-i", "absent.log"]);

    assert_eq!(out.status.code(), Some(10));
}

#[test]
fn test_file_uses_config_pattern() {
    let dir = with_capture(CAPTURE);
    fs::write(
        dir.path().join("sridm.toml"),
        "[analyzer]\nidi_pattern = \"^segw\"\n",
    )
    .expect("should write config");

    let out = sridm(&dir, &["file", "-i", "capture.log"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 matched out of total 2"));
    assert!(stdout.contains("IDi 'segw-2'"));
}

#[test]
fn test_file_json_output() {
    let dir = with_capture(CAPTURE);

    let out = sridm(&dir, &["--output", "json", "-m", "-d", "segw", "file", "-i", "capture.log"]);

    assert!(out.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout should be JSON");
    assert_eq!(parsed["total_messages"].as_u64(), Some(4));
    assert_eq!(parsed["matched_identities"].as_u64(), Some(1));
    assert_eq!(
        parsed["endpoints"][0]["endpoint"].as_str(),
        Some("[2001:beef::100]:4500")
    );
    assert_eq!(parsed["messages"][0]["id"].as_u64(), Some(1003));
}

#[test]
fn test_feed_replay_reports_matches() {
    let dir = TempDir::new().expect("should create temp dir");
    let events = [
        serde_json::json!({
            "event-time": "2024-05-14T09:12:01.100Z",
            "sequence-number": 11,
            "severity": "minor",
            "application": "debug",
            "event-id": 2001,
            "router-name": "Base",
            "subject": "IPsec",
            "message": "IPsec(1): IKEv2 Packet Received\nSource: 10.9.9.9[500]\nIKEv2 Identification - initiator payload\n   Next Payload: AUTH\n   Payload Length: 10\n   ID Type: ID_FQDN\n   ID Data: feedpeer\n",
        }),
        serde_json::json!({
            "event-time": "2024-05-14T09:12:01.200Z",
            "sequence-number": 12,
            "severity": "minor",
            "application": "debug",
            "event-id": 2001,
            "router-name": "Base",
            "subject": "IPsec",
            "message": "IPsec(1): CHILD_SA installed for 10.9.9.9[500]\n",
        }),
    ];
    let mut recording = String::new();
    for event in &events {
        recording.push_str(&event.to_string());
        recording.push('\n');
    }
    recording.push_str("{not a record}\n");
    let mut recording = recording.into_bytes();
    recording.extend_from_slice(b"{\"message\": \"caf\xE9\"}\n");
    fs::write(dir.path().join("session.jsonl"), recording).expect("should write recording");

    let out = sridm(&dir, &["-m", "feed", "session.jsonl", "-r", "10.0.0.254:830"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 matched out of total 1"));
    assert!(stdout.contains("IDi 'feedpeer' ==>  10.9.9.9:500"));
    assert!(stdout.contains("\n11 2024-05-14 09:12:01.100\n"));
    assert!(stdout.contains("\n12 2024-05-14 09:12:01.200\n"));
}

#[test]
fn test_feed_missing_recording_exit_code() {
    let dir = TempDir::new().expect("should create temp dir");

    let out = sridm(&dir, &["feed", "absent.jsonl"]);

    assert_eq!(out.status.code(), Some(10));
}
