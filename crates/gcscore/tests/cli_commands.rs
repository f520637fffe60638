#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/gcscore-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn gcscore(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gcscore"))
        .args(["--log-level", "error", "--format", "json"])
        .args(args)
        .output()
        .expect("gcscore should run")
}

fn json_stdout(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

#[test]
fn version_prints_package_version() {
    let output = gcscore(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("gcscore {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn encode_arm_outputs_command_long_frame() {
    let output = gcscore(&["encode", "arm", "--target-system", "7"]);
    assert!(output.status.success());

    let report = json_stdout(&output);
    assert_eq!(report["command_id"], 400);
    assert_eq!(report["target_system"], 7);
    assert_eq!(report["sequence"], 0);
    assert_eq!(report["len"], 41);

    let hex = report["hex"].as_str().expect("hex should be a string");
    // start, len 33, seq 0, sysid 255, compid 0, msgid 76
    assert!(hex.starts_with("fe2100ff004c"), "hex: {hex}");
}

#[test]
fn encoded_frame_decodes_back() {
    let dir = unique_temp_dir("roundtrip");
    let frame_path = dir.join("takeoff.bin");

    let encoded = gcscore(&[
        "encode",
        "takeoff",
        "--altitude",
        "15",
        "--out",
        frame_path.to_str().expect("utf-8 path"),
    ]);
    assert!(encoded.status.success());
    assert_eq!(std::fs::metadata(&frame_path).expect("frame file").len(), 41);

    let decoded = gcscore(&["decode", frame_path.to_str().expect("utf-8 path")]);
    assert!(decoded.status.success());
    let report = json_stdout(&decoded);
    assert_eq!(report["frames"][0]["message"], "COMMAND_LONG");
    assert_eq!(report["frames"][0]["system_id"], 255);
    assert_eq!(report["frames"][0]["verified"], true);
    assert_eq!(report["counters"]["frames_decoded"], 1);
}

#[test]
fn decode_hex_heartbeat_from_stdin_updates_state() {
    // HEARTBEAT from 1/1: custom_mode 0, type 2, autopilot 3, base_mode 0x84 (armed, auto)
    let mut payload = vec![0u8; 9];
    payload[4] = 2;
    payload[5] = 3;
    payload[6] = 0x84;
    payload[7] = 4;
    payload[8] = 3;
    let frame = gcscore_frame_bytes(0, 1, 1, 0, &payload, 50);
    let hex_text: Vec<String> = frame.iter().map(|b| format!("{b:02x}")).collect();

    let mut child = Command::new(env!("CARGO_BIN_EXE_gcscore"))
        .args(["--log-level", "error", "--format", "json", "decode", "-", "--hex"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(hex_text.join(" ").as_bytes())
        .expect("stdin write");
    let output = child.wait_with_output().expect("decode should finish");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let report = json_stdout(&output);
    assert_eq!(report["state"]["connected"], true);
    assert_eq!(report["state"]["armed"], true);
    assert_eq!(report["state"]["mode"], "AUTO");
    assert_eq!(report["counters"]["applied"], 1);
}

#[test]
fn decode_missing_file_returns_not_found() {
    let dir = unique_temp_dir("missing");
    let output = gcscore(&["decode", dir.join("absent.bin").to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(66));
}

#[test]
fn decode_invalid_hex_returns_data_invalid() {
    let dir = unique_temp_dir("badhex");
    let path = dir.join("capture.hex");
    std::fs::write(&path, "fe zz").expect("write capture");

    let output = gcscore(&["decode", path.to_str().expect("utf-8 path"), "--hex"]);
    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn telemetry_run_reports_samples() {
    let output = gcscore(&[
        "telemetry",
        "--duration",
        "300ms",
        "--interval",
        "10ms",
        "--count",
        "5",
    ]);
    assert!(output.status.success());

    let report = json_stdout(&output);
    assert_eq!(report["engine"]["running"], false);
    let total = report["stats"]["total"].as_u64().expect("total");
    assert!(total >= 1, "total: {total}");

    let batch = report["batch"].as_array().expect("batch array");
    assert!(!batch.is_empty() && batch.len() <= 5);
    let first = batch[0]["seq"].as_u64().expect("seq");
    if batch.len() > 1 {
        assert!(batch[1]["seq"].as_u64().expect("seq") < first);
    }
}

#[test]
fn telemetry_rejects_zero_capacity() {
    let output = gcscore(&["telemetry", "--capacity", "0", "--duration", "10ms"]);
    assert_eq!(output.status.code(), Some(64));
}

fn gcscore_frame_bytes(
    seq: u8,
    sysid: u8,
    compid: u8,
    msgid: u8,
    payload: &[u8],
    crc_extra: u8,
) -> Vec<u8> {
    let mut frame = vec![0xFE, payload.len() as u8, seq, sysid, compid, msgid];
    frame.extend_from_slice(payload);

    let mut crc: u16 = 0xFFFF;
    for &byte in frame[1..].iter().chain(std::iter::once(&crc_extra)) {
        let mut tmp = byte ^ (crc & 0xFF) as u8;
        tmp ^= tmp << 4;
        crc = (crc >> 8) ^ ((tmp as u16) << 8) ^ ((tmp as u16) << 3) ^ ((tmp as u16) >> 4);
    }
    frame.extend_from_slice(&crc.to_le_bytes());
    frame
}
