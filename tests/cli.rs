use std::process::Command;
use tempfile::tempdir;

#[test]
fn test_missing_config_fails_with_single_error_report() {
    let dir = tempdir().unwrap();
    let bin = env!("CARGO_BIN_EXE_pulse_midi");

    let output = Command::new(bin)
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .args(["--log-format", "compact", "check-config"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run pulse_midi");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("loading config").count(), 1, "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_check_config_accepts_example() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pulse_midi.toml");
    std::fs::write(&path, include_str!("../pulse_midi.example.toml")).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_pulse_midi"))
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .output()
        .expect("failed to run pulse_midi");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("IAC Driver Bus 1"));
}
