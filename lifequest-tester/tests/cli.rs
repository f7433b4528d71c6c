use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "lifequest-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_lifequest-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("persistence"));
}

#[test]
fn cli_runs_all_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_lifequest-tester");
    let output_path = temp_path("run");
    let data_dir = temp_path("profiles");
    let output = Command::new(exe)
        .args([
            "--scenarios",
            "all",
            "--seeds",
            "1,2",
            "--iterations",
            "2",
            "--report",
            "json",
            "--data-dir",
        ])
        .arg(&data_dir)
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("LifeQuest Scenario Tester"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_path).expect("read report"))
            .expect("json report");
    let runs = report.as_array().expect("array of results");
    assert_eq!(runs.len(), 10);
    assert!(runs.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_rejects_missing_rules_file() {
    let exe = env!("CARGO_BIN_EXE_lifequest-tester");
    let output = Command::new(exe)
        .args(["--rules", "/no/such/rules.json", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("rule book failed to load"));
}
