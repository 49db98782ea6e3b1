//! CLI integration tests

use std::process::Command;

fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "wlc-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = run_cli(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Workload Console"), "Should show app name");
    assert!(stdout.contains("apps"), "Should show apps command");
    assert!(stdout.contains("get"), "Should show get command");
    assert!(stdout.contains("scale"), "Should show scale command");
    assert!(stdout.contains("health"), "Should show health command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = run_cli(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("wlc"), "Should show binary name");
}

/// Test get subcommand help lists every resource
#[test]
fn test_get_help() {
    let output = run_cli(&["get", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "get help should succeed");
    assert!(stdout.contains("deployments"));
    assert!(stdout.contains("statefulsets"));
    assert!(stdout.contains("pods"));
    assert!(stdout.contains("namespaces"));
}

/// Test scale subcommand help
#[test]
fn test_scale_help() {
    let output = run_cli(&["scale", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "scale help should succeed");
    assert!(stdout.contains("--replicas"), "Should show replicas option");
    assert!(stdout.contains("--app"), "Should show app option");
    assert!(stdout.contains("--kind"), "Should show kind option");
    assert!(stdout.contains("--name"), "Should show name option");
}

/// Test that scale needs a target before any request is made
#[test]
fn test_scale_requires_target() {
    let output = run_cli(&["scale", "--replicas", "2"]);
    assert!(!output.status.success(), "scale without a target should fail");
}

/// Test that application and single-resource targets are mutually exclusive
#[test]
fn test_scale_rejects_mixed_targets() {
    let output = run_cli(&[
        "scale",
        "--replicas",
        "2",
        "--app",
        "checkout",
        "--name",
        "checkout-api",
        "--kind",
        "deployment",
    ]);
    assert!(!output.status.success(), "mixed targets should fail");
}

/// Test that a negative replica count is rejected by argument parsing
#[test]
fn test_scale_rejects_negative_replicas() {
    let output = run_cli(&["scale", "--replicas=-1", "--app", "checkout"]);
    assert!(!output.status.success(), "negative replicas should fail");
}
