//! CLI Integration Tests
//!
//! Runs the `dashboard` binary with assert_cmd against workbooks in temp dirs.

// Binaries are not built with real mains during coverage runs
#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn dashboard() -> Command {
    let mut cmd = Command::cargo_bin("dashboard").unwrap();
    cmd.env_remove("DASHBOARD_WORKBOOK").env("NO_COLOR", "1");
    cmd
}

fn seeded(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("team.xlsx");
    dashboard()
        .args(["seed", "--file"])
        .arg(&path)
        .assert()
        .success();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    dashboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("dashboard"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    dashboard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_post_help_lists_recipient_forms() {
    dashboard()
        .args(["post", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RECIPIENTS"));
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKBOOK COMMANDS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_seed_then_sheets() {
    let dir = TempDir::new().unwrap();
    let path = seeded(&dir);

    dashboard()
        .args(["sheets", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Vendors (6 rows)"))
        .stdout(predicate::str::contains("Chat (13 rows)"));
}

#[test]
fn test_read_prints_json() {
    let dir = TempDir::new().unwrap();
    let path = seeded(&dir);

    let output = dashboard()
        .args(["read", "Vendors", "--file"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().unwrap().len(), 6);
    assert_eq!(rows[0]["Vendor ID"], "V001");
}

#[test]
fn test_read_with_date_column() {
    let dir = TempDir::new().unwrap();
    let path = seeded(&dir);

    // Seeded dates are text, which date normalization leaves alone
    dashboard()
        .args(["read", "Vendors", "--date", "Last Contact", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Last Contact\": \"2024-01-15\""));
}

#[test]
fn test_post_comma_and_mention_recipients() {
    let dir = TempDir::new().unwrap();
    let path = seeded(&dir);

    dashboard()
        .args(["post", "-u", "Amber", "-m", "Notes uploaded", "-r", "@Alyssa, Christa", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Amber, Alyssa, Christa"));

    dashboard()
        .args(["chat", "--user", "Christa", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Notes uploaded"));
}

#[test]
fn test_read_missing_sheet_fails() {
    let dir = TempDir::new().unwrap();
    let path = seeded(&dir);

    dashboard()
        .args(["read", "Active", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("SheetNotFound"));

    dashboard()
        .args(["read", "Active", "--optional", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_missing_workbook_fails() {
    let dir = TempDir::new().unwrap();

    dashboard()
        .args(["sheets", "--file"])
        .arg(dir.path().join("nope.xlsx"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("WorkbookNotFound"));
}

#[test]
fn test_post_then_chat_for_user() {
    let dir = TempDir::new().unwrap();
    let path = seeded(&dir);

    dashboard()
        .args(["post", "-u", "Donnie", "-m", "Amber starts Monday", "-r", "Amber", "-t", "DM", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Donnie, Amber"));

    dashboard()
        .args(["chat", "--user", "Amber", "--file"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Amber starts Monday"))
        .stdout(predicate::str::contains("Family meeting scheduled").not());
}

#[test]
fn test_check_reports_missing_active_sheet() {
    let dir = TempDir::new().unwrap();
    let path = seeded(&dir);

    dashboard()
        .args(["check", "--file"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Vendors (6 rows)"))
        .stdout(predicate::str::contains("Active sheet not found"));
}

#[test]
fn test_workbook_from_env() {
    let dir = TempDir::new().unwrap();
    let path = seeded(&dir);

    dashboard()
        .env("DASHBOARD_WORKBOOK", &path)
        .arg("sheets")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vendors"));
}
