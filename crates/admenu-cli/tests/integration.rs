#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn admenu(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("admenu").unwrap();
    cmd.current_dir(dir.path())
        .env("ADMENU_NO_SUDO", "true")
        .env_remove("ADMENU_SUDO")
        .env_remove("ADMENU_ZONEINFO")
        .env_remove("RUST_LOG");
    cmd
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[test]
fn exit_selector_ends_with_success() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Process management"))
        .stdout(predicate::str::contains("0. Exit"))
        .stdout(predicate::str::contains("Exiting."));
}

#[test]
fn end_of_input_ends_with_success() {
    let dir = TempDir::new().unwrap();
    admenu(&dir).write_stdin("").assert().success();
    admenu(&dir).write_stdin("abc\n").assert().success();
}

#[test]
fn menu_lists_every_group() {
    let dir = TempDir::new().unwrap();
    let assert = admenu(&dir).write_stdin("0\n").assert().success();
    let out = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for group in 1..=8 {
        assert!(out.contains(&format!("{group}. ")), "group {group} missing");
    }
    assert!(out.contains("   8.1  Find maximum in integer list"));
}

// ---------------------------------------------------------------------------
// Selector errors
// ---------------------------------------------------------------------------

#[test]
fn malformed_choice_is_reported_and_session_continues() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("abc\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid choice 'abc'"))
        .stdout(predicate::str::contains("Exiting."));
}

#[test]
fn unknown_item_is_a_sub_choice_error() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("1.9\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid sub-choice '1.9'"));
}

#[test]
fn unknown_group_is_a_choice_error() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("9.9\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid choice '9.9'"));
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

#[test]
fn non_numeric_pid_is_rejected() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("1.3\nabc\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid PID 'abc'"))
        .stdout(predicate::str::contains("Process terminated.").not());
}

#[test]
fn out_of_range_port_is_rejected() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("2.2\n70000\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid port 70000"));
}

#[test]
fn malformed_cron_schedule_is_rejected() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("5.2\n0 2 * *\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("invalid schedule"))
        .stdout(predicate::str::contains("Command:").not());
}

#[test]
fn empty_package_name_is_rejected() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("7.1\n\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("must not be empty"))
        .stdout(predicate::str::contains("Package installed.").not());
}

#[test]
fn unknown_timezone_is_rejected() {
    let dir = TempDir::new().unwrap();
    let zones = TempDir::new().unwrap();
    std::fs::write(zones.path().join("UTC"), b"TZif").unwrap();
    admenu(&dir)
        .arg("--zoneinfo")
        .arg(zones.path())
        .write_stdin("6.2\nMars/Olympus\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown timezone 'Mars/Olympus'"));
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

#[test]
fn find_max_reports_value_and_indices() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("8.1\n3,7,7,1\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Received 4 element(s): [3, 7, 7, 1]"))
        .stdout(predicate::str::contains("Maximum value found: 7"))
        .stdout(predicate::str::contains("Found at index/indices: [1, 2]"));
}

#[test]
fn find_max_rejects_more_than_sixteen_values() {
    let dir = TempDir::new().unwrap();
    let values = (1..=17).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
    admenu(&dir)
        .write_stdin(format!("8.1\n{values}\n0\n"))
        .assert()
        .success()
        .stdout(predicate::str::contains("exceeds maximum allowed size (16)"))
        .stdout(predicate::str::contains("Maximum value found").not());
}

#[cfg(unix)]
#[test]
fn create_file_makes_parent_directories() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .write_stdin("4.1\nnested/made.txt\n0\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("File created."));
    assert!(dir.path().join("nested/made.txt").is_file());
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[test]
fn list_prints_catalog_without_prompting() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("CHOICE"))
        .stdout(predicate::str::contains("renice"))
        .stdout(predicate::str::contains("8.1"))
        .stdout(predicate::str::contains("Enter your choice").not());
}

#[test]
fn version_flag() {
    let dir = TempDir::new().unwrap();
    admenu(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("admenu"));
}
