//! Integration tests for the controller commands and their exit codes.

#[path = "common/mod.rs"]
mod common;

use std::{fs, io::Write, thread, time::Duration};

use assert_cmd::Command;
use common::{BIN, pid_path, spawn_daemon, wait_for_claim, wait_for_content, wait_for_exit};
use predicates::str::contains;
use tempfile::tempdir;

#[test]
fn reopen_directs_later_lines_to_a_fresh_file() {
    let temp = tempdir().expect("failed to create tempdir");
    let target = temp.path().join("a.log");
    let rotated = temp.path().join("a.log.1");

    let mut daemon = spawn_daemon(&target);
    let mut stdin = daemon.stdin.take().expect("daemon stdin missing");
    wait_for_claim(&target, &daemon);

    stdin.write_all(b"one\n").expect("write to daemon");
    wait_for_content(&target, "one\n");

    fs::rename(&target, &rotated).expect("rotate log");

    Command::new(BIN)
        .arg(&target)
        .arg("reopen")
        .assert()
        .success();

    stdin.write_all(b"two\n").expect("write to daemon");
    wait_for_content(&target, "two\n");
    assert_eq!(fs::read_to_string(&rotated).expect("read rotated"), "one\n");

    drop(stdin);
    let status = wait_for_exit(&mut daemon, Duration::from_secs(10));
    assert_eq!(status.code(), Some(0));
}

#[test]
fn reopen_without_pid_file_exits_2() {
    let temp = tempdir().expect("failed to create tempdir");
    let target = temp.path().join("a.log");

    Command::new(BIN)
        .arg(&target)
        .arg("reopen")
        .assert()
        .code(2)
        .stderr(contains("could not find"));
}

#[test]
fn reopen_with_stale_pid_file_exits_1() {
    let temp = tempdir().expect("failed to create tempdir");
    let target = temp.path().join("a.log");
    fs::write(pid_path(&target), "99999999\n").expect("write stale pid");

    Command::new(BIN)
        .arg(&target)
        .arg("reopen")
        .assert()
        .code(1)
        .stderr(contains("no such instance"));
}

#[test]
fn reopen_with_corrupt_pid_file_exits_1() {
    let temp = tempdir().expect("failed to create tempdir");
    let target = temp.path().join("a.log");
    fs::write(pid_path(&target), "not-a-pid\n").expect("write corrupt pid");

    Command::new(BIN)
        .arg(&target)
        .arg("reopen")
        .assert()
        .code(1)
        .stderr(contains("does not contain a process id"));
}

#[test]
fn stop_terminates_a_running_instance() {
    let temp = tempdir().expect("failed to create tempdir");
    let target = temp.path().join("a.log");

    let mut daemon = spawn_daemon(&target);
    let _stdin = daemon.stdin.take().expect("daemon stdin missing");
    wait_for_claim(&target, &daemon);

    // Reap the daemon as soon as it dies so the controller's liveness
    // probes see it gone rather than as a zombie.
    let reaper = thread::spawn(move || daemon.wait());

    Command::new(BIN)
        .arg(&target)
        .arg("stop")
        .timeout(Duration::from_secs(15))
        .assert()
        .success();

    let status = reaper
        .join()
        .expect("reaper panicked")
        .expect("failed to reap daemon");
    // Terminate requests end the loop cleanly; stdin was still open.
    assert_eq!(status.code(), Some(0));
}

#[test]
fn wait_blocks_until_the_instance_exits() {
    let temp = tempdir().expect("failed to create tempdir");
    let target = temp.path().join("a.log");

    let mut daemon = spawn_daemon(&target);
    let stdin = daemon.stdin.take().expect("daemon stdin missing");
    wait_for_claim(&target, &daemon);
    let reaper = thread::spawn(move || daemon.wait());

    let mut waiter = std::process::Command::new(BIN)
        .arg(&target)
        .arg("wait")
        .spawn()
        .expect("failed to spawn waiter");

    // The instance is alive, so the waiter keeps polling.
    thread::sleep(Duration::from_millis(1500));
    assert!(
        waiter.try_wait().expect("poll waiter").is_none(),
        "wait returned while the instance was still running"
    );

    drop(stdin);
    reaper
        .join()
        .expect("reaper panicked")
        .expect("failed to reap daemon");

    // One poll interval after the exit, the waiter comes back.
    let status = wait_for_exit(&mut waiter, Duration::from_secs(5));
    assert_eq!(status.code(), Some(0));
}

#[test]
fn waitkill_with_stale_pid_file_exits_1() {
    let temp = tempdir().expect("failed to create tempdir");
    let target = temp.path().join("a.log");
    fs::write(pid_path(&target), "99999999\n").expect("write stale pid");

    Command::new(BIN)
        .arg(&target)
        .arg("waitkill")
        .assert()
        .code(1)
        .stderr(contains("no such instance"));
}
