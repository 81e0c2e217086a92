mod common;

use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use common::{is_symlink, seed_tree, snapshot, workspace};

/// Run the binary with stdin closed and a config path that does not exist.
fn dirlink(base: &Path, args: &[&str]) -> Output {
    let me = assert_cmd::cargo::cargo_bin!("dirlink");
    Command::new(me)
        .args(args)
        .env("DIRLINK_CONFIG", base.join("no-config.xml"))
        .stdin(Stdio::null())
        .output()
        .expect("spawn binary")
}

fn s(p: &Path) -> String {
    p.display().to_string()
}

#[test]
fn yes_relocates() {
    let (_td, base) = workspace();
    let src = seed_tree(&base);
    let dest = base.join("archive").join("big");

    let out = dirlink(&base, &[&s(&src), &s(&dest), "--yes"]);

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(is_symlink(&src));
    assert_eq!(fs::read_link(&src).unwrap(), dest);
    assert!(String::from_utf8_lossy(&out.stdout).contains("is a symlink to it"));
}

#[test]
fn into_flag_uses_destination_as_parent() {
    let (_td, base) = workspace();
    let src = seed_tree(&base);

    let out = dirlink(&base, &[&s(&src), &s(&base.join("archive")), "--into", "-y"]);

    assert!(out.status.success());
    assert_eq!(fs::read_link(&src).unwrap(), base.join("archive").join("big"));
}

#[test]
fn dry_run_changes_nothing() {
    let (_td, base) = workspace();
    let src = seed_tree(&base);
    let before = snapshot(&base);

    let out = dirlink(&base, &[&s(&src), &s(&base.join("archive").join("big")), "--dry-run"]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1. move:"), "stdout: {stdout}");
    assert!(stdout.contains("2. create symlink:"), "stdout: {stdout}");
    assert_eq!(snapshot(&base), before);
}

#[test]
fn non_terminal_without_yes_is_cancelled() {
    let (_td, base) = workspace();
    let src = seed_tree(&base);
    let before = snapshot(&base);

    let out = dirlink(&base, &[&s(&src), &s(&base.join("archive").join("big"))]);

    assert_eq!(out.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&out.stderr).contains("--yes"));
    assert_eq!(snapshot(&base), before);
}

#[test]
fn missing_source_exits_with_failure() {
    let (_td, base) = workspace();
    let out = dirlink(&base, &[&s(&base.join("nope")), &s(&base.join("dest")), "--yes"]);

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("validation failed: source missing"), "stderr: {stderr}");
    assert!(stderr.contains("nothing was moved"), "stderr: {stderr}");
}

#[test]
fn source_without_destination_is_a_usage_error() {
    let (_td, base) = workspace();
    let out = dirlink(&base, &[&s(&base)]);
    assert_eq!(out.status.code(), Some(2), "clap reports usage errors with 2");
}

#[test]
fn json_logs_are_json_lines() {
    let (_td, base) = workspace();
    let src = seed_tree(&base);
    let dest = base.join("archive").join("big");

    let out = dirlink(&base, &[&s(&src), &s(&dest), "--yes", "--json", "--log-level", "info"]);
    assert!(out.status.success());

    let stderr = String::from_utf8_lossy(&out.stderr);
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    assert!(!lines.is_empty(), "info level should log each step");
    for line in &lines {
        let v: serde_json::Value = serde_json::from_str(line)
            .unwrap_or_else(|e| panic!("not json ({e}): {line}"));
        assert!(v.get("level").is_some());
    }
    assert!(stderr.contains("symlink created"));
}

#[test]
fn session_on_stdin_reads_until_eof() {
    let (_td, base) = workspace();
    let out = dirlink(&base, &[]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("=== dirlink"));
}

#[test]
fn print_config_shows_the_env_path() {
    let (_td, base) = workspace();
    let out = dirlink(&base, &["--print-config"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("no-config.xml"));
}

#[test]
fn init_config_writes_once() {
    let (_td, base) = workspace();
    let cfg = base.join("conf").join("config.xml");
    let me = assert_cmd::cargo::cargo_bin!("dirlink");
    let run = || {
        Command::new(me)
            .arg("--init-config")
            .env("DIRLINK_CONFIG", &cfg)
            .stdin(Stdio::null())
            .output()
            .expect("spawn binary")
    };

    assert!(run().status.success());
    assert!(fs::read_to_string(&cfg).unwrap().contains("<create_parents>false</create_parents>"));
    assert_eq!(run().status.code(), Some(1), "an existing config is never overwritten");
}

#[test]
fn config_create_parents_is_honored() {
    let (_td, base) = workspace();
    let src = seed_tree(&base);
    let cfg = base.join("config.xml");
    fs::write(&cfg, "<config><create_parents>true</create_parents></config>").unwrap();
    let dest = base.join("cold").join("big");

    let me = assert_cmd::cargo::cargo_bin!("dirlink");
    let out = Command::new(me)
        .args([s(&src), s(&dest), "--yes".to_string()])
        .env("DIRLINK_CONFIG", &cfg)
        .stdin(Stdio::null())
        .output()
        .expect("spawn binary");

    assert!(out.status.success());
    assert!(dest.is_dir());
}
