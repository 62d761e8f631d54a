//! Integration tests for the i8080-disasm CLI.

use i8080_core as _;
use i8080_disasm as _;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use thiserror as _;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("i8080-disasm")
}

fn create_image(dir: &std::path::Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn prints_one_row_per_instruction() {
    let temp_dir = tempfile::tempdir().unwrap();
    // MVI A,5 ; MVI B,3 ; ADD B ; CALL 0x0200 ; HLT
    let image = create_image(
        temp_dir.path(),
        "add.bin",
        &[0x3E, 0x05, 0x06, 0x03, 0x80, 0xCD, 0x00, 0x02, 0x76],
    );

    let output = Command::new(binary_path())
        .arg(image.to_str().unwrap())
        .output()
        .expect("failed to run i8080-disasm");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        lines,
        [
            "0000 MVI\tA, #$05",
            "0002 MVI\tB, #$03",
            "0004 ADD\tB",
            "0005 CALL\t$0200",
            "0008 HLT",
        ]
    );
}

#[test]
fn origin_offsets_addresses() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = create_image(temp_dir.path(), "origin.bin", &[0x00, 0xC3, 0x00, 0x01]);

    let output = Command::new(binary_path())
        .args([image.to_str().unwrap(), "--origin", "0x0100"])
        .output()
        .expect("failed to run i8080-disasm");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "0100 NOP\n0101 JMP\t$0100\n");
}

#[test]
fn truncated_tail_becomes_data_bytes() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = create_image(temp_dir.path(), "tail.bin", &[0x76, 0x21, 0x34]);

    let output = Command::new(binary_path())
        .arg(image.to_str().unwrap())
        .output()
        .expect("failed to run i8080-disasm");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout, "0000 HLT\n0001 DB\t$21\n0002 DB\t$34\n");
}

#[test]
fn missing_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let missing = temp_dir.path().join("missing.bin");

    let output = Command::new(binary_path())
        .arg(missing.to_str().unwrap())
        .output()
        .expect("failed to run i8080-disasm");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("error:"));
    assert!(stderr.contains("missing.bin"));
}

#[test]
fn empty_file_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let image = create_image(temp_dir.path(), "empty.bin", &[]);

    let output = Command::new(binary_path())
        .arg(image.to_str().unwrap())
        .output()
        .expect("failed to run i8080-disasm");

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("is empty"));
}

#[test]
fn bad_arguments_fail_with_usage() {
    let output = Command::new(binary_path())
        .args(["--origin", "nothex"])
        .output()
        .expect("failed to run i8080-disasm");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.starts_with("error: invalid origin"));
    assert!(stderr.contains("Usage:"));
}

#[test]
fn no_arguments_fail() {
    let output = Command::new(binary_path())
        .output()
        .expect("failed to run i8080-disasm");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn help_prints_usage() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run i8080-disasm");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Usage: i8080-disasm"));
}
