use assert_cmd::Command;
use predicates::prelude::*;

fn write_unit(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn check_clean_file_succeeds_quietly() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_unit(&dir, "Clean.vsp", "class Clean {\n  int x\n}\n");
    Command::cargo_bin("vesper")
        .unwrap()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn check_broken_file_prints_framed_errors_and_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_unit(&dir, "Bad.vsp", "def x = \n");
    Command::cargo_bin("vesper")
        .unwrap()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("1. ERROR in Bad.vsp (at line 1)"))
        .stdout(predicate::str::contains("unexpected token: "));
}

#[test]
fn check_json_output_carries_spans() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_unit(&dir, "Bad.vsp", "def x = \n");
    let assert = Command::cargo_bin("vesper")
        .unwrap()
        .args(["check", "--output", "json"])
        .arg(&path)
        .assert()
        .failure();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed[0]["unit"], "Bad.vsp");
    assert_eq!(parsed[0]["unrecoverable"], false);
    assert_eq!(parsed[0]["diagnostics"][0]["line"], 1);
}

#[test]
fn decls_prints_canonical_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_unit(&dir, "Run.vsp", "def x = 1\n");
    Command::cargo_bin("vesper")
        .unwrap()
        .arg("decls")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "public class Run extends vesper.lang.Script {",
        ))
        .stdout(predicate::str::contains(
            "public @Override java.lang.Object run() {",
        ));
}

#[test]
fn unreadable_file_exits_with_io_error() {
    Command::cargo_bin("vesper")
        .unwrap()
        .args(["check", "no/such/File.vsp"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot read"));
}
