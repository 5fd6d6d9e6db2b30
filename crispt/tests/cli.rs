//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

fn crispt() -> Command {
    Command::cargo_bin("crispt").expect("binary builds")
}

#[test]
fn preprocesses_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.src");
    std::fs::write(&input, "#define TWO 2\nTWO plus TWO\n").unwrap();

    crispt()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 plus 2"));
}

#[test]
fn define_flag_seeds_macros() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.src");
    std::fs::write(&input, "#ifdef FEATURE\nenabled\n#endif\n").unwrap();

    crispt()
        .arg(&input)
        .arg("-DFEATURE=1")
        .assert()
        .success()
        .stdout(predicate::str::contains("enabled"));
}

#[test]
fn include_dir_flag_resolves_base_includes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("lib.h"), "from_lib\n").unwrap();
    let input = dir.path().join("in.src");
    std::fs::write(&input, "#include <lib.h>\n").unwrap();

    crispt()
        .arg(&input)
        .arg("-I")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("from_lib"));
}

#[test]
fn output_flag_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.src");
    let output = dir.path().join("out.src");
    std::fs::write(&input, "token\n").unwrap();

    crispt().arg(&input).arg("-o").arg(&output).assert().success();
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "token");
}

#[test]
fn errors_fail_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.src");
    std::fs::write(&input, "#error nope\n").unwrap();

    crispt().arg(&input).assert().failure();
}

#[test]
fn keep_going_still_exits_nonzero_on_errors() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.src");
    std::fs::write(&input, "#bogus\nrest\n").unwrap();

    crispt()
        .arg(&input)
        .arg("--keep-going")
        .assert()
        .failure()
        .stderr(predicate::str::contains("bogus"));
}

#[test]
fn missing_input_fails() {
    crispt().arg("definitely_missing.src").assert().failure();
}
