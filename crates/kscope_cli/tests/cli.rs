use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use expect_test::expect;
use tempfile::{TempDir, tempdir};

fn write_source(dir: &TempDir, name: &str, source: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, source).unwrap();
    path
}

fn run(args: &[&Path]) -> std::process::Output {
    cargo_bin_cmd!("kscope")
        .args(args)
        .output()
        .expect("failed to execute kscope")
}

#[test]
fn test_missing_argument_is_usage_error() {
    let output = cargo_bin_cmd!("kscope").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Usage:"), "{stderr}");
}

#[test]
fn test_too_many_arguments_is_usage_error() {
    let output = cargo_bin_cmd!("kscope").args(["a.ks", "b.ks"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_compiles_and_dumps_module() {
    let dir = tempdir().unwrap();
    let input = write_source(
        &dir,
        "sample.ks",
        "extern sin(x)\ndef f(x) { x + 2.0 * 3.0 }\ncos(3.0)\nsin(5.0)\n",
    );

    let output = run(&[&input]);
    // Per-statement failures do not fail the run.
    assert_eq!(output.status.code(), Some(0));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert_eq!(stderr, "Error: unknown function referenced: 'cos'\n");

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("; ModuleID = 'sample'"), "{stdout}");
    assert!(stdout.contains("declare double @sin(double)"), "{stdout}");
    assert!(stdout.contains("%addtmp = fadd double %x, 6.000000e+00"), "{stdout}");
    assert!(stdout.contains("%calltmp = call double @sin(double 5.000000e+00)"), "{stdout}");
}

#[test]
fn test_output_file() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "lt.ks", "def lt(a b) a < b");
    let out = dir.path().join("lt.ll");

    let output = cargo_bin_cmd!("kscope")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());

    let ir = std::fs::read_to_string(&out).unwrap();
    assert!(ir.contains("%booltmp = uitofp i1 %cmptmp to double"), "{ir}");
}

#[test]
fn test_dump_ast() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "tree.ks", "def f(x) { x + 2.0 * 3.0 }");
    let out = dir.path().join("tree.ll");

    let output = cargo_bin_cmd!("kscope")
        .arg(&input)
        .arg("--dump-ast")
        .arg("-o")
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());

    expect![[r#"
        Program
        	Function
        		Prototype f(x)
        		Binary
        			Variable x
        			+
        			Binary
        				Number 2
        				*
        				Number 3
    "#]]
    .assert_eq(&String::from_utf8(output.stdout).unwrap());
}

#[test]
fn test_parse_error_exits_with_failure() {
    let dir = tempdir().unwrap();
    let input = write_source(&dir, "broken.ks", "def f(x { x }");

    let output = run(&[&input]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("parse error at line 1, column 9"), "{stderr}");
}

#[test]
fn test_missing_input_file() {
    let dir = tempdir().unwrap();
    let output = run(&[&dir.path().join("nope.ks")]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("file not found"), "{stderr}");
}
