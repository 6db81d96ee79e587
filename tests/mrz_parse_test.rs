#![cfg(feature = "cli")]

use std::io::Write;
use std::process::{Command, Output, Stdio};

const TD3_L1: &str = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<";
const TD3_L2: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<10";
const BAD_COMPOSITE: &str = "L898902C36UTO7408122F1204159ZE184226B<<<<<19";

fn mrz_parse(args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_mrz-parse"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_parses_lines_from_arguments() {
    let output = mrz_parse(&[TD3_L1, TD3_L2], "");
    assert!(output.status.success());

    let mrz = json(&output);
    assert_eq!(mrz["format"], "td3");
    assert_eq!(mrz["document_number"], "L898902C3");
    assert_eq!(mrz["given_names"], "ANNA MARIA");
}

#[test]
fn test_reads_stdin_without_arguments() {
    let output = mrz_parse(&[], &format!("{}\n{}\n", TD3_L1, TD3_L2));
    assert!(output.status.success());
    assert_eq!(json(&output)["surname"], "ERIKSSON");
}

#[test]
fn test_bad_check_digit_needs_relaxed() {
    let strict = mrz_parse(&[TD3_L1, BAD_COMPOSITE], "");
    assert!(!strict.status.success());
    assert!(String::from_utf8_lossy(&strict.stderr).contains("could not parse MRZ"));

    let relaxed = mrz_parse(&["--relaxed", TD3_L1, BAD_COMPOSITE], "");
    assert!(relaxed.status.success());
    assert_eq!(json(&relaxed)["checks"]["composite"], false);
}
