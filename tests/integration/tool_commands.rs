//! End-to-end tests for the `chatwire` subcommands.
//!
//! Exercises the full path from parsed CLI arguments through config
//! resolution to command output, without spawning a process.

use std::io::Write;

use chatwire::commands::{self, CommandError};
use chatwire::config::{CliArgs, ToolConfig};
use chatwire_proto::WireError;
use clap::Parser;

/// Parses `args` (without the program name), resolves config with an empty
/// config file and runs the command against `stdin`.
fn run(args: &[&str], stdin: &str) -> Result<commands::Report, CommandError> {
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    writeln!(config_file).unwrap();
    let path = config_file.path().to_str().unwrap().to_owned();

    let argv: Vec<&str> = ["chatwire", "--config", path.as_str()]
        .into_iter()
        .chain(args.iter().copied())
        .collect();
    let cli = CliArgs::try_parse_from(argv).unwrap();
    let config = ToolConfig::load(&cli.global).unwrap();
    commands::run(&cli.command, &config, stdin.as_bytes())
}

#[test]
fn encode_then_decode_send_request() {
    let json = r#"{"message":{"userName":"bob","content":"héllo 🎉"}}"#;
    let hex = run(&["encode", "-t", "SendMessageRequest", json], "").unwrap().output;
    let decoded = run(&["decode", "-t", "SendMessageRequest", &hex], "").unwrap().output;
    assert_eq!(decoded, json);
}

#[test]
fn encode_reads_stdin() {
    let report = run(&["encode", "--type", "chat.ConnectServerRequest"], r#"{"user_name":"alice"}"#)
        .unwrap();
    assert_eq!(report.output, "0a05616c696365");
}

#[test]
fn decode_output_options() {
    let report = run(
        &["decode", "-t", "Message", "--emit-defaults", "--proto-names", "1a0168"],
        "",
    )
    .unwrap();
    assert_eq!(report.output, r#"{"user_name":"","content":"h"}"#);
}

#[test]
fn decode_drop_unknown_is_silent_about_extra_fields() {
    // content "h" plus unknown field 9 (varint 1)
    let report = run(&["decode", "-t", "Message", "--drop-unknown", "1a01684801"], "").unwrap();
    assert_eq!(report.output, r#"{"content":"h"}"#);
}

#[test]
fn strict_flag_rejects_unknown_keys() {
    let json = r#"{"userName":"a","mood":"happy"}"#;
    assert!(run(&["encode", "-t", "Message", json], "").is_ok());
    let err = run(&["encode", "-t", "Message", "--strict", json], "").unwrap_err();
    assert!(matches!(
        err,
        CommandError::Wire(WireError::StrictUnknownField(ref key)) if key == "mood"
    ));
}

#[test]
fn compare_reports_difference_without_error() {
    let same = run(
        &["compare", "-t", "Message", r#"{"userName":"a"}"#, r#"{"user_name":"a","content":""}"#],
        "",
    )
    .unwrap();
    assert!(same.success);
    assert_eq!(same.output, "equal");

    let different = run(
        &["compare", "-t", "SendMessageRequest", "{}", r#"{"message":{}}"#],
        "",
    )
    .unwrap();
    assert!(!different.success);
    assert_eq!(different.output, "not equal");
}

#[test]
fn inspect_from_stdin() {
    let report = run(&["inspect"], "12 01 75 1a 01 63\n").unwrap();
    let lines: Vec<&str> = report.output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("field 2"));
    assert!(lines[1].contains("field 3"));
}

#[test]
fn decode_reports_invalid_utf8() {
    let err = run(&["decode", "-t", "Message", "1202c328"], "").unwrap_err();
    assert!(matches!(
        err,
        CommandError::Wire(WireError::InvalidUtf8 { field: "user_name" })
    ));
}

#[test]
fn types_lists_every_message() {
    let report = run(&["types"], "").unwrap();
    for name in ["chat.ConnectServerRequest", "chat.Message", "chat.SendMessageRequest"] {
        assert!(report.output.contains(name), "missing {name}");
    }
    assert!(report.output.contains("/chat.Chat/SendMessage"));
}
