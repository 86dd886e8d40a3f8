// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use yare::parameterized;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("gsync").chain(args.iter().copied())).unwrap()
}

#[test]
fn global_flags_anywhere() {
    let cli = parse(&["status", "-o", "json", "-v", "--config", "/tmp/gsync.toml"]);
    assert_eq!(cli.output, OutputFormat::Json);
    assert!(cli.verbose);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/gsync.toml")));
    assert!(matches!(cli.command, Command::Status));
}

#[parameterized(
    groups = { "groups", BulkTarget::Groups },
    messages = { "messages", BulkTarget::Messages },
    all = { "all", BulkTarget::All },
)]
fn bulk_targets(arg: &str, expected: BulkTarget) {
    match parse(&["bulk", arg, "-n", "7"]).command {
        Command::Bulk { target, limit } => {
            assert_eq!(target, expected);
            assert_eq!(limit, Some(7));
        }
        _ => panic!("expected bulk"),
    }
}

#[parameterized(
    group = { "group", EntityType::Group },
    plural = { "threads", EntityType::Thread },
    upper = { "Message", EntityType::Message },
)]
fn sync_entity_types(arg: &str, expected: EntityType) {
    match parse(&["sync", arg, "42"]).command {
        Command::Sync { entity } => {
            assert_eq!(entity.entity_type, expected);
            assert_eq!(entity.id, 42);
        }
        _ => panic!("expected sync"),
    }
}

#[test]
fn bad_entity_type_is_rejected() {
    assert!(Cli::try_parse_from(["gsync", "sync", "user", "1"]).is_err());
    assert!(Cli::try_parse_from(["gsync", "inspect", "group", "abc"]).is_err());
}

#[test]
fn logs_defaults_and_filters() {
    match parse(&["logs"]).command {
        Command::Logs { entity_type, page } => {
            assert_eq!(entity_type, None);
            assert_eq!(page.limit, 50);
            assert_eq!(page.offset, 0);
        }
        _ => panic!("expected logs"),
    }
    match parse(&["logs", "-t", "message", "-n", "5", "--offset", "10"]).command {
        Command::Logs { entity_type, page } => {
            assert_eq!(entity_type, Some(EntityType::Message));
            assert_eq!(page.limit, 5);
            assert_eq!(page.offset, 10);
        }
        _ => panic!("expected logs"),
    }
}

#[test]
fn cleanup_days_optional() {
    assert!(matches!(parse(&["cleanup"]).command, Command::Cleanup { days: None }));
    assert!(matches!(
        parse(&["cleanup", "--days", "7"]).command,
        Command::Cleanup { days: Some(7) }
    ));
}

#[test]
fn only_watch_is_long_running() {
    assert!(parse(&["watch"]).command.is_long_running());
    assert!(!parse(&["test"]).command.is_long_running());
}
