//! Tests for lifecycle, negative, check, and bad invocations.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;

#[test]
fn cli_parse_lifecycle() {
    match parse(&["petprobe", "lifecycle"]) {
        CliCommand::Lifecycle { keep_pets } => assert!(!keep_pets),
        _ => panic!("expected Lifecycle"),
    }
}

#[test]
fn cli_parse_lifecycle_keep_pets() {
    match parse(&["petprobe", "lifecycle", "--keep-pets"]) {
        CliCommand::Lifecycle { keep_pets } => assert!(keep_pets),
        _ => panic!("expected Lifecycle with --keep-pets"),
    }
}

#[test]
fn cli_parse_negative() {
    match parse(&["petprobe", "negative"]) {
        CliCommand::Negative { keep_pets } => assert!(!keep_pets),
        _ => panic!("expected Negative"),
    }
}

#[test]
fn cli_parse_check() {
    match parse(&["petprobe", "check"]) {
        CliCommand::Check => {}
        _ => panic!("expected Check"),
    }
}

#[test]
fn cli_parse_stability_defaults() {
    match parse(&["petprobe", "stability"]) {
        CliCommand::Stability {
            iterations,
            keep_pets,
        } => {
            assert_eq!(iterations, 10);
            assert!(!keep_pets);
        }
        _ => panic!("expected Stability"),
    }
}

#[test]
fn cli_parse_unknown_subcommand_fails() {
    assert!(Cli::try_parse_from(["petprobe", "download"]).is_err());
}

#[test]
fn cli_parse_bad_iterations_fails() {
    assert!(Cli::try_parse_from(["petprobe", "stability", "--iterations", "lots"]).is_err());
}
