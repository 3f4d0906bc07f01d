//! # potsettle CLI Library
//!
//! Command-line host for the potsettle engine. It reads hand files in the
//! `Hand (N)` text format, calls the engine's settle, distribute and
//! next-hand operations, and prints the results.
//!
//! ## Main Entry Point
//!
//! [`run`] parses arguments and dispatches to a subcommand, writing to the
//! streams it is given so tests can capture both.
//!
//! ## Available Subcommands
//!
//! - `settle`: Settle a hand file and print pots and per-player results
//! - `next`: Print the following hand in the same text format
//! - `replay`: Print the ledger after every action
//! - `verify`: Check every record of a JSONL hand log
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::Write;

pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod logging;
pub mod ui;

use cli::{Commands, PotsettleCli};
use commands::{
    handle_cfg_command, handle_next_command, handle_replay_command, handle_settle_command,
    handle_verify_command,
};

pub use error::{BatchValidationError, CliError};

const COMMANDS: &[&str] = &["settle", "next", "replay", "verify", "cfg"];

/// Main entry point for the CLI application.
///
/// # Returns
///
/// Exit code: [`exit_code::SUCCESS`] or [`exit_code::ERROR`].
///
/// # Example
///
/// ```
/// let mut out = Vec::new();
/// let mut err = Vec::new();
/// let code = potsettle_cli::run(["potsettle", "cfg"], &mut out, &mut err);
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match PotsettleCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => return usage_error(e, out, err),
    };

    let result = match cli.cmd {
        Commands::Settle { input, format } => handle_settle_command(&input, format, out, err),
        Commands::Next { input } => handle_next_command(&input, out, err),
        Commands::Replay { input } => handle_replay_command(&input, out),
        Commands::Verify { input } => match input {
            Some(path) => handle_verify_command(&path, out, err),
            None => Err(CliError::InvalidInput("input required".into())),
        },
        Commands::Cfg => handle_cfg_command(out),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn usage_error(e: clap::Error, out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    use clap::error::ErrorKind;

    // Help and version go to stdout and succeed
    if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
        return match write!(out, "{}", e) {
            Ok(()) => exit_code::SUCCESS,
            Err(_) => exit_code::ERROR,
        };
    }
    let _ = writeln!(err, "{}", e);
    let _ = writeln!(err, "Usage: potsettle <command> [options]\n");
    let _ = writeln!(err, "Commands:");
    for c in COMMANDS {
        let _ = writeln!(err, "  {}", c);
    }
    let _ = writeln!(err, "\nFor full help, run: potsettle --help");
    exit_code::ERROR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subcommand_parses() {
        let commands = vec![
            vec!["potsettle", "settle", "--input", "hand.txt"],
            vec!["potsettle", "settle", "--input", "hand.txt", "--format", "json"],
            vec!["potsettle", "next", "--input", "hand.txt"],
            vec!["potsettle", "replay", "--input", "hand.txt"],
            vec!["potsettle", "verify", "--input", "hands.jsonl"],
            vec!["potsettle", "cfg"],
        ];
        for args in commands {
            assert!(PotsettleCli::try_parse_from(&args).is_ok(), "{:?}", args);
        }
    }

    #[test]
    fn command_list_matches_the_enum() {
        for name in COMMANDS {
            let mut argv = vec!["potsettle", name];
            if *name != "cfg" {
                argv.extend(["--input", "x"]);
            }
            assert!(PotsettleCli::try_parse_from(&argv).is_ok(), "{}", name);
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let parsed =
            PotsettleCli::try_parse_from(["potsettle", "settle", "--input", "a", "--format", "csv"]);
        assert!(parsed.is_err());
    }
}
