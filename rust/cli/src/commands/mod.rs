//! Command handler modules for the potsettle CLI.
//!
//! Every command follows the same pattern:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Output streams (`&mut dyn Write`) passed in, so tests drive handlers in process
//! - Errors propagated via `CliError`; [`crate::run`] turns them into exit codes
//!
//! The helpers below are shared by the commands that read a hand file.

mod cfg;
mod next;
mod replay;
mod settle;
mod verify;

pub use cfg::handle_cfg_command;
pub use next::handle_next_command;
pub use replay::handle_replay_command;
pub use settle::handle_settle_command;
pub use verify::handle_verify_command;

use std::path::Path;

use potsettle_engine::engine::Settlement;
use potsettle_engine::errors::EngineError;
use potsettle_engine::game::HandSetup;
use potsettle_engine::logger::{HandLogger, HandRecord};
use potsettle_engine::notation::{HandScript, parse_hand_file};
use potsettle_engine::payout::Distribution;

use crate::config::{self, ConfigResolved};
use crate::error::CliError;
use crate::io_utils::{ensure_parent_dir, read_text_auto};

pub(crate) fn load_config() -> Result<ConfigResolved, CliError> {
    Ok(config::load_with_sources()?)
}

/// Reads and parses a hand file; parse errors name the file and line.
pub(crate) fn read_script(input: &str) -> Result<HandScript, CliError> {
    let text = read_text_auto(input)?;
    parse_hand_file(&text).map_err(|e| match e {
        EngineError::Validation(msg) => CliError::InvalidInput(format!("{}: {}", input, msg)),
        other => other.into(),
    })
}

/// Appends one JSONL trace to the configured hand log and returns its id.
///
/// Ids use today's date and the hand number, so re-settling a hand on the
/// same day produces the same id.
pub(crate) fn append_hand_log(
    path: &str,
    setup: &HandSetup,
    settlement: &Settlement,
    payout: Option<Distribution>,
    next: Option<HandSetup>,
) -> Result<String, CliError> {
    ensure_parent_dir(Path::new(path))?;
    let mut logger = HandLogger::append(path)?;
    let hand_id = logger.hand_id(setup.number);
    let record = HandRecord::from_settlement(hand_id.clone(), setup, settlement, payout, next);
    logger.write(&record)?;
    tracing::debug!(hand_id = %hand_id, path, "hand record appended");
    Ok(hand_id)
}
