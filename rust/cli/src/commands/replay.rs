//! Replay command handler.
//!
//! Applies a hand file's actions one at a time and prints the ledger after
//! each, stopping at the first action the engine refuses.

use std::io::Write;

use potsettle_engine::engine::HandState;
use potsettle_engine::notation::format_action;

use crate::error::CliError;
use crate::formatters::format_replay_step;

pub fn handle_replay_command(input: &str, out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = super::load_config()?;
    let rules = resolved.config.table_rules();
    let script = super::read_script(input)?;

    let mut state = HandState::start(&script.setup, &rules)?;
    writeln!(out, "Hand ({})", script.setup.number)?;
    write!(out, "{}", format_replay_step(0, &state))?;
    for (i, record) in script.actions.iter().enumerate() {
        state = state.apply_record(record).map_err(|e| {
            CliError::Engine(format!("action {} ({}): {}", i + 1, format_action(record), e))
        })?;
        write!(out, "{}", format_replay_step(i + 1, &state))?;
    }
    Ok(())
}
