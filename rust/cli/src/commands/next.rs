//! Next command handler.
//!
//! Settles a hand file, pays its winners and prints the following hand in
//! the same `Hand (N)` text format, ready to be extended with actions and
//! fed back into `settle`.

use std::io::Write;

use potsettle_engine::engine::settle_hand;
use potsettle_engine::game::build_next_hand;
use potsettle_engine::payout::{EvenSplit, distribute_winners, with_uncontested};

use crate::error::CliError;
use crate::ui;

pub fn handle_next_command(
    input: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved = super::load_config()?;
    let rules = resolved.config.table_rules();
    let script = super::read_script(input)?;

    let settlement = settle_hand(&script.setup, &script.actions, &rules)?;
    let awards = with_uncontested(&settlement, &script.awards);
    let payout = distribute_winners(&settlement, &awards, &EvenSplit)?;
    let next = build_next_hand(&script.setup, &payout, &rules)?;

    if script.setup.ended_at.is_none() {
        ui::display_warning(
            err,
            "ended_at is open, the next hand starts at the previous start time",
        )?;
    }
    writeln!(out, "{}", next)?;

    if let Some(path) = &resolved.config.hand_log {
        let hand_id =
            super::append_hand_log(path, &script.setup, &settlement, Some(payout), Some(next))?;
        writeln!(err, "Logged {} to {}", hand_id, path)?;
    }
    Ok(())
}
