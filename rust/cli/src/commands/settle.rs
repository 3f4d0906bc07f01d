//! Settle command handler.
//!
//! Replays a hand file, partitions the pot and, when the file names its
//! winners, pays them out. Pots with a single eligible player need no
//! winner line.

use std::io::Write;

use potsettle_engine::engine::settle_hand;
use potsettle_engine::game::build_next_hand;
use potsettle_engine::payout::{EvenSplit, distribute_winners, with_uncontested};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::formatters::{format_settlement, settlement_json};
use crate::ui;

pub fn handle_settle_command(
    input: &str,
    format: OutputFormat,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let resolved = super::load_config()?;
    let rules = resolved.config.table_rules();
    let script = super::read_script(input)?;

    let settlement = settle_hand(&script.setup, &script.actions, &rules)?;
    let awards = with_uncontested(&settlement, &script.awards);
    let payout = if script.awards.is_empty() && awards.len() < settlement.pots().len() {
        ui::display_warning(err, "no Winners: section, payouts not computed")?;
        None
    } else {
        Some(distribute_winners(&settlement, &awards, &EvenSplit)?)
    };

    match format {
        OutputFormat::Text => {
            writeln!(out, "Hand ({})", script.setup.number)?;
            write!(out, "{}", format_settlement(&settlement, payout.as_ref()))?;
        }
        OutputFormat::Json => {
            let json = settlement_json(&settlement, payout.as_ref());
            let text = serde_json::to_string_pretty(&json).map_err(std::io::Error::other)?;
            writeln!(out, "{}", text)?;
        }
    }

    if let Some(path) = &resolved.config.hand_log {
        let next = payout
            .as_ref()
            .map(|d| build_next_hand(&script.setup, d, &rules))
            .transpose()?;
        let hand_id = super::append_hand_log(path, &script.setup, &settlement, payout, next)?;
        writeln!(err, "Logged {} to {}", hand_id, path)?;
    }
    Ok(())
}
