//! Result, ledger and pot formatters for terminal display.
//!
//! Pure functions: each takes engine values and returns a `String` or a
//! `serde_json::Value`, leaving the writing to the command handlers.
//!
//! ## Example
//!
//! ```rust
//! use potsettle_cli::formatters::format_position;
//! use potsettle_engine::player::Position;
//!
//! assert_eq!(format_position(Position::SmallBlind), "SB");
//! assert_eq!(format_position(Position::Other), "-");
//! ```

use potsettle_engine::engine::{HandState, Settlement};
use potsettle_engine::notation::format_action;
use potsettle_engine::payout::Distribution;
use potsettle_engine::player::{Player, Position};
use potsettle_engine::pot::Pot;
use serde_json::{Value, json};

/// Position label for tables; seats without one show `-`.
pub fn format_position(position: Position) -> &'static str {
    position.label().unwrap_or("-")
}

/// `Main Pot: 2200 [Ivy, Jon, Kai] (700-0)x3 + 100 dead`
pub fn format_pot(pot: &Pot) -> String {
    format!(
        "{}: {} [{}] {}",
        pot.name(),
        pot.amount,
        pot.eligible.join(", "),
        pot.formula
    )
}

/// The settlement report: total pot, every pot, then one row per player.
///
/// Without a distribution the winner, won and new-stack columns show `-`.
pub fn format_settlement(settlement: &Settlement, payout: Option<&Distribution>) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total Pot: {}\n", settlement.total_pot()));
    out.push_str("Pots:\n");
    for pot in settlement.pots() {
        out.push_str("  ");
        out.push_str(&format_pot(pot));
        out.push('\n');
    }
    out.push_str("Players:\n");
    out.push_str(&format!(
        "  {:<12} {:<6} {:>10} {:>10} {:>12} {:>7} {:>10} {:>10}\n",
        "Name", "Pos", "Start", "Final", "Contributed", "Winner", "Won", "New"
    ));
    for p in settlement.players() {
        let result = payout.and_then(|d| d.result(p.name()));
        let (winner, won, new_stack) = match result {
            Some(r) => (
                if r.is_winner { "yes" } else { "no" }.to_string(),
                r.won.to_string(),
                r.new_stack.to_string(),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };
        out.push_str(&format!(
            "  {:<12} {:<6} {:>10} {:>10} {:>12} {:>7} {:>10} {:>10}\n",
            p.name(),
            format_position(p.position()),
            p.starting_stack(),
            p.stack(),
            p.total_contribution(),
            winner,
            won,
            new_stack
        ));
    }
    out
}

pub fn settlement_json(settlement: &Settlement, payout: Option<&Distribution>) -> Value {
    let pots: Vec<Value> = settlement
        .pots()
        .iter()
        .map(|pot| {
            json!({
                "name": pot.name(),
                "amount": pot.amount,
                "eligible": pot.eligible,
                "contributors": pot.contributors,
                "formula": pot.formula,
            })
        })
        .collect();
    let players: Vec<Value> = settlement
        .players()
        .iter()
        .map(|p| {
            let result = payout.and_then(|d| d.result(p.name()));
            json!({
                "name": p.name(),
                "position": p.position().label(),
                "starting_stack": p.starting_stack(),
                "final_stack": p.stack(),
                "contributed": p.total_contribution(),
                "is_winner": result.map(|r| r.is_winner),
                "won": result.map(|r| r.won),
                "new_stack": result.map(|r| r.new_stack),
            })
        })
        .collect();
    json!({
        "hand": settlement.state().number(),
        "total_pot": settlement.total_pot(),
        "pots": pots,
        "players": players,
        "distributed": payout.map(|d| d.total_distributed()),
    })
}

fn format_ledger_row(p: &Player) -> String {
    let mut flags = Vec::new();
    if p.is_folded() {
        flags.push("folded");
    }
    if p.is_all_in() {
        flags.push("all-in");
    }
    if p.is_sitting_out() {
        flags.push("out");
    }
    let mut row = format!(
        "    {:<12} {:<6} stack {:>10} street {:>10} total {:>10}",
        p.name(),
        format_position(p.position()),
        p.stack(),
        p.street_contribution(),
        p.total_contribution()
    );
    if !flags.is_empty() {
        row.push_str(&format!(" ({})", flags.join(", ")));
    }
    row
}

/// Ledger snapshot printed by `replay`; `step` 0 is the state after the
/// forced bets.
pub fn format_replay_step(step: usize, state: &HandState) -> String {
    let mut out = match state.actions().last() {
        Some(last) if step > 0 => format!("[{}] {}\n", step, format_action(last)),
        _ => "[0] forced bets\n".to_string(),
    };
    for p in state.players() {
        out.push_str(&format_ledger_row(p));
        out.push('\n');
    }
    let status = if state.is_settleable() {
        "complete".to_string()
    } else {
        match state.next_to_act() {
            Some(p) => format!("{} to act, bet {}", p.name(), state.round().current_bet()),
            None => format!("{} betting closed", state.street()),
        }
    };
    out.push_str(&format!("    pot {}, {}\n", state.total_committed(), status));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use potsettle_engine::engine::settle_hand;
    use potsettle_engine::notation::parse_hand_file;
    use potsettle_engine::payout::{EvenSplit, distribute_winners};
    use potsettle_engine::rules::TableRules;

    const WALK: &str = "Hand (3)
SB 50 BB 100 Ante 100
Stack Setup:
Alice SB 1000
Bob BB 1000
Actions:
Preflop Alice fold
Winners:
Main Pot: Bob";

    #[test]
    fn settlement_report_lists_pots_and_rows() {
        let script = parse_hand_file(WALK).unwrap();
        let s = settle_hand(&script.setup, &script.actions, &TableRules::default()).unwrap();
        let d = distribute_winners(&s, &script.awards, &EvenSplit).unwrap();
        let text = format_settlement(&s, Some(&d));
        assert!(text.starts_with("Total Pot: 250\nPots:\n  Main Pot: 250 [Bob]"));
        assert!(text.contains("Alice"));
        let bob = text.lines().find(|l| l.trim_start().starts_with("Bob")).unwrap();
        assert!(bob.contains("yes"));
        assert!(bob.trim_end().ends_with("1050"));
    }

    #[test]
    fn settlement_json_has_null_payouts_without_winners() {
        let script = parse_hand_file(WALK).unwrap();
        let s = settle_hand(&script.setup, &script.actions, &TableRules::default()).unwrap();
        let v = settlement_json(&s, None);
        assert_eq!(v["total_pot"], 250);
        assert_eq!(v["pots"][0]["name"], "Main Pot");
        assert!(v["players"][0]["new_stack"].is_null());
        assert_eq!(v["players"][1]["position"], "BB");
    }
}
