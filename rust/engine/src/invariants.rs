//! Ledger and pot consistency checks.
//!
//! Every check returns the full list of violations it finds instead of
//! stopping at the first one.

use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::engine::HandState;
use crate::game::{busted_dealer, HandSetup};
use crate::logger::{HandRecord, Street};
use crate::order::first_to_act;
use crate::payout::Distribution;
use crate::player::{Chips, Player};
use crate::pot::{Pot, PotManager};
use crate::rules::TableRules;

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("{player}: stack {stack} != starting {starting} - contributed {contributed}")]
    StackMismatch {
        player: String,
        stack: Chips,
        starting: Chips,
        contributed: Chips,
    },
    #[error("{player}: contributed {contributed} exceeds starting stack {starting}")]
    OverCommitted {
        player: String,
        contributed: Chips,
        starting: Chips,
    },
    #[error("{player}: stack would be negative ({stack})")]
    NegativeStack { player: String, stack: i128 },
    #[error("pots total {pots} but contributions total {contributions}")]
    PotTotalMismatch { pots: Chips, contributions: Chips },
    #[error("{pot} eligibility is not a subset of {outer}")]
    EligibilityNotNested { pot: String, outer: String },
    #[error("{player} is eligible for {pot} but is not contesting it")]
    IneligibleWinner { pot: String, player: String },
    #[error("distributed {distributed} but the pot holds {pot_total}")]
    DistributionMismatch { distributed: Chips, pot_total: Chips },
    #[error("{player}: new stack {found}, expected {expected}")]
    NewStackMismatch {
        player: String,
        expected: Chips,
        found: Chips,
    },
    #[error("chips not conserved: {before} before, {after} after")]
    ChipsNotConserved { before: Chips, after: Chips },
    #[error("{player} is missing from the next hand")]
    MissingPlayer { player: String },
    #[error("{player} appears in the next hand but not in this one")]
    UnexpectedPlayer { player: String },
    #[error("first to act on the {street} should be {expected}, found {found}")]
    WrongFirstActor {
        street: Street,
        expected: String,
        found: String,
    },
    #[error("hand setup rejected: {reason}")]
    InvalidSetup { reason: String },
    #[error("action #{index} cannot be replayed: {reason}")]
    IllegalReplay { index: usize, reason: String },
    #[error("recorded ledger for {player} differs from the replay")]
    LedgerMismatch { player: String },
    #[error("recorded pots differ from the replay: {detail}")]
    PotMismatch { detail: String },
}

/// `stack == starting - contributed` and `contributed <= starting` per player.
pub fn check_ledger(players: &[Player]) -> Vec<Violation> {
    let mut out = Vec::new();
    for p in players {
        if p.total_contribution() > p.starting_stack() {
            out.push(Violation::OverCommitted {
                player: p.name().to_string(),
                contributed: p.total_contribution(),
                starting: p.starting_stack(),
            });
        }
        let expected = p.starting_stack() as i128 - p.total_contribution() as i128;
        if expected < 0 {
            out.push(Violation::NegativeStack {
                player: p.name().to_string(),
                stack: expected,
            });
        } else if p.stack() as i128 != expected {
            out.push(Violation::StackMismatch {
                player: p.name().to_string(),
                stack: p.stack(),
                starting: p.starting_stack(),
                contributed: p.total_contribution(),
            });
        }
    }
    out
}

/// Pot totals, nesting of eligible sets, and no folded player eligible.
pub fn check_pots(players: &[Player], pots: &[Pot]) -> Vec<Violation> {
    let mut out = Vec::new();
    let in_pots: Chips = pots.iter().map(|p| p.amount).sum();
    let contributed: Chips = players.iter().map(|p| p.total_contribution()).sum();
    if in_pots != contributed {
        out.push(Violation::PotTotalMismatch {
            pots: in_pots,
            contributions: contributed,
        });
    }
    for pair in pots.windows(2) {
        let outer: BTreeSet<&String> = pair[0].eligible.iter().collect();
        if !pair[1].eligible.iter().all(|n| outer.contains(n)) {
            out.push(Violation::EligibilityNotNested {
                pot: pair[1].name(),
                outer: pair[0].name(),
            });
        }
    }
    for pot in pots {
        for name in &pot.eligible {
            let contesting = players
                .iter()
                .any(|p| p.name() == name && p.is_contender());
            if !contesting {
                out.push(Violation::IneligibleWinner {
                    pot: pot.name(),
                    player: name.clone(),
                });
            }
        }
    }
    out
}

/// Payout total, per-player new stacks and overall chip conservation.
pub fn check_distribution(players: &[Player], pots: &[Pot], dist: &Distribution) -> Vec<Violation> {
    let mut out = Vec::new();
    let pot_total: Chips = pots.iter().map(|p| p.amount).sum();
    if dist.total_distributed() != pot_total {
        out.push(Violation::DistributionMismatch {
            distributed: dist.total_distributed(),
            pot_total,
        });
    }
    for p in players {
        let Some(r) = dist.result(p.name()) else {
            out.push(Violation::MissingPlayer {
                player: p.name().to_string(),
            });
            continue;
        };
        let expected = p.starting_stack() as i128 - p.total_contribution() as i128 + r.won as i128;
        if expected < 0 {
            out.push(Violation::NegativeStack {
                player: p.name().to_string(),
                stack: expected,
            });
        } else if r.new_stack as i128 != expected {
            out.push(Violation::NewStackMismatch {
                player: p.name().to_string(),
                expected: expected as Chips,
                found: r.new_stack,
            });
        }
    }
    let before: Chips = players.iter().map(|p| p.starting_stack()).sum();
    let after: Chips = dist.results().iter().map(|r| r.new_stack).sum();
    if before != after {
        out.push(Violation::ChipsNotConserved { before, after });
    }
    out
}

/// Same players (less a removed busted dealer), carried stacks, same chips.
pub fn check_next_hand(
    setup: &HandSetup,
    dist: &Distribution,
    next: &HandSetup,
    removed: Option<&str>,
) -> Vec<Violation> {
    let mut out = Vec::new();
    let current: BTreeSet<&str> = setup
        .seats
        .iter()
        .map(|s| s.name.as_str())
        .filter(|n| Some(*n) != removed)
        .collect();
    let following: BTreeSet<&str> = next.seats.iter().map(|s| s.name.as_str()).collect();
    for missing in current.difference(&following) {
        out.push(Violation::MissingPlayer {
            player: missing.to_string(),
        });
    }
    for extra in following.difference(&current) {
        out.push(Violation::UnexpectedPlayer {
            player: extra.to_string(),
        });
    }
    for s in &next.seats {
        if let Some(expected) = dist.new_stack(&s.name) {
            if expected != s.stack {
                out.push(Violation::NewStackMismatch {
                    player: s.name.clone(),
                    expected,
                    found: s.stack,
                });
            }
        }
    }
    let left_behind: Chips = removed.and_then(|n| dist.new_stack(n)).unwrap_or(0);
    let before = setup.total_chips();
    let after = next.total_chips() + left_behind;
    if before != after {
        out.push(Violation::ChipsNotConserved { before, after });
    }
    out
}

/// Replays a logged hand and checks it end to end.
///
/// Checks the ledger after every action, the first actor of each street,
/// the recorded ledger and pots against the replay, and the payouts and
/// next hand when present. An empty list means the record is consistent.
pub fn validate_record(record: &HandRecord, rules: &TableRules) -> Vec<Violation> {
    let mut out = Vec::new();

    out.extend(check_ledger(&record.ledger));
    out.extend(check_pots(&record.ledger, &record.pots));

    match HandState::start(&record.setup, rules) {
        Err(e) => out.push(Violation::InvalidSetup {
            reason: e.to_string(),
        }),
        Ok(mut state) => {
            let mut replayed = true;
            let mut last_street: Option<Street> = None;
            for (index, rec) in record.actions.iter().enumerate() {
                while state.street() < rec.street {
                    match state.advance_street() {
                        Ok(next) => state = next,
                        Err(_) => break,
                    }
                }
                if last_street != Some(rec.street) {
                    if let Some(seat) = first_to_act(state.players(), rec.street) {
                        let expected = state.players()[seat].name();
                        if state.street() == rec.street && expected != rec.player {
                            out.push(Violation::WrongFirstActor {
                                street: rec.street,
                                expected: expected.to_string(),
                                found: rec.player.clone(),
                            });
                        }
                    }
                    last_street = Some(rec.street);
                }
                match state.apply_record(rec) {
                    Ok(next) => {
                        out.extend(check_ledger(next.players()));
                        state = next;
                    }
                    Err(e) => {
                        out.push(Violation::IllegalReplay {
                            index,
                            reason: e.to_string(),
                        });
                        replayed = false;
                        break;
                    }
                }
            }

            if replayed {
                compare_ledgers(&record.ledger, state.players(), &mut out);
                let pots = PotManager::from_players(state.players()).into_pots();
                if pots != record.pots {
                    let detail = format!(
                        "{} recorded pot(s) totalling {}, replay gives {} totalling {}",
                        record.pots.len(),
                        record.pots.iter().map(|p| p.amount).sum::<Chips>(),
                        pots.len(),
                        pots.iter().map(|p| p.amount).sum::<Chips>()
                    );
                    out.push(Violation::PotMismatch { detail });
                }
            }
        }
    }

    if let Some(dist) = &record.payouts {
        out.extend(check_distribution(&record.ledger, &record.pots, dist));
        if let Some(next) = &record.next_hand {
            let removed = busted_dealer(&record.setup, rules);
            out.extend(check_next_hand(&record.setup, dist, next, removed));
        }
    }
    out
}

fn compare_ledgers(recorded: &[Player], replayed: &[Player], out: &mut Vec<Violation>) {
    for p in replayed {
        if recorded.iter().find(|r| r.name() == p.name()) != Some(p) {
            out.push(Violation::LedgerMismatch {
                player: p.name().to_string(),
            });
        }
    }
    for r in recorded {
        if !replayed.iter().any(|p| p.name() == r.name()) {
            out.push(Violation::LedgerMismatch {
                player: r.name().to_string(),
            });
        }
    }
}
