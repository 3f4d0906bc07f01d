use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

use crate::engine::Settlement;
use crate::errors::{EngineError, EngineResult};
use crate::invariants::{self, Violation};
use crate::order::{button_seat, clockwise_after};
use crate::player::{Chips, Position};
use crate::pot::Pot;

/// Externally decided winners of one pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotAward {
    pub pot: String,
    pub winners: Vec<String>,
}

impl PotAward {
    pub fn new(pot: impl Into<String>, winners: &[&str]) -> Self {
        Self {
            pot: pot.into(),
            winners: winners.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Adds an award for every pot with a single eligible player that `awards`
/// does not already name.
pub fn with_uncontested(settlement: &Settlement, awards: &[PotAward]) -> Vec<PotAward> {
    let mut out = awards.to_vec();
    for pot in settlement.pots() {
        let named = awards.iter().any(|a| a.pot.eq_ignore_ascii_case(&pot.name()));
        if !named && pot.eligible.len() == 1 {
            out.push(PotAward {
                pot: pot.name(),
                winners: pot.eligible.clone(),
            });
        }
    }
    out
}

/// How a pot is divided among tied winners.
///
/// `winners` arrive in payout order: seat order starting left of the
/// button. The returned amounts line up with `winners` and must sum to
/// `amount`.
pub trait SplitPolicy {
    fn split(&self, amount: Chips, winners: &[&str]) -> Vec<Chips>;
}

/// Equal shares; odd chips go one at a time to the earliest winners.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenSplit;

impl SplitPolicy for EvenSplit {
    fn split(&self, amount: Chips, winners: &[&str]) -> Vec<Chips> {
        let k = winners.len() as Chips;
        if k == 0 {
            return Vec::new();
        }
        let base = amount / k;
        let odd = amount % k;
        (0..k).map(|i| base + Chips::from(i < odd)).collect()
    }
}

/// Chips one winner took from one pot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotShare {
    pub pot: String,
    pub player: String,
    pub amount: Chips,
}

/// Result row for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub name: String,
    pub position: Position,
    pub starting_stack: Chips,
    /// Stack after contributions, before winnings
    pub final_stack: Chips,
    pub contributed: Chips,
    pub won: Chips,
    pub new_stack: Chips,
    pub is_winner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    results: Vec<PlayerResult>,
    total_pot: Chips,
    shares: Vec<PotShare>,
}

impl Distribution {
    pub fn results(&self) -> &[PlayerResult] {
        &self.results
    }
    pub fn total_pot(&self) -> Chips {
        self.total_pot
    }
    pub fn shares(&self) -> &[PotShare] {
        &self.shares
    }
    pub fn total_distributed(&self) -> Chips {
        self.shares.iter().map(|s| s.amount).sum()
    }
    pub fn result(&self, name: &str) -> Option<&PlayerResult> {
        self.results.iter().find(|r| r.name == name)
    }
    pub fn new_stack(&self, name: &str) -> Option<Chips> {
        self.result(name).map(|r| r.new_stack)
    }
}

fn find_pot<'a>(pots: &'a [Pot], name: &str) -> Option<&'a Pot> {
    pots.iter().find(|p| p.name().eq_ignore_ascii_case(name.trim()))
}

/// Pays every pot to its declared winners and computes new stacks.
///
/// `new_stack = starting_stack - total_contribution + winnings`.
///
/// # Errors
///
/// [`EngineError::Validation`] when a pot is unknown, awarded twice, left
/// without an award, or given an empty, duplicated or ineligible winner.
/// [`EngineError::SettlementInvariant`] when the payout does not add up.
pub fn distribute_winners(
    settlement: &Settlement,
    awards: &[PotAward],
    policy: &dyn SplitPolicy,
) -> EngineResult<Distribution> {
    let players = settlement.players();
    let pots = settlement.pots();

    let mut seen = HashSet::new();
    for award in awards {
        let pot = find_pot(pots, &award.pot)
            .ok_or_else(|| EngineError::validation(format!("unknown pot: {}", award.pot)))?;
        if !seen.insert(pot.name()) {
            return Err(EngineError::validation(format!("{} awarded twice", pot.name())));
        }
        if award.winners.is_empty() {
            return Err(EngineError::validation(format!("no winners named for {}", pot.name())));
        }
        let mut named = HashSet::new();
        for w in &award.winners {
            if !named.insert(w.as_str()) {
                return Err(EngineError::validation(format!(
                    "{} listed twice for {}",
                    w,
                    pot.name()
                )));
            }
            if !pot.is_eligible(w) {
                return Err(EngineError::validation(format!(
                    "{} is not eligible for {}",
                    w,
                    pot.name()
                )));
            }
        }
    }
    if let Some(missing) = pots.iter().find(|p| !seen.contains(&p.name())) {
        return Err(EngineError::validation(format!("no winner for {}", missing.name())));
    }

    let payout_order: Vec<usize> = clockwise_after(players.len(), button_seat(players)).collect();
    let mut shares = Vec::new();
    for award in awards {
        let Some(pot) = find_pot(pots, &award.pot) else {
            continue;
        };
        let ordered: Vec<&str> = payout_order
            .iter()
            .map(|&s| players[s].name())
            .filter(|n| award.winners.iter().any(|w| w == n))
            .collect();
        let amounts = policy.split(pot.amount, &ordered);
        let paid: Chips = amounts.iter().sum();
        if amounts.len() != ordered.len() || paid != pot.amount {
            return Err(EngineError::SettlementInvariant(vec![
                Violation::DistributionMismatch {
                    distributed: paid,
                    pot_total: pot.amount,
                },
            ]));
        }
        shares.extend(ordered.iter().zip(amounts).map(|(name, amount)| PotShare {
            pot: pot.name(),
            player: name.to_string(),
            amount,
        }));
    }

    let results = players
        .iter()
        .map(|p| {
            let won: Chips = shares
                .iter()
                .filter(|s| s.player == p.name())
                .map(|s| s.amount)
                .sum();
            PlayerResult {
                name: p.name().to_string(),
                position: p.position(),
                starting_stack: p.starting_stack(),
                final_stack: p.stack(),
                contributed: p.total_contribution(),
                won,
                new_stack: p.stack() + won,
                is_winner: shares.iter().any(|s| s.player == p.name()),
            }
        })
        .collect();
    let distribution = Distribution {
        results,
        total_pot: settlement.total_pot(),
        shares,
    };

    let violations = invariants::check_distribution(settlement.players(), settlement.pots(), &distribution);
    if !violations.is_empty() {
        return Err(EngineError::SettlementInvariant(violations));
    }
    info!(
        hand = settlement.state().number(),
        total = distribution.total_pot(),
        winners = distribution.results().iter().filter(|r| r.is_winner).count(),
        "pots distributed"
    );
    Ok(distribution)
}
