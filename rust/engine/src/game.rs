use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::errors::{EngineError, EngineResult};
use crate::invariants;
use crate::payout::Distribution;
use crate::player::{Chips, Position};
use crate::rules::{BlindStructure, TableRules};

/// What happens to players who have no chips left.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZeroStackPolicy {
    /// Everyone stays seated, broke or not
    #[default]
    #[serde(rename = "keep")]
    KeepUntilRemoved,
    /// A player who started the hand on the button with 0 chips is dropped
    #[serde(rename = "remove-busted-dealer")]
    RemoveBustedDealer,
}

impl ZeroStackPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZeroStackPolicy::KeepUntilRemoved => "keep",
            ZeroStackPolicy::RemoveBustedDealer => "remove-busted-dealer",
        }
    }
}

impl fmt::Display for ZeroStackPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZeroStackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keep" | "keep-until-removed" => Ok(ZeroStackPolicy::KeepUntilRemoved),
            "remove-busted-dealer" => Ok(ZeroStackPolicy::RemoveBustedDealer),
            other => Err(format!("unknown zero-stack policy: {}", other)),
        }
    }
}

/// A seat as listed under "Stack Setup:".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSetup {
    pub name: String,
    pub position: Position,
    pub stack: Chips,
}

impl SeatSetup {
    pub fn new(name: impl Into<String>, position: Position, stack: Chips) -> Self {
        Self {
            name: name.into(),
            position,
            stack,
        }
    }
}

pub const DEFAULT_STARTED_AT: &str = "00:00:00";

/// Everything needed to start a hand: number, clock, blinds and seats in
/// clockwise order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSetup {
    pub number: u32,
    pub started_at: String,
    #[serde(default)]
    pub ended_at: Option<String>,
    pub blinds: BlindStructure,
    pub seats: Vec<SeatSetup>,
}

impl HandSetup {
    pub fn new(number: u32, blinds: BlindStructure, seats: Vec<SeatSetup>) -> Self {
        Self {
            number,
            started_at: DEFAULT_STARTED_AT.to_string(),
            ended_at: None,
            blinds,
            seats,
        }
    }

    pub fn seat(&self, name: &str) -> Option<&SeatSetup> {
        self.seats.iter().find(|s| s.name == name)
    }

    pub fn total_chips(&self) -> Chips {
        self.seats.iter().map(|s| s.stack).sum()
    }

    /// Seat index holding the button (the small blind when heads-up).
    pub fn button_index(&self) -> Option<usize> {
        let want = if self.seats.len() == 2 {
            Position::SmallBlind
        } else {
            Position::Button
        };
        self.seats.iter().position(|s| s.position == want)
    }

    /// Checks seating and returns a copy with heads-up `Dealer` read as SB.
    pub fn normalized(&self) -> EngineResult<HandSetup> {
        self.blinds.validate()?;
        let n = self.seats.len();
        if n < 2 {
            return Err(EngineError::validation(format!(
                "hand {} needs at least 2 players, found {}",
                self.number, n
            )));
        }
        let mut names = HashSet::new();
        for s in &self.seats {
            if s.name.trim().is_empty() {
                return Err(EngineError::validation("player name is empty"));
            }
            if !names.insert(s.name.as_str()) {
                return Err(EngineError::validation(format!("duplicate player: {}", s.name)));
            }
        }

        let mut out = self.clone();
        if n == 2 {
            for s in out.seats.iter_mut() {
                if s.position == Position::Button {
                    s.position = Position::SmallBlind;
                }
            }
        }
        let count = |pos: Position| out.seats.iter().filter(|s| s.position == pos).count();
        let required: &[Position] = if n == 2 {
            &[Position::SmallBlind, Position::BigBlind]
        } else {
            &[Position::Button, Position::SmallBlind, Position::BigBlind]
        };
        for &pos in required {
            if count(pos) != 1 {
                return Err(EngineError::validation(format!(
                    "expected exactly one {} seat, found {}",
                    pos.label().unwrap_or("?"),
                    count(pos)
                )));
            }
        }
        if n == 2 && out.seats.iter().any(|s| s.position == Position::Other) {
            return Err(EngineError::validation("heads-up seats must be SB and BB"));
        }
        if n >= 3 {
            let b = out.button_index().unwrap_or(0);
            if out.seats[(b + 1) % n].position != Position::SmallBlind
                || out.seats[(b + 2) % n].position != Position::BigBlind
            {
                return Err(EngineError::validation(
                    "SB and BB must sit directly after the dealer",
                ));
            }
        }
        Ok(out)
    }
}

/// Name of the dealer the zero-stack policy drops from the next hand, if any.
pub fn busted_dealer<'a>(setup: &'a HandSetup, rules: &TableRules) -> Option<&'a str> {
    if rules.zero_stack != ZeroStackPolicy::RemoveBustedDealer || setup.seats.len() < 3 {
        return None;
    }
    let dealer = &setup.seats[setup.button_index()?];
    (dealer.stack == 0).then_some(dealer.name.as_str())
}

/// Builds the setup of the following hand.
///
/// The button moves one seat clockwise; heads-up the blinds swap. Seats
/// keep their order and every player carries their `new_stack` forward.
/// Under [`ZeroStackPolicy::RemoveBustedDealer`] a dealer who began this
/// hand with no chips is left out; when that leaves two players the prior
/// big blind takes the button.
///
/// # Errors
///
/// [`EngineError::Validation`] for bad seating or a distribution that does
/// not cover exactly the seated players, [`EngineError::SettlementInvariant`]
/// if the result would change the set of players or the chip total.
pub fn build_next_hand(
    setup: &HandSetup,
    distribution: &Distribution,
    rules: &TableRules,
) -> EngineResult<HandSetup> {
    let setup = setup.normalized()?;
    let n = setup.seats.len();

    for r in distribution.results() {
        if setup.seat(&r.name).is_none() {
            return Err(EngineError::validation(format!(
                "result for unseated player {}",
                r.name
            )));
        }
    }
    let mut stacks = Vec::with_capacity(n);
    for s in &setup.seats {
        let stack = distribution
            .new_stack(&s.name)
            .ok_or_else(|| EngineError::validation(format!("no result for {}", s.name)))?;
        stacks.push(stack);
    }

    let b = setup.button_index().unwrap_or(0);
    let removed = busted_dealer(&setup, rules).map(|_| b);

    let survivors: Vec<usize> = (1..=n)
        .map(|k| (b + k) % n)
        .filter(|&i| Some(i) != removed)
        .collect();
    let mut positions = vec![Position::Other; n];
    if survivors.len() == 2 {
        // heads-up the prior big blind takes the button (and the small blind)
        let (sb, bb) = if n == 2 {
            (survivors[0], survivors[1])
        } else {
            (survivors[1], survivors[0])
        };
        positions[sb] = Position::SmallBlind;
        positions[bb] = Position::BigBlind;
    } else {
        for (k, &i) in survivors.iter().enumerate() {
            positions[i] = match k {
                0 => Position::Button,
                1 => Position::SmallBlind,
                2 => Position::BigBlind,
                _ => Position::Other,
            };
        }
    }

    let seats: Vec<SeatSetup> = setup
        .seats
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != removed)
        .map(|(i, s)| SeatSetup::new(s.name.clone(), positions[i], stacks[i]))
        .collect();

    let number = setup.number.checked_add(1).ok_or_else(|| {
        EngineError::validation(format!("hand {} has no next hand number", setup.number))
    })?;
    let next = HandSetup {
        number,
        started_at: setup
            .ended_at
            .clone()
            .unwrap_or_else(|| setup.started_at.clone()),
        ended_at: None,
        blinds: setup.blinds,
        seats,
    };

    let removed_name = removed.map(|i| setup.seats[i].name.as_str());
    let violations = invariants::check_next_hand(&setup, distribution, &next, removed_name);
    if !violations.is_empty() {
        return Err(EngineError::SettlementInvariant(violations));
    }
    info!(
        hand = next.number,
        players = next.seats.len(),
        removed = removed_name,
        "next hand built"
    );
    Ok(next)
}
