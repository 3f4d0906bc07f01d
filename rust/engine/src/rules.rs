use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{EngineError, EngineResult};
use crate::game::ZeroStackPolicy;
use crate::logger::Street;
use crate::player::{Chips, Player, PlayerAction as A, Position};

/// Forced-bet amounts for a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindStructure {
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub ante: Chips,
}

impl BlindStructure {
    pub fn new(small_blind: Chips, big_blind: Chips, ante: Chips) -> Self {
        Self {
            small_blind,
            big_blind,
            ante,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.big_blind == 0 {
            return Err(EngineError::validation("big blind must be > 0"));
        }
        if self.small_blind > self.big_blind {
            return Err(EngineError::validation(format!(
                "small blind {} exceeds big blind {}",
                self.small_blind, self.big_blind
            )));
        }
        Ok(())
    }
}

/// Order in which the big blind seat posts its ante and its blind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnteOrder {
    #[default]
    AnteFirst,
    BbFirst,
}

impl AnteOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnteOrder::AnteFirst => "ante-first",
            AnteOrder::BbFirst => "bb-first",
        }
    }
}

impl fmt::Display for AnteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnteOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ante-first" | "ante_first" => Ok(AnteOrder::AnteFirst),
            "bb-first" | "bb_first" => Ok(AnteOrder::BbFirst),
            other => Err(format!("unknown ante order: {}", other)),
        }
    }
}

/// Table policies shared by the three engine operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRules {
    pub ante_order: AnteOrder,
    pub zero_stack: ZeroStackPolicy,
}

/// Posts the small blind, the big blind and the big blind's ante.
///
/// Every forced bet is capped at the remaining stack. Returns the opening
/// preflop bet, i.e. the largest blind actually posted.
pub fn post_forced_bets(
    players: &mut [Player],
    blinds: &BlindStructure,
    order: AnteOrder,
) -> Chips {
    for p in players.iter_mut().filter(|p| !p.is_sitting_out()) {
        match p.position() {
            Position::SmallBlind => {
                let sb = p.post_blind(blinds.small_blind);
                debug!(player = p.name(), amount = sb, "posted small blind");
            }
            Position::BigBlind => {
                let (ante, bb) = match order {
                    AnteOrder::AnteFirst => {
                        let ante = p.post_ante(blinds.ante);
                        (ante, p.post_blind(blinds.big_blind))
                    }
                    AnteOrder::BbFirst => {
                        let bb = p.post_blind(blinds.big_blind);
                        (p.post_ante(blinds.ante), bb)
                    }
                };
                debug!(player = p.name(), ante, amount = bb, "posted ante and big blind");
            }
            Position::Button | Position::Other => {}
        }
    }
    players
        .iter()
        .map(|p| p.street_contribution())
        .max()
        .unwrap_or(0)
}

/// A legal action with its chip effect resolved against the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    /// Matches (or, all-in, falls short of) the current bet.
    Call { to: Chips, marginal: Chips, all_in: bool },
    /// Goes above the current bet; `full` when it reopens the action.
    Raise {
        to: Chips,
        marginal: Chips,
        all_in: bool,
        full: bool,
    },
}

/// Betting state of one street: who still owes an action and whether a
/// raise reopens the action for players who already acted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BettingRound {
    street: Street,
    current_bet: Chips,
    last_full_raise: Chips,
    big_blind: Chips,
    aggressor: Option<usize>,
    to_act: Vec<usize>,
    acted_since_full_raise: BTreeSet<usize>,
    actions_taken: BTreeMap<usize, u8>,
}

impl BettingRound {
    pub fn open(street: Street, current_bet: Chips, big_blind: Chips, to_act: Vec<usize>) -> Self {
        Self {
            street,
            current_bet,
            last_full_raise: big_blind,
            big_blind,
            aggressor: None,
            to_act,
            acted_since_full_raise: BTreeSet::new(),
            actions_taken: BTreeMap::new(),
        }
    }

    pub fn street(&self) -> Street {
        self.street
    }
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }
    pub fn last_full_raise(&self) -> Chips {
        self.last_full_raise
    }
    pub fn aggressor(&self) -> Option<usize> {
        self.aggressor
    }
    pub fn to_act(&self) -> &[usize] {
        &self.to_act
    }
    pub fn next_to_act(&self) -> Option<usize> {
        self.to_act.first().copied()
    }
    pub fn is_complete(&self) -> bool {
        self.to_act.is_empty()
    }

    /// Smallest legal "bet to" / "raise to" amount that is not all-in.
    pub fn min_raise_to(&self) -> Chips {
        if self.current_bet == 0 {
            self.big_blind
        } else {
            self.current_bet + self.last_full_raise
        }
    }

    pub fn is_full_raise(&self, to: Chips) -> bool {
        self.current_bet == 0 || to.saturating_sub(self.current_bet) >= self.last_full_raise
    }

    /// False once the seat has acted and no full raise has followed.
    pub fn may_raise(&self, seat: usize) -> bool {
        !self.acted_since_full_raise.contains(&seat)
    }

    /// 0 for the seat's first action on this street, n for its n-th "more" round.
    pub fn round_index(&self, seat: usize) -> u8 {
        self.actions_taken.get(&seat).copied().unwrap_or(0)
    }

    pub(crate) fn mark_acted(&mut self, seat: usize) {
        self.to_act.retain(|s| *s != seat);
        self.acted_since_full_raise.insert(seat);
        *self.actions_taken.entry(seat).or_insert(0) += 1;
    }

    pub(crate) fn on_full_raise(&mut self, seat: usize, to: Chips, to_act: Vec<usize>) {
        self.last_full_raise = to - self.current_bet;
        self.current_bet = to;
        self.aggressor = Some(seat);
        self.acted_since_full_raise.clear();
        self.mark_acted(seat);
        self.to_act = to_act;
    }

    pub(crate) fn on_short_raise(&mut self, seat: usize, to: Chips, to_act: Vec<usize>) {
        self.current_bet = to;
        self.mark_acted(seat);
        self.to_act = to_act;
    }

    pub(crate) fn close(&mut self) {
        self.to_act.clear();
    }
}

/// Validates a player action against the street's betting state.
///
/// Converts a [`crate::player::PlayerAction`] into a [`ValidatedAction`],
/// enforcing minimum bets and raises, the reopening rule and stack limits.
/// Calls and explicit all-ins are capped at the stack; a bet or raise that
/// would need more chips than the player has is rejected instead.
///
/// # Errors
///
/// - [`EngineError::IllegalAction`] - check facing a bet, bet facing a bet,
///   raise with nothing to raise, or a raise after the action was not reopened
/// - [`EngineError::IllegalAmount`] - wrong call amount, or a bet/raise below
///   the minimum that is not all-in
/// - [`EngineError::OverContribution`] - bet/raise above the stack
///
/// # Examples
///
/// ```
/// use potsettle_engine::logger::Street;
/// use potsettle_engine::player::{Player, PlayerAction, Position};
/// use potsettle_engine::rules::{validate_action, BettingRound, ValidatedAction};
///
/// let round = BettingRound::open(Street::Flop, 100, 100, vec![0, 1]);
/// let player = Player::new("Alice", Position::SmallBlind, 1_000);
///
/// let v = validate_action(0, &player, &round, PlayerAction::Raise { to: 300 }).unwrap();
/// assert!(matches!(v, ValidatedAction::Raise { to: 300, full: true, .. }));
///
/// // raise to 150 is short of the 200 minimum and not all-in
/// assert!(validate_action(0, &player, &round, PlayerAction::Raise { to: 150 }).is_err());
/// ```
pub fn validate_action(
    seat: usize,
    player: &Player,
    round: &BettingRound,
    action: A,
) -> EngineResult<ValidatedAction> {
    let name = player.name();
    let current = round.current_bet();
    let committed = player.street_contribution();
    let behind = player.stack();
    let max_to = committed + behind;

    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if committed >= current {
                Ok(ValidatedAction::Check)
            } else {
                Err(EngineError::illegal_action(
                    name,
                    format!("cannot check facing a bet of {}", current),
                ))
            }
        }
        A::Call { to } => {
            if committed >= current {
                return Err(EngineError::illegal_action(name, "nothing to call"));
            }
            let capped = current.min(max_to);
            if to != current && to != capped {
                return Err(EngineError::IllegalAmount {
                    player: name.to_string(),
                    amount: to,
                    minimum: capped,
                });
            }
            let marginal = capped - committed;
            Ok(ValidatedAction::Call {
                to: capped,
                marginal,
                all_in: marginal == behind,
            })
        }
        A::Bet { to } => {
            if current > 0 {
                return Err(EngineError::illegal_action(
                    name,
                    format!("cannot bet facing {}; raise instead", current),
                ));
            }
            aggressive(seat, player, round, to)
        }
        A::Raise { to } => {
            if current == 0 {
                return Err(EngineError::illegal_action(
                    name,
                    "nothing to raise; bet instead",
                ));
            }
            aggressive(seat, player, round, to)
        }
        A::AllIn { to } => {
            if to < max_to {
                return Err(EngineError::IllegalAmount {
                    player: name.to_string(),
                    amount: to,
                    minimum: max_to,
                });
            }
            if max_to <= current {
                return Ok(ValidatedAction::Call {
                    to: max_to,
                    marginal: behind,
                    all_in: true,
                });
            }
            if !round.may_raise(seat) {
                return Err(EngineError::illegal_action(
                    name,
                    "action was not reopened; call or fold",
                ));
            }
            Ok(ValidatedAction::Raise {
                to: max_to,
                marginal: behind,
                all_in: true,
                full: round.is_full_raise(max_to),
            })
        }
    }
}

fn aggressive(
    seat: usize,
    player: &Player,
    round: &BettingRound,
    to: Chips,
) -> EngineResult<ValidatedAction> {
    let name = player.name();
    let current = round.current_bet();
    if to == 0 || to <= current {
        return Err(EngineError::IllegalAmount {
            player: name.to_string(),
            amount: to,
            minimum: round.min_raise_to(),
        });
    }
    let marginal = to - player.street_contribution();
    if marginal > player.stack() {
        return Err(EngineError::OverContribution {
            player: name.to_string(),
            requested: marginal,
            available: player.stack(),
        });
    }
    let all_in = marginal == player.stack();
    let full = round.is_full_raise(to);
    if to < round.min_raise_to() && !all_in {
        return Err(EngineError::IllegalAmount {
            player: name.to_string(),
            amount: to,
            minimum: round.min_raise_to(),
        });
    }
    if !round.may_raise(seat) {
        return Err(EngineError::illegal_action(
            name,
            "action was not reopened; call or fold",
        ));
    }
    Ok(ValidatedAction::Raise {
        to,
        marginal,
        all_in,
        full,
    })
}
