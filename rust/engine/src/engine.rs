use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{EngineError, EngineResult};
use crate::game::HandSetup;
use crate::invariants;
use crate::logger::{ActionRecord, Street};
use crate::order::{acting_order, clockwise_after, respond_after};
use crate::player::{Chips, Player, PlayerAction, Position};
use crate::pot::{Pot, PotManager};
use crate::rules::{post_forced_bets, validate_action, BettingRound, BlindStructure, TableRules, ValidatedAction};

/// Snapshot of one hand in progress.
///
/// Every transition returns a new `HandState` and leaves `self` untouched,
/// so a rejected action never alters the ledger and any snapshot can be
/// serialized and resumed later.
///
/// # Examples
///
/// ```
/// use potsettle_engine::engine::HandState;
/// use potsettle_engine::game::{HandSetup, SeatSetup};
/// use potsettle_engine::player::{PlayerAction, Position};
/// use potsettle_engine::rules::{BlindStructure, TableRules};
///
/// let setup = HandSetup::new(
///     1,
///     BlindStructure::new(50, 100, 0),
///     vec![
///         SeatSetup::new("Alice", Position::SmallBlind, 1_000),
///         SeatSetup::new("Bob", Position::BigBlind, 1_000),
///     ],
/// );
/// let state = HandState::start(&setup, &TableRules::default()).unwrap();
/// let next = state.apply("Alice", PlayerAction::Call { to: 100 }).unwrap();
///
/// assert_eq!(state.player("Alice").unwrap().stack(), 950);
/// assert_eq!(next.player("Alice").unwrap().stack(), 900);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandState {
    number: u32,
    blinds: BlindStructure,
    /// Seat order, clockwise
    players: Vec<Player>,
    street: Street,
    round: BettingRound,
    log: Vec<ActionRecord>,
}

impl HandState {
    /// Seats the players and posts the forced bets.
    pub fn start(setup: &HandSetup, rules: &TableRules) -> EngineResult<Self> {
        let setup = setup.normalized()?;
        let mut players: Vec<Player> = setup
            .seats
            .iter()
            .map(|s| Player::new(s.name.clone(), s.position, s.stack))
            .collect();
        let opening = post_forced_bets(&mut players, &setup.blinds, rules.ante_order);
        let order = acting_order(&players, Street::Preflop);
        let mut state = Self {
            number: setup.number,
            blinds: setup.blinds,
            players,
            street: Street::Preflop,
            round: BettingRound::open(Street::Preflop, opening, setup.blinds.big_blind, order),
            log: Vec::new(),
        };
        state.prune_queue();
        debug!(hand = state.number, opening, "forced bets posted");
        Ok(state)
    }

    pub fn number(&self) -> u32 {
        self.number
    }
    pub fn blinds(&self) -> &BlindStructure {
        &self.blinds
    }
    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn street(&self) -> Street {
        self.street
    }
    pub fn round(&self) -> &BettingRound {
        &self.round
    }
    pub fn actions(&self) -> &[ActionRecord] {
        &self.log
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    pub fn next_to_act(&self) -> Option<&Player> {
        self.round.next_to_act().map(|s| &self.players[s])
    }

    pub fn total_committed(&self) -> Chips {
        self.players.iter().map(|p| p.total_contribution()).sum()
    }

    /// At most one player is still contesting the pot.
    pub fn is_hand_over(&self) -> bool {
        self.players.iter().filter(|p| p.is_contender()).count() <= 1
    }

    pub fn is_betting_complete(&self) -> bool {
        self.round.is_complete()
    }

    /// No further betting can happen on this or any later street.
    pub fn is_settleable(&self) -> bool {
        if self.is_hand_over() {
            return true;
        }
        self.round.is_complete()
            && (self.street == Street::River || self.players.iter().filter(|p| p.can_act()).count() <= 1)
    }

    /// Applies one action by `name` and returns the resulting state.
    ///
    /// # Errors
    ///
    /// Unknown players are a [`EngineError::Validation`]; acting out of
    /// turn, after folding, while all-in or after the hand is over is an
    /// [`EngineError::IllegalAction`]. Amount errors come from
    /// [`validate_action`].
    pub fn apply(&self, name: &str, action: PlayerAction) -> EngineResult<HandState> {
        self.try_apply(name, action).inspect_err(|e| {
            warn!(hand = self.number, player = name, street = %self.street, error = %e, "action rejected");
        })
    }

    fn try_apply(&self, name: &str, action: PlayerAction) -> EngineResult<HandState> {
        let seat = self
            .players
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| EngineError::validation(format!("unknown player: {}", name)))?;
        let player = &self.players[seat];

        if self.is_hand_over() {
            return Err(EngineError::illegal_action(name, "the hand is over"));
        }
        if player.is_sitting_out() {
            return Err(EngineError::illegal_action(name, "not dealt in"));
        }
        if player.is_folded() {
            return Err(EngineError::illegal_action(name, "already folded"));
        }
        if player.is_all_in() {
            return Err(EngineError::illegal_action(name, "already all-in"));
        }
        match self.round.next_to_act() {
            None => {
                return Err(EngineError::illegal_action(
                    name,
                    format!("betting on the {} is closed", self.street),
                ))
            }
            Some(expected) if expected != seat => {
                return Err(EngineError::illegal_action(
                    name,
                    format!("out of turn, {} to act", self.players[expected].name()),
                ))
            }
            Some(_) => {}
        }

        let validated = validate_action(seat, player, &self.round, action)?;
        let round_index = self.round.round_index(seat);
        let position = player.position();

        let mut next = self.clone();
        let street = next.street;
        let recorded = match validated {
            ValidatedAction::Fold => {
                next.players[seat].fold();
                next.round.mark_acted(seat);
                PlayerAction::Fold
            }
            ValidatedAction::Check => {
                next.round.mark_acted(seat);
                PlayerAction::Check
            }
            ValidatedAction::Call { to, marginal, .. } => {
                next.players[seat].commit(marginal, street)?;
                next.round.mark_acted(seat);
                with_amount(action, to)
            }
            ValidatedAction::Raise {
                to, marginal, full, ..
            } => {
                next.players[seat].commit(marginal, street)?;
                if full {
                    let queue = respond_after(&next.players, seat);
                    next.round.on_full_raise(seat, to, queue);
                } else {
                    let queue = clockwise_after(next.players.len(), seat)
                        .filter(|&s| {
                            s != seat
                                && next.players[s].can_act()
                                && next.players[s].street_contribution() < to
                        })
                        .collect();
                    next.round.on_short_raise(seat, to, queue);
                }
                with_amount(action, to)
            }
        };
        next.prune_queue();
        next.log.push(ActionRecord {
            player: name.to_string(),
            position: Some(position),
            street,
            round: round_index,
            action: recorded,
        });
        debug!(
            hand = next.number,
            player = name,
            street = %street,
            round = round_index,
            action = recorded.keyword(),
            to = recorded.to_amount(),
            "applied action"
        );
        Ok(next)
    }

    /// Closes the current street and opens the next one.
    pub fn advance_street(&self) -> EngineResult<HandState> {
        if self.is_hand_over() {
            return Err(EngineError::validation("the hand is over"));
        }
        if !self.round.is_complete() {
            let who = self.next_to_act().map(|p| p.name()).unwrap_or("?");
            return Err(EngineError::validation(format!(
                "betting on the {} is not complete, {} to act",
                self.street, who
            )));
        }
        let street = self
            .street
            .next()
            .ok_or_else(|| EngineError::validation("no street after the river"))?;

        let mut next = self.clone();
        for p in next.players.iter_mut() {
            p.reset_street();
        }
        next.street = street;
        let order = acting_order(&next.players, street);
        next.round = BettingRound::open(street, 0, next.blinds.big_blind, order);
        next.prune_queue();
        debug!(hand = next.number, street = %street, "street opened");
        Ok(next)
    }

    /// Applies a logged action, opening later streets as needed and
    /// checking any position tag the record carries.
    pub fn apply_record(&self, record: &ActionRecord) -> EngineResult<HandState> {
        if record.street < self.street {
            return Err(EngineError::validation(format!(
                "{} action by {} recorded after the {}",
                record.street, record.player, self.street
            )));
        }
        let mut state = self.clone();
        while state.street < record.street {
            state = state.advance_street()?;
        }
        if let (Some(declared), Some(p)) = (record.position, state.player(&record.player)) {
            let declared = if declared == Position::Button && state.players.len() == 2 {
                Position::SmallBlind
            } else {
                declared
            };
            if declared != p.position() {
                return Err(EngineError::validation(format!(
                    "{} is {:?}, not {:?}",
                    record.player,
                    p.position(),
                    declared
                )));
            }
        }
        state.apply(&record.player, record.action)
    }

    /// Closes the round once nobody can still be asked to put in chips.
    fn prune_queue(&mut self) {
        if self.is_hand_over() {
            self.round.close();
            return;
        }
        let able = self.players.iter().filter(|p| p.can_act()).count();
        let bet = self.round.current_bet();
        let owed = self
            .round
            .to_act()
            .iter()
            .any(|&s| self.players[s].street_contribution() < bet);
        if able <= 1 && !owed {
            self.round.close();
        }
    }
}

fn with_amount(requested: PlayerAction, to: Chips) -> PlayerAction {
    match requested {
        PlayerAction::Bet { .. } => PlayerAction::Bet { to },
        PlayerAction::Raise { .. } => PlayerAction::Raise { to },
        PlayerAction::Call { .. } => PlayerAction::Call { to },
        PlayerAction::AllIn { .. } => PlayerAction::AllIn { to },
        other => other,
    }
}

/// Final ledger of a hand together with its pots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    state: HandState,
    pots: Vec<Pot>,
}

impl Settlement {
    pub fn state(&self) -> &HandState {
        &self.state
    }
    pub fn players(&self) -> &[Player] {
        self.state.players()
    }
    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }
    pub fn total_pot(&self) -> Chips {
        self.pots.iter().map(|p| p.amount).sum()
    }
}

/// Replays `actions` from the setup without requiring the hand to be finished.
pub fn replay(setup: &HandSetup, actions: &[ActionRecord], rules: &TableRules) -> EngineResult<HandState> {
    actions
        .iter()
        .try_fold(HandState::start(setup, rules)?, |state, rec| state.apply_record(rec))
}

/// Plays a recorded hand to the end and partitions the pot.
///
/// Pure: the same setup, actions and rules always give the same settlement.
///
/// # Errors
///
/// Any error from replaying the log, [`EngineError::Validation`] when the
/// log stops while betting is still possible, and
/// [`EngineError::SettlementInvariant`] if the ledger or pots fail the
/// consistency checks.
pub fn settle_hand(setup: &HandSetup, actions: &[ActionRecord], rules: &TableRules) -> EngineResult<Settlement> {
    let state = replay(setup, actions, rules)?;
    if !state.is_settleable() {
        let who = state.next_to_act().map(|p| p.name().to_string());
        return Err(EngineError::validation(match who {
            Some(who) => format!("hand is incomplete, {} to act on the {}", who, state.street()),
            None => format!("hand is incomplete after the {}", state.street()),
        }));
    }
    let pots = PotManager::from_players(state.players()).into_pots();

    let mut violations = invariants::check_ledger(state.players());
    violations.extend(invariants::check_pots(state.players(), &pots));
    if !violations.is_empty() {
        return Err(EngineError::SettlementInvariant(violations));
    }
    info!(
        hand = state.number(),
        pots = pots.len(),
        total = state.total_committed(),
        "hand settled"
    );
    Ok(Settlement { state, pots })
}
