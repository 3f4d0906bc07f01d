use crate::errors::{EngineError, EngineResult};
use crate::logger::Street;
use serde::{Deserialize, Serialize};

/// Chip amounts. Ledger fields are unsigned so a negative stack cannot be
/// represented at all.
pub type Chips = u64;

/// Represents a player's position at the table.
/// Finer seat labels (UTG, CO, ...) exist only while computing turn order and
/// are never stored; every such seat is `Other`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Dealer button (3+ players)
    Button,
    /// Small blind; also the button when heads-up
    SmallBlind,
    /// Big blind
    BigBlind,
    /// Any other seat
    Other,
}

impl Position {
    /// Label used by the hand setup text; `None` for seats printed without one.
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Position::Button => Some("Dealer"),
            Position::SmallBlind => Some("SB"),
            Position::BigBlind => Some("BB"),
            Position::Other => None,
        }
    }

    pub fn from_label(s: &str) -> Option<Position> {
        match s.to_ascii_uppercase().as_str() {
            "DEALER" | "BTN" | "BUTTON" | "D" => Some(Position::Button),
            "SB" => Some(Position::SmallBlind),
            "BB" => Some(Position::BigBlind),
            _ => None,
        }
    }
}

/// Represents a player action during a betting round.
/// Every amount is the player's total contribution on the street after the
/// action ("raise to"), never the increment.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Check (only valid when level with the current bet)
    Check,
    /// Open the betting on a street
    Bet { to: Chips },
    /// Raise an existing bet
    Raise { to: Chips },
    /// Match the current bet
    Call { to: Chips },
    /// Put the whole stack in
    #[serde(rename = "allin")]
    AllIn { to: Chips },
}

impl PlayerAction {
    pub fn to_amount(&self) -> Option<Chips> {
        match *self {
            PlayerAction::Fold | PlayerAction::Check => None,
            PlayerAction::Bet { to }
            | PlayerAction::Raise { to }
            | PlayerAction::Call { to }
            | PlayerAction::AllIn { to } => Some(to),
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            PlayerAction::Fold => "fold",
            PlayerAction::Check => "check",
            PlayerAction::Bet { .. } => "bet",
            PlayerAction::Raise { .. } => "raise",
            PlayerAction::Call { .. } => "call",
            PlayerAction::AllIn { .. } => "allin",
        }
    }

    /// Builds an action from its keyword and optional amount.
    pub fn from_parts(keyword: &str, amount: Option<Chips>) -> Option<PlayerAction> {
        let kw = keyword.to_ascii_lowercase();
        match (kw.as_str(), amount) {
            ("fold", None) => Some(PlayerAction::Fold),
            ("check", None) => Some(PlayerAction::Check),
            ("bet", Some(to)) => Some(PlayerAction::Bet { to }),
            ("raise", Some(to)) => Some(PlayerAction::Raise { to }),
            ("call", Some(to)) => Some(PlayerAction::Call { to }),
            ("allin" | "all-in", Some(to)) => Some(PlayerAction::AllIn { to }),
            _ => None,
        }
    }
}

/// One player's chip ledger for a single hand.
///
/// Records are only changed by the blind poster and the action processor,
/// and only on a cloned hand state, so every observed record satisfies
/// `stack == starting_stack - total_contribution`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    name: String,
    position: Position,
    starting_stack: Chips,
    stack: Chips,
    street_contribution: Chips,
    total_contribution: Chips,
    folded: bool,
    all_in_street: Option<Street>,
    ante_posted: Chips,
    blind_posted: Chips,
}

impl Player {
    pub fn new(name: impl Into<String>, position: Position, stack: Chips) -> Self {
        Self {
            name: name.into(),
            position,
            starting_stack: stack,
            stack,
            street_contribution: 0,
            total_contribution: 0,
            folded: false,
            all_in_street: None,
            ante_posted: 0,
            blind_posted: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn position(&self) -> Position {
        self.position
    }
    pub fn starting_stack(&self) -> Chips {
        self.starting_stack
    }
    pub fn stack(&self) -> Chips {
        self.stack
    }
    pub fn street_contribution(&self) -> Chips {
        self.street_contribution
    }
    pub fn total_contribution(&self) -> Chips {
        self.total_contribution
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    pub fn all_in_street(&self) -> Option<Street> {
        self.all_in_street
    }
    pub fn ante_posted(&self) -> Chips {
        self.ante_posted
    }
    pub fn blind_posted(&self) -> Chips {
        self.blind_posted
    }

    pub fn is_all_in(&self) -> bool {
        self.all_in_street.is_some()
    }

    /// Dealt in with no chips: posts nothing, never acts, never wins.
    pub fn is_sitting_out(&self) -> bool {
        self.starting_stack == 0
    }

    /// Still contesting the pot (not folded and actually dealt in).
    pub fn is_contender(&self) -> bool {
        !self.folded && !self.is_sitting_out()
    }

    pub fn can_act(&self) -> bool {
        self.is_contender() && !self.is_all_in() && self.stack > 0
    }

    /// Contribution net of dead ante money.
    pub fn live_contribution(&self) -> Chips {
        self.total_contribution - self.ante_posted
    }

    /// Moves `amount` from the stack into the pot on `street`.
    pub(crate) fn commit(&mut self, amount: Chips, street: Street) -> EngineResult<()> {
        if amount > self.stack {
            return Err(EngineError::OverContribution {
                player: self.name.clone(),
                requested: amount,
                available: self.stack,
            });
        }
        self.stack -= amount;
        self.street_contribution += amount;
        self.total_contribution += amount;
        if self.stack == 0 && amount > 0 {
            self.all_in_street = Some(street);
        }
        Ok(())
    }

    /// Posts a blind capped at the stack; returns the amount posted.
    pub(crate) fn post_blind(&mut self, amount: Chips) -> Chips {
        let posted = amount.min(self.stack);
        // commit cannot fail: posted <= stack
        let _ = self.commit(posted, Street::Preflop);
        self.blind_posted += posted;
        posted
    }

    /// Posts dead ante money capped at the stack; returns the amount posted.
    pub(crate) fn post_ante(&mut self, amount: Chips) -> Chips {
        let posted = amount.min(self.stack);
        self.stack -= posted;
        self.total_contribution += posted;
        self.ante_posted += posted;
        if self.stack == 0 && posted > 0 {
            self.all_in_street = Some(Street::Preflop);
        }
        posted
    }

    pub(crate) fn fold(&mut self) {
        self.folded = true;
    }

    pub(crate) fn reset_street(&mut self) {
        self.street_contribution = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_moves_chips_and_flags_all_in() {
        let mut p = Player::new("Alice", Position::SmallBlind, 500);
        p.commit(200, Street::Preflop).unwrap();
        assert_eq!(p.stack(), 300);
        assert_eq!(p.street_contribution(), 200);
        assert!(!p.is_all_in());
        p.commit(300, Street::Flop).unwrap();
        assert_eq!(p.stack(), 0);
        assert_eq!(p.all_in_street(), Some(Street::Flop));
    }

    #[test]
    fn commit_over_stack_leaves_record_untouched() {
        let mut p = Player::new("Bob", Position::BigBlind, 100);
        let err = p.commit(150, Street::Preflop).unwrap_err();
        assert!(matches!(err, EngineError::OverContribution { available: 100, .. }));
        assert_eq!(p.stack(), 100);
        assert_eq!(p.total_contribution(), 0);
    }

    #[test]
    fn ante_is_dead_and_not_street_money() {
        let mut p = Player::new("Bob", Position::BigBlind, 1_000);
        assert_eq!(p.post_ante(100), 100);
        assert_eq!(p.post_blind(200), 200);
        assert_eq!(p.street_contribution(), 200);
        assert_eq!(p.total_contribution(), 300);
        assert_eq!(p.live_contribution(), 200);
        assert_eq!(p.stack(), 700);
    }

    #[test]
    fn short_stack_blind_is_capped() {
        let mut p = Player::new("Carl", Position::BigBlind, 60);
        assert_eq!(p.post_blind(100), 60);
        assert!(p.is_all_in());
        assert!(!p.can_act());
    }

    #[test]
    fn action_keywords_round_trip() {
        let a = PlayerAction::from_parts("Raise", Some(300)).unwrap();
        assert_eq!(a, PlayerAction::Raise { to: 300 });
        assert_eq!(a.keyword(), "raise");
        assert_eq!(a.to_amount(), Some(300));
        assert!(PlayerAction::from_parts("bet", None).is_none());
        assert!(PlayerAction::from_parts("check", Some(10)).is_none());
    }

    #[test]
    fn position_labels() {
        assert_eq!(Position::from_label("dealer"), Some(Position::Button));
        assert_eq!(Position::from_label("BTN"), Some(Position::Button));
        assert_eq!(Position::Button.label(), Some("Dealer"));
        assert_eq!(Position::Other.label(), None);
        assert_eq!(Position::from_label("UTG"), None);
    }
}
