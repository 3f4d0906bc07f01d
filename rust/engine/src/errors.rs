use thiserror::Error;

use crate::invariants::Violation;

/// Errors raised by the settlement engine.
///
/// Structural and legality errors are returned before any ledger record is
/// touched, so a failed [`crate::engine::HandState::apply`] leaves the prior
/// state exactly as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed input: bad setup text, unknown player, inconsistent seating.
    #[error("Invalid input: {0}")]
    Validation(String),
    /// Out of turn, or by a folded/all-in/eliminated player.
    #[error("Illegal action by {player}: {reason}")]
    IllegalAction { player: String, reason: String },
    /// Bet or raise below the legal minimum, or a non-positive amount.
    #[error("Illegal amount {amount} by {player}, minimum: {minimum}")]
    IllegalAmount {
        player: String,
        amount: u64,
        minimum: u64,
    },
    /// Contribution above the remaining stack without an all-in marker.
    #[error("{player} cannot put in {requested} with only {available} behind")]
    OverContribution {
        player: String,
        requested: u64,
        available: u64,
    },
    /// Post-hoc ledger/pot mismatch; carries every violation found.
    #[error("Settlement invariant broken: {}", summarize(.0))]
    SettlementInvariant(Vec<Violation>),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    pub(crate) fn illegal_action(player: &str, reason: impl Into<String>) -> Self {
        EngineError::IllegalAction {
            player: player.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
