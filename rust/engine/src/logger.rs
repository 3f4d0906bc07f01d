use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::Settlement;
use crate::game::HandSetup;
use crate::payout::Distribution;
use crate::player::{Player, PlayerAction, Position};
use crate::pot::Pot;

/// Represents a betting street in Texas Hold'em poker.
/// Defines the four stages of a poker hand.
#[derive(
    Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum Street {
    /// Before flop (hole cards dealt)
    Preflop,
    /// After flop (3 community cards)
    Flop,
    /// After turn (4th community card)
    Turn,
    /// After river (5th community card)
    River,
}

impl Street {
    pub const ALL: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

    pub fn next(self) -> Option<Street> {
        match self {
            Street::Preflop => Some(Street::Flop),
            Street::Flop => Some(Street::Turn),
            Street::Turn => Some(Street::River),
            Street::River => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Street::Preflop => "Preflop",
            Street::Flop => "Flop",
            Street::Turn => "Turn",
            Street::River => "River",
        }
    }

    pub fn parse(s: &str) -> Option<Street> {
        Street::ALL
            .into_iter()
            .find(|street| street.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records a single player action during a hand.
/// Associates the action with the player, the street and the betting round
/// (0 for the base round, n for the n-th "more" round) when it occurred.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Player name as it appears in the hand setup
    pub player: String,
    /// Position tag; filled in by the engine, optional in hand files
    #[serde(default)]
    pub position: Option<Position>,
    /// The betting street when this action occurred
    pub street: Street,
    /// Betting round within the street
    #[serde(default)]
    pub round: u8,
    /// The action taken by the player, amounts are street totals
    pub action: PlayerAction,
}

impl ActionRecord {
    pub fn new(player: impl Into<String>, street: Street, action: PlayerAction) -> Self {
        Self {
            player: player.into(),
            position: None,
            street,
            round: 0,
            action,
        }
    }
}

/// Complete trace of one settled hand: the setup it started from, every
/// applied action, the final ledger, the pots and, once known, the payouts
/// and the next hand. Serialized to JSONL for verification and replay.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    /// Unique identifier for this hand (format: YYYYMMDD-NNNNNN)
    pub hand_id: String,
    /// Timestamp when the hand was logged (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
    /// Seating, stacks and blinds at the start of the hand
    pub setup: HandSetup,
    /// Chronological list of all applied actions
    pub actions: Vec<ActionRecord>,
    /// Final per-player ledger
    pub ledger: Vec<Player>,
    /// Main pot followed by side pots
    pub pots: Vec<Pot>,
    /// Winner distribution, when winners were supplied
    #[serde(default)]
    pub payouts: Option<Distribution>,
    /// Setup of the following hand
    #[serde(default)]
    pub next_hand: Option<HandSetup>,
}

impl HandRecord {
    pub fn from_settlement(
        hand_id: String,
        setup: &HandSetup,
        settlement: &Settlement,
        payouts: Option<Distribution>,
        next_hand: Option<HandSetup>,
    ) -> Self {
        Self {
            hand_id,
            ts: None,
            setup: setup.clone(),
            actions: settlement.state().actions().to_vec(),
            ledger: settlement.state().players().to_vec(),
            pots: settlement.pots().to_vec(),
            payouts,
            next_hand,
        }
    }
}

pub fn format_hand_id(yyyymmdd: &str, seq: u32) -> String {
    format!("{}-{:06}", yyyymmdd, seq)
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends [`HandRecord`]s to a JSONL file, one record per line.
///
/// Hand ids pair the logger's UTC date with the hand number.
pub struct HandLogger {
    writer: Option<BufWriter<File>>,
    date: String,
}

impl HandLogger {
    /// Opens `path` for appending so successive runs extend one hand log.
    pub fn append<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        ensure_parent(path.as_ref())?;
        let f = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            date: Utc::now().format("%Y%m%d").to_string(),
        })
    }

    pub fn with_date_for_test(date: &str) -> Self {
        Self {
            writer: None,
            date: date.to_string(),
        }
    }

    pub fn hand_id(&self, number: u32) -> String {
        format_hand_id(&self.date, number)
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => create_dir_all(parent),
        _ => Ok(()),
    }
}
