//! Plain-text hand notation.
//!
//! A hand setup is the block
//!
//! ```text
//! Hand (49)
//! started_at: 00:05:40 ended_at: HH:MM:SS
//! SB 1000000 BB 2000000 Ante 2000000
//! Stack Setup:
//! Bob Dealer 116000000
//! Charlie SB 48000000
//! David BB 0
//! Alice 80000000
//! ```
//!
//! Only Dealer, SB and BB carry a position label. A hand file may follow
//! the setup with an `Actions:` block (`<Street> <Name> [<Position>]
//! <kind> [<to-amount>]`) and a `Winners:` block (`<Pot>: <Name>, ...`).
//! Amounts may use `,` as a thousands separator.

use std::fmt;
use std::str::FromStr;

use crate::errors::{EngineError, EngineResult};
use crate::game::{HandSetup, SeatSetup, DEFAULT_STARTED_AT};
use crate::logger::{ActionRecord, Street};
use crate::payout::PotAward;
use crate::player::{Chips, PlayerAction, Position};
use crate::rules::BlindStructure;

pub const STACK_SETUP_MARKER: &str = "Stack Setup:";
pub const ACTIONS_MARKER: &str = "Actions:";
pub const WINNERS_MARKER: &str = "Winners:";
/// Written for a hand that has not ended yet.
pub const OPEN_TIMESTAMP: &str = "HH:MM:SS";

fn err(line: usize, msg: impl fmt::Display) -> EngineError {
    EngineError::validation(format!("line {}: {}", line, msg))
}

/// Parses a non-negative chip amount, allowing `,` separators.
pub fn parse_chips(s: &str) -> Option<Chips> {
    let digits: String = s.chars().filter(|c| *c != ',').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Non-empty lines with their 1-based line numbers.
fn numbered_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim().trim_start_matches('\u{feff}')))
        .filter(|(_, l)| !l.is_empty())
}

fn parse_header(n: usize, line: &str) -> EngineResult<u32> {
    let inner = line
        .strip_prefix("Hand")
        .map(str::trim)
        .and_then(|r| r.strip_prefix('('))
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(|| err(n, format!("expected \"Hand (N)\", found {:?}", line)))?;
    inner
        .trim()
        .parse()
        .map_err(|_| err(n, format!("invalid hand number {:?}", inner)))
}

fn parse_times(n: usize, line: &str) -> EngineResult<(String, Option<String>)> {
    let mut started = None;
    let mut ended = None;
    let mut tokens = line.split_whitespace();
    while let Some(tok) = tokens.next() {
        match tok {
            "started_at:" => started = tokens.next(),
            "ended_at:" => ended = tokens.next(),
            other => return Err(err(n, format!("unexpected {:?} in timestamp line", other))),
        }
    }
    let started = started.ok_or_else(|| err(n, "missing started_at"))?;
    let ended = ended.filter(|e| *e != OPEN_TIMESTAMP).map(str::to_string);
    Ok((started.to_string(), ended))
}

fn parse_blinds(n: usize, line: &str) -> EngineResult<BlindStructure> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let amount = |key: &str| -> EngineResult<Chips> {
        let at = tokens
            .iter()
            .position(|t| t.eq_ignore_ascii_case(key))
            .ok_or_else(|| err(n, format!("missing {}", key)))?;
        let raw = tokens
            .get(at + 1)
            .ok_or_else(|| err(n, format!("missing amount after {}", key)))?;
        parse_chips(raw).ok_or_else(|| err(n, format!("invalid {} amount {:?}", key, raw)))
    };
    let ante = if tokens.iter().any(|t| t.eq_ignore_ascii_case("Ante")) {
        amount("Ante")?
    } else {
        0
    };
    Ok(BlindStructure::new(amount("SB")?, amount("BB")?, ante))
}

fn parse_seat(n: usize, line: &str) -> EngineResult<SeatSetup> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (name, position, stack) = match tokens.as_slice() {
        [name, stack] => (*name, Position::Other, *stack),
        [name, label, stack] => {
            let pos = Some(*label)
                .filter(|l| is_printed_label(l))
                .and_then(Position::from_label)
                .ok_or_else(|| err(n, format!("unknown position {:?}", label)))?;
            (*name, pos, *stack)
        }
        _ => return Err(err(n, format!("expected \"<Name> [<Position>] <Stack>\", found {:?}", line))),
    };
    let stack = parse_chips(stack).ok_or_else(|| err(n, format!("invalid stack {:?}", stack)))?;
    Ok(SeatSetup::new(name, position, stack))
}

fn is_printed_label(label: &str) -> bool {
    ["Dealer", "SB", "BB"]
        .iter()
        .any(|l| l.eq_ignore_ascii_case(label))
}

fn parse_setup_lines<'a>(lines: &mut impl Iterator<Item = (usize, &'a str)>) -> EngineResult<HandSetup> {
    let (n, line) = lines.next().ok_or_else(|| err(1, "empty hand setup"))?;
    let number = parse_header(n, line)?;

    let (mut n, mut line) = lines.next().ok_or_else(|| err(n + 1, "missing blinds line"))?;
    let (started_at, ended_at) = if line.starts_with("started_at:") {
        let times = parse_times(n, line)?;
        (n, line) = lines.next().ok_or_else(|| err(n + 1, "missing blinds line"))?;
        times
    } else {
        (DEFAULT_STARTED_AT.to_string(), None)
    };
    let blinds = parse_blinds(n, line)?;

    let (n, line) = lines
        .next()
        .ok_or_else(|| err(n + 1, format!("missing {:?}", STACK_SETUP_MARKER)))?;
    if !line.eq_ignore_ascii_case(STACK_SETUP_MARKER) {
        return Err(err(n, format!("expected {:?}, found {:?}", STACK_SETUP_MARKER, line)));
    }

    let mut seats = Vec::new();
    for (n, line) in lines {
        seats.push(parse_seat(n, line)?);
    }
    Ok(HandSetup {
        number,
        started_at,
        ended_at,
        blinds,
        seats,
    })
}

/// Parses a hand setup block. Seating rules are checked when the hand
/// starts, not here.
pub fn parse_setup(text: &str) -> EngineResult<HandSetup> {
    parse_setup_lines(&mut numbered_lines(text))
}

pub fn format_setup(setup: &HandSetup) -> String {
    setup.to_string()
}

impl fmt::Display for HandSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hand ({})", self.number)?;
        writeln!(
            f,
            "started_at: {} ended_at: {}",
            self.started_at,
            self.ended_at.as_deref().unwrap_or(OPEN_TIMESTAMP)
        )?;
        writeln!(
            f,
            "SB {} BB {} Ante {}",
            self.blinds.small_blind, self.blinds.big_blind, self.blinds.ante
        )?;
        write!(f, "{}", STACK_SETUP_MARKER)?;
        for s in &self.seats {
            match s.position.label() {
                Some(label) => write!(f, "\n{} {} {}", s.name, label, s.stack)?,
                None => write!(f, "\n{} {}", s.name, s.stack)?,
            }
        }
        Ok(())
    }
}

impl FromStr for HandSetup {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_setup(s)
    }
}

pub fn parse_action_line(n: usize, line: &str) -> EngineResult<ActionRecord> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(err(
            n,
            format!("expected \"<Street> <Name> [<Position>] <kind> [<to>]\", found {:?}", line),
        ));
    }
    let street = Street::parse(tokens[0]).ok_or_else(|| err(n, format!("unknown street {:?}", tokens[0])))?;
    let player = tokens[1];
    let mut rest = &tokens[2..];
    let position = match rest.first().and_then(|t| Position::from_label(t)) {
        Some(p) if rest.len() > 1 => {
            rest = &rest[1..];
            Some(p)
        }
        _ => None,
    };
    let (kind, amount) = match rest {
        [kind] => (*kind, None),
        [kind, amount] => {
            let to = parse_chips(amount).ok_or_else(|| err(n, format!("invalid amount {:?}", amount)))?;
            (*kind, Some(to))
        }
        _ => return Err(err(n, format!("trailing tokens in {:?}", line))),
    };
    let action = PlayerAction::from_parts(kind, amount).ok_or_else(|| match amount {
        Some(_) => err(n, format!("{:?} takes no amount or is unknown", kind)),
        None => err(n, format!("{:?} needs a to-amount or is unknown", kind)),
    })?;
    Ok(ActionRecord {
        player: player.to_string(),
        position,
        street,
        round: 0,
        action,
    })
}

pub fn format_action(record: &ActionRecord) -> String {
    let mut out = format!("{} {}", record.street, record.player);
    if let Some(label) = record.position.and_then(|p| p.label()) {
        out.push(' ');
        out.push_str(label);
    }
    out.push(' ');
    out.push_str(record.action.keyword());
    if let Some(to) = record.action.to_amount() {
        out.push_str(&format!(" {}", to));
    }
    out
}

pub fn parse_winner_line(n: usize, line: &str) -> EngineResult<PotAward> {
    let (pot, names) = line
        .split_once(':')
        .ok_or_else(|| err(n, format!("expected \"<Pot>: <Name>[, <Name>...]\", found {:?}", line)))?;
    let winners: Vec<String> = names
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    Ok(PotAward {
        pot: pot.trim().to_string(),
        winners,
    })
}

pub fn format_winner_line(award: &PotAward) -> String {
    format!("{}: {}", award.pot, award.winners.join(", "))
}

/// A complete hand file: setup, action log and pot winners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandScript {
    pub setup: HandSetup,
    pub actions: Vec<ActionRecord>,
    pub awards: Vec<PotAward>,
}

#[derive(PartialEq)]
enum Section {
    Setup,
    Actions,
    Winners,
}

pub fn parse_hand_file(text: &str) -> EngineResult<HandScript> {
    let mut setup_lines = Vec::new();
    let mut actions = Vec::new();
    let mut awards = Vec::new();
    let mut section = Section::Setup;

    for (n, line) in numbered_lines(text) {
        if line.eq_ignore_ascii_case(ACTIONS_MARKER) {
            if section != Section::Setup {
                return Err(err(n, "unexpected Actions: block"));
            }
            section = Section::Actions;
            continue;
        }
        if line.eq_ignore_ascii_case(WINNERS_MARKER) {
            if section == Section::Winners {
                return Err(err(n, "duplicate Winners: block"));
            }
            section = Section::Winners;
            continue;
        }
        match section {
            Section::Setup => setup_lines.push((n, line)),
            Section::Actions => actions.push(parse_action_line(n, line)?),
            Section::Winners => awards.push(parse_winner_line(n, line)?),
        }
    }
    let setup = parse_setup_lines(&mut setup_lines.into_iter())?;
    Ok(HandScript {
        setup,
        actions,
        awards,
    })
}

impl fmt::Display for HandScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.setup)?;
        if !self.actions.is_empty() {
            write!(f, "\n{}", ACTIONS_MARKER)?;
            for a in &self.actions {
                write!(f, "\n{}", format_action(a))?;
            }
        }
        if !self.awards.is_empty() {
            write!(f, "\n{}", WINNERS_MARKER)?;
            for a in &self.awards {
                write!(f, "\n{}", format_winner_line(a))?;
            }
        }
        Ok(())
    }
}
