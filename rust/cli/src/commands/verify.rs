//! Verify command handler module.
//!
//! Checks a JSONL hand log (plain or `.zst`) record by record:
//!
//! - Every line parses as a `HandRecord` with a `YYYYMMDD-NNNNNN` hand id
//! - The Invariant Validator finds nothing wrong with the record: ledger
//!   identity, pot totals and eligibility, first actor per street, a replay
//!   that matches the recorded ledger and pots, distribution totals and
//!   next-hand chip conservation
//! - A record that follows one carrying a next hand starts from that setup
//!
//! Errors are collected using the shared `BatchValidationError` pattern so
//! every problem is reported, not just the first.

use std::collections::HashSet;
use std::io::Write;

use potsettle_engine::game::HandSetup;
use potsettle_engine::invariants::validate_record;
use potsettle_engine::logger::HandRecord;

use crate::error::{BatchValidationError, CliError};
use crate::io_utils::read_text_auto;

/// The `usize` context is the 1-based record number.
type VerifyError = BatchValidationError<usize>;

pub fn handle_verify_command(
    input: &str,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let rules = super::load_config()?.config.table_rules();
    let content = read_text_auto(input)?;

    let valid_id = |s: &str| -> bool {
        s.len() == 15
            && s.is_ascii()
            && s[0..8].chars().all(|c| c.is_ascii_digit())
            && &s[8..9] == "-"
            && s[9..].chars().all(|c| c.is_ascii_digit())
    };

    let mut errors: Vec<VerifyError> = Vec::new();
    let mut hands = 0usize;
    let mut expected_setup: Option<HandSetup> = None;

    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        hands += 1;
        let record: HandRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                errors.push(VerifyError {
                    item_context: hands,
                    message: format!("Invalid record structure: {}", e),
                });
                expected_setup = None;
                continue;
            }
        };

        if !valid_id(&record.hand_id) {
            errors.push(VerifyError {
                item_context: hands,
                message: format!("Invalid hand_id format: {}", record.hand_id),
            });
        }

        if let Some(expected) = &expected_setup
            && !same_table(expected, &record.setup)
        {
            errors.push(VerifyError {
                item_context: hands,
                message: format!(
                    "Hand ({}) does not start from the next hand recorded before it",
                    record.setup.number
                ),
            });
        }

        for violation in validate_record(&record, &rules) {
            errors.push(VerifyError {
                item_context: hands,
                message: violation.to_string(),
            });
        }
        expected_setup = record.next_hand;
    }

    if errors.is_empty() {
        writeln!(out, "Verify: OK (hands={})", hands)?;
        return Ok(());
    }

    writeln!(out, "Verify: FAIL (hands={})", hands)?;
    writeln!(err)?;
    writeln!(err, "Errors found:")?;
    for error in &errors {
        writeln!(err, "  Hand {}", error)?;
    }
    writeln!(err)?;
    let invalid_hands = errors
        .iter()
        .map(|e| e.item_context)
        .collect::<HashSet<_>>()
        .len();
    writeln!(
        err,
        "Summary: {} error(s) in {} hands ({} invalid hands)",
        errors.len(),
        hands,
        invalid_hands
    )?;
    Err(CliError::InvalidInput(format!(
        "{} validation errors found",
        errors.len()
    )))
}

/// Timestamps are ignored: a played hand gains an `ended_at` the recorded
/// next hand never had.
fn same_table(expected: &HandSetup, actual: &HandSetup) -> bool {
    expected.number == actual.number
        && expected.blinds == actual.blinds
        && expected.seats == actual.seats
}

#[cfg(test)]
mod tests {
    use super::*;
    use potsettle_engine::notation::parse_setup;

    #[test]
    fn same_table_ignores_timestamps() {
        let a = parse_setup(
            "Hand (2)\nstarted_at: 00:10:00 ended_at: HH:MM:SS\nSB 5 BB 10 Ante 0\nStack Setup:\nA SB 100\nB BB 100",
        )
        .unwrap();
        let b = parse_setup(
            "Hand (2)\nstarted_at: 00:10:00 ended_at: 00:12:00\nSB 5 BB 10 Ante 0\nStack Setup:\nA SB 100\nB BB 100",
        )
        .unwrap();
        assert!(same_table(&a, &b));
        let c = parse_setup("Hand (2)\nSB 5 BB 10 Ante 0\nStack Setup:\nA SB 90\nB BB 110").unwrap();
        assert!(!same_table(&a, &c));
    }
}
