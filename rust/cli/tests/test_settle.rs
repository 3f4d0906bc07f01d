use std::fs;

use serde_json::Value;

const HEADS_UP: &str = "Hand (1)
started_at: 00:05:40 ended_at: 00:06:10
SB 50 BB 100 Ante 100
Stack Setup:
Alice SB 10000
Bob BB 10000
Actions:
Preflop Alice call 100
Preflop Bob check
Flop Bob check
Flop Alice check
Turn Bob check
Turn Alice check
River Bob check
River Alice check
";

fn write_hand(dir: &tempfile::TempDir, name: &str, text: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

fn run(args: &[&str]) -> (i32, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let mut argv = vec!["potsettle"];
    argv.extend_from_slice(args);
    let code = potsettle_cli::run(argv, &mut out, &mut err);
    (
        code,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn settle_prints_pots_and_player_rows() {
    let dir = tempfile::tempdir().unwrap();
    let text = format!("{}Winners:\nMain Pot: Alice\n", HEADS_UP);
    let path = write_hand(&dir, "hand.txt", &text);

    let (code, out, _) = run(&["settle", "--input", &path]);
    assert_eq!(code, 0);
    assert!(out.starts_with("Hand (1)\nTotal Pot: 300\nPots:\n  Main Pot: 300 [Alice, Bob]"));
    let alice = out.lines().find(|l| l.trim_start().starts_with("Alice")).unwrap();
    assert!(alice.contains("yes"));
    assert!(alice.trim_end().ends_with("10200"));
    let bob = out.lines().find(|l| l.trim_start().starts_with("Bob")).unwrap();
    assert!(bob.contains(" no "));
    assert!(bob.trim_end().ends_with("9800"));
}

#[test]
fn settle_json_output_is_machine_readable() {
    let dir = tempfile::tempdir().unwrap();
    let text = format!("{}Winners:\nMain Pot: Alice, Bob\n", HEADS_UP);
    let path = write_hand(&dir, "hand.txt", &text);

    let (code, out, _) = run(&["settle", "--input", &path, "--format", "json"]);
    assert_eq!(code, 0);
    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["hand"], 1);
    assert_eq!(v["total_pot"], 300);
    assert_eq!(v["distributed"], 300);
    assert_eq!(v["pots"].as_array().unwrap().len(), 1);
    // odd chips go left of the button; here the pot splits evenly
    assert_eq!(v["players"][0]["new_stack"], 10_050);
    assert_eq!(v["players"][1]["new_stack"], 9_950);
    assert_eq!(v["players"][0]["position"], "SB");
}

#[test]
fn settle_without_winners_warns_and_skips_payouts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_hand(&dir, "hand.txt", HEADS_UP);

    let (code, out, err) = run(&["settle", "--input", &path]);
    assert_eq!(code, 0);
    assert!(err.contains("WARNING: no Winners: section"));
    let alice = out.lines().find(|l| l.trim_start().starts_with("Alice")).unwrap();
    assert!(alice.trim_end().ends_with('-'));
}

#[test]
fn uncontested_pot_needs_no_winner_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_hand(
        &dir,
        "walk.txt",
        "Hand (2)\nSB 50 BB 100 Ante 100\nStack Setup:\nAlice SB 1000\nBob BB 1000\nActions:\nPreflop Alice fold\n",
    );
    let (code, out, err) = run(&["settle", "--input", &path, "--format", "json"]);
    assert_eq!(code, 0, "{err}");
    assert!(err.is_empty());
    let v: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(v["players"][1]["new_stack"], 1_050);
    assert_eq!(v["players"][1]["is_winner"], true);
}

#[test]
fn illegal_action_exits_with_two() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_hand(
        &dir,
        "bad.txt",
        "Hand (1)\nSB 50 BB 100 Ante 0\nStack Setup:\nAlice SB 1000\nBob BB 1000\nActions:\nPreflop Bob check\n",
    );
    let (code, out, err) = run(&["settle", "--input", &path]);
    assert_eq!(code, 2);
    assert!(out.is_empty());
    assert!(err.contains("Error: Engine error: Illegal action by Bob"));
    assert!(err.contains("out of turn, Alice to act"));
}

#[test]
fn parse_errors_name_the_file_and_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_hand(
        &dir,
        "typo.txt",
        "Hand (1)\nSB 50 BB 100 Ante 0\nStack Setup:\nAlice SB 1000\nBob BB 1000\nActions:\nPreflop Alice dance 100\n",
    );
    let (code, _, err) = run(&["settle", "--input", &path]);
    assert_eq!(code, 2);
    assert!(err.contains("Invalid input"));
    assert!(err.contains("typo.txt"));
    assert!(err.contains("line 7"));
}

#[test]
fn ineligible_winner_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let text = format!("{}Winners:\nMain Pot: Carol\n", HEADS_UP);
    let path = write_hand(&dir, "hand.txt", &text);
    let (code, _, err) = run(&["settle", "--input", &path]);
    assert_eq!(code, 2);
    assert!(err.contains("Carol"));
}

#[test]
fn missing_file_and_missing_args_exit_with_two() {
    let (code, _, err) = run(&["settle", "--input", "/no/such/hand.txt"]);
    assert_eq!(code, 2);
    assert!(err.contains("/no/such/hand.txt"));

    let (code, _, err) = run(&["settle"]);
    assert_eq!(code, 2);
    assert!(err.contains("Usage: potsettle"));

    let (code, out, _) = run(&["--help"]);
    assert_eq!(code, 0);
    assert!(out.contains("settle"));
}
