use potsettle_engine::engine::{settle_hand, HandState};
use potsettle_engine::errors::EngineError;
use potsettle_engine::game::build_next_hand;
use potsettle_engine::invariants::{check_ledger, check_pots};
use potsettle_engine::notation::{parse_hand_file, parse_setup};
use potsettle_engine::payout::{distribute_winners, EvenSplit, PotAward};
use potsettle_engine::player::{PlayerAction, Position};
use potsettle_engine::rules::TableRules;

fn rules() -> TableRules {
    TableRules::default()
}

#[test]
fn scenario_a_heads_up_no_side_pot() {
    let script = parse_hand_file(
        "Hand (1)
started_at: 00:00:00 ended_at: HH:MM:SS
SB 50 BB 100 Ante 100
Stack Setup:
Alice SB 10000
Bob BB 10000
Actions:
Preflop Alice SB call 100
Preflop Bob BB check
Flop Bob check
Flop Alice check
Turn Bob check
Turn Alice check
River Bob check
River Alice check
Winners:
Main Pot: Alice",
    )
    .expect("parse");

    let settlement = settle_hand(&script.setup, &script.actions, &rules()).expect("settle");
    assert_eq!(settlement.total_pot(), 300);
    assert_eq!(settlement.pots().len(), 1);
    let bob = settlement.state().player("Bob").unwrap();
    assert_eq!(bob.total_contribution(), 200);
    assert_eq!(bob.ante_posted(), 100);

    let payout = distribute_winners(&settlement, &script.awards, &EvenSplit).expect("distribute");
    assert_eq!(payout.new_stack("Alice"), Some(10_200));
    assert_eq!(payout.new_stack("Bob"), Some(9_800));
    assert_eq!(payout.total_distributed(), 300);
}

const SCENARIO_B: &str = "Hand (12)
started_at: 00:10:00 ended_at: 00:12:30
SB 10,000 BB 20,000 Ante 20,000
Stack Setup:
Charlie Dealer 500,000
Alice SB 300,000
Bob BB 880,000
Actions:
Preflop Charlie raise 60000
Preflop Alice allin 300000
Preflop Bob raise 660000
Preflop Charlie fold
Winners:
Main Pot: Alice
Side Pot 1: Bob";

#[test]
fn scenario_b_one_side_pot() {
    let script = parse_hand_file(SCENARIO_B).expect("parse");
    let settlement = settle_hand(&script.setup, &script.actions, &rules()).expect("settle");
    let players = settlement.players();

    let alice = settlement.state().player("Alice").unwrap();
    let bob = settlement.state().player("Bob").unwrap();
    let charlie = settlement.state().player("Charlie").unwrap();
    assert_eq!(alice.total_contribution(), 300_000);
    assert_eq!(alice.stack(), 0);
    assert!(alice.is_all_in());
    assert_eq!(bob.total_contribution(), 680_000);
    assert_eq!(charlie.total_contribution(), 60_000);
    assert!(charlie.is_folded());

    let pots = settlement.pots();
    assert_eq!(pots.len(), 2);
    assert_eq!(pots[0].name(), "Main Pot");
    assert_eq!(pots[0].amount, 680_000);
    assert_eq!(pots[0].eligible, vec!["Alice", "Bob"]);
    assert!(pots[0].contributors.contains(&"Charlie".to_string()));
    assert_eq!(pots[1].name(), "Side Pot 1");
    assert_eq!(pots[1].amount, 360_000);
    assert_eq!(pots[1].eligible, vec!["Bob"]);

    let contributed: u64 = players.iter().map(|p| p.total_contribution()).sum();
    assert_eq!(settlement.total_pot(), contributed);
    assert!(check_ledger(players).is_empty());
    assert!(check_pots(players, pots).is_empty());

    let payout = distribute_winners(&settlement, &script.awards, &EvenSplit).expect("distribute");
    assert_eq!(payout.new_stack("Alice"), Some(680_000));
    assert_eq!(payout.new_stack("Bob"), Some(560_000));
    assert_eq!(payout.new_stack("Charlie"), Some(440_000));
}

#[test]
fn scenario_b_over_stack_call_is_capped_at_zero() {
    let setup = parse_setup(
        "Hand (12)
SB 10000 BB 20000 Ante 20000
Stack Setup:
Charlie Dealer 500000
Alice SB 300000
Bob BB 880000",
    )
    .unwrap();
    let state = HandState::start(&setup, &rules())
        .unwrap()
        .apply("Charlie", PlayerAction::Fold)
        .unwrap()
        .apply("Alice", PlayerAction::Call { to: 20_000 })
        .unwrap()
        .apply("Bob", PlayerAction::Raise { to: 660_000 })
        .unwrap()
        .apply("Alice", PlayerAction::Call { to: 660_000 })
        .unwrap();
    let alice = state.player("Alice").unwrap();
    assert_eq!(alice.stack(), 0);
    assert_eq!(alice.street_contribution(), 300_000);
    assert!(check_ledger(state.players()).is_empty());
    assert_eq!(state.actions().last().unwrap().action, PlayerAction::Call { to: 300_000 });
}

const SCENARIO_C_SETUP: &str = "Hand (3)
SB 5 BB 10 Ante 0
Stack Setup:
P3 Dealer 1000
P1 SB 1000
P2 BB 50";

fn to_flop(setup: &str) -> HandState {
    let setup = parse_setup(setup).unwrap();
    HandState::start(&setup, &rules())
        .unwrap()
        .apply("P3", PlayerAction::Call { to: 10 })
        .unwrap()
        .apply("P1", PlayerAction::Call { to: 10 })
        .unwrap()
        .apply("P2", PlayerAction::Check)
        .unwrap()
        .advance_street()
        .unwrap()
}

#[test]
fn scenario_c_short_all_in_does_not_reopen() {
    let flop = to_flop(SCENARIO_C_SETUP);
    assert_eq!(flop.next_to_act().unwrap().name(), "P1");

    let s = flop
        .apply("P1", PlayerAction::Bet { to: 100 })
        .unwrap()
        .apply("P2", PlayerAction::AllIn { to: 40 })
        .unwrap()
        .apply("P3", PlayerAction::Call { to: 100 })
        .unwrap();

    assert!(s.is_betting_complete());
    let err = s.apply("P1", PlayerAction::Raise { to: 300 }).unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction { .. }));
    assert_eq!(s.player("P2").unwrap().total_contribution(), 50);
}

#[test]
fn short_all_in_raise_lets_earlier_bettor_only_call() {
    let flop = to_flop(&SCENARIO_C_SETUP.replace("P2 BB 50", "P2 BB 140"));
    let s = flop
        .apply("P1", PlayerAction::Bet { to: 100 })
        .unwrap()
        .apply("P2", PlayerAction::AllIn { to: 130 })
        .unwrap()
        .apply("P3", PlayerAction::Call { to: 130 })
        .unwrap();

    assert!(!s.is_betting_complete());
    assert_eq!(s.next_to_act().unwrap().name(), "P1");
    let err = s.apply("P1", PlayerAction::Raise { to: 400 }).unwrap_err();
    assert!(matches!(err, EngineError::IllegalAction { .. }));

    let done = s.apply("P1", PlayerAction::Call { to: 130 }).unwrap();
    assert!(done.is_betting_complete());
    assert_eq!(done.actions().last().unwrap().round, 1);
}

#[test]
fn all_in_opening_bet_below_big_blind_reopens_for_checker() {
    let flop = to_flop(&SCENARIO_C_SETUP.replace("P2 BB 50", "P2 BB 15"));
    let checked = flop.apply("P1", PlayerAction::Check).unwrap();

    let as_bet = checked.apply("P2", PlayerAction::Bet { to: 5 }).unwrap();
    let as_all_in = checked.apply("P2", PlayerAction::AllIn { to: 5 }).unwrap();
    assert_eq!(as_bet.round(), as_all_in.round());
    assert_eq!(as_bet.round().last_full_raise(), 5);

    let s = as_bet
        .apply("P3", PlayerAction::Call { to: 5 })
        .unwrap()
        .apply("P1", PlayerAction::Raise { to: 20 })
        .unwrap();
    assert_eq!(s.round().current_bet(), 20);
    assert_eq!(s.next_to_act().unwrap().name(), "P3");
}

#[test]
fn full_raise_reopens_for_players_who_matched() {
    let flop = to_flop(&SCENARIO_C_SETUP.replace("P2 BB 50", "P2 BB 1000"));
    let s = flop
        .apply("P1", PlayerAction::Bet { to: 100 })
        .unwrap()
        .apply("P2", PlayerAction::Call { to: 100 })
        .unwrap()
        .apply("P3", PlayerAction::Raise { to: 300 })
        .unwrap();
    assert_eq!(s.round().to_act().len(), 2);
    let s = s.apply("P1", PlayerAction::Raise { to: 600 }).unwrap();
    assert_eq!(s.round().current_bet(), 600);
}

#[test]
fn scenario_d_heads_up_rotation() {
    let script = parse_hand_file(
        "Hand (8)
started_at: 00:01:00 ended_at: 00:02:00
SB 50 BB 100 Ante 0
Stack Setup:
Alice SB 5000
Bob BB 5000
Actions:
Preflop Alice fold",
    )
    .unwrap();
    let settlement = settle_hand(&script.setup, &script.actions, &rules()).unwrap();
    let awards = vec![PotAward::new("Main Pot", &["Bob"])];
    let payout = distribute_winners(&settlement, &awards, &EvenSplit).unwrap();
    let next = build_next_hand(&script.setup, &payout, &rules()).unwrap();

    assert_eq!(next.number, 9);
    assert_eq!(next.started_at, "00:02:00");
    assert_eq!(next.seat("Alice").unwrap().position, Position::BigBlind);
    assert_eq!(next.seat("Alice").unwrap().stack, 4_950);
    assert_eq!(next.seat("Bob").unwrap().position, Position::SmallBlind);
    assert_eq!(next.seat("Bob").unwrap().stack, 5_050);
}

#[test]
fn scenario_e_rotation_with_four_players() {
    let script = parse_hand_file(
        "Hand (20)
SB 50 BB 100 Ante 0
Stack Setup:
Alice Dealer 1000
Bob SB 1000
Charlie BB 1000
David 1000
Actions:
Preflop David fold
Preflop Alice fold
Preflop Bob fold",
    )
    .unwrap();
    let settlement = settle_hand(&script.setup, &script.actions, &rules()).unwrap();
    assert_eq!(settlement.total_pot(), 150);
    let awards = vec![PotAward::new("Main Pot", &["Charlie"])];
    let payout = distribute_winners(&settlement, &awards, &EvenSplit).unwrap();
    let next = build_next_hand(&script.setup, &payout, &rules()).unwrap();

    let seats: Vec<(&str, Position)> = next
        .seats
        .iter()
        .map(|s| (s.name.as_str(), s.position))
        .collect();
    assert_eq!(
        seats,
        vec![
            ("Alice", Position::Other),
            ("Bob", Position::Button),
            ("Charlie", Position::SmallBlind),
            ("David", Position::BigBlind),
        ]
    );
    assert_eq!(next.total_chips(), 4_000);
    assert!(next.to_string().contains("Alice 1000\nBob Dealer 950\nCharlie SB 1050\nDavid BB 1000"));
}

#[test]
fn settle_hand_is_deterministic() {
    let script = parse_hand_file(SCENARIO_B).unwrap();
    let a = settle_hand(&script.setup, &script.actions, &rules()).unwrap();
    let b = settle_hand(&script.setup, &script.actions, &rules()).unwrap();
    assert_eq!(a, b);
}
