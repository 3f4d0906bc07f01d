use potsettle_engine::engine::HandState;
use potsettle_engine::invariants::check_ledger;
use potsettle_engine::notation::parse_hand_file;
use potsettle_engine::rules::TableRules;

const HAND: &str = "Hand (21)
SB 100 BB 200 Ante 200
Stack Setup:
Oli Dealer 3000
Pam SB 1500
Quin BB 900
Rex 5000
Actions:
Preflop Rex raise 600
Preflop Oli call 600
Preflop Pam allin 1500
Preflop Quin allin 700
Preflop Rex raise 3000
Preflop Oli fold
Flop Rex check";

#[test]
fn ledger_identity_holds_after_every_action() {
    let script = parse_hand_file(HAND).unwrap();
    let rules = TableRules::default();
    let mut state = HandState::start(&script.setup, &rules).unwrap();
    assert!(check_ledger(state.players()).is_empty());

    // the flop check is not owed: Rex is the only player left with chips
    let (owed, extra) = script.actions.split_at(6);
    for rec in owed {
        state = state.apply_record(rec).unwrap();
        assert!(check_ledger(state.players()).is_empty(), "after {:?}", rec);
        for p in state.players() {
            assert_eq!(p.stack(), p.starting_stack() - p.total_contribution());
        }
    }
    assert!(state.is_settleable());
    assert!(state.apply_record(&extra[0]).is_err());

    let quin = state.player("Quin").unwrap();
    assert_eq!(quin.ante_posted(), 200);
    assert_eq!(quin.total_contribution(), 900);
    assert_eq!(quin.stack(), 0);
}

#[test]
fn every_intermediate_state_can_be_persisted_and_resumed() {
    let script = parse_hand_file(HAND).unwrap();
    let rules = TableRules::default();
    let mut state = HandState::start(&script.setup, &rules).unwrap();
    for rec in &script.actions[..6] {
        let json = serde_json::to_string(&state).unwrap();
        let resumed: HandState = serde_json::from_str(&json).unwrap();
        assert_eq!(resumed, state);
        state = resumed.apply_record(rec).unwrap();
    }
    assert_eq!(state.actions().len(), 6);
}
