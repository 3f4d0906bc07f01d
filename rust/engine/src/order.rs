//! Acting order per street.
//!
//! One rule covers every table size: preflop action starts left of the big
//! blind, postflop action starts left of the button, and play continues
//! clockwise. Heads-up the small blind holds the button, which yields
//! SB-then-BB preflop and BB-then-SB afterwards.

use crate::logger::Street;
use crate::player::{Player, Position};

fn seat_of(players: &[Player], position: Position) -> Option<usize> {
    players.iter().position(|p| p.position() == position)
}

/// Seat holding the button; the small blind when no `Button` is seated.
pub fn button_seat(players: &[Player]) -> usize {
    seat_of(players, Position::Button)
        .or_else(|| seat_of(players, Position::SmallBlind))
        .unwrap_or(0)
}

pub fn big_blind_seat(players: &[Player]) -> usize {
    seat_of(players, Position::BigBlind).unwrap_or(0)
}

/// Seats clockwise starting immediately left of `seat`, ending with `seat`.
pub fn clockwise_after(seat_count: usize, seat: usize) -> impl Iterator<Item = usize> {
    (1..=seat_count).map(move |offset| (seat + offset) % seat_count)
}

/// Players who still owe an action on `street`, first actor first.
pub fn acting_order(players: &[Player], street: Street) -> Vec<usize> {
    if players.is_empty() {
        return Vec::new();
    }
    let anchor = match street {
        Street::Preflop => big_blind_seat(players),
        _ => button_seat(players),
    };
    clockwise_after(players.len(), anchor)
        .filter(|&seat| players[seat].can_act())
        .collect()
}

/// Players left to respond after `seat` raised, in clockwise order.
pub fn respond_after(players: &[Player], seat: usize) -> Vec<usize> {
    clockwise_after(players.len(), seat)
        .filter(|&s| s != seat && players[s].can_act())
        .collect()
}

pub fn first_to_act(players: &[Player], street: Street) -> Option<usize> {
    acting_order(players, street).first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(positions: &[(&str, Position)]) -> Vec<Player> {
        positions
            .iter()
            .map(|(n, pos)| Player::new(*n, *pos, 1_000))
            .collect()
    }

    fn names(players: &[Player], order: &[usize]) -> Vec<String> {
        order.iter().map(|&s| players[s].name().to_string()).collect()
    }

    #[test]
    fn heads_up_order() {
        let t = table(&[("Alice", Position::SmallBlind), ("Bob", Position::BigBlind)]);
        assert_eq!(names(&t, &acting_order(&t, Street::Preflop)), ["Alice", "Bob"]);
        assert_eq!(names(&t, &acting_order(&t, Street::Flop)), ["Bob", "Alice"]);
    }

    #[test]
    fn three_handed_order() {
        let t = table(&[
            ("Carol", Position::Button),
            ("Alice", Position::SmallBlind),
            ("Bob", Position::BigBlind),
        ]);
        assert_eq!(
            names(&t, &acting_order(&t, Street::Preflop)),
            ["Carol", "Alice", "Bob"]
        );
        assert_eq!(
            names(&t, &acting_order(&t, Street::River)),
            ["Alice", "Bob", "Carol"]
        );
    }

    #[test]
    fn four_handed_utg_first_preflop_sb_first_postflop() {
        let t = table(&[
            ("D", Position::Button),
            ("S", Position::SmallBlind),
            ("B", Position::BigBlind),
            ("U", Position::Other),
            ("C", Position::Other),
        ]);
        assert_eq!(
            names(&t, &acting_order(&t, Street::Preflop)),
            ["U", "C", "D", "S", "B"]
        );
        assert_eq!(
            names(&t, &acting_order(&t, Street::Turn)),
            ["S", "B", "U", "C", "D"]
        );
    }

    #[test]
    fn folded_and_all_in_players_are_skipped() {
        let mut t = table(&[
            ("D", Position::Button),
            ("S", Position::SmallBlind),
            ("B", Position::BigBlind),
            ("U", Position::Other),
        ]);
        t[1].fold();
        t[3].commit(1_000, Street::Preflop).unwrap();
        assert_eq!(names(&t, &acting_order(&t, Street::Flop)), ["B", "D"]);
        assert_eq!(first_to_act(&t, Street::Flop), Some(2));
    }

    #[test]
    fn respond_after_excludes_raiser() {
        let t = table(&[
            ("D", Position::Button),
            ("S", Position::SmallBlind),
            ("B", Position::BigBlind),
        ]);
        assert_eq!(respond_after(&t, 1), vec![2, 0]);
    }
}
