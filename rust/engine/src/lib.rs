//! # potsettle-engine: Poker Hand Settlement Core
//!
//! A deterministic settlement engine for Texas Hold'em hands. Given starting
//! stacks, blinds and ante, and the recorded betting actions of a hand, it
//! tracks every chip through the streets, partitions the pot into main and
//! side pots, pays the externally chosen winners and seats the next hand.
//!
//! ## Core Modules
//!
//! - [`player`] - Per-player chip ledger, positions and the action union
//! - [`rules`] - Blinds and antes, action legality and the reopening rule
//! - [`order`] - Acting order per street
//! - [`engine`] - Hand state transitions and [`engine::settle_hand`]
//! - [`pot`] - Main and side pot partitioning
//! - [`payout`] - Winner distribution via [`payout::distribute_winners`]
//! - [`game`] - Hand setup and [`game::build_next_hand`]
//! - [`invariants`] - Ledger, pot and trace consistency checks
//! - [`notation`] - The `Hand (N)` text format
//! - [`logger`] - Streets, action records and JSONL hand records
//! - [`errors`] - Error types for engine operations
//!
//! ## Quick Start
//!
//! ```rust
//! use potsettle_engine::engine::settle_hand;
//! use potsettle_engine::game::build_next_hand;
//! use potsettle_engine::notation::parse_hand_file;
//! use potsettle_engine::payout::{distribute_winners, EvenSplit};
//! use potsettle_engine::rules::TableRules;
//!
//! let script = parse_hand_file(
//!     "Hand (1)
//! started_at: 00:05:40 ended_at: HH:MM:SS
//! SB 50 BB 100 Ante 100
//! Stack Setup:
//! Alice SB 10000
//! Bob BB 10000
//! Actions:
//! Preflop Alice call 100
//! Preflop Bob check
//! Flop Bob check
//! Flop Alice check
//! Turn Bob check
//! Turn Alice check
//! River Bob check
//! River Alice check
//! Winners:
//! Main Pot: Alice",
//! )
//! .unwrap();
//!
//! let rules = TableRules::default();
//! let settlement = settle_hand(&script.setup, &script.actions, &rules).unwrap();
//! assert_eq!(settlement.total_pot(), 300);
//!
//! let payout = distribute_winners(&settlement, &script.awards, &EvenSplit).unwrap();
//! assert_eq!(payout.new_stack("Alice"), Some(10_200));
//!
//! let next = build_next_hand(&script.setup, &payout, &rules).unwrap();
//! assert!(next.to_string().starts_with("Hand (2)"));
//! ```

pub mod engine;
pub mod errors;
pub mod game;
pub mod invariants;
pub mod logger;
pub mod notation;
pub mod order;
pub mod payout;
pub mod player;
pub mod pot;
pub mod rules;
