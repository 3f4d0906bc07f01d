use serde::{Deserialize, Serialize};
use std::fmt;

use crate::player::{Chips, Player};

/// Main pot or the n-th side pot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "lowercase")]
pub enum PotKind {
    Main,
    Side(u32),
}

impl fmt::Display for PotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PotKind::Main => f.write_str("Main Pot"),
            PotKind::Side(n) => write!(f, "Side Pot {}", n),
        }
    }
}

/// One tier of the settled pot.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pot {
    pub kind: PotKind,
    pub amount: Chips,
    /// Live contribution level that caps this tier
    pub threshold: Chips,
    /// Players who may win this tier, in seat order
    pub eligible: Vec<String>,
    /// Everyone who put chips into this tier, folded players included
    pub contributors: Vec<String>,
    /// Human-readable derivation, e.g. `(300-0)x3 + 100 dead`
    pub formula: String,
}

impl Pot {
    pub fn name(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_eligible(&self, player: &str) -> bool {
        self.eligible.iter().any(|n| n == player)
    }
}

/// Splits the finished ledger into a main pot and side pots.
///
/// Levels are taken from live money only; antes are dead and always land
/// in the main pot. Adjacent tiers with the same eligible set are merged,
/// so a folded player's contribution level never opens a pot of its own
/// and tied all-ins share a single tier.
#[derive(Debug, Default, Clone)]
pub struct PotManager {
    pots: Vec<Pot>,
}

struct Tier {
    amount: Chips,
    level: Chips,
    eligible: Vec<String>,
    contributors: Vec<String>,
    terms: Vec<String>,
}

impl PotManager {
    pub fn from_players(players: &[Player]) -> Self {
        let contenders: Vec<String> = players
            .iter()
            .filter(|p| p.is_contender())
            .map(|p| p.name().to_string())
            .collect();
        let dead: Chips = players.iter().map(|p| p.ante_posted()).sum();

        let mut levels: Vec<Chips> = players
            .iter()
            .map(|p| p.live_contribution())
            .filter(|&l| l > 0)
            .collect();
        levels.sort_unstable();
        levels.dedup();

        let mut tiers: Vec<Tier> = Vec::new();
        let mut prev = 0;
        for level in levels {
            let in_tier: Vec<&Player> = players
                .iter()
                .filter(|p| p.live_contribution() >= level)
                .collect();
            let amount = (level - prev) * in_tier.len() as Chips;
            let term = format!("({}-{})x{}", level, prev, in_tier.len());
            let eligible: Vec<String> = in_tier
                .iter()
                .filter(|p| p.is_contender())
                .map(|p| p.name().to_string())
                .collect();
            prev = level;

            match tiers.last_mut() {
                Some(last) if last.eligible == eligible || eligible.is_empty() => {
                    last.amount += amount;
                    last.level = level;
                    last.terms.push(term);
                }
                _ => tiers.push(Tier {
                    amount,
                    level,
                    eligible,
                    contributors: in_tier.iter().map(|p| p.name().to_string()).collect(),
                    terms: vec![term],
                }),
            }
        }

        if tiers.is_empty() && dead > 0 {
            tiers.push(Tier {
                amount: 0,
                level: 0,
                eligible: Vec::new(),
                contributors: Vec::new(),
                terms: Vec::new(),
            });
        }
        if let Some(first) = tiers.first_mut() {
            if dead > 0 {
                first.amount += dead;
                first.terms.push(format!("{} dead", dead));
                for p in players.iter().filter(|p| p.ante_posted() > 0) {
                    if !first.contributors.iter().any(|n| n == p.name()) {
                        first.contributors.push(p.name().to_string());
                    }
                }
            }
            // every chip must be winnable by someone still in the hand
            if first.eligible.is_empty() {
                first.eligible = contenders.clone();
            }
        }

        let pots = tiers
            .into_iter()
            .enumerate()
            .map(|(i, t)| Pot {
                kind: if i == 0 {
                    PotKind::Main
                } else {
                    PotKind::Side(i as u32)
                },
                amount: t.amount,
                threshold: t.level,
                eligible: t.eligible,
                contributors: t.contributors,
                formula: t.terms.join(" + "),
            })
            .collect();
        Self { pots }
    }

    pub fn main_pot(&self) -> Option<&Pot> {
        self.pots.first()
    }

    pub fn side_pots(&self) -> &[Pot] {
        self.pots.get(1..).unwrap_or(&[])
    }

    pub fn pots(&self) -> &[Pot] {
        &self.pots
    }

    pub fn total(&self) -> Chips {
        self.pots.iter().map(|p| p.amount).sum()
    }

    pub fn into_pots(self) -> Vec<Pot> {
        self.pots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::Street;
    use crate::player::Position;

    fn contributed(name: &str, stack: Chips, live: Chips) -> Player {
        let mut p = Player::new(name, Position::Other, stack);
        p.commit(live, Street::Preflop).unwrap();
        p
    }

    #[test]
    fn equal_contributions_make_one_pot() {
        let players = vec![contributed("A", 1_000, 200), contributed("B", 1_000, 200)];
        let pm = PotManager::from_players(&players);
        assert_eq!(pm.pots().len(), 1);
        assert_eq!(pm.total(), 400);
        assert_eq!(pm.main_pot().unwrap().eligible, vec!["A", "B"]);
        assert!(pm.side_pots().is_empty());
    }

    #[test]
    fn short_all_in_creates_side_pot() {
        let players = vec![
            contributed("A", 300, 300),
            contributed("B", 1_000, 800),
            contributed("C", 1_000, 800),
        ];
        let pm = PotManager::from_players(&players);
        assert_eq!(pm.pots().len(), 2);
        let main = &pm.pots()[0];
        assert_eq!(main.amount, 900);
        assert_eq!(main.formula, "(300-0)x3");
        let side = &pm.side_pots()[0];
        assert_eq!(side.name(), "Side Pot 1");
        assert_eq!(side.amount, 1_000);
        assert_eq!(side.eligible, vec!["B", "C"]);
    }

    #[test]
    fn folded_level_does_not_open_a_pot() {
        let mut c = contributed("C", 1_000, 100);
        c.fold();
        let players = vec![contributed("A", 500, 500), contributed("B", 500, 500), c];
        let pm = PotManager::from_players(&players);
        assert_eq!(pm.pots().len(), 1);
        let main = pm.main_pot().unwrap();
        assert_eq!(main.amount, 1_100);
        assert_eq!(main.eligible, vec!["A", "B"]);
        assert_eq!(main.contributors, vec!["A", "B", "C"]);
        assert_eq!(main.formula, "(100-0)x3 + (500-100)x2");
    }

    #[test]
    fn tied_all_ins_share_a_tier() {
        let players = vec![
            contributed("A", 200, 200),
            contributed("B", 200, 200),
            contributed("C", 900, 600),
            contributed("D", 900, 600),
        ];
        let pm = PotManager::from_players(&players);
        assert_eq!(pm.pots().len(), 2);
        assert_eq!(pm.pots()[0].amount, 800);
        assert_eq!(pm.pots()[1].amount, 800);
    }

    #[test]
    fn dead_ante_goes_to_main_pot() {
        let mut bb = Player::new("B", Position::BigBlind, 1_000);
        bb.post_ante(100);
        bb.post_blind(100);
        let mut sb = Player::new("A", Position::SmallBlind, 1_000);
        sb.post_blind(50);
        sb.fold();
        let pm = PotManager::from_players(&[sb, bb]);
        let main = pm.main_pot().unwrap();
        assert_eq!(main.amount, 250);
        assert_eq!(main.eligible, vec!["B"]);
        assert_eq!(main.formula, "(50-0)x2 + (100-50)x1 + 100 dead");
    }

    #[test]
    fn only_dead_money_still_forms_a_pot() {
        let mut bb = Player::new("B", Position::BigBlind, 100);
        bb.post_ante(100);
        let sb = Player::new("A", Position::SmallBlind, 1_000);
        let pm = PotManager::from_players(&[sb, bb]);
        assert_eq!(pm.total(), 100);
        assert_eq!(pm.main_pot().unwrap().eligible, vec!["A", "B"]);
    }
}
