//! Roster intake: team documents → combatants
//!
//! Rosters arrive as JSON (`{"team": [{"slot": 0, "zing": 2, "body": 5, "dish": "Potato"}]}`)
//! or are generated from a seed. Slot indices are trusted; duplicates are
//! logged and passed through.

use std::path::Path;

use ahash::AHashSet;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::{RANDOM_STAT_MAX, RANDOM_STAT_MIN};
use crate::battle::dish::{Combatant, TeamSide};
use crate::core::error::{BattleError, Result};
use crate::core::types::CombatantId;

const RANDOM_DISH_NAMES: &[&str] = &[
    "Potato", "Salmon", "Ramen", "Taco", "Curry", "Dumpling", "Paella", "Risotto", "Pho",
    "Kimchi",
];

/// One dish entry in a roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishSpec {
    pub slot: usize,
    pub zing: i32,
    pub body: i32,
    #[serde(default = "default_dish_name")]
    pub dish: String,
}

fn default_dish_name() -> String {
    "Dish".to_string()
}

impl DishSpec {
    pub fn new(slot: usize, zing: i32, body: i32, dish: impl Into<String>) -> Self {
        Self {
            slot,
            zing,
            body,
            dish: dish.into(),
        }
    }
}

/// A team as supplied from outside the engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team: Vec<DishSpec>,
}

impl TeamRoster {
    pub fn new(team: Vec<DishSpec>) -> Self {
        Self { team }
    }

    /// Build from `(slot, zing, body)` tuples, naming dishes after their slot
    pub fn from_stats(stats: &[(usize, i32, i32)]) -> Self {
        Self::new(
            stats
                .iter()
                .map(|&(slot, zing, body)| DishSpec::new(slot, zing, body, format!("Dish {}", slot)))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.team.len()
    }

    pub fn is_empty(&self) -> bool {
        self.team.is_empty()
    }

    /// Parse a roster document; malformed documents are `InvalidRoster`
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| BattleError::InvalidRoster(e.to_string()))
    }

    /// Load a roster from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content).map_err(|e| match e {
            BattleError::InvalidRoster(msg) => {
                BattleError::InvalidRoster(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Random roster with 1..=courses dishes in slots 0..n
    pub fn random(rng: &mut impl Rng, courses: usize) -> Self {
        let count = rng.gen_range(1..=courses.max(1));
        let team = (0..count)
            .map(|slot| {
                let name = RANDOM_DISH_NAMES[rng.gen_range(0..RANDOM_DISH_NAMES.len())];
                DishSpec::new(
                    slot,
                    rng.gen_range(RANDOM_STAT_MIN..=RANDOM_STAT_MAX),
                    rng.gen_range(RANDOM_STAT_MIN..=RANDOM_STAT_MAX),
                    name,
                )
            })
            .collect();
        Self { team }
    }

    fn warn_duplicate_slots(&self, side: TeamSide) {
        let mut seen = AHashSet::new();
        for spec in &self.team {
            if !seen.insert(spec.slot) {
                tracing::warn!("{} roster has duplicate slot {}", side, spec.slot);
            }
        }
    }
}

/// Turn both rosters into combatants with sequential ids, player side first
pub fn instantiate(player: &TeamRoster, opponent: &TeamRoster) -> Vec<Combatant> {
    player.warn_duplicate_slots(TeamSide::Player);
    opponent.warn_duplicate_slots(TeamSide::Opponent);

    let sides = [(TeamSide::Player, player), (TeamSide::Opponent, opponent)];
    sides
        .iter()
        .flat_map(|(side, roster)| roster.team.iter().map(move |spec| (*side, spec)))
        .enumerate()
        .map(|(i, (side, spec))| {
            Combatant::new(
                CombatantId(i as u32),
                side,
                spec.slot,
                spec.dish.clone(),
                spec.zing,
                spec.body,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::dish::Phase;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_parse_roster_json() {
        let json = r#"{"team":[{"slot":0,"zing":2,"body":5,"dish":"Potato"},{"slot":1,"zing":1,"body":3}]}"#;
        let roster = TeamRoster::from_json_str(json).expect("valid roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.team[0], DishSpec::new(0, 2, 5, "Potato"));
        assert_eq!(roster.team[1].dish, "Dish");
    }

    #[test]
    fn test_malformed_roster_is_error() {
        let err = TeamRoster::from_json_str(r#"{"team":[{"slot":"zero"}]}"#).unwrap_err();
        assert!(matches!(err, BattleError::InvalidRoster(_)));

        let err = TeamRoster::from_json_str("not json").unwrap_err();
        assert!(matches!(err, BattleError::InvalidRoster(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TeamRoster::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, BattleError::IoError(_)));
    }

    #[test]
    fn test_instantiate_assigns_sides_and_ids() {
        let player = TeamRoster::from_stats(&[(0, 2, 5), (1, 3, 3)]);
        let opponent = TeamRoster::from_stats(&[(0, 1, 5)]);
        let combatants = instantiate(&player, &opponent);

        assert_eq!(combatants.len(), 3);
        assert_eq!(combatants[0].id, CombatantId(0));
        assert_eq!(combatants[0].side, TeamSide::Player);
        assert_eq!(combatants[1].slot(), 1);
        assert_eq!(combatants[2].id, CombatantId(2));
        assert_eq!(combatants[2].side, TeamSide::Opponent);
        assert!(combatants.iter().all(|c| c.phase() == Phase::InQueue));
    }

    #[test]
    fn test_negative_stats_pass_through() {
        let player = TeamRoster::from_stats(&[(0, -3, -1)]);
        let combatants = instantiate(&player, &TeamRoster::default());
        assert_eq!(combatants[0].base_zing, -3);
        assert_eq!(combatants[0].current_body, -1);
    }

    #[test]
    fn test_random_roster_is_seeded() {
        let a = TeamRoster::random(&mut ChaCha8Rng::seed_from_u64(42), 7);
        let b = TeamRoster::random(&mut ChaCha8Rng::seed_from_u64(42), 7);
        assert_eq!(a, b);
        assert!(!a.is_empty() && a.len() <= 7);
        for (i, spec) in a.team.iter().enumerate() {
            assert_eq!(spec.slot, i);
            assert!((RANDOM_STAT_MIN..=RANDOM_STAT_MAX).contains(&spec.zing));
            assert!((RANDOM_STAT_MIN..=RANDOM_STAT_MAX).contains(&spec.body));
        }
    }
}
