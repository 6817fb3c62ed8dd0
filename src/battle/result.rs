//! Slot outcomes and the final battle result

use serde::{Deserialize, Serialize};

/// Winner of a slot, or of the whole battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Winner {
    Player,
    Opponent,
    Tie,
}

impl Winner {
    /// Winner given which sides dropped to zero Body. None if neither did.
    pub fn from_defeats(player_defeated: bool, opponent_defeated: bool) -> Option<Self> {
        match (player_defeated, opponent_defeated) {
            (true, true) => Some(Winner::Tie),
            (false, true) => Some(Winner::Player),
            (true, false) => Some(Winner::Opponent),
            (false, false) => None,
        }
    }
}

/// Result of one course slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOutcome {
    pub slot_index: usize,
    pub winner: Winner,
    /// Bites resolved across every pairing fought for this slot
    pub ticks: u32,
}

/// Aggregate result of a battle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleResult {
    pub outcomes: Vec<SlotOutcome>,
    pub player_wins: u32,
    pub opponent_wins: u32,
    pub ties: u32,
    pub outcome: Winner,
}

impl BattleResult {
    /// Tally slot outcomes; more slot wins takes the battle, equal is a tie
    pub fn from_outcomes(outcomes: &[SlotOutcome]) -> Self {
        let mut player_wins = 0;
        let mut opponent_wins = 0;
        let mut ties = 0;

        for outcome in outcomes {
            match outcome.winner {
                Winner::Player => player_wins += 1,
                Winner::Opponent => opponent_wins += 1,
                Winner::Tie => ties += 1,
            }
        }

        let outcome = match player_wins.cmp(&opponent_wins) {
            std::cmp::Ordering::Greater => Winner::Player,
            std::cmp::Ordering::Less => Winner::Opponent,
            std::cmp::Ordering::Equal => Winner::Tie,
        };

        Self {
            outcomes: outcomes.to_vec(),
            player_wins,
            opponent_wins,
            ties,
            outcome,
        }
    }
}

/// Builds the battle result exactly once per battle
#[derive(Debug, Clone, Default)]
pub struct ResultAggregator {
    result: Option<BattleResult>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finalize from the recorded outcomes. Later calls return the first result
    /// unchanged.
    pub fn finalize(&mut self, outcomes: &[SlotOutcome]) -> &BattleResult {
        if self.result.is_some() {
            tracing::debug!("Battle result already finalized, ignoring");
        }
        self.result.get_or_insert_with(|| {
            let result = BattleResult::from_outcomes(outcomes);
            tracing::info!(
                "Battle result: {:?} (player {}, opponent {}, ties {})",
                result.outcome,
                result.player_wins,
                result.opponent_wins,
                result.ties
            );
            result
        })
    }

    pub fn is_finalized(&self) -> bool {
        self.result.is_some()
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.result.as_ref()
    }

    pub fn reset(&mut self) {
        self.result = None;
    }
}
