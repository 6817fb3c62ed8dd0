//! Dishes in battle: the combatant record and its phase state machine
//!
//! Phases only ever move forward: InQueue → Entering → InCombat → Finished.
//! A chained re-pair may jump straight from InQueue to InCombat, which is
//! still forward.

use serde::{Deserialize, Serialize};

use crate::battle::constants::MIN_BITE_DAMAGE;
use crate::core::types::CombatantId;

/// Which roster a dish belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeamSide {
    Player,
    Opponent,
}

impl TeamSide {
    pub fn opposite(self) -> Self {
        match self {
            TeamSide::Player => TeamSide::Opponent,
            TeamSide::Opponent => TeamSide::Player,
        }
    }
}

impl std::fmt::Display for TeamSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamSide::Player => write!(f, "Player"),
            TeamSide::Opponent => write!(f, "Opponent"),
        }
    }
}

/// Dish phase, ordered by progression
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Phase {
    #[default]
    InQueue, // Waiting for its course
    Entering, // Entry window, no combat yet
    InCombat, // Eligible for bites
    Finished, // Terminal
}

impl Phase {
    /// Entering or InCombat: the dish occupies the active course
    pub fn is_active(self) -> bool {
        match self {
            Phase::Entering | Phase::InCombat => true,
            Phase::InQueue | Phase::Finished => false,
        }
    }

    /// Can still be picked as a chained opponent
    pub fn is_waiting(self) -> bool {
        match self {
            Phase::InQueue | Phase::Entering => true,
            Phase::InCombat | Phase::Finished => false,
        }
    }
}

/// A single dish placed into battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub side: TeamSide,
    slot: usize,
    pub dish: String,
    phase: Phase,

    // Timers
    pub bite_timer: f32,
    pub enter_progress: f32,

    // Stats
    pub base_zing: i32,
    pub base_body: i32,
    pub current_zing: i32,
    /// Not clamped: overkill stays negative
    pub current_body: i32,

    pub onserve_fired: bool,
}

impl Combatant {
    pub fn new(
        id: CombatantId,
        side: TeamSide,
        slot: usize,
        dish: impl Into<String>,
        zing: i32,
        body: i32,
    ) -> Self {
        Self {
            id,
            side,
            slot,
            dish: dish.into(),
            phase: Phase::InQueue,
            bite_timer: 0.0,
            enter_progress: 0.0,
            base_zing: zing,
            base_body: body,
            current_zing: zing,
            current_body: body,
            onserve_fired: false,
        }
    }

    /// Course slot, fixed for the combatant's lifetime
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Move to a later phase. Backwards or same-phase moves are ignored.
    pub fn transition(&mut self, next: Phase) -> bool {
        if next <= self.phase {
            tracing::warn!(
                "Ignoring phase change for dish {} ({:?} -> {:?})",
                self.id,
                self.phase,
                next
            );
            return false;
        }
        self.phase = next;
        true
    }

    /// Fire the on-serve setup once. Returns true the first time.
    pub fn fire_onserve(&mut self) -> bool {
        if self.onserve_fired {
            return false;
        }
        self.onserve_fired = true;
        true
    }

    /// Start the entry window. Progress begins negative to cover the start delay.
    pub fn begin_entering(&mut self, start_delay: f32) -> bool {
        if !self.transition(Phase::Entering) {
            return false;
        }
        self.enter_progress = -start_delay;
        true
    }

    /// Advance the entry window. Returns true when the dish entered combat.
    pub fn advance_entry(&mut self, dt: f32, enter_duration: f32) -> bool {
        if self.phase != Phase::Entering {
            return false;
        }

        if self.enter_progress < 0.0 {
            self.enter_progress = (self.enter_progress + dt).min(0.0);
            return false;
        }

        self.enter_progress = (self.enter_progress + dt / enter_duration).min(1.0);
        if self.enter_progress >= 1.0 {
            self.enter_combat();
            return true;
        }
        false
    }

    /// Put the dish into a fresh combat state
    pub fn enter_combat(&mut self) {
        if self.phase != Phase::InCombat {
            self.transition(Phase::InCombat);
        }
        self.enter_progress = 1.0;
        self.bite_timer = 0.0;
    }

    pub fn finish(&mut self) {
        if self.phase != Phase::Finished {
            self.transition(Phase::Finished);
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.current_body <= 0
    }

    /// Damage one bite from this dish deals; zero or negative Zing still bites for 1
    pub fn bite_damage(&self) -> i32 {
        self.current_zing.max(MIN_BITE_DAMAGE)
    }

    /// Saturates at `i32::MIN` so extreme rosters still end defeated
    pub fn take_bite(&mut self, damage: i32) {
        self.current_body = self.current_body.saturating_sub(damage);
    }
}
