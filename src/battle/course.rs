//! Course progression: which slot is being fought
//!
//! The controller is the only writer of the course cursor. It starts a slot
//! when nothing is active, and moves the cursor on once both dishes it started
//! for the current slot have finished. At most one slot is active at a time.

use serde::{Deserialize, Serialize};

use crate::battle::dish::{Combatant, Phase, TeamSide};
use crate::battle::events::{BattleEventLog, BattleEventType};
use crate::core::types::CombatantId;

/// The course cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseQueue {
    current_index: usize,
    total_courses: usize,
    complete: bool,
}

impl CourseQueue {
    pub fn new(total_courses: usize) -> Self {
        Self {
            current_index: 0,
            total_courses,
            complete: false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total_courses(&self) -> usize {
        self.total_courses
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Owns the course cursor and the pair of dishes started for it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseController {
    queue: CourseQueue,
    current_player: Option<CombatantId>,
    current_opponent: Option<CombatantId>,
}

impl CourseController {
    pub fn new(total_courses: usize) -> Self {
        Self {
            queue: CourseQueue::new(total_courses),
            current_player: None,
            current_opponent: None,
        }
    }

    pub fn queue(&self) -> &CourseQueue {
        &self.queue
    }

    /// Dishes started for the current course, if one is running
    pub fn current_pair(&self) -> Option<(CombatantId, CombatantId)> {
        self.current_player.zip(self.current_opponent)
    }

    /// One progression step: advance past a finished course, then start the
    /// next one if nothing is active.
    pub fn step(&mut self, combatants: &mut [Combatant], start_delay: f32, events: &mut BattleEventLog) {
        if self.queue.complete {
            return;
        }

        self.advance_if_finished(combatants, events);
        if self.queue.complete {
            return;
        }

        self.start_course(combatants, start_delay, events);
    }

    fn advance_if_finished(&mut self, combatants: &[Combatant], events: &mut BattleEventLog) {
        let Some((player_id, opponent_id)) = self.current_pair() else {
            return;
        };

        let finished = |id: CombatantId| {
            combatants
                .iter()
                .find(|c| c.id == id)
                .map_or(true, |c| c.phase() == Phase::Finished)
        };
        if !(finished(player_id) && finished(opponent_id)) {
            return;
        }

        self.current_player = None;
        self.current_opponent = None;
        self.queue.current_index += 1;
        events.push(
            BattleEventType::CourseAdvanced {
                index: self.queue.current_index,
            },
            format!("Course cursor moved to {}", self.queue.current_index),
        );

        if self.queue.current_index >= self.queue.total_courses {
            self.complete(events, "all courses served");
        }
    }

    fn start_course(&mut self, combatants: &mut [Combatant], start_delay: f32, events: &mut BattleEventLog) {
        // Serialization: never start while a slot is still entering or fighting
        if combatants.iter().any(|c| c.phase().is_active()) {
            return;
        }

        // Every queued dish must have run its on-serve setup first
        if combatants
            .iter()
            .any(|c| c.phase() == Phase::InQueue && !c.onserve_fired)
        {
            return;
        }

        let slot = self.queue.current_index;
        let player = find_queued(combatants, TeamSide::Player, slot);
        let opponent = find_queued(combatants, TeamSide::Opponent, slot);

        let (Some(player_idx), Some(opponent_idx)) = (player, opponent) else {
            tracing::info!(
                "No challenger for course {} (player: {}, opponent: {})",
                slot,
                player.is_some(),
                opponent.is_some()
            );
            self.complete(events, "no more challengers");
            return;
        };

        combatants[player_idx].begin_entering(start_delay);
        combatants[opponent_idx].begin_entering(start_delay);

        let player_id = combatants[player_idx].id;
        let opponent_id = combatants[opponent_idx].id;
        self.current_player = Some(player_id);
        self.current_opponent = Some(opponent_id);

        tracing::info!(
            "Starting course {} - Player dish {}, Opponent dish {}",
            slot,
            player_id,
            opponent_id
        );
        events.push(
            BattleEventType::CourseStarted {
                slot,
                player: player_id,
                opponent: opponent_id,
            },
            format!("Course {} served: {} vs {}", slot + 1, player_id, opponent_id),
        );
    }

    fn complete(&mut self, events: &mut BattleEventLog, reason: &str) {
        self.queue.complete = true;
        tracing::info!("Course queue complete at index {}: {}", self.queue.current_index, reason);
        events.push(BattleEventType::QueueComplete, format!("Course queue complete: {}", reason));
    }
}

fn find_queued(combatants: &[Combatant], side: TeamSide, slot: usize) -> Option<usize> {
    combatants
        .iter()
        .position(|c| c.side == side && c.slot() == slot && c.phase() == Phase::InQueue)
}
