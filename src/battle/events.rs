//! Combat event log
//!
//! The ordered event stream is the engine's observable output; two runs with
//! the same rosters, config and step sizes produce identical logs.

use serde::{Deserialize, Serialize};

use crate::battle::dish::TeamSide;
use crate::battle::result::{SlotOutcome, Winner};
use crate::core::types::{CombatantId, Seconds, Tick};

/// Log entry for battle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleEvent {
    pub tick: Tick,
    pub time: Seconds,
    pub event_type: BattleEventType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    BattleStarted,
    DishServed {
        dish: CombatantId,
    },
    CourseStarted {
        slot: usize,
        player: CombatantId,
        opponent: CombatantId,
    },
    DishEntered {
        dish: CombatantId,
    },
    PairingFormed {
        slot: usize,
        player: CombatantId,
        opponent: CombatantId,
        first_turn: TeamSide,
    },
    Bite {
        attacker: CombatantId,
        defender: CombatantId,
        damage: i32,
        remaining_body: i32,
    },
    DishDefeated {
        dish: CombatantId,
    },
    Chained {
        survivor: CombatantId,
        next_opponent: CombatantId,
    },
    SlotResolved {
        outcome: SlotOutcome,
    },
    CourseAdvanced {
        index: usize,
    },
    QueueComplete,
    BattleEnded {
        outcome: Winner,
        /// State fingerprint at the end of the battle
        fingerprint: u64,
    },
}

/// Log of events from a single step, stamped with that step's clock
#[derive(Debug, Clone, Default)]
pub struct BattleEventLog {
    pub events: Vec<BattleEvent>,
    tick: Tick,
    time: Seconds,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty log for the step at `tick` / `time`
    pub fn at(tick: Tick, time: Seconds) -> Self {
        Self {
            events: Vec::new(),
            tick,
            time,
        }
    }

    pub fn push(&mut self, event_type: BattleEventType, description: String) {
        self.events.push(BattleEvent {
            tick: self.tick,
            time: self.time,
            event_type,
            description,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Slot outcomes resolved during this step
    pub fn slot_outcomes(&self) -> impl Iterator<Item = &SlotOutcome> {
        self.events.iter().filter_map(|e| match &e.event_type {
            BattleEventType::SlotResolved { outcome } => Some(outcome),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_order() {
        let mut log = BattleEventLog::at(3, 0.5);
        assert!(log.is_empty());
        log.push(BattleEventType::BattleStarted, "start".into());
        log.push(BattleEventType::QueueComplete, "done".into());
        assert_eq!(log.len(), 2);
        assert_eq!(log.events[0].event_type, BattleEventType::BattleStarted);
        assert_eq!(log.events[1].tick, 3);
        assert_eq!(log.events[1].time, 0.5);
    }

    #[test]
    fn test_slot_outcomes_filter() {
        let mut log = BattleEventLog::at(1, 0.1);
        let outcome = SlotOutcome {
            slot_index: 2,
            winner: Winner::Tie,
            ticks: 4,
        };
        log.push(BattleEventType::QueueComplete, String::new());
        log.push(
            BattleEventType::SlotResolved {
                outcome: outcome.clone(),
            },
            String::new(),
        );
        let outcomes: Vec<_> = log.slot_outcomes().collect();
        assert_eq!(outcomes, vec![&outcome]);
    }

    #[test]
    fn test_event_serializes() {
        let event = BattleEvent {
            tick: 1,
            time: 0.25,
            event_type: BattleEventType::Bite {
                attacker: CombatantId(0),
                defender: CombatantId(1),
                damage: 2,
                remaining_body: 3,
            },
            description: "bite".into(),
        };
        let json = serde_json::to_string(&event).expect("serializable");
        let back: BattleEvent = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, event);
    }
}
