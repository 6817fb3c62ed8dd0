//! Battle system - slot-by-slot dish combat
//!
//! Two rosters fight one course slot at a time. A course controller picks the
//! slot, a tick resolver runs the bites, and an aggregator tallies the result.
//!
//! Key rules:
//! - Only one slot is ever entering or fighting
//! - First bite by base Zing, then base Body, then the player side
//! - A survivor keeps fighting the next waiting dish of the beaten side
//! - Same rosters, config and step sizes always give the same event log

pub mod constants;
pub mod course;
pub mod dish;
pub mod engine;
pub mod events;
pub mod fingerprint;
pub mod resolver;
pub mod result;
pub mod roster;

// Re-exports for convenient access
pub use constants::*;
pub use course::{CourseController, CourseQueue};
pub use dish::{Combatant, Phase, TeamSide};
pub use engine::{BattleEngine, BattlePhase};
pub use events::{BattleEvent, BattleEventLog, BattleEventType};
pub use fingerprint::fingerprint;
pub use resolver::{first_turn, CombatResolver, Pairing};
pub use result::{BattleResult, ResultAggregator, SlotOutcome, Winner};
pub use roster::{instantiate, DishSpec, TeamRoster};
