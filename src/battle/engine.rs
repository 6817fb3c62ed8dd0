//! Battle execution loop
//!
//! Each step: serve -> course progression -> entry timers -> combat -> finalize

use serde::{Deserialize, Serialize};

use crate::battle::course::{CourseController, CourseQueue};
use crate::battle::dish::{Combatant, Phase};
use crate::battle::events::{BattleEvent, BattleEventLog, BattleEventType};
use crate::battle::fingerprint::fingerprint;
use crate::battle::resolver::{CombatResolver, Pairing};
use crate::battle::result::{BattleResult, ResultAggregator, SlotOutcome};
use crate::battle::roster::{instantiate, TeamRoster};
use crate::core::config::BattleConfig;
use crate::core::error::Result;
use crate::core::types::{BattleId, CombatantId, Seconds, Tick};

/// Engine lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Idle, // No battle loaded
    Active,   // Battle in progress
    Finished, // Result available
}

/// Complete battle state
#[derive(Debug, Clone)]
pub struct BattleEngine {
    config: BattleConfig,
    battle_id: BattleId,

    // Time
    tick: Tick,
    elapsed: Seconds,
    phase: BattlePhase,

    // State
    combatants: Vec<Combatant>,
    courses: CourseController,
    resolver: CombatResolver,
    outcomes: Vec<SlotOutcome>,
    aggregator: ResultAggregator,

    // Log
    battle_log: Vec<BattleEvent>,
}

impl BattleEngine {
    /// Build an idle engine. Fails if the config does not validate.
    pub fn new(config: BattleConfig) -> Result<Self> {
        config.validate()?;
        let courses = CourseController::new(config.total_courses);
        Ok(Self {
            config,
            battle_id: BattleId::new(),
            tick: 0,
            elapsed: 0.0,
            phase: BattlePhase::Idle,
            combatants: Vec::new(),
            courses,
            resolver: CombatResolver::new(),
            outcomes: Vec::new(),
            aggregator: ResultAggregator::new(),
            battle_log: Vec::new(),
        })
    }

    /// Start a battle from two rosters. Any previous battle is discarded.
    pub fn start(&mut self, player: &TeamRoster, opponent: &TeamRoster) -> BattleId {
        self.reset();
        self.combatants = instantiate(player, opponent);
        self.phase = BattlePhase::Active;

        tracing::info!(
            "Battle {:?} started: {} player dishes vs {} opponent dishes over {} courses",
            self.battle_id.0,
            player.len(),
            opponent.len(),
            self.config.total_courses
        );
        let mut events = BattleEventLog::at(self.tick, self.elapsed);
        events.push(BattleEventType::BattleStarted, "Battle has begun!".into());
        self.battle_log.extend(events.events);

        self.battle_id
    }

    /// Drop the current battle mid-flight and go idle
    pub fn abandon(&mut self) {
        if self.phase == BattlePhase::Active {
            tracing::info!("Battle {:?} abandoned at tick {}", self.battle_id.0, self.tick);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.battle_id = BattleId::new();
        self.tick = 0;
        self.elapsed = 0.0;
        self.phase = BattlePhase::Idle;
        self.combatants.clear();
        self.courses = CourseController::new(self.config.total_courses);
        self.resolver.reset();
        self.outcomes.clear();
        self.aggregator.reset();
        self.battle_log.clear();
    }

    /// Advance the battle by `dt` simulated seconds
    ///
    /// A zero or negative `dt` (paused playback) changes nothing.
    pub fn step(&mut self, dt: Seconds) -> BattleEventLog {
        if self.phase != BattlePhase::Active || !(dt > 0.0) || !dt.is_finite() {
            return BattleEventLog::at(self.tick, self.elapsed);
        }

        self.tick += 1;
        self.elapsed += dt;
        let mut events = BattleEventLog::at(self.tick, self.elapsed);

        self.phase_serve(&mut events);
        self.courses
            .step(&mut self.combatants, self.config.enter_start_delay(), &mut events);
        self.phase_entry(dt, &mut events);
        let resolved = self
            .resolver
            .step(&mut self.combatants, dt, self.config.bite_cadence(), &mut events);
        self.outcomes.extend(resolved);
        self.phase_finalize(&mut events);

        self.battle_log.extend(events.events.iter().cloned());
        events
    }

    fn phase_serve(&mut self, events: &mut BattleEventLog) {
        for combatant in &mut self.combatants {
            if combatant.fire_onserve() {
                events.push(
                    BattleEventType::DishServed { dish: combatant.id },
                    format!("{} served {}", combatant.side, combatant.dish),
                );
            }
        }
    }

    fn phase_entry(&mut self, dt: Seconds, events: &mut BattleEventLog) {
        let duration = self.config.enter_duration();
        for combatant in &mut self.combatants {
            if combatant.advance_entry(dt, duration) {
                events.push(
                    BattleEventType::DishEntered { dish: combatant.id },
                    format!("{} {} enters combat", combatant.side, combatant.id),
                );
            }
        }
    }

    fn phase_finalize(&mut self, events: &mut BattleEventLog) {
        if !self.courses.queue().is_complete() {
            return;
        }
        let outcome = self.aggregator.finalize(&self.outcomes).outcome;
        self.phase = BattlePhase::Finished;

        let fingerprint = self.fingerprint();
        tracing::info!(
            "Battle {:?} ended at tick {}: fingerprint {:016x}",
            self.battle_id.0,
            self.tick,
            fingerprint
        );
        events.push(
            BattleEventType::BattleEnded {
                outcome,
                fingerprint,
            },
            format!("Battle ended: {:?}", outcome),
        );
    }

    /// Result of a completed battle; repeated calls return the same record
    pub fn finalize(&mut self) -> Option<&BattleResult> {
        if !self.courses.queue().is_complete() {
            return None;
        }
        Some(self.aggregator.finalize(&self.outcomes))
    }

    /// Step at a fixed `dt` until the battle ends or `max_steps` is reached
    pub fn run_to_completion(&mut self, dt: Seconds, max_steps: u64) -> Option<&BattleResult> {
        let mut steps = 0;
        while self.is_active() && steps < max_steps {
            self.step(dt);
            steps += 1;
        }
        if self.is_active() {
            tracing::warn!("Battle still running after {} steps", steps);
        }
        self.result()
    }

    /// A battle is loaded and not yet resolved
    pub fn is_active(&self) -> bool {
        self.phase == BattlePhase::Active
    }

    pub fn is_complete(&self) -> bool {
        self.phase == BattlePhase::Finished
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn result(&self) -> Option<&BattleResult> {
        self.aggregator.result()
    }

    pub fn battle_id(&self) -> BattleId {
        self.battle_id
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn elapsed(&self) -> Seconds {
        self.elapsed
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    /// Dishes currently entering or fighting
    pub fn active_combatants(&self) -> impl Iterator<Item = &Combatant> {
        self.combatants.iter().filter(|c| c.phase().is_active())
    }

    pub fn queue(&self) -> &CourseQueue {
        self.courses.queue()
    }

    pub fn pairings(&self) -> &[Pairing] {
        self.resolver.pairings()
    }

    pub fn outcomes(&self) -> &[SlotOutcome] {
        &self.outcomes
    }

    /// Every event since the battle started
    pub fn events(&self) -> &[BattleEvent] {
        &self.battle_log
    }

    /// Stable digest of every dish's current battle state
    pub fn fingerprint(&self) -> u64 {
        fingerprint(&self.combatants)
    }

    /// Count of dishes in a phase
    pub fn count_in_phase(&self, phase: Phase) -> usize {
        self.combatants.iter().filter(|c| c.phase() == phase).count()
    }
}
