//! Combat tick resolution
//!
//! Each pairing bites on a fixed cadence. The first bite goes to the higher
//! base Zing, then the higher base Body, then the player side; after that
//! turns strictly alternate. When exactly one dish falls, the survivor is
//! re-paired with the lowest waiting dish of the beaten side and the slot
//! stays open until the chain ends.
//!
//! The resolver never touches the course cursor. It reports resolved slots and
//! the course controller reacts to the finished dishes.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::dish::{Combatant, Phase, TeamSide};
use crate::battle::events::{BattleEventLog, BattleEventType};
use crate::battle::result::{SlotOutcome, Winner};
use crate::core::types::CombatantId;

/// Two dishes currently fighting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    /// Slot the chain started in; outcomes are recorded against it
    pub slot: usize,
    pub player: CombatantId,
    pub opponent: CombatantId,
    /// Side that bites next
    pub next_turn: TeamSide,
    /// Bites landed so far, carried across chained re-pairs
    pub ticks: u32,
}

impl Pairing {
    pub fn involves(&self, id: CombatantId) -> bool {
        self.player == id || self.opponent == id
    }
}

/// Who takes the first bite of a fresh pairing
///
/// Compares base stats only: Zing, then Body, then the player side.
pub fn first_turn(player: &Combatant, opponent: &Combatant) -> TeamSide {
    if player.base_zing != opponent.base_zing {
        return if player.base_zing > opponent.base_zing {
            TeamSide::Player
        } else {
            TeamSide::Opponent
        };
    }
    if player.base_body != opponent.base_body {
        return if player.base_body > opponent.base_body {
            TeamSide::Player
        } else {
            TeamSide::Opponent
        };
    }
    TeamSide::Player
}

/// Per-step combat driver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombatResolver {
    pairings: Vec<Pairing>,
}

impl CombatResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pairings(&self) -> &[Pairing] {
        &self.pairings
    }

    pub fn has_active_pairing(&self) -> bool {
        !self.pairings.is_empty()
    }

    pub fn reset(&mut self) {
        self.pairings.clear();
    }

    /// Run one step: pair up ready dishes, advance bite timers, land at most
    /// one bite per pairing. Returns the slots resolved this step.
    pub fn step(
        &mut self,
        combatants: &mut [Combatant],
        dt: f32,
        cadence: f32,
        events: &mut BattleEventLog,
    ) -> Vec<SlotOutcome> {
        let mut resolved = Vec::new();
        if dt <= 0.0 {
            return resolved;
        }

        let index: AHashMap<CombatantId, usize> = combatants
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id, i))
            .collect();

        self.form_pairings(combatants, events);

        for combatant in combatants.iter_mut() {
            if combatant.phase() == Phase::InCombat {
                combatant.bite_timer += dt;
            }
        }

        let mut i = 0;
        while i < self.pairings.len() {
            match self.resolve_pairing(i, combatants, &index, cadence, events) {
                Some(outcome) => {
                    self.pairings.remove(i);
                    resolved.push(outcome);
                }
                None => i += 1,
            }
        }

        resolved
    }

    /// Pair InCombat dishes with the InCombat dish across from them in the same slot
    fn form_pairings(&mut self, combatants: &mut [Combatant], events: &mut BattleEventLog) {
        for p in 0..combatants.len() {
            let player = &combatants[p];
            if player.side != TeamSide::Player
                || player.phase() != Phase::InCombat
                || self.is_paired(player.id)
            {
                continue;
            }

            let Some(o) = combatants.iter().position(|c| {
                c.side == TeamSide::Opponent
                    && c.slot() == player.slot()
                    && c.phase() == Phase::InCombat
                    && !self.is_paired(c.id)
            }) else {
                // Opponent not ready yet
                continue;
            };

            combatants[p].bite_timer = 0.0;
            combatants[o].bite_timer = 0.0;
            let pairing = Pairing {
                slot: combatants[p].slot(),
                player: combatants[p].id,
                opponent: combatants[o].id,
                next_turn: first_turn(&combatants[p], &combatants[o]),
                ticks: 0,
            };
            push_pairing_formed(&pairing, events);
            self.pairings.push(pairing);
        }
    }

    fn is_paired(&self, id: CombatantId) -> bool {
        self.pairings.iter().any(|p| p.involves(id))
    }

    fn resolve_pairing(
        &mut self,
        i: usize,
        combatants: &mut [Combatant],
        index: &AHashMap<CombatantId, usize>,
        cadence: f32,
        events: &mut BattleEventLog,
    ) -> Option<SlotOutcome> {
        let (player_idx, opponent_idx) = {
            let pairing = &self.pairings[i];
            (*index.get(&pairing.player)?, *index.get(&pairing.opponent)?)
        };
        let pairing = &mut self.pairings[i];
        let (actor_idx, target_idx) = match pairing.next_turn {
            TeamSide::Player => (player_idx, opponent_idx),
            TeamSide::Opponent => (opponent_idx, player_idx),
        };

        if combatants[actor_idx].bite_timer < cadence {
            return None;
        }
        // Carry the remainder; never more than one bite per step
        combatants[player_idx].bite_timer -= cadence;
        combatants[opponent_idx].bite_timer -= cadence;

        let damage = combatants[actor_idx].bite_damage();
        combatants[target_idx].take_bite(damage);
        pairing.ticks += 1;
        pairing.next_turn = pairing.next_turn.opposite();

        let (attacker, defender) = (combatants[actor_idx].id, combatants[target_idx].id);
        let remaining_body = combatants[target_idx].current_body;
        tracing::debug!(
            "Slot {}: {} bites {} for {} ({} Body left)",
            pairing.slot,
            attacker,
            defender,
            damage,
            remaining_body
        );
        events.push(
            BattleEventType::Bite {
                attacker,
                defender,
                damage,
                remaining_body,
            },
            format!("{} bites {} for {}", attacker, defender, damage),
        );

        let winner = Winner::from_defeats(
            combatants[player_idx].is_defeated(),
            combatants[opponent_idx].is_defeated(),
        )?;

        match winner {
            Winner::Tie => {
                for idx in [player_idx, opponent_idx] {
                    defeat(&mut combatants[idx], events);
                }
                Some(finish_slot(pairing, Winner::Tie, events))
            }
            Winner::Player | Winner::Opponent => {
                let (survivor_idx, loser_idx) = if winner == Winner::Player {
                    (player_idx, opponent_idx)
                } else {
                    (opponent_idx, player_idx)
                };
                defeat(&mut combatants[loser_idx], events);
                let loser_side = combatants[loser_idx].side;

                match next_waiting(combatants, loser_side) {
                    Some(next_idx) => {
                        chain(pairing, combatants, survivor_idx, next_idx, events);
                        None
                    }
                    None => {
                        combatants[survivor_idx].finish();
                        Some(finish_slot(pairing, winner, events))
                    }
                }
            }
        }
    }
}

/// Lowest-slot dish on `side` that has not fought yet
fn next_waiting(combatants: &[Combatant], side: TeamSide) -> Option<usize> {
    combatants
        .iter()
        .enumerate()
        .filter(|(_, c)| c.side == side && c.phase().is_waiting())
        .min_by_key(|(_, c)| (c.slot(), c.id))
        .map(|(i, _)| i)
}

/// Re-pair the survivor with the next dish of the beaten side
fn chain(
    pairing: &mut Pairing,
    combatants: &mut [Combatant],
    survivor_idx: usize,
    next_idx: usize,
    events: &mut BattleEventLog,
) {
    combatants[survivor_idx].enter_combat();
    combatants[next_idx].enter_combat();

    let (survivor, next_opponent) = (combatants[survivor_idx].id, combatants[next_idx].id);
    let (player_idx, opponent_idx) = match combatants[survivor_idx].side {
        TeamSide::Player => (survivor_idx, next_idx),
        TeamSide::Opponent => (next_idx, survivor_idx),
    };
    pairing.player = combatants[player_idx].id;
    pairing.opponent = combatants[opponent_idx].id;
    pairing.next_turn = first_turn(&combatants[player_idx], &combatants[opponent_idx]);

    tracing::debug!(
        "Slot {}: {} keeps fighting, next opponent {}",
        pairing.slot,
        survivor,
        next_opponent
    );
    events.push(
        BattleEventType::Chained {
            survivor,
            next_opponent,
        },
        format!("{} stays on to face {}", survivor, next_opponent),
    );
    push_pairing_formed(pairing, events);
}

fn defeat(combatant: &mut Combatant, events: &mut BattleEventLog) {
    combatant.finish();
    events.push(
        BattleEventType::DishDefeated { dish: combatant.id },
        format!("{} {} defeated", combatant.side, combatant.id),
    );
}

fn finish_slot(pairing: &Pairing, winner: Winner, events: &mut BattleEventLog) -> SlotOutcome {
    let outcome = SlotOutcome {
        slot_index: pairing.slot,
        winner,
        ticks: pairing.ticks,
    };
    tracing::info!(
        "Course {} finished - Winner: {:?} after {} bites",
        pairing.slot + 1,
        winner,
        pairing.ticks
    );
    events.push(
        BattleEventType::SlotResolved {
            outcome: outcome.clone(),
        },
        format!("Course {} winner: {:?}", pairing.slot + 1, winner),
    );
    outcome
}

fn push_pairing_formed(pairing: &Pairing, events: &mut BattleEventLog) {
    events.push(
        BattleEventType::PairingFormed {
            slot: pairing.slot,
            player: pairing.player,
            opponent: pairing.opponent,
            first_turn: pairing.next_turn,
        },
        format!(
            "{} vs {}, {} bites first",
            pairing.player,
            pairing.opponent,
            pairing.next_turn
        ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const CADENCE: f32 = 0.15;

    fn fighter(id: u32, side: TeamSide, slot: usize, zing: i32, body: i32) -> Combatant {
        let mut c = Combatant::new(CombatantId(id), side, slot, "Dish", zing, body);
        c.fire_onserve();
        c.enter_combat();
        c
    }

    fn queued(id: u32, side: TeamSide, slot: usize, zing: i32, body: i32) -> Combatant {
        let mut c = Combatant::new(CombatantId(id), side, slot, "Dish", zing, body);
        c.fire_onserve();
        c
    }

    fn bites(events: &BattleEventLog) -> Vec<(CombatantId, i32)> {
        events
            .events
            .iter()
            .filter_map(|e| match e.event_type {
                BattleEventType::Bite {
                    attacker, damage, ..
                } => Some((attacker, damage)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_turn_higher_zing() {
        let p = fighter(0, TeamSide::Player, 0, 2, 5);
        let o = fighter(1, TeamSide::Opponent, 0, 3, 1);
        assert_eq!(first_turn(&p, &o), TeamSide::Opponent);
    }

    #[test]
    fn test_first_turn_body_breaks_zing_tie() {
        let p = fighter(0, TeamSide::Player, 0, 5, 2);
        let o = fighter(1, TeamSide::Opponent, 0, 5, 3);
        assert_eq!(first_turn(&p, &o), TeamSide::Opponent);

        let p = fighter(0, TeamSide::Player, 0, 5, 3);
        let o = fighter(1, TeamSide::Opponent, 0, 5, 2);
        assert_eq!(first_turn(&p, &o), TeamSide::Player);
    }

    #[test]
    fn test_first_turn_full_tie_goes_to_player() {
        let p = fighter(0, TeamSide::Player, 0, 4, 4);
        let o = fighter(1, TeamSide::Opponent, 0, 4, 4);
        assert_eq!(first_turn(&p, &o), TeamSide::Player);
    }

    #[test]
    fn test_first_turn_uses_base_not_current() {
        let mut p = fighter(0, TeamSide::Player, 0, 1, 5);
        let o = fighter(1, TeamSide::Opponent, 0, 2, 5);
        p.current_zing = 10;
        assert_eq!(first_turn(&p, &o), TeamSide::Opponent);
    }

    #[test]
    fn test_no_bite_before_cadence() {
        let mut combatants = vec![
            fighter(0, TeamSide::Player, 0, 2, 5),
            fighter(1, TeamSide::Opponent, 0, 1, 5),
        ];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        resolver.step(&mut combatants, 0.1, CADENCE, &mut events);
        assert!(bites(&events).is_empty());
        assert_eq!(resolver.pairings().len(), 1);

        resolver.step(&mut combatants, 0.1, CADENCE, &mut events);
        assert_eq!(bites(&events), vec![(CombatantId(0), 2)]);
        assert_eq!(combatants[1].current_body, 3);
        // Remainder carried forward
        assert!((combatants[0].bite_timer - 0.05).abs() < 1e-5);
    }

    #[test]
    fn test_oversized_step_bites_once() {
        let mut combatants = vec![
            fighter(0, TeamSide::Player, 0, 1, 50),
            fighter(1, TeamSide::Opponent, 0, 1, 50),
        ];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        resolver.step(&mut combatants, 1.0, CADENCE, &mut events);
        assert_eq!(bites(&events).len(), 1);

        // Backlog drains one bite per step
        resolver.step(&mut combatants, 0.001, CADENCE, &mut events);
        assert_eq!(bites(&events).len(), 2);
    }

    #[test]
    fn test_turns_alternate() {
        let mut combatants = vec![
            fighter(0, TeamSide::Player, 0, 1, 50),
            fighter(1, TeamSide::Opponent, 0, 2, 50),
        ];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        for _ in 0..4 {
            resolver.step(&mut combatants, CADENCE, CADENCE, &mut events);
        }
        let attackers: Vec<_> = bites(&events).into_iter().map(|(a, _)| a).collect();
        assert_eq!(
            attackers,
            vec![CombatantId(1), CombatantId(0), CombatantId(1), CombatantId(0)]
        );
    }

    #[test]
    fn test_zero_zing_deals_one() {
        let mut combatants = vec![
            fighter(0, TeamSide::Player, 0, 0, 3),
            fighter(1, TeamSide::Opponent, 0, -2, 3),
        ];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        let mut resolved = Vec::new();
        for _ in 0..100 {
            resolved.extend(resolver.step(&mut combatants, CADENCE, CADENCE, &mut events));
            if !resolved.is_empty() {
                break;
            }
        }
        assert!(bites(&events).iter().all(|&(_, d)| d == 1));
        // Player bites first (Zing 0 > -2); its third bite empties the opponent
        assert_eq!(resolved[0].winner, Winner::Player);
        assert_eq!(resolved[0].ticks, 5);
    }

    #[test]
    fn test_unpaired_dish_waits() {
        let mut combatants = vec![fighter(0, TeamSide::Player, 0, 1, 1)];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        resolver.step(&mut combatants, 1.0, CADENCE, &mut events);
        assert!(!resolver.has_active_pairing());
        assert_eq!(combatants[0].phase(), Phase::InCombat);
    }

    #[test]
    fn test_paused_step_does_nothing() {
        let mut combatants = vec![
            fighter(0, TeamSide::Player, 0, 1, 1),
            fighter(1, TeamSide::Opponent, 0, 1, 1),
        ];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        resolver.step(&mut combatants, 0.0, CADENCE, &mut events);
        assert!(events.is_empty());
        assert_eq!(combatants[0].bite_timer, 0.0);
    }

    #[test]
    fn test_tie_when_both_fall() {
        let mut combatants = vec![
            fighter(0, TeamSide::Player, 0, 1, 0),
            fighter(1, TeamSide::Opponent, 0, 1, 0),
        ];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        let resolved = resolver.step(&mut combatants, CADENCE, CADENCE, &mut events);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].winner, Winner::Tie);
        assert!(combatants.iter().all(|c| c.phase() == Phase::Finished));
        assert!(!resolver.has_active_pairing());
    }

    #[test]
    fn test_survivor_chains_to_next_opponent() {
        let mut combatants = vec![
            fighter(0, TeamSide::Player, 0, 5, 10),
            fighter(1, TeamSide::Opponent, 0, 1, 1),
            queued(2, TeamSide::Opponent, 1, 1, 20),
        ];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        let resolved = resolver.step(&mut combatants, CADENCE, CADENCE, &mut events);
        assert!(resolved.is_empty());
        assert_eq!(combatants[1].phase(), Phase::Finished);
        assert_eq!(combatants[0].phase(), Phase::InCombat);
        assert_eq!(combatants[2].phase(), Phase::InCombat);
        assert_eq!(combatants[0].bite_timer, 0.0);

        let pairing = &resolver.pairings()[0];
        assert_eq!(pairing.slot, 0);
        assert_eq!(pairing.player, CombatantId(0));
        assert_eq!(pairing.opponent, CombatantId(2));
        assert_eq!(pairing.next_turn, TeamSide::Player);
        assert!(events.events.iter().any(|e| matches!(
            e.event_type,
            BattleEventType::Chained {
                survivor: CombatantId(0),
                next_opponent: CombatantId(2)
            }
        )));
    }

    #[test]
    fn test_chain_ends_with_one_outcome() {
        let mut combatants = vec![
            fighter(0, TeamSide::Player, 0, 5, 10),
            fighter(1, TeamSide::Opponent, 0, 1, 1),
            queued(2, TeamSide::Opponent, 1, 1, 3),
        ];
        let mut resolver = CombatResolver::new();
        let mut events = BattleEventLog::new();

        let mut resolved = Vec::new();
        for _ in 0..20 {
            resolved.extend(resolver.step(&mut combatants, CADENCE, CADENCE, &mut events));
        }
        assert_eq!(
            resolved,
            vec![SlotOutcome {
                slot_index: 0,
                winner: Winner::Player,
                ticks: 2,
            }]
        );
        assert!(combatants.iter().all(|c| c.phase() == Phase::Finished));
        assert_eq!(combatants[0].current_body, 10);
    }

    #[test]
    fn test_chain_picks_lowest_waiting_slot() {
        let combatants = vec![
            queued(0, TeamSide::Opponent, 3, 1, 1),
            queued(1, TeamSide::Opponent, 1, 1, 1),
            queued(2, TeamSide::Player, 0, 1, 1),
        ];
        assert_eq!(next_waiting(&combatants, TeamSide::Opponent), Some(1));
        assert_eq!(next_waiting(&combatants, TeamSide::Player), Some(2));
    }
}
