//! Battle state fingerprint
//!
//! A stable digest of every dish's battle state, used to check that two runs
//! (or two machines) reached the same end state. Dishes are hashed in
//! (side, slot, id) order so roster order never matters.

use sha2::{Digest, Sha256};

use crate::battle::dish::{Combatant, TeamSide};

/// Digest of side, slot, phase, on-serve flag and stats for every dish
pub fn fingerprint(combatants: &[Combatant]) -> u64 {
    let mut dishes: Vec<&Combatant> = combatants.iter().collect();
    dishes.sort_by_key(|c| (side_key(c.side), c.slot(), c.id));

    let mut hasher = Sha256::new();
    hasher.update((dishes.len() as u64).to_le_bytes());
    for dish in dishes {
        hasher.update(dish.id.0.to_le_bytes());
        hasher.update([side_key(dish.side), dish.phase() as u8, dish.onserve_fired as u8]);
        hasher.update((dish.slot() as u64).to_le_bytes());
        hasher.update(dish.base_zing.to_le_bytes());
        hasher.update(dish.base_body.to_le_bytes());
        hasher.update(dish.current_zing.to_le_bytes());
        hasher.update(dish.current_body.to_le_bytes());
    }
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn side_key(side: TeamSide) -> u8 {
    match side {
        TeamSide::Player => 0,
        TeamSide::Opponent => 1,
    }
}
