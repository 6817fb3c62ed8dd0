//! Course Battle - deterministic slot-by-slot dish battle engine

pub mod battle;
pub mod core;
