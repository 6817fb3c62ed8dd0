//! Battle system constants - all tunable values in one place
//!
//! Durations are simulated seconds at 1x speed.

// Courses
pub const DEFAULT_TOTAL_COURSES: usize = 7;

// Time
pub const BITE_TICK_SECONDS: f32 = 0.15;
pub const ENTER_DURATION_SECONDS: f32 = 0.45;
pub const ENTER_START_DELAY_SECONDS: f32 = 0.25;

// Damage
pub const MIN_BITE_DAMAGE: i32 = 1;

// Headless runs
pub const DEFAULT_STEP_SECONDS: f32 = 1.0 / 60.0;
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

// Random rosters
pub const RANDOM_STAT_MIN: i32 = 1;
pub const RANDOM_STAT_MAX: i32 = 10;
