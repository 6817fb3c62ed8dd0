//! Battle configuration with documented timing constants
//!
//! Every duration here is expressed at 1x speed. The engine reads them through
//! the scaled getters, which divide by `timing_speed_scale`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    BITE_TICK_SECONDS, DEFAULT_TOTAL_COURSES, ENTER_DURATION_SECONDS, ENTER_START_DELAY_SECONDS,
};
use crate::core::error::{BattleError, Result};

/// Configuration for a battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Number of course slots fought in order (0..total_courses)
    ///
    /// Rosters with fewer dishes than this simply end the battle early.
    pub total_courses: usize,

    /// Simulated seconds between bites of one pairing
    pub bite_tick_seconds: f32,

    /// Length of the entry window once a course has started
    ///
    /// Purely a pacing window; no stats change while entering.
    pub enter_duration_seconds: f32,

    /// Pause before the entry window starts counting
    pub enter_start_delay_seconds: f32,

    /// Global speed multiplier
    ///
    /// At 2.0 every duration above is halved. Ordering of events is unchanged,
    /// only the amount of simulated time between them.
    pub timing_speed_scale: f32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            total_courses: DEFAULT_TOTAL_COURSES,
            bite_tick_seconds: BITE_TICK_SECONDS,
            enter_duration_seconds: ENTER_DURATION_SECONDS,
            enter_start_delay_seconds: ENTER_START_DELAY_SECONDS,
            timing_speed_scale: 1.0,
        }
    }
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Same config with a different speed multiplier
    pub fn with_speed(mut self, timing_speed_scale: f32) -> Self {
        self.timing_speed_scale = timing_speed_scale;
        self
    }

    /// Same config with a different course count
    pub fn with_courses(mut self, total_courses: usize) -> Self {
        self.total_courses = total_courses;
        self
    }

    /// Bite cadence after speed scaling
    pub fn bite_cadence(&self) -> f32 {
        self.bite_tick_seconds / self.timing_speed_scale
    }

    /// Entry window after speed scaling
    pub fn enter_duration(&self) -> f32 {
        self.enter_duration_seconds / self.timing_speed_scale
    }

    /// Entry start delay after speed scaling
    pub fn enter_start_delay(&self) -> f32 {
        self.enter_start_delay_seconds / self.timing_speed_scale
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.total_courses == 0 {
            return Err(BattleError::InvalidConfig(
                "total_courses must be at least 1".into(),
            ));
        }

        if !(self.timing_speed_scale > 0.0) {
            return Err(BattleError::InvalidConfig(format!(
                "timing_speed_scale ({}) must be positive",
                self.timing_speed_scale
            )));
        }

        if !(self.bite_tick_seconds > 0.0) || !(self.enter_duration_seconds > 0.0) {
            return Err(BattleError::InvalidConfig(
                "bite and entry durations must be positive".into(),
            ));
        }

        if self.enter_start_delay_seconds < 0.0 {
            return Err(BattleError::InvalidConfig(format!(
                "enter_start_delay_seconds ({}) must not be negative",
                self.enter_start_delay_seconds
            )));
        }

        Ok(())
    }

    /// Parse and validate a TOML document
    ///
    /// Missing keys fall back to defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<BattleConfig> = OnceLock::new();

/// Get the global battle config (initializes with defaults if not set)
pub fn config() -> &'static BattleConfig {
    CONFIG.get_or_init(BattleConfig::default)
}

/// Set the global battle config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: BattleConfig) -> std::result::Result<(), BattleConfig> {
    CONFIG.set(config)
}
