use thiserror::Error;

/// Errors raised at the edges of the engine (loading rosters and config).
///
/// The per-step battle API never fails; everything that can go wrong inside a
/// battle is a state transition.
#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BattleError>;
