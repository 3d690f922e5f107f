use alloc::string::String;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Level must have at least one row and one column")]
    InvalidLevelConfig,
    #[error("Unknown boss: {0}")]
    UnknownBoss(String),
    #[error("Unknown card: {0}")]
    UnknownCard(String),
    #[error("Invalid card catalog: {0}")]
    InvalidCatalog(String),
    #[error("Invalid level table: {0}")]
    InvalidLevelTable(String),
    #[error("No board is loaded")]
    BoardNotReady,
}

pub type Result<T> = core::result::Result<T, GameError>;
