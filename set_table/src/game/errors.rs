//! Error types for table and game setup operations

use super::entities::{Card, PlayerId, Slot};
use thiserror::Error;

/// Result type for table and game operations
pub type GameResult<T> = Result<T, GameError>;

/// Errors raised by misuse of the table primitives or by a bad configuration.
///
/// Claim races (a claimed slot vacated by an earlier claim, input overflow)
/// are part of normal play and never surface as errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("slot {0} is not on the table")]
    SlotOutOfRange(Slot),

    #[error("slot {slot} already holds card {card}")]
    SlotOccupied { slot: Slot, card: Card },

    #[error("slot {0} is empty")]
    SlotEmpty(Slot),

    #[error("card {0} is already on the table")]
    CardOnTable(Card),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("dealer is no longer accepting claims")]
    DealerClosed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("agent task failed: {0}")]
    AgentFailed(String),
}
