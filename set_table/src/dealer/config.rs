//! Game configuration.

use crate::game::{
    entities::{MAX_TOKENS, PlayerKind},
    errors::{GameError, GameResult},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Read-only settings shared by the dealer and every player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of slots on the table (default: 12)
    pub table_size: usize,

    /// Number of distinct cards (default: 81)
    pub deck_size: u32,

    /// One entry per player, in player id order
    pub players: Vec<PlayerKind>,

    /// Time without an accepted claim before the table is reshuffled
    pub round_duration: Duration,

    /// Countdown is shown in warning mode once this little time is left
    pub warning_threshold: Duration,

    /// Freeze after an accepted claim
    pub point_freeze: Duration,

    /// Freeze after a rejected claim
    pub penalty_freeze: Duration,

    /// How often a frozen player refreshes its remaining freeze time
    pub freeze_tick: Duration,

    /// Dealer polling interval
    pub tick_interval: Duration,

    /// Wake the dealer as soon as a claim is submitted instead of waiting
    /// for the next tick
    pub early_wake: bool,

    /// Drop input that piled up while a player was frozen
    pub discard_input_after_freeze: bool,

    /// Delay between synthetic key presses of computer players
    pub computer_pace: Duration,

    /// Log the sets on the table after every deal
    pub hints: bool,

    /// Seed for the deck and computer players; random when unset
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            table_size: 12,
            deck_size: 81,
            players: vec![PlayerKind::Human, PlayerKind::Computer],
            round_duration: Duration::from_secs(60),
            warning_threshold: Duration::from_secs(5),
            point_freeze: Duration::from_secs(1),
            penalty_freeze: Duration::from_secs(3),
            freeze_tick: Duration::from_millis(950),
            tick_interval: Duration::from_millis(100),
            early_wake: true,
            discard_input_after_freeze: false,
            computer_pace: Duration::from_millis(250),
            hints: false,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Configuration with `humans` human players followed by `computers`
    /// computer players.
    pub fn with_players(humans: usize, computers: usize) -> Self {
        let mut players = vec![PlayerKind::Human; humans];
        players.extend(std::iter::repeat_n(PlayerKind::Computer, computers));
        Self {
            players,
            ..Self::default()
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Validate configuration
    pub fn validate(&self) -> GameResult<()> {
        if self.players.is_empty() {
            return Err(GameError::InvalidConfig(
                "At least one player is required".to_string(),
            ));
        }

        if self.table_size < MAX_TOKENS {
            return Err(GameError::InvalidConfig(format!(
                "Table needs at least {} slots",
                MAX_TOKENS
            )));
        }

        if self.round_duration.is_zero() {
            return Err(GameError::InvalidConfig(
                "Round duration must be positive".to_string(),
            ));
        }

        if self.tick_interval.is_zero() || self.freeze_tick.is_zero() {
            return Err(GameError::InvalidConfig(
                "Tick intervals must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
