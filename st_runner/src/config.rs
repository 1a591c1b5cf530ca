//! Runner configuration management.
//!
//! Consolidates all environment variable reads and command line overrides
//! into a validated game configuration.

use set_table::{GameConfig, PlayerKind, StandardRules};
use std::time::Duration;

/// Values given on the command line. They take priority over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub humans: Option<usize>,
    pub computers: Option<usize>,
    pub table_size: Option<usize>,
    pub round_secs: Option<u64>,
    pub seed: Option<u64>,
    pub hints: bool,
}

/// Complete runner configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Number of players driven from stdin
    pub humans: usize,
    /// Number of players pressing random keys
    pub computers: usize,
    pub table_size: usize,
    pub deck_size: u32,
    pub round_secs: u64,
    pub warning_secs: u64,
    pub point_freeze_ms: u64,
    pub penalty_freeze_ms: u64,
    pub computer_pace_ms: u64,
    pub discard_input_after_freeze: bool,
    pub hints: bool,
    pub seed: Option<u64>,
}

impl RunnerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if `SET_SEED` is present but not a number
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = GameConfig::default();

        let seed = match overrides.seed {
            Some(seed) => Some(seed),
            None => parse_env_opt("SET_SEED")?,
        };

        Ok(RunnerConfig {
            humans: overrides
                .humans
                .unwrap_or_else(|| parse_env_or("SET_HUMAN_PLAYERS", 1)),
            computers: overrides
                .computers
                .unwrap_or_else(|| parse_env_or("SET_COMPUTER_PLAYERS", 1)),
            table_size: overrides
                .table_size
                .unwrap_or_else(|| parse_env_or("SET_TABLE_SIZE", defaults.table_size)),
            deck_size: parse_env_or("SET_DECK_SIZE", defaults.deck_size),
            round_secs: overrides.round_secs.unwrap_or_else(|| {
                parse_env_or("SET_ROUND_SECS", defaults.round_duration.as_secs())
            }),
            warning_secs: parse_env_or("SET_WARNING_SECS", defaults.warning_threshold.as_secs()),
            point_freeze_ms: parse_env_or("SET_POINT_FREEZE_MS", millis(defaults.point_freeze)),
            penalty_freeze_ms: parse_env_or(
                "SET_PENALTY_FREEZE_MS",
                millis(defaults.penalty_freeze),
            ),
            computer_pace_ms: parse_env_or(
                "SET_COMPUTER_PACE_MS",
                millis(defaults.computer_pace),
            ),
            discard_input_after_freeze: parse_env_or(
                "SET_DISCARD_INPUT_AFTER_FREEZE",
                defaults.discard_input_after_freeze,
            ),
            hints: overrides.hints || parse_env_or("SET_HINTS", defaults.hints),
            seed,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.humans + self.computers == 0 {
            return Err(ConfigError::Invalid {
                var: "SET_HUMAN_PLAYERS".to_string(),
                reason: "At least one human or computer player is required".to_string(),
            });
        }

        if self.table_size < 3 {
            return Err(ConfigError::Invalid {
                var: "SET_TABLE_SIZE".to_string(),
                reason: "Must be at least 3".to_string(),
            });
        }

        let max_deck = StandardRules::default().deck_size();
        if self.deck_size == 0 || self.deck_size > max_deck {
            return Err(ConfigError::Invalid {
                var: "SET_DECK_SIZE".to_string(),
                reason: format!("Must be between 1 and {}", max_deck),
            });
        }

        if self.round_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SET_ROUND_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn game_config(&self) -> GameConfig {
        let mut players = vec![PlayerKind::Human; self.humans];
        players.extend(std::iter::repeat_n(PlayerKind::Computer, self.computers));

        GameConfig {
            table_size: self.table_size,
            deck_size: self.deck_size,
            players,
            round_duration: Duration::from_secs(self.round_secs),
            warning_threshold: Duration::from_secs(self.warning_secs),
            point_freeze: Duration::from_millis(self.point_freeze_ms),
            penalty_freeze: Duration::from_millis(self.penalty_freeze_ms),
            computer_pace: Duration::from_millis(self.computer_pace_ms),
            discard_input_after_freeze: self.discard_input_after_freeze,
            hints: self.hints,
            seed: self.seed,
            ..GameConfig::default()
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Helper to parse an optional environment variable, rejecting bad values
fn parse_env_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value.trim().parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunnerConfig {
        RunnerConfig {
            humans: 1,
            computers: 2,
            table_size: 12,
            deck_size: 81,
            round_secs: 30,
            warning_secs: 5,
            point_freeze_ms: 1000,
            penalty_freeze_ms: 3000,
            computer_pace_ms: 100,
            discard_input_after_freeze: false,
            hints: false,
            seed: Some(7),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid {
            var: "SET_SEED".to_string(),
            reason: "not a number".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("SET_SEED"));
        assert!(msg.contains("not a number"));
    }

    #[test]
    fn test_overrides_take_priority() {
        let config = RunnerConfig::from_env(Overrides {
            humans: Some(0),
            computers: Some(3),
            table_size: Some(9),
            round_secs: Some(15),
            seed: Some(99),
            hints: true,
        })
        .unwrap();

        assert_eq!(config.humans, 0);
        assert_eq!(config.computers, 3);
        assert_eq!(config.table_size, 9);
        assert_eq!(config.round_secs, 15);
        assert_eq!(config.seed, Some(99));
        assert!(config.hints);
    }

    #[test]
    fn test_game_config_mapping() {
        let game = sample().game_config();
        assert_eq!(
            game.players,
            vec![PlayerKind::Human, PlayerKind::Computer, PlayerKind::Computer]
        );
        assert_eq!(game.round_duration, Duration::from_secs(30));
        assert_eq!(game.computer_pace, Duration::from_millis(100));
        assert_eq!(game.seed, Some(7));
        assert!(game.validate().is_ok());
    }

    #[test]
    fn test_config_validation_no_players() {
        let config = RunnerConfig {
            humans: 0,
            computers: 0,
            ..sample()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "SET_HUMAN_PLAYERS"));
    }

    #[test]
    fn test_config_validation_deck_too_large() {
        let config = RunnerConfig {
            deck_size: 82,
            ..sample()
        };
        assert!(config.validate().is_err());

        let config = RunnerConfig {
            table_size: 2,
            ..sample()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_env_or_falls_back() {
        assert_eq!(parse_env_or("SET_TEST_SURELY_UNSET_VAR", 42u64), 42);
        assert!(matches!(
            parse_env_opt::<u64>("SET_TEST_SURELY_UNSET_VAR"),
            Ok(None)
        ));
    }
}
