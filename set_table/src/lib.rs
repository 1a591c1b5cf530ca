//! # Set Table
//!
//! A real-time engine for the card game Set, run by concurrent agents.
//!
//! A dealer deals cards into a fixed number of slots. Players race to place
//! three tokens on cards forming a set and claim them. The dealer judges
//! claims one at a time in the order they were made, awards points, replaces
//! the claimed cards and reshuffles the table when nobody scores in time.
//! The game ends when the remaining cards hold no set.
//!
//! ## Agents
//!
//! - **Dealer**: owns the deck, adjudicates claims, runs the round timer
//! - **Player**: turns key presses into tokens and claims, serves freezes
//! - **Keypresser**: feeds random key presses to computer players
//!
//! All agents share one [`SharedTable`] behind a Tokio `RwLock` and stop on a
//! common shutdown signal.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, deck, oracle, table state and display
//! - [`dealer`]: Dealer loop, claim queue, configuration and game manager
//! - [`player`]: Player agents and computer input
//!
//! ## Example
//!
//! ```no_run
//! use set_table::{GameConfig, GameManager, LogDisplay, StandardRules};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let handle = GameManager::new(
//!         GameConfig::with_players(0, 2),
//!         Arc::new(StandardRules::default()),
//!         Arc::new(LogDisplay::new()),
//!     )
//!     .start()
//!     .unwrap();
//!
//!     let outcome = handle.wait().await.unwrap();
//!     println!("winners: {:?}", outcome.winners);
//! }
//! ```

/// Dealer task, claim queue and game lifecycle.
pub mod dealer;
pub use dealer::{GameConfig, GameHandle, GameManager, GameOutcome, Verdict};

/// Cards, table state and shared infrastructure.
pub mod game;
pub use game::{
    Card, Deck, GameDisplay, GameError, GameResult, LogDisplay, PlayerId, PlayerKind,
    RecordingDisplay, SetOracle, SharedTable, Slot, StandardRules, Table,
};

/// Player agents.
pub mod player;
pub use player::{InputHandle, PlayerState};
