//! Table state and the pieces every agent shares.
//!
//! - Cards, the deck and player kinds
//! - The set oracle deciding which triples are sets
//! - The shared table holding cards, tokens and scores
//! - The display sink notified of every visible change
//! - The shutdown signal observed by all agents

pub mod display;
pub mod entities;
pub mod errors;
pub mod oracle;
pub mod shutdown;
pub mod table;

pub use display::{DisplayEvent, GameDisplay, LogDisplay, RecordingDisplay};
pub use entities::{Card, Deck, MAX_TOKENS, PlayerId, PlayerKind, Slot};
pub use errors::{GameError, GameResult};
pub use oracle::{SetOracle, StandardRules};
pub use shutdown::{Shutdown, ShutdownTrigger};
pub use table::{SharedTable, Table, TableSnapshot};
