//! Dealer module: the task that owns the deck and judges claims.
//!
//! ## Architecture
//!
//! The dealer runs in its own Tokio task. Players hand it claims through a
//! bounded FIFO and each claim carries a oneshot for its verdict. Between
//! claims the dealer ticks on `tick_interval`, counts the round down and
//! reshuffles when it expires. [`GameManager`] builds the table and spawns the
//! dealer together with every player.

pub mod actor;
pub mod claims;
pub mod config;
pub mod manager;

pub use actor::{Dealer, DealerPhase, GameOutcome, winners};
pub use claims::{Claim, ClaimReceiver, ClaimSender, Verdict};
pub use config::GameConfig;
pub use manager::{GameHandle, GameManager};
