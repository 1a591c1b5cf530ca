//! Player agents and the computer keypresser.

pub mod agent;
pub mod computer;

pub use agent::{INPUT_BUFFER, InputHandle, PlayerAgent, PlayerState};
