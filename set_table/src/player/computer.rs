//! Synthetic key presses for computer players.

use super::agent::InputHandle;
use crate::{dealer::config::GameConfig, game::shutdown::Shutdown};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;
use tokio::time::sleep;

/// Presses random slots at `computer_pace` until termination. When the
/// player's input buffer is full the keypresser waits for room.
pub async fn press_keys(input: InputHandle, config: Arc<GameConfig>, mut shutdown: Shutdown) {
    let player = input.player();
    log::info!("Keypresser for player {} starting", player);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(player as u64 + 1)),
        None => StdRng::from_os_rng(),
    };

    loop {
        let slot = rng.random_range(0..config.table_size);
        tokio::select! {
            _ = shutdown.triggered() => break,
            pressed = input.press(slot) => if !pressed { break },
        }
        tokio::select! {
            _ = shutdown.triggered() => break,
            _ = sleep(config.computer_pace) => {}
        }
    }

    log::info!("Keypresser for player {} terminated", player);
}
