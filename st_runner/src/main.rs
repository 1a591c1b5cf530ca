//! Terminal runner for a Set table.
//!
//! Human players are driven by `<player> <slot>` lines on stdin, computer
//! players press keys on their own. The game ends when no set is left in the
//! deck or on Ctrl-C.

mod config;
mod input;
mod logging;

use anyhow::Error;
use config::{Overrides, RunnerConfig};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use set_table::{GameManager, LogDisplay, PlayerKind, StandardRules};
use std::sync::Arc;

const HELP: &str = "\
Run a game of Set in the terminal

USAGE:
  st_runner [OPTIONS]

OPTIONS:
  --humans      N          Human players, driven from stdin    [default: env SET_HUMAN_PLAYERS or 1]
  --computers   N          Computer players                    [default: env SET_COMPUTER_PLAYERS or 1]
  --table-size  N          Slots on the table                  [default: env SET_TABLE_SIZE or 12]
  --round-secs  N          Seconds before an idle table is reshuffled [default: env SET_ROUND_SECS or 60]
  --seed        N          Seed for the deck and computer players [default: env SET_SEED or random]

FLAGS:
  --hints                  Log the sets on the table after every deal
  --json                   Print the final outcome as JSON
  -h, --help               Print help information

INPUT:
  One key press per line: <player> <slot>, e.g. `0 7`

ENVIRONMENT:
  SET_DECK_SIZE, SET_WARNING_SECS, SET_POINT_FREEZE_MS, SET_PENALTY_FREEZE_MS,
  SET_COMPUTER_PACE_MS, SET_DISCARD_INPUT_AFTER_FREEZE, SET_HINTS
  RUST_LOG                 Log filter [default: info]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let json = pargs.contains("--json");
    let overrides = Overrides {
        humans: pargs.opt_value_from_str("--humans")?,
        computers: pargs.opt_value_from_str("--computers")?,
        table_size: pargs.opt_value_from_str("--table-size")?,
        round_secs: pargs.opt_value_from_str("--round-secs")?,
        seed: pargs.opt_value_from_str("--seed")?,
        hints: pargs.contains("--hints"),
    };
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {:?}", remaining);
    }

    logging::init();

    let config = RunnerConfig::from_env(overrides)?;
    config.validate()?;
    let game_config = config.game_config();
    info!(
        "Starting game: {} human and {} computer players, {} slots, {} cards",
        config.humans, config.computers, config.table_size, config.deck_size
    );

    let handle = GameManager::new(
        game_config.clone(),
        Arc::new(StandardRules::default()),
        Arc::new(LogDisplay::new()),
    )
    .start()?;

    // Catching signals for exit.
    let trigger = handle.shutdown_trigger();
    set_handler(move || trigger.trigger())?;

    let humans: Vec<_> = game_config
        .players
        .iter()
        .enumerate()
        .filter(|(_, kind)| **kind == PlayerKind::Human)
        .filter_map(|(id, _)| handle.input(id))
        .collect();
    if !humans.is_empty() {
        info!("Reading key presses for {} human players from stdin", humans.len());
        std::thread::spawn(move || input::forward_presses(std::io::stdin().lock(), &humans));
    }

    let outcome = handle.wait().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for (player, score) in outcome.scores.iter().enumerate() {
            println!("Player {}: {}", player, score);
        }
        println!("Winners: {:?}", outcome.winners);
    }

    Ok(())
}
