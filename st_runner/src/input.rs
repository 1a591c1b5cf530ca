//! Key presses read from standard input.
//!
//! Each line names a player and a slot, e.g. `0 7`. Lines that don't parse
//! are reported and skipped.

use set_table::{InputHandle, PlayerId, Slot};
use std::io::BufRead;

/// Parses a `<player> <slot>` line.
pub fn parse_press(line: &str) -> Option<(PlayerId, Slot)> {
    let mut parts = line.split_whitespace();
    let player = parts.next()?.parse().ok()?;
    let slot = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((player, slot))
}

/// Forwards presses from `reader` to the matching player until the reader
/// ends. Runs on a plain thread since reads from stdin can't be cancelled.
pub fn forward_presses(reader: impl BufRead, inputs: &[InputHandle]) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::warn!("Stopped reading input: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_press(&line) {
            Some((player, slot)) => match inputs.get(player) {
                Some(input) => {
                    input.key_pressed(slot);
                }
                None => log::warn!("No human player {}", player),
            },
            None => log::warn!("Expected '<player> <slot>', got {:?}", line),
        }
    }
    log::debug!("Input closed");
}
