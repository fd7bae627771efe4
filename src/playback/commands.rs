use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::presentation::PlaybackSnapshot;

use super::PlaybackController;

/// The only inputs a host can send to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCommand {
    Start,
    Replay,
    Quit,
}

impl FromStr for PlayerCommand {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "s" | "start" => Ok(Self::Start),
            "r" | "replay" => Ok(Self::Replay),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(anyhow!("unknown command '{other}' (expected start, replay or quit)")),
        }
    }
}

/// Runs `command` against the controller. `Quit` tears down the current run
/// and yields `None`.
pub async fn execute(
    controller: &PlaybackController,
    command: PlayerCommand,
) -> Result<Option<PlaybackSnapshot>> {
    match command {
        PlayerCommand::Start => controller.start().await.map(Some),
        PlayerCommand::Replay => controller.replay().await.map(Some),
        PlayerCommand::Quit => {
            controller.shutdown().await;
            Ok(None)
        }
    }
}
