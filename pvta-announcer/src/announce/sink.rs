//! Audio rendering seam.
//!
//! The announcer drives a sink with two operations: play a clip file,
//! speak text. The production sink shells out to external commands
//! (`afplay`/`say` on macOS, `aplay`/`espeak` elsewhere, both
//! configurable); tests substitute a recording sink.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;

use super::AnnounceError;

/// Something that can render announcement audio.
#[async_trait]
pub trait CueSink {
    /// Play a voice clip file to completion.
    async fn play_clip(&self, path: &Path) -> Result<(), AnnounceError>;

    /// Speak text via text-to-speech to completion.
    async fn speak(&self, text: &str) -> Result<(), AnnounceError>;
}

/// Sink that spawns external player and speaker commands.
#[derive(Debug, Clone)]
pub struct CommandSink {
    player: String,
    speaker: String,
}

impl CommandSink {
    /// Create a sink using the given player and speaker commands. Each
    /// receives a single argument: the clip path or the text.
    pub fn new(player: impl Into<String>, speaker: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            speaker: speaker.into(),
        }
    }

    async fn run(&self, command: &str, arg: &std::ffi::OsStr) -> Result<(), AnnounceError> {
        let status = Command::new(command)
            .arg(arg)
            .status()
            .await
            .map_err(|e| AnnounceError::Spawn {
                command: command.to_string(),
                source: e,
            })?;

        if !status.success() {
            return Err(AnnounceError::CommandFailed {
                command: command.to_string(),
                status,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CueSink for CommandSink {
    async fn play_clip(&self, path: &Path) -> Result<(), AnnounceError> {
        self.run(&self.player, path.as_os_str()).await
    }

    async fn speak(&self, text: &str) -> Result<(), AnnounceError> {
        self.run(&self.speaker, std::ffi::OsStr::new(text)).await
    }
}
