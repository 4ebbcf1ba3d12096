//! Audio announcement of departure events.
//!
//! Each event becomes a fixed cue sequence; each cue plays its voice clip
//! when one exists and is spoken otherwise, with the spoken text recorded
//! in the missing-messages log so someone eventually records the clip.

mod cue;
mod missing;
mod sink;

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use tracing::{debug, info};

use crate::domain::AnnouncementEvent;

pub use cue::{Cue, Voicing, cues_for, interval_phrase, resolve};
pub use missing::MissingLog;
pub use sink::{CommandSink, CueSink};

/// Pause after each event so consecutive announcements do not run together.
const EVENT_GAP: Duration = Duration::from_millis(500);

/// Errors while rendering an announcement.
#[derive(Debug, thiserror::Error)]
pub enum AnnounceError {
    /// The player or speaker command could not be started
    #[error("could not spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The player or speaker command ran but reported failure
    #[error("{command} exited with {status}")]
    CommandFailed { command: String, status: ExitStatus },

    /// Updating the missing-messages log failed
    #[error("could not update missing-messages log: {0}")]
    MissingLog(#[from] std::io::Error),
}

/// Renders events as audio through a [`CueSink`].
#[derive(Debug, Clone)]
pub struct Announcer<S> {
    sink: S,
    voice_dir: PathBuf,
    missing_log: MissingLog,
    event_gap: Duration,
}

impl<S: CueSink> Announcer<S> {
    /// Create an announcer over the given sink.
    pub fn new(sink: S, voice_dir: impl Into<PathBuf>, missing_log: MissingLog) -> Self {
        Self {
            sink,
            voice_dir: voice_dir.into(),
            missing_log,
            event_gap: EVENT_GAP,
        }
    }

    /// Override the pause after each event (tests use zero).
    pub fn with_event_gap(mut self, gap: Duration) -> Self {
        self.event_gap = gap;
        self
    }

    /// The sink this announcer renders through.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Announce one event: resolve and render every cue, then pause.
    ///
    /// Failure partway leaves the announcement incomplete; the caller
    /// decides whether the remaining events still run.
    pub async fn announce(&self, event: &AnnouncementEvent) -> Result<(), AnnounceError> {
        info!(%event, "announcing");
        for cue in cues_for(event) {
            match resolve(&cue, &self.voice_dir) {
                Voicing::Clip(path) => {
                    debug!(clip = %path.display(), "playing");
                    self.sink.play_clip(&path).await?;
                }
                Voicing::Speech(text) => {
                    debug!(%text, "no clip, speaking");
                    self.missing_log.record(&text)?;
                    self.sink.speak(&text).await?;
                }
            }
        }
        tokio::time::sleep(self.event_gap).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{Interval, RouteKey, StopId};

    /// Sink that records what it was asked to render.
    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<String>>,
        fail_speech: bool,
    }

    #[async_trait]
    impl CueSink for RecordingSink {
        async fn play_clip(&self, path: &Path) -> Result<(), AnnounceError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("clip:{}", path.display()));
            Ok(())
        }

        async fn speak(&self, text: &str) -> Result<(), AnnounceError> {
            if self.fail_speech {
                return Err(AnnounceError::Spawn {
                    command: "say".to_string(),
                    source: std::io::Error::other("boom"),
                });
            }
            self.calls.lock().unwrap().push(format!("say:{text}"));
            Ok(())
        }
    }

    fn event(interval: i64) -> AnnouncementEvent {
        AnnouncementEvent {
            stop: StopId::new("72".to_string()).unwrap(),
            route: RouteKey::new("20030", "North Amherst"),
            interval: Interval::from_minutes(interval),
        }
    }

    fn announcer(
        dir: &tempfile::TempDir,
        sink: RecordingSink,
    ) -> Announcer<RecordingSink> {
        Announcer::new(
            sink,
            dir.path().join("voice"),
            MissingLog::new(dir.path().join("missing_messages.log")),
        )
        .with_event_gap(Duration::ZERO)
    }

    #[tokio::test]
    async fn speaks_full_sequence_when_no_clips_exist() {
        let dir = tempfile::tempdir().unwrap();
        let announcer = announcer(&dir, RecordingSink::default());

        announcer.announce(&event(5)).await.unwrap();

        let calls = announcer.sink.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                "say:20030",
                "say:toward",
                "say:North Amherst",
                "say:will be leaving",
                "say:72",
                "say:in 5 minutes",
            ]
        );
    }

    #[tokio::test]
    async fn plays_clips_where_present() {
        let dir = tempfile::tempdir().unwrap();
        let voice = dir.path().join("voice");
        std::fs::create_dir_all(voice.join("fragments")).unwrap();
        std::fs::write(voice.join("fragments/toward.wav"), b"").unwrap();

        let announcer = announcer(&dir, RecordingSink::default());
        announcer.announce(&event(0)).await.unwrap();

        let calls = announcer.sink.calls.lock().unwrap().clone();
        assert_eq!(calls[1], format!("clip:{}", voice.join("fragments/toward.wav").display()));
        // The rest still fall back to speech, ending with "now"
        assert_eq!(calls.last().unwrap(), "say:now");
    }

    #[tokio::test]
    async fn spoken_texts_land_in_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        let announcer = announcer(&dir, RecordingSink::default());

        announcer.announce(&event(2)).await.unwrap();
        announcer.announce(&event(2)).await.unwrap();

        let log = std::fs::read_to_string(dir.path().join("missing_messages.log")).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        // Sorted and deduplicated across both announcements
        assert_eq!(
            lines,
            vec!["20030", "72", "North Amherst", "in 2 minutes", "toward", "will be leaving"]
        );
    }

    #[tokio::test]
    async fn sink_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let announcer = announcer(
            &dir,
            RecordingSink {
                fail_speech: true,
                ..Default::default()
            },
        );

        assert!(announcer.announce(&event(5)).await.is_err());
    }
}
