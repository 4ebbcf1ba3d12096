//! Announcement cues and voice clip resolution.
//!
//! An event renders as a fixed sequence of cues ("20030", "toward",
//! "North Amherst", "will be leaving", "Stop 71", "in 2 minutes"). Each
//! cue resolves to a pre-recorded clip when one exists under the voice
//! directory and degrades to spoken text otherwise.

use std::path::{Path, PathBuf};

use crate::domain::AnnouncementEvent;

/// One unit of an announcement, before clip lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cue {
    /// The route number.
    Route(String),
    /// A fixed connective phrase ("toward", "will be leaving") or the
    /// interval phrase.
    Fragment(String),
    /// The destination label. Keeps the route id for the per-route clip
    /// directory fallback.
    Headsign { route_id: String, headsign: String },
    /// The stop the departure leaves from.
    Stop(String),
}

/// How a cue will actually be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Voicing {
    /// Play this clip file.
    Clip(PathBuf),
    /// No clip exists; speak this text.
    Speech(String),
}

/// Build the cue sequence for one event.
pub fn cues_for(event: &AnnouncementEvent) -> Vec<Cue> {
    vec![
        Cue::Route(event.route.route_id().to_string()),
        Cue::Fragment("toward".to_string()),
        Cue::Headsign {
            route_id: event.route.route_id().to_string(),
            headsign: event.route.headsign().to_string(),
        },
        Cue::Fragment("will be leaving".to_string()),
        Cue::Stop(event.stop.as_str().to_string()),
        Cue::Fragment(interval_phrase(event.interval.minutes())),
    ]
}

/// Phrase for the closing cue of an announcement.
///
/// A departed or imminent bus is "now"; past that, English pluralization.
pub fn interval_phrase(minutes: i64) -> String {
    match minutes {
        m if m <= 0 => "now".to_string(),
        1 => "in 1 minute".to_string(),
        m => format!("in {m} minutes"),
    }
}

/// Resolve a cue against the voice directory.
///
/// Every cue kind first tries its direct clip; headsigns additionally try
/// a per-route directory (with `/` in the name swapped for `-`, since
/// headsigns like "Sunderland / South Amherst" exist). When nothing is on
/// disk the cue's text becomes speech.
pub fn resolve(cue: &Cue, voice_dir: &Path) -> Voicing {
    match cue {
        Cue::Route(route_id) => {
            clip_or_speech(voice_dir.join("routes").join(clip_name(route_id)), route_id)
        }
        Cue::Fragment(text) => {
            clip_or_speech(voice_dir.join("fragments").join(clip_name(text)), text)
        }
        Cue::Stop(stop_id) => {
            clip_or_speech(voice_dir.join("stops").join(clip_name(stop_id)), stop_id)
        }
        Cue::Headsign { route_id, headsign } => {
            let direct = voice_dir.join("headsigns").join(clip_name(headsign));
            if direct.is_file() {
                return Voicing::Clip(direct);
            }
            let per_route = voice_dir
                .join("headsigns")
                .join(route_id)
                .join(clip_name(&headsign.replace('/', "-")));
            clip_or_speech(per_route, headsign)
        }
    }
}

fn clip_or_speech(path: PathBuf, text: &str) -> Voicing {
    if path.is_file() {
        Voicing::Clip(path)
    } else {
        Voicing::Speech(text.to_string())
    }
}

fn clip_name(stem: &str) -> String {
    format!("{stem}.wav")
}
