//! Missing-messages log.
//!
//! Every text the announcer had to speak instead of play is worth a
//! recording. The log keeps one line per distinct text, sorted, so it
//! doubles as a to-record checklist that stays stable across runs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Sorted, deduplicated log of texts with no voice clip.
#[derive(Debug, Clone)]
pub struct MissingLog {
    path: PathBuf,
}

impl MissingLog {
    /// Create a log backed by the given file. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a text as missing its clip.
    ///
    /// Rewrites the whole file sorted; it stays small (one line per
    /// distinct phrase the system has ever had to speak).
    pub fn record(&self, text: &str) -> std::io::Result<()> {
        let mut messages = self.read()?;
        if !messages.insert(text.to_string()) {
            return Ok(());
        }

        let mut contents = messages.into_iter().collect::<Vec<_>>().join("\n");
        contents.push('\n');
        std::fs::write(&self.path, contents)
    }

    fn read(&self) -> std::io::Result<BTreeSet<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeSet::new()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_in(dir: &tempfile::TempDir) -> MissingLog {
        MissingLog::new(dir.path().join("missing_messages.log"))
    }

    fn lines(log: &MissingLog) -> Vec<String> {
        std::fs::read_to_string(log.path())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn records_into_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.record("North Amherst").unwrap();
        assert_eq!(lines(&log), vec!["North Amherst"]);
    }

    #[test]
    fn keeps_lines_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.record("toward").unwrap();
        log.record("North Amherst").unwrap();
        log.record("in 2 minutes").unwrap();

        assert_eq!(lines(&log), vec!["North Amherst", "in 2 minutes", "toward"]);
    }

    #[test]
    fn deduplicates_repeat_texts() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);

        log.record("toward").unwrap();
        log.record("toward").unwrap();

        assert_eq!(lines(&log), vec!["toward"]);
    }

    #[test]
    fn merges_with_existing_hand_edited_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        std::fs::write(log.path(), "zebra\n  apple  \n\n").unwrap();

        log.record("mango").unwrap();
        assert_eq!(lines(&log), vec!["apple", "mango", "zebra"]);
    }
}
