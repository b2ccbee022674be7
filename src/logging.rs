//! Best-effort session log
//!
//! One timestamped line per call, appended to a file that is opened and
//! closed per write. Logging must never affect the run: write failures are
//! swallowed and surface only as internal diagnostics.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

pub struct SessionLog {
    path: PathBuf,
    enabled: bool,
}

impl SessionLog {
    pub fn new(path: PathBuf, enabled: bool) -> Self {
        Self { path, enabled }
    }

    /// A sink that drops everything.
    pub fn disabled() -> Self {
        Self {
            path: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line. Cannot fail observably.
    pub fn append(&self, text: &str) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.try_append(text) {
            debug!("log write to {} failed: {}", self.path.display(), e);
        }
    }

    fn try_append(&self, text: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{}: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let log = SessionLog::new(path.clone(), true);
        log.append("first");
        log.append("second");

        let content = std::fs::read_to_string(&path).unwrap();
        let first = content.find("first").unwrap();
        let second = content.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn appends_across_separate_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");

        SessionLog::new(path.clone(), true).append("session one");
        SessionLog::new(path.clone(), true).append("session two");

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.lines().next().unwrap().contains("session one"));
    }

    #[test]
    fn lines_carry_a_timestamp_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        SessionLog::new(path.clone(), true).append("hello");

        let content = std::fs::read_to_string(&path).unwrap();
        let line = content.lines().next().unwrap();
        let (prefix, rest) = line.split_once(": ").unwrap();
        assert_eq!(rest, "hello");
        // "%Y-%m-%d %H:%M:%S"
        assert_eq!(prefix.len(), 19);
        assert!(prefix.chars().next().unwrap().is_ascii_digit());
    }

    #[test]
    fn disabled_sink_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        SessionLog::new(path.clone(), false).append("dropped");
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_path_is_swallowed() {
        let log = SessionLog::new(PathBuf::from("/nonexistent-dir/log.txt"), true);
        log.append("lost");
    }
}
