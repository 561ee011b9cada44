//! Local usage log
//!
//! Append-only JSONL record of what the tutor was asked to do. Respects
//! the container's telemetry opt-out variable and never fails the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// One usage event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UsageEvent {
    Query {
        query: String,
        retrieval_score: f32,
        num_videos: usize,
        timestamp: DateTime<Utc>,
    },
    Quiz {
        topic: String,
        num_questions: usize,
        timestamp: DateTime<Utc>,
    },
    Feedback {
        query: String,
        helpful: bool,
        timestamp: DateTime<Utc>,
    },
}

impl UsageEvent {
    pub fn query(query: impl Into<String>, retrieval_score: f32, num_videos: usize) -> Self {
        Self::Query {
            query: query.into(),
            retrieval_score,
            num_videos,
            timestamp: Utc::now(),
        }
    }

    pub fn quiz(topic: impl Into<String>, num_questions: usize) -> Self {
        Self::Quiz {
            topic: topic.into(),
            num_questions,
            timestamp: Utc::now(),
        }
    }

    pub fn feedback(query: impl Into<String>, helpful: bool) -> Self {
        Self::Feedback {
            query: query.into(),
            helpful,
            timestamp: Utc::now(),
        }
    }
}

/// JSONL usage log, disabled when telemetry is opted out
pub struct UsageLog {
    file_path: PathBuf,
    enabled: bool,
}

impl UsageLog {
    pub fn new(file_path: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            file_path: file_path.into(),
            enabled,
        }
    }

    /// Default location under the storage directory, honoring
    /// `TUTOR_TELEMETRY_OPTOUT`.
    pub fn in_storage_dir(storage_dir: &Path) -> Self {
        let opted_out = std::env::var("TUTOR_TELEMETRY_OPTOUT")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);
        Self::new(storage_dir.join("usage.jsonl"), !opted_out)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record an event. Write failures are logged, never propagated.
    pub fn record(&self, event: UsageEvent) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.append(&event) {
            warn!("failed to write usage log: {}", e);
        }
    }

    fn append(&self, event: &UsageEvent) -> std::io::Result<()> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        let line = serde_json::to_string(event).map_err(std::io::Error::other)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}

/// "true"/"1"/"yes", case-insensitive
pub fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_events_as_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.jsonl");
        let log = UsageLog::new(&path, true);

        log.record(UsageEvent::query("what is a limit", 0.82, 0));
        log.record(UsageEvent::quiz("derivatives", 5));

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"event\":\"query\""));
        assert!(lines[1].contains("\"event\":\"quiz\""));
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.jsonl");
        let log = UsageLog::new(&path, false);

        log.record(UsageEvent::feedback("q", true));
        assert!(!path.exists());
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("1"));
        assert!(is_truthy("yes"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy(""));
    }
}
