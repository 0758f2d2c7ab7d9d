//! Generation history log.
//!
//! One JSONL line per completed generation, appended best-effort to
//! `~/.szk/history.jsonl`. Logging never fails a command; reading back
//! skips lines that do not parse.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One generation, as recorded after the draft is produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub ts: String,
    pub token: String,
    pub platform: String,
    pub lang: String,
    pub model: String,
    /// Character count of the final draft body.
    pub chars: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_id: Option<String>,
}

impl HistoryRecord {
    pub fn now(
        token: &str,
        platform: &str,
        lang: &str,
        model: &str,
        chars: usize,
        duration_ms: u64,
        saved_id: Option<String>,
    ) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            token: token.to_string(),
            platform: platform.to_string(),
            lang: lang.to_string(),
            model: model.to_string(),
            chars,
            duration_ms,
            saved_id,
        }
    }
}

/// Append-only history store rooted in one directory.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    dir: PathBuf,
}

impl HistoryLog {
    pub fn open_default() -> Option<Self> {
        dirs::home_dir().map(|home| Self::in_dir(home.join(".szk")))
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join("history.jsonl")
    }

    /// Append one record. Best-effort — failures are silently ignored.
    pub fn log(&self, record: &HistoryRecord) {
        let _ = self.append(record);
    }

    fn append(&self, record: &HistoryRecord) -> anyhow::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())?;
        let json = serde_json::to_string(record)?;
        writeln!(file, "{json}")?;
        Ok(())
    }

    /// The most recent `limit` records, oldest first. A missing file is
    /// an empty history; unparseable lines are skipped.
    pub fn recent(&self, limit: usize) -> Vec<HistoryRecord> {
        let Ok(text) = fs::read_to_string(self.path()) else {
            return Vec::new();
        };
        let records: Vec<HistoryRecord> = text
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();
        let skip = records.len().saturating_sub(limit);
        records.into_iter().skip(skip).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(token: &str) -> HistoryRecord {
        HistoryRecord::now(token, "douyin", "zh", "qwen3-vl-plus", 42, 1200, None)
    }

    #[test]
    fn appends_one_line_per_record() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::in_dir(dir.path());
        log.log(&record("t1"));
        log.log(&record("t2"));
        let text = std::fs::read_to_string(dir.path().join("history.jsonl")).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn recent_returns_last_records_oldest_first() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::in_dir(dir.path());
        for i in 0..5 {
            log.log(&record(&format!("t{i}")));
        }
        let recent = log.recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].token, "t3");
        assert_eq!(recent[1].token, "t4");
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::in_dir(dir.path());
        assert!(log.recent(10).is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let log = HistoryLog::in_dir(dir.path());
        log.log(&record("good"));
        std::fs::write(
            dir.path().join("history.jsonl"),
            format!(
                "{}\nnot json at all\n",
                serde_json::to_string(&record("kept")).unwrap()
            ),
        )
        .unwrap();
        let recent = log.recent(10);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].token, "kept");
    }

    #[test]
    fn saved_id_is_omitted_when_absent() {
        let json = serde_json::to_string(&record("t")).unwrap();
        assert!(!json.contains("saved_id"));
    }
}
