//! Structured JSONL run log.
//!
//! Each CLI invocation can append its events to a log file: one JSON object
//! per line, every line carrying the same `run_id`, and a final artifact
//! record with the SHA-256 of the file the run produced, so a log line can
//! be checked against the carrier it claims to describe.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// One log line.
#[derive(Debug, Serialize)]
pub struct LogEntry {
    pub timestamp: u64,
    pub run_id: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactRecord>,
}

/// Links a run to a file it wrote.
#[derive(Debug, Serialize)]
pub struct ArtifactRecord {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Appends JSONL entries to a file; safe to share across callbacks.
pub struct RunLog {
    run_id: String,
    file: Mutex<std::fs::File>,
}

impl RunLog {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening run log {}", path.display()))?;
        Ok(Self {
            run_id: fresh_run_id(),
            file: Mutex::new(file),
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn event(&self, event: &str, detail: Option<serde_json::Value>) -> anyhow::Result<()> {
        self.write(LogEntry {
            timestamp: unix_now(),
            run_id: self.run_id.clone(),
            event: event.to_string(),
            detail,
            artifact: None,
        })
    }

    /// Record a produced file together with its SHA-256.
    pub fn artifact(&self, event: &str, path: &Path) -> anyhow::Result<()> {
        let data = std::fs::read(path)
            .with_context(|| format!("hashing artifact {}", path.display()))?;
        let digest = Sha256::digest(&data);
        self.write(LogEntry {
            timestamp: unix_now(),
            run_id: self.run_id.clone(),
            event: event.to_string(),
            detail: None,
            artifact: Some(ArtifactRecord {
                path: path.to_path_buf(),
                bytes: data.len() as u64,
                sha256: hex(&digest),
            }),
        })
    }

    fn write(&self, entry: LogEntry) -> anyhow::Result<()> {
        let line = serde_json::to_string(&entry).context("serialising log entry")?;
        let mut file = self.file.lock();
        writeln!(file, "{line}").context("writing run log")?;
        Ok(())
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn fresh_run_id() -> String {
    format!("{:08x}-{:04x}", unix_now(), std::process::id() & 0xFFFF)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
