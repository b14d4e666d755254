//! Scanner-native result document (`--json-v2` shape).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw scanner output: findings plus aggregate statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanReport {
    #[serde(default)]
    pub items: Vec<Finding>,
    /// Scanner's own run metadata; opaque to this service.
    #[serde(default)]
    pub run_context: Value,
    pub stats: ScanStats,
}

/// One detected issue at a file position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Finding {
    /// Absolute path of the file inside the workspace.
    pub finding: String,
    pub position: Position,
    /// Opaque, scanner-computed identity used for de-duplication.
    pub fingerprint: String,
    pub rule_id: String,
    #[serde(default)]
    pub rule_desc: String,
    #[serde(default)]
    pub severity: String,
}

/// `[line, column]` pairs for the start and end of a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    pub start: [u64; 2],
    pub end: [u64; 2],
}

impl Position {
    pub fn start_line(&self) -> u64 {
        self.start[0]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanStats {
    #[serde(default)]
    pub total_files_read: u64,
    #[serde(default)]
    pub total_bytes_read: u64,
    #[serde(default)]
    pub duration: ScanDuration,
}

/// Elapsed scan time as serialized by the scanner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScanDuration {
    #[serde(default)]
    pub secs: u64,
    #[serde(default)]
    pub nanos: u64,
}

impl ScanDuration {
    /// Whole milliseconds, truncated.
    pub fn as_millis(&self) -> u64 {
        self.secs
            .saturating_mul(1_000)
            .saturating_add(self.nanos / 1_000_000)
    }
}
