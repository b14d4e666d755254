//! Ingestion DSN: `<credential>@<host>`.

use std::fmt;
use std::str::FromStr;

use crate::errors::{IngestError, IngestResult};

/// Parsed DSN. The full string is the query credential, the part after the
/// last `@` is the ingestion host.
#[derive(Clone, PartialEq, Eq)]
pub struct IngestDsn {
    raw: String,
    host: String,
}

impl IngestDsn {
    pub fn parse(raw: &str) -> IngestResult<Self> {
        let raw = raw.trim();
        let (credential, host) = raw
            .rsplit_once('@')
            .ok_or(IngestError::InvalidDsn("missing '@' separator"))?;

        if credential.is_empty() {
            return Err(IngestError::InvalidDsn("empty credential"));
        }
        let host = host.trim_end_matches('/');
        if host.is_empty() || host.contains('/') {
            return Err(IngestError::InvalidDsn("host must be a bare host[:port]"));
        }

        Ok(Self {
            raw: raw.to_string(),
            host: host.to_string(),
        })
    }

    /// Host component, e.g. `ingest.example.com:8080`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Full DSN, sent as the `dsn` query parameter.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `http://<host>/api/v1/ingest` (the DSN is appended as a query parameter).
    pub fn ingest_url(&self) -> String {
        format!("http://{}/api/v1/ingest", self.host)
    }

    /// Web link to a finished scan.
    pub fn scan_url(&self, scan_pid: &str) -> String {
        format!("https://{}/scans/{}", self.host, scan_pid)
    }
}

impl FromStr for IngestDsn {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// The credential must never end up in logs.
impl fmt::Debug for IngestDsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestDsn")
            .field("host", &self.host)
            .field("credential", &"***")
            .finish()
    }
}
