//! Error types for DSN handling and ingestion submission.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// DSN is not of the form `<credential>@<host>`.
    #[error("invalid ingestion DSN: {0}")]
    InvalidDsn(&'static str),

    /// Network/transport failure before a status was received. The request
    /// URL is stripped since its query carries the DSN.
    #[error("ingestion transport error: {0}")]
    Transport(reqwest::Error),

    /// The service answered with anything other than 200.
    #[error("ingestion rejected with HTTP {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    /// A 200 response whose body does not match the expected shape.
    #[error("failed to decode ingestion response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transport_errors_do_not_echo_the_request_url() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let raw = reqwest::Client::new()
            .get(format!("http://{addr}/api/v1/ingest?dsn=SECRET-CRED@{addr}"))
            .send()
            .await
            .unwrap_err();
        assert!(raw.url().is_some());

        let err = IngestError::from(raw);
        let rendered = format!("{err} {err:?}");
        assert!(!rendered.contains("SECRET-CRED"), "{rendered}");
        match err {
            IngestError::Transport(inner) => assert!(inner.url().is_none()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
