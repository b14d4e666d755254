//! Ingestion side of the pull-request scan.
//!
//! [`normalize`] turns a scanner report into the canonical
//! [`IngestionPayload`]; [`IngestClient::submit`] posts it to the backend
//! addressed by an [`IngestDsn`].

pub mod client;
pub mod dsn;
pub mod errors;
pub mod payload;

pub use client::{IngestClient, IngestOutcome, ScanPid, VariantIssue};
pub use dsn::IngestDsn;
pub use errors::{IngestError, IngestResult};
pub use payload::{AssetDescriptor, IngestionPayload, Issue, ScannerInfo, normalize, relative_path};
