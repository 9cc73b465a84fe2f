//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. The ingest
//! service is the pipeline's single entry point; normalization and event
//! logging support it.

pub mod ingest;
pub mod logging;
pub mod normalize;

pub use ingest::{IngestReport, IngestRequest, IngestService};
pub use logging::{EventLogger, LogEntry, LogEvent};
pub use normalize::{normalize, parse_amount, statement_fingerprint, ManualEntry};
