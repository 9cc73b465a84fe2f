//! Tally Core - multi-modal transaction ingestion and reconciliation
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: business entities (Transaction, Account, linkage references)
//! - **ports**: trait seams for external dependencies (extraction services, stores)
//! - **services**: the ingestion pipeline and its support services
//! - **adapters**: concrete implementations (DuckDB, HTTP inference client, memory)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use adapters::{DuckDbStore, InferenceClient, MemoryStore};
use config::Config;
use ports::{AccountStore, LedgerStore, NetWorthRefresher};
use services::IngestService;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult};
pub use domain::{
    present, Account, AccountKind, AccountRef, AssetType, Badge, CreditCard, Flow, Ledger,
    NetWorthSnapshot, Presentation, Source, Transaction, TransactionCandidate,
};
pub use services::{EventLogger, IngestReport, IngestRequest, LogEntry, LogEvent, ManualEntry};

/// Environment variable holding the inference service API token.
pub const INFERENCE_TOKEN_ENV: &str = "TALLY_INFERENCE_TOKEN";

/// Main context for Tally operations
///
/// This is the primary entry point for embedding the core. It holds the
/// configuration, the store adapter behind its ports, and the ingestion
/// pipeline.
pub struct TallyContext {
    pub config: Config,
    pub ingest_service: IngestService,
    pub ledger: Arc<dyn LedgerStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub net_worth: Arc<dyn NetWorthRefresher>,
}

impl TallyContext {
    /// Create a new Tally context rooted at `tally_dir`.
    ///
    /// Demo mode swaps `tally.duckdb` for a separate `demo.duckdb`, so
    /// experiments never touch real data.
    pub fn new(tally_dir: &Path) -> Result<Self> {
        let config = Config::load(tally_dir)?;

        let db_filename = if config.demo_mode {
            "demo.duckdb"
        } else {
            "tally.duckdb"
        };
        let store = Arc::new(DuckDbStore::new(&tally_dir.join(db_filename))?);

        Self::with_store(config, store.clone(), store.clone(), store)
    }

    /// Create a context over an in-memory store with demo fixtures; nothing
    /// is written to disk.
    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(MemoryStore::with_demo_data());
        Self::with_store(config, store.clone(), store.clone(), store)
    }

    fn with_store(
        config: Config,
        ledger: Arc<dyn LedgerStore>,
        accounts: Arc<dyn AccountStore>,
        net_worth: Arc<dyn NetWorthRefresher>,
    ) -> Result<Self> {
        let token = std::env::var(INFERENCE_TOKEN_ENV).ok();
        let inference = Arc::new(InferenceClient::new(
            &config.inference_base_url,
            token,
            Duration::from_secs(config.inference_timeout_secs),
        )?);

        let ingest_service = IngestService::new(
            inference.clone(),
            inference.clone(),
            inference,
            ledger.clone(),
            accounts.clone(),
            net_worth.clone(),
            config.base_currency.clone(),
        );

        Ok(Self {
            config,
            ingest_service,
            ledger,
            accounts,
            net_worth,
        })
    }
}
