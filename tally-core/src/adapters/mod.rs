//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the ledger/account/net-worth store ports
//! - HTTP inference client for the three extraction ports
//! - In-memory store for demo mode and tests

pub mod demo;
pub mod duckdb;
pub mod inference;
pub mod memory;

pub use duckdb::DuckDbStore;
pub use inference::InferenceClient;
pub use memory::MemoryStore;
