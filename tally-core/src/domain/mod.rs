//! Domain models for the ingestion and reconciliation core

pub mod account;
pub mod present;
pub mod result;
pub mod transaction;

pub use account::{Account, AccountKind, AccountRef, CreditCard, NetWorthSnapshot};
pub use present::{present, Badge, Presentation};
pub use result::{Error, OperationResult, Result};
pub use transaction::{
    AssetType, BalanceDirection, Flow, Ledger, Source, Transaction, TransactionCandidate,
};
