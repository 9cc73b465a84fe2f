//! Store ports - ledgers, account balances, and the net-worth aggregate
//!
//! The pipeline writes through these seams but owns none of the state behind
//! them. Adapters provide the actual storage.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{Account, AccountRef, CreditCard, Ledger, NetWorthSnapshot, Transaction};

/// Per-ledger record store.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persist a canonical record into the given ledger.
    ///
    /// This is the single point of at-most-one creation: implementations
    /// never retry a partially failed write, they report it.
    async fn create(&self, ledger: Ledger, tx: &Transaction) -> Result<Transaction>;

    /// All records in a ledger, newest first.
    async fn transactions(&self, ledger: Ledger) -> Result<Vec<Transaction>>;

    /// True if a statement fingerprint has been persisted before.
    async fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool>;
}

/// Account and credit-card balances.
///
/// Balances are a mutable external resource: the pipeline may adjust them but
/// does not own them.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn add_account(&self, account: &Account) -> Result<()>;

    async fn add_credit_card(&self, card: &CreditCard) -> Result<()>;

    async fn accounts(&self) -> Result<Vec<Account>>;

    async fn credit_cards(&self) -> Result<Vec<CreditCard>>;

    /// Apply a signed delta to the linked balance.
    ///
    /// For an account link the delta moves `balance`; for a credit-card link
    /// it moves `balance_owed`. An unknown target is `Error::NotFound`.
    async fn adjust(&self, link: &AccountRef, delta: Decimal) -> Result<()>;
}

/// Aggregate net-worth view.
#[async_trait]
pub trait NetWorthRefresher: Send + Sync {
    /// Recompute the aggregate snapshot now. Idempotent - calling when
    /// nothing changed is harmless.
    async fn refresh(&self) -> Result<()>;

    /// Most recent snapshot, if any has been computed.
    async fn latest(&self) -> Result<Option<NetWorthSnapshot>>;
}
