//! In-memory store adapter - demo seeding and test double
//!
//! Implements every store port over plain mutex state and records a call
//! journal so tests can assert the persist -> adjust -> refresh ordering
//! without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, AccountRef, CreditCard, Ledger, NetWorthSnapshot, Transaction};
use crate::ports::{AccountStore, LedgerStore, NetWorthRefresher};

#[derive(Default)]
struct State {
    ledgers: HashMap<Ledger, Vec<Transaction>>,
    accounts: Vec<Account>,
    cards: Vec<CreditCard>,
    snapshots: Vec<NetWorthSnapshot>,
    journal: Vec<String>,
    fail_creates: bool,
    fail_adjustments: bool,
}

/// In-memory store used by demo mode and the test suite.
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// A store pre-seeded with a bank account, a wallet, and a credit card,
    /// so every pipeline path can be exercised without setup.
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        {
            let mut s = store.state.lock().unwrap();
            s.accounts = crate::adapters::demo::demo_accounts();
            s.cards = crate::adapters::demo::demo_cards();
        }
        store
    }

    /// Successful store calls in order: `create:<ledger>`, `adjust:<id>`,
    /// `refresh`.
    pub fn journal(&self) -> Vec<String> {
        self.state.lock().unwrap().journal.clone()
    }

    /// Make every subsequent `create` fail with a persistence error.
    pub fn fail_creates(&self, on: bool) {
        self.state.lock().unwrap().fail_creates = on;
    }

    /// Make every subsequent `adjust` fail with a balance-sync error.
    pub fn fail_adjustments(&self, on: bool) {
        self.state.lock().unwrap().fail_adjustments = on;
    }

    pub fn snapshots(&self) -> Vec<NetWorthSnapshot> {
        self.state.lock().unwrap().snapshots.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn create(&self, ledger: Ledger, tx: &Transaction) -> Result<Transaction> {
        let mut s = self.state.lock().unwrap();
        if s.fail_creates {
            return Err(Error::persistence("injected ledger failure"));
        }
        s.journal.push(format!("create:{}", ledger.as_str()));
        s.ledgers.entry(ledger).or_default().insert(0, tx.clone());
        Ok(tx.clone())
    }

    async fn transactions(&self, ledger: Ledger) -> Result<Vec<Transaction>> {
        let s = self.state.lock().unwrap();
        Ok(s.ledgers.get(&ledger).cloned().unwrap_or_default())
    }

    async fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool> {
        let s = self.state.lock().unwrap();
        Ok(s.ledgers.values().flatten().any(|tx| {
            tx.fingerprint.as_deref() == Some(fingerprint)
        }))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn add_account(&self, account: &Account) -> Result<()> {
        account.validate().map_err(Error::validation)?;
        self.state.lock().unwrap().accounts.push(account.clone());
        Ok(())
    }

    async fn add_credit_card(&self, card: &CreditCard) -> Result<()> {
        self.state.lock().unwrap().cards.push(card.clone());
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn credit_cards(&self) -> Result<Vec<CreditCard>> {
        Ok(self.state.lock().unwrap().cards.clone())
    }

    async fn adjust(&self, link: &AccountRef, delta: Decimal) -> Result<()> {
        let mut s = self.state.lock().unwrap();
        if s.fail_adjustments {
            return Err(Error::BalanceSync("injected balance failure".to_string()));
        }
        match link {
            AccountRef::Account(id) => {
                let account = s
                    .accounts
                    .iter_mut()
                    .find(|a| a.id.to_string() == *id)
                    .ok_or_else(|| Error::not_found(format!("account not found: {id}")))?;
                account.balance += delta;
                account.updated_at = Utc::now();
            }
            AccountRef::CreditCard(id) => {
                let card = s
                    .cards
                    .iter_mut()
                    .find(|c| c.id.to_string() == *id)
                    .ok_or_else(|| Error::not_found(format!("credit card not found: {id}")))?;
                card.balance_owed += delta;
                card.updated_at = Utc::now();
            }
        }
        s.journal.push(format!("adjust:{}", link.id()));
        Ok(())
    }
}

#[async_trait]
impl NetWorthRefresher for MemoryStore {
    async fn refresh(&self) -> Result<()> {
        let mut s = self.state.lock().unwrap();

        let account_total: Decimal = s.accounts.iter().map(|a| a.balance).sum();
        let holdings_total: Decimal = [Ledger::Gold, Ledger::Stock, Ledger::Bond]
            .iter()
            .filter_map(|l| s.ledgers.get(l))
            .flatten()
            .map(|tx| tx.amount)
            .sum();
        let liabilities: Decimal = s.cards.iter().map(|c| c.balance_owed).sum();

        let assets = account_total + holdings_total;
        s.snapshots.push(NetWorthSnapshot {
            id: Uuid::new_v4(),
            assets,
            liabilities,
            net: assets - liabilities,
            computed_at: Utc::now(),
        });
        s.journal.push("refresh".to_string());
        Ok(())
    }

    async fn latest(&self) -> Result<Option<NetWorthSnapshot>> {
        Ok(self.state.lock().unwrap().snapshots.last().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetType, Source};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_adjust_unknown_target_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .adjust(&AccountRef::Account("missing".to_string()), Decimal::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_refresh_nets_assets_against_owed() {
        let store = MemoryStore::with_demo_data();

        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let gold = Transaction::new(
            Uuid::new_v4(),
            Decimal::new(1000000, 2),
            "AED",
            AssetType::Gold,
            Source::Sms,
            date,
        );
        store.create(Ledger::Gold, &gold).await.unwrap();

        store.refresh().await.unwrap();
        let snapshot = store.latest().await.unwrap().unwrap();

        // 12,500.00 + 1,800.00 + 10,000.00 gold holding
        assert_eq!(snapshot.assets, Decimal::new(2430000, 2));
        assert_eq!(snapshot.liabilities, Decimal::new(420050, 2));
        assert_eq!(snapshot.net, Decimal::new(2009950, 2));
    }
}
