//! DuckDB store adapter
//!
//! Implements the ledger, account, and net-worth ports over a single
//! database file. Amounts are persisted as exact decimal strings so money
//! never round-trips through floats.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::transaction::{AssetType, Flow, Source};
use crate::domain::{
    Account, AccountKind, AccountRef, CreditCard, Ledger, NetWorthSnapshot, Transaction,
};
use crate::ports::{AccountStore, LedgerStore, NetWorthRefresher};

/// DuckDB-backed store
pub struct DuckDbStore {
    conn: Mutex<Connection>,
}

const LEDGER_COLUMNS: &str = "transaction_id, amount, currency, flow, tx_date, description, \
     merchant, category, asset_type, source, linked_kind, linked_id, weight_grams, \
     ornament_name, stock_symbol, units, fingerprint, created_at";

impl DuckDbStore {
    /// Open (or create) the database file and ensure the schema exists.
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .map_err(|e| Error::persistence(format!("failed to open database: {e}")))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        for ledger in Ledger::ALL {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    transaction_id TEXT PRIMARY KEY,
                    amount TEXT NOT NULL,
                    currency TEXT NOT NULL,
                    flow TEXT,
                    tx_date TEXT NOT NULL,
                    description TEXT,
                    merchant TEXT,
                    category TEXT,
                    asset_type TEXT NOT NULL,
                    source TEXT NOT NULL,
                    linked_kind TEXT,
                    linked_id TEXT,
                    weight_grams TEXT,
                    ornament_name TEXT,
                    stock_symbol TEXT,
                    units TEXT,
                    fingerprint TEXT,
                    created_at TEXT NOT NULL
                )",
                ledger_table(ledger)
            ))
            .map_err(db_err)?;
        }
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS accounts (
                account_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                kind TEXT NOT NULL,
                institution TEXT,
                currency TEXT NOT NULL,
                balance TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS credit_cards (
                card_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                issuer TEXT,
                currency TEXT NOT NULL,
                balance_owed TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS net_worth_snapshots (
                snapshot_id TEXT PRIMARY KEY,
                assets TEXT NOT NULL,
                liabilities TEXT NOT NULL,
                net TEXT NOT NULL,
                computed_at TEXT NOT NULL
            );",
        )
        .map_err(db_err)?;
        Ok(())
    }

    fn row_to_transaction(row: &duckdb::Row) -> Transaction {
        let id: String = row.get(0).unwrap_or_default();
        let amount: String = row.get(1).unwrap_or_default();
        let flow: Option<String> = row.get::<_, Option<String>>(3).ok().flatten();
        let date: String = row.get(4).unwrap_or_default();
        let asset_type: String = row.get(8).unwrap_or_default();
        let source: String = row.get(9).unwrap_or_default();
        let linked_kind: Option<String> = row.get::<_, Option<String>>(10).ok().flatten();
        let linked_id: Option<String> = row.get::<_, Option<String>>(11).ok().flatten();
        let weight: Option<String> = row.get::<_, Option<String>>(12).ok().flatten();
        let units: Option<String> = row.get::<_, Option<String>>(15).ok().flatten();
        let created: String = row.get(17).unwrap_or_default();

        Transaction {
            id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4()),
            amount: parse_decimal(&amount),
            currency: row.get(2).unwrap_or_else(|_| "AED".to_string()),
            flow: flow.as_deref().and_then(Flow::parse),
            date: parse_date(&date),
            description: row.get::<_, Option<String>>(5).ok().flatten(),
            merchant: row.get::<_, Option<String>>(6).ok().flatten(),
            category: row.get::<_, Option<String>>(7).ok().flatten(),
            asset_type: AssetType::parse(&asset_type).unwrap_or(AssetType::Expense),
            source: Source::parse(&source).unwrap_or(Source::Manual),
            linked: match (linked_kind.as_deref(), linked_id) {
                (Some("account"), Some(id)) => Some(AccountRef::Account(id)),
                (Some("creditCard"), Some(id)) => Some(AccountRef::CreditCard(id)),
                _ => None,
            },
            weight_grams: weight.map(|s| parse_decimal(&s)),
            ornament_name: row.get::<_, Option<String>>(13).ok().flatten(),
            stock_symbol: row.get::<_, Option<String>>(14).ok().flatten(),
            units: units.map(|s| parse_decimal(&s)),
            fingerprint: row.get::<_, Option<String>>(16).ok().flatten(),
            created_at: parse_timestamp(&created),
        }
    }

    fn row_to_account(row: &duckdb::Row) -> Account {
        let id: String = row.get(0).unwrap_or_default();
        let kind: String = row.get(2).unwrap_or_default();
        let balance: String = row.get(5).unwrap_or_default();
        let created: String = row.get(6).unwrap_or_default();
        let updated: String = row.get(7).unwrap_or_default();

        Account {
            id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4()),
            name: row.get(1).unwrap_or_default(),
            kind: AccountKind::parse(&kind).unwrap_or(AccountKind::Bank),
            institution: row.get::<_, Option<String>>(3).ok().flatten(),
            currency: row.get(4).unwrap_or_else(|_| "AED".to_string()),
            balance: parse_decimal(&balance),
            created_at: parse_timestamp(&created),
            updated_at: parse_timestamp(&updated),
        }
    }

    fn row_to_card(row: &duckdb::Row) -> CreditCard {
        let id: String = row.get(0).unwrap_or_default();
        let owed: String = row.get(4).unwrap_or_default();
        let created: String = row.get(5).unwrap_or_default();
        let updated: String = row.get(6).unwrap_or_default();

        CreditCard {
            id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4()),
            name: row.get(1).unwrap_or_default(),
            issuer: row.get::<_, Option<String>>(2).ok().flatten(),
            currency: row.get(3).unwrap_or_else(|_| "AED".to_string()),
            balance_owed: parse_decimal(&owed),
            created_at: parse_timestamp(&created),
            updated_at: parse_timestamp(&updated),
        }
    }
}

fn ledger_table(ledger: Ledger) -> &'static str {
    match ledger {
        Ledger::Cash => "ledger_cash",
        Ledger::Gold => "ledger_gold",
        Ledger::Stock => "ledger_stock",
        Ledger::Bond => "ledger_bond",
    }
}

fn db_err(e: duckdb::Error) -> Error {
    Error::persistence(e.to_string())
}

fn parse_decimal(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap_or_default()
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[async_trait]
impl LedgerStore for DuckDbStore {
    async fn create(&self, ledger: Ledger, tx: &Transaction) -> Result<Transaction> {
        let conn = self.conn.lock().unwrap();
        let (linked_kind, linked_id) = match &tx.linked {
            Some(AccountRef::Account(id)) => (Some("account"), Some(id.clone())),
            Some(AccountRef::CreditCard(id)) => (Some("creditCard"), Some(id.clone())),
            None => (None, None),
        };
        conn.execute(
            &format!(
                "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                ledger_table(ledger),
                LEDGER_COLUMNS
            ),
            params![
                tx.id.to_string(),
                tx.amount.to_string(),
                tx.currency,
                tx.flow.map(|f| f.as_str()),
                tx.date.format("%Y-%m-%d").to_string(),
                tx.description,
                tx.merchant,
                tx.category,
                tx.asset_type.as_str(),
                tx.source.as_str(),
                linked_kind,
                linked_id,
                tx.weight_grams.map(|d| d.to_string()),
                tx.ornament_name,
                tx.stock_symbol,
                tx.units.map(|d| d.to_string()),
                tx.fingerprint,
                tx.created_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(tx.clone())
    }

    async fn transactions(&self, ledger: Ledger) -> Result<Vec<Transaction>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM {} ORDER BY created_at DESC",
                LEDGER_COLUMNS,
                ledger_table(ledger)
            ))
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_transaction(row)))
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)?);
        }
        Ok(out)
    }

    async fn fingerprint_exists(&self, fingerprint: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        for ledger in Ledger::ALL {
            let count: i64 = conn
                .query_row(
                    &format!(
                        "SELECT COUNT(*) FROM {} WHERE fingerprint = ?",
                        ledger_table(ledger)
                    ),
                    [fingerprint],
                    |row| row.get(0),
                )
                .map_err(db_err)?;
            if count > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl AccountStore for DuckDbStore {
    async fn add_account(&self, account: &Account) -> Result<()> {
        account.validate().map_err(Error::validation)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO accounts (account_id, name, kind, institution, currency, balance, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                account.id.to_string(),
                account.name,
                account.kind.as_str(),
                account.institution,
                account.currency,
                account.balance.to_string(),
                account.created_at.to_rfc3339(),
                account.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn add_credit_card(&self, card: &CreditCard) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO credit_cards (card_id, name, issuer, currency, balance_owed, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                card.id.to_string(),
                card.name,
                card.issuer,
                card.currency,
                card.balance_owed.to_string(),
                card.created_at.to_rfc3339(),
                card.updated_at.to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn accounts(&self) -> Result<Vec<Account>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT account_id, name, kind, institution, currency, balance, created_at, \
                 updated_at FROM accounts ORDER BY created_at",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_account(row)))
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)?);
        }
        Ok(out)
    }

    async fn credit_cards(&self) -> Result<Vec<CreditCard>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT card_id, name, issuer, currency, balance_owed, created_at, updated_at \
                 FROM credit_cards ORDER BY created_at",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_card(row)))
            .map_err(db_err)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(db_err)?);
        }
        Ok(out)
    }

    async fn adjust(&self, link: &AccountRef, delta: Decimal) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        // Read-modify-write on the decimal string; a single writer holds the
        // connection lock for the whole exchange.
        match link {
            AccountRef::Account(id) => {
                let balance: String = conn
                    .query_row(
                        "SELECT balance FROM accounts WHERE account_id = ?",
                        [id],
                        |row| row.get(0),
                    )
                    .map_err(|_| Error::not_found(format!("account not found: {id}")))?;
                let updated = parse_decimal(&balance) + delta;
                conn.execute(
                    "UPDATE accounts SET balance = ?, updated_at = ? WHERE account_id = ?",
                    params![updated.to_string(), Utc::now().to_rfc3339(), id],
                )
                .map_err(|e| Error::BalanceSync(e.to_string()))?;
            }
            AccountRef::CreditCard(id) => {
                let owed: String = conn
                    .query_row(
                        "SELECT balance_owed FROM credit_cards WHERE card_id = ?",
                        [id],
                        |row| row.get(0),
                    )
                    .map_err(|_| Error::not_found(format!("credit card not found: {id}")))?;
                let updated = parse_decimal(&owed) + delta;
                conn.execute(
                    "UPDATE credit_cards SET balance_owed = ?, updated_at = ? WHERE card_id = ?",
                    params![updated.to_string(), Utc::now().to_rfc3339(), id],
                )
                .map_err(|e| Error::BalanceSync(e.to_string()))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl NetWorthRefresher for DuckDbStore {
    async fn refresh(&self) -> Result<()> {
        let accounts = self.accounts().await?;
        let cards = self.credit_cards().await?;

        let mut holdings = Decimal::ZERO;
        for ledger in [Ledger::Gold, Ledger::Stock, Ledger::Bond] {
            for tx in self.transactions(ledger).await? {
                holdings += tx.amount;
            }
        }

        let assets: Decimal = accounts.iter().map(|a| a.balance).sum::<Decimal>() + holdings;
        let liabilities: Decimal = cards.iter().map(|c| c.balance_owed).sum();

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO net_worth_snapshots (snapshot_id, assets, liabilities, net, computed_at) \
             VALUES (?, ?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                assets.to_string(),
                liabilities.to_string(),
                (assets - liabilities).to_string(),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(db_err)?;
        Ok(())
    }

    async fn latest(&self) -> Result<Option<NetWorthSnapshot>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT snapshot_id, assets, liabilities, net, computed_at \
                 FROM net_worth_snapshots ORDER BY computed_at DESC LIMIT 1",
            )
            .map_err(db_err)?;
        let snapshot = stmt
            .query_row([], |row| {
                let id: String = row.get(0).unwrap_or_default();
                let assets: String = row.get(1).unwrap_or_default();
                let liabilities: String = row.get(2).unwrap_or_default();
                let net: String = row.get(3).unwrap_or_default();
                let computed: String = row.get(4).unwrap_or_default();
                Ok(NetWorthSnapshot {
                    id: Uuid::parse_str(&id).unwrap_or_else(|_| Uuid::new_v4()),
                    assets: parse_decimal(&assets),
                    liabilities: parse_decimal(&liabilities),
                    net: parse_decimal(&net),
                    computed_at: parse_timestamp(&computed),
                })
            })
            .ok();
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, DuckDbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DuckDbStore::new(&dir.path().join("tally.duckdb")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_transaction_round_trip() {
        let (_dir, store) = store();

        let mut tx = Transaction::new(
            Uuid::new_v4(),
            Decimal::new(5025, 2),
            "AED",
            AssetType::Expense,
            Source::Manual,
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        );
        tx.flow = Some(Flow::Expense);
        tx.merchant = Some("Carrefour".to_string());
        tx.linked = Some(AccountRef::CreditCard("123".to_string()));
        tx.fingerprint = Some("abcd1234abcd1234".to_string());

        store.create(Ledger::Cash, &tx).await.unwrap();
        let loaded = store.transactions(Ledger::Cash).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], tx);

        assert!(store.fingerprint_exists("abcd1234abcd1234").await.unwrap());
        assert!(!store.fingerprint_exists("ffff0000ffff0000").await.unwrap());
    }

    #[tokio::test]
    async fn test_adjust_and_refresh() {
        let (_dir, store) = store();

        let mut account = Account::new(Uuid::new_v4(), "Test Bank", AccountKind::Bank);
        account.balance = Decimal::new(100000, 2); // 1,000.00
        store.add_account(&account).await.unwrap();

        let link = AccountRef::Account(account.id.to_string());
        store.adjust(&link, Decimal::new(-5000, 2)).await.unwrap();

        let accounts = store.accounts().await.unwrap();
        assert_eq!(accounts[0].balance, Decimal::new(95000, 2));

        store.refresh().await.unwrap();
        let snapshot = store.latest().await.unwrap().unwrap();
        assert_eq!(snapshot.net, Decimal::new(95000, 2));
    }

    #[tokio::test]
    async fn test_adjust_unknown_account() {
        let (_dir, store) = store();
        let err = store
            .adjust(
                &AccountRef::Account(Uuid::new_v4().to_string()),
                Decimal::ONE,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
