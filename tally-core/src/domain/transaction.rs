//! Transaction domain model: candidates, canonical records, ledger routing

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::account::AccountRef;

/// Classification of what a transaction acquires or moves.
///
/// The asset type picks the downstream ledger that owns the record and is
/// never changed after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetType {
    Cash,
    Gold,
    Stock,
    Bond,
    Expense,
    Income,
    BankDeposit,
}

/// Cash-flow direction of a candidate (expense or income).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flow {
    Expense,
    Income,
}

/// Which ingestion modality produced a record. Immutable once set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Source {
    Sms,
    Receipt,
    Statement,
    Manual,
}

/// The record store that owns a transaction.
///
/// Expense, income, plain cash, and bank-deposit records all live in the
/// cash ledger; their `AssetType` preserves the finer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ledger {
    Cash,
    Gold,
    Stock,
    Bond,
}

/// Direction a balance moves when a linked account absorbs a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceDirection {
    /// Money leaves the user: cash balance down, credit-card owed up.
    Outflow,
    /// Money arrives: cash balance up, credit-card owed down.
    Inflow,
}

impl AssetType {
    /// The ledger that owns records of this type. Total over all variants.
    pub fn ledger(&self) -> Ledger {
        match self {
            AssetType::Gold => Ledger::Gold,
            AssetType::Stock => Ledger::Stock,
            AssetType::Bond => Ledger::Bond,
            AssetType::Cash | AssetType::Expense | AssetType::Income | AssetType::BankDeposit => {
                Ledger::Cash
            }
        }
    }

    /// Asset acquisitions are not cash-flow records and do not require a
    /// `Flow` on the candidate.
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            AssetType::Gold | AssetType::Stock | AssetType::Bond | AssetType::BankDeposit
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Cash => "CASH",
            AssetType::Gold => "GOLD",
            AssetType::Stock => "STOCK",
            AssetType::Bond => "BOND",
            AssetType::Expense => "EXPENSE",
            AssetType::Income => "INCOME",
            AssetType::BankDeposit => "BANK_DEPOSIT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CASH" => Some(AssetType::Cash),
            "GOLD" => Some(AssetType::Gold),
            "STOCK" => Some(AssetType::Stock),
            "BOND" => Some(AssetType::Bond),
            "EXPENSE" => Some(AssetType::Expense),
            "INCOME" => Some(AssetType::Income),
            "BANK_DEPOSIT" => Some(AssetType::BankDeposit),
            _ => None,
        }
    }
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flow::Expense => "EXPENSE",
            Flow::Income => "INCOME",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "EXPENSE" => Some(Flow::Expense),
            "INCOME" => Some(Flow::Income),
            _ => None,
        }
    }
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Sms => "SMS",
            Source::Receipt => "RECEIPT",
            Source::Statement => "STATEMENT",
            Source::Manual => "MANUAL",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SMS" => Some(Source::Sms),
            "RECEIPT" => Some(Source::Receipt),
            "STATEMENT" => Some(Source::Statement),
            "MANUAL" => Some(Source::Manual),
            _ => None,
        }
    }
}

impl Ledger {
    /// All ledgers, in display order.
    pub const ALL: [Ledger; 4] = [Ledger::Cash, Ledger::Gold, Ledger::Stock, Ledger::Bond];

    pub fn as_str(&self) -> &'static str {
        match self {
            Ledger::Cash => "cash",
            Ledger::Gold => "gold",
            Ledger::Stock => "stock",
            Ledger::Bond => "bond",
        }
    }
}

/// Unvalidated transaction draft, as produced by an extraction adapter or
/// the manual form. One shape for all four modalities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub flow: Option<Flow>,
    pub date: Option<NaiveDate>,
    pub merchant: Option<String>,
    /// Opaque account selection; credit cards carry the `cc_` prefix.
    pub account_selection: Option<String>,
    pub category: Option<String>,
    pub asset_type: Option<AssetType>,
    // Gold
    pub weight_grams: Option<Decimal>,
    pub ornament_name: Option<String>,
    // Stock
    pub stock_symbol: Option<String>,
    pub units: Option<Decimal>,
}

/// Canonical transaction record
///
/// Created exactly once per successful ingestion; `source` and `asset_type`
/// are immutable after dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub amount: Decimal,
    /// ISO 4217 code of the base currency the amount is stored in.
    pub currency: String,
    pub flow: Option<Flow>,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub merchant: Option<String>,
    pub category: Option<String>,
    pub asset_type: AssetType,
    pub source: Source,
    pub linked: Option<AccountRef>,
    // Gold
    pub weight_grams: Option<Decimal>,
    pub ornament_name: Option<String>,
    // Stock
    pub stock_symbol: Option<String>,
    pub units: Option<Decimal>,
    /// Dedup fingerprint; set for statement line items only.
    pub fingerprint: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a new transaction with required fields
    pub fn new(
        id: Uuid,
        amount: Decimal,
        currency: impl Into<String>,
        asset_type: AssetType,
        source: Source,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            amount,
            currency: currency.into(),
            flow: None,
            date,
            description: None,
            merchant: None,
            category: None,
            asset_type,
            source,
            linked: None,
            weight_grams: None,
            ornament_name: None,
            stock_symbol: None,
            units: None,
            fingerprint: None,
            created_at: Utc::now(),
        }
    }

    /// Direction balance sync moves a linked balance for this record.
    ///
    /// Expenses and asset acquisitions draw money out; income and bank
    /// deposits bring money in. Plain cash records follow their flow.
    pub fn direction(&self) -> BalanceDirection {
        match self.asset_type {
            AssetType::Income | AssetType::BankDeposit => BalanceDirection::Inflow,
            AssetType::Expense | AssetType::Gold | AssetType::Stock | AssetType::Bond => {
                BalanceDirection::Outflow
            }
            AssetType::Cash => match self.flow {
                Some(Flow::Income) => BalanceDirection::Inflow,
                _ => BalanceDirection::Outflow,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_routing_is_total() {
        assert_eq!(AssetType::Gold.ledger(), Ledger::Gold);
        assert_eq!(AssetType::Stock.ledger(), Ledger::Stock);
        assert_eq!(AssetType::Bond.ledger(), Ledger::Bond);
        assert_eq!(AssetType::Expense.ledger(), Ledger::Cash);
        assert_eq!(AssetType::Income.ledger(), Ledger::Cash);
        assert_eq!(AssetType::Cash.ledger(), Ledger::Cash);
        assert_eq!(AssetType::BankDeposit.ledger(), Ledger::Cash);
    }

    #[test]
    fn test_direction_per_asset_type() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let mut tx = Transaction::new(
            Uuid::new_v4(),
            Decimal::new(20000, 2),
            "AED",
            AssetType::Expense,
            Source::Manual,
            date,
        );
        assert_eq!(tx.direction(), BalanceDirection::Outflow);

        tx.asset_type = AssetType::Income;
        assert_eq!(tx.direction(), BalanceDirection::Inflow);

        tx.asset_type = AssetType::Gold;
        assert_eq!(tx.direction(), BalanceDirection::Outflow);

        tx.asset_type = AssetType::BankDeposit;
        assert_eq!(tx.direction(), BalanceDirection::Inflow);

        tx.asset_type = AssetType::Cash;
        tx.flow = Some(Flow::Income);
        assert_eq!(tx.direction(), BalanceDirection::Inflow);
    }

    #[test]
    fn test_asset_type_round_trip() {
        for t in [
            AssetType::Cash,
            AssetType::Gold,
            AssetType::Stock,
            AssetType::Bond,
            AssetType::Expense,
            AssetType::Income,
            AssetType::BankDeposit,
        ] {
            assert_eq!(AssetType::parse(t.as_str()), Some(t));
        }
        assert_eq!(AssetType::parse("PLUTONIUM"), None);
    }
}
