//! Account domain model and linkage resolution

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of cash account this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Bank,
    Wallet,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Bank => "bank",
            AccountKind::Wallet => "wallet",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bank" => Some(AccountKind::Bank),
            "wallet" => Some(AccountKind::Wallet),
            _ => None,
        }
    }
}

/// A cash account (bank account or wallet) owned by the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    pub institution: Option<String>,
    /// ISO 4217 currency code, normalized to uppercase
    pub currency: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with required fields
    pub fn new(id: Uuid, name: impl Into<String>, kind: AccountKind) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            kind,
            institution: None,
            currency: "AED".to_string(),
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Normalize currency code to uppercase
    pub fn normalize_currency(currency: &str) -> String {
        currency.trim().to_uppercase()
    }

    /// Validate account data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("account name cannot be empty");
        }
        if self.currency.trim().is_empty() {
            return Err("currency cannot be empty");
        }
        Ok(())
    }
}

/// A credit card; the balance tracks what is owed, so expenses increase it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: Uuid,
    pub name: String,
    pub issuer: Option<String>,
    pub currency: String,
    pub balance_owed: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CreditCard {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            issuer: None,
            currency: "AED".to_string(),
            balance_owed: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Resolved linkage between a transaction and the balance it affects.
///
/// Exactly one target per link holds by construction; the old
/// account-id-plus-credit-card-id pair cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum AccountRef {
    Account(String),
    CreditCard(String),
}

impl AccountRef {
    /// Prefix marking a credit card inside an opaque account selection.
    pub const CREDIT_CARD_PREFIX: &'static str = "cc_";

    /// Resolve an opaque selection string into a linkage target.
    ///
    /// Absent or blank input degrades to no linkage; it is never an error.
    /// The same resolution runs for every ingestion modality.
    pub fn resolve(selection: Option<&str>) -> Option<AccountRef> {
        let raw = selection?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.strip_prefix(Self::CREDIT_CARD_PREFIX) {
            Some(card_id) => Some(AccountRef::CreditCard(card_id.to_string())),
            None => Some(AccountRef::Account(raw.to_string())),
        }
    }

    /// The bare target id, without the prefix convention.
    pub fn id(&self) -> &str {
        match self {
            AccountRef::Account(id) => id,
            AccountRef::CreditCard(id) => id,
        }
    }
}

/// Aggregate net-worth snapshot: assets minus liabilities at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetWorthSnapshot {
    pub id: Uuid,
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub net: Decimal,
    pub computed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_credit_card_prefix() {
        let link = AccountRef::resolve(Some("cc_123")).unwrap();
        assert_eq!(link, AccountRef::CreditCard("123".to_string()));
        assert_eq!(link.id(), "123");
    }

    #[test]
    fn test_resolve_plain_account() {
        let link = AccountRef::resolve(Some("acc-77")).unwrap();
        assert_eq!(link, AccountRef::Account("acc-77".to_string()));
    }

    #[test]
    fn test_resolve_absent_or_blank() {
        assert_eq!(AccountRef::resolve(None), None);
        assert_eq!(AccountRef::resolve(Some("")), None);
        assert_eq!(AccountRef::resolve(Some("   ")), None);
    }

    #[test]
    fn test_account_validation() {
        let mut account = Account::new(Uuid::new_v4(), "Emirates NBD Current", AccountKind::Bank);
        assert!(account.validate().is_ok());

        account.name = "".to_string();
        assert!(account.validate().is_err());
    }

    #[test]
    fn test_currency_normalization() {
        assert_eq!(Account::normalize_currency("aed"), "AED");
        assert_eq!(Account::normalize_currency(" usd "), "USD");
    }
}
