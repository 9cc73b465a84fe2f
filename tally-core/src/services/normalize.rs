//! Input normalization - manual form shaping and candidate canonicalization
//!
//! Two stages live here: shaping the user-entered form into the same
//! candidate structure the extraction adapters produce, and turning any
//! candidate into a canonical `Transaction` with defaults resolved.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{AssetType, Flow, Source, Transaction, TransactionCandidate};

/// User-entered form state for the manual modality.
///
/// Field values arrive as the form produced them; `into_candidate` applies
/// the cleanup policy before anything reaches the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct ManualEntry {
    /// Raw amount text from the form.
    pub amount: String,
    pub flow: Option<Flow>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub merchant: Option<String>,
    pub category: Option<String>,
    /// Opaque account selection; credit cards carry the `cc_` prefix.
    pub account_selection: Option<String>,
}

impl ManualEntry {
    /// Validate synchronously and shape into a candidate.
    ///
    /// Empty category, merchant, description, and account selection are
    /// treated as absent rather than forwarded as empty strings, so they
    /// cannot trip required-field validation downstream.
    pub fn into_candidate(self) -> Result<TransactionCandidate> {
        let amount = parse_amount(&self.amount)
            .ok_or_else(|| Error::validation("amount is not a valid number"))?;
        if amount <= Decimal::ZERO {
            return Err(Error::validation("amount must be greater than zero"));
        }

        Ok(TransactionCandidate {
            amount: Some(amount),
            description: non_empty(self.description),
            flow: self.flow,
            date: self.date,
            merchant: non_empty(self.merchant),
            account_selection: non_empty(self.account_selection),
            category: non_empty(self.category),
            ..TransactionCandidate::default()
        })
    }
}

/// Empty or whitespace-only strings become `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parse a user-entered amount string.
///
/// Accepts currency symbols, thousands separators, and the accounting
/// parentheses notation for negatives: `(100.00)` -> `-100.00`.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (is_negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    let mut amount: Decimal = cleaned.parse().ok()?;
    if is_negative && amount > Decimal::ZERO {
        amount = -amount;
    }
    Some(amount)
}

/// Turn a candidate into a canonical transaction record.
///
/// Defaults: missing date -> `today`; classification precedence: an explicit
/// asset type wins, otherwise the flow decides expense vs income. Asset
/// acquisitions (gold/stock/bond/deposit) do not require a flow. Rejects a
/// missing or non-positive amount before anything is persisted.
pub fn normalize(
    candidate: &TransactionCandidate,
    base_currency: &str,
    source: Source,
    today: NaiveDate,
) -> Result<Transaction> {
    let amount = candidate
        .amount
        .ok_or_else(|| Error::validation("amount is required"))?;
    if amount <= Decimal::ZERO {
        return Err(Error::validation("amount must be greater than zero"));
    }

    let asset_type = match (candidate.asset_type, candidate.flow) {
        (Some(t), _) => t,
        (None, Some(Flow::Expense)) => AssetType::Expense,
        (None, Some(Flow::Income)) => AssetType::Income,
        (None, None) => {
            return Err(Error::validation(
                "transaction type is required when no asset classification is given",
            ))
        }
    };

    // A plain cash record has no implied direction of its own.
    if asset_type == AssetType::Cash && candidate.flow.is_none() {
        return Err(Error::validation("transaction type is required"));
    }

    let flow = candidate.flow.or(match asset_type {
        AssetType::Expense => Some(Flow::Expense),
        AssetType::Income => Some(Flow::Income),
        _ => None,
    });

    let mut tx = Transaction::new(
        Uuid::new_v4(),
        amount,
        base_currency,
        asset_type,
        source,
        candidate.date.unwrap_or(today),
    );
    tx.flow = flow;
    tx.description = candidate.description.clone();
    tx.merchant = candidate.merchant.clone();
    tx.category = candidate.category.clone();
    tx.weight_grams = candidate.weight_grams;
    tx.ornament_name = candidate.ornament_name.clone();
    tx.stock_symbol = candidate.stock_symbol.clone();
    tx.units = candidate.units;
    Ok(tx)
}

/// Fingerprint a statement line item for deduplication.
///
/// Hash of account id, date, exact amount, and normalized description,
/// truncated to 16 hex chars.
pub fn statement_fingerprint(
    account_id: &str,
    date: NaiveDate,
    amount: Decimal,
    description: Option<&str>,
) -> String {
    let normalized_desc = description.map(normalize_description).unwrap_or_default();

    let input = format!("{}|{}|{:.2}|{}", account_id, date, amount, normalized_desc);

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}

/// Normalize a description for fingerprint comparison:
/// - lowercase
/// - remove literal "null" strings (CSV exports)
/// - remove card number masks (10+ X's followed by 4 digits)
/// - normalize account/phone numbers to last 4 digits
/// - strip whitespace and special characters
fn normalize_description(desc: &str) -> String {
    let desc = desc.to_lowercase();

    let null_re = Regex::new(r"\bnull\b").unwrap();
    let mut normalized = null_re.replace_all(&desc, "").to_string();

    let card_mask_re = Regex::new(r"x{10,}\d{4}").unwrap();
    normalized = card_mask_re.replace_all(&normalized, "").to_string();

    let account_re = Regex::new(r"[x0-9]{7,12}").unwrap();
    normalized = account_re
        .replace_all(&normalized, |caps: &regex::Captures| {
            let text = caps.get(0).unwrap().as_str();
            let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
            if digits.len() >= 4 {
                digits[digits.len() - 4..].to_string()
            } else {
                text.to_string()
            }
        })
        .to_string();

    let whitespace_re = Regex::new(r"\s+").unwrap();
    normalized = whitespace_re.replace_all(&normalized, "").to_string();

    let special_re = Regex::new(r"[^a-z0-9]").unwrap();
    special_re.replace_all(&normalized, "").to_string()
}
