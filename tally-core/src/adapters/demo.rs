//! Demo fixtures
//!
//! A small, stable set of accounts and one credit card with fixed ids, so
//! demo sessions and tests can link transactions without any setup.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Account, AccountKind, CreditCard};

/// Seeded demo accounts: a bank account and a cash wallet.
pub fn demo_accounts() -> Vec<Account> {
    let mut checking = Account::new(
        Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
        "Emirates NBD Current",
        AccountKind::Bank,
    );
    checking.institution = Some("Emirates NBD".to_string());
    checking.balance = Decimal::new(1250000, 2); // 12,500.00

    let mut wallet = Account::new(
        Uuid::parse_str("22222222-2222-2222-2222-222222222222").unwrap(),
        "Cash Wallet",
        AccountKind::Wallet,
    );
    wallet.balance = Decimal::new(180000, 2); // 1,800.00

    vec![checking, wallet]
}

/// Seeded demo credit card.
pub fn demo_cards() -> Vec<CreditCard> {
    let mut card = CreditCard::new(
        Uuid::parse_str("33333333-3333-3333-3333-333333333333").unwrap(),
        "Platinum Card",
    );
    card.issuer = Some("FAB".to_string());
    card.balance_owed = Decimal::new(420050, 2); // 4,200.50

    vec![card]
}
