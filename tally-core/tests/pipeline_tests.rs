//! End-to-end pipeline tests over the in-memory store
//!
//! These exercise the dispatcher's observable contract: stage ordering,
//! the balance-sync skip property, linkage resolution, statement batches,
//! and the accepted saved-but-not-synced inconsistency.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use tally_core::adapters::memory::MemoryStore;
use tally_core::domain::result::{Error, Result};
use tally_core::domain::{AccountRef, AssetType, Flow, TransactionCandidate};
use tally_core::ports::{
    AccountStore, ReceiptExtractor, ReceiptImage, SmsExtractor, StatementExtractor,
    StatementFile, StatementParse,
};
use tally_core::services::{IngestRequest, IngestService, ManualEntry};
use tally_core::OperationResult;

const BANK_ACCOUNT_ID: &str = "11111111-1111-1111-1111-111111111111";
const CREDIT_CARD_ID: &str = "33333333-3333-3333-3333-333333333333";

struct StubSms(TransactionCandidate);

#[async_trait]
impl SmsExtractor for StubSms {
    async fn parse(&self, _text: &str) -> Result<TransactionCandidate> {
        Ok(self.0.clone())
    }
}

struct FailingReceipt;

#[async_trait]
impl ReceiptExtractor for FailingReceipt {
    async fn analyze(&self, _image: &ReceiptImage) -> Result<TransactionCandidate> {
        Err(Error::extraction("Failed to analyze receipt."))
    }
}

struct StubStatement(StatementParse);

#[async_trait]
impl StatementExtractor for StubStatement {
    async fn parse(&self, _file: &StatementFile, _account_id: &str) -> Result<StatementParse> {
        Ok(StatementParse {
            success: self.0.success,
            candidates: self.0.candidates.clone(),
            message: self.0.message.clone(),
        })
    }
}

struct UnreachableStatement;

#[async_trait]
impl StatementExtractor for UnreachableStatement {
    async fn parse(&self, _file: &StatementFile, _account_id: &str) -> Result<StatementParse> {
        panic!("statement extractor should not have been called");
    }
}

fn expense_candidate(amount: i64) -> TransactionCandidate {
    TransactionCandidate {
        amount: Some(Decimal::new(amount, 2)),
        flow: Some(Flow::Expense),
        ..TransactionCandidate::default()
    }
}

fn service_with(
    store: Arc<MemoryStore>,
    sms: Arc<dyn SmsExtractor>,
    receipt: Arc<dyn ReceiptExtractor>,
    statement: Arc<dyn StatementExtractor>,
) -> IngestService {
    IngestService::new(
        sms,
        receipt,
        statement,
        store.clone(),
        store.clone(),
        store,
        "AED",
    )
}

fn manual_service(store: Arc<MemoryStore>) -> IngestService {
    service_with(
        store,
        Arc::new(StubSms(TransactionCandidate::default())),
        Arc::new(FailingReceipt),
        Arc::new(UnreachableStatement),
    )
}

fn manual_entry(amount: &str, account_selection: &str) -> ManualEntry {
    ManualEntry {
        amount: amount.to_string(),
        flow: Some(Flow::Expense),
        account_selection: Some(account_selection.to_string()),
        ..ManualEntry::default()
    }
}

fn statement_file() -> StatementFile {
    StatementFile {
        file_name: "march.pdf".to_string(),
        bytes: vec![0u8; 16],
    }
}

#[tokio::test]
async fn linked_submission_orders_persist_adjust_refresh() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = manual_service(store.clone());

    let report = svc
        .ingest(IngestRequest::Manual {
            entry: manual_entry("50.00", BANK_ACCOUNT_ID),
        })
        .await
        .unwrap();

    assert_eq!(report.transactions.len(), 1);
    assert!(report.refreshed);
    assert_eq!(
        store.journal(),
        vec![
            "create:cash".to_string(),
            format!("adjust:{BANK_ACCOUNT_ID}"),
            "refresh".to_string(),
        ]
    );
}

#[tokio::test]
async fn unlinked_submission_skips_balance_sync_and_refresh() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = manual_service(store.clone());

    // Empty account selection degrades to no linkage, not an error.
    let report = svc
        .ingest(IngestRequest::Manual {
            entry: manual_entry("50.00", ""),
        })
        .await
        .unwrap();

    assert_eq!(report.transactions.len(), 1);
    assert_eq!(report.transactions[0].linked, None);
    assert!(!report.refreshed);
    assert_eq!(store.journal(), vec!["create:cash".to_string()]);
}

#[tokio::test]
async fn credit_card_expense_increases_owed_balance() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = manual_service(store.clone());

    let selection = format!("cc_{CREDIT_CARD_ID}");
    let report = svc
        .ingest(IngestRequest::Manual {
            entry: manual_entry("200", &selection),
        })
        .await
        .unwrap();

    let tx = &report.transactions[0];
    assert_eq!(tx.linked, Some(AccountRef::CreditCard(CREDIT_CARD_ID.to_string())));
    assert!(report.refreshed);

    let cards = store.credit_cards().await.unwrap();
    // 4,200.50 seeded + 200.00
    assert_eq!(cards[0].balance_owed, Decimal::new(440050, 2));
}

#[tokio::test]
async fn manual_zero_amount_never_reaches_the_ledger() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = manual_service(store.clone());

    let err = svc
        .ingest(IngestRequest::Manual {
            entry: manual_entry("0", BANK_ACCOUNT_ID),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(store.journal().is_empty());
}

#[tokio::test]
async fn extracted_candidate_without_amount_is_rejected() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let candidate = TransactionCandidate {
        flow: Some(Flow::Expense),
        ..TransactionCandidate::default()
    };
    let svc = service_with(
        store.clone(),
        Arc::new(StubSms(candidate)),
        Arc::new(FailingReceipt),
        Arc::new(UnreachableStatement),
    );

    let err = svc
        .ingest(IngestRequest::Sms {
            text: "Spent AED 500 at Carrefour".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(store.journal().is_empty());
}

#[tokio::test]
async fn sms_gold_purchase_routes_to_gold_ledger() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let candidate = TransactionCandidate {
        amount: Some(Decimal::new(1000000, 2)),
        asset_type: Some(AssetType::Gold),
        weight_grams: Some(Decimal::new(50, 0)),
        ornament_name: Some("Gold chain".to_string()),
        ..TransactionCandidate::default()
    };
    let svc = service_with(
        store.clone(),
        Arc::new(StubSms(candidate)),
        Arc::new(FailingReceipt),
        Arc::new(UnreachableStatement),
    );

    let report = svc
        .ingest(IngestRequest::Sms {
            text: "Bought 50g gold chain at AED 10,000".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(report.transactions[0].asset_type, AssetType::Gold);
    assert_eq!(store.journal(), vec!["create:gold".to_string()]);
}

#[tokio::test]
async fn receipt_failure_creates_nothing() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = manual_service(store.clone());

    let result = svc
        .ingest(IngestRequest::Receipt {
            image: ReceiptImage {
                file_name: "lunch.jpg".to_string(),
                bytes: vec![1, 2, 3],
            },
        })
        .await;

    let envelope: OperationResult<_> = result.into();
    assert!(!envelope.success);
    assert!(envelope.error.unwrap().contains("Failed to analyze receipt."));
    assert!(store.journal().is_empty());
}

#[tokio::test]
async fn balance_sync_failure_keeps_record_and_skips_refresh() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = manual_service(store.clone());
    store.fail_adjustments(true);

    let report = svc
        .ingest(IngestRequest::Manual {
            entry: manual_entry("75.00", BANK_ACCOUNT_ID),
        })
        .await
        .unwrap();

    // The record survives; the inconsistency is reported, not rolled back.
    assert_eq!(report.transactions.len(), 1);
    assert!(!report.refreshed);
    assert!(report.warnings[0].contains("transaction saved, balance not updated"));
    assert_eq!(store.journal(), vec!["create:cash".to_string()]);

    let accounts = store.accounts().await.unwrap();
    assert_eq!(accounts[0].balance, Decimal::new(1250000, 2));
}

#[tokio::test]
async fn persistence_failure_stops_everything_downstream() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = manual_service(store.clone());
    store.fail_creates(true);

    let err = svc
        .ingest(IngestRequest::Manual {
            entry: manual_entry("75.00", BANK_ACCOUNT_ID),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Persistence(_)));
    assert!(store.journal().is_empty());

    let accounts = store.accounts().await.unwrap();
    assert_eq!(accounts[0].balance, Decimal::new(1250000, 2));
}

#[tokio::test]
async fn statement_batch_persists_all_items_and_refreshes_once() {
    let store = Arc::new(MemoryStore::with_demo_data());

    let mut first = expense_candidate(12050);
    first.description = Some("CARREFOUR MALL BRANCH".to_string());
    let mut second = expense_candidate(4500);
    second.description = Some("ADNOC FUEL STATION".to_string());

    let svc = service_with(
        store.clone(),
        Arc::new(StubSms(TransactionCandidate::default())),
        Arc::new(FailingReceipt),
        Arc::new(StubStatement(StatementParse {
            success: true,
            candidates: vec![first, second],
            message: None,
        })),
    );

    let report = svc
        .ingest(IngestRequest::Statement {
            file: statement_file(),
            account_id: Some(BANK_ACCOUNT_ID.to_string()),
        })
        .await
        .unwrap();

    assert_eq!(report.transactions.len(), 2);
    assert!(report.refreshed);
    // Every line item is attributed to the chosen account.
    for tx in &report.transactions {
        assert_eq!(tx.linked, Some(AccountRef::Account(BANK_ACCOUNT_ID.to_string())));
    }

    let journal = store.journal();
    assert_eq!(
        journal.iter().filter(|e| *e == "refresh").count(),
        1,
        "refresh must fire once per batch, not per item"
    );
    assert_eq!(journal.last().map(String::as_str), Some("refresh"));

    // 12,500.00 - 120.50 - 45.00
    let accounts = store.accounts().await.unwrap();
    assert_eq!(accounts[0].balance, Decimal::new(1233450, 2));
}

#[tokio::test]
async fn statement_reingest_skips_duplicates() {
    let store = Arc::new(MemoryStore::with_demo_data());

    let mut item = expense_candidate(12050);
    item.description = Some("CARREFOUR MALL BRANCH".to_string());

    let svc = service_with(
        store.clone(),
        Arc::new(StubSms(TransactionCandidate::default())),
        Arc::new(FailingReceipt),
        Arc::new(StubStatement(StatementParse {
            success: true,
            candidates: vec![item],
            message: None,
        })),
    );

    let request = || IngestRequest::Statement {
        file: statement_file(),
        account_id: Some(BANK_ACCOUNT_ID.to_string()),
    };

    let first = svc.ingest(request()).await.unwrap();
    assert_eq!(first.transactions.len(), 1);
    assert_eq!(first.duplicates, 0);

    let second = svc.ingest(request()).await.unwrap();
    assert_eq!(second.transactions.len(), 0);
    assert_eq!(second.duplicates, 1);
    assert!(!second.refreshed);
}

#[tokio::test]
async fn statement_failure_envelope_surfaces_verbatim() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = service_with(
        store.clone(),
        Arc::new(StubSms(TransactionCandidate::default())),
        Arc::new(FailingReceipt),
        Arc::new(StubStatement(StatementParse {
            success: false,
            candidates: vec![],
            message: Some("password-protected PDF is not supported".to_string()),
        })),
    );

    let err = svc
        .ingest(IngestRequest::Statement {
            file: statement_file(),
            account_id: Some(BANK_ACCOUNT_ID.to_string()),
        })
        .await
        .unwrap_err();

    match err {
        Error::Extraction(msg) => assert_eq!(msg, "password-protected PDF is not supported"),
        other => panic!("expected extraction error, got {other:?}"),
    }
    assert!(store.journal().is_empty());
}

#[tokio::test]
async fn statement_partial_batch_reports_item_failures() {
    let store = Arc::new(MemoryStore::with_demo_data());

    let mut good = expense_candidate(12050);
    good.description = Some("CARREFOUR MALL BRANCH".to_string());
    // Unusable line item: the extractor could not read an amount.
    let bad = TransactionCandidate {
        description: Some("ILLEGIBLE ROW".to_string()),
        flow: Some(Flow::Expense),
        ..TransactionCandidate::default()
    };

    let svc = service_with(
        store.clone(),
        Arc::new(StubSms(TransactionCandidate::default())),
        Arc::new(FailingReceipt),
        Arc::new(StubStatement(StatementParse {
            success: true,
            candidates: vec![good, bad],
            message: None,
        })),
    );

    let report = svc
        .ingest(IngestRequest::Statement {
            file: statement_file(),
            account_id: Some(BANK_ACCOUNT_ID.to_string()),
        })
        .await
        .unwrap();

    assert_eq!(report.transactions.len(), 1);
    assert_eq!(report.failed, 1);
    assert!(report.warnings.iter().any(|w| w.contains("line item skipped")));
    assert!(report.refreshed);
}

#[tokio::test]
async fn statement_with_unknown_account_is_rejected_before_extraction() {
    let store = Arc::new(MemoryStore::with_demo_data());
    let svc = service_with(
        store.clone(),
        Arc::new(StubSms(TransactionCandidate::default())),
        Arc::new(FailingReceipt),
        Arc::new(UnreachableStatement),
    );

    let err = svc
        .ingest(IngestRequest::Statement {
            file: statement_file(),
            account_id: Some("99999999-9999-9999-9999-999999999999".to_string()),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert!(store.journal().is_empty());
}
