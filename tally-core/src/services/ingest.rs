//! Ingestion pipeline - the ledger dispatcher
//!
//! Single entry point for all four modalities. A submission walks
//! Validating -> Linking -> Persisting -> BalanceSync -> Done, with a failure
//! at any stage absorbing the rest. Persistence always precedes balance
//! mutation, and balance mutation always precedes the net-worth refresh.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{AccountRef, BalanceDirection, Source, Transaction, TransactionCandidate};
use crate::ports::{
    extension_allowed, AccountStore, LedgerStore, NetWorthRefresher, ReceiptExtractor,
    ReceiptImage, SmsExtractor, StatementExtractor, StatementFile, RECEIPT_EXTENSIONS,
    STATEMENT_EXTENSIONS,
};
use crate::services::normalize::{normalize, statement_fingerprint, ManualEntry};

/// One ingestion submission, tagged by modality.
///
/// Each variant carries its own required payload, so a malformed combination
/// (a statement without a file, say) cannot be expressed at all.
#[derive(Debug)]
pub enum IngestRequest {
    Sms {
        text: String,
    },
    Receipt {
        image: ReceiptImage,
    },
    Statement {
        file: StatementFile,
        account_id: Option<String>,
    },
    Manual {
        entry: ManualEntry,
    },
}

impl IngestRequest {
    pub fn source(&self) -> Source {
        match self {
            IngestRequest::Sms { .. } => Source::Sms,
            IngestRequest::Receipt { .. } => Source::Receipt,
            IngestRequest::Statement { .. } => Source::Statement,
            IngestRequest::Manual { .. } => Source::Manual,
        }
    }
}

/// What a submission produced.
///
/// A statement batch may create several records; the other modalities create
/// exactly one. Warnings carry partial failures (a saved record whose
/// balance did not update, skipped line items) without failing the whole
/// submission.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub source: Source,
    pub transactions: Vec<Transaction>,
    pub duplicates: i64,
    pub failed: i64,
    pub warnings: Vec<String>,
    pub refreshed: bool,
}

impl IngestReport {
    fn new(source: Source) -> Self {
        Self {
            source,
            transactions: Vec::new(),
            duplicates: 0,
            failed: 0,
            warnings: Vec::new(),
            refreshed: false,
        }
    }
}

/// Outcome of dispatching one candidate.
enum Dispatched {
    Created {
        transaction: Transaction,
        balance_synced: bool,
        warnings: Vec<String>,
    },
    Duplicate,
}

/// The ledger dispatcher: validates, links, persists, syncs balances, and
/// triggers the net-worth refresh, in that order.
pub struct IngestService {
    sms: Arc<dyn SmsExtractor>,
    receipt: Arc<dyn ReceiptExtractor>,
    statement: Arc<dyn StatementExtractor>,
    ledger: Arc<dyn LedgerStore>,
    accounts: Arc<dyn AccountStore>,
    net_worth: Arc<dyn NetWorthRefresher>,
    base_currency: String,
}

impl IngestService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sms: Arc<dyn SmsExtractor>,
        receipt: Arc<dyn ReceiptExtractor>,
        statement: Arc<dyn StatementExtractor>,
        ledger: Arc<dyn LedgerStore>,
        accounts: Arc<dyn AccountStore>,
        net_worth: Arc<dyn NetWorthRefresher>,
        base_currency: impl Into<String>,
    ) -> Self {
        Self {
            sms,
            receipt,
            statement,
            ledger,
            accounts,
            net_worth,
            base_currency: base_currency.into(),
        }
    }

    /// Ingest one submission. Runs to completion or failure; every failure
    /// path carries a human-readable message.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestReport> {
        match request {
            IngestRequest::Sms { text } => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    // Rejected before any network call.
                    return Err(Error::validation("SMS text is empty"));
                }
                let candidate = self.sms.parse(&text).await?;
                self.dispatch_single(candidate, Source::Sms).await
            }
            IngestRequest::Receipt { image } => {
                if !extension_allowed(&image.file_name, RECEIPT_EXTENSIONS) {
                    return Err(Error::validation(format!(
                        "unsupported receipt format: {}",
                        image.file_name
                    )));
                }
                let candidate = self.receipt.analyze(&image).await?;
                self.dispatch_single(candidate, Source::Receipt).await
            }
            IngestRequest::Statement { file, account_id } => {
                self.ingest_statement(file, account_id).await
            }
            IngestRequest::Manual { entry } => {
                let candidate = entry.into_candidate()?;
                self.dispatch_single(candidate, Source::Manual).await
            }
        }
    }

    async fn dispatch_single(
        &self,
        candidate: TransactionCandidate,
        source: Source,
    ) -> Result<IngestReport> {
        let mut report = IngestReport::new(source);
        match self.dispatch(&candidate, source, None).await? {
            Dispatched::Created {
                transaction,
                balance_synced,
                warnings,
            } => {
                report.transactions.push(transaction);
                report.warnings.extend(warnings);
                if balance_synced {
                    self.trigger_refresh(&mut report).await;
                }
            }
            // Unreachable without a statement fingerprint, but kept total.
            Dispatched::Duplicate => report.duplicates += 1,
        }
        Ok(report)
    }

    async fn ingest_statement(
        &self,
        file: StatementFile,
        account_id: Option<String>,
    ) -> Result<IngestReport> {
        let account_id = account_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::validation("a destination account is required for statement uploads")
            })?;

        if !extension_allowed(&file.file_name, STATEMENT_EXTENSIONS) {
            return Err(Error::validation(format!(
                "unsupported statement format: {} (expected pdf, csv, xlsx, or xls)",
                file.file_name
            )));
        }

        // The destination must exist before we pay for an extraction call.
        let known = self.accounts.accounts().await?;
        if !known.iter().any(|a| a.id.to_string() == account_id) {
            return Err(Error::not_found(format!("account not found: {account_id}")));
        }

        let parsed = self.statement.parse(&file, &account_id).await?;
        if !parsed.success {
            // An adapter-reported failure is shown verbatim; no retry.
            let message = parsed
                .message
                .unwrap_or_else(|| "failed to parse statement".to_string());
            return Err(Error::extraction(message));
        }

        let mut report = IngestReport::new(Source::Statement);
        if let Some(message) = parsed.message {
            report.warnings.push(message);
        }

        let mut any_synced = false;
        for candidate in &parsed.candidates {
            match self
                .dispatch(candidate, Source::Statement, Some(&account_id))
                .await
            {
                Ok(Dispatched::Created {
                    transaction,
                    balance_synced,
                    warnings,
                }) => {
                    report.transactions.push(transaction);
                    report.warnings.extend(warnings);
                    any_synced |= balance_synced;
                }
                Ok(Dispatched::Duplicate) => report.duplicates += 1,
                // Per-line-item failures surface item by item; the batch
                // keeps going.
                Err(e) => {
                    report.failed += 1;
                    report.warnings.push(format!("line item skipped: {e}"));
                }
            }
        }

        // One refresh per batch, and only if a balance actually moved.
        if any_synced {
            self.trigger_refresh(&mut report).await;
        }
        Ok(report)
    }

    /// Walk one candidate through the pipeline stages.
    ///
    /// `statement_account` forces the linkage target and enables fingerprint
    /// deduplication for statement line items.
    async fn dispatch(
        &self,
        candidate: &TransactionCandidate,
        source: Source,
        statement_account: Option<&str>,
    ) -> Result<Dispatched> {
        // Validating
        let today = Utc::now().date_naive();
        let mut tx = normalize(candidate, &self.base_currency, source, today)?;

        // Linking - degrades to no linkage, never fails.
        let selection = statement_account
            .map(str::to_string)
            .or_else(|| candidate.account_selection.clone());
        tx.linked = AccountRef::resolve(selection.as_deref());

        if let Some(account_id) = statement_account {
            let fp = statement_fingerprint(account_id, tx.date, tx.amount, tx.description.as_deref());
            if self.ledger.fingerprint_exists(&fp).await? {
                return Ok(Dispatched::Duplicate);
            }
            tx.fingerprint = Some(fp);
        }

        // Persisting - at-most-one creation; a failure here stops everything
        // downstream and nothing is retried.
        let created = self.ledger.create(tx.asset_type.ledger(), &tx).await?;

        // BalanceSync - skipped entirely when no linkage exists. A failure
        // after a successful persist leaves the record intact; the
        // inconsistency is reported, not rolled back.
        let mut warnings = Vec::new();
        let mut balance_synced = false;
        if let Some(link) = created.linked.clone() {
            let delta = signed_delta(&link, created.direction(), created.amount);
            match self.accounts.adjust(&link, delta).await {
                Ok(()) => balance_synced = true,
                Err(e) => warnings.push(format!("transaction saved, balance not updated: {e}")),
            }
        }

        Ok(Dispatched::Created {
            transaction: created,
            balance_synced,
            warnings,
        })
    }

    async fn trigger_refresh(&self, report: &mut IngestReport) {
        match self.net_worth.refresh().await {
            Ok(()) => report.refreshed = true,
            Err(e) => report
                .warnings
                .push(format!("net worth refresh failed: {e}")),
        }
    }
}

/// Signed delta for a linked balance.
///
/// Credit-card balances track what is owed, so an outflow increases them
/// while it decreases an account balance, and vice versa for inflows.
fn signed_delta(link: &AccountRef, direction: BalanceDirection, amount: Decimal) -> Decimal {
    match (link, direction) {
        (AccountRef::Account(_), BalanceDirection::Outflow) => -amount,
        (AccountRef::Account(_), BalanceDirection::Inflow) => amount,
        (AccountRef::CreditCard(_), BalanceDirection::Outflow) => amount,
        (AccountRef::CreditCard(_), BalanceDirection::Inflow) => -amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::adapters::memory::MemoryStore;
    use crate::ports::StatementParse;

    /// Extractor stubs that panic when reached: used to prove a submission
    /// was rejected before any service call.
    struct UnreachableSms;
    #[async_trait]
    impl SmsExtractor for UnreachableSms {
        async fn parse(&self, _text: &str) -> Result<TransactionCandidate> {
            panic!("SMS extractor should not have been called");
        }
    }

    struct UnreachableReceipt;
    #[async_trait]
    impl ReceiptExtractor for UnreachableReceipt {
        async fn analyze(&self, _image: &ReceiptImage) -> Result<TransactionCandidate> {
            panic!("receipt extractor should not have been called");
        }
    }

    struct UnreachableStatement;
    #[async_trait]
    impl StatementExtractor for UnreachableStatement {
        async fn parse(&self, _file: &StatementFile, _account_id: &str) -> Result<StatementParse> {
            panic!("statement extractor should not have been called");
        }
    }

    fn service(store: Arc<MemoryStore>) -> IngestService {
        IngestService::new(
            Arc::new(UnreachableSms),
            Arc::new(UnreachableReceipt),
            Arc::new(UnreachableStatement),
            store.clone(),
            store.clone(),
            store,
            "AED",
        )
    }

    #[tokio::test]
    async fn test_blank_sms_rejected_before_extraction() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let err = svc
            .ingest(IngestRequest::Sms {
                text: "   ".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn test_receipt_extension_rejected_before_extraction() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let err = svc
            .ingest(IngestRequest::Receipt {
                image: ReceiptImage {
                    file_name: "receipt.pdf".to_string(),
                    bytes: vec![1, 2, 3],
                },
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn test_statement_without_account_rejected() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let err = svc
            .ingest(IngestRequest::Statement {
                file: StatementFile {
                    file_name: "march.pdf".to_string(),
                    bytes: vec![0u8; 8],
                },
                account_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(store.journal().is_empty());
    }

    #[test]
    fn test_signed_delta_matrix() {
        let amount = Decimal::new(20000, 2);
        let acc = AccountRef::Account("a".into());
        let card = AccountRef::CreditCard("c".into());

        assert_eq!(signed_delta(&acc, BalanceDirection::Outflow, amount), -amount);
        assert_eq!(signed_delta(&acc, BalanceDirection::Inflow, amount), amount);
        assert_eq!(signed_delta(&card, BalanceDirection::Outflow, amount), amount);
        assert_eq!(signed_delta(&card, BalanceDirection::Inflow, amount), -amount);
    }
}
