//! Extraction ports - typed seams over the inference services
//!
//! One trait per unreliable input modality. Implementations call an external
//! inference service and return either a structured candidate or an error the
//! caller surfaces verbatim; only the statement modality reports partial
//! success, through an explicit envelope rather than an exception.

use async_trait::async_trait;

use crate::domain::result::Result;
use crate::domain::TransactionCandidate;

/// Statement uploads are restricted to document/spreadsheet formats.
pub const STATEMENT_EXTENSIONS: &[&str] = &["pdf", "csv", "xlsx", "xls"];

/// Receipt uploads are restricted to image formats.
pub const RECEIPT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "heic"];

/// True if `file_name` carries one of the allowed extensions.
pub fn extension_allowed(file_name: &str, allowed: &[&str]) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| allowed.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// An image attached to a receipt submission.
#[derive(Debug, Clone)]
pub struct ReceiptImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// An uploaded statement document.
#[derive(Debug, Clone)]
pub struct StatementFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Outcome envelope for statement parsing.
///
/// `success` and `message` are explicit fields because partial success (some
/// line items parsed, others rejected) is an expected outcome, not an
/// exceptional one. A failure message is shown to the user verbatim.
#[derive(Debug, Clone, Default)]
pub struct StatementParse {
    pub success: bool,
    pub candidates: Vec<TransactionCandidate>,
    pub message: Option<String>,
}

/// Parse a free-text SMS into a transaction candidate.
///
/// No local fallback exists for this modality: a service failure is the
/// submission's failure.
#[async_trait]
pub trait SmsExtractor: Send + Sync {
    async fn parse(&self, text: &str) -> Result<TransactionCandidate>;
}

/// Analyze a photographed receipt.
///
/// Implementations encode the image as a base64 data URI before transmission
/// and force `asset_type = Expense` on the result.
#[async_trait]
pub trait ReceiptExtractor: Send + Sync {
    async fn analyze(&self, image: &ReceiptImage) -> Result<TransactionCandidate>;
}

/// Parse an uploaded bank statement for a destination account.
///
/// The account id is required by contract - every parsed line item must be
/// attributed to a balance.
#[async_trait]
pub trait StatementExtractor: Send + Sync {
    async fn parse(&self, file: &StatementFile, account_id: &str) -> Result<StatementParse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_allowed() {
        assert!(extension_allowed("march.pdf", STATEMENT_EXTENSIONS));
        assert!(extension_allowed("MARCH.XLSX", STATEMENT_EXTENSIONS));
        assert!(!extension_allowed("march.docx", STATEMENT_EXTENSIONS));
        assert!(!extension_allowed("no-extension", STATEMENT_EXTENSIONS));
        assert!(extension_allowed("lunch.jpeg", RECEIPT_EXTENSIONS));
        assert!(!extension_allowed("lunch.pdf", RECEIPT_EXTENSIONS));
    }
}
