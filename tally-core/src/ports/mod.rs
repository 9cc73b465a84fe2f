//! Port definitions - trait seams for external collaborators

pub mod extraction;
pub mod store;

pub use extraction::{
    extension_allowed, ReceiptExtractor, ReceiptImage, SmsExtractor, StatementExtractor,
    StatementFile, StatementParse, RECEIPT_EXTENSIONS, STATEMENT_EXTENSIONS,
};
pub use store::{AccountStore, LedgerStore, NetWorthRefresher};
