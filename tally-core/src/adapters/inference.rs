//! Inference service client
//!
//! HTTP client for the extraction service behind the SMS, receipt, and
//! statement modalities. The service is a black box that returns structured
//! candidates; this adapter handles transport, timeouts, and DTO mapping.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use reqwest::multipart;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::result::{Error, Result};
use crate::domain::{AssetType, Flow, TransactionCandidate};
use crate::ports::{
    ReceiptExtractor, ReceiptImage, SmsExtractor, StatementExtractor, StatementFile,
    StatementParse,
};

/// Client for the extraction service HTTP API
pub struct InferenceClient {
    client: Client,
    base_url: String,
    api_token: Option<String>,
}

impl InferenceClient {
    /// Create a client for the extraction service.
    ///
    /// The base URL must use HTTPS (plain HTTP is accepted for localhost
    /// development targets). The timeout bounds every extraction call so a
    /// slow inference backend cannot hang a submission.
    pub fn new(base_url: &str, api_token: Option<String>, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|_| Error::Config(format!("invalid inference base URL: {base_url}")))?;

        let host = parsed.host_str().unwrap_or("");
        let is_local = host == "localhost" || host == "127.0.0.1";
        if parsed.scheme() != "https" && !is_local {
            return Err(Error::Config(
                "inference base URL must use HTTPS".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut req = self.client.post(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }
        req
    }

    fn map_request_error(e: reqwest::Error, what: &str) -> Error {
        if e.is_timeout() {
            Error::extraction(format!("{what} timed out waiting for the inference service"))
        } else if e.is_connect() {
            Error::extraction(format!("could not reach the inference service for {what}"))
        } else {
            Error::extraction(format!("{what} request failed: {e}"))
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        what: &str,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.is_empty() {
                status.to_string()
            } else {
                format!("{status}: {body}")
            };
            return Err(Error::extraction(format!(
                "inference service rejected {what} ({detail})"
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| Error::extraction(format!("unreadable {what} response: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct SmsRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct ReceiptRequest {
    image: String,
}

/// Candidate as the extraction service returns it (camelCase wire format).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidateDto {
    amount: Option<f64>,
    description: Option<String>,
    #[serde(rename = "type")]
    flow: Option<String>,
    date: Option<NaiveDate>,
    merchant: Option<String>,
    category_id: Option<String>,
    asset_type: Option<String>,
    weight: Option<f64>,
    ornament_name: Option<String>,
    stock_symbol: Option<String>,
    units: Option<f64>,
    account_id: Option<String>,
}

impl CandidateDto {
    fn into_candidate(self) -> TransactionCandidate {
        TransactionCandidate {
            amount: self.amount.and_then(|f| Decimal::try_from(f).ok()),
            description: self.description,
            flow: self.flow.as_deref().and_then(Flow::parse),
            date: self.date,
            merchant: self.merchant,
            account_selection: self.account_id,
            category: self.category_id,
            asset_type: self.asset_type.as_deref().and_then(AssetType::parse),
            weight_grams: self.weight.and_then(|f| Decimal::try_from(f).ok()),
            ornament_name: self.ornament_name,
            stock_symbol: self.stock_symbol,
            units: self.units.and_then(|f| Decimal::try_from(f).ok()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatementDto {
    success: bool,
    #[serde(default)]
    candidates: Vec<CandidateDto>,
    #[serde(default)]
    message: Option<String>,
}

/// Mime type for a receipt image, from its extension.
fn image_mime(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// Encode image bytes as a base64 data URI for transmission.
pub fn encode_data_uri(file_name: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", image_mime(file_name), BASE64.encode(bytes))
}

#[async_trait]
impl SmsExtractor for InferenceClient {
    async fn parse(&self, text: &str) -> Result<TransactionCandidate> {
        let response = self
            .request("/transactions/parse-sms")
            .json(&SmsRequest { text })
            .send()
            .await
            .map_err(|e| Self::map_request_error(e, "SMS parsing"))?;

        let dto: CandidateDto = Self::read_json(response, "SMS parsing").await?;
        Ok(dto.into_candidate())
    }
}

#[async_trait]
impl ReceiptExtractor for InferenceClient {
    async fn analyze(&self, image: &ReceiptImage) -> Result<TransactionCandidate> {
        let body = ReceiptRequest {
            image: encode_data_uri(&image.file_name, &image.bytes),
        };
        let response = self
            .request("/transactions/analyze-receipt")
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::map_request_error(e, "receipt analysis"))?;

        let dto: CandidateDto = Self::read_json(response, "receipt analysis").await?;
        let mut candidate = dto.into_candidate();
        // Receipts are always expenses, whatever the model says.
        candidate.asset_type = Some(AssetType::Expense);
        Ok(candidate)
    }
}

#[async_trait]
impl StatementExtractor for InferenceClient {
    async fn parse(&self, file: &StatementFile, account_id: &str) -> Result<StatementParse> {
        let part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let form = multipart::Form::new()
            .part("file", part)
            .text("accountId", account_id.to_string());

        let response = self
            .request("/transactions/parse-statement")
            .multipart(form)
            .send()
            .await
            .map_err(|e| Self::map_request_error(e, "statement parsing"))?;

        let dto: StatementDto = Self::read_json(response, "statement parsing").await?;
        Ok(StatementParse {
            success: dto.success,
            candidates: dto
                .candidates
                .into_iter()
                .map(CandidateDto::into_candidate)
                .collect(),
            message: dto.message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_validation() {
        let timeout = Duration::from_secs(5);
        assert!(InferenceClient::new("https://inference.example.com", None, timeout).is_ok());
        assert!(InferenceClient::new("http://localhost:8080", None, timeout).is_ok());
        assert!(InferenceClient::new("http://inference.example.com", None, timeout).is_err());
        assert!(InferenceClient::new("not a url", None, timeout).is_err());
    }

    #[test]
    fn test_encode_data_uri() {
        let uri = encode_data_uri("receipt.png", b"abc");
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.ends_with("YWJj"));

        let uri = encode_data_uri("photo.JPG", b"abc");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_candidate_dto_mapping() {
        let dto: CandidateDto = serde_json::from_str(
            r#"{
                "amount": 10000.0,
                "type": "EXPENSE",
                "assetType": "GOLD",
                "weight": 50.0,
                "ornamentName": "Gold chain",
                "date": "2026-03-02",
                "merchant": "Damas"
            }"#,
        )
        .unwrap();

        let candidate = dto.into_candidate();
        assert_eq!(candidate.amount, Some(Decimal::new(10000, 0)));
        assert_eq!(candidate.flow, Some(Flow::Expense));
        assert_eq!(candidate.asset_type, Some(AssetType::Gold));
        assert_eq!(candidate.weight_grams, Some(Decimal::new(50, 0)));
        assert_eq!(candidate.ornament_name.as_deref(), Some("Gold chain"));
        assert_eq!(
            candidate.date,
            NaiveDate::from_ymd_opt(2026, 3, 2)
        );
    }

    #[test]
    fn test_statement_dto_defaults() {
        let dto: StatementDto =
            serde_json::from_str(r#"{"success": false, "message": "unreadable file"}"#).unwrap();
        assert!(!dto.success);
        assert!(dto.candidates.is_empty());
        assert_eq!(dto.message.as_deref(), Some("unreadable file"));
    }
}
