use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use paisa_core::Transaction;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
}

// ── Wire contract ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub client_id: String,
    pub transactions: Vec<SyncTransaction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncTransaction {
    pub amount: f64,
    pub direction: String,
    pub counterparty: String,
    pub channel: String,
    /// RFC 3339 / ISO-8601 instant.
    pub occurred_at: String,
    pub fingerprint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<f64>,
}

impl SyncTransaction {
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            amount: tx.amount.to_f64(),
            direction: tx.direction.to_string(),
            counterparty: tx.counterparty.clone(),
            channel: tx.channel.to_string(),
            occurred_at: tx.occurred_at.to_rfc3339(),
            fingerprint: tx.fingerprint.clone(),
            balance_after: tx.balance_after.map(|b| b.to_f64()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub created_count: i64,
    pub skipped_count: i64,
    #[serde(default)]
    pub errors: Vec<String>,
    /// Authoritative category assignments keyed by fingerprint.
    #[serde(default)]
    pub corrections: Vec<CategoryCorrection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCorrection {
    pub fingerprint: String,
    pub category: String,
}

// ── Read-only aggregate DTOs (pass-through for downstream features) ──────────

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub safe_to_spend: f64,
    pub total_spent_today: f64,
    pub days_remaining: i64,
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub data: Vec<SpendingItem>,
    pub total: f64,
    pub period: SummaryPeriod,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingItem {
    pub category_name: String,
    pub total: f64,
    pub count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryPeriod {
    pub start: String,
    pub end: String,
}

// ── Client abstraction ────────────────────────────────────────────────────────

/// Abstraction over the remote ledger's push endpoint, injected into the
/// reconciler so tests can substitute a double.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn push(&self, request: &SyncRequest) -> Result<SyncResponse, ClientError>;
}

#[async_trait]
impl<C: LedgerClient + ?Sized> LedgerClient for std::sync::Arc<C> {
    async fn push(&self, request: &SyncRequest) -> Result<SyncResponse, ClientError> {
        (**self).push(request).await
    }
}

pub struct HttpLedgerClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpLedgerClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Safe-to-spend summary for today. Pass-through for downstream features.
    pub async fn daily_summary(&self, client_id: &str) -> Result<DailySummary, ClientError> {
        let response = self
            .http
            .get(format!("{}/insights/daily", self.base_url))
            .header("x-client-id", client_id)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Per-category spend totals over a date range. Pass-through.
    pub async fn spending_summary(
        &self,
        client_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SpendingSummary, ClientError> {
        let response = self
            .http
            .get(format!("{}/insights/spending", self.base_url))
            .header("x-client-id", client_id)
            .query(&[("startDate", start.to_string()), ("endDate", end.to_string())])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn push(&self, request: &SyncRequest) -> Result<SyncResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/transactions/sync", self.base_url))
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

// ── Mock client (always available, used for tests) ───────────────────────────

/// Records every push and returns a preset outcome — lets reconciler tests
/// run without a live backend.
pub struct MockLedger {
    response: Option<SyncResponse>,
    requests: std::sync::Mutex<Vec<SyncRequest>>,
}

impl MockLedger {
    /// Acknowledge every push with the given response.
    pub fn acknowledging(response: SyncResponse) -> Self {
        Self {
            response: Some(response),
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Fail every push with a simulated transport error.
    pub fn failing() -> Self {
        Self {
            response: None,
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SyncRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn push(&self, request: &SyncRequest) -> Result<SyncResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(ClientError::Protocol("simulated transport failure".to_string())),
        }
    }
}
