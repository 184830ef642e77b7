//! HTTP client a register uses to reach the sale recorder.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    config::ClientConfig,
    dto::sales::{DailyReport, RecordSaleRequest, SaleCreated},
    error::ErrorBody,
    models::Product,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure, timeout, or an undecodable body.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The recorder answered with a non-2xx status.
    #[error("server returned {status}: {message}")]
    Server { status: StatusCode, message: String },
}

/// Operations a register needs from the sale recorder.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PosApi: Send + Sync {
    /// Full product catalog.
    async fn list_products(&self) -> Result<Vec<Product>, ClientError>;

    /// Submit a validated checkout; returns the new sale's id.
    async fn record_sale(&self, request: &RecordSaleRequest) -> Result<SaleCreated, ClientError>;

    /// Today's sale count and income.
    async fn daily_report(&self) -> Result<DailyReport, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpPosClient {
    http: Client,
    base_url: String,
    max_attempts: u32,
    retry_backoff: Duration,
}

/// Which failures may be retried without risking a duplicate write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Retry {
    /// Reads: any transport error or 5xx.
    Idempotent,
    /// Writes: only when the connection was never established.
    ConnectOnly,
}

impl HttpPosClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_attempts: config.max_attempts.max(1),
            retry_backoff: config.retry_backoff,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<T, F>(&self, retry: Retry, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Send,
        F: Fn() -> RequestBuilder + Send + Sync,
    {
        let mut attempt = 1;
        loop {
            let result = match build().send().await {
                Ok(response) => decode(response).await,
                Err(err) => Err(ClientError::Http(err)),
            };
            match result {
                Err(err) if attempt < self.max_attempts && should_retry(&err, retry) => {
                    tracing::warn!(attempt, error = %err, "request failed, retrying");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl PosApi for HttpPosClient {
    async fn list_products(&self) -> Result<Vec<Product>, ClientError> {
        let url = self.url("/api/products");
        self.send_json(Retry::Idempotent, || self.http.get(&url))
            .await
    }

    async fn record_sale(&self, request: &RecordSaleRequest) -> Result<SaleCreated, ClientError> {
        let url = self.url("/api/sale");
        self.send_json(Retry::ConnectOnly, || self.http.post(&url).json(request))
            .await
    }

    async fn daily_report(&self) -> Result<DailyReport, ClientError> {
        let url = self.url("/api/report");
        self.send_json(Retry::Idempotent, || self.http.get(&url))
            .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);
    Err(ClientError::Server { status, message })
}

fn should_retry(err: &ClientError, retry: Retry) -> bool {
    match (err, retry) {
        (ClientError::Http(err), Retry::ConnectOnly) => err.is_connect(),
        (ClientError::Http(err), Retry::Idempotent) => err.is_connect() || err.is_timeout(),
        (ClientError::Server { status, .. }, Retry::Idempotent) => status.is_server_error(),
        (ClientError::Server { .. }, Retry::ConnectOnly) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_never_retry_server_errors() {
        let err = ClientError::Server {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Database error".into(),
        };
        assert!(!should_retry(&err, Retry::ConnectOnly));
        assert!(should_retry(&err, Retry::Idempotent));
    }

    #[test]
    fn client_errors_are_not_retried() {
        let err = ClientError::Server {
            status: StatusCode::BAD_REQUEST,
            message: "Invalid sale data".into(),
        };
        assert!(!should_retry(&err, Retry::Idempotent));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = ClientConfig {
            base_url: "http://pos.local:3000/".into(),
            ..ClientConfig::default()
        };
        let client = HttpPosClient::new(&config).unwrap();
        assert_eq!(client.url("/api/report"), "http://pos.local:3000/api/report");
    }
}
