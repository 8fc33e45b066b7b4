//! Record sources and advisory notifications.
//!
//! Page controllers only see [`DataService`]; whether records come from the
//! fixture generator or a real backend is decided once at startup.

pub mod fixture;
pub mod http;
pub mod notifier;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::models::{Master, Trade};

pub use fixture::{FixtureDataService, FixtureLatency};
pub use http::HttpDataService;
pub use notifier::{Notification, NotificationLevel, Notifier};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("invalid backend base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid wallet address: {0:?}")]
    InvalidAddress(String),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// Acknowledgement of a fire-and-forget trigger. Completion is observed by
/// re-fetching, never through the ack.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ack {
    pub address: String,
    pub accepted_at: DateTime<Utc>,
}

impl Ack {
    pub fn now(address: &str) -> Self {
        Self {
            address: address.to_string(),
            accepted_at: Utc::now(),
        }
    }
}

#[async_trait]
pub trait DataService: Send + Sync {
    /// All known masters, in no particular order.
    async fn list_masters(&self) -> Result<Vec<Master>, ServiceError>;

    /// `Ok(None)` means the address has no analyzed data yet.
    async fn get_master(&self, address: &str) -> Result<Option<Master>, ServiceError>;

    /// Trades for `address`. Order is unspecified; sort before relying on recency.
    async fn list_trades(&self, address: &str) -> Result<Vec<Trade>, ServiceError>;

    async fn request_analysis(&self, address: &str) -> Result<Ack, ServiceError>;

    async fn request_update(&self, address: &str) -> Result<Ack, ServiceError>;
}
