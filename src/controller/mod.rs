//! Page controllers: sequence data-service calls and hold each page's
//! loading / error / data state.
//!
//! Every load is stamped with a [`RequestToken`]. Only the most recently
//! issued token may write a page's data, so a slow response can never
//! overwrite a newer one. Tokens also carry the session epoch; a logout
//! between issue and completion discards the response.

pub mod detail;
pub mod masters;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use thiserror::Error;

use crate::services::ServiceError;

pub use detail::{DetailSnapshot, MasterDetailPage};
pub use masters::{MastersPage, MastersSnapshot};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("wallet address is required")]
    MissingAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    seq: u64,
    epoch: u64,
}

#[derive(Debug)]
pub struct PageState<T> {
    status: LoadStatus,
    data: Option<T>,
    error: Option<String>,
    latest: u64,
    mounted_epoch: Option<u64>,
    data_epoch: u64,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self {
            status: LoadStatus::Idle,
            data: None,
            error: None,
            latest: 0,
            mounted_epoch: None,
            data_epoch: 0,
        }
    }
}

impl<T> PageState<T> {
    /// Issue a new token; any earlier outstanding token becomes stale.
    pub fn begin(&mut self, epoch: u64) -> RequestToken {
        self.latest += 1;
        self.status = LoadStatus::Loading;
        self.mounted_epoch = Some(epoch);
        RequestToken {
            seq: self.latest,
            epoch,
        }
    }

    /// Apply a finished load. Returns `false` when the response was stale
    /// and has been dropped. A failure keeps previously loaded data.
    pub fn complete(&mut self, token: RequestToken, current_epoch: u64, result: Result<T, String>) -> bool {
        if token.seq != self.latest || token.epoch != current_epoch {
            metrics::counter!("stale_responses_discarded_total").increment(1);
            tracing::debug!(
                seq = token.seq,
                latest = self.latest,
                "Discarding stale page response"
            );
            return false;
        }

        match result {
            Ok(data) => {
                self.data = Some(data);
                self.data_epoch = token.epoch;
                self.error = None;
                self.status = LoadStatus::Loaded;
            }
            Err(message) => {
                self.error = Some(message);
                self.status = LoadStatus::Error;
            }
        }
        true
    }

    /// Drop data and invalidate any in-flight load.
    pub fn reset(&mut self) {
        self.latest += 1;
        self.status = LoadStatus::Idle;
        self.data = None;
        self.error = None;
        self.mounted_epoch = None;
    }

    /// True until the first load of the given session has been issued.
    pub fn needs_mount(&self, epoch: u64) -> bool {
        self.mounted_epoch != Some(epoch)
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Data loaded under `epoch`; anything from an earlier session is hidden.
    pub fn data(&self, epoch: u64) -> Option<&T> {
        self.data.as_ref().filter(|_| self.data_epoch == epoch)
    }
}

/// Number of in-flight user actions (analysis, update) behind a busy flag.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicUsize);

impl BusyFlag {
    pub fn enter(&self) -> BusyGuard<'_> {
        self.0.fetch_add(1, Ordering::SeqCst);
        BusyGuard(&self.0)
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

pub struct BusyGuard<'a>(&'a AtomicUsize);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Run one service call with request/error counters and failure logging.
pub(crate) async fn call_service<T, F>(op: &'static str, fut: F) -> Result<T, ServiceError>
where
    F: Future<Output = Result<T, ServiceError>>,
{
    metrics::counter!("service_requests_total", "op" => op).increment(1);
    let result = fut.await;
    if let Err(e) = &result {
        metrics::counter!("service_errors_total", "op" => op).increment(1);
        tracing::warn!(error = %e, op, "Data service call failed");
    }
    result
}
