use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use super::{call_service, BusyFlag, LoadStatus, PageError, PageState};
use crate::api::ws_types::WsMessage;
use crate::models::{Master, Trade};
use crate::presenter::table::RECENT_ACTIVITY_LIMIT;
use crate::presenter::{recent_activity, trade_rows, ActivityEntry, CopyTracker, MasterStats, TradeRow};
use crate::services::{DataService, Notifier};
use crate::session::SessionStore;

#[derive(Debug, Clone)]
struct DetailData {
    master: Option<Master>,
    trades: Vec<Trade>,
}

#[derive(Debug, Default)]
struct DetailState {
    address: Option<String>,
    page: PageState<DetailData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailSnapshot {
    pub address: String,
    pub status: LoadStatus,
    pub error: Option<String>,
    /// Loaded, but the backend has no analysis for this address yet.
    pub not_found: bool,
    pub updating: bool,
    pub copied: bool,
    pub master: Option<Master>,
    pub stats: MasterStats,
    pub trades: Vec<TradeRow>,
    pub recent_activity: Vec<ActivityEntry>,
}

/// One master's stats, trade history and recent activity. Switching to a
/// different address drops the previous master's data and supersedes any
/// load still running for it.
pub struct MasterDetailPage {
    service: Arc<dyn DataService>,
    session: SessionStore,
    notifier: Notifier,
    copies: Arc<CopyTracker>,
    state: Mutex<DetailState>,
    updating: BusyFlag,
}

impl MasterDetailPage {
    pub fn new(
        service: Arc<dyn DataService>,
        session: SessionStore,
        notifier: Notifier,
        copies: Arc<CopyTracker>,
    ) -> Self {
        Self {
            service,
            session,
            notifier,
            copies,
            state: Mutex::new(DetailState::default()),
            updating: BusyFlag::default(),
        }
    }

    fn session_epoch(&self) -> Result<u64, PageError> {
        if self.session.is_authenticated() {
            Ok(self.session.epoch())
        } else {
            Err(PageError::Unauthenticated)
        }
    }

    fn require_address(address: &str) -> Result<&str, PageError> {
        let address = address.trim();
        if address.is_empty() {
            Err(PageError::MissingAddress)
        } else {
            Ok(address)
        }
    }

    /// Snapshot for `address`, loading it when the target changed or this
    /// session has not loaded it yet.
    pub async fn view(&self, address: &str) -> Result<DetailSnapshot, PageError> {
        let epoch = self.session_epoch()?;
        let address = Self::require_address(address)?;

        let stale = {
            let state = self.state.lock().await;
            state.address.as_deref() != Some(address) || state.page.needs_mount(epoch)
        };
        if stale {
            self.load(address).await
        } else {
            self.snapshot(address).await
        }
    }

    pub async fn load(&self, address: &str) -> Result<DetailSnapshot, PageError> {
        let epoch = self.session_epoch()?;
        let address = Self::require_address(address)?;

        let token = {
            let mut state = self.state.lock().await;
            if state.address.as_deref() != Some(address) {
                state.address = Some(address.to_string());
                state.page.reset();
            }
            state.page.begin(epoch)
        };

        let (master, trades) = tokio::join!(
            call_service("get_master", self.service.get_master(address)),
            call_service("list_trades", self.service.list_trades(address)),
        );

        let mut failures = Vec::new();
        if master.is_err() {
            failures.push("Failed to fetch master data");
        }
        if trades.is_err() {
            failures.push("Failed to fetch trade history");
        }
        let result = match (master, trades) {
            (Ok(master), Ok(trades)) => Ok(DetailData { master, trades }),
            (Err(e), _) | (_, Err(e)) => Err(e.to_string()),
        };

        let applied = self
            .state
            .lock()
            .await
            .page
            .complete(token, self.session.epoch(), result);
        if applied {
            if failures.is_empty() {
                self.notifier.publish(WsMessage::MasterUpdated {
                    address: address.to_string(),
                });
            }
            for title in failures {
                self.notifier.error(title);
            }
        }

        self.snapshot(address).await
    }

    /// Ask the backend to recompute this master, then re-fetch it.
    pub async fn update(&self, address: &str) -> Result<DetailSnapshot, PageError> {
        self.session_epoch()?;
        let address = Self::require_address(address)?;

        let outcome = {
            let _busy = self.updating.enter();
            call_service("request_update", self.service.request_update(address)).await
        };
        match outcome {
            Ok(_) => {
                self.notifier.success("Master data updated successfully");
                self.load(address).await
            }
            Err(_) => {
                self.notifier.error("Failed to update master data");
                self.snapshot(address).await
            }
        }
    }

    pub async fn snapshot(&self, address: &str) -> Result<DetailSnapshot, PageError> {
        let epoch = self.session_epoch()?;
        let address = Self::require_address(address)?;
        let now = Utc::now();
        let state = self.state.lock().await;

        let data = state
            .page
            .data(epoch)
            .filter(|_| state.address.as_deref() == Some(address));
        let (status, error) = if state.address.as_deref() == Some(address) {
            (state.page.status(), state.page.error().map(str::to_string))
        } else {
            (LoadStatus::Idle, None)
        };

        let master = data.and_then(|d| d.master.clone());
        let trades = data.map(|d| d.trades.as_slice()).unwrap_or_default();

        Ok(DetailSnapshot {
            address: address.to_string(),
            status,
            error,
            not_found: data.is_some_and(|d| d.master.is_none()),
            updating: self.updating.is_busy(),
            copied: self.copies.is_copied(address),
            stats: MasterStats::build(master.as_ref(), now),
            trades: trade_rows(trades),
            recent_activity: recent_activity(trades, RECENT_ACTIVITY_LIMIT, now),
            master,
        })
    }
}
