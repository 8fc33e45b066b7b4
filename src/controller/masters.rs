use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use super::{call_service, BusyFlag, LoadStatus, PageError, PageState};
use crate::api::ws_types::WsMessage;
use crate::models::Master;
use crate::presenter::{master_rows, CopyTracker, MasterRow, SortKey, SortState};
use crate::services::{DataService, Notifier};
use crate::session::{Route, SessionStore};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MastersSnapshot {
    pub status: LoadStatus,
    pub error: Option<String>,
    pub sort: SortState,
    pub analyzing: bool,
    pub rows: Vec<MasterRow>,
}

/// Ranked masters list with search and analysis triggers.
pub struct MastersPage {
    service: Arc<dyn DataService>,
    session: SessionStore,
    notifier: Notifier,
    copies: Arc<CopyTracker>,
    state: Mutex<PageState<Vec<Master>>>,
    sort: Mutex<SortState>,
    analyzing: BusyFlag,
}

impl MastersPage {
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
            state: Mutex::new(PageState::default()),
            sort: Mutex::new(SortState::default()),
            analyzing: BusyFlag::default(),
        }
    }

    fn session_epoch(&self) -> Result<u64, PageError> {
        if self.session.is_authenticated() {
            Ok(self.session.epoch())
        } else {
            Err(PageError::Unauthenticated)
        }
    }

    /// Current page, loading it first if this session has not yet done so.
    pub async fn view(&self) -> Result<MastersSnapshot, PageError> {
        let epoch = self.session_epoch()?;
        let needs_mount = self.state.lock().await.needs_mount(epoch);
        if needs_mount {
            self.refresh().await
        } else {
            self.snapshot().await
        }
    }

    pub async fn refresh(&self) -> Result<MastersSnapshot, PageError> {
        let epoch = self.session_epoch()?;
        let token = self.state.lock().await.begin(epoch);

        let result = call_service("list_masters", self.service.list_masters())
            .await
            .map_err(|e| e.to_string());
        let failed = result.is_err();

        let applied = self
            .state
            .lock()
            .await
            .complete(token, self.session.epoch(), result);
        match (applied, failed) {
            (true, true) => self.notifier.error("Failed to fetch masters data"),
            (true, false) => self.notifier.publish(WsMessage::MastersUpdated),
            (false, _) => {}
        }

        self.snapshot().await
    }

    pub async fn snapshot(&self) -> Result<MastersSnapshot, PageError> {
        let epoch = self.session_epoch()?;
        let sort = *self.sort.lock().await;
        let state = self.state.lock().await;

        let rows = state
            .data(epoch)
            .map(|masters| master_rows(masters, sort, &self.copies, Utc::now()))
            .unwrap_or_default();

        Ok(MastersSnapshot {
            status: state.status(),
            error: state.error().map(str::to_string),
            sort,
            analyzing: self.analyzing.is_busy(),
            rows,
        })
    }

    /// Column header click.
    pub async fn toggle_sort(&self, key: SortKey) -> Result<MastersSnapshot, PageError> {
        self.session_epoch()?;
        self.sort.lock().await.toggle(key);
        self.snapshot().await
    }

    pub async fn set_sort(&self, sort: SortState) -> Result<MastersSnapshot, PageError> {
        self.session_epoch()?;
        *self.sort.lock().await = sort;
        self.snapshot().await
    }

    /// Trigger analysis for `address` (or every wallet), then reload the list.
    pub async fn start_analysis(&self, address: Option<&str>) -> Result<MastersSnapshot, PageError> {
        self.session_epoch()?;
        let target = address.map(str::trim).filter(|a| !a.is_empty()).unwrap_or("all");

        let acked = {
            let _busy = self.analyzing.enter();
            call_service("request_analysis", self.service.request_analysis(target)).await
        };

        match acked {
            Ok(_) => {
                self.notifier
                    .success(&format!("Analysis started for wallet: {target}"));
                self.refresh().await
            }
            Err(_) => {
                self.notifier.error("Failed to start analysis");
                self.snapshot().await
            }
        }
    }

    /// Analyse one wallet and point the dashboard at its detail view. On
    /// failure the dashboard stays on the list.
    pub async fn search(&self, address: &str) -> Result<Route, PageError> {
        self.session_epoch()?;
        let address = address.trim();
        if address.is_empty() {
            return Err(PageError::MissingAddress);
        }

        let _busy = self.analyzing.enter();
        match call_service("request_analysis", self.service.request_analysis(address)).await {
            Ok(_) => {
                self.notifier
                    .success(&format!("Analysis started for wallet: {address}"));
                Ok(Route::MasterDetail {
                    address: address.to_string(),
                })
            }
            Err(_) => {
                self.notifier.error("Failed to start analysis");
                Ok(Route::Masters)
            }
        }
    }
}
