pub mod api;
pub mod config;
pub mod controller;
pub mod errors;
pub mod metrics;
pub mod models;
pub mod presenter;
pub mod services;
pub mod session;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::controller::{MasterDetailPage, MastersPage};
use crate::presenter::{Clipboard, CopyTracker};
use crate::services::{DataService, Notifier};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub session: SessionStore,
    pub notifier: Notifier,
    pub masters: Arc<MastersPage>,
    pub detail: Arc<MasterDetailPage>,
    pub clipboard: Arc<dyn Clipboard>,
    pub copies: Arc<CopyTracker>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
}

impl AppState {
    /// Wire the session, pages and copy tracking around one data service.
    pub fn new(
        config: AppConfig,
        service: Arc<dyn DataService>,
        clipboard: Arc<dyn Clipboard>,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let notifier = Notifier::default();
        let session = SessionStore::new(notifier.clone());
        let copies = Arc::new(CopyTracker::new(config.copy_indicator()));

        let masters = Arc::new(MastersPage::new(
            Arc::clone(&service),
            session.clone(),
            notifier.clone(),
            Arc::clone(&copies),
        ));
        let detail = Arc::new(MasterDetailPage::new(
            service,
            session.clone(),
            notifier.clone(),
            Arc::clone(&copies),
        ));

        Self {
            config,
            session,
            notifier,
            masters,
            detail,
            clipboard,
            copies,
            metrics_handle,
        }
    }
}
