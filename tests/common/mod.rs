use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, SecondsFormat, Utc};
use tokio::sync::oneshot;

use copymasters::api::router::create_router;
use copymasters::config::AppConfig;
use copymasters::models::{Master, Trade, TradeType};
use copymasters::presenter::MemoryClipboard;
use copymasters::services::{Ack, DataService, FixtureDataService, ServiceError};
use copymasters::AppState;

pub type MastersReply = Result<Vec<Master>, ServiceError>;

/// Scriptable data service. `list_masters` first drains gated replies (in
/// call order), then falls back to the static list.
#[derive(Default)]
pub struct StubService {
    gates: Mutex<VecDeque<oneshot::Receiver<MastersReply>>>,
    pub list_calls: AtomicUsize,
    pub masters: Mutex<Vec<Master>>,
    pub known: Mutex<HashMap<String, Master>>,
    pub trades: Mutex<Vec<Trade>>,
    pub failing: AtomicBool,
    pub analysis_requests: Mutex<Vec<String>>,
    pub update_requests: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl StubService {
    pub fn gate(&self) -> oneshot::Sender<MastersReply> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn add_master(&self, master: Master) {
        self.known
            .lock()
            .unwrap()
            .insert(master.address.clone(), master);
    }

    fn fail<T>(&self) -> Result<T, ServiceError> {
        Err(ServiceError::Api {
            status: 503,
            message: "backend unavailable".into(),
        })
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataService for StubService {
    async fn list_masters(&self) -> Result<Vec<Master>, ServiceError> {
        let gate = self.gates.lock().unwrap().pop_front();
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(rx) = gate {
            return rx
                .await
                .map_err(|e| ServiceError::Unexpected(e.to_string()))?;
        }
        if self.is_failing() {
            return self.fail();
        }
        Ok(self.masters.lock().unwrap().clone())
    }

    async fn get_master(&self, address: &str) -> Result<Option<Master>, ServiceError> {
        if self.is_failing() {
            return self.fail();
        }
        Ok(self.known.lock().unwrap().get(address).cloned())
    }

    async fn list_trades(&self, _address: &str) -> Result<Vec<Trade>, ServiceError> {
        if self.is_failing() {
            return self.fail();
        }
        Ok(self.trades.lock().unwrap().clone())
    }

    async fn request_analysis(&self, address: &str) -> Result<Ack, ServiceError> {
        if self.is_failing() {
            return self.fail();
        }
        self.analysis_requests.lock().unwrap().push(address.to_string());
        Ok(Ack::now(address))
    }

    async fn request_update(&self, address: &str) -> Result<Ack, ServiceError> {
        if self.is_failing() {
            return self.fail();
        }
        self.update_requests.lock().unwrap().push(address.to_string());
        Ok(Ack::now(address))
    }
}

/// Yield until the stub has seen `n` list calls.
#[allow(dead_code)]
pub async fn wait_for_list_calls(service: &StubService, n: usize) {
    while service.list_calls.load(Ordering::SeqCst) < n {
        tokio::task::yield_now().await;
    }
}

#[allow(dead_code)]
pub fn master(id: &str, address: &str, total_pnl: f64) -> Master {
    Master {
        id: id.into(),
        address: address.into(),
        total_pnl,
        unrealized_pnl: total_pnl / 2.0,
        win_streak: 3,
        trade_frequency: "Medium".into(),
        avg_holding_time: "13h 42m".into(),
        win_rate: 63.45,
        last_updated: (Utc::now() - Duration::hours(3)).to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

#[allow(dead_code)]
pub fn trade(id: &str, hours_ago: i64, trade_type: TradeType) -> Trade {
    Trade {
        id: id.into(),
        time: (Utc::now() - Duration::hours(hours_ago)).to_rfc3339_opts(SecondsFormat::Millis, true),
        trade_type,
        token: "SOL".into(),
        token_amount: 1.23456,
        token_address: "So1...1112".into(),
        amount_usd: 1234.5,
        transaction_hash: "5xYz...abcd".into(),
    }
}

#[allow(dead_code)]
pub fn build_state(service: Arc<dyn DataService>) -> AppState {
    AppState::new(
        AppConfig::default(),
        service,
        Arc::new(MemoryClipboard::default()),
        copymasters::metrics::detached_handle(),
    )
}

#[allow(dead_code)]
pub fn build_fixture_app() -> (axum::Router, AppState) {
    let state = build_state(Arc::new(FixtureDataService::default()));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn build_stub_app(service: Arc<StubService>) -> (axum::Router, AppState) {
    let state = build_state(service);
    (create_router(state.clone()), state)
}
