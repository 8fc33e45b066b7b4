use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::{Ack, DataService, ServiceError};
use crate::models::{Master, Trade, TradeType};

const MASTER_COUNT: usize = 10;
const TRADE_COUNT: usize = 20;
const FREQUENCIES: [&str; 3] = ["High", "Medium", "Low"];
const TOKENS: [&str; 5] = ["SOL", "BONK", "JTO", "RAY", "ORCA"];
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

const DAY_MS: f64 = 86_400_000.0;

/// Simulated round-trip delay per operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureLatency {
    pub list_masters: Duration,
    pub get_master: Duration,
    pub list_trades: Duration,
    pub request_analysis: Duration,
    pub request_update: Duration,
}

impl FixtureLatency {
    /// Delays a slow backend would plausibly show; useful for exercising
    /// loading states by hand.
    pub fn realistic() -> Self {
        Self {
            list_masters: Duration::from_millis(1500),
            get_master: Duration::from_millis(1000),
            list_trades: Duration::from_millis(1200),
            request_analysis: Duration::from_millis(2000),
            request_update: Duration::from_millis(1500),
        }
    }
}

/// Generates fresh random records on every call. Nothing is stored, so a
/// re-fetched master never matches the previous one field for field.
#[derive(Debug, Clone, Default)]
pub struct FixtureDataService {
    latency: FixtureLatency,
}

impl FixtureDataService {
    pub fn new(latency: FixtureLatency) -> Self {
        Self { latency }
    }

    async fn delay(&self, d: Duration) {
        if !d.is_zero() {
            tokio::time::sleep(d).await;
        }
    }
}

fn base36<R: Rng>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

fn truncated_id<R: Rng>(rng: &mut R, head: usize, tail: usize) -> String {
    format!("{}...{}", base36(rng, head), base36(rng, tail))
}

fn signed<R: Rng>(rng: &mut R, magnitude: f64, positive_odds: f64) -> f64 {
    let value = rng.gen::<f64>() * magnitude;
    if rng.gen::<f64>() > 1.0 - positive_odds {
        value
    } else {
        -value
    }
}

fn iso_ago(ms_ago: f64) -> String {
    let ts = Utc::now() - chrono::Duration::milliseconds(ms_ago as i64);
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn random_master<R: Rng>(rng: &mut R, id: String, address: String, last_updated: String) -> Master {
    Master {
        id,
        address,
        total_pnl: signed(rng, 100_000.0, 0.7),
        unrealized_pnl: signed(rng, 50_000.0, 0.5),
        win_streak: rng.gen_range(0..20),
        trade_frequency: FREQUENCIES
            .choose(rng)
            .copied()
            .unwrap_or("Medium")
            .to_string(),
        avg_holding_time: format!("{}h {}m", rng.gen_range(0..48), rng.gen_range(0..60)),
        win_rate: rng.gen::<f64>() * 100.0,
        last_updated,
    }
}

pub(crate) fn generate_masters() -> Vec<Master> {
    let mut rng = rand::thread_rng();
    (0..MASTER_COUNT)
        .map(|i| {
            let prefix = if i % 2 == 0 { "Cx" } else { "Bx" };
            let address = format!("{prefix}{}", truncated_id(&mut rng, 8, 4));
            let last_updated = iso_ago(rng.gen::<f64>() * DAY_MS * 5.0);
            random_master(&mut rng, format!("master-{i}"), address, last_updated)
        })
        .collect()
}

pub(crate) fn generate_trades() -> Vec<Trade> {
    let mut rng = rand::thread_rng();
    (0..TRADE_COUNT)
        .map(|i| Trade {
            id: format!("trade-{i}"),
            time: iso_ago(rng.gen::<f64>() * DAY_MS * 30.0),
            trade_type: if rng.gen_bool(0.5) {
                TradeType::Buy
            } else {
                TradeType::Sell
            },
            token: TOKENS.choose(&mut rng).copied().unwrap_or("SOL").to_string(),
            token_amount: rng.gen::<f64>() * 1000.0,
            token_address: truncated_id(&mut rng, 8, 4),
            amount_usd: rng.gen::<f64>() * 10_000.0,
            transaction_hash: truncated_id(&mut rng, 13, 8),
        })
        .collect()
}

#[async_trait]
impl DataService for FixtureDataService {
    async fn list_masters(&self) -> Result<Vec<Master>, ServiceError> {
        self.delay(self.latency.list_masters).await;
        Ok(generate_masters())
    }

    async fn get_master(&self, address: &str) -> Result<Option<Master>, ServiceError> {
        self.delay(self.latency.get_master).await;
        if address.trim().is_empty() {
            return Ok(None);
        }

        let mut rng = rand::thread_rng();
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Ok(Some(random_master(
            &mut rng,
            format!("master-{address}"),
            address.to_string(),
            now,
        )))
    }

    async fn list_trades(&self, _address: &str) -> Result<Vec<Trade>, ServiceError> {
        self.delay(self.latency.list_trades).await;
        Ok(generate_trades())
    }

    async fn request_analysis(&self, address: &str) -> Result<Ack, ServiceError> {
        self.delay(self.latency.request_analysis).await;
        Ok(Ack::now(address))
    }

    async fn request_update(&self, address: &str) -> Result<Ack, ServiceError> {
        self.delay(self.latency.request_update).await;
        Ok(Ack::now(address))
    }
}
