use serde::{Deserialize, Serialize};

/// Performance snapshot of a tracked wallet.
///
/// `id` and `address` identify the record and never change; the numeric
/// fields are replaced wholesale when the master is re-fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Master {
    pub id: String,
    pub address: String,
    pub total_pnl: f64,
    pub unrealized_pnl: f64,
    pub win_streak: u32,
    /// `High`, `Medium` or `Low` in practice, kept open.
    pub trade_frequency: String,
    /// Display label such as `13h 42m`.
    pub avg_holding_time: String,
    /// Percentage on a 0-100 scale.
    pub win_rate: f64,
    /// ISO-8601 timestamp, parsed lazily at display time.
    pub last_updated: String,
}
