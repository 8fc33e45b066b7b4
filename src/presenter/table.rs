use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::copy::CopyTracker;
use super::format::{
    format_pnl, format_relative_time, format_timestamp, format_token_amount, format_usd,
    format_usd_compact, format_win_rate, parse_timestamp, UNKNOWN,
};
use super::sort::{sort_masters, SortState};
use crate::models::{Master, Trade, TradeType};

const EXPLORER_BASE: &str = "https://solscan.io";
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Masters table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterRow {
    pub rank: usize,
    pub id: String,
    pub address: String,
    pub copied: bool,
    pub total_pnl: String,
    pub total_pnl_positive: bool,
    pub unrealized_pnl: String,
    pub unrealized_pnl_positive: bool,
    pub win_streak: u32,
    pub trade_frequency: String,
    pub avg_holding_time: String,
    pub win_rate: String,
    pub last_updated: String,
}

pub fn master_rows(
    masters: &[Master],
    sort: SortState,
    copies: &CopyTracker,
    now: DateTime<Utc>,
) -> Vec<MasterRow> {
    sort_masters(masters, sort)
        .into_iter()
        .enumerate()
        .map(|(i, m)| MasterRow {
            rank: i + 1,
            copied: copies.is_copied(&m.address),
            total_pnl: format_pnl(m.total_pnl),
            total_pnl_positive: m.total_pnl >= 0.0,
            unrealized_pnl: format_pnl(m.unrealized_pnl),
            unrealized_pnl_positive: m.unrealized_pnl >= 0.0,
            win_streak: m.win_streak,
            win_rate: format_win_rate(m.win_rate),
            last_updated: format_relative_time(&m.last_updated, now),
            id: m.id,
            address: m.address,
            trade_frequency: m.trade_frequency,
            avg_holding_time: m.avg_holding_time,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Trades table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRow {
    pub id: String,
    pub time: String,
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub token: String,
    pub amount: String,
    pub token_address: String,
    pub token_url: String,
    pub usd_value: String,
    pub transaction_hash: String,
    pub transaction_url: String,
}

impl From<&Trade> for TradeRow {
    fn from(t: &Trade) -> Self {
        Self {
            id: t.id.clone(),
            time: format_timestamp(&t.time),
            trade_type: t.trade_type,
            token: t.token.clone(),
            amount: format!("{} {}", format_token_amount(t.token_amount, &t.token), t.token),
            token_address: t.token_address.clone(),
            token_url: format!("{EXPLORER_BASE}/token/{}", t.token_address),
            usd_value: format_usd(t.amount_usd),
            transaction_hash: t.transaction_hash.clone(),
            transaction_url: format!("{EXPLORER_BASE}/tx/{}", t.transaction_hash),
        }
    }
}

/// Rows in the order the service returned them.
pub fn trade_rows(trades: &[Trade]) -> Vec<TradeRow> {
    trades.iter().map(TradeRow::from).collect()
}

// ---------------------------------------------------------------------------
// Detail sidebar
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub when: String,
    pub amount: String,
}

/// Newest `limit` trades. Service order carries no recency guarantee, so
/// trades are sorted by time here; unparseable times sink to the end.
pub fn recent_activity(trades: &[Trade], limit: usize, now: DateTime<Utc>) -> Vec<ActivityEntry> {
    let mut by_time: Vec<(&Trade, Option<DateTime<Utc>>)> =
        trades.iter().map(|t| (t, parse_timestamp(&t.time))).collect();

    by_time.sort_by(|(_, a), (_, b)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    by_time
        .into_iter()
        .take(limit)
        .map(|(t, _)| ActivityEntry {
            trade_type: t.trade_type,
            when: format_relative_time(&t.time, now),
            amount: format_usd_compact(t.amount_usd),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    pub value: String,
    /// `None` when there is nothing to colour.
    pub positive: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterStats {
    pub total_pnl: StatCard,
    pub unrealized_pnl: StatCard,
    pub win_rate: StatCard,
    pub win_streak: StatCard,
    pub trade_frequency: String,
    pub avg_holding_time: String,
    pub last_updated: String,
}

impl MasterStats {
    pub fn build(master: Option<&Master>, now: DateTime<Utc>) -> Self {
        match master {
            Some(m) => Self {
                total_pnl: StatCard {
                    value: format_pnl(m.total_pnl),
                    positive: Some(m.total_pnl >= 0.0),
                },
                unrealized_pnl: StatCard {
                    value: format_pnl(m.unrealized_pnl),
                    positive: Some(m.unrealized_pnl >= 0.0),
                },
                win_rate: StatCard {
                    value: format_win_rate(m.win_rate),
                    positive: Some(m.win_rate > 50.0),
                },
                win_streak: StatCard {
                    value: m.win_streak.to_string(),
                    positive: Some(m.win_streak > 0),
                },
                trade_frequency: non_empty_or_unknown(&m.trade_frequency),
                avg_holding_time: non_empty_or_unknown(&m.avg_holding_time),
                last_updated: format_relative_time(&m.last_updated, now),
            },
            None => Self {
                total_pnl: StatCard {
                    value: "$0".into(),
                    positive: None,
                },
                unrealized_pnl: StatCard {
                    value: "$0".into(),
                    positive: None,
                },
                win_rate: StatCard {
                    value: "0%".into(),
                    positive: None,
                },
                win_streak: StatCard {
                    value: "0".into(),
                    positive: None,
                },
                trade_frequency: UNKNOWN.into(),
                avg_holding_time: UNKNOWN.into(),
                last_updated: "Never".into(),
            },
        }
    }
}

fn non_empty_or_unknown(s: &str) -> String {
    if s.is_empty() {
        UNKNOWN.to_string()
    } else {
        s.to_string()
    }
}
