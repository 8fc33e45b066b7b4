use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Master;

/// Numeric master columns the table can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    TotalPnl,
    UnrealizedPnl,
    WinStreak,
    WinRate,
}

impl SortKey {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "totalPnl" | "total_pnl" => Some(SortKey::TotalPnl),
            "unrealizedPnl" | "unrealized_pnl" => Some(SortKey::UnrealizedPnl),
            "winStreak" | "win_streak" => Some(SortKey::WinStreak),
            "winRate" | "win_rate" => Some(SortKey::WinRate),
            _ => None,
        }
    }

    /// Column value, or `None` when it is not a usable number.
    pub fn value(&self, master: &Master) -> Option<f64> {
        let v = match self {
            SortKey::TotalPnl => master.total_pnl,
            SortKey::UnrealizedPnl => master.unrealized_pnl,
            SortKey::WinStreak => f64::from(master.win_streak),
            SortKey::WinRate => master.win_rate,
        };
        (!v.is_nan()).then_some(v)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::TotalPnl => write!(f, "totalPnl"),
            SortKey::UnrealizedPnl => write!(f, "unrealizedPnl"),
            SortKey::WinStreak => write!(f, "winStreak"),
            SortKey::WinRate => write!(f, "winRate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn multiplier(self) -> f64 {
        match self {
            SortDirection::Asc => 1.0,
            SortDirection::Desc => -1.0,
        }
    }
}

/// Current column and direction of a masters table. `key == None` keeps
/// input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: Some(SortKey::TotalPnl),
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    pub fn unsorted() -> Self {
        Self {
            key: None,
            direction: SortDirection::Desc,
        }
    }

    /// Header click: same column flips direction, a new column starts
    /// descending.
    pub fn toggle(&mut self, key: SortKey) {
        if self.key == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key);
            self.direction = SortDirection::Desc;
        }
    }
}

/// `(a - b) * (asc ? 1 : -1)` mapped to an ordering. Pairs without two
/// numeric values compare equal.
pub fn compare(a: &Master, b: &Master, key: SortKey, direction: SortDirection) -> Ordering {
    match (key.value(a), key.value(b)) {
        (Some(x), Some(y)) => ((x - y) * direction.multiplier())
            .partial_cmp(&0.0)
            .unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Stable sort; equal keys keep their input order.
pub fn sort_masters(masters: &[Master], state: SortState) -> Vec<Master> {
    let mut sorted = masters.to_vec();
    if let Some(key) = state.key {
        sorted.sort_by(|a, b| compare(a, b, key, state.direction));
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn master(id: &str, total_pnl: f64, win_streak: u32, win_rate: f64) -> Master {
        Master {
            id: id.into(),
            address: format!("Cx{id}"),
            total_pnl,
            unrealized_pnl: -total_pnl,
            win_streak,
            trade_frequency: "High".into(),
            avg_holding_time: "1h 0m".into(),
            win_rate,
            last_updated: "2025-03-01T00:00:00Z".into(),
        }
    }

    fn ids(masters: &[Master]) -> Vec<&str> {
        masters.iter().map(|m| m.id.as_str()).collect()
    }

    fn sample() -> Vec<Master> {
        vec![
            master("a", 100.0, 3, 50.0),
            master("b", -20.0, 7, 70.0),
            master("c", 100.0, 1, 40.0),
            master("d", 5000.0, 3, 55.0),
            master("e", -20.0, 0, 10.0),
        ]
    }

    #[test]
    fn test_default_is_total_pnl_desc() {
        let state = SortState::default();
        assert_eq!(state.key, Some(SortKey::TotalPnl));
        assert_eq!(state.direction, SortDirection::Desc);
    }

    #[test]
    fn test_toggle_rules() {
        let mut state = SortState::default();
        state.toggle(SortKey::TotalPnl);
        assert_eq!(state.direction, SortDirection::Asc);

        state.toggle(SortKey::WinRate);
        assert_eq!(state.key, Some(SortKey::WinRate));
        assert_eq!(state.direction, SortDirection::Desc);

        state.toggle(SortKey::WinRate);
        assert_eq!(state.direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_desc_is_ordered() {
        let sorted = sort_masters(&sample(), SortState::default());
        for pair in sorted.windows(2) {
            assert!(pair[0].total_pnl >= pair[1].total_pnl);
        }
    }

    #[test]
    fn test_ties_keep_input_order() {
        let sorted = sort_masters(&sample(), SortState::default());
        assert_eq!(ids(&sorted), vec!["d", "a", "c", "b", "e"]);

        let asc = SortState {
            key: Some(SortKey::TotalPnl),
            direction: SortDirection::Asc,
        };
        assert_eq!(ids(&sort_masters(&sample(), asc)), vec!["b", "e", "a", "c", "d"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        for key in [
            SortKey::TotalPnl,
            SortKey::UnrealizedPnl,
            SortKey::WinStreak,
            SortKey::WinRate,
        ] {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let state = SortState {
                    key: Some(key),
                    direction,
                };
                let once = sort_masters(&sample(), state);
                let twice = sort_masters(&once, state);
                assert_eq!(ids(&once), ids(&twice));
            }
        }
    }

    #[test]
    fn test_win_streak_sort() {
        let state = SortState {
            key: Some(SortKey::WinStreak),
            direction: SortDirection::Desc,
        };
        assert_eq!(ids(&sort_masters(&sample(), state)), vec!["b", "a", "d", "c", "e"]);
    }

    #[test]
    fn test_nan_compares_equal() {
        let a = master("a", f64::NAN, 0, 0.0);
        let b = master("b", 1.0, 0, 0.0);
        assert_eq!(
            compare(&a, &b, SortKey::TotalPnl, SortDirection::Desc),
            Ordering::Equal
        );
    }

    #[test]
    fn test_unsorted_keeps_order() {
        let sorted = sort_masters(&sample(), SortState::unsorted());
        assert_eq!(ids(&sorted), vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_sort_key_from_api_str() {
        assert_eq!(SortKey::from_api_str("winRate"), Some(SortKey::WinRate));
        assert_eq!(SortKey::from_api_str("address"), None);
        assert_eq!(SortKey::TotalPnl.to_string(), "totalPnl");
    }
}
