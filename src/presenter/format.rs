//! Display formatting for table cells and stat cards.
//!
//! Every function here is total: malformed numbers or timestamps degrade to
//! a placeholder string instead of failing.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use num_format::{Locale, ToFormattedString};
use rust_decimal::{Decimal, RoundingStrategy};

pub const UNKNOWN: &str = "Unknown";
pub const NOT_A_NUMBER: &str = "N/A";

const ABSOLUTE_FORMAT: &str = "%b %-d, %Y %H:%M:%S";

const MINUTES_IN_DAY: i64 = 1_440;
const MINUTES_IN_ALMOST_TWO_DAYS: i64 = 2_520;
const MINUTES_IN_MONTH: i64 = 43_200;
const MINUTES_IN_TWO_MONTHS: i64 = 86_400;

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// Exact decimal for the shortest representation of `value`, so `63.45`
/// rounds as the literal `63.45` rather than its binary neighbour.
fn to_decimal(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64_retain(value))
}

/// Unsigned en-US rendering of `|value|` with grouping and a fraction
/// length between `min_frac` and `max_frac`.
fn grouped(value: Decimal, min_frac: u32, max_frac: u32) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(max_frac, RoundingStrategy::MidpointAwayFromZero);
    let text = rounded.to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let int_grouped = int_part
        .parse::<u128>()
        .map(|n| n.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_frac as usize {
        frac.push('0');
    }

    if frac.is_empty() {
        int_grouped
    } else {
        format!("{int_grouped}.{frac}")
    }
}

/// Signed USD with an explicit sign: `+$1,234.56`, `-$42.00`.
pub fn format_pnl(value: f64) -> String {
    match to_decimal(value) {
        Some(d) => {
            let sign = if value.is_sign_negative() { '-' } else { '+' };
            format!("{sign}${}", grouped(d, 2, 2))
        }
        None => NOT_A_NUMBER.to_string(),
    }
}

/// USD with two decimals and a sign only when negative: `$1,234.56`.
pub fn format_usd(value: f64) -> String {
    match to_decimal(value) {
        Some(d) => {
            let sign = if d.is_sign_negative() && !d.is_zero() { "-" } else { "" };
            format!("{sign}${}", grouped(d, 2, 2))
        }
        None => NOT_A_NUMBER.to_string(),
    }
}

/// Dollar sign followed by a plain grouped number with up to three
/// decimals: `$1,234.568`, `$12`.
pub fn format_usd_compact(value: f64) -> String {
    match to_decimal(value) {
        Some(d) => {
            let sign = if d.is_sign_negative() && !d.is_zero() { "-" } else { "" };
            format!("${sign}{}", grouped(d, 0, 3))
        }
        None => NOT_A_NUMBER.to_string(),
    }
}

/// Win rate on a 0-100 scale with one decimal: `63.5%`.
pub fn format_win_rate(value: f64) -> String {
    match to_decimal(value) {
        Some(d) => {
            let sign = if d.is_sign_negative() && !d.is_zero() { "-" } else { "" };
            format!("{sign}{}%", grouped(d, 1, 1))
        }
        None => NOT_A_NUMBER.to_string(),
    }
}

/// Token quantity: whole units for BONK, otherwise 2 to 4 decimals.
pub fn format_token_amount(value: f64, token: &str) -> String {
    let Some(d) = to_decimal(value) else {
        return NOT_A_NUMBER.to_string();
    };
    let sign = if d.is_sign_negative() && !d.is_zero() { "-" } else { "" };

    if token == "BONK" {
        let whole = d.trunc();
        let sign = if whole.is_zero() { "" } else { sign };
        format!("{sign}{}", grouped(whole, 0, 0))
    } else {
        format!("{sign}{}", grouped(d, 2, 4))
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 timestamp. Offset-less forms are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// `Mar 5, 2025 14:03:09`, or `Unknown` when unparseable.
pub fn format_timestamp(raw: &str) -> String {
    parse_timestamp(raw)
        .map(|ts| ts.format(ABSOLUTE_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// `about 3 hours ago`, `in 2 days`, or `Unknown` when unparseable.
pub fn format_relative_time(raw: &str, now: DateTime<Utc>) -> String {
    parse_timestamp(raw)
        .map(|ts| format_distance(ts, now))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Human distance between `ts` and `now` with an `ago` / `in` suffix.
pub fn format_distance(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(ts);
    let future = diff.num_milliseconds() < 0;
    let seconds = diff.num_seconds().abs();
    let minutes = (seconds as f64 / 60.0).round() as i64;

    let phrase = if minutes < 2 {
        if minutes == 0 {
            "less than a minute".to_string()
        } else {
            plural(minutes, "minute")
        }
    } else if minutes < 45 {
        plural(minutes, "minute")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < MINUTES_IN_DAY {
        let hours = (minutes as f64 / 60.0).round() as i64;
        format!("about {}", plural(hours, "hour"))
    } else if minutes < MINUTES_IN_ALMOST_TWO_DAYS {
        "1 day".to_string()
    } else if minutes < MINUTES_IN_MONTH {
        let days = (minutes as f64 / MINUTES_IN_DAY as f64).round() as i64;
        plural(days, "day")
    } else if minutes < MINUTES_IN_TWO_MONTHS {
        let months = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
        format!("about {}", plural(months, "month"))
    } else {
        let months = minutes / MINUTES_IN_MONTH;
        if months < 12 {
            let nearest = (minutes as f64 / MINUTES_IN_MONTH as f64).round() as i64;
            plural(nearest, "month")
        } else {
            let years = months / 12;
            match months % 12 {
                0..=2 => format!("about {}", plural(years, "year")),
                3..=8 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    };

    if future {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}
