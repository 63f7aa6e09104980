use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::null_as_default;

const SECOND_MS: u64 = 1000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Site-wide flash-sale switch from `GET /api/settings/flash-sale`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashSaleSettings {
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub end_time: Option<DateTime<Utc>>,
}

impl FlashSaleSettings {
    /// Active and not yet over at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.end_time.is_some_and(|end| end > now)
    }

    pub fn time_left(&self, now: DateTime<Utc>) -> TimeLeft {
        match self.end_time {
            Some(end) if self.is_active => TimeLeft::until(end, now),
            _ => TimeLeft::ZERO,
        }
    }
}

/// Accepts RFC 3339, the `YYYY-MM-DDTHH:MM[:SS]` form admin date pickers
/// produce (read as UTC), an empty string or `null`.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    parse_end_time(raw)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid end time: {raw}")))
}

pub fn parse_end_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Remaining time of a sale, split into display units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeLeft {
    pub const ZERO: TimeLeft = TimeLeft {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Zero once `end <= now`.
    pub fn until(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let diff_ms = (end - now).num_milliseconds();
        if diff_ms <= 0 {
            return Self::ZERO;
        }
        Self::from_millis(diff_ms as u64)
    }

    pub fn from_duration(remaining: Duration) -> Self {
        Self::from_millis(u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX))
    }

    fn from_millis(ms: u64) -> Self {
        Self {
            days: ms / DAY_MS,
            hours: ms % DAY_MS / HOUR_MS,
            minutes: ms % HOUR_MS / MINUTE_MS,
            seconds: ms % MINUTE_MS / SECOND_MS,
        }
    }

    /// All units read zero. Up to a second may still remain, so this is a
    /// display check; use [`FlashSaleSettings::is_live`] or the countdown's
    /// `expired` flag to decide whether a sale is over.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}
