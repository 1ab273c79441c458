//! Timeframe parsing and TradingView encodings

use crate::error::ScraperError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle/indicator timeframe accepted by the tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Timeframe {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    ThirtyMinutes,
    OneHour,
    TwoHours,
    FourHours,
    OneDay,
    OneWeek,
    OneMonth,
}

impl Timeframe {
    /// Every supported timeframe, shortest first
    pub const ALL: [Timeframe; 10] = [
        Timeframe::OneMinute,
        Timeframe::FiveMinutes,
        Timeframe::FifteenMinutes,
        Timeframe::ThirtyMinutes,
        Timeframe::OneHour,
        Timeframe::TwoHours,
        Timeframe::FourHours,
        Timeframe::OneDay,
        Timeframe::OneWeek,
        Timeframe::OneMonth,
    ];

    /// The user-facing label, e.g. `4h`
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1m",
            Timeframe::FiveMinutes => "5m",
            Timeframe::FifteenMinutes => "15m",
            Timeframe::ThirtyMinutes => "30m",
            Timeframe::OneHour => "1h",
            Timeframe::TwoHours => "2h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "1w",
            Timeframe::OneMonth => "1M",
        }
    }

    /// Suffix appended to scanner columns as `COLUMN|suffix`.
    ///
    /// The daily timeframe is the scanner default and takes no suffix.
    pub fn scanner_suffix(&self) -> Option<&'static str> {
        match self {
            Timeframe::OneDay => None,
            other => Some(other.chart_resolution()),
        }
    }

    /// Resolution string understood by `create_series` on the chart feed
    pub fn chart_resolution(&self) -> &'static str {
        match self {
            Timeframe::OneMinute => "1",
            Timeframe::FiveMinutes => "5",
            Timeframe::FifteenMinutes => "15",
            Timeframe::ThirtyMinutes => "30",
            Timeframe::OneHour => "60",
            Timeframe::TwoHours => "120",
            Timeframe::FourHours => "240",
            Timeframe::OneDay => "1D",
            Timeframe::OneWeek => "1W",
            Timeframe::OneMonth => "1M",
        }
    }

    /// Comma separated list of accepted labels, used in error messages
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|tf| tf.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Case matters: `1m` is a minute, `1M` is a month.
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s.trim())
            .ok_or_else(|| ScraperError::InvalidTimeframe {
                value: s.to_string(),
                supported: Self::supported_list(),
            })
    }
}

impl TryFrom<String> for Timeframe {
    type Error = ScraperError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.as_str().to_string()
    }
}
