//! Backtest configuration and the rebalancing calendar.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::TestfolioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RebalanceFrequency {
    pub const ALL: [RebalanceFrequency; 5] = [
        RebalanceFrequency::Daily,
        RebalanceFrequency::Weekly,
        RebalanceFrequency::Monthly,
        RebalanceFrequency::Quarterly,
        RebalanceFrequency::Yearly,
    ];

    /// True when `date` opens a new rebalancing period relative to
    /// `prev`. Periods key off the calendar: ISO week, calendar month,
    /// quarter, or year, so the first trading date inside each period is
    /// the rebalancing boundary.
    pub fn is_boundary(self, prev: NaiveDate, date: NaiveDate) -> bool {
        match self {
            RebalanceFrequency::Daily => true,
            RebalanceFrequency::Weekly => {
                let (py, pw) = (prev.iso_week().year(), prev.iso_week().week());
                let (dy, dw) = (date.iso_week().year(), date.iso_week().week());
                (py, pw) != (dy, dw)
            }
            RebalanceFrequency::Monthly => {
                (prev.year(), prev.month()) != (date.year(), date.month())
            }
            RebalanceFrequency::Quarterly => {
                (prev.year(), (prev.month() - 1) / 3) != (date.year(), (date.month() - 1) / 3)
            }
            RebalanceFrequency::Yearly => prev.year() != date.year(),
        }
    }
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RebalanceFrequency::Daily => "daily",
            RebalanceFrequency::Weekly => "weekly",
            RebalanceFrequency::Monthly => "monthly",
            RebalanceFrequency::Quarterly => "quarterly",
            RebalanceFrequency::Yearly => "yearly",
        };
        f.write_str(name)
    }
}

impl FromStr for RebalanceFrequency {
    type Err = TestfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(RebalanceFrequency::Daily),
            "weekly" => Ok(RebalanceFrequency::Weekly),
            "monthly" => Ok(RebalanceFrequency::Monthly),
            "quarterly" => Ok(RebalanceFrequency::Quarterly),
            "yearly" => Ok(RebalanceFrequency::Yearly),
            other => Err(TestfolioError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "rebalance".to_string(),
                reason: format!(
                    "unknown frequency \"{other}\" (expected daily, weekly, monthly, quarterly or yearly)"
                ),
            }),
        }
    }
}

/// Reference ticker the config layer falls back to when no benchmark is
/// configured, so default runs always carry a comparable benchmark curve.
pub const DEFAULT_BENCHMARK_TICKER: &str = "SPY";

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub starting_value: f64,
    pub rebalance: RebalanceFrequency,
    pub adjust_inflation: bool,
    /// Reference ticker simulated alongside user portfolios on the same
    /// calendar, for direct comparison. `None` only when explicitly
    /// disabled.
    pub benchmark: Option<String>,
    pub risk_free_rate: f64,
}
