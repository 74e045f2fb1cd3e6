//! Performance metrics over an equity curve.
//!
//! Undefined quantities (CAGR on a zero-length holding period, Sharpe on a
//! flat curve) are reported as `None`, which serializes to an explicit
//! JSON null rather than a silent zero.

use serde::Serialize;

use crate::domain::returns::{TRADING_DAYS_PER_YEAR, mean, sample_std, simple_returns};
use crate::domain::simulator::EquityPoint;

/// Window length for rolling one-year returns, in trading dates.
pub const ROLLING_YEAR_WINDOW: usize = 252;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub name: String,
    pub total_return: f64,
    pub cagr: Option<f64>,
    pub volatility: Option<f64>,
    pub sharpe: Option<f64>,
    pub max_drawdown: f64,
    pub final_value: f64,
    pub years: f64,
}

impl Metrics {
    pub fn compute(name: &str, curve: &[EquityPoint], risk_free_rate: f64) -> Self {
        let first = curve.first().map(|p| p.value).unwrap_or(0.0);
        let last = curve.last().map(|p| p.value).unwrap_or(0.0);
        let total_return = if first > 0.0 { last / first - 1.0 } else { 0.0 };

        let years = match (curve.first(), curve.last()) {
            (Some(a), Some(b)) => (b.date - a.date).num_days() as f64 / 365.25,
            _ => 0.0,
        };
        let cagr = if years > 0.0 && first > 0.0 {
            Some((last / first).powf(1.0 / years) - 1.0)
        } else {
            None
        };

        let values: Vec<f64> = curve.iter().map(|p| p.value).collect();
        let returns = simple_returns(&values);
        let std = sample_std(&returns);
        let volatility = std.map(|s| s * TRADING_DAYS_PER_YEAR.sqrt());
        let periodic_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        let sharpe = match std {
            Some(s) if s > 0.0 => {
                Some((mean(&returns) - periodic_rf) / s * TRADING_DAYS_PER_YEAR.sqrt())
            }
            _ => None,
        };

        Metrics {
            name: name.to_string(),
            total_return,
            cagr,
            volatility,
            sharpe,
            max_drawdown: max_drawdown(curve),
            final_value: last,
            years,
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the peak, in [0, 1].
/// Zero iff the curve never declines.
pub fn max_drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for point in curve {
        if point.value > peak {
            peak = point.value;
        } else if peak > 0.0 {
            let dd = 1.0 - point.value / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Extrema and mean of rolling one-year returns over
/// [`ROLLING_YEAR_WINDOW`]-date windows: `(min, max, mean)`. `None` when
/// the curve is too short to hold a full window.
pub fn rolling_year_returns(curve: &[EquityPoint]) -> Option<(f64, f64, f64)> {
    if curve.len() <= ROLLING_YEAR_WINDOW {
        return None;
    }
    let returns: Vec<f64> = (ROLLING_YEAR_WINDOW..curve.len())
        .map(|t| curve[t].value / curve[t - ROLLING_YEAR_WINDOW].value - 1.0)
        .collect();
    let min = returns.iter().copied().fold(f64::INFINITY, f64::min);
    let max = returns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some((min, max, mean(&returns)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetMetrics {
    #[serde(flatten)]
    pub metrics: Metrics,
    pub rolling_1y_min: Option<f64>,
    pub rolling_1y_max: Option<f64>,
    pub rolling_1y_mean: Option<f64>,
}

impl AssetMetrics {
    pub fn compute(ticker: &str, curve: &[EquityPoint], risk_free_rate: f64) -> Self {
        let rolling = rolling_year_returns(curve);
        AssetMetrics {
            metrics: Metrics::compute(ticker, curve, risk_free_rate),
            rolling_1y_min: rolling.map(|(min, _, _)| min),
            rolling_1y_max: rolling.map(|(_, max, _)| max),
            rolling_1y_mean: rolling.map(|(_, _, mean)| mean),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn make_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64),
                value: v,
            })
            .collect()
    }

    #[test]
    fn total_return_positive() {
        let m = Metrics::compute("p", &make_curve(&[100_000.0, 110_000.0]), 0.0);
        assert_relative_eq!(m.total_return, 0.10, max_relative = 1e-9);
        assert_relative_eq!(m.final_value, 110_000.0, max_relative = 1e-12);
    }

    #[test]
    fn cagr_over_exactly_one_year() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let curve = vec![
            EquityPoint { date: start, value: 100.0 },
            EquityPoint { date: start + Duration::days(365), value: 108.0 },
        ];
        let m = Metrics::compute("p", &curve, 0.0);
        // years = 365/365.25, slightly under one year.
        let years = 365.0 / 365.25;
        assert_relative_eq!(m.cagr.unwrap(), 1.08_f64.powf(1.0 / years) - 1.0, max_relative = 1e-12);
    }

    #[test]
    fn cagr_undefined_for_single_point() {
        let m = Metrics::compute("p", &make_curve(&[100.0]), 0.0);
        assert!(m.cagr.is_none());
        assert!(m.volatility.is_none());
        assert!(m.sharpe.is_none());
    }

    #[test]
    fn sharpe_undefined_on_flat_curve() {
        let m = Metrics::compute("p", &make_curve(&[100.0, 100.0, 100.0]), 0.0);
        assert!(m.sharpe.is_none());
        assert_relative_eq!(m.volatility.unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_positive_for_steady_growth() {
        let mut values = vec![100.0];
        for i in 1..300 {
            values.push(100.0 * 1.001_f64.powi(i));
        }
        let m = Metrics::compute("p", &make_curve(&values), 0.0);
        assert!(m.sharpe.unwrap() > 0.0);
    }

    #[test]
    fn risk_free_rate_lowers_sharpe() {
        let mut values = vec![100.0];
        for i in 1..300 {
            values.push(100.0 * 1.001_f64.powi(i) * (1.0 + 0.0001 * (i % 3) as f64));
        }
        let curve = make_curve(&values);
        let zero_rf = Metrics::compute("p", &curve, 0.0).sharpe.unwrap();
        let with_rf = Metrics::compute("p", &curve, 0.05).sharpe.unwrap();
        assert!(with_rf < zero_rf);
    }

    #[test]
    fn max_drawdown_peak_to_trough() {
        let curve = make_curve(&[100.0, 110.0, 90.0, 95.0, 80.0, 100.0]);
        assert_relative_eq!(max_drawdown(&curve), (110.0 - 80.0) / 110.0, max_relative = 1e-9);
    }

    #[test]
    fn max_drawdown_zero_for_non_decreasing_curve() {
        let curve = make_curve(&[100.0, 100.0, 105.0, 120.0]);
        assert_relative_eq!(max_drawdown(&curve), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn max_drawdown_within_unit_interval() {
        let curve = make_curve(&[100.0, 1.0, 50.0, 0.5]);
        let dd = max_drawdown(&curve);
        assert!(dd >= 0.0 && dd <= 1.0);
    }

    #[test]
    fn rolling_year_none_when_short() {
        let values: Vec<f64> = (0..ROLLING_YEAR_WINDOW).map(|i| 100.0 + i as f64).collect();
        assert!(rolling_year_returns(&make_curve(&values)).is_none());
    }

    #[test]
    fn rolling_year_extrema_constant_growth() {
        // 0.1% per date: every 252-date window returns the same amount.
        let values: Vec<f64> = (0..400).map(|i| 100.0 * 1.001_f64.powi(i)).collect();
        let (min, max, mean) = rolling_year_returns(&make_curve(&values)).unwrap();
        let expected = 1.001_f64.powi(ROLLING_YEAR_WINDOW as i32) - 1.0;
        assert_relative_eq!(min, expected, max_relative = 1e-9);
        assert_relative_eq!(max, expected, max_relative = 1e-9);
        assert_relative_eq!(mean, expected, max_relative = 1e-9);
    }

    #[test]
    fn asset_metrics_carries_rolling_fields() {
        let values: Vec<f64> = (0..300).map(|i| 100.0 + (i % 7) as f64).collect();
        let am = AssetMetrics::compute("VTI", &make_curve(&values), 0.0);
        assert!(am.rolling_1y_min.is_some());
        assert!(am.rolling_1y_max.unwrap() >= am.rolling_1y_min.unwrap());
        assert_eq!(am.metrics.name, "VTI");
    }
}
