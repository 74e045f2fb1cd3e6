//! Periodic return computation and inflation deflation.

use crate::domain::error::TestfolioError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;

/// Annualization constant for daily-resolution series. Shared by metrics
/// and the optimizer so frontier points and backtest metrics stay
/// comparable.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simple one-period returns: `p[t]/p[t-1] - 1`.
pub fn simple_returns(closes: &[f64]) -> Vec<f64> {
    closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator), `None` for fewer than two
/// observations.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Deflate a level series in place by a CPI-like index, so every value is
/// expressed in first-date purchasing power.
///
/// `dates` and `values` run in lockstep; the index must carry a quote on
/// every date (callers get that by including the index in the intersection
/// alignment).
pub fn deflate(
    dates: &[NaiveDate],
    values: &mut [f64],
    index: &PriceSeries,
) -> Result<(), TestfolioError> {
    let base = match dates.first() {
        Some(first) => index_level(index, *first)?,
        None => return Ok(()),
    };
    for (date, value) in dates.iter().zip(values.iter_mut()) {
        let level = index_level(index, *date)?;
        if level <= 0.0 {
            return Err(TestfolioError::InvalidPrice {
                ticker: index.ticker.clone(),
                date: *date,
                price: level,
            });
        }
        *value *= base / level;
    }
    Ok(())
}

fn index_level(index: &PriceSeries, date: NaiveDate) -> Result<f64, TestfolioError> {
    index
        .points
        .iter()
        .find(|p| p.date == date)
        .map(|p| p.close)
        .ok_or_else(|| TestfolioError::MissingTicker {
            ticker: index.ticker.clone(),
            start: date,
            end: date,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_series::PricePoint;
    use approx::assert_relative_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn simple_returns_basic() {
        let rets = simple_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(rets.len(), 2);
        assert_relative_eq!(rets[0], 0.10, max_relative = 1e-12);
        assert_relative_eq!(rets[1], -0.10, max_relative = 1e-12);
    }

    #[test]
    fn simple_returns_needs_two_points() {
        assert!(simple_returns(&[100.0]).is_empty());
        assert!(simple_returns(&[]).is_empty());
    }

    #[test]
    fn sample_std_matches_hand_computation() {
        // mean 2, squared deviations 1+0+1, var 2/2 = 1
        let std = sample_std(&[1.0, 2.0, 3.0]).unwrap();
        assert_relative_eq!(std, 1.0, max_relative = 1e-12);
    }

    #[test]
    fn sample_std_undefined_for_single_value() {
        assert!(sample_std(&[1.0]).is_none());
    }

    #[test]
    fn deflate_rescales_to_base_purchasing_power() {
        let dates = vec![date("2024-01-01"), date("2024-02-01"), date("2024-03-01")];
        let mut values = vec![100.0, 102.0, 104.0];
        let cpi = PriceSeries::new(
            "CPI".into(),
            vec![
                PricePoint {
                    date: dates[0],
                    close: 100.0,
                },
                PricePoint {
                    date: dates[1],
                    close: 102.0,
                },
                PricePoint {
                    date: dates[2],
                    close: 104.0,
                },
            ],
        );

        deflate(&dates, &mut values, &cpi).unwrap();

        // Growth exactly matching inflation is flat in real terms.
        assert_relative_eq!(values[0], 100.0, max_relative = 1e-12);
        assert_relative_eq!(values[1], 100.0, max_relative = 1e-12);
        assert_relative_eq!(values[2], 100.0, max_relative = 1e-12);
    }

    #[test]
    fn deflate_fails_on_missing_index_date() {
        let dates = vec![date("2024-01-01"), date("2024-02-01")];
        let mut values = vec![100.0, 101.0];
        let cpi = PriceSeries::new(
            "CPI".into(),
            vec![PricePoint {
                date: dates[0],
                close: 100.0,
            }],
        );

        assert!(deflate(&dates, &mut values, &cpi).is_err());
    }
}
