//! Price series alignment onto a common trading calendar.
//!
//! The aligned calendar is the intersection of every requested ticker's
//! native quote dates within the backtest window. No interpolation or
//! forward-fill: a date without a quote on every ticker is excluded, so
//! prices are never fabricated for illiquid assets.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::domain::error::TestfolioError;
use crate::domain::price_series::PriceSeries;

/// Per-ticker closes restricted to the shared intersection calendar.
///
/// Invariant: every closes vector has exactly `dates.len()` entries, in
/// date order.
#[derive(Debug, Clone)]
pub struct AlignedPriceTable {
    dates: Vec<NaiveDate>,
    closes: BTreeMap<String, Vec<f64>>,
}

impl AlignedPriceTable {
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.closes.keys().map(String::as_str)
    }

    pub fn closes(&self, ticker: &str) -> Option<&[f64]> {
        self.closes.get(ticker).map(Vec::as_slice)
    }

    /// A table containing only the given tickers, on the same calendar.
    pub fn restrict(&self, tickers: &[String]) -> Result<AlignedPriceTable, TestfolioError> {
        let mut closes = BTreeMap::new();
        for ticker in tickers {
            let series = self
                .closes
                .get(ticker)
                .ok_or_else(|| TestfolioError::DataUnavailable {
                    ticker: ticker.clone(),
                })?;
            closes.insert(ticker.clone(), series.clone());
        }
        Ok(AlignedPriceTable {
            dates: self.dates.clone(),
            closes,
        })
    }
}

/// Align raw price series onto their intersection calendar within
/// `[start, end]`.
pub fn align(
    series: &[PriceSeries],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<AlignedPriceTable, TestfolioError> {
    let mut per_ticker: BTreeMap<String, BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for s in series {
        let quotes: BTreeMap<NaiveDate, f64> =
            s.in_window(start, end).map(|p| (p.date, p.close)).collect();
        if quotes.is_empty() {
            return Err(TestfolioError::MissingTicker {
                ticker: s.ticker.clone(),
                start,
                end,
            });
        }
        per_ticker.insert(s.ticker.clone(), quotes);
    }

    let mut calendar: Option<BTreeSet<NaiveDate>> = None;
    for quotes in per_ticker.values() {
        let dates: BTreeSet<NaiveDate> = quotes.keys().copied().collect();
        calendar = Some(match calendar {
            None => dates,
            Some(common) => common.intersection(&dates).copied().collect(),
        });
    }
    let dates: Vec<NaiveDate> = calendar.unwrap_or_default().into_iter().collect();

    if dates.len() < 2 {
        return Err(TestfolioError::InsufficientHistory { dates: dates.len() });
    }

    let closes = per_ticker
        .into_iter()
        .map(|(ticker, quotes)| {
            let row: Vec<f64> = dates.iter().map(|d| quotes[d]).collect();
            (ticker, row)
        })
        .collect();

    Ok(AlignedPriceTable { dates, closes })
}

/// Parse a comma-separated ticker list: trimmed, uppercased, duplicates
/// rejected.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, TestfolioError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(TestfolioError::Data {
                reason: "empty token in ticker list".to_string(),
            });
        }
        let ticker = trimmed.to_uppercase();
        if seen.contains(&ticker) {
            return Err(TestfolioError::Data {
                reason: format!("duplicate ticker: {ticker}"),
            });
        }
        seen.insert(ticker.clone());
        tickers.push(ticker);
    }

    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_series::PricePoint;

    fn series(ticker: &str, quotes: &[(&str, f64)]) -> PriceSeries {
        PriceSeries::new(
            ticker.to_string(),
            quotes
                .iter()
                .map(|(d, c)| PricePoint {
                    date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
                    close: *c,
                })
                .collect(),
        )
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn align_keeps_only_common_dates() {
        let vti = series(
            "VTI",
            &[
                ("2024-01-01", 100.0),
                ("2024-01-02", 101.0),
                ("2024-01-04", 103.0),
            ],
        );
        let bnd = series(
            "BND",
            &[
                ("2024-01-01", 80.0),
                ("2024-01-03", 80.5),
                ("2024-01-04", 81.0),
            ],
        );

        let table = align(&[vti, bnd], date("2024-01-01"), date("2024-01-31")).unwrap();

        assert_eq!(table.dates(), &[date("2024-01-01"), date("2024-01-04")]);
        assert_eq!(table.closes("VTI").unwrap(), &[100.0, 103.0]);
        assert_eq!(table.closes("BND").unwrap(), &[80.0, 81.0]);
    }

    #[test]
    fn align_respects_window() {
        let vti = series(
            "VTI",
            &[
                ("2023-12-29", 99.0),
                ("2024-01-01", 100.0),
                ("2024-01-02", 101.0),
                ("2024-02-01", 105.0),
            ],
        );

        let table = align(&[vti], date("2024-01-01"), date("2024-01-31")).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.dates()[0], date("2024-01-01"));
        assert_eq!(table.dates()[1], date("2024-01-02"));
    }

    #[test]
    fn align_fails_for_ticker_without_data_in_window() {
        let vti = series("VTI", &[("2024-01-01", 100.0), ("2024-01-02", 101.0)]);
        let bnd = series("BND", &[("2023-06-01", 80.0)]);

        let err = align(&[vti, bnd], date("2024-01-01"), date("2024-01-31")).unwrap_err();
        assert!(matches!(
            err,
            TestfolioError::MissingTicker { ticker, .. } if ticker == "BND"
        ));
    }

    #[test]
    fn align_fails_when_intersection_too_short() {
        let vti = series("VTI", &[("2024-01-01", 100.0), ("2024-01-02", 101.0)]);
        let bnd = series("BND", &[("2024-01-01", 80.0), ("2024-01-03", 80.5)]);

        let err = align(&[vti, bnd], date("2024-01-01"), date("2024-01-31")).unwrap_err();
        assert!(matches!(
            err,
            TestfolioError::InsufficientHistory { dates: 1 }
        ));
    }

    #[test]
    fn restrict_keeps_calendar() {
        let vti = series("VTI", &[("2024-01-01", 100.0), ("2024-01-02", 101.0)]);
        let bnd = series("BND", &[("2024-01-01", 80.0), ("2024-01-02", 80.5)]);
        let table = align(&[vti, bnd], date("2024-01-01"), date("2024-01-31")).unwrap();

        let only_vti = table.restrict(&["VTI".to_string()]).unwrap();
        assert_eq!(only_vti.len(), table.len());
        assert_eq!(only_vti.tickers().count(), 1);

        let missing = table.restrict(&["QQQ".to_string()]);
        assert!(matches!(
            missing,
            Err(TestfolioError::DataUnavailable { ticker }) if ticker == "QQQ"
        ));
    }

    #[test]
    fn parse_tickers_basic() {
        let result = parse_tickers("VTI,BND,QQQ").unwrap();
        assert_eq!(result, vec!["VTI", "BND", "QQQ"]);
    }

    #[test]
    fn parse_tickers_trims_and_uppercases() {
        let result = parse_tickers("  vti , bnd ").unwrap();
        assert_eq!(result, vec!["VTI", "BND"]);
    }

    #[test]
    fn parse_tickers_rejects_empty_token() {
        assert!(parse_tickers("VTI,,BND").is_err());
    }

    #[test]
    fn parse_tickers_rejects_duplicates() {
        assert!(parse_tickers("VTI,BND,vti").is_err());
    }
}
