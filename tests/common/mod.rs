#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;
use testfolio::domain::backtest::{BacktestConfig, RebalanceFrequency};
use testfolio::domain::error::TestfolioError;
use testfolio::domain::portfolio::Portfolio;
pub use testfolio::domain::price_series::{PricePoint, PriceSeries};
use testfolio::ports::price_port::PricePort;

pub struct MockPricePort {
    pub series: HashMap<String, PriceSeries>,
    pub errors: HashMap<String, String>,
}

impl MockPricePort {
    pub fn new() -> Self {
        Self {
            series: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.series.insert(series.ticker.clone(), series);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl PricePort for MockPricePort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TestfolioError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(TestfolioError::Data {
                reason: reason.clone(),
            });
        }
        match self.series.get(ticker) {
            Some(series) => Ok(PriceSeries::new(
                series.ticker.clone(),
                series
                    .in_window(start_date, end_date)
                    .cloned()
                    .collect(),
            )),
            None => Err(TestfolioError::DataUnavailable {
                ticker: ticker.to_string(),
            }),
        }
    }

    fn list_tickers(&self) -> Result<Vec<String>, TestfolioError> {
        let mut tickers: Vec<String> = self.series.keys().cloned().collect();
        tickers.sort();
        Ok(tickers)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily series of `count` points growing by `daily_return` per date.
pub fn generate_series(
    ticker: &str,
    start_date: &str,
    count: usize,
    start_price: f64,
    daily_return: f64,
) -> PriceSeries {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    PriceSeries::new(
        ticker.to_string(),
        (0..count)
            .map(|i| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close: start_price * (1.0 + daily_return).powi(i as i32),
            })
            .collect(),
    )
}

/// Series from explicit (date, close) pairs.
pub fn series_from(ticker: &str, quotes: &[(&str, f64)]) -> PriceSeries {
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

pub fn portfolio_60_40() -> Portfolio {
    Portfolio::new(
        "60/40".into(),
        vec![("VTI".into(), 0.6), ("BND".into(), 0.4)],
    )
    .unwrap()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        start_date: date(2023, 1, 2),
        end_date: date(2024, 12, 31),
        starting_value: 100_000.0,
        rebalance: RebalanceFrequency::Monthly,
        adjust_inflation: false,
        benchmark: None,
        risk_free_rate: 0.0,
    }
}
