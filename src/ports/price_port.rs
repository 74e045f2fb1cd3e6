//! Price history port trait.

use crate::domain::error::TestfolioError;
use crate::domain::price_series::PriceSeries;
use chrono::NaiveDate;

/// Provider of daily close history, including the inflation index series.
pub trait PricePort {
    fn fetch_prices(
        &self,
        ticker: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, TestfolioError>;

    fn list_tickers(&self) -> Result<Vec<String>, TestfolioError>;
}
