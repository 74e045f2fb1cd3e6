//! Adjusted-close price series.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// A single ticker's adjusted-close history, dates strictly increasing.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Sorts by date and drops duplicate dates, keeping the first quote.
    pub fn new(ticker: String, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { ticker, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points with `start <= date <= end`.
    pub fn in_window(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = &PricePoint> {
        self.points
            .iter()
            .filter(move |p| p.date >= start && p.date <= end)
    }
}
