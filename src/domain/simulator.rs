//! Rebalancing simulator: drift-and-reset portfolio replay.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::align::AlignedPriceTable;
use crate::domain::backtest::RebalanceFrequency;
use crate::domain::error::TestfolioError;
use crate::domain::portfolio::Portfolio;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

pub type EquityCurve = Vec<EquityPoint>;

/// Replay a portfolio over the aligned calendar.
///
/// Each ticker holds a dollar amount. On the first date holdings are
/// `starting_value * weight`. On every later date each holding is scaled
/// by its one-period price return; when the date opens a new rebalancing
/// period the holdings are reset to `total * weight` after that drift
/// update. One equity point is emitted per date, post-rebalance.
pub fn simulate(
    table: &AlignedPriceTable,
    portfolio: &Portfolio,
    starting_value: f64,
    frequency: RebalanceFrequency,
) -> Result<EquityCurve, TestfolioError> {
    let dates = table.dates();
    let weights = portfolio.weights();

    let mut closes: Vec<&[f64]> = Vec::with_capacity(portfolio.allocations.len());
    for (ticker, _) in &portfolio.allocations {
        let row = table
            .closes(ticker)
            .ok_or_else(|| TestfolioError::DataUnavailable {
                ticker: ticker.clone(),
            })?;
        if let Some(t) = row.iter().position(|p| *p <= 0.0) {
            return Err(TestfolioError::InvalidPrice {
                ticker: ticker.clone(),
                date: dates[t],
                price: row[t],
            });
        }
        closes.push(row);
    }

    let mut holdings: Vec<f64> = weights.iter().map(|w| starting_value * w).collect();
    let mut curve = Vec::with_capacity(dates.len());
    curve.push(EquityPoint {
        date: dates[0],
        value: starting_value,
    });

    for t in 1..dates.len() {
        for (i, row) in closes.iter().enumerate() {
            holdings[i] *= row[t] / row[t - 1];
        }
        let total: f64 = holdings.iter().sum();
        if frequency.is_boundary(dates[t - 1], dates[t]) {
            for (h, w) in holdings.iter_mut().zip(&weights) {
                *h = total * w;
            }
        }
        curve.push(EquityPoint {
            date: dates[t],
            value: total,
        });
    }

    Ok(curve)
}
