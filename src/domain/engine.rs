//! Engine operations: fetch, align, simulate, measure.
//!
//! Each operation pulls price history through a [`PricePort`] and runs the
//! pure domain pipeline on the aligned result. Nothing here touches the
//! filesystem or network directly.

use crate::domain::align::{AlignedPriceTable, align};
use crate::domain::backtest::BacktestConfig;
use crate::domain::error::TestfolioError;
use crate::domain::frontier::{FrontierPoint, efficient_frontier};
use crate::domain::metrics::{AssetMetrics, Metrics};
use crate::domain::optimizer::{self, CovarianceModel, OptimizerResult};
use crate::domain::portfolio::Portfolio;
use crate::domain::price_series::{PricePoint, PriceSeries};
use crate::domain::returns::deflate;
use crate::domain::sensitivity::{SensitivityRun, rebalancing_sensitivity};
use crate::domain::simulator::{EquityCurve, simulate};
use crate::ports::price_port::PricePort;

/// Ticker of the inflation index series expected from the price port when
/// `adjust_inflation` is on.
pub const INFLATION_INDEX_TICKER: &str = "CPI";

#[derive(Debug, Clone, serde::Serialize)]
pub struct PortfolioResult {
    pub metrics: Metrics,
    pub curve: EquityCurve,
}

/// One result per requested portfolio, plus the benchmark run when one is
/// configured (always last, named `Benchmark (<TICKER>)`).
#[derive(Debug, Clone, serde::Serialize)]
pub struct BacktestOutcome {
    pub results: Vec<PortfolioResult>,
}

/// Simulate every portfolio over one shared intersection calendar.
///
/// All portfolio tickers, the benchmark, and the inflation index (when
/// enabled) participate in the alignment, so every run sees the same
/// dates. Inflation adjustment deflates the finished equity curves into
/// first-date purchasing power before metrics.
pub fn run_backtest(
    prices: &dyn PricePort,
    portfolios: &[Portfolio],
    config: &BacktestConfig,
) -> Result<BacktestOutcome, TestfolioError> {
    for portfolio in portfolios {
        portfolio.validate()?;
    }

    let mut runs: Vec<Portfolio> = portfolios.to_vec();
    if let Some(ticker) = &config.benchmark {
        runs.push(Portfolio::new(
            format!("Benchmark ({ticker})"),
            vec![(ticker.clone(), 1.0)],
        )?);
    }

    let mut tickers: Vec<String> = Vec::new();
    for run in &runs {
        for ticker in run.tickers() {
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
    }
    if config.adjust_inflation && !tickers.contains(&INFLATION_INDEX_TICKER.to_string()) {
        tickers.push(INFLATION_INDEX_TICKER.to_string());
    }

    let table = fetch_aligned(prices, &tickers, config)?;
    let cpi = if config.adjust_inflation {
        Some(index_series(&table)?)
    } else {
        None
    };

    let mut results = Vec::with_capacity(runs.len());
    for run in &runs {
        let mut curve = simulate(&table, run, config.starting_value, config.rebalance)?;
        if let Some(index) = &cpi {
            let dates: Vec<_> = curve.iter().map(|p| p.date).collect();
            let mut values: Vec<f64> = curve.iter().map(|p| p.value).collect();
            deflate(&dates, &mut values, index)?;
            for (point, value) in curve.iter_mut().zip(values) {
                point.value = value;
            }
        }
        let metrics = Metrics::compute(&run.name, &curve, config.risk_free_rate);
        results.push(PortfolioResult { metrics, curve });
    }

    Ok(BacktestOutcome { results })
}

/// Per-asset analysis: each ticker's own price path as a one-asset equity
/// curve. Tickers are aligned independently, so a short-history ticker in
/// the request never truncates another ticker's calendar.
pub fn analyze_assets(
    prices: &dyn PricePort,
    tickers: &[String],
    config: &BacktestConfig,
) -> Result<Vec<AssetMetrics>, TestfolioError> {
    let mut results = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        let table = fetch_aligned(prices, std::slice::from_ref(ticker), config)?;
        let closes = table
            .closes(ticker)
            .ok_or_else(|| TestfolioError::DataUnavailable {
                ticker: ticker.clone(),
            })?;
        let curve: EquityCurve = table
            .dates()
            .iter()
            .zip(closes)
            .map(|(date, close)| crate::domain::simulator::EquityPoint {
                date: *date,
                value: *close,
            })
            .collect();
        results.push(AssetMetrics::compute(ticker, &curve, config.risk_free_rate));
    }
    Ok(results)
}

/// Min-variance and max-Sharpe portfolios for a ticker universe.
pub fn optimize_portfolio(
    prices: &dyn PricePort,
    tickers: &[String],
    config: &BacktestConfig,
) -> Result<OptimizerResult, TestfolioError> {
    let table = fetch_aligned(prices, tickers, config)?;
    let model = CovarianceModel::from_table(&table)?;
    optimizer::optimize(&model, config.risk_free_rate)
}

/// Efficient frontier for a ticker universe.
pub fn trace_frontier(
    prices: &dyn PricePort,
    tickers: &[String],
    config: &BacktestConfig,
    n_points: usize,
) -> Result<Vec<FrontierPoint>, TestfolioError> {
    let table = fetch_aligned(prices, tickers, config)?;
    let model = CovarianceModel::from_table(&table)?;
    efficient_frontier(&model, config.risk_free_rate, n_points)
}

/// One simulation per rebalancing frequency for a single portfolio.
pub fn run_sensitivity(
    prices: &dyn PricePort,
    portfolio: &Portfolio,
    config: &BacktestConfig,
) -> Result<Vec<SensitivityRun>, TestfolioError> {
    let table = fetch_aligned(prices, &portfolio.tickers(), config)?;
    rebalancing_sensitivity(
        &table,
        portfolio,
        config.starting_value,
        config.risk_free_rate,
    )
}

fn fetch_aligned(
    prices: &dyn PricePort,
    tickers: &[String],
    config: &BacktestConfig,
) -> Result<AlignedPriceTable, TestfolioError> {
    let mut series = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        series.push(prices.fetch_prices(ticker, config.start_date, config.end_date)?);
    }
    align(&series, config.start_date, config.end_date)
}

/// Rebuild the inflation index as a series on the aligned calendar, so
/// deflation sees a quote on every date by construction.
fn index_series(table: &AlignedPriceTable) -> Result<PriceSeries, TestfolioError> {
    let closes =
        table
            .closes(INFLATION_INDEX_TICKER)
            .ok_or_else(|| TestfolioError::DataUnavailable {
                ticker: INFLATION_INDEX_TICKER.to_string(),
            })?;
    Ok(PriceSeries::new(
        INFLATION_INDEX_TICKER.to_string(),
        table
            .dates()
            .iter()
            .zip(closes)
            .map(|(date, close)| PricePoint {
                date: *date,
                close: *close,
            })
            .collect(),
    ))
}
