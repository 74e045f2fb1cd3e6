//! Rebalancing cadence sensitivity.
//!
//! A fan-out over the simulator: one run per rebalancing frequency, all
//! sharing the same aligned calendar, portfolio and starting value so the
//! results differ only in cadence.

use serde::Serialize;

use crate::domain::align::AlignedPriceTable;
use crate::domain::backtest::RebalanceFrequency;
use crate::domain::error::TestfolioError;
use crate::domain::metrics::Metrics;
use crate::domain::portfolio::Portfolio;
use crate::domain::simulator::{EquityCurve, simulate};

/// One simulation's worth of output; the curve serializes alongside the
/// metrics so reports can chart every cadence, same as backtest results.
#[derive(Debug, Clone, Serialize)]
pub struct SensitivityRun {
    pub frequency: RebalanceFrequency,
    pub metrics: Metrics,
    pub curve: EquityCurve,
}

/// Simulate the portfolio once per frequency in
/// [`RebalanceFrequency::ALL`], in that order.
pub fn rebalancing_sensitivity(
    table: &AlignedPriceTable,
    portfolio: &Portfolio,
    starting_value: f64,
    risk_free_rate: f64,
) -> Result<Vec<SensitivityRun>, TestfolioError> {
    portfolio.validate()?;
    RebalanceFrequency::ALL
        .iter()
        .map(|&frequency| {
            let curve = simulate(table, portfolio, starting_value, frequency)?;
            let metrics = Metrics::compute(&portfolio.name, &curve, risk_free_rate);
            Ok(SensitivityRun {
                frequency,
                metrics,
                curve,
            })
        })
        .collect()
}
