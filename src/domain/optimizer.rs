//! Long-only mean-variance optimization.
//!
//! Both objectives are solved over the simplex (weights >= 0, summing to
//! 1) by projected gradient descent with backtracking line search. The
//! projection is the exact Euclidean projection onto the simplex, so every
//! iterate is feasible.

use std::collections::BTreeMap;

use crate::domain::align::AlignedPriceTable;
use crate::domain::error::TestfolioError;
use crate::domain::returns::{TRADING_DAYS_PER_YEAR, mean, simple_returns};

/// Hard bound on solver iterations; exceeding it is a failure, never a
/// hang.
pub const MAX_ITERATIONS: usize = 5_000;

const CONVERGENCE_TOL: f64 = 1e-10;
const STEP_FLOOR: f64 = 1e-13;

/// Annualized sample mean returns and covariance of daily simple returns.
#[derive(Debug, Clone)]
pub struct CovarianceModel {
    pub tickers: Vec<String>,
    pub mean: Vec<f64>,
    pub cov: Vec<Vec<f64>>,
}

impl CovarianceModel {
    pub fn from_table(table: &AlignedPriceTable) -> Result<Self, TestfolioError> {
        let tickers: Vec<String> = table.tickers().map(str::to_string).collect();
        if tickers.len() < 2 {
            return Err(TestfolioError::Data {
                reason: format!(
                    "mean-variance optimization requires at least two tickers, got {}",
                    tickers.len()
                ),
            });
        }

        let mut returns: Vec<Vec<f64>> = Vec::with_capacity(tickers.len());
        for t in &tickers {
            let closes = table
                .closes(t)
                .ok_or_else(|| TestfolioError::DataUnavailable { ticker: t.clone() })?;
            returns.push(simple_returns(closes));
        }
        let n_obs = returns[0].len();
        if n_obs < 2 {
            return Err(TestfolioError::InsufficientHistory { dates: table.len() });
        }

        let daily_means: Vec<f64> = returns.iter().map(|r| mean(r)).collect();
        let n = tickers.len();
        let mut cov = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in i..n {
                let c: f64 = returns[i]
                    .iter()
                    .zip(&returns[j])
                    .map(|(a, b)| (a - daily_means[i]) * (b - daily_means[j]))
                    .sum::<f64>()
                    / (n_obs - 1) as f64
                    * TRADING_DAYS_PER_YEAR;
                cov[i][j] = c;
                cov[j][i] = c;
            }
        }

        Ok(CovarianceModel {
            tickers,
            mean: daily_means
                .into_iter()
                .map(|m| m * TRADING_DAYS_PER_YEAR)
                .collect(),
            cov,
        })
    }
}

/// A weight vector with its annualized risk/return profile.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AllocationStats {
    pub weights: BTreeMap<String, f64>,
    pub expected_return: f64,
    pub volatility: f64,
    pub sharpe: Option<f64>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct OptimizerResult {
    pub min_variance: AllocationStats,
    pub max_sharpe: AllocationStats,
}

/// Solve the minimum-variance and maximum-Sharpe problems over the
/// simplex.
pub fn optimize(
    model: &CovarianceModel,
    risk_free_rate: f64,
) -> Result<OptimizerResult, TestfolioError> {
    reject_duplicate_assets(model)?;

    let n = model.tickers.len();
    let cov = &model.cov;

    let equal = vec![1.0 / n as f64; n];
    let min_var_w = projected_descent(
        equal.clone(),
        |w| portfolio_variance(w, cov),
        |w| mat_vec(cov, w).iter().map(|v| 2.0 * v).collect(),
    )?;

    let excess: Vec<f64> = model.mean.iter().map(|m| m - risk_free_rate).collect();
    let max_sharpe_w = projected_descent(
        // Warm-start at min-variance: guaranteed positive volatility.
        min_var_w.clone(),
        |w| neg_sharpe(w, &excess, cov),
        |w| neg_sharpe_gradient(w, &excess, cov),
    )?;

    Ok(OptimizerResult {
        min_variance: allocation_stats(model, min_var_w, risk_free_rate)?,
        max_sharpe: allocation_stats(model, max_sharpe_w, risk_free_rate)?,
    })
}

/// Duplicate assets make the covariance matrix singular and the solution
/// non-unique; the caller is expected to deduplicate instead.
fn reject_duplicate_assets(model: &CovarianceModel) -> Result<(), TestfolioError> {
    let n = model.tickers.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (vi, vj, cij) = (model.cov[i][i], model.cov[j][j], model.cov[i][j]);
            let scale = vi.max(vj).max(f64::MIN_POSITIVE);
            let same_variance = (vi - vj).abs() <= 1e-12 * scale;
            let perfectly_coupled = (cij - vi).abs() <= 1e-12 * scale;
            if same_variance && perfectly_coupled {
                return Err(TestfolioError::OptimizationFailure {
                    reason: format!(
                        "covariance matrix is singular: {} and {} have identical return series; \
                         deduplicate the ticker list",
                        model.tickers[i], model.tickers[j]
                    ),
                });
            }
        }
    }
    Ok(())
}

pub(crate) fn allocation_stats(
    model: &CovarianceModel,
    mut weights: Vec<f64>,
    risk_free_rate: f64,
) -> Result<AllocationStats, TestfolioError> {
    clip_weights(&mut weights)?;
    let expected_return = dot(&weights, &model.mean);
    let volatility = portfolio_variance(&weights, &model.cov).max(0.0).sqrt();
    let sharpe = if volatility > 0.0 {
        Some((expected_return - risk_free_rate) / volatility)
    } else {
        None
    };
    Ok(AllocationStats {
        weights: model.tickers.iter().cloned().zip(weights).collect(),
        expected_return,
        volatility,
        sharpe,
    })
}

/// Clamp the tiny negatives numerical optimization can leave behind and
/// renormalize. Anything materially infeasible is a solver bug surfaced
/// as a failure, not silently repaired.
pub(crate) fn clip_weights(weights: &mut [f64]) -> Result<(), TestfolioError> {
    for w in weights.iter_mut() {
        if *w < -1e-9 {
            return Err(TestfolioError::OptimizationFailure {
                reason: format!("solver produced negative weight {w}"),
            });
        }
        if *w < 0.0 {
            *w = 0.0;
        }
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > 1e-6 {
        return Err(TestfolioError::OptimizationFailure {
            reason: format!("solver weights sum to {total}"),
        });
    }
    for w in weights.iter_mut() {
        *w /= total;
    }
    Ok(())
}

/// Projected gradient descent over the simplex with backtracking line
/// search. Converges when an accepted step no longer moves the iterate;
/// runs out of the iteration budget otherwise.
pub(crate) fn projected_descent<F, G>(
    init: Vec<f64>,
    objective: F,
    gradient: G,
) -> Result<Vec<f64>, TestfolioError>
where
    F: Fn(&[f64]) -> f64,
    G: Fn(&[f64]) -> Vec<f64>,
{
    let mut w = init;
    project_onto_simplex(&mut w);
    let mut step = 1.0;

    for _ in 0..MAX_ITERATIONS {
        let grad = gradient(&w);
        let current = objective(&w);

        let mut candidate;
        loop {
            candidate = w
                .iter()
                .zip(&grad)
                .map(|(wi, gi)| wi - step * gi)
                .collect::<Vec<f64>>();
            project_onto_simplex(&mut candidate);
            if objective(&candidate) <= current || step < STEP_FLOOR {
                break;
            }
            step *= 0.5;
        }

        if step < STEP_FLOOR {
            // No descent step exists at numerical precision: stationary.
            return Ok(w);
        }

        let moved = w
            .iter()
            .zip(&candidate)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max);
        w = candidate;
        if moved < CONVERGENCE_TOL {
            return Ok(w);
        }
        step = (step * 2.0).min(1.0e3);
    }

    Err(TestfolioError::OptimizationFailure {
        reason: format!("no convergence within {MAX_ITERATIONS} iterations"),
    })
}

/// Exact Euclidean projection onto the probability simplex
/// (Duchi et al. 2008): subtract the largest threshold that keeps the
/// clipped weights summing to one.
pub(crate) fn project_onto_simplex(w: &mut [f64]) {
    let mut sorted = w.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (i, &v) in sorted.iter().enumerate() {
        cumulative += v;
        let candidate = (cumulative - 1.0) / (i + 1) as f64;
        if v - candidate > 0.0 {
            theta = candidate;
        }
    }
    for v in w.iter_mut() {
        *v = (*v - theta).max(0.0);
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub(crate) fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

pub(crate) fn portfolio_variance(w: &[f64], cov: &[Vec<f64>]) -> f64 {
    dot(w, &mat_vec(cov, w))
}

fn neg_sharpe(w: &[f64], excess: &[f64], cov: &[Vec<f64>]) -> f64 {
    let vol = portfolio_variance(w, cov).max(0.0).sqrt();
    if vol <= 1e-12 {
        return f64::INFINITY;
    }
    -dot(w, excess) / vol
}

fn neg_sharpe_gradient(w: &[f64], excess: &[f64], cov: &[Vec<f64>]) -> Vec<f64> {
    let variance = portfolio_variance(w, cov).max(0.0);
    let vol = variance.sqrt();
    if vol <= 1e-12 {
        return vec![0.0; w.len()];
    }
    let ret = dot(w, excess);
    let sigma_w = mat_vec(cov, w);
    excess
        .iter()
        .zip(&sigma_w)
        .map(|(e, sw)| -(e / vol - ret * sw / (variance * vol)))
        .collect()
}
