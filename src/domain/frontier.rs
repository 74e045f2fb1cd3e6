//! Efficient frontier sampling.
//!
//! Sweeps evenly spaced target returns between the minimum-variance and
//! maximum-Sharpe portfolios, solving a return-constrained minimum
//! variance problem at each target. The equality constraint is enforced
//! by a quadratic penalty tightened over a continuation schedule, warm
//! starting each target from the previous solution.

use std::collections::BTreeMap;

use crate::domain::error::TestfolioError;
use crate::domain::optimizer::{
    self, CovarianceModel, clip_weights, dot, mat_vec, portfolio_variance, projected_descent,
};

pub const DEFAULT_FRONTIER_POINTS: usize = 20;

/// Achieved return must land within this distance of the target, or the
/// sample is treated as infeasible and skipped.
const RETURN_TOLERANCE: f64 = 1e-4;

const PENALTY_SCHEDULE: [f64; 3] = [1e2, 1e4, 1e6];

#[derive(Debug, Clone, serde::Serialize)]
pub struct FrontierPoint {
    pub target_return: f64,
    pub expected_return: f64,
    pub volatility: f64,
    pub weights: BTreeMap<String, f64>,
}

/// Trace the efficient frontier with `n_points` samples, ordered by
/// ascending target return.
pub fn efficient_frontier(
    model: &CovarianceModel,
    risk_free_rate: f64,
    n_points: usize,
) -> Result<Vec<FrontierPoint>, TestfolioError> {
    let anchors = optimizer::optimize(model, risk_free_rate)?;
    let r_min_var = anchors.min_variance.expected_return;
    let r_max_sharpe = anchors.max_sharpe.expected_return;
    let (lo, hi) = if r_min_var <= r_max_sharpe {
        (r_min_var, r_max_sharpe)
    } else {
        (r_max_sharpe, r_min_var)
    };

    let mut warm: Vec<f64> = anchors.min_variance.weights.values().copied().collect();

    if n_points <= 1 || hi - lo < f64::EPSILON {
        let point = frontier_point(model, warm, lo)?;
        return Ok(point.into_iter().collect());
    }

    let mut points = Vec::with_capacity(n_points);
    for k in 0..n_points {
        let target = lo + (hi - lo) * k as f64 / (n_points - 1) as f64;

        let solved = solve_at_target(model, &warm, target);
        let weights = match solved {
            Ok(w) => w,
            // An infeasible or stubborn sample is skipped, not fatal.
            Err(_) => continue,
        };
        warm = weights.clone();

        if let Some(point) = frontier_point(model, weights, target)? {
            points.push(point);
        }
    }

    Ok(points)
}

fn solve_at_target(
    model: &CovarianceModel,
    warm: &[f64],
    target: f64,
) -> Result<Vec<f64>, TestfolioError> {
    let cov = &model.cov;
    let mu = &model.mean;
    let mut w = warm.to_vec();

    for lambda in PENALTY_SCHEDULE {
        w = projected_descent(
            w,
            |x| portfolio_variance(x, cov) + lambda * (dot(x, mu) - target).powi(2),
            |x| {
                let sigma_x = mat_vec(cov, x);
                let miss = dot(x, mu) - target;
                sigma_x
                    .iter()
                    .zip(mu)
                    .map(|(s, m)| 2.0 * s + 2.0 * lambda * miss * m)
                    .collect()
            },
        )?;
    }
    Ok(w)
}

/// Build a point when the achieved return is close enough to the target;
/// `None` marks an infeasible sample.
fn frontier_point(
    model: &CovarianceModel,
    mut weights: Vec<f64>,
    target: f64,
) -> Result<Option<FrontierPoint>, TestfolioError> {
    clip_weights(&mut weights)?;
    let expected_return = dot(&weights, &model.mean);
    if (expected_return - target).abs() > RETURN_TOLERANCE {
        return Ok(None);
    }
    let volatility = portfolio_variance(&weights, &model.cov).max(0.0).sqrt();
    Ok(Some(FrontierPoint {
        target_return: target,
        expected_return,
        volatility,
        weights: model.tickers.iter().cloned().zip(weights).collect(),
    }))
}
