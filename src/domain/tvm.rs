//! Time-value-of-money solver.
//!
//! Ordinary annuity relation, standard sign convention:
//!
//! ```text
//! pv*(1+i)^n + pmt*((1+i)^n - 1)/i + fv = 0
//! ```
//!
//! degenerating to `pv + pmt*n + fv = 0` at `i = 0`. Exactly one of
//! {pv, fv, rate, nper} must be unset; pv, fv and nper have closed forms,
//! rate is found by a bounded bisection search.

use serde::{Deserialize, Serialize};

use crate::domain::error::TestfolioError;

pub const RATE_LOWER_BOUND: f64 = -0.99;
pub const RATE_UPPER_BOUND: f64 = 10.0;

const RATE_SCAN_STEPS: usize = 512;
const BISECTION_ITERATIONS: usize = 200;
const RESIDUAL_EPSILON: f64 = 1e-9;
const ZERO_RATE_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TvmInputs {
    pub pv: Option<f64>,
    pub fv: Option<f64>,
    pub rate: Option<f64>,
    pub nper: Option<f64>,
    #[serde(default)]
    pub pmt: f64,
}

/// Solve for the single unset slot and return the fully populated inputs.
pub fn solve(inputs: &TvmInputs) -> Result<TvmInputs, TestfolioError> {
    let unset = [
        inputs.pv.is_none(),
        inputs.fv.is_none(),
        inputs.rate.is_none(),
        inputs.nper.is_none(),
    ]
    .iter()
    .filter(|u| **u)
    .count();
    if unset == 0 {
        return Err(TestfolioError::Underdetermined);
    }
    if unset > 1 {
        return Err(TestfolioError::Overdetermined { unset });
    }

    let pmt = inputs.pmt;
    let mut solved = *inputs;
    match (inputs.pv, inputs.fv, inputs.rate, inputs.nper) {
        (None, Some(fv), Some(rate), Some(nper)) => {
            solved.pv = Some(solve_pv(fv, rate, nper, pmt)?);
        }
        (Some(pv), None, Some(rate), Some(nper)) => {
            solved.fv = Some(solve_fv(pv, rate, nper, pmt));
        }
        (Some(pv), Some(fv), Some(rate), None) => {
            solved.nper = Some(solve_nper(pv, fv, rate, pmt)?);
        }
        (Some(pv), Some(fv), None, Some(nper)) => {
            solved.rate = Some(solve_rate(pv, fv, nper, pmt)?);
        }
        _ => unreachable!("unknown count checked above"),
    }
    Ok(solved)
}

/// Residual of the annuity relation; zero at a solution.
fn residual(pv: f64, fv: f64, rate: f64, nper: f64, pmt: f64) -> f64 {
    if rate.abs() < ZERO_RATE_EPSILON {
        return pv + pmt * nper + fv;
    }
    let growth = (1.0 + rate).powf(nper);
    pv * growth + pmt * (growth - 1.0) / rate + fv
}

fn solve_fv(pv: f64, rate: f64, nper: f64, pmt: f64) -> f64 {
    if rate.abs() < ZERO_RATE_EPSILON {
        return -(pv + pmt * nper);
    }
    let growth = (1.0 + rate).powf(nper);
    -(pv * growth + pmt * (growth - 1.0) / rate)
}

fn solve_pv(fv: f64, rate: f64, nper: f64, pmt: f64) -> Result<f64, TestfolioError> {
    if rate.abs() < ZERO_RATE_EPSILON {
        return Ok(-(fv + pmt * nper));
    }
    let growth = (1.0 + rate).powf(nper);
    if growth == 0.0 || !growth.is_finite() {
        return Err(TestfolioError::NoSolution {
            unknown: "pv".to_string(),
            reason: format!("growth factor (1+{rate})^{nper} is degenerate"),
        });
    }
    Ok(-(fv + pmt * (growth - 1.0) / rate) / growth)
}

fn solve_nper(pv: f64, fv: f64, rate: f64, pmt: f64) -> Result<f64, TestfolioError> {
    if rate.abs() < ZERO_RATE_EPSILON {
        if pmt == 0.0 {
            return Err(TestfolioError::NoSolution {
                unknown: "nper".to_string(),
                reason: "rate and payment are both zero, value never changes".to_string(),
            });
        }
        return Ok(-(pv + fv) / pmt);
    }
    if 1.0 + rate <= 0.0 {
        return Err(TestfolioError::NoSolution {
            unknown: "nper".to_string(),
            reason: format!("rate {rate} leaves no positive growth base"),
        });
    }
    // pv*x + pmt*(x-1)/i + fv = 0 with x = (1+i)^n.
    let denominator = pv + pmt / rate;
    if denominator == 0.0 {
        return Err(TestfolioError::NoSolution {
            unknown: "nper".to_string(),
            reason: "cash flows cancel, period count is indeterminate".to_string(),
        });
    }
    let x = (pmt / rate - fv) / denominator;
    if x <= 0.0 {
        return Err(TestfolioError::NoSolution {
            unknown: "nper".to_string(),
            reason: format!("logarithm base {x} is not positive"),
        });
    }
    Ok(x.ln() / (1.0 + rate).ln())
}

/// Bisection over `[RATE_LOWER_BOUND, RATE_UPPER_BOUND]`: scan for a sign
/// change, then bisect. Bounded iteration counts on both phases.
fn solve_rate(pv: f64, fv: f64, nper: f64, pmt: f64) -> Result<f64, TestfolioError> {
    let f = |rate: f64| residual(pv, fv, rate, nper, pmt);
    let scale = 1.0_f64.max(pv.abs()).max(fv.abs()).max(pmt.abs());

    let width = (RATE_UPPER_BOUND - RATE_LOWER_BOUND) / RATE_SCAN_STEPS as f64;
    let mut bracket = None;
    for step in 0..RATE_SCAN_STEPS {
        let lo = RATE_LOWER_BOUND + step as f64 * width;
        let hi = lo + width;
        let (f_lo, f_hi) = (f(lo), f(hi));
        if f_lo == 0.0 {
            return Ok(lo);
        }
        if f_lo * f_hi < 0.0 {
            bracket = Some((lo, hi, f_lo));
            break;
        }
    }
    let (mut lo, mut hi, f_lo) = bracket.ok_or_else(|| TestfolioError::NonConvergence {
        reason: format!(
            "no sign change in [{RATE_LOWER_BOUND}, {RATE_UPPER_BOUND}]; \
             cash flows admit no breakeven rate"
        ),
    })?;

    let mut lo_sign = f_lo.signum();
    for _ in 0..BISECTION_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        let f_mid = f(mid);
        if f_mid.abs() < RESIDUAL_EPSILON * scale || (hi - lo) / 2.0 < 1e-14 {
            return Ok(mid);
        }
        if f_mid.signum() == lo_sign {
            lo = mid;
            lo_sign = f_mid.signum();
        } else {
            hi = mid;
        }
    }
    Err(TestfolioError::NonConvergence {
        reason: format!("residual still above tolerance after {BISECTION_ITERATIONS} bisections"),
    })
}
