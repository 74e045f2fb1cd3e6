//! Portfolio definition and weight validation.

use crate::domain::error::TestfolioError;

/// Weight sums must land within this distance of 1.0.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// A named list of (ticker, target weight) allocations.
///
/// Invariant: weights are non-negative and sum to 1.0 within
/// [`WEIGHT_TOLERANCE`]. Raw user input goes through [`Portfolio::from_raw`],
/// which renormalizes; anything handed straight to the engine is validated
/// as-is and rejected when unnormalized.
#[derive(Debug, Clone)]
pub struct Portfolio {
    pub name: String,
    pub allocations: Vec<(String, f64)>,
}

impl Portfolio {
    pub fn new(name: String, allocations: Vec<(String, f64)>) -> Result<Self, TestfolioError> {
        let portfolio = Portfolio { name, allocations };
        portfolio.validate()?;
        Ok(portfolio)
    }

    /// Build from raw tickers and optional weights, renormalizing so the
    /// weights sum to exactly 1. Missing or mismatched weights fall back to
    /// equal weighting.
    pub fn from_raw(
        name: String,
        tickers: Vec<String>,
        weights: Option<Vec<f64>>,
    ) -> Result<Self, TestfolioError> {
        if tickers.is_empty() {
            return Err(TestfolioError::InvalidWeights {
                name,
                reason: "portfolio has no tickers".to_string(),
            });
        }

        let weights = match weights {
            Some(w) if w.len() == tickers.len() => w,
            _ => vec![1.0 / tickers.len() as f64; tickers.len()],
        };

        if weights.iter().any(|w| *w < 0.0) {
            return Err(TestfolioError::InvalidWeights {
                name,
                reason: "weights must be non-negative".to_string(),
            });
        }
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return Err(TestfolioError::InvalidWeights {
                name,
                reason: "weights sum to zero".to_string(),
            });
        }

        let allocations = tickers
            .into_iter()
            .zip(weights)
            .map(|(t, w)| (t, w / total))
            .collect();
        Ok(Portfolio { name, allocations })
    }

    pub fn tickers(&self) -> Vec<String> {
        self.allocations.iter().map(|(t, _)| t.clone()).collect()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.allocations.iter().map(|(_, w)| *w).collect()
    }

    pub fn validate(&self) -> Result<(), TestfolioError> {
        if self.allocations.is_empty() {
            return Err(TestfolioError::InvalidWeights {
                name: self.name.clone(),
                reason: "portfolio has no tickers".to_string(),
            });
        }
        if let Some((ticker, w)) = self.allocations.iter().find(|(_, w)| *w < 0.0) {
            return Err(TestfolioError::InvalidWeights {
                name: self.name.clone(),
                reason: format!("negative weight {w} for {ticker}"),
            });
        }
        let total: f64 = self.allocations.iter().map(|(_, w)| w).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(TestfolioError::InvalidWeights {
                name: self.name.clone(),
                reason: format!("weights sum to {total}, expected 1.0"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_accepts_normalized_weights() {
        let p = Portfolio::new(
            "60/40".into(),
            vec![("VTI".into(), 0.6), ("BND".into(), 0.4)],
        )
        .unwrap();
        assert_eq!(p.tickers(), vec!["VTI", "BND"]);
    }

    #[test]
    fn new_rejects_unnormalized_weights() {
        let err = Portfolio::new(
            "bad".into(),
            vec![("VTI".into(), 0.6), ("BND".into(), 0.6)],
        )
        .unwrap_err();
        assert!(matches!(err, TestfolioError::InvalidWeights { .. }));
    }

    #[test]
    fn new_rejects_negative_weight() {
        let err = Portfolio::new(
            "short".into(),
            vec![("VTI".into(), 1.4), ("BND".into(), -0.4)],
        )
        .unwrap_err();
        assert!(matches!(err, TestfolioError::InvalidWeights { .. }));
    }

    #[test]
    fn from_raw_renormalizes() {
        let p = Portfolio::from_raw(
            "p".into(),
            vec!["VTI".into(), "BND".into()],
            Some(vec![6.0, 4.0]),
        )
        .unwrap();
        assert_relative_eq!(p.weights()[0], 0.6, max_relative = 1e-12);
        assert_relative_eq!(p.weights()[1], 0.4, max_relative = 1e-12);
        p.validate().unwrap();
    }

    #[test]
    fn from_raw_equal_weights_when_missing() {
        let p = Portfolio::from_raw(
            "p".into(),
            vec!["VTI".into(), "BND".into(), "QQQ".into()],
            None,
        )
        .unwrap();
        for w in p.weights() {
            assert_relative_eq!(w, 1.0 / 3.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn from_raw_equal_weights_on_length_mismatch() {
        let p = Portfolio::from_raw(
            "p".into(),
            vec!["VTI".into(), "BND".into()],
            Some(vec![1.0]),
        )
        .unwrap();
        assert_relative_eq!(p.weights()[0], 0.5, max_relative = 1e-12);
    }

    #[test]
    fn from_raw_rejects_zero_sum() {
        let err = Portfolio::from_raw(
            "p".into(),
            vec!["VTI".into(), "BND".into()],
            Some(vec![0.0, 0.0]),
        )
        .unwrap_err();
        assert!(matches!(err, TestfolioError::InvalidWeights { .. }));
    }

    #[test]
    fn from_raw_rejects_empty_tickers() {
        assert!(Portfolio::from_raw("p".into(), vec![], None).is_err());
    }
}
