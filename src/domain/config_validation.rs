//! Configuration validation.
//!
//! Every field is checked before any engine call, so a bad config fails
//! fast with a named section/key instead of partway through a run.

use crate::domain::backtest::RebalanceFrequency;
use crate::domain::error::TestfolioError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

/// Section prefix for portfolio definitions: `[portfolio.NAME]`.
pub const PORTFOLIO_SECTION_PREFIX: &str = "portfolio.";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TestfolioError> {
    validate_starting_value(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    validate_rebalance(config)?;
    Ok(())
}

pub fn validate_portfolio_sections(config: &dyn ConfigPort) -> Result<(), TestfolioError> {
    let sections = portfolio_sections(config);
    if sections.is_empty() {
        return Err(TestfolioError::ConfigMissing {
            section: "portfolio.*".to_string(),
            key: "tickers".to_string(),
        });
    }
    for section in &sections {
        validate_portfolio_section(config, section)?;
    }
    Ok(())
}

/// All `[portfolio.NAME]` sections, sorted by name so downstream order is
/// deterministic.
pub fn portfolio_sections(config: &dyn ConfigPort) -> Vec<String> {
    let mut sections: Vec<String> = config
        .sections()
        .into_iter()
        .filter(|s| s.starts_with(PORTFOLIO_SECTION_PREFIX))
        .collect();
    sections.sort();
    sections
}

fn validate_starting_value(config: &dyn ConfigPort) -> Result<(), TestfolioError> {
    let value = config.get_double("backtest", "starting_value", 10_000.0);
    if value <= 0.0 {
        return Err(TestfolioError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "starting_value".to_string(),
            reason: "starting_value must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), TestfolioError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if value < 0.0 || value >= 1.0 {
        return Err(TestfolioError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be between 0 and 1".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), TestfolioError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date >= end_date {
        return Err(TestfolioError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, TestfolioError> {
    match value {
        None => Err(TestfolioError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TestfolioError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            })
        }
    }
}

fn validate_rebalance(config: &dyn ConfigPort) -> Result<(), TestfolioError> {
    if let Some(value) = config.get_string("backtest", "rebalance") {
        value.parse::<RebalanceFrequency>()?;
    }
    Ok(())
}

fn validate_portfolio_section(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<(), TestfolioError> {
    let tickers = match config.get_string(section, "tickers") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(TestfolioError::ConfigMissing {
                section: section.to_string(),
                key: "tickers".to_string(),
            });
        }
    };
    let n_tickers = tickers.split(',').filter(|t| !t.trim().is_empty()).count();

    if let Some(weights) = config.get_string(section, "weights") {
        let parsed: Result<Vec<f64>, _> =
            weights.split(',').map(|w| w.trim().parse::<f64>()).collect();
        let parsed = parsed.map_err(|_| TestfolioError::ConfigInvalid {
            section: section.to_string(),
            key: "weights".to_string(),
            reason: "weights must be a comma-separated list of numbers".to_string(),
        })?;
        if parsed.len() != n_tickers {
            return Err(TestfolioError::ConfigInvalid {
                section: section.to_string(),
                key: "weights".to_string(),
                reason: format!(
                    "{} weights for {} tickers",
                    parsed.len(),
                    n_tickers
                ),
            });
        }
        if parsed.iter().any(|w| *w < 0.0) {
            return Err(TestfolioError::ConfigInvalid {
                section: section.to_string(),
                key: "weights".to_string(),
                reason: "weights must be non-negative".to_string(),
            });
        }
    }
    Ok(())
}

/// Parse a comma-separated weight list. `None` input means equal weighting
/// downstream.
pub fn parse_weights(value: Option<&str>) -> Result<Option<Vec<f64>>, TestfolioError> {
    match value {
        None => Ok(None),
        Some(s) => {
            let parsed: Result<Vec<f64>, _> =
                s.split(',').map(|w| w.trim().parse::<f64>()).collect();
            parsed
                .map(Some)
                .map_err(|_| TestfolioError::Data {
                    reason: "weights must be a comma-separated list of numbers".to_string(),
                })
        }
    }
}
