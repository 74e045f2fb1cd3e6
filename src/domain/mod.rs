//! Core domain types and logic.

pub mod align;
pub mod backtest;
pub mod config_validation;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod metrics;
pub mod optimizer;
pub mod portfolio;
pub mod price_series;
pub mod returns;
pub mod sensitivity;
pub mod simulator;
pub mod tvm;
