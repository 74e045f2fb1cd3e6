//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvPriceAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::align::parse_tickers;
use crate::domain::backtest::{BacktestConfig, DEFAULT_BENCHMARK_TICKER, RebalanceFrequency};
use crate::domain::config_validation::{
    PORTFOLIO_SECTION_PREFIX, parse_weights, portfolio_sections, validate_backtest_config,
    validate_portfolio_sections,
};
use crate::domain::engine;
use crate::domain::error::TestfolioError;
use crate::domain::frontier::DEFAULT_FRONTIER_POINTS;
use crate::domain::portfolio::Portfolio;
use crate::domain::tvm::{self, TvmInputs};
use crate::ports::config_port::ConfigPort;
use crate::ports::price_port::PricePort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "testfolio", about = "Portfolio backtester and optimizer")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the configured portfolios
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Per-asset risk/return analysis
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated ticker list (overrides config)
        #[arg(short, long)]
        tickers: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Min-variance and max-Sharpe portfolios
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        tickers: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Trace the efficient frontier
    Frontier {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        tickers: Option<String>,
        /// Number of frontier samples
        #[arg(short, long)]
        points: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare rebalancing frequencies for one portfolio
    Sensitivity {
        #[arg(short, long)]
        config: PathBuf,
        /// Portfolio section name (defaults to the first section by name)
        #[arg(long)]
        portfolio: Option<String>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Solve a time-value-of-money equation (leave exactly one of
    /// --pv/--fv/--rate/--nper unset)
    Tvm {
        #[arg(long)]
        pv: Option<f64>,
        #[arg(long)]
        fv: Option<f64>,
        #[arg(long)]
        rate: Option<f64>,
        #[arg(long)]
        nper: Option<f64>,
        #[arg(long, default_value_t = 0.0)]
        pmt: f64,
    },
    /// List tickers with price data available
    ListTickers {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            output,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_backtest(&config, output.as_deref())
            }
        }
        Command::Analyze {
            config,
            tickers,
            output,
        } => run_analyze(&config, tickers.as_deref(), output.as_deref()),
        Command::Optimize {
            config,
            tickers,
            output,
        } => run_optimize(&config, tickers.as_deref(), output.as_deref()),
        Command::Frontier {
            config,
            tickers,
            points,
            output,
        } => run_frontier(&config, tickers.as_deref(), points, output.as_deref()),
        Command::Sensitivity {
            config,
            portfolio,
            output,
        } => run_sensitivity(&config, portfolio.as_deref(), output.as_deref()),
        Command::Tvm {
            pv,
            fv,
            rate,
            nper,
            pmt,
        } => run_tvm(TvmInputs {
            pv,
            fv,
            rate,
            nper,
            pmt,
        }),
        Command::ListTickers { config } => run_list_tickers(&config),
    }
}

pub fn load_config(path: &std::path::Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = TestfolioError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> Result<BacktestConfig, TestfolioError> {
    let start_str =
        adapter
            .get_string("backtest", "start_date")
            .ok_or_else(|| TestfolioError::ConfigMissing {
                section: "backtest".into(),
                key: "start_date".into(),
            })?;
    let end_str =
        adapter
            .get_string("backtest", "end_date")
            .ok_or_else(|| TestfolioError::ConfigMissing {
                section: "backtest".into(),
                key: "end_date".into(),
            })?;

    let start_date = NaiveDate::parse_from_str(&start_str, "%Y-%m-%d").map_err(|_| {
        TestfolioError::ConfigInvalid {
            section: "backtest".into(),
            key: "start_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;
    let end_date = NaiveDate::parse_from_str(&end_str, "%Y-%m-%d").map_err(|_| {
        TestfolioError::ConfigInvalid {
            section: "backtest".into(),
            key: "end_date".into(),
            reason: "invalid date format (expected YYYY-MM-DD)".into(),
        }
    })?;

    let rebalance = match adapter.get_string("backtest", "rebalance") {
        Some(s) => s.parse::<RebalanceFrequency>()?,
        None => RebalanceFrequency::Monthly,
    };

    // Absent key falls back to the default benchmark; `benchmark = none`
    // (or an empty value) disables the benchmark run.
    let benchmark = match adapter.get_string("backtest", "benchmark") {
        Some(value) => {
            let ticker = value.trim().to_uppercase();
            if ticker.is_empty() || ticker == "NONE" {
                None
            } else {
                Some(ticker)
            }
        }
        None => Some(DEFAULT_BENCHMARK_TICKER.to_string()),
    };

    Ok(BacktestConfig {
        start_date,
        end_date,
        starting_value: adapter.get_double("backtest", "starting_value", 10_000.0),
        rebalance,
        adjust_inflation: adapter.get_bool("backtest", "adjust_inflation", false),
        benchmark,
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", 0.0),
    })
}

/// One portfolio per `[portfolio.NAME]` section, named after the section.
pub fn build_portfolios(adapter: &dyn ConfigPort) -> Result<Vec<Portfolio>, TestfolioError> {
    let mut portfolios = Vec::new();
    for section in portfolio_sections(adapter) {
        let name = section
            .strip_prefix(PORTFOLIO_SECTION_PREFIX)
            .unwrap_or(&section)
            .to_string();
        let tickers_str =
            adapter
                .get_string(&section, "tickers")
                .ok_or_else(|| TestfolioError::ConfigMissing {
                    section: section.clone(),
                    key: "tickers".into(),
                })?;
        let tickers = parse_tickers(&tickers_str)?;
        let weights = parse_weights(adapter.get_string(&section, "weights").as_deref())?;
        portfolios.push(Portfolio::from_raw(name, tickers, weights)?);
    }
    Ok(portfolios)
}

/// Ticker universe for analyze/optimize/frontier: the `--tickers` override,
/// else `[universe] tickers`, else every ticker used by a portfolio.
pub fn resolve_universe(
    ticker_override: Option<&str>,
    adapter: &dyn ConfigPort,
) -> Result<Vec<String>, TestfolioError> {
    if let Some(t) = ticker_override {
        return parse_tickers(t);
    }
    if let Some(t) = adapter.get_string("universe", "tickers") {
        return parse_tickers(&t);
    }

    let mut tickers = Vec::new();
    for portfolio in build_portfolios(adapter)? {
        for ticker in portfolio.tickers() {
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
    }
    if tickers.is_empty() {
        return Err(TestfolioError::ConfigMissing {
            section: "universe".into(),
            key: "tickers".into(),
        });
    }
    Ok(tickers)
}

fn make_price_adapter(adapter: &dyn ConfigPort) -> Result<CsvPriceAdapter, TestfolioError> {
    let path =
        adapter
            .get_string("data", "prices_path")
            .ok_or_else(|| TestfolioError::ConfigMissing {
                section: "data".into(),
                key: "prices_path".into(),
            })?;
    Ok(CsvPriceAdapter::new(PathBuf::from(path)))
}

/// Write the report to `output` as JSON, or print it to stdout when no
/// path was given.
fn emit_report(report: &serde_json::Value, output: Option<&std::path::Path>) -> ExitCode {
    match output {
        Some(path) => match JsonReportAdapter.write(report, path) {
            Ok(()) => {
                eprintln!("\nReport written to: {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                (&e).into()
            }
        },
        None => {
            println!("{report:#}");
            ExitCode::SUCCESS
        }
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => "n/a".to_string(),
    }
}

fn fmt_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

fn run_backtest(config_path: &std::path::Path, output: Option<&std::path::Path>) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate
    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_portfolio_sections(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 3: Build config and portfolios
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let portfolios = match build_portfolios(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Backtesting {} portfolios, {} to {}, rebalancing {}",
        portfolios.len(),
        bt_config.start_date,
        bt_config.end_date,
        bt_config.rebalance,
    );

    // Stage 4: Run
    let prices = match make_price_adapter(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let outcome = match engine::run_backtest(&prices, &portfolios, &bt_config) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 5: Console summary
    eprintln!("\n=== Backtest Results ===");
    for result in &outcome.results {
        let m = &result.metrics;
        eprintln!("{}:", m.name);
        eprintln!("  Total Return:   {:.2}%", m.total_return * 100.0);
        eprintln!("  CAGR:           {}", fmt_pct(m.cagr));
        eprintln!("  Volatility:     {}", fmt_pct(m.volatility));
        eprintln!("  Sharpe Ratio:   {}", fmt_ratio(m.sharpe));
        eprintln!("  Max Drawdown:   -{:.1}%", m.max_drawdown * 100.0);
        eprintln!("  Final Value:    {:.2}", m.final_value);
    }

    // Stage 6: Report
    match serde_json::to_value(&outcome) {
        Ok(report) => emit_report(&report, output),
        Err(e) => {
            eprintln!("error: failed to serialize results: {e}");
            ExitCode::from(1)
        }
    }
}

pub fn run_dry_run(config_path: &std::path::Path) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_portfolio_sections(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let portfolios = match build_portfolios(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\nPortfolios:");
    for p in &portfolios {
        let allocations: Vec<String> = p
            .allocations
            .iter()
            .map(|(t, w)| format!("{} {:.1}%", t, w * 100.0))
            .collect();
        eprintln!("  {}: {}", p.name, allocations.join(", "));
    }

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_analyze(
    config_path: &std::path::Path,
    ticker_override: Option<&str>,
    output: Option<&std::path::Path>,
) -> ExitCode {
    let (adapter, bt_config, tickers) = match load_run_inputs(config_path, ticker_override) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let prices = match make_price_adapter(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Analyzing {} tickers...", tickers.len());
    let results = match engine::analyze_assets(&prices, &tickers, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Asset Analysis ===");
    for asset in &results {
        let m = &asset.metrics;
        eprintln!(
            "{}: total {:.2}%, cagr {}, vol {}, sharpe {}, mdd -{:.1}%",
            m.name,
            m.total_return * 100.0,
            fmt_pct(m.cagr),
            fmt_pct(m.volatility),
            fmt_ratio(m.sharpe),
            m.max_drawdown * 100.0,
        );
    }

    match serde_json::to_value(&results) {
        Ok(report) => emit_report(&report, output),
        Err(e) => {
            eprintln!("error: failed to serialize results: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_optimize(
    config_path: &std::path::Path,
    ticker_override: Option<&str>,
    output: Option<&std::path::Path>,
) -> ExitCode {
    let (adapter, bt_config, tickers) = match load_run_inputs(config_path, ticker_override) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let prices = match make_price_adapter(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Optimizing over {} tickers...", tickers.len());
    let result = match engine::optimize_portfolio(&prices, &tickers, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Optimization ===");
    for (label, stats) in [
        ("Min Variance", &result.min_variance),
        ("Max Sharpe", &result.max_sharpe),
    ] {
        let weights: Vec<String> = stats
            .weights
            .iter()
            .map(|(t, w)| format!("{} {:.1}%", t, w * 100.0))
            .collect();
        eprintln!("{}:", label);
        eprintln!("  Weights:    {}", weights.join(", "));
        eprintln!("  Return:     {:.2}%", stats.expected_return * 100.0);
        eprintln!("  Volatility: {:.2}%", stats.volatility * 100.0);
        eprintln!("  Sharpe:     {}", fmt_ratio(stats.sharpe));
    }

    match serde_json::to_value(&result) {
        Ok(report) => emit_report(&report, output),
        Err(e) => {
            eprintln!("error: failed to serialize results: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_frontier(
    config_path: &std::path::Path,
    ticker_override: Option<&str>,
    points: Option<usize>,
    output: Option<&std::path::Path>,
) -> ExitCode {
    let (adapter, bt_config, tickers) = match load_run_inputs(config_path, ticker_override) {
        Ok(v) => v,
        Err(code) => return code,
    };

    let n_points = points.unwrap_or_else(|| {
        adapter.get_int("frontier", "points", DEFAULT_FRONTIER_POINTS as i64) as usize
    });

    let prices = match make_price_adapter(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Tracing frontier over {} tickers, {} points...",
        tickers.len(),
        n_points
    );
    let frontier = match engine::trace_frontier(&prices, &tickers, &bt_config, n_points) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Efficient Frontier ({} points) ===", frontier.len());
    for point in &frontier {
        eprintln!(
            "  return {:.2}%  vol {:.2}%",
            point.expected_return * 100.0,
            point.volatility * 100.0,
        );
    }

    match serde_json::to_value(&frontier) {
        Ok(report) => emit_report(&report, output),
        Err(e) => {
            eprintln!("error: failed to serialize results: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_sensitivity(
    config_path: &std::path::Path,
    section_override: Option<&str>,
    output: Option<&std::path::Path>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = validate_portfolio_sections(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let portfolios = match build_portfolios(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let portfolio = match section_override {
        Some(name) => match portfolios.iter().find(|p| p.name == name) {
            Some(p) => p.clone(),
            None => {
                eprintln!("error: no [portfolio.{name}] section in config");
                return ExitCode::from(2);
            }
        },
        // validate_portfolio_sections guarantees at least one.
        None => portfolios[0].clone(),
    };

    let prices = match make_price_adapter(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Rebalancing sensitivity for {}...", portfolio.name);
    let runs = match engine::run_sensitivity(&prices, &portfolio, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("\n=== Rebalancing Sensitivity ===");
    for run in &runs {
        eprintln!(
            "  {:<10} total {:.2}%  cagr {}  mdd -{:.1}%",
            run.frequency.to_string(),
            run.metrics.total_return * 100.0,
            fmt_pct(run.metrics.cagr),
            run.metrics.max_drawdown * 100.0,
        );
    }

    match serde_json::to_value(&runs) {
        Ok(report) => emit_report(&report, output),
        Err(e) => {
            eprintln!("error: failed to serialize results: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_tvm(inputs: TvmInputs) -> ExitCode {
    let solved = match tvm::solve(&inputs) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("=== TVM Solution ===");
    eprintln!("  pv:   {:.6}", solved.pv.unwrap_or(f64::NAN));
    eprintln!("  fv:   {:.6}", solved.fv.unwrap_or(f64::NAN));
    eprintln!("  rate: {:.6}", solved.rate.unwrap_or(f64::NAN));
    eprintln!("  nper: {:.6}", solved.nper.unwrap_or(f64::NAN));
    eprintln!("  pmt:  {:.6}", solved.pmt);

    match serde_json::to_value(solved) {
        Ok(report) => emit_report(&report, None),
        Err(e) => {
            eprintln!("error: failed to serialize results: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_list_tickers(config_path: &std::path::Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let prices = match make_price_adapter(&adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    match prices.list_tickers() {
        Ok(tickers) => {
            if tickers.is_empty() {
                eprintln!("No price files found");
            } else {
                for ticker in &tickers {
                    println!("{ticker}");
                }
                eprintln!("{} tickers found", tickers.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Shared load/validate/resolve prologue for the universe-driven commands.
fn load_run_inputs(
    config_path: &std::path::Path,
    ticker_override: Option<&str>,
) -> Result<(FileConfigAdapter, BacktestConfig, Vec<String>), ExitCode> {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    if let Err(e) = validate_backtest_config(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }

    let bt_config = build_backtest_config(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    let tickers = resolve_universe(ticker_override, &adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;

    Ok((adapter, bt_config, tickers))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn build_backtest_config_reads_all_fields() {
        let adapter = make_config(
            r#"
[backtest]
start_date = 2020-01-01
end_date = 2024-12-31
starting_value = 250000
rebalance = quarterly
adjust_inflation = true
benchmark = spy
risk_free_rate = 0.02
"#,
        );
        let config = build_backtest_config(&adapter).unwrap();
        assert_eq!(config.rebalance, RebalanceFrequency::Quarterly);
        assert_eq!(config.starting_value, 250_000.0);
        assert!(config.adjust_inflation);
        assert_eq!(config.benchmark.as_deref(), Some("SPY"));
        assert_eq!(config.risk_free_rate, 0.02);
    }

    #[test]
    fn build_backtest_config_applies_defaults() {
        let adapter =
            make_config("[backtest]\nstart_date = 2020-01-01\nend_date = 2024-12-31\n");
        let config = build_backtest_config(&adapter).unwrap();
        assert_eq!(config.rebalance, RebalanceFrequency::Monthly);
        assert_eq!(config.starting_value, 10_000.0);
        assert!(!config.adjust_inflation);
        assert_eq!(config.benchmark.as_deref(), Some(DEFAULT_BENCHMARK_TICKER));
        assert_eq!(config.risk_free_rate, 0.0);
    }

    #[test]
    fn build_backtest_config_benchmark_none_disables() {
        let adapter = make_config(
            "[backtest]\nstart_date = 2020-01-01\nend_date = 2024-12-31\nbenchmark = none\n",
        );
        let config = build_backtest_config(&adapter).unwrap();
        assert!(config.benchmark.is_none());
    }

    #[test]
    fn build_portfolios_reads_sections() {
        let adapter = make_config(
            r#"
[portfolio.classic]
tickers = VTI,BND
weights = 0.6,0.4

[portfolio.equal]
tickers = VTI,BND,QQQ
"#,
        );
        let portfolios = build_portfolios(&adapter).unwrap();
        assert_eq!(portfolios.len(), 2);
        assert_eq!(portfolios[0].name, "classic");
        assert_eq!(portfolios[0].weights(), vec![0.6, 0.4]);
        // No weights: equal split.
        assert_eq!(portfolios[1].weights(), vec![1.0 / 3.0; 3]);
    }

    #[test]
    fn resolve_universe_prefers_override() {
        let adapter = make_config("[universe]\ntickers = VTI,BND\n");
        let tickers = resolve_universe(Some("qqq,iwm"), &adapter).unwrap();
        assert_eq!(tickers, vec!["QQQ", "IWM"]);
    }

    #[test]
    fn resolve_universe_falls_back_to_portfolio_tickers() {
        let adapter = make_config(
            "[portfolio.a]\ntickers = VTI,BND\n\n[portfolio.b]\ntickers = BND,QQQ\n",
        );
        let tickers = resolve_universe(None, &adapter).unwrap();
        assert_eq!(tickers, vec!["VTI", "BND", "QQQ"]);
    }

    #[test]
    fn resolve_universe_fails_with_nothing_configured() {
        let adapter = make_config("[backtest]\nstart_date = 2020-01-01\n");
        assert!(resolve_universe(None, &adapter).is_err());
    }
}
