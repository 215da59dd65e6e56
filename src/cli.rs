//! CLI definition and dispatch.

use chrono::Local;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use crate::adapters::csv_replay_adapter::CsvReplayAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_state_adapter::JsonStateAdapter;
use crate::adapters::rate_limiter::ThrottledMarketData;
use crate::domain::config_validation::validate_simulator_config;
use crate::domain::engine::{liquidate_all, run_tick, EngineConfig};
use crate::domain::error::PapertraderError;
use crate::domain::portfolio::Portfolio;
use crate::domain::session::{SessionContext, TRADE_LOG_DISPLAY_LIMIT};
use crate::ports::config_port::ConfigPort;
use crate::ports::state_port::StatePort;

#[derive(Parser, Debug)]
#[command(name = "papertrader", about = "Momentum trading simulator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a trading session
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Stop after this many ticks and skip the pacing sleep
        #[arg(long)]
        ticks: Option<u64>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the persisted portfolio
    Status {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Remove the persisted state and start over at the initial cash
    Reset {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a simulator configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            ticks,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config)
            } else {
                run_session(&config, ticks)
            }
        }
        Command::Status { config } => run_status(&config),
        Command::Reset { config } => run_reset(&config),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = PapertraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Everything a session needs, resolved from the config file.
#[derive(Debug, Clone)]
pub struct SimParams {
    pub tickers: Vec<String>,
    pub engine: EngineConfig,
    pub initial_cash: f64,
    pub state_path: PathBuf,
    pub data_path: PathBuf,
    pub warmup_bars: usize,
    pub tick_seconds: u64,
    pub max_requests: usize,
    pub window_seconds: u64,
}

pub fn build_sim_params(config: &dyn ConfigPort) -> Result<SimParams, PapertraderError> {
    let tickers_str =
        config
            .get_string("simulator", "tickers")
            .ok_or_else(|| PapertraderError::ConfigMissing {
                section: "simulator".into(),
                key: "tickers".into(),
            })?;
    let tickers = parse_tickers(&tickers_str);
    if tickers.is_empty() {
        return Err(PapertraderError::ConfigInvalid {
            section: "simulator".into(),
            key: "tickers".into(),
            reason: "at least one ticker is required".into(),
        });
    }

    let engine = EngineConfig {
        short_window: config.get_int("strategy", "short_window", 5) as usize,
        long_window: config.get_int("strategy", "long_window", 15) as usize,
        volatility_window: config.get_int("strategy", "volatility_window", 20) as usize,
        risk_factor: config.get_float("strategy", "risk_factor", 0.02),
        allow_short: config.get_bool("strategy", "allow_short", true),
        preclose_minutes: config.get_int("simulator", "preclose_minutes", 10),
        period: config
            .get_string("simulator", "period")
            .unwrap_or_else(|| "1d".to_string()),
        interval: config
            .get_string("simulator", "interval")
            .unwrap_or_else(|| "1m".to_string()),
    };

    Ok(SimParams {
        tickers,
        engine,
        initial_cash: config.get_float("portfolio", "initial_cash", 10_000.0),
        state_path: PathBuf::from(
            config
                .get_string("portfolio", "state_path")
                .unwrap_or_else(|| "portfolio_state.json".to_string()),
        ),
        data_path: PathBuf::from(
            config
                .get_string("data", "base_path")
                .unwrap_or_else(|| "data".to_string()),
        ),
        warmup_bars: config.get_int("data", "warmup_bars", 30) as usize,
        tick_seconds: config.get_int("simulator", "tick_seconds", 60) as u64,
        max_requests: config.get_int("limits", "max_requests", 2) as usize,
        window_seconds: config.get_int("limits", "window_seconds", 1) as u64,
    })
}

pub fn parse_tickers(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Bar interval in minutes: "1m" -> 1, "5m" -> 5, "1h" -> 60. Anything
/// unrecognised counts as one minute.
pub fn interval_minutes(interval: &str) -> i64 {
    let interval = interval.trim().to_lowercase();
    if let Some(n) = interval.strip_suffix('m') {
        n.parse().unwrap_or(1)
    } else if let Some(n) = interval.strip_suffix('h') {
        n.parse::<i64>().map(|h| h * 60).unwrap_or(60)
    } else {
        1
    }
}

fn validated_params(config_path: &PathBuf) -> Result<SimParams, ExitCode> {
    let adapter = load_config(config_path)?;
    if let Err(e) = validate_simulator_config(&adapter) {
        eprintln!("error: {e}");
        return Err((&e).into());
    }
    build_sim_params(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        (&e).into()
    })
}

fn run_session(config_path: &PathBuf, ticks: Option<u64>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let params = match validated_params(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let state = JsonStateAdapter::new(params.state_path.clone(), params.initial_cash);
    let mut portfolio = state.load();
    eprintln!(
        "Portfolio loaded: ${:.2} cash, {} open position(s)",
        portfolio.cash,
        portfolio.holdings.len()
    );

    let data = ThrottledMarketData::new(
        CsvReplayAdapter::new(
            params.data_path.clone(),
            params.warmup_bars,
            interval_minutes(&params.engine.interval),
        ),
        params.max_requests,
        Duration::from_secs(params.window_seconds),
    );

    let mut session = SessionContext::new();
    session.start(Local::now().naive_local());
    eprintln!(
        "Trading {} ticker(s): {}",
        params.tickers.len(),
        params.tickers.join(", ")
    );

    let mut tick_count: u64 = 0;
    while session.trading_active {
        if let Some(limit) = ticks {
            if tick_count >= limit {
                break;
            }
        }
        tick_count += 1;

        let now = Local::now().naive_local();
        let report = run_tick(
            &mut portfolio,
            &mut session,
            &data,
            &params.tickers,
            &params.engine,
            now,
        );

        for skip in &report.skipped {
            eprintln!("warning: skipping {} ({})", skip.ticker, skip.reason);
        }
        for snap in &report.snapshots {
            eprintln!(
                "  {}: ${:.2}  vol {:.4}  signal {}  position {} {}",
                snap.ticker, snap.price, snap.volatility, snap.signal, snap.position, snap.side
            );
        }

        if let Err(e) = state.save(&portfolio) {
            eprintln!("error: {e}");
            return (&e).into();
        }

        // A tick where every ticker was market-gated means nothing is
        // tradeable; stop rather than spin.
        let all_gated = report.snapshots.is_empty()
            && !report.skipped.is_empty()
            && report.skipped.iter().all(|s| s.reason.starts_with("market "));
        if all_gated {
            eprintln!("No selected markets are open; stopping");
            break;
        }

        if ticks.is_none() {
            thread::sleep(Duration::from_secs(params.tick_seconds));
        }
    }

    // Cooperative shutdown: flip the flag, then force-close everything.
    session.trading_active = false;
    let now = Local::now().naive_local();
    let failures = liquidate_all(&mut portfolio, &mut session, &data, &params.engine, now);
    for failure in &failures {
        eprintln!(
            "warning: could not close {} ({})",
            failure.ticker, failure.reason
        );
    }
    portfolio.update_total_value(&HashMap::new());

    if let Err(e) = state.save(&portfolio) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    print_summary(&portfolio, &session, params.initial_cash);
    ExitCode::SUCCESS
}

fn print_summary(portfolio: &Portfolio, session: &SessionContext, initial_cash: f64) {
    let now = Local::now().naive_local();

    eprintln!("\n=== Session Summary ===");
    eprintln!("Cash:             ${:.2}", portfolio.cash);
    eprintln!("Total Value:      ${:.2}", portfolio.total_value);
    if portfolio.holdings.is_empty() {
        let realized = portfolio.cash - initial_cash;
        eprintln!(
            "Realized P/L:     ${:.2} ({:+.2}%)",
            realized,
            realized / initial_cash * 100.0
        );
    } else {
        let unrealized = portfolio.total_value - initial_cash;
        eprintln!(
            "Unrealized P/L:   ${:.2} ({:+.2}%)",
            unrealized,
            unrealized / initial_cash * 100.0
        );
        eprintln!("Long Shares:      {}", portfolio.long_shares());
        eprintln!("Short Shares:     {}", portfolio.short_shares());
    }
    eprintln!("Total Trades:     {}", session.total_trades);
    eprintln!("Trades per Hour:  {:.1}", session.trades_per_hour(now));

    let recent = session.recent_trades(TRADE_LOG_DISPLAY_LIMIT);
    if !recent.is_empty() {
        eprintln!("\n=== Recent Trades ===");
        for entry in recent {
            eprintln!("{}: {}", entry.timestamp.format("%Y-%m-%d %H:%M:%S"), entry.message);
        }
    }
}

fn run_dry_run(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let params = match validated_params(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    eprintln!("Config validated successfully\n");
    eprintln!("Tickers:            {}", params.tickers.join(", "));
    eprintln!(
        "SMA windows:        short {} / long {}",
        params.engine.short_window, params.engine.long_window
    );
    eprintln!("Volatility window:  {}", params.engine.volatility_window);
    eprintln!("Risk factor:        {}", params.engine.risk_factor);
    eprintln!("Shorting:           {}", params.engine.allow_short);
    eprintln!("Pre-close minutes:  {}", params.engine.preclose_minutes);
    eprintln!("Initial cash:       ${:.2}", params.initial_cash);
    eprintln!("State file:         {}", params.state_path.display());
    eprintln!("Data path:          {}", params.data_path.display());
    eprintln!(
        "Rate limit:         {} requests / {}s",
        params.max_requests, params.window_seconds
    );

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_status(config_path: &PathBuf) -> ExitCode {
    let params = match validated_params(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let state = JsonStateAdapter::new(params.state_path.clone(), params.initial_cash);
    let portfolio = state.load();

    println!("Cash:        ${:.2}", portfolio.cash);
    println!("Total Value: ${:.2}", portfolio.total_value);

    if portfolio.holdings.is_empty() {
        println!("No open positions");
        let realized = portfolio.cash - params.initial_cash;
        println!(
            "Realized P/L: ${:.2} ({:+.2}%)",
            realized,
            realized / params.initial_cash * 100.0
        );
        return ExitCode::SUCCESS;
    }

    println!("Positions:");
    let mut tickers: Vec<&String> = portfolio.holdings.keys().collect();
    tickers.sort();
    for ticker in tickers {
        let quantity = portfolio.get_position(ticker);
        let side = portfolio.position_side(ticker);
        match portfolio.short_entries.get(ticker) {
            Some(entry) => println!(
                "  {}: {} shares {} (entry ${:.2})",
                ticker,
                quantity.abs(),
                side,
                entry
            ),
            None => println!("  {}: {} shares {}", ticker, quantity.abs(), side),
        }
    }
    ExitCode::SUCCESS
}

fn run_reset(config_path: &PathBuf) -> ExitCode {
    let params = match validated_params(config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let state = JsonStateAdapter::new(params.state_path.clone(), params.initial_cash);
    let fresh = match state.reset() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = state.save(&fresh) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Portfolio reset to ${:.2}", params.initial_cash);
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    match validated_params(config_path) {
        Ok(_) => {
            eprintln!("Configuration is valid");
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tickers_uppercases_and_trims() {
        assert_eq!(
            parse_tickers(" aapl, msft ,GOOGL,"),
            vec!["AAPL", "MSFT", "GOOGL"]
        );
        assert!(parse_tickers(" , ").is_empty());
    }

    #[test]
    fn interval_minutes_parsing() {
        assert_eq!(interval_minutes("1m"), 1);
        assert_eq!(interval_minutes("5m"), 5);
        assert_eq!(interval_minutes("1h"), 60);
        assert_eq!(interval_minutes("2H"), 120);
        assert_eq!(interval_minutes("1d"), 1);
        assert_eq!(interval_minutes("junk"), 1);
    }

    #[test]
    fn build_sim_params_defaults() {
        let adapter =
            FileConfigAdapter::from_string("[simulator]\ntickers = aapl\n").unwrap();
        let params = build_sim_params(&adapter).unwrap();

        assert_eq!(params.tickers, vec!["AAPL"]);
        assert_eq!(params.engine.short_window, 5);
        assert_eq!(params.engine.long_window, 15);
        assert_eq!(params.engine.volatility_window, 20);
        assert!((params.engine.risk_factor - 0.02).abs() < f64::EPSILON);
        assert!(params.engine.allow_short);
        assert_eq!(params.engine.preclose_minutes, 10);
        assert!((params.initial_cash - 10_000.0).abs() < f64::EPSILON);
        assert_eq!(params.state_path, PathBuf::from("portfolio_state.json"));
        assert_eq!(params.tick_seconds, 60);
        assert_eq!(params.max_requests, 2);
    }

    #[test]
    fn build_sim_params_overrides() {
        let content = r#"
[portfolio]
initial_cash = 50000
state_path = /tmp/state.json

[strategy]
short_window = 3
long_window = 9
risk_factor = 0.05
allow_short = false

[simulator]
tickers = AAPL,MSFT
tick_seconds = 30
preclose_minutes = 15
interval = 5m

[data]
base_path = /tmp/bars
warmup_bars = 12

[limits]
max_requests = 4
window_seconds = 2
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        let params = build_sim_params(&adapter).unwrap();

        assert_eq!(params.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(params.engine.short_window, 3);
        assert_eq!(params.engine.long_window, 9);
        assert!(!params.engine.allow_short);
        assert_eq!(params.engine.preclose_minutes, 15);
        assert_eq!(params.engine.interval, "5m");
        assert!((params.initial_cash - 50_000.0).abs() < f64::EPSILON);
        assert_eq!(params.data_path, PathBuf::from("/tmp/bars"));
        assert_eq!(params.warmup_bars, 12);
        assert_eq!(params.max_requests, 4);
        assert_eq!(params.window_seconds, 2);
    }

    #[test]
    fn build_sim_params_requires_tickers() {
        let adapter = FileConfigAdapter::from_string("[simulator]\n").unwrap();
        let err = build_sim_params(&adapter).unwrap_err();
        assert!(matches!(err, PapertraderError::ConfigMissing { .. }));
    }
}
