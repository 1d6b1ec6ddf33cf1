#![allow(clippy::collapsible_if)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod analysis;
pub mod app;
pub mod booking;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod models;
pub mod utils;

// Re-export commonly used types outside of crate
pub use analysis::{ExportFormat, analyze_series, derive_indicators};
pub use config::PERSISTENCE;
pub use domain::{AnalysisContext, Candle, Interval, PairInterval};
pub use engine::{ScanRequest, ScanSummary, scan_symbols};
pub use models::{IndicatorFrame, OhlcvTimeSeries, PairAnalysis, Signal};

use std::path::PathBuf;

// CLI argument parsing
use clap::{ArgAction, Parser, Subcommand};

use config::{CROSSOVER, SCAN, STREAM};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Technical-indicator scanner for Binance spot pairs", long_about = None)]
pub struct Cli {
    /// SQLite file holding appointments
    #[arg(long, global = true, default_value = PERSISTENCE.bookings.db_path)]
    pub db: PathBuf,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyse one pair and print its indicators, signal and levels
    Analyze {
        symbol: String,
        #[arg(long, default_value_t = SCAN.default_interval)]
        interval: Interval,
        /// Days of history to fetch
        #[arg(long, default_value_t = SCAN.default_lookback_days)]
        days: u32,
        #[arg(long)]
        json: bool,
    },
    /// Scan many pairs and list the buy candidates
    Scan {
        #[arg(long, default_value_t = SCAN.default_interval)]
        interval: Interval,
        #[arg(long, default_value_t = SCAN.default_lookback_days)]
        days: u32,
        /// Comma separated pairs, e.g. BTCUSDT,ETHUSDT
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,
        /// File with one pair per line
        #[arg(long)]
        pairs_file: Option<PathBuf>,
        /// Add every USDT pair listed on the exchange
        #[arg(long)]
        all_usdt: bool,
        #[arg(long)]
        json: bool,
    },
    /// Latest SMA 20/50 crossover with its exit levels and position value
    Crossover {
        symbol: String,
        #[arg(long, default_value_t = SCAN.default_interval)]
        interval: Interval,
        #[arg(long, default_value_t = SCAN.default_lookback_days)]
        days: u32,
        /// Position size in USD
        #[arg(long, default_value_t = CROSSOVER.default_amount)]
        amount: f64,
        /// Price the position was opened at
        #[arg(long)]
        entry: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Write a pair's bars and indicator columns to CSV or JSON
    Export {
        symbol: String,
        #[arg(long, default_value_t = SCAN.default_interval)]
        interval: Interval,
        #[arg(long, default_value_t = SCAN.default_lookback_days)]
        days: u32,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    /// Follow a pair live and print a fresh analysis on every tick
    Stream {
        symbol: String,
        #[arg(long, default_value_t = STREAM.default_interval)]
        interval: Interval,
    },
    /// Manage appointments
    Bookings {
        #[command(subcommand)]
        action: BookingCommand,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum BookingCommand {
    /// Book a new (pending) appointment
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        service: String,
    },
    List {
        #[arg(long)]
        json: bool,
    },
    Confirm {
        id: i64,
    },
    Cancel {
        id: i64,
    },
    Delete {
        id: i64,
    },
}
