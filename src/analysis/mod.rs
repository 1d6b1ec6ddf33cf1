// Indicator derivation, signal rules and projections
pub mod crossover;
pub mod export;
pub mod indicators;
pub mod levels;
pub mod pair_analysis;
pub mod signals;

pub use {
    crossover::{CrossoverReport, crossover_report, profit_loss},
    export::{CsvReport, ExportFormat, write_export},
    indicators::derive_indicators,
    levels::{expected_price, forecast_next_close, trade_levels},
    pair_analysis::{analyze_frame, analyze_series},
    signals::{generate_signal, latest_signal, signal_column},
};
