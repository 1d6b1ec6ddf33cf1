//! Configuration module for the scanner.

// Can all be private now because we have a public re-export.
mod binance;
mod crossover;
mod debug;
mod indicators;
mod persistence;
mod scan;
mod types;

// Re-export commonly used items
pub use binance::{BINANCE, BINANCE_QUOTE_ASSETS, BinanceApiConfig};
pub use crossover::{CROSSOVER, CrossoverConfig, ExitMultipliers};
pub use debug::DF;
pub use indicators::{INDICATORS, IndicatorConfig};
pub use persistence::PERSISTENCE;
pub use scan::{SCAN, STREAM, ScanConfig, StreamConfig};
pub use types::{Pct, TradeLevelPcts};
