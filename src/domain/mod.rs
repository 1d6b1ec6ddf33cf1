// Domain types and value objects
mod candle;
mod context;
mod interval;
mod pair_interval;

// Re-export commonly used types to the world
pub use candle::Candle;
pub use context::{AnalysisContext, lookback_range};
pub use interval::Interval;
pub use pair_interval::PairInterval;
