mod indicator_frame;
mod pair_analysis;
mod timeseries;

pub use {
    indicator_frame::{IndicatorFrame, IndicatorRow},
    pair_analysis::{ExpectedPrice, PairAnalysis, Signal, TradeLevels},
    timeseries::{LiveCandle, OhlcvTimeSeries},
};
