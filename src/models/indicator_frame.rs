use serde::Serialize;

use crate::config::INDICATORS;

/// Derived indicator columns, index-aligned with the source series.
/// Every column has the same length as `timestamps`; undefined values are NaN.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct IndicatorFrame {
    pub timestamps: Vec<i64>,
    pub closes: Vec<f64>,

    // Trend
    pub sma_50: Vec<f64>,
    pub ema_50: Vec<f64>,

    // Bollinger (20, 2 sigma)
    pub bb_middle: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_lower: Vec<f64>,

    pub rsi_14: Vec<f64>,

    // MACD (12, 26, 9)
    pub macd_line: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,

    pub true_range: Vec<f64>,
    pub atr_14: Vec<f64>,

    // Stochastic (14, 3)
    pub stoch_k: Vec<f64>,
    pub stoch_d: Vec<f64>,
}

/// One row of the frame, by value.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct IndicatorRow {
    pub timestamp_ms: i64,
    pub close: f64,
    pub sma_50: f64,
    pub ema_50: f64,
    pub bb_middle: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub rsi_14: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub true_range: f64,
    pub atr_14: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn row(&self, idx: usize) -> Option<IndicatorRow> {
        if idx >= self.len() {
            return None;
        }
        Some(IndicatorRow {
            timestamp_ms: self.timestamps[idx],
            close: self.closes[idx],
            sma_50: self.sma_50[idx],
            ema_50: self.ema_50[idx],
            bb_middle: self.bb_middle[idx],
            bb_upper: self.bb_upper[idx],
            bb_lower: self.bb_lower[idx],
            rsi_14: self.rsi_14[idx],
            macd_line: self.macd_line[idx],
            macd_signal: self.macd_signal[idx],
            macd_histogram: self.macd_histogram[idx],
            true_range: self.true_range[idx],
            atr_14: self.atr_14[idx],
            stoch_k: self.stoch_k[idx],
            stoch_d: self.stoch_d[idx],
        })
    }

    pub fn latest(&self) -> Option<IndicatorRow> {
        self.len().checked_sub(1).and_then(|i| self.row(i))
    }

    /// Latest row, but only once the frame is past the longest warm-up window.
    pub fn latest_complete(&self) -> Option<IndicatorRow> {
        if self.len() > INDICATORS.warmup_rows() {
            self.latest()
        } else {
            None
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = IndicatorRow> + '_ {
        (0..self.len()).filter_map(|i| self.row(i))
    }
}
