use serde::{Deserialize, Serialize};

/// One OHLCV bar. `timestamp_ms` is the bar's open time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp_ms: i64,

    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,

    pub volume: f64,
}

impl Candle {
    // A constructor for convenience
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            timestamp_ms,
            open_price: open,
            high_price: high,
            low_price: low,
            close_price: close,
            volume,
        }
    }

    /// `max(high, prev_close) - min(low, prev_close)`.
    /// Without a previous close this is plain `high - low`.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) if !pc.is_nan() => self.high_price.max(pc) - self.low_price.min(pc),
            _ => self.high_price - self.low_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_range_covers_gaps() {
        let c = Candle::new(0, 10.0, 12.0, 9.0, 11.0, 0.0);
        assert_eq!(c.true_range(None), 3.0);
        // Gap down from 15: range stretches up to the previous close.
        assert_eq!(c.true_range(Some(15.0)), 6.0);
        // Gap up from 5
        assert_eq!(c.true_range(Some(5.0)), 7.0);
        assert_eq!(c.true_range(Some(10.0)), 3.0);
    }
}
