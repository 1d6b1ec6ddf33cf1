use anyhow::{Result, bail};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::{Candle, PairInterval};

// ============================================================================
// OhlcvTimeSeries: Raw time series data for a trading pair
// ============================================================================

/// A kline update as it arrives from the websocket. The same open time is sent
/// repeatedly while the bar is forming; `is_closed` marks the final update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LiveCandle {
    pub symbol: String,
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub is_closed: bool,
}

/// Column-oriented bar series. Timestamps are strictly increasing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OhlcvTimeSeries {
    pub pair_interval: PairInterval,

    pub timestamps: Vec<i64>,

    // Prices
    pub open_prices: Vec<f64>,
    pub high_prices: Vec<f64>,
    pub low_prices: Vec<f64>,
    pub close_prices: Vec<f64>,

    pub volumes: Vec<f64>,
}

impl OhlcvTimeSeries {
    pub fn empty(pair_interval: PairInterval) -> Self {
        Self {
            pair_interval,
            timestamps: vec![],
            open_prices: vec![],
            high_prices: vec![],
            low_prices: vec![],
            close_prices: vec![],
            volumes: vec![],
        }
    }

    /// Create a TimeSeries from a list of Candles in any order.
    /// Candles are sorted by open time; for a repeated open time the last one wins.
    pub fn from_candles(pair_interval: PairInterval, mut candles: Vec<Candle>) -> Self {
        let mut series = Self::empty(pair_interval);
        if candles.is_empty() {
            return series;
        }

        candles.sort_by_key(|c| c.timestamp_ms);

        let len = candles.len();
        series.timestamps.reserve(len);
        series.open_prices.reserve(len);
        series.high_prices.reserve(len);
        series.low_prices.reserve(len);
        series.close_prices.reserve(len);
        series.volumes.reserve(len);

        for c in candles {
            if series.timestamps.last() == Some(&c.timestamp_ms) {
                series.replace_last(&c);
            } else {
                series.push(&c);
            }
        }

        series
    }

    fn push(&mut self, c: &Candle) {
        self.timestamps.push(c.timestamp_ms);
        self.open_prices.push(c.open_price);
        self.high_prices.push(c.high_price);
        self.low_prices.push(c.low_price);
        self.close_prices.push(c.close_price);
        self.volumes.push(c.volume);
    }

    fn replace_last(&mut self, c: &Candle) {
        let Some(idx) = self.timestamps.len().checked_sub(1) else {
            return;
        };
        self.open_prices[idx] = c.open_price;
        self.high_prices[idx] = c.high_price;
        self.low_prices[idx] = c.low_price;
        self.close_prices[idx] = c.close_price;
        self.volumes[idx] = c.volume;
    }

    /// Folds a websocket kline into the series: same open time replaces the
    /// forming bar, a newer one appends, an older one is ignored.
    pub fn update_from_live(&mut self, candle: &LiveCandle) {
        let bar = Candle::new(
            candle.open_time,
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume,
        );

        match self.timestamps.last() {
            Some(&last_ts) if candle.open_time == last_ts => self.replace_last(&bar),
            Some(&last_ts) if candle.open_time < last_ts => {
                log::debug!(
                    "{}: ignoring out-of-order kline {} (last bar {})",
                    self.pair_interval,
                    candle.open_time,
                    last_ts
                );
            }
            _ => self.push(&bar),
        }
    }

    /// Drops the oldest bars so at most `max_bars` remain.
    pub fn truncate_front(&mut self, max_bars: usize) {
        let excess = self.len().saturating_sub(max_bars);
        if excess == 0 {
            return;
        }
        self.timestamps.drain(..excess);
        self.open_prices.drain(..excess);
        self.high_prices.drain(..excess);
        self.low_prices.drain(..excess);
        self.close_prices.drain(..excess);
        self.volumes.drain(..excess);
    }

    /// Checks the column lengths agree and timestamps strictly increase.
    pub fn validate(&self) -> Result<()> {
        let n = self.timestamps.len();
        let lengths = [
            self.open_prices.len(),
            self.high_prices.len(),
            self.low_prices.len(),
            self.close_prices.len(),
            self.volumes.len(),
        ];
        if lengths.iter().any(|&l| l != n) {
            bail!(
                "{}: column lengths disagree ({} timestamps vs {:?})",
                self.pair_interval,
                n,
                lengths
            );
        }
        if let Some((a, b)) = self.timestamps.iter().tuple_windows().find(|(a, b)| a >= b) {
            bail!(
                "{}: timestamps not strictly increasing ({} then {})",
                self.pair_interval,
                a,
                b
            );
        }
        Ok(())
    }

    pub fn get_candle(&self, idx: usize) -> Candle {
        Candle::new(
            self.timestamps[idx],
            self.open_prices[idx],
            self.high_prices[idx],
            self.low_prices[idx],
            self.close_prices[idx],
            self.volumes[idx],
        )
    }

    pub fn candles(&self) -> impl Iterator<Item = Candle> + '_ {
        (0..self.len()).map(|i| self.get_candle(i))
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.close_prices.last().copied()
    }

    pub fn last_timestamp_ms(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }
}
