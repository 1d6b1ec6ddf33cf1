use anyhow::{Result, bail};
use chrono::{DateTime, TimeDelta, Utc};

use crate::domain::{Interval, PairInterval};
use crate::utils::now_utc;

/// Everything one analysis needs to know about its request: which pair, which
/// bar width and which time range. Passed explicitly; nothing is read from globals.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    pub symbol: String,
    pub interval: Interval,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalysisContext {
    pub fn new(
        symbol: impl Into<String>,
        interval: Interval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        let symbol = symbol.into().trim().to_uppercase();
        if symbol.is_empty() {
            bail!("Symbol must not be empty");
        }
        if start >= end {
            bail!("Invalid date range: start {} is not before end {}", start, end);
        }
        Ok(Self {
            symbol,
            interval,
            start,
            end,
        })
    }

    /// Range ending now and reaching `days` back.
    pub fn lookback(symbol: impl Into<String>, interval: Interval, days: u32) -> Result<Self> {
        let (start, end) = lookback_range(now_utc(), days)?;
        Self::new(symbol, interval, start, end)
    }

    pub fn pair_interval(&self) -> PairInterval {
        PairInterval::new(self.symbol.clone(), self.interval.as_ms())
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }

    /// Upper bound on how many bars the range can hold.
    pub fn expected_bars(&self) -> usize {
        ((self.end_ms() - self.start_ms()) / self.interval.as_ms()).max(0) as usize
    }
}

/// `(end - days, end)`. Errors instead of overflowing on absurd look-backs.
pub fn lookback_range(end: DateTime<Utc>, days: u32) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let Some(span) = TimeDelta::try_days(i64::from(days)) else {
        bail!("Look-back of {} days is out of range", days);
    };
    let Some(start) = end.checked_sub_signed(span) else {
        bail!("Look-back of {} days reaches before the earliest supported date", days);
    };
    Ok((start, end))
}
