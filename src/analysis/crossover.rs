use anyhow::{Result, bail};
use serde::Serialize;
use strum_macros::Display;

use crate::{
    analysis::indicators::sma,
    config::{CROSSOVER, ExitMultipliers},
    models::{IndicatorFrame, OhlcvTimeSeries},
    utils::TimeUtils,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum CrossDirection {
    /// Short average crossed above the long one.
    Long,
    /// Short average crossed back below.
    Short,
}

impl CrossDirection {
    pub fn exits(self) -> ExitMultipliers {
        match self {
            CrossDirection::Long => CROSSOVER.long_exits,
            CrossDirection::Short => CROSSOVER.short_exits,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Crossover {
    pub index: usize,
    pub timestamp_ms: i64,
    pub direction: CrossDirection,
    /// Close of the crossing bar.
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrossoverLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
}

impl Crossover {
    pub fn levels(&self) -> CrossoverLevels {
        let exits = self.direction.exits();
        CrossoverLevels {
            entry: self.price,
            stop_loss: self.price * exits.stop,
            target: self.price * exits.target,
        }
    }
}

/// Value of a position of `amount` bought at some entry price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionValue {
    pub profit_loss: f64,
    /// Stake plus profit (or minus loss).
    pub remaining: f64,
}

/// +1 on rows where the short average moves above the long one, -1 where it
/// drops back to or below it, 0 elsewhere. Rows where either average is
/// undefined count as "not above"; the first row is always 0.
pub fn crossover_positions(closes: &[f64], short_window: usize, long_window: usize) -> Vec<i8> {
    let short = sma(closes, short_window);
    let long = sma(closes, long_window);

    let above: Vec<i8> = short
        .iter()
        .zip(&long)
        .map(|(s, l)| i8::from(s > l))
        .collect();

    std::iter::once(0)
        .chain(above.windows(2).map(|w| w[1] - w[0]))
        .take(closes.len())
        .collect()
}

/// The most recent crossing in either direction.
pub fn latest_crossover(frame: &IndicatorFrame, positions: &[i8]) -> Option<Crossover> {
    let (index, &position) = positions
        .iter()
        .enumerate()
        .take(frame.len())
        .rev()
        .find(|&(_, &p)| p != 0)?;

    Some(Crossover {
        index,
        timestamp_ms: frame.timestamps[index],
        direction: if position > 0 {
            CrossDirection::Long
        } else {
            CrossDirection::Short
        },
        price: frame.closes[index],
    })
}

/// Profit or loss on `amount` put in at `entry_price` and valued at `current_price`.
/// Without a usable entry price nothing is at stake: zero P/L, the full amount left.
pub fn profit_loss(entry_price: Option<f64>, current_price: f64, amount: f64) -> PositionValue {
    match entry_price {
        Some(entry) if entry.is_finite() && entry > 0.0 => {
            let units = amount / entry;
            let profit_loss = units * current_price - amount;
            PositionValue {
                profit_loss,
                remaining: amount + profit_loss,
            }
        }
        _ => PositionValue {
            profit_loss: 0.0,
            remaining: amount,
        },
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrossoverReport {
    pub symbol: String,
    pub interval: String,
    pub timestamp_ms: i64,
    pub last_close: f64,
    pub latest: Option<Crossover>,
    pub levels: Option<CrossoverLevels>,
    pub amount: f64,
    pub entry_price: Option<f64>,
    /// Only when an entry price was given.
    pub position: Option<PositionValue>,
}

/// SMA crossover view of `series`: the latest crossing, its exit levels and,
/// given an entry price, what a position of `amount` is worth at the last close.
pub fn crossover_report(
    series: &OhlcvTimeSeries,
    frame: &IndicatorFrame,
    amount: f64,
    entry_price: Option<f64>,
) -> Result<CrossoverReport> {
    let pair = &series.pair_interval;
    let Some(last_close) = series.last_close() else {
        bail!("{} has no bars", pair);
    };
    if frame.len() != series.len() {
        bail!(
            "{}: frame has {} rows for {} bars",
            pair,
            frame.len(),
            series.len()
        );
    }

    let positions = crossover_positions(&frame.closes, CROSSOVER.short_window, CROSSOVER.long_window);
    let latest = latest_crossover(frame, &positions);

    Ok(CrossoverReport {
        symbol: pair.name().to_string(),
        interval: TimeUtils::interval_to_string(pair.interval_ms).to_string(),
        timestamp_ms: series.last_timestamp_ms().unwrap_or_default(),
        last_close,
        latest,
        levels: latest.map(|c| c.levels()),
        amount,
        entry_price,
        position: entry_price.map(|entry| profit_loss(Some(entry), last_close, amount)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::derive_indicators;
    use crate::domain::{Candle, PairInterval};

    fn series_of(closes: &[f64]) -> OhlcvTimeSeries {
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64 * 60_000, c, c, c, c, 1.0))
            .collect();
        OhlcvTimeSeries::from_candles(PairInterval::new("CROSSUSDT", 60_000), candles)
    }

    const ZIGZAG: [f64; 12] = [5.0, 4.0, 3.0, 2.0, 3.0, 4.0, 5.0, 6.0, 5.0, 4.0, 3.0, 2.0];

    #[test]
    fn positions_mark_both_crossings() {
        let positions = crossover_positions(&ZIGZAG, 2, 3);
        assert_eq!(positions, vec![0, 0, 0, 0, 0, 1, 0, 0, 0, -1, 0, 0]);
        assert!(crossover_positions(&[], 2, 3).is_empty());
    }

    #[test]
    fn latest_crossing_wins() {
        let frame = derive_indicators(&series_of(&ZIGZAG));
        let positions = crossover_positions(&frame.closes, 2, 3);
        let c = latest_crossover(&frame, &positions).unwrap();
        assert_eq!(c.index, 9);
        assert_eq!(c.direction, CrossDirection::Short);
        assert_eq!(c.price, 4.0);
        assert_eq!(c.timestamp_ms, 9 * 60_000);

        let l = c.levels();
        assert!((l.stop_loss - 4.2).abs() < 1e-12);
        assert!((l.target - 3.6).abs() < 1e-12);
    }

    #[test]
    fn long_levels() {
        let c = Crossover {
            index: 0,
            timestamp_ms: 0,
            direction: CrossDirection::Long,
            price: 200.0,
        };
        let l = c.levels();
        assert_eq!(l.entry, 200.0);
        assert!((l.stop_loss - 190.0).abs() < 1e-9);
        assert!((l.target - 220.0).abs() < 1e-9);
    }

    #[test]
    fn flat_prices_never_cross() {
        let frame = derive_indicators(&series_of(&[7.0; 80]));
        let positions = crossover_positions(&frame.closes, 20, 50);
        assert!(positions.iter().all(|&p| p == 0));
        assert!(latest_crossover(&frame, &positions).is_none());
    }

    #[test]
    fn position_value() {
        let gain = profit_loss(Some(100.0), 110.0, 50.0);
        assert!((gain.profit_loss - 5.0).abs() < 1e-9);
        assert!((gain.remaining - 55.0).abs() < 1e-9);

        let loss = profit_loss(Some(100.0), 80.0, 50.0);
        assert!((loss.profit_loss + 10.0).abs() < 1e-9);
        assert!((loss.remaining - 40.0).abs() < 1e-9);

        for entry in [None, Some(0.0), Some(f64::NAN)] {
            assert_eq!(
                profit_loss(entry, 123.0, 50.0),
                PositionValue {
                    profit_loss: 0.0,
                    remaining: 50.0
                }
            );
        }
    }

    #[test]
    fn v_shaped_series_reports_a_long() {
        // 60 bars down, 60 bars up
        let closes: Vec<f64> = (0..120)
            .map(|i| if i < 60 { 200.0 - i as f64 } else { 80.0 + i as f64 })
            .collect();
        let series = series_of(&closes);
        let frame = derive_indicators(&series);

        let report = crossover_report(&series, &frame, 50.0, Some(150.0)).unwrap();
        assert_eq!(report.symbol, "CROSSUSDT");
        assert_eq!(report.interval, "1m");
        let latest = report.latest.unwrap();
        assert_eq!(latest.direction, CrossDirection::Long);
        assert!(latest.index > 60);
        assert_eq!(report.levels.unwrap().entry, latest.price);

        // 50 USD in at 150, marked at the last close of 199
        let position = report.position.unwrap();
        assert!((position.profit_loss - (50.0 / 150.0 * 199.0 - 50.0)).abs() < 1e-9);
    }

    #[test]
    fn report_without_entry_has_no_position() {
        let series = series_of(&[7.0; 60]);
        let frame = derive_indicators(&series);
        let report = crossover_report(&series, &frame, 50.0, None).unwrap();
        assert!(report.latest.is_none());
        assert!(report.levels.is_none());
        assert!(report.position.is_none());
        assert_eq!(report.last_close, 7.0);
    }

    #[test]
    fn report_rejects_empty_or_mismatched_input() {
        let empty = series_of(&[]);
        assert!(crossover_report(&empty, &IndicatorFrame::default(), 50.0, None).is_err());

        let series = series_of(&ZIGZAG);
        assert!(crossover_report(&series, &IndicatorFrame::default(), 50.0, None).is_err());
    }
}
