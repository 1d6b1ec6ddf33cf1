use anyhow::{Context, Result, bail};

use crate::{
    analysis::{derive_indicators, expected_price, forecast_next_close, latest_signal, trade_levels},
    config::{INDICATORS, TradeLevelPcts},
    models::{IndicatorFrame, OhlcvTimeSeries, PairAnalysis},
    utils::TimeUtils,
};

/// Runs the full per-symbol pipeline on an already acquired series.
/// Isolated from I/O so it can run on any worker thread.
pub fn analyze_series(series: &OhlcvTimeSeries, pcts: &TradeLevelPcts) -> Result<PairAnalysis> {
    let frame = derive_indicators(series);
    analyze_frame(series, &frame, pcts)
}

/// Same as [`analyze_series`] for callers that keep the frame (export, live stream).
pub fn analyze_frame(
    series: &OhlcvTimeSeries,
    frame: &IndicatorFrame,
    pcts: &TradeLevelPcts,
) -> Result<PairAnalysis> {
    let pair = &series.pair_interval;
    let bars = series.len();

    if bars < INDICATORS.min_bars {
        let s = if bars == 1 { "" } else { "s" };
        bail!(
            "Insufficient data: {} has only {} candle{} (minimum: {}).",
            pair.name(),
            bars,
            s,
            INDICATORS.min_bars
        );
    }

    series
        .validate()
        .with_context(|| format!("Refusing to analyse {}", pair))?;

    let latest = frame.latest_complete();
    let last_close = series
        .last_close()
        .with_context(|| format!("{} has no closing price", pair))?;
    let sma = latest.map(|r| r.sma_50).unwrap_or(f64::NAN);

    Ok(PairAnalysis {
        symbol: pair.name().to_string(),
        interval: TimeUtils::interval_to_string(pair.interval_ms).to_string(),
        timestamp_ms: series.last_timestamp_ms().unwrap_or_default(),
        bars,
        last_close,
        latest,
        signal: latest_signal(frame),
        expected: expected_price(last_close, sma),
        forecast: forecast_next_close(&series.close_prices),
        levels: trade_levels(last_close, pcts),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, PairInterval};

    /// Steady 1% climb with highs pinching in, so %K keeps rising above %D.
    fn rising_series(n: usize) -> OhlcvTimeSeries {
        let candles = (0..n)
            .map(|i| {
                let close = 100.0 * 1.01f64.powi(i as i32);
                let high = close * (1.0 + 0.02 / (1.0 + i as f64));
                let low = close * 0.999;
                Candle::new(i as i64 * 3_600_000, close, high, low, close, 10.0)
            })
            .collect();
        OhlcvTimeSeries::from_candles(PairInterval::new("RISEUSDT", 3_600_000), candles)
    }

    #[test]
    fn rejects_short_history() {
        let err = analyze_series(&rising_series(50), &TradeLevelPcts::DEFAULT).unwrap_err();
        assert!(err.to_string().contains("Insufficient data"));
    }

    #[test]
    fn rising_series_is_a_buy_candidate() {
        let a = analyze_series(&rising_series(60), &TradeLevelPcts::DEFAULT).unwrap();
        assert_eq!(a.symbol, "RISEUSDT");
        assert_eq!(a.interval, "1h");
        assert_eq!(a.bars, 60);
        assert!(a.signal.buy);
        assert!(!a.signal.sell);
        assert!(a.expected.increase_pct > 5.0);
        assert!(a.passes_scan(5.0));
        assert!(a.levels.stop_loss < a.levels.entry && a.levels.entry < a.levels.take_profit);
        assert!(a.forecast > a.last_close * 0.9);
    }

    #[test]
    fn flat_series_holds() {
        let candles = (0..60)
            .map(|i| Candle::new(i, 100.0, 100.0, 100.0, 100.0, 1.0))
            .collect();
        let series = OhlcvTimeSeries::from_candles(PairInterval::new("FLATUSDT", 60_000), candles);
        let a = analyze_series(&series, &TradeLevelPcts::DEFAULT).unwrap();
        assert!(!a.signal.buy && !a.signal.sell);
        assert!((a.expected.increase_pct + 1.0).abs() < 1e-9);
        assert!(!a.passes_scan(5.0));
    }
}
