use crate::models::{IndicatorFrame, IndicatorRow, Signal};

/// Momentum buy / overbought sell rules for one row.
/// Any NaN input makes its comparison false.
pub fn generate_signal(row: &IndicatorRow) -> Signal {
    let buy = row.close > row.sma_50
        && row.macd_line > row.macd_signal
        && row.stoch_k > row.stoch_d
        && row.stoch_k > 20.0;
    let sell = row.close < row.sma_50 && row.rsi_14 > 70.0;

    Signal { buy, sell }
}

/// Signal of the latest fully warmed-up row; no such row means no signal.
pub fn latest_signal(frame: &IndicatorFrame) -> Signal {
    frame
        .latest_complete()
        .map(|row| generate_signal(&row))
        .unwrap_or(Signal::NONE)
}

/// Per-row signals, for export and backfilling charts.
pub fn signal_column(frame: &IndicatorFrame) -> Vec<Signal> {
    frame.rows().map(|row| generate_signal(&row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::derive_indicators;
    use crate::domain::{Candle, PairInterval};
    use crate::models::OhlcvTimeSeries;
    use proptest::prelude::*;

    fn row(close: f64, sma: f64, rsi: f64, macd: f64, sig: f64, k: f64, d: f64) -> IndicatorRow {
        IndicatorRow {
            timestamp_ms: 0,
            close,
            sma_50: sma,
            ema_50: sma,
            bb_middle: close,
            bb_upper: close,
            bb_lower: close,
            rsi_14: rsi,
            macd_line: macd,
            macd_signal: sig,
            macd_histogram: macd - sig,
            true_range: 0.0,
            atr_14: 0.0,
            stoch_k: k,
            stoch_d: d,
        }
    }

    #[test]
    fn buy_needs_every_condition() {
        let base = row(110.0, 100.0, 55.0, 1.0, 0.5, 60.0, 50.0);
        assert_eq!(generate_signal(&base), Signal { buy: true, sell: false });

        assert!(!generate_signal(&IndicatorRow { close: 99.0, ..base }).buy);
        assert!(!generate_signal(&IndicatorRow { macd_line: 0.4, ..base }).buy);
        assert!(!generate_signal(&IndicatorRow { stoch_d: 61.0, ..base }).buy);
        assert!(!generate_signal(&IndicatorRow { stoch_k: 19.0, stoch_d: 10.0, ..base }).buy);
        assert!(!generate_signal(&IndicatorRow { stoch_k: f64::NAN, ..base }).buy);
    }

    #[test]
    fn sell_on_overbought_below_trend() {
        let r = row(90.0, 100.0, 75.0, 0.0, 0.0, 50.0, 50.0);
        assert_eq!(generate_signal(&r), Signal { buy: false, sell: true });
        assert!(!generate_signal(&IndicatorRow { rsi_14: 70.0, ..r }).sell);
        assert!(!generate_signal(&IndicatorRow { rsi_14: f64::NAN, ..r }).sell);
    }

    #[test]
    fn at_the_average_neither_fires() {
        let r = row(100.0, 100.0, 90.0, 1.0, 0.0, 90.0, 10.0);
        assert_eq!(generate_signal(&r), Signal::NONE);
    }

    #[test]
    fn short_frame_has_no_signal() {
        let candles: Vec<Candle> = (0..30)
            .map(|i| {
                let c = 100.0 * 1.01f64.powi(i);
                Candle::new(i as i64, c, c * 1.01, c * 0.99, c, 1.0)
            })
            .collect();
        let series = OhlcvTimeSeries::from_candles(PairInterval::new("XUSDT", 1), candles);
        let frame = derive_indicators(&series);
        assert_eq!(latest_signal(&frame), Signal::NONE);
        assert_eq!(signal_column(&frame).len(), 30);
    }

    fn nan_or(v: f64) -> impl Strategy<Value = f64> {
        prop_oneof![Just(f64::NAN), Just(v), -1000.0f64..1000.0]
    }

    proptest! {
        #[test]
        fn buy_and_sell_never_both(
            close in nan_or(100.0),
            sma in nan_or(100.0),
            rsi in nan_or(80.0),
            macd in nan_or(1.0),
            sig in nan_or(0.0),
            k in nan_or(50.0),
            d in nan_or(40.0),
        ) {
            let s = generate_signal(&row(close, sma, rsi, macd, sig, k, d));
            prop_assert!(!(s.buy && s.sell));
        }
    }
}
