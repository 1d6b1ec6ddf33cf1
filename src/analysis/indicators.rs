use itertools::izip;

use crate::config::INDICATORS;
use crate::models::{IndicatorFrame, OhlcvTimeSeries};
use crate::utils::{ema, rolling_max, rolling_mean, rolling_min, rolling_std};

pub struct Bollinger {
    pub middle: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

pub struct Macd {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub struct Stochastic {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

#[inline]
pub fn sma(closes: &[f64], window: usize) -> Vec<f64> {
    rolling_mean(closes, window)
}

/// EMA with the rows before `window - 1` blanked out, so the column lines up
/// with an SMA of the same window.
pub fn ema_windowed(closes: &[f64], window: usize) -> Vec<f64> {
    let mut out = ema(closes, window);
    let warmup = window.saturating_sub(1).min(out.len());
    out[..warmup].fill(f64::NAN);
    out
}

pub fn bollinger(closes: &[f64], window: usize, k_sigma: f64) -> Bollinger {
    let middle = rolling_mean(closes, window);
    let std = rolling_std(closes, window);

    let (upper, lower): (Vec<f64>, Vec<f64>) = middle
        .iter()
        .zip(&std)
        .map(|(&m, &s)| (m + k_sigma * s, m - k_sigma * s))
        .unzip();

    Bollinger {
        middle,
        upper,
        lower,
    }
}

/// Simple-average RSI. The first delta counts as zero movement.
/// Undefined (NaN) whenever the average loss is zero.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let deltas: Vec<f64> = std::iter::once(f64::NAN)
        .chain(closes.windows(2).map(|w| w[1] - w[0]))
        .take(closes.len())
        .collect();

    // NaN compares false, so an undefined delta lands as 0 on both sides
    let gains: Vec<f64> = deltas.iter().map(|&d| if d > 0.0 { d } else { 0.0 }).collect();
    let losses: Vec<f64> = deltas.iter().map(|&d| if d < 0.0 { -d } else { 0.0 }).collect();

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if l > 0.0 {
                100.0 - 100.0 / (1.0 + g / l)
            } else {
                f64::NAN
            }
        })
        .collect()
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> Macd {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema(&line, signal_span);
    let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

    Macd {
        line,
        signal,
        histogram,
    }
}

pub fn true_range(series: &OhlcvTimeSeries) -> Vec<f64> {
    series
        .candles()
        .scan(None, |prev_close, candle| {
            let tr = candle.true_range(*prev_close);
            *prev_close = Some(candle.close_price);
            Some(tr)
        })
        .collect()
}

#[inline]
pub fn atr(true_range: &[f64], period: usize) -> Vec<f64> {
    rolling_mean(true_range, period)
}

pub fn stochastic(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    k_period: usize,
    d_period: usize,
) -> Stochastic {
    let lowest = rolling_min(lows, k_period);
    let highest = rolling_max(highs, k_period);

    let k: Vec<f64> = izip!(closes, &lowest, &highest)
        .map(|(&c, &ll, &hh)| {
            let range = hh - ll;
            if range > 0.0 {
                100.0 * (c - ll) / range
            } else {
                f64::NAN
            }
        })
        .collect();
    let d = rolling_mean(&k, d_period);

    Stochastic { k, d }
}

/// Derives every indicator column for `series`. Pure: the same series always
/// gives the same frame, and an empty series gives an empty frame.
pub fn derive_indicators(series: &OhlcvTimeSeries) -> IndicatorFrame {
    let cfg = &INDICATORS;
    let closes = &series.close_prices;

    let bb = bollinger(closes, cfg.bollinger.window, cfg.bollinger.k_sigma);
    let macd = macd(closes, cfg.macd.fast, cfg.macd.slow, cfg.macd.signal);
    let true_range = true_range(series);
    let atr_14 = atr(&true_range, cfg.atr_period);
    let stoch = stochastic(
        &series.high_prices,
        &series.low_prices,
        closes,
        cfg.stochastic.k_period,
        cfg.stochastic.d_period,
    );

    IndicatorFrame {
        timestamps: series.timestamps.clone(),
        closes: closes.clone(),
        sma_50: sma(closes, cfg.trend_window),
        ema_50: ema_windowed(closes, cfg.trend_window),
        bb_middle: bb.middle,
        bb_upper: bb.upper,
        bb_lower: bb.lower,
        rsi_14: rsi(closes, cfg.rsi_period),
        macd_line: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        true_range,
        atr_14,
        stoch_k: stoch.k,
        stoch_d: stoch.d,
    }
}
