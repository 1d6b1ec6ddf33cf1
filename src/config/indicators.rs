//! Indicator windows. These are fixed by design; nothing overrides them at runtime.

pub struct MacdWindows {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

pub struct BollingerWindow {
    pub window: usize,
    pub k_sigma: f64,
}

pub struct StochasticWindows {
    pub k_period: usize,
    pub d_period: usize,
}

pub struct IndicatorConfig {
    /// Shared window of the trend SMA and EMA.
    pub trend_window: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    pub macd: MacdWindows,
    pub bollinger: BollingerWindow,
    pub stochastic: StochasticWindows,
    /// Fewer bars than this and a series is not worth analysing.
    pub min_bars: usize,
}

impl IndicatorConfig {
    /// Index of the first row where every windowed column has had a chance to fill.
    pub const fn warmup_rows(&self) -> usize {
        let mut longest = self.trend_window;
        if self.rsi_period > longest {
            longest = self.rsi_period;
        }
        if self.atr_period > longest {
            longest = self.atr_period;
        }
        if self.bollinger.window > longest {
            longest = self.bollinger.window;
        }
        let stoch = self.stochastic.k_period + self.stochastic.d_period - 1;
        if stoch > longest {
            longest = stoch;
        }
        longest - 1
    }
}

pub const INDICATORS: IndicatorConfig = IndicatorConfig {
    trend_window: 50,
    rsi_period: 14,
    atr_period: 14,
    macd: MacdWindows {
        fast: 12,
        slow: 26,
        signal: 9,
    },
    bollinger: BollingerWindow {
        window: 20,
        k_sigma: 2.0,
    },
    stochastic: StochasticWindows {
        k_period: 14,
        d_period: 3,
    },
    min_bars: 51,
};
