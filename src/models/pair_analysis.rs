use serde::Serialize;

use crate::models::IndicatorRow;

/// Buy/sell flags for the latest complete bar. Both false means "hold".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub buy: bool,
    pub sell: bool,
}

impl Signal {
    pub const NONE: Self = Self {
        buy: false,
        sell: false,
    };

    pub fn label(&self) -> &'static str {
        match (self.buy, self.sell) {
            (true, _) => "BUY",
            (_, true) => "SELL",
            _ => "HOLD",
        }
    }
}

/// Mean-reversion projection of the next price. Either part may be NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExpectedPrice {
    pub price: f64,
    /// Percentage points relative to the last close.
    pub increase_pct: f64,
}

impl ExpectedPrice {
    pub const UNDEFINED: Self = Self {
        price: f64::NAN,
        increase_pct: f64::NAN,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeLevels {
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

impl TradeLevels {
    pub const UNDEFINED: Self = Self {
        entry: f64::NAN,
        take_profit: f64::NAN,
        stop_loss: f64::NAN,
    };
}

/// Everything the pipeline produces for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairAnalysis {
    pub symbol: String,
    pub interval: String,
    /// Open time of the last bar.
    pub timestamp_ms: i64,
    pub bars: usize,
    pub last_close: f64,
    pub latest: Option<IndicatorRow>,
    pub signal: Signal,
    pub expected: ExpectedPrice,
    /// Linear-trend estimate of the next close.
    pub forecast: f64,
    pub levels: TradeLevels,
}

impl PairAnalysis {
    /// A buy whose expected increase clears `min_increase_pct`. NaN never passes.
    pub fn passes_scan(&self, min_increase_pct: f64) -> bool {
        self.signal.buy && self.expected.increase_pct >= min_increase_pct
    }
}
