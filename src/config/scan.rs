use crate::config::TradeLevelPcts;
use crate::domain::Interval;

pub struct ScanConfig {
    /// Expected increase (in percentage points) a buy candidate must clear.
    pub min_expected_increase_pct: f64,
    /// Upper bound on in-flight kline fetches.
    pub max_concurrent_fetches: usize,
    /// Size of the rayon pool used for indicator derivation.
    pub worker_threads: usize,
    pub default_interval: Interval,
    pub default_lookback_days: u32,
    pub trade_levels: TradeLevelPcts,
    /// Static pair list used when the caller gives none.
    pub default_pairs: &'static [&'static str],
}

pub const SCAN: ScanConfig = ScanConfig {
    min_expected_increase_pct: 5.0,
    max_concurrent_fetches: 10,
    worker_threads: 4,
    default_interval: Interval::H4,
    default_lookback_days: 51,
    trade_levels: TradeLevelPcts::DEFAULT,
    default_pairs: &[
        "BTCUSDT", "ETHUSDT", "BNBUSDT", "SOLUSDT", "XRPUSDT", "DOGEUSDT", "ADAUSDT", "AVAXUSDT",
        "LINKUSDT", "DOTUSDT", "TRXUSDT", "LTCUSDT", "BCHUSDT", "ATOMUSDT", "NEARUSDT", "APTUSDT",
        "ARBUSDT", "OPUSDT", "SUIUSDT", "PEPEUSDT",
    ],
};

pub struct StreamConfig {
    pub default_interval: Interval,
    /// Bars fetched over REST before the websocket takes over.
    pub warmup_bars: u32,
    /// Rolling series cap; older bars are dropped from the front.
    pub max_bars: usize,
}

pub const STREAM: StreamConfig = StreamConfig {
    default_interval: Interval::M1,
    warmup_bars: 200,
    max_bars: 1000,
};
