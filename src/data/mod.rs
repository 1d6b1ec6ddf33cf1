mod bn_kline;
mod bn_symbols;
mod price_stream;
mod provider;
mod rate_limiter;

pub use {
    bn_kline::{BNKline, KlineError, load_klines, try_interval_from_ms},
    bn_symbols::{fetch_usdt_pairs, usdt_symbols},
    price_stream::{LiveAnalysisStream, build_stream_url, parse_kline_message},
    provider::{BinanceProvider, MarketDataProvider, acquire_series},
    rate_limiter::GlobalRateLimiter,
};
