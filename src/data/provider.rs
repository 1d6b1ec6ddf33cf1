use anyhow::Result;
use async_trait::async_trait;

use crate::{
    config::INDICATORS,
    data::{GlobalRateLimiter, fetch_usdt_pairs, load_klines},
    domain::{AnalysisContext, Candle, PairInterval},
    models::OhlcvTimeSeries,
};

/// Abstract interface for fetching market data.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch candles for a pair whose open time falls in `[start_ms, end_ms]`.
    async fn fetch_candles(
        &self,
        pair: &str,
        interval_ms: i64,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Candle>>;
}

pub struct BinanceProvider {
    limiter: GlobalRateLimiter,
}

impl BinanceProvider {
    pub fn new(limiter: GlobalRateLimiter) -> Self {
        Self { limiter }
    }

    /// Every USDT spot pair, sharing this provider's weight budget. Empty on failure.
    pub async fn usdt_pairs(&self) -> Vec<String> {
        fetch_usdt_pairs(&self.limiter).await
    }
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self::new(GlobalRateLimiter::default())
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    async fn fetch_candles(
        &self,
        pair: &str,
        interval_ms: i64,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Candle>> {
        let pair_interval = PairInterval::new(pair, interval_ms);
        let klines = load_klines(&pair_interval, start_ms, end_ms, &self.limiter).await?;
        Ok(klines.into_iter().map(Candle::from).collect())
    }
}

/// Fetches the bars for `ctx`. Never fails: provider errors and histories too
/// short to analyse are logged and come back as an empty series.
pub async fn acquire_series(
    provider: &dyn MarketDataProvider,
    ctx: &AnalysisContext,
) -> OhlcvTimeSeries {
    let pair_interval = ctx.pair_interval();

    // Both ends are inclusive, so the range holds one bar more than it spans
    let capacity = ctx.expected_bars() + 1;
    if capacity < INDICATORS.min_bars {
        log::warn!(
            "{}: range holds at most {} bars (need {}), widen --days",
            pair_interval,
            capacity,
            INDICATORS.min_bars
        );
        return OhlcvTimeSeries::empty(pair_interval);
    }

    let fetched = crate::trace_time!("acquire_series", 2_000_000, {
        provider
            .fetch_candles(
                &ctx.symbol,
                ctx.interval.as_ms(),
                ctx.start_ms(),
                ctx.end_ms(),
            )
            .await
    });

    let candles = match fetched {
        Ok(candles) => candles,
        Err(e) => {
            log::warn!("{}: fetch failed: {:#}", pair_interval, e);
            return OhlcvTimeSeries::empty(pair_interval);
        }
    };

    let series = OhlcvTimeSeries::from_candles(pair_interval.clone(), candles);
    if series.len() < INDICATORS.min_bars {
        log::warn!(
            "{}: only {} bars returned (need {}), skipping",
            pair_interval,
            series.len(),
            INDICATORS.min_bars
        );
        return OhlcvTimeSeries::empty(pair_interval);
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Interval;
    use anyhow::bail;

    struct StubProvider {
        bars: usize,
        fail: bool,
    }

    #[async_trait]
    impl MarketDataProvider for StubProvider {
        async fn fetch_candles(
            &self,
            _pair: &str,
            interval_ms: i64,
            start_ms: i64,
            _end_ms: i64,
        ) -> Result<Vec<Candle>> {
            if self.fail {
                bail!("connection refused");
            }
            Ok((0..self.bars)
                .map(|i| {
                    let ts = start_ms + i as i64 * interval_ms;
                    Candle::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0)
                })
                .collect())
        }
    }

    fn ctx() -> AnalysisContext {
        AnalysisContext::lookback("BTCUSDT", Interval::H4, 51).unwrap()
    }

    #[tokio::test]
    async fn provider_error_gives_empty_series() {
        let provider = StubProvider { bars: 0, fail: true };
        let series = acquire_series(&provider, &ctx()).await;
        assert!(series.is_empty());
        assert_eq!(series.pair_interval.name(), "BTCUSDT");
    }

    #[tokio::test]
    async fn short_history_gives_empty_series() {
        let provider = StubProvider { bars: 50, fail: false };
        assert!(acquire_series(&provider, &ctx()).await.is_empty());
    }

    #[tokio::test]
    async fn range_too_narrow_is_not_fetched() {
        // 5 days of 4h bars can never reach the minimum
        let narrow = AnalysisContext::lookback("BTCUSDT", Interval::H4, 5).unwrap();
        let provider = StubProvider { bars: 60, fail: false };
        assert!(acquire_series(&provider, &narrow).await.is_empty());
    }

    #[tokio::test]
    async fn enough_history_passes_through() {
        let provider = StubProvider { bars: 51, fail: false };
        let series = acquire_series(&provider, &ctx()).await;
        assert_eq!(series.len(), 51);
        assert!(series.validate().is_ok());
    }
}
