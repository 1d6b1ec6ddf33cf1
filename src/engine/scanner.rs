use std::panic;
use std::sync::Arc;

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use futures::{StreamExt, stream};
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

use crate::{
    analysis::analyze_series,
    config::{DF, SCAN, TradeLevelPcts},
    data::{MarketDataProvider, acquire_series},
    domain::{AnalysisContext, Interval, lookback_range},
    models::{OhlcvTimeSeries, PairAnalysis},
    utils::now_utc,
};

/// One batch scan: which symbols, over which bars, and how picky to be.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub symbols: Vec<String>,
    pub interval: Interval,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub min_expected_increase_pct: f64,
    pub max_concurrent_fetches: usize,
    pub worker_threads: usize,
    pub trade_pcts: TradeLevelPcts,
}

impl ScanRequest {
    /// Symbols are trimmed, upper-cased and de-duplicated; blanks are dropped.
    pub fn new<S: AsRef<str>>(
        symbols: &[S],
        interval: Interval,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Self> {
        if start >= end {
            bail!("Invalid date range: start {} is not before end {}", start, end);
        }

        let symbols: Vec<String> = symbols
            .iter()
            .map(|s| s.as_ref().trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unique()
            .collect();

        Ok(Self {
            symbols,
            interval,
            start,
            end,
            min_expected_increase_pct: SCAN.min_expected_increase_pct,
            max_concurrent_fetches: SCAN.max_concurrent_fetches,
            worker_threads: SCAN.worker_threads,
            trade_pcts: SCAN.trade_levels,
        })
    }

    pub fn lookback<S: AsRef<str>>(symbols: &[S], interval: Interval, days: u32) -> Result<Self> {
        let (start, end) = lookback_range(now_utc(), days)?;
        Self::new(symbols, interval, start, end)
    }

    pub fn context_for(&self, symbol: &str) -> Result<AnalysisContext> {
        AnalysisContext::new(symbol, self.interval, self.start, self.end)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanSummary {
    pub requested: usize,
    /// Symbols that came back with enough history.
    pub fetched: usize,
    pub analysed: usize,
    pub matches: Vec<PairAnalysis>,
}

impl ScanSummary {
    /// Matches with the largest expected increase first.
    pub fn sorted_matches(&self) -> Vec<&PairAnalysis> {
        self.matches
            .iter()
            .sorted_by(|a, b| b.expected.increase_pct.total_cmp(&a.expected.increase_pct))
            .collect()
    }
}

/// Fetches every requested symbol with bounded concurrency, analyses them on a
/// bounded rayon pool and keeps the buy candidates. Failures are per symbol:
/// they are logged and the rest of the batch carries on.
pub async fn scan_symbols(provider: Arc<dyn MarketDataProvider>, req: &ScanRequest) -> ScanSummary {
    let contexts: Vec<AnalysisContext> = req
        .symbols
        .iter()
        .filter_map(|symbol| match req.context_for(symbol) {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::warn!("{}: skipped: {:#}", symbol, e);
                None
            }
        })
        .collect();

    let series: Vec<OhlcvTimeSeries> = stream::iter(contexts)
        .map(|ctx| {
            let provider = provider.clone();
            tokio::spawn(async move { acquire_series(provider.as_ref(), &ctx).await })
        })
        .buffer_unordered(req.max_concurrent_fetches.max(1))
        .filter_map(|joined| async move {
            match joined {
                Ok(series) => Some(series),
                Err(e) => {
                    log::error!("Fetch task failed: {}", e);
                    None
                }
            }
        })
        .filter(|series| std::future::ready(!series.is_empty()))
        .collect()
        .await;

    let fetched = series.len();
    let workers = req.worker_threads.max(1);
    let pcts = req.trade_pcts;

    let analysed = match tokio::task::spawn_blocking(move || analyse_batch(series, workers, &pcts))
        .await
    {
        Ok(analysed) => analysed,
        Err(e) => {
            log::error!("Analysis batch failed: {}", e);
            Vec::new()
        }
    };

    let analysed_count = analysed.len();
    let threshold = req.min_expected_increase_pct;
    let matches = analysed
        .into_iter()
        .filter(|a| {
            let keep = a.passes_scan(threshold);
            if !keep && DF.log_scan_rejections {
                log::info!(
                    "{}: not reported (signal {}, expected {:.2}%)",
                    a.symbol,
                    a.signal.label(),
                    a.expected.increase_pct
                );
            }
            keep
        })
        .collect();

    ScanSummary {
        requested: req.symbols.len(),
        fetched,
        analysed: analysed_count,
        matches,
    }
}

fn analyse_batch(
    series: Vec<OhlcvTimeSeries>,
    workers: usize,
    pcts: &TradeLevelPcts,
) -> Vec<PairAnalysis> {
    let run = || -> Vec<PairAnalysis> {
        series
            .par_iter()
            .filter_map(|s| match panic::catch_unwind(|| analyze_series(s, pcts)) {
                Ok(Ok(analysis)) => Some(analysis),
                Ok(Err(e)) => {
                    log::warn!("{}: analysis failed: {:#}", s.pair_interval, e);
                    None
                }
                Err(_) => {
                    log::error!("{}: analysis panicked", s.pair_interval);
                    None
                }
            })
            .collect()
    };

    crate::trace_time!("analyse_batch", 1_000_000, {
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(run),
            Err(e) => {
                log::warn!("Could not build a {}-thread pool ({}), using the global one", workers, e);
                run()
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn request_normalises_symbols() {
        let req = ScanRequest::lookback(&[" btcusdt", "ETHUSDT", "", "BTCUSDT"], Interval::H4, 51)
            .unwrap();
        assert_eq!(req.symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(req.min_expected_increase_pct, 5.0);
        assert_eq!(req.end - req.start, Duration::days(51));
        assert_eq!(req.context_for("BTCUSDT").unwrap().interval, Interval::H4);
    }

    #[test]
    fn request_rejects_bad_range() {
        let now = now_utc();
        assert!(ScanRequest::new(&["BTCUSDT"], Interval::H1, now, now).is_err());
        assert!(ScanRequest::lookback(&["BTCUSDT"], Interval::H1, 200_000_000).is_err());
    }

    #[test]
    fn matches_sort_by_expected_increase() {
        use crate::models::{ExpectedPrice, Signal, TradeLevels};

        let hit = |symbol: &str, increase_pct: f64| PairAnalysis {
            symbol: symbol.into(),
            interval: "4h".into(),
            timestamp_ms: 0,
            bars: 60,
            last_close: 1.0,
            latest: None,
            signal: Signal { buy: true, sell: false },
            expected: ExpectedPrice {
                price: 1.0,
                increase_pct,
            },
            forecast: 1.0,
            levels: TradeLevels::UNDEFINED,
        };
        let summary = ScanSummary {
            requested: 3,
            fetched: 3,
            analysed: 3,
            matches: vec![hit("A", 6.0), hit("B", 20.0), hit("C", 9.5)],
        };
        let order: Vec<&str> = summary
            .sorted_matches()
            .iter()
            .map(|a| a.symbol.as_str())
            .collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }
}
