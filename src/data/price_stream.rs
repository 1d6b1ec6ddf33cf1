use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;
use futures::StreamExt;
use tokio::runtime::Runtime;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::{
    analysis::analyze_series,
    config::{BINANCE, DF, INDICATORS, STREAM, TradeLevelPcts},
    data::{MarketDataProvider, acquire_series},
    domain::{AnalysisContext, Interval, PairInterval},
    models::{LiveCandle, OhlcvTimeSeries, PairAnalysis},
    utils::{format_duration, now_utc},
};

#[derive(Debug, PartialEq)]
enum StreamExit {
    /// Socket closed or errored; worth reconnecting.
    Disconnected,
    /// Nobody is listening any more.
    ReceiverDropped,
}

/// Follows one symbol's kline websocket, keeps a rolling series and sends a
/// fresh `PairAnalysis` on every tick once enough history is held.
pub struct LiveAnalysisStream {
    symbol: String,
    interval: Interval,
    pcts: TradeLevelPcts,
    tx: Sender<PairAnalysis>,
}

/// `wss://.../ws/btcusdt@kline_1m`
pub fn build_stream_url(symbol: &str, interval: Interval) -> String {
    format!(
        "{}{}@kline_{}",
        BINANCE.ws.raw_base_url,
        symbol.to_lowercase(),
        interval
    )
}

/// Parses a raw-stream kline event (`{"e":"kline","s":..,"k":{..}}`).
pub fn parse_kline_message(text: &str) -> Result<LiveCandle> {
    let v: serde_json::Value = serde_json::from_str(text).context("not JSON")?;
    let k = v.get("k").context("no kline payload")?;

    let price = |field: &str| -> Result<f64> {
        k[field]
            .as_str()
            .with_context(|| format!("missing field {}", field))?
            .parse::<f64>()
            .with_context(|| format!("bad number in field {}", field))
    };

    Ok(LiveCandle {
        symbol: v["s"].as_str().context("missing symbol")?.to_uppercase(),
        open_time: k["t"].as_i64().context("missing open time")?,
        open: price("o")?,
        high: price("h")?,
        low: price("l")?,
        close: price("c")?,
        volume: price("v")?,
        is_closed: k["x"].as_bool().unwrap_or(false),
    })
}

/// Folds one tick into the rolling series and analyses it when long enough.
pub(crate) fn apply_tick(
    series: &mut OhlcvTimeSeries,
    candle: &LiveCandle,
    pcts: &TradeLevelPcts,
) -> Option<PairAnalysis> {
    series.update_from_live(candle);
    series.truncate_front(STREAM.max_bars);

    if series.len() < INDICATORS.min_bars {
        return None;
    }

    match analyze_series(series, pcts) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            log::warn!("{}: live analysis failed: {:#}", series.pair_interval, e);
            None
        }
    }
}

impl LiveAnalysisStream {
    pub fn new(symbol: impl Into<String>, interval: Interval, tx: Sender<PairAnalysis>) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            interval,
            pcts: TradeLevelPcts::default(),
            tx,
        }
    }

    pub fn with_trade_levels(mut self, pcts: TradeLevelPcts) -> Self {
        self.pcts = pcts;
        self
    }

    /// Runs the stream on a dedicated thread with its own runtime.
    pub fn spawn(self, provider: Arc<dyn MarketDataProvider>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let rt = match Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create stream runtime: {}", e);
                    return;
                }
            };
            rt.block_on(self.run(provider.as_ref()));
        })
    }

    /// Warms up over REST, then follows the websocket until the receiver goes away.
    pub async fn run(self, provider: &dyn MarketDataProvider) {
        let mut series = self.warm_up(provider).await;
        let url = build_stream_url(&self.symbol, self.interval);
        let mut reconnect_delay = BINANCE.ws.initial_reconnect_delay_sec;

        loop {
            if DF.log_stream_ticks {
                log::info!("Connecting to {}", url);
            }

            match self.run_once(&url, &mut series).await {
                Ok(StreamExit::ReceiverDropped) => {
                    log::info!("{}: receiver dropped, stopping stream", self.symbol);
                    return;
                }
                Ok(StreamExit::Disconnected) => {
                    log::warn!("WebSocket closed normally. Reconnecting...");
                    reconnect_delay = BINANCE.ws.initial_reconnect_delay_sec;
                }
                Err(e) => {
                    log::error!(
                        "WebSocket connection failed: {:#}. Retrying in {}...",
                        e,
                        format_duration(reconnect_delay as i64 * 1000)
                    );
                }
            }

            sleep(Duration::from_secs(reconnect_delay)).await;
            reconnect_delay = (reconnect_delay * 2).min(BINANCE.ws.max_reconnect_delay_sec);
        }
    }

    async fn warm_up(&self, provider: &dyn MarketDataProvider) -> OhlcvTimeSeries {
        let end = now_utc();
        let span_ms = self.interval.as_ms() * i64::from(STREAM.warmup_bars);
        let start = end - ChronoDuration::milliseconds(span_ms);

        match AnalysisContext::new(self.symbol.clone(), self.interval, start, end) {
            Ok(ctx) => {
                let series = acquire_series(provider, &ctx).await;
                log::info!(
                    "{}: warmed up with {} bars",
                    ctx.pair_interval(),
                    series.len()
                );
                series
            }
            Err(e) => {
                log::warn!("{}: skipping warm-up: {:#}", self.symbol, e);
                OhlcvTimeSeries::empty(PairInterval::new(self.symbol.clone(), self.interval.as_ms()))
            }
        }
    }

    async fn run_once(&self, url: &str, series: &mut OhlcvTimeSeries) -> Result<StreamExit> {
        let (ws_stream, _) = connect_async(url).await?;
        let (_write, mut read) = ws_stream.split();

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let candle = match parse_kline_message(&text) {
                        Ok(c) => c,
                        Err(e) => {
                            log::warn!("⚠️ Skipping malformed WebSocket message: {:#}", e);
                            continue;
                        }
                    };
                    if candle.symbol != self.symbol {
                        continue;
                    }

                    if DF.log_stream_ticks {
                        log::info!(
                            "[kline-tick] {} {} -> {:.6}{}",
                            candle.symbol,
                            candle.open_time,
                            candle.close,
                            if candle.is_closed { " (closed)" } else { "" }
                        );
                    }

                    if let Some(analysis) = apply_tick(series, &candle, &self.pcts)
                        && self.tx.send(analysis).is_err()
                    {
                        return Ok(StreamExit::ReceiverDropped);
                    }
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(_)) => break,
                Err(e) => {
                    log::error!("WebSocket error: {}", e);
                    return Err(e.into());
                }
                _ => {}
            }
        }

        Ok(StreamExit::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Candle;

    const SAMPLE: &str = r#"{
        "e":"kline","E":1700000000100,"s":"BTCUSDT",
        "k":{"t":1700000000000,"T":1700000059999,"s":"BTCUSDT","i":"1m",
             "o":"100.0","c":"101.5","h":"102.0","l":"99.5","v":"12.5","x":false}
    }"#;

    #[test]
    fn builds_raw_stream_url() {
        assert_eq!(
            build_stream_url("BTCUSDT", Interval::M1),
            "wss://stream.binance.com:9443/ws/btcusdt@kline_1m"
        );
    }

    #[test]
    fn parses_kline_event() {
        let c = parse_kline_message(SAMPLE).unwrap();
        assert_eq!(c.symbol, "BTCUSDT");
        assert_eq!(c.open_time, 1_700_000_000_000);
        assert_eq!(c.close, 101.5);
        assert_eq!(c.high, 102.0);
        assert!(!c.is_closed);
    }

    #[test]
    fn rejects_malformed_messages() {
        assert!(parse_kline_message("not json").is_err());
        assert!(parse_kline_message(r#"{"result":null,"id":1}"#).is_err());
        let bad = SAMPLE.replace(r#""c":"101.5""#, r#""c":"oops""#);
        assert!(parse_kline_message(&bad).is_err());
    }

    fn live(ts: i64, close: f64) -> LiveCandle {
        LiveCandle {
            symbol: "BTCUSDT".into(),
            open_time: ts,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1.0,
            is_closed: true,
        }
    }

    #[test]
    fn analyses_once_history_is_long_enough() {
        let candles = (0..50)
            .map(|i| Candle::new(i * 60_000, 100.0, 101.0, 99.0, 100.0 + i as f64, 1.0))
            .collect();
        let mut series =
            OhlcvTimeSeries::from_candles(PairInterval::new("BTCUSDT", 60_000), candles);
        let pcts = TradeLevelPcts::default();

        // Update of the forming bar: still 50 bars
        assert!(apply_tick(&mut series, &live(49 * 60_000, 150.0), &pcts).is_none());
        // New bar: 51 bars, analysis produced
        let analysis = apply_tick(&mut series, &live(50 * 60_000, 151.0), &pcts).unwrap();
        assert_eq!(analysis.bars, 51);
        assert_eq!(analysis.last_close, 151.0);
    }

    #[test]
    fn rolling_series_is_capped() {
        let full = STREAM.max_bars as i64;
        let candles = (0..full)
            .map(|i| Candle::new(i * 60_000, 100.0, 101.0, 99.0, 100.0 + (i % 7) as f64, 1.0))
            .collect();
        let mut series =
            OhlcvTimeSeries::from_candles(PairInterval::new("BTCUSDT", 60_000), candles);
        let pcts = TradeLevelPcts::default();
        for i in full..full + 5 {
            assert!(apply_tick(&mut series, &live(i * 60_000, 100.0), &pcts).is_some());
        }
        assert_eq!(series.len(), STREAM.max_bars);
        assert_eq!(series.timestamps[0], 5 * 60_000);
    }
}
