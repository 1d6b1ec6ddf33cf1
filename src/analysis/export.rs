use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::{
    analysis::signal_column,
    models::{IndicatorFrame, OhlcvTimeSeries},
    utils::{TimeUtils, epoch_ms_to_utc},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum ExportFormat {
    #[default]
    #[strum(serialize = "csv")]
    Csv,
    #[strum(serialize = "json")]
    Json,
}

/// Series plus its derived columns, laid out for a chart renderer.
#[derive(Serialize)]
struct ExportDocument<'a> {
    symbol: &'a str,
    interval: &'a str,
    bars: usize,
    series: &'a OhlcvTimeSeries,
    indicators: &'a IndicatorFrame,
}

/// Line-buffered CSV writer. NaN becomes an empty field.
pub struct CsvReport {
    buffer: Vec<String>,
}

const CSV_HEADER: &str = "timestamp_ms,time_utc,open,high,low,close,volume,\
sma_50,ema_50,bb_middle,bb_upper,bb_lower,rsi_14,macd_line,macd_signal,macd_histogram,\
true_range,atr_14,stoch_k,stoch_d,buy,sell";

fn field(v: f64) -> String {
    if v.is_nan() { String::new() } else { v.to_string() }
}

impl CsvReport {
    pub fn new() -> Self {
        Self {
            buffer: vec![CSV_HEADER.to_string()],
        }
    }

    pub fn build(series: &OhlcvTimeSeries, frame: &IndicatorFrame) -> Result<Self> {
        if series.len() != frame.len() {
            bail!(
                "{}: frame has {} rows for {} bars",
                series.pair_interval,
                frame.len(),
                series.len()
            );
        }

        let mut report = Self::new();
        let signals = signal_column(frame);
        for ((candle, row), signal) in series.candles().zip(frame.rows()).zip(signals) {
            let values = [
                candle.open_price,
                candle.high_price,
                candle.low_price,
                candle.close_price,
                candle.volume,
                row.sma_50,
                row.ema_50,
                row.bb_middle,
                row.bb_upper,
                row.bb_lower,
                row.rsi_14,
                row.macd_line,
                row.macd_signal,
                row.macd_histogram,
                row.true_range,
                row.atr_14,
                row.stoch_k,
                row.stoch_d,
            ];
            let mut line = format!("{},{}", candle.timestamp_ms, epoch_ms_to_utc(candle.timestamp_ms));
            for v in values {
                line.push(',');
                line.push_str(&field(v));
            }
            line.push_str(&format!(",{},{}", signal.buy, signal.sell));
            report.buffer.push(line);
        }
        Ok(report)
    }

    pub fn rows(&self) -> usize {
        self.buffer.len().saturating_sub(1)
    }

    pub fn into_string(self) -> String {
        let mut out = self.buffer.join("\n");
        out.push('\n');
        out
    }
}

impl Default for CsvReport {
    fn default() -> Self {
        Self::new()
    }
}

pub fn to_json(series: &OhlcvTimeSeries, frame: &IndicatorFrame) -> Result<String> {
    let doc = ExportDocument {
        symbol: series.pair_interval.name(),
        interval: TimeUtils::interval_to_string(series.pair_interval.interval_ms),
        bars: series.len(),
        series,
        indicators: frame,
    };
    serde_json::to_string_pretty(&doc).context("Failed to serialise export document")
}

/// Writes the series and its indicator frame to `path`, creating parent directories.
pub fn write_export(
    path: &Path,
    series: &OhlcvTimeSeries,
    frame: &IndicatorFrame,
    format: ExportFormat,
) -> Result<()> {
    let body = match format {
        ExportFormat::Csv => CsvReport::build(series, frame)?.into_string(),
        ExportFormat::Json => to_json(series, frame)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!(
        "Exported {} bars of {} to {} ({})",
        series.len(),
        series.pair_interval,
        path.display(),
        format
    );
    Ok(())
}
