use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, mpsc};

use anyhow::{Context, Result, bail};

use crate::{
    analysis::{ExportFormat, analyze_frame, crossover_report, derive_indicators, write_export},
    app::render,
    booking::{AppointmentStatus, AppointmentStore, NewAppointment, SqliteAppointmentStore},
    config::{PERSISTENCE, SCAN},
    data::{BinanceProvider, LiveAnalysisStream, MarketDataProvider, acquire_series},
    domain::{AnalysisContext, Interval},
    engine::{ScanRequest, scan_symbols},
    models::OhlcvTimeSeries,
};

async fn fetch(symbol: &str, interval: Interval, days: u32) -> Result<Option<OhlcvTimeSeries>> {
    let ctx = AnalysisContext::lookback(symbol, interval, days)?;
    let provider = BinanceProvider::default();
    let series = acquire_series(&provider, &ctx).await;
    if series.is_empty() {
        println!(
            "No usable data for {} over the last {} days.",
            ctx.pair_interval(),
            days
        );
        return Ok(None);
    }
    Ok(Some(series))
}

pub async fn analyze(symbol: &str, interval: Interval, days: u32, json: bool) -> Result<()> {
    let Some(series) = fetch(symbol, interval, days).await? else {
        return Ok(());
    };

    let frame = derive_indicators(&series);
    let analysis = analyze_frame(&series, &frame, &SCAN.trade_levels)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", render::analysis_table(&analysis));
    }
    Ok(())
}

pub async fn crossover(
    symbol: &str,
    interval: Interval,
    days: u32,
    amount: f64,
    entry: Option<f64>,
    json: bool,
) -> Result<()> {
    if !(amount.is_finite() && amount > 0.0) {
        bail!("--amount must be a positive number, got {}", amount);
    }
    if let Some(price) = entry
        && !(price.is_finite() && price > 0.0)
    {
        bail!("--entry must be a positive price, got {}", price);
    }

    let Some(series) = fetch(symbol, interval, days).await? else {
        return Ok(());
    };

    let frame = derive_indicators(&series);
    let report = crossover_report(&series, &frame, amount, entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render::crossover_table(&report));
    }
    Ok(())
}

/// One pair per line; blank lines and `#` comments are skipped.
pub fn read_pairs_file(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pairs file {}", path.display()))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Explicit symbols plus the pairs file; the built-in list when both are empty.
pub fn resolve_symbols(symbols: Vec<String>, pairs_file: Option<&Path>) -> Result<Vec<String>> {
    let mut all = symbols;
    if let Some(path) = pairs_file {
        all.extend(read_pairs_file(path)?);
    }
    if all.iter().all(|s| s.trim().is_empty()) {
        all = SCAN.default_pairs.iter().map(|s| s.to_string()).collect();
    }
    Ok(all)
}

pub async fn scan(
    interval: Interval,
    days: u32,
    symbols: Vec<String>,
    pairs_file: Option<PathBuf>,
    all_usdt: bool,
    json: bool,
) -> Result<()> {
    let binance = Arc::new(BinanceProvider::default());

    let mut symbols = symbols;
    if all_usdt {
        let listed = binance.usdt_pairs().await;
        if listed.is_empty() {
            println!("Could not list the exchange's USDT pairs; nothing to scan.");
            return Ok(());
        }
        symbols.extend(listed);
    }

    let symbols = resolve_symbols(symbols, pairs_file.as_deref())?;
    let request = ScanRequest::lookback(&symbols, interval, days)?;

    log::info!(
        "Scanning {} pairs @ {} over {} days",
        request.symbols.len(),
        interval,
        days
    );

    let provider: Arc<dyn MarketDataProvider> = binance;
    let summary = scan_symbols(provider, &request).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render::scan_table(&summary));
    }
    Ok(())
}

/// Bare file names land in the export directory.
pub fn resolve_export_path(out: &Path) -> PathBuf {
    let bare = out
        .parent()
        .map(|p| p.as_os_str().is_empty())
        .unwrap_or(true);
    if bare && !out.is_absolute() {
        Path::new(PERSISTENCE.export.directory).join(out)
    } else {
        out.to_path_buf()
    }
}

pub async fn export(
    symbol: &str,
    interval: Interval,
    days: u32,
    out: &Path,
    format: ExportFormat,
) -> Result<()> {
    let Some(series) = fetch(symbol, interval, days).await? else {
        return Ok(());
    };

    let frame = derive_indicators(&series);
    let path = resolve_export_path(out);
    write_export(&path, &series, &frame, format)?;
    println!("Wrote {} bars to {}", series.len(), path.display());
    Ok(())
}

pub async fn stream(symbol: &str, interval: Interval) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let provider: Arc<dyn MarketDataProvider> = Arc::new(BinanceProvider::default());
    let handle = LiveAnalysisStream::new(symbol, interval, tx)
        .with_trade_levels(SCAN.trade_levels)
        .spawn(provider);

    println!("Streaming {} @ {} (Ctrl-C to stop)...", symbol.to_uppercase(), interval);

    tokio::task::spawn_blocking(move || {
        for analysis in rx {
            println!("{}", render::stream_line(&analysis));
        }
    })
    .await
    .context("Stream printer stopped")?;

    if handle.join().is_err() {
        bail!("Stream thread panicked");
    }
    Ok(())
}

pub async fn add_booking(
    store: &dyn AppointmentStore,
    name: &str,
    phone: &str,
    date: &str,
    time: &str,
    service: &str,
) -> Result<()> {
    let new = NewAppointment::parse(name, phone, date, time, service)?;
    let appointment = store.create(new).await?;
    println!(
        "Booked #{}: {} on {} at {} ({})",
        appointment.id,
        appointment.name,
        appointment.date,
        appointment.time.format(crate::booking::TIME_FORMAT),
        appointment.status
    );
    Ok(())
}

pub async fn list_bookings(store: &dyn AppointmentStore, json: bool) -> Result<()> {
    let appointments = store.list().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&appointments)?);
    } else {
        println!("{}", render::appointments_table(&appointments));
    }
    Ok(())
}

pub async fn set_booking_status(
    store: &dyn AppointmentStore,
    id: i64,
    status: AppointmentStatus,
) -> Result<()> {
    if !store.update_status(id, status).await? {
        bail!("Appointment #{} not found or no longer pending", id);
    }
    println!("Appointment #{} is now {}", id, status);
    Ok(())
}

pub async fn delete_booking(store: &dyn AppointmentStore, id: i64) -> Result<()> {
    if !store.delete(id).await? {
        bail!("Appointment #{} not found", id);
    }
    println!("Deleted appointment #{}", id);
    Ok(())
}

pub async fn open_bookings(db: &Path) -> Result<SqliteAppointmentStore> {
    let path = db
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db.display()))?;
    SqliteAppointmentStore::open(path).await
}
