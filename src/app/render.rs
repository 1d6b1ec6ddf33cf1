use tabled::{Table, Tabled, settings::Style};

use crate::{
    analysis::CrossoverReport,
    booking::Appointment,
    engine::ScanSummary,
    models::PairAnalysis,
    utils::epoch_ms_to_utc,
};

/// Fixed decimals, or `n/a` for undefined values.
pub fn fmt_num(v: f64, decimals: usize) -> String {
    if v.is_finite() {
        format!("{:.*}", decimals, v)
    } else {
        "n/a".to_string()
    }
}

pub fn fmt_pct(v: f64) -> String {
    if v.is_finite() {
        format!("{:+.2}%", v)
    } else {
        "n/a".to_string()
    }
}

/// Price precision that still shows something for sub-cent coins.
fn price_decimals(price: f64) -> usize {
    match price.abs() {
        p if p >= 1000.0 => 2,
        p if p >= 1.0 => 4,
        p if p >= 0.01 => 6,
        _ => 8,
    }
}

fn fmt_price(v: f64) -> String {
    fmt_num(v, price_decimals(v))
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

pub fn analysis_table(a: &PairAnalysis) -> String {
    let nan = f64::NAN;
    let row = a.latest;
    let col = |f: fn(&crate::models::IndicatorRow) -> f64| row.as_ref().map(f).unwrap_or(nan);

    let rows = vec![
        FieldRow { field: "Pair", value: format!("{} @ {}", a.symbol, a.interval) },
        FieldRow { field: "Last bar", value: epoch_ms_to_utc(a.timestamp_ms) },
        FieldRow { field: "Bars", value: a.bars.to_string() },
        FieldRow { field: "Close", value: fmt_price(a.last_close) },
        FieldRow { field: "SMA 50", value: fmt_price(col(|r| r.sma_50)) },
        FieldRow { field: "EMA 50", value: fmt_price(col(|r| r.ema_50)) },
        FieldRow { field: "Bollinger upper", value: fmt_price(col(|r| r.bb_upper)) },
        FieldRow { field: "Bollinger lower", value: fmt_price(col(|r| r.bb_lower)) },
        FieldRow { field: "RSI 14", value: fmt_num(col(|r| r.rsi_14), 2) },
        FieldRow { field: "MACD", value: fmt_num(col(|r| r.macd_line), 6) },
        FieldRow { field: "MACD signal", value: fmt_num(col(|r| r.macd_signal), 6) },
        FieldRow { field: "ATR 14", value: fmt_price(col(|r| r.atr_14)) },
        FieldRow { field: "Stoch %K", value: fmt_num(col(|r| r.stoch_k), 2) },
        FieldRow { field: "Stoch %D", value: fmt_num(col(|r| r.stoch_d), 2) },
        FieldRow { field: "Signal", value: a.signal.label().to_string() },
        FieldRow { field: "Expected price", value: fmt_price(a.expected.price) },
        FieldRow { field: "Expected increase", value: fmt_pct(a.expected.increase_pct) },
        FieldRow { field: "Forecast (next close)", value: fmt_price(a.forecast) },
        FieldRow { field: "Entry", value: fmt_price(a.levels.entry) },
        FieldRow { field: "Take profit", value: fmt_price(a.levels.take_profit) },
        FieldRow { field: "Stop loss", value: fmt_price(a.levels.stop_loss) },
    ];

    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn crossover_table(r: &CrossoverReport) -> String {
    let mut rows = vec![
        FieldRow { field: "Pair", value: format!("{} @ {}", r.symbol, r.interval) },
        FieldRow { field: "Last bar", value: epoch_ms_to_utc(r.timestamp_ms) },
        FieldRow { field: "Close", value: fmt_price(r.last_close) },
    ];

    match (r.latest, r.levels) {
        (Some(c), Some(l)) => rows.extend([
            FieldRow { field: "Last crossover", value: format!("{} @ {}", c.direction, epoch_ms_to_utc(c.timestamp_ms)) },
            FieldRow { field: "Entry", value: fmt_price(l.entry) },
            FieldRow { field: "Stop loss", value: fmt_price(l.stop_loss) },
            FieldRow { field: "Target", value: fmt_price(l.target) },
        ]),
        _ => rows.push(FieldRow { field: "Last crossover", value: "none".to_string() }),
    }

    if let (Some(entry), Some(p)) = (r.entry_price, r.position) {
        let label = if p.profit_loss >= 0.0 { "Profit" } else { "Loss" };
        rows.extend([
            FieldRow { field: "Position", value: format!("{} USD @ {}", fmt_num(r.amount, 2), fmt_price(entry)) },
            FieldRow { field: label, value: format!("{} USD", fmt_num(p.profit_loss, 2)) },
            FieldRow { field: "Value", value: format!("{} USD", fmt_num(p.remaining, 2)) },
        ]);
    }

    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "Pair")]
    pair: String,
    #[tabled(rename = "Close")]
    close: String,
    #[tabled(rename = "Expected")]
    expected: String,
    #[tabled(rename = "Increase")]
    increase: String,
    #[tabled(rename = "Take profit")]
    take_profit: String,
    #[tabled(rename = "Stop loss")]
    stop_loss: String,
    #[tabled(rename = "Forecast")]
    forecast: String,
}

pub fn scan_table(summary: &ScanSummary) -> String {
    let rows: Vec<MatchRow> = summary
        .sorted_matches()
        .into_iter()
        .map(|a| MatchRow {
            pair: a.symbol.clone(),
            close: fmt_price(a.last_close),
            expected: fmt_price(a.expected.price),
            increase: fmt_pct(a.expected.increase_pct),
            take_profit: fmt_price(a.levels.take_profit),
            stop_loss: fmt_price(a.levels.stop_loss),
            forecast: fmt_price(a.forecast),
        })
        .collect();

    let header = format!(
        "Scanned {} pairs: {} with data, {} analysed, {} buy candidates",
        summary.requested,
        summary.fetched,
        summary.analysed,
        summary.matches.len()
    );

    if rows.is_empty() {
        return header;
    }
    format!("{}\n{}", header, Table::new(rows).with(Style::rounded()))
}

/// One line per live tick.
pub fn stream_line(a: &PairAnalysis) -> String {
    format!(
        "{} {} close {} | {} | expected {} ({}) | TP {} SL {}",
        epoch_ms_to_utc(a.timestamp_ms),
        a.symbol,
        fmt_price(a.last_close),
        a.signal.label(),
        fmt_price(a.expected.price),
        fmt_pct(a.expected.increase_pct),
        fmt_price(a.levels.take_profit),
        fmt_price(a.levels.stop_loss),
    )
}

#[derive(Tabled)]
struct AppointmentRow {
    #[tabled(rename = "#")]
    id: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Status")]
    status: String,
}

pub fn appointments_table(appointments: &[Appointment]) -> String {
    if appointments.is_empty() {
        return "No appointments.".to_string();
    }

    let rows: Vec<AppointmentRow> = appointments
        .iter()
        .map(|a| AppointmentRow {
            id: a.id,
            date: a.date.to_string(),
            time: a.time.format(crate::booking::TIME_FORMAT).to_string(),
            name: a.name.clone(),
            phone: a.phone.clone(),
            service: a.service.clone(),
            status: a.status.to_string(),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_numbers_print_na() {
        assert_eq!(fmt_num(f64::NAN, 2), "n/a");
        assert_eq!(fmt_num(f64::INFINITY, 2), "n/a");
        assert_eq!(fmt_num(1.23456, 2), "1.23");
        assert_eq!(fmt_pct(5.0), "+5.00%");
        assert_eq!(fmt_pct(f64::NAN), "n/a");
    }

    #[test]
    fn price_precision_scales() {
        assert_eq!(fmt_price(65432.123), "65432.12");
        assert_eq!(fmt_price(0.00001234), "0.00001234");
    }

    #[test]
    fn crossover_without_history_says_none() {
        let report = CrossoverReport {
            symbol: "BTCUSDT".into(),
            interval: "4h".into(),
            timestamp_ms: 0,
            last_close: 100.0,
            latest: None,
            levels: None,
            amount: 50.0,
            entry_price: Some(80.0),
            position: Some(crate::analysis::profit_loss(Some(80.0), 100.0, 50.0)),
        };
        let text = crossover_table(&report);
        assert!(text.contains("none"));
        assert!(text.contains("Profit"));
        assert!(text.contains("62.50 USD"));
    }

    #[test]
    fn empty_scan_prints_header_only() {
        let text = scan_table(&ScanSummary {
            requested: 3,
            fetched: 1,
            analysed: 1,
            matches: vec![],
        });
        assert_eq!(
            text,
            "Scanned 3 pairs: 1 with data, 1 analysed, 0 buy candidates"
        );
    }
}
