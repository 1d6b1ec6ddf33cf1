//! Debugging feature flags.

pub struct LogFlags {
    /// Log every REST kline page (symbol, start time, batch size).
    pub log_kline_paging: bool,

    /// Emit verbose logging for live stream connections and ticks.
    pub log_stream_ticks: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,

    /// Log why each scanned symbol was not reported.
    pub log_scan_rejections: bool,

    /// Log booking store activity
    pub log_bookings: bool,
}

pub const DF: LogFlags = LogFlags {
    log_kline_paging: false,
    log_stream_ticks: false,
    log_performance: false,
    log_scan_rejections: true,
    log_bookings: false,
};
