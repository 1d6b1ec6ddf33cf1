mod scanner;

pub use scanner::{ScanRequest, ScanSummary, scan_symbols};
