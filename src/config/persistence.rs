//! File persistence configuration

/// Configuration for the booking database
pub struct BookingPersistenceConfig {
    /// SQLite file holding appointments
    pub db_path: &'static str,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

/// Configuration for indicator exports
pub struct ExportPersistenceConfig {
    /// Directory used when `--out` is a bare file name
    pub directory: &'static str,
}

/// The Master Persistence Configuration
pub struct PersistenceConfig {
    pub bookings: BookingPersistenceConfig,
    pub export: ExportPersistenceConfig,
}

pub const PERSISTENCE: PersistenceConfig = PersistenceConfig {
    bookings: BookingPersistenceConfig {
        db_path: "bookings.sqlite",
        max_connections: 2, // Low throughput
        busy_timeout_secs: 10,
    },
    export: ExportPersistenceConfig {
        directory: "exports",
    },
};
