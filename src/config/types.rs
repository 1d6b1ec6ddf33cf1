//! Small value types shared by config and analysis.

use serde::{Deserialize, Serialize};

/// A fraction clamped to 0..=1 (0.05 means 5%).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Pct(f64);

impl Pct {
    pub const fn new(val: f64) -> Self {
        let v = if val < 0.0 {
            0.0
        } else if val > 1.0 {
            1.0
        } else {
            val
        };
        Self(v)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Pct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0 * 100.)
    }
}

/// Offsets used to place entry, take-profit and stop-loss around the last close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeLevelPcts {
    /// Carried for reporting; the entry itself is the last close.
    pub entry_pct: Pct,
    pub take_profit_pct: Pct,
    pub stop_loss_pct: Pct,
}

impl TradeLevelPcts {
    pub const DEFAULT: Self = Self {
        entry_pct: Pct::new(0.02),
        take_profit_pct: Pct::new(0.05),
        stop_loss_pct: Pct::new(0.02),
    };
}

impl Default for TradeLevelPcts {
    fn default() -> Self {
        Self::DEFAULT
    }
}
