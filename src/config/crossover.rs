//! SMA crossover strategy: windows, exit multipliers and the default stake.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitMultipliers {
    /// Stop-loss as a multiple of the crossover close.
    pub stop: f64,
    /// Target as a multiple of the crossover close.
    pub target: f64,
}

pub struct CrossoverConfig {
    pub short_window: usize,
    pub long_window: usize,
    pub long_exits: ExitMultipliers,
    pub short_exits: ExitMultipliers,
    /// Position size in quote currency (USD).
    pub default_amount: f64,
}

pub const CROSSOVER: CrossoverConfig = CrossoverConfig {
    short_window: 20,
    long_window: 50,
    long_exits: ExitMultipliers {
        stop: 0.95,
        target: 1.10,
    },
    short_exits: ExitMultipliers {
        stop: 1.05,
        target: 0.90,
    },
    default_amount: 50.0,
};
