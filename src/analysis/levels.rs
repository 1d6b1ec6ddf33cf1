use crate::config::TradeLevelPcts;
use crate::models::{ExpectedPrice, TradeLevels};
use crate::utils::ols_fit;

/// Projects the close by its relative distance from the trend average.
/// `increase_pct` carries a flat one-point haircut.
pub fn expected_price(close: f64, sma: f64) -> ExpectedPrice {
    if sma.is_nan() || sma == 0.0 || close.is_nan() {
        return ExpectedPrice::UNDEFINED;
    }

    let price = close * (1.0 + (close - sma) / sma);
    let increase_pct = (price - close) / close * 100.0 - 1.0;

    ExpectedPrice {
        price,
        increase_pct,
    }
}

pub fn trade_levels(close: f64, pcts: &TradeLevelPcts) -> TradeLevels {
    if close.is_nan() {
        return TradeLevels::UNDEFINED;
    }

    TradeLevels {
        entry: close,
        take_profit: close * (1.0 + pcts.take_profit_pct.value()),
        stop_loss: close * (1.0 - pcts.stop_loss_pct.value()),
    }
}

/// Least-squares line through `(index, close)`, evaluated one bar past the end.
pub fn forecast_next_close(closes: &[f64]) -> f64 {
    let xs: Vec<f64> = (0..closes.len()).map(|i| i as f64).collect();
    match ols_fit(&xs, closes) {
        Some((intercept, slope)) => intercept + slope * closes.len() as f64,
        None => f64::NAN,
    }
}
