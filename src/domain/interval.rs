use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::utils::TimeUtils;

/// Kline widths the exchange serves. Parses from and prints as Binance shorthand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
pub enum Interval {
    #[strum(serialize = "1m")]
    M1,
    #[strum(serialize = "3m")]
    M3,
    #[strum(serialize = "5m")]
    M5,
    #[strum(serialize = "15m")]
    M15,
    #[strum(serialize = "30m")]
    M30,
    #[strum(serialize = "1h")]
    H1,
    #[strum(serialize = "2h")]
    H2,
    #[strum(serialize = "4h")]
    H4,
    #[strum(serialize = "6h")]
    H6,
    #[strum(serialize = "8h")]
    H8,
    #[strum(serialize = "12h")]
    H12,
    #[strum(serialize = "1d")]
    D1,
    #[strum(serialize = "3d")]
    D3,
    #[strum(serialize = "1w")]
    W1,
    #[strum(serialize = "1M")]
    Month1,
}

impl Interval {
    pub const fn as_ms(self) -> i64 {
        use TimeUtils as T;
        match self {
            Self::M1 => T::MS_IN_MIN,
            Self::M3 => T::MS_IN_3_MIN,
            Self::M5 => T::MS_IN_5_MIN,
            Self::M15 => T::MS_IN_15_MIN,
            Self::M30 => T::MS_IN_30_MIN,
            Self::H1 => T::MS_IN_H,
            Self::H2 => T::MS_IN_2_H,
            Self::H4 => T::MS_IN_4_H,
            Self::H6 => T::MS_IN_6_H,
            Self::H8 => T::MS_IN_8_H,
            Self::H12 => T::MS_IN_12_H,
            Self::D1 => T::MS_IN_D,
            Self::D3 => T::MS_IN_3_D,
            Self::W1 => T::MS_IN_W,
            Self::Month1 => T::MS_IN_1_M,
        }
    }

    pub fn from_ms(ms: i64) -> Option<Self> {
        Self::iter().find(|i| i.as_ms() == ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parses_binance_shorthand() {
        assert_eq!(Interval::from_str("4h").unwrap(), Interval::H4);
        assert_eq!(Interval::from_str("1m").unwrap(), Interval::M1);
        assert_eq!(Interval::from_str("1M").unwrap(), Interval::Month1);
        assert!(Interval::from_str("7h").is_err());
    }

    #[test]
    fn every_interval_round_trips() {
        for interval in Interval::iter() {
            let text = interval.to_string();
            assert_eq!(Interval::from_str(&text).unwrap(), interval);
            assert_eq!(Interval::from_ms(interval.as_ms()), Some(interval));
            assert_eq!(TimeUtils::interval_to_string(interval.as_ms()), text);
        }
    }
}
