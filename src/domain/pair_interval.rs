use {
    crate::{config::BINANCE_QUOTE_ASSETS, utils::TimeUtils},
    serde::{Deserialize, Serialize},
};

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct PairInterval {
    pub name: String,
    pub interval_ms: i64,
}

impl PairInterval {
    pub fn new(name: impl Into<String>, interval_ms: i64) -> Self {
        Self {
            name: name.into().to_uppercase(),
            interval_ms,
        }
    }

    pub(crate) fn get_base(text: &str) -> Option<&str> {
        let quote = Self::get_quote(text)?;
        text.strip_suffix(quote).filter(|base| !base.is_empty())
    }

    pub(crate) fn get_quote(text: &str) -> Option<&str> {
        BINANCE_QUOTE_ASSETS
            .iter()
            .find(|&&ext| text.ends_with(ext))
            .copied()
    }

    // The name we pass into the Binance API (not necessarily display name)
    pub(crate) fn bn_name(&self) -> &str {
        &self.name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `BTC/USDT` style label; falls back to the raw name.
    pub fn display_name(&self) -> String {
        match (Self::get_base(&self.name), Self::get_quote(&self.name)) {
            (Some(base), Some(quote)) => format!("{}/{}", base, quote),
            _ => self.name.clone(),
        }
    }
}

impl std::fmt::Display for PairInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} @ {}",
            self.display_name(),
            TimeUtils::interval_to_string(self.interval_ms)
        )
    }
}
