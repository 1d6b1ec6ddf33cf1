use {
    anyhow::Result,
    binance_sdk::spot::rest_api::{
        ExchangeInfoParams, ExchangeInfoResponse, ExchangeInfoSymbolStatusEnum,
    },
    itertools::Itertools,
};

use crate::{
    config::BINANCE,
    data::{GlobalRateLimiter, bn_kline::configure_binance_client},
};

const USDT: &str = "USDT";
const TRADING: &str = "TRADING";

/// Trading spot symbols quoted in USDT, sorted and unique.
pub fn usdt_symbols(info: ExchangeInfoResponse) -> Vec<String> {
    info.symbols
        .unwrap_or_default()
        .into_iter()
        .filter(|s| s.quote_asset.as_deref() == Some(USDT))
        .filter(|s| s.status.as_deref().is_none_or(|status| status == TRADING))
        .filter_map(|s| s.symbol)
        .filter(|symbol| !symbol.is_empty())
        .sorted()
        .dedup()
        .collect()
}

async fn fetch_exchange_info(limiter: &GlobalRateLimiter) -> Result<ExchangeInfoResponse> {
    let rest_client = configure_binance_client()?;
    limiter
        .acquire(BINANCE.limits.exchange_info_weight, "exchange_info")
        .await;

    let params = ExchangeInfoParams::builder()
        .symbol_status(ExchangeInfoSymbolStatusEnum::Trading)
        .build()?;
    let response = rest_client.exchange_info(params).await?;
    Ok(response.data().await?)
}

/// Every USDT spot pair on the exchange. Never fails: a listing error is
/// logged and gives an empty list.
pub async fn fetch_usdt_pairs(limiter: &GlobalRateLimiter) -> Vec<String> {
    match fetch_exchange_info(limiter).await {
        Ok(info) => {
            let pairs = usdt_symbols(info);
            log::info!("Exchange lists {} USDT pairs", pairs.len());
            pairs
        }
        Err(e) => {
            log::warn!("Could not list USDT pairs: {:#}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binance_sdk::spot::rest_api::ExchangeInfoResponseSymbolsInner;

    fn symbol(name: &str, quote: &str, status: Option<&str>) -> ExchangeInfoResponseSymbolsInner {
        ExchangeInfoResponseSymbolsInner {
            symbol: Some(name.to_string()),
            quote_asset: Some(quote.to_string()),
            status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn keeps_trading_usdt_pairs_only() {
        let info = ExchangeInfoResponse {
            symbols: Some(vec![
                symbol("ETHUSDT", "USDT", Some("TRADING")),
                symbol("ETHBTC", "BTC", Some("TRADING")),
                symbol("LUNAUSDT", "USDT", Some("BREAK")),
                symbol("BTCUSDT", "USDT", None),
                symbol("USDTTRY", "TRY", Some("TRADING")),
                symbol("BTCUSDT", "USDT", Some("TRADING")),
            ]),
            ..Default::default()
        };
        assert_eq!(usdt_symbols(info), vec!["BTCUSDT", "ETHUSDT"]);
    }

    #[test]
    fn parses_exchange_payload() {
        let payload = r#"{
            "timezone": "UTC",
            "serverTime": 1700000000000,
            "symbols": [
                {"symbol": "SOLUSDT", "status": "TRADING", "baseAsset": "SOL", "quoteAsset": "USDT"},
                {"symbol": "SOLBNB", "status": "TRADING", "baseAsset": "SOL", "quoteAsset": "BNB"}
            ]
        }"#;
        let info: ExchangeInfoResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(usdt_symbols(info), vec!["SOLUSDT"]);
    }

    #[test]
    fn missing_symbol_list_is_empty() {
        assert!(usdt_symbols(ExchangeInfoResponse::default()).is_empty());
    }
}
