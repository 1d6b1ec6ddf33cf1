use {
    anyhow::{Result, bail},
    binance_sdk::{
        config::ConfigurationRestApi,
        errors::{self, ConnectorError as connection_error},
        models::RestApiRateLimit,
        spot::{
            SpotRestApi,
            rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
        },
    },
    std::{convert::TryFrom, error::Error, fmt},
};

use crate::{
    config::{BINANCE, BinanceApiConfig, DF},
    data::GlobalRateLimiter,
    domain::{Candle, PairInterval},
    utils::{TimeUtils, epoch_ms_to_utc},
};

pub fn try_interval_from_ms(ms: i64) -> Result<KlinesIntervalEnum, KlineError> {
    use TimeUtils as T;
    match ms {
        T::MS_IN_MIN => Ok(KlinesIntervalEnum::Interval1m),
        T::MS_IN_3_MIN => Ok(KlinesIntervalEnum::Interval3m),
        T::MS_IN_5_MIN => Ok(KlinesIntervalEnum::Interval5m),
        T::MS_IN_15_MIN => Ok(KlinesIntervalEnum::Interval15m),
        T::MS_IN_30_MIN => Ok(KlinesIntervalEnum::Interval30m),
        T::MS_IN_H => Ok(KlinesIntervalEnum::Interval1h),
        T::MS_IN_2_H => Ok(KlinesIntervalEnum::Interval2h),
        T::MS_IN_4_H => Ok(KlinesIntervalEnum::Interval4h),
        T::MS_IN_6_H => Ok(KlinesIntervalEnum::Interval6h),
        T::MS_IN_8_H => Ok(KlinesIntervalEnum::Interval8h),
        T::MS_IN_12_H => Ok(KlinesIntervalEnum::Interval12h),
        T::MS_IN_D => Ok(KlinesIntervalEnum::Interval1d),
        T::MS_IN_3_D => Ok(KlinesIntervalEnum::Interval3d),
        T::MS_IN_W => Ok(KlinesIntervalEnum::Interval1w),
        T::MS_IN_1_M => Ok(KlinesIntervalEnum::Interval1M),
        _ => Err(KlineError::UnsupportedInterval(ms)),
    }
}

/// One REST kline row, parsed.
#[derive(Debug, PartialOrd, PartialEq)]
pub struct BNKline {
    pub open_timestamp_ms: i64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub base_asset_volume: f64,
}

#[derive(Debug, PartialEq)]
pub enum KlineError {
    InvalidLength,
    InvalidType(String),
    UnsupportedInterval(i64),
    ConnectionFailed(String),
}

impl fmt::Display for KlineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::fmt::Result {
        match self {
            KlineError::InvalidLength => write!(f, "Invalid length"),
            KlineError::InvalidType(field) => write!(f, "Invalid type: {}", field),
            KlineError::UnsupportedInterval(ms) => write!(f, "Unsupported interval: {}ms", ms),
            KlineError::ConnectionFailed(msg) => {
                write!(f, "Binance API connection failed: {}.", msg)
            }
        }
    }
}

impl Error for KlineError {}

fn parse_price_field(item: Option<KlinesItemInner>, field: &str) -> Result<f64, KlineError> {
    match item.ok_or(KlineError::InvalidLength)? {
        KlinesItemInner::String(s) => s
            .parse::<f64>()
            .map_err(|_| KlineError::InvalidType(field.to_string())),
        _ => Err(KlineError::InvalidType(field.to_string())),
    }
}

impl TryFrom<Vec<KlinesItemInner>> for BNKline {
    type Error = KlineError;

    fn try_from(vec_inner_klines: Vec<KlinesItemInner>) -> Result<Self, Self::Error> {
        let mut items = vec_inner_klines.into_iter();
        let open_timestamp_ms = match items.next().ok_or(KlineError::InvalidLength)? {
            KlinesItemInner::Integer(a) => a,
            _ => return Err(KlineError::InvalidType("open_time".to_string())),
        };

        Ok(BNKline {
            open_timestamp_ms,
            open_price: parse_price_field(items.next(), "open")?,
            high_price: parse_price_field(items.next(), "high")?,
            low_price: parse_price_field(items.next(), "low")?,
            close_price: parse_price_field(items.next(), "close")?,
            base_asset_volume: parse_price_field(items.next(), "volume")?,
        })
    }
}

fn convert_klines(data: Vec<Vec<KlinesItemInner>>) -> Result<Vec<BNKline>, KlineError> {
    data.into_iter().map(Vec::try_into).collect()
}

pub(super) fn configure_binance_client() -> Result<RestApi> {
    let config = BinanceApiConfig::default();
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(config.timeout_ms)
        .retries(config.retries)
        .backoff(config.backoff_ms)
        .build()?;
    Ok(SpotRestApi::production(rest_conf))
}

async fn fetch_binance_klines_with_limits(
    rest_client: &RestApi,
    params: KlinesParams,
    pair_interval: &PairInterval,
) -> Result<(Option<Vec<RestApiRateLimit>>, Vec<Vec<KlinesItemInner>>)> {
    let response_result = rest_client.klines(params).await;
    match response_result {
        Ok(r) => {
            let rate_limits = r.rate_limits.clone();
            let data = r.data().await?;
            Ok((rate_limits, data))
        }
        Err(e) => {
            if let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() {
                match conn_err {
                    connection_error::ConnectorClientError(msg) => {
                        log::warn!(
                            "{} Client error: Check your request parameters. {}",
                            pair_interval,
                            msg
                        );
                    }
                    connection_error::TooManyRequestsError(msg) => {
                        log::warn!(
                            "{} Rate limit exceeded. Please wait and try again. {}",
                            pair_interval,
                            msg
                        );
                    }
                    connection_error::RateLimitBanError(msg) => {
                        log::error!(
                            "{} IP address banned due to excessive rate limits. {}",
                            pair_interval,
                            msg
                        );
                    }
                    errors::ConnectorError::ServerError { msg, status_code } => {
                        log::warn!(
                            "{} Server error: {} (status code: {:?})",
                            pair_interval,
                            msg,
                            status_code
                        );
                    }
                    errors::ConnectorError::NetworkError(msg) => {
                        log::warn!(
                            "{} Network error: Check your internet connection. {}",
                            pair_interval,
                            msg
                        );
                    }
                    errors::ConnectorError::NotFoundError(msg) => {
                        log::warn!("{} Resource not found. {}", pair_interval, msg);
                    }
                    connection_error::BadRequestError(msg) => {
                        log::warn!(
                            "{} Bad request (unknown symbol?). {}",
                            pair_interval,
                            msg
                        );
                    }
                    other => {
                        log::error!("Unexpected ConnectionError variant: {:?}", other);
                    }
                }
                Err(
                    anyhow::Error::new(KlineError::ConnectionFailed(conn_err.to_string()))
                        .context(format!("Binance API call failed for {}", pair_interval)),
                )
            } else {
                Err(
                    anyhow::Error::new(KlineError::ConnectionFailed(e.to_string())).context(
                        format!("Unexpected error during API call for {}", pair_interval),
                    ),
                )
            }
        }
    }
}

/// Where the next page starts, or None once the range is exhausted.
/// A short page means the exchange has nothing further.
fn next_page_start(batch: &[BNKline], limit: usize, interval_ms: i64, end_ms: i64) -> Option<i64> {
    if batch.len() < limit {
        return None;
    }
    let next = batch.last()?.open_timestamp_ms + interval_ms;
    (next <= end_ms).then_some(next)
}

/// Pages forward through `[start_ms, end_ms]` in batches of `klines_limit`.
pub async fn load_klines(
    pair_interval: &PairInterval,
    start_ms: i64,
    end_ms: i64,
    limiter: &GlobalRateLimiter,
) -> Result<Vec<BNKline>> {
    if start_ms > end_ms {
        bail!(
            "{}: start {} is after end {}",
            pair_interval,
            epoch_ms_to_utc(start_ms),
            epoch_ms_to_utc(end_ms)
        );
    }

    // Validate before opening a client
    try_interval_from_ms(pair_interval.interval_ms)?;
    let rest_client = configure_binance_client()?;

    let limit = BINANCE.limits.klines_limit;
    let call_weight = BINANCE.limits.kline_call_weight;
    let end_time: Option<i64> = Some(end_ms);
    let mut start_time: Option<i64> = Some(start_ms);
    let mut all_klines: Vec<BNKline> = Vec::new();

    while let Some(page_start) = start_time {
        limiter.acquire(call_weight, pair_interval.bn_name()).await;

        let params = KlinesParams::builder(
            pair_interval.bn_name().to_string(),
            try_interval_from_ms(pair_interval.interval_ms)?,
        )
            .limit(limit)
            .start_time(start_time)
            .end_time(end_time)
            .build()?;

        let (_rate_limits, rows) =
            fetch_binance_klines_with_limits(&rest_client, params, pair_interval).await?;
        let batch = convert_klines(rows).map_err(|e| {
            anyhow::Error::new(e).context(format!("{} convert_klines failed", pair_interval))
        })?;

        if DF.log_kline_paging {
            log::info!(
                "{}: page from {} returned {} klines",
                pair_interval,
                epoch_ms_to_utc(page_start),
                batch.len()
            );
        }

        start_time = next_page_start(&batch, limit as usize, pair_interval.interval_ms, end_ms);
        all_klines.extend(batch);
    }

    Ok(all_klines)
}

impl From<BNKline> for Candle {
    fn from(bn: BNKline) -> Self {
        Candle::new(
            bn.open_timestamp_ms,
            bn.open_price,
            bn.high_price,
            bn.low_price,
            bn.close_price,
            bn.base_asset_volume,
        )
    }
}
