mod maths_utils;
mod perf;
mod time_utils;

pub use time_utils::{TimeUtils, epoch_ms_to_utc, format_duration, now_utc};

pub(crate) use maths_utils::{
    ema, ols_fit, rolling_max, rolling_mean, rolling_min, rolling_std,
};
