use statrs::statistics::Statistics;

/// Applies `f` to each full window ending at every index.
/// Rows before the first full window give NaN, as does any window holding a NaN
/// (pandas `rolling(window)` with the default `min_periods`).
pub(crate) fn rolling_apply<F>(data: &[f64], window: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if window == 0 {
        return vec![f64::NAN; data.len()];
    }

    (0..data.len())
        .map(|i| {
            if i + 1 < window {
                return f64::NAN;
            }
            let slice = &data[i + 1 - window..=i];
            if slice.iter().any(|v| v.is_nan()) {
                f64::NAN
            } else {
                f(slice)
            }
        })
        .collect()
}

#[inline]
pub(crate) fn rolling_mean(data: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(data, window, |w| w.iter().mean())
}

/// Sample standard deviation (ddof = 1) over each window.
/// Two passes around the window mean, so a flat window is exactly 0.
pub(crate) fn rolling_std(data: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(data, window, |w| {
        if w.len() < 2 {
            return f64::NAN;
        }
        let mean = w.iter().mean();
        let ss: f64 = w.iter().map(|x| (x - mean) * (x - mean)).sum();
        (ss / (w.len() - 1) as f64).sqrt()
    })
}

#[inline]
pub(crate) fn rolling_min(data: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(data, window, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

#[inline]
pub(crate) fn rolling_max(data: &[f64], window: usize) -> Vec<f64> {
    rolling_apply(data, window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the first
/// defined value (pandas `ewm(span, adjust=False)`). NaN inputs carry the previous value.
pub(crate) fn ema(data: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(data.len());
    let mut prev: Option<f64> = None;

    for &x in data {
        let next = match prev {
            _ if x.is_nan() => prev,
            None => Some(x),
            Some(p) => Some(p + alpha * (x - p)),
        };
        out.push(next.unwrap_or(f64::NAN));
        prev = next;
    }

    out
}

/// Ordinary least squares fit of `ys` against `xs`. Returns `(intercept, slope)`.
/// None when there are fewer than two points or the regressor has no variance.
pub(crate) fn ols_fit(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let var_x = xs.iter().variance();
    if !(var_x > 0.0) {
        return None;
    }

    let slope = xs.iter().covariance(ys.iter()) / var_x;
    let intercept = ys.iter().mean() - slope * xs.iter().mean();
    Some((intercept, slope))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_mean_warmup_is_nan() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_eq!(out[2], 2.0);
        assert_eq!(out[3], 3.0);
    }

    #[test]
    fn rolling_window_with_nan_is_nan() {
        let out = rolling_mean(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert!(out[1].is_nan());
        assert!(out[2].is_nan());
        assert_eq!(out[3], 3.5);
    }

    #[test]
    fn rolling_std_is_sample_std() {
        let out = rolling_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0], 8);
        // population std is 2.0; sample std is sqrt(32/7)
        assert!((out[7] - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn rolling_std_of_flat_window_is_exactly_zero() {
        let out = rolling_std(&[123.456; 25], 20);
        assert!(out[18].is_nan());
        assert!(out[19..].iter().all(|&v| v == 0.0));
        assert!(rolling_std(&[1.0, 2.0], 1)[1].is_nan());
    }

    #[test]
    fn rolling_extremes() {
        let data = [3.0, 1.0, 4.0, 1.0, 5.0];
        assert_eq!(rolling_min(&data, 3)[4], 1.0);
        assert_eq!(rolling_max(&data, 3)[4], 5.0);
        assert_eq!(rolling_max(&data, 3)[2], 4.0);
    }

    #[test]
    fn ema_is_seeded_with_first_value() {
        let out = ema(&[10.0, 20.0], 3);
        assert_eq!(out[0], 10.0);
        assert_eq!(out[1], 15.0);
    }

    #[test]
    fn ema_skips_leading_nan() {
        let out = ema(&[f64::NAN, 4.0, 4.0], 5);
        assert!(out[0].is_nan());
        assert_eq!(out[1], 4.0);
        assert_eq!(out[2], 4.0);
    }

    #[test]
    fn ols_recovers_a_line() {
        let xs: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 3.0 + 2.0 * x).collect();
        let (intercept, slope) = ols_fit(&xs, &ys).unwrap();
        assert!((intercept - 3.0).abs() < 1e-9);
        assert!((slope - 2.0).abs() < 1e-9);
    }

    #[test]
    fn ols_rejects_degenerate_input() {
        assert!(ols_fit(&[1.0], &[1.0]).is_none());
        assert!(ols_fit(&[2.0, 2.0], &[1.0, 3.0]).is_none());
    }
}
