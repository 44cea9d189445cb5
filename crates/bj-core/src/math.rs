//! Numeric helpers shared by the feature and agent stages

/// Denominator guard used for ratios and regressions
pub const EPSILON: f64 = 1e-8;

/// Logistic function 1 / (1 + e^-x)
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Clamp into [0, 1], mapping NaN to the neutral value
#[inline]
pub fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() {
        crate::NEUTRAL
    } else {
        x.clamp(0.0, 1.0)
    }
}

/// Softmax with temperature, rescaled by N and clamped to [0, 1]
///
/// Multiplying by N puts a uniform input back at 1.0 per element, so the
/// result keeps each value on a comparable [0, 1] scale.
pub fn scaled_softmax<const N: usize>(values: [f32; N], temperature: f32) -> [f32; N] {
    let temperature = if temperature > 0.0 { temperature } else { 1.0 };
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    let max = if max.is_finite() { max } else { 0.0 };

    let mut exps = [0.0f32; N];
    let mut sum = 0.0f32;
    for (e, &v) in exps.iter_mut().zip(values.iter()) {
        let v = if v.is_finite() { v } else { max };
        *e = ((v - max) / temperature).exp();
        sum += *e;
    }

    let scale = N as f32;
    let mut out = [0.0f32; N];
    for (o, e) in out.iter_mut().zip(exps.iter()) {
        *o = clamp_unit(e / sum * scale);
    }
    out
}

/// Least-squares slope of `values` against their index
///
/// Returns 0.0 for fewer than two points.
pub fn least_squares_slope(values: &[f32]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = values.iter().map(|&v| v as f64).sum::<f64>() / n_f;

    let mut cov = 0.0;
    let mut var = 0.0;
    for (i, &v) in values.iter().enumerate() {
        let dx = i as f64 - mean_x;
        cov += dx * (v as f64 - mean_y);
        var += dx * dx;
    }
    // Sample covariance over population variance: slope carries an n/(n-1) factor
    let cov = cov / (n_f - 1.0);
    let var = var / n_f;
    cov / (var + EPSILON)
}

/// Root mean square of all values, 0.0 when empty
pub fn rms(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|&v| (v as f64) * (v as f64)).sum();
    (sum / values.len() as f64).sqrt()
}
