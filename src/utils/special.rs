//! Special functions and quadrature not covered by statrs.

use std::f64::consts::E;

/// Principal branch W₀ of the Lambert W function for real arguments.
///
/// Returns NaN below the branch point −1/e, where W₀ has no real value.
pub fn lambert_w0(x: f64) -> f64 {
    let branch = -1.0 / E;
    if x.is_nan() || x < branch {
        return f64::NAN;
    }
    if x == branch {
        return -1.0;
    }
    if x == 0.0 {
        return 0.0;
    }
    if x.is_infinite() {
        return f64::INFINITY;
    }

    // Starting point: branch-point series, log1p, or asymptotic expansion.
    let mut w = if x < -0.25 {
        let p = (2.0 * (E * x + 1.0)).sqrt();
        -1.0 + p - p * p / 3.0 + 11.0 / 72.0 * p * p * p
    } else if x < 3.0 {
        x.ln_1p()
    } else {
        let l1 = x.ln();
        let l2 = l1.ln();
        l1 - l2 + l2 / l1
    };

    // Halley iteration
    for _ in 0..64 {
        let ew = w.exp();
        let f = w * ew - x;
        let wp1 = w + 1.0;
        if wp1.abs() < f64::EPSILON {
            break;
        }
        let denom = ew * wp1 - (w + 2.0) * f / (2.0 * wp1);
        let dw = f / denom;
        w -= dw;
        if dw.abs() <= 4.0 * f64::EPSILON * (1.0 + w.abs()) {
            break;
        }
    }
    w
}

/// Composite Simpson rule on `[a, b]` with `intervals` subintervals (rounded up to even).
pub fn simpson<F>(f: F, a: f64, b: f64, intervals: usize) -> f64
where
    F: Fn(f64) -> f64,
{
    let n = if intervals % 2 == 0 {
        intervals.max(2)
    } else {
        intervals + 1
    };
    let h = (b - a) / n as f64;
    let mut sum = f(a) + f(b);
    for k in 1..n {
        let x = a + k as f64 * h;
        sum += if k % 2 == 1 { 4.0 * f(x) } else { 2.0 * f(x) };
    }
    sum * h / 3.0
}
