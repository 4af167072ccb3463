//! Guarded division: the single place that decides what dividing by zero means.
//!
//! Policy:
//! - Percent changes against a zero base are reported as `0.0`.
//! - Ratios against a zero denominator are reported as `None`, so callers can
//!   tell "undefined" apart from a genuine ratio of `0.0`.

/// `this / last`, or `None` when `last` is zero.
pub fn ratio(this: f64, last: f64) -> Option<f64> {
    if last == 0.0 {
        None
    } else {
        Some(this / last)
    }
}

/// `(new - base) / base * 100`, or `0.0` when `base` is zero.
pub fn safe_pct_change(new: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (new - base) / base * 100.0
    }
}
