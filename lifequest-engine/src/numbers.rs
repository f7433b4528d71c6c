//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Floor a f64 into i64, saturating at the range ends. Non-finite input yields 0.
#[must_use]
pub fn floor_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    saturate(value.floor())
}

/// Truncate a f64 toward zero into i64, saturating at the range ends.
#[must_use]
pub fn trunc_f64_to_i64(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    saturate(value.trunc())
}

// `i64::MAX as f64` rounds up to 2^63, which no longer fits, so the
// out-of-range side is picked from the sign instead of clamping first.
fn saturate(whole: f64) -> i64 {
    cast::<f64, i64>(whole).unwrap_or(if whole > 0.0 { i64::MAX } else { i64::MIN })
}

/// Convert i64 to f64 while allowing precision loss in a single location.
#[must_use]
pub fn i64_to_f64(value: i64) -> f64 {
    cast::<i64, f64>(value).unwrap_or(0.0)
}

/// Treat NaN, infinities, and non-positive values as "nothing logged".
#[must_use]
pub fn positive_magnitude(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}
