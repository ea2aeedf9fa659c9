/// Rounds to one decimal place, half away from zero.
///
/// `f64::round` already rounds ties away from zero, which is what the
/// reported percentages rely on. Do not swap this for `round_ties_even`.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `numerator / denominator`, or `0.0` when the denominator is zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Percentage capped at 100 and rounded to one decimal.
pub fn capped_percentage(numerator: f64, denominator: f64) -> f64 {
    round1(ratio_or_zero(numerator, denominator) * 100.0).min(100.0)
}
