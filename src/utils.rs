//! Numeric helpers shared by the policies

/// Scale used when comparing mean values for equality
const TIE_PRECISION: f64 = 1e6;

/// Perturbs `value` by a tiny amount to break exact ties.
///
/// `draw` is a uniform sample from `[0, 1)`. The relative change is at most
/// `epsilon / 2`, far below any meaningful difference between values.
pub fn noise(value: f64, epsilon: f64, draw: f64) -> f64 {
    (value + epsilon) * (1.0 + epsilon * (draw - 0.5))
}

/// Truncates `value` to six decimals so that floating-point noise does not
/// separate values that are equal for practical purposes
pub fn truncate_for_ties(value: f64) -> f64 {
    (value * TIE_PRECISION).trunc() / TIE_PRECISION
}

/// Mean of `total` over `visits`, guarded by `epsilon`
pub fn guarded_mean(total: f64, visits: u32, epsilon: f64) -> f64 {
    total / (f64::from(visits) + epsilon)
}
