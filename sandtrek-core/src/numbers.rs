//! Numeric conversion helpers centralizing safe numeric casts.

use num_traits::cast::cast;

/// Clamp a usize to the u32 range and downcast.
#[must_use]
pub fn usize_to_u32(value: usize) -> u32 {
    cast::<usize, u32>(value).unwrap_or(u32::MAX)
}

/// Convert u32 to f64 while keeping the lossy-cast surface in one place.
#[must_use]
pub fn u32_to_f64(value: u32) -> f64 {
    cast::<u32, f64>(value).unwrap_or(0.0)
}

/// Fraction of `numerator` over `denominator`, 0.0 when the denominator is zero.
#[must_use]
pub fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    u32_to_f64(numerator) / u32_to_f64(denominator)
}
