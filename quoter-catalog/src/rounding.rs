use rust_decimal::prelude::*;

/// Round to `places` decimals, ties to even.
///
/// The tie test runs on the exact binary value of the float, so `2.675`
/// (stored as 2.67499999...) rounds down to `2.67` while `0.125` rounds to
/// `0.12`.
pub fn round_half_even(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    match Decimal::from_f64_retain(value) {
        Some(exact) => {
            let rounded = exact.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven);
            // Parsing the decimal text yields the nearest f64
            rounded.to_string().parse::<f64>().unwrap_or(value)
        }
        // Beyond Decimal's range the fractional part is already gone
        None => {
            let scale = 10f64.powi(places as i32);
            (value * scale).round_ties_even() / scale
        }
    }
}

/// Smallest multiple of `step` that is >= `value`
pub fn ceil_to_step(value: f64, step: f64) -> f64 {
    (value / step).ceil() * step
}
