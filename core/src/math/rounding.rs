/// Largest deviation from 1.0 accepted for a distribution total.
pub const SUM_TOLERANCE: f64 = 1e-3;

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

pub fn round4(value: f64) -> f64 {
    round_to(value, 4)
}
