//! Numerical helpers: daily interpolation and decimal rounding.

pub mod interpolate;

pub use interpolate::*;

/// Round half away from zero to `decimals` places.
///
/// Negative zero is normalized to `0.0`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale + 0.0
}
