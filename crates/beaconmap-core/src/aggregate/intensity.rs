//! Intensity mapping
//!
//! Normalises a measured value into `[0, 1]` between two thresholds. The
//! factor darkens a beacon's base colour: values at or below `low` render
//! black, values at or above `high` render the full base colour.

use serde::{Deserialize, Serialize};

use super::Rgb;
use crate::error::MapError;

/// Default lower threshold
pub const DEFAULT_LOW: f64 = 400.0;
/// Default upper threshold
pub const DEFAULT_HIGH: f64 = 1900.0;

#[derive(Deserialize)]
struct RawThresholds {
    low: f64,
    high: f64,
}

/// A validated `(low, high)` pair with `low < high`, both finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct Thresholds {
    low: f64,
    high: f64,
}

impl TryFrom<RawThresholds> for Thresholds {
    type Error = MapError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Thresholds::new(raw.low, raw.high)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
        }
    }
}

impl Thresholds {
    /// Create a threshold pair, rejecting `low >= high` and non-finite values
    pub fn new(low: f64, high: f64) -> Result<Self, MapError> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(MapError::InvalidThresholds { low, high });
        }
        Ok(Self { low, high })
    }

    /// Lower threshold
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper threshold
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Same pair with a new lower threshold
    pub fn with_low(&self, low: f64) -> Result<Self, MapError> {
        Self::new(low, self.high)
    }

    /// Same pair with a new upper threshold
    pub fn with_high(&self, high: f64) -> Result<Self, MapError> {
        Self::new(self.low, high)
    }

    /// Normalised intensity of `value`. Non-finite values map to 0.
    pub fn intensity(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        ((value - self.low) / (self.high - self.low)).clamp(0.0, 1.0)
    }

    /// Marker fill colour for `value` on a beacon with colour `base`
    pub fn shade(&self, base: Rgb, value: f64) -> Rgb {
        base.scale(self.intensity(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        let t = Thresholds::new(400.0, 1900.0).unwrap();
        assert_eq!(t.intensity(400.0), 0.0);
        assert_eq!(t.intensity(1900.0), 1.0);
        assert_eq!(t.intensity(1150.0), 0.5);
    }

    #[test]
    fn test_clamped_outside_range() {
        let t = Thresholds::default();
        assert_eq!(t.intensity(-50.0), 0.0);
        assert_eq!(t.intensity(2150.0), 1.0);
        assert_eq!(t.intensity(f64::NAN), 0.0);
        assert_eq!(t.intensity(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_monotonic() {
        let t = Thresholds::new(-10.0, 35.5).unwrap();
        let mut previous = f64::NEG_INFINITY;
        let mut v = -40.0;
        while v < 60.0 {
            let i = t.intensity(v);
            assert!(i >= previous, "intensity dropped at {v}");
            assert!((0.0..=1.0).contains(&i));
            previous = i;
            v += 0.25;
        }
    }

    #[test]
    fn test_shade_examples() {
        let t = Thresholds::new(400.0, 1900.0).unwrap();
        let red = Rgb::new(255, 0, 0);
        assert_eq!(t.shade(red, 400.0), Rgb::BLACK);
        assert_eq!(t.shade(red, 1900.0), red);
        assert_eq!(t.shade(red, 2150.0), red);
    }

    #[test]
    fn test_invalid_pairs_rejected() {
        assert!(Thresholds::new(5.0, 5.0).is_err());
        assert!(Thresholds::new(10.0, 5.0).is_err());
        assert!(Thresholds::new(f64::NAN, 5.0).is_err());

        let t = Thresholds::default();
        assert!(t.with_low(2000.0).is_err());
        assert_eq!(t.with_high(2500.0).unwrap().high(), 2500.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Thresholds = serde_json::from_str(r#"{"low": 1, "high": 2}"#).unwrap();
        assert_eq!(ok.low(), 1.0);
        assert!(serde_json::from_str::<Thresholds>(r#"{"low": 3, "high": 2}"#).is_err());
    }
}
