//! Aggregation helpers over station readings
//!
//! Pure functions used to turn per-station values into dashboard figures.

use serde::{Deserialize, Serialize};

/// Resultant vectors shorter than this are treated as directionless
const MIN_RESULTANT_LENGTH: f64 = 1e-9;

/// One knot in kilometers per hour
const KMH_PER_KNOT: f64 = 1.852;

/// One knot in meters per second
const MS_PER_KNOT: f64 = 0.514_444;

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Mean of compass directions in degrees
///
/// Computed as `atan2(Σsin, Σcos)` and normalised to `[0, 360)`, so that
/// 350° and 10° average to 0° rather than 180°. Returns `None` for empty
/// input or when the directions cancel out.
pub fn circular_mean_degrees<I>(directions: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sin_sum, cos_sum, count) = directions
        .into_iter()
        .filter(|d| d.is_finite())
        .fold((0.0_f64, 0.0_f64, 0_usize), |(s, c, n), degrees| {
            let radians = degrees.to_radians();
            (s + radians.sin(), c + radians.cos(), n + 1)
        });

    #[allow(clippy::cast_precision_loss)]
    let threshold = MIN_RESULTANT_LENGTH * count as f64;
    if count == 0 || sin_sum.hypot(cos_sum) < threshold {
        return None;
    }

    let mean = sin_sum.atan2(cos_sum).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative angles
    Some(if mean >= 360.0 { 0.0 } else { mean })
}

/// 16-point compass name for a direction in degrees
pub fn compass_point(degrees: f64) -> &'static str {
    let normalised = degrees.rem_euclid(360.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = ((normalised / 22.5).round() as usize) % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

/// Convert knots to kilometers per hour
pub fn knots_to_kmh(knots: f64) -> f64 {
    knots * KMH_PER_KNOT
}

/// Convert knots to meters per second
pub fn knots_to_ms(knots: f64) -> f64 {
    knots * MS_PER_KNOT
}

/// Summary statistics over a set of readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ReadingStats {
    /// Compute statistics, ignoring non-finite values
    ///
    /// Returns `None` if no finite value remains.
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0_usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values.into_iter().filter(|v| v.is_finite()) {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return None;
        }

        #[allow(clippy::cast_precision_loss)]
        let mean = (sum / count as f64).clamp(min, max);
        Some(Self {
            count,
            min,
            max,
            mean,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn circular_mean_of_quarter_turn() {
        let mean = circular_mean_degrees([0.0, 90.0]).unwrap();
        assert!(approx(mean, 45.0), "got {mean}");
    }

    #[test]
    fn circular_mean_wraps_around_north() {
        let mean = circular_mean_degrees([350.0, 10.0]).unwrap();
        assert!(approx(mean, 0.0) || approx(mean, 360.0), "got {mean}");
        assert!(mean < 360.0);
    }

    #[test]
    fn circular_mean_single_value() {
        let mean = circular_mean_degrees([270.0]).unwrap();
        assert!(approx(mean, 270.0));
    }

    #[test]
    fn circular_mean_empty_is_none() {
        assert!(circular_mean_degrees(Vec::new()).is_none());
    }

    #[test]
    fn circular_mean_opposite_is_none() {
        assert!(circular_mean_degrees([0.0, 180.0]).is_none());
        assert!(circular_mean_degrees([90.0, 270.0]).is_none());
    }

    #[test]
    fn circular_mean_skips_nan() {
        let mean = circular_mean_degrees([f64::NAN, 90.0]).unwrap();
        assert!(approx(mean, 90.0));
    }

    #[test]
    fn compass_cardinals() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(90.0), "E");
        assert_eq!(compass_point(180.0), "S");
        assert_eq!(compass_point(270.0), "W");
    }

    #[test]
    fn compass_intermediate_and_wrap() {
        assert_eq!(compass_point(22.5), "NNE");
        assert_eq!(compass_point(225.0), "SW");
        assert_eq!(compass_point(355.0), "N");
        assert_eq!(compass_point(-90.0), "W");
    }

    #[test]
    fn knot_conversions() {
        assert!(approx(knots_to_kmh(10.0), 18.52));
        assert!((knots_to_ms(10.0) - 5.144_44).abs() < 1e-6);
    }

    #[test]
    fn stats_basic() {
        let stats = ReadingStats::from_values([28.5, 31.0, 29.5]).unwrap();
        assert_eq!(stats.count, 3);
        assert!(approx(stats.min, 28.5));
        assert!(approx(stats.max, 31.0));
        assert!(approx(stats.mean, 29.666_666_666_666_668));
    }

    #[test]
    fn stats_empty_is_none() {
        assert!(ReadingStats::from_values(std::iter::empty()).is_none());
        assert!(ReadingStats::from_values([f64::NAN]).is_none());
    }
}
