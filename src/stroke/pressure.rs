//! Percentile-based pressure normalization
//!
//! Maps the [low, high] percentile band of a stroke's pressures onto
//! [target_min, target_max], clamping outliers into [0, 255]. Coordinates and
//! the other attributes are untouched.

use super::Point;

/// Normalize pressure values across a stroke
pub fn normalize_pressure(
    points: &[Point],
    target_min: i32,
    target_max: i32,
    low_pct: u32,
    high_pct: u32,
) -> Vec<Point> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut pressures: Vec<i32> = points.iter().map(|p| p.pressure).collect();
    pressures.sort_unstable();
    let n = pressures.len();

    let lo_idx = (n * low_pct as usize) / 100;
    let hi_idx = ((n * high_pct as usize) / 100).min(n - 1);
    let p_lo = pressures[lo_idx];
    let p_hi = pressures[hi_idx];

    if p_hi <= p_lo {
        // Flat band: everything maps to the middle of the target range
        let mid = (target_min + target_max) / 2;
        return points.iter().map(|p| p.with_pressure(mid)).collect();
    }

    let span = (target_max - target_min) as f64;
    points
        .iter()
        .map(|p| {
            let normalized = (p.pressure - p_lo) as f64 / (p_hi - p_lo) as f64;
            let mapped = (target_min as f64 + normalized * span) as i32;
            p.with_pressure(mapped.clamp(0, 255))
        })
        .collect()
}
