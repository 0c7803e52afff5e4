//! Ramer-Douglas-Peucker stroke simplification
//!
//! The only kernel that changes point count. Good for collapsing very noisy
//! strokes while keeping the overall shape.

use super::{perpendicular_distance, Point};

/// Simplify a stroke, dropping points that deviate less than `epsilon` from
/// the simplified path
pub fn simplify_rdp(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = &points[0];
    let last = &points[points.len() - 1];

    // Interior point with the largest deviation from the first-last segment
    let mut max_dist = 0.0;
    let mut max_idx = 0;
    for (i, p) in points.iter().enumerate().take(points.len() - 1).skip(1) {
        let d = perpendicular_distance(p, first, last);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > epsilon {
        let mut left = simplify_rdp(&points[..=max_idx], epsilon);
        let right = simplify_rdp(&points[max_idx..], epsilon);
        // The split point ends both halves; keep it once
        left.pop();
        left.extend(right);
        left
    } else {
        vec![*first, *last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::test_point;

    fn noisy_line() -> Vec<Point> {
        vec![
            test_point(0.0, 0.0, 128),
            test_point(10.0, 0.5, 128),
            test_point(20.0, 10.0, 128), // outlier
            test_point(30.0, 0.5, 128),
            test_point(40.0, 0.0, 128),
        ]
    }

    #[test]
    fn test_low_epsilon_keeps_outlier() {
        let simplified = simplify_rdp(&noisy_line(), 5.0);
        assert!(simplified.len() > 2);
        assert!(simplified.contains(&test_point(20.0, 10.0, 128)));
    }

    #[test]
    fn test_high_epsilon_collapses_to_endpoints() {
        let points = noisy_line();
        let simplified = simplify_rdp(&points, 15.0);
        assert_eq!(simplified, vec![points[0], points[4]]);
    }

    #[test]
    fn test_short_stroke_is_copy() {
        let points = vec![test_point(0.0, 0.0, 128), test_point(10.0, 10.0, 128)];
        assert_eq!(simplify_rdp(&points, 2.0), points);
    }

    #[test]
    fn test_endpoints_always_survive() {
        let points = noisy_line();
        let simplified = simplify_rdp(&points, 3.0);
        assert_eq!(simplified[0], points[0]);
        assert_eq!(*simplified.last().unwrap(), points[4]);
    }

    #[test]
    fn test_idempotent() {
        for eps in [1.0, 3.0, 15.0] {
            let once = simplify_rdp(&noisy_line(), eps);
            let twice = simplify_rdp(&once, eps);
            assert_eq!(once, twice, "not idempotent at epsilon {}", eps);
        }
    }

    #[test]
    fn test_no_duplicate_split_point() {
        let simplified = simplify_rdp(&noisy_line(), 3.0);
        for w in simplified.windows(2) {
            assert_ne!(w[0], w[1]);
        }
    }
}
