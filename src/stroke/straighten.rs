//! Straight-line detection and snapping
//!
//! Short, long-enough strokes that never stray far from their chord are
//! treated as line attempts and snapped onto the chord, preserving each
//! point's arc-length position and attributes.

use super::{max_deviation, stroke_length, Point};

/// Snap a stroke straight if it looks like a line attempt
///
/// Returns a copy unchanged when the stroke has fewer than 2 or more than
/// `max_points` points, is shorter than `min_length`, or deviates more than
/// `threshold` from the first-last chord.
pub fn straighten_line(
    points: &[Point],
    threshold: f64,
    min_length: f64,
    max_points: usize,
) -> Vec<Point> {
    if points.len() < 2 || points.len() > max_points {
        return points.to_vec();
    }

    let total_len = stroke_length(points);
    if total_len < min_length || total_len == 0.0 {
        return points.to_vec();
    }

    if max_deviation(points) > threshold {
        return points.to_vec();
    }

    let start = points[0];
    let end = points[points.len() - 1];

    let mut result = Vec::with_capacity(points.len());
    result.push(start);

    let mut cumulative = 0.0;
    for i in 1..points.len() {
        let dx = points[i].x - points[i - 1].x;
        let dy = points[i].y - points[i - 1].y;
        cumulative += dx.hypot(dy);
        let t = cumulative / total_len;
        result.push(points[i].at(start.x + t * (end.x - start.x), start.y + t * (end.y - start.y)));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::test_point;

    fn nearly_straight() -> Vec<Point> {
        vec![
            test_point(100.0, 100.0, 128),
            test_point(120.0, 101.0, 128),
            test_point(140.0, 99.5, 128),
            test_point(160.0, 100.5, 128),
            test_point(180.0, 100.0, 128),
        ]
    }

    fn cross_product_collinear(points: &[Point]) -> bool {
        let first = points[0];
        let last = points[points.len() - 1];
        points.iter().all(|p| {
            let cross = (last.x - first.x) * (p.y - first.y) - (last.y - first.y) * (p.x - first.x);
            cross.abs() < 1e-9
        })
    }

    #[test]
    fn test_snaps_nearly_straight_stroke() {
        let points = nearly_straight();
        let snapped = straighten_line(&points, 15.0, 50.0, 30);

        assert_eq!(snapped.len(), points.len());
        assert_eq!(snapped[0], points[0]);
        assert_eq!(snapped[4].x, 180.0);
        assert_eq!(snapped[4].y, 100.0);
        assert!(cross_product_collinear(&snapped));
        // Snapped onto y=100 exactly
        for p in &snapped {
            assert!((p.y - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_snapped_points_keep_arc_length_order() {
        let snapped = straighten_line(&nearly_straight(), 15.0, 50.0, 30);
        for w in snapped.windows(2) {
            assert!(w[1].x > w[0].x);
        }
    }

    #[test]
    fn test_wavy_stroke_untouched() {
        let points = vec![
            test_point(0.0, 0.0, 128),
            test_point(30.0, 40.0, 128),
            test_point(60.0, 0.0, 128),
        ];
        assert_eq!(straighten_line(&points, 15.0, 50.0, 30), points);
    }

    #[test]
    fn test_short_stroke_untouched() {
        // Under min_length even though perfectly straight
        let points = vec![
            test_point(0.0, 0.0, 128),
            test_point(10.0, 0.1, 128),
            test_point(20.0, 0.0, 128),
        ];
        assert_eq!(straighten_line(&points, 15.0, 50.0, 30), points);
    }

    #[test]
    fn test_too_many_points_untouched() {
        let points: Vec<Point> = (0..40).map(|i| test_point(i as f64 * 5.0, 0.2, 128)).collect();
        assert_eq!(straighten_line(&points, 15.0, 50.0, 30), points);
    }

    #[test]
    fn test_zero_length_stroke_untouched() {
        let points = vec![test_point(5.0, 5.0, 128), test_point(5.0, 5.0, 128)];
        assert_eq!(straighten_line(&points, 15.0, 0.0, 30), points);
    }

    #[test]
    fn test_attributes_carried_from_source_points() {
        let mut points = nearly_straight();
        points[2].pressure = 50;
        points[2].width = 9;
        let snapped = straighten_line(&points, 15.0, 50.0, 30);
        assert_eq!(snapped[2].pressure, 50);
        assert_eq!(snapped[2].width, 9);
    }
}
