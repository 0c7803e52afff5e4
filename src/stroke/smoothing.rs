//! Coordinate smoothing kernels
//!
//! Both kernels smooth x and y only; speed, direction, width, and pressure are
//! copied from the source point. Points within half a window of either end are
//! emitted unchanged so stroke endpoints stay pinned.

use super::Point;

/// Normalized Gaussian kernel weights for a centered window
fn gaussian_weights(window_size: usize, sigma: f64) -> Vec<f64> {
    let half = (window_size / 2) as i64;
    let mut weights: Vec<f64> = (-half..=half)
        .map(|i| (-((i * i) as f64) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Clamp the window to the stroke and reduce it to the nearest odd size
///
/// Returns `None` when the effective window is too small to smooth anything.
fn effective_window(window_size: usize, len: usize) -> Option<usize> {
    let mut window = window_size.min(len);
    if window % 2 == 0 {
        window -= 1;
    }
    if window < 3 {
        None
    } else {
        Some(window)
    }
}

/// Gaussian smoothing over a centered window
pub fn smooth_gaussian(points: &[Point], window_size: usize, sigma: f64) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let window = match effective_window(window_size, points.len()) {
        Some(w) => w,
        None => return points.to_vec(),
    };

    let weights = gaussian_weights(window, sigma);
    let half = window / 2;
    let mut result = Vec::with_capacity(points.len());

    for i in 0..points.len() {
        if i < half || i >= points.len() - half {
            result.push(points[i]);
        } else {
            let mut sx = 0.0;
            let mut sy = 0.0;
            for (j, w) in weights.iter().enumerate() {
                let p = &points[i - half + j];
                sx += w * p.x;
                sy += w * p.y;
            }
            result.push(points[i].at(sx, sy));
        }
    }

    result
}

/// Moving-average smoothing over a centered window
pub fn smooth_moving_average(points: &[Point], window_size: usize) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let window = match effective_window(window_size, points.len()) {
        Some(w) => w,
        None => return points.to_vec(),
    };

    let half = window / 2;
    let mut result = Vec::with_capacity(points.len());

    for i in 0..points.len() {
        if i < half || i >= points.len() - half {
            result.push(points[i]);
        } else {
            let sx: f64 = points[i - half..=i + half].iter().map(|p| p.x).sum();
            let sy: f64 = points[i - half..=i + half].iter().map(|p| p.y).sum();
            let n = window as f64;
            result.push(points[i].at(sx / n, sy / n));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::test_point;

    fn zigzag(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| test_point(i as f64 * 10.0, if i % 2 == 0 { 0.0 } else { 5.0 }, 128))
            .collect()
    }

    #[test]
    fn test_gaussian_preserves_length_and_endpoints() {
        let points = zigzag(5);
        let smoothed = smooth_gaussian(&points, 3, 1.0);

        assert_eq!(smoothed.len(), points.len());
        assert_eq!(smoothed[0], points[0]);
        assert_eq!(smoothed[4], points[4]);
        // Interior points move
        assert!(smoothed[2].x != points[2].x || smoothed[2].y != points[2].y);
    }

    #[test]
    fn test_gaussian_copies_attributes() {
        let mut points = zigzag(5);
        points[2].pressure = 200;
        points[2].width = 7;
        let smoothed = smooth_gaussian(&points, 3, 1.0);
        assert_eq!(smoothed[2].pressure, 200);
        assert_eq!(smoothed[2].width, 7);
    }

    #[test]
    fn test_gaussian_short_stroke_is_copy() {
        let points = zigzag(2);
        assert_eq!(smooth_gaussian(&points, 5, 1.0), points);
        let one = zigzag(1);
        assert_eq!(smooth_gaussian(&one, 5, 1.0), one);
    }

    #[test]
    fn test_even_window_reduced_to_odd() {
        let points = zigzag(7);
        // Window 4 behaves exactly like window 3
        assert_eq!(
            smooth_gaussian(&points, 4, 1.0),
            smooth_gaussian(&points, 3, 1.0)
        );
    }

    #[test]
    fn test_window_clamped_to_stroke() {
        let points = zigzag(3);
        // Window 9 clamps to 3; only the middle point is smoothed
        let smoothed = smooth_gaussian(&points, 9, 1.0);
        assert_eq!(smoothed[0], points[0]);
        assert_eq!(smoothed[2], points[2]);
        assert!(smoothed[1].y != points[1].y);
    }

    #[test]
    fn test_moving_average_interior_is_mean() {
        let points = vec![
            test_point(0.0, 0.0, 128),
            test_point(10.0, 6.0, 128),
            test_point(20.0, 0.0, 128),
        ];
        let smoothed = smooth_moving_average(&points, 3);
        assert!((smoothed[1].x - 10.0).abs() < 1e-9);
        assert!((smoothed[1].y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_wavy_stroke_interior_pulled_toward_neighbor_mean() {
        // Wavy stroke from the end-to-end scenarios
        let ys = [10.0, 15.0, 8.0, 18.0, 12.0, 16.0, 10.0];
        let points: Vec<Point> = ys
            .iter()
            .enumerate()
            .map(|(i, &y)| test_point(10.0 + i as f64 * 10.0, y, 128))
            .collect();

        let smoothed = smooth_gaussian(&points, 5, 1.0);
        assert_eq!(smoothed.len(), points.len());
        assert_eq!(smoothed[0], points[0]);
        assert_eq!(smoothed[6], points[6]);

        // Each fully-windowed interior point lands strictly closer to the mean
        // of its original neighbors than the original did
        for i in 2..5 {
            let neighbor_mean = (points[i - 1].y + points[i + 1].y) / 2.0;
            let before = (points[i].y - neighbor_mean).abs();
            let after = (smoothed[i].y - neighbor_mean).abs();
            assert!(after < before, "point {} not pulled toward neighbors", i);
        }
    }
}
