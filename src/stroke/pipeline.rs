//! Stroke pipeline composer
//!
//! Kernels run in a fixed order: smoothing first (denoise), then straightening
//! (recognize the cleaned shape), then pressure normalization (attribute-only,
//! must see the final geometry). The outcome records which stages actually
//! changed the points so callers can keep honest per-kernel counters.

use serde::{Deserialize, Serialize};

use super::pressure::normalize_pressure;
use super::simplify::simplify_rdp;
use super::smoothing::{smooth_gaussian, smooth_moving_average};
use super::straighten::straighten_line;
use super::Point;

/// Smoothing algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingAlgorithm {
    #[default]
    Gaussian,
    MovingAverage,
    Rdp,
}

/// Smoothing stage parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub algorithm: SmoothingAlgorithm,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_rdp_epsilon")]
    pub rdp_epsilon: f64,
    /// Strokes shorter than this skip the smoothing stage entirely
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            algorithm: SmoothingAlgorithm::Gaussian,
            window_size: default_window_size(),
            sigma: default_sigma(),
            rdp_epsilon: default_rdp_epsilon(),
            min_points: default_min_points(),
        }
    }
}

/// Line-straightening stage parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StraighteningConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Max deviation from the chord for a stroke to count as a line
    #[serde(default = "default_straightness_threshold")]
    pub straightness_threshold: f64,
    /// Strokes shorter than this are never snapped
    #[serde(default = "default_min_line_length")]
    pub min_length: f64,
    /// Strokes with more points than this are never snapped
    #[serde(default = "default_max_line_points")]
    pub max_points: usize,
}

impl Default for StraighteningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            straightness_threshold: default_straightness_threshold(),
            min_length: default_min_line_length(),
            max_points: default_max_line_points(),
        }
    }
}

/// Pressure-normalization stage parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PressureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_target_min")]
    pub target_min: i32,
    #[serde(default = "default_target_max")]
    pub target_max: i32,
    #[serde(default = "default_low_percentile")]
    pub low_percentile: u32,
    #[serde(default = "default_high_percentile")]
    pub high_percentile: u32,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            target_min: default_target_min(),
            target_max: default_target_max(),
            low_percentile: default_low_percentile(),
            high_percentile: default_high_percentile(),
        }
    }
}

/// Full parameter bundle for the stroke pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    #[serde(default)]
    pub line_straightening: StraighteningConfig,
    #[serde(default)]
    pub pressure_normalization: PressureConfig,
}

fn default_true() -> bool {
    true
}

fn default_window_size() -> usize {
    5
}

fn default_sigma() -> f64 {
    1.0
}

fn default_rdp_epsilon() -> f64 {
    2.0
}

fn default_min_points() -> usize {
    5
}

fn default_straightness_threshold() -> f64 {
    15.0
}

fn default_min_line_length() -> f64 {
    50.0
}

fn default_max_line_points() -> usize {
    30
}

fn default_target_min() -> i32 {
    10
}

fn default_target_max() -> i32 {
    245
}

fn default_low_percentile() -> u32 {
    5
}

fn default_high_percentile() -> u32 {
    95
}

/// Result of running one stroke through the pipeline
#[derive(Debug, Clone)]
pub struct StrokeOutcome {
    /// Processed point sequence
    pub points: Vec<Point>,
    /// Smoothing stage changed the points
    pub smoothed: bool,
    /// Straightening stage changed the points
    pub straightened: bool,
    /// Pressure normalization changed the points
    pub normalized: bool,
}

impl StrokeOutcome {
    /// Any stage produced a visible change
    pub fn changed(&self) -> bool {
        self.smoothed || self.straightened || self.normalized
    }
}

/// Run one stroke through all enabled stages in order
pub fn process_stroke(points: &[Point], config: &PipelineConfig) -> StrokeOutcome {
    let mut result = points.to_vec();
    let mut smoothed = false;
    let mut straightened = false;
    let mut normalized = false;

    let smoothing = &config.smoothing;
    if smoothing.enabled && result.len() >= smoothing.min_points {
        let next = match smoothing.algorithm {
            SmoothingAlgorithm::Gaussian => {
                smooth_gaussian(&result, smoothing.window_size, smoothing.sigma)
            }
            SmoothingAlgorithm::MovingAverage => {
                smooth_moving_average(&result, smoothing.window_size)
            }
            SmoothingAlgorithm::Rdp => simplify_rdp(&result, smoothing.rdp_epsilon),
        };
        smoothed = next != result;
        result = next;
    }

    let straightening = &config.line_straightening;
    if straightening.enabled {
        let next = straighten_line(
            &result,
            straightening.straightness_threshold,
            straightening.min_length,
            straightening.max_points,
        );
        straightened = next != result;
        result = next;
    }

    let pressure = &config.pressure_normalization;
    if pressure.enabled {
        let next = normalize_pressure(
            &result,
            pressure.target_min,
            pressure.target_max,
            pressure.low_percentile,
            pressure.high_percentile,
        );
        normalized = next != result;
        result = next;
    }

    StrokeOutcome {
        points: result,
        smoothed,
        straightened,
        normalized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::test_point;

    fn wavy() -> Vec<Point> {
        let ys = [10.0, 15.0, 8.0, 18.0, 12.0, 16.0, 10.0];
        ys.iter()
            .enumerate()
            .map(|(i, &y)| test_point(10.0 + i as f64 * 10.0, y, 128))
            .collect()
    }

    #[test]
    fn test_wavy_stroke_medium_pipeline() {
        // Endpoints stay pinned, point count survives smoothing and snapping,
        // and all-equal pressures collapse to the target midpoint
        let config = PipelineConfig::default();
        let outcome = process_stroke(&wavy(), &config);

        assert!(outcome.smoothed);
        assert!(outcome.normalized);
        assert_eq!(outcome.points.len(), 7);
        assert_eq!(outcome.points[0].x, 10.0);
        assert_eq!(outcome.points[0].y, 10.0);
        assert_eq!(outcome.points[6].x, 70.0);
        assert_eq!(outcome.points[6].y, 10.0);
        for p in &outcome.points {
            assert_eq!(p.pressure, 127);
        }
    }

    #[test]
    fn test_wavy_stroke_smoothing_only() {
        // With straightening off, interior points land strictly closer to the
        // mean of their original neighbors than the originals did
        let mut config = PipelineConfig::default();
        config.line_straightening.enabled = false;
        config.pressure_normalization.enabled = false;

        let points = wavy();
        let outcome = process_stroke(&points, &config);
        assert!(outcome.smoothed);
        assert!(!outcome.straightened);
        assert_eq!(outcome.points.len(), points.len());
        for i in 2..5 {
            let neighbor_mean = (points[i - 1].y + points[i + 1].y) / 2.0;
            let before = (points[i].y - neighbor_mean).abs();
            let after = (outcome.points[i].y - neighbor_mean).abs();
            assert!(after < before);
        }
    }

    #[test]
    fn test_nearly_straight_stroke_snaps() {
        let points = vec![
            test_point(100.0, 100.0, 128),
            test_point(120.0, 101.0, 128),
            test_point(140.0, 99.5, 128),
            test_point(160.0, 100.5, 128),
            test_point(180.0, 100.0, 128),
        ];
        let outcome = process_stroke(&points, &PipelineConfig::default());

        assert!(outcome.straightened);
        assert_eq!(outcome.points.len(), 5);
        for p in &outcome.points {
            assert!((p.y - 100.0).abs() < 1e-6);
        }
        assert_eq!(outcome.points[0].x, 100.0);
        assert_eq!(outcome.points[4].x, 180.0);
        // Chord length is exactly the x span
        let len = crate::stroke::stroke_length(&outcome.points);
        assert!((len - 80.0).abs() < 1e-6);
    }

    #[test]
    fn test_two_point_stroke_is_identity() {
        // Pressure 127 already sits at the degenerate-normalization midpoint,
        // so every stage leaves the stroke alone
        let points = vec![test_point(200.0, 200.0, 127), test_point(250.0, 250.0, 127)];
        let outcome = process_stroke(&points, &PipelineConfig::default());
        assert!(!outcome.changed());
        assert_eq!(outcome.points, points);
    }

    #[test]
    fn test_two_point_stroke_geometry_untouched() {
        // Coordinates of a two-point stroke never move; only the degenerate
        // pressure band can change
        let points = vec![test_point(200.0, 200.0, 128), test_point(250.0, 250.0, 128)];
        let outcome = process_stroke(&points, &PipelineConfig::default());
        assert!(!outcome.smoothed);
        assert!(!outcome.straightened);
        assert!(outcome.normalized);
        assert_eq!(outcome.points[0].x, 200.0);
        assert_eq!(outcome.points[0].y, 200.0);
        assert_eq!(outcome.points[1].x, 250.0);
        assert_eq!(outcome.points[1].y, 250.0);
        assert_eq!(outcome.points[0].pressure, 127);
    }

    #[test]
    fn test_min_points_gates_smoothing() {
        let mut config = PipelineConfig::default();
        config.smoothing.min_points = 10;
        config.line_straightening.enabled = false;
        config.pressure_normalization.enabled = false;
        let outcome = process_stroke(&wavy(), &config);
        assert!(!outcome.smoothed);
        assert_eq!(outcome.points, wavy());
    }

    #[test]
    fn test_disabled_stages_do_nothing() {
        let config = PipelineConfig {
            smoothing: SmoothingConfig {
                enabled: false,
                ..Default::default()
            },
            line_straightening: StraighteningConfig {
                enabled: false,
                ..Default::default()
            },
            pressure_normalization: PressureConfig {
                enabled: false,
                ..Default::default()
            },
        };
        let outcome = process_stroke(&wavy(), &config);
        assert!(!outcome.changed());
        assert_eq!(outcome.points, wavy());
    }

    #[test]
    fn test_rdp_as_smoothing_algorithm_changes_length() {
        let mut config = PipelineConfig::default();
        config.smoothing.algorithm = SmoothingAlgorithm::Rdp;
        config.smoothing.rdp_epsilon = 100.0;
        config.line_straightening.enabled = false;
        config.pressure_normalization.enabled = false;
        let outcome = process_stroke(&wavy(), &config);
        assert!(outcome.smoothed);
        assert_eq!(outcome.points.len(), 2);
    }
}
