//! Named processing presets for the cloud tier
//!
//! A preset is a fixed bundle of kernel toggles and parameters. Unknown names
//! resolve to `medium` so clients can never select an unconfigured pipeline.

use super::pipeline::{PipelineConfig, SmoothingAlgorithm};

/// Default tool ids excluded from processing (highlighter, eraser)
pub const DEFAULT_SKIP_TOOLS: [u32; 2] = [6, 8];

/// One named processing preset
#[derive(Debug, Clone)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,

    // Smoothing
    pub smoothing_enabled: bool,
    pub gaussian_sigma: f64,
    pub window_size: usize,

    // RDP simplification
    pub rdp_enabled: bool,
    pub rdp_epsilon: f64,

    // Line straightening
    pub line_straightening_enabled: bool,
    pub straightness_threshold: f64,
    pub min_line_length: f64,

    // Pressure normalization
    pub pressure_normalization_enabled: bool,
}

/// All available presets
pub const PRESETS: [Preset; 3] = [
    Preset {
        name: "minimal",
        description: "Light touch-up, preserves original character",
        smoothing_enabled: true,
        gaussian_sigma: 0.8,
        window_size: 5,
        rdp_enabled: false,
        rdp_epsilon: 2.0,
        line_straightening_enabled: false,
        straightness_threshold: 15.0,
        min_line_length: 50.0,
        pressure_normalization_enabled: true,
    },
    Preset {
        name: "medium",
        description: "Balanced cleanup (default)",
        smoothing_enabled: true,
        gaussian_sigma: 1.0,
        window_size: 5,
        rdp_enabled: true,
        rdp_epsilon: 2.0,
        line_straightening_enabled: true,
        straightness_threshold: 15.0,
        min_line_length: 50.0,
        pressure_normalization_enabled: true,
    },
    Preset {
        name: "aggressive",
        description: "Maximum smoothing and cleanup",
        smoothing_enabled: true,
        gaussian_sigma: 1.5,
        window_size: 5,
        rdp_enabled: true,
        rdp_epsilon: 3.0,
        line_straightening_enabled: true,
        straightness_threshold: 20.0,
        min_line_length: 50.0,
        pressure_normalization_enabled: true,
    },
];

impl Preset {
    /// Look up a preset by name, falling back to `medium` for unknown names
    pub fn get(name: &str) -> &'static Preset {
        PRESETS
            .iter()
            .find(|p| p.name == name)
            .unwrap_or(&PRESETS[1])
    }

    /// True if `name` names a configured preset
    pub fn is_valid(name: &str) -> bool {
        PRESETS.iter().any(|p| p.name == name)
    }

    /// Expand this preset into pipeline parameters
    ///
    /// The composer runs a single smoothing algorithm; presets select the
    /// Gaussian kernel and carry the RDP epsilon for configurations that
    /// switch the algorithm over.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.smoothing.enabled = self.smoothing_enabled;
        config.smoothing.algorithm = SmoothingAlgorithm::Gaussian;
        config.smoothing.sigma = self.gaussian_sigma;
        config.smoothing.window_size = self.window_size;
        config.smoothing.rdp_epsilon = self.rdp_epsilon;
        config.line_straightening.enabled = self.line_straightening_enabled;
        config.line_straightening.straightness_threshold = self.straightness_threshold;
        config.line_straightening.min_length = self.min_line_length;
        config.pressure_normalization.enabled = self.pressure_normalization_enabled;
        config
    }
}
