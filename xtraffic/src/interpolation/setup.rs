//! Per-callsign interpolation setup and engine wide tuning.

use std::str::FromStr;

use crate::aviation::DEFAULT_CHANGE_WINDOW;
use crate::provider::{MAX_PARTS_PER_CALLSIGN, MAX_SITUATIONS_PER_CALLSIGN};

/// Default decimation ratio for re-running parts interpolation.
pub const DEFAULT_PARTS_INTERPOLATION_RATIO: u32 = 2;

/// Default decimation ratio for re-running parts guessing.
pub const DEFAULT_PARTS_GUESSING_RATIO: u32 = 5;

/// Default number of steps between CG refreshes.
pub const DEFAULT_CG_REFRESH_INTERVAL: u32 = 25;

/// Default capacity of each diagnostic log.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 1000;

/// Interpolation strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolatorMode {
    Linear,
    /// Falls back to linear with fewer than three usable situations.
    #[default]
    Spline,
}

impl std::fmt::Display for InterpolatorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpolatorMode::Linear => write!(f, "linear"),
            InterpolatorMode::Spline => write!(f, "spline"),
        }
    }
}

impl FromStr for InterpolatorMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(InterpolatorMode::Linear),
            "spline" => Ok(InterpolatorMode::Spline),
            other => Err(format!("unknown interpolator mode '{}'", other)),
        }
    }
}

/// Per-callsign switches, passed with every step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationSetup {
    /// Interpolate or guess parts at all.
    pub enable_parts: bool,
    /// Shift cached situations by the CG-relative scenery deviation.
    pub fix_scenery_offset: bool,
    /// Fixed pitch while on ground.
    pub pitch_on_ground_deg: Option<f64>,
    /// Emit diagnostic records to the attached logger.
    pub log_interpolation: bool,
}

impl Default for InterpolationSetup {
    fn default() -> Self {
        Self {
            enable_parts: true,
            fix_scenery_offset: false,
            pitch_on_ground_deg: None,
            log_interpolation: false,
        }
    }
}

impl std::fmt::Display for InterpolationSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parts {} scenery fix {} pitch on ground {} log {}",
            self.enable_parts,
            self.fix_scenery_offset,
            self.pitch_on_ground_deg
                .map(|p| format!("{:.1}", p))
                .unwrap_or_else(|| "-".to_string()),
            self.log_interpolation
        )
    }
}

/// Engine wide tuning, shared by all interpolators.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub mode: InterpolatorMode,
    /// Situation buffer size per callsign.
    pub max_situations: usize,
    /// Parts buffer size per callsign.
    pub max_parts: usize,
    /// Re-run parts interpolation every Nth step.
    pub parts_interpolation_ratio: u32,
    /// Re-run parts guessing every Nth step.
    pub parts_guessing_ratio: u32,
    /// Refresh the model CG every Nth step.
    pub cg_refresh_interval: u32,
    /// Situations analyzed for the change.
    pub change_window: usize,
    /// Capacity of each diagnostic log.
    pub max_log_entries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: InterpolatorMode::default(),
            max_situations: MAX_SITUATIONS_PER_CALLSIGN,
            max_parts: MAX_PARTS_PER_CALLSIGN,
            parts_interpolation_ratio: DEFAULT_PARTS_INTERPOLATION_RATIO,
            parts_guessing_ratio: DEFAULT_PARTS_GUESSING_RATIO,
            cg_refresh_interval: DEFAULT_CG_REFRESH_INTERVAL,
            change_window: DEFAULT_CHANGE_WINDOW,
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
        }
    }
}

impl EngineConfig {
    pub fn with_mode(mut self, mode: InterpolatorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Copy with every value raised into its valid range.
    pub fn normalized(&self) -> Self {
        Self {
            mode: self.mode,
            max_situations: self.max_situations.max(2),
            max_parts: self.max_parts.max(1),
            parts_interpolation_ratio: self.parts_interpolation_ratio.clamp(1, 10),
            parts_guessing_ratio: self.parts_guessing_ratio.clamp(1, 10),
            cg_refresh_interval: self.cg_refresh_interval.max(1),
            change_window: self.change_window.max(2),
            max_log_entries: self.max_log_entries.max(1),
        }
    }
}
