//! Settings structs, one per `[section]` of config.ini.

use std::path::PathBuf;

use crate::interpolation::{
    EngineConfig, InterpolationSetup, InterpolatorMode, DEFAULT_CG_REFRESH_INTERVAL,
    DEFAULT_MAX_LOG_ENTRIES, DEFAULT_PARTS_GUESSING_RATIO, DEFAULT_PARTS_INTERPOLATION_RATIO,
};
use crate::aviation::DEFAULT_CHANGE_WINDOW;
use crate::provider::{MAX_PARTS_PER_CALLSIGN, MAX_SITUATIONS_PER_CALLSIGN};

/// Default log level when `RUST_LOG` is not set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file name.
pub const DEFAULT_LOG_FILE: &str = "xtraffic.log";

/// Accepted values of `[logging] level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    /// Per-frame interpolation switches
    pub interpolation: InterpolationSettings,
    /// Buffer sizes and decimation ratios
    pub engine: EngineSettings,
    /// Log output
    pub logging: LoggingSettings,
}

/// `[interpolation]` section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationSettings {
    pub mode: InterpolatorMode,
    pub enable_parts: bool,
    pub fix_scenery_offset: bool,
    /// Pitch forced while on ground, None keeps the reported pitch.
    pub pitch_on_ground_deg: Option<f64>,
    pub log_interpolation: bool,
}

impl Default for InterpolationSettings {
    fn default() -> Self {
        let setup = InterpolationSetup::default();
        Self {
            mode: InterpolatorMode::default(),
            enable_parts: setup.enable_parts,
            fix_scenery_offset: setup.fix_scenery_offset,
            pitch_on_ground_deg: setup.pitch_on_ground_deg,
            log_interpolation: setup.log_interpolation,
        }
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    pub max_situations_per_callsign: usize,
    pub max_parts_per_callsign: usize,
    pub parts_interpolation_ratio: u32,
    pub parts_guessing_ratio: u32,
    pub cg_refresh_interval: u32,
    pub change_window: usize,
    pub max_log_entries: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_situations_per_callsign: MAX_SITUATIONS_PER_CALLSIGN,
            max_parts_per_callsign: MAX_PARTS_PER_CALLSIGN,
            parts_interpolation_ratio: DEFAULT_PARTS_INTERPOLATION_RATIO,
            parts_guessing_ratio: DEFAULT_PARTS_GUESSING_RATIO,
            cg_refresh_interval: DEFAULT_CG_REFRESH_INTERVAL,
            change_window: DEFAULT_CHANGE_WINDOW,
            max_log_entries: DEFAULT_MAX_LOG_ENTRIES,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// One of [`LOG_LEVELS`].
    pub level: String,
    /// Log directory; None logs to stdout only.
    pub directory: Option<PathBuf>,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            directory: None,
            file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl ConfigFile {
    /// Per-frame setup handed to every interpolation step.
    pub fn setup(&self) -> InterpolationSetup {
        InterpolationSetup {
            enable_parts: self.interpolation.enable_parts,
            fix_scenery_offset: self.interpolation.fix_scenery_offset,
            pitch_on_ground_deg: self.interpolation.pitch_on_ground_deg,
            log_interpolation: self.interpolation.log_interpolation,
        }
    }

    /// Engine configuration for new interpolators.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            mode: self.interpolation.mode,
            max_situations: self.engine.max_situations_per_callsign,
            max_parts: self.engine.max_parts_per_callsign,
            parts_interpolation_ratio: self.engine.parts_interpolation_ratio,
            parts_guessing_ratio: self.engine.parts_guessing_ratio,
            cg_refresh_interval: self.engine.cg_refresh_interval,
            change_window: self.engine.change_window,
            max_log_entries: self.engine.max_log_entries,
        }
        .normalized()
    }
}
