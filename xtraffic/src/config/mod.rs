//! INI configuration for applications embedding the engine.
//!
//! Settings structs live in [`settings`], parsing in `parser` and
//! serialization in `writer`. The library itself never reads a file;
//! applications load a [`ConfigFile`] and hand [`ConfigFile::setup`] and
//! [`ConfigFile::engine`] to their interpolators.
//!
//! # Example
//!
//! ```ignore
//! use xtraffic::config::ConfigFile;
//!
//! let config = ConfigFile::load()?;
//! let interpolator = Interpolator::new(callsign, store, cg_cache, config.engine());
//! let result = interpolator.interpolate(now_ms, &config.setup(), 0);
//! ```

mod file;
mod parser;
mod settings;
mod writer;

pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    ConfigFile, EngineSettings, InterpolationSettings, LoggingSettings, DEFAULT_LOG_FILE,
    DEFAULT_LOG_LEVEL, LOG_LEVELS,
};
