//! INI parsing: `Ini` → `ConfigFile`.
//!
//! The single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::file::ConfigFileError;
use super::settings::{ConfigFile, LOG_LEVELS};
use crate::interpolation::InterpolatorMode;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [interpolation] section
    if let Some(section) = ini.section(Some("interpolation")) {
        if let Some(v) = section.get("mode") {
            config.interpolation.mode =
                InterpolatorMode::from_str(v.trim()).map_err(|reason| ConfigFileError::InvalidValue {
                    section: "interpolation".to_string(),
                    key: "mode".to_string(),
                    value: v.to_string(),
                    reason,
                })?;
        }
        if let Some(v) = section.get("enable_parts") {
            config.interpolation.enable_parts = parse_bool("interpolation", "enable_parts", v)?;
        }
        if let Some(v) = section.get("fix_scenery_offset") {
            config.interpolation.fix_scenery_offset =
                parse_bool("interpolation", "fix_scenery_offset", v)?;
        }
        if let Some(v) = section.get("pitch_on_ground") {
            let v = v.trim();
            config.interpolation.pitch_on_ground_deg = if v.is_empty() {
                None
            } else {
                let pitch: f64 = parse_number("interpolation", "pitch_on_ground", v)?;
                if !(-90.0..=90.0).contains(&pitch) {
                    return Err(invalid("interpolation", "pitch_on_ground", v, "must be within -90..90 degrees"));
                }
                Some(pitch)
            };
        }
        if let Some(v) = section.get("log_interpolation") {
            config.interpolation.log_interpolation =
                parse_bool("interpolation", "log_interpolation", v)?;
        }
    }

    // [engine] section
    if let Some(section) = ini.section(Some("engine")) {
        if let Some(v) = section.get("max_situations_per_callsign") {
            let n: usize = parse_number("engine", "max_situations_per_callsign", v)?;
            if n < 2 {
                return Err(invalid("engine", "max_situations_per_callsign", v, "must be at least 2"));
            }
            config.engine.max_situations_per_callsign = n;
        }
        if let Some(v) = section.get("max_parts_per_callsign") {
            let n: usize = parse_number("engine", "max_parts_per_callsign", v)?;
            if n < 1 {
                return Err(invalid("engine", "max_parts_per_callsign", v, "must be at least 1"));
            }
            config.engine.max_parts_per_callsign = n;
        }
        if let Some(v) = section.get("parts_interpolation_ratio") {
            config.engine.parts_interpolation_ratio = parse_ratio("parts_interpolation_ratio", v)?;
        }
        if let Some(v) = section.get("parts_guessing_ratio") {
            config.engine.parts_guessing_ratio = parse_ratio("parts_guessing_ratio", v)?;
        }
        if let Some(v) = section.get("cg_refresh_interval") {
            let n: u32 = parse_number("engine", "cg_refresh_interval", v)?;
            if n < 1 {
                return Err(invalid("engine", "cg_refresh_interval", v, "must be at least 1"));
            }
            config.engine.cg_refresh_interval = n;
        }
        if let Some(v) = section.get("change_window") {
            let n: usize = parse_number("engine", "change_window", v)?;
            if n < 2 {
                return Err(invalid("engine", "change_window", v, "must be at least 2"));
            }
            config.engine.change_window = n;
        }
        if let Some(v) = section.get("max_log_entries") {
            config.engine.max_log_entries = parse_number("engine", "max_log_entries", v)?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("level") {
            let level = v.trim().to_lowercase();
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(invalid("logging", "level", v, "must be one of: trace, debug, info, warn, error"));
            }
            config.logging.level = level;
        }
        if let Some(v) = section.get("directory") {
            let v = v.trim();
            config.logging.directory = if v.is_empty() {
                None
            } else {
                Some(expand_tilde(v))
            };
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("logging", "file", v, "must not be empty"));
            }
            config.logging.file = v.to_string();
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

fn parse_number<T: FromStr>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, "must be a number"))
}

fn parse_ratio(key: &str, value: &str) -> Result<u32, ConfigFileError> {
    let n: u32 = parse_number("engine", key, value)?;
    if !(1..=10).contains(&n) {
        return Err(invalid("engine", key, value, "must be within 1..10"));
    }
    Ok(n)
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ConfigFile, ConfigFileError> {
        let ini = Ini::load_from_str(content).unwrap();
        parse_ini(&ini)
    }

    #[test]
    fn test_empty_ini_is_default() {
        assert_eq!(parse("").unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_interpolation_section() {
        let config = parse(
            "[interpolation]\nmode = Linear\nenable_parts = no\npitch_on_ground = 2.5\nlog_interpolation = true\n",
        )
        .unwrap();
        assert_eq!(config.interpolation.mode, InterpolatorMode::Linear);
        assert!(!config.interpolation.enable_parts);
        assert_eq!(config.interpolation.pitch_on_ground_deg, Some(2.5));
        assert!(config.interpolation.log_interpolation);
    }

    #[test]
    fn test_empty_pitch_clears_override() {
        let config = parse("[interpolation]\npitch_on_ground =\n").unwrap();
        assert!(config.interpolation.pitch_on_ground_deg.is_none());
    }

    #[test]
    fn test_engine_limits() {
        assert!(parse("[engine]\nparts_guessing_ratio = 11\n").is_err());
        assert!(parse("[engine]\nmax_situations_per_callsign = 1\n").is_err());
        assert!(parse("[engine]\ncg_refresh_interval = abc\n").is_err());
        let config = parse("[engine]\nparts_interpolation_ratio = 3\nchange_window = 8\n").unwrap();
        assert_eq!(config.engine.parts_interpolation_ratio, 3);
        assert_eq!(config.engine.change_window, 8);
    }

    #[test]
    fn test_logging_section() {
        let config = parse("[logging]\nlevel = DEBUG\ndirectory = /tmp/xtraffic\nfile = run.log\n").unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.directory, Some(PathBuf::from("/tmp/xtraffic")));
        assert_eq!(config.logging.file, "run.log");
        assert!(parse("[logging]\nlevel = loud\n").is_err());
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/var/log"), PathBuf::from("/var/log"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/logs"), home.join("logs"));
        }
    }
}
