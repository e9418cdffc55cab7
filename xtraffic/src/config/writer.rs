//! INI serialization: `ConfigFile` → commented INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let pitch_on_ground = config
        .interpolation
        .pitch_on_ground_deg
        .map(|p| p.to_string())
        .unwrap_or_default();
    let log_directory = config
        .logging
        .directory
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();

    format!(
        r#"[interpolation]
; Interpolator for new aircraft (default: spline)
;   linear - blend the two situations around the render time
;   spline - cubic Hermite spline through the three latest situations
mode = {}
; Interpolate reported parts, or guess them when none are reported (default: true)
enable_parts = {}
; Shift situations by the guessed scenery deviation (default: false)
fix_scenery_offset = {}
; Pitch in degrees forced while on ground. Empty keeps the reported pitch
pitch_on_ground = {}
; Record every step in the in-memory interpolation log (default: false)
log_interpolation = {}

[engine]
; Situations buffered per aircraft (default: 50, minimum 2)
max_situations_per_callsign = {}
; Parts buffered per aircraft (default: 50)
max_parts_per_callsign = {}
; Select reported parts every Nth step (default: 2, 1..10)
parts_interpolation_ratio = {}
; Guess parts every Nth step when none are reported (default: 5, 1..10)
parts_guessing_ratio = {}
; Refresh the model CG every Nth step (default: 25)
cg_refresh_interval = {}
; Latest situations analyzed for trends (default: 5, minimum 2)
change_window = {}
; Records kept by the interpolation log (default: 1000)
max_log_entries = {}

[logging]
; trace, debug, info, warn or error (default: info). RUST_LOG takes precedence
level = {}
; Log file directory. Empty logs to stdout only
directory = {}
; Log file name (default: xtraffic.log)
file = {}
"#,
        config.interpolation.mode,
        config.interpolation.enable_parts,
        config.interpolation.fix_scenery_offset,
        pitch_on_ground,
        config.interpolation.log_interpolation,
        config.engine.max_situations_per_callsign,
        config.engine.max_parts_per_callsign,
        config.engine.parts_interpolation_ratio,
        config.engine.parts_guessing_ratio,
        config.engine.cg_refresh_interval,
        config.engine.change_window,
        config.engine.max_log_entries,
        config.logging.level,
        log_directory,
        config.logging.file,
    )
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_lists_every_key() {
        let content = to_config_string(&ConfigFile::default());
        for key in [
            "mode = spline",
            "enable_parts = true",
            "pitch_on_ground = \n",
            "cg_refresh_interval = 25",
            "change_window = 5",
            "level = info",
            "file = xtraffic.log",
        ] {
            assert!(content.contains(key), "missing '{}'", key.trim());
        }
    }
}
