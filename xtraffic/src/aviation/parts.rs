//! Aircraft parts: the visible, animated state of an aircraft.

use super::situation::{AircraftSituation, POSITION_TIME_OFFSET_MS};

/// Below this altitude landing lights are on while airborne.
const LANDING_LIGHTS_BELOW_FT: f64 = 10_000.0;

/// Taxi speed above which landing lights replace taxi lights.
const TAKEOFF_ROLL_KTS: f64 = 30.0;

/// Speed above which an aircraft on ground is taxiing.
const TAXI_KTS: f64 = 5.0;

/// Provenance of a parts record.
///
/// A guessed record is replaced as soon as a reported one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartsDetails {
    /// Derived from situation, change and model.
    Guessed,
    /// Reported by the network.
    FromNetwork,
}

impl std::fmt::Display for PartsDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartsDetails::Guessed => write!(f, "guessed"),
            PartsDetails::FromNetwork => write!(f, "network"),
        }
    }
}

/// Light switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AircraftLights {
    pub strobe: bool,
    pub landing: bool,
    pub taxi: bool,
    pub beacon: bool,
    pub nav: bool,
    pub logo: bool,
    pub recognition: bool,
    pub cabin: bool,
}

impl AircraftLights {
    /// All lights on.
    pub fn all_on() -> Self {
        Self {
            strobe: true,
            landing: true,
            taxi: true,
            beacon: true,
            nav: true,
            logo: true,
            recognition: true,
            cabin: true,
        }
    }

    /// Plausible lights for a situation.
    ///
    /// On ground the taxi and landing lights follow the ground speed,
    /// airborne the landing lights follow the altitude.
    pub fn guessed_for(situation: &AircraftSituation) -> Self {
        let mut lights = Self {
            cabin: true,
            recognition: true,
            beacon: true,
            nav: true,
            ..Self::default()
        };
        let gs = situation.ground_speed_kts;
        if situation.is_on_ground() {
            if gs > TAKEOFF_ROLL_KTS {
                lights.landing = true;
                lights.strobe = true;
            } else if gs > TAXI_KTS {
                lights.taxi = true;
            }
        } else {
            lights.strobe = true;
            lights.landing = situation.altitude_ft < LANDING_LIGHTS_BELOW_FT;
        }
        lights
    }
}

/// Per engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineState {
    /// Engine number, starting at 1.
    pub number: u8,
    /// Running (spooled up).
    pub running: bool,
}

impl EngineState {
    pub fn new(number: u8, running: bool) -> Self {
        Self { number, running }
    }
}

/// Build `count` engines with the same state.
pub fn engines(count: u8, running: bool) -> Vec<EngineState> {
    (1..=count).map(|n| EngineState::new(n, running)).collect()
}

/// Gear, flaps, spoilers, lights and engines at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftParts {
    /// Timestamp in ms since epoch.
    pub timestamp_ms: i64,
    /// Expected report cadence in ms.
    pub time_offset_ms: i64,
    pub gear_down: bool,
    /// Flaps extension, 0 to 100 percent.
    pub flaps_percent: u8,
    pub spoilers_out: bool,
    pub engines: Vec<EngineState>,
    pub lights: AircraftLights,
    /// Weight on wheels as reported with the parts.
    pub on_ground: bool,
    pub details: PartsDetails,
}

impl AircraftParts {
    /// Create a reported parts record: gear down, everything else off.
    pub fn new(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            time_offset_ms: POSITION_TIME_OFFSET_MS,
            gear_down: true,
            flaps_percent: 0,
            spoilers_out: false,
            engines: Vec::new(),
            lights: AircraftLights::default(),
            on_ground: false,
            details: PartsDetails::FromNetwork,
        }
    }

    pub fn with_gear_down(mut self, gear_down: bool) -> Self {
        self.gear_down = gear_down;
        self
    }

    pub fn with_flaps_percent(mut self, flaps_percent: u8) -> Self {
        self.set_flaps_percent(flaps_percent);
        self
    }

    pub fn with_spoilers_out(mut self, spoilers_out: bool) -> Self {
        self.spoilers_out = spoilers_out;
        self
    }

    pub fn with_engines(mut self, engines: Vec<EngineState>) -> Self {
        self.engines = engines;
        self
    }

    pub fn with_lights(mut self, lights: AircraftLights) -> Self {
        self.lights = lights;
        self
    }

    pub fn with_on_ground(mut self, on_ground: bool) -> Self {
        self.on_ground = on_ground;
        self
    }

    pub fn with_time_offset(mut self, time_offset_ms: i64) -> Self {
        self.time_offset_ms = time_offset_ms;
        self
    }

    /// Set flaps, clamped to 100 percent.
    pub fn set_flaps_percent(&mut self, flaps_percent: u8) {
        self.flaps_percent = flaps_percent.min(100);
    }

    #[inline]
    pub fn adjusted_timestamp_ms(&self) -> i64 {
        self.timestamp_ms + self.time_offset_ms
    }

    pub fn is_guessed(&self) -> bool {
        self.details == PartsDetails::Guessed
    }

    /// True if any engine runs.
    pub fn any_engine_running(&self) -> bool {
        self.engines.iter().any(|e| e.running)
    }
}

impl std::fmt::Display for AircraftParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ts {} gear {} flaps {}% spoilers {} engines {}/{} [{}]",
            self.timestamp_ms,
            if self.gear_down { "down" } else { "up" },
            self.flaps_percent,
            if self.spoilers_out { "out" } else { "in" },
            self.engines.iter().filter(|e| e.running).count(),
            self.engines.len(),
            self.details
        )
    }
}
