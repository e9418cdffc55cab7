//! Parts selection: reported parts when the network delivers them, guessed
//! parts otherwise.
//!
//! # Decimation
//!
//! Parts change slowly compared to the render rate. Selection and guessing
//! are re-run only every Nth step, where the step index is the interpolator
//! counter plus the aircraft index so that aircraft do not all recompute in
//! the same frame. In between, the previous parts are handed out again and
//! flagged as reused.
//!
//! A refresh is forced while no parts exist yet, and as soon as reported
//! parts appear after guessed ones: a real report always wins over a guess.

use tracing::{trace, warn};

use crate::aviation::{
    engines, AircraftLights, AircraftModel, AircraftParts, AircraftSituation,
    AircraftSituationChange, Callsign, GroundDetails, PartsDetails,
};

use super::status::PartsStatus;

/// Pitch above which an aircraft without trend is assumed climbing.
const CLIMB_PITCH_DEG: f64 = 20.0;

/// Height band in which gear and flaps are out.
const NEAR_GROUND_AGL_FT: f64 = 300.0;

/// Transition band while climbing.
const CLIMB_TRANSITION_AGL_FT: f64 = 500.0;

/// Transition band otherwise.
const TRANSITION_AGL_FT: f64 = 1000.0;

const FLAPS_APPROACH_PERCENT: u8 = 25;
const FLAPS_TRANSITION_PERCENT: u8 = 10;

/// Latest reported parts not newer than `now_ms`, else the oldest newer one.
///
/// `parts` must be sorted latest first.
pub fn latest_reported(parts: &[AircraftParts], now_ms: i64) -> Option<&AircraftParts> {
    parts
        .iter()
        .find(|p| p.adjusted_timestamp_ms() <= now_ms)
        .or_else(|| parts.last())
}

/// Guess plausible parts for a situation.
pub fn guess_parts(
    situation: &AircraftSituation,
    change: &AircraftSituationChange,
    model: &AircraftModel,
) -> AircraftParts {
    let mut parts = AircraftParts::new(situation.timestamp_ms)
        .with_time_offset(situation.time_offset_ms)
        .with_lights(AircraftLights::guessed_for(situation));
    parts.details = PartsDetails::Guessed;

    let engine_count = model.engine_count_or_default();
    let details = situation.on_ground.details();
    let on_ground = situation.is_on_ground();
    parts.on_ground = on_ground;

    if details != GroundDetails::NotSet {
        let running = !on_ground || situation.is_moving();
        parts.engines = engines(engine_count, running);
        parts.gear_down = on_ground;
        parts.spoilers_out = false;
        if !change.is_null() && change.is_const_decelerating() {
            parts.spoilers_out = true;
            parts.set_flaps_percent(FLAPS_TRANSITION_PERCENT);
        } else {
            parts.set_flaps_percent(0);
        }
    } else {
        parts.engines = engines(engine_count, true);
        parts.gear_down = true;
        parts.spoilers_out = false;
    }

    let params = model.guess_parameters();
    let below_rotate = params
        .rotate_speed_kts
        .is_some_and(|vr| situation.ground_speed_kts < vr);

    let climbing = if change.is_null() {
        situation.pitch_deg > CLIMB_PITCH_DEG
    } else {
        change.is_rotating_up() || change.is_const_ascending()
    };
    let landing = !change.is_null() && change.is_const_descending();
    let transition_agl_ft = if climbing {
        CLIMB_TRANSITION_AGL_FT
    } else {
        TRANSITION_AGL_FT
    };

    match situation.height_above_ground_ft() {
        Some(agl) if agl < NEAR_GROUND_AGL_FT => {
            parts.gear_down = true;
            parts.set_flaps_percent(FLAPS_APPROACH_PERCENT);
        }
        Some(agl) if agl < transition_agl_ft => {
            parts.gear_down = !climbing && (below_rotate || landing);
            parts.set_flaps_percent(FLAPS_TRANSITION_PERCENT);
        }
        Some(_) => {
            parts.gear_down = false;
            parts.set_flaps_percent(0);
        }
        None => {
            let reliable = !matches!(details, GroundDetails::NotSet | GroundDetails::OnGroundByGuessing);
            if reliable && !model.vtol {
                parts.gear_down = below_rotate;
            }
        }
    }
    parts
}

/// Inputs of one parts selection.
#[derive(Debug, Clone, Copy)]
pub struct PartsRequest<'a> {
    pub now_ms: i64,
    /// Reported parts, latest first.
    pub parts: &'a [AircraftParts],
    /// Situation to guess from, None before the first situation.
    pub situation: Option<&'a AircraftSituation>,
    pub change: &'a AircraftSituationChange,
    pub model: &'a AircraftModel,
    /// Interpolator counter plus aircraft index.
    pub step_index: u64,
}

/// Outcome of one parts selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PartsSelection {
    pub parts: Option<AircraftParts>,
    pub status: PartsStatus,
    /// Parts were selected or guessed in this step.
    pub refreshed: bool,
}

/// Picks or guesses the parts of one aircraft.
#[derive(Debug, Clone)]
pub struct PartsSelector {
    callsign: Callsign,
    interpolation_ratio: u64,
    guessing_ratio: u64,
    last_parts: Option<AircraftParts>,
    warned_no_parts: bool,
}

impl PartsSelector {
    /// Create a selector. Ratios below 1 are raised to 1.
    pub fn new(callsign: Callsign, interpolation_ratio: u32, guessing_ratio: u32) -> Self {
        Self {
            callsign,
            interpolation_ratio: u64::from(interpolation_ratio.max(1)),
            guessing_ratio: u64::from(guessing_ratio.max(1)),
            last_parts: None,
            warned_no_parts: false,
        }
    }

    /// Select parts for one step.
    pub fn select(&mut self, request: &PartsRequest<'_>) -> PartsSelection {
        let has_reported = !request.parts.is_empty();
        let need_refresh = match &self.last_parts {
            None => true,
            Some(last) => last.is_guessed() && has_reported,
        };
        let do_interpolation = need_refresh || request.step_index % self.interpolation_ratio == 0;
        let do_guess = need_refresh || request.step_index % self.guessing_ratio == 0;

        let mut selection = PartsSelection {
            status: PartsStatus {
                supports_parts: has_reported,
                reused_parts: false,
            },
            ..PartsSelection::default()
        };

        if has_reported && do_interpolation {
            selection.parts = latest_reported(request.parts, request.now_ms).cloned();
        } else if !has_reported && do_guess {
            selection.parts = request
                .situation
                .map(|situation| guess_parts(situation, request.change, request.model));
        }

        match selection.parts.take() {
            Some(parts) => {
                selection.refreshed = true;
                self.last_parts = Some(parts.clone());
                selection.parts = Some(parts);
            }
            None => {
                selection.parts = self.last_parts.clone();
                selection.status.reused_parts = selection.parts.is_some();
            }
        }

        if selection.parts.is_none() && !self.warned_no_parts {
            self.warned_no_parts = true;
            warn!(callsign = %self.callsign, "no parts available yet");
        } else if selection.refreshed && selection.parts.as_ref().is_some_and(|p| p.is_guessed()) {
            trace!(callsign = %self.callsign, step = request.step_index, "parts guessed");
        }
        selection
    }

    /// Parts of the latest step that produced any.
    pub fn last_parts(&self) -> Option<&AircraftParts> {
        self.last_parts.as_ref()
    }

    pub fn reset(&mut self) {
        self.last_parts = None;
        self.warned_no_parts = false;
    }
}
