//! The per-callsign interpolator.
//!
//! [`Interpolator`] is the single entry point of the engine. The render
//! driver owns one per remote aircraft and calls
//! [`interpolate`](Interpolator::interpolate) once per frame.
//!
//! # Step
//!
//! 1. Return the cached result if nothing changed since the last step
//! 2. Refresh the cached situations (and the change) if the history was
//!    written since the last refresh
//! 3. Refresh the model CG every Nth step, or at once if none is known
//! 4. Run the strategy, resolve the ground elevation, blend or guess the
//!    ground contact, correct the altitude
//! 5. Select or guess parts (decimated)
//! 6. Emit diagnostic records and advance the state machine
//!
//! # Degradation
//!
//! Once a valid situation was produced, a step never hands out `None`
//! while the aircraft is in range: invalid interpolants and data gaps
//! return the last valid situation flagged as `same_situation`.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(RemoteAircraftStore::default());
//! let mut interpolator = Interpolator::new(callsign, store.clone(), cg_cache, EngineConfig::default());
//!
//! let result = interpolator.interpolate(now_ms, &InterpolationSetup::default(), 0);
//! if let Some(situation) = result.situation {
//!     driver.render(&situation, result.parts.as_ref());
//! }
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::aviation::{
    AircraftModel, AircraftParts, AircraftSituation, AircraftSituationChange, AltitudeCorrection,
    Callsign, GroundDetails,
};
use crate::coord::SINGLE_POINT_RADIUS_M;
use crate::provider::{CgCache, ElevationProvider, RemoteAircraftProvider, SimulationEnvironmentProvider};

use super::elevation::GroundElevationResolver;
use super::interpolant::{InterpolantContext, InterpolantError, InterpolationStrategy};
use super::linear::LinearStrategy;
use super::logger::{InterpolationLogSink, PartsLog, SituationLog};
use super::parts::{PartsRequest, PartsSelector};
use super::setup::{EngineConfig, InterpolationSetup, InterpolatorMode};
use super::spline::SplineStrategy;
use super::state::{InterpolatorState, StepOutcome};
use super::status::{InterpolationResult, InterpolationStatus, PartsStatus};

/// Minimum window between two invalid-step log messages.
const MIN_INVALID_LOG_WINDOW_MS: i64 = 1000;

/// Everything a step result depends on.
#[derive(Debug, Clone, PartialEq)]
struct StepKey {
    now_ms: i64,
    situations_modified: i64,
    parts_modified: i64,
    setup: InterpolationSetup,
    aircraft_index: u32,
}

/// Interpolates one remote aircraft.
pub struct Interpolator {
    callsign: Callsign,
    provider: Arc<dyn RemoteAircraftProvider>,
    cg_cache: Arc<CgCache>,
    environment: Option<Arc<dyn SimulationEnvironmentProvider>>,
    elevation: Option<Arc<dyn ElevationProvider>>,
    logger: Option<Arc<dyn InterpolationLogSink>>,
    config: EngineConfig,

    strategy: Box<dyn InterpolationStrategy>,
    resolver: GroundElevationResolver,
    parts_selector: PartsSelector,
    state: InterpolatorState,

    model_override: Option<AircraftModel>,
    model: AircraftModel,
    cg_ft: Option<f64>,

    situations: Vec<AircraftSituation>,
    situations_modified: i64,
    parts: Vec<AircraftParts>,
    parts_modified: i64,
    change: AircraftSituationChange,
    /// `fix_scenery_offset` the cached situations were analyzed with.
    scenery_fix_enabled: bool,

    last_situation: Option<AircraftSituation>,
    last_step: Option<(StepKey, InterpolationResult)>,
    counter: u64,
    invalid_situations: u64,
    invalid_logged: u64,
    last_invalid_log_ms: Option<i64>,
    had_valid: bool,
    first_interpolation_ms: Option<i64>,
}

impl Interpolator {
    /// Create an interpolator with the strategy selected by `config.mode`.
    pub fn new(
        callsign: Callsign,
        provider: Arc<dyn RemoteAircraftProvider>,
        cg_cache: Arc<CgCache>,
        config: EngineConfig,
    ) -> Self {
        let config = config.normalized();
        let strategy: Box<dyn InterpolationStrategy> = match config.mode {
            InterpolatorMode::Linear => Box::new(LinearStrategy::new()),
            InterpolatorMode::Spline => Box::new(SplineStrategy::new()),
        };
        let parts_selector = PartsSelector::new(
            callsign.clone(),
            config.parts_interpolation_ratio,
            config.parts_guessing_ratio,
        );
        let model = AircraftModel::default().with_callsign(callsign.clone());
        debug!(callsign = %callsign, strategy = strategy.name(), "interpolator created");

        Self {
            callsign,
            provider,
            cg_cache,
            environment: None,
            elevation: None,
            logger: None,
            config,
            strategy,
            resolver: GroundElevationResolver::new(),
            parts_selector,
            state: InterpolatorState::default(),
            model_override: None,
            model,
            cg_ft: None,
            situations: Vec::new(),
            situations_modified: 0,
            parts: Vec::new(),
            parts_modified: 0,
            change: AircraftSituationChange::null(),
            scenery_fix_enabled: false,
            last_situation: None,
            last_step: None,
            counter: 0,
            invalid_situations: 0,
            invalid_logged: 0,
            last_invalid_log_ms: None,
            had_valid: false,
            first_interpolation_ms: None,
        }
    }

    /// Use a simulation environment for CG lookups.
    pub fn with_environment(mut self, environment: Arc<dyn SimulationEnvironmentProvider>) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Use an elevation provider for missing elevations.
    pub fn with_elevation_provider(mut self, elevation: Arc<dyn ElevationProvider>) -> Self {
        self.elevation = Some(elevation);
        self
    }

    /// Attach a diagnostic sink. Records are only emitted while the setup
    /// enables `log_interpolation`.
    pub fn attach_logger(&mut self, logger: Arc<dyn InterpolationLogSink>) {
        self.logger = Some(logger);
    }

    pub fn detach_logger(&mut self) {
        self.logger = None;
    }

    /// Override the model reported by the provider. Forces a CG refresh.
    pub fn set_model(&mut self, model: AircraftModel) {
        self.model_override = Some(model);
        self.cg_ft = None;
        self.situations_modified = 0;
        self.last_step = None;
    }

    // ── step ───────────────────────────────────────────────────────────────

    /// Interpolate the aircraft at `now_ms`.
    ///
    /// `aircraft_index` spreads decimated work across frames; pass the
    /// aircraft's position in the caller's list.
    pub fn interpolate(
        &mut self,
        now_ms: i64,
        setup: &InterpolationSetup,
        aircraft_index: u32,
    ) -> InterpolationResult {
        let key = StepKey {
            now_ms,
            situations_modified: self.provider.situations_last_modified(&self.callsign),
            parts_modified: self.provider.parts_last_modified(&self.callsign),
            setup: *setup,
            aircraft_index,
        };
        if let Some((last_key, last_result)) = &self.last_step {
            if *last_key == key {
                return last_result.clone();
            }
            if now_ms < last_key.now_ms {
                let mut result = last_result.clone();
                result.status.same_situation = result.situation.is_some();
                result.status.interpolated = false;
                return result;
            }
        }

        if key.situations_modified != self.situations_modified
            || setup.fix_scenery_offset != self.scenery_fix_enabled
        {
            self.refresh_situations(key.situations_modified, setup);
        }
        if key.parts_modified != self.parts_modified {
            self.parts = self.provider.parts(&self.callsign);
            self.parts_modified = key.parts_modified;
        }

        let result = if self.situations.is_empty() {
            self.no_situations_step()
        } else {
            self.interpolation_step(now_ms, setup, aircraft_index)
        };
        self.last_step = Some((key, result.clone()));
        result
    }

    fn interpolation_step(
        &mut self,
        now_ms: i64,
        setup: &InterpolationSetup,
        aircraft_index: u32,
    ) -> InterpolationResult {
        self.counter += 1;
        let step_index = self.counter + u64::from(aircraft_index);
        let cg_due = self.cg_ft.is_none() || step_index % u64::from(self.config.cg_refresh_interval) == 0;
        if cg_due && self.refresh_cg() {
            // scenery offsets depend on the CG, start over from the provider's copy
            self.refresh_situations(self.situations_modified, setup);
            if self.situations.is_empty() {
                return self.no_situations_step();
            }
        }
        let cg_ft = self.cg_or_default();

        let mut status = InterpolationStatus {
            situations_count: self.situations.len(),
            ..InterpolationStatus::default()
        };

        let ctx = InterpolantContext {
            situations: &self.situations,
            now_ms,
            cg_ft,
            elevation: self.elevation.as_deref(),
            version: self.situations_modified,
        };
        let interpolant = self.strategy.interpolant(&ctx);

        let (situation, outcome, log) = match interpolant {
            Ok(interpolant) => {
                let mut situation = interpolant.end.clone();
                situation.timestamp_ms = interpolant.interpolated_time_ms;
                situation.time_offset_ms = interpolant.time_offset_ms;
                situation.position = interpolant.position;
                situation.altitude_ft = interpolant.altitude_ft;
                situation.set_pitch(interpolant.pbh.pitch_deg);
                situation.set_bank(interpolant.pbh.bank_deg);
                situation.set_heading(interpolant.pbh.heading_deg);
                situation.ground_speed_kts = interpolant.ground_speed_kts;
                situation.cg_ft = Some(cg_ft);
                if interpolant.interpolated {
                    situation.reset_ground_elevation();
                    situation.on_ground = Default::default();
                }

                self.resolver.resolve(
                    &mut situation,
                    &interpolant,
                    &self.change,
                    self.last_situation.as_ref(),
                    self.elevation.as_deref(),
                );

                let factor_interpolated = match interpolant.on_ground {
                    Some(on_ground) => {
                        situation.on_ground = on_ground;
                        true
                    }
                    None => {
                        self.guess_ground(&mut situation);
                        false
                    }
                };

                let correction = if !factor_interpolated
                    && situation.on_ground.details() != GroundDetails::OnGroundByGuessing
                {
                    situation.correct_altitude(cg_ft, true)
                } else {
                    AltitudeCorrection::NoCorrection
                };

                if situation.is_on_ground() {
                    if let Some(pitch) = setup.pitch_on_ground_deg {
                        situation.set_pitch(pitch);
                    }
                }

                let log = SituationLog {
                    timestamp_ms: now_ms,
                    callsign: self.callsign.clone(),
                    interpolator: self.strategy.name(),
                    situation: situation.clone(),
                    bracket: Some((interpolant.start.clone(), interpolant.end.clone())),
                    fraction: interpolant.fraction,
                    ground_factor: situation.on_ground.factor(),
                    altitude_correction: correction,
                    interpolant_recalculated: interpolant.recalculated,
                    change: self.change.clone(),
                    setup: *setup,
                    cg_ft,
                    invalid_situations: self.invalid_situations,
                    situations_count: self.situations.len(),
                    error: None,
                };

                if situation.is_valid_vector_range() {
                    status.interpolated = interpolant.interpolated;
                    (Some(situation), StepOutcome::Valid, log)
                } else {
                    (None, StepOutcome::Invalid, SituationLog {
                        error: Some(InterpolantError::InvalidVector.to_string()),
                        ..log
                    })
                }
            }
            Err(error) => {
                let log = SituationLog {
                    timestamp_ms: now_ms,
                    callsign: self.callsign.clone(),
                    interpolator: self.strategy.name(),
                    situation: self
                        .last_situation
                        .clone()
                        .unwrap_or_else(|| self.situations[0].clone()),
                    bracket: None,
                    fraction: 0.0,
                    ground_factor: 0.0,
                    altitude_correction: AltitudeCorrection::NoCorrection,
                    interpolant_recalculated: false,
                    change: self.change.clone(),
                    setup: *setup,
                    cg_ft,
                    invalid_situations: self.invalid_situations,
                    situations_count: self.situations.len(),
                    error: Some(error.to_string()),
                };
                (None, StepOutcome::Invalid, log)
            }
        };

        let situation = match situation {
            Some(situation) => {
                self.had_valid = true;
                if self.first_interpolation_ms.is_none() {
                    self.first_interpolation_ms = Some(now_ms);
                    info!(callsign = %self.callsign, strategy = self.strategy.name(), "first interpolation");
                }
                self.last_situation = Some(situation.clone());
                Some(situation)
            }
            None => {
                self.invalid_situations += 1;
                let error = log.error.clone().unwrap_or_default();
                self.log_invalid(now_ms, &error);
                status.add_info(&error);
                status.same_situation = self.last_situation.is_some();
                self.last_situation.clone()
            }
        };

        let (parts, parts_status) = self.select_parts(now_ms, setup, situation.as_ref(), step_index);
        if setup.log_interpolation {
            self.emit_logs(log, now_ms, &parts, &parts_status);
        }
        self.transition(outcome);

        InterpolationResult {
            situation,
            parts,
            status,
            parts_status,
        }
    }

    fn no_situations_step(&mut self) -> InterpolationResult {
        let mut status = InterpolationStatus::default();
        if !self.provider.is_aircraft_in_range(&self.callsign) {
            status.add_info(&format!("Unknown remote aircraft: '{}'", self.callsign));
            self.transition(StepOutcome::OutOfRange);
            return InterpolationResult {
                status,
                ..InterpolationResult::default()
            };
        }

        status.add_info(&format!("No situations, but remote aircraft '{}'", self.callsign));
        status.same_situation = self.last_situation.is_some();
        let parts = self.parts_selector.last_parts().cloned();
        let parts_status = PartsStatus {
            supports_parts: !self.parts.is_empty(),
            reused_parts: parts.is_some(),
        };
        self.transition(StepOutcome::NoData);
        InterpolationResult {
            situation: self.last_situation.clone(),
            parts,
            status,
            parts_status,
        }
    }

    // ── ground ─────────────────────────────────────────────────────────────

    /// Carry over reliable ground info of a stationary aircraft, else guess.
    fn guess_ground(&self, situation: &mut AircraftSituation) {
        if let Some(last) = &self.last_situation {
            let last_details = last.on_ground.details();
            let reliable = !matches!(
                last_details,
                GroundDetails::NotSet | GroundDetails::OnGroundByGuessing
            );
            let same_position = last.equal_normal_vector(situation)
                || last.distance_m(situation) < SINGLE_POINT_RADIUS_M;
            if reliable
                && situation.should_guess_on_ground()
                && !situation.is_moving()
                && same_position
            {
                situation.on_ground = last.on_ground.with_details(GroundDetails::FromCache);
                return;
            }
        }
        self.change.guess_on_ground(situation, &self.model);
    }

    // ── parts ──────────────────────────────────────────────────────────────

    fn select_parts(
        &mut self,
        now_ms: i64,
        setup: &InterpolationSetup,
        situation: Option<&AircraftSituation>,
        step_index: u64,
    ) -> (Option<AircraftParts>, PartsStatus) {
        if !setup.enable_parts {
            return (None, PartsStatus::default());
        }
        let selection = self.parts_selector.select(&PartsRequest {
            now_ms,
            parts: &self.parts,
            situation,
            change: &self.change,
            model: &self.model,
            step_index,
        });
        (selection.parts, selection.status)
    }

    // ── refresh ────────────────────────────────────────────────────────────

    fn refresh_situations(&mut self, modified: i64, setup: &InterpolationSetup) {
        self.situations = self.provider.situations(&self.callsign);
        self.situations_modified = modified;
        // cached derivatives were built from the previous copy
        self.strategy.reset();
        self.refresh_model();
        debug_assert!(
            crate::provider::history::is_sorted_latest_first(self.situations.iter()),
            "provider situations must be sorted latest first"
        );
        self.analyze_change(setup);
    }

    fn analyze_change(&mut self, setup: &InterpolationSetup) {
        let window = self.situations.len().min(self.config.change_window);
        self.change = AircraftSituationChange::analyze(&self.situations[..window], self.cg_ft, self.model.vtol);
        self.scenery_fix_enabled = setup.fix_scenery_offset;

        if !setup.fix_scenery_offset || !self.model.has_cg() {
            return;
        }
        if let Some(deviation_cg_ft) = self.change.scenery_deviation_cg_ft() {
            for situation in &mut self.situations {
                situation.add_altitude_offset(-deviation_cg_ft);
            }
            debug!(
                callsign = %self.callsign,
                offset_ft = -deviation_cg_ft,
                hint = %self.change.scenery_hint(),
                "scenery offset applied"
            );
        }
    }

    fn refresh_model(&mut self) {
        let model = self
            .model_override
            .clone()
            .or_else(|| self.provider.aircraft_model(&self.callsign));
        if let Some(mut model) = model {
            if model.callsign.is_empty() {
                model.callsign = self.callsign.clone();
            }
            if model.cg_ft.is_none() {
                model.cg_ft = self.cg_ft;
            }
            self.model = model;
        }
    }

    /// Returns true if the CG changed.
    fn refresh_cg(&mut self) -> bool {
        let model_string = self.model.model_string.clone();
        let from_environment = self.environment.as_ref().and_then(|env| {
            let db_cg = env.cg_from_database(&self.callsign);
            env.simulator_or_db_cg(&self.callsign, db_cg)
        });
        if let Some(cg) = from_environment {
            self.cg_cache.remember(&model_string, cg);
        }
        let cg = from_environment
            .or_else(|| self.cg_cache.get(&model_string))
            .or(self.model.cg_ft)
            .unwrap_or_else(|| self.model.guess_parameters().cg_ft);

        self.model.cg_ft = Some(cg);
        if self.cg_ft == Some(cg) {
            return false;
        }
        debug!(callsign = %self.callsign, cg_ft = cg, model = %model_string, "CG updated");
        self.cg_ft = Some(cg);
        true
    }

    fn cg_or_default(&self) -> f64 {
        self.cg_ft
            .unwrap_or_else(|| self.model.guess_parameters().cg_ft)
    }

    // ── diagnostics ────────────────────────────────────────────────────────

    /// One message per recovery window; the first at debug, later ones at warn.
    fn log_invalid(&mut self, now_ms: i64, error: &str) {
        let window_ms = self
            .last_situation
            .as_ref()
            .map(|s| s.time_offset_ms)
            .unwrap_or(0)
            .max(MIN_INVALID_LOG_WINDOW_MS);
        let due = self
            .last_invalid_log_ms
            .map_or(true, |last| now_ms - last >= window_ms);
        if !due {
            return;
        }
        self.last_invalid_log_ms = Some(now_ms);
        if self.invalid_logged == 0 {
            debug!(
                callsign = %self.callsign,
                invalid = self.invalid_situations,
                error,
                "invalid interpolation, reusing last situation"
            );
        } else {
            warn!(
                callsign = %self.callsign,
                invalid = self.invalid_situations,
                error,
                "invalid interpolation, reusing last situation"
            );
        }
        self.invalid_logged += 1;
    }

    fn emit_logs(
        &self,
        situation_log: SituationLog,
        now_ms: i64,
        parts: &Option<AircraftParts>,
        parts_status: &PartsStatus,
    ) {
        let Some(logger) = &self.logger else {
            return;
        };
        logger.log_situation(situation_log);
        logger.log_parts(PartsLog {
            timestamp_ms: now_ms,
            callsign: self.callsign.clone(),
            reported_count: self.parts.len(),
            parts: parts.clone(),
            empty: parts.is_none(),
            reused: parts_status.reused_parts,
        });
    }

    fn transition(&mut self, outcome: StepOutcome) {
        let next = self.state.next(outcome, self.had_valid);
        if next != self.state {
            debug!(callsign = %self.callsign, from = %self.state, to = %next, "interpolator state changed");
            self.state = next;
        }
    }

    // ── lifecycle ──────────────────────────────────────────────────────────

    /// Mark the aircraft as out of range. Terminal.
    pub fn retire(&mut self) {
        self.transition(StepOutcome::OutOfRange);
        self.strategy.reset();
        self.situations.clear();
        self.parts.clear();
        self.last_step = None;
    }

    /// Forget the last interpolated situation and parts.
    pub fn reset_last_interpolation(&mut self) {
        self.last_situation = None;
        self.last_step = None;
        self.parts_selector.reset();
        self.strategy.reset();
    }

    // ── accessors ──────────────────────────────────────────────────────────

    pub fn callsign(&self) -> &Callsign {
        &self.callsign
    }

    pub fn state(&self) -> InterpolatorState {
        self.state
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn model(&self) -> &AircraftModel {
        &self.model
    }

    pub fn cg_ft(&self) -> Option<f64> {
        self.cg_ft
    }

    pub fn change(&self) -> &AircraftSituationChange {
        &self.change
    }

    pub fn last_situation(&self) -> Option<&AircraftSituation> {
        self.last_situation.as_ref()
    }

    pub fn last_parts(&self) -> Option<&AircraftParts> {
        self.parts_selector.last_parts()
    }

    /// Steps that computed a result (cached repeats excluded).
    pub fn counter(&self) -> u64 {
        self.counter
    }

    pub fn invalid_situations(&self) -> u64 {
        self.invalid_situations
    }

    pub fn elevation_resolver(&self) -> &GroundElevationResolver {
        &self.resolver
    }

    /// One line summary for diagnostics.
    pub fn interpolator_info(&self) -> String {
        format!(
            "{} [{}] {} situations {} parts {} steps {} invalid {} first interpolation {} elevation {}",
            self.callsign,
            self.strategy.name(),
            self.state,
            self.situations.len(),
            self.parts.len(),
            self.counter,
            self.invalid_situations,
            self.first_interpolation_ms
                .map(|ms| ms.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.resolver.elevation_info()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aviation::{ElevationInfo, OnGround, OnGroundInfo};
    use crate::coord::GeoPosition;
    use crate::interpolation::InterpolationLogger;
    use crate::provider::{RemoteAircraftStore, SimulationEnvironment};

    fn callsign() -> Callsign {
        Callsign::new("ORC1")
    }

    fn situation(ts: i64, lon: f64, altitude_ft: f64) -> AircraftSituation {
        AircraftSituation::new(callsign(), ts, GeoPosition::from_degrees(47.0, lon), altitude_ft)
            .with_time_offset(0)
            .with_ground_speed(250.0)
            .with_pbh(2.0, 0.0, 90.0)
    }

    fn setup() -> (Arc<RemoteAircraftStore>, Interpolator) {
        let store = Arc::new(RemoteAircraftStore::default());
        store.add_aircraft(callsign(), Some(AircraftModel::new("A320 CFM", "A320")));
        let interpolator = Interpolator::new(
            callsign(),
            store.clone(),
            Arc::new(CgCache::new()),
            EngineConfig::default().with_mode(InterpolatorMode::Linear),
        );
        (store, interpolator)
    }

    #[test]
    fn test_unknown_aircraft() {
        let store = Arc::new(RemoteAircraftStore::default());
        let mut interpolator =
            Interpolator::new(callsign(), store, Arc::new(CgCache::new()), EngineConfig::default());
        let result = interpolator.interpolate(1000, &InterpolationSetup::default(), 0);
        assert!(result.situation.is_none());
        assert!(result.status.extra_info.contains("Unknown remote aircraft"));
        assert_eq!(interpolator.state(), InterpolatorState::Retired);
    }

    #[test]
    fn test_in_range_without_situations() {
        let (_store, mut interpolator) = setup();
        let result = interpolator.interpolate(1000, &InterpolationSetup::default(), 0);
        assert!(result.situation.is_none());
        assert!(result.status.extra_info.contains("No situations"));
        assert_eq!(interpolator.state(), InterpolatorState::AwaitingData);
        assert_eq!(interpolator.counter(), 0);
    }

    #[test]
    fn test_interpolates_between_reports() {
        let (store, mut interpolator) = setup();
        store.push_situation(situation(1000, 8.0, 5000.0));
        store.push_situation(situation(3000, 8.01, 6000.0));

        let result = interpolator.interpolate(2000, &InterpolationSetup::default(), 0);
        let s = result.situation.unwrap();
        assert!(result.status.interpolated);
        assert!(!result.status.same_situation);
        assert_eq!(result.status.situations_count, 2);
        assert_eq!(s.altitude_ft, 5500.0);
        assert!(!s.is_on_ground());
        assert_eq!(interpolator.state(), InterpolatorState::Interpolating);
        assert!(interpolator.cg_ft().is_some());
    }

    #[test]
    fn test_repeated_call_is_cached() {
        let (store, mut interpolator) = setup();
        store.push_situation(situation(1000, 8.0, 5000.0));
        store.push_situation(situation(3000, 8.01, 6000.0));

        let setup = InterpolationSetup::default();
        let first = interpolator.interpolate(2000, &setup, 3);
        let second = interpolator.interpolate(2000, &setup, 3);
        assert_eq!(first, second);
        assert_eq!(interpolator.counter(), 1);
    }

    #[test]
    fn test_time_going_backwards_returns_last() {
        let (store, mut interpolator) = setup();
        store.push_situation(situation(1000, 8.0, 5000.0));
        store.push_situation(situation(3000, 8.01, 6000.0));

        let setup = InterpolationSetup::default();
        let forward = interpolator.interpolate(2500, &setup, 0);
        let backward = interpolator.interpolate(2000, &setup, 0);
        assert_eq!(backward.situation, forward.situation);
        assert!(backward.status.same_situation);
    }

    #[test]
    fn test_invalid_step_reuses_last() {
        let (store, mut interpolator) = setup();
        store.push_situation(situation(1000, 8.0, 5000.0));
        store.push_situation(situation(3000, 8.01, 6000.0));
        let setup = InterpolationSetup::default();
        let valid = interpolator.interpolate(2000, &setup, 0).situation.unwrap();

        let mut broken = situation(5000, 8.02, 7000.0);
        broken.position = GeoPosition::from_normal_vector([f64::NAN, 0.0, 0.0]);
        store.push_situation(broken);

        let result = interpolator.interpolate(4000, &setup, 0);
        assert_eq!(result.situation, Some(valid));
        assert!(result.status.same_situation);
        assert!(!result.status.interpolated);
        assert_eq!(interpolator.invalid_situations(), 1);
        assert_eq!(interpolator.state(), InterpolatorState::DegradedReuse);
    }

    #[test]
    fn test_pitch_on_ground_override() {
        let (store, mut interpolator) = setup();
        let on_ground = OnGroundInfo::new(OnGround::OnGround, GroundDetails::FromNetwork);
        store.push_situation(situation(1000, 8.0, 500.0).with_ground_speed(10.0).with_on_ground(on_ground));
        store.push_situation(situation(3000, 8.0001, 500.0).with_ground_speed(10.0).with_on_ground(on_ground));

        let setup = InterpolationSetup {
            pitch_on_ground_deg: Some(-1.5),
            ..InterpolationSetup::default()
        };
        let s = interpolator.interpolate(2000, &setup, 0).situation.unwrap();
        assert!(s.is_on_ground());
        assert_eq!(s.on_ground.details(), GroundDetails::Interpolated);
        assert_eq!(s.pitch_deg, -1.5);
    }

    #[test]
    fn test_parts_disabled() {
        let (store, mut interpolator) = setup();
        store.push_situation(situation(1000, 8.0, 5000.0));
        store.push_parts(&callsign(), AircraftParts::new(1000).with_time_offset(0));
        let setup = InterpolationSetup {
            enable_parts: false,
            ..InterpolationSetup::default()
        };
        let result = interpolator.interpolate(2000, &setup, 0);
        assert!(result.situation.is_some());
        assert!(result.parts.is_none());
    }

    #[test]
    fn test_environment_cg_cached_by_model() {
        let store = Arc::new(RemoteAircraftStore::default());
        store.add_aircraft(callsign(), Some(AircraftModel::new("A320 CFM", "A320")));
        let environment = Arc::new(SimulationEnvironment::new());
        environment.set_simulator_cg(callsign(), 11.0);
        let cg_cache = Arc::new(CgCache::new());
        let mut interpolator =
            Interpolator::new(callsign(), store.clone(), cg_cache.clone(), EngineConfig::default())
                .with_environment(environment);
        store.push_situation(situation(1000, 8.0, 5000.0));

        interpolator.interpolate(1000, &InterpolationSetup::default(), 0);
        assert_eq!(interpolator.cg_ft(), Some(11.0));
        assert_eq!(cg_cache.get("A320 CFM"), Some(11.0));
        assert_eq!(interpolator.model().cg_ft, Some(11.0));
    }

    #[test]
    fn test_cg_falls_back_to_category_guess() {
        let (store, mut interpolator) = setup();
        store.push_situation(situation(1000, 8.0, 5000.0));
        interpolator.interpolate(1000, &InterpolationSetup::default(), 0);
        let expected = AircraftModel::new("A320 CFM", "A320").guess_parameters().cg_ft;
        assert_eq!(interpolator.cg_ft(), Some(expected));
    }

    #[test]
    fn test_cg_change_within_bracket() {
        let store = Arc::new(RemoteAircraftStore::default());
        store.add_aircraft(callsign(), Some(AircraftModel::new("A320 CFM", "A320")));
        let on_ground = OnGroundInfo::new(OnGround::OnGround, GroundDetails::FromNetwork);
        for i in 0..4 {
            store.push_situation(
                situation(i * 5000, 8.0 + i as f64 * 0.0003, 105.0)
                    .with_ground_speed(10.0)
                    .with_ground_elevation(100.0, ElevationInfo::FromNetwork)
                    .with_on_ground(on_ground),
            );
        }
        let environment = Arc::new(SimulationEnvironment::new());
        environment.set_simulator_cg(callsign(), 20.0);
        let config = EngineConfig {
            cg_refresh_interval: 10,
            ..EngineConfig::default().with_mode(InterpolatorMode::Spline)
        };
        let mut interpolator =
            Interpolator::new(callsign(), store.clone(), Arc::new(CgCache::new()), config.clone())
                .with_environment(environment.clone());
        let setup = InterpolationSetup::default();

        let first = interpolator.interpolate(10_000, &setup, 0).situation.unwrap();
        assert!((first.altitude_ft - 120.0).abs() < 1e-6);

        let mut last = None;
        for i in 1..40 {
            if i == 10 {
                environment.set_simulator_cg(callsign(), 8.0);
            }
            last = interpolator.interpolate(10_000 + i * 100, &setup, 0).situation;
        }
        assert_eq!(interpolator.cg_ft(), Some(8.0));
        let last = last.unwrap();

        let mut fresh = Interpolator::new(callsign(), store, Arc::new(CgCache::new()), config)
            .with_environment(environment);
        let expected = fresh.interpolate(13_900, &setup, 0).situation.unwrap();
        assert!((last.altitude_ft - 108.0).abs() < 1e-6, "altitude {}", last.altitude_ft);
        assert!((last.altitude_ft - expected.altitude_ft).abs() < 1e-9);
    }

    #[test]
    fn test_scenery_fix_toggle_reapplies_offsets() {
        let (store, mut interpolator) = setup();
        let cg = AircraftModel::new("A320 CFM", "A320").guess_parameters().cg_ft;
        let ground = OnGroundInfo::new(OnGround::OnGround, GroundDetails::FromNetwork);
        let airborne = OnGroundInfo::new(OnGround::NotOnGround, GroundDetails::FromNetwork);
        // reported 10ft above our ground + CG, just lifting off
        for (ts, lon, on_ground) in [(1000, 8.0, ground), (3000, 8.001, ground), (5000, 8.002, airborne)] {
            store.push_situation(
                situation(ts, lon, 100.0 + cg + 10.0)
                    .with_ground_speed(140.0)
                    .with_ground_elevation(100.0, ElevationInfo::FromNetwork)
                    .with_on_ground(on_ground),
            );
        }
        let off = InterpolationSetup::default();
        let on = InterpolationSetup {
            fix_scenery_offset: true,
            ..InterpolationSetup::default()
        };

        let unfixed = interpolator.interpolate(4000, &off, 0).situation.unwrap();
        assert!((unfixed.altitude_ft - (100.0 + cg + 5.0)).abs() < 1e-6);

        let fixed = interpolator.interpolate(4000, &on, 0).situation.unwrap();
        assert!((fixed.altitude_ft - (100.0 + cg)).abs() < 1e-6, "altitude {}", fixed.altitude_ft);
        assert!(interpolator.change().has_scenery_deviation());

        let restored = interpolator.interpolate(4000, &off, 0).situation.unwrap();
        assert!((restored.altitude_ft - unfixed.altitude_ft).abs() < 1e-9);
    }

    #[test]
    fn test_logs_only_when_enabled() {
        let (store, mut interpolator) = setup();
        let logger = Arc::new(InterpolationLogger::default());
        interpolator.attach_logger(logger.clone());
        store.push_situation(situation(1000, 8.0, 5000.0));
        store.push_situation(situation(3000, 8.01, 6000.0));

        interpolator.interpolate(1500, &InterpolationSetup::default(), 0);
        assert_eq!(logger.situation_log_count(), 0);

        let setup = InterpolationSetup {
            log_interpolation: true,
            ..InterpolationSetup::default()
        };
        let result = interpolator.interpolate(2000, &setup, 0);
        let record = logger.last_situation_log(&callsign()).unwrap();
        assert_eq!(Some(record.situation), result.situation);
        assert_eq!(record.interpolator, "linear");
        assert_eq!(logger.parts_log_count(), 1);
    }

    #[test]
    fn test_retire() {
        let (store, mut interpolator) = setup();
        store.push_situation(situation(1000, 8.0, 5000.0));
        interpolator.interpolate(1000, &InterpolationSetup::default(), 0);
        interpolator.retire();
        assert!(interpolator.state().is_retired());
        assert!(interpolator.interpolator_info().contains("retired"));
    }
}
