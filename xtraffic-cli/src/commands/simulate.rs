//! Simulate command - replay synthetic traffic through the engine.
//!
//! A producer thread pushes position reports (and parts for every other
//! aircraft) into a shared store at network cadence. The main thread runs
//! one interpolator per callsign at the render rate and prints samples.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use tracing::{debug, info};
use xtraffic::interpolation::{InterpolationLogger, InterpolationResult, Interpolator, InterpolatorMode};
use xtraffic::logging::init_logging;
use xtraffic::provider::{CgCache, ElevationCache, RemoteAircraftStore, DEFAULT_ELEVATION_CACHE_CAPACITY};

use super::load_config;
use crate::error::CliError;
use crate::scenario::{Scenario, SimClock, REPORT_INTERVAL_MS};

/// Producer poll interval while waiting for the next report.
const PRODUCER_POLL: Duration = Duration::from_millis(20);

/// Interpolator selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// Blend the two situations around the render time
    Linear,
    /// Cubic spline through the three latest situations
    Spline,
}

impl From<ModeArg> for InterpolatorMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Linear => InterpolatorMode::Linear,
            ModeArg::Spline => InterpolatorMode::Spline,
        }
    }
}

/// Arguments for the simulate command.
pub struct SimulateArgs {
    pub config: Option<PathBuf>,
    pub mode: Option<ModeArg>,
    pub aircraft: usize,
    pub hz: u32,
    pub seconds: u64,
    pub jitter_ms: u64,
    pub every: u64,
}

impl SimulateArgs {
    fn validate(&self) -> Result<(), CliError> {
        if self.aircraft == 0 {
            return Err(CliError::InvalidArgument("--aircraft must be at least 1".to_string()));
        }
        if self.hz == 0 || self.hz > 1000 {
            return Err(CliError::InvalidArgument("--hz must be within 1..1000".to_string()));
        }
        if self.every == 0 {
            return Err(CliError::InvalidArgument("--every must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> Result<(), CliError> {
    args.validate()?;
    let config = load_config(args.config.as_deref())?;
    let _logging = init_logging(&config.logging).map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let mut engine = config.engine();
    if let Some(mode) = args.mode {
        engine.mode = mode.into();
    }
    let setup = config.setup();
    info!(
        aircraft = args.aircraft,
        hz = args.hz,
        seconds = args.seconds,
        mode = %engine.mode,
        setup = %setup,
        "starting simulation"
    );

    let scenario = Scenario::new(args.aircraft, args.jitter_ms);
    let store = Arc::new(RemoteAircraftStore::new(engine.max_situations, engine.max_parts));
    for (index, callsign) in scenario.callsigns().into_iter().enumerate() {
        store.add_aircraft(callsign, Some(scenario.model(index)));
    }
    let elevation = Arc::new(ElevationCache::new(DEFAULT_ELEVATION_CACHE_CAPACITY));
    elevation.remember(scenario.field_plane());
    let cg_cache = Arc::new(CgCache::new());
    let logger = Arc::new(InterpolationLogger::new(engine.max_log_entries));

    let mut interpolators: Vec<Interpolator> = scenario
        .callsigns()
        .into_iter()
        .map(|callsign| {
            let mut interpolator = Interpolator::new(callsign, store.clone(), cg_cache.clone(), engine.clone())
                .with_elevation_provider(elevation.clone());
            interpolator.attach_logger(logger.clone());
            interpolator
        })
        .collect();

    let clock = SimClock::start();
    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let store = store.clone();
        let scenario = scenario.clone();
        let stop = stop.clone();
        thread::Builder::new()
            .name("traffic-producer".to_string())
            .spawn(move || produce(&store, &scenario, clock, &stop))
            .map_err(|e| CliError::Producer(e.to_string()))?
    };

    let frame = Duration::from_secs_f64(1.0 / f64::from(args.hz));
    let frames = args.seconds * u64::from(args.hz);
    for frame_no in 0..frames {
        let now_ms = clock.now_ms();
        for (index, interpolator) in interpolators.iter_mut().enumerate() {
            let result = interpolator.interpolate(now_ms, &setup, index as u32);
            if frame_no % args.every == 0 {
                print_sample(now_ms, interpolator, &result);
            }
        }
        thread::sleep(frame);
    }

    stop.store(true, Ordering::Relaxed);
    producer
        .join()
        .map_err(|_| CliError::Producer("producer thread panicked".to_string()))?;

    println!();
    for interpolator in &interpolators {
        println!("{}", interpolator.interpolator_info());
    }
    if setup.log_interpolation {
        println!(
            "{} situation and {} parts log records",
            logger.situation_log_count(),
            logger.parts_log_count()
        );
    }
    Ok(())
}

/// Push reports until `stop` is set.
fn produce(store: &RemoteAircraftStore, scenario: &Scenario, clock: SimClock, stop: &AtomicBool) {
    let mut seq: u64 = 0;
    while !stop.load(Ordering::Relaxed) {
        let due_ms = seq as i64 * REPORT_INTERVAL_MS;
        if clock.now_ms() < due_ms {
            thread::sleep(PRODUCER_POLL);
            continue;
        }
        for (index, callsign) in scenario.callsigns().iter().enumerate() {
            let timestamp_ms = due_ms - scenario.jitter_ms(seq, index);
            store.push_situation(scenario.situation(index, timestamp_ms));
            if scenario.reports_parts(index) {
                store.push_parts(callsign, scenario.parts(index, timestamp_ms));
            }
        }
        debug!(seq, "reports pushed");
        seq += 1;
    }
}

fn print_sample(now_ms: i64, interpolator: &Interpolator, result: &InterpolationResult) {
    let Some(situation) = &result.situation else {
        println!("{:>8} {} -- {}", now_ms, interpolator.callsign(), result.status);
        return;
    };
    let (gear, flaps) = result
        .parts
        .as_ref()
        .map(|p| (if p.gear_down { "down" } else { "up" }, p.flaps_percent))
        .unwrap_or(("-", 0));
    println!(
        "{:>8} {} {:>9.5} {:>10.5} {:>7.0} ft hdg {:>3.0} gnd {:.2} gear {:<4} flaps {:>3} [{}] {}",
        now_ms,
        situation.callsign,
        situation.position.latitude(),
        situation.position.longitude(),
        situation.altitude_ft,
        situation.heading_deg,
        situation.on_ground.factor(),
        gear,
        flaps,
        interpolator.state(),
        result.status
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use xtraffic::interpolation::InterpolationSetup;

    fn args() -> SimulateArgs {
        SimulateArgs {
            config: None,
            mode: None,
            aircraft: 2,
            hz: 30,
            seconds: 1,
            jitter_ms: 0,
            every: 1,
        }
    }

    #[test]
    fn test_validate() {
        assert!(args().validate().is_ok());
        assert!(SimulateArgs { hz: 0, ..args() }.validate().is_err());
        assert!(SimulateArgs { aircraft: 0, ..args() }.validate().is_err());
        assert!(SimulateArgs { every: 0, ..args() }.validate().is_err());
    }

    #[test]
    fn test_mode_conversion() {
        assert_eq!(InterpolatorMode::from(ModeArg::Linear), InterpolatorMode::Linear);
        assert_eq!(InterpolatorMode::from(ModeArg::Spline), InterpolatorMode::Spline);
    }

    #[test]
    fn test_interpolators_follow_produced_reports() {
        let scenario = Scenario::new(2, 0);
        let store = Arc::new(RemoteAircraftStore::default());
        for (index, callsign) in scenario.callsigns().into_iter().enumerate() {
            store.add_aircraft(callsign, Some(scenario.model(index)));
        }
        for seq in 0..4 {
            let ts = seq * REPORT_INTERVAL_MS;
            for (index, callsign) in scenario.callsigns().iter().enumerate() {
                store.push_situation(scenario.situation(index, ts));
                if scenario.reports_parts(index) {
                    store.push_parts(callsign, scenario.parts(index, ts));
                }
            }
        }

        let setup = InterpolationSetup::default();
        for (index, callsign) in scenario.callsigns().into_iter().enumerate() {
            let mut interpolator = Interpolator::new(
                callsign,
                store.clone(),
                Arc::new(CgCache::new()),
                Default::default(),
            );
            let result = interpolator.interpolate(10_000, &setup, index as u32);
            assert!(result.situation.is_some());
            assert!(result.parts.is_some());
        }
    }
}
