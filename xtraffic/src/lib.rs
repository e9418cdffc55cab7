//! XTraffic - remote aircraft interpolation for flight simulator pilot clients
//!
//! Network traffic arrives as sparse, jittery position and parts reports.
//! This library turns that stream into a smooth per-frame pose for every
//! remote aircraft: position, altitude, attitude, ground contact and the
//! visible parts (gear, flaps, spoilers, lights, engines).
//!
//! # Layout
//!
//! - [`coord`]: geodetic positions and elevation planes
//! - [`aviation`]: situation, parts and model value types
//! - [`provider`]: the boundary to the network layer and the simulator
//! - [`interpolation`]: the per-callsign [`interpolation::Interpolator`]
//! - [`config`] and [`logging`]: ambient setup for applications

pub mod aviation;
pub mod config;
pub mod coord;
pub mod interpolation;
pub mod logging;
pub mod provider;
