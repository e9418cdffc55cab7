//! Map backed simulation environment.

use dashmap::DashMap;

use crate::aviation::Callsign;

use super::SimulationEnvironmentProvider;

/// CG values registered by the model database and the simulator driver.
#[derive(Debug, Default)]
pub struct SimulationEnvironment {
    database_cg: DashMap<Callsign, f64>,
    simulator_cg: DashMap<Callsign, f64>,
}

impl SimulationEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the CG found in the model database.
    pub fn set_database_cg(&self, callsign: Callsign, cg_ft: f64) {
        self.database_cg.insert(callsign, cg_ft);
    }

    /// Register the CG reported by the simulator for the rendered model.
    pub fn set_simulator_cg(&self, callsign: Callsign, cg_ft: f64) {
        self.simulator_cg.insert(callsign, cg_ft);
    }

    /// Forget everything about an aircraft.
    pub fn remove(&self, callsign: &Callsign) {
        self.database_cg.remove(callsign);
        self.simulator_cg.remove(callsign);
    }
}

impl SimulationEnvironmentProvider for SimulationEnvironment {
    fn cg_from_database(&self, callsign: &Callsign) -> Option<f64> {
        self.database_cg.get(callsign).map(|v| *v)
    }

    fn simulator_or_db_cg(&self, callsign: &Callsign, db_cg_ft: Option<f64>) -> Option<f64> {
        self.simulator_cg.get(callsign).map(|v| *v).or(db_cg_ft)
    }
}
