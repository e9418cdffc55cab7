//! Aircraft models and ICAO based parameter guessing.
//!
//! Rotate speed and CG are rarely known for a remote model. Both are
//! guessed from a coarse category derived from the ICAO type designator.

use crate::coord::meters_to_feet;

use super::callsign::Callsign;
use super::situation::DEFAULT_CG_FT;

/// Engine count when the model does not tell.
pub const DEFAULT_ENGINE_COUNT: u8 = 2;

/// Coarse aircraft category, enough to guess rotate speed and CG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AircraftCategory {
    /// Wide body jets.
    Heavy,
    /// Narrow body jets.
    Jet,
    /// Regional jets.
    Regional,
    Turboprop,
    /// Single and light twin piston aircraft.
    Light,
    Helicopter,
    #[default]
    Unknown,
}

/// Designator prefixes per category. First match wins.
const CATEGORY_PREFIXES: &[(&str, AircraftCategory)] = &[
    ("A30", AircraftCategory::Heavy),
    ("A33", AircraftCategory::Heavy),
    ("A34", AircraftCategory::Heavy),
    ("A35", AircraftCategory::Heavy),
    ("A38", AircraftCategory::Heavy),
    ("B74", AircraftCategory::Heavy),
    ("B76", AircraftCategory::Heavy),
    ("B77", AircraftCategory::Heavy),
    ("B78", AircraftCategory::Heavy),
    ("MD11", AircraftCategory::Heavy),
    ("IL96", AircraftCategory::Heavy),
    ("A31", AircraftCategory::Jet),
    ("A32", AircraftCategory::Jet),
    ("A19N", AircraftCategory::Jet),
    ("A20N", AircraftCategory::Jet),
    ("A21N", AircraftCategory::Jet),
    ("B73", AircraftCategory::Jet),
    ("B38M", AircraftCategory::Jet),
    ("B39M", AircraftCategory::Jet),
    ("B75", AircraftCategory::Jet),
    ("MD8", AircraftCategory::Jet),
    ("MD9", AircraftCategory::Jet),
    ("BCS", AircraftCategory::Regional),
    ("CRJ", AircraftCategory::Regional),
    ("E1", AircraftCategory::Regional),
    ("E2", AircraftCategory::Regional),
    ("E7", AircraftCategory::Regional),
    ("E9", AircraftCategory::Regional),
    ("RJ", AircraftCategory::Regional),
    ("AT4", AircraftCategory::Turboprop),
    ("AT7", AircraftCategory::Turboprop),
    ("DH8", AircraftCategory::Turboprop),
    ("SF34", AircraftCategory::Turboprop),
    ("JS41", AircraftCategory::Turboprop),
    ("B190", AircraftCategory::Turboprop),
    ("PC12", AircraftCategory::Turboprop),
    ("C208", AircraftCategory::Turboprop),
    ("C1", AircraftCategory::Light),
    ("P28", AircraftCategory::Light),
    ("PA", AircraftCategory::Light),
    ("SR2", AircraftCategory::Light),
    ("DA4", AircraftCategory::Light),
    ("BE3", AircraftCategory::Light),
    ("M20", AircraftCategory::Light),
    ("EC", AircraftCategory::Helicopter),
    ("AS3", AircraftCategory::Helicopter),
    ("AS5", AircraftCategory::Helicopter),
    ("R22", AircraftCategory::Helicopter),
    ("R44", AircraftCategory::Helicopter),
    ("B06", AircraftCategory::Helicopter),
    ("A109", AircraftCategory::Helicopter),
    ("H1", AircraftCategory::Helicopter),
];

impl AircraftCategory {
    /// Category for an ICAO type designator.
    pub fn from_icao(designator: &str) -> Self {
        let designator = designator.trim().to_ascii_uppercase();
        if designator.is_empty() {
            return AircraftCategory::Unknown;
        }
        CATEGORY_PREFIXES
            .iter()
            .find(|(prefix, _)| designator.starts_with(prefix))
            .map(|(_, category)| *category)
            .unwrap_or(AircraftCategory::Unknown)
    }

    /// Typical rotate speed in knots. None for vertical take off.
    pub fn rotate_speed_kts(&self) -> Option<f64> {
        match self {
            AircraftCategory::Heavy => Some(160.0),
            AircraftCategory::Jet => Some(140.0),
            AircraftCategory::Regional => Some(130.0),
            AircraftCategory::Turboprop => Some(105.0),
            AircraftCategory::Light => Some(60.0),
            AircraftCategory::Helicopter => None,
            AircraftCategory::Unknown => Some(120.0),
        }
    }

    /// Typical CG height above the gear in feet.
    pub fn cg_ft(&self) -> f64 {
        match self {
            AircraftCategory::Heavy => meters_to_feet(5.0),
            AircraftCategory::Jet => meters_to_feet(3.5),
            AircraftCategory::Regional => meters_to_feet(3.0),
            AircraftCategory::Turboprop => meters_to_feet(2.5),
            AircraftCategory::Light => meters_to_feet(1.2),
            AircraftCategory::Helicopter => meters_to_feet(1.5),
            AircraftCategory::Unknown => DEFAULT_CG_FT,
        }
    }

    pub fn is_vtol(&self) -> bool {
        *self == AircraftCategory::Helicopter
    }
}

/// Guessed model parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelParameters {
    /// Rotate speed in knots, None for VTOL.
    pub rotate_speed_kts: Option<f64>,
    /// CG in feet.
    pub cg_ft: f64,
}

/// The model used to render a remote aircraft.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AircraftModel {
    /// Simulator model string.
    pub model_string: String,
    pub callsign: Callsign,
    /// ICAO type designator, e.g. "A320".
    pub icao_designator: String,
    /// CG in feet, once known.
    pub cg_ft: Option<f64>,
    pub engine_count: u8,
    /// Vertical take off and landing.
    pub vtol: bool,
}

impl AircraftModel {
    /// Create a model for an ICAO type. VTOL is derived from the category.
    pub fn new(model_string: impl Into<String>, icao_designator: impl Into<String>) -> Self {
        let icao_designator = icao_designator.into();
        let vtol = AircraftCategory::from_icao(&icao_designator).is_vtol();
        Self {
            model_string: model_string.into(),
            callsign: Callsign::default(),
            icao_designator,
            cg_ft: None,
            engine_count: DEFAULT_ENGINE_COUNT,
            vtol,
        }
    }

    pub fn with_callsign(mut self, callsign: Callsign) -> Self {
        self.callsign = callsign;
        self
    }

    pub fn with_cg(mut self, cg_ft: f64) -> Self {
        self.cg_ft = Some(cg_ft);
        self
    }

    pub fn with_engine_count(mut self, engine_count: u8) -> Self {
        self.engine_count = engine_count;
        self
    }

    pub fn with_vtol(mut self, vtol: bool) -> Self {
        self.vtol = vtol;
        self
    }

    pub fn has_model_string(&self) -> bool {
        !self.model_string.trim().is_empty()
    }

    pub fn has_cg(&self) -> bool {
        self.cg_ft.is_some()
    }

    pub fn category(&self) -> AircraftCategory {
        AircraftCategory::from_icao(&self.icao_designator)
    }

    /// Engine count, defaulting to two when unknown.
    pub fn engine_count_or_default(&self) -> u8 {
        if self.engine_count == 0 {
            DEFAULT_ENGINE_COUNT
        } else {
            self.engine_count
        }
    }

    /// Rotate speed and CG, preferring known values over guesses.
    pub fn guess_parameters(&self) -> ModelParameters {
        let category = self.category();
        let rotate_speed_kts = if self.vtol {
            None
        } else {
            category
                .rotate_speed_kts()
                .or_else(|| AircraftCategory::Unknown.rotate_speed_kts())
        };
        ModelParameters {
            rotate_speed_kts,
            cg_ft: self.cg_ft.unwrap_or_else(|| category.cg_ft()),
        }
    }
}
