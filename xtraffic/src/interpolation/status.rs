//! Step results and their bookkeeping flags.

use crate::aviation::{AircraftParts, AircraftSituation};

/// How a situation was obtained in one step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterpolationStatus {
    /// The situation was blended from two situations.
    pub interpolated: bool,
    /// A previous situation was handed out again.
    pub same_situation: bool,
    /// Situations available for this step.
    pub situations_count: usize,
    /// Free text for diagnostics.
    pub extra_info: String,
}

impl InterpolationStatus {
    /// True if a fresh or reused situation is available.
    pub fn has_valid_situation(&self) -> bool {
        self.interpolated || self.same_situation
    }

    /// Append diagnostic text.
    pub fn add_info(&mut self, info: &str) {
        if info.is_empty() {
            return;
        }
        if !self.extra_info.is_empty() {
            self.extra_info.push_str("; ");
        }
        self.extra_info.push_str(info);
    }
}

impl std::fmt::Display for InterpolationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "interpolated {} same {} situations {}",
            self.interpolated, self.same_situation, self.situations_count
        )?;
        if !self.extra_info.is_empty() {
            write!(f, " info: {}", self.extra_info)?;
        }
        Ok(())
    }
}

/// How the parts were obtained in one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartsStatus {
    /// The network delivers parts for this aircraft.
    pub supports_parts: bool,
    /// Parts of a previous step were handed out again.
    pub reused_parts: bool,
}

impl std::fmt::Display for PartsStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "supports parts {} reused {}", self.supports_parts, self.reused_parts)
    }
}

/// Everything one interpolation step produces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterpolationResult {
    /// None only before the first situation ever arrived, or once the
    /// aircraft is unknown.
    pub situation: Option<AircraftSituation>,
    /// None if parts are disabled or nothing could be selected or guessed.
    pub parts: Option<AircraftParts>,
    pub status: InterpolationStatus,
    pub parts_status: PartsStatus,
}

impl InterpolationResult {
    pub fn has_situation(&self) -> bool {
        self.situation.is_some()
    }

    pub fn has_parts(&self) -> bool {
        self.parts.is_some()
    }
}
