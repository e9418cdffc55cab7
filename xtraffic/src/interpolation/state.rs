//! Per-callsign interpolator state machine.
//!
//! ```text
//! Uninitialized ──► AwaitingData ──► Interpolating ◄──► DegradedReuse
//!        │               │                 │                  │
//!        └───────────────┴────────► Retired ◄─────────────────┘
//! ```
//!
//! `Retired` is terminal.

/// Lifecycle state of one interpolator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolatorState {
    /// No step ran yet.
    #[default]
    Uninitialized,
    /// Steps ran, but no valid situation was produced yet.
    AwaitingData,
    /// The latest step produced a valid situation.
    Interpolating,
    /// The latest step reused a previous situation.
    DegradedReuse,
    /// The aircraft left range.
    Retired,
}

/// What a step observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No situations buffered.
    NoData,
    /// Valid interpolation.
    Valid,
    /// The interpolant was rejected.
    Invalid,
    /// The aircraft is no longer in range.
    OutOfRange,
}

impl InterpolatorState {
    /// Next state after a step.
    ///
    /// `had_valid` tells whether any step ever produced a valid situation.
    pub fn next(self, outcome: StepOutcome, had_valid: bool) -> Self {
        use InterpolatorState::*;
        match (self, outcome) {
            (Retired, _) | (_, StepOutcome::OutOfRange) => Retired,
            (_, StepOutcome::Valid) => Interpolating,
            (Uninitialized | AwaitingData, StepOutcome::NoData) => AwaitingData,
            (Interpolating | DegradedReuse, StepOutcome::NoData) => DegradedReuse,
            (_, StepOutcome::Invalid) if had_valid => DegradedReuse,
            (_, StepOutcome::Invalid) => AwaitingData,
        }
    }

    pub fn is_retired(&self) -> bool {
        *self == InterpolatorState::Retired
    }
}

impl std::fmt::Display for InterpolatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpolatorState::Uninitialized => write!(f, "uninitialized"),
            InterpolatorState::AwaitingData => write!(f, "awaiting data"),
            InterpolatorState::Interpolating => write!(f, "interpolating"),
            InterpolatorState::DegradedReuse => write!(f, "degraded reuse"),
            InterpolatorState::Retired => write!(f, "retired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let s = InterpolatorState::default();
        let s = s.next(StepOutcome::NoData, false);
        assert_eq!(s, InterpolatorState::AwaitingData);
        let s = s.next(StepOutcome::Valid, true);
        assert_eq!(s, InterpolatorState::Interpolating);
    }

    #[test]
    fn test_gap_degrades_and_recovers() {
        let s = InterpolatorState::Interpolating.next(StepOutcome::NoData, true);
        assert_eq!(s, InterpolatorState::DegradedReuse);
        assert_eq!(s.next(StepOutcome::Valid, true), InterpolatorState::Interpolating);
        assert_eq!(
            InterpolatorState::Interpolating.next(StepOutcome::Invalid, true),
            InterpolatorState::DegradedReuse
        );
    }

    #[test]
    fn test_invalid_before_first_valid() {
        assert_eq!(
            InterpolatorState::Uninitialized.next(StepOutcome::Invalid, false),
            InterpolatorState::AwaitingData
        );
    }

    #[test]
    fn test_retired_is_terminal() {
        let s = InterpolatorState::Interpolating.next(StepOutcome::OutOfRange, true);
        assert!(s.is_retired());
        assert_eq!(s.next(StepOutcome::Valid, true), InterpolatorState::Retired);
        assert_eq!(s.next(StepOutcome::NoData, true), InterpolatorState::Retired);
    }
}
