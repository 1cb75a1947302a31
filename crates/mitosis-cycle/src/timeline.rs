//! Phase timelines: the ordered, cyclic phase sequence for each mode.
//!
//! A timeline is fixed for the lifetime of a run. Its length sets the
//! per-phase duration, and its last phase is the terminal phase whose
//! falling edge completes a cycle.

use mitosis_types::{Phase, SimulationMode};
use tracing::warn;

use crate::error::CycleError;

/// Six-stage mitosis.
const SIMPLE_MITOSIS: [Phase; 6] = [
    Phase::Interphase,
    Phase::Prophase,
    Phase::Metaphase,
    Phase::Anaphase,
    Phase::Telophase,
    Phase::Cytokinesis,
];

/// Mitosis with the interphase gaps and prometaphase broken out.
const DETAILED_MITOSIS: [Phase; 9] = [
    Phase::G1,
    Phase::S,
    Phase::G2,
    Phase::Prophase,
    Phase::Prometaphase,
    Phase::Metaphase,
    Phase::Anaphase,
    Phase::Telophase,
    Phase::Cytokinesis,
];

/// Meiosis I and II followed by a single cytokinesis.
const MEIOSIS: [Phase; 10] = [
    Phase::Interphase,
    Phase::ProphaseI,
    Phase::MetaphaseI,
    Phase::AnaphaseI,
    Phase::TelophaseI,
    Phase::ProphaseII,
    Phase::MetaphaseII,
    Phase::AnaphaseII,
    Phase::TelophaseII,
    Phase::Cytokinesis,
];

/// Return the built-in phase sequence for a mode.
pub const fn phases_for_mode(mode: SimulationMode) -> &'static [Phase] {
    match mode {
        SimulationMode::SimpleMitosis => &SIMPLE_MITOSIS,
        SimulationMode::DetailedMitosis => &DETAILED_MITOSIS,
        SimulationMode::Meiosis => &MEIOSIS,
    }
}

/// A validated, non-empty, cyclic phase sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTimeline {
    /// The preset this timeline came from, if any.
    mode: Option<SimulationMode>,
    /// Phases in cycle order. Never empty.
    phases: Vec<Phase>,
}

impl PhaseTimeline {
    /// Build the timeline for a preset. Total over every mode.
    pub fn for_mode(mode: SimulationMode) -> Self {
        Self {
            mode: Some(mode),
            phases: phases_for_mode(mode).to_vec(),
        }
    }

    /// Build the timeline for a mode given by name.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::InvalidMode`] if the name is not a known preset.
    pub fn for_mode_name(name: &str) -> Result<Self, CycleError> {
        let mode: SimulationMode = name.parse()?;
        Ok(Self::for_mode(mode))
    }

    /// Build a timeline from an arbitrary phase list.
    ///
    /// The last phase is treated as terminal. A list that does not end in
    /// [`Phase::Cytokinesis`] is accepted but logged, since cells on it
    /// divide on leaving whatever phase comes last.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::EmptyTimeline`] if `phases` is empty.
    pub fn custom(phases: Vec<Phase>) -> Result<Self, CycleError> {
        let Some(&last) = phases.last() else {
            return Err(CycleError::EmptyTimeline);
        };
        if last != Phase::Cytokinesis {
            warn!(terminal = %last, "Custom timeline does not end in cytokinesis");
        }
        Ok(Self { mode: None, phases })
    }

    /// The preset this timeline was built from (`None` for custom timelines).
    pub const fn mode(&self) -> Option<SimulationMode> {
        self.mode
    }

    /// Phases in cycle order.
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Number of phases in one cycle (always at least 1).
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Phase at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<Phase> {
        self.phases.get(index).copied()
    }

    /// Index of the first occurrence of `phase`, if it is in this timeline.
    pub fn position(&self, phase: Phase) -> Option<usize> {
        self.phases.iter().position(|p| *p == phase)
    }

    /// Whether `phase` occurs in this timeline.
    pub fn contains(&self, phase: Phase) -> bool {
        self.phases.contains(&phase)
    }

    /// The phase a new cycle starts in.
    pub fn first(&self) -> Phase {
        self.phases.first().copied().unwrap_or(Phase::Interphase)
    }

    /// The terminal phase: leaving it completes a cycle.
    pub fn terminal(&self) -> Phase {
        self.phases.last().copied().unwrap_or(Phase::Cytokinesis)
    }

    /// The phase that follows `phase`, wrapping from the last back to the first.
    pub fn successor(&self, phase: Phase) -> Option<Phase> {
        let index = self.position(phase)?;
        let next = index.checked_add(1)?.checked_rem(self.phases.len())?;
        self.get(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_mode_has_a_non_empty_timeline_ending_in_cytokinesis() {
        for mode in SimulationMode::ALL {
            let timeline = PhaseTimeline::for_mode(mode);
            assert!(!timeline.is_empty());
            assert_eq!(timeline.terminal(), Phase::Cytokinesis);
            assert_eq!(timeline.mode(), Some(mode));
        }
    }

    #[test]
    fn preset_lengths() {
        assert_eq!(PhaseTimeline::for_mode(SimulationMode::SimpleMitosis).len(), 6);
        assert_eq!(PhaseTimeline::for_mode(SimulationMode::DetailedMitosis).len(), 9);
        assert_eq!(PhaseTimeline::for_mode(SimulationMode::Meiosis).len(), 10);
    }

    #[test]
    fn successor_wraps_to_first() {
        let timeline = PhaseTimeline::for_mode(SimulationMode::SimpleMitosis);
        assert_eq!(timeline.successor(Phase::Prophase), Some(Phase::Metaphase));
        assert_eq!(timeline.successor(Phase::Cytokinesis), Some(Phase::Interphase));
        assert_eq!(timeline.successor(Phase::ProphaseI), None);
    }

    #[test]
    fn mode_name_lookup() {
        let timeline = PhaseTimeline::for_mode_name("meiosis").unwrap();
        assert_eq!(timeline.get(1), Some(Phase::ProphaseI));

        let err = PhaseTimeline::for_mode_name("budding").unwrap_err();
        assert!(matches!(err, CycleError::InvalidMode { .. }));
    }

    #[test]
    fn empty_custom_timeline_is_rejected() {
        assert_eq!(PhaseTimeline::custom(Vec::new()), Err(CycleError::EmptyTimeline));
    }

    #[test]
    fn custom_timeline_uses_last_phase_as_terminal() {
        let timeline = PhaseTimeline::custom(vec![Phase::G1, Phase::Telophase]).unwrap();
        assert_eq!(timeline.mode(), None);
        assert_eq!(timeline.first(), Phase::G1);
        assert_eq!(timeline.terminal(), Phase::Telophase);
    }
}
