//! Seams toward the presentation and gamification layers.
//!
//! The core never calls into either layer on its own. A host drains each
//! frame's [`SimulationEvent`]s and forwards them with [`dispatch_events`]
//! to a [`RenderSink`]; after a run it reports the experiment through an
//! [`ExperimentRecorder`] with [`report_experiment`].

use mitosis_types::{CellId, Phase, Position, RenderHandle, SimulationEvent, SimulationMode};
use tracing::debug;

use crate::runner::TickCallback;
use crate::tick::{SimulationState, TickSummary};

/// Receiver for per-frame output events (meshes, tooltips, disposal).
pub trait RenderSink {
    /// A child should appear at `parent_position` in `new_generation`.
    /// Called once per spawned child.
    fn on_divide(&mut self, parent_position: Position, new_generation: u32);

    /// A cell died; its render object should be retired.
    fn on_death(&mut self, cell_id: CellId);

    /// A render object was linked to a cell.
    fn on_register(&mut self, cell_id: CellId, handle: RenderHandle);

    /// A render object link was dropped and should be disposed.
    fn on_unregister(&mut self, cell_id: CellId);

    /// A cell was picked; show its phase.
    fn on_cell_selected(&mut self, cell_id: CellId, phase: Phase);

    /// The preset changed. Most sinks only need to redraw on the next frame.
    fn on_mode_changed(&mut self, _mode: SimulationMode) {}
}

/// Forward events to a sink in order.
pub fn dispatch_events(events: &[SimulationEvent], sink: &mut dyn RenderSink) {
    for event in events {
        match event {
            SimulationEvent::Divided {
                parent_position,
                new_generation,
                children,
                ..
            } => {
                for _ in children {
                    sink.on_divide(*parent_position, *new_generation);
                }
            }
            SimulationEvent::Died { cell_id, .. } => sink.on_death(*cell_id),
            SimulationEvent::Registered { cell_id, handle } => sink.on_register(*cell_id, *handle),
            SimulationEvent::Unregistered { cell_id, .. } => sink.on_unregister(*cell_id),
            SimulationEvent::CellSelected { cell_id, phase } => sink.on_cell_selected(*cell_id, *phase),
            SimulationEvent::ModeChanged { mode } => sink.on_mode_changed(*mode),
        }
    }
}

/// Tick callback that forwards every frame's events to a [`RenderSink`].
#[derive(Debug)]
pub struct RenderDispatch<S> {
    /// The wrapped sink.
    sink: S,
}

impl<S: RenderSink> RenderDispatch<S> {
    /// Wrap a sink.
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    /// The wrapped sink.
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Unwrap the sink.
    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S: RenderSink + Send> TickCallback for RenderDispatch<S> {
    fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
        dispatch_events(&summary.events, &mut self.sink);
    }
}

/// Gamification ledger hooks. Implemented by the host, never by the core.
pub trait ExperimentRecorder {
    /// One experiment finished with `offspring_count` children.
    fn record_experiment(&mut self, offspring_count: u64, had_crossover: bool);

    /// A meiosis run produced offspring to score for Mendelian ratios.
    fn record_mendelian_ratio(&mut self);
}

/// Report a finished run to the gamification layer.
///
/// Crossover is credited only for meiosis, and the Mendelian-ratio hook
/// fires only when a meiosis run produced at least one child.
pub fn report_experiment(recorder: &mut dyn ExperimentRecorder, mode: SimulationMode, offspring_count: u64) {
    let had_crossover = mode.has_crossover();
    debug!(mode = %mode, offspring_count, had_crossover, "reporting experiment");
    recorder.record_experiment(offspring_count, had_crossover);
    if had_crossover && offspring_count > 0 {
        recorder.record_mendelian_ratio();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl RenderSink for RecordingSink {
        fn on_divide(&mut self, _parent_position: Position, new_generation: u32) {
            self.calls.push(format!("divide:{new_generation}"));
        }
        fn on_death(&mut self, _cell_id: CellId) {
            self.calls.push("death".to_owned());
        }
        fn on_register(&mut self, _cell_id: CellId, handle: RenderHandle) {
            self.calls.push(format!("register:{}", handle.0));
        }
        fn on_unregister(&mut self, _cell_id: CellId) {
            self.calls.push("unregister".to_owned());
        }
        fn on_cell_selected(&mut self, _cell_id: CellId, phase: Phase) {
            self.calls.push(format!("selected:{phase}"));
        }
    }

    #[derive(Default)]
    struct Ledger {
        experiments: Vec<(u64, bool)>,
        ratios: u32,
    }

    impl ExperimentRecorder for Ledger {
        fn record_experiment(&mut self, offspring_count: u64, had_crossover: bool) {
            self.experiments.push((offspring_count, had_crossover));
        }
        fn record_mendelian_ratio(&mut self) {
            self.ratios = self.ratios.saturating_add(1);
        }
    }

    #[test]
    fn events_map_to_sink_calls_in_order() {
        let cell = CellId::new();
        let events = vec![
            SimulationEvent::Registered {
                cell_id: cell,
                handle: RenderHandle(3),
            },
            SimulationEvent::Divided {
                parent_id: cell,
                parent_position: Position::ORIGIN,
                new_generation: 2,
                children: vec![CellId::new(), CellId::new()],
            },
            SimulationEvent::CellSelected {
                cell_id: cell,
                phase: Phase::Metaphase,
            },
            SimulationEvent::Died {
                cell_id: cell,
                generation: 1,
                age_seconds: 70.0,
            },
            SimulationEvent::Unregistered {
                cell_id: cell,
                handle: Some(RenderHandle(3)),
            },
            SimulationEvent::ModeChanged {
                mode: SimulationMode::Meiosis,
            },
        ];
        let mut sink = RecordingSink::default();
        dispatch_events(&events, &mut sink);
        assert_eq!(
            sink.calls,
            vec![
                "register:3",
                "divide:2",
                "divide:2",
                "selected:metaphase",
                "death",
                "unregister",
            ]
        );
    }

    #[test]
    fn meiosis_credits_crossover_and_ratio() {
        let mut ledger = Ledger::default();
        report_experiment(&mut ledger, SimulationMode::Meiosis, 4);
        assert_eq!(ledger.experiments, vec![(4, true)]);
        assert_eq!(ledger.ratios, 1);
    }

    #[test]
    fn mitosis_has_no_crossover() {
        let mut ledger = Ledger::default();
        report_experiment(&mut ledger, SimulationMode::SimpleMitosis, 8);
        report_experiment(&mut ledger, SimulationMode::Meiosis, 0);
        assert_eq!(ledger.experiments, vec![(8, false), (0, true)]);
        assert_eq!(ledger.ratios, 0);
    }
}
