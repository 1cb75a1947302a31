//! The live population: records, generation index, and render handles.
//!
//! [`GenerationTree`] is the only writer of the population. During a tick
//! the caller advances every cell with [`GenerationTree::advance_all`],
//! builds the render snapshot, and only then feeds the collected
//! [`LifecycleEvent`]s back through [`GenerationTree::apply`]. Every
//! observable change lands in an outbox of [`SimulationEvent`]s that the
//! tick owner drains once per tick.

use std::collections::{BTreeMap, BTreeSet};

use mitosis_cells::{CellRecord, LifecycleConfig, LifecycleEvent};
use mitosis_cycle::PhaseClock;
use mitosis_types::{CellId, CellSnapshot, Phase, Position, RenderHandle, SimulationEvent};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::layout::RingLayout;

/// Owns every live cell and places each generation in space.
#[derive(Debug, Clone)]
pub struct GenerationTree {
    /// Live cells keyed by id.
    cells: BTreeMap<CellId, CellRecord>,
    /// Generation number to the ids currently in it.
    generations: BTreeMap<u32, BTreeSet<CellId>>,
    /// Cells ever spawned per generation; the next sibling index.
    placed: BTreeMap<u32, usize>,
    /// Per cell: the origin it was placed around and its sibling slot.
    anchors: BTreeMap<CellId, (Position, usize)>,
    /// Render handles linked by the render layer. Lookup only.
    handles: BTreeMap<CellId, RenderHandle>,
    /// Events queued since the last drain.
    outbox: Vec<SimulationEvent>,
    /// Placement rule.
    layout: RingLayout,
    /// Scene origin for founders and the base plane for every layer.
    origin: Position,
    /// Optional population cap.
    max_cells: Option<usize>,
    /// Children spawned by divisions (founders excluded).
    offspring_spawned: u64,
    /// Cells removed by death.
    deaths: u64,
}

impl GenerationTree {
    /// Create an empty tree.
    pub const fn new(layout: RingLayout, origin: Position) -> Self {
        Self {
            cells: BTreeMap::new(),
            generations: BTreeMap::new(),
            placed: BTreeMap::new(),
            anchors: BTreeMap::new(),
            handles: BTreeMap::new(),
            outbox: Vec::new(),
            layout,
            origin,
            max_cells: None,
            offspring_spawned: 0,
            deaths: 0,
        }
    }

    /// Cap the population. Spawns past the cap are skipped.
    #[must_use]
    pub const fn with_max_cells(mut self, max_cells: Option<usize>) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// The placement rule.
    pub const fn layout(&self) -> &RingLayout {
        &self.layout
    }

    /// The scene origin.
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Spawn one cell around `origin` in `generation`.
    ///
    /// The sibling index is the number of cells already placed in that
    /// generation. Every live sibling is re-anchored against the new count,
    /// so a generation of `n` spreads evenly over `max(n, min_spread)`
    /// angular steps. Returns `None` when the population cap is reached.
    pub fn spawn(
        &mut self,
        origin: Position,
        generation: u32,
        parent: Option<CellId>,
        config: &LifecycleConfig,
        clock: &PhaseClock,
        rng: &mut impl Rng,
    ) -> Option<CellId> {
        if let Some(max) = self.max_cells {
            if self.cells.len() >= max {
                warn!(generation, max_cells = max, "population cap reached, spawn skipped");
                return None;
            }
        }

        let slot = self.placed.entry(generation).or_insert(0);
        let index = *slot;
        *slot = slot.saturating_add(1);

        let record = CellRecord::spawn(generation, origin, parent, config, clock, rng);
        let id = record.id;
        debug!(
            cell_id = %id,
            generation,
            sibling_index = index,
            lifespan = record.lifecycle.lifespan(),
            "cell spawned"
        );
        self.cells.insert(id, record);
        self.anchors.insert(id, (origin, index));
        self.generations.entry(generation).or_default().insert(id);
        self.relayout(generation);
        Some(id)
    }

    /// Recompute every live anchor in `generation` from `(g, slot, placed)`.
    fn relayout(&mut self, generation: u32) {
        let siblings = self.placed.get(&generation).copied().unwrap_or(0);
        let Some(members) = self.generations.get(&generation) else {
            return;
        };
        for id in members {
            if let (Some(&(origin, slot)), Some(cell)) = (self.anchors.get(id), self.cells.get_mut(id)) {
                cell.position = self.layout.position(origin, generation, slot, siblings);
            }
        }
    }

    /// Spawn `count` generation-0 cells around the tree origin.
    pub fn seed_founders(
        &mut self,
        count: u32,
        config: &LifecycleConfig,
        clock: &PhaseClock,
        rng: &mut impl Rng,
    ) -> Vec<CellId> {
        let mut ids = Vec::new();
        for _ in 0..count {
            if let Some(id) = self.spawn(self.origin, 0, None, config, clock, rng) {
                ids.push(id);
            }
        }
        info!(founders = ids.len(), "founders seeded");
        ids
    }

    /// Remove a cell. Unknown ids are a logged no-op.
    ///
    /// Any linked render handle is dropped and an `Unregistered` event is
    /// queued so the render layer can dispose it.
    pub fn remove(&mut self, id: CellId) -> Option<CellRecord> {
        let Some(record) = self.cells.remove(&id) else {
            debug!(cell_id = %id, "remove of unknown cell ignored");
            return None;
        };
        self.anchors.remove(&id);
        if let Some(members) = self.generations.get_mut(&record.generation) {
            members.remove(&id);
            if members.is_empty() {
                self.generations.remove(&record.generation);
            }
        }
        if let Some(handle) = self.handles.remove(&id) {
            self.outbox.push(SimulationEvent::Unregistered {
                cell_id: id,
                handle: Some(handle),
            });
        }
        Some(record)
    }

    /// Link a render handle to a live cell. Returns `false` (and logs) for
    /// unknown ids.
    pub fn register(&mut self, id: CellId, handle: RenderHandle) -> bool {
        if !self.cells.contains_key(&id) {
            debug!(cell_id = %id, %handle, "register for unknown cell ignored");
            return false;
        }
        self.handles.insert(id, handle);
        self.outbox.push(SimulationEvent::Registered { cell_id: id, handle });
        true
    }

    /// Drop a render handle link. Unknown ids are a logged no-op.
    pub fn unregister(&mut self, id: CellId) -> Option<RenderHandle> {
        let Some(handle) = self.handles.remove(&id) else {
            debug!(cell_id = %id, "unregister without a linked handle ignored");
            return None;
        };
        self.outbox.push(SimulationEvent::Unregistered {
            cell_id: id,
            handle: Some(handle),
        });
        Some(handle)
    }

    /// Apply a lifecycle edge collected during the advance pass.
    ///
    /// Returns the ids spawned by a division (empty for deaths).
    pub fn apply(
        &mut self,
        event: &LifecycleEvent,
        config: &LifecycleConfig,
        clock: &PhaseClock,
        rng: &mut impl Rng,
    ) -> Vec<CellId> {
        match *event {
            LifecycleEvent::Divided {
                cell_id,
                position,
                generation,
                children,
            } => {
                let new_generation = generation.saturating_add(1);
                let origin = Position::new(position.x, self.origin.y, position.z);
                let mut spawned = Vec::new();
                for _ in 0..children {
                    if let Some(id) = self.spawn(origin, new_generation, Some(cell_id), config, clock, rng) {
                        spawned.push(id);
                    }
                }
                if spawned.is_empty() {
                    return spawned;
                }
                self.offspring_spawned = self
                    .offspring_spawned
                    .saturating_add(u64::try_from(spawned.len()).unwrap_or(u64::MAX));
                self.outbox.push(SimulationEvent::Divided {
                    parent_id: cell_id,
                    parent_position: position,
                    new_generation,
                    children: spawned.clone(),
                });
                spawned
            }
            LifecycleEvent::Died {
                cell_id,
                generation,
                age_seconds,
            } => {
                if self.cells.contains_key(&cell_id) {
                    self.deaths = self.deaths.saturating_add(1);
                    self.outbox.push(SimulationEvent::Died {
                        cell_id,
                        generation,
                        age_seconds,
                    });
                    let _ = self.remove(cell_id);
                } else {
                    debug!(cell_id = %cell_id, "death of unknown cell ignored");
                }
                Vec::new()
            }
        }
    }

    /// Advance every live cell by one tick and collect their edges.
    ///
    /// Nothing is inserted or removed here; the caller applies the returned
    /// events after the render pass.
    pub fn advance_all(
        &mut self,
        delta: f64,
        clock: &PhaseClock,
        config: &LifecycleConfig,
    ) -> Vec<LifecycleEvent> {
        self.cells
            .values_mut()
            .filter_map(|cell| cell.advance(delta, clock, config))
            .collect()
    }

    /// Pin every live cell to `phase`. Returns how many cells were pinned.
    pub fn pin_all(&mut self, clock: &PhaseClock, phase: Phase) -> usize {
        let mut pinned: usize = 0;
        for cell in self.cells.values_mut() {
            if cell.lifecycle.pin(clock, phase) {
                pinned = pinned.saturating_add(1);
            }
        }
        pinned
    }

    /// Restart every cell's cycle under `clock` (mode change).
    pub fn reset_all(&mut self, clock: &PhaseClock) {
        for cell in self.cells.values_mut() {
            cell.lifecycle.reset(clock);
        }
    }

    /// Render rows for every live cell.
    pub fn snapshots(&self, clock: &PhaseClock) -> Vec<CellSnapshot> {
        self.cells.values().map(|cell| cell.snapshot(clock)).collect()
    }

    /// Report a UI pick. Queues `CellSelected` and returns the phase, or
    /// `None` for an unknown id.
    pub fn select(&mut self, id: CellId) -> Option<Phase> {
        let Some(cell) = self.cells.get(&id) else {
            debug!(cell_id = %id, "selection of unknown cell ignored");
            return None;
        };
        let phase = cell.lifecycle.phase();
        self.outbox.push(SimulationEvent::CellSelected { cell_id: id, phase });
        Some(phase)
    }

    /// Queue an event that did not originate inside the tree.
    pub fn queue_event(&mut self, event: SimulationEvent) {
        self.outbox.push(event);
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Look up a cell.
    pub fn get(&self, id: CellId) -> Option<&CellRecord> {
        self.cells.get(&id)
    }

    /// Look up a cell mutably.
    pub fn get_mut(&mut self, id: CellId) -> Option<&mut CellRecord> {
        self.cells.get_mut(&id)
    }

    /// Number of live cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the population is extinct.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Ids currently in `generation`.
    pub fn generation_members(&self, generation: u32) -> Vec<CellId> {
        self.generations
            .get(&generation)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Number of non-empty generations.
    pub fn generation_count(&self) -> usize {
        self.generations.len()
    }

    /// Deepest generation with a live member.
    pub fn max_generation(&self) -> Option<u32> {
        self.generations.keys().next_back().copied()
    }

    /// Render handle linked to `id`.
    pub fn handle(&self, id: CellId) -> Option<RenderHandle> {
        self.handles.get(&id).copied()
    }

    /// Every linked handle.
    pub const fn handles(&self) -> &BTreeMap<CellId, RenderHandle> {
        &self.handles
    }

    /// Every live cell, ordered by id.
    pub fn cells(&self) -> impl Iterator<Item = &CellRecord> {
        self.cells.values()
    }

    /// Children spawned by divisions so far.
    pub const fn offspring_spawned(&self) -> u64 {
        self.offspring_spawned
    }

    /// Cells removed by death so far.
    pub const fn deaths(&self) -> u64 {
        self.deaths
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]
mod tests {
    use std::f64::consts::TAU;

    use mitosis_types::SimulationMode;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    struct Fixture {
        tree: GenerationTree,
        clock: PhaseClock,
        config: LifecycleConfig,
        rng: SmallRng,
    }

    fn fixture() -> Fixture {
        Fixture {
            tree: GenerationTree::new(RingLayout::default(), Position::ORIGIN),
            clock: PhaseClock::for_mode(SimulationMode::SimpleMitosis, 12.0).unwrap(),
            config: LifecycleConfig::default(),
            rng: SmallRng::seed_from_u64(11),
        }
    }

    /// Run one full tick against the tree the way the core does.
    fn tick(f: &mut Fixture, delta: f64) -> Vec<CellId> {
        let events = f.tree.advance_all(delta, &f.clock, &f.config);
        let mut spawned = Vec::new();
        for event in &events {
            spawned.extend(f.tree.apply(event, &f.config, &f.clock, &mut f.rng));
        }
        spawned
    }

    #[test]
    fn founders_are_generation_zero_on_the_base_ring() {
        let mut f = fixture();
        let ids = f.tree.seed_founders(3, &f.config, &f.clock, &mut f.rng);
        assert_eq!(ids.len(), 3);
        assert_eq!(f.tree.len(), 3);
        assert_eq!(f.tree.generation_members(0).len(), 3);
        for id in ids {
            let cell = f.tree.get(id).unwrap();
            assert_eq!(cell.generation, 0);
            assert!(cell.parent.is_none());
            assert!(cell.position.y.abs() < 1e-12);
            let radius = cell.position.x.hypot(cell.position.z);
            assert!((radius - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn division_spawns_next_generation_and_keeps_parent() {
        let mut f = fixture();
        let parent = f.tree.seed_founders(1, &f.config, &f.clock, &mut f.rng)[0];
        let mut spawned = Vec::new();
        for _ in 0..12 {
            spawned.extend(tick(&mut f, 1.0));
        }
        assert_eq!(spawned.len(), 1);
        let child = f.tree.get(spawned[0]).unwrap();
        assert_eq!(child.generation, 1);
        assert_eq!(child.parent, Some(parent));
        assert!((child.position.y - 1.25).abs() < 1e-12);
        assert!(f.tree.get(parent).is_some());
        assert_eq!(f.tree.offspring_spawned(), 1);

        let events = f.tree.drain_events();
        assert_eq!(events.len(), 1);
        let SimulationEvent::Divided {
            parent_id,
            new_generation,
            children,
            ..
        } = &events[0]
        else {
            panic!("expected a division event, got {events:?}");
        };
        assert_eq!(*parent_id, parent);
        assert_eq!(*new_generation, 1);
        assert_eq!(children, &spawned);
        assert!(f.tree.drain_events().is_empty());
    }

    #[test]
    fn every_child_is_one_generation_below_its_parent() {
        let mut f = fixture();
        let _ = f.tree.seed_founders(2, &f.config, &f.clock, &mut f.rng);
        for _ in 0..50 {
            let _ = tick(&mut f, 1.0);
        }
        for cell in f.tree.cells() {
            if let Some(parent) = cell.parent.and_then(|p| f.tree.get(p)) {
                assert_eq!(cell.generation, parent.generation + 1);
            }
            assert!(f.tree.generation_members(cell.generation).contains(&cell.id));
        }
        let indexed: usize = (0..=f.tree.max_generation().unwrap())
            .map(|g| f.tree.generation_members(g).len())
            .sum();
        assert_eq!(indexed, f.tree.len());
    }

    #[test]
    fn death_removes_cell_and_disposes_handle() {
        let mut f = fixture();
        f.config.lifespan_min_seconds = 3.0;
        f.config.lifespan_max_seconds = 3.0;
        let id = f.tree.seed_founders(1, &f.config, &f.clock, &mut f.rng)[0];
        assert!(f.tree.register(id, RenderHandle(7)));
        let _ = f.tree.drain_events();

        for _ in 0..4 {
            let _ = tick(&mut f, 1.0);
        }
        assert!(f.tree.is_empty());
        assert_eq!(f.tree.generation_count(), 0);
        assert!(f.tree.handle(id).is_none());
        assert_eq!(f.tree.deaths(), 1);

        let events = f.tree.drain_events();
        assert!(matches!(events[0], SimulationEvent::Died { cell_id, .. } if cell_id == id));
        assert_eq!(
            events[1],
            SimulationEvent::Unregistered {
                cell_id: id,
                handle: Some(RenderHandle(7)),
            }
        );
    }

    #[test]
    fn remove_and_unregister_are_idempotent() {
        let mut f = fixture();
        let id = f.tree.seed_founders(1, &f.config, &f.clock, &mut f.rng)[0];
        assert!(f.tree.remove(id).is_some());
        assert!(f.tree.remove(id).is_none());
        assert!(f.tree.remove(CellId::new()).is_none());
        assert!(f.tree.unregister(id).is_none());
        assert!(!f.tree.register(id, RenderHandle(1)));
        assert!(f.tree.drain_events().is_empty());
    }

    #[test]
    fn register_and_unregister_queue_events() {
        let mut f = fixture();
        let id = f.tree.seed_founders(1, &f.config, &f.clock, &mut f.rng)[0];
        assert!(f.tree.register(id, RenderHandle(42)));
        assert_eq!(f.tree.handle(id), Some(RenderHandle(42)));
        assert_eq!(f.tree.handles().len(), 1);
        assert_eq!(f.tree.unregister(id), Some(RenderHandle(42)));
        assert_eq!(
            f.tree.drain_events(),
            vec![
                SimulationEvent::Registered {
                    cell_id: id,
                    handle: RenderHandle(42),
                },
                SimulationEvent::Unregistered {
                    cell_id: id,
                    handle: Some(RenderHandle(42)),
                },
            ]
        );
        assert!(f.tree.get(id).is_some());
    }

    #[test]
    fn population_cap_skips_spawns() {
        let mut f = fixture();
        f.tree = GenerationTree::new(RingLayout::default(), Position::ORIGIN).with_max_cells(Some(2));
        let ids = f.tree.seed_founders(5, &f.config, &f.clock, &mut f.rng);
        assert_eq!(ids.len(), 2);
        for _ in 0..12 {
            assert!(tick(&mut f, 1.0).is_empty());
        }
        assert_eq!(f.tree.len(), 2);
        assert!(f.tree.drain_events().is_empty());
    }

    #[test]
    fn sibling_slots_are_not_reused_after_death() {
        let mut f = fixture();
        let first = f.tree.seed_founders(1, &f.config, &f.clock, &mut f.rng)[0];
        let first_position = f.tree.get(first).unwrap().position;
        let _ = f.tree.remove(first);
        let second = f.tree.seed_founders(1, &f.config, &f.clock, &mut f.rng)[0];
        let second_position = f.tree.get(second).unwrap().position;
        assert!(first_position.distance_to(second_position) > 1e-6);
    }

    fn sorted_angles(tree: &GenerationTree, generation: u32) -> Vec<f64> {
        let mut angles: Vec<f64> = tree
            .generation_members(generation)
            .iter()
            .map(|&id| {
                let p = tree.get(id).unwrap().position;
                p.z.atan2(p.x).rem_euclid(TAU)
            })
            .collect();
        angles.sort_by(f64::total_cmp);
        angles
    }

    #[test]
    fn large_generation_spreads_evenly() {
        let mut f = fixture();
        let _ = f.tree.seed_founders(8, &f.config, &f.clock, &mut f.rng);
        let angles = sorted_angles(&f.tree, 0);
        assert_eq!(angles.len(), 8);
        for (i, angle) in angles.iter().enumerate() {
            let expected = f64::from(u32::try_from(i).unwrap()) * TAU / 8.0;
            assert!((angle - expected).abs() < 1e-9, "slot {i}: {angle} vs {expected}");
        }
    }

    #[test]
    fn overflow_ring_shares_the_same_angular_step() {
        let mut f = fixture();
        let _ = f.tree.seed_founders(10, &f.config, &f.clock, &mut f.rng);
        let layout = *f.tree.layout();
        let mut inner = 0;
        let mut outer = 0;
        for cell in f.tree.cells() {
            let radius = cell.position.x.hypot(cell.position.z);
            if (radius - layout.radius(0)).abs() < 1e-9 {
                inner += 1;
            } else if (radius - layout.radius(8)).abs() < 1e-9 {
                outer += 1;
            }
        }
        assert_eq!((inner, outer), (8, 2));
        let angles = sorted_angles(&f.tree, 0);
        for pair in angles.windows(2) {
            assert!((pair[1] - pair[0] - TAU / 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn small_generation_keeps_minimum_spread() {
        let mut f = fixture();
        let _ = f.tree.seed_founders(3, &f.config, &f.clock, &mut f.rng);
        let angles = sorted_angles(&f.tree, 0);
        for pair in angles.windows(2) {
            assert!((pair[1] - pair[0] - TAU / 6.0).abs() < 1e-9);
        }
    }

    #[test]
    fn select_reports_phase() {
        let mut f = fixture();
        let id = f.tree.seed_founders(1, &f.config, &f.clock, &mut f.rng)[0];
        for _ in 0..3 {
            let _ = tick(&mut f, 1.0);
        }
        assert_eq!(f.tree.select(id), Some(Phase::Prophase));
        assert_eq!(f.tree.select(CellId::new()), None);
        assert_eq!(
            f.tree.drain_events(),
            vec![SimulationEvent::CellSelected {
                cell_id: id,
                phase: Phase::Prophase,
            }]
        );
    }

    #[test]
    fn pin_and_reset_touch_every_cell() {
        let mut f = fixture();
        let _ = f.tree.seed_founders(4, &f.config, &f.clock, &mut f.rng);
        assert_eq!(f.tree.pin_all(&f.clock, Phase::Anaphase), 4);
        assert!(f.tree.snapshots(&f.clock).iter().all(|s| s.phase == Phase::Anaphase));
        assert_eq!(f.tree.pin_all(&f.clock, Phase::MetaphaseII), 0);

        f.tree.reset_all(&f.clock);
        assert!(f.tree.snapshots(&f.clock).iter().all(|s| s.phase == Phase::Interphase));
    }

    #[test]
    fn pin_counts_only_live_cells() {
        let mut f = fixture();
        let ids = f.tree.seed_founders(5, &f.config, &f.clock, &mut f.rng);
        let _ = f.tree.remove(ids[0]);
        let _ = f.tree.remove(ids[3]);
        assert_eq!(f.tree.pin_all(&f.clock, Phase::Telophase), 3);
        let snapshots = f.tree.snapshots(&f.clock);
        assert_eq!(snapshots.len(), 3);
        assert!(snapshots.iter().all(|s| s.phase == Phase::Telophase));
    }
}
