//! Shared playback controls for the frame loop.
//!
//! The host UI (or a test) flips these while the runner reads them at the
//! top of every frame. Pausing does not stop the loop: frames keep running
//! with `playing = false`, which freezes timers but still honours a manual
//! phase pin and still produces a render snapshot.
//!
//! Flags use atomics for lock-free reads on the hot path; the manual phase
//! and pending mode sit behind async mutexes like the other queued inputs.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use mitosis_types::{Phase, SimulationMode};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::RunnerSection;

/// Reason why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationEndReason {
    /// Reached the configured `max_ticks` limit.
    MaxTicksReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// The host requested a stop.
    StopRequested,
    /// Every tracked cell died.
    Extinction,
}

/// Shared control state, wrapped in `Arc` by the host.
#[derive(Debug)]
pub struct PlaybackControls {
    /// Whether timers advance.
    playing: AtomicBool,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Wakes the frame loop out of its inter-frame sleep on stop.
    stop_notify: Notify,

    /// Milliseconds between frames (runtime-adjustable).
    tick_interval_ms: AtomicU64,

    /// Phase to pin every cell to while paused.
    manual_phase: Mutex<Option<Phase>>,

    /// Mode switch to apply at the start of the next frame.
    pending_mode: Mutex<Option<SimulationMode>>,

    /// Wall-clock time when the run started.
    started_at: DateTime<Utc>,

    /// Maximum number of frames (0 = unlimited).
    max_ticks: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Reason the run ended, if it has.
    end_reason: Mutex<Option<SimulationEndReason>>,
}

impl PlaybackControls {
    /// Create controls from the runner configuration.
    pub fn new(runner: &RunnerSection) -> Self {
        Self {
            playing: AtomicBool::new(runner.start_playing),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            tick_interval_ms: AtomicU64::new(runner.tick_interval_ms.max(1)),
            manual_phase: Mutex::new(None),
            pending_mode: Mutex::new(None),
            started_at: Utc::now(),
            max_ticks: runner.max_ticks,
            max_real_time_seconds: runner.max_real_time_seconds,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Play / Pause
    // -----------------------------------------------------------------------

    /// Whether timers are advancing.
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Resume timer advancement.
    pub fn play(&self) {
        self.playing.store(true, Ordering::Release);
    }

    /// Freeze timers. Frames keep running.
    pub fn pause(&self) {
        self.playing.store(false, Ordering::Release);
    }

    /// Flip between playing and paused; returns the new state.
    pub fn toggle(&self) -> bool {
        !self.playing.fetch_xor(true, Ordering::AcqRel)
    }

    // -----------------------------------------------------------------------
    // Manual phase and mode
    // -----------------------------------------------------------------------

    /// Pin (or with `None`, release) the manual phase. Only applied while
    /// paused.
    pub async fn set_manual_phase(&self, phase: Option<Phase>) {
        *self.manual_phase.lock().await = phase;
    }

    /// The current manual phase pin.
    pub async fn manual_phase(&self) -> Option<Phase> {
        *self.manual_phase.lock().await
    }

    /// Queue a mode switch for the next frame. A later request replaces an
    /// earlier one that has not been applied yet.
    pub async fn request_mode(&self, mode: SimulationMode) {
        *self.pending_mode.lock().await = Some(mode);
    }

    /// Take the queued mode switch, if any.
    pub async fn take_pending_mode(&self) -> Option<SimulationMode> {
        self.pending_mode.lock().await.take()
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop and wake the frame loop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Resolve once a stop is requested.
    pub async fn stopped(&self) {
        while !self.is_stop_requested() {
            self.stop_notify.notified().await;
        }
    }

    /// Record the reason the run ended.
    pub async fn set_end_reason(&self, reason: SimulationEndReason) {
        *self.end_reason.lock().await = Some(reason);
    }

    /// The reason the run ended, if it has.
    pub async fn end_reason(&self) -> Option<SimulationEndReason> {
        *self.end_reason.lock().await
    }

    // -----------------------------------------------------------------------
    // Frame pacing
    // -----------------------------------------------------------------------

    /// Milliseconds between frames.
    pub fn tick_interval_ms(&self) -> u64 {
        self.tick_interval_ms.load(Ordering::Acquire)
    }

    /// Change the frame interval. Returns the previous interval, or `None`
    /// if `ms` is zero.
    pub fn set_tick_interval_ms(&self, ms: u64) -> Option<u64> {
        if ms == 0 {
            return None;
        }
        Some(self.tick_interval_ms.swap(ms, Ordering::AcqRel))
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Whether `ticks_run` has reached a non-zero `max_ticks`.
    pub const fn tick_limit_reached(&self, ticks_run: u64) -> bool {
        self.max_ticks > 0 && ticks_run >= self.max_ticks
    }

    /// Whether the wall-clock limit (if any) has elapsed.
    pub fn time_limit_reached(&self) -> bool {
        if self.max_real_time_seconds == 0 {
            return false;
        }
        self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds since the run started.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now().signed_duration_since(self.started_at).num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Configured frame limit.
    pub const fn max_ticks(&self) -> u64 {
        self.max_ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner(max_ticks: u64) -> RunnerSection {
        RunnerSection {
            max_ticks,
            ..RunnerSection::default()
        }
    }

    #[test]
    fn starts_playing_by_default() {
        let controls = PlaybackControls::new(&runner(0));
        assert!(controls.is_playing());
        assert!(!controls.is_stop_requested());
    }

    #[test]
    fn start_paused_when_configured() {
        let section = RunnerSection {
            start_playing: false,
            ..RunnerSection::default()
        };
        assert!(!PlaybackControls::new(&section).is_playing());
    }

    #[test]
    fn pause_play_and_toggle() {
        let controls = PlaybackControls::new(&runner(0));
        controls.pause();
        assert!(!controls.is_playing());
        assert!(controls.toggle());
        assert!(controls.is_playing());
        assert!(!controls.toggle());
        controls.play();
        assert!(controls.is_playing());
    }

    #[test]
    fn tick_limits() {
        let unlimited = PlaybackControls::new(&runner(0));
        assert!(!unlimited.tick_limit_reached(1_000_000));
        assert!(!unlimited.time_limit_reached());

        let limited = PlaybackControls::new(&runner(10));
        assert!(!limited.tick_limit_reached(9));
        assert!(limited.tick_limit_reached(10));
    }

    #[test]
    fn tick_interval_rejects_zero() {
        let controls = PlaybackControls::new(&runner(0));
        assert_eq!(controls.set_tick_interval_ms(0), None);
        assert_eq!(controls.set_tick_interval_ms(50), Some(16));
        assert_eq!(controls.tick_interval_ms(), 50);
    }

    #[tokio::test]
    async fn pending_mode_is_taken_once() {
        let controls = PlaybackControls::new(&runner(0));
        controls.request_mode(SimulationMode::DetailedMitosis).await;
        controls.request_mode(SimulationMode::Meiosis).await;
        assert_eq!(controls.take_pending_mode().await, Some(SimulationMode::Meiosis));
        assert_eq!(controls.take_pending_mode().await, None);
    }

    #[tokio::test]
    async fn manual_phase_round_trip() {
        let controls = PlaybackControls::new(&runner(0));
        assert_eq!(controls.manual_phase().await, None);
        controls.set_manual_phase(Some(Phase::Metaphase)).await;
        assert_eq!(controls.manual_phase().await, Some(Phase::Metaphase));
        controls.set_manual_phase(None).await;
        assert_eq!(controls.manual_phase().await, None);
    }

    #[tokio::test]
    async fn stop_wakes_waiter() {
        let controls = std::sync::Arc::new(PlaybackControls::new(&runner(0)));
        let waiter = {
            let controls = std::sync::Arc::clone(&controls);
            tokio::spawn(async move { controls.stopped().await })
        };
        controls.request_stop();
        let joined = tokio::time::timeout(std::time::Duration::from_secs(1), waiter).await;
        assert!(matches!(joined, Ok(Ok(()))));
        controls.set_end_reason(SimulationEndReason::StopRequested).await;
        assert_eq!(controls.end_reason().await, Some(SimulationEndReason::StopRequested));
    }
}
