//! Fixed-timestep frame scheduler.
//!
//! The host reports how much wall time passed since its last frame; the
//! scheduler banks it and calls [`World::tick`] once per whole step. Any
//! remainder waits for the next frame. A long stall is capped so one frame
//! never runs an unbounded number of ticks.

use skirmish_core::factions::FactionId;
use skirmish_core::simulation::TickEvents;
use skirmish_core::world::World;
use tracing::warn;

/// Default step length, about 60 ticks per second.
pub const DEFAULT_STEP_MS: u32 = 16;

/// Default cap on ticks run for a single frame.
pub const DEFAULT_MAX_STEPS_PER_FRAME: u32 = 8;

/// Result of one scheduled frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Events from each tick run this frame, in order.
    pub ticks: Vec<TickEvents>,
    /// Banked time thrown away because the step cap was hit.
    pub dropped_ms: u64,
}

impl FrameReport {
    /// Number of ticks run.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.ticks.len()
    }
}

/// Turns host frame times into whole simulation ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameScheduler {
    step_ms: u32,
    max_steps_per_frame: u32,
    banked_ms: u64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_MS)
    }
}

impl FrameScheduler {
    /// Scheduler with the given step length. A zero step is treated as 1 ms.
    #[must_use]
    pub fn new(step_ms: u32) -> Self {
        Self {
            step_ms: step_ms.max(1),
            max_steps_per_frame: DEFAULT_MAX_STEPS_PER_FRAME,
            banked_ms: 0,
        }
    }

    /// Change how many ticks one frame may run (at least one).
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps_per_frame = max_steps.max(1);
        self
    }

    /// Step length in milliseconds.
    #[must_use]
    pub const fn step_ms(&self) -> u32 {
        self.step_ms
    }

    /// Time banked towards the next step.
    #[must_use]
    pub const fn banked_ms(&self) -> u64 {
        self.banked_ms
    }

    /// Bank `elapsed_ms` and return how many steps are due, applying the
    /// per-frame cap. Time past the cap is discarded and returned second.
    pub fn advance(&mut self, elapsed_ms: u64) -> (u32, u64) {
        self.banked_ms = self.banked_ms.saturating_add(elapsed_ms);
        let step = u64::from(self.step_ms);
        let due = self.banked_ms / step;
        let cap = u64::from(self.max_steps_per_frame);

        if due > cap {
            let kept = self.banked_ms % step;
            let dropped = (due - cap) * step;
            self.banked_ms = kept;
            (self.max_steps_per_frame, dropped)
        } else {
            self.banked_ms -= due * step;
            // `due <= cap`, which came from a u32
            (due as u32, 0)
        }
    }

    /// Run one host frame against `world`, with the decision loop driving
    /// each faction in `scripted`.
    ///
    /// Stops early once the match is over; banked time is kept but never
    /// used until the world is reset.
    pub fn run_frame(
        &mut self,
        world: &mut World,
        elapsed_ms: u64,
        scripted: &[FactionId],
    ) -> FrameReport {
        let (steps, dropped_ms) = self.advance(elapsed_ms);
        if dropped_ms > 0 {
            warn!(dropped_ms, step_ms = self.step_ms, "Frame over step cap, dropping time");
        }

        let mut report = FrameReport {
            ticks: Vec::with_capacity(steps as usize),
            dropped_ms,
        };
        for _ in 0..steps {
            if world.is_over() {
                break;
            }
            report
                .ticks
                .push(world.tick_with_controllers(self.step_ms, scripted));
        }
        report
    }

    /// Run exactly `count` steps, bypassing the bank. Used when a caller
    /// asks for ticks rather than reporting elapsed time.
    pub fn run_steps(
        &self,
        world: &mut World,
        count: u32,
        scripted: &[FactionId],
    ) -> Vec<TickEvents> {
        let mut ticks = Vec::new();
        for _ in 0..count {
            if world.is_over() {
                break;
            }
            ticks.push(world.tick_with_controllers(self.step_ms, scripted));
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::config::SimConfig;

    #[test]
    fn test_remainder_carries_over() {
        let mut scheduler = FrameScheduler::new(16);
        assert_eq!(scheduler.advance(10), (0, 0));
        assert_eq!(scheduler.advance(10), (1, 0));
        assert_eq!(scheduler.banked_ms(), 4);
        assert_eq!(scheduler.advance(60), (4, 0));
        assert_eq!(scheduler.banked_ms(), 0);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut scheduler = FrameScheduler::new(16).with_max_steps(3);
        let (steps, dropped) = scheduler.advance(1000);
        assert_eq!(steps, 3);
        // 62 steps due, 3 run, 59 dropped; 8 ms remainder kept.
        assert_eq!(dropped, 59 * 16);
        assert_eq!(scheduler.banked_ms(), 8);
    }

    #[test]
    fn test_zero_step_is_clamped() {
        assert_eq!(FrameScheduler::new(0).step_ms(), 1);
    }

    #[test]
    fn test_run_frame_ticks_world() {
        let mut world = World::new(SimConfig::default());
        let mut scheduler = FrameScheduler::new(16);
        let report = scheduler.run_frame(&mut world, 50, &[FactionId::Opponent]);
        assert_eq!(report.steps(), 3);
        assert_eq!(world.tick_count(), 3);
        assert_eq!(world.clock_ms(), 48);
    }

    #[test]
    fn test_finished_world_is_not_ticked() {
        let mut world = World::new(SimConfig::default());
        for id in world.faction(FactionId::Player).buildings.ids() {
            world.faction_mut(FactionId::Player).remove_building(id);
        }
        let scheduler = FrameScheduler::default();
        let ticks = scheduler.run_steps(&mut world, 10, &[]);
        // The first tick decides the match, the rest are skipped.
        assert_eq!(ticks.len(), 1);
        assert!(ticks[0].game_over.is_some());
        assert!(world.is_over());
    }
}
