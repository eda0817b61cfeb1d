//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Two worlds built from the same config and fed the same frame times and
//! commands must stay identical. Sources of divergence include:
//!
//! - **Floating-point math**: we use fixed-point arithmetic via
//!   [`skirmish_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: entity storage is ordered by id.
//!
//! - **System randomness**: every random draw comes from the world's own
//!   seeded RNG.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual system determinism (movement, combat, etc.)
//! 2. **Property tests**: random inputs must still produce deterministic outputs
//! 3. **Integration tests**: full matches are reproducible
//! 4. **Parallel tests**: running N matches on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skirmish_core::world::World;
use tracing::warn;

/// Frame length used when a harness function is not told otherwise.
pub const DEFAULT_FRAME_MS: u32 = 16;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run two worlds from `setup` for `num_ticks` fixed frames and compare
/// their final state hashes.
///
/// # Example
///
/// ```
/// use skirmish_core::config::SimConfig;
/// use skirmish_core::world::World;
/// use skirmish_test_utils::determinism::verify_world_determinism;
///
/// let same = verify_world_determinism(|| World::new(SimConfig::default().with_seed(9)), 50);
/// assert!(same);
/// ```
pub fn verify_world_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> World,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |world| {
            world.tick(DEFAULT_FRAME_MS);
        },
        World::state_hash,
    )
    .is_deterministic
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims, self.ticks, unique.len(), self.hashes
            );
        }
    }
}

/// Run N worlds on separate threads and collect final hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_worlds<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> World + Sync,
{
    let hashes = thread::scope(|scope| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                scope.spawn(|| {
                    let mut world = setup_fn();
                    for _ in 0..num_ticks {
                        world.tick(DEFAULT_FRAME_MS);
                    }
                    world.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Step two worlds side by side, finding the first tick at which their
/// hashes differ.
///
/// `frames` supplies the `delta_ms` for each tick, so variable frame times
/// can be replayed exactly.
///
/// # Returns
///
/// `None` if the worlds stay identical, `Some(tick)` if they diverge at
/// that tick (0 means they differed before the first tick).
pub fn find_first_divergence<F, I>(setup_fn: F, frames: I) -> Option<u64>
where
    F: Fn() -> World,
    I: IntoIterator<Item = u32>,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if first.state_hash() != second.state_hash() {
        warn!(tick = 0, "Worlds differ before the first tick");
        return Some(0);
    }

    for (tick, delta_ms) in (1..).zip(frames) {
        let a = first.tick(delta_ms);
        let b = second.tick(delta_ms);

        if a != b || first.state_hash() != second.state_hash() {
            warn!(tick, delta_ms, "Worlds diverged");
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{crowded_target, seeded_match};
    use skirmish_core::config::SimConfig;
    use skirmish_core::factions::FactionId;

    #[test]
    fn test_default_match_is_deterministic() {
        let result = verify_determinism(
            3,
            300,
            || seeded_match(12345),
            |world| {
                world.tick(DEFAULT_FRAME_MS);
            },
            World::state_hash,
        );
        result.assert_deterministic();
        assert_eq!(result.unique_hashes().len(), 1);
    }

    #[test]
    fn test_variable_frames_never_diverge() {
        let frames = (0..400u32).map(|i| 10 + (i * 7) % 23);
        assert_eq!(find_first_divergence(|| seeded_match(77), frames), None);
    }

    #[test]
    fn test_different_seeds_give_different_maps() {
        let a = compute_hash(&seeded_match(1).terrain());
        let b = compute_hash(&seeded_match(2).terrain());
        assert_ne!(a, b);
    }

    #[test]
    fn test_parallel_matches_agree() {
        run_parallel_worlds(
            || World::new(SimConfig::default().with_seed(4)),
            4,
            200,
        )
        .assert_deterministic();
    }

    #[test]
    fn test_mirror_match_is_deterministic() {
        let result = verify_determinism(
            2,
            500,
            || seeded_match(31),
            |world| {
                world.tick_with_controllers(DEFAULT_FRAME_MS, &FactionId::ALL);
            },
            World::state_hash,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_fallback_jitter_draws_from_world_rng() {
        assert!(verify_world_determinism(|| crowded_target().0, 100));
    }
}
