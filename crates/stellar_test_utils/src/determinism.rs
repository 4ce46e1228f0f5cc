//! Determinism testing utilities.
//!
//! The engine recomputes state on read, so the same stored state, config
//! and `now` must always produce the same next state. Sources of
//! non-determinism to guard against:
//!
//! - **Wall-clock reads**: every engine call takes `now` explicitly.
//! - **HashMap iteration order**: entity maps are `BTreeMap`s so iteration
//!   and serialization are ordered.
//! - **Unseeded randomness**: generation takes the RNG as a parameter.
//!
//! State is fingerprinted through its JSON form, since entities hold `f64`
//! amounts and cannot derive `Hash`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use serde::Serialize;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: usize,
}

impl DeterminismResult {
    fn from_hashes(hashes: Vec<u64>, steps: usize) -> Self {
        Self {
            is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
            hashes,
            steps,
        }
    }

    /// Get all unique hashes (should be 1 for deterministic runs).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Replay is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Hash of a value's JSON representation.
///
/// # Panics
///
/// Panics if the value cannot be serialized.
pub fn state_hash<T: Serialize>(value: &T) -> u64 {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes,
        Err(e) => panic!("state is not serializable: {e}"),
    };
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

/// Replay a scenario several times and compare final state hashes.
///
/// `step` is applied once per instant in `instants`, in order.
///
/// # Example
///
/// ```ignore
/// use stellar_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     &instants,
///     || home_planet(Timestamp::EPOCH),
///     |planet, now| { advance_planet(&config, planet, &research, now).unwrap(); },
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, T, Setup, Step>(
    runs: usize,
    instants: &[T],
    setup: Setup,
    step: Step,
) -> DeterminismResult
where
    S: Serialize,
    T: Copy,
    Setup: Fn() -> S,
    Step: Fn(&mut S, T),
{
    let hashes = (0..runs)
        .map(|_| {
            let mut state = setup();
            for instant in instants {
                step(&mut state, *instant);
            }
            state_hash(&state)
        })
        .collect();

    DeterminismResult::from_hashes(hashes, instants.len())
}

/// Like [`verify_determinism`] but runs every replay on its own scoped thread.
///
/// # Panics
///
/// Panics if a replay thread panics.
pub fn verify_determinism_parallel<S, T, Setup, Step>(
    runs: usize,
    instants: &[T],
    setup: Setup,
    step: Step,
) -> DeterminismResult
where
    S: Serialize,
    T: Copy + Sync,
    Setup: Fn() -> S + Sync,
    Step: Fn(&mut S, T) + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..runs)
            .map(|_| {
                s.spawn(|| {
                    let mut state = setup();
                    for instant in instants {
                        step(&mut state, *instant);
                    }
                    state_hash(&state)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(hash) => hash,
                Err(_) => panic!("replay thread panicked"),
            })
            .collect()
    });

    DeterminismResult::from_hashes(hashes, instants.len())
}
