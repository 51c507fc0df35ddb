//! Recursion guard for cycle detection, depth limiting and iteration
//! bounding in recursive walks over the type graph.
//!
//! It combines three safety mechanisms:
//! 1. **Cycle detection** via a visiting set (`FxHashSet<K>`)
//! 2. **Depth limiting** to prevent stack overflow
//! 3. **Iteration bounding** to prevent runaway walks
//!
//! # Profiles
//!
//! [`RecursionProfile`] names the limits used at each call site:
//!
//! ```ignore
//! let mut guard = RecursionGuard::with_profile(RecursionProfile::AncestorWalk);
//! ```
//!
//! # Safety
//!
//! - **Debug leak detection**: in debug builds, dropping a guard with active
//!   entries panics, catching forgotten `leave()` calls.
//! - **Debug double-leave detection**: in debug builds, leaving a key that is
//!   not in the visiting set panics.

use rustc_hash::FxHashSet;
use std::hash::Hash;
use tsb_common::limits;

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Rendering one type reference.
    ///
    /// depth = `MAX_MAPPING_DEPTH`, iterations = `MAX_GUARD_ITERATIONS`
    TypeMapping,

    /// Following a chain of type-forwarding entries.
    ///
    /// depth = `MAX_FORWARDING_HOPS`
    Forwarding,

    /// Base-class and interface ancestor walks.
    ///
    /// depth = `MAX_ANCESTOR_DEPTH`
    AncestorWalk,
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::TypeMapping => limits::MAX_MAPPING_DEPTH,
            Self::Forwarding => limits::MAX_FORWARDING_HOPS,
            Self::AncestorWalk => limits::MAX_ANCESTOR_DEPTH,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::TypeMapping | Self::Forwarding | Self::AncestorWalk => limits::MAX_GUARD_ITERATIONS,
        }
    }
}

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// Proceed with the computation.
    Entered,
    /// This key is already being visited.
    Cycle,
    /// Maximum recursion depth exceeded.
    DepthExceeded,
    /// Maximum iteration count exceeded.
    IterationExceeded,
}

impl RecursionResult {
    /// Any outcome other than [`RecursionResult::Entered`].
    #[inline]
    pub fn is_denied(self) -> bool {
        !matches!(self, Self::Entered)
    }
}

/// Tracks recursion state for cycle detection, depth limiting and
/// iteration bounding.
///
/// ```ignore
/// match guard.enter(key.clone()) {
///     RecursionResult::Entered => {
///         let result = do_work();
///         guard.leave(&key);
///         result
///     }
///     RecursionResult::Cycle => handle_cycle(),
///     RecursionResult::DepthExceeded
///     | RecursionResult::IterationExceeded => handle_exceeded(),
/// }
/// ```
#[derive(Debug)]
pub struct RecursionGuard<K: Hash + Eq + Clone> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
}

impl<K: Hash + Eq + Clone> RecursionGuard<K> {
    fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter a recursive computation for `key`.
    ///
    /// On [`RecursionResult::Entered`] the caller **must** call
    /// [`leave`](Self::leave) with the same key when done.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            return RecursionResult::DepthExceeded;
        }
        if self.visiting.contains(&key) {
            return RecursionResult::Cycle;
        }

        self.visiting.insert(key);
        self.depth += 1;
        RecursionResult::Entered
    }

    /// Leave a recursive computation for `key`.
    ///
    /// # Debug panics
    ///
    /// In debug builds, panics if `key` is not in the visiting set.
    pub fn leave(&mut self, key: &K) {
        let was_present = self.visiting.remove(key);

        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not in the visiting set. \
             This indicates a double-leave or a leave without a matching enter()."
        );

        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains(key)
    }

    /// Reset all state while preserving configured limits.
    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Clone> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries still in the visiting set. \
                 This indicates leaked enter() calls without matching leave() calls.",
                self.visiting.len(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_limits_come_from_common_limits() {
        let p = RecursionProfile::TypeMapping;
        assert_eq!(p.max_depth(), limits::MAX_MAPPING_DEPTH);
        assert_eq!(p.max_iterations(), limits::MAX_GUARD_ITERATIONS);
        assert_eq!(RecursionProfile::Forwarding.max_depth(), limits::MAX_FORWARDING_HOPS);
    }

    #[test]
    fn basic_enter_leave() {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::TypeMapping);
        assert_eq!(guard.enter("a".to_string()), RecursionResult::Entered);
        assert!(guard.is_visiting(&"a".to_string()));

        guard.leave(&"a".to_string());
        assert!(!guard.is_visiting(&"a".to_string()));
    }

    #[test]
    fn reentry_is_a_cycle() {
        let mut guard = RecursionGuard::new(10, 100);
        assert!(!guard.enter("Core:Ns.Node").is_denied());
        assert_eq!(guard.enter("Core:Ns.Node"), RecursionResult::Cycle);
        guard.leave(&"Core:Ns.Node");
    }

    #[test]
    fn depth_limit() {
        let mut guard = RecursionGuard::new(2, 100);
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        assert_eq!(guard.enter(2u32), RecursionResult::Entered);
        assert_eq!(guard.enter(3u32), RecursionResult::DepthExceeded);

        guard.leave(&2);
        assert_eq!(guard.enter(3u32), RecursionResult::Entered);
        guard.leave(&3);
        guard.leave(&1);
    }

    #[test]
    fn iteration_budget_resets() {
        let mut guard = RecursionGuard::new(10, 2);
        for key in [1u32, 2] {
            assert_eq!(guard.enter(key), RecursionResult::Entered);
            guard.leave(&key);
        }
        assert_eq!(guard.enter(3u32), RecursionResult::IterationExceeded);

        guard.reset();
        assert_eq!(guard.enter(3u32), RecursionResult::Entered);
        guard.leave(&3);
    }
}
