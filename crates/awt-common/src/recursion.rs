//! Recursion guard for cycle detection and depth limiting in symbol graph
//! walks.
//!
//! Type parameter constraints can form cycles (`T : U, U : T`) and malformed
//! inheritance chains can loop back on themselves. Every walk over those
//! graphs goes through a [`RecursionGuard`] so that a cycle is *observed*
//! (and reported) instead of overflowing the stack.
//!
//! The guard combines:
//! 1. **Cycle detection** via a visiting set (`FxHashSet<K>`)
//! 2. **Depth limiting** to prevent stack overflow
//! 3. **Iteration bounding** to cap total work for one query
//!
//! # Debug-mode safety
//!
//! Dropping a guard with active entries panics in debug builds, which catches
//! a forgotten `leave()`.

use rustc_hash::FxHashSet;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Walking the constraint closure of a type parameter.
    ///
    /// depth = 64, iterations = 10,000
    ConstraintWalk,

    /// Walking base classes and base interfaces during member lookup or
    /// interface implementation queries.
    ///
    /// depth = 128, iterations = 100,000
    InheritanceWalk,

    /// Explicit limits for one-off guards.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    /// Maximum recursion depth for this profile.
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::ConstraintWalk => 64,
            Self::InheritanceWalk => 128,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    /// Maximum iteration count for this profile.
    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::ConstraintWalk => 10_000,
            Self::InheritanceWalk => 100_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

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
    /// Returns `true` if entry was successful.
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    /// Returns `true` if a cycle was detected.
    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle)
    }

    /// Returns `true` if any limit was exceeded (depth or iterations).
    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Tracks recursion state for cycle detection and depth limiting.
///
/// ```ignore
/// let mut guard = RecursionGuard::with_profile(RecursionProfile::ConstraintWalk);
/// match guard.enter(type_param) {
///     RecursionResult::Entered => {
///         let found = walk_constraints(type_param);
///         guard.leave(type_param);
///         found
///     }
///     RecursionResult::Cycle => report_cycle(type_param),
///     RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => None,
/// }
/// ```
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    /// Create a guard with explicit limits.
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    /// Create a guard from a named [`RecursionProfile`].
    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter a recursive computation for `key`.
    ///
    /// On [`RecursionResult::Entered`] the caller must call
    /// [`leave`](Self::leave) with the same key when done.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }

        self.depth += 1;
        RecursionResult::Entered
    }

    /// Leave a recursive computation for `key`.
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);
        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not in the visiting set"
        );
        self.depth = self.depth.saturating_sub(1);
    }

    /// Current recursion depth.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Returns `true` if any limit was previously exceeded.
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries still in the visiting set",
                self.visiting.len(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_leave_tracks_depth() {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ConstraintWalk);
        assert!(guard.enter(1u32).is_entered());
        assert!(guard.enter(2u32).is_entered());
        assert_eq!(guard.depth(), 2);
        guard.leave(2);
        guard.leave(1);
        assert_eq!(guard.depth(), 0);
    }

    #[test]
    fn test_reentry_is_cycle() {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ConstraintWalk);
        assert!(guard.enter(7u32).is_entered());
        assert!(guard.enter(7u32).is_cycle());
        guard.leave(7);
        assert!(guard.enter(7u32).is_entered());
        guard.leave(7);
        assert!(!guard.is_exceeded());
    }

    #[test]
    fn test_depth_limit_is_sticky() {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::Custom {
            max_depth: 1,
            max_iterations: 100,
        });
        assert!(guard.enter(1u32).is_entered());
        assert_eq!(guard.enter(2u32), RecursionResult::DepthExceeded);
        guard.leave(1);
        assert!(guard.is_exceeded());
        assert!(guard.enter(1u32).is_entered());
        assert!(guard.is_exceeded());
        guard.leave(1);
    }
}
