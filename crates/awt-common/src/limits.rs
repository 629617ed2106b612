//! Centralized limits for the await pattern resolver.
//!
//! Recursion limits for graph walks (constraint closures, inheritance chains,
//! conversion checks) live in [`crate::recursion::RecursionProfile`]. The
//! constants here are capacity hints and hard caps that are not tied to a
//! particular guard.

// =============================================================================
// Capacity hints
// =============================================================================

/// Initial capacity of the string interner.
///
/// A symbol table for a single compilation unit rarely exceeds a few hundred
/// distinct identifiers; pre-sizing avoids the first handful of rehashes.
pub const INTERNER_INITIAL_CAPACITY: usize = 256;

/// Inline capacity for candidate lists.
///
/// Almost every `GetAwaiter` lookup yields one or two candidates, so candidate
/// vectors stay on the stack in the common case.
pub const INLINE_CANDIDATES: usize = 4;

// =============================================================================
// Hard caps
// =============================================================================

/// Maximum number of scope tiers consulted for extension fallback.
///
/// Namespace nesting deeper than this is treated as if the outer tiers did
/// not exist.
pub const MAX_SCOPE_TIERS: usize = 256;

/// Maximum number of inheritance levels walked during member lookup.
///
/// Guards against malformed base chains (a class listed as its own ancestor)
/// which the binder does not reject on its own.
pub const MAX_INHERITANCE_DEPTH: u32 = 128;
