//! String interner for identifier deduplication.
//!
//! Member and type names are interned once and passed around as u32 indices
//! (Atoms). Name comparisons during member lookup then become integer
//! comparisons (`atom_a == atom_b`) instead of string comparisons.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::sync::Arc;

use crate::limits::INTERNER_INITIAL_CAPACITY;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with == in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    /// Check if this is the empty/none atom.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Get the raw index value.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Names the awaiter pattern and the seeded corlib types refer to.
const COMMON_STRINGS: &[&str] = &[
    // Pattern members
    "GetAwaiter",
    "IsCompleted",
    "GetResult",
    "OnCompleted",
    "UnsafeOnCompleted",
    // Seeded namespaces
    "System",
    "Runtime",
    "CompilerServices",
    // Seeded types
    "Object",
    "Boolean",
    "Void",
    "Action",
    "INotifyCompletion",
    "ICriticalNotifyCompletion",
    // Common parameter names
    "continuation",
    "this",
    "value",
];

/// String interner that deduplicates strings and returns Atom handles.
///
/// # Example
/// ```
/// use awt_common::interner::Interner;
/// let mut interner = Interner::new();
/// let a1 = interner.intern("GetAwaiter");
/// let a2 = interner.intern("GetAwaiter");
/// assert_eq!(a1, a2);
/// assert_eq!(interner.resolve(a1), "GetAwaiter");
/// ```
#[derive(Default, Clone)]
pub struct Interner {
    /// Map from string to atom index
    map: FxHashMap<Arc<str>, Atom>,
    /// Vector of all interned strings (index 0 is empty string)
    strings: Vec<Arc<str>>,
}

impl Interner {
    /// Create a new interner with the empty string pre-interned at index 0.
    pub fn new() -> Self {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(INTERNER_INITIAL_CAPACITY),
        };
        // Index 0 is reserved for empty/none
        let empty: Arc<str> = Arc::from("");
        interner.strings.push(empty.clone());
        interner.map.insert(empty, Atom::NONE);
        interner
    }

    /// Intern a string, returning its Atom handle.
    /// If the string was already interned, returns the existing Atom.
    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        if let Some(&atom) = self.map.get(s) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        let owned: Arc<str> = Arc::from(s);
        self.strings.push(owned.clone());
        self.map.insert(owned, atom);
        atom
    }

    /// Look up an already-interned string without inserting it.
    #[inline]
    pub fn lookup(&self, s: &str) -> Option<Atom> {
        self.map.get(s).copied()
    }

    /// Resolve an Atom back to its string value.
    /// Returns empty string if atom is out of bounds (safety for error recovery).
    #[inline]
    pub fn resolve(&self, atom: Atom) -> &str {
        self.strings
            .get(atom.0 as usize)
            .map(|s| s.as_ref())
            .unwrap_or("")
    }

    /// Try to resolve an Atom, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, atom: Atom) -> Option<&str> {
        self.strings.get(atom.0 as usize).map(|s| s.as_ref())
    }

    /// Get the number of interned strings.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the interner is empty (only has the empty string).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() <= 1
    }

    /// Pre-intern the awaiter pattern names and seeded type names.
    pub fn intern_common(&mut self) {
        for s in COMMON_STRINGS {
            self.intern(s);
        }
    }
}
