//! Lookup scopes and extension-method scope tiers.
//!
//! A [`ScopeTier`] is one lexical nesting level's set of extension
//! containers: the static classes declared directly in a namespace, followed
//! by the static classes of every namespace that namespace imports with
//! `using`. Tiers run from the call site's namespace out to the global
//! namespace and are consulted one at a time.

use awt_common::limits::MAX_SCOPE_TIERS;
use smallvec::SmallVec;

use crate::SymbolTable;
use crate::symbols::{AssemblyId, NamespaceId, TypeId};

/// Where a lookup happens: the enclosing namespace and type of an `await`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LookupScope {
    pub namespace: NamespaceId,
    pub containing_type: Option<TypeId>,
    pub assembly: AssemblyId,
}

impl LookupScope {
    pub fn new(namespace: NamespaceId, containing_type: Option<TypeId>) -> Self {
        LookupScope {
            namespace,
            containing_type,
            assembly: AssemblyId::SOURCE,
        }
    }

    /// A scope at top level of the global namespace.
    pub fn global(table: &SymbolTable) -> Self {
        Self::new(table.global_namespace(), None)
    }

    /// A scope inside `ty`, in `ty`'s namespace and assembly.
    pub fn inside(table: &SymbolTable, ty: TypeId) -> Self {
        let symbol = table.type_symbol(ty);
        LookupScope {
            namespace: symbol.namespace,
            containing_type: Some(ty),
            assembly: symbol.assembly,
        }
    }
}

/// One lexical level of extension containers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeTier {
    /// Namespace this tier belongs to.
    pub namespace: NamespaceId,
    /// Static classes visible at this level, declared ones first, then
    /// imported ones in `using` order.
    pub containers: SmallVec<[TypeId; 4]>,
}

/// Iterator over the scope tiers of a [`LookupScope`], innermost first.
pub struct ScopeTiers<'a> {
    table: &'a SymbolTable,
    next: Option<NamespaceId>,
    produced: usize,
}

impl Iterator for ScopeTiers<'_> {
    type Item = ScopeTier;

    fn next(&mut self) -> Option<ScopeTier> {
        if self.produced >= MAX_SCOPE_TIERS {
            return None;
        }
        let namespace = self.next?;
        self.next = self.table.namespace(namespace).parent;
        self.produced += 1;
        Some(self.table.scope_tier(namespace))
    }
}

impl SymbolTable {
    /// Tiers visible from `scope`, innermost namespace first.
    pub fn scope_tiers(&self, scope: &LookupScope) -> ScopeTiers<'_> {
        ScopeTiers {
            table: self,
            next: Some(scope.namespace),
            produced: 0,
        }
    }

    /// The tier for a single namespace.
    pub fn scope_tier(&self, namespace: NamespaceId) -> ScopeTier {
        let ns = self.namespace(namespace);
        let mut containers: SmallVec<[TypeId; 4]> = SmallVec::new();
        let imported = ns.usings.iter().flat_map(|&u| self.namespace(u).types.iter());
        for &ty in ns.types.iter().chain(imported) {
            if self.type_symbol(ty).is_static_class() && !containers.contains(&ty) {
                containers.push(ty);
            }
        }
        ScopeTier {
            namespace,
            containers,
        }
    }
}
