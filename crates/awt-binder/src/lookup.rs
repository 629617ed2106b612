//! Member lookup and interface queries.
//!
//! Lookup walks from the most-derived declaration outward:
//! - classes and structs: the type, then its base chain
//! - interfaces: the interface, then base interfaces breadth-first
//! - type parameters: each constraint in declaration order, first constraint
//!   that yields the name wins (no merging across constraints)
//!
//! A non-method member hides every less-derived member of the same name.
//! Methods accumulate across levels unless a more-derived method with the
//! same signature already hides them.

use awt_common::limits::MAX_INHERITANCE_DEPTH;
use awt_common::{Atom, RecursionGuard, RecursionProfile, RecursionResult};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::trace;

use crate::SymbolTable;
use crate::scopes::LookupScope;
use crate::symbols::{MemberId, MemberKind, TypeId, TypeKind};

/// Members found by [`SymbolTable::lookup_members`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberLookup {
    /// Most-derived first. Either a single non-method member, or one or more
    /// methods.
    pub members: SmallVec<[MemberId; 4]>,
}

impl MemberLookup {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn first(&self) -> Option<MemberId> {
        self.members.first().copied()
    }
}

/// A type parameter whose constraints lead back to itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConstraintCycle {
    /// The type parameter the walk started from.
    pub origin: TypeId,
    /// The type parameter that was reached a second time.
    pub repeated: TypeId,
}

impl SymbolTable {
    // =========================================================================
    // Member lookup
    // =========================================================================

    /// Look up members named `name` on `ty`, including inherited members.
    ///
    /// Static and inaccessible members are included; callers decide what an
    /// unsuitable match means for them.
    pub fn lookup_members(&self, ty: TypeId, name: Atom) -> MemberLookup {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ConstraintWalk);
        let result = self.lookup_members_guarded(ty, name, None, &mut guard);
        trace!(type_id = ty.0, name = self.resolve_atom(name), found = result.members.len(), "lookup_members");
        result
    }

    /// Like [`Self::lookup_members`], but members inaccessible from `from`
    /// are skipped as if undeclared, so they hide nothing.
    pub fn lookup_members_accessible(
        &self,
        ty: TypeId,
        name: Atom,
        from: &LookupScope,
    ) -> MemberLookup {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ConstraintWalk);
        self.lookup_members_guarded(ty, name, Some(from), &mut guard)
    }

    fn lookup_members_guarded(
        &self,
        ty: TypeId,
        name: Atom,
        from: Option<&LookupScope>,
        guard: &mut RecursionGuard<TypeId>,
    ) -> MemberLookup {
        match self.type_symbol(ty).kind {
            TypeKind::Class | TypeKind::Struct => self.lookup_in_class_chain(ty, name, from),
            TypeKind::Interface => self.lookup_in_interfaces(ty, name, from),
            TypeKind::TypeParameter => {
                if guard.enter(ty) != RecursionResult::Entered {
                    return MemberLookup::default();
                }
                let mut found = MemberLookup::default();
                for &constraint in &self.type_symbol(ty).constraints {
                    found = self.lookup_members_guarded(constraint, name, from, guard);
                    if !found.is_empty() {
                        break;
                    }
                }
                guard.leave(ty);
                found
            }
            TypeKind::Void | TypeKind::Error => MemberLookup::default(),
        }
    }

    fn lookup_in_class_chain(
        &self,
        ty: TypeId,
        name: Atom,
        from: Option<&LookupScope>,
    ) -> MemberLookup {
        let mut result = MemberLookup::default();
        let mut seen = FxHashSet::default();
        let mut current = Some(ty);
        let mut depth = 0;
        while let Some(level) = current {
            if !seen.insert(level) || depth > MAX_INHERITANCE_DEPTH {
                break;
            }
            depth += 1;
            if !self.accumulate_level(level, name, from, &mut result) {
                break;
            }
            current = self.type_symbol(level).base_type;
        }
        result
    }

    fn lookup_in_interfaces(
        &self,
        ty: TypeId,
        name: Atom,
        from: Option<&LookupScope>,
    ) -> MemberLookup {
        let mut result = MemberLookup::default();
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([ty]);
        while let Some(level) = queue.pop_front() {
            if !seen.insert(level) {
                continue;
            }
            if !self.accumulate_level(level, name, from, &mut result) {
                break;
            }
            queue.extend(self.type_symbol(level).interfaces.iter().copied());
        }
        result
    }

    /// Fold the members named `name` on one level into `result`.
    /// Returns `false` when lookup must stop (a non-method hides the rest).
    fn accumulate_level(
        &self,
        level: TypeId,
        name: Atom,
        from: Option<&LookupScope>,
        result: &mut MemberLookup,
    ) -> bool {
        let mut hits = self
            .declared_members_named(level, name)
            .filter(|&m| from.is_none_or(|scope| self.is_accessible(m, scope)))
            .peekable();
        if hits.peek().is_none() {
            return true;
        }
        for member in hits {
            if !self.member(member).is_method() {
                if result.is_empty() {
                    result.members.push(member);
                }
                return false;
            }
            let hidden = result
                .members
                .iter()
                .any(|&derived| self.same_signature(derived, member));
            if !hidden {
                result.members.push(member);
            }
        }
        true
    }

    /// Two methods with the same name, type parameter count and call
    /// parameter types.
    pub fn same_signature(&self, a: MemberId, b: MemberId) -> bool {
        let (ma, mb) = (self.member(a), self.member(b));
        if ma.name != mb.name {
            return false;
        }
        match (&ma.kind, &mb.kind) {
            (MemberKind::Method(sa), MemberKind::Method(sb)) => {
                sa.type_params.len() == sb.type_params.len()
                    && sa.call_params().len() == sb.call_params().len()
                    && sa
                        .call_params()
                        .iter()
                        .zip(sb.call_params())
                        .all(|(pa, pb)| pa.ty == pb.ty)
            }
            _ => false,
        }
    }

    // =========================================================================
    // Type parameter constraints
    // =========================================================================

    /// Every type reachable through `type_param`'s constraints, depth-first in
    /// declaration order, including the intermediate type parameters.
    ///
    /// Returns an error naming the repeated type parameter if the constraints
    /// form a cycle.
    pub fn constraint_closure(&self, type_param: TypeId) -> Result<Vec<TypeId>, ConstraintCycle> {
        let mut guard = RecursionGuard::with_profile(RecursionProfile::ConstraintWalk);
        let mut out = Vec::new();
        let result = self.walk_constraints(type_param, type_param, &mut guard, &mut out);
        result.map(|()| out)
    }

    fn walk_constraints(
        &self,
        origin: TypeId,
        type_param: TypeId,
        guard: &mut RecursionGuard<TypeId>,
        out: &mut Vec<TypeId>,
    ) -> Result<(), ConstraintCycle> {
        match guard.enter(type_param) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                return Err(ConstraintCycle {
                    origin,
                    repeated: type_param,
                });
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                return Ok(());
            }
        }
        let mut result = Ok(());
        for &constraint in &self.type_symbol(type_param).constraints {
            if !out.contains(&constraint) {
                out.push(constraint);
            }
            if self.type_symbol(constraint).is_type_parameter() {
                result = self.walk_constraints(origin, constraint, guard, out);
                if result.is_err() {
                    break;
                }
            }
        }
        guard.leave(type_param);
        result
    }

    /// Whether `type_param` sits on a constraint cycle.
    pub fn has_cyclic_constraints(&self, type_param: TypeId) -> bool {
        self.type_symbol(type_param).is_type_parameter()
            && self.constraint_closure(type_param).is_err()
    }

    // =========================================================================
    // Interfaces
    // =========================================================================

    /// All interfaces `ty` implements: its own, their base interfaces, those of
    /// its base classes and, for type parameters, those reachable through the
    /// constraint closure. Declaration order, no duplicates.
    pub fn all_interfaces(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        let mut guard = RecursionGuard::with_profile(RecursionProfile::InheritanceWalk);
        self.collect_interfaces(ty, &mut out, &mut seen, &mut guard);
        out
    }

    fn collect_interfaces(
        &self,
        ty: TypeId,
        out: &mut Vec<TypeId>,
        seen: &mut FxHashSet<TypeId>,
        guard: &mut RecursionGuard<TypeId>,
    ) {
        if guard.enter(ty) != RecursionResult::Entered {
            return;
        }
        let symbol = self.type_symbol(ty);
        if symbol.is_interface() && seen.insert(ty) {
            out.push(ty);
        }
        for &interface in &symbol.interfaces {
            self.collect_interfaces(interface, out, seen, guard);
        }
        if let Some(base) = symbol.base_type {
            self.collect_interfaces(base, out, seen, guard);
        }
        if symbol.is_type_parameter() {
            for &constraint in &symbol.constraints {
                self.collect_interfaces(constraint, out, seen, guard);
            }
        }
        guard.leave(ty);
    }

    /// Whether `ty` nominally implements `interface` (directly, through a base
    /// type, through a base interface, or through a type parameter
    /// constraint). Conversions are not considered.
    pub fn implements_interface(&self, ty: TypeId, interface: TypeId) -> bool {
        ty == interface || self.all_interfaces(ty).contains(&interface)
    }

    /// The member of class/struct `ty` that implements `interface_member`:
    /// the most-derived public instance method with the same name and
    /// signature.
    pub fn find_implementation(&self, ty: TypeId, interface_member: MemberId) -> Option<MemberId> {
        let name = self.member(interface_member).name;
        let lookup = self.lookup_in_class_chain(ty, name, None);
        lookup.members.into_iter().find(|&candidate| {
            let symbol = self.member(candidate);
            !symbol.is_static() && self.same_signature(candidate, interface_member)
        })
    }
}
