//! Declaration-site structural checks.
//!
//! Some awaiter problems are errors in a type's declaration rather than at
//! any `await`: a `[Conditional]` method implementing an interface member,
//! and type parameters whose constraints form a cycle. They are reported once
//! per declaring type regardless of how many await sites reach it.

use std::sync::Arc;

use awt_binder::{MemberKind, SymbolTable, TypeId, TypeKind};
use dashmap::DashMap;
use tracing::trace;

use crate::diagnostics::PendingDiagnostic;
use crate::error_reporter;

/// Memoized declaration checks, safe to share between threads.
#[derive(Debug, Default)]
pub struct DeclarationChecker {
    checked: DashMap<TypeId, Arc<[PendingDiagnostic]>>,
}

impl DeclarationChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `ty` once. Later calls return the stored diagnostics.
    pub fn check(&self, table: &SymbolTable, ty: TypeId) -> Arc<[PendingDiagnostic]> {
        if let Some(found) = self.checked.get(&ty) {
            return Arc::clone(found.value());
        }
        let diagnostics: Arc<[PendingDiagnostic]> = compute(table, ty).into();
        trace!(ty = ty.0, count = diagnostics.len(), "declaration checked");
        // A racing thread computed the same list; keep whichever landed first.
        Arc::clone(self.checked.entry(ty).or_insert(diagnostics).value())
    }

    /// Every diagnostic found so far, ordered by declaring type.
    pub fn diagnostics(&self) -> Vec<PendingDiagnostic> {
        let mut entries: Vec<(TypeId, Arc<[PendingDiagnostic]>)> = self
            .checked
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect();
        entries.sort_by_key(|(ty, _)| *ty);
        entries
            .into_iter()
            .flat_map(|(_, diags)| diags.to_vec())
            .collect()
    }

    pub fn clear(&self) {
        self.checked.clear();
    }
}

fn compute(table: &SymbolTable, ty: TypeId) -> Vec<PendingDiagnostic> {
    let symbol = table.type_symbol(ty);
    match symbol.kind {
        TypeKind::Class | TypeKind::Struct => conditional_implementations(table, ty),
        TypeKind::TypeParameter => match table.constraint_closure(ty) {
            Ok(_) => Vec::new(),
            Err(cycle) => vec![error_reporter::cyclic_constraint(table, cycle)],
        },
        TypeKind::Interface | TypeKind::Void | TypeKind::Error => Vec::new(),
    }
}

/// Interface methods of `ty` implemented by a conditional method that `ty`
/// itself declares.
fn conditional_implementations(table: &SymbolTable, ty: TypeId) -> Vec<PendingDiagnostic> {
    let mut out = Vec::new();
    for interface in table.all_interfaces(ty) {
        for &interface_member in &table.type_symbol(interface).members {
            if !matches!(table.member(interface_member).kind, MemberKind::Method(_)) {
                continue;
            }
            let Some(implementation) = table.find_implementation(ty, interface_member) else {
                continue;
            };
            let found = table.member(implementation);
            if found.is_conditional() && found.containing_type == ty {
                out.push(error_reporter::conditional_interface_member(
                    table,
                    implementation,
                    interface_member,
                    ty,
                ));
            }
        }
    }
    out
}
