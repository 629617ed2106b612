//! Accessibility checks for members and types.
//!
//! Models `public`, `internal`, `protected`, `protected internal` and
//! `private`. `internal` is scoped to the declaring assembly; `private` to the
//! declaring type and the types nested in it; `protected` to types deriving
//! from the declaring type (and their nested types).

use crate::SymbolTable;
use crate::scopes::LookupScope;
use crate::symbols::{Accessibility, AssemblyId, MemberId, TypeId};

impl SymbolTable {
    /// Whether `member` can be referenced from `from`.
    pub fn is_accessible(&self, member: MemberId, from: &LookupScope) -> bool {
        let symbol = self.member(member);
        let owner = symbol.containing_type;
        self.is_type_accessible(owner, from)
            && self.check_accessibility(
                symbol.accessibility,
                owner,
                self.type_symbol(owner).assembly,
                from,
            )
    }

    /// Whether type `ty` can be named from `from`.
    pub fn is_type_accessible(&self, ty: TypeId, from: &LookupScope) -> bool {
        let symbol = self.type_symbol(ty);
        match symbol.containing_type {
            None => match symbol.accessibility {
                Accessibility::Internal | Accessibility::Private => {
                    symbol.assembly == from.assembly
                }
                _ => true,
            },
            Some(outer) => {
                self.is_type_accessible(outer, from)
                    && self.check_accessibility(symbol.accessibility, outer, symbol.assembly, from)
            }
        }
    }

    fn check_accessibility(
        &self,
        accessibility: Accessibility,
        declaring_type: TypeId,
        assembly: AssemblyId,
        from: &LookupScope,
    ) -> bool {
        match accessibility {
            Accessibility::Public => true,
            Accessibility::Internal => assembly == from.assembly,
            Accessibility::Private => self
                .enclosing_types(from)
                .any(|t| t == declaring_type),
            Accessibility::Protected => self.is_within_subclass(declaring_type, from),
            Accessibility::ProtectedInternal => {
                assembly == from.assembly || self.is_within_subclass(declaring_type, from)
            }
        }
    }

    fn is_within_subclass(&self, declaring_type: TypeId, from: &LookupScope) -> bool {
        self.enclosing_types(from)
            .any(|t| t == declaring_type || self.derives_from(t, declaring_type))
    }

    /// `from.containing_type` and every type it is nested in, innermost first.
    fn enclosing_types(&self, from: &LookupScope) -> impl Iterator<Item = TypeId> + '_ {
        let start = from.containing_type;
        std::iter::successors(start, move |&t| self.type_symbol(t).containing_type)
    }
}
