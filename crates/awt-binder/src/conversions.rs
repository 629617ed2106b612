//! Implicit reference and boxing conversions between type symbols.
//!
//! Only the nominal conversions the awaiter pattern needs are modelled:
//! identity, base class chain, implemented interfaces, anything to `object`,
//! and a type parameter to each type in its constraint closure. User-defined
//! conversions never participate.

use awt_common::limits::MAX_INHERITANCE_DEPTH;
use rustc_hash::FxHashSet;

use crate::SymbolTable;
use crate::symbols::{TypeId, TypeKind};

impl SymbolTable {
    /// Whether a value of type `from` converts implicitly to `to`.
    pub fn is_implicitly_convertible(&self, from: TypeId, to: TypeId) -> bool {
        if from == to {
            return true;
        }
        let from_kind = self.type_symbol(from).kind;
        if matches!(from_kind, TypeKind::Void | TypeKind::Error) {
            return false;
        }
        if to == self.well_known().object {
            return true;
        }
        match from_kind {
            TypeKind::Class | TypeKind::Struct => {
                self.derives_from(from, to) || self.implements_interface(from, to)
            }
            TypeKind::Interface => self.implements_interface(from, to),
            TypeKind::TypeParameter => match self.constraint_closure(from) {
                Ok(closure) => closure.into_iter().any(|c| {
                    c == to
                        || (!self.type_symbol(c).is_type_parameter()
                            && self.is_implicitly_convertible(c, to))
                }),
                Err(_) => false,
            },
            TypeKind::Void | TypeKind::Error => false,
        }
    }

    /// Whether class `ty` has `ancestor` somewhere in its base chain
    /// (excluding `ty` itself).
    pub fn derives_from(&self, ty: TypeId, ancestor: TypeId) -> bool {
        let mut seen = FxHashSet::default();
        let mut current = self.type_symbol(ty).base_type;
        let mut depth = 0;
        while let Some(base) = current {
            if base == ancestor {
                return true;
            }
            if !seen.insert(base) || depth > MAX_INHERITANCE_DEPTH {
                return false;
            }
            depth += 1;
            current = self.type_symbol(base).base_type;
        }
        false
    }

    /// `a` is a strictly more specific receiver than `b`: `a` converts to `b`
    /// but not the other way round.
    pub fn is_more_specific(&self, a: TypeId, b: TypeId) -> bool {
        a != b && self.is_implicitly_convertible(a, b) && !self.is_implicitly_convertible(b, a)
    }
}
