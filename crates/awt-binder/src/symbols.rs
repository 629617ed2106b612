//! Symbol definitions: ids, type symbols, member symbols and their flags.
//!
//! Symbols live in arenas owned by [`crate::SymbolTable`] and are referred to
//! by `u32` newtype ids. Id equality is symbol identity.

use awt_common::{Atom, SourceSpan};
use bitflags::bitflags;
use serde::Serialize;
use smallvec::SmallVec;

// =============================================================================
// Ids
// =============================================================================

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
            pub struct $name(pub u32);

            impl $name {
                /// Sentinel for "no symbol".
                pub const INVALID: Self = Self(u32::MAX);

                #[inline]
                pub fn is_valid(self) -> bool {
                    self != Self::INVALID
                }
            }
        )*
    };
}

/// Ids that index an arena of [`crate::SymbolTable`].
macro_rules! impl_arena_index {
    ($($name:ident),* $(,)?) => {
        $(
            impl $name {
                #[inline]
                pub(crate) fn index(self) -> usize {
                    self.0 as usize
                }
            }
        )*
    };
}

define_id! {
    /// Identity of a type symbol (class, struct, interface, type parameter).
    TypeId,
    /// Identity of a member symbol (method, property, field, event).
    MemberId,
    /// Identity of a namespace.
    NamespaceId,
    /// Identity of an assembly, the unit `internal` accessibility is scoped to.
    AssemblyId,
}

impl_arena_index!(TypeId, MemberId, NamespaceId);

impl AssemblyId {
    /// Assembly holding the seeded well-known types.
    pub const CORLIB: AssemblyId = AssemblyId(0);
    /// Default assembly for user declarations.
    pub const SOURCE: AssemblyId = AssemblyId(1);
}

// =============================================================================
// Accessibility
// =============================================================================

/// Declared accessibility of a type or member.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    Private,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    TypeParameter,
    /// The `void` pseudo-type.
    Void,
    /// A type that already failed to bind. Anything touching it is poisoned.
    Error,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct TypeFlags: u8 {
        /// `static class`; the only legal container for extension methods.
        const STATIC = 1 << 0;
        /// `sealed class`.
        const SEALED = 1 << 1;
        /// Type parameter constrained with `class`.
        const REFERENCE_CONSTRAINT = 1 << 2;
    }
}

/// A declared type.
#[derive(Clone, Debug)]
pub struct TypeSymbol {
    pub name: Atom,
    pub kind: TypeKind,
    pub flags: TypeFlags,
    pub accessibility: Accessibility,
    pub namespace: NamespaceId,
    /// Enclosing type for nested types.
    pub containing_type: Option<TypeId>,
    pub assembly: AssemblyId,
    /// Base class (classes only; structs and interfaces have none).
    pub base_type: Option<TypeId>,
    /// Directly implemented interfaces, or base interfaces for interfaces.
    pub interfaces: SmallVec<[TypeId; 4]>,
    /// Ordered constraint list for type parameters: base class, interfaces,
    /// then other type parameters, in declaration order.
    pub constraints: SmallVec<[TypeId; 2]>,
    pub members: Vec<MemberId>,
    pub span: Option<SourceSpan>,
}

impl TypeSymbol {
    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    #[inline]
    pub fn is_type_parameter(&self) -> bool {
        self.kind == TypeKind::TypeParameter
    }

    #[inline]
    pub fn is_static_class(&self) -> bool {
        self.kind == TypeKind::Class && self.flags.contains(TypeFlags::STATIC)
    }
}

// =============================================================================
// Members
// =============================================================================

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MemberFlags: u8 {
        const STATIC = 1 << 0;
        /// Extension method (first parameter carries `this`).
        const EXTENSION = 1 << 1;
        /// Marked with a build-conditional attribute.
        const CONDITIONAL = 1 << 2;
        const ABSTRACT = 1 << 3;
        const VIRTUAL = 1 << 4;
        const OVERRIDE = 1 << 5;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct ParamFlags: u8 {
        /// Has a default value.
        const OPTIONAL = 1 << 0;
        /// `params` array.
        const PARAMS = 1 << 1;
        /// Receiver of an extension method.
        const THIS = 1 << 2;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: Atom,
    pub ty: TypeId,
    pub flags: ParamFlags,
}

impl Parameter {
    #[inline]
    pub fn is_optional(&self) -> bool {
        self.flags.contains(ParamFlags::OPTIONAL)
    }

    #[inline]
    pub fn is_params(&self) -> bool {
        self.flags.contains(ParamFlags::PARAMS)
    }

    #[inline]
    pub fn is_receiver(&self) -> bool {
        self.flags.contains(ParamFlags::THIS)
    }

    /// Whether a call can omit an argument for this parameter.
    #[inline]
    pub fn can_be_omitted(&self) -> bool {
        self.is_optional() || self.is_params()
    }
}

#[derive(Clone, Debug)]
pub struct MethodSig {
    /// Parameters in declaration order, including an extension receiver.
    pub params: Vec<Parameter>,
    /// Method type parameters (themselves type symbols).
    pub type_params: SmallVec<[TypeId; 1]>,
    pub return_type: TypeId,
}

impl MethodSig {
    /// The extension receiver, if this is an extension method.
    pub fn receiver(&self) -> Option<&Parameter> {
        self.params.first().filter(|p| p.is_receiver())
    }

    /// Parameters a call site must or may supply (everything after the receiver).
    pub fn call_params(&self) -> &[Parameter] {
        match self.receiver() {
            Some(_) => &self.params[1..],
            None => &self.params,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PropertySig {
    pub ty: TypeId,
    pub has_getter: bool,
    pub has_setter: bool,
}

#[derive(Clone, Debug)]
pub struct FieldSig {
    pub ty: TypeId,
}

#[derive(Clone, Debug)]
pub struct EventSig {
    pub ty: TypeId,
}

/// What a member is. Resolution pattern-matches on this exhaustively.
#[derive(Clone, Debug)]
pub enum MemberKind {
    Method(MethodSig),
    Property(PropertySig),
    Field(FieldSig),
    Event(EventSig),
}

impl MemberKind {
    /// Human-readable kind word used by "is a X but is used like a Y" messages.
    pub fn describe(&self) -> &'static str {
        match self {
            MemberKind::Method(_) => "method",
            MemberKind::Property(_) => "property",
            MemberKind::Field(_) => "field",
            MemberKind::Event(_) => "event",
        }
    }
}

/// A declared member.
#[derive(Clone, Debug)]
pub struct MemberSymbol {
    pub name: Atom,
    pub kind: MemberKind,
    pub flags: MemberFlags,
    pub accessibility: Accessibility,
    pub containing_type: TypeId,
    pub span: Option<SourceSpan>,
}

impl MemberSymbol {
    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    #[inline]
    pub fn is_extension(&self) -> bool {
        self.flags.contains(MemberFlags::EXTENSION)
    }

    #[inline]
    pub fn is_conditional(&self) -> bool {
        self.flags.contains(MemberFlags::CONDITIONAL)
    }

    pub fn as_method(&self) -> Option<&MethodSig> {
        match &self.kind {
            MemberKind::Method(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&PropertySig> {
        match &self.kind {
            MemberKind::Property(sig) => Some(sig),
            _ => None,
        }
    }

    #[inline]
    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method(_))
    }
}

// =============================================================================
// Namespaces
// =============================================================================

#[derive(Clone, Debug)]
pub struct Namespace {
    /// Simple name; `Atom::NONE` for the global namespace.
    pub name: Atom,
    pub parent: Option<NamespaceId>,
    /// Namespaces imported by `using` directives attached to this namespace,
    /// in directive order.
    pub usings: Vec<NamespaceId>,
    /// Types declared directly in this namespace, in declaration order.
    pub types: Vec<TypeId>,
}
