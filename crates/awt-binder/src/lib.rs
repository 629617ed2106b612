//! Symbol table facade for the awt await pattern resolver.
//!
//! The binder owns every symbol the resolver can ask about and answers the
//! read-only queries it needs:
//! - members of a type by name, including inherited and constraint-provided ones
//! - extension-method containers visible at a lookup scope, tier by tier
//! - interface implementation and implicit reference conversions
//! - accessibility from a call site
//! - display strings for diagnostics
//!
//! Once built, a [`SymbolTable`] is never mutated by the resolver, so it can
//! be shared freely across threads.

pub mod symbols;
pub use symbols::{
    Accessibility, AssemblyId, EventSig, FieldSig, MemberFlags, MemberId, MemberKind,
    MemberSymbol, MethodSig, Namespace, NamespaceId, ParamFlags, Parameter, PropertySig,
    TypeFlags, TypeId, TypeKind, TypeSymbol,
};

pub mod table;
pub use table::{
    EventDecl, FieldDecl, MemberDecl, MethodDecl, PatternNames, PropertyDecl, SymbolTable,
    TypeDecl, WellKnownTypes,
};

pub mod lookup;
pub use lookup::{ConstraintCycle, MemberLookup};

pub mod scopes;
pub use scopes::{LookupScope, ScopeTier, ScopeTiers};

mod access;
mod conversions;
mod display;
