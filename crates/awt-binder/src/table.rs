//! The symbol table: arenas for types, members and namespaces, declaration
//! builders, and the seeded well-known types the awaiter pattern refers to.

use awt_common::{Atom, Interner, SourceSpan};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::symbols::{
    Accessibility, AssemblyId, EventSig, FieldSig, MemberFlags, MemberId, MemberKind,
    MemberSymbol, MethodSig, Namespace, NamespaceId, ParamFlags, Parameter, PropertySig,
    TypeFlags, TypeId, TypeKind, TypeSymbol,
};

// =============================================================================
// Well-known types
// =============================================================================

/// Types and members seeded by [`SymbolTable::new`].
#[derive(Clone, Copy, Debug)]
pub struct WellKnownTypes {
    pub object: TypeId,
    pub boolean: TypeId,
    pub void: TypeId,
    pub error: TypeId,
    pub action: TypeId,
    pub notify_completion: TypeId,
    pub critical_notify_completion: TypeId,
    /// `INotifyCompletion.OnCompleted(System.Action)`
    pub on_completed: MemberId,
    /// `ICriticalNotifyCompletion.UnsafeOnCompleted(System.Action)`
    pub unsafe_on_completed: MemberId,
}

/// Pre-interned pattern member names.
#[derive(Clone, Copy, Debug)]
pub struct PatternNames {
    pub get_awaiter: Atom,
    pub is_completed: Atom,
    pub get_result: Atom,
    pub on_completed: Atom,
    pub unsafe_on_completed: Atom,
}

// =============================================================================
// SymbolTable
// =============================================================================

/// Read-only (after construction) symbol table queried by the resolver.
///
/// Construction goes through the `declare_*` methods; queries live in the
/// `lookup`, `conversions`, `access`, `scopes` and `display` modules.
#[derive(Clone)]
pub struct SymbolTable {
    interner: Interner,
    types: Vec<TypeSymbol>,
    members: Vec<MemberSymbol>,
    namespaces: Vec<Namespace>,
    /// `(parent, name) -> child` namespace index.
    namespace_children: FxHashMap<(NamespaceId, Atom), NamespaceId>,
    /// Qualified display name -> type, in declaration order.
    types_by_name: IndexMap<String, TypeId>,
    well_known: WellKnownTypes,
    names: PatternNames,
}

impl SymbolTable {
    /// Create a table holding the global namespace and the well-known types.
    pub fn new() -> Self {
        let mut interner = Interner::new();
        interner.intern_common();
        let names = PatternNames {
            get_awaiter: interner.intern("GetAwaiter"),
            is_completed: interner.intern("IsCompleted"),
            get_result: interner.intern("GetResult"),
            on_completed: interner.intern("OnCompleted"),
            unsafe_on_completed: interner.intern("UnsafeOnCompleted"),
        };
        let global = Namespace {
            name: Atom::NONE,
            parent: None,
            usings: Vec::new(),
            types: Vec::new(),
        };
        let placeholder = WellKnownTypes {
            object: TypeId::INVALID,
            boolean: TypeId::INVALID,
            void: TypeId::INVALID,
            error: TypeId::INVALID,
            action: TypeId::INVALID,
            notify_completion: TypeId::INVALID,
            critical_notify_completion: TypeId::INVALID,
            on_completed: MemberId::INVALID,
            unsafe_on_completed: MemberId::INVALID,
        };
        let mut table = SymbolTable {
            interner,
            types: Vec::new(),
            members: Vec::new(),
            namespaces: vec![global],
            namespace_children: FxHashMap::default(),
            types_by_name: IndexMap::new(),
            well_known: placeholder,
            names,
        };
        table.seed_well_known();
        table
    }

    fn seed_well_known(&mut self) {
        let system = self.declare_namespace_path("System");
        let compiler_services = self.declare_namespace_path("System.Runtime.CompilerServices");
        let corlib = |decl: TypeDecl| decl.assembly(AssemblyId::CORLIB);

        let object = self.declare_type(corlib(TypeDecl::class("Object").in_namespace(system)));
        let boolean = self.declare_type(corlib(TypeDecl::structure("Boolean").in_namespace(system)));
        let void = self.declare_type(corlib(
            TypeDecl::new("Void", TypeKind::Void).in_namespace(system),
        ));
        let error = self.declare_type(corlib(TypeDecl::new("?", TypeKind::Error)));
        let action = self.declare_type(corlib(TypeDecl::class("Action").in_namespace(system)));

        let notify_completion = self.declare_type(corlib(
            TypeDecl::interface("INotifyCompletion").in_namespace(compiler_services),
        ));
        let on_completed = self.declare_method(
            notify_completion,
            MethodDecl::new("OnCompleted", void)
                .param("continuation", action)
                .flags(MemberFlags::ABSTRACT),
        );
        let critical_notify_completion = self.declare_type(corlib(
            TypeDecl::interface("ICriticalNotifyCompletion")
                .in_namespace(compiler_services)
                .implements(notify_completion),
        ));
        let unsafe_on_completed = self.declare_method(
            critical_notify_completion,
            MethodDecl::new("UnsafeOnCompleted", void)
                .param("continuation", action)
                .flags(MemberFlags::ABSTRACT),
        );

        // C# keyword spellings resolve to the same symbols.
        self.types_by_name.insert("object".to_string(), object);
        self.types_by_name.insert("bool".to_string(), boolean);
        self.types_by_name.insert("void".to_string(), void);

        self.well_known = WellKnownTypes {
            object,
            boolean,
            void,
            error,
            action,
            notify_completion,
            critical_notify_completion,
            on_completed,
            unsafe_on_completed,
        };
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[inline]
    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    #[inline]
    pub fn names(&self) -> &PatternNames {
        &self.names
    }

    #[inline]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[inline]
    pub fn intern(&mut self, s: &str) -> Atom {
        self.interner.intern(s)
    }

    #[inline]
    pub fn resolve_atom(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    #[inline]
    pub fn global_namespace(&self) -> NamespaceId {
        NamespaceId(0)
    }

    /// Type symbol for `id`.
    ///
    /// # Panics
    /// If `id` was not produced by this table.
    #[inline]
    pub fn type_symbol(&self, id: TypeId) -> &TypeSymbol {
        &self.types[id.index()]
    }

    #[inline]
    pub fn get_type(&self, id: TypeId) -> Option<&TypeSymbol> {
        self.types.get(id.index())
    }

    /// Member symbol for `id`.
    ///
    /// # Panics
    /// If `id` was not produced by this table.
    #[inline]
    pub fn member(&self, id: MemberId) -> &MemberSymbol {
        &self.members[id.index()]
    }

    #[inline]
    pub fn get_member(&self, id: MemberId) -> Option<&MemberSymbol> {
        self.members.get(id.index())
    }

    #[inline]
    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    /// Child namespace `name` of `parent`, if declared.
    pub fn child_namespace(&self, parent: NamespaceId, name: &str) -> Option<NamespaceId> {
        let atom = self.interner.lookup(name)?;
        self.namespace_children.get(&(parent, atom)).copied()
    }

    /// Resolve a dotted namespace path from the global namespace.
    pub fn find_namespace(&self, path: &str) -> Option<NamespaceId> {
        let mut current = self.global_namespace();
        for part in path.split('.').filter(|p| !p.is_empty()) {
            current = self.child_namespace(current, part)?;
        }
        Some(current)
    }

    /// Find a type by its qualified display name (`N.Outer.Inner`, or a C#
    /// keyword such as `object`).
    pub fn find_type(&self, qualified_name: &str) -> Option<TypeId> {
        self.types_by_name.get(qualified_name).copied()
    }

    /// All declared type ids in declaration order.
    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len() as u32).map(TypeId)
    }

    #[inline]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Members named `name` declared directly on `ty` (no inheritance).
    pub fn declared_members_named(
        &self,
        ty: TypeId,
        name: Atom,
    ) -> impl Iterator<Item = MemberId> + '_ {
        self.type_symbol(ty)
            .members
            .iter()
            .copied()
            .filter(move |&m| self.member(m).name == name)
    }

    /// Return type of a method, or the value type of a property/field/event.
    pub fn member_type(&self, id: MemberId) -> TypeId {
        match &self.member(id).kind {
            MemberKind::Method(sig) => sig.return_type,
            MemberKind::Property(sig) => sig.ty,
            MemberKind::Field(sig) => sig.ty,
            MemberKind::Event(sig) => sig.ty,
        }
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    /// Get or create the child namespace `name` of `parent`.
    pub fn declare_namespace(&mut self, parent: NamespaceId, name: &str) -> NamespaceId {
        let atom = self.interner.intern(name);
        if let Some(&existing) = self.namespace_children.get(&(parent, atom)) {
            return existing;
        }
        let id = NamespaceId(self.namespaces.len() as u32);
        self.namespaces.push(Namespace {
            name: atom,
            parent: Some(parent),
            usings: Vec::new(),
            types: Vec::new(),
        });
        self.namespace_children.insert((parent, atom), id);
        id
    }

    /// Get or create every namespace along a dotted path.
    pub fn declare_namespace_path(&mut self, path: &str) -> NamespaceId {
        let mut current = self.global_namespace();
        for part in path.split('.').filter(|p| !p.is_empty()) {
            current = self.declare_namespace(current, part);
        }
        current
    }

    /// Attach a `using imported;` directive to `namespace`.
    pub fn add_using(&mut self, namespace: NamespaceId, imported: NamespaceId) {
        let usings = &mut self.namespaces[namespace.index()].usings;
        if !usings.contains(&imported) {
            usings.push(imported);
        }
    }

    pub fn declare_type(&mut self, decl: TypeDecl) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        let name = self.interner.intern(&decl.name);
        let namespace = decl.namespace.unwrap_or(self.global_namespace());
        self.types.push(TypeSymbol {
            name,
            kind: decl.kind,
            flags: decl.flags,
            accessibility: decl.accessibility,
            namespace,
            containing_type: decl.containing_type,
            assembly: decl.assembly,
            base_type: decl.base_type,
            interfaces: decl.interfaces,
            constraints: decl.constraints,
            members: Vec::new(),
            span: decl.span,
        });
        // Type parameters are scoped to their declaration and not registered
        // in the namespace.
        if decl.kind != TypeKind::TypeParameter && decl.containing_type.is_none() {
            self.namespaces[namespace.index()].types.push(id);
        }
        let qualified = self.display_type(id);
        self.types_by_name.entry(qualified).or_insert(id);
        trace!(type_id = id.0, name = %decl.name, kind = ?decl.kind, "declared type");
        id
    }

    /// Set the base class of a previously declared type.
    pub fn set_base_type(&mut self, ty: TypeId, base: TypeId) {
        self.types[ty.index()].base_type = Some(base);
    }

    /// Add an implemented (or base) interface to a previously declared type.
    pub fn add_interface(&mut self, ty: TypeId, interface: TypeId) {
        let interfaces = &mut self.types[ty.index()].interfaces;
        if !interfaces.contains(&interface) {
            interfaces.push(interface);
        }
    }

    /// Append a constraint to a previously declared type parameter.
    pub fn add_constraint(&mut self, type_param: TypeId, constraint: TypeId) {
        self.types[type_param.index()].constraints.push(constraint);
    }

    pub fn declare_member(&mut self, owner: TypeId, decl: impl Into<MemberDecl>) -> MemberId {
        let id = MemberId(self.members.len() as u32);
        let symbol = match decl.into() {
            MemberDecl::Method(m) => {
                let params = m
                    .params
                    .into_iter()
                    .map(|(name, ty, flags)| Parameter {
                        name: self.interner.intern(&name),
                        ty,
                        flags,
                    })
                    .collect();
                MemberSymbol {
                    name: self.interner.intern(&m.name),
                    kind: MemberKind::Method(MethodSig {
                        params,
                        type_params: m.type_params,
                        return_type: m.return_type,
                    }),
                    flags: m.flags,
                    accessibility: m.accessibility,
                    containing_type: owner,
                    span: m.span,
                }
            }
            MemberDecl::Property(p) => MemberSymbol {
                name: self.interner.intern(&p.name),
                kind: MemberKind::Property(PropertySig {
                    ty: p.ty,
                    has_getter: p.has_getter,
                    has_setter: p.has_setter,
                }),
                flags: p.flags,
                accessibility: p.accessibility,
                containing_type: owner,
                span: p.span,
            },
            MemberDecl::Field(f) => MemberSymbol {
                name: self.interner.intern(&f.name),
                kind: MemberKind::Field(FieldSig { ty: f.ty }),
                flags: f.flags,
                accessibility: f.accessibility,
                containing_type: owner,
                span: f.span,
            },
            MemberDecl::Event(e) => MemberSymbol {
                name: self.interner.intern(&e.name),
                kind: MemberKind::Event(EventSig { ty: e.ty }),
                flags: e.flags,
                accessibility: e.accessibility,
                containing_type: owner,
                span: e.span,
            },
        };
        self.members.push(symbol);
        self.types[owner.index()].members.push(id);
        id
    }

    #[inline]
    pub fn declare_method(&mut self, owner: TypeId, decl: MethodDecl) -> MemberId {
        self.declare_member(owner, decl)
    }

    #[inline]
    pub fn declare_property(&mut self, owner: TypeId, decl: PropertyDecl) -> MemberId {
        self.declare_member(owner, decl)
    }

    #[inline]
    pub fn declare_field(&mut self, owner: TypeId, decl: FieldDecl) -> MemberId {
        self.declare_member(owner, decl)
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Declaration builders
// =============================================================================
//
// Declarations default to `public` so that tests and fixtures only spell out
// the accessibility they care about.

/// Builder for a type declaration.
#[derive(Clone, Debug)]
pub struct TypeDecl {
    name: String,
    kind: TypeKind,
    flags: TypeFlags,
    accessibility: Accessibility,
    namespace: Option<NamespaceId>,
    containing_type: Option<TypeId>,
    assembly: AssemblyId,
    base_type: Option<TypeId>,
    interfaces: SmallVec<[TypeId; 4]>,
    constraints: SmallVec<[TypeId; 2]>,
    span: Option<SourceSpan>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        TypeDecl {
            name: name.into(),
            kind,
            flags: TypeFlags::empty(),
            accessibility: Accessibility::Public,
            namespace: None,
            containing_type: None,
            assembly: AssemblyId::SOURCE,
            base_type: None,
            interfaces: SmallVec::new(),
            constraints: SmallVec::new(),
            span: None,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    pub fn static_class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class).flags(TypeFlags::STATIC)
    }

    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    pub fn type_parameter(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::TypeParameter)
    }

    pub fn in_namespace(mut self, namespace: NamespaceId) -> Self {
        self.namespace = Some(namespace);
        self
    }

    /// Nest this type inside `outer`; it inherits `outer`'s namespace.
    pub fn nested_in(mut self, outer: TypeId, outer_namespace: NamespaceId) -> Self {
        self.containing_type = Some(outer);
        self.namespace = Some(outer_namespace);
        self
    }

    pub fn base(mut self, base: TypeId) -> Self {
        self.base_type = Some(base);
        self
    }

    pub fn implements(mut self, interface: TypeId) -> Self {
        self.interfaces.push(interface);
        self
    }

    pub fn constraint(mut self, constraint: TypeId) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn flags(mut self, flags: TypeFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn assembly(mut self, assembly: AssemblyId) -> Self {
        self.assembly = assembly;
        self
    }

    pub fn span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

/// Builder for a method declaration.
#[derive(Clone, Debug)]
pub struct MethodDecl {
    name: String,
    params: Vec<(String, TypeId, ParamFlags)>,
    type_params: SmallVec<[TypeId; 1]>,
    return_type: TypeId,
    accessibility: Accessibility,
    flags: MemberFlags,
    span: Option<SourceSpan>,
}

impl MethodDecl {
    pub fn new(name: impl Into<String>, return_type: TypeId) -> Self {
        MethodDecl {
            name: name.into(),
            params: Vec::new(),
            type_params: SmallVec::new(),
            return_type,
            accessibility: Accessibility::Public,
            flags: MemberFlags::empty(),
            span: None,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: TypeId) -> Self {
        self.params.push((name.into(), ty, ParamFlags::empty()));
        self
    }

    /// A parameter with a default value.
    pub fn optional_param(mut self, name: impl Into<String>, ty: TypeId) -> Self {
        self.params.push((name.into(), ty, ParamFlags::OPTIONAL));
        self
    }

    /// A `params` array parameter; `element` is the array element type.
    pub fn params_array(mut self, name: impl Into<String>, element: TypeId) -> Self {
        self.params.push((name.into(), element, ParamFlags::PARAMS));
        self
    }

    /// Make this a static extension method whose receiver has type `receiver`.
    pub fn extension(mut self, receiver: TypeId) -> Self {
        self.params
            .insert(0, ("this".to_string(), receiver, ParamFlags::THIS));
        self.flags |= MemberFlags::EXTENSION | MemberFlags::STATIC;
        self
    }

    pub fn type_param(mut self, type_param: TypeId) -> Self {
        self.type_params.push(type_param);
        self
    }

    pub fn flags(mut self, flags: MemberFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn static_(self) -> Self {
        self.flags(MemberFlags::STATIC)
    }

    /// Marked with a build-conditional attribute.
    pub fn conditional(self) -> Self {
        self.flags(MemberFlags::CONDITIONAL)
    }

    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

/// Builder for a property declaration. Defaults to a getter-only property.
#[derive(Clone, Debug)]
pub struct PropertyDecl {
    name: String,
    ty: TypeId,
    has_getter: bool,
    has_setter: bool,
    accessibility: Accessibility,
    flags: MemberFlags,
    span: Option<SourceSpan>,
}

impl PropertyDecl {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        PropertyDecl {
            name: name.into(),
            ty,
            has_getter: true,
            has_setter: false,
            accessibility: Accessibility::Public,
            flags: MemberFlags::empty(),
            span: None,
        }
    }

    pub fn with_setter(mut self) -> Self {
        self.has_setter = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.has_getter = false;
        self.has_setter = true;
        self
    }

    pub fn without_accessors(mut self) -> Self {
        self.has_getter = false;
        self.has_setter = false;
        self
    }

    pub fn static_(mut self) -> Self {
        self.flags |= MemberFlags::STATIC;
        self
    }

    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }

    pub fn span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

/// Builder for a field declaration.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    name: String,
    ty: TypeId,
    accessibility: Accessibility,
    flags: MemberFlags,
    span: Option<SourceSpan>,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        FieldDecl {
            name: name.into(),
            ty,
            accessibility: Accessibility::Public,
            flags: MemberFlags::empty(),
            span: None,
        }
    }

    pub fn static_(mut self) -> Self {
        self.flags |= MemberFlags::STATIC;
        self
    }

    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }
}

/// Builder for an event declaration.
#[derive(Clone, Debug)]
pub struct EventDecl {
    name: String,
    ty: TypeId,
    accessibility: Accessibility,
    flags: MemberFlags,
    span: Option<SourceSpan>,
}

impl EventDecl {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        EventDecl {
            name: name.into(),
            ty,
            accessibility: Accessibility::Public,
            flags: MemberFlags::empty(),
            span: None,
        }
    }

    pub fn accessibility(mut self, accessibility: Accessibility) -> Self {
        self.accessibility = accessibility;
        self
    }
}

/// Any member declaration.
#[derive(Clone, Debug)]
pub enum MemberDecl {
    Method(MethodDecl),
    Property(PropertyDecl),
    Field(FieldDecl),
    Event(EventDecl),
}

impl From<MethodDecl> for MemberDecl {
    fn from(decl: MethodDecl) -> Self {
        MemberDecl::Method(decl)
    }
}

impl From<PropertyDecl> for MemberDecl {
    fn from(decl: PropertyDecl) -> Self {
        MemberDecl::Property(decl)
    }
}

impl From<FieldDecl> for MemberDecl {
    fn from(decl: FieldDecl) -> Self {
        MemberDecl::Field(decl)
    }
}

impl From<EventDecl> for MemberDecl {
    fn from(decl: EventDecl) -> Self {
        MemberDecl::Event(decl)
    }
}
