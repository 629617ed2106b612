//! Tests for completion interface selection, including awaiters that are type
//! parameters satisfied through their constraints.

use awt_binder::{LookupScope, MethodDecl, PropertyDecl, SymbolTable, TypeDecl, TypeId};
use awt_checker::{
    AwaitResolution, AwaitResolver, AwaitSite, CompletionKind, CompletionRegistration,
    ResolverOptions,
};

/// `interface IA { bool IsCompleted { get; } void GetResult(); }`
fn declare_ia(table: &mut SymbolTable) -> TypeId {
    let wk = *table.well_known();
    let ia = table.declare_type(TypeDecl::interface("IA"));
    table.declare_property(ia, PropertyDecl::new("IsCompleted", wk.boolean));
    table.declare_method(ia, MethodDecl::new("GetResult", wk.void));
    ia
}

/// `class A { public <awaiter> GetAwaiter() }`
fn awaitable(table: &mut SymbolTable, awaiter: TypeId) -> TypeId {
    let a = table.declare_type(TypeDecl::class("A"));
    table.declare_method(a, MethodDecl::new("GetAwaiter", awaiter));
    a
}

fn resolve_with(resolver: &AwaitResolver<'_>, operand: TypeId) -> AwaitResolution {
    let scope = LookupScope::global(resolver.table());
    resolver.resolve(&AwaitSite::expression(operand, scope))
}

fn resolve(table: &SymbolTable, operand: TypeId) -> AwaitResolution {
    resolve_with(&AwaitResolver::new(table, ResolverOptions::default()), operand)
}

fn completion_of(resolution: &AwaitResolution) -> Option<CompletionKind> {
    resolution.info().map(|info| info.completion)
}

fn get_messages(table: &SymbolTable, resolution: &AwaitResolution) -> Vec<(u32, String)> {
    resolution
        .diagnostics()
        .iter()
        .map(|d| {
            let rendered = d.render(table);
            (rendered.code, rendered.message_text)
        })
        .collect()
}

// =============================================================================
// Class awaiters
// =============================================================================

#[test]
fn test_critical_is_preferred_when_both_interfaces_are_implemented() {
    let mut table = SymbolTable::new();
    let wk = *table.well_known();
    let awaiter = table.declare_type(
        TypeDecl::class("Awaiter")
            .implements(wk.notify_completion)
            .implements(wk.critical_notify_completion),
    );
    table.declare_property(awaiter, PropertyDecl::new("IsCompleted", wk.boolean));
    table.declare_method(awaiter, MethodDecl::new("GetResult", wk.void));
    table.declare_method(
        awaiter,
        MethodDecl::new("OnCompleted", wk.void).param("continuation", wk.action),
    );
    let unsafe_on_completed = table.declare_method(
        awaiter,
        MethodDecl::new("UnsafeOnCompleted", wk.void).param("continuation", wk.action),
    );
    let a = awaitable(&mut table, awaiter);

    let resolution = resolve(&table, a);
    assert_eq!(
        completion_of(&resolution),
        Some(CompletionKind::Critical(unsafe_on_completed))
    );
    assert_eq!(
        resolution.info().and_then(|i| i.registration()),
        Some(CompletionRegistration::AwaitUnsafeOnCompleted)
    );
}

#[test]
fn test_completion_through_base_class() {
    let mut table = SymbolTable::new();
    let wk = *table.well_known();
    let base = table.declare_type(TypeDecl::class("BaseAwaiter").implements(wk.notify_completion));
    let on_completed = table.declare_method(
        base,
        MethodDecl::new("OnCompleted", wk.void).param("continuation", wk.action),
    );
    let awaiter = table.declare_type(TypeDecl::class("Awaiter").base(base));
    table.declare_property(awaiter, PropertyDecl::new("IsCompleted", wk.boolean));
    table.declare_method(awaiter, MethodDecl::new("GetResult", wk.void));
    let a = awaitable(&mut table, awaiter);

    assert_eq!(
        completion_of(&resolve(&table, a)),
        Some(CompletionKind::Notify(on_completed))
    );
}

#[test]
fn test_completion_is_nominal_not_structural() {
    let mut table = SymbolTable::new();
    let wk = *table.well_known();
    let awaiter = table.declare_type(TypeDecl::structure("Awaiter"));
    table.declare_property(awaiter, PropertyDecl::new("IsCompleted", wk.boolean));
    table.declare_method(awaiter, MethodDecl::new("GetResult", wk.void));
    table.declare_method(
        awaiter,
        MethodDecl::new("OnCompleted", wk.void).param("continuation", wk.action),
    );
    let a = awaitable(&mut table, awaiter);

    assert_eq!(
        get_messages(&table, &resolve(&table, a)),
        vec![(
            4027,
            "'Awaiter' does not implement 'System.Runtime.CompilerServices.INotifyCompletion'"
                .to_string()
        )]
    );
}

// =============================================================================
// Type parameter awaiters
// =============================================================================

#[test]
fn test_constraint_without_completion_interface() {
    let mut table = SymbolTable::new();
    let ia = declare_ia(&mut table);
    let t1 = table.declare_type(TypeDecl::type_parameter("T1").constraint(ia));
    let a = awaitable(&mut table, t1);

    assert_eq!(
        get_messages(&table, &resolve(&table, a)),
        vec![(
            4027,
            "'T1' does not implement 'System.Runtime.CompilerServices.INotifyCompletion'"
                .to_string()
        )]
    );
}

#[test]
fn test_second_constraint_provides_notify_completion() {
    let mut table = SymbolTable::new();
    let wk = *table.well_known();
    let ia = declare_ia(&mut table);
    let t2 = table.declare_type(
        TypeDecl::type_parameter("T2")
            .constraint(ia)
            .constraint(wk.notify_completion),
    );
    let a = awaitable(&mut table, t2);

    let resolution = resolve(&table, a);
    assert_eq!(
        completion_of(&resolution),
        Some(CompletionKind::Notify(wk.on_completed))
    );
    assert_eq!(resolution.info().map(|i| i.awaiter_type), Some(t2));
}

#[test]
fn test_members_through_constraining_type_parameter() {
    let mut table = SymbolTable::new();
    let wk = *table.well_known();
    let ia = declare_ia(&mut table);
    let t1 = table.declare_type(TypeDecl::type_parameter("T1").constraint(ia));
    let t4 = table.declare_type(
        TypeDecl::type_parameter("T4")
            .constraint(t1)
            .constraint(wk.notify_completion),
    );
    let a = awaitable(&mut table, t4);

    assert_eq!(
        completion_of(&resolve(&table, a)),
        Some(CompletionKind::Notify(wk.on_completed))
    );
}

#[test]
fn test_critical_through_constraints() {
    let mut table = SymbolTable::new();
    let wk = *table.well_known();
    let ia = declare_ia(&mut table);
    let t5 = table.declare_type(
        TypeDecl::type_parameter("T5")
            .constraint(ia)
            .constraint(wk.critical_notify_completion),
    );
    let t6 = table.declare_type(TypeDecl::type_parameter("T6").constraint(t5));

    let a = awaitable(&mut table, t5);
    assert_eq!(
        completion_of(&resolve(&table, a)),
        Some(CompletionKind::Critical(wk.unsafe_on_completed))
    );

    let b = table.declare_type(TypeDecl::class("B"));
    table.declare_method(b, MethodDecl::new("GetAwaiter", t6));
    assert_eq!(
        completion_of(&resolve(&table, b)),
        Some(CompletionKind::Critical(wk.unsafe_on_completed)),
        "critical must propagate through an intermediate type parameter"
    );
}

#[test]
fn test_class_constraint_provides_the_whole_pattern() {
    let mut table = SymbolTable::new();
    let wk = *table.well_known();
    let awaiter = table.declare_type(TypeDecl::class("Awaiter").implements(wk.notify_completion));
    let is_completed =
        table.declare_property(awaiter, PropertyDecl::new("IsCompleted", wk.boolean));
    table.declare_method(awaiter, MethodDecl::new("GetResult", wk.void));
    table.declare_method(
        awaiter,
        MethodDecl::new("OnCompleted", wk.void).param("continuation", wk.action),
    );
    let t = table.declare_type(TypeDecl::type_parameter("T").constraint(awaiter));
    let a = awaitable(&mut table, t);

    let resolution = resolve(&table, a);
    let info = resolution.info().expect("constraint supplies the awaiter pattern");
    assert_eq!(info.is_completed, is_completed);
    assert_eq!(info.completion, CompletionKind::Notify(wk.on_completed));
}

#[test]
fn test_several_constraints_providing_the_interface_are_not_ambiguous() {
    let mut table = SymbolTable::new();
    let wk = *table.well_known();
    let ib = table.declare_type(TypeDecl::interface("IB").implements(wk.notify_completion));
    table.declare_property(ib, PropertyDecl::new("IsCompleted", wk.boolean));
    table.declare_method(ib, MethodDecl::new("GetResult", wk.void));
    let ic = table.declare_type(TypeDecl::interface("IC").implements(wk.notify_completion));
    let t = table.declare_type(TypeDecl::type_parameter("T").constraint(ib).constraint(ic));
    let a = awaitable(&mut table, t);

    assert_eq!(
        completion_of(&resolve(&table, a)),
        Some(CompletionKind::Notify(wk.on_completed))
    );
}

// =============================================================================
// Constraint cycles
// =============================================================================

/// `T7 : T8, T8 : T7`
fn cyclic_pair(table: &mut SymbolTable) -> (TypeId, TypeId) {
    let t7 = table.declare_type(TypeDecl::type_parameter("T7"));
    let t8 = table.declare_type(TypeDecl::type_parameter("T8").constraint(t7));
    table.add_constraint(t7, t8);
    (t7, t8)
}

#[test]
fn test_cyclic_awaiter_constraints_poison_the_site_silently() {
    let mut table = SymbolTable::new();
    let (t7, _) = cyclic_pair(&mut table);
    let a = awaitable(&mut table, t7);
    let resolver = AwaitResolver::new(&table, ResolverOptions::default());

    let resolution = resolve_with(&resolver, a);
    assert!(resolution.is_poisoned());
    assert!(resolution.diagnostics().is_empty());

    let declared: Vec<_> = resolver
        .declaration_diagnostics()
        .iter()
        .map(|d| resolver.render(d))
        .map(|d| (d.code, d.message_text))
        .collect();
    assert_eq!(
        declared,
        vec![(
            454,
            "Circular constraint dependency involving 'T7' and 'T8'".to_string()
        )]
    );
}

#[test]
fn test_cyclic_operand_constraints_poison_the_site_silently() {
    let mut table = SymbolTable::new();
    let (_, t8) = cyclic_pair(&mut table);
    let resolver = AwaitResolver::new(&table, ResolverOptions::default());

    let resolution = resolve_with(&resolver, t8);
    assert!(resolution.is_poisoned());
    assert!(resolution.diagnostics().is_empty());
    assert_eq!(
        resolver
            .declaration_diagnostics()
            .iter()
            .map(|d| d.code)
            .collect::<Vec<_>>(),
        vec![454]
    );
}

#[test]
fn test_validating_a_cyclic_awaiter_directly() {
    let mut table = SymbolTable::new();
    let (t7, _) = cyclic_pair(&mut table);
    let resolver = AwaitResolver::new(&table, ResolverOptions::default());

    let shape = resolver.validate_awaiter(t7, LookupScope::global(&table));
    assert!(!shape.is_valid());
    assert!(shape.diagnostics.is_empty());
}
