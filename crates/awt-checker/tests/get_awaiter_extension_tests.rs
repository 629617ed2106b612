//! Tests for extension `GetAwaiter` lookup: scope tiers, truncation,
//! receiver matching and order-independent ambiguity.

use awt_binder::{
    Accessibility, LookupScope, MethodDecl, PropertyDecl, SymbolTable, TypeDecl, TypeId,
};
use awt_checker::{AwaitResolution, AwaitResolver, AwaitSite, PatternPolicy, ResolverOptions};

fn declare_awaiter(table: &mut SymbolTable, name: &str) -> TypeId {
    let wk = *table.well_known();
    let awaiter = table.declare_type(TypeDecl::class(name).implements(wk.notify_completion));
    table.declare_property(awaiter, PropertyDecl::new("IsCompleted", wk.boolean));
    table.declare_method(awaiter, MethodDecl::new("GetResult", wk.void));
    table.declare_method(
        awaiter,
        MethodDecl::new("OnCompleted", wk.void).param("continuation", wk.action),
    );
    awaiter
}

fn resolve_in(table: &SymbolTable, operand: TypeId, scope: LookupScope) -> AwaitResolution {
    resolve_with_policy(table, operand, scope, PatternPolicy::strict())
}

fn resolve_with_policy(
    table: &SymbolTable,
    operand: TypeId,
    scope: LookupScope,
    policy: PatternPolicy,
) -> AwaitResolution {
    AwaitResolver::new(table, ResolverOptions::default().with_policy(policy))
        .resolve(&AwaitSite::expression(operand, scope))
}

fn resolve(table: &SymbolTable, operand: TypeId) -> AwaitResolution {
    resolve_in(table, operand, LookupScope::global(table))
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

fn get_error_codes(table: &SymbolTable, resolution: &AwaitResolution) -> Vec<u32> {
    get_messages(table, resolution)
        .into_iter()
        .map(|(code, _)| code)
        .collect()
}

// =============================================================================
// Ambiguity
// =============================================================================

/// Two sibling static classes, declared in the given order, each providing
/// `GetAwaiter(this A)`.
fn sibling_extensions(order: [&str; 2]) -> (SymbolTable, TypeId) {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let a = table.declare_type(TypeDecl::class("A"));
    for name in order {
        let container = table.declare_type(TypeDecl::static_class(name));
        table.declare_method(container, MethodDecl::new("GetAwaiter", awaiter).extension(a));
    }
    (table, a)
}

#[test]
fn test_sibling_extensions_are_ambiguous() {
    let (table, a) = sibling_extensions(["E1", "E2"]);
    let resolution = resolve(&table, a);
    assert!(resolution.is_poisoned());
    assert_eq!(
        get_messages(&table, &resolution),
        vec![(
            121,
            "The call is ambiguous between the following methods or properties: 'E1.GetAwaiter(A)' and 'E2.GetAwaiter(A)'".to_string()
        )]
    );
}

#[test]
fn test_ambiguity_is_independent_of_declaration_order() {
    let (forward, a) = sibling_extensions(["E1", "E2"]);
    let (reversed, b) = sibling_extensions(["E2", "E1"]);
    assert_eq!(
        get_messages(&forward, &resolve(&forward, a)),
        get_messages(&reversed, &resolve(&reversed, b)),
    );
}

#[test]
fn test_extension_in_containing_class_duels_with_sibling() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let a = table.declare_type(TypeDecl::class("A"));
    let e = table.declare_type(TypeDecl::static_class("E"));
    table.declare_method(e, MethodDecl::new("GetAwaiter", awaiter).extension(a));
    let test = table.declare_type(TypeDecl::static_class("Test"));
    table.declare_method(test, MethodDecl::new("GetAwaiter", awaiter).extension(a));

    let resolution = resolve_in(&table, a, LookupScope::inside(&table, test));
    assert_eq!(
        get_messages(&table, &resolution),
        vec![(
            121,
            "The call is ambiguous between the following methods or properties: 'E.GetAwaiter(A)' and 'Test.GetAwaiter(A)'".to_string()
        )]
    );
}

#[test]
fn test_receivers_of_unrelated_interfaces_are_ambiguous() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let i1 = table.declare_type(TypeDecl::interface("I1"));
    let i2 = table.declare_type(TypeDecl::interface("I2"));
    let c = table.declare_type(TypeDecl::class("C").implements(i1).implements(i2));
    let ext = table.declare_type(TypeDecl::static_class("MyExtensions"));
    table.declare_method(ext, MethodDecl::new("GetAwaiter", awaiter).extension(i1));
    table.declare_method(ext, MethodDecl::new("GetAwaiter", awaiter).extension(i2));

    let resolution = resolve(&table, c);
    assert_eq!(
        get_messages(&table, &resolution),
        vec![(
            121,
            "The call is ambiguous between the following methods or properties: 'MyExtensions.GetAwaiter(I1)' and 'MyExtensions.GetAwaiter(I2)'".to_string()
        )]
    );
}

#[test]
fn test_more_specific_receiver_beats_object() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let object = table.well_known().object;
    let a = table.declare_type(TypeDecl::class("A"));
    let e1 = table.declare_type(TypeDecl::static_class("E1"));
    table.declare_method(e1, MethodDecl::new("GetAwaiter", awaiter).extension(object));
    let e2 = table.declare_type(TypeDecl::static_class("E2"));
    let specific = table.declare_method(e2, MethodDecl::new("GetAwaiter", awaiter).extension(a));

    let resolution = resolve(&table, a);
    assert_eq!(resolution.info().map(|i| i.get_awaiter), Some(specific));
}

// =============================================================================
// Tiers and truncation
// =============================================================================

#[test]
fn test_inapplicable_inner_tier_truncates_outer_tiers() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let object = table.well_known().object;
    let n = table.declare_namespace_path("N");
    let a = table.declare_type(TypeDecl::class("A"));
    let test = table.declare_type(TypeDecl::class("Test").in_namespace(n));
    let inner = table.declare_type(TypeDecl::static_class("Inner").in_namespace(n));
    table.declare_method(
        inner,
        MethodDecl::new("GetAwaiter", awaiter).param("x", object).extension(a),
    );
    let outer = table.declare_type(TypeDecl::static_class("Outer"));
    table.declare_method(outer, MethodDecl::new("GetAwaiter", awaiter).extension(a));

    let resolution = resolve_in(&table, a, LookupScope::inside(&table, test));
    assert_eq!(
        get_messages(&table, &resolution),
        vec![(
            7036,
            "There is no argument given that corresponds to the required parameter 'x' of 'N.Inner.GetAwaiter(A, object)'".to_string()
        )],
        "the applicable extension in the outer tier must never be consulted"
    );
}

#[test]
fn test_inapplicable_inner_tier_continues_under_reference_policy() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let object = table.well_known().object;
    let n = table.declare_namespace_path("N");
    let a = table.declare_type(TypeDecl::class("A"));
    let test = table.declare_type(TypeDecl::class("Test").in_namespace(n));
    let inner = table.declare_type(TypeDecl::static_class("Inner").in_namespace(n));
    table.declare_method(
        inner,
        MethodDecl::new("GetAwaiter", awaiter).param("x", object).extension(a),
    );
    let outer = table.declare_type(TypeDecl::static_class("Outer"));
    let found = table.declare_method(outer, MethodDecl::new("GetAwaiter", awaiter).extension(a));

    let resolution = resolve_with_policy(
        &table,
        a,
        LookupScope::inside(&table, test),
        PatternPolicy::reference_compatible(),
    );
    assert_eq!(resolution.info().map(|i| i.get_awaiter), Some(found));
}

/// `GetAwaiter(this C, object o = null)` next to `GetAwaiter(this D, object o)`.
fn extensions_with_arguments() -> (SymbolTable, TypeId, TypeId) {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let object = table.well_known().object;
    let c = table.declare_type(TypeDecl::class("C"));
    let d = table.declare_type(TypeDecl::class("D"));
    let ext = table.declare_type(TypeDecl::static_class("MyExtensions"));
    table.declare_method(
        ext,
        MethodDecl::new("GetAwaiter", awaiter)
            .optional_param("o", object)
            .extension(c),
    );
    table.declare_method(
        ext,
        MethodDecl::new("GetAwaiter", awaiter).param("o", object).extension(d),
    );
    (table, c, d)
}

#[test]
fn test_required_argument_on_matching_receiver() {
    let (table, _, d) = extensions_with_arguments();
    let scope = LookupScope::global(&table);

    let strict = resolve_with_policy(&table, d, scope, PatternPolicy::strict());
    assert_eq!(
        get_messages(&table, &strict),
        vec![(
            7036,
            "There is no argument given that corresponds to the required parameter 'o' of 'MyExtensions.GetAwaiter(D, object)'".to_string()
        )]
    );

    let reference = resolve_with_policy(&table, d, scope, PatternPolicy::reference_compatible());
    assert_eq!(
        get_messages(&table, &reference),
        vec![(
            1929,
            "'D' does not contain a definition for 'GetAwaiter' and the best extension method overload 'MyExtensions.GetAwaiter(C, object)' requires a receiver of type 'C'".to_string()
        )]
    );
}

#[test]
fn test_optional_argument_extension_is_unsuitable() {
    let (table, c, _) = extensions_with_arguments();
    let scope = LookupScope::global(&table);
    for policy in [PatternPolicy::strict(), PatternPolicy::reference_compatible()] {
        let resolution = resolve_with_policy(&table, c, scope, policy);
        assert_eq!(
            get_messages(&table, &resolution),
            vec![(
                1986,
                "'await' requires that the type 'C' have a suitable 'GetAwaiter' method".to_string()
            )],
            "policy {policy:?}"
        );
    }
}

#[test]
fn test_receiver_mismatch_in_inner_tier_continues_outward() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let n = table.declare_namespace_path("N");
    let a = table.declare_type(TypeDecl::class("A"));
    let b = table.declare_type(TypeDecl::class("B"));
    let test = table.declare_type(TypeDecl::class("Test").in_namespace(n));
    let inner = table.declare_type(TypeDecl::static_class("Inner").in_namespace(n));
    table.declare_method(inner, MethodDecl::new("GetAwaiter", awaiter).extension(b));
    let outer = table.declare_type(TypeDecl::static_class("Outer"));
    let found = table.declare_method(outer, MethodDecl::new("GetAwaiter", awaiter).extension(a));

    let resolution = resolve_in(&table, a, LookupScope::inside(&table, test));
    assert_eq!(resolution.info().map(|i| i.get_awaiter), Some(found));
}

#[test]
fn test_sibling_with_mismatched_receiver_does_not_compete() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let a = table.declare_type(TypeDecl::class("A"));
    let b = table.declare_type(TypeDecl::class("B"));
    let e1 = table.declare_type(TypeDecl::static_class("E1"));
    table.declare_method(e1, MethodDecl::new("GetAwaiter", awaiter).extension(b));
    let e2 = table.declare_type(TypeDecl::static_class("E2"));
    let found = table.declare_method(e2, MethodDecl::new("GetAwaiter", awaiter).extension(a));

    let resolution = resolve(&table, a);
    assert_eq!(resolution.info().map(|i| i.get_awaiter), Some(found));
}

#[test]
fn test_using_import_joins_the_directives_tier() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let lib = table.declare_namespace_path("Lib");
    let app = table.declare_namespace_path("App");
    table.add_using(app, lib);
    let a = table.declare_type(TypeDecl::class("A"));
    let test = table.declare_type(TypeDecl::class("Test").in_namespace(app));
    let lib_ext = table.declare_type(TypeDecl::static_class("LibExt").in_namespace(lib));
    let imported =
        table.declare_method(lib_ext, MethodDecl::new("GetAwaiter", awaiter).extension(a));

    let resolution = resolve_in(&table, a, LookupScope::inside(&table, test));
    assert_eq!(resolution.info().map(|i| i.get_awaiter), Some(imported));

    // Without the import the extension is not visible from the global scope.
    assert_eq!(get_error_codes(&table, &resolve(&table, a)), vec![1061]);
}

// =============================================================================
// Receivers
// =============================================================================

#[test]
fn test_only_mismatched_receivers_report_bad_instance_arg_type() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let a = table.declare_type(TypeDecl::class("A"));
    let c = table.declare_type(TypeDecl::class("C"));
    let ext = table.declare_type(TypeDecl::static_class("MyExtensions"));
    table.declare_method(
        ext,
        MethodDecl::new("GetAwaiter", awaiter)
            .extension(a)
            .accessibility(Accessibility::Private),
    );
    table.declare_method(ext, MethodDecl::new("GetAwaiter", awaiter).extension(c));

    let resolution = resolve(&table, a);
    assert_eq!(
        get_messages(&table, &resolution),
        vec![(
            1929,
            "'A' does not contain a definition for 'GetAwaiter' and the best extension method overload 'MyExtensions.GetAwaiter(C)' requires a receiver of type 'C'".to_string()
        )],
        "inaccessible extension methods are invisible"
    );
}

#[test]
fn test_generic_receiver_is_inferred() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let a = table.declare_type(TypeDecl::class("A"));
    let t = table.declare_type(TypeDecl::type_parameter("T"));
    let ext = table.declare_type(TypeDecl::static_class("MyExtensions"));
    let generic = table.declare_method(
        ext,
        MethodDecl::new("GetAwaiter", awaiter).type_param(t).extension(t),
    );

    let resolution = resolve(&table, a);
    assert_eq!(resolution.info().map(|i| i.get_awaiter), Some(generic));
}

#[test]
fn test_generic_receiver_respects_constraints() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let ia = table.declare_type(TypeDecl::interface("IA"));
    let a = table.declare_type(TypeDecl::class("A"));
    let t = table.declare_type(TypeDecl::type_parameter("T").constraint(ia));
    let ext = table.declare_type(TypeDecl::static_class("MyExtensions"));
    table.declare_method(
        ext,
        MethodDecl::new("GetAwaiter", awaiter).type_param(t).extension(t),
    );

    let resolution = resolve(&table, a);
    assert_eq!(get_error_codes(&table, &resolution), vec![1929]);
}

#[test]
fn test_uninferable_extension_type_argument() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let b = table.declare_type(TypeDecl::class("B"));
    let t = table.declare_type(TypeDecl::type_parameter("T"));
    let ext = table.declare_type(TypeDecl::static_class("MyExtensions"));
    table.declare_method(
        ext,
        MethodDecl::new("GetAwaiter", awaiter).type_param(t).extension(b),
    );

    let resolution = resolve(&table, b);
    assert_eq!(
        get_messages(&table, &resolution),
        vec![(
            411,
            "The type arguments for method 'MyExtensions.GetAwaiter<T>(B)' cannot be inferred from the usage. Try specifying the type arguments explicitly.".to_string()
        )]
    );
}

#[test]
fn test_missing_get_awaiter() {
    let mut table = SymbolTable::new();
    let a = table.declare_type(TypeDecl::class("A"));

    let resolution = resolve(&table, a);
    assert_eq!(
        get_messages(&table, &resolution),
        vec![(
            1061,
            "'A' does not contain a definition for 'GetAwaiter' and no accessible extension method 'GetAwaiter' accepting a first argument of type 'A' could be found (are you missing a using directive or an assembly reference?)".to_string()
        )]
    );
}

#[test]
fn test_extension_on_non_static_class_is_ignored() {
    let mut table = SymbolTable::new();
    let awaiter = declare_awaiter(&mut table, "Awaiter");
    let a = table.declare_type(TypeDecl::class("A"));
    let holder = table.declare_type(TypeDecl::class("NotStatic"));
    table.declare_method(holder, MethodDecl::new("GetAwaiter", awaiter).extension(a));

    assert_eq!(get_error_codes(&table, &resolve(&table, a)), vec![1061]);
}
