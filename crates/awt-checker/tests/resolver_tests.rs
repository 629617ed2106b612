//! Tests for the resolver entry point: operand classification, poison,
//! cancellation, completion planning and parallel resolution.

use awt_binder::{LookupScope, MethodDecl, PropertyDecl, SymbolTable, TypeDecl, TypeId};
use awt_checker::{
    AwaitOperand, AwaitResolution, AwaitResolver, AwaitSite, CancellationToken,
    CompletionRegistration, ResolverOptions, plan_completions,
};
use rayon::prelude::*;

fn declare_awaiter(table: &mut SymbolTable, name: &str, critical: bool) -> TypeId {
    let wk = *table.well_known();
    let interface = if critical {
        wk.critical_notify_completion
    } else {
        wk.notify_completion
    };
    let awaiter = table.declare_type(TypeDecl::class(name).implements(interface));
    table.declare_property(awaiter, PropertyDecl::new("IsCompleted", wk.boolean));
    table.declare_method(awaiter, MethodDecl::new("GetResult", wk.void));
    table.declare_method(
        awaiter,
        MethodDecl::new("OnCompleted", wk.void).param("continuation", wk.action),
    );
    if critical {
        table.declare_method(
            awaiter,
            MethodDecl::new("UnsafeOnCompleted", wk.void).param("continuation", wk.action),
        );
    }
    awaiter
}

fn awaitable(table: &mut SymbolTable, name: &str, awaiter: TypeId) -> TypeId {
    let ty = table.declare_type(TypeDecl::class(name));
    table.declare_method(ty, MethodDecl::new("GetAwaiter", awaiter));
    ty
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
// Operand classification
// =============================================================================

#[test]
fn test_intrinsic_operands_cannot_be_awaited() {
    let table = SymbolTable::new();
    let resolver = AwaitResolver::new(&table, ResolverOptions::default());
    let scope = LookupScope::global(&table);
    let cases = [
        (AwaitOperand::Null, 4001, "Cannot await '<null>'"),
        (AwaitOperand::MethodGroup, 4001, "Cannot await 'method group'"),
        (AwaitOperand::Lambda, 4001, "Cannot await 'lambda expression'"),
        (AwaitOperand::VoidCall, 4008, "Cannot await 'void'"),
        (
            AwaitOperand::Expression(table.well_known().void),
            4008,
            "Cannot await 'void'",
        ),
    ];
    for (operand, code, message) in cases {
        let resolution = resolver.resolve(&AwaitSite::new(operand, scope));
        assert_eq!(
            get_messages(&table, &resolution),
            vec![(code, message.to_string())],
            "operand {operand:?}"
        );
    }
}

#[test]
fn test_erroneous_operands_poison_without_diagnostics() {
    let mut table = SymbolTable::new();
    let error = table.well_known().error;
    let returns_error = awaitable(&mut table, "A", error);
    let resolver = AwaitResolver::new(&table, ResolverOptions::default());
    let scope = LookupScope::global(&table);

    for operand in [
        AwaitOperand::Error,
        AwaitOperand::Expression(error),
        AwaitOperand::Expression(returns_error),
    ] {
        let resolution = resolver.resolve(&AwaitSite::new(operand, scope));
        assert!(resolution.is_poisoned(), "operand {operand:?}");
        assert!(
            resolution.diagnostics().is_empty(),
            "no cascading diagnostics for {operand:?}"
        );
    }
}

// =============================================================================
// Cancellation
// =============================================================================

#[test]
fn test_cancelled_resolution_reports_nothing() {
    let mut table = SymbolTable::new();
    let a = table.declare_type(TypeDecl::class("A"));
    let token = CancellationToken::new();
    let resolver =
        AwaitResolver::new(&table, ResolverOptions::default()).with_cancellation(token.clone());
    let site = AwaitSite::expression(a, LookupScope::global(&table));

    assert!(resolver.resolve(&site).is_poisoned());
    token.cancel();
    let resolution = resolver.resolve(&site);
    assert_eq!(resolution, AwaitResolution::Cancelled);
    assert!(resolution.diagnostics().is_empty());
}

// =============================================================================
// Completion planning
// =============================================================================

#[test]
fn test_one_method_may_mix_completion_kinds() {
    let mut table = SymbolTable::new();
    let notify = declare_awaiter(&mut table, "NotifyAwaiter", false);
    let critical = declare_awaiter(&mut table, "CriticalAwaiter", true);
    let a = awaitable(&mut table, "A", notify);
    let b = awaitable(&mut table, "B", critical);
    let resolver = AwaitResolver::new(&table, ResolverOptions::default());
    let scope = LookupScope::global(&table);

    let resolutions: Vec<_> = [
        AwaitSite::expression(a, scope),
        AwaitSite::expression(b, scope),
        AwaitSite::new(AwaitOperand::Null, scope),
        AwaitSite::expression(a, scope),
    ]
    .iter()
    .map(|site| resolver.resolve(site))
    .collect();

    let plan = plan_completions(&resolutions);
    assert_eq!(
        plan,
        vec![
            Some(CompletionRegistration::AwaitOnCompleted),
            Some(CompletionRegistration::AwaitUnsafeOnCompleted),
            None,
            Some(CompletionRegistration::AwaitOnCompleted),
        ]
    );
    let names: Vec<_> = plan
        .iter()
        .flatten()
        .map(|r| r.builder_method_name())
        .collect();
    assert_eq!(
        names,
        vec!["AwaitOnCompleted", "AwaitUnsafeOnCompleted", "AwaitOnCompleted"]
    );
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn test_parallel_resolution_matches_sequential() {
    let mut table = SymbolTable::new();
    let notify = declare_awaiter(&mut table, "NotifyAwaiter", false);
    let critical = declare_awaiter(&mut table, "CriticalAwaiter", true);
    let mut operands = Vec::new();
    for i in 0..16 {
        let awaiter = if i % 2 == 0 { notify } else { critical };
        operands.push(awaitable(&mut table, &format!("A{i}"), awaiter));
        operands.push(table.declare_type(TypeDecl::class(format!("Plain{i}"))));
    }
    let scope = LookupScope::global(&table);
    let sites: Vec<_> = operands
        .iter()
        .map(|&ty| AwaitSite::expression(ty, scope))
        .collect();

    let sequential = AwaitResolver::new(&table, ResolverOptions::default());
    let expected: Vec<_> = sites.iter().map(|s| sequential.resolve(s)).collect();

    let shared = AwaitResolver::new(&table, ResolverOptions::default());
    let actual: Vec<_> = sites.par_iter().map(|s| shared.resolve(s)).collect();

    assert_eq!(actual, expected);
    assert_eq!(
        actual.iter().filter(|r| r.is_poisoned()).count(),
        16,
        "every Plain type lacks GetAwaiter"
    );
}

#[test]
fn test_resolver_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<AwaitResolver<'static>>();
}
