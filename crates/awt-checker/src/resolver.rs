//! The await resolver: the entry point the expression binder calls for every
//! `await` expression.
//!
//! Each site is resolved independently:
//! 1. classify the operand (intrinsic operands fail immediately)
//! 2. collect `GetAwaiter` candidates and pick the winner
//! 3. validate the awaiter type the winner returns
//! 4. hand lowering a [`BoundAwaitableInfo`], or poison plus diagnostics
//!
//! The resolver borrows an immutable [`SymbolTable`] and keeps two
//! compilation-lifetime memo tables (awaiter shapes and declaration checks).
//! It is `Sync`; hosts may resolve independent sites in parallel.

use std::sync::Arc;

use awt_binder::{LookupScope, SymbolTable, TypeId, TypeKind};
use awt_common::{Diagnostic, SourceSpan};
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::awaiter::{AwaiterShape, AwaiterValidator};
use crate::candidates::CandidateCollector;
use crate::codegen::{self, BoundAwaitableInfo};
use crate::context::{CancellationToken, ResolverOptions};
use crate::declarations::DeclarationChecker;
use crate::diagnostics::PendingDiagnostic;
use crate::error_reporter;
use crate::overload::OverloadResolver;

// =============================================================================
// Inputs and outputs
// =============================================================================

/// What the binder knows about an `await` operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AwaitOperand {
    /// An expression of a static type.
    Expression(TypeId),
    /// The `null` literal.
    Null,
    /// A method group (`await M`).
    MethodGroup,
    /// An anonymous function.
    Lambda,
    /// An invocation of a `void` method.
    VoidCall,
    /// The operand already failed to bind.
    Error,
}

/// One `await` expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AwaitSite {
    pub operand: AwaitOperand,
    pub scope: LookupScope,
    pub span: Option<SourceSpan>,
}

impl AwaitSite {
    pub fn new(operand: AwaitOperand, scope: LookupScope) -> Self {
        AwaitSite {
            operand,
            scope,
            span: None,
        }
    }

    pub fn expression(ty: TypeId, scope: LookupScope) -> Self {
        Self::new(AwaitOperand::Expression(ty), scope)
    }

    pub fn with_span(mut self, span: SourceSpan) -> Self {
        self.span = Some(span);
        self
    }
}

/// Result of resolving one site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AwaitResolution {
    Resolved(BoundAwaitableInfo),
    /// Lowering treats the awaiter as behaviourless. `diagnostics` is empty
    /// only when the failure was already reported elsewhere.
    Poison { diagnostics: Vec<PendingDiagnostic> },
    /// Cancelled before completion; nothing is reported.
    Cancelled,
}

impl AwaitResolution {
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        matches!(self, AwaitResolution::Poison { .. })
    }

    pub fn info(&self) -> Option<&BoundAwaitableInfo> {
        match self {
            AwaitResolution::Resolved(info) => Some(info),
            _ => None,
        }
    }

    pub fn diagnostics(&self) -> &[PendingDiagnostic] {
        match self {
            AwaitResolution::Poison { diagnostics } => diagnostics,
            AwaitResolution::Resolved(_) | AwaitResolution::Cancelled => &[],
        }
    }

    fn poison(diagnostic: PendingDiagnostic) -> Self {
        AwaitResolution::Poison {
            diagnostics: vec![diagnostic],
        }
    }

    fn silent_poison() -> Self {
        AwaitResolution::Poison {
            diagnostics: Vec::new(),
        }
    }
}

// =============================================================================
// AwaitResolver
// =============================================================================

pub struct AwaitResolver<'a> {
    table: &'a SymbolTable,
    options: ResolverOptions,
    shapes: DashMap<(TypeId, LookupScope), Arc<AwaiterShape>>,
    declarations: DeclarationChecker,
    cancellation: Option<CancellationToken>,
}

impl<'a> AwaitResolver<'a> {
    pub fn new(table: &'a SymbolTable, options: ResolverOptions) -> Self {
        AwaitResolver {
            table,
            options,
            shapes: DashMap::new(),
            declarations: DeclarationChecker::new(),
            cancellation: None,
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Resolve one `await` expression.
    #[tracing::instrument(level = "debug", skip(self, site), fields(operand = ?site.operand))]
    pub fn resolve(&self, site: &AwaitSite) -> AwaitResolution {
        if self.is_cancelled() {
            return AwaitResolution::Cancelled;
        }
        let resolution = self.resolve_uncancelled(site);
        // Partial results of a cancelled site are dropped, diagnostics included.
        if self.is_cancelled() {
            return AwaitResolution::Cancelled;
        }
        debug!(poisoned = resolution.is_poisoned(), "await resolved");
        resolution
    }

    fn resolve_uncancelled(&self, site: &AwaitSite) -> AwaitResolution {
        let table = self.table;
        let span = site.span.as_ref();

        if let Some(diag) = error_reporter::bad_operand(table, &site.operand) {
            return AwaitResolution::poison(diag.with_span(span));
        }
        let AwaitOperand::Expression(operand) = site.operand else {
            return AwaitResolution::silent_poison();
        };
        if self.is_poisoned_type(operand) {
            trace!(operand = operand.0, "operand type is erroneous");
            return AwaitResolution::silent_poison();
        }

        let candidates =
            CandidateCollector::new(table, self.options.policy).collect(operand, &site.scope);
        let resolver = OverloadResolver::new(table, self.options.policy, site.scope);
        let get_awaiter = match resolver.resolve(&candidates) {
            Ok(resolved) => resolved,
            Err(failure) => {
                debug!(?failure, "GetAwaiter resolution failed");
                return AwaitResolution::poison(
                    error_reporter::get_awaiter_failure(table, operand, failure).with_span(span),
                );
            }
        };

        let awaiter = get_awaiter.awaiter_type;
        if self.is_poisoned_type(awaiter) {
            return AwaitResolution::silent_poison();
        }
        if self.options.report_declaration_diagnostics {
            self.check_declaration(awaiter);
        }

        let shape = self.validate_awaiter(awaiter, site.scope);
        if !shape.is_valid() {
            let diagnostics = shape
                .diagnostics
                .iter()
                .cloned()
                .map(|d| error_reporter::anchor(d, span, operand))
                .collect();
            return AwaitResolution::Poison { diagnostics };
        }

        let (Some(is_completed), Some(get_result), Some(result_type)) = (
            shape.is_completed.member(),
            shape.get_result,
            shape.result_type,
        ) else {
            return AwaitResolution::silent_poison();
        };
        AwaitResolution::Resolved(BoundAwaitableInfo {
            get_awaiter: get_awaiter.method,
            is_completed,
            get_result,
            completion: codegen::select(&shape),
            awaiter_type: awaiter,
            result_type,
        })
    }

    /// Error types and type parameters on a constraint cycle. The cycle is
    /// recorded as a declaration diagnostic; the site reports nothing.
    fn is_poisoned_type(&self, ty: TypeId) -> bool {
        let symbol = self.table.type_symbol(ty);
        match symbol.kind {
            TypeKind::Error => true,
            TypeKind::TypeParameter if self.table.has_cyclic_constraints(ty) => {
                if self.options.report_declaration_diagnostics {
                    self.check_declaration(ty);
                }
                true
            }
            _ => false,
        }
    }

    /// Awaiter shape of `awaiter` as seen from `scope`. Shapes of
    /// non-generic awaiter types are memoized.
    pub fn validate_awaiter(&self, awaiter: TypeId, scope: LookupScope) -> Arc<AwaiterShape> {
        let validator = AwaiterValidator::new(self.table, scope);
        if self.table.type_symbol(awaiter).is_type_parameter() {
            return Arc::new(validator.validate(awaiter));
        }
        if let Some(shape) = self.shapes.get(&(awaiter, scope)) {
            return Arc::clone(shape.value());
        }
        let shape = Arc::new(validator.validate(awaiter));
        Arc::clone(self.shapes.entry((awaiter, scope)).or_insert(shape).value())
    }

    /// Run the declaration checks for `ty` and, for a type parameter, the
    /// types in its constraint closure.
    pub fn check_declaration(&self, ty: TypeId) -> Arc<[PendingDiagnostic]> {
        let table = self.table;
        let own = self.declarations.check(table, ty);
        if table.type_symbol(ty).is_type_parameter()
            && let Ok(closure) = table.constraint_closure(ty)
        {
            for constraint in closure {
                self.declarations.check(table, constraint);
            }
        }
        own
    }

    /// Declaration diagnostics found so far, ordered by declaring type.
    pub fn declaration_diagnostics(&self) -> Vec<PendingDiagnostic> {
        self.declarations.diagnostics()
    }

    /// Forget memoized shapes and declaration checks.
    pub fn clear_caches(&self) {
        self.shapes.clear();
        self.declarations.clear();
    }

    pub fn render(&self, diagnostic: &PendingDiagnostic) -> Diagnostic {
        diagnostic.render(self.table)
    }
}
