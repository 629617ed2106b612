//! Diagnostic emission: maps every resolution failure to a diagnostic kind,
//! code and structured arguments.
//!
//! Nothing here formats strings; see [`crate::diagnostics`] for rendering.

use awt_binder::{ConstraintCycle, MemberId, SymbolTable, TypeId};
use awt_common::diagnostic_codes as codes;
use awt_common::{DiagnosticKind, SourceSpan};

use crate::awaiter::{AwaiterFailure, GetResultState, PropertyReadState};
use crate::diagnostics::{DiagnosticArg, PendingDiagnostic};
use crate::overload::GetAwaiterFailure;
use crate::resolver::AwaitOperand;

// =============================================================================
// Operand
// =============================================================================

/// Operands that can never be awaited. `None` for operands that need lookup
/// and for already-erroneous operands (no cascading).
pub(crate) fn bad_operand(table: &SymbolTable, operand: &AwaitOperand) -> Option<PendingDiagnostic> {
    let intrinsic = |what: &str| {
        Some(PendingDiagnostic::with_code(
            DiagnosticKind::BadAwaitOperand,
            codes::BAD_AWAIT_ARG_INTRINSIC,
            vec![what.into()],
        ))
    };
    let void_call = || {
        Some(PendingDiagnostic::with_code(
            DiagnosticKind::BadAwaitOperand,
            codes::BAD_AWAIT_ARG_VOID_CALL,
            Vec::new(),
        ))
    };
    match operand {
        AwaitOperand::Null => intrinsic("<null>"),
        AwaitOperand::MethodGroup => intrinsic("method group"),
        AwaitOperand::Lambda => intrinsic("lambda expression"),
        AwaitOperand::VoidCall => void_call(),
        AwaitOperand::Expression(ty) if *ty == table.well_known().void => void_call(),
        AwaitOperand::Expression(_) | AwaitOperand::Error => None,
    }
}

// =============================================================================
// GetAwaiter
// =============================================================================

pub(crate) fn get_awaiter_failure(
    table: &SymbolTable,
    operand: TypeId,
    failure: GetAwaiterFailure,
) -> PendingDiagnostic {
    let get_awaiter = table.names().get_awaiter;
    match failure {
        GetAwaiterFailure::Missing => PendingDiagnostic::with_code(
            DiagnosticKind::MissingMember,
            codes::NO_SUCH_MEMBER_OR_EXTENSION,
            vec![operand.into(), get_awaiter.into()],
        ),
        GetAwaiterFailure::ReceiverMismatch {
            candidate,
            receiver,
        } => PendingDiagnostic::new(
            DiagnosticKind::ReceiverMismatch,
            vec![
                operand.into(),
                get_awaiter.into(),
                candidate.into(),
                receiver.into(),
            ],
        ),
        GetAwaiterFailure::NotInvocable(member) => {
            PendingDiagnostic::new(DiagnosticKind::NotInvocable, vec![member.into()])
        }
        GetAwaiterFailure::Ambiguous(first, second) => PendingDiagnostic::new(
            DiagnosticKind::AmbiguousCall,
            vec![first.into(), second.into()],
        ),
        GetAwaiterFailure::MissingArgument { candidate, param } => PendingDiagnostic::with_code(
            DiagnosticKind::WrongArity,
            codes::NO_CORRESPONDING_ARGUMENT,
            vec![param.into(), candidate.into()],
        ),
        GetAwaiterFailure::UninferableTypeArguments(member) => uninferable(member),
        GetAwaiterFailure::Inaccessible(member) => inaccessible(member),
        GetAwaiterFailure::Static(member) => wrong_staticness(member),
        GetAwaiterFailure::Unsuitable(_) => {
            PendingDiagnostic::new(DiagnosticKind::UnsuitableGetAwaiter, vec![operand.into()])
        }
    }
}

// =============================================================================
// Awaiter shape
// =============================================================================

/// Diagnostic for the first awaiter failure. `BadAwaiterShape` diagnostics
/// still lack the operand argument; [`anchor`] adds it.
pub(crate) fn awaiter_failure(
    table: &SymbolTable,
    awaiter: TypeId,
    failure: &AwaiterFailure,
) -> Option<PendingDiagnostic> {
    let names = table.names();
    let diag = match *failure {
        AwaiterFailure::IsCompleted(state) => match state {
            PropertyReadState::Missing | PropertyReadState::Inaccessible(_) => {
                no_such_member(awaiter, names.is_completed.into())
            }
            PropertyReadState::NotAProperty(_) | PropertyReadState::WrongType { .. } => {
                bad_awaiter_shape(awaiter)
            }
            PropertyReadState::StaticOnly(member) => wrong_staticness(member),
            PropertyReadState::NoGetter(member) => {
                PendingDiagnostic::new(DiagnosticKind::PropertyLacksGetter, vec![member.into()])
            }
            PropertyReadState::Ok(_) => return None,
        },
        AwaiterFailure::Completion => PendingDiagnostic::new(
            DiagnosticKind::DoesNotImplementCompletionInterface,
            vec![
                awaiter.into(),
                table.well_known().notify_completion.into(),
            ],
        ),
        AwaiterFailure::GetResult(state) => match state {
            GetResultState::Missing => no_such_member(awaiter, names.get_result.into()),
            GetResultState::NotInvocable(member) => PendingDiagnostic::with_code(
                DiagnosticKind::NotInvocable,
                codes::BAD_SYMBOL_KIND,
                vec![
                    names.get_result.into(),
                    table.member(member).kind.describe().into(),
                    "method".into(),
                ],
            ),
            GetResultState::WrongShape(_) | GetResultState::Conditional(_) => {
                bad_awaiter_shape(awaiter)
            }
            GetResultState::Inaccessible(member) => inaccessible(member),
            GetResultState::Static(member) => wrong_staticness(member),
            GetResultState::Generic(member) => uninferable(member),
            GetResultState::Ok(_) => return None,
        },
        AwaiterFailure::CyclicConstraint(_) => return None,
    };
    Some(diag)
}

/// Place a span-less awaiter diagnostic at an await site.
pub(crate) fn anchor(
    mut diag: PendingDiagnostic,
    span: Option<&SourceSpan>,
    operand: TypeId,
) -> PendingDiagnostic {
    if diag.code == codes::BAD_AWAITER_PATTERN && diag.args.len() == 1 {
        diag.args.push(operand.into());
    }
    diag.with_span(span)
}

// =============================================================================
// Declarations
// =============================================================================

pub(crate) fn conditional_interface_member(
    table: &SymbolTable,
    implementation: MemberId,
    interface_member: MemberId,
    ty: TypeId,
) -> PendingDiagnostic {
    PendingDiagnostic::new(
        DiagnosticKind::ConditionalInterfaceMember,
        vec![implementation.into(), interface_member.into(), ty.into()],
    )
    .with_span(table.member(implementation).span.as_ref())
}

pub(crate) fn cyclic_constraint(table: &SymbolTable, cycle: ConstraintCycle) -> PendingDiagnostic {
    let closing = table
        .type_symbol(cycle.repeated)
        .constraints
        .first()
        .copied()
        .unwrap_or(cycle.repeated);
    PendingDiagnostic::new(
        DiagnosticKind::CyclicConstraint,
        vec![cycle.repeated.into(), closing.into()],
    )
    .with_span(table.type_symbol(cycle.origin).span.as_ref())
}

// -----------------------------------------------------------------------------
// Shared shapes
// -----------------------------------------------------------------------------

fn no_such_member(ty: TypeId, name: DiagnosticArg) -> PendingDiagnostic {
    PendingDiagnostic::with_code(
        DiagnosticKind::MissingMember,
        codes::NO_SUCH_MEMBER,
        vec![ty.into(), name],
    )
}

fn bad_awaiter_shape(awaiter: TypeId) -> PendingDiagnostic {
    PendingDiagnostic::new(DiagnosticKind::BadAwaiterShape, vec![awaiter.into()])
}

fn inaccessible(member: MemberId) -> PendingDiagnostic {
    PendingDiagnostic::new(DiagnosticKind::InaccessibleMember, vec![member.into()])
}

fn wrong_staticness(member: MemberId) -> PendingDiagnostic {
    PendingDiagnostic::new(DiagnosticKind::WrongStaticness, vec![member.into()])
}

fn uninferable(member: MemberId) -> PendingDiagnostic {
    PendingDiagnostic::with_code(
        DiagnosticKind::WrongArity,
        codes::CANT_INFER_METHOD_TYPE_ARGS,
        vec![member.into()],
    )
}
