//! Awaiter shape validation.
//!
//! Given the type returned by `GetAwaiter`, checks the three parts of the
//! awaiter pattern:
//! - `IsCompleted`: a readable, accessible, instance `bool` property (or field)
//! - the completion interface: `ICriticalNotifyCompletion`, else
//!   `INotifyCompletion`, satisfied nominally by the type or anything in its
//!   constraint closure
//! - `GetResult`: an accessible, non-generic, parameterless instance method
//!
//! All three are evaluated; only the first failure in that order becomes a
//! diagnostic.

use awt_binder::{
    ConstraintCycle, LookupScope, MemberId, MemberKind, SymbolTable, TypeId, TypeKind,
};
use tracing::{debug, trace};

use crate::diagnostics::PendingDiagnostic;
use crate::error_reporter;

/// Outcome of reading `IsCompleted` on an awaiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyReadState {
    Missing,
    Inaccessible(MemberId),
    /// A method or event named `IsCompleted`.
    NotAProperty(MemberId),
    StaticOnly(MemberId),
    NoGetter(MemberId),
    WrongType { member: MemberId, ty: TypeId },
    Ok(MemberId),
}

impl PropertyReadState {
    pub fn member(self) -> Option<MemberId> {
        match self {
            PropertyReadState::Missing => None,
            PropertyReadState::Inaccessible(m)
            | PropertyReadState::NotAProperty(m)
            | PropertyReadState::StaticOnly(m)
            | PropertyReadState::NoGetter(m)
            | PropertyReadState::WrongType { member: m, .. }
            | PropertyReadState::Ok(m) => Some(m),
        }
    }

    #[inline]
    pub fn is_ok(self) -> bool {
        matches!(self, PropertyReadState::Ok(_))
    }
}

/// Outcome of finding `GetResult` on an awaiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GetResultState {
    Missing,
    /// A property, field or event named `GetResult`.
    NotInvocable(MemberId),
    /// No overload callable without arguments.
    WrongShape(MemberId),
    Inaccessible(MemberId),
    Static(MemberId),
    Generic(MemberId),
    Conditional(MemberId),
    Ok(MemberId),
}

impl GetResultState {
    #[inline]
    pub fn is_ok(self) -> bool {
        matches!(self, GetResultState::Ok(_))
    }
}

/// Which completion-registration interface the awaiter provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    None,
    /// `INotifyCompletion.OnCompleted` (or its implementation).
    Notify(MemberId),
    /// `ICriticalNotifyCompletion.UnsafeOnCompleted` (or its implementation).
    Critical(MemberId),
}

/// The first thing wrong with an awaiter type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AwaiterFailure {
    IsCompleted(PropertyReadState),
    Completion,
    GetResult(GetResultState),
    /// The awaiter is a type parameter on a constraint cycle. Reported at the
    /// declaration, not at the await.
    CyclicConstraint(ConstraintCycle),
}

/// Validated view of an awaiter type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AwaiterShape {
    pub awaiter_type: TypeId,
    pub is_completed: PropertyReadState,
    pub get_result_state: GetResultState,
    pub get_result: Option<MemberId>,
    /// Return type of `GetResult` (possibly `void`).
    pub result_type: Option<TypeId>,
    pub completion: CompletionKind,
    pub failure: Option<AwaiterFailure>,
    /// Span-less diagnostics for `failure`; the resolver anchors them at the
    /// await site.
    pub diagnostics: Vec<PendingDiagnostic>,
}

impl AwaiterShape {
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.failure.is_none()
    }
}

/// Validates awaiter types as seen from one lookup scope.
pub struct AwaiterValidator<'a> {
    table: &'a SymbolTable,
    scope: LookupScope,
}

impl<'a> AwaiterValidator<'a> {
    pub fn new(table: &'a SymbolTable, scope: LookupScope) -> Self {
        AwaiterValidator { table, scope }
    }

    pub fn validate(&self, awaiter: TypeId) -> AwaiterShape {
        let table = self.table;
        if table.type_symbol(awaiter).is_type_parameter()
            && let Err(cycle) = table.constraint_closure(awaiter)
        {
            debug!(awaiter = awaiter.0, "awaiter type parameter has cyclic constraints");
            return AwaiterShape {
                awaiter_type: awaiter,
                is_completed: PropertyReadState::Missing,
                get_result_state: GetResultState::Missing,
                get_result: None,
                result_type: None,
                completion: CompletionKind::None,
                failure: Some(AwaiterFailure::CyclicConstraint(cycle)),
                diagnostics: Vec::new(),
            };
        }

        let is_completed = self.read_is_completed(awaiter);
        let completion = self.completion(awaiter);
        let get_result_state = self.find_get_result(awaiter);
        trace!(
            awaiter = awaiter.0,
            ?is_completed,
            ?completion,
            ?get_result_state,
            "awaiter members"
        );

        let failure = if !is_completed.is_ok() {
            Some(AwaiterFailure::IsCompleted(is_completed))
        } else if completion == CompletionKind::None {
            Some(AwaiterFailure::Completion)
        } else if !get_result_state.is_ok() {
            Some(AwaiterFailure::GetResult(get_result_state))
        } else {
            None
        };
        let diagnostics = failure
            .iter()
            .filter_map(|f| error_reporter::awaiter_failure(table, awaiter, f))
            .collect();

        let get_result = match get_result_state {
            GetResultState::Ok(m) => Some(m),
            _ => None,
        };
        AwaiterShape {
            awaiter_type: awaiter,
            is_completed,
            get_result_state,
            get_result,
            result_type: get_result.map(|m| table.member_type(m)),
            completion,
            failure,
            diagnostics,
        }
    }

    fn read_is_completed(&self, awaiter: TypeId) -> PropertyReadState {
        let table = self.table;
        let name = table.names().is_completed;
        let Some(member) = table.lookup_members_accessible(awaiter, name, &self.scope).first()
        else {
            return match table.lookup_members(awaiter, name).first() {
                Some(member) => PropertyReadState::Inaccessible(member),
                None => PropertyReadState::Missing,
            };
        };
        let symbol = table.member(member);
        let boolean = table.well_known().boolean;
        match &symbol.kind {
            MemberKind::Method(_) | MemberKind::Event(_) => PropertyReadState::NotAProperty(member),
            MemberKind::Property(_) | MemberKind::Field(_) if symbol.is_static() => {
                PropertyReadState::StaticOnly(member)
            }
            MemberKind::Property(prop) if !prop.has_getter => PropertyReadState::NoGetter(member),
            MemberKind::Property(prop) if prop.ty != boolean => {
                PropertyReadState::WrongType { member, ty: prop.ty }
            }
            MemberKind::Field(field) if field.ty != boolean => {
                PropertyReadState::WrongType { member, ty: field.ty }
            }
            MemberKind::Property(_) | MemberKind::Field(_) => PropertyReadState::Ok(member),
        }
    }

    fn find_get_result(&self, awaiter: TypeId) -> GetResultState {
        let table = self.table;
        let lookup = table.lookup_members(awaiter, table.names().get_result);
        let Some(first) = lookup.first() else {
            return GetResultState::Missing;
        };
        if !table.member(first).is_method() {
            return GetResultState::NotInvocable(first);
        }
        // Prefer a parameterless, non-generic overload.
        let selected = lookup
            .members
            .iter()
            .copied()
            .min_by_key(|&m| {
                let sig = table.member(m).as_method();
                let has_params = sig.is_some_and(|s| !s.call_params().is_empty());
                let generic = sig.is_some_and(|s| !s.type_params.is_empty());
                (has_params, generic)
            })
            .unwrap_or(first);
        let symbol = table.member(selected);
        let Some(sig) = symbol.as_method() else {
            return GetResultState::NotInvocable(selected);
        };
        if !sig.call_params().is_empty() {
            GetResultState::WrongShape(selected)
        } else if !table.is_accessible(selected, &self.scope) {
            GetResultState::Inaccessible(selected)
        } else if symbol.is_static() {
            GetResultState::Static(selected)
        } else if !sig.type_params.is_empty() {
            GetResultState::Generic(selected)
        } else if symbol.is_conditional() {
            GetResultState::Conditional(selected)
        } else {
            GetResultState::Ok(selected)
        }
    }

    /// Critical first, then notify. Satisfaction is nominal and existential
    /// over the constraint closure; conversions never count.
    fn completion(&self, awaiter: TypeId) -> CompletionKind {
        let table = self.table;
        let wk = table.well_known();
        if table.implements_interface(awaiter, wk.critical_notify_completion) {
            CompletionKind::Critical(self.completion_member(awaiter, wk.unsafe_on_completed))
        } else if table.implements_interface(awaiter, wk.notify_completion) {
            CompletionKind::Notify(self.completion_member(awaiter, wk.on_completed))
        } else {
            CompletionKind::None
        }
    }

    /// The awaiter's implementation of an interface method, falling back to
    /// the interface method itself (interfaces, type parameters).
    fn completion_member(&self, awaiter: TypeId, interface_member: MemberId) -> MemberId {
        match self.table.type_symbol(awaiter).kind {
            TypeKind::Class | TypeKind::Struct => self
                .table
                .find_implementation(awaiter, interface_member)
                .unwrap_or(interface_member),
            _ => interface_member,
        }
    }
}
