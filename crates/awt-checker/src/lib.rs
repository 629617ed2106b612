//! Await Pattern Resolver
//!
//! Resolves an `await` operand to the members of the awaiter pattern:
//!
//! - **Candidate collection**: instance `GetAwaiter` lookup, then extension
//!   methods tier by tier, truncating at the first tier with a candidate
//! - **Overload resolution**: applicability, betterness and order-independent
//!   ambiguity reporting
//! - **Awaiter validation**: `IsCompleted`, `GetResult` and the completion
//!   interface, through type parameter constraints
//! - **Completion selection**: which builder call lowering emits per await
//!
//! Failures never abort: every site yields either a [`BoundAwaitableInfo`] or
//! poison plus [`PendingDiagnostic`]s.
mod awaiter;
mod candidates;
pub mod codegen;
pub mod context;
mod declarations;
pub mod diagnostics;
mod error_reporter;
pub mod overload;
mod resolver;

pub use awaiter::{
    AwaiterFailure, AwaiterShape, AwaiterValidator, CompletionKind, GetResultState,
    PropertyReadState,
};
pub use candidates::{Candidate, CandidateCollector, CandidateOrigin, CandidateSet, Candidates};
pub use codegen::{BoundAwaitableInfo, CompletionRegistration, plan_completions};
pub use context::{CancellationToken, PatternPolicy, ResolverOptions};
pub use declarations::DeclarationChecker;
pub use diagnostics::{DiagnosticArg, PendingDiagnostic};
pub use overload::{Applicability, GetAwaiterFailure, OverloadResolver, ResolvedGetAwaiter};
pub use resolver::{AwaitOperand, AwaitResolution, AwaitResolver, AwaitSite};
