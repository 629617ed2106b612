//! Lowering interface: what the async state machine rewrite needs to know
//! about a resolved await.

use awt_binder::{MemberId, TypeId};
use serde::Serialize;

use crate::awaiter::{AwaiterShape, CompletionKind};
use crate::resolver::AwaitResolution;

/// Builder call used to suspend on an awaiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum CompletionRegistration {
    /// Through `INotifyCompletion.OnCompleted`.
    AwaitOnCompleted,
    /// Through `ICriticalNotifyCompletion.UnsafeOnCompleted`.
    AwaitUnsafeOnCompleted,
}

impl CompletionRegistration {
    pub fn builder_method_name(self) -> &'static str {
        match self {
            CompletionRegistration::AwaitOnCompleted => "AwaitOnCompleted",
            CompletionRegistration::AwaitUnsafeOnCompleted => "AwaitUnsafeOnCompleted",
        }
    }
}

impl CompletionKind {
    pub fn registration(self) -> Option<CompletionRegistration> {
        match self {
            CompletionKind::None => None,
            CompletionKind::Notify(_) => Some(CompletionRegistration::AwaitOnCompleted),
            CompletionKind::Critical(_) => Some(CompletionRegistration::AwaitUnsafeOnCompleted),
        }
    }

    pub fn member(self) -> Option<MemberId> {
        match self {
            CompletionKind::None => None,
            CompletionKind::Notify(m) | CompletionKind::Critical(m) => Some(m),
        }
    }
}

/// The completion path lowering should take for a validated awaiter.
///
/// Critical wins whenever the awaiter provides it; an awaiter with only the
/// notify interface takes the notify path.
pub fn select(shape: &AwaiterShape) -> CompletionKind {
    if shape.is_valid() {
        shape.completion
    } else {
        CompletionKind::None
    }
}

/// Everything lowering needs for one successfully bound await.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundAwaitableInfo {
    pub get_awaiter: MemberId,
    pub is_completed: MemberId,
    pub get_result: MemberId,
    pub completion: CompletionKind,
    pub awaiter_type: TypeId,
    /// `void` for awaits that produce no value.
    pub result_type: TypeId,
}

impl BoundAwaitableInfo {
    #[inline]
    pub fn registration(&self) -> Option<CompletionRegistration> {
        self.completion.registration()
    }
}

/// One entry per await, `None` for poisoned or cancelled sites. Each await
/// gets its own registration; mixing both kinds in one method is expected.
pub fn plan_completions(resolutions: &[AwaitResolution]) -> Vec<Option<CompletionRegistration>> {
    resolutions
        .iter()
        .map(|resolution| match resolution {
            AwaitResolution::Resolved(info) => info.registration(),
            AwaitResolution::Poison { .. } | AwaitResolution::Cancelled => None,
        })
        .collect()
}
