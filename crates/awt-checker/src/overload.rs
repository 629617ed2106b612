//! Overload resolution and tie-breaking for `GetAwaiter` candidates.
//!
//! A winner is chosen first and validated afterwards: an inaccessible or
//! static best candidate is reported as such rather than silently dropped.

use awt_binder::{LookupScope, MemberId, SymbolTable, TypeId};
use awt_common::Atom;
use smallvec::SmallVec;
use std::cmp::Ordering;
use tracing::{debug, trace};

use crate::candidates::{Candidate, CandidateOrigin, CandidateSet};
use crate::context::PatternPolicy;

/// Whether a candidate can be invoked with zero explicit arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applicability {
    Applicable {
        /// Optional parameters filled with their defaults.
        defaults_used: u32,
        /// A `params` array expanded to zero elements.
        expanded_params: bool,
    },
    /// A required parameter has no argument.
    MissingArgument { param: Atom },
    /// A method type parameter cannot be inferred from the receiver.
    UninferableTypeArguments,
}

impl Applicability {
    #[inline]
    pub fn is_applicable(self) -> bool {
        matches!(self, Applicability::Applicable { .. })
    }

    /// Applicable without default-filled or expanded arguments.
    #[inline]
    pub fn is_exact(self) -> bool {
        matches!(
            self,
            Applicability::Applicable {
                defaults_used: 0,
                expanded_params: false
            }
        )
    }

    fn defaults_used(self) -> u32 {
        match self {
            Applicability::Applicable { defaults_used, .. } => defaults_used,
            _ => u32::MAX,
        }
    }
}

/// Applicability of `candidate` for a zero-argument call.
pub(crate) fn applicability(table: &SymbolTable, candidate: &Candidate) -> Applicability {
    let Some(sig) = table.member(candidate.member).as_method() else {
        return Applicability::UninferableTypeArguments;
    };
    let mut defaults_used = 0;
    let mut expanded_params = false;
    for param in sig.call_params() {
        if param.is_params() {
            expanded_params = true;
        } else if param.is_optional() {
            defaults_used += 1;
        } else {
            return Applicability::MissingArgument { param: param.name };
        }
    }
    let inferred = candidate.inferred.map(|(tp, _)| tp);
    if sig.type_params.iter().any(|&tp| Some(tp) != inferred) {
        return Applicability::UninferableTypeArguments;
    }
    Applicability::Applicable {
        defaults_used,
        expanded_params,
    }
}

/// Why `GetAwaiter` could not be resolved to a usable method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GetAwaiterFailure {
    /// No instance member and no extension method.
    Missing,
    /// Only extension methods whose receiver does not accept the operand.
    ReceiverMismatch { candidate: MemberId, receiver: TypeId },
    /// A field, property or event named `GetAwaiter`.
    NotInvocable(MemberId),
    /// Two equally good candidates, ordered by display string.
    Ambiguous(MemberId, MemberId),
    MissingArgument { candidate: MemberId, param: Atom },
    UninferableTypeArguments(MemberId),
    Inaccessible(MemberId),
    /// Instance lookup found a static method.
    Static(MemberId),
    /// Resolved, but cannot serve the pattern (void return, default-filled or
    /// `params` arguments, or a static method under the holistic policy).
    Unsuitable(MemberId),
}

/// A resolved, validated `GetAwaiter`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedGetAwaiter {
    pub method: MemberId,
    pub origin: CandidateOrigin,
    /// Return type after substituting an inferred method type argument.
    pub awaiter_type: TypeId,
}

/// Picks the best candidate of a [`CandidateSet`] and validates it.
pub struct OverloadResolver<'a> {
    table: &'a SymbolTable,
    policy: PatternPolicy,
    scope: LookupScope,
}

impl<'a> OverloadResolver<'a> {
    pub fn new(table: &'a SymbolTable, policy: PatternPolicy, scope: LookupScope) -> Self {
        OverloadResolver {
            table,
            policy,
            scope,
        }
    }

    pub fn resolve(&self, set: &CandidateSet) -> Result<ResolvedGetAwaiter, GetAwaiterFailure> {
        match set {
            CandidateSet::NotInvocable(member) => Err(GetAwaiterFailure::NotInvocable(*member)),
            CandidateSet::Instance(candidates) | CandidateSet::Extension { candidates, .. } => {
                let (winner, applicability) = self.select(candidates)?;
                self.validate(winner, applicability)
            }
            CandidateSet::Empty {
                inaccessible_instance,
                mismatched_extensions,
            } => {
                if !inaccessible_instance.is_empty() {
                    let (winner, _) = self.select(inaccessible_instance)?;
                    return Err(GetAwaiterFailure::Inaccessible(winner.member));
                }
                let reported = mismatched_extensions
                    .iter()
                    .min_by(|&&a, &&b| self.display_order(a, b));
                match reported {
                    Some(candidate) => {
                        let receiver = self
                            .table
                            .member(*candidate)
                            .as_method()
                            .and_then(|sig| sig.receiver())
                            .map(|p| p.ty)
                            .unwrap_or(self.table.well_known().error);
                        Err(GetAwaiterFailure::ReceiverMismatch {
                            candidate: *candidate,
                            receiver,
                        })
                    }
                    None => Err(GetAwaiterFailure::Missing),
                }
            }
        }
    }

    /// Applicability of one candidate for a zero-argument call.
    #[inline]
    pub fn applicability(&self, candidate: &Candidate) -> Applicability {
        applicability(self.table, candidate)
    }

    /// Choose the unique best applicable candidate.
    fn select<'c>(
        &self,
        candidates: &'c [Candidate],
    ) -> Result<(&'c Candidate, Applicability), GetAwaiterFailure> {
        let rated: SmallVec<[(&Candidate, Applicability); 4]> = candidates
            .iter()
            .map(|c| (c, self.applicability(c)))
            .collect();
        let applicable: SmallVec<[(&Candidate, Applicability); 4]> = rated
            .iter()
            .copied()
            .filter(|(_, a)| a.is_applicable())
            .collect();

        if applicable.is_empty() {
            // Report against the only candidate, or the display-first one.
            let reported = rated
                .iter()
                .min_by(|a, b| self.display_order(a.0.member, b.0.member));
            return Err(match reported {
                Some((c, Applicability::MissingArgument { param })) => {
                    GetAwaiterFailure::MissingArgument {
                        candidate: c.member,
                        param: *param,
                    }
                }
                Some((c, _)) => GetAwaiterFailure::UninferableTypeArguments(c.member),
                None => GetAwaiterFailure::Missing,
            });
        }

        for (i, &(a, aa)) in applicable.iter().enumerate() {
            let beats_all = applicable
                .iter()
                .enumerate()
                .all(|(j, &(b, ab))| i == j || self.is_better(a, aa, b, ab));
            if beats_all {
                trace!(member = a.member.0, "best GetAwaiter candidate");
                return Ok((a, aa));
            }
        }

        // No unique best: name the two display-first undominated candidates.
        let mut undominated: SmallVec<[MemberId; 4]> = applicable
            .iter()
            .filter(|&&(a, aa)| {
                !applicable
                    .iter()
                    .any(|&(b, ab)| !std::ptr::eq(a, b) && self.is_better(b, ab, a, aa))
            })
            .map(|(c, _)| c.member)
            .collect();
        if undominated.len() < 2 {
            undominated = applicable.iter().map(|(c, _)| c.member).collect();
        }
        undominated.sort_by(|&a, &b| self.display_order(a, b));
        debug!(count = undominated.len(), "ambiguous GetAwaiter candidates");
        Err(GetAwaiterFailure::Ambiguous(undominated[0], undominated[1]))
    }

    /// Betterness of `a` over `b`: more specific receiver first, then exact
    /// over default-filled or expanded, then fewer defaults, then non-generic
    /// over generic.
    pub fn is_better(
        &self,
        a: &Candidate,
        aa: Applicability,
        b: &Candidate,
        ab: Applicability,
    ) -> bool {
        let table = self.table;
        if a.receiver != b.receiver {
            return table.is_more_specific(a.receiver, b.receiver);
        }
        match (aa.is_exact(), ab.is_exact()) {
            (true, false) => return true,
            (false, true) => return false,
            _ => {}
        }
        if aa.defaults_used() != ab.defaults_used() {
            return aa.defaults_used() < ab.defaults_used();
        }
        let generic = |c: &Candidate| {
            table
                .member(c.member)
                .as_method()
                .is_some_and(|sig| !sig.type_params.is_empty())
        };
        !generic(a) && generic(b)
    }

    fn display_order(&self, a: MemberId, b: MemberId) -> Ordering {
        self.table
            .display_member(a)
            .cmp(&self.table.display_member(b))
            .then(a.cmp(&b))
    }

    /// Post-selection checks on the winner.
    fn validate(
        &self,
        winner: &Candidate,
        applicability: Applicability,
    ) -> Result<ResolvedGetAwaiter, GetAwaiterFailure> {
        let table = self.table;
        let member = winner.member;
        let symbol = table.member(member);
        if !table.is_accessible(member, &self.scope) {
            return Err(GetAwaiterFailure::Inaccessible(member));
        }
        if winner.origin == CandidateOrigin::Instance && symbol.is_static() {
            return Err(if self.policy.static_get_awaiter_is_holistic {
                GetAwaiterFailure::Unsuitable(member)
            } else {
                GetAwaiterFailure::Static(member)
            });
        }
        let mut awaiter_type = table.member_type(member);
        if let Some((type_param, argument)) = winner.inferred
            && awaiter_type == type_param
        {
            awaiter_type = argument;
        }
        if awaiter_type == table.well_known().void || !applicability.is_exact() {
            return Err(GetAwaiterFailure::Unsuitable(member));
        }
        Ok(ResolvedGetAwaiter {
            method: member,
            origin: winner.origin,
            awaiter_type,
        })
    }
}
