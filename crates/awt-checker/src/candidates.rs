//! Candidate collection for `GetAwaiter`.
//!
//! Instance lookup runs first. Only when it finds nothing at all (not merely
//! nothing applicable) does collection fall back to extension methods, tier
//! by tier from the innermost namespace outward. The first tier that yields a
//! candidate is final; outer tiers are never consulted after it, unless the
//! policy lets lookup continue past a tier with no applicable candidate.

use awt_binder::{LookupScope, MemberId, SymbolTable, TypeId};
use awt_common::limits::INLINE_CANDIDATES;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::context::PatternPolicy;
use crate::overload;

/// Where a candidate came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CandidateOrigin {
    Instance,
    Extension {
        /// Static class declaring the extension method.
        container: TypeId,
        /// Index of the scope tier, 0 being innermost.
        tier: usize,
    },
}

/// A `GetAwaiter` method that could be invoked on the operand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub member: MemberId,
    pub origin: CandidateOrigin,
    /// Receiver type used for specificity comparisons: the declaring type for
    /// instance methods, the (possibly inferred) `this` parameter type for
    /// extension methods.
    pub receiver: TypeId,
    /// Method type parameter bound by receiver inference, with its argument.
    pub inferred: Option<(TypeId, TypeId)>,
}

impl Candidate {
    #[inline]
    pub fn is_extension(&self) -> bool {
        matches!(self.origin, CandidateOrigin::Extension { .. })
    }
}

pub type Candidates = SmallVec<[Candidate; INLINE_CANDIDATES]>;

/// Output of [`CandidateCollector::collect`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CandidateSet {
    /// Instance lookup found `GetAwaiter` methods; extensions are not
    /// considered.
    Instance(Candidates),
    /// Instance lookup found a field, property or event named `GetAwaiter`.
    NotInvocable(MemberId),
    /// Candidates from the first tier that had any.
    Extension { tier: usize, candidates: Candidates },
    /// Nothing invocable was found.
    Empty {
        /// Inaccessible instance methods skipped because the policy lets
        /// extension lookup look past them.
        inaccessible_instance: Candidates,
        /// Accessible extensions named `GetAwaiter` whose receiver does not
        /// accept the operand, in tier order.
        mismatched_extensions: SmallVec<[MemberId; INLINE_CANDIDATES]>,
    },
}

/// Collects `GetAwaiter` candidates for an operand type.
pub struct CandidateCollector<'a> {
    table: &'a SymbolTable,
    policy: PatternPolicy,
}

impl<'a> CandidateCollector<'a> {
    pub fn new(table: &'a SymbolTable, policy: PatternPolicy) -> Self {
        CandidateCollector { table, policy }
    }

    pub fn collect(&self, operand: TypeId, scope: &LookupScope) -> CandidateSet {
        let table = self.table;
        let name = table.names().get_awaiter;
        let lookup = table.lookup_members(operand, name);

        let mut inaccessible_instance = Candidates::new();
        if let Some(first) = lookup.first() {
            if !table.member(first).is_method() {
                debug!(member = first.0, "GetAwaiter is not invocable");
                return CandidateSet::NotInvocable(first);
            }
            let instance: Candidates = lookup
                .members
                .iter()
                .map(|&member| Candidate {
                    member,
                    origin: CandidateOrigin::Instance,
                    receiver: table.member(member).containing_type,
                    inferred: None,
                })
                .collect();
            let any_accessible = instance
                .iter()
                .any(|c| table.is_accessible(c.member, scope));
            if self.policy.inaccessible_instance_blocks_extensions || any_accessible {
                debug!(count = instance.len(), "instance GetAwaiter candidates");
                return CandidateSet::Instance(instance);
            }
            trace!("all instance GetAwaiter members inaccessible; trying extensions");
            inaccessible_instance = instance;
        }

        let mut mismatched_extensions = SmallVec::new();
        let mut skipped_tier = None;
        for (tier_index, tier) in table.scope_tiers(scope).enumerate() {
            let mut candidates = Candidates::new();
            for &container in &tier.containers {
                if !table.is_type_accessible(container, scope) {
                    continue;
                }
                for member in table.declared_members_named(container, name) {
                    let symbol = table.member(member);
                    if !symbol.is_extension() || !table.is_accessible(member, scope) {
                        continue;
                    }
                    match self.receiver_binding(member, operand) {
                        Some((receiver, inferred)) => candidates.push(Candidate {
                            member,
                            origin: CandidateOrigin::Extension {
                                container,
                                tier: tier_index,
                            },
                            receiver,
                            inferred,
                        }),
                        None => mismatched_extensions.push(member),
                    }
                }
            }
            trace!(tier = tier_index, found = candidates.len(), "extension tier");
            if !candidates.is_empty() {
                if self.policy.inapplicable_extension_tier_continues
                    && !candidates
                        .iter()
                        .any(|c| overload::applicability(table, c).is_applicable())
                {
                    trace!(tier = tier_index, "no applicable extension GetAwaiter; continuing outward");
                    skipped_tier.get_or_insert((tier_index, candidates));
                    continue;
                }
                debug!(tier = tier_index, count = candidates.len(), "extension GetAwaiter candidates");
                return CandidateSet::Extension {
                    tier: tier_index,
                    candidates,
                };
            }
        }

        // Nothing applicable anywhere: a receiver mismatch is the better
        // explanation; without one, report the first skipped tier.
        if mismatched_extensions.is_empty()
            && let Some((tier, candidates)) = skipped_tier
        {
            return CandidateSet::Extension { tier, candidates };
        }
        CandidateSet::Empty {
            inaccessible_instance,
            mismatched_extensions,
        }
    }

    /// Receiver type and inferred type argument if `member`'s `this`
    /// parameter accepts `operand`.
    fn receiver_binding(
        &self,
        member: MemberId,
        operand: TypeId,
    ) -> Option<(TypeId, Option<(TypeId, TypeId)>)> {
        let table = self.table;
        let sig = table.member(member).as_method()?;
        let receiver = sig.receiver()?;
        if sig.type_params.contains(&receiver.ty) {
            let satisfied = table
                .type_symbol(receiver.ty)
                .constraints
                .iter()
                .all(|&c| table.is_implicitly_convertible(operand, c));
            return satisfied.then_some((operand, Some((receiver.ty, operand))));
        }
        table
            .is_implicitly_convertible(operand, receiver.ty)
            .then_some((receiver.ty, None))
    }
}
