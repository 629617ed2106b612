//! Resolver options and cooperative cancellation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where the "inapplicable, keep looking" / "applicable but unsuitable, stop
/// and report" boundary sits for `GetAwaiter` resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternPolicy {
    /// An instance `GetAwaiter` that exists but is inaccessible still blocks
    /// extension fallback and is reported as inaccessible. When `false`,
    /// inaccessible instance members are skipped and extensions are tried.
    pub inaccessible_instance_blocks_extensions: bool,
    /// Report a static instance-lookup `GetAwaiter` with the holistic
    /// "unsuitable GetAwaiter" error instead of the staticness error.
    pub static_get_awaiter_is_holistic: bool,
    /// An extension tier whose receiver-matching `GetAwaiter` methods all
    /// need arguments does not end lookup; outer tiers are tried next. When
    /// `false`, the first tier with any receiver match is final.
    pub inapplicable_extension_tier_continues: bool,
}

impl PatternPolicy {
    /// The default policy.
    pub const fn strict() -> Self {
        PatternPolicy {
            inaccessible_instance_blocks_extensions: true,
            static_get_awaiter_is_holistic: false,
            inapplicable_extension_tier_continues: false,
        }
    }

    /// Matches the reference C# compiler's observable behaviour for
    /// inaccessible, static and arity-inapplicable `GetAwaiter` members.
    pub const fn reference_compatible() -> Self {
        PatternPolicy {
            inaccessible_instance_blocks_extensions: false,
            static_get_awaiter_is_holistic: true,
            inapplicable_extension_tier_continues: true,
        }
    }
}

impl Default for PatternPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

/// Options for an [`crate::AwaitResolver`].
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub policy: PatternPolicy,
    /// Run declaration-site structural checks (conditional interface
    /// implementations, constraint cycles) on every awaiter type encountered.
    pub report_declaration_diagnostics: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            policy: PatternPolicy::strict(),
            report_declaration_diagnostics: true,
        }
    }
}

impl ResolverOptions {
    pub fn with_policy(mut self, policy: PatternPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// Shared cancellation flag, checked once before and once after each await
/// site.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
