//! Common types and utilities for the awt await pattern resolver.
//!
//! This crate provides foundational types used across all awt crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`SourceSpan`)
//! - Diagnostic codes, message templates and rendered diagnostics
//! - Cycle-safe recursion guards for symbol graph walks
//! - Resolver limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::SourceSpan;

// Diagnostics - codes, kinds and message templates
pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticKind, diagnostic_codes, format_message,
};

// Recursion guard for constraint and inheritance walks
pub mod recursion;
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};

// Centralized limits and thresholds
pub mod limits;
