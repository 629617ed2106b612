//! Diagnostic types and message lookup for the await pattern resolver.
//!
//! Codes follow the numbering of the C# compiler's `CSxxxx` errors so that
//! diagnostics from this resolver line up with what users already search for.
//! Message templates live in `data.rs`.

use serde::Serialize;

mod data;
pub use data::{DIAGNOSTIC_MESSAGES, diagnostic_codes, diagnostic_messages};

use crate::span::SourceSpan;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

/// What went wrong, independent of the exact code used to report it.
///
/// Several kinds map onto more than one code (a missing `GetAwaiter` uses the
/// "no member or extension" wording, a missing `GetResult` the plain "no
/// member" one); the emitter picks the code, the kind stays stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    MissingMember,
    InaccessibleMember,
    WrongStaticness,
    WrongArity,
    AmbiguousCall,
    NotInvocable,
    DoesNotImplementCompletionInterface,
    BadAwaiterShape,
    ConditionalInterfaceMember,
    /// The only named extension candidates need a different receiver type.
    ReceiverMismatch,
    /// `IsCompleted` exists but has no getter.
    PropertyLacksGetter,
    /// `GetAwaiter` resolved but cannot serve the pattern (void return,
    /// default-filled or `params` arguments).
    UnsuitableGetAwaiter,
    /// The operand can never be awaited (null, method group, lambda, void).
    BadAwaitOperand,
    /// A type parameter's constraints depend on each other.
    CyclicConstraint,
}

impl DiagnosticKind {
    /// The code a diagnostic of this kind is reported with when the emitter has
    /// no reason to pick a more specific one.
    pub const fn default_code(self) -> u32 {
        use crate::diagnostics::diagnostic_codes as c;
        match self {
            Self::MissingMember => c::NO_SUCH_MEMBER,
            Self::InaccessibleMember => c::BAD_ACCESS,
            Self::WrongStaticness => c::OBJECT_PROHIBITED,
            Self::WrongArity => c::NO_CORRESPONDING_ARGUMENT,
            Self::AmbiguousCall => c::AMBIGUOUS_CALL,
            Self::NotInvocable => c::NON_INVOCABLE_MEMBER_CALLED,
            Self::DoesNotImplementCompletionInterface => c::DOES_NOT_IMPLEMENT_AWAIT_INTERFACE,
            Self::BadAwaiterShape => c::BAD_AWAITER_PATTERN,
            Self::ConditionalInterfaceMember => c::INTERFACE_IMPLEMENTED_BY_CONDITIONAL,
            Self::ReceiverMismatch => c::BAD_INSTANCE_ARG_TYPE,
            Self::PropertyLacksGetter => c::PROPERTY_LACKS_GET,
            Self::UnsuitableGetAwaiter => c::BAD_AWAIT_ARG,
            Self::BadAwaitOperand => c::BAD_AWAIT_ARG_INTRINSIC,
            Self::CyclicConstraint => c::CIRCULAR_CONSTRAINT,
        }
    }
}

/// A rendered diagnostic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a new error diagnostic. A missing span renders as an empty
    /// location.
    #[must_use]
    pub fn error(
        span: Option<&SourceSpan>,
        kind: DiagnosticKind,
        code: u32,
        message: String,
    ) -> Self {
        let (file, start, length) = match span {
            Some(span) => (span.file.to_string(), span.start, span.length),
            None => (String::new(), 0, 0),
        };
        Self {
            file,
            start,
            length,
            message_text: message,
            category: DiagnosticCategory::Error,
            code,
            kind,
        }
    }

    /// `CS0122`-style display code.
    pub fn display_code(&self) -> String {
        format!("CS{:04}", self.code)
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    // Single pass: substituted text is never scanned again.
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let placeholder = after.find('}').and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            Some((args.get(index)?, close))
        });
        match placeholder {
            Some((arg, close)) => {
                result.push_str(arg);
                rest = &after[close + 1..];
            }
            None => {
                result.push('{');
                rest = after;
            }
        }
    }
    result.push_str(rest);
    result
}

/// A diagnostic message definition with code, category, and message template.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: &'static str,
}

/// Look up a diagnostic message definition by code.
#[must_use]
pub fn get_diagnostic_message(code: u32) -> Option<&'static DiagnosticMessage> {
    DIAGNOSTIC_MESSAGES.iter().find(|m| m.code == code)
}

/// Get the message template for a diagnostic code.
///
/// Returns the template string with `{0}`, `{1}`, etc. placeholders.
#[must_use]
pub fn get_message_template(code: u32) -> Option<&'static str> {
    get_diagnostic_message(code).map(|m| m.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_message_replaces_repeated_placeholders() {
        let text = format_message(
            diagnostic_messages::NO_SUCH_MEMBER_OR_EXTENSION,
            &["A", "GetAwaiter"],
        );
        assert!(text.starts_with("'A' does not contain a definition for 'GetAwaiter'"));
        assert!(text.contains("extension method 'GetAwaiter' accepting a first argument of type 'A'"));
    }

    #[test]
    fn test_format_message_does_not_rescan_arguments() {
        assert_eq!(format_message("'{0}' and '{1}'", &["{1}", "B"]), "'{1}' and 'B'");
        assert_eq!(format_message("{0} {2}", &["A"]), "A {2}");
    }

    #[test]
    fn test_every_default_code_has_a_template() {
        let kinds = [
            DiagnosticKind::MissingMember,
            DiagnosticKind::InaccessibleMember,
            DiagnosticKind::WrongStaticness,
            DiagnosticKind::WrongArity,
            DiagnosticKind::AmbiguousCall,
            DiagnosticKind::NotInvocable,
            DiagnosticKind::DoesNotImplementCompletionInterface,
            DiagnosticKind::BadAwaiterShape,
            DiagnosticKind::ConditionalInterfaceMember,
            DiagnosticKind::ReceiverMismatch,
            DiagnosticKind::PropertyLacksGetter,
            DiagnosticKind::UnsuitableGetAwaiter,
            DiagnosticKind::BadAwaitOperand,
            DiagnosticKind::CyclicConstraint,
        ];
        for kind in kinds {
            assert!(
                get_message_template(kind.default_code()).is_some(),
                "missing template for {kind:?}"
            );
        }
    }

    #[test]
    fn test_rendered_diagnostic_serializes_kind() {
        let span = SourceSpan::new("test.cs", 10, 13);
        let diag = Diagnostic::error(
            Some(&span),
            DiagnosticKind::AmbiguousCall,
            diagnostic_codes::AMBIGUOUS_CALL,
            "ambiguous".to_string(),
        );
        let json = serde_json::to_value(&diag).expect("serializes");
        assert_eq!(json["kind"], "AmbiguousCall");
        assert_eq!(json["code"], 121);
        assert_eq!(diag.display_code(), "CS0121");
    }
}
