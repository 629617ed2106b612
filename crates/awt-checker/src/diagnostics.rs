//! Lazily rendered diagnostics.
//!
//! Resolution produces [`PendingDiagnostic`]s holding structured arguments
//! (type and member ids, names) instead of strings. Messages are only
//! formatted when a host asks for a rendered [`Diagnostic`], so failures that
//! get discarded (a cancelled site, a suppressed cascade) never pay for
//! display-string construction.

use awt_binder::{MemberId, SymbolTable, TypeId};
use awt_common::diagnostics::get_message_template;
use awt_common::{Atom, Diagnostic, DiagnosticKind, SourceSpan, format_message};
use std::sync::Arc;

// =============================================================================
// Lazy Diagnostic Arguments
// =============================================================================

/// Argument for a diagnostic message template.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticArg {
    /// A type reference (formatted via `SymbolTable::display_type`)
    Type(TypeId),
    /// A member reference (formatted via `SymbolTable::display_member`)
    Member(MemberId),
    /// An interned string
    Atom(Atom),
    /// A plain string
    String(Arc<str>),
    /// A number
    Number(usize),
}

macro_rules! impl_from_diagnostic_arg {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(impl From<$source> for DiagnosticArg {
            fn from(v: $source) -> Self { Self::$variant(v) }
        })*
    };
}

impl_from_diagnostic_arg! {
    TypeId   => Type,
    MemberId => Member,
    Atom     => Atom,
    usize    => Number,
}

impl From<&str> for DiagnosticArg {
    fn from(s: &str) -> Self {
        Self::String(s.into())
    }
}

impl From<String> for DiagnosticArg {
    fn from(s: String) -> Self {
        Self::String(s.into())
    }
}

/// A diagnostic that hasn't been rendered yet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PendingDiagnostic {
    pub kind: DiagnosticKind,
    /// Diagnostic code (e.g., 121 for an ambiguous call)
    pub code: u32,
    /// Arguments for the message template
    pub args: Vec<DiagnosticArg>,
    /// Primary source location
    pub span: Option<SourceSpan>,
}

impl PendingDiagnostic {
    /// Create a diagnostic with the kind's default code.
    pub fn new(kind: DiagnosticKind, args: Vec<DiagnosticArg>) -> Self {
        Self::with_code(kind, kind.default_code(), args)
    }

    /// Create a diagnostic with an explicit code.
    pub fn with_code(kind: DiagnosticKind, code: u32, args: Vec<DiagnosticArg>) -> Self {
        Self {
            kind,
            code,
            args,
            span: None,
        }
    }

    /// Attach a source span, keeping an existing one.
    pub fn with_span(mut self, span: Option<&SourceSpan>) -> Self {
        if self.span.is_none() {
            self.span = span.cloned();
        }
        self
    }

    /// Render the message and location.
    pub fn render(&self, table: &SymbolTable) -> Diagnostic {
        let args: Vec<String> = self.args.iter().map(|a| render_arg(table, a)).collect();
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let message = match get_message_template(self.code) {
            Some(template) => format_message(template, &arg_refs),
            None => format!("error CS{:04}: {}", self.code, arg_refs.join(", ")),
        };
        Diagnostic::error(self.span.as_ref(), self.kind, self.code, message)
    }
}

fn render_arg(table: &SymbolTable, arg: &DiagnosticArg) -> String {
    match arg {
        DiagnosticArg::Type(ty) => table.display_type(*ty),
        DiagnosticArg::Member(member) => table.display_member(*member),
        DiagnosticArg::Atom(atom) => table.resolve_atom(*atom).to_string(),
        DiagnosticArg::String(s) => s.to_string(),
        DiagnosticArg::Number(n) => n.to_string(),
    }
}
