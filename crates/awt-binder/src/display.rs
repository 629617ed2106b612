//! Display strings for symbols, as they appear in diagnostics.
//!
//! Types print namespace-qualified (`System.Action`), except for the C#
//! keyword types (`object`, `bool`, `void`) and type parameters. Methods print
//! as `Type.Name<T>(P1, P2)`, where an extension method's receiver counts as
//! its first parameter. Other members print as `Type.Name`.

use std::fmt::Write;

use crate::SymbolTable;
use crate::symbols::{MemberId, MemberKind, NamespaceId, TypeId, TypeKind};

impl SymbolTable {
    pub fn display_type(&self, ty: TypeId) -> String {
        let wk = self.well_known();
        if ty == wk.object {
            return "object".to_string();
        }
        if ty == wk.boolean {
            return "bool".to_string();
        }
        if ty == wk.void {
            return "void".to_string();
        }
        let symbol = self.type_symbol(ty);
        let name = self.resolve_atom(symbol.name);
        if symbol.kind == TypeKind::TypeParameter {
            return name.to_string();
        }
        let prefix = match symbol.containing_type {
            Some(outer) => Some(self.display_type(outer)),
            None => self.display_namespace(symbol.namespace),
        };
        match prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        }
    }

    /// Dotted namespace path, or `None` for the global namespace.
    pub fn display_namespace(&self, namespace: NamespaceId) -> Option<String> {
        let mut parts = Vec::new();
        let mut current = Some(namespace);
        while let Some(id) = current {
            let ns = self.namespace(id);
            if ns.parent.is_some() {
                parts.push(self.resolve_atom(ns.name));
            }
            current = ns.parent;
        }
        if parts.is_empty() {
            return None;
        }
        parts.reverse();
        Some(parts.join("."))
    }

    pub fn display_member(&self, member: MemberId) -> String {
        let symbol = self.member(member);
        let mut out = self.display_type(symbol.containing_type);
        out.push('.');
        out.push_str(self.resolve_atom(symbol.name));
        if let MemberKind::Method(sig) = &symbol.kind {
            if !sig.type_params.is_empty() {
                let type_params: Vec<_> =
                    sig.type_params.iter().map(|&t| self.display_type(t)).collect();
                let _ = write!(out, "<{}>", type_params.join(", "));
            }
            let params: Vec<_> = sig.params.iter().map(|p| self.display_type(p.ty)).collect();
            let _ = write!(out, "({})", params.join(", "));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::{MethodDecl, PropertyDecl, SymbolTable, TypeDecl};

    #[test]
    fn test_keyword_and_qualified_types() {
        let table = SymbolTable::new();
        let wk = *table.well_known();
        assert_eq!(table.display_type(wk.object), "object");
        assert_eq!(table.display_type(wk.boolean), "bool");
        assert_eq!(table.display_type(wk.action), "System.Action");
        assert_eq!(
            table.display_type(wk.notify_completion),
            "System.Runtime.CompilerServices.INotifyCompletion"
        );
        assert_eq!(
            table.display_member(wk.on_completed),
            "System.Runtime.CompilerServices.INotifyCompletion.OnCompleted(System.Action)"
        );
    }

    #[test]
    fn test_extension_and_generic_methods() {
        let mut table = SymbolTable::new();
        let wk = *table.well_known();
        let b = table.declare_type(TypeDecl::class("B"));
        let ext = table.declare_type(TypeDecl::static_class("MyExtensions"));
        let t = table.declare_type(TypeDecl::type_parameter("T"));
        let generic = table.declare_method(
            ext,
            MethodDecl::new("GetAwaiter", wk.object).type_param(t).extension(b),
        );
        let with_default = table.declare_method(
            ext,
            MethodDecl::new("GetAwaiter", wk.object)
                .optional_param("o", wk.object)
                .extension(b),
        );
        assert_eq!(table.display_member(generic), "MyExtensions.GetAwaiter<T>(B)");
        assert_eq!(
            table.display_member(with_default),
            "MyExtensions.GetAwaiter(B, object)"
        );
    }

    #[test]
    fn test_properties_and_namespaced_types() {
        let mut table = SymbolTable::new();
        let wk = *table.well_known();
        let ns = table.declare_namespace_path("parent.child");
        let awaiter = table.declare_type(TypeDecl::class("Awaiter").in_namespace(ns));
        let prop = table.declare_property(awaiter, PropertyDecl::new("IsCompleted", wk.boolean));
        assert_eq!(table.display_member(prop), "parent.child.Awaiter.IsCompleted");
        assert_eq!(table.find_type("parent.child.Awaiter"), Some(awaiter));
    }
}
