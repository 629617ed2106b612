//! JSON fixtures: a symbol table plus the await sites to resolve in it.
//!
//! ```json
//! {
//!   "namespaces": [{ "name": "App", "usings": ["Lib"] }],
//!   "types": [
//!     { "name": "A", "members": [{ "kind": "method", "name": "GetAwaiter", "returns": "Awaiter" }] }
//!   ],
//!   "awaits": [{ "operand": { "type": "A" }, "scope": { "namespace": "App" } }]
//! }
//! ```
//!
//! Type references are qualified display names (`System.Action`, `N.A`) or
//! the keywords `object`, `bool` and `void`. Types are declared in two
//! passes, so declaration order does not matter for references.

use std::path::Path;
use std::sync::Arc;

use awt_binder::{
    Accessibility, EventDecl, FieldDecl, LookupScope, MemberFlags, MethodDecl, NamespaceId,
    PropertyDecl, SymbolTable, TypeDecl, TypeFlags, TypeId,
};
use awt_checker::{AwaitOperand, AwaitSite, PatternPolicy};
use awt_common::SourceSpan;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture JSON")]
    Json(#[from] serde_json::Error),
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("unknown namespace '{0}'")]
    UnknownNamespace(String),
    #[error("type '{0}' is declared twice")]
    DuplicateType(String),
}

// =============================================================================
// Serialized model
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fixture {
    /// File name used for await site spans.
    pub file: Option<String>,
    pub policy: Option<PatternPolicy>,
    pub namespaces: Vec<NamespaceSpec>,
    pub types: Vec<TypeSpec>,
    pub awaits: Vec<AwaitSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceSpec {
    pub name: String,
    #[serde(default)]
    pub usings: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKindSpec {
    #[default]
    Class,
    StaticClass,
    Struct,
    Interface,
    TypeParameter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessibilitySpec {
    #[default]
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    Private,
}

impl From<AccessibilitySpec> for Accessibility {
    fn from(spec: AccessibilitySpec) -> Self {
        match spec {
            AccessibilitySpec::Public => Accessibility::Public,
            AccessibilitySpec::Internal => Accessibility::Internal,
            AccessibilitySpec::Protected => Accessibility::Protected,
            AccessibilitySpec::ProtectedInternal => Accessibility::ProtectedInternal,
            AccessibilitySpec::Private => Accessibility::Private,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    pub name: String,
    #[serde(default)]
    pub kind: TypeKindSpec,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub accessibility: AccessibilitySpec,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Ordered constraint list for type parameters.
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub members: Vec<MemberSpec>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKindSpec {
    #[default]
    Method,
    Property,
    Field,
    Event,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberSpec {
    pub name: String,
    #[serde(default)]
    pub kind: MemberKindSpec,
    /// Return type of a method, or the type of a property, field or event.
    #[serde(alias = "type")]
    pub returns: String,
    #[serde(default)]
    pub accessibility: AccessibilitySpec,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Receiver type of an extension method.
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub params: Vec<ParamSpec>,
    #[serde(default)]
    pub conditional: bool,
    /// Property accessors; defaults to getter only.
    #[serde(default = "default_true")]
    pub getter: bool,
    #[serde(default)]
    pub setter: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub params: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperandSpec {
    Type(String),
    Null,
    MethodGroup,
    Lambda,
    VoidCall,
    Error,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeSpec {
    pub namespace: Option<String>,
    /// Enclosing type; its namespace is used when `namespace` is absent.
    #[serde(rename = "type")]
    pub containing_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwaitSpec {
    pub operand: OperandSpec,
    #[serde(default)]
    pub scope: ScopeSpec,
    #[serde(default)]
    pub span: Option<SpanSpec>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpanSpec {
    pub start: u32,
    pub length: u32,
}

// =============================================================================
// Loading
// =============================================================================

/// A built fixture: the symbol table and the sites to resolve in it.
pub struct Program {
    pub table: SymbolTable,
    pub sites: Vec<AwaitSite>,
    pub policy: Option<PatternPolicy>,
}

impl Fixture {
    pub fn parse(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let json = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&json)
    }

    /// Build the symbol table and await sites. `default_file` names the
    /// spans when the fixture has no `file`.
    pub fn build(&self, default_file: &str) -> Result<Program, FixtureError> {
        let mut table = SymbolTable::new();

        for ns in &self.namespaces {
            table.declare_namespace_path(&ns.name);
        }
        for ns in &self.namespaces {
            let id = namespace(&table, &ns.name)?;
            for using in &ns.usings {
                let imported = namespace(&table, using)?;
                table.add_using(id, imported);
            }
        }

        // Pass 1: declare every type so references can point anywhere.
        let mut declared = Vec::with_capacity(self.types.len());
        for spec in &self.types {
            declared.push(declare_type(&mut table, spec)?);
        }

        // Pass 2: inheritance, constraints and members.
        for (spec, &ty) in self.types.iter().zip(&declared) {
            if let Some(base) = &spec.base {
                let base = resolve_type(&table, base)?;
                table.set_base_type(ty, base);
            }
            for interface in &spec.interfaces {
                let interface = resolve_type(&table, interface)?;
                table.add_interface(ty, interface);
            }
            for constraint in &spec.constraints {
                let constraint = resolve_type(&table, constraint)?;
                table.add_constraint(ty, constraint);
            }
            for member in &spec.members {
                declare_member(&mut table, ty, member)?;
            }
        }

        let file: Arc<str> = self.file.as_deref().unwrap_or(default_file).into();
        let sites = self
            .awaits
            .iter()
            .map(|spec| build_site(&table, spec, &file))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            types = table.type_count(),
            members = table.member_count(),
            sites = sites.len(),
            "fixture built"
        );

        Ok(Program {
            table,
            sites,
            policy: self.policy,
        })
    }
}

fn namespace(table: &SymbolTable, path: &str) -> Result<NamespaceId, FixtureError> {
    if path.is_empty() {
        return Ok(table.global_namespace());
    }
    table
        .find_namespace(path)
        .ok_or_else(|| FixtureError::UnknownNamespace(path.to_string()))
}

fn resolve_type(table: &SymbolTable, name: &str) -> Result<TypeId, FixtureError> {
    table
        .find_type(name)
        .ok_or_else(|| FixtureError::UnknownType(name.to_string()))
}

fn declare_type(table: &mut SymbolTable, spec: &TypeSpec) -> Result<TypeId, FixtureError> {
    let mut decl = match spec.kind {
        TypeKindSpec::Class => TypeDecl::class(&spec.name),
        TypeKindSpec::StaticClass => TypeDecl::class(&spec.name).flags(TypeFlags::STATIC),
        TypeKindSpec::Struct => TypeDecl::structure(&spec.name),
        TypeKindSpec::Interface => TypeDecl::interface(&spec.name),
        TypeKindSpec::TypeParameter => TypeDecl::type_parameter(&spec.name),
    };
    let qualified = match (&spec.namespace, spec.kind) {
        (Some(ns), kind) if kind != TypeKindSpec::TypeParameter && !ns.is_empty() => {
            decl = decl.in_namespace(namespace(table, ns)?);
            format!("{ns}.{}", spec.name)
        }
        _ => spec.name.clone(),
    };
    if table.find_type(&qualified).is_some() {
        return Err(FixtureError::DuplicateType(qualified));
    }
    Ok(table.declare_type(decl.accessibility(spec.accessibility.into())))
}

fn declare_member(
    table: &mut SymbolTable,
    owner: TypeId,
    spec: &MemberSpec,
) -> Result<(), FixtureError> {
    let ty = resolve_type(table, &spec.returns)?;
    let accessibility = spec.accessibility.into();
    match spec.kind {
        MemberKindSpec::Method => {
            let mut decl = MethodDecl::new(&spec.name, ty).accessibility(accessibility);
            for type_param in &spec.type_params {
                decl = decl.type_param(resolve_type(table, type_param)?);
            }
            for param in &spec.params {
                let param_ty = resolve_type(table, &param.ty)?;
                decl = if param.params {
                    decl.params_array(&param.name, param_ty)
                } else if param.optional {
                    decl.optional_param(&param.name, param_ty)
                } else {
                    decl.param(&param.name, param_ty)
                };
            }
            if let Some(receiver) = &spec.extension {
                decl = decl.extension(resolve_type(table, receiver)?);
            }
            if spec.is_static {
                decl = decl.static_();
            }
            if spec.conditional {
                decl = decl.flags(MemberFlags::CONDITIONAL);
            }
            table.declare_method(owner, decl);
        }
        MemberKindSpec::Property => {
            let mut decl = PropertyDecl::new(&spec.name, ty).accessibility(accessibility);
            decl = match (spec.getter, spec.setter) {
                (true, true) => decl.with_setter(),
                (true, false) => decl,
                (false, true) => decl.write_only(),
                (false, false) => decl.without_accessors(),
            };
            if spec.is_static {
                decl = decl.static_();
            }
            table.declare_property(owner, decl);
        }
        MemberKindSpec::Field => {
            let mut decl = FieldDecl::new(&spec.name, ty).accessibility(accessibility);
            if spec.is_static {
                decl = decl.static_();
            }
            table.declare_field(owner, decl);
        }
        MemberKindSpec::Event => {
            table.declare_member(owner, EventDecl::new(&spec.name, ty).accessibility(accessibility));
        }
    }
    Ok(())
}

fn build_site(
    table: &SymbolTable,
    spec: &AwaitSpec,
    file: &Arc<str>,
) -> Result<AwaitSite, FixtureError> {
    let operand = match &spec.operand {
        OperandSpec::Type(name) => AwaitOperand::Expression(resolve_type(table, name)?),
        OperandSpec::Null => AwaitOperand::Null,
        OperandSpec::MethodGroup => AwaitOperand::MethodGroup,
        OperandSpec::Lambda => AwaitOperand::Lambda,
        OperandSpec::VoidCall => AwaitOperand::VoidCall,
        OperandSpec::Error => AwaitOperand::Error,
    };
    let scope = match (&spec.scope.namespace, &spec.scope.containing_type) {
        (None, Some(ty)) => LookupScope::inside(table, resolve_type(table, ty)?),
        (ns, ty) => {
            let namespace = match ns {
                Some(ns) => namespace(table, ns)?,
                None => table.global_namespace(),
            };
            let containing_type = ty.as_deref().map(|t| resolve_type(table, t)).transpose()?;
            LookupScope::new(namespace, containing_type)
        }
    };
    let mut site = AwaitSite::new(operand, scope);
    if let Some(span) = spec.span {
        site = site.with_span(SourceSpan::new(Arc::clone(file), span.start, span.length));
    }
    Ok(site)
}
