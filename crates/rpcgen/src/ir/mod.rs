//! Language-agnostic intermediate representation of a generated client.
//!
//! The IR is built once from an [`AppDefinition`](crate::schema::AppDefinition)
//! by walking every definition and procedure, and is then handed to a
//! language printer. It answers "what code to generate"; the printers in
//! [`crate::codegen`] decide how that code is spelled.

mod context;
mod resolve;
mod service;

pub use context::{GenerationContext, GenerationSession};
pub use resolve::{resolve_definition, resolve_type};
pub use service::{build_service_tree, ProcedureDecl, ServiceDecl};

use crate::diagnostic::GeneratorError;
use crate::schema::{AppDefinition, ScalarType};

/// Index of a model in the session arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(pub usize);

/// How a resolved value is used at a particular site.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub expr: TypeExpr,
    /// The schema allows `null`.
    pub nullable: bool,
    /// The value sits in an optional-properties slot and may be absent.
    pub optional: bool,
}

/// The shape of a resolved type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Scalar(ScalarType),
    /// Untyped passthrough of raw JSON.
    Any,
    Model(ModelRef),
    List(Box<TypeRef>),
    Map(Box<TypeRef>),
}

/// A reference to a named model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRef {
    pub id: ModelId,
    pub name: String,
    pub shape: ModelShape,
    /// Stored behind a heap indirection to break a recursive definition.
    pub boxed: bool,
}

/// The category of a named model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelShape {
    Object,
    Enum,
    Union,
    Alias,
}

impl TypeRef {
    pub fn new(expr: TypeExpr) -> Self {
        Self {
            expr,
            nullable: false,
            optional: false,
        }
    }

    /// Whether the value needs an absent-value wrapper.
    ///
    /// Nullable and optional collapse into one wrapper. Raw JSON already has a
    /// `null`, so `any` is only wrapped when it may be absent.
    pub fn is_wrapped(&self) -> bool {
        match self.expr {
            TypeExpr::Any => self.optional,
            _ => self.nullable || self.optional,
        }
    }

    /// Whether `null` is written when the value is absent.
    ///
    /// Optional absence wins: an optional field is omitted instead.
    pub fn writes_null(&self) -> bool {
        self.nullable && !self.optional
    }

    pub fn model(&self) -> Option<&ModelRef> {
        match &self.expr {
            TypeExpr::Model(model) => Some(model),
            _ => None,
        }
    }

    /// Whether the value can be written as a single query-string pair.
    pub fn is_query_scalar(&self) -> bool {
        match &self.expr {
            TypeExpr::Scalar(_) => true,
            TypeExpr::Model(model) => model.shape == ModelShape::Enum,
            _ => false,
        }
    }
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDecl {
    pub id: ModelId,
    pub name: String,
    pub shape: ModelShape,
    pub description: Option<String>,
    pub is_deprecated: bool,
    /// Structural location the model was first derived from.
    pub instance_path: String,
    pub kind: ModelKind,
}

/// The body of a model. `Pending` only exists while the model is being built.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelKind {
    Pending,
    Object { fields: Vec<FieldDecl> },
    Enum { values: Vec<String> },
    Union {
        discriminator: String,
        variants: Vec<VariantDecl>,
    },
    Alias(TypeRef),
}

/// A property of an object or union variant.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// JSON key.
    pub key: String,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub is_deprecated: bool,
    pub instance_path: String,
}

/// One branch of a discriminated union.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantDecl {
    /// Discriminator value selecting this branch.
    pub tag: String,
    /// Type name of the branch (union name + tag).
    pub name: String,
    /// Required fields first, then optional ones.
    pub fields: Vec<FieldDecl>,
    pub description: Option<String>,
    pub is_deprecated: bool,
}

impl FieldDecl {
    pub fn is_optional(&self) -> bool {
        self.ty.optional
    }
}

/// Options that shape type and service names.
#[derive(Debug, Clone, Default)]
pub struct IrOptions {
    /// Prepended to every generated type name.
    pub type_prefix: String,
    /// Name of the outermost service.
    pub root_service: String,
    /// Names the backend already uses at the top level of the output.
    /// Models never take one of them.
    pub reserved_names: Vec<String>,
}

/// Everything a printer needs to emit one client document.
#[derive(Debug, Clone)]
pub struct ClientIr {
    /// Models in first-encountered order.
    pub models: Vec<ModelDecl>,
    pub root: ServiceDecl,
    pub client_version: Option<String>,
    pub options: IrOptions,
}

impl ClientIr {
    pub fn has_procedures(&self) -> bool {
        !self.root.is_empty()
    }

    pub fn model(&self, id: ModelId) -> Option<&ModelDecl> {
        self.models.get(id.0)
    }
}

/// Builds the IR for an application definition.
///
/// Definitions are walked in document order, then procedures; the walk
/// order is the order models appear in the output.
pub fn build(app: &AppDefinition, options: &IrOptions) -> Result<ClientIr, GeneratorError> {
    let mut session = GenerationSession::new(app);
    for name in &options.reserved_names {
        session.reserve(name);
    }

    for name in app.definitions.keys() {
        resolve_definition(name, options, &mut session)?;
    }

    let root = build_service_tree(app, options, &mut session)?;
    let models = session.into_models();

    tracing::debug!(
        models = models.len(),
        procedures = app.procedures.len(),
        "built client IR"
    );

    Ok(ClientIr {
        models,
        root,
        client_version: app.version().map(str::to_string),
        options: options.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapping_rules() {
        let mut ty = TypeRef::new(TypeExpr::Scalar(ScalarType::String));
        assert!(!ty.is_wrapped());

        ty.nullable = true;
        assert!(ty.is_wrapped());
        assert!(ty.writes_null());

        ty.optional = true;
        assert!(ty.is_wrapped());
        assert!(!ty.writes_null());
    }

    #[test]
    fn test_any_is_wrapped_only_when_optional() {
        let mut ty = TypeRef::new(TypeExpr::Any);
        ty.nullable = true;
        assert!(!ty.is_wrapped());
        ty.optional = true;
        assert!(ty.is_wrapped());
    }
}
