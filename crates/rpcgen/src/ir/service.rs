//! Procedure tree.
//!
//! Procedures arrive flat, keyed by dotted name. They are unflattened into a
//! tree of services: every dotted segment but the last names a service, the
//! last names the procedure.

use super::context::{GenerationContext, GenerationSession};
use super::{IrOptions, ModelRef, ModelShape};
use super::resolve::resolve_type;
use crate::diagnostic::GeneratorError;
use crate::schema::{AppDefinition, HttpMethod, ProcedureDef, Schema};

/// A service: a container of procedures and nested services.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceDecl {
    /// Segment name; empty for the root.
    pub name: String,
    /// Segments from the root to this service.
    pub path: Vec<String>,
    pub procedures: Vec<ProcedureDecl>,
    pub services: Vec<ServiceDecl>,
}

/// A callable procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDecl {
    /// Last segment of the dotted name.
    pub name: String,
    /// Full dotted name.
    pub full_name: String,
    pub method: HttpMethod,
    pub path: String,
    pub params: Option<ModelRef>,
    pub response: Option<ModelRef>,
    pub transports: Vec<String>,
    pub is_event_stream: bool,
    pub description: Option<String>,
    pub is_deprecated: bool,
}

impl ServiceDecl {
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty() && self.services.is_empty()
    }

    /// Number of procedures in this service and below.
    pub fn procedure_count(&self) -> usize {
        self.procedures.len()
            + self
                .services
                .iter()
                .map(ServiceDecl::procedure_count)
                .sum::<usize>()
    }

    fn child_mut(&mut self, name: &str) -> &mut ServiceDecl {
        let index = match self.services.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                let mut path = self.path.clone();
                path.push(name.to_string());
                self.services.push(ServiceDecl {
                    name: name.to_string(),
                    path,
                    ..ServiceDecl::default()
                });
                self.services.len() - 1
            }
        };
        &mut self.services[index]
    }
}

/// Builds the service tree, resolving every params and response type.
pub fn build_service_tree(
    app: &AppDefinition,
    options: &IrOptions,
    session: &mut GenerationSession<'_>,
) -> Result<ServiceDecl, GeneratorError> {
    let ctx = GenerationContext::new(options);
    let mut root = ServiceDecl::default();

    for (full_name, def) in &app.procedures {
        if !def.path.starts_with('/') {
            return Err(GeneratorError::MalformedPath {
                procedure: full_name.clone(),
                path: def.path.clone(),
            });
        }

        let mut segments: Vec<&str> = full_name.split('.').filter(|s| !s.is_empty()).collect();
        let Some(leaf) = segments.pop() else {
            return Err(GeneratorError::MalformedPath {
                procedure: full_name.clone(),
                path: def.path.clone(),
            });
        };

        let procedure = build_procedure(full_name, leaf, def, &ctx, session)?;

        let mut service = &mut root;
        for segment in segments {
            if service.procedures.iter().any(|p| p.name == segment) {
                return Err(GeneratorError::DuplicateProcedure {
                    procedure: full_name.clone(),
                });
            }
            service = service.child_mut(segment);
        }
        if service.services.iter().any(|s| s.name == leaf)
            || service.procedures.iter().any(|p| p.name == leaf)
        {
            return Err(GeneratorError::DuplicateProcedure {
                procedure: full_name.clone(),
            });
        }
        service.procedures.push(procedure);
    }

    Ok(root)
}

fn build_procedure(
    full_name: &str,
    leaf: &str,
    def: &ProcedureDef,
    ctx: &GenerationContext,
    session: &mut GenerationSession<'_>,
) -> Result<ProcedureDecl, GeneratorError> {
    let params = match &def.params {
        Some(name) => Some(resolve_procedure_type(full_name, name, "params", ctx, session)?),
        None => None,
    };
    let response = match &def.response {
        Some(name) => Some(resolve_procedure_type(full_name, name, "response", ctx, session)?),
        None => None,
    };

    Ok(ProcedureDecl {
        name: leaf.to_string(),
        full_name: full_name.to_string(),
        method: def.method,
        path: def.path.clone(),
        params,
        response,
        transports: def.transports.clone(),
        is_event_stream: def.is_event_stream,
        description: def.description.clone(),
        is_deprecated: def.is_deprecated,
    })
}

fn resolve_procedure_type(
    procedure: &str,
    type_name: &str,
    role: &'static str,
    ctx: &GenerationContext,
    session: &mut GenerationSession<'_>,
) -> Result<ModelRef, GeneratorError> {
    let site = GenerationContext {
        schema_path: format!("/procedures/{}/{}", procedure, role),
        ..ctx.clone()
    };
    let resolved = resolve_type(&Schema::reference(type_name), &site, session)?;

    match resolved.model() {
        Some(model) if matches!(model.shape, ModelShape::Object | ModelShape::Union) => {
            let mut model = model.clone();
            model.boxed = false;
            Ok(model)
        }
        _ => Err(GeneratorError::InvalidProcedureType {
            procedure: procedure.to_string(),
            type_name: type_name.to_string(),
            role,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::build;
    use serde_json::json;

    fn app(value: serde_json::Value) -> AppDefinition {
        AppDefinition::from_value(value).unwrap()
    }

    #[test]
    fn test_unflattens_dotted_names() {
        let app = app(json!({
            "procedures": {
                "sayHello": { "path": "/say-hello", "method": "post", "params": "Greeting" },
                "users.getUser": { "path": "/users/get-user", "method": "get", "params": "Greeting", "response": "Greeting" },
                "users.settings.update": { "path": "/users/settings/update", "method": "post" },
                "users.list": { "path": "/users/list", "method": "get" }
            },
            "definitions": {
                "Greeting": { "properties": { "name": { "type": "string" } } }
            }
        }));
        let ir = build(&app, &IrOptions::default()).unwrap();

        assert_eq!(ir.root.procedures.len(), 1);
        assert_eq!(ir.root.procedures[0].name, "sayHello");
        assert_eq!(ir.root.services.len(), 1);

        let users = &ir.root.services[0];
        assert_eq!(users.path, vec!["users"]);
        let names: Vec<&str> = users.procedures.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["getUser", "list"]);
        assert_eq!(users.services[0].path, vec!["users", "settings"]);
        assert_eq!(ir.root.procedure_count(), 4);

        let get_user = &users.procedures[0];
        assert_eq!(get_user.full_name, "users.getUser");
        assert_eq!(get_user.params.as_ref().unwrap().name, "Greeting");
        assert_eq!(get_user.method, HttpMethod::Get);
    }

    #[test]
    fn test_malformed_path() {
        let app = app(json!({
            "procedures": { "ping": { "path": "ping", "method": "get" } }
        }));
        let err = build(&app, &IrOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::MalformedPath { procedure, .. } if procedure == "ping"
        ));
    }

    #[test]
    fn test_params_must_be_object_or_union() {
        let app = app(json!({
            "procedures": { "ping": { "path": "/ping", "method": "post", "params": "Name" } },
            "definitions": { "Name": { "type": "string" } }
        }));
        let err = build(&app, &IrOptions::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidProcedureType { role: "params", .. }));
    }

    #[test]
    fn test_unknown_response_type() {
        let app = app(json!({
            "procedures": { "ping": { "path": "/ping", "method": "post", "response": "Pong" } }
        }));
        let err = build(&app, &IrOptions::default()).unwrap_err();
        match err {
            GeneratorError::UnknownTypeReference { name, schema_path } => {
                assert_eq!(name, "Pong");
                assert_eq!(schema_path, "/procedures/ping/response");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_procedure_and_service_name_clash() {
        let app = app(json!({
            "procedures": {
                "users": { "path": "/users", "method": "get" },
                "users.get": { "path": "/users/get", "method": "get" }
            }
        }));
        let err = build(&app, &IrOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::DuplicateProcedure { procedure } if procedure == "users.get"
        ));
    }

    #[test]
    fn test_schema_only_definition_has_no_procedures() {
        let app = app(json!({
            "definitions": { "A": { "properties": { "x": { "type": "int32" } } } }
        }));
        let ir = build(&app, &IrOptions::default()).unwrap();
        assert!(!ir.has_procedures());
        assert_eq!(ir.models.len(), 1);
    }
}
