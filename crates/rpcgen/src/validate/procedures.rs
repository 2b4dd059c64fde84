//! Procedure paths and the shapes of their params and responses.

use std::collections::HashSet;

use crate::diagnostic::GeneratorError;
use crate::schema::{AppDefinition, Schema, SchemaShape};

pub fn validate_procedures(app: &AppDefinition, errors: &mut Vec<GeneratorError>) {
    for (name, procedure) in &app.procedures {
        if !procedure.path.starts_with('/') {
            errors.push(GeneratorError::MalformedPath {
                procedure: name.clone(),
                path: procedure.path.clone(),
            });
        }
        let types = [("params", &procedure.params), ("response", &procedure.response)];
        for (role, type_name) in types {
            if let Some(type_name) = type_name {
                check_procedure_type(app, name, type_name, role, errors);
            }
        }
    }
}

fn check_procedure_type(
    app: &AppDefinition,
    procedure: &str,
    type_name: &str,
    role: &'static str,
    errors: &mut Vec<GeneratorError>,
) {
    match target_of(app, type_name) {
        Err(missing) => errors.push(GeneratorError::UnknownTypeReference {
            name: missing,
            schema_path: format!("/procedures/{}/{}", procedure, role),
        }),
        Ok(Some(schema))
            if matches!(
                schema.shape,
                SchemaShape::Object(_) | SchemaShape::Discriminator(_)
            ) => {}
        Ok(_) => errors.push(GeneratorError::InvalidProcedureType {
            procedure: procedure.to_string(),
            type_name: type_name.to_string(),
            role,
        }),
    }
}

/// Follows a chain of definitions that are plain references. Returns the
/// first missing name as an error, and `None` for a reference cycle.
fn target_of<'a>(app: &'a AppDefinition, name: &str) -> Result<Option<&'a Schema>, String> {
    let mut seen = HashSet::new();
    let mut current = name.to_string();
    loop {
        if !seen.insert(current.clone()) {
            return Ok(None);
        }
        let schema = app.definitions.get(&current).ok_or_else(|| current.clone())?;
        match &schema.shape {
            SchemaShape::Ref(next) => current = next.clone(),
            _ => return Ok(Some(schema)),
        }
    }
}
