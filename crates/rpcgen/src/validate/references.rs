//! Every `ref` must name a definition.

use crate::diagnostic::GeneratorError;
use crate::schema::{AppDefinition, Schema, SchemaShape};

pub fn validate_references(app: &AppDefinition, errors: &mut Vec<GeneratorError>) {
    for (name, schema) in &app.definitions {
        check_schema(app, schema, &format!("/definitions/{}", name), errors);
    }
}

fn check_schema(
    app: &AppDefinition,
    schema: &Schema,
    path: &str,
    errors: &mut Vec<GeneratorError>,
) {
    match &schema.shape {
        SchemaShape::Ref(name) => {
            if !app.definitions.contains_key(name) {
                errors.push(GeneratorError::UnknownTypeReference {
                    name: name.clone(),
                    schema_path: path.to_string(),
                });
            }
        }
        SchemaShape::Object(object) => {
            for (key, property) in &object.properties {
                check_schema(app, property, &format!("{}/properties/{}", path, key), errors);
            }
            for (key, property) in &object.optional_properties {
                let path = format!("{}/optionalProperties/{}", path, key);
                check_schema(app, property, &path, errors);
            }
        }
        SchemaShape::Array(item) => check_schema(app, item, &format!("{}/elements", path), errors),
        SchemaShape::Record(item) => check_schema(app, item, &format!("{}/values", path), errors),
        SchemaShape::Discriminator(union) => {
            for (tag, variant) in &union.mapping {
                check_schema(app, variant, &format!("{}/mapping/{}", path, tag), errors);
            }
        }
        SchemaShape::Scalar(_) | SchemaShape::Enum(_) | SchemaShape::Any => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reports_nested_path() {
        let app = AppDefinition::from_value(json!({
            "definitions": {
                "Shape": {
                    "discriminator": "kind",
                    "mapping": {
                        "BOX": { "optionalProperties": { "inner": { "ref": "Content" } } }
                    }
                }
            }
        }))
        .unwrap();
        let mut errors = Vec::new();
        validate_references(&app, &mut errors);
        match errors.as_slice() {
            [GeneratorError::UnknownTypeReference { name, schema_path }] => {
                assert_eq!(name, "Content");
                assert_eq!(schema_path, "/definitions/Shape/mapping/BOX/optionalProperties/inner");
            }
            other => panic!("unexpected errors: {:?}", other),
        }
    }
}
