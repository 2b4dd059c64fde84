//! Lowering of raw schema nodes into the closed [`Schema`] type.

use indexmap::IndexMap;

use super::node::{DiscriminatorSchema, Metadata, ObjectSchema, ScalarType, Schema, SchemaShape};
use super::raw::RawSchema;
use crate::diagnostic::GeneratorError;

/// Lowers a raw node. `schema_path` locates the node in the document and is
/// only used for diagnostics.
///
/// Shape tags are checked in a fixed order (scalar, object, enum, elements,
/// values, discriminator, ref) and anything else becomes [`SchemaShape::Any`].
/// The only hard failure is an unknown scalar tag.
pub fn lower_schema(raw: &RawSchema, schema_path: &str) -> Result<Schema, GeneratorError> {
    let shape = lower_shape(raw, schema_path)?;
    let metadata = raw
        .metadata
        .as_ref()
        .map(|m| Metadata {
            id: m.id.clone().filter(|id| !id.is_empty()),
            description: m.description.clone().filter(|d| !d.is_empty()),
            is_deprecated: m.is_deprecated.unwrap_or(false),
        })
        .unwrap_or_default();

    Ok(Schema {
        shape,
        nullable: raw.nullable.unwrap_or(false),
        metadata,
    })
}

fn lower_shape(raw: &RawSchema, schema_path: &str) -> Result<SchemaShape, GeneratorError> {
    if let Some(type_name) = &raw.type_name {
        return ScalarType::from_tag(type_name)
            .map(SchemaShape::Scalar)
            .ok_or_else(|| GeneratorError::UnknownScalarType {
                type_name: type_name.clone(),
                schema_path: schema_path.to_string(),
            });
    }

    if raw.properties.is_some() || raw.optional_properties.is_some() {
        let properties = lower_map(
            raw.properties.as_ref(),
            &format!("{}/properties", schema_path),
        )?;
        let optional_properties = lower_map(
            raw.optional_properties.as_ref(),
            &format!("{}/optionalProperties", schema_path),
        )?;
        return Ok(SchemaShape::Object(ObjectSchema {
            properties,
            optional_properties,
        }));
    }

    if let Some(values) = &raw.enum_values {
        return Ok(SchemaShape::Enum(values.clone()));
    }

    if let Some(elements) = &raw.elements {
        let inner = lower_schema(elements, &format!("{}/elements", schema_path))?;
        return Ok(SchemaShape::Array(Box::new(inner)));
    }

    if let Some(values) = &raw.values {
        let inner = lower_schema(values, &format!("{}/values", schema_path))?;
        return Ok(SchemaShape::Record(Box::new(inner)));
    }

    if let Some(discriminator) = &raw.discriminator {
        let mapping = lower_map(raw.mapping.as_ref(), &format!("{}/mapping", schema_path))?;
        return Ok(SchemaShape::Discriminator(DiscriminatorSchema {
            discriminator: discriminator.clone(),
            mapping,
        }));
    }

    if let Some(reference) = &raw.reference {
        return Ok(SchemaShape::Ref(reference.clone()));
    }

    Ok(SchemaShape::Any)
}

fn lower_map(
    raw: Option<&IndexMap<String, RawSchema>>,
    schema_path: &str,
) -> Result<IndexMap<String, Schema>, GeneratorError> {
    let mut lowered = IndexMap::new();
    if let Some(raw) = raw {
        for (key, node) in raw {
            let schema = lower_schema(node, &format!("{}/{}", schema_path, key))?;
            lowered.insert(key.clone(), schema);
        }
    }
    Ok(lowered)
}
