//! The schema dispatcher.
//!
//! [`resolve_type`] walks a schema node and returns how it is used at the
//! current site, registering every named model it meets in the session.

use super::context::{GenerationContext, GenerationSession};
use super::{FieldDecl, IrOptions, ModelKind, ModelRef, ModelShape, TypeExpr, TypeRef, VariantDecl};
use crate::codegen::naming::pascal_case;
use crate::diagnostic::GeneratorError;
use crate::schema::{DiscriminatorSchema, ObjectSchema, Schema, SchemaShape};

/// Resolves a schema node at the site described by `ctx`.
pub fn resolve_type(
    schema: &Schema,
    ctx: &GenerationContext,
    session: &mut GenerationSession<'_>,
) -> Result<TypeRef, GeneratorError> {
    let expr = match &schema.shape {
        SchemaShape::Scalar(scalar) => TypeExpr::Scalar(*scalar),
        SchemaShape::Object(object) => {
            TypeExpr::Model(resolve_object(schema, object, ctx, session)?)
        }
        SchemaShape::Enum(values) => TypeExpr::Model(resolve_enum(schema, values, ctx, session)?),
        SchemaShape::Array(inner) => {
            TypeExpr::List(Box::new(resolve_container_item(inner, &ctx.element(), session)?))
        }
        SchemaShape::Record(inner) => {
            TypeExpr::Map(Box::new(resolve_container_item(inner, &ctx.value(), session)?))
        }
        SchemaShape::Discriminator(union) => {
            TypeExpr::Model(resolve_union(schema, union, ctx, session)?)
        }
        SchemaShape::Ref(name) => return resolve_ref(name, schema, ctx, session),
        SchemaShape::Any => TypeExpr::Any,
    };

    Ok(TypeRef {
        expr,
        nullable: schema.nullable,
        optional: ctx.is_optional,
    })
}

/// Resolves the top-level definition `name`. Non-model definitions are
/// registered as aliases so they still get a declaration.
pub fn resolve_definition(
    name: &str,
    options: &IrOptions,
    session: &mut GenerationSession<'_>,
) -> Result<TypeRef, GeneratorError> {
    let schema = session
        .definition(name)
        .ok_or_else(|| GeneratorError::UnknownTypeReference {
            name: name.to_string(),
            schema_path: "/definitions".to_string(),
        })?;
    let ctx = GenerationContext::new(options).definition(name);

    if schema.is_model() {
        return resolve_type(schema, &ctx, session);
    }

    session.enter_alias(name)?;
    let resolved = resolve_type(schema, &ctx, session);
    session.leave_alias();
    let ty = resolved?;

    let type_name = ctx.type_name(&schema.metadata);
    session.register_alias(name, type_name, &schema.metadata, ty.clone());
    Ok(ty)
}

/// Elements and values already live behind a heap allocation, so they are
/// never boxed again.
fn resolve_container_item(
    schema: &Schema,
    ctx: &GenerationContext,
    session: &mut GenerationSession<'_>,
) -> Result<TypeRef, GeneratorError> {
    let mut item = resolve_type(schema, ctx, session)?;
    if let TypeExpr::Model(model) = &mut item.expr {
        model.boxed = false;
    }
    Ok(item)
}

fn resolve_object(
    schema: &Schema,
    object: &ObjectSchema,
    ctx: &GenerationContext,
    session: &mut GenerationSession<'_>,
) -> Result<ModelRef, GeneratorError> {
    let identity = ctx.identity(&schema.metadata);
    if let Some(id) = session.lookup(&identity) {
        return Ok(session.model_ref(id));
    }

    let name = ctx.type_name(&schema.metadata);
    let id = session.register(
        identity,
        name,
        ModelShape::Object,
        &schema.metadata,
        &ctx.instance_path,
    );

    session.begin(id);
    let fields = resolve_fields(object, ctx, None, session)?;
    session.finish(id, ModelKind::Object { fields });

    Ok(session.model_ref(id))
}

fn resolve_fields(
    object: &ObjectSchema,
    ctx: &GenerationContext,
    discriminator: Option<&str>,
    session: &mut GenerationSession<'_>,
) -> Result<Vec<FieldDecl>, GeneratorError> {
    let required = object.properties.iter().map(|entry| (entry, false));
    let optional = object.optional_properties.iter().map(|entry| (entry, true));

    let mut fields = Vec::with_capacity(object.properties.len() + object.optional_properties.len());
    for ((key, property), is_optional) in required.chain(optional) {
        if discriminator == Some(key.as_str()) {
            continue;
        }
        let child = ctx.property(key, is_optional);
        let mut ty = resolve_type(property, &child, session)?;
        break_required_cycle(&mut ty, &child.instance_path);
        fields.push(FieldDecl {
            key: key.clone(),
            ty,
            description: property.metadata.description.clone(),
            is_deprecated: property.metadata.is_deprecated,
            instance_path: child.instance_path,
        });
    }
    Ok(fields)
}

/// A boxed field points back at a model still under construction. When it
/// is also required and non-nullable no finite value exists, so it becomes
/// nullable and an absent value decodes to `None` instead of recursing.
fn break_required_cycle(ty: &mut TypeRef, instance_path: &str) {
    let Some(model) = ty.model() else {
        return;
    };
    if !model.boxed || ty.is_wrapped() {
        return;
    }
    tracing::warn!(
        field = instance_path,
        model = %model.name,
        "required field closes a reference cycle; it is generated as nullable"
    );
    ty.nullable = true;
}

fn resolve_enum(
    schema: &Schema,
    values: &[String],
    ctx: &GenerationContext,
    session: &mut GenerationSession<'_>,
) -> Result<ModelRef, GeneratorError> {
    let identity = ctx.identity(&schema.metadata);
    if let Some(id) = session.lookup(&identity) {
        return Ok(session.model_ref(id));
    }
    if values.is_empty() {
        return Err(GeneratorError::EmptyEnum {
            schema_path: ctx.schema_path.clone(),
        });
    }

    let name = ctx.type_name(&schema.metadata);
    let id = session.register(
        identity,
        name,
        ModelShape::Enum,
        &schema.metadata,
        &ctx.instance_path,
    );
    session.finish(
        id,
        ModelKind::Enum {
            values: values.to_vec(),
        },
    );
    Ok(session.model_ref(id))
}

fn resolve_union(
    schema: &Schema,
    union: &DiscriminatorSchema,
    ctx: &GenerationContext,
    session: &mut GenerationSession<'_>,
) -> Result<ModelRef, GeneratorError> {
    let identity = ctx.identity(&schema.metadata);
    if let Some(id) = session.lookup(&identity) {
        return Ok(session.model_ref(id));
    }
    if union.mapping.is_empty() {
        return Err(GeneratorError::EmptyUnion {
            schema_path: ctx.schema_path.clone(),
        });
    }

    let name = ctx.type_name(&schema.metadata);
    let id = session.register(
        identity,
        name,
        ModelShape::Union,
        &schema.metadata,
        &ctx.instance_path,
    );
    let union_name = session.model_ref(id).name;

    session.begin(id);
    let mut variants = Vec::with_capacity(union.mapping.len());
    for (tag, branch) in &union.mapping {
        let SchemaShape::Object(object) = &branch.shape else {
            return Err(GeneratorError::InvalidUnionVariant {
                tag: tag.clone(),
                schema_path: ctx.schema_path.clone(),
            });
        };
        let variant_ctx = ctx.variant(&union.discriminator, tag);
        let fields = resolve_fields(object, &variant_ctx, Some(&union.discriminator), session)?;
        variants.push(VariantDecl {
            tag: tag.clone(),
            name: format!("{}{}", union_name, pascal_case(tag)),
            fields,
            description: branch.metadata.description.clone(),
            is_deprecated: branch.metadata.is_deprecated,
        });
    }
    session.finish(
        id,
        ModelKind::Union {
            discriminator: union.discriminator.clone(),
            variants,
        },
    );

    Ok(session.model_ref(id))
}

/// References resolve the target definition in its own context, so a model
/// is named after the definition and not after the referring site. Non-model
/// targets are inlined.
fn resolve_ref(
    name: &str,
    site: &Schema,
    ctx: &GenerationContext,
    session: &mut GenerationSession<'_>,
) -> Result<TypeRef, GeneratorError> {
    let target = session
        .definition(name)
        .ok_or_else(|| GeneratorError::UnknownTypeReference {
            name: name.to_string(),
            schema_path: ctx.schema_path.clone(),
        })?;
    let target_ctx = ctx.definition(name);

    let mut ty = if target.is_model() {
        resolve_type(target, &target_ctx, session)?
    } else {
        session.enter_alias(name)?;
        let resolved = resolve_type(target, &target_ctx, session);
        session.leave_alias();
        resolved?
    };

    ty.nullable = site.nullable || target.nullable;
    ty.optional = ctx.is_optional;
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{build, ClientIr, ModelDecl};
    use crate::schema::{AppDefinition, ScalarType};
    use serde_json::json;

    fn build_ir(value: serde_json::Value) -> Result<ClientIr, GeneratorError> {
        let app = AppDefinition::from_value(value)?;
        build(&app, &IrOptions::default())
    }

    fn find<'a>(ir: &'a ClientIr, name: &str) -> &'a ModelDecl {
        ir.models
            .iter()
            .find(|m| m.name == name)
            .unwrap_or_else(|| panic!("model {name} not generated"))
    }

    fn fields(model: &ModelDecl) -> &[FieldDecl] {
        match &model.kind {
            ModelKind::Object { fields } => fields,
            other => panic!("expected object, got {other:?}"),
        }
    }

    #[test]
    fn test_shared_reference_generates_one_model() {
        let ir = build_ir(json!({
            "definitions": {
                "Address": { "properties": { "city": { "type": "string" } } },
                "User": {
                    "properties": {
                        "home": { "ref": "Address" },
                        "work": { "ref": "Address", "nullable": true }
                    }
                }
            }
        }))
        .unwrap();

        let names: Vec<&str> = ir.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Address", "User"]);

        let user = fields(find(&ir, "User"));
        assert_eq!(user[0].ty.model().unwrap().name, "Address");
        assert!(!user[0].ty.nullable);
        assert!(user[1].ty.nullable);
    }

    #[test]
    fn test_self_reference_is_boxed_once() {
        let ir = build_ir(json!({
            "definitions": {
                "Node": {
                    "properties": {
                        "value": { "type": "string" },
                        "children": { "elements": { "ref": "Node" } }
                    },
                    "optionalProperties": {
                        "parent": { "ref": "Node" }
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!(ir.models.len(), 1);
        let node = fields(find(&ir, "Node"));
        let TypeExpr::List(child) = &node[1].ty.expr else {
            panic!("expected list");
        };
        assert!(!child.model().unwrap().boxed);

        let parent = node[2].ty.model().unwrap();
        assert!(parent.boxed);
        assert!(node[2].ty.optional);
    }

    #[test]
    fn test_mutual_recursion_boxes_the_back_edge() {
        let ir = build_ir(json!({
            "definitions": {
                "A": { "properties": { "b": { "ref": "B" } } },
                "B": { "optionalProperties": { "a": { "ref": "A" } } }
            }
        }))
        .unwrap();

        assert!(!fields(find(&ir, "A"))[0].ty.model().unwrap().boxed);
        assert!(fields(find(&ir, "B"))[0].ty.model().unwrap().boxed);
    }

    #[test]
    fn test_required_cycle_back_edge_becomes_nullable() {
        let ir = build_ir(json!({
            "definitions": {
                "A": { "properties": { "b": { "ref": "B" } } },
                "B": { "properties": { "a": { "ref": "A" } } },
                "Chain": { "properties": { "next": { "ref": "Chain" } } }
            }
        }))
        .unwrap();

        let a = &fields(find(&ir, "A"))[0];
        assert!(!a.ty.model().unwrap().boxed);
        assert!(!a.ty.nullable);

        let b = &fields(find(&ir, "B"))[0];
        assert!(b.ty.model().unwrap().boxed);
        assert!(b.ty.nullable);
        assert!(!b.ty.optional);

        let next = &fields(find(&ir, "Chain"))[0];
        assert!(next.ty.model().unwrap().boxed);
        assert!(next.ty.writes_null());
    }

    #[test]
    fn test_inline_objects_are_named_by_path() {
        let ir = build_ir(json!({
            "definitions": {
                "User": {
                    "properties": {
                        "settings": {
                            "properties": { "theme": { "enum": ["LIGHT", "DARK"] } }
                        },
                        "tags": { "values": { "properties": { "label": { "type": "string" } } } }
                    }
                }
            }
        }))
        .unwrap();

        let names: Vec<&str> = ir.models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["User", "UserSettings", "UserSettingsTheme", "UserTagsValue"]
        );
    }

    #[test]
    fn test_union_variants_skip_discriminator_and_qualify_nested_names() {
        let ir = build_ir(json!({
            "definitions": {
                "Shape": {
                    "discriminator": "kind",
                    "mapping": {
                        "CIRCLE": {
                            "properties": {
                                "kind": { "type": "string" },
                                "center": { "properties": { "x": { "type": "float64" } } }
                            }
                        },
                        "SQUARE": { "properties": { "center": { "properties": { "y": { "type": "float64" } } } } }
                    }
                }
            }
        }))
        .unwrap();

        let shape = find(&ir, "Shape");
        let ModelKind::Union { discriminator, variants } = &shape.kind else {
            panic!("expected union");
        };
        assert_eq!(discriminator, "kind");
        assert_eq!(variants[0].name, "ShapeCircle");
        assert_eq!(variants[0].fields.len(), 1);
        assert_eq!(variants[0].fields[0].ty.model().unwrap().name, "ShapeCircleCenter");
        assert_eq!(variants[1].fields[0].ty.model().unwrap().name, "ShapeSquareCenter");
    }

    #[test]
    fn test_empty_union_is_rejected() {
        let err = build_ir(json!({
            "definitions": { "Empty": { "discriminator": "type", "mapping": {} } }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::EmptyUnion { schema_path } if schema_path == "/definitions/Empty"
        ));
    }

    #[test]
    fn test_non_object_variant_is_rejected() {
        let err = build_ir(json!({
            "definitions": {
                "Bad": { "discriminator": "type", "mapping": { "A": { "type": "string" } } }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidUnionVariant { tag, .. } if tag == "A"));
    }

    #[test]
    fn test_unknown_reference() {
        let err = build_ir(json!({
            "definitions": { "User": { "properties": { "friend": { "ref": "Missing" } } } }
        }))
        .unwrap_err();
        match err {
            GeneratorError::UnknownTypeReference { name, schema_path } => {
                assert_eq!(name, "Missing");
                assert_eq!(schema_path, "/definitions/User/properties/friend");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_alias_definitions_are_inlined_at_reference_sites() {
        let ir = build_ir(json!({
            "definitions": {
                "Names": { "elements": { "type": "string" } },
                "Team": { "properties": { "members": { "ref": "Names", "nullable": true } } }
            }
        }))
        .unwrap();

        let alias = find(&ir, "Names");
        assert_eq!(alias.shape, ModelShape::Alias);

        let team = fields(find(&ir, "Team"));
        let TypeExpr::List(item) = &team[0].ty.expr else {
            panic!("expected inlined list");
        };
        assert_eq!(item.expr, TypeExpr::Scalar(ScalarType::String));
        assert!(team[0].ty.nullable);
    }

    #[test]
    fn test_alias_cycle_is_rejected() {
        let err = build_ir(json!({
            "definitions": {
                "A": { "elements": { "ref": "B" } },
                "B": { "values": { "ref": "A" } }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, GeneratorError::RecursiveAlias { .. }));
    }

    #[test]
    fn test_alias_cycle_through_model_is_allowed() {
        let ir = build_ir(json!({
            "definitions": {
                "Users": { "elements": { "ref": "User" } },
                "User": { "properties": { "friends": { "ref": "Users" } } }
            }
        }))
        .unwrap();
        let user = fields(find(&ir, "User"));
        let TypeExpr::List(item) = &user[0].ty.expr else {
            panic!("expected list");
        };
        assert_eq!(item.model().unwrap().name, "User");
    }

    #[test]
    fn test_metadata_id_names_and_prefix() {
        let app = AppDefinition::from_value(json!({
            "definitions": {
                "user": {
                    "metadata": { "id": "Person", "description": "A person" },
                    "properties": { "id": { "type": "string" } }
                }
            }
        }))
        .unwrap();
        let options = IrOptions {
            type_prefix: "Api".to_string(),
            root_service: String::new(),
            ..IrOptions::default()
        };
        let ir = build(&app, &options).unwrap();
        assert_eq!(ir.models[0].name, "ApiPerson");
        assert_eq!(ir.models[0].description.as_deref(), Some("A person"));
    }
}
