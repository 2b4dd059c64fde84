//! TypeScript model declarations.
//!
//! Every model becomes a type plus a `$$Name` helper object holding its
//! constructor and codecs, so the types stay plain interfaces.

use super::ident::{field_identifier, type_identifier};
use super::property::{js_string, TsProperty};
use crate::codegen::indent;
use crate::codegen::naming::IdentScope;
use crate::ir::{FieldDecl, ModelDecl, ModelKind, TypeRef, VariantDecl};

struct TsField<'a> {
    decl: &'a FieldDecl,
    ident: String,
}

fn assign_idents<'a>(fields: &'a [FieldDecl], reserved: Option<&str>) -> Vec<TsField<'a>> {
    let mut scope = IdentScope::new();
    if let Some(reserved) = reserved {
        scope.claim(reserved.to_string(), "");
    }
    fields
        .iter()
        .map(|decl| TsField {
            decl,
            ident: scope.claim(field_identifier(&decl.key), ""),
        })
        .collect()
}

/// Renders one model. Pending models render nothing.
pub fn render_model(model: &ModelDecl) -> String {
    match &model.kind {
        ModelKind::Pending => String::new(),
        ModelKind::Object { fields } => render_object(model, fields),
        ModelKind::Enum { values } => render_enum(model, values),
        ModelKind::Union {
            discriminator,
            variants,
        } => render_union(model, discriminator, variants),
        ModelKind::Alias(ty) => format!(
            "{}export type {} = {};\n",
            doc_comment(model.description.as_deref(), model.is_deprecated),
            type_identifier(&model.name),
            TsProperty::new(ty).type_name()
        ),
    }
}

pub fn doc_comment(description: Option<&str>, is_deprecated: bool) -> String {
    if description.is_none() && !is_deprecated {
        return String::new();
    }
    let mut output = String::from("/**\n");
    if let Some(description) = description {
        for line in description.lines() {
            if line.is_empty() {
                output.push_str(" *\n");
            } else {
                output.push_str(&format!(" * {}\n", line.replace("*/", "*\\/")));
            }
        }
    }
    if is_deprecated {
        output.push_str(" * @deprecated\n");
    }
    output.push_str(" */\n");
    output
}

fn field_declarations(fields: &[TsField<'_>]) -> String {
    let mut output = String::new();
    for field in fields {
        let property = TsProperty::new(&field.decl.ty);
        output.push_str(&indent::block(
            &doc_comment(field.decl.description.as_deref(), field.decl.is_deprecated),
            2,
        ));
        if field.decl.description.is_some() || field.decl.is_deprecated {
            output.push('\n');
        }
        output.push_str(&format!(
            "  {}{}: {};\n",
            field.ident,
            if property.is_optional() { "?" } else { "" },
            property.type_name()
        ));
    }
    output
}

fn field_defaults(fields: &[TsField<'_>]) -> Vec<String> {
    fields
        .iter()
        .filter_map(|field| {
            TsProperty::new(&field.decl.ty)
                .default_value()
                .map(|value| format!("{}: {},", field.ident, value))
        })
        .collect()
}

fn field_decoders(fields: &[TsField<'_>]) -> Vec<String> {
    fields
        .iter()
        .map(|field| {
            let input = format!("input[{}]", js_string(&field.decl.key));
            format!(
                "{}: {},",
                field.ident,
                TsProperty::new(&field.decl.ty).from_json(&input)
            )
        })
        .collect()
}

fn json_key(key: &str, comma: bool) -> String {
    let encoded = js_string(key);
    js_string(&if comma {
        format!(",{}:", encoded)
    } else {
        format!("{}:", encoded)
    })
}

/// Statements appending every field to `_json`. Mirrors the comma handling
/// of the Rust backend: a running flag is only needed when nothing is
/// guaranteed to be written first.
fn json_field_writers(fields: &[TsField<'_>], has_leading: bool) -> String {
    let has_required = fields.iter().any(|f| !f.decl.is_optional());
    let track_keys = !has_leading && !has_required;

    let mut stmts = Vec::new();
    if track_keys && !fields.is_empty() {
        stmts.push("let _hasKeys = false;".to_string());
    }

    let mut needs_comma = has_leading;
    for field in fields {
        let value = format!("input.{}", field.ident);
        if !field.decl.is_optional() {
            stmts.push(format!("_json += {};", json_key(&field.decl.key, needs_comma)));
            stmts.push(TsProperty::new(&field.decl.ty).to_json(&value, "_json"));
            needs_comma = true;
            continue;
        }

        let present = TypeRef {
            optional: false,
            nullable: false,
            ..field.decl.ty.clone()
        };
        let mut body = Vec::new();
        if track_keys {
            body.push("if (_hasKeys) {\n    _json += \",\";\n}".to_string());
        }
        body.push(format!("_json += {};", json_key(&field.decl.key, !track_keys)));
        body.push(TsProperty::new(&present).to_json(&value, "_json"));
        if track_keys {
            body.push("_hasKeys = true;".to_string());
        }
        stmts.push(format!(
            "if ({} !== undefined) {{\n{}\n}}",
            value,
            indent::block(&body.join("\n"), 4)
        ));
    }
    stmts.join("\n")
}

fn query_field_writers(fields: &[TsField<'_>]) -> Vec<String> {
    fields
        .iter()
        .map(|field| {
            TsProperty::new(&field.decl.ty).to_query_param(
                &format!("input.{}", field.ident),
                &field.decl.key,
                &field.decl.instance_path,
                "_queryParts",
            )
        })
        .collect()
}

fn object_literal(entries: &[String]) -> String {
    if entries.is_empty() {
        "{}".to_string()
    } else {
        format!("{{\n{}\n}}", indent::block(&entries.join("\n"), 4))
    }
}

fn method(signature: &str, body: &str) -> String {
    format!("{} {{\n{}\n}},", signature, indent::block(body, 4))
}

fn helper(name: &str, methods: &[String]) -> String {
    let body = methods
        .iter()
        .map(|m| indent::block(m, 2))
        .collect::<Vec<_>>()
        .join("\n");
    format!("export const $${} = {{\n{}\n}};\n", name, body)
}

fn from_json_string(name: &str) -> String {
    method(
        &format!("fromJsonString(input: string): {}", name),
        &format!(
            "try {{\n    return $${n}.fromJson(JSON.parse(input));\n}} catch {{\n    return $${n}.new();\n}}",
            n = name
        ),
    )
}

/// `toJsonString` and `toUrlQueryString` for a field list. A union variant
/// passes its tag, which is written before any field.
fn encoders(name: &str, fields: &[TsField<'_>], tag: Option<(&str, &str)>) -> Vec<String> {
    let mut json = vec!["let _json = \"{\";".to_string()];
    let mut query = vec!["const _queryParts: string[] = [];".to_string()];
    if let Some((discriminator, value)) = tag {
        json.push(format!(
            "_json += {};",
            js_string(&format!("{}:{}", js_string(discriminator), js_string(value)))
        ));
        query.push(format!(
            "_queryParts.push({});",
            js_string(&format!("{}={}", discriminator, value))
        ));
    }
    let writers = json_field_writers(fields, tag.is_some());
    if !writers.is_empty() {
        json.push(writers);
    }
    json.push("_json += \"}\";".to_string());
    json.push("return _json;".to_string());

    query.extend(query_field_writers(fields));
    query.push("return _queryParts.join(\"&\");".to_string());

    vec![
        method(&format!("toJsonString(input: {}): string", name), &json.join("\n")),
        method(&format!("toUrlQueryString(input: {}): string", name), &query.join("\n")),
    ]
}

fn render_object(model: &ModelDecl, fields: &[FieldDecl]) -> String {
    let name = type_identifier(&model.name);
    let fields = assign_idents(fields, None);

    let mut output = doc_comment(model.description.as_deref(), model.is_deprecated);
    output.push_str(&format!("export interface {} {{\n", name));
    output.push_str(&field_declarations(&fields));
    output.push_str("}\n\n");

    let mut methods = vec![
        method(
            &format!("new(): {}", name),
            &format!("return {};", object_literal(&field_defaults(&fields))),
        ),
        method(
            &format!("fromJson(input: unknown): {}", name),
            &format!(
                "if (!$$isObject(input)) {{\n    return $${}.new();\n}}\nreturn {};",
                name,
                object_literal(&field_decoders(&fields))
            ),
        ),
        from_json_string(&name),
    ];
    methods.extend(encoders(&name, &fields, None));
    output.push_str(&helper(&name, &methods));
    output
}

fn render_enum(model: &ModelDecl, values: &[String]) -> String {
    let name = type_identifier(&model.name);
    let literals: Vec<String> = values.iter().map(|v| js_string(v)).collect();

    let mut output = doc_comment(model.description.as_deref(), model.is_deprecated);
    output.push_str(&format!("export type {} = {};\n\n", name, literals.join(" | ")));

    let default = literals.first().cloned().unwrap_or_else(|| "\"\"".to_string());
    let methods = vec![
        format!("values: [{}] as const,", literals.join(", ")),
        method(&format!("new(): {}", name), &format!("return {};", default)),
        method(
            &format!("fromSerialValue(input: unknown): {}", name),
            &format!(
                "if (typeof input === \"string\" && ($${n}.values as readonly string[]).includes(input)) {{\n    return input as {n};\n}}\nreturn $${n}.new();",
                n = name
            ),
        ),
    ];
    output.push_str(&helper(&name, &methods));
    output
}

fn render_union(model: &ModelDecl, discriminator: &str, variants: &[VariantDecl]) -> String {
    let name = type_identifier(&model.name);
    let tag_access = format!("input[{}]", js_string(discriminator));
    let variant_names: Vec<String> = variants.iter().map(|v| type_identifier(&v.name)).collect();

    let mut output = doc_comment(model.description.as_deref(), model.is_deprecated);
    output.push_str(&format!("export type {} = {};\n\n", name, variant_names.join(" | ")));

    let default = variant_names
        .first()
        .map(|v| format!("return $${}.new();", v))
        .unwrap_or_else(|| "return {};".to_string());

    let mut decode = vec![format!(
        "if (!$$isObject(input)) {{\n    return $${}.new();\n}}",
        name
    )];
    let mut encode_json = Vec::new();
    let mut encode_query = Vec::new();
    for (variant, variant_name) in variants.iter().zip(&variant_names) {
        let tag = js_string(&variant.tag);
        decode.push(format!(
            "if ({} === {}) {{\n    return $${}.fromJson(input);\n}}",
            tag_access, tag, variant_name
        ));
        encode_json.push(format!(
            "case {}:\n    return $${}.toJsonString(input);",
            tag, variant_name
        ));
        encode_query.push(format!(
            "case {}:\n    return $${}.toUrlQueryString(input);",
            tag, variant_name
        ));
    }
    decode.push(format!("return $${}.new();", name));

    let input_tag = format!("input[{}]", js_string(discriminator));
    let methods = vec![
        method(&format!("new(): {}", name), &default),
        method(&format!("fromJson(input: unknown): {}", name), &decode.join("\n")),
        from_json_string(&name),
        method(
            &format!("toJsonString(input: {}): string", name),
            &format!(
                "switch ({}) {{\n{}\n}}\nreturn \"{{}}\";",
                input_tag,
                indent::block(&encode_json.join("\n"), 4)
            ),
        ),
        method(
            &format!("toUrlQueryString(input: {}): string", name),
            &format!(
                "switch ({}) {{\n{}\n}}\nreturn \"\";",
                input_tag,
                indent::block(&encode_query.join("\n"), 4)
            ),
        ),
    ];
    output.push_str(&helper(&name, &methods));

    for (variant, variant_name) in variants.iter().zip(&variant_names) {
        output.push('\n');
        output.push_str(&render_variant(variant, variant_name, discriminator));
    }
    output
}

fn render_variant(variant: &VariantDecl, name: &str, discriminator: &str) -> String {
    let disc_key = js_string(discriminator);
    let tag = js_string(&variant.tag);
    let fields = assign_idents(&variant.fields, Some(discriminator));

    let mut output = doc_comment(variant.description.as_deref(), variant.is_deprecated);
    output.push_str(&format!("export interface {} {{\n", name));
    output.push_str(&format!("  {}: {};\n", disc_key, tag));
    output.push_str(&field_declarations(&fields));
    output.push_str("}\n\n");

    let tag_entry = format!("{}: {},", disc_key, tag);
    let mut defaults = vec![tag_entry.clone()];
    defaults.extend(field_defaults(&fields));
    let mut decoded = vec![tag_entry];
    decoded.extend(field_decoders(&fields));

    let mut methods = vec![
        method(
            &format!("new(): {}", name),
            &format!("return {};", object_literal(&defaults)),
        ),
        method(
            &format!("fromJson(input: Record<string, any>): {}", name),
            &format!("return {};", object_literal(&decoded)),
        ),
    ];
    methods.extend(encoders(name, &fields, Some((discriminator, &variant.tag))));
    output.push_str(&helper(name, &methods));
    output
}
