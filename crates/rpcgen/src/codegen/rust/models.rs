//! Rust model declarations: structs, enums, tagged unions and aliases.

use super::ident::{field_identifier, type_identifier};
use super::property::RustProperty;
use crate::codegen::indent;
use crate::codegen::naming::IdentScope;
use crate::ir::{FieldDecl, ModelDecl, ModelKind, TypeRef, VariantDecl};

/// A field with its Rust identifier assigned.
struct RustField<'a> {
    decl: &'a FieldDecl,
    ident: String,
}

fn assign_idents(fields: &[FieldDecl]) -> Vec<RustField<'_>> {
    let mut scope = IdentScope::new();
    fields
        .iter()
        .map(|decl| RustField {
            decl,
            ident: scope.claim(field_identifier(&decl.key), "_"),
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
        ModelKind::Alias(ty) => render_alias(model, ty),
    }
}

pub fn doc_comment(description: Option<&str>, is_deprecated: bool) -> String {
    let mut output = String::new();
    if let Some(description) = description {
        for line in description.lines() {
            if line.is_empty() {
                output.push_str("///\n");
            } else {
                output.push_str(&format!("/// {}\n", line));
            }
        }
    }
    if is_deprecated {
        output.push_str("#[deprecated]\n");
    }
    output
}

/// A Rust string literal holding `text`.
fn literal(text: &str) -> String {
    format!("{:?}", text)
}

/// A JSON-encoded key followed by `:`, optionally comma-prefixed.
fn json_key(key: &str, comma: bool) -> String {
    let encoded = serde_json::Value::String(key.to_string()).to_string();
    if comma {
        format!(",{}:", encoded)
    } else {
        format!("{}:", encoded)
    }
}

fn field_declarations(fields: &[RustField<'_>], visibility: &str) -> String {
    let mut output = String::new();
    for field in fields {
        output.push_str(&indent::block(
            &doc_comment(field.decl.description.as_deref(), field.decl.is_deprecated),
            4,
        ));
        if field.decl.description.is_some() || field.decl.is_deprecated {
            output.push('\n');
        }
        output.push_str(&format!(
            "    {}{}: {},\n",
            visibility,
            field.ident,
            RustProperty::new(&field.decl.ty).type_name()
        ));
    }
    output
}

fn field_defaults(fields: &[RustField<'_>]) -> String {
    fields
        .iter()
        .map(|field| {
            format!(
                "{}: {},",
                field.ident,
                RustProperty::new(&field.decl.ty).default_value()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `let` bindings decoding every field out of `_val_`.
fn field_decoders(fields: &[RustField<'_>]) -> String {
    fields
        .iter()
        .map(|field| {
            let input = format!("_val_.get({})", literal(&field.decl.key));
            format!(
                "let {} = {};",
                field.ident,
                RustProperty::new(&field.decl.ty).from_json(&input)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn field_list(fields: &[RustField<'_>]) -> String {
    fields
        .iter()
        .map(|field| field.ident.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Statements appending every field to `_json_output_`.
///
/// `has_leading` is set when something (a union tag) was already written, so
/// every field needs a comma. Otherwise the first required field goes
/// without one; when there are no required fields a running flag tracks
/// whether any optional field was written.
fn json_field_writers(
    fields: &[RustField<'_>],
    has_leading: bool,
    value_of: impl Fn(&RustField<'_>) -> String,
) -> String {
    let has_required = fields.iter().any(|f| !f.decl.is_optional());
    let track_keys = !has_leading && !has_required;

    let mut stmts = Vec::new();
    if track_keys && !fields.is_empty() {
        stmts.push("let mut _has_keys_ = false;".to_string());
    }

    let mut needs_comma = has_leading;
    for field in fields {
        let value = value_of(field);
        if !field.decl.is_optional() {
            stmts.push(format!(
                "_json_output_.push_str({});",
                literal(&json_key(&field.decl.key, needs_comma))
            ));
            stmts.push(RustProperty::new(&field.decl.ty).to_json(&value, "_json_output_"));
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
            body.push("if _has_keys_ {\n    _json_output_.push(',');\n}".to_string());
            body.push(format!(
                "_json_output_.push_str({});",
                literal(&json_key(&field.decl.key, false))
            ));
        } else {
            body.push(format!(
                "_json_output_.push_str({});",
                literal(&json_key(&field.decl.key, true))
            ));
        }
        body.push(RustProperty::new(&present).to_json("_opt_", "_json_output_"));
        if track_keys {
            body.push("_has_keys_ = true;".to_string());
        }
        stmts.push(format!(
            "if let Some(_opt_) = {} {{\n{}\n}}",
            value,
            indent::block(&body.join("\n"), 4)
        ));
    }
    stmts.join("\n")
}

fn query_field_writers(
    fields: &[RustField<'_>],
    value_of: impl Fn(&RustField<'_>) -> String,
) -> String {
    fields
        .iter()
        .map(|field| {
            RustProperty::new(&field.decl.ty).to_query_param(
                &value_of(field),
                &field.decl.key,
                &field.decl.instance_path,
                "_query_parts_",
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_object(model: &ModelDecl, fields: &[FieldDecl]) -> String {
    let name = type_identifier(&model.name);
    let fields = assign_idents(fields);
    let self_value = |field: &RustField<'_>| format!("&self.{}", field.ident);

    let mut output = doc_comment(model.description.as_deref(), model.is_deprecated);
    output.push_str("#[derive(Clone, Debug, PartialEq)]\n");
    output.push_str(&format!("pub struct {} {{\n", name));
    output.push_str(&field_declarations(&fields, "pub "));
    output.push_str("}\n\n");

    output.push_str(&format!("impl RpcModel for {} {{\n", name));

    output.push_str("    fn new() -> Self {\n");
    output.push_str("        Self {\n");
    output.push_str(&indent::block(&field_defaults(&fields), 12));
    if !fields.is_empty() {
        output.push('\n');
    }
    output.push_str("        }\n");
    output.push_str("    }\n\n");

    output.push_str("    fn from_json(input: &serde_json::Value) -> Self {\n");
    output.push_str("        match input {\n");
    output.push_str("            serde_json::Value::Object(_val_) => {\n");
    if !fields.is_empty() {
        output.push_str(&indent::block(&field_decoders(&fields), 16));
        output.push('\n');
    }
    output.push_str(&format!("                Self {{ {} }}\n", field_list(&fields)));
    output.push_str("            }\n");
    output.push_str("            _ => Self::new(),\n");
    output.push_str("        }\n");
    output.push_str("    }\n\n");

    output.push_str("    fn to_json_string(&self) -> String {\n");
    output.push_str("        let mut _json_output_ = \"{\".to_string();\n");
    let writers = json_field_writers(&fields, false, self_value);
    if !writers.is_empty() {
        output.push_str(&indent::block(&writers, 8));
        output.push('\n');
    }
    output.push_str("        _json_output_.push('}');\n");
    output.push_str("        _json_output_\n");
    output.push_str("    }\n\n");

    output.push_str("    fn to_query_params_string(&self) -> String {\n");
    output.push_str("        let mut _query_parts_: Vec<String> = Vec::new();\n");
    let writers = query_field_writers(&fields, self_value);
    if !writers.is_empty() {
        output.push_str(&indent::block(&writers, 8));
        output.push('\n');
    }
    output.push_str("        _query_parts_.join(\"&\")\n");
    output.push_str("    }\n");
    output.push_str("}\n");
    output
}

fn render_enum(model: &ModelDecl, values: &[String]) -> String {
    let name = type_identifier(&model.name);
    let mut scope = IdentScope::new();
    let variants: Vec<(String, &String)> = values
        .iter()
        .map(|value| (scope.claim(type_identifier(value), ""), value))
        .collect();

    let mut output = doc_comment(model.description.as_deref(), model.is_deprecated);
    output.push_str("#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]\n");
    output.push_str(&format!("pub enum {} {{\n", name));
    for (index, (ident, _)) in variants.iter().enumerate() {
        if index == 0 {
            output.push_str("    #[default]\n");
        }
        output.push_str(&format!("    {},\n", ident));
    }
    output.push_str("}\n\n");

    output.push_str(&format!("impl RpcEnum for {} {{\n", name));
    output.push_str("    fn from_string(input: String) -> Self {\n");
    output.push_str("        match input.as_str() {\n");
    for (ident, value) in &variants {
        output.push_str(&format!("            {} => Self::{},\n", literal(value), ident));
    }
    output.push_str("            _ => Self::default(),\n");
    output.push_str("        }\n");
    output.push_str("    }\n\n");
    output.push_str("    fn serial_value(&self) -> String {\n");
    output.push_str("        match self {\n");
    for (ident, value) in &variants {
        output.push_str(&format!(
            "            Self::{} => {}.to_string(),\n",
            ident,
            literal(value)
        ));
    }
    output.push_str("        }\n");
    output.push_str("    }\n");
    output.push_str("}\n");
    output
}

struct RustVariant<'a> {
    decl: &'a VariantDecl,
    ident: String,
    fields: Vec<RustField<'a>>,
}

impl RustVariant<'_> {
    fn pattern(&self) -> String {
        if self.fields.is_empty() {
            format!("Self::{} {{}}", self.ident)
        } else {
            format!("Self::{} {{ {} }}", self.ident, field_list(&self.fields))
        }
    }
}

fn render_union(model: &ModelDecl, discriminator: &str, variants: &[VariantDecl]) -> String {
    let name = type_identifier(&model.name);
    let mut scope = IdentScope::new();
    let variants: Vec<RustVariant<'_>> = variants
        .iter()
        .map(|decl| RustVariant {
            decl,
            ident: scope.claim(type_identifier(&decl.tag), ""),
            fields: assign_idents(&decl.fields),
        })
        .collect();
    let binding = |field: &RustField<'_>| field.ident.clone();

    let mut output = doc_comment(model.description.as_deref(), model.is_deprecated);
    output.push_str("#[derive(Clone, Debug, PartialEq)]\n");
    output.push_str(&format!("pub enum {} {{\n", name));
    for variant in &variants {
        output.push_str(&indent::block(
            &doc_comment(variant.decl.description.as_deref(), variant.decl.is_deprecated),
            4,
        ));
        if variant.decl.description.is_some() || variant.decl.is_deprecated {
            output.push('\n');
        }
        if variant.fields.is_empty() {
            output.push_str(&format!("    {} {{}},\n", variant.ident));
        } else {
            output.push_str(&format!("    {} {{\n", variant.ident));
            output.push_str(&indent::block(&field_declarations(&variant.fields, ""), 4));
            output.push_str("\n    },\n");
        }
    }
    output.push_str("}\n\n");

    output.push_str(&format!("impl RpcModel for {} {{\n", name));

    output.push_str("    fn new() -> Self {\n");
    if let Some(first) = variants.first() {
        if first.fields.is_empty() {
            output.push_str(&format!("        Self::{} {{}}\n", first.ident));
        } else {
            output.push_str(&format!("        Self::{} {{\n", first.ident));
            output.push_str(&indent::block(&field_defaults(&first.fields), 12));
            output.push_str("\n        }\n");
        }
    }
    output.push_str("    }\n\n");

    output.push_str("    fn from_json(input: &serde_json::Value) -> Self {\n");
    output.push_str("        match input {\n");
    output.push_str("            serde_json::Value::Object(_val_) => {\n");
    output.push_str(&format!(
        "                let _tag_ = _val_.get({}).and_then(|v| v.as_str()).unwrap_or(\"\");\n",
        literal(discriminator)
    ));
    output.push_str("                match _tag_ {\n");
    for variant in &variants {
        output.push_str(&format!("                    {} => {{\n", literal(&variant.decl.tag)));
        if !variant.fields.is_empty() {
            output.push_str(&indent::block(&field_decoders(&variant.fields), 24));
            output.push('\n');
        }
        output.push_str(&format!("                        {}\n", variant.pattern()));
        output.push_str("                    }\n");
    }
    output.push_str("                    _ => Self::new(),\n");
    output.push_str("                }\n");
    output.push_str("            }\n");
    output.push_str("            _ => Self::new(),\n");
    output.push_str("        }\n");
    output.push_str("    }\n\n");

    output.push_str("    fn to_json_string(&self) -> String {\n");
    output.push_str("        match self {\n");
    for variant in &variants {
        let tag = format!(
            "{}{}",
            json_key(discriminator, false),
            serde_json::Value::String(variant.decl.tag.clone())
        );
        let mut body = vec![
            "let mut _json_output_ = \"{\".to_string();".to_string(),
            format!("_json_output_.push_str({});", literal(&tag)),
        ];
        let writers = json_field_writers(&variant.fields, true, binding);
        if !writers.is_empty() {
            body.push(writers);
        }
        body.push("_json_output_.push('}');".to_string());
        body.push("_json_output_".to_string());
        output.push_str(&format!("            {} => {{\n", variant.pattern()));
        output.push_str(&indent::block(&body.join("\n"), 16));
        output.push_str("\n            }\n");
    }
    output.push_str("        }\n");
    output.push_str("    }\n\n");

    output.push_str("    fn to_query_params_string(&self) -> String {\n");
    output.push_str("        match self {\n");
    for variant in &variants {
        let mut body = vec![
            "let mut _query_parts_: Vec<String> = Vec::new();".to_string(),
            format!(
                "_query_parts_.push({}.to_string());",
                literal(&format!("{}={}", discriminator, variant.decl.tag))
            ),
        ];
        let writers = query_field_writers(&variant.fields, binding);
        if !writers.is_empty() {
            body.push(writers);
        }
        body.push("_query_parts_.join(\"&\")".to_string());
        output.push_str(&format!("            {} => {{\n", variant.pattern()));
        output.push_str(&indent::block(&body.join("\n"), 16));
        output.push_str("\n            }\n");
    }
    output.push_str("        }\n");
    output.push_str("    }\n");
    output.push_str("}\n");
    output
}

fn render_alias(model: &ModelDecl, ty: &TypeRef) -> String {
    let mut output = doc_comment(model.description.as_deref(), false);
    output.push_str(&format!(
        "pub type {} = {};\n",
        type_identifier(&model.name),
        RustProperty::new(ty).type_name()
    ));
    output
}
