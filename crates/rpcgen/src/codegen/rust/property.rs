//! Per-site Rust code for a resolved type.
//!
//! A [`RustProperty`] answers every question a model body asks about one of
//! its fields: the declared type, the zero value, and the snippets that
//! decode it from JSON, encode it to JSON and flatten it into a query string.

use super::ident::type_identifier;
use crate::codegen::indent;
use crate::ir::{ModelRef, ModelShape, TypeExpr, TypeRef};
use crate::schema::ScalarType;

/// Rust code generation for one use of a type.
pub struct RustProperty<'a> {
    ty: &'a TypeRef,
}

impl<'a> RustProperty<'a> {
    pub fn new(ty: &'a TypeRef) -> Self {
        Self { ty }
    }

    /// The declared type, including the `Option` wrapper.
    pub fn type_name(&self) -> String {
        let inner = inner_type_name(self.ty);
        if self.ty.is_wrapped() {
            format!("Option<{}>", inner)
        } else {
            inner
        }
    }

    /// The zero value.
    pub fn default_value(&self) -> String {
        if self.ty.is_wrapped() {
            return "None".to_string();
        }
        match &self.ty.expr {
            TypeExpr::Scalar(ScalarType::String) => "\"\".to_string()".to_string(),
            TypeExpr::Scalar(ScalarType::Boolean) => "false".to_string(),
            TypeExpr::Scalar(ScalarType::Timestamp) => {
                "DateTime::<FixedOffset>::default()".to_string()
            }
            TypeExpr::Scalar(ScalarType::Float32 | ScalarType::Float64) => "0.0".to_string(),
            TypeExpr::Scalar(_) => "0".to_string(),
            TypeExpr::Any => "serde_json::Value::Null".to_string(),
            TypeExpr::Model(model) => model_default(model),
            TypeExpr::List(_) => "Vec::new()".to_string(),
            TypeExpr::Map(_) => "BTreeMap::new()".to_string(),
        }
    }

    pub fn is_nullable(&self) -> bool {
        self.ty.is_wrapped()
    }

    /// An expression decoding `input`, an `Option<&serde_json::Value>`.
    /// Never fails: mismatches decode to the zero value, or `None` when
    /// wrapped.
    pub fn from_json(&self, input: &str) -> String {
        from_json_expr(self.ty, input, 0)
    }

    /// Statements appending the JSON encoding of `value`, a reference to the
    /// declared type, onto the `String` named `target`.
    pub fn to_json(&self, value: &str, target: &str) -> String {
        to_json_stmts(self.ty, value, target, 0)
    }

    /// Statements pushing `key=value` onto the `Vec<String>` named `target`.
    /// Types that do not flatten into a single pair log a warning at runtime
    /// and are skipped.
    pub fn to_query_param(
        &self,
        value: &str,
        key: &str,
        instance_path: &str,
        target: &str,
    ) -> String {
        if !self.ty.is_query_scalar() {
            return format!("warn_query_skip({:?});", instance_path);
        }

        let pattern = format!("{:?}", format!("{}={{}}", escape_format(key)));
        if !self.ty.is_wrapped() {
            return format!(
                "{}.push(format!({}, {}));",
                target,
                pattern,
                query_display(self.ty, value)
            );
        }

        let none_arm = if self.ty.writes_null() {
            format!("{}.push({:?}.to_string())", target, format!("{}=null", key))
        } else {
            "{}".to_string()
        };
        format!(
            "match {} {{\n    Some(_some_) => {}.push(format!({}, {})),\n    None => {},\n}}",
            value,
            target,
            pattern,
            query_display(self.ty, "_some_"),
            none_arm
        )
    }
}

/// Rust spelling of a scalar.
pub fn scalar_type_name(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::String => "String",
        ScalarType::Boolean => "bool",
        ScalarType::Timestamp => "DateTime<FixedOffset>",
        ScalarType::Float32 => "f32",
        ScalarType::Float64 => "f64",
        ScalarType::Int8 => "i8",
        ScalarType::Uint8 => "u8",
        ScalarType::Int16 => "i16",
        ScalarType::Uint16 => "u16",
        ScalarType::Int32 => "i32",
        ScalarType::Uint32 => "u32",
        ScalarType::Int64 => "i64",
        ScalarType::Uint64 => "u64",
    }
}

fn inner_type_name(ty: &TypeRef) -> String {
    match &ty.expr {
        TypeExpr::Scalar(scalar) => scalar_type_name(*scalar).to_string(),
        TypeExpr::Any => "serde_json::Value".to_string(),
        TypeExpr::Model(model) if model.boxed => format!("Box<{}>", type_identifier(&model.name)),
        TypeExpr::Model(model) => type_identifier(&model.name),
        TypeExpr::List(item) => format!("Vec<{}>", RustProperty::new(item).type_name()),
        TypeExpr::Map(item) => format!("BTreeMap<String, {}>", RustProperty::new(item).type_name()),
    }
}

fn model_default(model: &ModelRef) -> String {
    let name = type_identifier(&model.name);
    let value = match model.shape {
        ModelShape::Enum => format!("{}::default()", name),
        _ => format!("{}::new()", name),
    };
    if model.boxed {
        format!("Box::new({})", value)
    } else {
        value
    }
}

/// Parenthesizes a reference expression so a method call binds to all of it.
fn receiver(value: &str) -> String {
    if value.starts_with('&') {
        format!("({})", value)
    } else {
        value.to_string()
    }
}

fn escape_format(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

fn query_display(ty: &TypeRef, value: &str) -> String {
    match &ty.expr {
        TypeExpr::Scalar(ScalarType::Timestamp) => format!("format_date_time({})", value),
        TypeExpr::Model(_) => format!("{}.serial_value()", receiver(value)),
        _ => value.to_string(),
    }
}

fn from_json_expr(ty: &TypeRef, input: &str, depth: usize) -> String {
    let decoded = decode_expr(ty, input, depth);
    if ty.is_wrapped() {
        return decoded;
    }
    match &ty.expr {
        TypeExpr::Any => decoded,
        TypeExpr::Model(model) if model.shape != ModelShape::Enum => {
            format!("{}.unwrap_or_else(|| {})", decoded, model_default(model))
        }
        _ => format!("{}.unwrap_or_default()", decoded),
    }
}

/// An `Option<T>` expression: `Some` only when the JSON kind matches. `any`
/// is the exception and yields the raw value directly when not wrapped.
fn decode_expr(ty: &TypeRef, input: &str, depth: usize) -> String {
    match &ty.expr {
        TypeExpr::Scalar(scalar) => decode_scalar(*scalar, input),
        TypeExpr::Any => {
            if ty.is_wrapped() {
                format!("{}.filter(|v| !v.is_null()).cloned()", input)
            } else {
                format!("{}.cloned().unwrap_or(serde_json::Value::Null)", input)
            }
        }
        TypeExpr::Model(model) => {
            let name = type_identifier(&model.name);
            match model.shape {
                ModelShape::Enum => format!(
                    "{}.and_then(|v| v.as_str()).map(|v| {}::from_string(v.to_string()))",
                    input, name
                ),
                _ if model.boxed => format!(
                    "{}.filter(|v| v.is_object()).map(|v| Box::new({}::from_json(v)))",
                    input, name
                ),
                _ => format!("{}.filter(|v| v.is_object()).map(|v| {}::from_json(v))", input, name),
            }
        }
        TypeExpr::List(item) => {
            let array = format!("_arr_{}", depth);
            let list = format!("_list_{}", depth);
            let element = format!("_item_{}", depth);
            let item_expr = from_json_expr(item, &format!("Some({})", element), depth + 1);
            format!(
                "{input}.and_then(|v| v.as_array()).map(|{array}| {{\n    let mut {list} = Vec::new();\n    for {element} in {array} {{\n        {list}.push({item});\n    }}\n    {list}\n}})",
                input = input,
                array = array,
                list = list,
                element = element,
                item = indent::tail(&item_expr, 8),
            )
        }
        TypeExpr::Map(item) => {
            let object = format!("_obj_{}", depth);
            let map = format!("_map_{}", depth);
            let key = format!("_key_{}", depth);
            let value = format!("_value_{}", depth);
            let item_expr = from_json_expr(item, &format!("Some({})", value), depth + 1);
            format!(
                "{input}.and_then(|v| v.as_object()).map(|{object}| {{\n    let mut {map} = BTreeMap::new();\n    for ({key}, {value}) in {object} {{\n        {map}.insert({key}.to_owned(), {item});\n    }}\n    {map}\n}})",
                input = input,
                object = object,
                map = map,
                key = key,
                value = value,
                item = indent::tail(&item_expr, 8),
            )
        }
    }
}

fn decode_scalar(scalar: ScalarType, input: &str) -> String {
    match scalar {
        ScalarType::String => format!("{}.and_then(|v| v.as_str()).map(|v| v.to_string())", input),
        ScalarType::Boolean => format!("{}.and_then(|v| v.as_bool())", input),
        ScalarType::Timestamp => {
            format!("{}.and_then(|v| v.as_str()).and_then(parse_date_time)", input)
        }
        ScalarType::Float64 => format!("{}.and_then(|v| v.as_f64())", input),
        ScalarType::Float32 => format!("{}.and_then(|v| v.as_f64()).map(|v| v as f32)", input),
        ScalarType::Int8 | ScalarType::Int16 | ScalarType::Int32 => format!(
            "{}.and_then(|v| v.as_i64()).and_then(|v| {}::try_from(v).ok())",
            input,
            scalar_type_name(scalar)
        ),
        ScalarType::Uint8 | ScalarType::Uint16 | ScalarType::Uint32 => format!(
            "{}.and_then(|v| v.as_u64()).and_then(|v| {}::try_from(v).ok())",
            input,
            scalar_type_name(scalar)
        ),
        ScalarType::Int64 | ScalarType::Uint64 => format!(
            "{}.and_then(|v| v.as_str()).and_then(|v| v.parse::<{}>().ok())",
            input,
            scalar_type_name(scalar)
        ),
    }
}

fn to_json_stmts(ty: &TypeRef, value: &str, target: &str, depth: usize) -> String {
    if !ty.is_wrapped() {
        return inner_to_json(ty, value, target, depth);
    }
    let some = format!("_some_{}", depth);
    format!(
        "match {value} {{\n    Some({some}) => {{\n        {inner}\n    }}\n    None => {target}.push_str(\"null\"),\n}}",
        value = value,
        some = some,
        inner = indent::tail(&inner_to_json(ty, &some, target, depth + 1), 8),
        target = target,
    )
}

fn inner_to_json(ty: &TypeRef, value: &str, target: &str, depth: usize) -> String {
    match &ty.expr {
        TypeExpr::Scalar(ScalarType::String) => {
            format!("serialize_string(&mut {}, {});", target, value)
        }
        TypeExpr::Scalar(ScalarType::Timestamp) => {
            format!("serialize_date_time(&mut {}, {});", target, value)
        }
        TypeExpr::Scalar(scalar) if scalar.is_large_integer() => {
            format!("{}.push_str(&format!(\"\\\"{{}}\\\"\", {}));", target, value)
        }
        TypeExpr::Scalar(_) => format!("{}.push_str(&{}.to_string());", target, receiver(value)),
        TypeExpr::Any => format!(
            "{}.push_str(&serde_json::to_string({}).unwrap_or_else(|_| \"null\".to_string()));",
            target, value
        ),
        TypeExpr::Model(model) if model.shape == ModelShape::Enum => format!(
            "serialize_string(&mut {}, &{}.serial_value());",
            target,
            receiver(value)
        ),
        TypeExpr::Model(_) => {
            format!("{}.push_str(&{}.to_json_string());", target, receiver(value))
        }
        TypeExpr::List(item) => {
            let index = format!("_index_{}", depth);
            let element = format!("_item_{}", depth);
            format!(
                "{target}.push('[');\nfor ({index}, {element}) in {recv}.iter().enumerate() {{\n    if {index} != 0 {{\n        {target}.push(',');\n    }}\n    {item}\n}}\n{target}.push(']');",
                target = target,
                index = index,
                element = element,
                recv = receiver(value),
                item = indent::tail(&to_json_stmts(item, &element, target, depth + 1), 4),
            )
        }
        TypeExpr::Map(item) => {
            let index = format!("_index_{}", depth);
            let key = format!("_key_{}", depth);
            let entry = format!("_value_{}", depth);
            format!(
                "{target}.push('{{');\nfor ({index}, ({key}, {entry})) in {recv}.iter().enumerate() {{\n    if {index} != 0 {{\n        {target}.push(',');\n    }}\n    serialize_string(&mut {target}, {key});\n    {target}.push(':');\n    {item}\n}}\n{target}.push('}}');",
                target = target,
                index = index,
                key = key,
                entry = entry,
                recv = receiver(value),
                item = indent::tail(&to_json_stmts(item, &entry, target, depth + 1), 4),
            )
        }
    }
}
