//! Per-site TypeScript code for a resolved type.

use super::ident::type_identifier;
use crate::ir::{ModelShape, TypeExpr, TypeRef};
use crate::schema::ScalarType;

/// TypeScript code generation for one use of a type.
///
/// Optional values are `undefined` when absent. Nullable values that must be
/// present are `null`.
pub struct TsProperty<'a> {
    ty: &'a TypeRef,
}

impl<'a> TsProperty<'a> {
    pub fn new(ty: &'a TypeRef) -> Self {
        Self { ty }
    }

    /// Whether the property is declared with `?`.
    pub fn is_optional(&self) -> bool {
        self.ty.optional
    }

    /// The declared type. Optional properties carry their absence in the `?`
    /// marker rather than the type.
    pub fn type_name(&self) -> String {
        let inner = inner_type_name(self.ty);
        if self.ty.writes_null() && !matches!(self.ty.expr, TypeExpr::Any) {
            format!("{} | null", inner)
        } else {
            inner
        }
    }

    /// The value placed in `new()`, or `None` when the property is left out.
    pub fn default_value(&self) -> Option<String> {
        if self.ty.optional {
            None
        } else if self.ty.is_wrapped() {
            Some("null".to_string())
        } else {
            Some(zero_value(self.ty))
        }
    }

    /// An expression decoding `input`, any JSON value or `undefined`.
    pub fn from_json(&self, input: &str) -> String {
        from_json_expr(self.ty, input, 0)
    }

    /// Statements appending the JSON encoding of `value` onto the string
    /// variable `target`.
    pub fn to_json(&self, value: &str, target: &str) -> String {
        to_json_stmts(self.ty, value, target, 0)
    }

    /// Statements pushing `key=value` onto the string array `target`.
    pub fn to_query_param(
        &self,
        value: &str,
        key: &str,
        instance_path: &str,
        target: &str,
    ) -> String {
        if !self.ty.is_query_scalar() {
            return format!(
                "console.warn({});",
                js_string(&format!(
                    "[rpcgen] {} cannot be serialized to a query string and was skipped",
                    instance_path
                ))
            );
        }

        let push = |value: &str| {
            format!(
                "{}.push({} + {});",
                target,
                js_string(&format!("{}=", key)),
                query_display(self.ty, value)
            )
        };
        if self.ty.optional {
            format!("if ({} !== undefined) {{\n    {}\n}}", value, push(value))
        } else if self.ty.writes_null() {
            format!(
                "if ({} === null) {{\n    {}.push({});\n}} else {{\n    {}\n}}",
                value,
                target,
                js_string(&format!("{}=null", key)),
                push(value)
            )
        } else {
            push(value)
        }
    }
}

/// A double-quoted JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

fn scalar_type_name(scalar: ScalarType) -> &'static str {
    match scalar {
        ScalarType::String => "string",
        ScalarType::Boolean => "boolean",
        ScalarType::Timestamp => "Date",
        ScalarType::Int64 | ScalarType::Uint64 => "bigint",
        _ => "number",
    }
}

fn inner_type_name(ty: &TypeRef) -> String {
    match &ty.expr {
        TypeExpr::Scalar(scalar) => scalar_type_name(*scalar).to_string(),
        TypeExpr::Any => "any".to_string(),
        TypeExpr::Model(model) => type_identifier(&model.name),
        TypeExpr::List(item) => {
            let item_type = TsProperty::new(item).type_name();
            if item_type.contains(' ') {
                format!("({})[]", item_type)
            } else {
                format!("{}[]", item_type)
            }
        }
        TypeExpr::Map(item) => format!("Record<string, {}>", TsProperty::new(item).type_name()),
    }
}

fn zero_value(ty: &TypeRef) -> String {
    match &ty.expr {
        TypeExpr::Scalar(ScalarType::String) => "\"\"".to_string(),
        TypeExpr::Scalar(ScalarType::Boolean) => "false".to_string(),
        TypeExpr::Scalar(ScalarType::Timestamp) => "new Date(0)".to_string(),
        TypeExpr::Scalar(ScalarType::Int64 | ScalarType::Uint64) => "BigInt(0)".to_string(),
        TypeExpr::Scalar(_) => "0".to_string(),
        TypeExpr::Any => "null".to_string(),
        TypeExpr::Model(model) => format!("$${}.new()", type_identifier(&model.name)),
        TypeExpr::List(_) => "[]".to_string(),
        TypeExpr::Map(_) => "{}".to_string(),
    }
}

fn fallback(ty: &TypeRef) -> String {
    if ty.optional {
        "undefined".to_string()
    } else if ty.is_wrapped() {
        "null".to_string()
    } else {
        zero_value(ty)
    }
}

fn from_json_expr(ty: &TypeRef, input: &str, depth: usize) -> String {
    let fallback = fallback(ty);
    match &ty.expr {
        TypeExpr::Scalar(ScalarType::String) => {
            format!("typeof {i} === \"string\" ? {i} : {f}", i = input, f = fallback)
        }
        TypeExpr::Scalar(ScalarType::Boolean) => {
            format!("typeof {i} === \"boolean\" ? {i} : {f}", i = input, f = fallback)
        }
        TypeExpr::Scalar(ScalarType::Timestamp) => format!("$$parseDate({}, {})", input, fallback),
        TypeExpr::Scalar(ScalarType::Int64 | ScalarType::Uint64) => {
            format!("$$parseBigInt({}, {})", input, fallback)
        }
        TypeExpr::Scalar(_) => {
            format!("typeof {i} === \"number\" ? {i} : {f}", i = input, f = fallback)
        }
        TypeExpr::Any if ty.optional => {
            format!("{i} === null ? undefined : {i}", i = input)
        }
        TypeExpr::Any => format!("{} ?? null", input),
        TypeExpr::Model(model) => {
            let name = type_identifier(&model.name);
            match model.shape {
                ModelShape::Enum => format!(
                    "typeof {i} === \"string\" ? $${n}.fromSerialValue({i}) : {f}",
                    i = input,
                    n = name,
                    f = fallback
                ),
                _ => format!(
                    "$$isObject({i}) ? $${n}.fromJson({i}) : {f}",
                    i = input,
                    n = name,
                    f = fallback
                ),
            }
        }
        TypeExpr::List(item) => {
            let var = format!("_item_{}", depth);
            format!(
                "Array.isArray({i}) ? {i}.map(({v}: unknown) => ({e})) : {f}",
                i = input,
                v = var,
                e = from_json_expr(item, &var, depth + 1),
                f = fallback
            )
        }
        TypeExpr::Map(item) => {
            let key = format!("_key_{}", depth);
            let value = format!("_value_{}", depth);
            format!(
                "$$isObject({i}) ? Object.fromEntries(Object.entries({i}).map(([{k}, {v}]) => [{k}, ({e})])) : {f}",
                i = input,
                k = key,
                v = value,
                e = from_json_expr(item, &value, depth + 1),
                f = fallback
            )
        }
    }
}

fn to_json_stmts(ty: &TypeRef, value: &str, target: &str, depth: usize) -> String {
    let inner = to_json_inner(ty, value, target, depth);
    if ty.is_wrapped() {
        format!(
            "if ({v} === null || {v} === undefined) {{\n    {t} += \"null\";\n}} else {{\n{b}\n}}",
            v = value,
            t = target,
            b = indent_lines(&inner)
        )
    } else {
        inner
    }
}

fn to_json_inner(ty: &TypeRef, value: &str, target: &str, depth: usize) -> String {
    match &ty.expr {
        TypeExpr::Scalar(ScalarType::String) => format!("{} += JSON.stringify({});", target, value),
        TypeExpr::Scalar(ScalarType::Timestamp) => {
            format!("{} += JSON.stringify({}.toISOString());", target, value)
        }
        TypeExpr::Scalar(ScalarType::Int64 | ScalarType::Uint64) => {
            format!("{} += JSON.stringify(String({}));", target, value)
        }
        TypeExpr::Scalar(_) => format!("{} += String({});", target, value),
        TypeExpr::Any => format!("{} += JSON.stringify({}) ?? \"null\";", target, value),
        TypeExpr::Model(model) => match model.shape {
            ModelShape::Enum => format!("{} += JSON.stringify({});", target, value),
            _ => format!(
                "{} += $${}.toJsonString({});",
                target,
                type_identifier(&model.name),
                value
            ),
        },
        TypeExpr::List(item) => {
            let index = format!("_i_{}", depth);
            let element = format!("_item_{}", depth);
            format!(
                "{t} += \"[\";\nfor (let {i} = 0; {i} < {v}.length; {i}++) {{\n    if ({i} !== 0) {{\n        {t} += \",\";\n    }}\n    const {e} = {v}[{i}];\n{b}\n}}\n{t} += \"]\";",
                t = target,
                i = index,
                v = value,
                e = element,
                b = indent_lines(&to_json_stmts(item, &element, target, depth + 1))
            )
        }
        TypeExpr::Map(item) => {
            let entries = format!("_entries_{}", depth);
            let index = format!("_i_{}", depth);
            let key = format!("_key_{}", depth);
            let element = format!("_value_{}", depth);
            format!(
                "{t} += \"{{\";\nconst {n} = Object.entries({v});\nfor (let {i} = 0; {i} < {n}.length; {i}++) {{\n    if ({i} !== 0) {{\n        {t} += \",\";\n    }}\n    const [{k}, {e}] = {n}[{i}];\n    {t} += JSON.stringify({k}) + \":\";\n{b}\n}}\n{t} += \"}}\";",
                t = target,
                n = entries,
                v = value,
                i = index,
                k = key,
                e = element,
                b = indent_lines(&to_json_stmts(item, &element, target, depth + 1))
            )
        }
    }
}

fn query_display(ty: &TypeRef, value: &str) -> String {
    match &ty.expr {
        TypeExpr::Scalar(ScalarType::Timestamp) => format!("{}.toISOString()", value),
        _ => format!("String({})", value),
    }
}

fn indent_lines(code: &str) -> String {
    crate::codegen::indent::block(code, 4)
}
