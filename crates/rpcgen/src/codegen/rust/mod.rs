//! Rust client backend.
//!
//! Generated code depends on the `rpcgen-client` runtime crate for its model
//! traits, HTTP dispatch and serialization helpers.

pub mod ident;
mod models;
pub mod property;
mod services;

use super::{ClientGenerator, Target};
use crate::diagnostic::GeneratorError;
use crate::ir::{self, ClientIr, IrOptions};
use crate::schema::AppDefinition;

/// Lints the generated file silences.
pub const ALLOWED_LINTS: &str = "dead_code, unused_imports, unused_variables, unused_mut, \
    unused_assignments, deprecated, non_camel_case_types, clippy::all";

/// Type names brought into scope by the generated imports and the prelude.
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "Arc",
    "BTreeMap",
    "Box",
    "DateTime",
    "FixedOffset",
    "HttpMethod",
    "Option",
    "Result",
    "RpcClientConfig",
    "RpcClientService",
    "RpcEnum",
    "RpcError",
    "RpcModel",
    "RpcRequest",
    "SseController",
    "SseEvent",
    "String",
    "Vec",
];

/// Options specific to the Rust backend.
#[derive(Debug, Clone)]
pub struct RustOptions {
    pub ir: IrOptions,
    /// Emit `#![allow(..)]` at the top of the file. Must be off when the
    /// output is pulled in with `include!`, which rejects inner attributes.
    pub inner_attributes: bool,
}

impl Default for RustOptions {
    fn default() -> Self {
        Self {
            ir: IrOptions::default(),
            inner_attributes: true,
        }
    }
}

/// Generates a single Rust module.
pub struct RustGenerator {
    options: RustOptions,
}

impl RustGenerator {
    pub fn new(mut options: RustOptions) -> Self {
        options
            .ir
            .reserved_names
            .extend(RESERVED_TYPE_NAMES.iter().map(|name| name.to_string()));
        Self { options }
    }

    /// Prints an already built IR.
    pub fn render(&self, ir: &ClientIr) -> String {
        let mut output = String::new();

        output.push_str("// This file was autogenerated by rpcgen. Do not modify directly.\n");
        if self.options.inner_attributes {
            output.push_str(&format!("#![allow({})]\n", ALLOWED_LINTS));
        }
        output.push('\n');
        output.push_str(IMPORTS);

        if ir.has_procedures() {
            output.push('\n');
            output.push_str(&services::render_services(&ir.root, &ir.options));
        }

        for model in &ir.models {
            let rendered = models::render_model(model);
            if rendered.is_empty() {
                continue;
            }
            output.push('\n');
            output.push_str(&rendered);
        }

        output
    }
}

const IMPORTS: &str = "use rpcgen_client::{
    chrono::{DateTime, FixedOffset},
    serde_json,
    utils::{format_date_time, parse_date_time, serialize_date_time, serialize_string, warn_query_skip},
    HttpMethod, RpcClientConfig, RpcClientService, RpcEnum, RpcError, RpcModel, RpcRequest,
    SseController, SseEvent,
};
use std::collections::BTreeMap;
use std::sync::Arc;
";

impl ClientGenerator for RustGenerator {
    fn target(&self) -> Target {
        Target::Rust
    }

    fn generate(&self, app: &AppDefinition) -> Result<String, GeneratorError> {
        let ir = ir::build(app, &self.options.ir)?;
        Ok(self.render(&ir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_only_output_has_no_client() {
        let app = AppDefinition::from_value(json!({
            "definitions": { "A": { "properties": { "x": { "type": "int32" } } } }
        }))
        .unwrap();
        let code = RustGenerator::new(RustOptions::default()).generate(&app).unwrap();
        assert!(code.starts_with("// This file was autogenerated by rpcgen"));
        assert!(code.contains("#![allow("));
        assert!(!code.contains("RpcClientService for"));
        assert!(code.contains("pub struct A {"));
    }

    #[test]
    fn test_inner_attributes_can_be_disabled() {
        let app = AppDefinition::default();
        let options = RustOptions {
            inner_attributes: false,
            ..RustOptions::default()
        };
        let code = RustGenerator::new(options).generate(&app).unwrap();
        assert!(!code.contains("#![allow("));
    }

    #[test]
    fn test_imported_names_are_not_reused() {
        let app = AppDefinition::from_value(json!({
            "definitions": {
                "Arc": { "properties": { "x": { "type": "int32" } } },
                "RpcError": { "properties": { "inner": { "ref": "Arc" } } },
                "HttpMethod": { "enum": ["A"] }
            }
        }))
        .unwrap();
        let code = RustGenerator::new(RustOptions::default()).generate(&app).unwrap();
        assert!(code.contains("pub struct Arc2 {"));
        assert!(code.contains("pub struct RpcError2 {"));
        assert!(code.contains("pub inner: Arc2,"));
        assert!(code.contains("pub enum HttpMethod2 {"));
        assert!(!code.contains("pub struct Arc {"));
    }

    #[test]
    fn test_client_precedes_models() {
        let app = AppDefinition::from_value(json!({
            "procedures": { "ping": { "path": "/ping", "method": "post", "params": "Ping" } },
            "definitions": { "Ping": { "properties": {} } }
        }))
        .unwrap();
        let options = RustOptions {
            ir: IrOptions {
                type_prefix: String::new(),
                root_service: "Api".to_string(),
                ..IrOptions::default()
            },
            inner_attributes: true,
        };
        let code = RustGenerator::new(options).generate(&app).unwrap();
        let client = code.find("pub struct ApiClient").unwrap();
        let model = code.find("pub struct Ping").unwrap();
        assert!(client < model);
    }
}
