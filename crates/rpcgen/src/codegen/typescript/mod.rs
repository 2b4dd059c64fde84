//! TypeScript client backend.
//!
//! Generated code imports its transport from the `@rpcgen/client` package.

pub mod ident;
mod models;
pub mod property;
mod services;

use super::{ClientGenerator, Target};
use crate::diagnostic::GeneratorError;
use crate::ir::{self, ClientIr, IrOptions};
use crate::schema::AppDefinition;

/// Names declared by the imports and helpers, plus the global types
/// generated code refers to.
pub const RESERVED_TYPE_NAMES: &[&str] = &[
    "Array",
    "Date",
    "EventSourceController",
    "Record",
    "RpcClientOptions",
    "SseOptions",
];

/// Generates a single TypeScript module.
pub struct TypeScriptGenerator {
    options: IrOptions,
}

impl TypeScriptGenerator {
    pub fn new(mut options: IrOptions) -> Self {
        options
            .reserved_names
            .extend(RESERVED_TYPE_NAMES.iter().map(|name| name.to_string()));
        Self { options }
    }

    pub fn render(&self, ir: &ClientIr) -> String {
        let mut output = String::new();
        output.push_str("// This file was autogenerated by rpcgen. Do not modify directly.\n");
        output.push_str("/* eslint-disable */\n");

        if ir.has_procedures() {
            output.push('\n');
            output.push_str(IMPORTS);
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

        output.push('\n');
        output.push_str(HELPERS);
        output
    }
}

const IMPORTS: &str = "import {
  assertTransport,
  rpcEventStream,
  rpcRequest,
  type EventSourceController,
  type RpcClientOptions,
  type SseOptions,
} from \"@rpcgen/client\";
";

const HELPERS: &str = "function $$isObject(input: unknown): input is Record<string, any> {
  return typeof input === \"object\" && input !== null && !Array.isArray(input);
}

function $$parseBigInt<T>(input: unknown, fallback: T): bigint | T {
  if (typeof input === \"string\" || typeof input === \"number\") {
    try {
      return BigInt(input);
    } catch {
      return fallback;
    }
  }
  return fallback;
}

function $$parseDate<T>(input: unknown, fallback: T): Date | T {
  if (typeof input === \"string\" || input instanceof Date) {
    const date = new Date(input);
    if (!Number.isNaN(date.getTime())) {
      return date;
    }
  }
  return fallback;
}
";

impl ClientGenerator for TypeScriptGenerator {
    fn target(&self) -> Target {
        Target::TypeScript
    }

    fn generate(&self, app: &AppDefinition) -> Result<String, GeneratorError> {
        let ir = ir::build(app, &self.options)?;
        Ok(self.render(&ir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_only_output_skips_imports() {
        let app = AppDefinition::from_value(json!({
            "definitions": { "A": { "properties": { "x": { "type": "int32" } } } }
        }))
        .unwrap();
        let code = TypeScriptGenerator::new(IrOptions::default()).generate(&app).unwrap();
        assert!(code.starts_with("// This file was autogenerated by rpcgen"));
        assert!(!code.contains("@rpcgen/client"));
        assert!(code.contains("export interface A {\n  x: number;\n}"));
        assert!(code.contains("function $$isObject"));
    }

    #[test]
    fn test_imported_names_are_not_reused() {
        let app = AppDefinition::from_value(json!({
            "definitions": {
                "SseOptions": { "properties": { "x": { "type": "int32" } } },
                "Date": { "properties": { "at": { "type": "timestamp" } } }
            }
        }))
        .unwrap();
        let code = TypeScriptGenerator::new(IrOptions::default()).generate(&app).unwrap();
        assert!(code.contains("export interface SseOptions2 {"));
        assert!(code.contains("export interface Date2 {\n  at: Date;\n}"));
    }

    #[test]
    fn test_client_imports_runtime() {
        let app = AppDefinition::from_value(json!({
            "procedures": { "ping": { "path": "/ping", "method": "post" } }
        }))
        .unwrap();
        let code = TypeScriptGenerator::new(IrOptions::default()).generate(&app).unwrap();
        assert!(code.contains("} from \"@rpcgen/client\";"));
        assert!(code.contains("async ping(): Promise<void> {"));
    }
}
