//! End-to-end tests of the generation pipeline on generated text.

use pretty_assertions::assert_eq;
use rpcgen::{AppDefinition, Generator, GeneratorConfig, GeneratorError};
use serde_json::json;

fn definition() -> serde_json::Value {
    json!({
        "schemaVersion": "0.0.8",
        "info": { "title": "Shop", "version": "1.2.0" },
        "procedures": {
            "users.getUser": {
                "path": "/users/get-user",
                "method": "get",
                "params": "UserParams",
                "response": "User"
            },
            "users.updateUser": {
                "path": "/users/update-user",
                "method": "post",
                "params": "User",
                "response": "User"
            },
            "ping": { "path": "/ping", "method": "post" }
        },
        "definitions": {
            "UserParams": {
                "properties": {
                    "userId": { "type": "string" },
                    "since": { "type": "timestamp", "nullable": true }
                },
                "optionalProperties": { "limit": { "type": "uint32" } }
            },
            "User": {
                "properties": {
                    "id": { "type": "string" },
                    "address": { "ref": "Address" },
                    "billing": { "ref": "Address" },
                    "parent": { "ref": "User", "nullable": true }
                },
                "optionalProperties": {
                    "children": { "elements": { "ref": "User" } }
                }
            },
            "Address": {
                "properties": { "street": { "type": "string" } }
            }
        }
    })
}

fn config(dir: &std::path::Path, target: &str, file: &str) -> GeneratorConfig {
    GeneratorConfig {
        input: dir.join("app.json"),
        output: dir.join("out").join(file),
        target: target.to_string(),
        root_service: "Shop".to_string(),
        format: false,
        ..GeneratorConfig::default()
    }
}

fn generate(target: &str, file: &str) -> String {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("app.json"), definition().to_string()).unwrap();
    let config = config(dir.path(), target, file);
    let result = Generator::new(config.clone()).generate().unwrap();
    assert_eq!(result.output, config.output);
    assert_eq!(result.procedures, 3);
    assert_eq!(result.definitions, 3);
    assert!(!result.formatted);
    std::fs::read_to_string(&config.output).unwrap()
}

#[test]
fn test_each_type_is_declared_once() {
    let code = generate("rust", "client.rs");
    assert_eq!(code.matches("pub struct Address {").count(), 1);
    assert_eq!(code.matches("pub struct User {").count(), 1);
    assert_eq!(code.matches("impl RpcModel for User {").count(), 1);

    let code = generate("typescript", "client.ts");
    assert_eq!(code.matches("export interface Address {").count(), 1);
    assert_eq!(code.matches("export const $$User = {").count(), 1);
}

#[test]
fn test_self_reference_is_boxed_once() {
    let code = generate("rust", "client.rs");
    assert!(code.contains("pub parent: Option<Box<User>>,"));
    assert!(code.contains("pub children: Option<Vec<User>>,"));
    assert!(!code.contains("Box<Box<"));
}

#[test]
fn test_required_nullable_and_optional_query_params() {
    let code = generate("rust", "client.rs");
    assert!(code.contains("_query_parts_.push(\"since=null\".to_string())"));
    assert!(code.contains("pub limit: Option<u32>,"));

    let code = generate("typescript", "client.ts");
    assert!(code.contains("_queryParts.push(\"since=null\");"));
    assert!(code.contains("if (input.limit !== undefined) {"));
}

#[test]
fn test_procedure_paths_and_methods() {
    let code = generate("rust", "client.rs");
    assert!(code.contains("RpcRequest::new(&self._config_, HttpMethod::Get, \"/users/get-user\")"));
    assert!(code.contains(".query(params.to_query_params_string())"));
    assert!(code.contains(
        "RpcRequest::new(&self._config_, HttpMethod::Post, \"/users/update-user\")"
    ));
    assert!(code.contains(".body(params.to_json_string())"));
    assert!(code.contains("pub struct ShopClient {"));
    assert!(code.contains("pub struct ShopUsersService {"));

    let code = generate("typescript", "client.ts");
    assert!(code.contains("export class ShopClient {"));
    assert!(code.contains("path: \"/users/get-user\","));
    assert!(code.contains("serializer: $$UserParams.toUrlQueryString,"));
}

#[test]
fn test_invalid_definition_is_rejected_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let mut value = definition();
    value["procedures"]["ping"]["path"] = json!("ping");
    std::fs::write(dir.path().join("app.json"), value.to_string()).unwrap();
    let config = config(dir.path(), "rust", "client.rs");

    let err = Generator::new(config.clone()).generate().unwrap_err();
    assert!(matches!(err, GeneratorError::MalformedPath { .. }));
    assert!(!config.output.exists());
}

#[test]
fn test_check_lists_problems() {
    let dir = tempfile::tempdir().unwrap();
    let mut value = definition();
    value["procedures"]["ping"]["params"] = json!("Missing");
    value["definitions"]["Address"]["properties"]["zip"] = json!({ "ref": "Zip" });
    std::fs::write(dir.path().join("app.json"), value.to_string()).unwrap();

    let result = Generator::new(config(dir.path(), "rust", "client.rs")).check().unwrap();
    assert!(!result.is_valid());
    assert_eq!(result.problems.len(), 2);
}

#[test]
fn test_check_reports_recursive_alias() {
    let dir = tempfile::tempdir().unwrap();
    let value = json!({
        "definitions": {
            "A": { "elements": { "ref": "B" } },
            "B": { "values": { "ref": "A" } }
        }
    });
    std::fs::write(dir.path().join("app.json"), value.to_string()).unwrap();

    let result = Generator::new(config(dir.path(), "rust", "client.rs")).check().unwrap();
    assert!(matches!(
        result.problems.as_slice(),
        [GeneratorError::RecursiveAlias { .. }]
    ));
}

#[test]
fn test_missing_input_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = Generator::new(config(dir.path(), "rust", "client.rs"))
        .generate()
        .unwrap_err();
    assert!(matches!(err, GeneratorError::IoError { .. }));
}

#[test]
fn test_run_accepts_loaded_definition() {
    let dir = tempfile::tempdir().unwrap();
    let app = AppDefinition::from_value(definition()).unwrap();
    let result = Generator::new(config(dir.path(), "ts", "client.ts")).run(&app).unwrap();
    assert_eq!(result.target, rpcgen::Target::TypeScript);
    assert!(result.output.exists());
}
