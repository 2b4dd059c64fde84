//! Generator error types.
#![allow(unused_assignments)]

use std::path::PathBuf;
use miette::Diagnostic;
use thiserror::Error;

/// Errors that can occur while reading an application definition or
/// generating client code from it.
#[allow(unused_assignments)]
#[derive(Error, Diagnostic, Debug)]
pub enum GeneratorError {
    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("Failed to read file '{}': {message}", path.display())]
    #[diagnostic(code(rpcgen::io::read_error))]
    IoError {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to parse application definition '{}': {message}", path.display())]
    #[diagnostic(
        code(rpcgen::io::parse_failed),
        help("The definition must be a JSON document with `procedures` and `definitions` objects")
    )]
    ParseFailed {
        path: PathBuf,
        message: String,
    },

    // =========================================================================
    // Schema Errors
    // =========================================================================
    #[error("Unknown scalar type '{type_name}' at {schema_path}")]
    #[diagnostic(
        code(rpcgen::schema::unknown_scalar),
        help("Supported types: string, boolean, timestamp, float32, float64, int8, uint8, int16, uint16, int32, uint32, int64, uint64")
    )]
    UnknownScalarType {
        type_name: String,
        schema_path: String,
    },

    #[error("Discriminated union at {schema_path} has no variants")]
    #[diagnostic(
        code(rpcgen::schema::empty_union),
        help("Add at least one entry to `mapping`")
    )]
    EmptyUnion {
        schema_path: String,
    },

    #[error("Variant '{tag}' of the union at {schema_path} must be an object schema")]
    #[diagnostic(
        code(rpcgen::schema::invalid_union_variant),
        help("Every `mapping` entry needs `properties` and/or `optionalProperties`")
    )]
    InvalidUnionVariant {
        tag: String,
        schema_path: String,
    },

    #[error("Enum at {schema_path} has no values")]
    #[diagnostic(
        code(rpcgen::schema::empty_enum),
        help("Add at least one string to `enum`")
    )]
    EmptyEnum {
        schema_path: String,
    },

    #[error("Unknown type reference '{name}' at {schema_path}")]
    #[diagnostic(
        code(rpcgen::schema::unknown_reference),
        help("References must name a key of `definitions`")
    )]
    UnknownTypeReference {
        name: String,
        schema_path: String,
    },

    #[error("Definition '{name}' refers to itself without passing through an object or union")]
    #[diagnostic(
        code(rpcgen::schema::recursive_alias),
        help("Wrap the recursive part in an object with a nullable or optional property")
    )]
    RecursiveAlias {
        name: String,
    },

    // =========================================================================
    // Procedure Errors
    // =========================================================================
    #[error("Procedure '{procedure}' has malformed path '{path}'")]
    #[diagnostic(
        code(rpcgen::procedure::malformed_path),
        help("Procedure paths must start with '/'")
    )]
    MalformedPath {
        procedure: String,
        path: String,
    },

    #[error("Procedure '{procedure}' uses '{type_name}' as {role}, which is not an object or union")]
    #[diagnostic(
        code(rpcgen::procedure::invalid_type),
        help("Procedure params and responses must be object or discriminator schemas")
    )]
    InvalidProcedureType {
        procedure: String,
        type_name: String,
        role: &'static str,
    },

    #[error("Procedure '{procedure}' has unknown HTTP method '{method}'")]
    #[diagnostic(
        code(rpcgen::procedure::unknown_method),
        help("Supported methods: get, post, put, patch, delete")
    )]
    UnknownHttpMethod {
        procedure: String,
        method: String,
    },

    #[error("Procedure '{procedure}' is defined more than once")]
    #[diagnostic(code(rpcgen::procedure::duplicate))]
    DuplicateProcedure {
        procedure: String,
    },

    // =========================================================================
    // Code Generation Errors
    // =========================================================================
    #[error("Unsupported target: {target}")]
    #[diagnostic(
        code(rpcgen::codegen::unsupported_target),
        help("Available targets: rust, typescript")
    )]
    UnsupportedTarget {
        target: String,
    },

    #[error("Failed to format generated code: {message}")]
    #[diagnostic(code(rpcgen::codegen::format_failed))]
    FormatFailed {
        message: String,
    },
}

impl GeneratorError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::IoError {
            path: path.into(),
            message: message.into(),
        }
    }
}
