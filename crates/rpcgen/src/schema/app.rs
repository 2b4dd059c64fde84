//! Application definition: procedures plus named type definitions.

use std::fmt;
use std::path::Path;

use indexmap::IndexMap;

use super::lower::lower_schema;
use super::node::Schema;
use super::raw::{RawAppDefinition, RawProcedure, RawProcedureEntry};
use crate::diagnostic::GeneratorError;

/// Transport used when a procedure does not list any.
pub const DEFAULT_TRANSPORT: &str = "http";

/// HTTP method of a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Parses a method name, ignoring case.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "patch" => Some(HttpMethod::Patch),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// GET requests carry params in the query string, everything else in the body.
    pub fn uses_query_string(self) -> bool {
        self == HttpMethod::Get
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document-level information.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}

/// A single procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDef {
    pub path: String,
    pub method: HttpMethod,
    /// Definition key of the params type.
    pub params: Option<String>,
    /// Definition key of the response type.
    pub response: Option<String>,
    pub transports: Vec<String>,
    pub is_event_stream: bool,
    pub is_deprecated: bool,
    pub description: Option<String>,
}

/// A parsed application definition.
///
/// `procedures` is flat and keyed by dotted name (`users.getUser`), in
/// document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppDefinition {
    pub schema_version: Option<String>,
    pub info: Option<AppInfo>,
    pub procedures: IndexMap<String, ProcedureDef>,
    pub definitions: IndexMap<String, Schema>,
}

impl AppDefinition {
    /// Reads and parses a definition file.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let content = std::fs::read_to_string(path).map_err(|e| GeneratorError::IoError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Parses a definition document. `origin` is only used in errors.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, GeneratorError> {
        let raw: RawAppDefinition =
            serde_json::from_str(content).map_err(|e| GeneratorError::ParseFailed {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_raw(raw)
    }

    /// Builds a definition from an in-memory JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, GeneratorError> {
        let raw: RawAppDefinition =
            serde_json::from_value(value).map_err(|e| GeneratorError::ParseFailed {
                path: "<memory>".into(),
                message: e.to_string(),
            })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawAppDefinition) -> Result<Self, GeneratorError> {
        let mut procedures = IndexMap::new();
        flatten_procedures(&raw.procedures, None, &mut procedures)?;

        let mut definitions = IndexMap::new();
        for (name, node) in &raw.definitions {
            let schema = lower_schema(node, &format!("/definitions/{}", name))?;
            definitions.insert(name.clone(), schema);
        }

        Ok(Self {
            schema_version: raw.schema_version,
            info: raw.info.map(|info| AppInfo {
                title: info.title,
                description: info.description,
                version: info.version,
            }),
            procedures,
            definitions,
        })
    }

    /// Version string sent by generated clients, if any.
    pub fn version(&self) -> Option<&str> {
        self.info.as_ref().and_then(|info| info.version.as_deref())
    }
}

fn flatten_procedures(
    entries: &IndexMap<String, RawProcedureEntry>,
    parent: Option<&str>,
    out: &mut IndexMap<String, ProcedureDef>,
) -> Result<(), GeneratorError> {
    for (key, entry) in entries {
        let name = match parent {
            Some(parent) => format!("{}.{}", parent, key),
            None => key.clone(),
        };
        match entry {
            RawProcedureEntry::Procedure(raw) => {
                let procedure = procedure_from_raw(&name, raw)?;
                if out.insert(name.clone(), procedure).is_some() {
                    return Err(GeneratorError::DuplicateProcedure { procedure: name });
                }
            }
            RawProcedureEntry::Nested(children) => {
                flatten_procedures(children, Some(&name), out)?;
            }
        }
    }
    Ok(())
}

fn procedure_from_raw(name: &str, raw: &RawProcedure) -> Result<ProcedureDef, GeneratorError> {
    let method = HttpMethod::parse(&raw.method).ok_or_else(|| GeneratorError::UnknownHttpMethod {
        procedure: name.to_string(),
        method: raw.method.clone(),
    })?;

    let mut transports = raw.transports.clone().unwrap_or_default();
    if transports.is_empty() {
        transports.push(
            raw.transport
                .clone()
                .unwrap_or_else(|| DEFAULT_TRANSPORT.to_string()),
        );
    }

    Ok(ProcedureDef {
        path: raw.path.clone(),
        method,
        params: raw.params.clone().filter(|p| !p.is_empty()),
        response: raw.response.clone().filter(|r| !r.is_empty()),
        transports,
        is_event_stream: raw.is_event_stream.unwrap_or(false),
        is_deprecated: raw.is_deprecated.unwrap_or(false),
        description: raw.description.clone().filter(|d| !d.is_empty()),
    })
}
