//! Serde mirror of the definition document.
//!
//! Every field is optional here; [`super::lower`] decides which shape a node
//! has. Unknown keys are ignored so newer documents still load.

use indexmap::IndexMap;
use serde::Deserialize;

/// A schema node exactly as it appears in JSON.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSchema {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub properties: Option<IndexMap<String, RawSchema>>,
    pub optional_properties: Option<IndexMap<String, RawSchema>>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    pub elements: Option<Box<RawSchema>>,
    pub values: Option<Box<RawSchema>>,
    pub discriminator: Option<String>,
    pub mapping: Option<IndexMap<String, RawSchema>>,
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub nullable: Option<bool>,
    pub metadata: Option<RawMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    pub id: Option<String>,
    pub description: Option<String>,
    pub is_deprecated: Option<bool>,
}

/// A `procedures` entry: either a procedure or a nested group of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawProcedureEntry {
    Procedure(RawProcedure),
    Nested(IndexMap<String, RawProcedureEntry>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProcedure {
    pub path: String,
    pub method: String,
    pub params: Option<String>,
    pub response: Option<String>,
    pub transports: Option<Vec<String>>,
    /// Older documents carry a single transport.
    pub transport: Option<String>,
    #[serde(alias = "outputIsStream")]
    pub is_event_stream: Option<bool>,
    pub is_deprecated: Option<bool>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAppDefinition {
    pub schema_version: Option<String>,
    pub info: Option<RawAppInfo>,
    #[serde(default)]
    pub procedures: IndexMap<String, RawProcedureEntry>,
    #[serde(default)]
    pub definitions: IndexMap<String, RawSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAppInfo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}
