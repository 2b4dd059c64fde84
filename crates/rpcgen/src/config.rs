//! Generator configuration.

use std::path::PathBuf;

/// Configuration for one generator run.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Application definition document.
    pub input: PathBuf,

    /// File the generated client is written to.
    pub output: PathBuf,

    /// Target language: "rust" or "typescript".
    pub target: String,

    /// Prepended to every generated type name.
    pub type_prefix: String,

    /// Base name of the root client.
    pub root_service: String,

    /// Run the target's formatter over the output.
    pub format: bool,

    /// Formatter executable overriding the target's default.
    pub formatter: Option<PathBuf>,

    /// Emit `#![allow(..)]` in Rust output. Must be off for `include!`.
    pub rust_inner_attributes: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("app_definition.json"),
            output: PathBuf::from("src/client.rs"),
            target: "rust".to_string(),
            type_prefix: String::new(),
            root_service: "Api".to_string(),
            format: true,
            formatter: None,
            rust_inner_attributes: true,
        }
    }
}
