//! # rpcgen
//!
//! This crate generates typed RPC clients from an application definition: a
//! JSON document listing procedures and the JSON Type Definition schemas
//! they exchange. It supports multiple target languages through pluggable
//! backends.
//!
//! ## Supported Targets
//!
//! - Rust (default), against the `rpcgen-client` runtime crate
//! - TypeScript, against the `@rpcgen/client` package
//!
//! ## Architecture
//!
//! ```text
//! app_definition.json
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Schema    │  JSON → closed schema sum type
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Validate   │  Paths, references, procedure types
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │      IR      │  Models, services, naming, recursion
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Rust / TypeScript printers
//! └──────┬───────┘
//!        │
//!        ▼
//!    client.rs / client.ts  (optionally formatted)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rpcgen::{Generator, GeneratorConfig};
//!
//! let config = GeneratorConfig {
//!     input: "app_definition.json".into(),
//!     output: "src/client.rs".into(),
//!     root_service: "Shop".to_string(),
//!     ..GeneratorConfig::default()
//! };
//!
//! let result = Generator::new(config).generate()?;
//! println!("wrote {}", result.output.display());
//! ```

pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod format;
pub mod ir;
pub mod schema;
pub mod validate;

use std::path::PathBuf;

pub use codegen::{create_generator, ClientGenerator, Target};
pub use config::GeneratorConfig;
pub use diagnostic::GeneratorError;
pub use schema::AppDefinition;

/// Runs the generation pipeline for one configuration.
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Loads the configured input and generates the client.
    pub fn generate(&self) -> Result<GenerateResult, GeneratorError> {
        let app = AppDefinition::load(&self.config.input)?;
        self.run(&app)
    }

    /// Generates, writes and formats the client for an already loaded
    /// definition.
    ///
    /// This runs the full pipeline:
    /// 1. Validate the definition
    /// 2. Create the backend for the configured target
    /// 3. Build the IR and print it
    /// 4. Write the output file
    /// 5. Run the formatter, if enabled
    pub fn run(&self, app: &AppDefinition) -> Result<GenerateResult, GeneratorError> {
        validate::validate(app)?;

        let generator = create_generator(&self.config)?;
        let code = generator.generate(app)?;
        self.write_output(&code)?;

        let formatted = self.config.format
            && format::format_file(
                generator.target(),
                self.config.formatter.as_deref(),
                &self.config.output,
            );

        tracing::debug!(
            target_language = %generator.target(),
            output = %self.config.output.display(),
            procedures = app.procedures.len(),
            "generated client"
        );

        Ok(GenerateResult {
            output: self.config.output.clone(),
            target: generator.target(),
            procedures: app.procedures.len(),
            definitions: app.definitions.len(),
            formatted,
        })
    }

    /// Loads and validates the configured input without writing anything.
    ///
    /// Loading failures are returned as the error. Problems in the definition
    /// itself are listed in the result.
    pub fn check(&self) -> Result<CheckResult, GeneratorError> {
        let app = AppDefinition::load(&self.config.input)?;
        let mut problems = validate::validate_app(&app);

        if problems.is_empty() {
            let options = ir::IrOptions {
                type_prefix: self.config.type_prefix.clone(),
                root_service: self.config.root_service.clone(),
                ..ir::IrOptions::default()
            };
            if let Err(err) = ir::build(&app, &options) {
                problems.push(err);
            }
        }

        Ok(CheckResult {
            procedures: app.procedures.len(),
            definitions: app.definitions.len(),
            problems,
        })
    }

    fn write_output(&self, code: &str) -> Result<(), GeneratorError> {
        if let Some(parent) = self.config.output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GeneratorError::io(parent, e.to_string()))?;
            }
        }
        std::fs::write(&self.config.output, code)
            .map_err(|e| GeneratorError::io(&self.config.output, e.to_string()))
    }
}

/// Result of a successful generation.
#[derive(Debug)]
pub struct GenerateResult {
    /// The file that was written.
    pub output: PathBuf,
    pub target: Target,
    /// Number of procedures in the definition.
    pub procedures: usize,
    /// Number of top-level definitions.
    pub definitions: usize,
    /// Whether the formatter ran successfully.
    pub formatted: bool,
}

/// Result of checking a definition.
#[derive(Debug)]
pub struct CheckResult {
    pub procedures: usize,
    pub definitions: usize,
    /// Every problem found, empty when the definition is valid.
    pub problems: Vec<GeneratorError>,
}

impl CheckResult {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }
}
