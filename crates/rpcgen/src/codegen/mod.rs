//! Client code generation from the IR.
//!
//! Each backend is a [`ClientGenerator`] that turns an application definition
//! into one source document. Backends share the IR and the helpers here and
//! differ only in how they spell things.

pub mod indent;
pub mod naming;
pub mod rust;
pub mod typescript;

use std::fmt;
use std::str::FromStr;

use crate::config::GeneratorConfig;
use crate::diagnostic::GeneratorError;
use crate::ir::IrOptions;
use crate::schema::AppDefinition;
use naming::pascal_case;

/// A target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Rust,
    TypeScript,
}

impl Target {
    /// File extension of generated output.
    pub fn extension(self) -> &'static str {
        match self {
            Target::Rust => "rs",
            Target::TypeScript => "ts",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Target::Rust => "rust",
            Target::TypeScript => "typescript",
        }
    }
}

impl FromStr for Target {
    type Err = GeneratorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rust" | "rs" => Ok(Target::Rust),
            "typescript" | "ts" => Ok(Target::TypeScript),
            _ => Err(GeneratorError::UnsupportedTarget {
                target: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for language backends.
pub trait ClientGenerator {
    /// The language this backend emits.
    fn target(&self) -> Target;

    /// Generates the complete client source for `app`.
    fn generate(&self, app: &AppDefinition) -> Result<String, GeneratorError>;
}

/// Creates the backend selected by `config`.
pub fn create_generator(
    config: &GeneratorConfig,
) -> Result<Box<dyn ClientGenerator>, GeneratorError> {
    let ir = IrOptions {
        type_prefix: config.type_prefix.clone(),
        root_service: config.root_service.clone(),
        ..IrOptions::default()
    };
    match config.target.parse::<Target>()? {
        Target::Rust => Ok(Box::new(rust::RustGenerator::new(rust::RustOptions {
            ir,
            inner_attributes: config.rust_inner_attributes,
        }))),
        Target::TypeScript => Ok(Box::new(typescript::TypeScriptGenerator::new(ir))),
    }
}

/// Type name of the service at `path`: the root is the client, every nested
/// node a service named after its full path.
pub fn service_type_name(options: &IrOptions, path: &[String]) -> String {
    let mut name = format!("{}{}", options.type_prefix, pascal_case(&options.root_service));
    for segment in path {
        name.push_str(&pascal_case(segment));
    }
    if path.is_empty() {
        name.push_str("Client");
    } else {
        name.push_str("Service");
    }
    name
}
