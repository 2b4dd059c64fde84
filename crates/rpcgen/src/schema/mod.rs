//! Application definition input model.
//!
//! The definition document is decoded into serde mirrors ([`raw`]) and then
//! lowered into closed Rust types ([`Schema`], [`AppDefinition`]) that the rest
//! of the generator matches on.

mod app;
mod lower;
mod node;
mod raw;

pub use app::{AppDefinition, AppInfo, HttpMethod, ProcedureDef, DEFAULT_TRANSPORT};
pub use lower::lower_schema;
pub use node::{DiscriminatorSchema, Metadata, ObjectSchema, ScalarType, Schema, SchemaShape};
pub use raw::RawSchema;
