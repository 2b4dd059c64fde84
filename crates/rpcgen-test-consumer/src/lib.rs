//! A client generated from `fixtures/app.json` at build time.

#[allow(
    dead_code,
    unused_imports,
    unused_variables,
    unused_mut,
    unused_assignments,
    deprecated,
    non_camel_case_types,
    clippy::all
)]
pub mod generated {
    include!(concat!(env!("OUT_DIR"), "/generated.rs"));
}
