//! Validation of an application definition before generation.
//!
//! Unlike generation, which stops at the first error, validation reports
//! every problem it finds so `rpcgen check` can list them together.

mod procedures;
mod references;

use crate::diagnostic::GeneratorError;
use crate::schema::AppDefinition;

/// Returns every problem found in `app`, in document order.
pub fn validate_app(app: &AppDefinition) -> Vec<GeneratorError> {
    let mut errors = Vec::new();
    references::validate_references(app, &mut errors);
    procedures::validate_procedures(app, &mut errors);
    errors
}

/// Fails with the first problem found in `app`.
pub fn validate(app: &AppDefinition) -> Result<(), GeneratorError> {
    match validate_app(app).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
