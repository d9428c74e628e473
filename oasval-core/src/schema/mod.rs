//! Draft-04 JSON Schema evaluation as used by the Swagger 2.0 and OpenAPI 3.0
//! meta-schemas.

mod format;
mod keywords;
mod pattern;
mod validator;

use std::sync::Arc;

use serde_json::Value;
use url::Url;

pub use format::{Format, FormatSet};
pub use validator::SchemaValidator;

use crate::dialect::register_bundled;
use crate::error::{Error, ValidationOutcome};
use crate::loader::Loader;
use crate::resolver::Resolver;

/// Validates `instance` against a standalone `schema` registered under `base`.
///
/// The bundled meta-schemas are available to `$ref` by their ids; any other
/// external reference is fetched through `loader`.
pub fn validate_instance(
    instance: &Value,
    schema: &Value,
    base: &Url,
    loader: &dyn Loader,
    formats: FormatSet,
) -> Result<ValidationOutcome, Error> {
    let mut resolver = Resolver::new(loader);
    register_bundled(&mut resolver);
    let schema_doc = resolver.add_document(base.clone(), Arc::new(schema.clone()));
    let violations = SchemaValidator::new(&mut resolver, formats)
        .validate_root(instance, schema_doc)
        .map_err(Error::Setup)?;
    Ok(ValidationOutcome::from_violations(violations))
}
