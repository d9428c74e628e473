#![forbid(unsafe_code)]

pub mod dialect;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod loader;
pub mod pointer;
pub mod resolver;
pub mod schema;
pub mod version;

pub use crate::dialect::{bundled_schemas, dialect, BundledSchema, Dialect};
pub use crate::dispatch::{
    validate_spec, validate_spec_url, validate_v2_spec, validate_v2_spec_url, validate_v30_spec,
    validate_v30_spec_url, SpecValidator, ValidatorOptions,
};
pub use crate::document::{parse_document_str, DocumentFormat, ParsedDocument};
pub use crate::error::{
    Error, LoadError, ParseError, ResolveError, ValidationError, ValidationOutcome, Violation,
};
pub use crate::loader::{to_location, DefaultLoader, Loader, LoaderConfig, MemoryLoader};
pub use crate::pointer::{JsonPointer, Location, PathSegment};
pub use crate::resolver::{Resolver, ANONYMOUS_BASE};
pub use crate::schema::{validate_instance, Format, FormatSet, SchemaValidator};
pub use crate::version::{detect_version, DetectError, SpecVersion};
