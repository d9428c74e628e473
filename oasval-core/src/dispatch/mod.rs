//! Entry points: pick the dialect for a document, wire a fresh resolver and
//! run the meta-schema over it.

mod refs;

use std::sync::{Arc, LazyLock};

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::dialect::{dialect, register_bundled};
use crate::error::{Error, ResolveError, ValidationOutcome};
use crate::loader::{to_location, DefaultLoader, Loader, LoaderConfig};
use crate::resolver::{Resolver, ANONYMOUS_BASE};
use crate::schema::{FormatSet, SchemaValidator};
use crate::version::{detect_version, SpecVersion};

static ANONYMOUS: LazyLock<Url> = LazyLock::new(|| Url::parse(ANONYMOUS_BASE).expect("valid"));

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorOptions {
    /// Resolve every `$ref` inside the document and report the broken ones.
    pub check_document_refs: bool,
    pub check_formats: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            check_document_refs: true,
            check_formats: true,
        }
    }
}

/// Validates OpenAPI documents against the meta-schema of their version.
///
/// Each call builds its own [`Resolver`], so external documents are fetched
/// at most once per call and never shared between calls.
pub struct SpecValidator<L: Loader = DefaultLoader> {
    loader: L,
    options: ValidatorOptions,
}

impl SpecValidator<DefaultLoader> {
    pub fn new() -> Self {
        Self::with_loader(DefaultLoader::default())
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self::with_loader(DefaultLoader::new(config))
    }
}

impl Default for SpecValidator<DefaultLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Loader> SpecValidator<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            options: ValidatorOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Detects the version, then validates.
    pub fn validate(&self, document: &Value) -> Result<ValidationOutcome, Error> {
        self.validate_with_base(document, None, None)
    }

    pub fn validate_version(&self, document: &Value, version: SpecVersion) -> Result<ValidationOutcome, Error> {
        self.validate_with_base(document, Some(version), None)
    }

    pub fn validate_url(&self, locator: &str) -> Result<ValidationOutcome, Error> {
        let location = to_location(locator)?;
        let document = self.loader.load(&location)?;
        self.validate_with_base(&document, None, Some(&location))
    }

    pub fn validate_url_version(&self, locator: &str, version: SpecVersion) -> Result<ValidationOutcome, Error> {
        let location = to_location(locator)?;
        let document = self.loader.load(&location)?;
        self.validate_with_base(&document, Some(version), Some(&location))
    }

    /// Validates `document` as if it had been loaded from `base`; relative
    /// references inside it resolve against that location. Without a base
    /// only same-document and absolute references can resolve.
    pub fn validate_with_base(
        &self,
        document: &Value,
        version: Option<SpecVersion>,
        base: Option<&Url>,
    ) -> Result<ValidationOutcome, Error> {
        let version = match version {
            Some(version) => version,
            None => detect_version(document)?,
        };
        let dialect = dialect(version);
        let formats = if self.options.check_formats {
            dialect.formats
        } else {
            FormatSet::none()
        };

        let mut resolver = Resolver::new(&self.loader);
        register_bundled(&mut resolver);
        let meta_schema = resolver
            .lookup_uri(dialect.meta_schema_uri)
            .ok_or_else(|| {
                Error::Setup(ResolveError::InvalidReference {
                    reference: dialect.meta_schema_uri.to_string(),
                    message: "meta-schema is not bundled".to_string(),
                })
            })?;

        let mut violations = SchemaValidator::new(&mut resolver, formats)
            .validate_root(document, meta_schema)
            .map_err(Error::Setup)?;

        if self.options.check_document_refs {
            let base = base.unwrap_or(&ANONYMOUS).clone();
            let root = resolver.add_document(base, Arc::new(document.clone()));
            violations.extend(refs::check_document_refs(&mut resolver, root, version));
        }

        tracing::info!(
            version = %version,
            violations = violations.len(),
            fetched = resolver.fetch_count(),
            "validation finished"
        );
        Ok(ValidationOutcome::from_violations(violations))
    }
}

/// Validates a document of any supported version with the default loader.
pub fn validate_spec(document: &Value) -> Result<(), Error> {
    SpecValidator::new().validate(document)?.into_result()?;
    Ok(())
}

pub fn validate_v2_spec(document: &Value) -> Result<(), Error> {
    SpecValidator::new()
        .validate_version(document, SpecVersion::V2)?
        .into_result()?;
    Ok(())
}

pub fn validate_v30_spec(document: &Value) -> Result<(), Error> {
    SpecValidator::new()
        .validate_version(document, SpecVersion::V30)?
        .into_result()?;
    Ok(())
}

/// Loads `locator` (URL or filesystem path) and validates it.
pub fn validate_spec_url(locator: &str) -> Result<(), Error> {
    SpecValidator::new().validate_url(locator)?.into_result()?;
    Ok(())
}

pub fn validate_v2_spec_url(locator: &str) -> Result<(), Error> {
    SpecValidator::new()
        .validate_url_version(locator, SpecVersion::V2)?
        .into_result()?;
    Ok(())
}

pub fn validate_v30_spec_url(locator: &str) -> Result<(), Error> {
    SpecValidator::new()
        .validate_url_version(locator, SpecVersion::V30)?
        .into_result()?;
    Ok(())
}
