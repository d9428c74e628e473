use serde::Serialize;
use thiserror::Error;

use crate::pointer::Location;
use crate::version::DetectError;

/// Structural failure of a validation call.
///
/// Per-node problems are never reported through this type except via
/// [`Error::Invalid`], which the shortcut functions use to flatten an
/// invalid outcome into a single `Result`.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    VersionNotDetected(#[from] DetectError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("validator setup failed: {0}")]
    Setup(#[source] ResolveError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl Error {
    /// True for every variant except [`Error::Invalid`].
    pub fn is_structural(&self) -> bool {
        !matches!(self, Error::Invalid(_))
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Failure of the document loader. Payloads are rendered messages so the
/// error can travel inside violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("invalid locator '{locator}': {message}")]
    InvalidLocator { locator: String, message: String },
    #[error("failed to read {location}: {message}")]
    Io { location: String, message: String },
    #[error("failed to fetch {location}: {message}")]
    Http { location: String, message: String },
    #[error("failed to fetch {location}: HTTP {status}")]
    Status { location: String, status: u16 },
    #[error("failed to parse {location}: {message}")]
    Parse { location: String, message: String },
    #[error("{location} exceeds the {limit} byte limit")]
    TooLarge { location: String, limit: u64 },
    #[error("remote loading is disabled: {location}")]
    RemoteDisabled { location: String },
    #[error("file loading is disabled: {location}")]
    FileDisabled { location: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("invalid $ref '{reference}': {message}")]
    InvalidReference { reference: String, message: String },
    #[error("$ref '{reference}' points at a missing node (segment '{segment}')")]
    PointerNotFound { reference: String, segment: String },
    #[error("circular $ref chain through '{reference}'")]
    CircularReference { reference: String },
    #[error("unresolvable $ref '{reference}'")]
    ReferenceUnresolvable {
        reference: String,
        #[source]
        source: LoadError,
    },
}

impl ResolveError {
    pub fn reference(&self) -> &str {
        match self {
            ResolveError::InvalidReference { reference, .. }
            | ResolveError::PointerNotFound { reference, .. }
            | ResolveError::CircularReference { reference }
            | ResolveError::ReferenceUnresolvable { reference, .. } => reference,
        }
    }

    /// Message including the loader cause, if any.
    pub fn detail(&self) -> String {
        match self {
            ResolveError::ReferenceUnresolvable { source, .. } => format!("{self}: {source}"),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Error)]
#[error("document failed validation ({violations_len} violations)")]
pub struct ValidationError {
    pub violations: Vec<Violation>,
    violations_len: usize,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        let violations_len = violations.len();
        Self {
            violations,
            violations_len,
        }
    }
}

/// One node failing one schema keyword.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// Location of the offending node in the validated document.
    pub path: Location,
    /// Keyword path through the schema, `$ref` hops included.
    pub schema_path: Location,
    pub keyword: String,
    pub message: String,
    /// Branch failures attached by `anyOf` / `oneOf`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Violation>,
    #[serde(skip)]
    pub reference_error: Option<ResolveError>,
}

impl Violation {
    pub fn new(
        path: Location,
        schema_path: Location,
        keyword: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path,
            schema_path,
            keyword: keyword.into(),
            message: message.into(),
            causes: Vec::new(),
            reference_error: None,
        }
    }

    pub fn with_causes(mut self, causes: Vec<Violation>) -> Self {
        self.causes = causes;
        self
    }

    pub(crate) fn unresolved(path: Location, schema_path: Location, err: ResolveError) -> Self {
        Self {
            path,
            schema_path,
            keyword: "$ref".to_string(),
            message: err.detail(),
            causes: Vec::new(),
            reference_error: Some(err),
        }
    }

    pub fn is_reference_failure(&self) -> bool {
        self.reference_error.is_some()
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at {}: {}", self.path, self.message)
    }
}

/// Result of a successful validation run.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(Vec<Violation>),
}

impl ValidationOutcome {
    pub(crate) fn from_violations(violations: Vec<Violation>) -> Self {
        if violations.is_empty() {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid(violations)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            ValidationOutcome::Valid => &[],
            ValidationOutcome::Invalid(v) => v,
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        match self {
            ValidationOutcome::Valid => Ok(()),
            ValidationOutcome::Invalid(v) => Err(ValidationError::new(v)),
        }
    }
}
