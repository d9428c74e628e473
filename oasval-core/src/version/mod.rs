use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

static OPENAPI_30_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^3\.0\.\d+(-.+)?$").expect("valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecVersion {
    V2,
    V30,
}

impl SpecVersion {
    pub const ALL: [SpecVersion; 2] = [SpecVersion::V2, SpecVersion::V30];

    pub fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V2 => "2.0",
            SpecVersion::V30 => "3.0",
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2" | "2.0" | "v2" | "swagger" => Ok(SpecVersion::V2),
            "3" | "3.0" | "v3" | "v30" => Ok(SpecVersion::V30),
            _ => Err(format!("unsupported specification version '{s}' (expected 2.0 or 3.0)")),
        }
    }
}

/// Top-level key/value pattern that identifies a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discriminator {
    pub key: &'static str,
    pub expected: &'static str,
    pub version: SpecVersion,
}

impl Discriminator {
    fn matches(&self, document: &Value) -> bool {
        let Some(value) = document.get(self.key).and_then(Value::as_str) else {
            return false;
        };
        match self.version {
            SpecVersion::V2 => value == "2.0",
            SpecVersion::V30 => OPENAPI_30_RE.is_match(value),
        }
    }
}

impl fmt::Display for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.expected)
    }
}

/// Checked in order; the first match wins.
pub const DISCRIMINATORS: [Discriminator; 2] = [
    Discriminator {
        key: "swagger",
        expected: "2.0",
        version: SpecVersion::V2,
    },
    Discriminator {
        key: "openapi",
        expected: "3.0.x",
        version: SpecVersion::V30,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectError {
    #[error("specification version not detected (tried {})", render(.discriminators))]
    VersionNotDetected { discriminators: Vec<Discriminator> },
}

fn render(discriminators: &[Discriminator]) -> String {
    discriminators
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn detect_version(document: &Value) -> Result<SpecVersion, DetectError> {
    match DISCRIMINATORS.iter().find(|d| d.matches(document)) {
        Some(d) => {
            tracing::debug!(version = %d.version, key = d.key, "detected specification version");
            Ok(d.version)
        }
        None => Err(DetectError::VersionNotDetected {
            discriminators: DISCRIMINATORS.to_vec(),
        }),
    }
}
