use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::document::{parse_document_str, DocumentFormat};
use crate::error::LoadError;

/// Turns an absolute location into a parsed document tree.
pub trait Loader {
    fn load(&self, location: &Url) -> Result<Value, LoadError>;
}

impl<L: Loader + ?Sized> Loader for &L {
    fn load(&self, location: &Url) -> Result<Value, LoadError> {
        (**self).load(location)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub allow_remote: bool,
    pub allow_file: bool,
    pub timeout_ms: u64,
    pub max_bytes: u64,
    pub user_agent: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            allow_remote: true,
            allow_file: true,
            timeout_ms: 30_000,
            max_bytes: 16 * 1024 * 1024,
            user_agent: concat!("oasval/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Filesystem and HTTP(S) loader.
pub struct DefaultLoader {
    config: LoaderConfig,
    client: Option<reqwest::blocking::Client>,
}

impl Default for DefaultLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl DefaultLoader {
    pub fn new(config: LoaderConfig) -> Self {
        let client = if config.allow_remote {
            reqwest::blocking::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .user_agent(config.user_agent.clone())
                .build()
                .map_err(|e| tracing::warn!(error = %e, "http client unavailable; remote loading disabled"))
                .ok()
        } else {
            None
        };
        Self { config, client }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    fn load_file(&self, location: &Url) -> Result<String, LoadError> {
        if !self.config.allow_file {
            return Err(LoadError::FileDisabled {
                location: location.to_string(),
            });
        }
        let path = location.to_file_path().map_err(|_| LoadError::InvalidLocator {
            locator: location.to_string(),
            message: "not a local file path".to_string(),
        })?;
        let io_err = |e: std::io::Error| LoadError::Io {
            location: path.display().to_string(),
            message: e.to_string(),
        };
        let meta = std::fs::metadata(&path).map_err(io_err)?;
        if meta.len() > self.config.max_bytes {
            return Err(LoadError::TooLarge {
                location: location.to_string(),
                limit: self.config.max_bytes,
            });
        }
        std::fs::read_to_string(&path).map_err(io_err)
    }

    fn load_http(&self, location: &Url) -> Result<String, LoadError> {
        let client = self.client.as_ref().ok_or_else(|| LoadError::RemoteDisabled {
            location: location.to_string(),
        })?;
        let http_err = |e: reqwest::Error| LoadError::Http {
            location: location.to_string(),
            message: e.to_string(),
        };
        let resp = client.get(location.clone()).send().map_err(http_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        let mut body = String::new();
        resp.take(self.config.max_bytes + 1)
            .read_to_string(&mut body)
            .map_err(|e| LoadError::Http {
                location: location.to_string(),
                message: e.to_string(),
            })?;
        if body.len() as u64 > self.config.max_bytes {
            return Err(LoadError::TooLarge {
                location: location.to_string(),
                limit: self.config.max_bytes,
            });
        }
        Ok(body)
    }
}

impl Loader for DefaultLoader {
    fn load(&self, location: &Url) -> Result<Value, LoadError> {
        tracing::debug!(uri = %location, "loading document");
        let body = match location.scheme() {
            "file" => self.load_file(location)?,
            "http" | "https" => self.load_http(location)?,
            other => {
                return Err(LoadError::InvalidLocator {
                    locator: location.to_string(),
                    message: format!("unsupported scheme '{other}'"),
                })
            }
        };
        parse_body(location, &body)
    }
}

pub(crate) fn parse_body(location: &Url, body: &str) -> Result<Value, LoadError> {
    parse_document_str(body, DocumentFormat::Auto)
        .map(|parsed| parsed.document)
        .map_err(|e| LoadError::Parse {
            location: location.to_string(),
            message: e.to_string(),
        })
}

/// In-memory loader keyed by absolute URL; unknown locations fail with
/// `LoadError::Io`.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    documents: BTreeMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: &str, body: impl Into<String>) -> Self {
        self.insert(location, body);
        self
    }

    pub fn insert(&mut self, location: &str, body: impl Into<String>) {
        self.documents.insert(location.to_string(), body.into());
    }
}

impl Loader for MemoryLoader {
    fn load(&self, location: &Url) -> Result<Value, LoadError> {
        let mut key = location.clone();
        key.set_fragment(None);
        let body = self.documents.get(key.as_str()).ok_or_else(|| LoadError::Io {
            location: key.to_string(),
            message: "no such document".to_string(),
        })?;
        parse_body(&key, body)
    }
}

/// Interprets `locator` as an absolute URL, or failing that as a filesystem
/// path relative to the working directory.
pub fn to_location(locator: &str) -> Result<Url, LoadError> {
    let invalid = |message: String| LoadError::InvalidLocator {
        locator: locator.to_string(),
        message,
    };

    if let Ok(url) = Url::parse(locator) {
        // Single-letter schemes are Windows drive letters.
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }

    let path = Path::new(locator);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| invalid(e.to_string()))?
            .join(path)
    };
    Url::from_file_path(&absolute).map_err(|_| invalid("cannot convert path to a file URL".to_string()))
}
