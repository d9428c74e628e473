use std::path::Path;

use oasval_core::{LoaderConfig, ValidatorOptions};
use serde::Deserialize;

use crate::LoaderArgs;

/// Contents of a `--config` file. JSON is accepted as a subset of YAML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub loader: LoaderConfig,
    pub validator: ValidatorOptions,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {e}", path.display()))?;
        serde_yaml::from_str(&content).map_err(|e| format!("invalid config {}: {e}", path.display()))
    }

    /// Reads the file named by `--config`, if any, then applies flag overrides.
    pub fn resolve(args: &LoaderArgs) -> Result<Self, String> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if args.no_remote {
            config.loader.allow_remote = false;
        }
        if let Some(timeout) = args.timeout {
            config.loader.timeout_ms = timeout;
        }
        if let Some(max_bytes) = args.max_bytes {
            config.loader.max_bytes = max_bytes;
        }
        if args.skip_refs {
            config.validator.check_document_refs = false;
        }
        tracing::debug!(?config, "effective configuration");
        Ok(config)
    }
}
