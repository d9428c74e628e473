use std::path::PathBuf;

use clap::Args;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LoaderArgs {
    /// Refuse to fetch http(s) documents, including external references.
    #[arg(long)]
    pub no_remote: bool,
    /// HTTP timeout in milliseconds.
    #[arg(long)]
    pub timeout: Option<u64>,
    #[arg(long)]
    pub max_bytes: Option<u64>,
    /// Skip resolving the `$ref`s inside the document.
    #[arg(long)]
    pub skip_refs: bool,
    /// JSON or YAML file with `loader` and `validator` sections.
    #[arg(long)]
    pub config: Option<PathBuf>,
}
