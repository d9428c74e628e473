use clap::Subcommand;
use oasval_core::SpecVersion;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate a document against the meta-schema of its version.
    Validate {
        /// File path or http(s) URL.
        locator: String,
        /// Skip detection and validate as this version (2.0 or 3.0).
        #[arg(long)]
        spec_version: Option<SpecVersion>,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        loader: LoaderArgs,
    },
    /// Print the specification version a document declares.
    Detect {
        locator: String,
        #[command(flatten)]
        output: OutputArgs,
        #[command(flatten)]
        loader: LoaderArgs,
    },
    /// List the bundled meta-schemas.
    Schemas {
        #[command(flatten)]
        output: OutputArgs,
    },
}
