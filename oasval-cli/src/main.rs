use clap::Parser;

mod args;
mod cmd;
mod commands;
mod config;
mod exit_codes;
mod logging;
mod output;

pub use args::*;
use commands::Command;

#[derive(Debug, Parser)]
#[command(name = "oasval", version, about = "OpenAPI 2.0 / 3.0 document validator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = run_command(cli.command);
    std::process::exit(exit_code);
}

fn run_command(command: Command) -> i32 {
    match command {
        Command::Validate {
            locator,
            spec_version,
            output,
            loader,
        } => cmd::validate::validate_cmd(&locator, spec_version, &output, &loader),
        Command::Detect {
            locator,
            output,
            loader,
        } => cmd::detect::detect_cmd(&locator, &output, &loader),
        Command::Schemas { output } => cmd::schemas::schemas_cmd(&output),
    }
}
