use oasval_core::{detect_version, to_location, DefaultLoader, Error, Loader};
use serde::Serialize;

use crate::cmd::validate::report_error;
use crate::config::CliConfig;
use crate::exit_codes;
use crate::output::{print_error, print_result, TextReport};
use crate::{LoaderArgs, OutputArgs};

#[derive(Serialize)]
struct DetectResult<'a> {
    locator: &'a str,
    version: String,
}

pub fn detect_cmd(locator: &str, output: &OutputArgs, args: &LoaderArgs) -> i32 {
    let config = match CliConfig::resolve(args) {
        Ok(c) => c,
        Err(message) => {
            print_error(output.format, output.quiet, &message);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let loader = DefaultLoader::new(config.loader);

    let detected = to_location(locator)
        .and_then(|location| loader.load(&location))
        .map_err(Error::from)
        .and_then(|document| detect_version(&document).map_err(Error::from));
    let version = match detected {
        Ok(v) => v,
        Err(err) => return report_error(&err, output),
    };

    print_result(
        output.format,
        output.quiet,
        &DetectResult {
            locator,
            version: version.to_string(),
        },
    );
    exit_codes::SUCCESS
}

impl TextReport for DetectResult<'_> {
    fn print_text(&self) {
        println!("{}", self.version);
    }
}
