use oasval_core::{Error, SpecValidator, SpecVersion, Violation};
use serde::Serialize;

use crate::config::CliConfig;
use crate::exit_codes;
use crate::output::{print_error, print_result, TextReport};
use crate::{LoaderArgs, OutputArgs};

#[derive(Serialize)]
struct ValidateResult<'a> {
    valid: bool,
    locator: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    violations: &'a [Violation],
}

pub fn validate_cmd(
    locator: &str,
    spec_version: Option<SpecVersion>,
    output: &OutputArgs,
    loader: &LoaderArgs,
) -> i32 {
    let config = match CliConfig::resolve(loader) {
        Ok(c) => c,
        Err(message) => {
            print_error(output.format, output.quiet, &message);
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let validator = SpecValidator::with_config(config.loader).with_options(config.validator);

    let result = match spec_version {
        Some(version) => validator.validate_url_version(locator, version),
        None => validator.validate_url(locator),
    };
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => return report_error(&err, output),
    };

    let report = ValidateResult {
        valid: outcome.is_valid(),
        locator,
        version: spec_version.map(|v| v.to_string()),
        violations: outcome.violations(),
    };
    print_result(output.format, output.quiet, &report);
    if outcome.is_valid() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    }
}

impl TextReport for ValidateResult<'_> {
    fn print_text(&self) {
        if self.valid {
            println!("ok: {} is valid", self.locator);
            return;
        }
        eprintln!(
            "error: {} failed validation ({} violations)",
            self.locator,
            self.violations.len()
        );
        for violation in self.violations {
            print_violation(violation, 0);
        }
    }
}

fn print_violation(violation: &Violation, depth: usize) {
    let indent = "  ".repeat(depth);
    eprintln!("{indent}- {violation}");
    for cause in &violation.causes {
        print_violation(cause, depth + 1);
    }
}

pub(crate) fn report_error(err: &Error, output: &OutputArgs) -> i32 {
    print_error(output.format, output.quiet, &err.to_string());
    match err {
        Error::VersionNotDetected(_) => exit_codes::VERSION_NOT_DETECTED,
        Error::Invalid(_) => exit_codes::VALIDATION_FAILED,
        Error::Load(_) | Error::Setup(_) => exit_codes::RUNTIME_ERROR,
    }
}
