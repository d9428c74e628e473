use assert_cmd::Command;
use tempfile::NamedTempFile;

fn write_temp(contents: &str, suffix: &str) -> NamedTempFile {
    let mut f = tempfile::Builder::new().suffix(suffix).tempfile().expect("tempfile");
    std::io::Write::write_all(&mut f, contents.as_bytes()).expect("write");
    f
}

fn oasval() -> Command {
    let mut cmd = Command::cargo_bin("oasval").unwrap();
    cmd.env_remove("OASVAL_LOG").env_remove("RUST_LOG");
    cmd
}

const VALID_V3: &str = r#"
openapi: 3.0.0
info:
  title: Example
  version: 0.0.1
paths:
  /pets:
    get:
      responses:
        "200":
          description: ok
"#;

const MISSING_RESPONSES_V2: &str = r#"{
  "swagger": "2.0",
  "info": {"title": "Example", "version": "1"},
  "paths": {"/pets": {"get": {}}}
}"#;

#[test]
fn validate_command_returns_0_for_valid_doc() {
    let f = write_temp(VALID_V3, ".yaml");
    oasval()
        .args(["validate", f.path().to_str().unwrap(), "--no-remote"])
        .assert()
        .success()
        .code(0);
}

#[test]
fn validate_command_returns_2_for_invalid_doc() {
    let f = write_temp(MISSING_RESPONSES_V2, ".json");
    let assert = oasval()
        .args(["validate", f.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(2);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("/paths/~1pets/get"), "{stderr}");
    assert!(stderr.contains("'responses' is a required property"), "{stderr}");
}

#[test]
fn validate_command_emits_json_report() {
    let f = write_temp(MISSING_RESPONSES_V2, ".json");
    let assert = oasval()
        .args(["validate", f.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .code(2);
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["valid"], false);
    assert_eq!(report["violations"][0]["path"], "/paths/~1pets/get");
    assert_eq!(report["violations"][0]["keyword"], "required");
}

#[test]
fn validate_command_returns_3_when_version_unknown() {
    let f = write_temp("{}", ".json");
    oasval()
        .args(["validate", f.path().to_str().unwrap()])
        .assert()
        .code(3);
}

#[test]
fn explicit_version_overrides_detection() {
    let f = write_temp("{}", ".json");
    oasval()
        .args(["validate", f.path().to_str().unwrap(), "--spec-version", "2.0"])
        .assert()
        .code(2);
}

#[test]
fn validate_command_returns_4_for_missing_file() {
    oasval()
        .args(["validate", "/definitely/not/here.yaml", "--quiet"])
        .assert()
        .code(4)
        .stderr("");
}

#[test]
fn skip_refs_ignores_broken_references() {
    let doc = r#"{
  "openapi": "3.0.0",
  "info": {"title": "t", "version": "1"},
  "paths": {},
  "components": {"schemas": {"Pet": {"$ref": "missing.yaml#/Pet"}}}
}"#;
    let f = write_temp(doc, ".json");
    oasval()
        .args(["validate", f.path().to_str().unwrap()])
        .assert()
        .code(2);
    oasval()
        .args(["validate", f.path().to_str().unwrap(), "--skip-refs"])
        .assert()
        .success();
}

#[test]
fn config_file_is_applied() {
    let doc = r#"{
  "openapi": "3.0.0",
  "info": {"title": "t", "version": "1", "contact": {"email": "nobody"}},
  "paths": {}
}"#;
    let f = write_temp(doc, ".json");
    let config = write_temp("validator:\n  check_formats: false\nloader:\n  allow_remote: false\n", ".yaml");
    oasval()
        .args(["validate", f.path().to_str().unwrap()])
        .assert()
        .code(2);
    oasval()
        .args([
            "validate",
            f.path().to_str().unwrap(),
            "--config",
            config.path().to_str().unwrap(),
        ])
        .assert()
        .success();

    let bad = write_temp("unknown_section: {}\n", ".yaml");
    oasval()
        .args([
            "validate",
            f.path().to_str().unwrap(),
            "--config",
            bad.path().to_str().unwrap(),
        ])
        .assert()
        .code(4);
}

#[test]
fn detect_command_prints_version() {
    let f = write_temp(VALID_V3, ".yaml");
    oasval()
        .args(["detect", f.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout("3.0\n");
}

#[test]
fn schemas_command_lists_bundled_dialects() {
    let assert = oasval().args(["schemas", "--format", "json"]).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let entries: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let versions: Vec<_> = entries
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["version"].as_str())
        .collect();
    assert_eq!(versions, ["2.0", "3.0"]);
}

#[test]
fn text_format_renders_reports_as_text() {
    let assert = oasval().args(["schemas"]).assert().success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 3, "{stdout}");
    assert!(lines[0].starts_with("-\tJSON Schema draft-04\t"), "{stdout}");
    assert!(lines[1].starts_with("2.0\tSwagger 2.0\t"), "{stdout}");
    assert!(!stdout.contains('{'), "{stdout}");

    let f = write_temp(VALID_V3, ".yaml");
    let assert = oasval()
        .args(["detect", f.path().to_str().unwrap(), "--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["version"], "3.0");
}
