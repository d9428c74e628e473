use oasval_core::{bundled_schemas, dialect, SpecVersion};
use serde::Serialize;

use crate::exit_codes;
use crate::output::{print_result, TextReport};
use crate::OutputArgs;

#[derive(Serialize)]
struct SchemaEntry {
    name: &'static str,
    uri: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    formats: Vec<&'static str>,
}

#[derive(Serialize)]
#[serde(transparent)]
struct SchemaList(Vec<SchemaEntry>);

impl TextReport for SchemaList {
    fn print_text(&self) {
        for entry in &self.0 {
            println!("{}\t{}\t{}", entry.version.unwrap_or("-"), entry.name, entry.uri);
        }
    }
}

pub fn schemas_cmd(output: &OutputArgs) -> i32 {
    let entries = bundled_schemas()
        .iter()
        .map(|schema| {
            let matched = SpecVersion::ALL
                .into_iter()
                .map(dialect)
                .find(|d| d.meta_schema_uri == schema.uri);
            SchemaEntry {
                name: schema.name,
                uri: schema.uri,
                version: matched.map(|d| d.version.as_str()),
                formats: matched.map(|d| d.formats.names().collect()).unwrap_or_default(),
            }
        })
        .collect();

    print_result(output.format, output.quiet, &SchemaList(entries));
    exit_codes::SUCCESS
}
