use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: Value,
    pub format: DocumentFormat,
}

/// Parses JSON or YAML into the in-memory tree shared by both formats.
/// Duplicate mapping keys are rejected in both formats.
pub fn parse_document_str(input: &str, format: DocumentFormat) -> Result<ParsedDocument, ParseError> {
    match format {
        DocumentFormat::Json => Ok(ParsedDocument {
            document: json_to_value(input)?,
            format,
        }),
        DocumentFormat::Yaml => Ok(ParsedDocument {
            document: yaml_to_value(input)?,
            format,
        }),
        DocumentFormat::Auto => parse_document_auto(input),
    }
}

fn json_to_value(input: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str::<StrictValue>(input).map(|v| v.0)
}

/// A JSON tree that refuses repeated keys within one object.
struct StrictValue(Value);

impl<'de> Deserialize<'de> for StrictValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(StrictVisitor).map(StrictValue)
    }
}

struct StrictVisitor;

impl<'de> Visitor<'de> for StrictVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Number::from_f64(v)
            .map(Value::Number)
            .ok_or_else(|| E::custom("non-finite number"))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(StrictValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
        let mut map = Map::new();
        while let Some(key) = access.next_key::<String>()? {
            if map.contains_key(&key) {
                return Err(de::Error::custom(format!("duplicate key '{key}'")));
            }
            let StrictValue(value) = access.next_value()?;
            map.insert(key, value);
        }
        Ok(Value::Object(map))
    }
}

fn yaml_to_value(input: &str) -> Result<Value, ParseError> {
    let yaml = serde_yaml::from_str::<serde_yaml::Value>(input)?;
    // Non-string scalar keys (e.g. `200:`) become their string form.
    Ok(serde_json::to_value(yaml)?)
}

fn parse_document_auto(input: &str) -> Result<ParsedDocument, ParseError> {
    // JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return match json_to_value(input) {
            Ok(document) => Ok(ParsedDocument {
                document,
                format: DocumentFormat::Json,
            }),
            Err(e) => match yaml_to_value(input) {
                Ok(document) => Ok(ParsedDocument {
                    document,
                    format: DocumentFormat::Yaml,
                }),
                Err(_) => Err(ParseError::Json(e)),
            },
        };
    }

    match yaml_to_value(input) {
        Ok(document) => Ok(ParsedDocument {
            document,
            format: DocumentFormat::Yaml,
        }),
        Err(e) => {
            if let Ok(document) = json_to_value(input) {
                return Ok(ParsedDocument {
                    document,
                    format: DocumentFormat::Json,
                });
            }
            Err(e)
        }
    }
}
