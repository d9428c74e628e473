use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::schema::pattern::Pattern;

static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.?$")
        .expect("valid")
});
static REFERENCE_BASE: LazyLock<Url> =
    LazyLock::new(|| Url::parse("http://reference.invalid/").expect("valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    DateTime,
    Date,
    Email,
    Hostname,
    Ipv4,
    Ipv6,
    Uri,
    UriReference,
    Regex,
    Int32,
    Int64,
    Float,
    Double,
    Byte,
    Binary,
    Password,
    Uuid,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::DateTime => "date-time",
            Format::Date => "date",
            Format::Email => "email",
            Format::Hostname => "hostname",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Uri => "uri",
            Format::UriReference => "uri-reference",
            Format::Regex => "regex",
            Format::Int32 => "int32",
            Format::Int64 => "int64",
            Format::Float => "float",
            Format::Double => "double",
            Format::Byte => "byte",
            Format::Binary => "binary",
            Format::Password => "password",
            Format::Uuid => "uuid",
        }
    }

    /// Checks `instance`; values of a kind the format does not constrain pass.
    pub fn check(self, instance: &Value) -> bool {
        match (self, instance) {
            (Format::Int32, Value::Number(n)) => match n.as_i64() {
                Some(i) => i32::try_from(i).is_ok(),
                None => n.as_u64().is_none(),
            },
            (Format::Int64, Value::Number(n)) => n.as_i64().is_some() || n.as_u64().is_none(),
            (Format::Float | Format::Double, Value::Number(n)) => n.as_f64().is_some_and(f64::is_finite),
            (_, Value::String(s)) => self.check_str(s),
            _ => true,
        }
    }

    fn check_str(self, s: &str) -> bool {
        match self {
            Format::DateTime => chrono::DateTime::parse_from_rfc3339(s).is_ok(),
            Format::Date => s.len() == 10 && chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            Format::Email => s.contains('@'),
            Format::Hostname => s.len() <= 253 && HOSTNAME_RE.is_match(s),
            Format::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => s.parse::<Ipv6Addr>().is_ok(),
            Format::Uri => Url::parse(s).is_ok(),
            Format::UriReference => {
                !s.chars().any(|c| c.is_whitespace() || c.is_control())
                    && (Url::parse(s).is_ok() || REFERENCE_BASE.join(s).is_ok())
            }
            Format::Regex => Pattern::compile(s).is_some(),
            Format::Byte => base64::engine::general_purpose::STANDARD.decode(s).is_ok(),
            Format::Uuid => uuid::Uuid::parse_str(s).is_ok(),
            Format::Int32
            | Format::Int64
            | Format::Float
            | Format::Double
            | Format::Binary
            | Format::Password => true,
        }
    }
}

const COMMON: [Format; 14] = [
    Format::DateTime,
    Format::Email,
    Format::Hostname,
    Format::Ipv4,
    Format::Ipv6,
    Format::Uri,
    Format::Regex,
    Format::Int32,
    Format::Int64,
    Format::Float,
    Format::Double,
    Format::Byte,
    Format::Binary,
    Format::Password,
];

pub(crate) static V2_FORMATS: &[Format] = &COMMON;

pub(crate) static V30_FORMATS: LazyLock<Vec<Format>> = LazyLock::new(|| {
    let mut formats = COMMON.to_vec();
    formats.extend([Format::Date, Format::UriReference, Format::Uuid]);
    formats
});

/// The formats a dialect asserts. Names outside the set are ignored.
#[derive(Debug, Clone, Copy)]
pub struct FormatSet {
    formats: &'static [Format],
}

impl FormatSet {
    pub fn new(formats: &'static [Format]) -> Self {
        Self { formats }
    }

    pub fn none() -> Self {
        Self { formats: &[] }
    }

    pub fn v2() -> Self {
        Self::new(V2_FORMATS)
    }

    pub fn v30() -> Self {
        Self::new(V30_FORMATS.as_slice())
    }

    pub fn get(&self, name: &str) -> Option<Format> {
        self.formats.iter().copied().find(|f| f.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.iter().map(|f| f.name())
    }
}
