use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPointer {
    raw: String,
}

impl JsonPointer {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Accepts `""` (whole document) or an RFC 6901 pointer starting with `/`.
    pub fn parse(fragment: &str) -> Result<Self, JsonPointerError> {
        if fragment.is_empty() {
            return Ok(Self {
                raw: fragment.to_string(),
            });
        }
        if !fragment.starts_with('/') {
            return Err(JsonPointerError::InvalidPrefix);
        }

        let mut chars = fragment.chars().peekable();
        while let Some(ch) = chars.next() {
            if ch == '~' {
                match chars.next() {
                    Some('0' | '1') => {}
                    _ => return Err(JsonPointerError::InvalidEscape),
                }
            }
        }

        Ok(Self {
            raw: fragment.to_string(),
        })
    }

    /// Decoded reference tokens, in order.
    pub fn tokens(&self) -> impl Iterator<Item = String> + '_ {
        self.raw
            .split('/')
            .skip(1)
            .map(decode_token)
    }

    /// Walks the pointer through `root`. On failure returns the first token
    /// that could not be followed.
    pub fn lookup<'v>(&self, root: &'v Value) -> Result<&'v Value, String> {
        let mut node = root;
        for token in self.tokens() {
            node = match node {
                Value::Object(map) => map.get(&token),
                Value::Array(items) => parse_index(&token).and_then(|i| items.get(i)),
                _ => None,
            }
            .ok_or(token)?;
        }
        Ok(node)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonPointerError {
    #[error("json pointer must start with '/'")]
    InvalidPrefix,
    #[error("json pointer contains invalid escape (only ~0 and ~1 are allowed)")]
    InvalidEscape,
}

fn parse_index(token: &str) -> Option<usize> {
    // RFC 6901: no leading zeros, no sign.
    if token.is_empty() || (token.len() > 1 && token.starts_with('0')) {
        return None;
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

pub fn decode_token(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

pub fn escape_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(&escape_token(k)),
            PathSegment::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Path of a node from its document root. Renders as a JSON pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location(Vec<PathSegment>);

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Key(key.into()));
        next
    }

    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }

    pub fn to_pointer(&self) -> String {
        let mut out = String::new();
        for seg in &self.0 {
            out.push('/');
            out.push_str(&seg.to_string());
        }
        out
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.to_pointer())
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pointer())
    }
}

impl<S: Into<String>> FromIterator<S> for Location {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|k| PathSegment::Key(k.into())).collect())
    }
}
