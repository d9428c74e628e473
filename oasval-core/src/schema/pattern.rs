use regex::Regex;

/// A compiled `pattern` / `patternProperties` expression.
///
/// Most patterns compile with the linear-time `regex` engine. Those using
/// look-around or backreferences fall back to the backtracking engine.
#[derive(Debug)]
pub(crate) enum Pattern {
    Linear(Regex),
    Backtracking(fancy_regex::Regex),
}

impl Pattern {
    pub(crate) fn compile(source: &str) -> Option<Self> {
        match Regex::new(source) {
            Ok(re) => Some(Pattern::Linear(re)),
            Err(_) => fancy_regex::Regex::new(source).ok().map(Pattern::Backtracking),
        }
    }

    /// Unanchored search.
    pub(crate) fn is_match(&self, text: &str) -> bool {
        match self {
            Pattern::Linear(re) => re.is_match(text),
            Pattern::Backtracking(re) => re.is_match(text).unwrap_or_else(|err| {
                // Backtrack limit hit; the text is not held against the schema.
                tracing::warn!(pattern = re.as_str(), error = %err, "pattern evaluation aborted");
                true
            }),
        }
    }
}
