use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use crate::error::{ResolveError, Violation};
use crate::pointer::Location;
use crate::resolver::{DocId, Resolver};
use crate::schema::format::FormatSet;
use crate::schema::pattern::Pattern;

/// Recursive JSON-Schema (draft-04 dialect) evaluator.
///
/// Violations are accumulated into a caller-owned vector; a failing keyword
/// never stops evaluation of its siblings. `$ref` is followed through the
/// [`Resolver`], and a `(target, document location)` pair that is re-entered
/// before it finishes is reported instead of recursed into.
pub struct SchemaValidator<'r, 'l> {
    resolver: &'r mut Resolver<'l>,
    formats: FormatSet,
    patterns: HashMap<String, Option<Pattern>>,
    active: HashSet<(DocId, String, Location)>,
}

impl<'r, 'l> SchemaValidator<'r, 'l> {
    pub fn new(resolver: &'r mut Resolver<'l>, formats: FormatSet) -> Self {
        Self {
            resolver,
            formats,
            patterns: HashMap::new(),
            active: HashSet::new(),
        }
    }

    /// Validates `instance` against the root of document `schema_doc`.
    ///
    /// Fails only when the root itself is unusable as a schema.
    pub fn validate_root(&mut self, instance: &Value, schema_doc: DocId) -> Result<Vec<Violation>, ResolveError> {
        let root = self.resolver.document(schema_doc);
        if !matches!(&*root, Value::Object(_) | Value::Bool(_)) {
            return Err(ResolveError::InvalidReference {
                reference: self.resolver.uri(schema_doc).to_string(),
                message: format!("schema root must be an object, found {}", kind(&root)),
            });
        }
        if let Some(reference) = root.get("$ref").and_then(Value::as_str) {
            // A root that is only a reference must resolve up front.
            self.resolver.resolve(schema_doc, reference)?;
        }
        Ok(self.validate(instance, &root, schema_doc, &Location::root(), &Location::root()))
    }

    /// Validates `instance` (found at `path`) against `schema` (found at
    /// `schema_path` inside document `scope`).
    pub fn validate(
        &mut self,
        instance: &Value,
        schema: &Value,
        scope: DocId,
        path: &Location,
        schema_path: &Location,
    ) -> Vec<Violation> {
        let mut out = Vec::new();
        self.descend(instance, schema, scope, path, schema_path, &mut out);
        out
    }

    pub(crate) fn descend(
        &mut self,
        instance: &Value,
        schema: &Value,
        scope: DocId,
        path: &Location,
        schema_path: &Location,
        out: &mut Vec<Violation>,
    ) {
        let map = match schema {
            Value::Object(map) => map,
            Value::Bool(true) => return,
            Value::Bool(false) => {
                out.push(Violation::new(
                    path.clone(),
                    schema_path.clone(),
                    "false",
                    format!("{} is not allowed here", short(instance)),
                ));
                return;
            }
            other => {
                out.push(malformed(
                    path,
                    schema_path,
                    "schema",
                    format!("schema must be an object, found {}", kind(other)),
                ));
                return;
            }
        };

        // Siblings of `$ref` are ignored.
        if let Some(reference) = map.get("$ref") {
            let ref_path = schema_path.key("$ref");
            match reference.as_str() {
                Some(r) => self.follow_ref(instance, scope, r, path, &ref_path, out),
                None => out.push(malformed(path, &ref_path, "$ref", "$ref must be a string")),
            }
            return;
        }

        let ctx = Ctx {
            map,
            scope,
            path,
            schema_path,
        };
        self.check_type(instance, &ctx, out);
        self.check_enum(instance, &ctx, out);
        if let Value::Object(obj) = instance {
            self.check_required(obj, &ctx, out);
            self.check_property_counts(obj, &ctx, out);
            self.check_properties(obj, &ctx, out);
            self.check_dependencies(instance, obj, &ctx, out);
        }
        if let Value::Array(items) = instance {
            self.check_items(items, &ctx, out);
            self.check_item_counts(items, &ctx, out);
        }
        if let Value::String(s) = instance {
            self.check_string(s, &ctx, out);
        }
        self.check_format(instance, &ctx, out);
        if instance.is_number() {
            self.check_numeric(instance, &ctx, out);
        }
        self.check_all_of(instance, &ctx, out);
        self.check_any_of(instance, &ctx, out);
        self.check_one_of(instance, &ctx, out);
        self.check_not(instance, &ctx, out);
    }

    fn follow_ref(
        &mut self,
        instance: &Value,
        scope: DocId,
        reference: &str,
        path: &Location,
        schema_path: &Location,
        out: &mut Vec<Violation>,
    ) {
        let target = match self.resolver.resolve(scope, reference) {
            Ok(target) => target,
            Err(err) => {
                tracing::debug!(reference, error = %err, "schema reference not resolved");
                out.push(Violation::unresolved(path.clone(), schema_path.clone(), err));
                return;
            }
        };

        let key = (target.doc, target.pointer.as_str().to_string(), path.clone());
        if !self.active.insert(key.clone()) {
            out.push(Violation::unresolved(
                path.clone(),
                schema_path.clone(),
                ResolveError::CircularReference {
                    reference: reference.to_string(),
                },
            ));
            return;
        }

        let document = self.resolver.document(target.doc);
        match target.pointer.lookup(&document) {
            Ok(node) => self.descend(instance, node, target.doc, path, schema_path, out),
            Err(segment) => out.push(Violation::unresolved(
                path.clone(),
                schema_path.clone(),
                ResolveError::PointerNotFound {
                    reference: reference.to_string(),
                    segment,
                },
            )),
        }
        self.active.remove(&key);
    }

    /// Unanchored search with `pattern`; `None` when it does not compile.
    pub(crate) fn pattern_matches(&mut self, pattern: &str, text: &str) -> Option<bool> {
        self.patterns
            .entry(pattern.to_string())
            .or_insert_with(|| Pattern::compile(pattern))
            .as_ref()
            .map(|re| re.is_match(text))
    }

    pub(crate) fn formats(&self) -> FormatSet {
        self.formats
    }
}

/// The schema node currently being applied.
pub(crate) struct Ctx<'a> {
    pub map: &'a Map<String, Value>,
    pub scope: DocId,
    pub path: &'a Location,
    pub schema_path: &'a Location,
}

impl Ctx<'_> {
    pub fn at(&self, keyword: &str) -> Location {
        self.schema_path.key(keyword)
    }

    pub fn violation(&self, keyword: &str, message: impl Into<String>) -> Violation {
        Violation::new(self.path.clone(), self.at(keyword), keyword, message)
    }

    pub fn malformed(&self, keyword: &str, message: impl Into<String>) -> Violation {
        malformed(self.path, &self.at(keyword), keyword, message)
    }
}

fn malformed(path: &Location, schema_path: &Location, keyword: &str, message: impl Into<String>) -> Violation {
    Violation::new(
        path.clone(),
        schema_path.clone(),
        keyword,
        format!("invalid schema: {}", message.into()),
    )
}

pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Compact rendering of a value for messages.
pub(crate) fn short(value: &Value) -> String {
    const LIMIT: usize = 60;
    let rendered = value.to_string();
    if rendered.chars().count() <= LIMIT {
        rendered
    } else {
        let cut: String = rendered.chars().take(LIMIT).collect();
        format!("{cut}...")
    }
}
