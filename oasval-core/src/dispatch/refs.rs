use std::collections::HashSet;

use serde_json::Value;

use crate::error::Violation;
use crate::pointer::Location;
use crate::resolver::{DocId, Resolver};
use crate::version::SpecVersion;

/// Fields whose value maps user-chosen names to objects. A key inside them is
/// a name, never a payload field, so `properties.example` is still a schema.
const NAME_MAPS: &[&str] = &[
    "paths",
    "definitions",
    "parameters",
    "responses",
    "securityDefinitions",
    "properties",
    "patternProperties",
    "dependencies",
    "schemas",
    "headers",
    "requestBodies",
    "securitySchemes",
    "links",
    "callbacks",
    "content",
    "encoding",
];

/// What the mapping being walked is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    /// An object with fixed field names (schema, operation, response...).
    Fields,
    /// A map keyed by user-chosen names.
    Names,
    /// OpenAPI 3 `examples`: names to Example Objects.
    ExampleSet,
    /// An Example Object, whose `value` is a literal payload.
    Example,
}

impl Node {
    fn holds_reference(self) -> bool {
        matches!(self, Node::Fields | Node::Example)
    }
}

/// Resolves every `$ref` found in document `root`.
///
/// Each failure becomes one violation at the mapping that holds the `$ref`.
/// Literal payloads (`example`, `examples`, `default`, `enum` and `x-*`
/// extensions) are user data and are not searched. Targets in other
/// documents are walked for nested references, and their failures are
/// charged to the root location that led there.
pub(crate) fn check_document_refs(resolver: &mut Resolver<'_>, root: DocId, version: SpecVersion) -> Vec<Violation> {
    let mut checker = RefChecker {
        resolver,
        root,
        version,
        visited: HashSet::new(),
        out: Vec::new(),
    };
    let document = checker.resolver.document(root);
    checker.walk(root, &document, Node::Fields, &Location::root(), None);
    checker.out
}

struct RefChecker<'r, 'l> {
    resolver: &'r mut Resolver<'l>,
    root: DocId,
    version: SpecVersion,
    visited: HashSet<(DocId, String)>,
    out: Vec<Violation>,
}

impl RefChecker<'_, '_> {
    /// The kind of the value stored under `key` in a `parent` mapping, or
    /// `None` when that value is a literal payload.
    fn child(&self, parent: Node, key: &str) -> Option<Node> {
        match parent {
            Node::Names => return Some(Node::Fields),
            Node::ExampleSet => return Some(Node::Example),
            Node::Example if key == "value" => return None,
            Node::Fields | Node::Example => {}
        }
        match key {
            "example" | "default" | "enum" => None,
            _ if key.starts_with("x-") => None,
            "examples" => match self.version {
                SpecVersion::V2 => None,
                SpecVersion::V30 => Some(Node::ExampleSet),
            },
            _ if NAME_MAPS.contains(&key) => Some(Node::Names),
            _ => Some(Node::Fields),
        }
    }

    /// `origin` is `None` while walking the root document itself.
    fn walk(&mut self, doc: DocId, node: &Value, kind: Node, at: &Location, origin: Option<&Location>) {
        match node {
            Value::Object(map) => {
                if kind.holds_reference() {
                    if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                        self.check(doc, reference, origin.unwrap_or(at));
                    }
                }
                for (key, child) in map {
                    if let Some(child_kind) = self.child(kind, key) {
                        self.walk(doc, child, child_kind, &at.key(key.as_str()), origin);
                    }
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    self.walk(doc, child, Node::Fields, &at.index(i), origin);
                }
            }
            _ => {}
        }
    }

    fn check(&mut self, from: DocId, reference: &str, origin: &Location) {
        let target = match self.resolver.resolve(from, reference) {
            Ok(target) => target,
            Err(err) => {
                tracing::warn!(location = %origin, error = %err.detail(), "unresolvable $ref in document");
                self.out
                    .push(Violation::unresolved(origin.clone(), Location::root(), err));
                return;
            }
        };

        // The root document is walked in full already.
        if target.doc == self.root {
            return;
        }
        if !self.visited.insert((target.doc, target.pointer.as_str().to_string())) {
            return;
        }
        let document = self.resolver.document(target.doc);
        if let Ok(node) = target.pointer.lookup(&document) {
            let at: Location = target.pointer.tokens().collect();
            let kind = match target.pointer.tokens().last() {
                Some(last) if NAME_MAPS.contains(&last.as_str()) => Node::Names,
                _ => Node::Fields,
            };
            self.walk(target.doc, node, kind, &at, Some(origin));
        }
    }
}
