//! `$ref` resolution over an arena of documents.
//!
//! Every document the resolver knows about (the root, bundled meta-schemas,
//! anything fetched through the [`Loader`]) lives in one arena slot addressed
//! by [`DocId`]. A schema node is identified by `(DocId, pointer)`, which lets
//! recursive schema graphs be walked without owning cycles.
//!
//! A resolver is created per validation call; its cache of fetched documents
//! is never shared between calls.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::error::{LoadError, ResolveError};
use crate::loader::Loader;
use crate::pointer::JsonPointer;

/// Base assigned to documents validated without a location.
pub const ANONYMOUS_BASE: &str = "urn:oasval:document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(usize);

/// Target of a resolved reference. Never itself a `$ref` node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub doc: DocId,
    pub pointer: JsonPointer,
}

struct Entry {
    uri: Url,
    root: Arc<Value>,
}

pub struct Resolver<'l> {
    loader: &'l dyn Loader,
    documents: Vec<Entry>,
    by_uri: HashMap<String, DocId>,
    failed: HashMap<String, LoadError>,
    stack: Vec<(DocId, String)>,
    fetches: usize,
}

impl<'l> Resolver<'l> {
    pub fn new(loader: &'l dyn Loader) -> Self {
        Self {
            loader,
            documents: Vec::new(),
            by_uri: HashMap::new(),
            failed: HashMap::new(),
            stack: Vec::new(),
            fetches: 0,
        }
    }

    /// Registers an already-parsed document under `uri` (fragment ignored).
    /// Registering the same uri twice replaces the earlier tree.
    pub fn add_document(&mut self, mut uri: Url, root: Arc<Value>) -> DocId {
        uri.set_fragment(None);
        if let Some(&id) = self.by_uri.get(uri.as_str()) {
            self.documents[id.0].root = root;
            return id;
        }
        let id = DocId(self.documents.len());
        self.by_uri.insert(uri.as_str().to_string(), id);
        self.documents.push(Entry { uri, root });
        id
    }

    pub fn uri(&self, doc: DocId) -> &Url {
        &self.documents[doc.0].uri
    }

    pub fn document(&self, doc: DocId) -> Arc<Value> {
        Arc::clone(&self.documents[doc.0].root)
    }

    pub fn lookup_uri(&self, uri: &str) -> Option<DocId> {
        self.by_uri.get(uri.trim_end_matches('#')).copied()
    }

    /// Number of documents fetched through the loader so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches
    }

    /// Resolves `reference` relative to the document `from`, following chains
    /// of `$ref`-only nodes until a concrete node is reached.
    pub fn resolve(&mut self, from: DocId, reference: &str) -> Result<Resolved, ResolveError> {
        self.stack.clear();
        let result = self.resolve_chain(from, reference);
        self.stack.clear();
        result
    }

    fn resolve_chain(&mut self, from: DocId, reference: &str) -> Result<Resolved, ResolveError> {
        let (target, fragment) = self.split(from, reference)?;
        let doc = self.document_for(target, reference)?;

        let pointer = JsonPointer::parse(&fragment).map_err(|e| ResolveError::InvalidReference {
            reference: reference.to_string(),
            message: e.to_string(),
        })?;

        let key = (doc, pointer.as_str().to_string());
        if self.stack.contains(&key) {
            return Err(ResolveError::CircularReference {
                reference: reference.to_string(),
            });
        }
        self.stack.push(key);

        let root = self.document(doc);
        let node = pointer
            .lookup(&root)
            .map_err(|segment| ResolveError::PointerNotFound {
                reference: reference.to_string(),
                segment,
            })?;

        match node.get("$ref").and_then(Value::as_str) {
            Some(next) if node.is_object() => self.resolve_chain(doc, next),
            _ => Ok(Resolved { doc, pointer }),
        }
    }

    fn split(&self, from: DocId, reference: &str) -> Result<(Url, String), ResolveError> {
        let invalid = |message: String| ResolveError::InvalidReference {
            reference: reference.to_string(),
            message,
        };

        let (uri_part, fragment) = reference.split_once('#').unwrap_or((reference, ""));
        let fragment = urlencoding::decode(fragment).map_err(|e| invalid(e.to_string()))?;

        let base = self.uri(from);
        let mut target = if uri_part.is_empty() {
            base.clone()
        } else {
            base.join(uri_part).map_err(|e| {
                invalid(format!("cannot resolve against base '{base}': {e}"))
            })?
        };
        target.set_fragment(None);
        Ok((target, fragment.into_owned()))
    }

    fn document_for(&mut self, target: Url, reference: &str) -> Result<DocId, ResolveError> {
        if let Some(&id) = self.by_uri.get(target.as_str()) {
            tracing::trace!(uri = %target, "document cache hit");
            return Ok(id);
        }

        let unresolvable = |source: LoadError| ResolveError::ReferenceUnresolvable {
            reference: reference.to_string(),
            source,
        };
        if let Some(err) = self.failed.get(target.as_str()) {
            return Err(unresolvable(err.clone()));
        }

        tracing::debug!(uri = %target, "fetching external document");
        self.fetches += 1;
        match self.loader.load(&target) {
            Ok(root) => Ok(self.add_document(target, Arc::new(root))),
            Err(err) => {
                self.failed.insert(target.as_str().to_string(), err.clone());
                Err(unresolvable(err))
            }
        }
    }
}
