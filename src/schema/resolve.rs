//! Reference Resolver: local `$ref` pointers into one schema document.
use std::collections::HashMap;
use std::sync::Arc;

use super::{SchemaDocument, SchemaKind, SchemaNode};
use crate::error::SchemaError;

/// Outcome of following a `$ref` to a node that is not itself a reference.
#[derive(Debug, Clone)]
pub struct ResolvedRef {
    /// Where the chain of references ended up.
    pub target: String,
    pub node: Arc<SchemaNode>,
}

pub struct RefResolver<'a> {
    document: &'a SchemaDocument,
    cache: HashMap<String, ResolvedRef>,
}

impl<'a> RefResolver<'a> {
    pub fn new(document: &'a SchemaDocument) -> Self {
        Self { document, cache: HashMap::new() }
    }

    /// Follow `pointer` (and any reference it lands on) to a concrete node.
    ///
    /// Only same-document fragments (`#`, `#/definitions/x`, ...) resolve.
    pub fn resolve(&mut self, pointer: &str) -> Result<ResolvedRef, SchemaError> {
        if let Some(hit) = self.cache.get(pointer) {
            return Ok(hit.clone());
        }

        let mut chain = vec![pointer.to_string()];
        let mut current = pointer.to_string();
        let node = loop {
            let node = self.parse(&current)?;
            match &node.kind {
                SchemaKind::Reference(next) => {
                    if chain.iter().any(|seen| seen == next) {
                        chain.push(next.clone());
                        return Err(SchemaError::CyclicRef { pointer: pointer.to_string(), chain });
                    }
                    tracing::debug!(from = %current, to = %next, "following reference");
                    chain.push(next.clone());
                    current = next.clone();
                }
                _ => break node,
            }
        };

        let resolved = ResolvedRef {
            target: current,
            node: Arc::new(node),
        };
        self.cache.insert(pointer.to_string(), resolved.clone());
        Ok(resolved)
    }

    /// Parse the node at `pointer` without following references.
    pub fn parse(&self, pointer: &str) -> Result<SchemaNode, SchemaError> {
        let unresolved = || SchemaError::UnresolvedRef { pointer: pointer.to_string() };
        let fragment = pointer.strip_prefix('#').ok_or_else(unresolved)?;
        if !fragment.is_empty() && !fragment.starts_with('/') {
            return Err(unresolved());
        }
        let value = self.document.root().pointer(fragment).ok_or_else(unresolved)?;
        SchemaNode::parse_at(value, fragment)
    }
}
