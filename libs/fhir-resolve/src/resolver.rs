//! Recursive-descent reference resolver over [`Node`] trees.
//!
//! A `Reference` node is replaced wholesale by the resource of the entry
//! whose `fullUrl` equals the reference string; the replacement is itself
//! resolved, so chains like `Claim -> Coverage -> Patient` come out fully
//! inlined. References that name no entry are dropped (property omitted,
//! array element omitted, `None` at the root) so a partial bundle still
//! projects.
//!
//! Every descent into an object, an array or a reference target counts one
//! level against `max_depth`. Bundles are expected to be acyclic; the ceiling
//! turns a cycle into [`Error::DepthExceeded`] instead of unbounded recursion.

use crate::error::{Error, Result};
use claimdesk_models::{Bundle, Node};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Default nesting ceiling, reference hops included
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Resolves references against the entries of one bundle
///
/// The bundle is borrowed, never modified; every resolution returns a new
/// JSON tree.
#[derive(Debug)]
pub struct BundleResolver<'a> {
    pub(crate) bundle: &'a Bundle,
    targets: HashMap<&'a str, Node>,
    max_depth: usize,
}

impl<'a> BundleResolver<'a> {
    pub fn new(bundle: &'a Bundle) -> Self {
        let duplicates = bundle.duplicate_full_urls();
        if !duplicates.is_empty() {
            tracing::warn!(
                bundle_id = ?bundle.id,
                duplicates = ?duplicates,
                "Bundle has duplicate fullUrl values, first entry wins"
            );
        }

        let mut targets = HashMap::new();
        for entry in bundle.entries() {
            if let (Some(url), Some(resource)) = (entry.full_url.as_deref(), &entry.resource) {
                targets
                    .entry(url)
                    .or_insert_with(|| Node::from_value(resource));
            }
        }

        Self {
            bundle,
            targets,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn bundle(&self) -> &'a Bundle {
        self.bundle
    }

    /// Whether `reference` names an entry of this bundle
    pub fn can_resolve(&self, reference: &str) -> bool {
        self.targets.contains_key(reference)
    }

    /// Resolve every reference in `node`
    ///
    /// Returns `Ok(None)` only when `node` itself is an unresolvable reference.
    pub fn resolve(&self, node: &Node) -> Result<Option<Value>> {
        self.resolve_at(node, 0)
    }

    /// Convenience wrapper over [`resolve`](Self::resolve) for raw JSON
    pub fn resolve_value(&self, value: &Value) -> Result<Option<Value>> {
        self.resolve(&Node::from_value(value))
    }

    fn resolve_at(&self, node: &Node, depth: usize) -> Result<Option<Value>> {
        if depth > self.max_depth {
            return Err(Error::DepthExceeded {
                limit: self.max_depth,
            });
        }

        match node {
            Node::Leaf(leaf) => Ok(Some(leaf.to_value())),
            Node::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    if let Some(value) = self.resolve_at(item, depth + 1)? {
                        out.push(value);
                    }
                }
                Ok(Some(Value::Array(out)))
            }
            Node::Object(fields) => {
                let mut out = Map::new();
                for (key, child) in fields {
                    if let Some(value) = self.resolve_at(child, depth + 1)? {
                        out.insert(key.clone(), value);
                    }
                }
                Ok(Some(Value::Object(out)))
            }
            Node::Reference(reference) => match self.targets.get(reference.reference.as_str()) {
                Some(target) => self.resolve_at(target, depth + 1),
                None => {
                    tracing::debug!(
                        reference = %reference.reference,
                        "Dropping reference with no matching bundle entry"
                    );
                    Ok(None)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdesk_models::contains_reference;
    use serde_json::json;

    fn bundle(entries: Value) -> Bundle {
        Bundle::from_value(&json!({"resourceType": "Bundle", "entry": entries})).unwrap()
    }

    #[test]
    fn leaves_pass_through() {
        let b = bundle(json!([]));
        let resolver = BundleResolver::new(&b);
        for value in [json!(1), json!("x"), json!(null), json!(true)] {
            assert_eq!(resolver.resolve_value(&value).unwrap(), Some(value));
        }
    }

    #[test]
    fn reference_is_replaced_not_merged() {
        let b = bundle(json!([
            {"fullUrl": "Organization/O1", "resource": {"resourceType": "Organization", "name": "Acme"}}
        ]));
        let resolver = BundleResolver::new(&b);
        let resolved = resolver
            .resolve_value(&json!({"provider": {"reference": "Organization/O1", "display": "old"}}))
            .unwrap()
            .unwrap();

        assert_eq!(
            resolved,
            json!({"provider": {"resourceType": "Organization", "name": "Acme"}})
        );
    }

    #[test]
    fn unresolvable_references_are_dropped() {
        let b = bundle(json!([
            {"fullUrl": "Patient/P1", "resource": {"resourceType": "Patient"}}
        ]));
        let resolver = BundleResolver::new(&b);

        let resolved = resolver
            .resolve_value(&json!({
                "enterer": {"reference": "http://abcd.com/Tmh01"},
                "payor": [{"reference": "Organization/missing"}, {"reference": "Patient/P1"}],
                "status": "active"
            }))
            .unwrap()
            .unwrap();

        assert_eq!(
            resolved,
            json!({"payor": [{"resourceType": "Patient"}], "status": "active"})
        );
        assert_eq!(
            resolver
                .resolve_value(&json!({"reference": "Patient/none"}))
                .unwrap(),
            None
        );
    }

    #[test]
    fn chained_references_are_fully_inlined() {
        let b = bundle(json!([
            {"fullUrl": "Claim/X", "resource": {"resourceType": "Claim", "insurance": {"reference": "Coverage/C1"}}},
            {"fullUrl": "Coverage/C1", "resource": {"resourceType": "Coverage", "subscriber": {"reference": "Patient/P1"}}},
            {"fullUrl": "Patient/P1", "resource": {"resourceType": "Patient", "id": "P1"}}
        ]));
        let resolver = BundleResolver::new(&b);
        let claim = resolver
            .resolve_value(b.entries()[0].resource.as_ref().unwrap())
            .unwrap()
            .unwrap();

        assert_eq!(claim["insurance"]["resourceType"], "Coverage");
        assert_eq!(claim["insurance"]["subscriber"]["id"], "P1");
        assert!(!contains_reference(&claim));
    }

    #[test]
    fn cycle_hits_depth_ceiling() {
        let b = bundle(json!([
            {"fullUrl": "A", "resource": {"resourceType": "Claim", "next": {"reference": "B"}}},
            {"fullUrl": "B", "resource": {"resourceType": "Coverage", "next": {"reference": "A"}}}
        ]));
        let resolver = BundleResolver::new(&b).with_max_depth(10);
        let err = resolver
            .resolve_value(&json!({"reference": "A"}))
            .unwrap_err();
        assert!(matches!(err, Error::DepthExceeded { limit: 10 }));
    }

    #[test]
    fn source_bundle_is_not_mutated() {
        let b = bundle(json!([
            {"fullUrl": "Claim/X", "resource": {"resourceType": "Claim", "patient": {"reference": "Patient/P1"}}},
            {"fullUrl": "Patient/P1", "resource": {"resourceType": "Patient"}}
        ]));
        let before = b.clone();
        let resolver = BundleResolver::new(&b);
        resolver
            .resolve_value(b.entries()[0].resource.as_ref().unwrap())
            .unwrap();
        assert_eq!(b, before);
    }

    #[test]
    fn first_duplicate_full_url_wins() {
        let b = bundle(json!([
            {"fullUrl": "Patient/P1", "resource": {"resourceType": "Patient", "id": "first"}},
            {"fullUrl": "Patient/P1", "resource": {"resourceType": "Patient", "id": "second"}}
        ]));
        let resolver = BundleResolver::new(&b);
        let resolved = resolver
            .resolve_value(&json!({"reference": "Patient/P1"}))
            .unwrap()
            .unwrap();
        assert_eq!(resolved["id"], "first");
        assert!(resolver.can_resolve("Patient/P1"));
        assert!(!resolver.can_resolve("Patient/P2"));
    }
}
