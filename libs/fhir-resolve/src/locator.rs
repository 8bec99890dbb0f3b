//! Resource lookup by kind
//!
//! A missing kind is `Ok(None)`, never an error: claim bundles routinely
//! leave out one of the satellite resources.

use crate::error::Result;
use crate::resolver::BundleResolver;
use claimdesk_models::{Bundle, ResourceKind, TypedResource};
use serde_json::Value;

impl<'a> BundleResolver<'a> {
    /// First entry whose resource is of `kind`, fully dereferenced
    pub fn locate(&self, kind: &ResourceKind) -> Result<Option<Value>> {
        let Some(resource) = self
            .bundle
            .find_kind(kind)
            .and_then(|entry| entry.resource.as_ref())
        else {
            tracing::debug!(kind = %kind, "Resource kind not present in bundle");
            return Ok(None);
        };
        self.resolve_value(resource)
    }

    /// First of `kinds`, in priority order, that the bundle contains
    pub fn locate_first(&self, kinds: &[ResourceKind]) -> Result<Option<Value>> {
        for kind in kinds {
            if self.bundle.find_kind(kind).is_some() {
                return self.locate(kind);
            }
        }
        Ok(None)
    }

    /// Locate and deserialize into a typed projection
    pub fn locate_as<T: TypedResource>(&self) -> Result<Option<T>> {
        match self.locate_first(T::kinds())? {
            Some(value) => Ok(Some(T::from_resolved(&value)?)),
            None => Ok(None),
        }
    }
}

/// One-shot lookup with the default depth ceiling
pub fn locate(bundle: &Bundle, kind: &ResourceKind) -> Result<Option<Value>> {
    BundleResolver::new(bundle).locate(kind)
}
