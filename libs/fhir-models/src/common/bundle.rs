//! FHIR Bundle model
//!
//! Version-agnostic model for the collection Bundles exchanged with claim,
//! preauth and coverage eligibility requests.

use super::complex::Identifier;
use super::error::{Error, Result};
use super::resource::ResourceKind;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// FHIR Bundle resource
///
/// A container for a root request resource and the satellite resources it
/// points at through `Reference.reference` strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type - always "Bundle"
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    /// Logical id of this artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Persistent identifier for the bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    /// Indicates the purpose of this bundle - how it was intended to be used
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<BundleType>,

    /// When the bundle was assembled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Entry in the bundle - will have a resource or information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<BundleEntry>>,

    /// Additional content beyond core fields (meta, signature, extensions)
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

fn default_resource_type() -> String {
    "Bundle".to_string()
}

/// Type of Bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    /// Document Bundle - A set of resources composing a single coherent document
    Document,
    /// Message Bundle - A message (application/response or application/request)
    Message,
    /// Transaction Bundle - A transaction - intended to be processed atomically
    Transaction,
    /// Batch Bundle - A set of resources collected for a specific purpose
    Batch,
    /// Search Results Bundle - Results of a search operation
    Searchset,
    /// Collection Bundle - A set of resources collected for a specific purpose
    Collection,
}

/// Entry in the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    /// Full URL for the entry; the key other resources reference it by
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    /// A resource in this bundle
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    /// Additional content beyond core fields
    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl BundleEntry {
    /// The `resourceType` tag of the embedded resource
    pub fn resource_type(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.get("resourceType"))
            .and_then(Value::as_str)
    }

    /// Whether the embedded resource is of the given kind
    pub fn is_kind(&self, kind: &ResourceKind) -> bool {
        self.resource_type() == Some(kind.as_str())
    }
}

impl Bundle {
    /// Parse from JSON Value
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(Error::from)
    }

    /// Convert to JSON Value
    pub fn to_value(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }

    /// Get entries as a slice
    pub fn entries(&self) -> &[BundleEntry] {
        self.entry.as_deref().unwrap_or(&[])
    }

    /// First entry whose resource is of the given kind
    pub fn find_kind(&self, kind: &ResourceKind) -> Option<&BundleEntry> {
        self.entries().iter().find(|e| e.is_kind(kind))
    }

    /// Kind of the first entry's resource, which for request bundles is the
    /// root resource
    pub fn root_kind(&self) -> Option<ResourceKind> {
        self.entries()
            .first()
            .and_then(BundleEntry::resource_type)
            .map(ResourceKind::from)
    }

    /// The business identifier value (`identifier.value`)
    pub fn identifier_value(&self) -> Option<&str> {
        self.identifier.as_ref().and_then(|i| i.value.as_deref())
    }

    /// Parsed assembly timestamp
    ///
    /// Returns `Ok(None)` when the bundle carries no timestamp.
    pub fn parsed_timestamp(&self) -> Result<Option<DateTime<FixedOffset>>> {
        match &self.timestamp {
            None => Ok(None),
            Some(ts) => DateTime::parse_from_rfc3339(ts).map(Some).map_err(|e| {
                Error::InvalidFieldValue(format!("Bundle.timestamp '{}': {}", ts, e))
            }),
        }
    }

    /// `fullUrl` values that occur on more than one entry
    pub fn duplicate_full_urls(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for url in self.entries().iter().filter_map(|e| e.full_url.as_deref()) {
            if !seen.insert(url) && !duplicates.contains(&url) {
                duplicates.push(url);
            }
        }
        duplicates
    }
}
