//! FHIR data models for claim exchange bundles
//!
//! This crate provides the Rust structures the claim pipeline works on.
//!
//! # Module Organization
//!
//! - `common`: Bundle container, complex datatypes, the resource kinds a claim
//!   bundle carries, and the typed [`Node`] tree used for reference resolution
//!
//! # Design Philosophy
//!
//! - **Lenient**: every field a producer may leave out is optional; unknown
//!   content lands in a flattened `extensions` map instead of failing
//! - **Typed where it matters**: the fields the claim view reads are typed,
//!   the rest stays as `serde_json::Value`
//! - **Reference-aware**: [`Node`] distinguishes reference objects from plain
//!   objects so resolvers can match on them exhaustively
//!
//! # Example
//!
//! ```rust
//! use claimdesk_models::common::{Bundle, Node, ResourceKind};
//! use serde_json::json;
//!
//! let bundle: Bundle = serde_json::from_value(json!({
//!     "resourceType": "Bundle",
//!     "type": "collection",
//!     "entry": [
//!         {
//!             "fullUrl": "Patient/P1",
//!             "resource": { "resourceType": "Patient", "id": "P1" }
//!         }
//!     ]
//! }))
//! .unwrap();
//!
//! let entry = bundle.find_kind(&ResourceKind::Patient).unwrap();
//! assert_eq!(entry.full_url.as_deref(), Some("Patient/P1"));
//!
//! let node = Node::from_value(&json!({ "reference": "Patient/P1" }));
//! assert!(matches!(node, Node::Reference(_)));
//! ```

pub mod common;

// Re-export commonly used types
pub use common::*;
