//! Bundle reference resolution
//!
//! Claim exchange bundles link their resources with `Reference.reference`
//! strings that name another entry's `fullUrl`. This crate replaces those
//! pointers with the resources they name, producing a fully dereferenced copy,
//! and looks up entries by resource kind.
//!
//! # Example
//!
//! ```rust
//! use claimdesk_models::{Bundle, ResourceKind};
//! use claimdesk_resolve::BundleResolver;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let bundle = Bundle::from_value(&json!({
//!     "resourceType": "Bundle",
//!     "entry": [
//!         {
//!             "fullUrl": "Coverage/C1",
//!             "resource": {
//!                 "resourceType": "Coverage",
//!                 "subscriber": { "reference": "Patient/P1" }
//!             }
//!         },
//!         {
//!             "fullUrl": "Patient/P1",
//!             "resource": { "resourceType": "Patient", "gender": "female" }
//!         }
//!     ]
//! }))?;
//!
//! let resolver = BundleResolver::new(&bundle);
//! let coverage = resolver.locate(&ResourceKind::Coverage)?.unwrap();
//! assert_eq!(coverage["subscriber"]["gender"], "female");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod locator;
pub mod resolver;

pub use error::{Error, Result};
pub use locator::locate;
pub use resolver::{BundleResolver, DEFAULT_MAX_DEPTH};
