//! Models shared by every stage of the claim pipeline

pub mod bundle;
pub mod complex;
pub mod error;
pub mod node;
pub mod resource;

// Re-export commonly used types
pub use bundle::*;
pub use complex::*;
pub use error::{Error, Result};
pub use node::*;
pub use resource::*;
