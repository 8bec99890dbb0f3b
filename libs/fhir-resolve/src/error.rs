//! Error types for bundle resolution

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Reference resolution exceeded maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    #[error("Model error: {0}")]
    Model(#[from] claimdesk_models::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
