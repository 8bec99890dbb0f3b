//! Error types for claim projection and review actions

use crate::gate::{BlockReason, Track};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Resolution error: {0}")]
    Resolve(#[from] claimdesk_resolve::Error),

    #[error("Model error: {0}")]
    Model(#[from] claimdesk_models::Error),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("{track} review cannot be actioned: {reason}")]
    ActionBlocked { track: Track, reason: BlockReason },

    #[error("Request {0} is no longer pending")]
    NotActionable(String),

    #[error("Request not found: {0}")]
    NotFound(String),

    #[error("Collaborator error: {0}")]
    Collaborator(String),
}
