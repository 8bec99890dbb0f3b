//! `claimdesk` command-line review desk
//!
//! Loads request lists from JSON files, projects them into claim views and
//! drives the medical/financial review flow against an in-memory payer.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use cli::{Cli, Command};
pub use config::Config;
