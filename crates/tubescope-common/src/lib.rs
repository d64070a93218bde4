//! tubescope-common: Shared types, errors, and configuration used across all Tubescope crates.

pub mod config;
pub mod error;
pub mod listing;
pub mod models;

pub use config::Config;
pub use error::{ApiError, Result, TubescopeError};
