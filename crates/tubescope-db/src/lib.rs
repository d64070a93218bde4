//! Tubescope Database Layer
//!
//! MySQL access for the crawler-owned tables: channel snapshots, videos and
//! search keywords. Every query is parameterized; the only SQL text built at
//! runtime is the ORDER BY clause, and that comes from closed enums.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tubescope_common::Config;
//! use tubescope_db::{Database, KeywordRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let db = Arc::new(Database::connect(&config.database).await?);
//!
//!     let keywords = KeywordRepository::new(db);
//!     let id = keywords.create("home workout").await?;
//!     println!("created keyword {}", id);
//!     Ok(())
//! }
//! ```

pub mod channels;
pub mod database;
pub mod error;
pub mod keywords;
pub mod stats;
pub mod videos;

pub use channels::{BlacklistOutcome, ChannelRepository, ChannelSearch};
pub use database::Database;
pub use error::{DbError, Result};
pub use keywords::KeywordRepository;
pub use stats::StatsRepository;
pub use videos::{GroupedWindow, VideoFilter, VideoRepository};
