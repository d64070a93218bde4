//! tubescope-web: Web dashboard for Tubescope
//! Serves the JSON API and server-rendered pages for:
//!   - Channel search, history and benchmark / blacklist flags
//!   - Video listings, flat and grouped by channel
//!   - Search keyword management with tag clouds
//!   - Dashboard counters
//!   - Live toast notifications over SSE

pub mod charts;
pub mod format;
pub mod handlers;
pub mod render;
pub mod router;
pub mod sse;
pub mod state;
pub mod tag_cloud;
