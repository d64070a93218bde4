//! Shared application state for the web server.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tubescope_db::{ChannelRepository, Database, KeywordRepository, StatsRepository, VideoRepository};

use crate::render::Templates;

/// Events pushed to connected clients via SSE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    KeywordAdded { id: u64, key_words: String },
    KeywordDeleted { id: u64 },
    BenchmarkChanged { channel_id: String, is_benchmark: bool },
    ChannelBlacklisted { channel_id: String, snapshots_deleted: u64 },
}

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub db: Arc<Database>,
    /// Broadcast channel for SSE push events
    pub event_tx: broadcast::Sender<AppEvent>,
    pub templates: Templates,
}

impl AppState {
    pub fn new(db: Database) -> Result<Self, minijinja::Error> {
        let (event_tx, _) = broadcast::channel(256);
        Ok(Self { db: Arc::new(db), event_tx, templates: Templates::new()? })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.event_tx.subscribe()
    }

    /// Fire and forget; nobody listening is fine.
    pub fn publish(&self, event: AppEvent) {
        let receivers = self.event_tx.send(event).unwrap_or(0);
        tracing::debug!(receivers, "event published");
    }

    pub fn channels(&self) -> ChannelRepository {
        ChannelRepository::new(self.db.clone())
    }

    pub fn videos(&self) -> VideoRepository {
        VideoRepository::new(self.db.clone())
    }

    pub fn keywords(&self) -> KeywordRepository {
        KeywordRepository::new(self.db.clone())
    }

    pub fn stats(&self) -> StatsRepository {
        StatsRepository::new(self.db.clone())
    }
}

pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;
    use tubescope_common::config::DatabaseConfig;

    fn state() -> AppState {
        let config = DatabaseConfig { port: 1, ..Default::default() };
        AppState::new(Database::connect_lazy(&config)).unwrap()
    }

    #[tokio::test]
    async fn test_published_event_reaches_subscriber() {
        let state = state();
        let mut rx = state.subscribe();
        state.publish(AppEvent::KeywordDeleted { id: 1 });
        assert_eq!(rx.recv().await.unwrap(), AppEvent::KeywordDeleted { id: 1 });
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let state = state();
        state.publish(AppEvent::KeywordAdded { id: 2, key_words: "diy".into() });

        // later subscribers only see later events
        let mut rx = state.subscribe();
        state.publish(AppEvent::KeywordDeleted { id: 2 });
        assert_eq!(rx.recv().await.unwrap(), AppEvent::KeywordDeleted { id: 2 });
    }

    #[test]
    fn test_event_wire_format() {
        let event = AppEvent::BenchmarkChanged { channel_id: "UC1".into(), is_benchmark: true };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "benchmark_changed");
        assert_eq!(json["channel_id"], "UC1");
        assert_eq!(json["is_benchmark"], true);
    }
}
