//! Server-Sent Events (SSE) streaming for toast notifications.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_core::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::state::{AppEvent, SharedState};

/// GET /api/events
pub async fn sse_handler(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.subscribe();
    // lagged receivers skip what they missed
    let stream = BroadcastStream::new(rx)
        .filter_map(|result| result.ok().and_then(to_sse_event).map(Ok::<_, Infallible>));

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn to_sse_event(event: AppEvent) -> Option<Event> {
    serde_json::to_string(&event).ok().map(|data| Event::default().data(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast;

    #[tokio::test]
    async fn test_stream_skips_lagged_events() {
        let (tx, rx) = broadcast::channel(2);
        for id in 1..=4 {
            tx.send(AppEvent::KeywordDeleted { id }).unwrap();
        }
        drop(tx);

        let events: Vec<AppEvent> = BroadcastStream::new(rx)
            .filter_map(|r| r.ok())
            .collect()
            .await;
        assert_eq!(events, vec![AppEvent::KeywordDeleted { id: 3 }, AppEvent::KeywordDeleted { id: 4 }]);
    }

    #[test]
    fn test_sse_event_builds() {
        assert!(to_sse_event(AppEvent::KeywordAdded { id: 1, key_words: "diy".into() }).is_some());
    }
}
