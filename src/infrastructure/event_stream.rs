// Server-sent event streaming of playback updates
use crate::application::playback_service::PlaybackUpdate;
use crate::infrastructure::json_mapper::update_to_dto;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::watch;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Serialize a single update to an SSE `update` event
fn update_event(update: &PlaybackUpdate) -> Option<Event> {
    match Event::default().event("update").json_data(update_to_dto(update)) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!("Failed to encode playback update: {}", e);
            None
        }
    }
}

/// Stream the current update immediately, then every change until the session goes away
pub fn stream_from_watch(
    mut rx: watch::Receiver<PlaybackUpdate>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        let initial = rx.borrow_and_update().clone();
        if let Some(event) = update_event(&initial) {
            yield Ok(event);
        }

        while rx.changed().await.is_ok() {
            let update = rx.borrow_and_update().clone();
            if let Some(event) = update_event(&update) {
                yield Ok(event);
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}
