// Presentation layer - HTTP routes over the playback session
pub mod app_state;
pub mod handlers;

use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/timeline", get(get_timeline))
        .route("/timeline/current", get(get_current))
        .route("/timeline/events", get(stream_events))
        .route("/timeline/seek", post(seek))
        .route("/timeline/next", post(step_next))
        .route("/timeline/previous", post(step_previous))
        .route("/timeline/play", post(play))
        .route("/timeline/pause", post(pause))
        .route("/timeline/speed", post(set_speed))
        .route("/timeline/reload", post(reload))
        .route("/ask", post(ask))
        .route("/datasets", post(upload_dataset))
        .with_state(state)
}
