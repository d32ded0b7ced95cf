// Application state for HTTP handlers
use crate::application::assistant_service::AssistantService;
use crate::application::playback_service::PlaybackService;
use crate::application::timeline_service::TimelineService;

#[derive(Clone)]
pub struct AppState {
    pub playback: PlaybackService,
    pub timelines: TimelineService,
    pub assistant: AssistantService,
}
