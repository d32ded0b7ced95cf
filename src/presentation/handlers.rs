// HTTP request handlers
use crate::application::assistant_service::ChartSuggestion;
use crate::application::error::BackendError;
use crate::application::playback_service::SessionStatus;
use crate::infrastructure::event_stream::stream_from_watch;
use crate::infrastructure::json_mapper::{
    CurrentDto, SnapshotDto, StatusDto, TimelineDto, snapshot_to_dto, status_to_dto,
    time_point_to_dto, timeline_to_dto,
};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SeekRequest {
    pub index: i64,
}

#[derive(Deserialize)]
pub struct SpeedRequest {
    pub speed: f64,
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub dataset_id: Option<String>,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub chart_suggestions: Vec<ChartSuggestion>,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub name: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub dataset_id: String,
}

type ApiError = (StatusCode, String);

fn backend_error(e: BackendError) -> ApiError {
    tracing::warn!("Backend call failed: {}", e);
    (StatusCode::BAD_GATEWAY, e.to_string())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Session status, cursor and covered date range
pub async fn get_timeline(State(state): State<Arc<AppState>>) -> Json<TimelineDto> {
    let update = state.playback.update().await;
    let timeline = state.playback.timeline().await;
    Json(timeline_to_dto(&update, &timeline))
}

/// The selected time point with its summary and marker inputs
pub async fn get_current(State(state): State<Arc<AppState>>) -> Json<CurrentDto> {
    let snapshot = state.playback.snapshot().await;
    let point = state.playback.current_time_point().await;
    Json(CurrentDto {
        cursor: snapshot_to_dto(&snapshot),
        time_point: point.as_ref().map(time_point_to_dto),
    })
}

/// Push every cursor change to the client
pub async fn stream_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_watch(state.playback.subscribe())
}

pub async fn seek(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SeekRequest>,
) -> Json<SnapshotDto> {
    Json(snapshot_to_dto(&state.playback.seek(request.index).await))
}

pub async fn step_next(State(state): State<Arc<AppState>>) -> Json<SnapshotDto> {
    Json(snapshot_to_dto(&state.playback.step_next().await))
}

pub async fn step_previous(State(state): State<Arc<AppState>>) -> Json<SnapshotDto> {
    Json(snapshot_to_dto(&state.playback.step_previous().await))
}

pub async fn play(State(state): State<Arc<AppState>>) -> Json<SnapshotDto> {
    Json(snapshot_to_dto(&state.playback.play().await))
}

pub async fn pause(State(state): State<Arc<AppState>>) -> Json<SnapshotDto> {
    Json(snapshot_to_dto(&state.playback.pause().await))
}

pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeedRequest>,
) -> Result<Json<SnapshotDto>, ApiError> {
    if !request.speed.is_finite() || request.speed <= 0.0 {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("speed must be a positive number, got {}", request.speed),
        ));
    }
    Ok(Json(snapshot_to_dto(
        &state.playback.set_speed(request.speed).await,
    )))
}

/// Rebuild the timeline from the configured sources
pub async fn reload(State(state): State<Arc<AppState>>) -> (StatusCode, Json<StatusDto>) {
    let status = state.playback.reload(&state.timelines).await;
    let code = match status {
        SessionStatus::Failed(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };
    (code, Json(status_to_dto(&status)))
}

/// Ask the analysis backend, with the selected time point attached
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let answer = state
        .assistant
        .ask(&request.question, request.dataset_id.as_deref())
        .await
        .map_err(backend_error)?;

    Ok(Json(AskResponse {
        answer: answer.answer,
        chart_suggestions: answer.chart_suggestions,
    }))
}

/// Forward a raw file body to the backend's upload endpoint
pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<UploadResponse>, ApiError> {
    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "empty upload".to_string()));
    }
    let dataset_id = state
        .assistant
        .upload(&query.name, body.to_vec())
        .await
        .map_err(backend_error)?;
    Ok(Json(UploadResponse { dataset_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::assistant_service::{
        Answer, AssistantService, QuestionBackend, QuestionPayload,
    };
    use crate::application::playback_service::PlaybackService;
    use crate::application::source_repository::FootfallRepository;
    use crate::application::time_index::IndexOptions;
    use crate::application::timeline_service::TimelineService;
    use crate::application::timeline_service::tests::{
        FailingFootfall, StaticFootfall, scenario_rows,
    };
    use crate::domain::location::LocationDirectory;
    use crate::domain::playback::PlaybackSettings;
    use async_trait::async_trait;

    struct UnreachableBackend;

    #[async_trait]
    impl QuestionBackend for UnreachableBackend {
        async fn ask(&self, _payload: &QuestionPayload) -> Result<Answer, BackendError> {
            Err(BackendError::Status {
                status: 500,
                body: "model offline".to_string(),
            })
        }

        async fn ask_dataset(
            &self,
            _dataset_id: &str,
            _payload: &QuestionPayload,
        ) -> Result<Answer, BackendError> {
            Err(BackendError::MissingDataset)
        }

        async fn upload(&self, _file_name: &str, _contents: Vec<u8>) -> Result<String, BackendError> {
            Ok("ds-7".to_string())
        }
    }

    fn state(footfall: Arc<dyn FootfallRepository>) -> Arc<AppState> {
        let playback = PlaybackService::new(PlaybackSettings::default());
        let timelines = TimelineService::new(
            footfall,
            LocationDirectory::sydney_cbd(),
            Vec::new(),
            IndexOptions::default(),
        );
        let assistant = AssistantService::new(Arc::new(UnreachableBackend), playback.clone(), 5);
        Arc::new(AppState {
            playback,
            timelines,
            assistant,
        })
    }

    async fn loaded_state() -> Arc<AppState> {
        let state = state(Arc::new(StaticFootfall(scenario_rows())));
        let (code, _) = reload(State(state.clone())).await;
        assert_eq!(code, StatusCode::OK);
        state
    }

    #[tokio::test]
    async fn test_invalid_speed_is_unprocessable() {
        let state = loaded_state().await;
        for speed in [0.0, -2.0, f64::NAN, f64::INFINITY] {
            let (code, _) = set_speed(State(state.clone()), Json(SpeedRequest { speed }))
                .await
                .err()
                .unwrap();
            assert_eq!(code, StatusCode::UNPROCESSABLE_ENTITY);
        }
        assert_eq!(state.playback.snapshot().await.speed, 1.0);

        let Json(snapshot) = set_speed(State(state.clone()), Json(SpeedRequest { speed: 4.0 }))
            .await
            .unwrap();
        assert_eq!(snapshot.speed, 4.0);
    }

    #[tokio::test]
    async fn test_failed_reload_is_bad_gateway() {
        let state = state(Arc::new(FailingFootfall));
        let (code, Json(status)) = reload(State(state.clone())).await;
        assert_eq!(code, StatusCode::BAD_GATEWAY);
        assert_eq!(status.state, "failed");
        assert!(status.error.unwrap().contains("503"));

        let Json(current) = get_current(State(state)).await;
        assert_eq!(current.cursor.total_count, 0);
        assert!(current.time_point.is_none());
    }

    #[tokio::test]
    async fn test_empty_source_yields_empty_timeline_shape() {
        let state = state(Arc::new(StaticFootfall(Vec::new())));
        let (code, _) = reload(State(state.clone())).await;
        assert_eq!(code, StatusCode::OK);

        let Json(current) = get_current(State(state.clone())).await;
        let json = serde_json::to_value(&current).unwrap();
        assert_eq!(json["cursor"]["total_count"], 0);
        assert_eq!(json["cursor"]["current_index"], 0);
        assert!(json["time_point"].is_null());

        let Json(timeline) = get_timeline(State(state.clone())).await;
        let json = serde_json::to_value(&timeline).unwrap();
        assert_eq!(json["status"]["state"], "ready");
        assert!(json["start"].is_null());
        assert!(json["end"].is_null());

        let Json(snapshot) = play(State(state)).await;
        assert!(!snapshot.is_running);
    }

    #[tokio::test]
    async fn test_current_time_point_after_step() {
        let state = loaded_state().await;
        let Json(snapshot) = step_next(State(state.clone())).await;
        assert_eq!(snapshot.current_index, 1);

        let Json(current) = get_current(State(state)).await;
        let point = current.time_point.unwrap();
        assert_eq!(point.timestamp, "2024-10-01T08:00:00Z");
        assert_eq!(point.summary.pedestrian_total, 80.0);
    }

    #[tokio::test]
    async fn test_empty_upload_is_bad_request() {
        let state = loaded_state().await;
        let query = || {
            Query(UploadQuery {
                name: "footfall.csv".to_string(),
            })
        };

        let (code, _) = upload_dataset(State(state.clone()), query(), Bytes::new())
            .await
            .err()
            .unwrap();
        assert_eq!(code, StatusCode::BAD_REQUEST);

        let Json(uploaded) = upload_dataset(
            State(state),
            query(),
            Bytes::from_static(b"Location_code,TotalCount\nA001,12\n"),
        )
        .await
        .ok()
        .unwrap();
        assert_eq!(uploaded.dataset_id, "ds-7");
    }

    #[tokio::test]
    async fn test_backend_failure_is_bad_gateway() {
        let state = loaded_state().await;
        let (code, message) = ask(
            State(state),
            Json(AskRequest {
                question: "Busiest site?".to_string(),
                dataset_id: None,
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(code, StatusCode::BAD_GATEWAY);
        assert!(message.contains("model offline"));
    }
}
