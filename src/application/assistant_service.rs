// Assistant service - Questions to the analysis backend, with the current time point as context
use crate::application::error::BackendError;
use crate::application::playback_service::PlaybackService;
use crate::domain::air_quality::SensorKind;
use crate::domain::time_point::TimePoint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_ANALYSIS_PROMPT: &str =
    "Please analyze this dataset and suggest key insights and charts.";
const FOOTFALL_KIND: &str = "footfall";
const FOOTFALL_UNIT: &str = "people";

/// One reading from the selected time point, flattened for a question payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRecord {
    pub code: String,
    pub kind: String,
    pub value: f64,
    pub unit: String,
    pub timestamp: String,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionPayload {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<FlatRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChartSuggestion {
    pub chart_type: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Answer {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub chart_suggestions: Vec<ChartSuggestion>,
}

#[async_trait]
pub trait QuestionBackend: Send + Sync {
    /// Ask without a dataset (`POST /ask`)
    async fn ask(&self, payload: &QuestionPayload) -> Result<Answer, BackendError>;

    /// Ask about an uploaded dataset (`POST /datasets/{id}/ask`)
    async fn ask_dataset(
        &self,
        dataset_id: &str,
        payload: &QuestionPayload,
    ) -> Result<Answer, BackendError>;

    /// Upload a file and return the dataset id assigned by the backend
    async fn upload(&self, file_name: &str, contents: Vec<u8>) -> Result<String, BackendError>;
}

pub fn flatten(point: &TimePoint) -> Vec<FlatRecord> {
    let timestamp = point.key.to_string();
    let timestamp = timestamp.as_str();

    let pedestrians = point.pedestrians.iter().map(|record| FlatRecord {
        code: record.code.clone(),
        kind: FOOTFALL_KIND.to_string(),
        value: record.value,
        unit: FOOTFALL_UNIT.to_string(),
        timestamp: timestamp.to_string(),
        lat: record.coordinate.lat,
        lng: record.coordinate.lng,
    });

    let devices = point.devices.iter().flat_map(|reading| {
        [SensorKind::Pm25, SensorKind::Temperature]
            .into_iter()
            .filter_map(move |kind| {
                reading.value(kind).map(|value| FlatRecord {
                    code: reading.device.code.clone(),
                    kind: kind.label().to_string(),
                    value,
                    unit: kind.unit().to_string(),
                    timestamp: timestamp.to_string(),
                    lat: reading.device.coordinate.lat,
                    lng: reading.device.coordinate.lng,
                })
            })
    });

    pedestrians.chain(devices).collect()
}

#[derive(Clone)]
pub struct AssistantService {
    backend: Arc<dyn QuestionBackend>,
    playback: PlaybackService,
    top_k: usize,
}

impl AssistantService {
    pub fn new(backend: Arc<dyn QuestionBackend>, playback: PlaybackService, top_k: usize) -> Self {
        Self {
            backend,
            playback,
            top_k,
        }
    }

    pub async fn ask(&self, question: &str, dataset_id: Option<&str>) -> Result<Answer, BackendError> {
        let context = self
            .playback
            .current_time_point()
            .await
            .map(|point| flatten(&point))
            .unwrap_or_default();

        let mut answer = match dataset_id {
            Some(id) => {
                let question = match question.trim() {
                    "" => DEFAULT_ANALYSIS_PROMPT,
                    q => q,
                };
                let payload = QuestionPayload {
                    question: question.to_string(),
                    top_k: None,
                    context,
                };
                self.backend.ask_dataset(id, &payload).await?
            }
            None => {
                let payload = QuestionPayload {
                    question: question.to_string(),
                    top_k: Some(self.top_k),
                    context,
                };
                self.backend.ask(&payload).await?
            }
        };

        if answer.success == Some(false) {
            return Err(BackendError::Rejected(answer.answer));
        }
        if answer.answer.trim().is_empty() {
            answer.answer = "No answer returned.".to_string();
        }
        Ok(answer)
    }

    pub async fn upload(&self, file_name: &str, contents: Vec<u8>) -> Result<String, BackendError> {
        let dataset_id = self.backend.upload(file_name, contents).await?;
        tracing::info!("Uploaded {} as dataset {}", file_name, dataset_id);
        Ok(dataset_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::timeline_service::tests::scenario_rows;
    use crate::application::{assembler, source_loader, time_index};
    use crate::domain::air_quality::DeviceBaseline;
    use crate::domain::location::LocationDirectory;
    use crate::domain::playback::PlaybackSettings;
    use crate::domain::time_point::Timeline;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        calls: Mutex<Vec<(Option<String>, QuestionPayload)>>,
        reply: Option<Answer>,
    }

    impl RecordingBackend {
        fn reply(&self) -> Answer {
            self.reply.clone().unwrap_or(Answer {
                success: Some(true),
                answer: "Footfall peaks at midnight.".to_string(),
                chart_suggestions: Vec::new(),
            })
        }
    }

    #[async_trait]
    impl QuestionBackend for RecordingBackend {
        async fn ask(&self, payload: &QuestionPayload) -> Result<Answer, BackendError> {
            self.calls.lock().unwrap().push((None, payload.clone()));
            Ok(self.reply())
        }

        async fn ask_dataset(
            &self,
            dataset_id: &str,
            payload: &QuestionPayload,
        ) -> Result<Answer, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((Some(dataset_id.to_string()), payload.clone()));
            Ok(self.reply())
        }

        async fn upload(&self, _file_name: &str, _contents: Vec<u8>) -> Result<String, BackendError> {
            Ok("ds-1".to_string())
        }
    }

    fn scenario_timeline() -> Timeline {
        let report = source_loader::load(scenario_rows(), &LocationDirectory::sydney_cbd());
        let index = time_index::build_index(
            report.records.iter().map(|r| r.key),
            &time_index::IndexOptions::default(),
        );
        let devices = assembler::DeviceSource::Simulated(DeviceBaseline::sydney_stations());
        Timeline::new(assembler::assemble(&index, &report.records, &devices))
    }

    #[test]
    fn test_flatten_includes_pedestrians_and_sensors() {
        let timeline = scenario_timeline();
        let flat = flatten(timeline.get(0).unwrap());

        // 2 footfall sites + 3 stations x (PM2.5, TEMP)
        assert_eq!(flat.len(), 8);
        assert_eq!(flat[0].kind, "footfall");
        assert_eq!(flat[0].unit, "people");
        assert_eq!(flat[0].value, 120.0);
        assert_eq!(flat[0].timestamp, "2024-10-01T00:00:00Z");
        assert!(flat.iter().any(|r| r.kind == "PM2.5" && r.unit == "µg/m³"));
        assert!(flat.iter().any(|r| r.kind == "TEMP" && r.unit == "°C"));
    }

    #[tokio::test]
    async fn test_ask_without_dataset_sends_top_k_and_context() {
        let playback = PlaybackService::new(PlaybackSettings::default());
        playback.replace(scenario_timeline()).await;
        let backend = Arc::new(RecordingBackend::default());
        let assistant = AssistantService::new(backend.clone(), playback, 5);

        let answer = assistant.ask("When is it busiest?", None).await.unwrap();
        assert_eq!(answer.answer, "Footfall peaks at midnight.");

        let calls = backend.calls.lock().unwrap();
        let (dataset, payload) = &calls[0];
        assert!(dataset.is_none());
        assert_eq!(payload.top_k, Some(5));
        assert_eq!(payload.context.len(), 8);
    }

    #[tokio::test]
    async fn test_ask_dataset_uses_default_prompt_for_blank_question() {
        let playback = PlaybackService::new(PlaybackSettings::default());
        let backend = Arc::new(RecordingBackend::default());
        let assistant = AssistantService::new(backend.clone(), playback, 5);

        assistant.ask("   ", Some("ds-42")).await.unwrap();

        let calls = backend.calls.lock().unwrap();
        let (dataset, payload) = &calls[0];
        assert_eq!(dataset.as_deref(), Some("ds-42"));
        assert_eq!(payload.question, DEFAULT_ANALYSIS_PROMPT);
        assert_eq!(payload.top_k, None);
        assert!(payload.context.is_empty());
    }

    #[tokio::test]
    async fn test_unsuccessful_answer_is_rejected() {
        let backend = Arc::new(RecordingBackend {
            reply: Some(Answer {
                success: Some(false),
                answer: "dataset not indexed".to_string(),
                chart_suggestions: Vec::new(),
            }),
            ..Default::default()
        });
        let assistant = AssistantService::new(
            backend,
            PlaybackService::new(PlaybackSettings::default()),
            5,
        );

        let err = assistant.ask("hello", None).await.unwrap_err();
        assert!(matches!(err, BackendError::Rejected(ref msg) if msg == "dataset not indexed"));
    }

    #[test]
    fn test_payload_serialization_omits_empty_fields() {
        let payload = QuestionPayload {
            question: "hi".to_string(),
            top_k: None,
            context: Vec::new(),
        };
        assert_eq!(serde_json::to_string(&payload).unwrap(), r#"{"question":"hi"}"#);
    }

    #[test]
    fn test_answer_tolerates_extra_fields() {
        let answer: Answer = serde_json::from_str(
            r#"{"success":true,"answer":"Peak at 8am","dataset_id":"ds-1","rows":12}"#,
        )
        .unwrap();
        assert_eq!(answer.answer, "Peak at 8am");
        assert!(answer.chart_suggestions.is_empty());
    }
}
