// Question-answering backend client
use crate::application::assistant_service::{Answer, QuestionBackend, QuestionPayload};
use crate::application::error::BackendError;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct HttpQuestionBackend {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    dataset: Option<UploadedDataset>,
}

#[derive(Debug, Deserialize)]
struct UploadedDataset {
    #[serde(default)]
    dataset_id: Option<String>,
}

impl HttpQuestionBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn ask_url(&self, dataset_id: Option<&str>) -> String {
        match dataset_id {
            Some(id) => format!("{}/datasets/{}/ask", self.base_url, urlencoding::encode(id)),
            None => format!("{}/ask", self.base_url),
        }
    }

    async fn post_question(&self, url: &str, payload: &QuestionPayload) -> Result<Answer, BackendError> {
        tracing::debug!(
            "Posting question with {} context records to {}",
            payload.context.len(),
            url
        );

        let response = self.client.post(url).json(payload).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Backend question failed with status {}: {}", status, body);
            return Err(BackendError::Status { status, body });
        }

        Ok(response.json::<Answer>().await?)
    }
}

#[async_trait]
impl QuestionBackend for HttpQuestionBackend {
    async fn ask(&self, payload: &QuestionPayload) -> Result<Answer, BackendError> {
        self.post_question(&self.ask_url(None), payload).await
    }

    async fn ask_dataset(
        &self,
        dataset_id: &str,
        payload: &QuestionPayload,
    ) -> Result<Answer, BackendError> {
        self.post_question(&self.ask_url(Some(dataset_id)), payload).await
    }

    async fn upload(&self, file_name: &str, contents: Vec<u8>) -> Result<String, BackendError> {
        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("files", part);

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        response
            .json::<UploadResponse>()
            .await?
            .dataset
            .and_then(|dataset| dataset.dataset_id)
            .ok_or(BackendError::MissingDataset)
    }
}
