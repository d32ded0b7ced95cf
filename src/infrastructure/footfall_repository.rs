// Footfall repository implementation - JSON export from disk or over HTTP
use crate::application::error::SourceError;
use crate::application::source_repository::FootfallRepository;
use crate::domain::record::RawRecord;
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum FootfallLocation {
    File(PathBuf),
    Url(String),
}

impl FootfallLocation {
    /// `http://` and `https://` sources are fetched, anything else is a path.
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            FootfallLocation::Url(source.to_string())
        } else {
            FootfallLocation::File(PathBuf::from(source))
        }
    }
}

#[derive(Debug, Clone)]
pub struct JsonFootfallRepository {
    location: FootfallLocation,
    client: reqwest::Client,
}

impl JsonFootfallRepository {
    pub fn new(location: FootfallLocation) -> Self {
        Self {
            location,
            client: reqwest::Client::new(),
        }
    }

    async fn read_file(&self, path: &PathBuf) -> Result<Vec<u8>, SourceError> {
        tokio::fs::read(path).await.map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let request_error = |source| SourceError::Request {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let bytes = response.bytes().await.map_err(request_error)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl FootfallRepository for JsonFootfallRepository {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError> {
        let body = match &self.location {
            FootfallLocation::File(path) => self.read_file(path).await?,
            FootfallLocation::Url(url) => self.fetch_url(url).await?,
        };

        let records: Vec<RawRecord> = serde_json::from_slice(&body)?;
        tracing::debug!("Fetched {} footfall rows from {:?}", records.len(), self.location);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_location() {
        assert_eq!(
            FootfallLocation::parse("https://example.org/data.json"),
            FootfallLocation::Url("https://example.org/data.json".to_string())
        );
        assert_eq!(
            FootfallLocation::parse("data/data.json"),
            FootfallLocation::File(PathBuf::from("data/data.json"))
        );
    }

    #[tokio::test]
    async fn test_reads_records_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"Location_code":"A001","Location_Name":"Bridge Street","Date":"2024-10-01T00:00:00Z","TotalCount":"12"}}]"#
        )
        .unwrap();

        let repository =
            JsonFootfallRepository::new(FootfallLocation::File(file.path().to_path_buf()));
        let records = repository.fetch_records().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "A001");
    }

    #[tokio::test]
    async fn test_missing_file_is_an_io_error() {
        let repository =
            JsonFootfallRepository::new(FootfallLocation::File(PathBuf::from("/nonexistent/data.json")));
        let err = repository.fetch_records().await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_decode_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let repository =
            JsonFootfallRepository::new(FootfallLocation::File(file.path().to_path_buf()));
        let err = repository.fetch_records().await.unwrap_err();
        assert!(matches!(err, SourceError::Decode(_)));
    }
}
