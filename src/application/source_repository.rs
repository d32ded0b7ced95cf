// Repository traits for footfall and air-quality data access
use crate::application::error::SourceError;
use crate::domain::air_quality::RawReading;
use crate::domain::record::RawRecord;
use async_trait::async_trait;

#[async_trait]
pub trait FootfallRepository: Send + Sync {
    /// Fetch every footfall row in one finite batch
    async fn fetch_records(&self) -> Result<Vec<RawRecord>, SourceError>;
}

#[async_trait]
pub trait AirQualityRepository: Send + Sync {
    /// Fetch every PM2.5 and TEMP row across the configured station files
    async fn fetch_readings(&self) -> Result<Vec<RawReading>, SourceError>;
}
