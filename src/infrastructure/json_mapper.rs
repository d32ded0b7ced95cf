// Mapper to convert domain models to JSON response bodies
use crate::application::playback_service::{PlaybackUpdate, SessionStatus};
use crate::domain::playback::{CursorSnapshot, PlaybackPhase};
use crate::domain::record::ResolvedRecord;
use crate::domain::stats::{self, MarkerScale, TimePointSummary};
use crate::domain::time_point::{DeviceReading, TimePoint, Timeline};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct SnapshotDto {
    pub current_index: usize,
    pub total_count: usize,
    pub is_running: bool,
    pub speed: f64,
    pub phase: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusDto {
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TimelineDto {
    pub status: StatusDto,
    pub cursor: SnapshotDto,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateDto {
    pub status: StatusDto,
    pub cursor: SnapshotDto,
    pub timestamp: Option<String>,
    pub summary: Option<SummaryDto>,
}

#[derive(Debug, Serialize)]
pub struct SummaryDto {
    pub pedestrian_sites: usize,
    pub pedestrian_total: f64,
    pub pedestrian_average: f64,
    pub pedestrian_max: f64,
    pub device_count: usize,
    pub pm25_average: f64,
    pub pm25_max: f64,
    pub temperature_average: f64,
}

#[derive(Debug, Serialize)]
pub struct PedestrianDto {
    pub code: String,
    pub name: String,
    pub count: f64,
    pub lat: f64,
    pub lng: f64,
    pub location_known: bool,
}

#[derive(Debug, Serialize)]
pub struct DeviceDto {
    pub code: String,
    pub name: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "PM2.5")]
    pub pm25: Option<f64>,
    #[serde(rename = "TEMP")]
    pub temperature: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct MarkerDto {
    pub code: String,
    pub value: f64,
    pub max_value_in_set: f64,
}

#[derive(Debug, Serialize)]
pub struct TimePointDto {
    pub timestamp: String,
    pub devices: Vec<DeviceDto>,
    pub pedestrians: Vec<PedestrianDto>,
    pub summary: SummaryDto,
    pub pedestrian_markers: Vec<MarkerDto>,
    pub pm25_markers: Vec<MarkerDto>,
}

#[derive(Debug, Serialize)]
pub struct CurrentDto {
    pub cursor: SnapshotDto,
    pub time_point: Option<TimePointDto>,
}

pub fn snapshot_to_dto(snapshot: &CursorSnapshot) -> SnapshotDto {
    SnapshotDto {
        current_index: snapshot.current_index,
        total_count: snapshot.total_count,
        is_running: snapshot.is_running,
        speed: snapshot.speed,
        phase: phase_name(snapshot.phase),
    }
}

fn phase_name(phase: PlaybackPhase) -> &'static str {
    match phase {
        PlaybackPhase::Idle => "idle",
        PlaybackPhase::Ready => "ready",
        PlaybackPhase::Running => "running",
        PlaybackPhase::Paused => "paused",
    }
}

pub fn status_to_dto(status: &SessionStatus) -> StatusDto {
    match status {
        SessionStatus::Loading => StatusDto {
            state: "loading",
            error: None,
        },
        SessionStatus::Ready => StatusDto {
            state: "ready",
            error: None,
        },
        SessionStatus::Failed(message) => StatusDto {
            state: "failed",
            error: Some(message.clone()),
        },
    }
}

pub fn timeline_to_dto(update: &PlaybackUpdate, timeline: &Timeline) -> TimelineDto {
    let range = timeline.date_range();
    TimelineDto {
        status: status_to_dto(&update.status),
        cursor: snapshot_to_dto(&update.snapshot),
        start: range.map(|(start, _)| start.to_string()),
        end: range.map(|(_, end)| end.to_string()),
    }
}

pub fn update_to_dto(update: &PlaybackUpdate) -> UpdateDto {
    UpdateDto {
        status: status_to_dto(&update.status),
        cursor: snapshot_to_dto(&update.snapshot),
        timestamp: update.key.map(|key| key.to_string()),
        summary: update.summary.as_ref().map(summary_to_dto),
    }
}

fn summary_to_dto(summary: &TimePointSummary) -> SummaryDto {
    SummaryDto {
        pedestrian_sites: summary.pedestrian_sites,
        pedestrian_total: summary.pedestrian_total,
        pedestrian_average: summary.pedestrian_average,
        pedestrian_max: summary.pedestrian_max,
        device_count: summary.device_count,
        pm25_average: summary.pm25_average,
        pm25_max: summary.pm25_max,
        temperature_average: summary.temperature_average,
    }
}

pub fn time_point_to_dto(point: &TimePoint) -> TimePointDto {
    TimePointDto {
        timestamp: point.key.to_string(),
        devices: point.devices.iter().map(device_to_dto).collect(),
        pedestrians: point.pedestrians.iter().map(pedestrian_to_dto).collect(),
        summary: summary_to_dto(&TimePointSummary::of(point)),
        pedestrian_markers: stats::pedestrian_markers(point)
            .into_iter()
            .map(marker_to_dto)
            .collect(),
        pm25_markers: stats::pm25_markers(point)
            .into_iter()
            .map(marker_to_dto)
            .collect(),
    }
}

fn device_to_dto(reading: &DeviceReading) -> DeviceDto {
    DeviceDto {
        code: reading.device.code.clone(),
        name: reading.device.name.clone(),
        description: reading.device.description.clone(),
        lat: reading.device.coordinate.lat,
        lng: reading.device.coordinate.lng,
        pm25: reading.pm25,
        temperature: reading.temperature,
    }
}

fn pedestrian_to_dto(record: &ResolvedRecord) -> PedestrianDto {
    PedestrianDto {
        code: record.code.clone(),
        name: record.name.clone(),
        count: record.value,
        lat: record.coordinate.lat,
        lng: record.coordinate.lng,
        location_known: record.location_known,
    }
}

fn marker_to_dto(marker: MarkerScale) -> MarkerDto {
    MarkerDto {
        code: marker.code,
        value: marker.value,
        max_value_in_set: marker.max_value_in_set,
    }
}
