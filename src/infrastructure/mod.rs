// Infrastructure layer - External dependencies and adapters
pub mod air_quality_repository;
pub mod backend_client;
pub mod config;
pub mod event_stream;
pub mod footfall_repository;
pub mod json_mapper;
