// Application layer - Use cases over the domain
pub mod assembler;
pub mod assistant_service;
pub mod error;
pub mod playback_service;
pub mod source_loader;
pub mod source_repository;
pub mod time_index;
pub mod timeline_service;
