//! Time-synchronized playback over pedestrian footfall counts and air-quality readings.
//!
//! Raw rows are resolved ([`application::source_loader`]), reduced to a strided
//! timestamp index ([`application::time_index`]), joined into time points
//! ([`application::assembler`]) and played back by a cursor
//! ([`domain::playback`]) owned by a session ([`application::playback_service`]).
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
