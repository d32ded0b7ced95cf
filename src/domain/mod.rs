// Domain layer - Records, time points and playback state
pub mod air_quality;
pub mod location;
pub mod playback;
pub mod record;
pub mod stats;
pub mod time_key;
pub mod time_point;
