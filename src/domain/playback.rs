// Playback cursor - Index, run state and speed over an assembled timeline
use super::time_point::{TimePoint, Timeline};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_BASE_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// No time points loaded.
    Idle,
    /// Stopped: freshly loaded, or auto-advance ran off the end.
    Ready,
    Running,
    /// Stopped by pause or a manual move while running.
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    pub base_interval: Duration,
    pub min_interval: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            base_interval: DEFAULT_BASE_INTERVAL,
            min_interval: DEFAULT_MIN_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorSnapshot {
    pub current_index: usize,
    pub total_count: usize,
    pub is_running: bool,
    pub speed: f64,
    pub phase: PlaybackPhase,
}

/// Cursor over a shared, read-only timeline.
///
/// Auto-advance is driven externally through [`PlaybackCursor::advance_by`]:
/// the caller credits elapsed time and the cursor steps once per whole tick
/// interval. When auto-advance reaches the last time point playback stops
/// there (`Ready`, index on the last element); it never wraps.
#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    timeline: Arc<Timeline>,
    settings: PlaybackSettings,
    index: usize,
    phase: PlaybackPhase,
    speed: f64,
    accumulated: Duration,
}

impl PlaybackCursor {
    pub fn new(timeline: Arc<Timeline>, settings: PlaybackSettings) -> Self {
        let phase = if timeline.is_empty() {
            PlaybackPhase::Idle
        } else {
            PlaybackPhase::Ready
        };
        Self {
            timeline,
            settings,
            index: 0,
            phase,
            speed: 1.0,
            accumulated: Duration::ZERO,
        }
    }

    pub fn empty(settings: PlaybackSettings) -> Self {
        Self::new(Arc::new(Timeline::empty()), settings)
    }

    /// Swaps in a rebuilt timeline: index back to 0, stopped. Speed is kept.
    pub fn reset(&mut self, timeline: Arc<Timeline>) {
        let speed = self.speed;
        *self = Self::new(timeline, self.settings);
        self.speed = speed;
    }

    pub fn timeline(&self) -> &Arc<Timeline> {
        &self.timeline
    }

    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == PlaybackPhase::Running
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn current_time_point(&self) -> Option<&TimePoint> {
        self.timeline.get(self.index)
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        CursorSnapshot {
            current_index: self.index,
            total_count: self.len(),
            is_running: self.is_running(),
            speed: self.speed,
            phase: self.phase,
        }
    }

    /// Moves to `index` clamped into range. Always leaves playback stopped.
    pub fn seek(&mut self, index: i64) {
        if self.is_empty() {
            return;
        }
        let last = self.len() - 1;
        self.index = index.clamp(0, last as i64) as usize;
        self.accumulated = Duration::ZERO;
        if self.is_running() {
            self.phase = PlaybackPhase::Paused;
        }
    }

    /// Returns false when already on the last time point.
    pub fn step_next(&mut self) -> bool {
        if self.is_empty() || self.index + 1 >= self.len() {
            return false;
        }
        self.seek(self.index as i64 + 1);
        true
    }

    /// Returns false when already on the first time point.
    pub fn step_previous(&mut self) -> bool {
        if self.is_empty() || self.index == 0 {
            return false;
        }
        self.seek(self.index as i64 - 1);
        true
    }

    /// Starts auto-advance. Playing from the last time point rewinds to the first.
    pub fn play(&mut self) -> bool {
        if self.len() <= 1 {
            return false;
        }
        if self.is_running() {
            return true;
        }
        if self.index + 1 >= self.len() {
            self.index = 0;
        }
        self.accumulated = Duration::ZERO;
        self.phase = PlaybackPhase::Running;
        true
    }

    pub fn pause(&mut self) {
        if self.is_running() {
            self.phase = PlaybackPhase::Paused;
        }
    }

    /// Accepts finite positive multipliers only. Time already credited toward the
    /// next tick is kept.
    pub fn set_speed(&mut self, multiplier: f64) -> bool {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return false;
        }
        self.speed = multiplier;
        true
    }

    /// Saturates at `Duration::MAX` for speeds too small to represent.
    pub fn tick_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.settings.base_interval.as_secs_f64() / self.speed)
            .unwrap_or(Duration::MAX)
            .max(self.settings.min_interval)
    }

    pub fn time_until_next_tick(&self) -> Duration {
        self.tick_interval().saturating_sub(self.accumulated)
    }

    /// Credits `elapsed` toward auto-advance and returns how many steps were taken.
    pub fn advance_by(&mut self, elapsed: Duration) -> usize {
        if !self.is_running() {
            return 0;
        }

        self.accumulated = self.accumulated.saturating_add(elapsed);
        let interval = self.tick_interval();
        let mut steps = 0;
        while self.is_running() && self.accumulated >= interval {
            self.accumulated -= interval;
            if self.index + 1 < self.len() {
                self.index += 1;
                steps += 1;
            }
            if self.index + 1 >= self.len() {
                self.phase = PlaybackPhase::Ready;
                self.accumulated = Duration::ZERO;
            }
        }
        steps
    }
}
