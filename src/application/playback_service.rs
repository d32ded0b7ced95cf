// Playback service - Session owning the timeline, the cursor and its ticker task
use crate::application::timeline_service::TimelineService;
use crate::domain::playback::{CursorSnapshot, PlaybackCursor, PlaybackSettings};
use crate::domain::stats::TimePointSummary;
use crate::domain::time_key::TimeKey;
use crate::domain::time_point::{TimePoint, Timeline};
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Published on every cursor move, run-state change and rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackUpdate {
    pub snapshot: CursorSnapshot,
    pub status: SessionStatus,
    pub key: Option<TimeKey>,
    pub summary: Option<TimePointSummary>,
}

struct Session {
    cursor: PlaybackCursor,
    status: SessionStatus,
    last_credit: Instant,
    ticker: Option<JoinHandle<()>>,
}

impl Session {
    fn credit_elapsed(&mut self) -> usize {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(self.last_credit);
        self.last_credit = now;
        self.cursor.advance_by(elapsed)
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    fn update(&self) -> PlaybackUpdate {
        let point = self.cursor.current_time_point();
        PlaybackUpdate {
            snapshot: self.cursor.snapshot(),
            status: self.status.clone(),
            key: point.map(|p| p.key),
            summary: point.map(TimePointSummary::of),
        }
    }
}

struct Shared {
    session: Mutex<Session>,
    updates: watch::Sender<PlaybackUpdate>,
}

impl Shared {
    fn publish(&self, session: &Session) {
        self.updates.send_replace(session.update());
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.session.get_mut().stop_ticker();
    }
}

/// One playback session. Clones share the same session.
///
/// Every mutation and every tick runs under a single lock, so a tick's index
/// advance and summary are never observed half-applied. At most one ticker
/// task exists; it is cancelled by pause, seek, step, rebuild and shutdown,
/// and restarted by a speed change. Cursor controls are ignored while a load
/// is in progress, so nothing moves or ticks on the timeline being replaced.
#[derive(Clone)]
pub struct PlaybackService {
    shared: Arc<Shared>,
}

impl PlaybackService {
    pub fn new(settings: PlaybackSettings) -> Self {
        let session = Session {
            cursor: PlaybackCursor::empty(settings),
            status: SessionStatus::Loading,
            last_credit: Instant::now(),
            ticker: None,
        };
        let (updates, _) = watch::channel(session.update());
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(session),
                updates,
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackUpdate> {
        self.shared.updates.subscribe()
    }

    pub async fn update(&self) -> PlaybackUpdate {
        self.shared.session.lock().await.update()
    }

    pub async fn snapshot(&self) -> CursorSnapshot {
        self.shared.session.lock().await.cursor.snapshot()
    }

    pub async fn timeline(&self) -> Arc<Timeline> {
        self.shared.session.lock().await.cursor.timeline().clone()
    }

    pub async fn current_time_point(&self) -> Option<TimePoint> {
        let session = self.shared.session.lock().await;
        session.cursor.current_time_point().cloned()
    }

    pub async fn play(&self) -> CursorSnapshot {
        let mut session = self.shared.session.lock().await;
        if session.is_loading() {
            tracing::debug!("Ignoring play while the timeline is loading");
            return session.cursor.snapshot();
        }
        let was_running = session.cursor.is_running();
        if session.cursor.play() && !was_running {
            tracing::debug!("Playback started at index {}", session.cursor.index());
            session.last_credit = Instant::now();
            self.restart_ticker(&mut session);
        }
        self.shared.publish(&session);
        session.cursor.snapshot()
    }

    pub async fn pause(&self) -> CursorSnapshot {
        self.mutate(|cursor| cursor.pause()).await
    }

    pub async fn seek(&self, index: i64) -> CursorSnapshot {
        self.mutate(|cursor| cursor.seek(index)).await
    }

    pub async fn step_next(&self) -> CursorSnapshot {
        self.mutate(|cursor| {
            cursor.step_next();
        })
        .await
    }

    pub async fn step_previous(&self) -> CursorSnapshot {
        self.mutate(|cursor| {
            cursor.step_previous();
        })
        .await
    }

    /// Time already elapsed toward the next tick is credited at the old speed
    /// before the new one applies.
    pub async fn set_speed(&self, multiplier: f64) -> CursorSnapshot {
        let mut session = self.shared.session.lock().await;
        if session.cursor.is_running() {
            session.credit_elapsed();
        }
        if session.cursor.set_speed(multiplier) {
            tracing::debug!("Playback speed set to {}x", multiplier);
            if session.cursor.is_running() {
                self.restart_ticker(&mut session);
            }
        } else {
            tracing::warn!("Ignoring invalid playback speed {}", multiplier);
        }
        self.shared.publish(&session);
        session.cursor.snapshot()
    }

    /// Replaces the timeline wholesale and rewinds to the first time point.
    pub async fn replace(&self, timeline: Timeline) -> CursorSnapshot {
        let mut session = self.shared.session.lock().await;
        session.stop_ticker();
        session.cursor.reset(Arc::new(timeline));
        session.status = SessionStatus::Ready;
        tracing::info!(
            "Playback session rebuilt with {} time points",
            session.cursor.len()
        );
        self.shared.publish(&session);
        session.cursor.snapshot()
    }

    pub async fn fail(&self, message: String) -> CursorSnapshot {
        let mut session = self.shared.session.lock().await;
        session.stop_ticker();
        session.cursor.reset(Arc::new(Timeline::empty()));
        session.status = SessionStatus::Failed(message);
        self.shared.publish(&session);
        session.cursor.snapshot()
    }

    /// Runs the load pipeline and swaps the result in, or records the failure.
    pub async fn reload(&self, timelines: &TimelineService) -> SessionStatus {
        {
            let mut session = self.shared.session.lock().await;
            session.stop_ticker();
            session.cursor.pause();
            session.status = SessionStatus::Loading;
            self.shared.publish(&session);
        }

        match timelines.build().await {
            Ok(build) => {
                self.replace(build.timeline).await;
                SessionStatus::Ready
            }
            Err(e) => {
                tracing::error!("Failed to load timeline sources: {}", e);
                let status = SessionStatus::Failed(e.to_string());
                self.fail(e.to_string()).await;
                status
            }
        }
    }

    pub async fn shutdown(&self) {
        let mut session = self.shared.session.lock().await;
        session.stop_ticker();
        session.cursor.pause();
        self.shared.publish(&session);
    }

    async fn mutate<F>(&self, f: F) -> CursorSnapshot
    where
        F: FnOnce(&mut PlaybackCursor),
    {
        let mut session = self.shared.session.lock().await;
        if session.is_loading() {
            return session.cursor.snapshot();
        }
        f(&mut session.cursor);
        if !session.cursor.is_running() {
            session.stop_ticker();
        }
        self.shared.publish(&session);
        session.cursor.snapshot()
    }

    fn restart_ticker(&self, session: &mut Session) {
        session.stop_ticker();
        session.ticker = Some(spawn_ticker(Arc::downgrade(&self.shared)));
    }
}

fn spawn_ticker(shared: Weak<Shared>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = {
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                let session = shared.session.lock().await;
                if !session.cursor.is_running() {
                    break;
                }
                session.cursor.time_until_next_tick()
            };

            tokio::time::sleep(wait).await;

            let Some(shared) = shared.upgrade() else {
                break;
            };
            let mut session = shared.session.lock().await;
            let steps = session.credit_elapsed();
            let running = session.cursor.is_running();
            if steps > 0 || !running {
                shared.publish(&session);
            }
            if !running {
                tracing::debug!("Playback reached the last time point");
                break;
            }
        }
    })
}
