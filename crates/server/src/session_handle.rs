use crate::errors::ServerError;
use crate::events::EventBuffer;
use crate::types::{EventBatch, EventCursor, SessionStatus};
use crate::view::PublishedView;
use rally_core::{MatchSnapshot, PointEngine, RotationError, SessionEvent, SpeedMultiplier};
use rally_host::SessionHost;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tracing::info;

/// Events produced by one simulated point, in emission order.
pub struct PointBatch {
    pub match_number: u64,
    pub events: Vec<SessionEvent>,
}

/// State guarded by the session lock.
pub struct SessionInner<E: PointEngine> {
    pub host: SessionHost<E>,
    pub events: EventBuffer,
    pub(crate) view: PublishedView,
}

impl<E: PointEngine> SessionInner<E> {
    fn publish(&mut self, match_number: u64, event: SessionEvent) {
        self.view.apply(&event);
        self.events.push(match_number, event);
    }
}

/// Commands written by clients and read by the session loop between beats.
struct Controls {
    paused: AtomicBool,
    speed: AtomicU32,
    reset_requested: AtomicBool,
    shutdown: AtomicBool,
    wake: Notify,
}

/// Shared handle to a running session.
pub struct SessionHandle<E: PointEngine> {
    pub inner: Arc<Mutex<SessionInner<E>>>,
    controls: Arc<Controls>,
}

impl<E: PointEngine> Clone for SessionHandle<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            controls: Arc::clone(&self.controls),
        }
    }
}

impl<E: PointEngine> SessionHandle<E> {
    pub fn new(
        host: SessionHost<E>,
        event_buffer_capacity: usize,
        speed: SpeedMultiplier,
        paused: bool,
    ) -> Self {
        // Round trip through the bits to re-clamp deserialized values.
        let speed = SpeedMultiplier::from_bits(speed.to_bits());
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                view: PublishedView::from_host(&host),
                host,
                events: EventBuffer::new(event_buffer_capacity),
            })),
            controls: Arc::new(Controls {
                paused: AtomicBool::new(paused),
                speed: AtomicU32::new(speed.to_bits()),
                reset_requested: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
                wake: Notify::new(),
            }),
        }
    }

    pub fn pause(&self) {
        if !self.controls.paused.swap(true, Ordering::SeqCst) {
            info!("session paused");
        }
        self.controls.wake.notify_waiters();
    }

    pub fn resume(&self) {
        if self.controls.paused.swap(false, Ordering::SeqCst) {
            info!("session resumed");
        }
        self.controls.wake.notify_waiters();
    }

    pub fn is_paused(&self) -> bool {
        self.controls.paused.load(Ordering::SeqCst)
    }

    /// Clamp into `[0.25, 4]` and store. Returns the value actually applied.
    pub fn set_speed(&self, multiplier: f32) -> Result<SpeedMultiplier, ServerError> {
        let speed = SpeedMultiplier::new(multiplier).ok_or(ServerError::InvalidSpeed(multiplier))?;
        self.controls.speed.store(speed.to_bits(), Ordering::SeqCst);
        info!(speed = speed.get(), "playback speed changed");
        self.controls.wake.notify_waiters();
        Ok(speed)
    }

    pub fn speed(&self) -> SpeedMultiplier {
        SpeedMultiplier::from_bits(self.controls.speed.load(Ordering::SeqCst))
    }

    /// Ask the loop to reset at its next suspension point.
    pub fn request_reset(&self) {
        self.controls.reset_requested.store(true, Ordering::SeqCst);
        self.controls.wake.notify_waiters();
    }

    pub fn reset_pending(&self) -> bool {
        self.controls.reset_requested.load(Ordering::SeqCst)
    }

    /// Consume a pending reset request.
    pub fn take_reset_request(&self) -> bool {
        self.controls.reset_requested.swap(false, Ordering::SeqCst)
    }

    pub fn request_shutdown(&self) {
        self.controls.shutdown.store(true, Ordering::SeqCst);
        self.controls.wake.notify_waiters();
    }

    pub fn should_shutdown(&self) -> bool {
        self.controls.shutdown.load(Ordering::SeqCst)
    }

    /// Resolves on the next control change made after this call.
    pub async fn changed(&self) {
        self.controls.wake.notified().await;
    }

    /// Publish the current arrangement.
    pub async fn announce(&self) {
        let mut inner = self.inner.lock().await;
        let mut events: Vec<SessionEvent> = Vec::new();
        inner.host.announce(&mut events);
        let match_number = inner.host.matches_played() as u64;
        for event in events {
            inner.publish(match_number, event);
        }
    }

    /// Simulate one point without publishing its events. Queries keep
    /// reporting the published state until the events go out.
    pub async fn step_point(&self) -> Result<PointBatch, RotationError> {
        let mut inner = self.inner.lock().await;
        let match_number = inner.host.matches_played() as u64 + 1;
        let mut events: Vec<SessionEvent> = Vec::new();
        inner.host.step_point(&mut events)?;
        let SessionInner { host, view, .. } = &mut *inner;
        view.stage_point(host);
        Ok(PointBatch {
            match_number,
            events,
        })
    }

    pub async fn publish(&self, match_number: u64, event: SessionEvent) {
        let mut inner = self.inner.lock().await;
        inner.publish(match_number, event);
    }

    /// Reset the host and publish the fresh arrangement.
    pub async fn reset_session(&self) -> Result<(), RotationError> {
        let mut inner = self.inner.lock().await;
        let mut events: Vec<SessionEvent> = Vec::new();
        inner.host.reset(&mut events)?;
        inner.view = PublishedView::from_host(&inner.host);
        for event in events {
            inner.publish(0, event);
        }
        info!("session reset");
        Ok(())
    }

    /// Cursor positioned after the newest published event.
    pub async fn latest_cursor(&self) -> EventCursor {
        let inner = self.inner.lock().await;
        EventCursor(inner.events.current_sequence())
    }

    pub async fn poll_events(&self, cursor: EventCursor) -> EventBatch {
        let inner = self.inner.lock().await;
        inner.events.since(cursor)
    }

    pub async fn history(&self) -> Vec<MatchSnapshot> {
        let inner = self.inner.lock().await;
        inner.view.history.clone()
    }

    /// Reports what has been published, not what the host has simulated.
    pub async fn status(&self) -> SessionStatus {
        let inner = self.inner.lock().await;
        let view = &inner.view;

        SessionStatus {
            active: view.active.clone(),
            bench: view.bench.clone(),
            streaks: view.streaks.clone(),
            stats: view.stats.clone(),
            dynamics: view.dynamics.clone(),
            score: view.score,
            last_match: view.history.last().cloned(),
            matches_played: view.history.len(),
            points_played: view.points_played,
            paused: self.is_paused(),
            speed: self.speed().get(),
        }
    }
}
