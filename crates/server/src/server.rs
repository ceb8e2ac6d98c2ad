use crate::errors::ServerError;
use crate::session_handle::SessionHandle;
use crate::session_loop::spawn_session_loop;
use crate::types::{EventBatch, EventCursor, ServerConfig, SessionStatus};
use rally_core::{MatchSnapshot, PointEngine, SpeedMultiplier};
use rally_host::{SessionConfig, SessionHost};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::info;

/// A paced rotation session running on its own tokio task.
pub struct SessionServer<E: PointEngine> {
    pub config: ServerConfig,
    handle: SessionHandle<E>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<E> SessionServer<E>
where
    E: PointEngine + Send + 'static,
{
    /// Build the host and spawn the session loop. Must be called inside a
    /// tokio runtime.
    pub fn start(
        config: ServerConfig,
        session: SessionConfig,
        engine_config: E::Config,
    ) -> Result<Self, ServerError> {
        let host = SessionHost::<E>::new(session, engine_config)?;
        let handle = SessionHandle::new(
            host,
            config.event_buffer_capacity,
            config.initial_speed,
            config.start_paused,
        );
        let task = spawn_session_loop(handle.clone(), config.pacing.clone());
        info!(
            speed = handle.speed().get(),
            paused = config.start_paused,
            "session started"
        );

        Ok(Self {
            config,
            handle,
            task: Mutex::new(Some(task)),
        })
    }

    pub fn handle(&self) -> SessionHandle<E> {
        self.handle.clone()
    }

    /// Idempotent.
    pub fn pause(&self) {
        self.handle.pause();
    }

    /// Idempotent.
    pub fn resume(&self) {
        self.handle.resume();
    }

    pub fn set_speed(&self, multiplier: f32) -> Result<SpeedMultiplier, ServerError> {
        self.handle.set_speed(multiplier)
    }

    /// Takes effect at the next suspension point, also while paused.
    pub fn reset(&self) {
        info!("session reset requested");
        self.handle.request_reset();
    }

    pub async fn poll_events(&self, cursor: EventCursor) -> EventBatch {
        self.handle.poll_events(cursor).await
    }

    pub async fn latest_cursor(&self) -> EventCursor {
        self.handle.latest_cursor().await
    }

    pub async fn status(&self) -> SessionStatus {
        self.handle.status().await
    }

    pub async fn history(&self) -> Vec<MatchSnapshot> {
        self.handle.history().await
    }

    /// Stop the loop and wait for it to finish. State stays readable.
    pub async fn shutdown(&self) {
        self.handle.request_shutdown();
        if let Some(task) = self.task.lock().await.take() {
            let _ = task.await;
        }
        info!("session shut down");
    }
}
