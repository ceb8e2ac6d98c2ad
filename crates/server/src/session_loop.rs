use crate::session_handle::SessionHandle;
use rally_core::{PacingConfig, PointEngine};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info};

/// What to do after a suspension point.
enum Gate {
    Continue,
    Reset,
    Shutdown,
}

/// Run the session until shutdown is requested.
///
/// Each point is simulated under the lock, then its events are published
/// one by one. The loop suspends after every beat for the paced delay and
/// checks shutdown, reset and pause there, so a pause never advances the
/// simulation.
pub async fn run_session_loop<E>(handle: SessionHandle<E>, pacing: PacingConfig)
where
    E: PointEngine + Send + 'static,
{
    info!("session loop started");
    handle.announce().await;

    'session: loop {
        match gate(&handle, &pacing).await {
            Gate::Shutdown => break,
            Gate::Reset => {
                if !reset(&handle).await {
                    break;
                }
                continue;
            }
            Gate::Continue => {}
        }

        let batch = match handle.step_point().await {
            Ok(batch) => batch,
            Err(err) => {
                error!(%err, "simulation rejected a match result");
                break;
            }
        };

        for event in batch.events {
            let beat = event.as_beat();
            handle.publish(batch.match_number, event).await;
            let Some(beat) = beat else {
                continue;
            };

            pause_for(&handle, pacing.delay_for(beat)).await;
            match gate(&handle, &pacing).await {
                Gate::Shutdown => break 'session,
                Gate::Reset => {
                    if !reset(&handle).await {
                        break 'session;
                    }
                    continue 'session;
                }
                Gate::Continue => {}
            }
        }
    }

    info!("session loop stopped");
}

/// Spawn the session loop as a tokio task.
pub fn spawn_session_loop<E>(
    handle: SessionHandle<E>,
    pacing: PacingConfig,
) -> tokio::task::JoinHandle<()>
where
    E: PointEngine + Send + 'static,
{
    tokio::spawn(run_session_loop(handle, pacing))
}

/// Shutdown wins over reset, reset over pause. Idles while paused.
async fn gate<E: PointEngine>(handle: &SessionHandle<E>, pacing: &PacingConfig) -> Gate {
    loop {
        if handle.should_shutdown() {
            return Gate::Shutdown;
        }
        if handle.take_reset_request() {
            return Gate::Reset;
        }
        if !handle.is_paused() {
            return Gate::Continue;
        }
        tokio::select! {
            _ = sleep(pacing.idle_poll) => {}
            _ = handle.changed() => {}
        }
    }
}

/// Sleep through a beat's delay at the current speed.
///
/// Pause, reset and shutdown end the wait early. A speed change rescales
/// whatever is left of it.
async fn pause_for<E: PointEngine>(handle: &SessionHandle<E>, delay: Duration) {
    let mut remaining = delay;
    loop {
        let speed = handle.speed();
        let scaled = speed.scale(remaining);
        if scaled.is_zero() {
            tokio::task::yield_now().await;
            return;
        }

        let started = Instant::now();
        tokio::select! {
            _ = sleep(scaled) => return,
            _ = handle.changed() => {}
        }
        if handle.should_shutdown() || handle.reset_pending() || handle.is_paused() {
            return;
        }
        remaining = remaining.saturating_sub(started.elapsed().mul_f32(speed.get()));
    }
}

async fn reset<E: PointEngine>(handle: &SessionHandle<E>) -> bool {
    match handle.reset_session().await {
        Ok(()) => true,
        Err(err) => {
            error!(%err, "session reset failed");
            false
        }
    }
}
