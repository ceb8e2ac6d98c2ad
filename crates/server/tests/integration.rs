use rally_core::{Beat, PacingConfig, PlayerId, RotationError, SessionEvent, SpeedMultiplier};
use rally_host::SessionConfig;
use rally_server::{EventCursor, ServerConfig, ServerError, SessionServer, StampedEvent};
use rally_tennis::{TennisConfig, TennisSimulator};
use std::time::{Duration, Instant};
use tokio::time::sleep;

fn server_config(start_paused: bool) -> ServerConfig {
    ServerConfig {
        event_buffer_capacity: 100_000,
        pacing: PacingConfig::instant(),
        initial_speed: SpeedMultiplier::NORMAL,
        start_paused,
    }
}

fn start(start_paused: bool) -> SessionServer<TennisSimulator> {
    start_with(server_config(start_paused))
}

fn start_with(config: ServerConfig) -> SessionServer<TennisSimulator> {
    let session = SessionConfig {
        seed: 5,
        ..SessionConfig::default()
    };
    SessionServer::start(config, session, TennisConfig::default()).unwrap()
}

/// Score of the match in progress as the stream has shown it.
fn last_published_score(events: &[StampedEvent]) -> Option<(u32, u32)> {
    let mut shown = None;
    for stamped in events {
        match &stamped.event {
            SessionEvent::ScoreUpdated { score, .. } => shown = Some(*score),
            SessionEvent::MatchCompleted { .. } => shown = None,
            _ => {}
        }
    }
    shown
}

async fn wait_for_matches(server: &SessionServer<TennisSimulator>, matches: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.status().await.matches_played < matches {
        assert!(Instant::now() < deadline, "timed out waiting for {matches} matches");
        sleep(Duration::from_millis(5)).await;
    }
}

/// Pause and give the loop time to reach its next suspension point.
async fn settle(server: &SessionServer<TennisSimulator>) {
    server.pause();
    sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_announces_then_holds_when_started_paused() {
    let server = start(true);
    sleep(Duration::from_millis(30)).await;

    let batch = server.poll_events(EventCursor(0)).await;
    assert_eq!(batch.events.len(), 2);
    match &batch.events[0].event {
        SessionEvent::PlayersInitialized {
            active,
            bench,
            reason,
        } => {
            assert_eq!(active.0, PlayerId::from("Player 1"));
            assert_eq!(active.1, PlayerId::from("Player 2"));
            assert_eq!(bench, &PlayerId::from("Player 3"));
            assert_eq!(reason, "initial seating");
        }
        other => panic!("unexpected first event {other:?}"),
    }
    assert!(matches!(batch.events[1].event, SessionEvent::StatsUpdated { .. }));

    let status = server.status().await;
    assert!(status.paused);
    assert_eq!(status.points_played, 0);

    server.shutdown().await;
}

#[tokio::test]
async fn test_resume_plays_matches_in_order() {
    let server = start(true);
    server.resume();
    // The third match's events are fully published once the fourth starts.
    wait_for_matches(&server, 4).await;
    settle(&server).await;

    let batch = server.poll_events(EventCursor(0)).await;
    assert_eq!(batch.skipped, 0);
    for (i, stamped) in batch.events.iter().enumerate() {
        assert_eq!(stamped.sequence, i as u64);
    }

    let completed: Vec<u64> = batch
        .events
        .iter()
        .filter_map(|e| match &e.event {
            SessionEvent::MatchCompleted { snapshot } => Some(snapshot.match_number),
            _ => None,
        })
        .collect();
    assert!(completed.len() >= 3);
    assert_eq!(&completed[..3], &[1, 2, 3]);

    let history = server.history().await;
    assert!(history.len() >= 3);
    assert_eq!(history[0].match_number, 1);

    server.shutdown().await;
}

#[tokio::test]
async fn test_pause_halts_event_flow() {
    let server = start(false);
    wait_for_matches(&server, 1).await;
    settle(&server).await;

    let cursor = server.poll_events(EventCursor(0)).await.next;
    let points = server.status().await.points_played;
    sleep(Duration::from_millis(100)).await;

    assert!(server.poll_events(cursor).await.events.is_empty());
    assert_eq!(server.status().await.points_played, points);

    server.resume();
    let deadline = Instant::now() + Duration::from_secs(5);
    while server.poll_events(cursor).await.events.is_empty() {
        assert!(Instant::now() < deadline, "no events after resume");
        sleep(Duration::from_millis(5)).await;
    }
    assert!(!server.status().await.paused);

    server.shutdown().await;
}

#[tokio::test]
async fn test_speed_is_clamped_and_validated() {
    let server = start(true);

    assert_eq!(server.set_speed(10.0).unwrap().get(), 4.0);
    assert_eq!(server.set_speed(0.1).unwrap().get(), 0.25);
    assert_eq!(server.set_speed(1.5).unwrap().get(), 1.5);
    assert_eq!(server.set_speed(0.0), Err(ServerError::InvalidSpeed(0.0)));
    assert!(matches!(
        server.set_speed(f32::NAN),
        Err(ServerError::InvalidSpeed(_))
    ));
    assert_eq!(server.status().await.speed, 1.5);

    server.shutdown().await;
}

#[tokio::test]
async fn test_reset_restores_initial_arrangement() {
    let server = start(false);
    wait_for_matches(&server, 2).await;
    settle(&server).await;

    let cursor = server.poll_events(EventCursor(0)).await.next;
    server.reset();
    sleep(Duration::from_millis(50)).await;

    let status = server.status().await;
    assert_eq!(status.matches_played, 0);
    assert_eq!(status.points_played, 0);
    assert_eq!(status.score, None);
    assert_eq!(
        status.active,
        (PlayerId::from("Player 1"), PlayerId::from("Player 2"))
    );
    assert_eq!(status.bench, PlayerId::from("Player 3"));
    assert!(status.streaks.iter().all(|(_, streak)| *streak == 0));
    assert!(server.history().await.is_empty());

    let batch = server.poll_events(cursor).await;
    assert!(matches!(
        &batch.events[0].event,
        SessionEvent::PlayersInitialized { reason, .. } if reason == "initial seating"
    ));

    server.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_the_loop() {
    let server = start(false);
    wait_for_matches(&server, 1).await;
    server.shutdown().await;

    let cursor = server.poll_events(EventCursor(0)).await.next;
    let points = server.status().await.points_played;
    sleep(Duration::from_millis(50)).await;
    assert!(server.poll_events(cursor).await.events.is_empty());
    assert_eq!(server.status().await.points_played, points);

    // Idempotent.
    server.shutdown().await;
}

#[tokio::test]
async fn test_invalid_session_is_rejected() {
    let session = SessionConfig {
        points_to_win: 0,
        ..SessionConfig::default()
    };
    let result = SessionServer::<TennisSimulator>::start(
        server_config(true),
        session,
        TennisConfig::default(),
    );
    assert!(matches!(
        result,
        Err(ServerError::Rotation(RotationError::InvalidConfiguration(_)))
    ));
}

#[tokio::test]
async fn test_status_does_not_run_ahead_of_paced_events() {
    // Default pacing holds the first point on its 400ms ready beat.
    let server = start_with(ServerConfig {
        event_buffer_capacity: 1024,
        pacing: PacingConfig::default(),
        initial_speed: SpeedMultiplier::NORMAL,
        start_paused: false,
    });
    sleep(Duration::from_millis(150)).await;

    let batch = server.poll_events(EventCursor(0)).await;
    assert!(matches!(
        batch.events.last().map(|e| &e.event),
        Some(SessionEvent::Beat { .. })
    ));
    let status = server.status().await;
    assert_eq!(status.points_played, 0);
    assert_eq!(status.score, Some((0, 0)));
    assert_eq!(status.score, last_published_score(&batch.events));
    assert!(status
        .dynamics
        .iter()
        .all(|(_, d)| d.momentum() == 0.5 && d.fatigue() == 0.0));

    server.shutdown().await;
}

#[tokio::test]
async fn test_paused_status_matches_published_events() {
    let server = start(false);
    for matches in [1, 2, 3] {
        wait_for_matches(&server, matches).await;
        settle(&server).await;

        let events = server.poll_events(EventCursor(0)).await.events;
        let status = server.status().await;
        let points = events
            .iter()
            .filter(|e| matches!(e.event.as_beat(), Some(Beat::PointOver)))
            .count() as u64;
        let completed = events
            .iter()
            .filter(|e| matches!(e.event, SessionEvent::MatchCompleted { .. }))
            .count();

        assert_eq!(status.points_played, points);
        assert_eq!(status.matches_played, completed);
        assert_eq!(server.history().await.len(), completed);
        assert_eq!(status.score, last_published_score(&events));
        server.resume();
    }

    server.shutdown().await;
}

#[tokio::test]
async fn test_speed_change_rescales_the_current_delay() {
    let mut pacing = PacingConfig::instant();
    pacing.ready = Duration::from_millis(2000);
    let server = start_with(ServerConfig {
        event_buffer_capacity: 1024,
        pacing,
        initial_speed: SpeedMultiplier::new(0.25).unwrap(),
        start_paused: false,
    });
    sleep(Duration::from_millis(30)).await;
    assert_eq!(server.status().await.points_played, 0);

    // 8s at quarter speed; at 4x what is left takes well under a second.
    server.set_speed(4.0).unwrap();
    let deadline = Instant::now() + Duration::from_secs(2);
    while server.status().await.points_played == 0 {
        assert!(Instant::now() < deadline, "speed change did not shorten the wait");
        sleep(Duration::from_millis(5)).await;
    }

    server.shutdown().await;
}
