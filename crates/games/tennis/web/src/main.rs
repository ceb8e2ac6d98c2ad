//! Tennis server - runs one paced rotation session and exposes it over HTTP.
//!
//! - `GET /api/stream` streams published session events as SSE
//!   (single poll task per process, fan-out to all connected viewers)
//! - `GET /api/status`, `GET /api/history` return JSON snapshots
//! - `POST /api/pause|resume|reset|speed` control playback
//! - Optionally serves a browser renderer from a static directory

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use clap::Parser;
use rally_core::{MatchSnapshot, SpeedMultiplier};
use rally_host::SessionConfig;
use rally_server::{ServerConfig, ServerError, SessionServer, SessionStatus};
use rally_tennis::{TennisConfig, TennisSimulator};
use serde::Deserialize;
use std::{convert::Infallible, net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};
use tokio::{net::TcpListener, sync::RwLock};
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tennis-server")]
#[command(about = "Three-player tennis rotation with a live event feed")]
struct Args {
    /// Port for the web/SSE server
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// JSON file with `session`, `server` and `tennis` sections
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the session RNG (random when omitted and not in the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Consecutive wins before forced rest
    #[arg(long)]
    max_streak: Option<u32>,

    /// Points needed to win a match
    #[arg(long)]
    points_to_win: Option<u32>,

    /// Initial playback speed, clamped to [0.25, 4]
    #[arg(long)]
    speed: Option<f32>,

    /// Wait for POST /api/resume before the first point
    #[arg(long)]
    paused: bool,

    /// Static files directory for a browser renderer
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    session: Option<SessionConfig>,
    server: ServerConfig,
    tennis: TennisConfig,
}

/// Broadcast channel plus the poll task feeding it.
struct EventStream {
    tx: tokio::sync::broadcast::Sender<String>,
    task: tokio::task::JoinHandle<()>,
}

type Session = SessionServer<TennisSimulator>;

struct AppState {
    session: Arc<Session>,
    /// Created on first subscriber, cleared when all disconnect.
    stream: Arc<RwLock<Option<EventStream>>>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let (session_config, server_config, tennis_config) = load_config(&args)?;
    tracing::info!(
        seed = session_config.seed,
        max_streak = session_config.max_streak,
        points_to_win = session_config.points_to_win,
        "starting session"
    );

    let session = Arc::new(Session::start(server_config, session_config, tennis_config)?);
    let state = Arc::new(AppState {
        session: session.clone(),
        stream: Arc::new(RwLock::new(None)),
    });

    let mut app = Router::new()
        .route("/api/stream", get(stream_events))
        .route("/api/status", get(status))
        .route("/api/history", get(history))
        .route("/api/pause", post(pause))
        .route("/api/resume", post(resume))
        .route("/api/reset", post(reset))
        .route("/api/speed", post(set_speed));

    if let Some(dir) = &args.static_dir {
        if !dir.exists() {
            tracing::warn!("Static directory {:?} does not exist", dir);
        }
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
        tracing::info!("Serving static files from {:?}", dir);
    }
    let app = app.layer(CorsLayer::permissive()).with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Tennis server listening on http://{}", addr);
    tracing::info!("SSE streaming at /api/stream");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    session.shutdown().await;
    Ok(())
}

/// Merge the optional config file with command-line overrides.
fn load_config(
    args: &Args,
) -> Result<(SessionConfig, ServerConfig, TennisConfig), Box<dyn std::error::Error>> {
    let file: FileConfig = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => FileConfig::default(),
    };

    let from_file = file.session.is_some();
    let mut session = file.session.unwrap_or_default();
    match args.seed {
        Some(seed) => session.seed = seed,
        None if !from_file => session.seed = rand::random(),
        None => {}
    }
    if let Some(max_streak) = args.max_streak {
        session.max_streak = max_streak;
    }
    if let Some(points_to_win) = args.points_to_win {
        session.points_to_win = points_to_win;
    }

    let mut server = file.server;
    if let Some(speed) = args.speed {
        server.initial_speed =
            SpeedMultiplier::new(speed).ok_or(ServerError::InvalidSpeed(speed))?;
    }
    server.start_paused |= args.paused;

    Ok((session, server, file.tennis))
}

// ---------------------------------------------------------------------------
// SSE endpoint
// ---------------------------------------------------------------------------

/// Streams published session events to all connected viewers.
///
/// New viewers see events from the moment they subscribe; `/api/status`
/// gives them the current arrangement.
async fn stream_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let rx = {
        let mut lock = state.stream.write().await;

        let alive = lock.as_ref().filter(|entry| !entry.task.is_finished());
        match alive {
            Some(entry) => {
                tracing::info!(
                    "Event SSE: new subscriber (receivers: {})",
                    entry.tx.receiver_count() + 1
                );
                entry.tx.subscribe()
            }
            None => {
                let (tx, rx) = tokio::sync::broadcast::channel::<String>(256);
                let poll_tx = tx.clone();
                let session = state.session.clone();
                let slot = state.stream.clone();
                let task = tokio::spawn(async move {
                    poll_events_loop(session, slot, poll_tx).await;
                });
                *lock = Some(EventStream { tx, task });
                tracing::info!("Event SSE: first subscriber, started polling");
                rx
            }
        }
    };

    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).map(|result| match result {
        Ok(json) => Ok::<_, Infallible>(Event::default().data(json)),
        Err(_) => Ok(Event::default().data("{\"error\": \"stream lagged\"}")),
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Polls the event buffer every 100ms and broadcasts each event as JSON.
async fn poll_events_loop(
    session: Arc<Session>,
    slot: Arc<RwLock<Option<EventStream>>>,
    tx: tokio::sync::broadcast::Sender<String>,
) {
    let mut interval = tokio::time::interval(Duration::from_millis(100));
    let mut cursor = session.latest_cursor().await;

    loop {
        interval.tick().await;

        if tx.receiver_count() == 0 {
            tracing::info!("Event SSE: no subscribers, stopping poll loop");
            break;
        }

        let batch = session.poll_events(cursor).await;
        if batch.skipped > 0 {
            tracing::warn!(skipped = batch.skipped, "Event SSE: buffer overran the poll loop");
        }
        cursor = batch.next;

        for event in &batch.events {
            match serde_json::to_string(event) {
                Ok(json) => {
                    let _ = tx.send(json);
                }
                Err(e) => tracing::warn!("Event SSE: failed to encode event: {}", e),
            }
        }
    }

    *slot.write().await = None;
    tracing::info!("Event SSE: cleaned up stream entry");
}

// ---------------------------------------------------------------------------
// Queries and commands
// ---------------------------------------------------------------------------

async fn status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    Json(state.session.status().await)
}

async fn history(State(state): State<Arc<AppState>>) -> Json<Vec<MatchSnapshot>> {
    Json(state.session.history().await)
}

async fn pause(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.pause();
    StatusCode::NO_CONTENT
}

async fn resume(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.resume();
    StatusCode::NO_CONTENT
}

async fn reset(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.reset();
    StatusCode::ACCEPTED
}

#[derive(Debug, Deserialize)]
struct SpeedRequest {
    multiplier: f32,
}

async fn set_speed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeedRequest>,
) -> Response {
    match state.session.set_speed(request.multiplier) {
        Ok(applied) => Json(serde_json::json!({ "multiplier": applied.get() })).into_response(),
        Err(e) => bad_request(e),
    }
}

fn bad_request(error: ServerError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
