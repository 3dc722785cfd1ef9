//! Timekeeper - A local countdown timer and stopwatch service
//! 
//! This is the main entry point for the timekeeper application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use timekeeper::{
    api::create_router,
    config::Config,
    services::{AlertCoordinator, CommandAudio, DesktopNotifier},
    state::AppState,
    store::{FileStorage, KeyValueStore, MemoryStorage, TimerStore},
    tasks::{completion_task, stopwatch_task},
    utils::{shutdown_signal, Clock, SystemClock},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timekeeper={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timekeeper server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, cadence={}ms",
          config.host, config.port, config.cadence_ms);

    // Durable storage is best effort; fall back to memory for this session
    let storage_dir = config.storage_dir();
    let storage: Box<dyn KeyValueStore> = match FileStorage::new(&storage_dir) {
        Ok(storage) => {
            info!("Storing timers in {}", storage_dir.display());
            Box::new(storage)
        }
        Err(e) => {
            warn!("{}, timers will not survive a restart", e);
            Box::new(MemoryStorage::new())
        }
    };

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = TimerStore::open(storage, Arc::clone(&clock));
    if let Some(e) = store.load_error() {
        warn!("Starting with no timers: {}", e);
    }

    let alerts = AlertCoordinator::new(
        Arc::new(DesktopNotifier::new("timekeeper")),
        Arc::new(CommandAudio::new(config.player.clone(), config.sound.clone())),
    );
    if !config.no_notifications {
        alerts.request_permission().await;
    }

    let (state, events) = AppState::new(store, clock, alerts, config.cadence());

    // Completion handling must be listening before running timers are re-armed
    tokio::spawn(completion_task(Arc::clone(&state), events));
    tokio::spawn(stopwatch_task(Arc::clone(&state)));
    state.recover_running_timers();

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /timers                 - List timers");
    info!("  POST   /timers                 - Create a timer");
    info!("  DELETE /timers/:id             - Delete a timer");
    info!("  POST   /timers/:id/start       - Start a timer (full duration)");
    info!("  POST   /timers/:id/pause       - Pause a timer");
    info!("  POST   /timers/:id/reset       - Reset a timer and silence its alarm");
    info!("  POST   /timers/:id/stop-alarm  - Silence the alarm");
    info!("  GET    /stopwatch              - Stopwatch state");
    info!("  GET    /status                 - Service status");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}
