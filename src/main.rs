//! Focus Timer - A Pomodoro countdown service
//!
//! This is the main entry point for the focus-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    storage::{JsonFileStore, KeyValueStore, ReminderStore, SettingsStore},
    tasks::{countdown_ticker_task, reminder_sync_task, TokioScheduler},
    timer::{SystemClock, TimerController},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer v1.0.0");
    info!("Configuration: host={}, port={}, timer={}min, data_dir={}",
          config.host, config.port, config.minutes, config.data_dir.display());

    // Persistent stores
    let kv: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(&config.data_dir)?);
    let clock = Arc::new(SystemClock);
    let reminders = Arc::new(ReminderStore::new(Arc::clone(&kv), clock.clone()));
    let settings = Arc::new(SettingsStore::new(kv));

    // Timer controller driven by tokio-backed ticks
    let (scheduler, fired_rx) = TokioScheduler::new();
    let controller = TimerController::new(
        config.timer_seconds(),
        Arc::new(scheduler),
        clock,
        Arc::new(config.audio_backend()),
        Arc::clone(&reminders),
    );

    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        controller,
        reminders,
        settings,
    ));

    // Start background tasks
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        countdown_ticker_task(ticker_state, fired_rx).await;
    });
    let sync_state = Arc::clone(&state);
    tokio::spawn(async move {
        reminder_sync_task(sync_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /timer/start      - Start or continue the countdown");
    info!("  POST   /timer/pause      - Pause the countdown");
    info!("  POST   /timer/reset      - Reset to the full interval");
    info!("  PUT    /timer/duration   - Change the interval length");
    info!("  POST   /noise/:kind      - Play white or brown noise");
    info!("  POST   /noise/pause|resume|stop");
    info!("  GET    /reminders        - List reminders");
    info!("  POST   /reminders        - Add a reminder");
    info!("  DELETE /reminders/:id    - Delete a reminder");
    info!("  GET    /settings, PUT /settings");
    info!("  GET    /status           - Timer, display and playback status");
    info!("  GET    /health           - Health check");

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

    if let Err(e) = state.shutdown() {
        tracing::error!("Failed to shut down timer: {}", e);
    }

    info!("Server shutdown complete");
    Ok(())
}
