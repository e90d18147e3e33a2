// Framework bootstrap for the arena server runtime.

use crate::domain::World;
use crate::frameworks::config;
use crate::frameworks::settings::GameSettings;
use crate::interface_adapters::net::handle_connection;
use crate::interface_adapters::state::AppState;
use crate::use_cases::GameEvent;
use crate::use_cases::game::world_task;

use std::net::SocketAddr;
use std::{io::Result, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves clients on `listener` until the process exits.
pub async fn run(listener: TcpListener, settings: GameSettings) -> Result<()> {
    let address = listener.local_addr()?;
    let state = spawn_world(&settings);

    tracing::info!(
        %address,
        universe_size = settings.universe_size,
        game_mode = settings.game_mode,
        walls = settings.walls.len(),
        "server running, waiting for clients"
    );

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(handle_connection(stream, peer, state.clone()));
            }
            Err(e) => {
                // Usually fd exhaustion; back off instead of spinning.
                tracing::warn!(error = %e, "accept failed");
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        }
    }
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let path = config::settings_path();
    let settings = match GameSettings::load(&path) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "failed to initialize the server");
            idle_until_shutdown().await;
            return Ok(());
        }
    };

    let address = SocketAddr::new(config::bind_host(), config::game_port());
    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%address, error = %e, "failed to bind");
            idle_until_shutdown().await;
            return Ok(());
        }
    };

    run(listener, settings).await
}

fn spawn_world(settings: &GameSettings) -> Arc<AppState> {
    let arena = settings.arena();

    // input_tx/rx: every connection feeds the single world task.
    let (input_tx, input_rx) = mpsc::channel::<GameEvent>(config::INPUT_CHANNEL_CAPACITY);
    let world = World::new(arena.clone(), settings.rules());
    tokio::spawn(world_task(input_rx, world, settings.tick_interval()));

    Arc::new(AppState {
        input_tx,
        arena: Arc::new(arena),
        outbound_capacity: config::OUTBOUND_CHANNEL_CAPACITY,
    })
}

/// Degraded mode: the failure has been logged, there is no listener, and the process
/// stays up until the operator stops it.
async fn idle_until_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to wait for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
