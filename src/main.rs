use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use song_library::controllers::MusicInfoClient;
use song_library::secrets::SECRET_MANAGER;
use song_library::{AppState, Database, make_app};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

fn music_info_client() -> anyhow::Result<Option<MusicInfoClient>> {
    let url = SECRET_MANAGER.get("MUSIC_INFO_URL");
    if url.is_empty() {
        info!("MUSIC_INFO_URL not set, song details enrichment disabled");
        return Ok(None);
    }
    let timeout = Duration::from_secs(SECRET_MANAGER.get_parsed("MUSIC_INFO_TIMEOUT_SECS", 10));
    let client = MusicInfoClient::new(&url, timeout).context("invalid MUSIC_INFO_URL")?;
    info!("🎵 Song details enrichment via {}", client.info_url());
    Ok(Some(client))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(SECRET_MANAGER.get("LOG_LEVEL")));
    fmt().with_env_filter(filter).with_target(false).init();
    SECRET_MANAGER.log_configured();

    let database_url = SECRET_MANAGER.get("DATABASE_URL");
    if database_url.is_empty() {
        anyhow::bail!("DATABASE_URL must be set in production mode");
    }
    let database = Database::new(
        &database_url,
        SECRET_MANAGER.get_parsed("DB_MAX_CONNECTIONS", 5),
    )
    .await
    .context("failed to connect to PostgreSQL")?;
    info!("📊 Connected to PostgreSQL database");

    database
        .migrate()
        .await
        .context("failed to run database migrations")?;
    info!("📊 Database migrations completed");

    let state = AppState::new(Arc::new(database.clone()), music_info_client()?);
    let app = make_app(state);

    let port = SECRET_MANAGER.get("PORT");
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    info!("🎧 Song library listening on {}", listener.local_addr()?);
    info!("📡 Song API endpoints: /songs, /songs/{{id}}, /songs/{{id}}/lyrics, /songs/{{id}}/lyrics/{{verses}}, /groups");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.pool().close().await;
    info!("Server stopped");
    Ok(())
}
